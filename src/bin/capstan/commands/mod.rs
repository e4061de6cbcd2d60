//! CLI command implementations.

pub mod completions;
pub mod init;
pub mod load;
pub mod new;
