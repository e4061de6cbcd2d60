//! Shared utilities

pub mod diagnostic;
pub mod hash;
pub mod shell;

pub use diagnostic::Diagnostic;
pub use shell::Shell;
