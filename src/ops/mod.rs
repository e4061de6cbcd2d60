//! High-level operations exposed through the CLI.

pub mod scaffold;

pub use scaffold::{
    init_package, sanitize_module_name, scaffold_package, PackageKind, ProgressSink,
    ScaffoldOptions, MANIFEST_FILE,
};
