pub mod cli;
pub mod error;
pub mod generate;
pub mod oracle;
pub mod platform;
pub mod runner;

pub use error::{PlatcheckError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
