pub mod constants;
pub mod error;
pub mod types;
pub mod uid;

pub use error::{Error, Result};
pub use types::*;
pub use uid::UidText;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
