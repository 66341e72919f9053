pub mod config;
pub mod error;
pub mod logging;
pub mod result;

pub use config::{ServerConfig, StorageBackend};
pub use error::{BoardError, FieldErrors};
pub use result::BoardResult;
