pub mod config;
pub mod error;
pub mod types;

pub use config::TraceConfig;
pub use error::SourceTraceError;
pub use types::*;
