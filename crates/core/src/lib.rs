pub mod config;
pub mod error;
pub mod hex;
pub mod ids;
pub mod model;
pub mod time;

pub use config::ConverterConfig;
pub use error::{Result, SpandocError};
pub use ids::{SpanId, TraceId};
