pub mod kv;
pub mod log;
pub mod process;
pub mod span;

pub use kv::{KeyValue, TagValue, ValueType};
pub use log::Log;
pub use process::Process;
pub use span::{Span, SpanRef, SpanRefType};
