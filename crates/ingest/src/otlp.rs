pub mod decode;

pub use decode::{decode_export, decode_request, decode_span};
