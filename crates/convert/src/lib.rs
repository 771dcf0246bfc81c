pub mod document;
pub mod encode;
pub mod from_domain;
pub mod tags;

pub use document::SpanDocument;
pub use from_domain::FromDomain;
