pub mod errors;
pub mod models;
pub mod payloads;
pub mod source;
pub mod transform;

pub use errors::RecordError;
pub use models::{EventRecord, EventType};
pub use payloads::RawEvent;
pub use source::{EventSource, JsonLinesSource};
pub use transform::normalize_event;
