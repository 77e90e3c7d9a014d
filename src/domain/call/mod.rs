//! Call domain - lifecycle, call records, event log and classification.

mod aggregate;
mod event;
mod lifecycle;
mod sentiment;

pub use aggregate::{Call, CallStatusUpdate, EndOfCallReport, TenantContext};
pub use event::{CallEvent, CallEventKind, Speaker, TranscriptKind};
pub use lifecycle::CallLifecycle;
pub use sentiment::{classify_sentiment, Priority, Sentiment};
