// ============================================================================
// Event Sourcing Core - generic abstractions, no marketplace types here
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::Aggregate;
pub use event::{deserialize_event, serialize_event, DomainEvent, EventEnvelope};
