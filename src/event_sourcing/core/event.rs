use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Event Envelope - domain event plus journal metadata
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub sequence_number: i64,

    pub event_type: String,
    pub event_version: i32,

    pub event_data: E,

    // Causation & Correlation
    pub causation_id: Option<Uuid>,
    pub correlation_id: Uuid,

    pub recorded_at: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        aggregate_id: Uuid,
        sequence_number: i64,
        event_type: impl Into<String>,
        event_data: E,
        correlation_id: Uuid,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            aggregate_id,
            sequence_number,
            event_type: event_type.into(),
            event_version: 1,
            event_data,
            causation_id: None,
            correlation_id,
            recorded_at,
            metadata: HashMap::new(),
        }
    }

    pub fn with_causation(mut self, causation_id: Uuid) -> Self {
        self.causation_id = Some(causation_id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

pub trait DomainEvent: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync {
    fn event_type() -> &'static str where Self: Sized;
    fn event_version() -> i32 where Self: Sized { 1 }
}

pub fn serialize_event<E: Serialize>(event: &E) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

pub fn deserialize_event<E: for<'de> Deserialize<'de>>(json: &str) -> serde_json::Result<E> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    struct Probe {
        data: String,
    }

    impl DomainEvent for Probe {
        fn event_type() -> &'static str { "Probe" }
    }

    #[test]
    fn test_envelope_builders() {
        let cause = Uuid::new_v4();
        let envelope = EventEnvelope::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            1,
            Probe::event_type(),
            Probe { data: "x".into() },
            Uuid::new_v4(),
            Utc::now(),
        )
        .with_causation(cause)
        .with_metadata("command", "Probe");

        assert_eq!(envelope.event_type, "Probe");
        assert_eq!(envelope.causation_id, Some(cause));
        assert_eq!(envelope.metadata.get("command").map(String::as_str), Some("Probe"));
    }

    #[test]
    fn test_event_json_round_trip() {
        let event = Probe { data: "payload".into() };
        let json = serialize_event(&event).unwrap();
        let back: Probe = deserialize_event(&json).unwrap();
        assert_eq!(event, back);
    }
}
