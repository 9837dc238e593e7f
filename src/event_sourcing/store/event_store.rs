use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::RwLock;
use uuid::Uuid;

use crate::event_sourcing::core::{Aggregate, DomainEvent, EventEnvelope};

// ============================================================================
// In-Memory Event Store - append-only journal per aggregate
// ============================================================================
//
// Responsibilities:
// 1. Append events (append-only, no updates or deletes)
// 2. Load event history for an aggregate in sequence order
// 3. Optimistic concurrency: writers state the version they built on
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    #[error("Concurrency conflict on {aggregate_id}: expected version {expected}, but current is {actual}")]
    ConcurrencyConflict {
        aggregate_id: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("Cannot append empty event list")]
    EmptyAppend,

    #[error("Event {sequence_number} does not continue the stream at version {version}")]
    SequenceMismatch { sequence_number: i64, version: i64 },

    #[error("Event store lock poisoned")]
    Poisoned,
}

pub struct EventStore<E: DomainEvent> {
    aggregate_type_name: String,
    streams: RwLock<HashMap<Uuid, Vec<EventEnvelope<E>>>>,
    _phantom: PhantomData<E>,
}

impl<E: DomainEvent> EventStore<E> {
    pub fn new(aggregate_type_name: &str) -> Self {
        Self {
            aggregate_type_name: aggregate_type_name.to_string(),
            streams: RwLock::new(HashMap::new()),
            _phantom: PhantomData,
        }
    }

    /// Append events to a stream.
    /// Returns the new version number after appending
    pub fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64, EventStoreError> {
        if events.is_empty() {
            return Err(EventStoreError::EmptyAppend);
        }

        let mut streams = self.streams.write().map_err(|_| EventStoreError::Poisoned)?;
        let stream = streams.entry(aggregate_id).or_default();

        let current_version = stream.len() as i64;
        if current_version != expected_version {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual: current_version,
            });
        }

        // Validate the whole batch before touching the stream
        for (offset, envelope) in events.iter().enumerate() {
            let version = expected_version + offset as i64;
            if envelope.sequence_number != version + 1 {
                return Err(EventStoreError::SequenceMismatch {
                    sequence_number: envelope.sequence_number,
                    version,
                });
            }
        }

        let event_count = events.len();
        stream.extend(events);
        let new_version = stream.len() as i64;

        tracing::debug!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version = new_version,
            event_count = event_count,
            "Appended events to event store"
        );

        Ok(new_version)
    }

    /// Load all events for an aggregate, oldest first
    pub fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>, EventStoreError> {
        let streams = self.streams.read().map_err(|_| EventStoreError::Poisoned)?;
        let events = streams.get(&aggregate_id).cloned().unwrap_or_default();

        tracing::debug!("Loaded {} events for aggregate {}", events.len(), aggregate_id);
        Ok(events)
    }

    pub fn current_version(&self, aggregate_id: Uuid) -> Result<i64, EventStoreError> {
        let streams = self.streams.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(streams.get(&aggregate_id).map_or(0, |s| s.len() as i64))
    }

    pub fn aggregate_exists(&self, aggregate_id: Uuid) -> Result<bool, EventStoreError> {
        Ok(self.current_version(aggregate_id)? > 0)
    }

    /// Replay the stored history onto a fresh aggregate
    pub fn load_aggregate<A>(&self, empty: A) -> anyhow::Result<A>
    where
        A: Aggregate<Event = E>,
        <A as Aggregate>::Error: std::fmt::Display,
    {
        let events = self.load_events(empty.aggregate_id())?;
        empty.replay(&events)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
