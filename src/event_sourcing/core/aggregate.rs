use anyhow::Result;
use uuid::Uuid;

use super::event::EventEnvelope;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// 1. Commands are validated against current state without mutating it
// 2. Accepted commands become events
// 3. Events are the only thing that changes state
// 4. Replaying the same events yields the same state
//
// ============================================================================

pub trait Aggregate: Sized + Send + Sync {
    type Event;
    type Command;
    type Error;

    /// Fold an accepted event into state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Validate a command and describe its effect as events (no mutation)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    fn aggregate_id(&self) -> Uuid;

    /// Number of events applied so far
    fn version(&self) -> i64;

    /// Rebuild state by applying a stored history on top of `self`.
    ///
    /// Envelopes must continue the aggregate's sequence without gaps.
    fn replay(mut self, events: &[EventEnvelope<Self::Event>]) -> Result<Self>
    where
        Self::Error: std::fmt::Display,
    {
        for envelope in events {
            let expected = self.version() + 1;
            if envelope.sequence_number != expected {
                anyhow::bail!(
                    "Event sequence gap: expected {}, got {}",
                    expected,
                    envelope.sequence_number
                );
            }

            self.apply_event(&envelope.event_data)
                .map_err(|e| anyhow::anyhow!("Failed to apply event {}: {}", envelope.event_type, e))?;
        }

        Ok(self)
    }
}
