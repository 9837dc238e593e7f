use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use crate::event_sourcing::core::{Aggregate, EventEnvelope};
use crate::event_sourcing::store::EventStore;

use super::aggregate::Marketplace;
use super::commands::MarketplaceCommand;
use super::events::MarketplaceEvent;
use super::listing::Listing;
use super::services::{Clock, IdGenerator};

// ============================================================================
// Marketplace Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Event Store
//
// The handler keeps the live aggregate in memory and journals every accepted
// event, so the marketplace can be rebuilt from the store at any time.
//
// ============================================================================

pub struct MarketplaceCommandHandler {
    marketplace: Marketplace,
    event_store: Arc<EventStore<MarketplaceEvent>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl MarketplaceCommandHandler {
    /// The marketplace must be exactly what the journal describes: a fresh
    /// one over an empty stream, or one rebuilt from that stream. Seed
    /// listings through `seed` so they are journaled too.
    pub fn new(
        marketplace: Marketplace,
        event_store: Arc<EventStore<MarketplaceEvent>>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let aggregate_id = marketplace.aggregate_id();
        let journaled = event_store.current_version(aggregate_id)?;
        anyhow::ensure!(
            marketplace.version() == journaled,
            "Marketplace {} is at version {} but its journal is at version {}",
            aggregate_id,
            marketplace.version(),
            journaled
        );

        Ok(Self {
            marketplace,
            event_store,
            ids,
            clock,
        })
    }

    /// Submit initial listings one by one, in order, through `handle`.
    /// Stops at the first rejected listing; earlier ones stay journaled.
    pub fn seed(
        &mut self,
        listings: impl IntoIterator<Item = Listing>,
        correlation_id: Uuid,
    ) -> Result<usize> {
        let mut seeded = 0;
        for listing in listings {
            self.handle(MarketplaceCommand::SetListingForSale { listing }, correlation_id)?;
            seeded += 1;
        }

        tracing::info!(
            aggregate_id = %self.marketplace.aggregate_id(),
            seeded = seeded,
            "Seeded marketplace listings"
        );
        Ok(seeded)
    }

    pub fn marketplace(&self) -> &Marketplace {
        &self.marketplace
    }

    pub fn event_store(&self) -> &Arc<EventStore<MarketplaceEvent>> {
        &self.event_store
    }

    /// Handle a command and journal the resulting events.
    ///
    /// Domain rejections come back as `MarketplaceError` inside the
    /// `anyhow::Error` and leave both the aggregate and the journal untouched.
    pub fn handle(
        &mut self,
        command: MarketplaceCommand,
        correlation_id: Uuid,
    ) -> Result<Vec<MarketplaceEvent>> {
        let aggregate_id = self.marketplace.aggregate_id();
        let expected_version = self.marketplace.version();
        let command_name = command.name();

        let domain_events = self.marketplace.decide(&command)?;

        if domain_events.is_empty() {
            return Ok(domain_events);
        }

        let recorded_at = self.clock.now();
        let envelopes: Vec<EventEnvelope<MarketplaceEvent>> = domain_events
            .iter()
            .enumerate()
            .map(|(offset, event)| {
                EventEnvelope::new(
                    self.ids.next_id(),
                    aggregate_id,
                    expected_version + offset as i64 + 1,
                    event.name(),
                    event.clone(),
                    correlation_id,
                    recorded_at,
                )
                .with_metadata("command", command_name)
            })
            .collect();

        // Journal first: a conflict must not leave the live aggregate ahead
        // of the store.
        let new_version = self
            .event_store
            .append_events(aggregate_id, expected_version, envelopes)?;

        self.marketplace.commit(&domain_events)?;

        tracing::debug!(
            aggregate_id = %aggregate_id,
            command = command_name,
            correlation_id = %correlation_id,
            new_version = new_version,
            "Journaled marketplace events"
        );

        Ok(domain_events)
    }

    /// Fresh marketplace rebuilt purely from the journal
    pub fn rebuild(&self) -> Result<Marketplace> {
        let empty = Marketplace::new(self.marketplace.aggregate_id(), self.clock.clone());
        self.event_store.load_aggregate(empty)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
