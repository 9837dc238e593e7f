use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::domain::marketplace::{MarketplaceCommand, MarketplaceError};

// ============================================================================
// Metrics Module - Prometheus metrics for the marketplace
// ============================================================================
//
// Counts accepted and rejected commands by kind, and tracks how many
// listings still have tickets to sell. No HTTP exporter: `render()` yields
// the text exposition format for whoever wants to serve it.
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub listings_submitted: IntCounter,
    pub listings_rejected: IntCounterVec,
    pub listings_verified: IntCounter,
    pub tickets_sold: IntCounter,
    pub purchases_rejected: IntCounterVec,
    pub active_listings: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let listings_submitted = IntCounter::new(
            "listings_submitted_total",
            "Listings accepted into the marketplace",
        )?;
        registry.register(Box::new(listings_submitted.clone()))?;

        let listings_rejected = IntCounterVec::new(
            Opts::new("listings_rejected_total", "Listings refused by marketplace rules"),
            &["reason"],
        )?;
        registry.register(Box::new(listings_rejected.clone()))?;

        let listings_verified = IntCounter::new(
            "listings_verified_total",
            "Listings verified by an administrator",
        )?;
        registry.register(Box::new(listings_verified.clone()))?;

        let tickets_sold = IntCounter::new("tickets_sold_total", "Tickets bought")?;
        registry.register(Box::new(tickets_sold.clone()))?;

        let purchases_rejected = IntCounterVec::new(
            Opts::new("purchases_rejected_total", "Purchase attempts refused"),
            &["reason"],
        )?;
        registry.register(Box::new(purchases_rejected.clone()))?;

        let active_listings = IntGauge::new(
            "active_listings",
            "Listings with at least one unbought ticket (verified or not)",
        )?;
        registry.register(Box::new(active_listings.clone()))?;

        Ok(Self {
            registry,
            listings_submitted,
            listings_rejected,
            listings_verified,
            tickets_sold,
            purchases_rejected,
            active_listings,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the outcome of one marketplace command.
    /// `changed` is false for accepted commands that produced no event.
    pub fn record_command(&self, command: &MarketplaceCommand, outcome: Result<bool, &MarketplaceError>) {
        match (command, outcome) {
            (MarketplaceCommand::SetListingForSale { .. }, Ok(_)) => self.listings_submitted.inc(),
            (MarketplaceCommand::SetListingForSale { .. }, Err(e)) => {
                self.listings_rejected.with_label_values(&[e.kind()]).inc();
            }
            (MarketplaceCommand::VerifyListing { .. }, Ok(true)) => self.listings_verified.inc(),
            (MarketplaceCommand::VerifyListing { .. }, _) => {}
            (MarketplaceCommand::BuyTicket { .. }, Ok(_)) => self.tickets_sold.inc(),
            (MarketplaceCommand::BuyTicket { .. }, Err(e)) => {
                self.purchases_rejected.with_label_values(&[e.kind()]).inc();
            }
        }
    }

    pub fn set_active_listings(&self, count: usize) {
        self.active_listings.set(count as i64);
    }

    /// Prometheus text exposition of everything registered
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
