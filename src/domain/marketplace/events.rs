use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event_sourcing::core::DomainEvent;
use super::listing::Listing;
use super::value_objects::{Admin, Buyer, ListingId, TicketId};

// ============================================================================
// Marketplace Events - facts the aggregate has accepted
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MarketplaceEvent {
    ListingSetForSale(ListingSetForSale),
    ListingVerified(ListingVerified),
    TicketBought(TicketBought),
}

impl MarketplaceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListingSetForSale(_) => ListingSetForSale::event_type(),
            Self::ListingVerified(_) => ListingVerified::event_type(),
            Self::TicketBought(_) => TicketBought::event_type(),
        }
    }
}

impl DomainEvent for MarketplaceEvent {
    fn event_type() -> &'static str { "MarketplaceEvent" }
}

/// A listing passed every cross-listing check and joined the marketplace
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ListingSetForSale {
    pub listing: Listing,
}

impl DomainEvent for ListingSetForSale {
    fn event_type() -> &'static str { "ListingSetForSale" }
    fn event_version() -> i32 { 1 }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ListingVerified {
    pub listing_id: ListingId,
    pub verified_by: Admin,
}

impl DomainEvent for ListingVerified {
    fn event_type() -> &'static str { "ListingVerified" }
    fn event_version() -> i32 { 1 }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TicketBought {
    pub listing_id: ListingId,
    pub ticket_id: TicketId,
    pub buyer: Buyer,
    pub bought_at: DateTime<Utc>,
}

impl DomainEvent for TicketBought {
    fn event_type() -> &'static str { "TicketBought" }
    fn event_version() -> i32 { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::marketplace::services::SequentialIdGenerator;
    use crate::domain::marketplace::ticket::Ticket;
    use crate::domain::marketplace::value_objects::{Barcode, Money, Seller};
    use crate::event_sourcing::core::{deserialize_event, serialize_event};

    fn events() -> Vec<MarketplaceEvent> {
        let ids = SequentialIdGenerator::new();
        let ticket = Ticket::new(&ids, vec![Barcode::ean13("38974312923")]).unwrap();
        let ticket_id = ticket.id();
        let listing = Listing::new(&ids, Seller::new("Pascal"), vec![ticket], Money::eur(4950)).unwrap();
        let listing_id = listing.id();

        vec![
            MarketplaceEvent::ListingSetForSale(ListingSetForSale { listing }),
            MarketplaceEvent::ListingVerified(ListingVerified {
                listing_id,
                verified_by: Admin::new("Administrator"),
            }),
            MarketplaceEvent::TicketBought(TicketBought {
                listing_id,
                ticket_id,
                buyer: Buyer::new("Sarah"),
                bought_at: Utc::now(),
            }),
        ]
    }

    #[test]
    fn test_events_json_round_trip() {
        for event in events() {
            let json = serialize_event(&event).unwrap();

            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["type"], event.name());
            assert!(value["data"].is_object());

            let back: MarketplaceEvent = deserialize_event(&json).unwrap();
            assert_eq!(back, event);
        }
    }

    #[test]
    fn test_ticket_bought_payload_fields() {
        let bought = events().pop().unwrap();
        let value = serde_json::to_value(&bought).unwrap();

        assert_eq!(value["data"]["buyer"], "Sarah");
        assert!(value["data"]["bought_at"].is_string());
    }
}
