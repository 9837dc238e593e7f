use super::listing::Listing;
use super::value_objects::{Admin, Buyer, ListingId, TicketId};

// ============================================================================
// Marketplace Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum MarketplaceCommand {
    SetListingForSale {
        listing: Listing,
    },
    VerifyListing {
        admin: Admin,
        listing_id: ListingId,
    },
    BuyTicket {
        buyer: Buyer,
        ticket_id: TicketId,
    },
}

impl MarketplaceCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetListingForSale { .. } => "SetListingForSale",
            Self::VerifyListing { .. } => "VerifyListing",
            Self::BuyTicket { .. } => "BuyTicket",
        }
    }
}
