use super::value_objects::{Barcode, ListingId, TicketId};

// ============================================================================
// Marketplace Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketplaceError {
    #[error("This listing contains the same barcode multiple times: {0}")]
    DuplicateBarcodeInListing(Barcode),

    #[error("This ticket contains the same barcode multiple times: {0}")]
    DuplicateBarcodeInTicket(Barcode),

    #[error("A ticket must carry at least one barcode")]
    TicketWithoutBarcodes,

    #[error("A listing must contain at least one ticket")]
    EmptyListing,

    #[error("This listing contains a barcode that is already for sale: {0}")]
    AlreadyForSale(Barcode),

    #[error("This listing contains a barcode that was last bought by someone else: {0}")]
    NotCurrentOwner(Barcode),

    #[error("The given ticket has already been sold: {0}")]
    AlreadySold(TicketId),

    #[error("This ticket has not been verified by an administrator: {0}")]
    TicketNotVerified(TicketId),

    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    #[error("Listing not found: {0}")]
    ListingNotFound(ListingId),

    #[error("Listing is already part of the marketplace: {0}")]
    DuplicateListing(ListingId),

    #[error("Ticket id is already part of the marketplace: {0}")]
    DuplicateTicketId(TicketId),
}

impl MarketplaceError {
    /// Stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateBarcodeInListing(_) => "duplicate_barcode_in_listing",
            Self::DuplicateBarcodeInTicket(_) => "duplicate_barcode_in_ticket",
            Self::TicketWithoutBarcodes => "ticket_without_barcodes",
            Self::EmptyListing => "empty_listing",
            Self::AlreadyForSale(_) => "already_for_sale",
            Self::NotCurrentOwner(_) => "not_current_owner",
            Self::AlreadySold(_) => "already_sold",
            Self::TicketNotVerified(_) => "ticket_not_verified",
            Self::TicketNotFound(_) => "ticket_not_found",
            Self::ListingNotFound(_) => "listing_not_found",
            Self::DuplicateListing(_) => "duplicate_listing",
            Self::DuplicateTicketId(_) => "duplicate_ticket_id",
        }
    }
}
