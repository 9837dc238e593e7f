// ============================================================================
// Actors Module
// ============================================================================
//
// The marketplace aggregate is owned by exactly one actor. Its mailbox is the
// serialization point for every command, so concurrent callers never observe
// or act on a half-applied check.
//
// ============================================================================

mod marketplace_actor;

pub use marketplace_actor::{
    BuyTicket, GetCurrentOwner, GetListingsForSale, GetTicketsByBarcode, GetUnverifiedListings,
    MarketplaceActor, SetListingForSale, VerifyListing,
};
