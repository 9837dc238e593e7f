use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::event_sourcing::core::Aggregate;
use super::commands::MarketplaceCommand;
use super::errors::MarketplaceError;
use super::events::*;
use super::listing::Listing;
use super::services::Clock;
use super::ticket::Ticket;
use super::value_objects::{Admin, Barcode, Buyer, ListingId, TicketId};

// ============================================================================
// Marketplace Aggregate - owns every listing and every cross-listing rule
// ============================================================================
//
// Invariants enforced here (they need the full barcode history):
// - a barcode is in at most one unbought ticket at a time
// - only the current owner of a barcode may list it again
// - a ticket is sold at most once, and only from a verified listing
//
// Listings are append-only. Tickets change only through applied events.
//
// ============================================================================

/// Position of a ticket inside the listing sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TicketLocation {
    listing: usize,
    ticket: usize,
}

#[derive(Clone)]
pub struct Marketplace {
    id: Uuid,
    version: i64,
    listings: Vec<Listing>,

    // Indexes, rebuilt from events
    listing_index: HashMap<ListingId, usize>,
    ticket_index: HashMap<TicketId, TicketLocation>,
    barcode_index: HashMap<Barcode, Vec<TicketLocation>>,

    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marketplace")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("listings", &self.listings)
            .finish_non_exhaustive()
    }
}

impl Marketplace {
    pub fn new(id: Uuid, clock: Arc<dyn Clock>) -> Self {
        Self {
            id,
            version: 0,
            listings: Vec::new(),
            listing_index: HashMap::new(),
            ticket_index: HashMap::new(),
            barcode_index: HashMap::new(),
            clock,
        }
    }

    /// Seed a marketplace. Each listing goes through the same checks as
    /// `set_listing_for_sale`, in order.
    pub fn with_listings(
        id: Uuid,
        clock: Arc<dyn Clock>,
        listings: impl IntoIterator<Item = Listing>,
    ) -> Result<Self, MarketplaceError> {
        let mut marketplace = Self::new(id, clock);
        for listing in listings {
            marketplace.set_listing_for_sale(listing)?;
        }
        Ok(marketplace)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn listing(&self, listing_id: ListingId) -> Option<&Listing> {
        self.listing_index.get(&listing_id).map(|&i| &self.listings[i])
    }

    pub fn ticket(&self, ticket_id: TicketId) -> Option<&Ticket> {
        self.ticket_index.get(&ticket_id).map(|&loc| self.ticket_at(loc))
    }

    /// Listings with at least one unbought ticket, in insertion order.
    /// Unverified listings are skipped unless asked for.
    pub fn listings_for_sale(&self, include_unverified: bool) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|l| include_unverified || l.is_verified())
            .filter(|l| l.is_for_sale())
            .collect()
    }

    /// The admin work queue: listings still for sale that nobody verified yet.
    pub fn unverified_listings(&self) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|l| !l.is_verified() && l.is_for_sale())
            .collect()
    }

    /// True while some unbought ticket carries the barcode
    pub fn has_active_listing_with_barcode(&self, barcode: &Barcode) -> bool {
        self.barcode_index
            .get(barcode)
            .is_some_and(|locs| locs.iter().any(|&loc| !self.ticket_at(loc).is_bought()))
    }

    /// Every ticket that ever carried the barcode, most recent sale first.
    ///
    /// Sales at the same instant put the later listed ticket first; unbought
    /// tickets come last in insertion order.
    pub fn tickets_by_barcode(&self, barcode: &Barcode) -> Vec<&Ticket> {
        let mut located: Vec<(TicketLocation, &Ticket)> = self
            .barcode_index
            .get(barcode)
            .map(|locs| locs.iter().map(|&loc| (loc, self.ticket_at(loc))).collect())
            .unwrap_or_default();

        located.sort_by(|(loc_a, a), (loc_b, b)| match (a.bought_at(), b.bought_at()) {
            (Some(at_a), Some(at_b)) => at_b.cmp(&at_a).then_with(|| loc_b.cmp(loc_a)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => loc_a.cmp(loc_b),
        });

        located.into_iter().map(|(_, t)| t).collect()
    }

    /// Who may list the barcode next: the buyer of its latest sale, or the
    /// seller who first listed it if it never sold.
    pub fn current_owner(&self, barcode: &Barcode) -> Option<&str> {
        let locs = self.barcode_index.get(barcode)?;

        if let Some(buyer) = self.tickets_by_barcode(barcode).first().and_then(|t| t.buyer()) {
            return Some(buyer.name());
        }

        locs.first()
            .map(|loc| self.listings[loc.listing].seller().name())
    }

    fn ticket_at(&self, loc: TicketLocation) -> &Ticket {
        &self.listings[loc.listing].all_tickets()[loc.ticket]
    }

    // ------------------------------------------------------------------------
    // Mutations - each one is a command run through `execute`
    // ------------------------------------------------------------------------

    /// Offer a listing. Either every barcode passes and the listing is
    /// stored, or nothing changes.
    pub fn set_listing_for_sale(&mut self, listing: Listing) -> Result<(), MarketplaceError> {
        self.execute(MarketplaceCommand::SetListingForSale { listing })?;
        Ok(())
    }

    pub fn verify_listing(
        &mut self,
        admin: &Admin,
        listing_id: ListingId,
    ) -> Result<&Listing, MarketplaceError> {
        self.execute(MarketplaceCommand::VerifyListing {
            admin: admin.clone(),
            listing_id,
        })?;

        self.listing(listing_id)
            .ok_or(MarketplaceError::ListingNotFound(listing_id))
    }

    pub fn buy_ticket(&mut self, buyer: Buyer, ticket_id: TicketId) -> Result<&Ticket, MarketplaceError> {
        self.execute(MarketplaceCommand::BuyTicket { buyer, ticket_id })?;

        self.ticket(ticket_id)
            .ok_or(MarketplaceError::TicketNotFound(ticket_id))
    }

    /// Validate, then apply. Returns the events that were applied.
    pub fn execute(&mut self, command: MarketplaceCommand) -> Result<Vec<MarketplaceEvent>, MarketplaceError> {
        let events = self.decide(&command)?;
        self.commit(&events)?;
        Ok(events)
    }

    /// `handle_command` plus a log line for rejections
    pub(crate) fn decide(&self, command: &MarketplaceCommand) -> Result<Vec<MarketplaceEvent>, MarketplaceError> {
        self.handle_command(command).inspect_err(|e| {
            tracing::warn!(
                command = command.name(),
                reason = e.kind(),
                error = %e,
                "Marketplace command rejected"
            );
        })
    }

    /// Apply events produced by `decide` against this same state
    pub(crate) fn commit(&mut self, events: &[MarketplaceEvent]) -> Result<(), MarketplaceError> {
        for event in events {
            self.apply_event(event)?;
            tracing::info!(
                marketplace_id = %self.id,
                event_type = event.name(),
                version = self.version,
                "Applied marketplace event"
            );
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    fn validate_new_listing(&self, listing: &Listing) -> Result<(), MarketplaceError> {
        if self.listing_index.contains_key(&listing.id()) {
            return Err(MarketplaceError::DuplicateListing(listing.id()));
        }

        for ticket in listing.all_tickets() {
            if self.ticket_index.contains_key(&ticket.id()) {
                return Err(MarketplaceError::DuplicateTicketId(ticket.id()));
            }

            for barcode in ticket.barcodes() {
                if self.has_active_listing_with_barcode(barcode) {
                    return Err(MarketplaceError::AlreadyForSale(barcode.clone()));
                }

                // Past the check above every ticket with this barcode is bought,
                // so the head of the history is the latest sale.
                let last_buyer = self
                    .tickets_by_barcode(barcode)
                    .first()
                    .and_then(|t| t.buyer());
                if let Some(buyer) = last_buyer {
                    if buyer != listing.seller() {
                        return Err(MarketplaceError::NotCurrentOwner(barcode.clone()));
                    }
                }
            }
        }

        Ok(())
    }

    fn locate_listing(&self, listing_id: ListingId) -> Result<usize, MarketplaceError> {
        self.listing_index
            .get(&listing_id)
            .copied()
            .ok_or(MarketplaceError::ListingNotFound(listing_id))
    }

    fn locate_ticket(&self, ticket_id: TicketId) -> Result<TicketLocation, MarketplaceError> {
        self.ticket_index
            .get(&ticket_id)
            .copied()
            .ok_or(MarketplaceError::TicketNotFound(ticket_id))
    }

    fn index_listing(&mut self, listing: &Listing, position: usize) {
        self.listing_index.insert(listing.id(), position);

        for (ticket_pos, ticket) in listing.all_tickets().iter().enumerate() {
            let loc = TicketLocation {
                listing: position,
                ticket: ticket_pos,
            };
            self.ticket_index.insert(ticket.id(), loc);
            for barcode in ticket.barcodes() {
                self.barcode_index.entry(barcode.clone()).or_default().push(loc);
            }
        }
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for Marketplace {
    type Event = MarketplaceEvent;
    type Command = MarketplaceCommand;
    type Error = MarketplaceError;

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            MarketplaceEvent::ListingSetForSale(e) => {
                self.validate_new_listing(&e.listing)?;
                let position = self.listings.len();
                self.index_listing(&e.listing, position);
                self.listings.push(e.listing.clone());
            }
            MarketplaceEvent::ListingVerified(e) => {
                let position = self.locate_listing(e.listing_id)?;
                self.listings[position].verify(&e.verified_by);
            }
            MarketplaceEvent::TicketBought(e) => {
                let loc = self.locate_ticket(e.ticket_id)?;
                if !self.listings[loc.listing].is_verified() {
                    return Err(MarketplaceError::TicketNotVerified(e.ticket_id));
                }
                let ticket = self.listings[loc.listing]
                    .ticket_at_mut(loc.ticket)
                    .ok_or(MarketplaceError::TicketNotFound(e.ticket_id))?;
                ticket.buy(e.buyer.clone(), e.bought_at)?;
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            MarketplaceCommand::SetListingForSale { listing } => {
                self.validate_new_listing(listing)?;

                Ok(vec![MarketplaceEvent::ListingSetForSale(ListingSetForSale {
                    listing: listing.clone(),
                })])
            }

            MarketplaceCommand::VerifyListing { admin, listing_id } => {
                let position = self.locate_listing(*listing_id)?;

                if self.listings[position].is_verified() {
                    return Ok(vec![]); // No change
                }

                Ok(vec![MarketplaceEvent::ListingVerified(ListingVerified {
                    listing_id: *listing_id,
                    verified_by: admin.clone(),
                })])
            }

            MarketplaceCommand::BuyTicket { buyer, ticket_id } => {
                let loc = self.locate_ticket(*ticket_id)?;
                let listing = &self.listings[loc.listing];

                if self.ticket_at(loc).is_bought() {
                    return Err(MarketplaceError::AlreadySold(*ticket_id));
                }
                if !listing.is_verified() {
                    return Err(MarketplaceError::TicketNotVerified(*ticket_id));
                }

                Ok(vec![MarketplaceEvent::TicketBought(TicketBought {
                    listing_id: listing.id(),
                    ticket_id: *ticket_id,
                    buyer: buyer.clone(),
                    bought_at: self.clock.now(),
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
