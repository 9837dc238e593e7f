use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::MarketplaceError;
use super::services::IdGenerator;
use super::ticket::Ticket;
use super::value_objects::{Admin, ListingId, Money, Seller, TicketFilter};

// ============================================================================
// Listing - a seller's offer of a set of tickets at a price
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ListingRecord")]
pub struct Listing {
    id: ListingId,
    seller: Seller,
    tickets: Vec<Ticket>,
    price: Money,
    verified_by: Option<Admin>,
}

#[derive(Deserialize)]
struct ListingRecord {
    id: ListingId,
    seller: Seller,
    tickets: Vec<Ticket>,
    price: Money,
    verified_by: Option<Admin>,
}

impl TryFrom<ListingRecord> for Listing {
    type Error = MarketplaceError;

    fn try_from(record: ListingRecord) -> Result<Self, Self::Error> {
        Self::validate_tickets(&record.tickets)?;

        Ok(Self {
            id: record.id,
            seller: record.seller,
            tickets: record.tickets,
            price: record.price,
            verified_by: record.verified_by,
        })
    }
}

impl Listing {
    /// Build a listing. Fails if any barcode shows up twice across the
    /// tickets; the first repeat in ticket-then-barcode order is reported.
    pub fn new(
        ids: &dyn IdGenerator,
        seller: Seller,
        tickets: Vec<Ticket>,
        price: Money,
    ) -> Result<Self, MarketplaceError> {
        Self::validate_tickets(&tickets)?;

        Ok(Self {
            id: ListingId::from_uuid(ids.next_id()),
            seller,
            tickets,
            price,
            verified_by: None,
        })
    }

    fn validate_tickets(tickets: &[Ticket]) -> Result<(), MarketplaceError> {
        if tickets.is_empty() {
            return Err(MarketplaceError::EmptyListing);
        }

        let mut seen = HashSet::new();
        for barcode in tickets.iter().flat_map(Ticket::barcodes) {
            if !seen.insert(barcode) {
                return Err(MarketplaceError::DuplicateBarcodeInListing(barcode.clone()));
            }
        }

        Ok(())
    }

    pub fn id(&self) -> ListingId {
        self.id
    }

    pub fn seller(&self) -> &Seller {
        &self.seller
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    /// Mark the listing as checked by an administrator. There is no way back.
    pub fn verify(&mut self, admin: &Admin) {
        if self.verified_by.is_none() {
            self.verified_by = Some(admin.clone());
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verified_by.is_some()
    }

    pub fn verified_by(&self) -> Option<&Admin> {
        self.verified_by.as_ref()
    }

    /// Tickets in listing order, optionally narrowed by sale state.
    pub fn tickets(&self, filter: TicketFilter) -> Vec<&Ticket> {
        self.tickets
            .iter()
            .filter(|t| match filter {
                TicketFilter::All => true,
                TicketFilter::ForSale => !t.is_bought(),
                TicketFilter::Sold => t.is_bought(),
            })
            .collect()
    }

    pub fn all_tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// A listing stays for sale until its last ticket is bought.
    pub fn is_for_sale(&self) -> bool {
        self.tickets.iter().any(|t| !t.is_bought())
    }

    pub(crate) fn ticket_at_mut(&mut self, index: usize) -> Option<&mut Ticket> {
        self.tickets.get_mut(index)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
