use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::MarketplaceError;
use super::services::IdGenerator;
use super::value_objects::{Barcode, Buyer, TicketId};

// ============================================================================
// Ticket - a sellable unit carrying one or more barcodes
// ============================================================================

/// Record of the single sale of a ticket. Buyer and timestamp travel
/// together, so a ticket can never be half-bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub buyer: Buyer,
    pub bought_at: DateTime<Utc>,
}

/// Deserialized tickets pass the same barcode checks as `Ticket::new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TicketRecord")]
pub struct Ticket {
    id: TicketId,
    barcodes: Vec<Barcode>,
    sale: Option<Sale>,
}

#[derive(Deserialize)]
struct TicketRecord {
    id: TicketId,
    barcodes: Vec<Barcode>,
    sale: Option<Sale>,
}

impl TryFrom<TicketRecord> for Ticket {
    type Error = MarketplaceError;

    fn try_from(record: TicketRecord) -> Result<Self, Self::Error> {
        Self::validate_barcodes(&record.barcodes)?;

        Ok(Self {
            id: record.id,
            barcodes: record.barcodes,
            sale: record.sale,
        })
    }
}

impl Ticket {
    /// Create an unbought ticket.
    ///
    /// A multi-entry pass bundles several barcodes; they must be distinct.
    pub fn new(ids: &dyn IdGenerator, barcodes: Vec<Barcode>) -> Result<Self, MarketplaceError> {
        Self::validate_barcodes(&barcodes)?;

        Ok(Self {
            id: TicketId::from_uuid(ids.next_id()),
            barcodes,
            sale: None,
        })
    }

    /// Create a ticket that already has a sale on record.
    pub fn sold(
        ids: &dyn IdGenerator,
        barcodes: Vec<Barcode>,
        buyer: Buyer,
        bought_at: DateTime<Utc>,
    ) -> Result<Self, MarketplaceError> {
        let mut ticket = Self::new(ids, barcodes)?;
        ticket.sale = Some(Sale { buyer, bought_at });
        Ok(ticket)
    }

    fn validate_barcodes(barcodes: &[Barcode]) -> Result<(), MarketplaceError> {
        if barcodes.is_empty() {
            return Err(MarketplaceError::TicketWithoutBarcodes);
        }

        let mut seen = HashSet::with_capacity(barcodes.len());
        for barcode in barcodes {
            if !seen.insert(barcode) {
                return Err(MarketplaceError::DuplicateBarcodeInTicket(barcode.clone()));
            }
        }

        Ok(())
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn barcodes(&self) -> &[Barcode] {
        &self.barcodes
    }

    pub fn is_bought(&self) -> bool {
        self.sale.is_some()
    }

    pub fn buyer(&self) -> Option<&Buyer> {
        self.sale.as_ref().map(|s| &s.buyer)
    }

    pub fn bought_at(&self) -> Option<DateTime<Utc>> {
        self.sale.as_ref().map(|s| s.bought_at)
    }

    pub fn sale(&self) -> Option<&Sale> {
        self.sale.as_ref()
    }

    /// Irreversible unbought -> bought transition.
    ///
    /// Only the marketplace calls this, after it has run its own checks.
    pub(crate) fn buy(
        &mut self,
        buyer: Buyer,
        bought_at: DateTime<Utc>,
    ) -> Result<&mut Self, MarketplaceError> {
        if self.is_bought() {
            return Err(MarketplaceError::AlreadySold(self.id));
        }

        self.sale = Some(Sale { buyer, bought_at });
        Ok(self)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
