use actix::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::marketplace::{
    Admin, Barcode, Buyer, Listing, ListingId, MarketplaceCommand, MarketplaceCommandHandler,
    MarketplaceError, Ticket, TicketId,
};
use crate::metrics::Metrics;

// ============================================================================
// Actor Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "anyhow::Result<ListingId>")]
pub struct SetListingForSale {
    pub listing: Listing,
}

#[derive(Message)]
#[rtype(result = "anyhow::Result<()>")]
pub struct VerifyListing {
    pub admin: Admin,
    pub listing_id: ListingId,
}

#[derive(Message)]
#[rtype(result = "anyhow::Result<Ticket>")]
pub struct BuyTicket {
    pub buyer: Buyer,
    pub ticket_id: TicketId,
}

#[derive(Message)]
#[rtype(result = "Vec<Listing>")]
pub struct GetListingsForSale {
    pub include_unverified: bool,
}

#[derive(Message)]
#[rtype(result = "Vec<Listing>")]
pub struct GetUnverifiedListings;

#[derive(Message)]
#[rtype(result = "Vec<Ticket>")]
pub struct GetTicketsByBarcode {
    pub barcode: Barcode,
}

#[derive(Message)]
#[rtype(result = "Option<String>")]
pub struct GetCurrentOwner {
    pub barcode: Barcode,
}

// ============================================================================
// Marketplace Actor - single writer for the marketplace aggregate
// ============================================================================
//
// Every listing and purchase is a read-validate-write sequence. Routing them
// all through one mailbox means no other mutation can land between the
// check and the write.
//
// ============================================================================

pub struct MarketplaceActor {
    handler: MarketplaceCommandHandler,
    metrics: Option<Arc<Metrics>>,
}

impl MarketplaceActor {
    pub fn new(handler: MarketplaceCommandHandler) -> Self {
        Self {
            handler,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn dispatch(&mut self, command: MarketplaceCommand) -> anyhow::Result<bool> {
        let correlation_id = Uuid::new_v4();
        let result = self.handler.handle(command.clone(), correlation_id);

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(events) => metrics.record_command(&command, Ok(!events.is_empty())),
                Err(e) => {
                    if let Some(rejection) = e.downcast_ref::<MarketplaceError>() {
                        metrics.record_command(&command, Err(rejection));
                    }
                }
            }
            metrics.set_active_listings(self.handler.marketplace().listings_for_sale(true).len());
        }

        result.map(|events| !events.is_empty())
    }
}

impl Actor for MarketplaceActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            listings = self.handler.marketplace().listings().len(),
            "MarketplaceActor started"
        );
    }
}

impl Handler<SetListingForSale> for MarketplaceActor {
    type Result = anyhow::Result<ListingId>;

    fn handle(&mut self, msg: SetListingForSale, _ctx: &mut Self::Context) -> Self::Result {
        let listing_id = msg.listing.id();
        self.dispatch(MarketplaceCommand::SetListingForSale { listing: msg.listing })?;
        Ok(listing_id)
    }
}

impl Handler<VerifyListing> for MarketplaceActor {
    type Result = anyhow::Result<()>;

    fn handle(&mut self, msg: VerifyListing, _ctx: &mut Self::Context) -> Self::Result {
        self.dispatch(MarketplaceCommand::VerifyListing {
            admin: msg.admin,
            listing_id: msg.listing_id,
        })?;
        Ok(())
    }
}

impl Handler<BuyTicket> for MarketplaceActor {
    type Result = anyhow::Result<Ticket>;

    fn handle(&mut self, msg: BuyTicket, _ctx: &mut Self::Context) -> Self::Result {
        let ticket_id = msg.ticket_id;
        self.dispatch(MarketplaceCommand::BuyTicket {
            buyer: msg.buyer,
            ticket_id,
        })?;

        self.handler
            .marketplace()
            .ticket(ticket_id)
            .cloned()
            .ok_or_else(|| MarketplaceError::TicketNotFound(ticket_id).into())
    }
}

impl Handler<GetListingsForSale> for MarketplaceActor {
    type Result = MessageResult<GetListingsForSale>;

    fn handle(&mut self, msg: GetListingsForSale, _ctx: &mut Self::Context) -> Self::Result {
        let listings = self
            .handler
            .marketplace()
            .listings_for_sale(msg.include_unverified)
            .into_iter()
            .cloned()
            .collect();
        MessageResult(listings)
    }
}

impl Handler<GetUnverifiedListings> for MarketplaceActor {
    type Result = MessageResult<GetUnverifiedListings>;

    fn handle(&mut self, _msg: GetUnverifiedListings, _ctx: &mut Self::Context) -> Self::Result {
        let listings = self
            .handler
            .marketplace()
            .unverified_listings()
            .into_iter()
            .cloned()
            .collect();
        MessageResult(listings)
    }
}

impl Handler<GetTicketsByBarcode> for MarketplaceActor {
    type Result = MessageResult<GetTicketsByBarcode>;

    fn handle(&mut self, msg: GetTicketsByBarcode, _ctx: &mut Self::Context) -> Self::Result {
        let tickets = self
            .handler
            .marketplace()
            .tickets_by_barcode(&msg.barcode)
            .into_iter()
            .cloned()
            .collect();
        MessageResult(tickets)
    }
}

impl Handler<GetCurrentOwner> for MarketplaceActor {
    type Result = Option<String>;

    fn handle(&mut self, msg: GetCurrentOwner, _ctx: &mut Self::Context) -> Self::Result {
        self.handler
            .marketplace()
            .current_owner(&msg.barcode)
            .map(str::to_string)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
