//! End-to-end marketplace scenarios: listing, verification, purchase and
//! resale of barcoded tickets, driven both directly against the aggregate
//! and through the single-writer actor.
//!
//! Run with: `cargo test --test marketplace_scenarios`

#![allow(clippy::unwrap_used)]

use actix::prelude::*;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use ticket_marketplace::actors::{
    BuyTicket, GetCurrentOwner, GetListingsForSale, GetTicketsByBarcode, MarketplaceActor,
    SetListingForSale, VerifyListing,
};
use ticket_marketplace::domain::marketplace::{
    Admin, Barcode, Buyer, Clock, FixedClock, Listing, ListingId, Marketplace, MarketplaceCommandHandler,
    MarketplaceError, Money, SequentialIdGenerator, Seller, Ticket, TicketFilter, TicketId,
};
use ticket_marketplace::event_sourcing::store::EventStore;

/// Deterministic ids and a controllable clock around an empty marketplace
struct Fixture {
    ids: Arc<SequentialIdGenerator>,
    clock: Arc<FixedClock>,
    marketplace: Marketplace,
}

impl Fixture {
    fn new() -> Self {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
        Self {
            ids: Arc::new(SequentialIdGenerator::new()),
            marketplace: Marketplace::new(Uuid::from_u128(1_000), clock.clone()),
            clock,
        }
    }

    fn ticket(&self, codes: &[&str]) -> Ticket {
        Ticket::new(self.ids.as_ref(), codes.iter().map(|c| Barcode::ean13(*c)).collect()).unwrap()
    }

    fn listing(&self, seller: &str, tickets: Vec<Ticket>) -> Listing {
        Listing::new(self.ids.as_ref(), Seller::new(seller), tickets, Money::eur(4950)).unwrap()
    }

    /// List, verify, and return the listing id plus its ticket ids
    fn list_verified(&mut self, seller: &str, codes: &[&str]) -> (ListingId, Vec<TicketId>) {
        let tickets: Vec<Ticket> = codes.iter().map(|c| self.ticket(&[*c])).collect();
        let ticket_ids = tickets.iter().map(Ticket::id).collect();
        let listing = self.listing(seller, tickets);
        let listing_id = listing.id();

        self.marketplace.set_listing_for_sale(listing).unwrap();
        self.marketplace
            .verify_listing(&Admin::new("Administrator"), listing_id)
            .unwrap();
        (listing_id, ticket_ids)
    }
}

#[test]
fn duplicate_barcodes_across_tickets_reject_the_listing() {
    let fx = Fixture::new();
    let tickets = vec![fx.ticket(&["A"]), fx.ticket(&["A"])];

    let err = Listing::new(fx.ids.as_ref(), Seller::new("Pascal"), tickets, Money::eur(4950)).unwrap_err();

    assert_eq!(err, MarketplaceError::DuplicateBarcodeInListing(Barcode::ean13("A")));
}

#[test]
fn resale_follows_the_ownership_chain() {
    let mut fx = Fixture::new();
    let x = Barcode::ean13("X");

    // Pascal lists, Sarah buys
    let (_, first) = fx.list_verified("Pascal", &["X"]);
    fx.marketplace.buy_ticket(Buyer::new("Sarah"), first[0]).unwrap();

    let history = fx.marketplace.tickets_by_barcode(&x);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].buyer(), Some(&Buyer::new("Sarah")));

    // Sarah resells to Pascal
    fx.clock.advance(Duration::days(1));
    let (_, second) = fx.list_verified("Sarah", &["X"]);
    fx.marketplace.buy_ticket(Buyer::new("Pascal"), second[0]).unwrap();
    assert_eq!(fx.marketplace.current_owner(&x), Some("Pascal"));

    let history = fx.marketplace.tickets_by_barcode(&x);
    assert_eq!(history[0].id(), second[0]);
    assert_eq!(history[1].id(), first[0]);

    // Anyone else is refused
    for seller in ["Sarah", "Tom"] {
        let attempt = fx.listing(seller, vec![fx.ticket(&["X"])]);
        assert_eq!(
            fx.marketplace.set_listing_for_sale(attempt),
            Err(MarketplaceError::NotCurrentOwner(x.clone()))
        );
    }

    let by_owner = fx.listing("Pascal", vec![fx.ticket(&["X"])]);
    assert!(fx.marketplace.set_listing_for_sale(by_owner).is_ok());
}

#[test]
fn active_barcode_cannot_be_listed_twice() {
    let mut fx = Fixture::new();
    let first = fx.listing("Pascal", vec![fx.ticket(&["Y"])]);
    fx.marketplace.set_listing_for_sale(first).unwrap();

    let second = fx.listing("Tom", vec![fx.ticket(&["Z"]), fx.ticket(&["Y"])]);
    let err = fx.marketplace.set_listing_for_sale(second).unwrap_err();

    assert_eq!(err, MarketplaceError::AlreadyForSale(Barcode::ean13("Y")));
    // Nothing of the rejected listing was stored, not even the clean barcode
    assert_eq!(fx.marketplace.listings().len(), 1);
    assert!(!fx.marketplace.has_active_listing_with_barcode(&Barcode::ean13("Z")));
}

#[test]
fn never_sold_barcode_may_be_listed_by_anyone_once_inactive() {
    let mut fx = Fixture::new();
    let fresh = fx.listing("Tom", vec![fx.ticket(&["W"])]);
    assert!(fx.marketplace.set_listing_for_sale(fresh).is_ok());
    assert_eq!(fx.marketplace.current_owner(&Barcode::ean13("W")), Some("Tom"));
}

#[test]
fn purchases_require_a_verified_listing_and_happen_once() {
    let mut fx = Fixture::new();
    let ticket = fx.ticket(&["V"]);
    let ticket_id = ticket.id();
    let listing = fx.listing("Pascal", vec![ticket]);
    let listing_id = listing.id();
    fx.marketplace.set_listing_for_sale(listing).unwrap();

    assert_eq!(
        fx.marketplace.buy_ticket(Buyer::new("Sarah"), ticket_id).unwrap_err(),
        MarketplaceError::TicketNotVerified(ticket_id)
    );
    assert!(!fx.marketplace.ticket(ticket_id).unwrap().is_bought());

    fx.marketplace.verify_listing(&Admin::new("Administrator"), listing_id).unwrap();
    let sold_at = fx.clock.now();
    let ticket = fx.marketplace.buy_ticket(Buyer::new("Sarah"), ticket_id).unwrap();
    assert_eq!(ticket.bought_at(), Some(sold_at));

    fx.clock.advance(Duration::hours(1));
    assert_eq!(
        fx.marketplace.buy_ticket(Buyer::new("William"), ticket_id).unwrap_err(),
        MarketplaceError::AlreadySold(ticket_id)
    );
    let ticket = fx.marketplace.ticket(ticket_id).unwrap();
    assert_eq!(ticket.buyer(), Some(&Buyer::new("Sarah")));
    assert_eq!(ticket.bought_at(), Some(sold_at));

    let missing = TicketId::from_uuid(Uuid::from_u128(u128::MAX));
    assert_eq!(
        fx.marketplace.buy_ticket(Buyer::new("Sarah"), missing).unwrap_err(),
        MarketplaceError::TicketNotFound(missing)
    );
}

#[test]
fn listings_for_sale_drop_sold_out_and_unverified_listings() {
    let mut fx = Fixture::new();
    let (partly_sold, partly_sold_tickets) = fx.list_verified("Pascal", &["P1", "P2"]);
    let (sold_out, sold_out_tickets) = fx.list_verified("Tom", &["S1"]);
    let pending = fx.listing("Sarah", vec![fx.ticket(&["U1"])]);
    let pending_id = pending.id();
    fx.marketplace.set_listing_for_sale(pending).unwrap();

    fx.marketplace.buy_ticket(Buyer::new("Sarah"), partly_sold_tickets[0]).unwrap();
    fx.marketplace.buy_ticket(Buyer::new("Sarah"), sold_out_tickets[0]).unwrap();

    let ids = |listings: Vec<&Listing>| listings.iter().map(|l| l.id()).collect::<Vec<_>>();
    assert_eq!(ids(fx.marketplace.listings_for_sale(false)), vec![partly_sold]);
    assert_eq!(ids(fx.marketplace.listings_for_sale(true)), vec![partly_sold, pending_id]);
    assert_eq!(ids(fx.marketplace.unverified_listings()), vec![pending_id]);
    assert!(!ids(fx.marketplace.listings_for_sale(true)).contains(&sold_out));

    let listing = fx.marketplace.listing(partly_sold).unwrap();
    assert_eq!(listing.tickets(TicketFilter::Sold).len(), 1);
    assert_eq!(listing.tickets(TicketFilter::ForSale)[0].id(), partly_sold_tickets[1]);
}

#[actix::test]
async fn resale_chain_through_the_actor() {
    let ids = Arc::new(SequentialIdGenerator::new());
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let handler = MarketplaceCommandHandler::new(
        Marketplace::new(Uuid::from_u128(2_000), clock.clone()),
        Arc::new(EventStore::new("Marketplace")),
        ids.clone(),
        clock.clone(),
    )
    .unwrap();
    let actor = MarketplaceActor::new(handler).start();
    let admin = Admin::new("Administrator");
    let x = Barcode::ean13("X");

    let sell = |seller: &str| {
        let ticket = Ticket::new(ids.as_ref(), vec![x.clone()]).unwrap();
        let ticket_id = ticket.id();
        let listing = Listing::new(ids.as_ref(), Seller::new(seller), vec![ticket], Money::eur(4950)).unwrap();
        (listing, ticket_id)
    };

    let (listing, ticket_id) = sell("Pascal");
    let listing_id = actor.send(SetListingForSale { listing }).await.unwrap().unwrap();
    actor.send(VerifyListing { admin: admin.clone(), listing_id }).await.unwrap().unwrap();
    actor.send(BuyTicket { buyer: Buyer::new("Sarah"), ticket_id }).await.unwrap().unwrap();

    clock.advance(Duration::minutes(5));
    let (listing, ticket_id) = sell("Sarah");
    let listing_id = actor.send(SetListingForSale { listing }).await.unwrap().unwrap();
    actor.send(VerifyListing { admin, listing_id }).await.unwrap().unwrap();
    let bought = actor
        .send(BuyTicket { buyer: Buyer::new("Pascal"), ticket_id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bought.buyer(), Some(&Buyer::new("Pascal")));

    let owner = actor.send(GetCurrentOwner { barcode: x.clone() }).await.unwrap();
    assert_eq!(owner.as_deref(), Some("Pascal"));

    let (listing, _) = sell("Tom");
    let err = actor.send(SetListingForSale { listing }).await.unwrap().unwrap_err();
    assert_eq!(
        err.downcast_ref::<MarketplaceError>(),
        Some(&MarketplaceError::NotCurrentOwner(x.clone()))
    );

    let history = actor.send(GetTicketsByBarcode { barcode: x }).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id(), ticket_id);
    assert!(actor
        .send(GetListingsForSale { include_unverified: true })
        .await
        .unwrap()
        .is_empty());
}
