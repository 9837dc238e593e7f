use actix::prelude::*;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticket_marketplace::actors::{
    BuyTicket, GetCurrentOwner, GetListingsForSale, GetTicketsByBarcode, MarketplaceActor,
    SetListingForSale, VerifyListing,
};
use ticket_marketplace::config::Config;
use ticket_marketplace::domain::marketplace::{
    Admin, Barcode, Buyer, Clock, IdGenerator, Listing, Marketplace, MarketplaceCommandHandler,
    MarketplaceError, Money, RandomIdGenerator, Seller, SystemClock, Ticket,
};
use ticket_marketplace::event_sourcing::store::EventStore;
use ticket_marketplace::metrics::Metrics;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // RUST_LOG wins over MARKETPLACE_LOG_FILTER when both are set
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(config.logging.thread_ids))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    tracing::info!("Starting ticket marketplace demo");

    // === 1. Wire services ===
    let ids: Arc<dyn IdGenerator> = Arc::new(RandomIdGenerator);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let event_store = Arc::new(EventStore::new("Marketplace"));
    let marketplace_id = ids.next_id();
    let marketplace = Marketplace::new(marketplace_id, clock.clone());
    let mut handler =
        MarketplaceCommandHandler::new(marketplace, event_store.clone(), ids.clone(), clock)?;

    // Opening stock, journaled like any other listing
    let opening = Listing::new(
        ids.as_ref(),
        Seller::new("Tom"),
        vec![Ticket::new(ids.as_ref(), vec![Barcode::ean13("18974412925")])?],
        Money::eur(3950),
    )?;
    handler.seed(vec![opening], ids.next_id())?;

    let mut actor = MarketplaceActor::new(handler);
    let metrics = if config.metrics_enabled {
        let metrics = Arc::new(Metrics::new()?);
        actor = actor.with_metrics(metrics.clone());
        Some(metrics)
    } else {
        None
    };
    let marketplace = actor.start();
    let admin = Admin::new(config.admin_name.as_str());

    // === 2. Pascal lists a ticket, it gets verified, Sarah buys it ===
    let barcode = Barcode::ean13("38974312923");
    let ticket = Ticket::new(ids.as_ref(), vec![barcode.clone()])?;
    let ticket_id = ticket.id();
    let listing = Listing::new(ids.as_ref(), Seller::new("Pascal"), vec![ticket], Money::eur(4950))?;

    let listing_id = marketplace.send(SetListingForSale { listing }).await??;
    marketplace
        .send(VerifyListing { admin: admin.clone(), listing_id })
        .await??;
    let bought = marketplace
        .send(BuyTicket { buyer: Buyer::new("Sarah"), ticket_id })
        .await??;
    tracing::info!(ticket_id = %bought.id(), buyer = ?bought.buyer(), "Ticket sold");

    // === 3. Pascal no longer owns the barcode ===
    let relist = Listing::new(
        ids.as_ref(),
        Seller::new("Pascal"),
        vec![Ticket::new(ids.as_ref(), vec![barcode.clone()])?],
        Money::eur(5950),
    )?;
    match marketplace.send(SetListingForSale { listing: relist }).await? {
        Ok(id) => tracing::warn!(listing_id = %id, "Unexpectedly accepted resale by previous owner"),
        Err(e) => match e.downcast_ref::<MarketplaceError>() {
            Some(rejection) => tracing::info!(reason = rejection.kind(), "Resale refused: {}", rejection),
            None => return Err(e),
        },
    }

    // === 4. Sarah resells it ===
    let resale = Listing::new(
        ids.as_ref(),
        Seller::new("Sarah"),
        vec![Ticket::new(ids.as_ref(), vec![barcode.clone()])?],
        Money::eur(5950),
    )?;
    let resale_id = marketplace.send(SetListingForSale { listing: resale }).await??;
    marketplace
        .send(VerifyListing { admin, listing_id: resale_id })
        .await??;

    let for_sale = marketplace.send(GetListingsForSale { include_unverified: false }).await?;
    let history = marketplace.send(GetTicketsByBarcode { barcode: barcode.clone() }).await?;
    let owner = marketplace.send(GetCurrentOwner { barcode: barcode.clone() }).await?;
    tracing::info!(
        barcode = %barcode,
        listings_for_sale = for_sale.len(),
        history = history.len(),
        owner = owner.as_deref().unwrap_or("-"),
        "Marketplace state"
    );

    let journal = event_store.load_events(marketplace_id)?;
    tracing::info!(events = journal.len(), "Journal length");

    if let Some(metrics) = metrics {
        println!("{}", metrics.render()?);
    }

    tracing::info!("Demo complete");
    Ok(())
}
