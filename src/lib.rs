// ============================================================================
// Ticket Marketplace
// ============================================================================
//
// Secondary marketplace for barcoded event tickets. Sellers list tickets,
// administrators verify listings, buyers purchase individual tickets, and a
// barcode can never be for sale twice or resold by someone who no longer
// owns it.
//
// - domain/          - Marketplace aggregate, entities, events and commands
// - event_sourcing/  - Aggregate trait, event envelopes, in-memory event store
// - actors/          - Single-writer actor serializing marketplace commands
// - metrics/         - Prometheus counters for accepted and rejected commands
// - config           - Environment-driven runtime settings
//
// ============================================================================

pub mod actors;
pub mod config;
pub mod domain;
pub mod event_sourcing;
pub mod metrics;
