// ============================================================================
// Marketplace Domain - listing, verification and resale of barcoded tickets
// ============================================================================
//
// - Value objects (Barcode, ids, principals, Money)
// - Services (IdGenerator, Clock)
// - Entities (Ticket, Listing)
// - Events, Commands, Errors
// - Aggregate (Marketplace, the only place cross-listing rules live)
// - Command Handler (journals accepted events)
//
// ============================================================================

pub mod value_objects;
pub mod services;
pub mod ticket;
pub mod listing;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use services::*;
pub use ticket::*;
pub use listing::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
