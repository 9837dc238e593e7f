// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic pieces used by the domain layer in src/domain/.
//
// ============================================================================

pub mod core;
pub mod store;

pub use self::core::*;
pub use self::store::*;
