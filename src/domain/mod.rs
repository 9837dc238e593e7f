// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Value objects, entities, events, commands, errors, the aggregate itself
// and its command handler live together under the aggregate's directory.
//
// This layer does not depend on actors or metrics.
//
// ============================================================================

pub mod marketplace;
