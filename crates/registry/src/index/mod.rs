//! Snapshot and publication machinery for the handler registry.
//!
//! # Mental Model
//!
//! 1. **Build:** [`RuntimeRegistry::create`] inserts every handler by id, then
//!    derives relation indices for each data-source-bearing handler. The two
//!    passes let a data source reference another that appears later.
//! 2. **Extension:** [`RuntimeRegistry::extend`] copies the receiver's maps,
//!    overlays the new handlers (last write wins per id) and re-derives
//!    relations for the data sources it touched. Per-data-source relation maps
//!    are shared through `Arc`, so untouched data sources cost one pointer copy.
//! 3. **Publication:** [`SharedRegistry`] holds the current snapshot in an
//!    `ArcSwap`. Writers serialize on a mutex and publish with one atomic store.
//!
//! # Invariants
//!
//! - A snapshot is never mutated after construction.
//!   - Tested by: `invariants::extend_is_non_destructive`
//! - Last write wins per id across any sequence of extensions.
//!   - Tested by: `invariants::extend_sequence_visibility`
//! - Relation lookups report an unknown data source before an unknown relation.
//!   - Tested by: `tests::unknown_data_source_precedes_unknown_relation`
//! - Concurrent extensions through [`SharedRegistry`] are never lost.
//!   - Tested by: `tests::concurrent_extensions_are_not_lost`

mod derive;
mod shared;
mod snapshot;

use rustc_hash::FxHashMap;

pub use derive::DerivedRelations;
pub use shared::SharedRegistry;
pub use snapshot::RuntimeRegistry;

/// Relations of one data source, keyed by field name.
pub type FieldIndex<R> = FxHashMap<bindery_primitives::FieldName, R>;

#[cfg(test)]
mod invariants;
#[cfg(test)]
pub(crate) mod test_fixtures;
