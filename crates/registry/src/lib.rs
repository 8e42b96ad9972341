//! Handler registry with derived relation indices.
//!
//! [`RuntimeRegistry`] is an immutable snapshot of every known handler plus
//! two indices derived from data-source definitions: foreign-key relations
//! and import-from relations, both keyed by `(data source id, field name)`.
//! Extending a snapshot produces a new one; [`SharedRegistry`] publishes
//! snapshots atomically so readers never block and never see a partial build.

pub mod config;
pub mod error;
pub mod index;
pub mod relation;

pub use config::{Catalog, ConfigError, DataSourceConfig, HandlerConfig};
pub use error::{LookupError, RegistryError, RelationError};
pub use index::{DerivedRelations, FieldIndex, RuntimeRegistry, SharedRegistry};
pub use relation::{
	DataSourceLookup, DefaultRelationBuilder, ForeignKeyRelation, ImportFromRelation, RelationBuilder,
	RelationKind,
};
