//! Relation descriptors and the builder that computes them from field metadata.

use bindery_primitives::{
	DataSourceDef, DataSourceId, FieldDef, FieldName, ImportDef, SummaryFunction,
};
use serde::Serialize;

use crate::error::RegistryError;
use crate::index::FieldIndex;

/// Which relation index a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
	ForeignKey,
	ImportFrom,
}

impl std::fmt::Display for RelationKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::ForeignKey => "foreign-key",
			Self::ImportFrom => "import-from",
		})
	}
}

/// Field `field` of `data_source` references `target_field` of `target_data_source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRelation {
	pub data_source: DataSourceId,
	pub field: FieldName,
	pub target_data_source: DataSourceId,
	pub target_field: FieldName,
}

/// Field `field` of `data_source` is a read-only projection of
/// `display_field` on `related_data_source`, reached through `via_field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFromRelation {
	pub data_source: DataSourceId,
	pub field: FieldName,
	pub via_field: FieldName,
	pub related_data_source: DataSourceId,
	pub display_field: FieldName,
	pub summary: Option<SummaryFunction>,
}

/// Resolves data source ids to definitions while relations are derived.
pub trait DataSourceLookup {
	fn find_data_source(&self, id: &str) -> Option<&DataSourceDef>;
}

/// Computes relation descriptors for single fields.
pub trait RelationBuilder: Send + Sync {
	/// Builds the foreign-key relation for `field`, whose non-blank reference
	/// is `reference`.
	fn foreign_key(
		&self,
		data_source: &DataSourceDef,
		field: &FieldDef,
		reference: &str,
		targets: &dyn DataSourceLookup,
	) -> Result<ForeignKeyRelation, RegistryError>;

	/// Builds the import-from relation for `field`. `foreign_keys` holds every
	/// foreign key already derived for `data_source`.
	fn import_from(
		&self,
		data_source: &DataSourceDef,
		field: &FieldDef,
		import: &ImportDef,
		foreign_keys: &FieldIndex<ForeignKeyRelation>,
		targets: &dyn DataSourceLookup,
	) -> Result<ImportFromRelation, RegistryError>;
}

/// Relation builder enforcing that every referenced data source and field
/// exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRelationBuilder;

impl RelationBuilder for DefaultRelationBuilder {
	fn foreign_key(
		&self,
		data_source: &DataSourceDef,
		field: &FieldDef,
		reference: &str,
		targets: &dyn DataSourceLookup,
	) -> Result<ForeignKeyRelation, RegistryError> {
		let (target_ds, target_field) = match reference.split_once('.') {
			Some((ds, f)) => (ds.trim(), f.trim()),
			None => (reference.trim(), field.name.as_str()),
		};
		if target_ds.is_empty() || target_field.is_empty() {
			return Err(RegistryError::MalformedReference {
				data_source: data_source.id.clone(),
				field: field.name.clone(),
				reference: reference.to_string(),
			});
		}

		let target = targets.find_data_source(target_ds).ok_or_else(|| {
			RegistryError::UnresolvedTarget {
				data_source: data_source.id.clone(),
				field: field.name.clone(),
				target: target_ds.to_string(),
			}
		})?;
		if target.field(target_field).is_none() {
			return Err(RegistryError::MissingTargetField {
				data_source: data_source.id.clone(),
				field: field.name.clone(),
				target: target_ds.to_string(),
				target_field: target_field.to_string(),
			});
		}

		Ok(ForeignKeyRelation {
			data_source: data_source.id.clone(),
			field: field.name.clone(),
			target_data_source: target.id.clone(),
			target_field: target_field.to_string(),
		})
	}

	fn import_from(
		&self,
		data_source: &DataSourceDef,
		field: &FieldDef,
		import: &ImportDef,
		foreign_keys: &FieldIndex<ForeignKeyRelation>,
		targets: &dyn DataSourceLookup,
	) -> Result<ImportFromRelation, RegistryError> {
		let fk = foreign_keys
			.get(import.via.as_str())
			.ok_or_else(|| RegistryError::MissingForeignKey {
				data_source: data_source.id.clone(),
				field: field.name.clone(),
				via: import.via.clone(),
			})?;

		let related = targets
			.find_data_source(&fk.target_data_source)
			.ok_or_else(|| RegistryError::UnresolvedTarget {
				data_source: data_source.id.clone(),
				field: field.name.clone(),
				target: fk.target_data_source.clone(),
			})?;
		if related.field(&import.display_field).is_none() {
			return Err(RegistryError::MissingTargetField {
				data_source: data_source.id.clone(),
				field: field.name.clone(),
				target: related.id.clone(),
				target_field: import.display_field.clone(),
			});
		}

		Ok(ImportFromRelation {
			data_source: data_source.id.clone(),
			field: field.name.clone(),
			via_field: import.via.clone(),
			related_data_source: related.id.clone(),
			display_field: import.display_field.clone(),
			summary: import.summary,
		})
	}
}
