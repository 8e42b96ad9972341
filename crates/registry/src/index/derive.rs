use bindery_primitives::DataSourceDef;

use super::FieldIndex;
use crate::error::RegistryError;
use crate::relation::{DataSourceLookup, ForeignKeyRelation, ImportFromRelation, RelationBuilder};

/// Relation entries derived from one data source definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedRelations {
	pub foreign_keys: FieldIndex<ForeignKeyRelation>,
	pub imports: FieldIndex<ImportFromRelation>,
}

/// Derives every relation declared by `def`.
///
/// All foreign keys are built before any import, so an import may name a
/// foreign-key field declared after it.
pub(super) fn derive_relations(
	builder: &dyn RelationBuilder,
	def: &DataSourceDef,
	targets: &dyn DataSourceLookup,
) -> Result<DerivedRelations, RegistryError> {
	let mut derived = DerivedRelations::default();

	for field in &def.fields {
		if let Some(reference) = field.foreign_key_ref() {
			let relation = builder.foreign_key(def, field, reference, targets)?;
			derived.foreign_keys.insert(field.name.clone(), relation);
		}
	}

	for field in &def.fields {
		if let Some(import) = &field.import {
			let relation =
				builder.import_from(def, field, import, &derived.foreign_keys, targets)?;
			derived.imports.insert(field.name.clone(), relation);
		}
	}

	tracing::debug!(
		data_source = %def.id,
		foreign_keys = derived.foreign_keys.len(),
		imports = derived.imports.len(),
		"derived relations"
	);
	Ok(derived)
}
