use std::sync::Arc;

use bindery_primitives::{DataSourceDef, DataSourceId, Handler};
use rustc_hash::{FxHashMap, FxHashSet};

use super::FieldIndex;
use super::derive::{DerivedRelations, derive_relations};
use crate::error::{LookupError, RegistryError, RelationError};
use crate::relation::{
	DataSourceLookup, DefaultRelationBuilder, ForeignKeyRelation, ImportFromRelation,
	RelationBuilder, RelationKind,
};

type HandlerMap = FxHashMap<Box<str>, Arc<dyn Handler>>;
type RelationIndex<R> = FxHashMap<DataSourceId, Arc<FieldIndex<R>>>;

impl DataSourceLookup for HandlerMap {
	fn find_data_source(&self, id: &str) -> Option<&DataSourceDef> {
		self.get(id)?.data_source()
	}
}

/// Immutable snapshot of handlers and their relation indices.
///
/// Cloning is cheap: every map sits behind an `Arc`. Data-source-bearing
/// handlers are expected to be registered under their data source id, which
/// is how foreign-key targets are resolved.
#[derive(Clone)]
pub struct RuntimeRegistry {
	handlers: Arc<HandlerMap>,
	foreign_keys: Arc<RelationIndex<ForeignKeyRelation>>,
	imports: Arc<RelationIndex<ImportFromRelation>>,
	builder: Arc<dyn RelationBuilder>,
}

impl Default for RuntimeRegistry {
	fn default() -> Self {
		Self::empty()
	}
}

impl std::fmt::Debug for RuntimeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RuntimeRegistry")
			.field("handlers", &self.handlers.len())
			.field("indexed_data_sources", &self.foreign_keys.len())
			.finish()
	}
}

impl RuntimeRegistry {
	/// Empty registry using [`DefaultRelationBuilder`].
	pub fn empty() -> Self {
		Self::with_builder(Arc::new(DefaultRelationBuilder))
	}

	/// Empty registry deriving relations through `builder`.
	pub fn with_builder(builder: Arc<dyn RelationBuilder>) -> Self {
		Self {
			handlers: Arc::default(),
			foreign_keys: Arc::default(),
			imports: Arc::default(),
			builder,
		}
	}

	/// Bulk constructor used at startup.
	pub fn create<I>(handlers: I) -> Result<Self, RegistryError>
	where
		I: IntoIterator<Item = Arc<dyn Handler>>,
	{
		Self::empty().extend(handlers)
	}

	/// [`RuntimeRegistry::create`] with a custom relation builder.
	pub fn create_with<I>(builder: Arc<dyn RelationBuilder>, handlers: I) -> Result<Self, RegistryError>
	where
		I: IntoIterator<Item = Arc<dyn Handler>>,
	{
		Self::with_builder(builder).extend(handlers)
	}

	/// Returns a new snapshot containing `handlers` on top of this one.
	///
	/// Handlers are inserted by id first; relations are derived afterwards
	/// for every data source in `handlers`, so references among the new
	/// handlers resolve regardless of order. Replacing a data-source-bearing
	/// handler drops its old relation entries. `self` is left untouched.
	pub fn extend<I>(&self, handlers: I) -> Result<Self, RegistryError>
	where
		I: IntoIterator<Item = Arc<dyn Handler>>,
	{
		let mut next: HandlerMap = (*self.handlers).clone();
		let mut foreign_keys = (*self.foreign_keys).clone();
		let mut imports = (*self.imports).clone();

		let mut touched: Vec<Box<str>> = Vec::new();
		let mut seen: FxHashSet<Box<str>> = FxHashSet::default();
		for handler in handlers {
			let id: Box<str> = handler.id().into();
			if let Some(prev) = next.insert(id.clone(), handler) {
				tracing::debug!(handler = %id, "replacing registered handler");
				if let Some(def) = prev.data_source() {
					foreign_keys.remove(&def.id);
					imports.remove(&def.id);
				}
			}
			if seen.insert(id.clone()) {
				touched.push(id);
			}
		}

		for id in &touched {
			let Some(def) = next.get(id).and_then(|h| h.data_source()) else {
				continue;
			};
			let derived = derive_relations(self.builder.as_ref(), def, &next)?;
			foreign_keys.insert(def.id.clone(), Arc::new(derived.foreign_keys));
			imports.insert(def.id.clone(), Arc::new(derived.imports));
		}

		Ok(Self {
			handlers: Arc::new(next),
			foreign_keys: Arc::new(foreign_keys),
			imports: Arc::new(imports),
			builder: self.builder.clone(),
		})
	}

	/// Looks up a handler by id.
	pub fn lookup(&self, id: &str) -> Result<Arc<dyn Handler>, LookupError> {
		self.handlers
			.get(id)
			.cloned()
			.ok_or_else(|| LookupError::NotFound(id.to_string()))
	}

	pub fn get(&self, id: &str) -> Option<&Arc<dyn Handler>> {
		self.handlers.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.handlers.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}

	/// Ids of all registered handlers, sorted.
	pub fn handler_ids(&self) -> Vec<&str> {
		let mut ids: Vec<&str> = self.handlers.keys().map(|k| &**k).collect();
		ids.sort_unstable();
		ids
	}

	/// Definitions of all data-source-bearing handlers, sorted by id.
	pub fn data_sources(&self) -> Vec<&DataSourceDef> {
		let mut defs: Vec<&DataSourceDef> = self
			.handlers
			.values()
			.filter_map(|h| h.data_source())
			.collect();
		defs.sort_unstable_by(|a, b| a.id.cmp(&b.id));
		defs
	}

	pub fn foreign_key_relation(
		&self,
		data_source: &str,
		field: &str,
	) -> Result<&ForeignKeyRelation, RelationError> {
		relation(&self.foreign_keys, data_source, field, RelationKind::ForeignKey)
	}

	pub fn import_from_relation(
		&self,
		data_source: &str,
		field: &str,
	) -> Result<&ImportFromRelation, RelationError> {
		relation(&self.imports, data_source, field, RelationKind::ImportFrom)
	}

	/// All foreign-key relations of `data_source`, sorted by field.
	pub fn foreign_key_relations(
		&self,
		data_source: &str,
	) -> Result<Vec<&ForeignKeyRelation>, RelationError> {
		relations(&self.foreign_keys, data_source, |r| &r.field)
	}

	/// All import-from relations of `data_source`, sorted by field.
	pub fn import_from_relations(
		&self,
		data_source: &str,
	) -> Result<Vec<&ImportFromRelation>, RelationError> {
		relations(&self.imports, data_source, |r| &r.field)
	}

	/// Derives the relations `def` would get if it were registered now,
	/// resolving targets against this snapshot.
	pub fn derive_relations(&self, def: &DataSourceDef) -> Result<DerivedRelations, RegistryError> {
		derive_relations(self.builder.as_ref(), def, &*self.handlers)
	}

	#[cfg(test)]
	pub(crate) fn shares_relations_with(&self, other: &Self, data_source: &str) -> bool {
		match (self.foreign_keys.get(data_source), other.foreign_keys.get(data_source)) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

fn relation<'a, R>(
	index: &'a RelationIndex<R>,
	data_source: &str,
	field: &str,
	kind: RelationKind,
) -> Result<&'a R, RelationError> {
	let fields = index
		.get(data_source)
		.ok_or_else(|| RelationError::UnknownDataSource(data_source.to_string()))?;
	fields.get(field).ok_or_else(|| RelationError::UnknownRelation {
		data_source: data_source.to_string(),
		field: field.to_string(),
		kind,
	})
}

fn relations<'a, R>(
	index: &'a RelationIndex<R>,
	data_source: &str,
	field_of: impl Fn(&R) -> &String,
) -> Result<Vec<&'a R>, RelationError> {
	let fields = index
		.get(data_source)
		.ok_or_else(|| RelationError::UnknownDataSource(data_source.to_string()))?;
	let mut out: Vec<&R> = fields.values().collect();
	out.sort_unstable_by(|a, b| field_of(a).cmp(field_of(b)));
	Ok(out)
}
