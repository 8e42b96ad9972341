//! TOML handler catalog.
//!
//! A catalog lists data sources (fields, relations, operation bindings and an
//! optional server object) and standalone handlers. Loading is a plain serde
//! pass; server objects are resolved against a [`Resolver`] when the catalog
//! is turned into handlers, so every lookup failure surfaces at startup.
//!
//! ```toml
//! [[data_source]]
//! id = "orders"
//!
//! [[data_source.field]]
//! name = "customerId"
//! foreign_key = "customer.id"
//!
//! [data_source.server_object]
//! lookup_style = "new"
//! target = "OrderService"
//! method = "fetch"
//!
//! [[handler]]
//! id = "ping"
//! server_object = { target = "Health", method = "ping" }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bindery_invocation::{DmiDescriptor, ResolutionError, Resolver};
use bindery_primitives::{
	DataSourceDef, DataSourceHandler, DataSourceId, FieldDef, Handler, OperationBinding,
};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::index::RuntimeRegistry;

/// Parsed catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
	#[serde(default, rename = "data_source")]
	pub data_sources: Vec<DataSourceConfig>,
	#[serde(default, rename = "handler")]
	pub handlers: Vec<HandlerConfig>,
}

/// A data source entry. Without a server object the data source answers
/// every request with an unsupported-operation error but still takes part in
/// relation derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSourceConfig {
	pub id: DataSourceId,
	#[serde(default, rename = "field")]
	pub fields: Vec<FieldDef>,
	#[serde(default, rename = "operation_binding")]
	pub operation_bindings: Vec<OperationBinding>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub server_object: Option<DmiDescriptor>,
}

impl DataSourceConfig {
	pub fn definition(&self) -> DataSourceDef {
		DataSourceDef {
			id: self.id.clone(),
			fields: self.fields.clone(),
			operation_bindings: self.operation_bindings.clone(),
		}
	}
}

/// A handler with no data source definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
	pub id: String,
	pub server_object: DmiDescriptor,
}

/// Catalog loading or resolution failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("catalog parse error: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("handler '{id}': {source}")]
	Resolution {
		id: String,
		#[source]
		source: ResolutionError,
	},
	#[error(transparent)]
	Registry(#[from] RegistryError),
}

impl Catalog {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses the catalog at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let catalog = Self::from_toml_str(&content)?;
		tracing::debug!(
			path = %path.display(),
			data_sources = catalog.data_sources.len(),
			handlers = catalog.handlers.len(),
			"loaded catalog"
		);
		Ok(catalog)
	}

	/// Layers `other` on top of `self`: entries with a known id replace the
	/// existing entry in place, new ids are appended.
	pub fn merge(&mut self, other: Catalog) {
		for ds in other.data_sources {
			match self.data_sources.iter_mut().find(|d| d.id == ds.id) {
				Some(slot) => *slot = ds,
				None => self.data_sources.push(ds),
			}
		}
		for handler in other.handlers {
			match self.handlers.iter_mut().find(|h| h.id == handler.id) {
				Some(slot) => *slot = handler,
				None => self.handlers.push(handler),
			}
		}
	}

	/// Resolves every entry into a handler. Data sources come first, so a
	/// standalone handler sharing an id with a data source wins on registration.
	pub fn into_handlers(self, resolver: &Resolver) -> Result<Vec<Arc<dyn Handler>>, ConfigError> {
		let mut out: Vec<Arc<dyn Handler>> =
			Vec::with_capacity(self.data_sources.len() + self.handlers.len());

		for ds in self.data_sources {
			let def = ds.definition();
			let handler: Arc<dyn Handler> = match &ds.server_object {
				Some(descriptor) => Arc::new(
					resolve(resolver, &ds.id, descriptor)?.with_data_source(def),
				),
				None => Arc::new(DataSourceHandler::new(def)),
			};
			out.push(handler);
		}

		for h in self.handlers {
			out.push(Arc::new(resolve(resolver, &h.id, &h.server_object)?));
		}
		Ok(out)
	}

	/// Resolves the catalog and builds a registry snapshot from it.
	pub fn build_registry(self, resolver: &Resolver) -> Result<RuntimeRegistry, ConfigError> {
		Ok(RuntimeRegistry::create(self.into_handlers(resolver)?)?)
	}
}

fn resolve(
	resolver: &Resolver,
	id: &str,
	descriptor: &DmiDescriptor,
) -> Result<bindery_invocation::DmiHandler, ConfigError> {
	resolver
		.resolve(id, descriptor)
		.map_err(|source| ConfigError::Resolution {
			id: id.to_string(),
			source,
		})
}

#[cfg(test)]
mod tests;
