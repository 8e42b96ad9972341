use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::catalog::AnyObject;

/// Hosting container that owns named, managed instances.
pub trait Container: Send + Sync {
	/// Resolves `name` to a live instance.
	fn resolve_named(&self, name: &str) -> Option<Arc<AnyObject>>;
}

/// In-memory container keyed by bean name.
#[derive(Default)]
pub struct MapContainer {
	beans: FxHashMap<String, Arc<AnyObject>>,
}

impl MapContainer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, bean: T) {
		self.beans.insert(name.into(), Arc::new(bean));
	}

	/// Builder-style [`MapContainer::insert`].
	pub fn with_bean<T: Any + Send + Sync>(mut self, name: impl Into<String>, bean: T) -> Self {
		self.insert(name, bean);
		self
	}
}

impl Container for MapContainer {
	fn resolve_named(&self, name: &str) -> Option<Arc<AnyObject>> {
		self.beans.get(name).cloned()
	}
}
