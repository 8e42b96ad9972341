use std::sync::Arc;

use arc_swap::ArcSwap;
use bindery_primitives::Handler;
use parking_lot::Mutex;

use super::RuntimeRegistry;
use crate::error::RegistryError;

/// Process-wide publication point for [`RuntimeRegistry`] snapshots.
///
/// Reads are a single atomic load. Writers take `writer` for the whole
/// build-and-publish step, so two extensions never start from the same
/// snapshot and neither is lost.
pub struct SharedRegistry {
	current: ArcSwap<RuntimeRegistry>,
	writer: Mutex<()>,
}

impl SharedRegistry {
	pub fn new(initial: RuntimeRegistry) -> Self {
		Self {
			current: ArcSwap::from_pointee(initial),
			writer: Mutex::new(()),
		}
	}

	/// Returns the current snapshot. The snapshot stays valid for as long as
	/// the caller holds it, even across later publications.
	pub fn load(&self) -> Arc<RuntimeRegistry> {
		self.current.load_full()
	}

	/// Extends the current snapshot with `handlers` and publishes the result.
	///
	/// On error nothing is published and the current snapshot is unchanged.
	pub fn extend<I>(&self, handlers: I) -> Result<Arc<RuntimeRegistry>, RegistryError>
	where
		I: IntoIterator<Item = Arc<dyn Handler>>,
	{
		let _guard = self.writer.lock();
		let base = self.current.load_full();
		let next = Arc::new(base.extend(handlers)?);
		self.current.store(next.clone());
		tracing::debug!(handlers = next.len(), "published registry snapshot");
		Ok(next)
	}

	/// Publishes a prebuilt snapshot, replacing the current one.
	pub fn replace(&self, registry: RuntimeRegistry) -> Arc<RuntimeRegistry> {
		let _guard = self.writer.lock();
		let next = Arc::new(registry);
		self.current.store(next.clone());
		tracing::debug!(handlers = next.len(), "replaced registry snapshot");
		next
	}
}

impl Default for SharedRegistry {
	fn default() -> Self {
		Self::new(RuntimeRegistry::empty())
	}
}

impl std::fmt::Debug for SharedRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SharedRegistry")
			.field("current", &*self.current.load())
			.finish()
	}
}
