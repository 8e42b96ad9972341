use std::sync::Arc;

use crate::{DataSourceDef, OperationType, Request, Response};

/// Failure raised by a handler's target code.
///
/// Wraps the original error without adding context, so upstream code can
/// recover it with [`InvocationError::downcast_ref`]. Wrapping an existing
/// `InvocationError` returns it unchanged rather than nesting it.
#[derive(Debug)]
pub struct InvocationError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl std::fmt::Display for InvocationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Display::fmt(&self.0, f)
	}
}

impl std::error::Error for InvocationError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.0.source()
	}
}

impl InvocationError {
	pub fn new<E>(err: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = Box::new(err);
		match boxed.downcast::<InvocationError>() {
			Ok(inner) => *inner,
			Err(boxed) => Self(boxed),
		}
	}

	pub fn is<E: std::error::Error + 'static>(&self) -> bool {
		self.0.is::<E>()
	}

	pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
		self.0.downcast_ref::<E>()
	}
}

/// Anything that can answer a data-source operation.
pub trait Handler: Send + Sync {
	/// Registry-wide identity of this handler.
	fn id(&self) -> &str;

	fn handle(&self, request: &Request) -> Result<Response, InvocationError>;

	/// The data source this handler exposes, if any.
	///
	/// Handlers that return a definition get their relations indexed when
	/// they are registered.
	fn data_source(&self) -> Option<&DataSourceDef> {
		None
	}
}

impl std::fmt::Debug for dyn Handler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Handler")
			.field("id", &self.id())
			.field("data_source", &self.data_source().is_some())
			.finish()
	}
}

/// Returned when a data source has no code bound to the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("data source '{data_source}' has no handler for operation '{operation}'")]
pub struct UnsupportedOperation {
	pub data_source: String,
	pub operation: OperationType,
}

/// A data-source-bearing handler.
///
/// Operations are forwarded to an optional delegate; without one every
/// request fails with [`UnsupportedOperation`].
pub struct DataSourceHandler {
	def: DataSourceDef,
	delegate: Option<Arc<dyn Handler>>,
}

impl DataSourceHandler {
	pub fn new(def: DataSourceDef) -> Self {
		Self { def, delegate: None }
	}

	/// Routes operations on this data source to `delegate`.
	pub fn with_delegate(mut self, delegate: Arc<dyn Handler>) -> Self {
		self.delegate = Some(delegate);
		self
	}
}

impl Handler for DataSourceHandler {
	fn id(&self) -> &str {
		&self.def.id
	}

	fn handle(&self, request: &Request) -> Result<Response, InvocationError> {
		match &self.delegate {
			Some(delegate) => delegate.handle(request),
			None => Err(InvocationError::new(UnsupportedOperation {
				data_source: self.def.id.clone(),
				operation: request.operation_type,
			})),
		}
	}

	fn data_source(&self) -> Option<&DataSourceDef> {
		Some(&self.def)
	}
}
