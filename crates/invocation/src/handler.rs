use std::sync::Arc;

use bindery_primitives::{DataSourceDef, Handler, InvocationError, Request, Response};

use crate::catalog::{AnyObject, ConstructFn, InstanceFn, ProducerFn, StaticFn};
use crate::descriptor::DmiDescriptor;

/// A receiver object did not have the type its method table was built for.
#[derive(Debug, Clone, thiserror::Error)]
#[error("DMI receiver is not a {expected}")]
pub struct ReceiverMismatch {
	pub expected: &'static str,
}

/// Resolved call target.
#[derive(Clone)]
pub(crate) enum Target {
	Static(StaticFn),
	Instance(InstanceFn),
}

impl Target {
	fn call(&self, receiver: &AnyObject, request: &Request) -> Result<Response, InvocationError> {
		match self {
			Self::Static(f) => f(request),
			Self::Instance(f) => f(receiver, request),
		}
	}
}

/// Everything needed to perform one invocation, fixed at resolution time.
pub(crate) enum Invoker {
	/// Static method, no receiver.
	Static(StaticFn),
	/// Instance method on a receiver constructed for each call.
	Fresh { construct: ConstructFn, method: InstanceFn },
	/// Factory constructed once; `create` supplies a worker for each call.
	Factory {
		factory: Box<AnyObject>,
		create: ProducerFn,
		method: Target,
	},
	/// Container-managed instance shared by all calls.
	Bean { instance: Arc<AnyObject>, method: Target },
}

impl Invoker {
	fn invoke(&self, request: &Request) -> Result<Response, InvocationError> {
		match self {
			Self::Static(f) => f(request),
			Self::Fresh { construct, method } => {
				let receiver = construct();
				method(receiver.as_ref(), request)
			}
			Self::Factory {
				factory,
				create,
				method,
			} => {
				let worker = create(factory.as_ref())?;
				method.call(worker.as_ref(), request)
			}
			Self::Bean { instance, method } => method.call(instance.as_ref(), request),
		}
	}
}

/// Handler whose operations are answered by a resolved DMI target.
pub struct DmiHandler {
	id: String,
	descriptor: DmiDescriptor,
	invoker: Invoker,
	data_source: Option<DataSourceDef>,
}

impl DmiHandler {
	pub(crate) fn new(id: String, descriptor: DmiDescriptor, invoker: Invoker) -> Self {
		Self {
			id,
			descriptor,
			invoker,
			data_source: None,
		}
	}

	/// Attaches a data source definition, making this handler data-source-bearing.
	pub fn with_data_source(mut self, def: DataSourceDef) -> Self {
		self.data_source = Some(def);
		self
	}

	pub fn descriptor(&self) -> &DmiDescriptor {
		&self.descriptor
	}
}

impl std::fmt::Debug for DmiHandler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DmiHandler")
			.field("id", &self.id)
			.field("descriptor", &self.descriptor)
			.field("data_source", &self.data_source.as_ref().map(|d| &d.id))
			.finish()
	}
}

impl Handler for DmiHandler {
	fn id(&self) -> &str {
		&self.id
	}

	fn handle(&self, request: &Request) -> Result<Response, InvocationError> {
		tracing::trace!(
			handler = %self.id,
			style = %self.descriptor.lookup_style,
			target = %self.descriptor.target,
			method = %self.descriptor.method,
			operation = %request.operation_type,
			"dmi invoke"
		);
		self.invoker.invoke(request)
	}

	fn data_source(&self) -> Option<&DataSourceDef> {
		self.data_source.as_ref()
	}
}
