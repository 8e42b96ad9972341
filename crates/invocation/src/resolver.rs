use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::catalog::{MethodSignature, TypeCatalog, TypeDef};
use crate::container::Container;
use crate::descriptor::{DmiDescriptor, LookupStyle};
use crate::handler::{DmiHandler, Invoker, Target};

/// Name of the zero-argument method a factory must expose.
pub const FACTORY_METHOD: &str = "create";

/// A DMI descriptor could not be turned into a callable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
	#[error("unknown DMI type '{0}'")]
	UnknownType(String),
	#[error("DMI type '{0}' is registered more than once")]
	DuplicateType(String),
	#[error("'{subject}' matches several registered types: {}", .candidates.join(", "))]
	AmbiguousType {
		subject: String,
		candidates: Vec<String>,
	},
	#[error("no container configured to resolve bean '{0}'")]
	NoContainer(String),
	#[error("no bean named '{0}'")]
	UnknownBean(String),
	#[error("bean '{0}' has no registered method table")]
	UnregisteredBeanType(String),
	#[error("type '{type_name}' has no method '{method}' taking the request")]
	MissingMethod { type_name: String, method: String },
	#[error("type '{type_name}' has {candidates} methods named '{method}' taking the request")]
	AmbiguousMethod {
		type_name: String,
		method: String,
		candidates: usize,
	},
	#[error("type '{0}' has no zero-argument constructor")]
	MissingConstructor(String),
	#[error("factory '{0}' has no zero-argument 'create' method")]
	MissingFactoryMethod(String),
	#[error("factory '{factory}' creates unregistered type {worker}")]
	UnknownWorkerType { factory: String, worker: &'static str },
}

/// Turns [`DmiDescriptor`]s into [`DmiHandler`]s.
#[derive(Clone)]
pub struct Resolver {
	catalog: Arc<TypeCatalog>,
	container: Option<Arc<dyn Container>>,
}

impl Resolver {
	pub fn new(catalog: Arc<TypeCatalog>) -> Self {
		Self {
			catalog,
			container: None,
		}
	}

	/// Enables [`LookupStyle::Bean`] resolution against `container`.
	pub fn with_container(mut self, container: Arc<dyn Container>) -> Self {
		self.container = Some(container);
		self
	}

	pub fn catalog(&self) -> &TypeCatalog {
		&self.catalog
	}

	/// Resolves `descriptor` into a handler registered under `id`.
	///
	/// All lookups happen here; the returned handler never resolves again.
	pub fn resolve(
		&self,
		id: impl Into<String>,
		descriptor: &DmiDescriptor,
	) -> Result<DmiHandler, ResolutionError> {
		let invoker = match descriptor.lookup_style {
			LookupStyle::New => self.resolve_new(descriptor)?,
			LookupStyle::Factory => self.resolve_factory(descriptor)?,
			LookupStyle::Bean => self.resolve_bean(descriptor)?,
		};
		let id = id.into();
		tracing::debug!(
			handler = %id,
			style = %descriptor.lookup_style,
			target = %descriptor.target,
			method = %descriptor.method,
			"resolved DMI handler"
		);
		Ok(DmiHandler::new(id, descriptor.clone(), invoker))
	}

	fn type_def(&self, name: &str) -> Result<&TypeDef, ResolutionError> {
		if self.catalog.is_contested(name) {
			return Err(ResolutionError::DuplicateType(name.to_string()));
		}
		self.catalog
			.get(name)
			.map(Arc::as_ref)
			.ok_or_else(|| ResolutionError::UnknownType(name.to_string()))
	}

	/// The single type registered for `type_id`. `subject` names what is
	/// being resolved in the ambiguity error.
	fn type_def_by_id(&self, type_id: TypeId, subject: &str) -> Result<Option<&TypeDef>, ResolutionError> {
		match self.catalog.names_of_type(type_id) {
			[] => Ok(None),
			[name] => Ok(self.catalog.get(name).map(Arc::as_ref)),
			names => Err(ResolutionError::AmbiguousType {
				subject: subject.to_string(),
				candidates: names.iter().map(ToString::to_string).collect(),
			}),
		}
	}

	fn resolve_new(&self, d: &DmiDescriptor) -> Result<Invoker, ResolutionError> {
		let def = self.type_def(&d.target)?;
		match match_method(def, &d.method)? {
			Target::Static(f) => Ok(Invoker::Static(f)),
			Target::Instance(method) => {
				let construct = def
					.constructor()
					.cloned()
					.ok_or_else(|| ResolutionError::MissingConstructor(def.name().to_string()))?;
				Ok(Invoker::Fresh { construct, method })
			}
		}
	}

	fn resolve_factory(&self, d: &DmiDescriptor) -> Result<Invoker, ResolutionError> {
		let def = self.type_def(&d.target)?;
		let construct = def
			.constructor()
			.ok_or_else(|| ResolutionError::MissingConstructor(def.name().to_string()))?;
		let Some(MethodSignature::Nullary {
			produces,
			produces_name,
			call,
		}) = def.nullary_method(FACTORY_METHOD).map(|m| &m.signature)
		else {
			return Err(ResolutionError::MissingFactoryMethod(def.name().to_string()));
		};
		let worker = self.type_def_by_id(*produces, produces_name)?.ok_or_else(|| {
			ResolutionError::UnknownWorkerType {
				factory: def.name().to_string(),
				worker: *produces_name,
			}
		})?;
		let method = match_method(worker, &d.method)?;

		// Only construct once everything else checked out.
		let factory = construct();
		Ok(Invoker::Factory {
			factory,
			create: call.clone(),
			method,
		})
	}

	fn resolve_bean(&self, d: &DmiDescriptor) -> Result<Invoker, ResolutionError> {
		let container = self
			.container
			.as_ref()
			.ok_or_else(|| ResolutionError::NoContainer(d.target.clone()))?;
		let instance = container
			.resolve_named(&d.target)
			.ok_or_else(|| ResolutionError::UnknownBean(d.target.clone()))?;
		let def = self
			.type_def_by_id((*instance).type_id(), &d.target)?
			.ok_or_else(|| ResolutionError::UnregisteredBeanType(d.target.clone()))?;
		let method = match_method(def, &d.method)?;
		Ok(Invoker::Bean { instance, method })
	}
}

impl std::fmt::Debug for Resolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Resolver")
			.field("types", &self.catalog.len())
			.field("container", &self.container.is_some())
			.finish()
	}
}

/// Finds the single method named `method` that takes the request.
fn match_method(def: &TypeDef, method: &str) -> Result<Target, ResolutionError> {
	let mut candidates = def
		.request_methods(method)
		.filter_map(|m| match &m.signature {
			MethodSignature::Static(f) => Some(Target::Static(f.clone())),
			MethodSignature::Instance(f) => Some(Target::Instance(f.clone())),
			MethodSignature::Nullary { .. } => None,
		});

	let first = candidates
		.next()
		.ok_or_else(|| ResolutionError::MissingMethod {
			type_name: def.name().to_string(),
			method: method.to_string(),
		})?;
	let rest = candidates.count();
	if rest > 0 {
		return Err(ResolutionError::AmbiguousMethod {
			type_name: def.name().to_string(),
			method: method.to_string(),
			candidates: rest + 1,
		});
	}
	Ok(first)
}
