//! Explicit method tables standing in for runtime reflection.

use std::any::{Any, TypeId};
use std::sync::Arc;

use bindery_primitives::{InvocationError, Request, Response};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::handler::ReceiverMismatch;

/// Type-erased receiver object.
pub type AnyObject = dyn Any + Send + Sync;

pub(crate) type ConstructFn = Arc<dyn Fn() -> Box<AnyObject> + Send + Sync>;
pub(crate) type StaticFn = Arc<dyn Fn(&Request) -> Result<Response, InvocationError> + Send + Sync>;
pub(crate) type InstanceFn =
	Arc<dyn Fn(&AnyObject, &Request) -> Result<Response, InvocationError> + Send + Sync>;
pub(crate) type ProducerFn =
	Arc<dyn Fn(&AnyObject) -> Result<Box<AnyObject>, InvocationError> + Send + Sync>;

/// How a registered method is called.
#[derive(Clone)]
pub enum MethodSignature {
	/// `fn(&Request)`, no receiver.
	Static(StaticFn),
	/// `fn(&self, &Request)`.
	Instance(InstanceFn),
	/// `fn(&self) -> W`; the produced value is itself a registered type.
	Nullary {
		produces: TypeId,
		produces_name: &'static str,
		call: ProducerFn,
	},
}

impl MethodSignature {
	/// Returns true if the method takes the request as its sole argument.
	pub fn accepts_request(&self) -> bool {
		matches!(self, Self::Static(_) | Self::Instance(_))
	}

	fn kind(&self) -> &'static str {
		match self {
			Self::Static(_) => "static",
			Self::Instance(_) => "instance",
			Self::Nullary { .. } => "nullary",
		}
	}
}

impl std::fmt::Debug for MethodSignature {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Nullary { produces_name, .. } => write!(f, "Nullary(-> {produces_name})"),
			other => f.write_str(other.kind()),
		}
	}
}

/// A named method in a type's method table.
#[derive(Debug, Clone)]
pub struct MethodDef {
	pub name: Box<str>,
	pub signature: MethodSignature,
}

/// Method table and constructor for one invocable type.
pub struct TypeDef {
	name: Box<str>,
	type_id: TypeId,
	constructor: Option<ConstructFn>,
	methods: Vec<MethodDef>,
}

impl TypeDef {
	/// Fully-qualified name the type is registered under.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub(crate) fn constructor(&self) -> Option<&ConstructFn> {
		self.constructor.as_ref()
	}

	pub fn methods(&self) -> &[MethodDef] {
		&self.methods
	}

	/// Methods named `name` that take the request as sole argument, in
	/// registration order.
	pub fn request_methods<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDef> + 'a {
		self.methods
			.iter()
			.filter(move |m| &*m.name == name && m.signature.accepts_request())
	}

	/// First zero-argument producer named `name`.
	pub fn nullary_method(&self, name: &str) -> Option<&MethodDef> {
		self.methods
			.iter()
			.find(|m| &*m.name == name && matches!(m.signature, MethodSignature::Nullary { .. }))
	}
}

impl std::fmt::Debug for TypeDef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TypeDef")
			.field("name", &self.name)
			.field("constructor", &self.constructor.is_some())
			.field("methods", &self.methods)
			.finish()
	}
}

/// Typed builder for a [`TypeDef`].
pub struct TypeBuilder<T> {
	name: Box<str>,
	constructor: Option<ConstructFn>,
	methods: Vec<MethodDef>,
	_marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeBuilder<T> {
	pub fn new(name: impl Into<Box<str>>) -> Self {
		Self {
			name: name.into(),
			constructor: None,
			methods: Vec::new(),
			_marker: std::marker::PhantomData,
		}
	}

	/// Registers the zero-argument constructor.
	pub fn constructor<F>(mut self, f: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
	{
		self.constructor = Some(Arc::new(move || Box::new(f()) as Box<AnyObject>));
		self
	}

	/// Registers [`Default::default`] as the zero-argument constructor.
	pub fn default_constructor(self) -> Self
	where
		T: Default,
	{
		self.constructor(T::default)
	}

	/// Registers a method callable without a receiver.
	pub fn static_method<F, R, E>(mut self, name: impl Into<Box<str>>, f: F) -> Self
	where
		F: Fn(&Request) -> Result<R, E> + Send + Sync + 'static,
		R: Into<Response>,
		E: std::error::Error + Send + Sync + 'static,
	{
		let call: StaticFn = Arc::new(move |req: &Request| f(req).map(Into::into).map_err(InvocationError::new));
		self.methods.push(MethodDef {
			name: name.into(),
			signature: MethodSignature::Static(call),
		});
		self
	}

	/// Registers a method called on an instance of `T`.
	pub fn method<F, R, E>(mut self, name: impl Into<Box<str>>, f: F) -> Self
	where
		F: Fn(&T, &Request) -> Result<R, E> + Send + Sync + 'static,
		R: Into<Response>,
		E: std::error::Error + Send + Sync + 'static,
	{
		let call: InstanceFn = Arc::new(move |this: &AnyObject, req: &Request| {
			let this = downcast_receiver::<T>(this)?;
			f(this, req).map(Into::into).map_err(InvocationError::new)
		});
		self.methods.push(MethodDef {
			name: name.into(),
			signature: MethodSignature::Instance(call),
		});
		self
	}

	/// Registers a zero-argument method producing a `W`, such as a factory's
	/// `create`.
	pub fn nullary<F, W>(mut self, name: impl Into<Box<str>>, f: F) -> Self
	where
		F: Fn(&T) -> W + Send + Sync + 'static,
		W: Any + Send + Sync,
	{
		let call: ProducerFn = Arc::new(move |this: &AnyObject| {
			let this = downcast_receiver::<T>(this)?;
			Ok(Box::new(f(this)) as Box<AnyObject>)
		});
		self.methods.push(MethodDef {
			name: name.into(),
			signature: MethodSignature::Nullary {
				produces: TypeId::of::<W>(),
				produces_name: std::any::type_name::<W>(),
				call,
			},
		});
		self
	}

	pub fn build(self) -> TypeDef {
		TypeDef {
			name: self.name,
			type_id: TypeId::of::<T>(),
			constructor: self.constructor,
			methods: self.methods,
		}
	}
}

fn downcast_receiver<T: Any>(this: &AnyObject) -> Result<&T, InvocationError> {
	this.downcast_ref::<T>().ok_or_else(|| {
		InvocationError::new(ReceiverMismatch {
			expected: std::any::type_name::<T>(),
		})
	})
}

/// Process-wide type contribution collected through `inventory`.
///
/// ```ignore
/// fn orders() -> TypeDef {
///     TypeBuilder::<OrderService>::new("shop.OrderService")
///         .default_constructor()
///         .method("fetch", OrderService::fetch)
///         .build()
/// }
/// bindery_invocation::inventory::submit! { TypeRegistration(orders) }
/// ```
pub struct TypeRegistration(pub fn() -> TypeDef);

inventory::collect!(TypeRegistration);

/// Registry of invocable types, indexed by name and by [`TypeId`].
#[derive(Debug, Default)]
pub struct TypeCatalog {
	by_name: FxHashMap<Box<str>, Arc<TypeDef>>,
	/// Every name each type is registered under, sorted.
	by_type: FxHashMap<TypeId, Vec<Box<str>>>,
	/// Names contributed more than once through `inventory`.
	contested: FxHashSet<Box<str>>,
}

impl TypeCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a catalog from every [`TypeRegistration`] linked into the binary.
	///
	/// A name contributed more than once is left out and reported by
	/// [`TypeCatalog::is_contested`], since link order decides which
	/// registration would come first.
	pub fn from_inventory() -> Self {
		let mut catalog = Self::new();
		for reg in inventory::iter::<TypeRegistration> {
			let def = (reg.0)();
			if catalog.contested.contains(&def.name) {
				continue;
			}
			if catalog.remove(&def.name).is_some() {
				tracing::warn!(type_name = %def.name, "DMI type registered more than once; name disabled");
				catalog.contested.insert(def.name);
				continue;
			}
			catalog.insert(def);
		}
		tracing::debug!(types = catalog.len(), "collected DMI types from inventory");
		catalog
	}

	/// Adds `def`, returning the definition it replaced under the same name.
	pub fn insert(&mut self, def: TypeDef) -> Option<Arc<TypeDef>> {
		let replaced = self.remove(&def.name);
		self.contested.remove(&def.name);
		let names = self.by_type.entry(def.type_id).or_default();
		if let Err(at) = names.binary_search(&def.name) {
			names.insert(at, def.name.clone());
		}
		self.by_name.insert(def.name.clone(), Arc::new(def));
		replaced
	}

	/// Builder-style [`TypeCatalog::insert`].
	pub fn with(mut self, def: TypeDef) -> Self {
		self.insert(def);
		self
	}

	fn remove(&mut self, name: &str) -> Option<Arc<TypeDef>> {
		let def = self.by_name.remove(name)?;
		if let Some(names) = self.by_type.get_mut(&def.type_id) {
			names.retain(|n| &**n != name);
			if names.is_empty() {
				self.by_type.remove(&def.type_id);
			}
		}
		Some(def)
	}

	pub fn get(&self, name: &str) -> Option<&Arc<TypeDef>> {
		self.by_name.get(name)
	}

	/// Names the Rust type `type_id` is registered under, sorted.
	pub fn names_of_type(&self, type_id: TypeId) -> &[Box<str>] {
		self.by_type.get(&type_id).map(Vec::as_slice).unwrap_or_default()
	}

	/// Returns true if `name` was contributed by more than one
	/// [`TypeRegistration`].
	pub fn is_contested(&self, name: &str) -> bool {
		self.contested.contains(name)
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}
