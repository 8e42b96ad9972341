//! Dynamic method invocation (DMI).
//!
//! A [`DmiDescriptor`] names a target type (or bean) and a method. The
//! [`Resolver`] turns it into a [`DmiHandler`] once, at registration time, by
//! consulting the [`TypeCatalog`] and, for bean lookups, the hosting
//! [`Container`]. The handler keeps the resolved invoker and never looks the
//! target up again.
//!
//! # Lookup styles
//!
//! | Style | Receiver per call |
//! |-------|-------------------|
//! | [`LookupStyle::New`] | none for static methods, a freshly constructed instance otherwise |
//! | [`LookupStyle::Factory`] | the result of `create` on a factory constructed once |
//! | [`LookupStyle::Bean`] | the container-managed instance obtained at resolution |
//!
//! # Method matching
//!
//! A method matches when its name is equal and its signature takes exactly the
//! request. More than one match is rejected as ambiguous.

mod catalog;
mod container;
mod descriptor;
mod handler;
mod resolver;

pub use catalog::{
	AnyObject, MethodDef, MethodSignature, TypeBuilder, TypeCatalog, TypeDef, TypeRegistration,
};
pub use container::{Container, MapContainer};
pub use descriptor::{DmiDescriptor, LookupStyle};
pub use handler::{DmiHandler, ReceiverMismatch};
pub use resolver::{FACTORY_METHOD, ResolutionError, Resolver};

#[doc(hidden)]
pub use inventory;
