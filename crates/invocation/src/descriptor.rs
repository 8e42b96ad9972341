use serde::{Deserialize, Serialize};

/// How the target of a DMI descriptor is located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStyle {
	/// Instantiate the target type (or call a static method).
	#[default]
	New,
	/// Instantiate a factory once and call its `create` per invocation.
	Factory,
	/// Ask the hosting container for a named instance.
	#[serde(alias = "spring")]
	Bean,
}

impl std::fmt::Display for LookupStyle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::New => "new",
			Self::Factory => "factory",
			Self::Bean => "bean",
		})
	}
}

/// Declarative description of how to reach the code answering an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmiDescriptor {
	#[serde(default)]
	pub lookup_style: LookupStyle,
	/// Fully-qualified type name, factory type name, or bean name.
	#[serde(alias = "class_name", alias = "bean")]
	pub target: String,
	#[serde(alias = "method_name")]
	pub method: String,
}

impl DmiDescriptor {
	pub fn new(lookup_style: LookupStyle, target: impl Into<String>, method: impl Into<String>) -> Self {
		Self {
			lookup_style,
			target: target.into(),
			method: method.into(),
		}
	}
}
