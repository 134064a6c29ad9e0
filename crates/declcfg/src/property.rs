// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use base64::{prelude::BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::{Error, Result};

pub const TYPE_PACKAGE: &str = "olm.package";
pub const TYPE_PACKAGE_REQUIRED: &str = "olm.package.required";
pub const TYPE_GVK: &str = "olm.gvk";
pub const TYPE_GVK_REQUIRED: &str = "olm.gvk.required";
pub const TYPE_BUNDLE_OBJECT: &str = "olm.bundle.object";
pub const TYPE_LABEL: &str = "olm.label";

/// A typed JSON annotation. The value is kept as raw JSON so property types
/// this crate does not know about pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
	#[serde(rename = "type")]
	pub r#type: String,
	pub value: Box<RawValue>,
}

impl Property {
	pub fn new(r#type: impl Into<String>, value: Box<RawValue>) -> Self {
		Self { r#type: r#type.into(), value }
	}

	/// Parse the raw value as the payload type for this property's tag.
	pub fn parse<'a, T: Deserialize<'a>>(&'a self) -> Result<T> {
		serde_json::from_str(self.value.get()).map_err(|e| Error::InvalidProperty {
			property_type: self.r#type.clone(),
			reason: e.to_string(),
		})
	}
}

/// Payload of `olm.package`: the package and version a bundle advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPackage {
	#[serde(rename = "packageName")]
	pub package_name: String,
	pub version: String,
}

/// Payload of `olm.package.required`: a dependency on another package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPackageRequired {
	#[serde(rename = "packageName")]
	pub package_name: String,
	#[serde(rename = "versionRange")]
	pub version_range: String,
}

/// Payload of `olm.gvk` and `olm.gvk.required`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyGvk {
	pub group: String,
	pub kind: String,
	pub version: String,
}

/// Payload of `olm.bundle.object`: a Kubernetes manifest embedded as
/// base64-encoded JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBundleObject {
	pub data: String,
}

impl PropertyBundleObject {
	/// Decode the embedded manifest to its JSON text.
	pub fn decode(&self) -> Result<String> {
		let bytes = BASE64_STANDARD.decode(self.data.as_bytes()).map_err(|e| Error::InvalidProperty {
			property_type: TYPE_BUNDLE_OBJECT.to_string(),
			reason: format!("invalid base64 data: {e}"),
		})?;
		String::from_utf8(bytes).map_err(|e| Error::InvalidProperty {
			property_type: TYPE_BUNDLE_OBJECT.to_string(),
			reason: format!("manifest is not utf-8: {e}"),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn property(r#type: &str, value: &str) -> Property {
		Property::new(r#type, RawValue::from_string(value.to_string()).unwrap())
	}

	#[test]
	fn test_parse_package_property() {
		let p = property(TYPE_PACKAGE, r#"{"packageName":"etcd","version":"0.9.2"}"#);
		let parsed: PropertyPackage = p.parse().unwrap();
		assert_eq!(parsed.package_name, "etcd");
		assert_eq!(parsed.version, "0.9.2");
	}

	#[test]
	fn test_parse_gvk_property() {
		let p = property(TYPE_GVK, r#"{"group":"etcd.database.coreos.com","kind":"EtcdCluster","version":"v1beta2"}"#);
		let parsed: PropertyGvk = p.parse().unwrap();
		assert_eq!(parsed.group, "etcd.database.coreos.com");
		assert_eq!(parsed.kind, "EtcdCluster");
		assert_eq!(parsed.version, "v1beta2");
	}

	#[test]
	fn test_parse_mismatched_payload() {
		let p = property(TYPE_PACKAGE, r#"{"group":"g","kind":"K","version":"v1"}"#);
		let err = p.parse::<PropertyPackage>().unwrap_err();
		assert!(matches!(err, Error::InvalidProperty { .. }));
	}

	#[test]
	fn test_decode_bundle_object() {
		let encoded = BASE64_STANDARD.encode(r#"{"kind":"ClusterServiceVersion"}"#);
		let object = PropertyBundleObject { data: encoded };
		assert_eq!(object.decode().unwrap(), r#"{"kind":"ClusterServiceVersion"}"#);
	}

	#[test]
	fn test_decode_bundle_object_bad_base64() {
		let object = PropertyBundleObject { data: "not base64!".to_string() };
		assert!(object.decode().is_err());
	}

	#[test]
	fn test_unknown_property_value_is_preserved() {
		let raw = r#"{"its":"notdefined","nested":[1,2,{"deep":true}]}"#;
		let p = property("other", raw);
		assert_eq!(p.value.get(), raw);
		let json = serde_json::to_string(&p).unwrap();
		assert_eq!(json, format!(r#"{{"type":"other","value":{raw}}}"#));
	}
}
