// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::property::Property;

pub const SCHEMA_PACKAGE: &str = "olm.package";
pub const SCHEMA_CHANNEL: &str = "olm.channel";
pub const SCHEMA_BUNDLE: &str = "olm.bundle";
pub const SCHEMA_DEPRECATIONS: &str = "olm.deprecations";

/// A parsed catalog source: every object of every file, grouped by schema.
///
/// Objects with an unrecognized schema are preserved in [`DeclarativeConfig::others`]
/// so a load/write cycle does not drop them.
#[derive(Debug, Clone, Default)]
pub struct DeclarativeConfig {
	pub packages: Vec<Package>,
	pub channels: Vec<Channel>,
	pub bundles: Vec<Bundle>,
	pub deprecations: Vec<Deprecation>,
	pub others: Vec<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
	pub schema: String,
	pub name: String,
	#[serde(default, rename = "defaultChannel", skip_serializing_if = "String::is_empty")]
	pub default_channel: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<Icon>,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub description: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
	#[serde(default, rename = "base64data")]
	pub base64_data: String,
	#[serde(default, rename = "mediatype")]
	pub media_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
	pub schema: String,
	pub name: String,
	pub package: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub entries: Vec<ChannelEntry>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntry {
	pub name: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub replaces: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub skips: Vec<String>,
	#[serde(default, rename = "skipRange", skip_serializing_if = "String::is_empty")]
	pub skip_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
	pub schema: String,
	pub name: String,
	pub package: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub image: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub properties: Vec<Property>,
	#[serde(default, rename = "relatedImages", skip_serializing_if = "Vec::is_empty")]
	pub related_images: Vec<RelatedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedImage {
	#[serde(default)]
	pub name: String,
	pub image: String,
}

/// A `olm.deprecations` object: advisory messages attached to the package
/// itself, one of its channels or one of its bundles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deprecation {
	pub schema: String,
	pub package: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub entries: Vec<DeprecationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationEntry {
	pub reference: DeprecationRef,
	pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeprecationRef {
	pub schema: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub name: String,
}

/// An object with a schema this crate does not model. The full document is
/// kept as raw JSON so it survives a load/write cycle byte-compatibly.
#[derive(Debug, Clone)]
pub struct Meta {
	pub schema: String,
	pub package: String,
	pub blob: Box<RawValue>,
}
