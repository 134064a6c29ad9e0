// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use serde::{Deserialize, Serialize};

/// A package summary: its channels with their resolved heads, the default
/// channel, and any deprecations in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPackage {
	pub name: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub description: String,
	pub channels: Vec<ApiChannel>,
	pub default_channel_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChannel {
	pub name: String,
	/// Name of the channel's head bundle, empty for a channel with none.
	pub csv_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deprecation: Option<Deprecation>,
}

/// A bundle as served to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiBundle {
	pub csv_name: String,
	pub package_name: String,
	pub channel_name: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub csv_json: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub objects: Vec<String>,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub bundle_path: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub provided_apis: Vec<GroupVersionKind>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub required_apis: Vec<GroupVersionKind>,
	pub version: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub skip_range: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub dependencies: Vec<Dependency>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub properties: Vec<Property>,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub replaces: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub skips: Vec<String>,
}

/// One position of a bundle inside a channel's replacement graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelEntry {
	pub package_name: String,
	pub channel_name: String,
	pub bundle_name: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub replaces: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionKind {
	pub group: String,
	pub version: String,
	pub kind: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub plural: String,
}

impl GroupVersionKind {
	pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
		Self { group: group.into(), version: version.into(), kind: kind.into(), plural: String::new() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
	pub r#type: String,
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
	pub r#type: String,
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
	pub message: String,
}
