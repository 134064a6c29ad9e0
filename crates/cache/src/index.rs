// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! On-disk index shapes.
//!
//! One [`PackageIndex`] per package carries everything queries need for that
//! package, precomputed at build time: channel entry lists with resolved
//! heads, and per-bundle rows ready to serve. Serialization goes through
//! BTreeMaps so a rebuild from identical sources is byte-identical.

use std::collections::{BTreeMap, BTreeSet};

use opcat_model::{Model, Package};
use opcat_registry::{Dependency, GroupVersionKind, Property};
use serde::{Deserialize, Serialize};

/// Key of a GVK reverse-index file: `(group, version, kind)`.
pub(crate) type GvkKey = (String, String, String);

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PackageIndex {
	pub name: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub description: String,
	pub default_channel: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deprecation: Option<DeprecationIndex>,
	pub channels: BTreeMap<String, ChannelIndex>,
	pub bundles: BTreeMap<String, BundleIndex>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChannelIndex {
	/// Resolved head bundle name, empty for a channel with no entries.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub head: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deprecation: Option<DeprecationIndex>,
	/// Entries sorted by bundle name.
	pub entries: Vec<EntryIndex>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EntryIndex {
	pub name: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub replaces: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub skips: Vec<String>,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub skip_range: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct BundleIndex {
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub bundle_path: String,
	pub version: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub provided_apis: Vec<GroupVersionKind>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub required_apis: Vec<GroupVersionKind>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub dependencies: Vec<Dependency>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub properties: Vec<Property>,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub csv_json: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub objects: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deprecation: Option<DeprecationIndex>,
}

/// A deprecation message together with the reference it was declared for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DeprecationIndex {
	pub schema: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub name: String,
	pub message: String,
}

impl DeprecationIndex {
	fn from_model(d: &opcat_model::Deprecation) -> Self {
		Self { schema: d.reference_schema.clone(), name: d.reference_name.clone(), message: d.message.clone() }
	}

	/// Render this deprecation as an `olm.deprecation` property carrying the
	/// original reference, so clients can tell which scope it came from.
	pub fn to_property(&self) -> Property {
		#[derive(Serialize)]
		struct Reference<'a> {
			schema: &'a str,
			#[serde(skip_serializing_if = "str::is_empty")]
			name: &'a str,
		}
		#[derive(Serialize)]
		struct Value<'a> {
			reference: Reference<'a>,
			message: &'a str,
		}
		let value = Value {
			reference: Reference { schema: &self.schema, name: &self.name },
			message: &self.message,
		};
		Property {
			r#type: "olm.deprecation".to_string(),
			value: serde_json::to_string(&value).unwrap_or_default(),
		}
	}
}

impl PackageIndex {
	pub fn from_model(package: &Package) -> Self {
		let channels = package
			.channels
			.values()
			.map(|channel| {
				let head = package.channel_head(channel).map(|b| b.name.clone()).unwrap_or_default();
				let mut entries: Vec<EntryIndex> = channel
					.entries
					.iter()
					.map(|e| EntryIndex {
						name: e.name.clone(),
						replaces: e.replaces.clone(),
						skips: e.skips.clone(),
						skip_range: e.skip_range.clone(),
					})
					.collect();
				entries.sort_by(|a, b| a.name.cmp(&b.name));
				let index = ChannelIndex {
					head,
					deprecation: channel.deprecation.as_ref().map(DeprecationIndex::from_model),
					entries,
				};
				(channel.name.clone(), index)
			})
			.collect();

		let bundles = package
			.bundles
			.values()
			.map(|bundle| {
				let index = BundleIndex {
					bundle_path: bundle.image.clone(),
					version: bundle.version.to_string(),
					provided_apis: bundle.provided_apis.iter().map(gvk).collect(),
					required_apis: bundle.required_apis.iter().map(gvk).collect(),
					dependencies: bundle
						.dependencies
						.iter()
						.map(|d| Dependency { r#type: d.r#type.clone(), value: d.value.clone() })
						.collect(),
					properties: bundle
						.properties
						.iter()
						.map(|p| Property { r#type: p.r#type.clone(), value: p.value.get().to_string() })
						.collect(),
					csv_json: bundle.csv_json.clone(),
					objects: bundle.objects.clone(),
					deprecation: bundle.deprecation.as_ref().map(DeprecationIndex::from_model),
				};
				(bundle.name.clone(), index)
			})
			.collect();

		Self {
			name: package.name.clone(),
			description: package.description.clone(),
			default_channel: package.default_channel.clone(),
			deprecation: package.deprecation.as_ref().map(DeprecationIndex::from_model),
			channels,
			bundles,
		}
	}
}

fn gvk(g: &opcat_model::Gvk) -> GroupVersionKind {
	GroupVersionKind::new(g.group.clone(), g.version.clone(), g.kind.clone())
}

/// Build the GVK reverse index: provider package names per provided API.
pub(crate) fn api_index(model: &Model) -> BTreeMap<GvkKey, BTreeSet<String>> {
	let mut apis: BTreeMap<GvkKey, BTreeSet<String>> = BTreeMap::new();
	for package in model.packages.values() {
		for bundle in package.bundles.values() {
			for gvk in &bundle.provided_apis {
				apis.entry((gvk.group.clone(), gvk.version.clone(), gvk.kind.clone()))
					.or_default()
					.insert(package.name.clone());
			}
		}
	}
	apis
}
