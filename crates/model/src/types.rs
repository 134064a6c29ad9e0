// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::{BTreeMap, HashSet};

use opcat_declcfg::{ChannelEntry, Icon, Property, RelatedImage};
use semver::Version;

/// The whole catalog, indexed by package name. Immutable once projected.
#[derive(Debug, Default)]
pub struct Model {
	pub packages: BTreeMap<String, Package>,
}

impl Model {
	pub fn package(&self, name: &str) -> Option<&Package> {
		self.packages.get(name)
	}
}

#[derive(Debug)]
pub struct Package {
	pub name: String,
	pub description: String,
	pub icon: Option<Icon>,
	pub default_channel: String,
	pub properties: Vec<Property>,
	pub channels: BTreeMap<String, Channel>,
	/// Bundle bodies, stored once per `(package, bundle-name)` and referenced
	/// from every channel entry naming them.
	pub bundles: BTreeMap<String, Bundle>,
	pub deprecation: Option<Deprecation>,
}

impl Package {
	/// Resolve the head of `channel`: the entry that no other entry of the
	/// channel replaces or skips, preferring the greatest version and then
	/// the greatest name when several remain.
	pub fn channel_head<'a>(&'a self, channel: &'a Channel) -> Option<&'a Bundle> {
		let mut targeted: HashSet<&str> = HashSet::new();
		for entry in &channel.entries {
			if !entry.replaces.is_empty() {
				targeted.insert(entry.replaces.as_str());
			}
			for skip in &entry.skips {
				targeted.insert(skip.as_str());
			}
		}
		channel
			.entries
			.iter()
			.filter(|e| !targeted.contains(e.name.as_str()))
			.filter_map(|e| self.bundles.get(&e.name))
			.max_by(|a, b| a.version.cmp(&b.version).then_with(|| a.name.cmp(&b.name)))
	}
}

#[derive(Debug)]
pub struct Channel {
	pub name: String,
	/// Entries in declaration order. `replaces` and `skips` may name bundles
	/// that exist only as synthetic edges.
	pub entries: Vec<ChannelEntry>,
	pub properties: Vec<Property>,
	pub deprecation: Option<Deprecation>,
}

impl Channel {
	pub fn entry(&self, name: &str) -> Option<&ChannelEntry> {
		self.entries.iter().find(|e| e.name == name)
	}
}

#[derive(Debug)]
pub struct Bundle {
	pub name: String,
	pub image: String,
	pub version: Version,
	/// Pass-through properties (everything but `olm.bundle.object`).
	pub properties: Vec<Property>,
	/// JSON text of the ClusterServiceVersion manifest, empty when the bundle
	/// embeds none.
	pub csv_json: String,
	/// JSON text of every embedded manifest, CSV included.
	pub objects: Vec<String>,
	pub related_images: Vec<RelatedImage>,
	pub provided_apis: Vec<Gvk>,
	pub required_apis: Vec<Gvk>,
	pub dependencies: Vec<Dependency>,
	pub deprecation: Option<Deprecation>,
}

/// An API identifier. Ordering and equality are over `(group, version, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gvk {
	pub group: String,
	pub version: String,
	pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
	pub r#type: String,
	pub value: String,
}

/// An advisory message attached to exactly one package, channel or bundle.
/// The reference it was declared with is kept so responses can surface the
/// scope of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
	pub reference_schema: String,
	pub reference_name: String,
	pub message: String,
}
