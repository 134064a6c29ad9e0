// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The query engine: [`opcat_registry::Query`] over a loaded cache.
//!
//! Every operation reads the lazily decoded package indexes. Streaming
//! operations return iterators that touch one package at a time, so no full
//! result set is ever buffered; two identical calls on the same loaded cache
//! yield identical sequences.

use std::sync::Arc;

use opcat_registry::{
	ApiBundle, ApiChannel, ApiPackage, ChannelEntry, Deprecation, Error, GroupVersionKind, Property, Query, Result,
	RowIter,
};
use semver::{Version, VersionReq};

use crate::{
	index::{BundleIndex, ChannelIndex, EntryIndex, GvkKey, PackageIndex},
	Store,
};

/// Which fields a materialized bundle carries. The unary lookups serve
/// manifests but no channel-graph edges; the bundle stream is the inverse.
#[derive(Clone, Copy, PartialEq)]
enum RowShape {
	Unary,
	Stream,
}

impl Query for Store {
	fn list_packages(&self) -> Result<Vec<String>> {
		let names = self.package_names().map_err(Error::from)?;
		Ok(names.as_ref().clone())
	}

	fn get_package(&self, name: &str) -> Result<ApiPackage> {
		let package = self.require_package(name)?;
		let channels = package
			.channels
			.iter()
			.map(|(channel_name, channel)| ApiChannel {
				name: channel_name.clone(),
				csv_name: channel.head.clone(),
				deprecation: message(&channel.deprecation),
			})
			.collect();
		Ok(ApiPackage {
			name: package.name.clone(),
			description: package.description.clone(),
			channels,
			default_channel_name: package.default_channel.clone(),
			deprecation: message(&package.deprecation),
		})
	}

	fn get_bundle(&self, package: &str, channel: &str, name: &str) -> Result<ApiBundle> {
		let index = self.require_package(package)?;
		let channel_index = require_channel(&index, channel)?;
		let entry = channel_index.entry(name).ok_or_else(|| {
			Error::not_found(format!("bundle {name} in channel {channel} of package {package}"))
		})?;
		Ok(bundle_row(&index, channel, channel_index, entry, RowShape::Unary))
	}

	fn get_bundle_for_channel(&self, package: &str, channel: &str) -> Result<ApiBundle> {
		let index = self.require_package(package)?;
		let channel_index = require_channel(&index, channel)?;
		if channel_index.head.is_empty() {
			return Err(Error::not_found(format!("head of channel {channel} in package {package}")));
		}
		let head = channel_index.head.clone();
		self.get_bundle(package, channel, &head)
	}

	fn get_bundle_that_replaces(&self, name: &str, package: &str, channel: &str) -> Result<ApiBundle> {
		let index = self.require_package(package)?;
		let channel_index = require_channel(&index, channel)?;

		// A skip range can only match when the replaced name resolves to a
		// real bundle of this channel; a range never matches a bare name.
		let replaced_version = channel_index
			.entry(name)
			.and_then(|e| index.bundles.get(&e.name))
			.and_then(|b| Version::parse(&b.version).ok());

		let candidate = channel_index
			.entries
			.iter()
			.filter(|e| e.name != name)
			.filter(|e| {
				e.replaces == name
					|| e.skips.iter().any(|s| s == name)
					|| matches_skip_range(&e.skip_range, replaced_version.as_ref())
			})
			.max_by(|a, b| {
				let version = |e: &EntryIndex| {
					index.bundles.get(&e.name).and_then(|b| Version::parse(&b.version).ok())
				};
				version(a).cmp(&version(b)).then_with(|| a.name.cmp(&b.name))
			});

		match candidate {
			Some(entry) => Ok(bundle_row(&index, channel, channel_index, entry, RowShape::Unary)),
			None => Err(Error::not_found(format!("replacement of {name} in channel {channel} of package {package}"))),
		}
	}

	fn get_channel_entries_that_replace(&self, name: &str) -> Result<RowIter<ChannelEntry>> {
		let names = self.package_names().map_err(Error::from)?.as_ref().clone();
		let replaced = name.to_string();
		Ok(self.scan_packages(names, move |package| {
			let mut rows = Vec::new();
			for (channel_name, channel) in &package.channels {
				for entry in &channel.entries {
					if entry.replaces == replaced {
						rows.push(ChannelEntry {
							package_name: package.name.clone(),
							channel_name: channel_name.clone(),
							bundle_name: entry.name.clone(),
							replaces: entry.replaces.clone(),
						});
					}
				}
			}
			rows
		}))
	}

	fn get_channel_entries_that_provide(&self, gvk: &GroupVersionKind) -> Result<RowIter<ChannelEntry>> {
		let key = key_of(gvk);
		let providers = self.api_providers(&key).map_err(Error::from)?.as_ref().clone();
		Ok(self.scan_packages(providers, move |package| {
			let mut rows = Vec::new();
			for (channel_name, channel) in &package.channels {
				for entry in &channel.entries {
					if !provides(package, entry, &key) {
						continue;
					}
					// One row per incoming edge: the replaces edge when
					// present plus one per skipped name. A bundle with
					// neither gets a single empty-replaces row.
					let mut edges = Vec::new();
					if !entry.replaces.is_empty() {
						edges.push(entry.replaces.clone());
					}
					edges.extend(entry.skips.iter().cloned());
					if edges.is_empty() {
						edges.push(String::new());
					}
					for replaces in edges {
						rows.push(ChannelEntry {
							package_name: package.name.clone(),
							channel_name: channel_name.clone(),
							bundle_name: entry.name.clone(),
							replaces,
						});
					}
				}
			}
			rows.sort();
			rows
		}))
	}

	fn get_latest_channel_entries_that_provide(&self, gvk: &GroupVersionKind) -> Result<RowIter<ChannelEntry>> {
		let key = key_of(gvk);
		let providers = self.api_providers(&key).map_err(Error::from)?.as_ref().clone();
		Ok(self.scan_packages(providers, move |package| {
			let mut rows = Vec::new();
			for (channel_name, channel) in &package.channels {
				let Some(entry) = channel.entry(&channel.head) else { continue };
				if provides(package, entry, &key) {
					rows.push(ChannelEntry {
						package_name: package.name.clone(),
						channel_name: channel_name.clone(),
						bundle_name: entry.name.clone(),
						replaces: entry.replaces.clone(),
					});
				}
			}
			rows
		}))
	}

	fn get_default_bundle_that_provides(&self, gvk: &GroupVersionKind) -> Result<ApiBundle> {
		let key = key_of(gvk);
		let providers = self.api_providers(&key).map_err(Error::from)?;
		for name in providers.iter() {
			let Some(package) = self.package(name).map_err(Error::from)? else { continue };
			let Some(channel) = package.channels.get(&package.default_channel) else { continue };
			let Some(entry) = channel.entry(&channel.head) else { continue };
			if provides(&package, entry, &key) {
				return Ok(bundle_row(&package, &package.default_channel, channel, entry, RowShape::Unary));
			}
		}
		let (group, version, kind) = key;
		Err(Error::not_found(format!("default bundle providing {group}/{version}/{kind}")))
	}

	fn list_bundles(&self) -> Result<RowIter<ApiBundle>> {
		let names = self.package_names().map_err(Error::from)?.as_ref().clone();
		Ok(self.scan_packages(names, |package| {
			let mut rows = Vec::new();
			for (channel_name, channel) in &package.channels {
				for entry in &channel.entries {
					rows.push(bundle_row(package, channel_name, channel, entry, RowShape::Stream));
				}
			}
			rows
		}))
	}
}

impl Store {
	fn require_package(&self, name: &str) -> Result<Arc<PackageIndex>> {
		self.package(name)
			.map_err(Error::from)?
			.ok_or_else(|| Error::not_found(format!("package {name}")))
	}

	/// Run `per_package` over each named package in order, decoding lazily:
	/// a package index is only read when iteration reaches it.
	fn scan_packages<T, F>(&self, names: Vec<String>, per_package: F) -> RowIter<T>
	where
		T: Send + 'static,
		F: Fn(&PackageIndex) -> Vec<T> + Send + 'static,
	{
		let store = self.clone();
		Box::new(names.into_iter().flat_map(move |name| -> Vec<Result<T>> {
			match store.package(&name) {
				Ok(Some(package)) => per_package(&package).into_iter().map(Ok).collect(),
				Ok(None) => Vec::new(),
				Err(e) => vec![Err(e.into())],
			}
		}))
	}
}

impl ChannelIndex {
	pub(crate) fn entry(&self, name: &str) -> Option<&EntryIndex> {
		self.entries.iter().find(|e| e.name == name)
	}
}

fn require_channel<'a>(package: &'a PackageIndex, name: &str) -> Result<&'a ChannelIndex> {
	package
		.channels
		.get(name)
		.ok_or_else(|| Error::not_found(format!("channel {name} in package {}", package.name)))
}

fn key_of(gvk: &GroupVersionKind) -> GvkKey {
	(gvk.group.clone(), gvk.version.clone(), gvk.kind.clone())
}

/// Does the bundle behind `entry` provide the API? Plural is informational
/// and never part of the comparison.
fn provides(package: &PackageIndex, entry: &EntryIndex, key: &GvkKey) -> bool {
	package.bundles.get(&entry.name).is_some_and(|bundle| {
		bundle
			.provided_apis
			.iter()
			.any(|api| api.group == key.0 && api.version == key.1 && api.kind == key.2)
	})
}

fn matches_skip_range(skip_range: &str, replaced_version: Option<&Version>) -> bool {
	if skip_range.is_empty() {
		return false;
	}
	match (VersionReq::parse(skip_range), replaced_version) {
		(Ok(range), Some(version)) => range.matches(version),
		_ => false,
	}
}

fn message(deprecation: &Option<crate::index::DeprecationIndex>) -> Option<Deprecation> {
	deprecation.as_ref().map(|d| Deprecation { message: d.message.clone() })
}

/// Materialize one `(package, channel, entry)` position as a served bundle.
///
/// Unary responses carry manifests but no channel-graph edges; streamed rows
/// carry the edges and drop the manifests. Deprecations in scope ride along
/// as `olm.deprecation` properties either way.
fn bundle_row(
	package: &PackageIndex,
	channel_name: &str,
	channel: &ChannelIndex,
	entry: &EntryIndex,
	shape: RowShape,
) -> ApiBundle {
	let empty = BundleIndex::placeholder();
	let bundle = package.bundles.get(&entry.name).unwrap_or(&empty);

	let mut properties: Vec<Property> = bundle.properties.clone();
	for deprecation in [&bundle.deprecation, &channel.deprecation, &package.deprecation].into_iter().flatten() {
		properties.push(deprecation.to_property());
	}

	ApiBundle {
		csv_name: entry.name.clone(),
		package_name: package.name.clone(),
		channel_name: channel_name.to_string(),
		csv_json: if shape == RowShape::Unary { bundle.csv_json.clone() } else { String::new() },
		objects: if shape == RowShape::Unary { bundle.objects.clone() } else { Vec::new() },
		bundle_path: bundle.bundle_path.clone(),
		provided_apis: bundle.provided_apis.clone(),
		required_apis: bundle.required_apis.clone(),
		version: bundle.version.clone(),
		skip_range: entry.skip_range.clone(),
		dependencies: bundle.dependencies.clone(),
		properties,
		replaces: if shape == RowShape::Stream { entry.replaces.clone() } else { String::new() },
		skips: if shape == RowShape::Stream { entry.skips.clone() } else { Vec::new() },
	}
}

impl BundleIndex {
	fn placeholder() -> Self {
		Self {
			bundle_path: String::new(),
			version: String::new(),
			provided_apis: Vec::new(),
			required_apis: Vec::new(),
			dependencies: Vec::new(),
			properties: Vec::new(),
			csv_json: String::new(),
			objects: Vec::new(),
			deprecation: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use opcat_testing::{
		fixtures::{write_cockroachdb_catalog, write_etcd_catalog, ETCD_CSV_JSON},
		tempdir::catalog_scratch,
	};

	use super::*;

	const ETCD_CLUSTER: (&str, &str, &str) = ("etcd.database.coreos.com", "v1beta2", "EtcdCluster");

	fn with_store(test: impl FnOnce(&Store)) {
		catalog_scratch("query", |source, cache| {
			write_etcd_catalog(source)?;
			write_cockroachdb_catalog(source)?;

			let store = Store::new(cache).unwrap();
			store.build(source).unwrap();
			store.load().unwrap();
			test(&store);
			Ok(())
		})
		.unwrap()
	}

	fn gvk((group, version, kind): (&str, &str, &str)) -> GroupVersionKind {
		GroupVersionKind::new(group, version, kind)
	}

	fn entry(package: &str, channel: &str, bundle: &str, replaces: &str) -> ChannelEntry {
		ChannelEntry {
			package_name: package.to_string(),
			channel_name: channel.to_string(),
			bundle_name: bundle.to_string(),
			replaces: replaces.to_string(),
		}
	}

	fn collect<T>(rows: RowIter<T>) -> Vec<T> {
		rows.map(|r| r.unwrap()).collect()
	}

	#[test]
	fn test_list_packages() {
		with_store(|store| {
			assert_eq!(store.list_packages().unwrap(), vec!["cockroachdb", "etcd"]);
		})
	}

	#[test]
	fn test_get_package() {
		with_store(|store| {
			let package = store.get_package("etcd").unwrap();
			assert_eq!(package.name, "etcd");
			assert_eq!(package.default_channel_name, "alpha");
			let summary: Vec<(&str, &str)> =
				package.channels.iter().map(|c| (c.name.as_str(), c.csv_name.as_str())).collect();
			assert_eq!(
				summary,
				vec![
					("alpha", "etcdoperator.v0.9.2"),
					("beta", "etcdoperator.v0.9.0"),
					("stable", "etcdoperator.v0.9.2"),
				]
			);
			assert!(package.deprecation.is_none());
		})
	}

	#[test]
	fn test_get_package_carries_deprecations() {
		with_store(|store| {
			let package = store.get_package("cockroachdb").unwrap();
			assert_eq!(package.default_channel_name, "stable-v6.x");
			assert!(package.deprecation.unwrap().message.contains("end of life"));

			let stable5 = package.channels.iter().find(|c| c.name == "stable-5.x").unwrap();
			assert_eq!(stable5.csv_name, "cockroachdb.v5.0.4");
			assert!(stable5.deprecation.as_ref().unwrap().message.contains("no longer supported"));
			let stable6 = package.channels.iter().find(|c| c.name == "stable-v6.x").unwrap();
			assert!(stable6.deprecation.is_none());
		})
	}

	#[test]
	fn test_get_package_not_found() {
		with_store(|store| {
			assert!(matches!(store.get_package("missing"), Err(Error::NotFound { .. })));
		})
	}

	#[test]
	fn test_get_bundle() {
		with_store(|store| {
			let bundle = store.get_bundle("etcd", "alpha", "etcdoperator.v0.9.2").unwrap();
			assert_eq!(bundle.csv_name, "etcdoperator.v0.9.2");
			assert_eq!(bundle.package_name, "etcd");
			assert_eq!(bundle.channel_name, "alpha");
			assert_eq!(bundle.version, "0.9.2");
			assert_eq!(bundle.skip_range, "< 0.6.0");
			assert_eq!(bundle.bundle_path, "fake/etcd-operator:v0.9.2");
			assert_eq!(bundle.csv_json, ETCD_CSV_JSON);
			assert_eq!(bundle.objects.len(), 2);
			assert_eq!(bundle.provided_apis.len(), 3);
			assert_eq!(bundle.required_apis, vec![gvk(ETCD_CLUSTER)]);
			assert_eq!(bundle.dependencies.len(), 1);
			assert_eq!(bundle.dependencies[0].r#type, "olm.gvk");

			// The channel graph edges stay out of unary responses.
			assert_eq!(bundle.replaces, "");
			assert!(bundle.skips.is_empty());

			// Pass-through properties survive byte-for-byte.
			let other = bundle.properties.iter().find(|p| p.r#type == "other").unwrap();
			assert_eq!(other.value, r#"{"its":"notdefined"}"#);
			assert!(bundle.properties.iter().all(|p| p.r#type != "olm.bundle.object"));
		})
	}

	#[test]
	fn test_get_bundle_not_found() {
		with_store(|store| {
			assert!(matches!(store.get_bundle("etcd", "alpha", "missing.v1"), Err(Error::NotFound { .. })));
			assert!(matches!(store.get_bundle("etcd", "missing", "etcdoperator.v0.9.2"), Err(Error::NotFound { .. })));
		})
	}

	#[test]
	fn test_get_bundle_attaches_deprecation_properties() {
		with_store(|store| {
			let bundle = store.get_bundle("cockroachdb", "stable-5.x", "cockroachdb.v5.0.4").unwrap();
			let deprecations: Vec<&Property> =
				bundle.properties.iter().filter(|p| p.r#type == "olm.deprecation").collect();
			// Channel and package scope apply; the v5.0.3 bundle message does not.
			assert_eq!(deprecations.len(), 2);
			assert!(deprecations.iter().any(|p| p.value.contains("no longer supported")));
			assert!(deprecations.iter().any(|p| p.value.contains("end of life")));
			assert!(!deprecations.iter().any(|p| p.value.contains("cockroachdb.v5.0.3 is deprecated")));

			let deprecated = store.get_bundle("cockroachdb", "stable-5.x", "cockroachdb.v5.0.3").unwrap();
			let count = deprecated.properties.iter().filter(|p| p.r#type == "olm.deprecation").count();
			assert_eq!(count, 3);
		})
	}

	#[test]
	fn test_get_bundle_for_channel() {
		with_store(|store| {
			assert_eq!(store.get_bundle_for_channel("etcd", "alpha").unwrap().csv_name, "etcdoperator.v0.9.2");
			assert_eq!(store.get_bundle_for_channel("etcd", "beta").unwrap().csv_name, "etcdoperator.v0.9.0");
		})
	}

	#[test]
	fn test_get_bundle_that_replaces() {
		with_store(|store| {
			let bundle = store.get_bundle_that_replaces("etcdoperator.v0.9.0", "etcd", "alpha").unwrap();
			assert_eq!(bundle.csv_name, "etcdoperator.v0.9.2");
		})
	}

	#[test]
	fn test_get_bundle_that_replaces_synthetic_skip() {
		with_store(|store| {
			// v0.9.1 is not a bundle anywhere; v0.9.2 skips it.
			let bundle = store.get_bundle_that_replaces("etcdoperator.v0.9.1", "etcd", "alpha").unwrap();
			assert_eq!(bundle.csv_name, "etcdoperator.v0.9.2");
		})
	}

	#[test]
	fn test_get_bundle_that_replaces_via_skip_range() {
		with_store(|store| {
			// cockroachdb.v5.0.4 has version 5.0.4, inside v6.0.0's <6.0.0
			// range, but v5.0.4 is not in channel stable-v6.x, so the range
			// has nothing to resolve against there.
			let err = store.get_bundle_that_replaces("cockroachdb.v5.0.4", "cockroachdb", "stable-v6.x").unwrap_err();
			assert!(matches!(err, Error::NotFound { .. }));

			// In its own channel v5.0.3 resolves to 5.0.3 and only the
			// explicit replaces edge of v5.0.4 matches.
			let bundle = store.get_bundle_that_replaces("cockroachdb.v5.0.3", "cockroachdb", "stable-5.x").unwrap();
			assert_eq!(bundle.csv_name, "cockroachdb.v5.0.4");
		})
	}

	#[test]
	fn test_get_bundle_that_replaces_skip_range_resolves_in_channel() {
		catalog_scratch("skip-range", |source, cache| {
			fs::write(
				source.join("catalog.json"),
				r#"{"schema": "olm.package", "name": "a", "defaultChannel": "stable"}
				{"schema": "olm.channel", "name": "stable", "package": "a", "entries": [
					{"name": "a.v1"},
					{"name": "a.v2", "skipRange": "<2.0.0"}]}
				{"schema": "olm.bundle", "name": "a.v1", "package": "a", "properties": [
					{"type": "olm.package", "value": {"packageName": "a", "version": "1.0.0"}}]}
				{"schema": "olm.bundle", "name": "a.v2", "package": "a", "properties": [
					{"type": "olm.package", "value": {"packageName": "a", "version": "2.0.0"}}]}"#,
			)?;

			let store = Store::new(cache).unwrap();
			store.build(source).unwrap();
			store.load().unwrap();

			// No explicit edge links a.v2 to a.v1; the skip range does.
			let bundle = store.get_bundle_that_replaces("a.v1", "a", "stable").unwrap();
			assert_eq!(bundle.csv_name, "a.v2");
			Ok(())
		})
		.unwrap()
	}

	#[test]
	fn test_provide_entries_for_skip_only_root() {
		catalog_scratch("provide-skip-root", |source, cache| {
			fs::write(
				source.join("catalog.json"),
				r#"{"schema": "olm.package", "name": "b", "defaultChannel": "stable"}
				{"schema": "olm.channel", "name": "stable", "package": "b", "entries": [
					{"name": "b.v2", "skips": ["b.v1"]}]}
				{"schema": "olm.bundle", "name": "b.v2", "package": "b", "properties": [
					{"type": "olm.package", "value": {"packageName": "b", "version": "2.0.0"}},
					{"type": "olm.gvk", "value": {"group": "example.com", "kind": "Widget", "version": "v1"}}]}"#,
			)?;

			let store = Store::new(cache).unwrap();
			store.build(source).unwrap();
			store.load().unwrap();

			// A channel root whose only incoming edges are skips gets one
			// row per skip and no empty-replaces row.
			let rows = collect(store.get_channel_entries_that_provide(&gvk(("example.com", "v1", "Widget"))).unwrap());
			assert_eq!(rows, vec![entry("b", "stable", "b.v2", "b.v1")]);
			Ok(())
		})
		.unwrap()
	}

	#[test]
	fn test_get_channel_entries_that_replace() {
		with_store(|store| {
			let rows = collect(store.get_channel_entries_that_replace("etcdoperator.v0.6.1").unwrap());
			assert_eq!(
				rows,
				vec![
					entry("etcd", "alpha", "etcdoperator.v0.9.0", "etcdoperator.v0.6.1"),
					entry("etcd", "beta", "etcdoperator.v0.9.0", "etcdoperator.v0.6.1"),
					entry("etcd", "stable", "etcdoperator.v0.9.0", "etcdoperator.v0.6.1"),
				]
			);

			// Skip edges are not replace edges.
			let rows = collect(store.get_channel_entries_that_replace("etcdoperator.v0.9.1").unwrap());
			assert!(rows.is_empty());
		})
	}

	#[test]
	fn test_get_channel_entries_that_provide() {
		with_store(|store| {
			let rows = collect(store.get_channel_entries_that_provide(&gvk(ETCD_CLUSTER)).unwrap());
			assert_eq!(
				rows,
				vec![
					entry("etcd", "alpha", "etcdoperator.v0.6.1", ""),
					entry("etcd", "alpha", "etcdoperator.v0.9.0", "etcdoperator.v0.6.1"),
					entry("etcd", "alpha", "etcdoperator.v0.9.2", "etcdoperator.v0.9.0"),
					entry("etcd", "alpha", "etcdoperator.v0.9.2", "etcdoperator.v0.9.1"),
					entry("etcd", "beta", "etcdoperator.v0.6.1", ""),
					entry("etcd", "beta", "etcdoperator.v0.9.0", "etcdoperator.v0.6.1"),
					entry("etcd", "stable", "etcdoperator.v0.6.1", ""),
					entry("etcd", "stable", "etcdoperator.v0.9.0", "etcdoperator.v0.6.1"),
					entry("etcd", "stable", "etcdoperator.v0.9.2", "etcdoperator.v0.9.0"),
					entry("etcd", "stable", "etcdoperator.v0.9.2", "etcdoperator.v0.9.1"),
				]
			);
		})
	}

	#[test]
	fn test_get_latest_channel_entries_that_provide() {
		with_store(|store| {
			let rows = collect(store.get_latest_channel_entries_that_provide(&gvk(ETCD_CLUSTER)).unwrap());
			assert_eq!(
				rows,
				vec![
					entry("etcd", "alpha", "etcdoperator.v0.9.2", "etcdoperator.v0.9.0"),
					entry("etcd", "beta", "etcdoperator.v0.9.0", "etcdoperator.v0.6.1"),
					entry("etcd", "stable", "etcdoperator.v0.9.2", "etcdoperator.v0.9.0"),
				]
			);
		})
	}

	#[test]
	fn test_get_default_bundle_that_provides() {
		with_store(|store| {
			let bundle = store.get_default_bundle_that_provides(&gvk(ETCD_CLUSTER)).unwrap();
			assert_eq!(bundle.csv_name, "etcdoperator.v0.9.2");
			assert_eq!(bundle.channel_name, "alpha");

			let err = store.get_default_bundle_that_provides(&gvk(("nope", "v1", "Nope"))).unwrap_err();
			assert!(matches!(err, Error::NotFound { .. }));
		})
	}

	#[test]
	fn test_get_default_bundle_prefers_smallest_package() {
		with_store(|store| {
			let bundle = store
				.get_default_bundle_that_provides(&gvk(("charts.operatorhub.io", "v1alpha1", "Cockroachdb")))
				.unwrap();
			assert_eq!(bundle.package_name, "cockroachdb");
			assert_eq!(bundle.csv_name, "cockroachdb.v6.0.0");
		})
	}

	#[test]
	fn test_list_bundles() {
		with_store(|store| {
			let rows = collect(store.list_bundles().unwrap());
			// cockroachdb: 2 + 1 entries; etcd: 3 + 2 + 3 entries.
			assert_eq!(rows.len(), 11);

			// Streamed rows carry the channel graph edges but no manifests.
			let streamed = rows
				.iter()
				.find(|b| b.csv_name == "etcdoperator.v0.9.2" && b.channel_name == "alpha")
				.unwrap();
			assert_eq!(streamed.replaces, "etcdoperator.v0.9.0");
			assert_eq!(streamed.skips, vec!["etcdoperator.v0.9.1"]);
			assert_eq!(streamed.skip_range, "< 0.6.0");
			assert!(streamed.csv_json.is_empty());
			assert!(streamed.objects.is_empty());

			// Each (package, channel, bundle) position appears exactly once.
			let v092 = store.get_bundle("etcd", "alpha", "etcdoperator.v0.9.2").unwrap();
			let occurrences = rows
				.iter()
				.filter(|b| {
					b.package_name == v092.package_name
						&& b.channel_name == v092.channel_name && b.csv_name == v092.csv_name
				})
				.count();
			assert_eq!(occurrences, 1);
		})
	}

	#[test]
	fn test_queries_are_deterministic() {
		with_store(|store| {
			let first = collect(store.list_bundles().unwrap());
			let second = collect(store.list_bundles().unwrap());
			assert_eq!(first, second);
		})
	}
}
