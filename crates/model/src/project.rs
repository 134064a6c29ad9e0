// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use opcat_declcfg::{
	DeclarativeConfig, DeprecationRef, PropertyBundleObject, PropertyGvk, PropertyPackage, PropertyPackageRequired,
	SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_PACKAGE, TYPE_BUNDLE_OBJECT, TYPE_GVK, TYPE_GVK_REQUIRED, TYPE_PACKAGE,
	TYPE_PACKAGE_REQUIRED,
};
use semver::{Version, VersionReq};

use crate::{types::Dependency, Bundle, Channel, Deprecation, Error, Gvk, Model, Package, Result};

/// Project a declarative config into a validated [`Model`].
///
/// Validation is all-or-nothing: the first violated consistency rule aborts
/// the projection and no partial model is returned.
pub fn project(cfg: DeclarativeConfig) -> Result<Model> {
	let mut model = Model::default();

	for package in cfg.packages {
		if package.name.is_empty() {
			return Err(Error::MissingPackageName);
		}
		if package.default_channel.is_empty() {
			return Err(Error::NoDefaultChannel { package: package.name });
		}
		if model.packages.contains_key(&package.name) {
			return Err(Error::DuplicatePackage { package: package.name });
		}
		model.packages.insert(
			package.name.clone(),
			Package {
				name: package.name,
				description: package.description,
				icon: package.icon,
				default_channel: package.default_channel,
				properties: package.properties,
				channels: BTreeMap::new(),
				bundles: BTreeMap::new(),
				deprecation: None,
			},
		);
	}

	for bundle in cfg.bundles {
		let package = model.packages.get_mut(&bundle.package).ok_or_else(|| Error::UnknownBundlePackage {
			package: bundle.package.clone(),
			bundle: bundle.name.clone(),
		})?;
		if package.bundles.contains_key(&bundle.name) {
			return Err(Error::DuplicateBundle { package: bundle.package, bundle: bundle.name });
		}
		let body = build_bundle(&package.name, bundle)?;
		package.bundles.insert(body.name.clone(), body);
	}

	for channel in cfg.channels {
		let package = model.packages.get_mut(&channel.package).ok_or_else(|| Error::UnknownChannelPackage {
			package: channel.package.clone(),
			channel: channel.name.clone(),
		})?;
		if package.channels.contains_key(&channel.name) {
			return Err(Error::DuplicateChannel { package: channel.package, channel: channel.name });
		}
		validate_entries(package, &channel)?;
		package.channels.insert(
			channel.name.clone(),
			Channel {
				name: channel.name,
				entries: channel.entries,
				properties: channel.properties,
				deprecation: None,
			},
		);
	}

	for package in model.packages.values() {
		if !package.channels.contains_key(&package.default_channel) {
			return Err(Error::MissingDefaultChannel {
				package: package.name.clone(),
				channel: package.default_channel.clone(),
			});
		}
	}

	let mut deprecated_packages = HashSet::new();
	for deprecation in cfg.deprecations {
		if !deprecated_packages.insert(deprecation.package.clone()) {
			return Err(Error::DuplicateDeprecation { package: deprecation.package });
		}
		attach_deprecations(&mut model, deprecation)?;
	}

	Ok(model)
}

fn build_bundle(package: &str, bundle: opcat_declcfg::Bundle) -> Result<Bundle> {
	let name = bundle.name;
	let invalid = |source| Error::InvalidBundleProperty { bundle: name.clone(), source };

	let mut package_property: Option<PropertyPackage> = None;
	let mut provided: BTreeSet<Gvk> = BTreeSet::new();
	let mut required: BTreeSet<Gvk> = BTreeSet::new();
	let mut dependencies = Vec::new();
	let mut csv_json = String::new();
	let mut objects = Vec::new();
	let mut properties = Vec::new();

	for property in bundle.properties {
		match property.r#type.as_str() {
			TYPE_PACKAGE => {
				if package_property.is_some() {
					return Err(Error::DuplicatePackageProperty { bundle: name.clone() });
				}
				package_property = Some(property.parse::<PropertyPackage>().map_err(invalid)?);
				properties.push(property);
			}
			TYPE_GVK => {
				let gvk = property.parse::<PropertyGvk>().map_err(invalid)?;
				provided.insert(Gvk { group: gvk.group, version: gvk.version, kind: gvk.kind });
				properties.push(property);
			}
			TYPE_GVK_REQUIRED => {
				let gvk = property.parse::<PropertyGvk>().map_err(invalid)?;
				dependencies.push(Dependency { r#type: TYPE_GVK.to_string(), value: property.value.get().to_string() });
				required.insert(Gvk { group: gvk.group, version: gvk.version, kind: gvk.kind });
				properties.push(property);
			}
			TYPE_PACKAGE_REQUIRED => {
				property.parse::<PropertyPackageRequired>().map_err(invalid)?;
				dependencies
					.push(Dependency { r#type: TYPE_PACKAGE.to_string(), value: property.value.get().to_string() });
				properties.push(property);
			}
			TYPE_BUNDLE_OBJECT => {
				let object = property.parse::<PropertyBundleObject>().map_err(invalid)?;
				let manifest = object.decode().map_err(invalid)?;
				if csv_json.is_empty() && is_csv_manifest(&manifest) {
					csv_json = manifest.clone();
				}
				objects.push(manifest);
			}
			_ => properties.push(property),
		}
	}

	let package_property = package_property.ok_or_else(|| Error::MissingBundleVersion { bundle: name.clone() })?;
	if package_property.package_name != package {
		return Err(Error::BundlePackageMismatch {
			package: package.to_string(),
			bundle: name.clone(),
			property_package: package_property.package_name,
		});
	}
	let version = Version::parse(&package_property.version).map_err(|e| Error::InvalidVersion {
		bundle: name.clone(),
		version: package_property.version.clone(),
		reason: e.to_string(),
	})?;

	Ok(Bundle {
		name,
		image: bundle.image,
		version,
		properties,
		csv_json,
		objects,
		related_images: bundle.related_images,
		provided_apis: provided.into_iter().collect(),
		required_apis: required.into_iter().collect(),
		dependencies,
		deprecation: None,
	})
}

fn is_csv_manifest(manifest: &str) -> bool {
	let Ok(value) = serde_json::from_str::<serde_json::Value>(manifest) else {
		return false;
	};
	value.get("kind").and_then(|k| k.as_str()) == Some("ClusterServiceVersion")
}

fn validate_entries(package: &Package, channel: &opcat_declcfg::Channel) -> Result<()> {
	let mut seen = HashSet::new();
	for entry in &channel.entries {
		if !seen.insert(entry.name.as_str()) {
			return Err(Error::DuplicateChannelEntry {
				package: package.name.clone(),
				channel: channel.name.clone(),
				entry: entry.name.clone(),
			});
		}
		if !package.bundles.contains_key(&entry.name) {
			return Err(Error::DanglingEntry {
				package: package.name.clone(),
				channel: channel.name.clone(),
				entry: entry.name.clone(),
			});
		}
		if !entry.skip_range.is_empty() {
			VersionReq::parse(&entry.skip_range).map_err(|e| Error::InvalidSkipRange {
				channel: channel.name.clone(),
				entry: entry.name.clone(),
				skip_range: entry.skip_range.clone(),
				reason: e.to_string(),
			})?;
		}
	}
	detect_cycles(package, channel)
}

/// Walk the `replaces` edges of every entry. Edges leaving the channel (to a
/// synthetic or out-of-channel name) terminate a chain; revisiting an entry
/// already on the current chain is a cycle.
fn detect_cycles(package: &Package, channel: &opcat_declcfg::Channel) -> Result<()> {
	const IN_PROGRESS: u8 = 1;
	const DONE: u8 = 2;

	let replaces: HashMap<&str, &str> = channel
		.entries
		.iter()
		.filter(|e| !e.replaces.is_empty())
		.map(|e| (e.name.as_str(), e.replaces.as_str()))
		.collect();

	let mut state: HashMap<&str, u8> = HashMap::new();
	for entry in &channel.entries {
		if state.get(entry.name.as_str()).is_some() {
			continue;
		}
		let mut chain = Vec::new();
		let mut current = entry.name.as_str();
		loop {
			match state.get(current) {
				Some(&IN_PROGRESS) => {
					return Err(Error::CyclicChannel {
						package: package.name.clone(),
						channel: channel.name.clone(),
						entry: current.to_string(),
					});
				}
				Some(&DONE) => break,
				_ => {}
			}
			state.insert(current, IN_PROGRESS);
			chain.push(current);
			// A target with no outgoing edge cannot close a cycle.
			match replaces.get(current) {
				Some(next) if replaces.contains_key(next) => current = next,
				_ => break,
			}
		}
		for name in chain {
			state.insert(name, DONE);
		}
	}
	Ok(())
}

fn attach_deprecations(model: &mut Model, deprecation: opcat_declcfg::Deprecation) -> Result<()> {
	let reference_display = |r: &DeprecationRef| {
		if r.name.is_empty() {
			r.schema.clone()
		} else {
			format!("{} {}", r.schema, r.name)
		}
	};

	let package_name = deprecation.package.clone();
	let package = model.packages.get_mut(&package_name).ok_or_else(|| Error::DanglingDeprecation {
		package: package_name.clone(),
		reference: SCHEMA_PACKAGE.to_string(),
	})?;

	let mut seen: HashSet<DeprecationRef> = HashSet::new();
	for entry in deprecation.entries {
		if !seen.insert(entry.reference.clone()) {
			return Err(Error::AmbiguousDeprecation {
				package: package_name.clone(),
				reference: reference_display(&entry.reference),
			});
		}
		let attached = Deprecation {
			reference_schema: entry.reference.schema.clone(),
			reference_name: entry.reference.name.clone(),
			message: entry.message,
		};
		let target = match entry.reference.schema.as_str() {
			SCHEMA_PACKAGE if entry.reference.name.is_empty() || entry.reference.name == package_name => {
				Some(&mut package.deprecation)
			}
			SCHEMA_CHANNEL => package.channels.get_mut(&entry.reference.name).map(|c| &mut c.deprecation),
			SCHEMA_BUNDLE => package.bundles.get_mut(&entry.reference.name).map(|b| &mut b.deprecation),
			_ => None,
		};
		match target {
			Some(slot) => *slot = Some(attached),
			None => {
				return Err(Error::DanglingDeprecation {
					package: package_name.clone(),
					reference: reference_display(&entry.reference),
				});
			}
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use opcat_declcfg::load_dir;
	use opcat_testing::{
		fixtures::{write_cockroachdb_catalog, write_etcd_catalog},
		tempdir::temp_dir,
	};

	use super::*;

	fn load_model(write: impl Fn(&std::path::Path) -> std::io::Result<()>) -> Result<Model> {
		let mut outcome = None;
		temp_dir("model", |dir| {
			write(dir)?;
			outcome = Some(project(load_dir(dir).unwrap()));
			Ok(())
		})
		.unwrap();
		outcome.unwrap()
	}

	fn catalog_model(head: &str, tail: &str) -> Result<Model> {
		let catalog = format!("{head}{tail}");
		load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog))
	}

	const ETCD_PACKAGE: &str = r#"{"schema": "olm.package", "name": "etcd", "defaultChannel": "alpha"}"#;

	fn bundle_json(name: &str, version: &str) -> String {
		format!(
			r#"{{"schema": "olm.bundle", "name": "{name}", "package": "etcd", "properties": [
				{{"type": "olm.package", "value": {{"packageName": "etcd", "version": "{version}"}}}}]}}"#
		)
	}

	#[test]
	fn test_project_etcd_catalog() {
		let model = load_model(write_etcd_catalog).unwrap();

		let etcd = model.package("etcd").unwrap();
		assert_eq!(etcd.default_channel, "alpha");
		assert_eq!(etcd.channels.len(), 3);
		assert_eq!(etcd.bundles.len(), 3);

		let v092 = &etcd.bundles["etcdoperator.v0.9.2"];
		assert_eq!(v092.version, Version::new(0, 9, 2));
		assert_eq!(v092.provided_apis.len(), 3);
		assert_eq!(v092.required_apis.len(), 1);
		assert_eq!(v092.dependencies.len(), 1);
		assert_eq!(v092.dependencies[0].r#type, "olm.gvk");
		assert!(v092.csv_json.contains("ClusterServiceVersion"));
		assert_eq!(v092.objects.len(), 2);
		// olm.bundle.object properties are consumed, the rest pass through.
		assert!(v092.properties.iter().all(|p| p.r#type != TYPE_BUNDLE_OBJECT));
		assert_eq!(v092.properties.iter().filter(|p| p.r#type == "olm.label").count(), 2);

		let alpha = &etcd.channels["alpha"];
		assert_eq!(etcd.channel_head(alpha).unwrap().name, "etcdoperator.v0.9.2");
		let beta = &etcd.channels["beta"];
		assert_eq!(etcd.channel_head(beta).unwrap().name, "etcdoperator.v0.9.0");
	}

	#[test]
	fn test_project_cockroachdb_deprecations() {
		let model = load_model(write_cockroachdb_catalog).unwrap();

		let package = model.package("cockroachdb").unwrap();
		assert!(package.deprecation.as_ref().unwrap().message.contains("end of life"));
		assert!(package.channels["stable-5.x"].deprecation.as_ref().unwrap().message.contains("no longer supported"));
		assert!(package.channels["stable-v6.x"].deprecation.is_none());
		assert!(package.bundles["cockroachdb.v5.0.3"].deprecation.is_some());
		assert!(package.bundles["cockroachdb.v5.0.4"].deprecation.is_none());
	}

	#[test]
	fn test_duplicate_package() {
		let err = catalog_model(ETCD_PACKAGE, &format!("\n{ETCD_PACKAGE}")).unwrap_err();
		assert!(matches!(err, Error::DuplicatePackage { .. }));
	}

	#[test]
	fn test_duplicate_bundle() {
		let bundle = bundle_json("etcdoperator.v0.9.0", "0.9.0");
		let catalog = format!(
			"{ETCD_PACKAGE}\n{bundle}\n{bundle}\n{}",
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd",
			    "entries": [{"name": "etcdoperator.v0.9.0"}]}"#
		);
		let err = load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog)).unwrap_err();
		assert!(matches!(err, Error::DuplicateBundle { .. }));
	}

	#[test]
	fn test_missing_default_channel() {
		let bundle = bundle_json("etcdoperator.v0.9.0", "0.9.0");
		let catalog = format!(
			"{}\n{bundle}\n{}",
			r#"{"schema": "olm.package", "name": "etcd", "defaultChannel": "stable"}"#,
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd",
			    "entries": [{"name": "etcdoperator.v0.9.0"}]}"#
		);
		let err = load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog)).unwrap_err();
		assert!(matches!(err, Error::MissingDefaultChannel { .. }));
	}

	#[test]
	fn test_no_default_channel_declared() {
		let err = catalog_model(r#"{"schema": "olm.package", "name": "etcd"}"#, "").unwrap_err();
		assert!(matches!(err, Error::NoDefaultChannel { .. }));
	}

	#[test]
	fn test_cyclic_channel() {
		let bundles = format!("{}\n{}", bundle_json("a.v1", "1.0.0"), bundle_json("a.v2", "2.0.0"));
		let catalog = format!(
			"{}\n{bundles}\n{}",
			r#"{"schema": "olm.package", "name": "etcd", "defaultChannel": "alpha"}"#,
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd", "entries": [
			    {"name": "a.v1", "replaces": "a.v2"},
			    {"name": "a.v2", "replaces": "a.v1"}]}"#
		);
		let err = load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog)).unwrap_err();
		assert!(matches!(err, Error::CyclicChannel { .. }));
	}

	#[test]
	fn test_dangling_entry() {
		let catalog = format!(
			"{ETCD_PACKAGE}\n{}",
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd",
			    "entries": [{"name": "etcdoperator.v0.9.0"}]}"#
		);
		let err = load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog)).unwrap_err();
		assert!(matches!(err, Error::DanglingEntry { .. }));
	}

	#[test]
	fn test_synthetic_replaces_is_allowed() {
		let bundle = bundle_json("etcdoperator.v0.9.2", "0.9.2");
		let catalog = format!(
			"{ETCD_PACKAGE}\n{bundle}\n{}",
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd", "entries": [
			    {"name": "etcdoperator.v0.9.2", "replaces": "etcdoperator.v0.9.0",
			     "skips": ["etcdoperator.v0.9.1"]}]}"#
		);
		let model = load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog)).unwrap();
		let etcd = model.package("etcd").unwrap();
		assert_eq!(etcd.channel_head(&etcd.channels["alpha"]).unwrap().name, "etcdoperator.v0.9.2");
	}

	#[test]
	fn test_invalid_skip_range() {
		let bundle = bundle_json("etcdoperator.v0.9.2", "0.9.2");
		let catalog = format!(
			"{ETCD_PACKAGE}\n{bundle}\n{}",
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd", "entries": [
			    {"name": "etcdoperator.v0.9.2", "skipRange": "not-a-range"}]}"#
		);
		let err = load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog)).unwrap_err();
		assert!(matches!(err, Error::InvalidSkipRange { .. }));
	}

	#[test]
	fn test_invalid_version() {
		let catalog = format!("{ETCD_PACKAGE}\n{}", bundle_json("etcdoperator.vX", "not-semver"));
		let err = load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog)).unwrap_err();
		assert!(matches!(err, Error::InvalidVersion { .. }));
	}

	#[test]
	fn test_head_tie_break_prefers_greatest_version() {
		let bundles = format!("{}\n{}", bundle_json("a.v1", "1.0.0"), bundle_json("a.v2", "2.0.0"));
		let catalog = format!(
			"{}\n{bundles}\n{}",
			r#"{"schema": "olm.package", "name": "etcd", "defaultChannel": "alpha"}"#,
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd", "entries": [
			    {"name": "a.v1"},
			    {"name": "a.v2"}]}"#
		);
		let model = load_model(move |dir| std::fs::write(dir.join("catalog.json"), &catalog)).unwrap();
		let etcd = model.package("etcd").unwrap();
		assert_eq!(etcd.channel_head(&etcd.channels["alpha"]).unwrap().name, "a.v2");
	}

	#[test]
	fn test_dangling_deprecation() {
		let catalog = format!(
			"{ETCD_PACKAGE}\n{}\n{}",
			bundle_json("etcdoperator.v0.9.0", "0.9.0"),
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd",
			    "entries": [{"name": "etcdoperator.v0.9.0"}]}"#
		);
		let deprecations = concat!(
			"schema: olm.deprecations\npackage: etcd\nentries:\n",
			"- reference:\n    schema: olm.bundle\n    name: missing.v1\n  message: gone\n"
		);
		let err = load_model(move |dir| {
			std::fs::write(dir.join("catalog.json"), &catalog)?;
			std::fs::write(dir.join("deprecations.yaml"), deprecations)
		})
		.unwrap_err();
		assert!(matches!(err, Error::DanglingDeprecation { .. }));
	}

	#[test]
	fn test_ambiguous_deprecation() {
		let catalog = format!(
			"{ETCD_PACKAGE}\n{}\n{}",
			bundle_json("etcdoperator.v0.9.0", "0.9.0"),
			r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd",
			    "entries": [{"name": "etcdoperator.v0.9.0"}]}"#
		);
		let deprecations = concat!(
			"schema: olm.deprecations\npackage: etcd\nentries:\n",
			"- reference:\n    schema: olm.package\n  message: first\n",
			"- reference:\n    schema: olm.package\n  message: second\n"
		);
		let err = load_model(move |dir| {
			std::fs::write(dir.join("catalog.json"), &catalog)?;
			std::fs::write(dir.join("deprecations.yaml"), deprecations)
		})
		.unwrap_err();
		assert!(matches!(err, Error::AmbiguousDeprecation { .. }));
	}
}
