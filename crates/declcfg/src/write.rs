// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	collections::BTreeMap,
	io::{self, Write},
};

use serde::Serialize;

use crate::{Bundle, Channel, DeclarativeConfig, Deprecation, Error, Meta, Package, Result};

#[derive(Default)]
struct PackageGroup<'a> {
	package: Option<&'a Package>,
	channels: Vec<&'a Channel>,
	bundles: Vec<&'a Bundle>,
	others: Vec<&'a Meta>,
	deprecations: Vec<&'a Deprecation>,
}

/// Emit `cfg` as a single JSON object stream in canonical order: packages by
/// name, each followed by its channels and bundles sorted by name, unknown
/// objects, and deprecations. Unknown objects with no package come first.
///
/// The output is deterministic byte-for-byte for a given config; loading it
/// back produces an equivalent config.
pub fn write_json(cfg: &DeclarativeConfig, out: &mut impl Write) -> Result<()> {
	let mut groups: BTreeMap<&str, PackageGroup> = BTreeMap::new();
	for package in &cfg.packages {
		groups.entry(&package.name).or_default().package = Some(package);
	}
	for channel in &cfg.channels {
		groups.entry(&channel.package).or_default().channels.push(channel);
	}
	for bundle in &cfg.bundles {
		groups.entry(&bundle.package).or_default().bundles.push(bundle);
	}
	for other in &cfg.others {
		groups.entry(&other.package).or_default().others.push(other);
	}
	for deprecation in &cfg.deprecations {
		groups.entry(&deprecation.package).or_default().deprecations.push(deprecation);
	}

	for (name, mut group) in groups {
		// The empty key collects unknown objects that declare no package.
		if name.is_empty() {
			for other in &group.others {
				write_raw(other.blob.get(), out)?;
			}
			continue;
		}
		group.channels.sort_by(|a, b| a.name.cmp(&b.name));
		group.bundles.sort_by(|a, b| a.name.cmp(&b.name));

		if let Some(package) = group.package {
			write_object(package, out)?;
		}
		for channel in group.channels {
			write_object(channel, out)?;
		}
		for bundle in group.bundles {
			write_object(bundle, out)?;
		}
		for other in group.others {
			write_raw(other.blob.get(), out)?;
		}
		for deprecation in group.deprecations {
			write_object(deprecation, out)?;
		}
	}
	Ok(())
}

fn write_object<T: Serialize>(object: &T, out: &mut impl Write) -> Result<()> {
	serde_json::to_writer(&mut *out, object).map_err(|e| Error::Write { source: io::Error::other(e) })?;
	write_raw("\n", out)
}

fn write_raw(text: &str, out: &mut impl Write) -> Result<()> {
	out.write_all(text.as_bytes()).map_err(|e| Error::Write { source: e })
}

#[cfg(test)]
mod tests {
	use std::fs;

	use opcat_testing::tempdir::temp_dir;

	use super::*;
	use crate::load_dir;

	#[test]
	fn test_write_is_deterministic_and_reloadable() {
		temp_dir("write-roundtrip", |dir| {
			fs::write(
				dir.join("b.json"),
				r#"{"schema": "olm.bundle", "name": "etcdoperator.v0.9.0", "package": "etcd",
				    "properties": [{"type": "other", "value": {"its": "notdefined"}}]}"#,
			)?;
			fs::write(
				dir.join("a.yaml"),
				"schema: olm.package\nname: etcd\ndefaultChannel: alpha\n---\nschema: olm.future\nfree: form\n",
			)?;
			fs::write(
				dir.join("c.json"),
				r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd",
				    "entries": [{"name": "etcdoperator.v0.9.0"}]}"#,
			)?;

			let cfg = load_dir(dir).unwrap();
			let mut first = Vec::new();
			write_json(&cfg, &mut first).unwrap();

			// Reload the canonical output and write it again.
			fs::create_dir(dir.join("roundtrip"))?;
			fs::write(dir.join("roundtrip/catalog.json"), &first)?;
			let reloaded = load_dir(&dir.join("roundtrip")).unwrap();
			let mut second = Vec::new();
			write_json(&reloaded, &mut second).unwrap();

			assert_eq!(first, second);
			let text = String::from_utf8(first).unwrap();
			let package_at = text.find("olm.package").unwrap();
			let channel_at = text.find("olm.channel").unwrap();
			let bundle_at = text.find("olm.bundle").unwrap();
			assert!(package_at < channel_at && channel_at < bundle_at);
			assert!(text.contains(r#""value":{"its":"notdefined"}"#));
			Ok(())
		})
		.unwrap()
	}
}
