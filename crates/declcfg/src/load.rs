// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	fs,
	path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::{value::RawValue, Value};

use crate::{
	types::{Meta, SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_DEPRECATIONS, SCHEMA_PACKAGE},
	DeclarativeConfig, Error, Result,
};

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Collect every catalog file under `root`, as paths relative to `root`,
/// sorted lexicographically.
///
/// Hidden entries (leading `.`) are skipped whether file or directory, as are
/// files without a recognized extension. The load order, and with it the
/// output ordering of [`load_dir`], is a pure function of the source bytes.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	walk_into(root, Path::new(""), &mut files)?;
	files.sort();
	Ok(files)
}

fn walk_into(root: &Path, rel: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
	let dir = root.join(rel);
	let entries = fs::read_dir(&dir).map_err(|e| Error::Io { path: dir.clone(), source: e })?;
	for entry in entries {
		let entry = entry.map_err(|e| Error::Io { path: dir.clone(), source: e })?;
		let name = entry.file_name();
		if name.to_string_lossy().starts_with('.') {
			continue;
		}
		let rel = rel.join(&name);
		let file_type = entry.file_type().map_err(|e| Error::Io { path: root.join(&rel), source: e })?;
		if file_type.is_dir() {
			walk_into(root, &rel, files)?;
		} else if file_type.is_file() && recognized(&rel) {
			files.push(rel);
		}
	}
	Ok(())
}

fn recognized(path: &Path) -> bool {
	path.extension().and_then(|e| e.to_str()).is_some_and(|ext| EXTENSIONS.contains(&ext))
}

/// Load every recognized file under `root` into a [`DeclarativeConfig`].
///
/// Any parse failure or schema-less document fails the whole load; a partial
/// config is never returned.
pub fn load_dir(root: &Path) -> Result<DeclarativeConfig> {
	let mut cfg = DeclarativeConfig::default();
	for rel in walk_files(root)? {
		let path = root.join(&rel);
		let bytes = fs::read(&path).map_err(|e| Error::Io { path: path.clone(), source: e })?;
		let count = load_file(&rel, &bytes, &mut cfg)?;
		tracing::debug!(file = %rel.display(), objects = count, "loaded declarative config file");
	}
	Ok(cfg)
}

fn load_file(path: &Path, bytes: &[u8], cfg: &mut DeclarativeConfig) -> Result<usize> {
	let docs = documents(path, bytes)?;
	let count = docs.len();
	for doc in docs {
		load_document(path, doc, cfg)?;
	}
	Ok(count)
}

/// Split a file into its JSON documents. JSON files are a stream of
/// concatenated values; YAML files are multi-document. Empty YAML documents
/// are dropped.
fn documents(path: &Path, bytes: &[u8]) -> Result<Vec<Value>> {
	let mut docs = Vec::new();
	if path.extension().and_then(|e| e.to_str()) == Some("json") {
		for doc in serde_json::Deserializer::from_slice(bytes).into_iter::<Value>() {
			docs.push(doc.map_err(|e| Error::Parse { path: path.to_path_buf(), reason: e.to_string() })?);
		}
	} else {
		for de in serde_yaml::Deserializer::from_slice(bytes) {
			let doc = Value::deserialize(de)
				.map_err(|e| Error::Parse { path: path.to_path_buf(), reason: e.to_string() })?;
			if !doc.is_null() {
				docs.push(doc);
			}
		}
	}
	Ok(docs)
}

fn load_document(path: &Path, doc: Value, cfg: &mut DeclarativeConfig) -> Result<()> {
	let object = doc.as_object().ok_or_else(|| Error::NotAnObject { path: path.to_path_buf() })?;
	let schema = match object.get("schema").and_then(Value::as_str) {
		Some(s) if !s.is_empty() => s.to_string(),
		_ => return Err(Error::MissingSchema { path: path.to_path_buf() }),
	};

	// Documents are re-serialized once so both JSON and YAML input reach the
	// typed records through the same raw-value-capable text path.
	let text = doc.to_string();
	let invalid = |e: serde_json::Error| Error::InvalidObject {
		schema: schema.clone(),
		path: path.to_path_buf(),
		reason: e.to_string(),
	};

	match schema.as_str() {
		SCHEMA_PACKAGE => cfg.packages.push(serde_json::from_str(&text).map_err(invalid)?),
		SCHEMA_CHANNEL => cfg.channels.push(serde_json::from_str(&text).map_err(invalid)?),
		SCHEMA_BUNDLE => cfg.bundles.push(serde_json::from_str(&text).map_err(invalid)?),
		SCHEMA_DEPRECATIONS => cfg.deprecations.push(serde_json::from_str(&text).map_err(invalid)?),
		_ => {
			let package = object.get("package").and_then(Value::as_str).unwrap_or_default().to_string();
			let blob = RawValue::from_string(text).map_err(invalid)?;
			cfg.others.push(Meta { schema, package, blob });
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::fs;

	use opcat_testing::tempdir::temp_dir;

	use super::*;

	const PACKAGE_JSON: &str = r#"{"schema": "olm.package", "name": "etcd", "defaultChannel": "alpha"}"#;

	#[test]
	fn test_walk_skips_hidden_and_unrecognized() {
		temp_dir("walk", |dir| {
			fs::create_dir(dir.join(".git"))?;
			fs::write(dir.join(".git/catalog.json"), PACKAGE_JSON)?;
			fs::write(dir.join(".hidden.json"), PACKAGE_JSON)?;
			fs::write(dir.join("README.md"), "readme")?;
			fs::create_dir(dir.join("etcd"))?;
			fs::write(dir.join("etcd/catalog.yaml"), "")?;
			fs::write(dir.join("index.json"), PACKAGE_JSON)?;

			let files = walk_files(dir).unwrap();
			assert_eq!(files, vec![PathBuf::from("etcd/catalog.yaml"), PathBuf::from("index.json")]);
			Ok(())
		})
		.unwrap()
	}

	#[test]
	fn test_load_json_stream() {
		temp_dir("load-json", |dir| {
			fs::write(
				dir.join("catalog.json"),
				format!(
					"{PACKAGE_JSON}\n{}",
					r#"{"schema": "olm.channel", "name": "alpha", "package": "etcd",
					    "entries": [{"name": "etcdoperator.v0.9.0"}]}"#
				),
			)?;

			let cfg = load_dir(dir).unwrap();
			assert_eq!(cfg.packages.len(), 1);
			assert_eq!(cfg.packages[0].name, "etcd");
			assert_eq!(cfg.channels.len(), 1);
			assert_eq!(cfg.channels[0].entries[0].name, "etcdoperator.v0.9.0");
			Ok(())
		})
		.unwrap()
	}

	#[test]
	fn test_load_yaml_multi_document() {
		temp_dir("load-yaml", |dir| {
			fs::write(
				dir.join("catalog.yaml"),
				concat!(
					"---\nschema: olm.package\nname: etcd\ndefaultChannel: alpha\n",
					"---\n",
					"---\nschema: olm.deprecations\npackage: etcd\nentries:\n",
					"- reference:\n    schema: olm.package\n  message: gone\n",
				),
			)?;

			let cfg = load_dir(dir).unwrap();
			assert_eq!(cfg.packages.len(), 1);
			assert_eq!(cfg.deprecations.len(), 1);
			assert_eq!(cfg.deprecations[0].entries[0].message, "gone");
			Ok(())
		})
		.unwrap()
	}

	#[test]
	fn test_load_unknown_schema_is_preserved() {
		temp_dir("load-unknown", |dir| {
			fs::write(dir.join("extra.json"), r#"{"schema": "olm.future", "package": "etcd", "shiny": true}"#)?;

			let cfg = load_dir(dir).unwrap();
			assert!(cfg.packages.is_empty());
			assert_eq!(cfg.others.len(), 1);
			assert_eq!(cfg.others[0].schema, "olm.future");
			assert_eq!(cfg.others[0].package, "etcd");
			assert!(cfg.others[0].blob.get().contains("\"shiny\""));
			Ok(())
		})
		.unwrap()
	}

	#[test]
	fn test_load_missing_schema_is_fatal() {
		temp_dir("load-missing-schema", |dir| {
			fs::write(dir.join("good.json"), PACKAGE_JSON)?;
			fs::write(dir.join("bad.json"), r#"{"name": "no-schema"}"#)?;

			let err = load_dir(dir).unwrap_err();
			assert!(matches!(err, Error::MissingSchema { .. }));
			Ok(())
		})
		.unwrap()
	}

	#[test]
	fn test_load_parse_error_is_fatal() {
		temp_dir("load-parse-error", |dir| {
			fs::write(dir.join("bad.json"), "{not json")?;

			let err = load_dir(dir).unwrap_err();
			assert!(matches!(err, Error::Parse { .. }));
			Ok(())
		})
		.unwrap()
	}
}
