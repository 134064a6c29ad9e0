// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse {path}: {reason}")]
	Parse { path: PathBuf, reason: String },

	#[error("document in {path} is not an object")]
	NotAnObject { path: PathBuf },

	#[error("document in {path} has no schema field")]
	MissingSchema { path: PathBuf },

	#[error("invalid {schema} object in {path}: {reason}")]
	InvalidObject { schema: String, path: PathBuf, reason: String },

	#[error("invalid property of type {property_type}: {reason}")]
	InvalidProperty { property_type: String, reason: String },

	#[error("failed to write declarative config: {source}")]
	Write {
		#[source]
		source: std::io::Error,
	},
}
