// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("cache i/o failure at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("cache at {root} has not been built")]
	NotBuilt { root: PathBuf },

	#[error("cache has not been loaded")]
	NotLoaded,

	#[error("cache digest mismatch: stored {stored}, source is {computed}")]
	IntegrityMismatch { stored: String, computed: String },

	#[error("corrupt index file {path}: {reason}")]
	CorruptIndex { path: PathBuf, reason: String },

	#[error(transparent)]
	Load(#[from] opcat_declcfg::Error),

	#[error(transparent)]
	Validate(#[from] opcat_model::Error),
}

impl From<Error> for opcat_registry::Error {
	fn from(e: Error) -> Self {
		opcat_registry::Error::Storage { reason: e.to_string() }
	}
}
