// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Content-addressed on-disk catalog cache.
//!
//! A [`Store`] owns one cache root directory:
//!
//! ```text
//! <root>/digest                              hex sha256 of the source summary
//! <root>/packages/<pkg>.json                 per-package query index
//! <root>/api/<group>/<version>/<kind>.json   provider packages per GVK
//! ```
//!
//! [`Store::build`] projects a catalog source into index files and swaps them
//! into place atomically; [`Store::load`] makes a built cache queryable,
//! decoding each index file lazily on first touch. The loaded store
//! implements [`opcat_registry::Query`].

use std::{
	collections::HashMap,
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

pub use digest::source_digest;
pub use error::Error;
use parking_lot::RwLock;

use crate::index::{GvkKey, PackageIndex};

mod build;
mod digest;
mod error;
mod index;
mod integrity;
mod load;
mod query;

pub type Result<T> = std::result::Result<T, Error>;

/// Handle to a cache root. Cheap to clone; all clones share the lazily
/// decoded index state.
#[derive(Clone)]
pub struct Store(Arc<Inner>);

struct Inner {
	root: PathBuf,
	state: RwLock<State>,
}

/// Lazily populated view of a loaded cache. Decoded indexes are memoized for
/// the process lifetime; the catalog is bounded, so nothing is ever evicted.
#[derive(Default)]
struct State {
	digest: Option<String>,
	package_names: Option<Arc<Vec<String>>>,
	packages: HashMap<String, Arc<PackageIndex>>,
	apis: HashMap<GvkKey, Arc<Vec<String>>>,
}

impl Store {
	/// Open (creating if necessary) the cache root directory.
	pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
		let root = root.into();
		fs::create_dir_all(&root).map_err(|e| Error::Io { path: root.clone(), source: e })?;
		Ok(Self(Arc::new(Inner { root, state: RwLock::new(State::default()) })))
	}

	pub fn root(&self) -> &Path {
		&self.0.root
	}

	/// Drop every decoded index. The store can be loaded again afterwards.
	pub fn close(&self) {
		*self.0.state.write() = State::default();
	}
}
