// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{fs, io::ErrorKind, sync::Arc};

use crate::{
	index::{GvkKey, PackageIndex},
	Error, Result, Store,
};

impl Store {
	/// Make a built cache queryable.
	///
	/// Only the digest and the package listing are read eagerly; each
	/// package and API index file is decoded on the first query touching it
	/// and memoized for the process lifetime.
	pub fn load(&self) -> Result<()> {
		let digest = self.stored_digest()?;
		let packages_dir = self.root().join("packages");
		let mut names = Vec::new();
		match fs::read_dir(&packages_dir) {
			Ok(entries) => {
				for entry in entries {
					let entry = entry.map_err(|e| Error::Io { path: packages_dir.clone(), source: e })?;
					let name = entry.file_name().to_string_lossy().to_string();
					if let Some(package) = name.strip_suffix(".json") {
						names.push(package.to_string());
					}
				}
			}
			Err(e) if e.kind() == ErrorKind::NotFound => {}
			Err(e) => return Err(Error::Io { path: packages_dir, source: e }),
		}
		names.sort();

		let mut state = self.0.state.write();
		state.digest = Some(digest);
		state.package_names = Some(Arc::new(names));
		state.packages.clear();
		state.apis.clear();
		tracing::debug!(root = %self.root().display(), "loaded catalog cache");
		Ok(())
	}

	/// The digest of the catalog this store was loaded from, if loaded.
	pub fn digest(&self) -> Option<String> {
		self.0.state.read().digest.clone()
	}

	/// The digest recorded when the cache was last built.
	pub fn stored_digest(&self) -> Result<String> {
		let path = self.root().join("digest");
		match fs::read_to_string(&path) {
			Ok(digest) => Ok(digest.trim().to_string()),
			Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotBuilt { root: self.root().to_path_buf() }),
			Err(e) => Err(Error::Io { path, source: e }),
		}
	}

	pub(crate) fn package_names(&self) -> Result<Arc<Vec<String>>> {
		self.0.state.read().package_names.clone().ok_or(Error::NotLoaded)
	}

	/// Decode (or fetch the memoized) index of one package. `None` when the
	/// cache has no such package.
	pub(crate) fn package(&self, name: &str) -> Result<Option<Arc<PackageIndex>>> {
		if let Some(index) = self.0.state.read().packages.get(name) {
			return Ok(Some(index.clone()));
		}
		let known = self.package_names()?.iter().any(|n| n == name);
		if !known {
			return Ok(None);
		}

		let path = self.root().join("packages").join(format!("{name}.json"));
		let bytes = fs::read(&path).map_err(|e| Error::Io { path: path.clone(), source: e })?;
		let index: PackageIndex = serde_json::from_slice(&bytes)
			.map_err(|e| Error::CorruptIndex { path, reason: e.to_string() })?;
		let index = Arc::new(index);

		// Two readers may decode the same package concurrently; the decoded
		// values are identical, so the last write simply wins.
		self.0.state.write().packages.insert(name.to_string(), index.clone());
		Ok(Some(index))
	}

	/// Provider package names for one GVK, from the reverse index. A missing
	/// file means no provider.
	pub(crate) fn api_providers(&self, key: &GvkKey) -> Result<Arc<Vec<String>>> {
		if let Some(providers) = self.0.state.read().apis.get(key) {
			return Ok(providers.clone());
		}
		if self.0.state.read().package_names.is_none() {
			return Err(Error::NotLoaded);
		}

		let (group, version, kind) = key;
		let path = self.root().join("api").join(group).join(version).join(format!("{kind}.json"));
		let providers = match fs::read(&path) {
			Ok(bytes) => serde_json::from_slice::<Vec<String>>(&bytes)
				.map_err(|e| Error::CorruptIndex { path, reason: e.to_string() })?,
			Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
			Err(e) => return Err(Error::Io { path, source: e }),
		};
		let providers = Arc::new(providers);
		self.0.state.write().apis.insert(key.clone(), providers.clone());
		Ok(providers)
	}
}
