// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::Path;

use crate::{digest::source_digest, Error, Result, Store};

impl Store {
	/// Verify that the stored digest still matches the catalog at `source`.
	pub fn check_integrity(&self, source: &Path) -> Result<()> {
		let stored = self.stored_digest()?;
		let computed = source_digest(source)?;
		if stored != computed {
			return Err(Error::IntegrityMismatch { stored, computed });
		}
		Ok(())
	}

	/// Load the cache, rebuilding it first when it is absent or its digest
	/// no longer matches `source`.
	pub fn load_or_rebuild(&self, source: &Path) -> Result<()> {
		let rebuild = match self.stored_digest() {
			Ok(stored) => stored != source_digest(source)?,
			Err(Error::NotBuilt { .. }) => true,
			Err(e) => return Err(e),
		};
		if rebuild {
			tracing::info!(root = %self.root().display(), "cache is missing or stale, rebuilding");
			self.build(source)?;
		}
		self.load()
	}
}
