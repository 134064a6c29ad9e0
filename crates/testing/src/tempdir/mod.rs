// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Scratch directories for catalog tests.

use std::{env, fs, io, path::Path};

use uuid::Uuid;

/// Run `f` against a labeled scratch directory under the system temp dir.
/// The directory is removed when `f` returns, pass or fail; the label keeps
/// leftovers attributable when cleanup is interrupted.
pub fn temp_dir<F>(label: &str, f: F) -> io::Result<()>
where
	F: FnOnce(&Path) -> io::Result<()>,
{
	let path = env::temp_dir().join(format!("opcat-{label}-{}", Uuid::new_v4()));
	fs::create_dir_all(&path)?;
	let result = f(&path);
	let _ = fs::remove_dir_all(&path);
	result
}

/// Scratch layout for cache tests: a `catalog` source directory created next
/// to a (not yet created) `cache` root, both removed when `f` returns.
///
/// `f` receives `(source, cache_root)`; write fixtures into `source` and hand
/// `cache_root` to the store under test.
pub fn catalog_scratch<F>(label: &str, f: F) -> io::Result<()>
where
	F: FnOnce(&Path, &Path) -> io::Result<()>,
{
	temp_dir(label, |dir| {
		let source = dir.join("catalog");
		fs::create_dir(&source)?;
		f(&source, &dir.join("cache"))
	})
}
