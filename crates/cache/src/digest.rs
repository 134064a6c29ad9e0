// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	fmt::Write as _,
	fs,
	path::{Component, Path},
};

use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Compute the canonical digest of a catalog source tree.
///
/// For every file the loader would read, in lexicographic relative-path
/// order, one `path:size:sha256(content)` row feeds an outer sha256. The
/// summary is purely content-based; mtimes and ownership never enter it, and
/// files the loader ignores (hidden names, unrecognized extensions) cannot
/// invalidate a cache.
pub fn source_digest(source: &Path) -> Result<String> {
	let mut outer = Sha256::new();
	for rel in opcat_declcfg::walk_files(source)? {
		let path = source.join(&rel);
		let bytes = fs::read(&path).map_err(|e| Error::Io { path, source: e })?;
		let mut row = String::with_capacity(128);
		let _ = writeln!(&mut row, "{}:{}:{}", portable(&rel), bytes.len(), hex(&Sha256::digest(&bytes)));
		outer.update(row.as_bytes());
	}
	Ok(hex(&outer.finalize()))
}

/// Render a relative path with `/` separators regardless of platform.
fn portable(rel: &Path) -> String {
	let parts: Vec<_> = rel
		.components()
		.filter_map(|c| match c {
			Component::Normal(part) => Some(part.to_string_lossy()),
			_ => None,
		})
		.collect();
	parts.join("/")
}

pub(crate) fn hex(bytes: &[u8]) -> String {
	let mut out = String::with_capacity(bytes.len() * 2);
	for byte in bytes {
		let _ = write!(&mut out, "{byte:02x}");
	}
	out
}
