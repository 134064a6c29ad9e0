// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	fs::{self, File},
	io::Write as _,
	path::{Path, PathBuf},
	thread,
	time::Duration,
};

use uuid::Uuid;

use crate::{
	digest::source_digest,
	index::{api_index, PackageIndex},
	Error, Result, State, Store,
};

impl Store {
	/// Project the catalog at `source` into fresh index files and swap them
	/// into the cache root.
	///
	/// The whole tree is written into a sibling temporary directory and
	/// fsynced before a single rename puts it in place, so a concurrent
	/// reader of the old cache never observes a half-written one. Callers
	/// serialize builds; the protocol adds no multi-writer safety.
	pub fn build(&self, source: &Path) -> Result<()> {
		let cfg = opcat_declcfg::load_dir(source)?;
		let model = opcat_model::project(cfg)?;
		let digest = source_digest(source)?;

		let root = self.root();
		let tmp = sibling_dir(root);
		let result = write_tree(&tmp, &model, &digest).and_then(|()| swap_into_place(&tmp, root));
		if result.is_err() {
			let _ = fs::remove_dir_all(&tmp);
		}
		result?;

		// Anything decoded before the rebuild describes the old tree.
		*self.0.state.write() = State::default();

		tracing::info!(root = %root.display(), digest = %digest, packages = model.packages.len(), "built catalog cache");
		Ok(())
	}
}

fn sibling_dir(root: &Path) -> PathBuf {
	let name = root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "cache".to_string());
	root.parent()
		.filter(|p| !p.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."))
		.join(format!(".{name}.tmp-{}", Uuid::new_v4()))
}

fn write_tree(tmp: &Path, model: &opcat_model::Model, digest: &str) -> Result<()> {
	let packages_dir = tmp.join("packages");
	fs::create_dir_all(&packages_dir).map_err(|e| Error::Io { path: packages_dir.clone(), source: e })?;
	for package in model.packages.values() {
		let index = PackageIndex::from_model(package);
		let bytes = serde_json::to_vec(&index)
			.map_err(|e| Error::CorruptIndex { path: packages_dir.clone(), reason: e.to_string() })?;
		write_sync(&packages_dir.join(format!("{}.json", package.name)), &bytes)?;
	}

	for ((group, version, kind), providers) in api_index(model) {
		let dir = tmp.join("api").join(&group).join(&version);
		fs::create_dir_all(&dir).map_err(|e| Error::Io { path: dir.clone(), source: e })?;
		let bytes = serde_json::to_vec(&providers)
			.map_err(|e| Error::CorruptIndex { path: dir.clone(), reason: e.to_string() })?;
		write_sync(&dir.join(format!("{kind}.json")), &bytes)?;
	}

	write_sync(&tmp.join("digest"), format!("{digest}\n").as_bytes())?;
	sync_dirs(tmp)
}

fn write_sync(path: &Path, bytes: &[u8]) -> Result<()> {
	let io = |e| Error::Io { path: path.to_path_buf(), source: e };
	let mut file = File::create(path).map_err(io)?;
	file.write_all(bytes).map_err(io)?;
	file.sync_all().map_err(io)
}

fn sync_dirs(dir: &Path) -> Result<()> {
	let io = |e| Error::Io { path: dir.to_path_buf(), source: e };
	for entry in fs::read_dir(dir).map_err(io)? {
		let entry = entry.map_err(io)?;
		if entry.file_type().map_err(io)?.is_dir() {
			sync_dirs(&entry.path())?;
		}
	}
	File::open(dir).map_err(io)?.sync_all().map_err(io)
}

/// Replace `root` with the fully written `tmp` tree. The rename is retried
/// once: on some filesystems it can fail transiently right after the removal
/// of the old tree.
fn swap_into_place(tmp: &Path, root: &Path) -> Result<()> {
	if root.exists() {
		fs::remove_dir_all(root).map_err(|e| Error::Io { path: root.to_path_buf(), source: e })?;
	}
	if let Err(first) = fs::rename(tmp, root) {
		thread::sleep(Duration::from_millis(10));
		fs::rename(tmp, root).map_err(|_| Error::Io { path: root.to_path_buf(), source: first })?;
	}
	if let Some(parent) = root.parent().filter(|p| !p.as_os_str().is_empty()) {
		if let Ok(dir) = File::open(parent) {
			let _ = dir.sync_all();
		}
	}
	Ok(())
}
