// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{env, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	if env::var_os("PROTOC").is_none() {
		env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
	}
	let descriptor = PathBuf::from(env::var("OUT_DIR")?).join("opcat_descriptor.bin");
	tonic_build::configure()
		.file_descriptor_set_path(descriptor)
		.compile_protos(&["proto/opcat.proto"], &["proto"])?;
	Ok(())
}
