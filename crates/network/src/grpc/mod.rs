// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

pub mod server;

pub mod api {
	tonic::include_proto!("opcat");
}

/// Descriptor set emitted by the build script, served over gRPC reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("opcat_descriptor");
