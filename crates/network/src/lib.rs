// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The gRPC registry surface.
//!
//! A thin adapter: each RPC maps one-to-one onto an [`opcat_registry::Query`]
//! operation, materializes the rows as protocol messages, and drives
//! server-streaming where the query streams. It never reorders engine output
//! and keeps no state of its own.

pub use grpc::{
	api,
	server::{GrpcConfig, GrpcServer, RegistryService},
};

pub mod grpc;
