// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Serve a declarative catalog directory over gRPC.
//!
//! The catalog is loaded once at startup; source changes after that are not
//! reflected until restart.

use std::{
	fs,
	net::{IpAddr, Ipv4Addr, SocketAddr},
	path::PathBuf,
	process,
};

use clap::Parser;
use opcat_cache::Store;
use opcat_network::{grpc::server::Error as GrpcError, GrpcConfig, GrpcServer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opcat-server", about = "Serve declarative operator catalogs over gRPC")]
struct Args {
	/// Directory holding the declarative catalog.
	source: PathBuf,

	/// Port to serve the registry on.
	#[arg(short = 'p', long, default_value_t = 50051)]
	port: u16,

	/// Persist the cache here across restarts. Without it a throwaway cache
	/// is built under the system temp dir.
	#[arg(long)]
	cache_dir: Option<PathBuf>,

	/// Build or verify the cache, then exit without serving.
	#[arg(long)]
	cache_only: bool,

	/// Refuse to start when the cache is missing or stale instead of
	/// rebuilding it. Defaults to true when --cache-dir is set and
	/// --cache-only is not.
	#[arg(long, num_args = 0..=1, default_missing_value = "true")]
	cache_enforce_integrity: Option<bool>,

	/// Enable debug logging.
	#[arg(long)]
	debug: bool,

	/// Where to record the fatal startup error, if any.
	#[arg(short = 't', long, default_value = "/dev/termination-log")]
	termination_log: PathBuf,
}

#[derive(Debug, thiserror::Error)]
enum ServeError {
	#[error("--cache-dir must be set when --cache-enforce-integrity is requested")]
	EnforceWithoutCacheDir,

	#[error("failed to create ephemeral cache dir: {0}")]
	EphemeralCache(#[source] std::io::Error),

	#[error(transparent)]
	Cache(#[from] opcat_cache::Error),

	#[error(transparent)]
	Grpc(#[from] GrpcError),
}

#[tokio::main]
async fn main() {
	let args = Args::parse();
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(if args.debug { "debug" } else { "info" }));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let termination_log = args.termination_log.clone();
	if let Err(e) = run(args).await {
		let _ = fs::write(&termination_log, format!("{e}\n"));
		tracing::error!(error = %e, "startup failed");
		process::exit(1);
	}
}

async fn run(args: Args) -> Result<(), ServeError> {
	let enforce_integrity = args.cache_enforce_integrity.unwrap_or(args.cache_dir.is_some() && !args.cache_only);
	if enforce_integrity && args.cache_dir.is_none() {
		return Err(ServeError::EnforceWithoutCacheDir);
	}

	// The ephemeral cache dir lives exactly as long as this function.
	let mut ephemeral = None;
	let cache_root = match &args.cache_dir {
		Some(dir) => dir.clone(),
		None => {
			let dir = tempfile::Builder::new()
				.prefix("opcat-serve-cache-")
				.tempdir()
				.map_err(ServeError::EphemeralCache)?;
			let path = dir.path().to_path_buf();
			ephemeral = Some(dir);
			path
		}
	};

	let store = Store::new(cache_root)?;
	if enforce_integrity {
		store.check_integrity(&args.source)?;
		store.load()?;
	} else {
		store.load_or_rebuild(&args.source)?;
	}
	tracing::info!(source = %args.source.display(), cache = %store.root().display(), "catalog loaded");

	if args.cache_only {
		return Ok(());
	}

	let config = GrpcConfig { socket: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), args.port) };
	GrpcServer::new(config, store.clone()).serve(shutdown_signal()).await?;

	store.close();
	drop(ephemeral);
	Ok(())
}

async fn shutdown_signal() {
	#[cfg(unix)]
	{
		use tokio::signal::unix::{signal, SignalKind};
		let mut term = match signal(SignalKind::terminate()) {
			Ok(term) => term,
			Err(e) => {
				tracing::warn!(error = %e, "unable to install SIGTERM handler");
				let _ = tokio::signal::ctrl_c().await;
				return;
			}
		};
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {}
			_ = term.recv() => {}
		}
	}
	#[cfg(not(unix))]
	{
		let _ = tokio::signal::ctrl_c().await;
	}
}
