// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	future::Future,
	net::{IpAddr, Ipv4Addr, SocketAddr},
	sync::Arc,
};

use opcat_registry::Query;
pub use registry::RegistryService;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic_health::{server::health_reporter, ServingStatus};

use crate::grpc::{api::registry_server::RegistryServer, FILE_DESCRIPTOR_SET};

mod registry;

const DEFAULT_SOCKET: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 50051);

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("grpc transport failure: {0}")]
	Transport(#[from] tonic::transport::Error),

	#[error("grpc reflection setup failure: {0}")]
	Reflection(#[from] tonic_reflection::server::Error),

	#[error("failed to bind {socket}: {source}")]
	Bind {
		socket: SocketAddr,
		#[source]
		source: std::io::Error,
	},
}

#[derive(Debug, Clone)]
pub struct GrpcConfig {
	pub socket: SocketAddr,
}

impl Default for GrpcConfig {
	fn default() -> Self {
		Self { socket: DEFAULT_SOCKET }
	}
}

/// The registry gRPC server: the nine registry RPCs plus health and
/// reflection, served until the shutdown future resolves and in-flight
/// calls have drained.
pub struct GrpcServer<Q: Query + 'static> {
	config: GrpcConfig,
	store: Arc<Q>,
}

impl<Q: Query + 'static> GrpcServer<Q> {
	pub fn new(config: GrpcConfig, store: Q) -> Self {
		Self { config, store: Arc::new(store) }
	}

	pub async fn serve(self, shutdown: impl Future<Output = ()> + Send) -> Result<(), Error> {
		let socket = self.config.socket;
		let listener = TcpListener::bind(socket).await.map_err(|e| Error::Bind { socket, source: e })?;
		self.serve_with_listener(listener, shutdown).await
	}

	/// Serve on an already-bound listener. Tests bind port 0 and read the
	/// local address back before calling this.
	pub async fn serve_with_listener(
		self,
		listener: TcpListener,
		shutdown: impl Future<Output = ()> + Send,
	) -> Result<(), Error> {
		let (mut health, health_service) = health_reporter();
		// The store finished loading before this server was constructed.
		health.set_service_status("", ServingStatus::Serving).await;
		health.set_serving::<RegistryServer<RegistryService<Q>>>().await;

		let reflection = tonic_reflection::server::Builder::configure()
			.register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
			.build_v1()?;

		tracing::info!(socket = %self.config.socket, "serving registry");
		tonic::transport::Server::builder()
			.add_service(health_service)
			.add_service(reflection)
			.add_service(RegistryServer::new(RegistryService::new(self.store)))
			.serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
			.await?;
		tracing::info!("registry server stopped");
		Ok(())
	}
}
