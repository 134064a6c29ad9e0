// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{pin::Pin, sync::Arc};

use opcat_registry::{ApiBundle, ApiChannel, ApiPackage, ChannelEntry, Deprecation, GroupVersionKind, Query, RowIter};
use tokio::task::spawn_blocking;
use tokio_stream::{self as stream, Stream};
use tonic::{Request, Response, Status};

use crate::grpc::api;

pub struct RegistryService<Q: Query + 'static> {
	store: Arc<Q>,
}

impl<Q: Query + 'static> RegistryService<Q> {
	pub fn new(store: Arc<Q>) -> Self {
		Self { store }
	}
}

pub type PackageNameStream = Pin<Box<dyn Stream<Item = Result<api::PackageName, Status>> + Send>>;
pub type ChannelEntryStream = Pin<Box<dyn Stream<Item = Result<api::ChannelEntry, Status>> + Send>>;
pub type BundleStream = Pin<Box<dyn Stream<Item = Result<api::Bundle, Status>> + Send>>;

#[tonic::async_trait]
impl<Q: Query + 'static> api::registry_server::Registry for RegistryService<Q> {
	type ListPackagesStream = PackageNameStream;

	async fn list_packages(
		&self,
		_request: Request<api::ListPackageRequest>,
	) -> Result<Response<Self::ListPackagesStream>, Status> {
		let store = self.store.clone();
		let names = run(move || store.list_packages()).await?;
		let messages = names.into_iter().map(|name| Ok(api::PackageName { name }));
		Ok(Response::new(Box::pin(stream::iter(messages)) as Self::ListPackagesStream))
	}

	async fn get_package(&self, request: Request<api::GetPackageRequest>) -> Result<Response<api::Package>, Status> {
		let request = request.into_inner();
		required("name", &request.name)?;
		let store = self.store.clone();
		let package = run(move || store.get_package(&request.name)).await?;
		Ok(Response::new(package_message(package)))
	}

	async fn get_bundle(&self, request: Request<api::GetBundleRequest>) -> Result<Response<api::Bundle>, Status> {
		let request = request.into_inner();
		required("pkgName", &request.pkg_name)?;
		required("channelName", &request.channel_name)?;
		required("csvName", &request.csv_name)?;
		let store = self.store.clone();
		let bundle =
			run(move || store.get_bundle(&request.pkg_name, &request.channel_name, &request.csv_name)).await?;
		Ok(Response::new(bundle_message(bundle)))
	}

	async fn get_bundle_for_channel(
		&self,
		request: Request<api::GetBundleInChannelRequest>,
	) -> Result<Response<api::Bundle>, Status> {
		let request = request.into_inner();
		required("pkgName", &request.pkg_name)?;
		required("channelName", &request.channel_name)?;
		let store = self.store.clone();
		let bundle = run(move || store.get_bundle_for_channel(&request.pkg_name, &request.channel_name)).await?;
		Ok(Response::new(bundle_message(bundle)))
	}

	type GetChannelEntriesThatReplaceStream = ChannelEntryStream;

	async fn get_channel_entries_that_replace(
		&self,
		request: Request<api::GetAllReplacementsRequest>,
	) -> Result<Response<Self::GetChannelEntriesThatReplaceStream>, Status> {
		let request = request.into_inner();
		required("csvName", &request.csv_name)?;
		let store = self.store.clone();
		let rows = run(move || store.get_channel_entries_that_replace(&request.csv_name)).await?;
		Ok(Response::new(entry_stream(rows)))
	}

	async fn get_bundle_that_replaces(
		&self,
		request: Request<api::GetReplacementRequest>,
	) -> Result<Response<api::Bundle>, Status> {
		let request = request.into_inner();
		required("csvName", &request.csv_name)?;
		required("pkgName", &request.pkg_name)?;
		required("channelName", &request.channel_name)?;
		let store = self.store.clone();
		let bundle = run(move || {
			store.get_bundle_that_replaces(&request.csv_name, &request.pkg_name, &request.channel_name)
		})
		.await?;
		Ok(Response::new(bundle_message(bundle)))
	}

	type GetChannelEntriesThatProvideStream = ChannelEntryStream;

	async fn get_channel_entries_that_provide(
		&self,
		request: Request<api::GetAllProvidersRequest>,
	) -> Result<Response<Self::GetChannelEntriesThatProvideStream>, Status> {
		let gvk = required_gvk(&request.get_ref().group, &request.get_ref().version, &request.get_ref().kind)?;
		let store = self.store.clone();
		let rows = run(move || store.get_channel_entries_that_provide(&gvk)).await?;
		Ok(Response::new(entry_stream(rows)))
	}

	type GetLatestChannelEntriesThatProvideStream = ChannelEntryStream;

	async fn get_latest_channel_entries_that_provide(
		&self,
		request: Request<api::GetLatestProvidersRequest>,
	) -> Result<Response<Self::GetLatestChannelEntriesThatProvideStream>, Status> {
		let gvk = required_gvk(&request.get_ref().group, &request.get_ref().version, &request.get_ref().kind)?;
		let store = self.store.clone();
		let rows = run(move || store.get_latest_channel_entries_that_provide(&gvk)).await?;
		Ok(Response::new(entry_stream(rows)))
	}

	async fn get_default_bundle_that_provides(
		&self,
		request: Request<api::GetDefaultProviderRequest>,
	) -> Result<Response<api::Bundle>, Status> {
		let gvk = required_gvk(&request.get_ref().group, &request.get_ref().version, &request.get_ref().kind)?;
		let store = self.store.clone();
		let bundle = run(move || store.get_default_bundle_that_provides(&gvk)).await?;
		Ok(Response::new(bundle_message(bundle)))
	}

	type ListBundlesStream = BundleStream;

	async fn list_bundles(
		&self,
		_request: Request<api::ListBundlesRequest>,
	) -> Result<Response<Self::ListBundlesStream>, Status> {
		let store = self.store.clone();
		let rows = run(move || store.list_bundles()).await?;
		let messages = rows.map(|row| row.map(bundle_message).map_err(status));
		Ok(Response::new(Box::pin(stream::iter(messages)) as Self::ListBundlesStream))
	}
}

/// Run one engine call off the async executor; index decoding touches disk.
async fn run<T, F>(f: F) -> Result<T, Status>
where
	T: Send + 'static,
	F: FnOnce() -> opcat_registry::Result<T> + Send + 'static,
{
	spawn_blocking(f).await.map_err(|e| Status::internal(format!("query task failed: {e}")))?.map_err(status)
}

fn status(e: opcat_registry::Error) -> Status {
	match e {
		opcat_registry::Error::NotFound { .. } => Status::not_found(e.to_string()),
		opcat_registry::Error::Storage { .. } => Status::internal(e.to_string()),
	}
}

fn required(field: &str, value: &str) -> Result<(), Status> {
	if value.is_empty() {
		return Err(Status::invalid_argument(format!("{field} must be set")));
	}
	Ok(())
}

fn required_gvk(group: &str, version: &str, kind: &str) -> Result<GroupVersionKind, Status> {
	required("group", group)?;
	required("version", version)?;
	required("kind", kind)?;
	Ok(GroupVersionKind::new(group, version, kind))
}

fn entry_stream(rows: RowIter<ChannelEntry>) -> ChannelEntryStream {
	Box::pin(stream::iter(rows.map(|row| row.map(entry_message).map_err(status))))
}

fn package_message(package: ApiPackage) -> api::Package {
	api::Package {
		name: package.name,
		channels: package.channels.into_iter().map(channel_message).collect(),
		default_channel_name: package.default_channel_name,
		deprecation: package.deprecation.map(deprecation_message),
		description: package.description,
	}
}

fn channel_message(channel: ApiChannel) -> api::Channel {
	api::Channel {
		name: channel.name,
		csv_name: channel.csv_name,
		deprecation: channel.deprecation.map(deprecation_message),
	}
}

fn bundle_message(bundle: ApiBundle) -> api::Bundle {
	api::Bundle {
		csv_name: bundle.csv_name,
		package_name: bundle.package_name,
		channel_name: bundle.channel_name,
		csv_json: bundle.csv_json,
		object: bundle.objects,
		bundle_path: bundle.bundle_path,
		provided_apis: bundle.provided_apis.into_iter().map(gvk_message).collect(),
		required_apis: bundle.required_apis.into_iter().map(gvk_message).collect(),
		version: bundle.version,
		skip_range: bundle.skip_range,
		dependencies: bundle
			.dependencies
			.into_iter()
			.map(|d| api::Dependency { r#type: d.r#type, value: d.value })
			.collect(),
		properties: bundle
			.properties
			.into_iter()
			.map(|p| api::Property { r#type: p.r#type, value: p.value })
			.collect(),
		replaces: bundle.replaces,
		skips: bundle.skips,
	}
}

fn entry_message(entry: ChannelEntry) -> api::ChannelEntry {
	api::ChannelEntry {
		package_name: entry.package_name,
		channel_name: entry.channel_name,
		bundle_name: entry.bundle_name,
		replaces: entry.replaces,
	}
}

fn gvk_message(gvk: GroupVersionKind) -> api::GroupVersionKind {
	api::GroupVersionKind { group: gvk.group, version: gvk.version, kind: gvk.kind, plural: gvk.plural }
}

fn deprecation_message(deprecation: Deprecation) -> api::Deprecation {
	api::Deprecation { message: deprecation.message }
}
