// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The registry query contract.
//!
//! The cache implements [`Query`] over a loaded catalog; the network layer
//! maps each RPC onto one of its operations and each row type onto the
//! corresponding protocol message. Row types double as the cache's on-disk
//! representation, so they are plain serde values with stable field order.

pub use error::Error;
pub use types::{ApiBundle, ApiChannel, ApiPackage, ChannelEntry, Dependency, Deprecation, GroupVersionKind, Property};

mod error;
mod types;

pub type Result<T> = std::result::Result<T, Error>;

/// A lazily-produced stream of query rows. Iteration may touch disk, so every
/// element carries a `Result`.
pub type RowIter<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

/// Read-only navigational queries over a loaded catalog.
///
/// Implementations are immutable and safe for concurrent use; two identical
/// calls on the same loaded catalog produce identical row sequences.
pub trait Query: Send + Sync {
	/// All package names, lexicographically ordered.
	fn list_packages(&self) -> Result<Vec<String>>;

	/// One package with its channel summaries and deprecations.
	fn get_package(&self, name: &str) -> Result<ApiPackage>;

	/// A bundle addressed by package, channel and name.
	fn get_bundle(&self, package: &str, channel: &str, name: &str) -> Result<ApiBundle>;

	/// The head bundle of a channel.
	fn get_bundle_for_channel(&self, package: &str, channel: &str) -> Result<ApiBundle>;

	/// The bundle that replaces `name` in a channel, whether through an
	/// explicit `replaces` edge, a skip, or a matching skip range.
	fn get_bundle_that_replaces(&self, name: &str, package: &str, channel: &str) -> Result<ApiBundle>;

	/// Every channel entry whose explicit `replaces` edge points at `name`,
	/// ordered by `(package, channel, bundle)`.
	fn get_channel_entries_that_replace(&self, name: &str) -> Result<RowIter<ChannelEntry>>;

	/// Every channel entry of every bundle providing `gvk`, one row per
	/// incoming edge, ordered by `(package, channel, bundle, replaces)`.
	fn get_channel_entries_that_provide(&self, gvk: &GroupVersionKind) -> Result<RowIter<ChannelEntry>>;

	/// The per-channel head entries among the providers of `gvk`.
	fn get_latest_channel_entries_that_provide(&self, gvk: &GroupVersionKind) -> Result<RowIter<ChannelEntry>>;

	/// The default-channel head bundle of the package providing `gvk`,
	/// smallest package name first.
	fn get_default_bundle_that_provides(&self, gvk: &GroupVersionKind) -> Result<ApiBundle>;

	/// Every bundle of every channel, manifests stripped, ordered by
	/// `(package, channel, bundle)`.
	fn list_bundles(&self) -> Result<RowIter<ApiBundle>>;
}
