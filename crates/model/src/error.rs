// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("package declared with no name")]
	MissingPackageName,

	#[error("duplicate package {package}")]
	DuplicatePackage { package: String },

	#[error("duplicate channel {channel} in package {package}")]
	DuplicateChannel { package: String, channel: String },

	#[error("duplicate bundle {bundle} in package {package}")]
	DuplicateBundle { package: String, bundle: String },

	#[error("channel {channel} declared for unknown package {package}")]
	UnknownChannelPackage { package: String, channel: String },

	#[error("bundle {bundle} declared for unknown package {package}")]
	UnknownBundlePackage { package: String, bundle: String },

	#[error("package {package} declares no default channel")]
	NoDefaultChannel { package: String },

	#[error("package {package} default channel {channel} not found")]
	MissingDefaultChannel { package: String, channel: String },

	#[error("duplicate entry {entry} in channel {channel} of package {package}")]
	DuplicateChannelEntry { package: String, channel: String, entry: String },

	#[error("entry {entry} in channel {channel} of package {package} refers to a bundle that does not exist")]
	DanglingEntry { package: String, channel: String, entry: String },

	#[error("cyclic replaces chain through {entry} in channel {channel} of package {package}")]
	CyclicChannel { package: String, channel: String, entry: String },

	#[error("bundle {bundle} has no olm.package property")]
	MissingBundleVersion { bundle: String },

	#[error("bundle {bundle} has more than one olm.package property")]
	DuplicatePackageProperty { bundle: String },

	#[error("bundle {bundle} olm.package property names package {property_package}, expected {package}")]
	BundlePackageMismatch { package: String, bundle: String, property_package: String },

	#[error("bundle {bundle} version {version} is not valid semver: {reason}")]
	InvalidVersion { bundle: String, version: String, reason: String },

	#[error("entry {entry} in channel {channel} skip range {skip_range} is not a valid semver range: {reason}")]
	InvalidSkipRange { channel: String, entry: String, skip_range: String, reason: String },

	#[error("invalid property on bundle {bundle}: {source}")]
	InvalidBundleProperty {
		bundle: String,
		#[source]
		source: opcat_declcfg::Error,
	},

	#[error("deprecations for package {package} target {reference} more than once")]
	AmbiguousDeprecation { package: String, reference: String },

	#[error("deprecations for package {package} reference {reference}, which does not exist")]
	DanglingDeprecation { package: String, reference: String },

	#[error("package {package} has more than one olm.deprecations document")]
	DuplicateDeprecation { package: String },
}
