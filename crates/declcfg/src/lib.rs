// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Declarative catalog configuration.
//!
//! A catalog source is a directory tree of JSON/YAML files, each holding a
//! stream of objects discriminated by a `schema` field. This crate defines the
//! typed records for the known schemas, the loader that walks a source tree
//! into a [`DeclarativeConfig`], and the canonical writer that re-emits a
//! config in stable order.

pub use error::Error;
pub use load::{load_dir, walk_files};
pub use property::{
	Property, PropertyBundleObject, PropertyGvk, PropertyPackage, PropertyPackageRequired, TYPE_BUNDLE_OBJECT,
	TYPE_GVK, TYPE_GVK_REQUIRED, TYPE_LABEL, TYPE_PACKAGE, TYPE_PACKAGE_REQUIRED,
};
pub use types::{
	Bundle, Channel, ChannelEntry, DeclarativeConfig, Deprecation, DeprecationEntry, DeprecationRef, Icon, Meta,
	Package, RelatedImage, SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_DEPRECATIONS, SCHEMA_PACKAGE,
};
pub use write::write_json;

mod error;
mod load;
mod property;
mod types;
mod write;

pub type Result<T> = std::result::Result<T, Error>;
