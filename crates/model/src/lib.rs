// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The validated catalog model.
//!
//! [`project`] turns a loose [`opcat_declcfg::DeclarativeConfig`] into a
//! [`Model`]: packages indexed by name, each owning its channels and a single
//! arena of bundle bodies shared by every channel that carries the bundle.
//! Projection enforces the catalog consistency rules; a `Model` that exists
//! is valid by construction and is never mutated afterwards.

pub use error::Error;
pub use project::project;
pub use types::{Bundle, Channel, Dependency, Deprecation, Gvk, Model, Package};

mod error;
mod project;
mod types;

pub type Result<T> = std::result::Result<T, Error>;
