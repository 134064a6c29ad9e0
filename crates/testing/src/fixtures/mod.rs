// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Catalog fixtures shared by the cache and network tests.
//!
//! The cockroachdb catalog carries a full `olm.deprecations` document; the
//! etcd catalog exercises multi-channel replacement chains, skips and
//! skip ranges, embedded manifests and GVK providers.

use std::{fs, io, path::Path};

/// CSV manifest of `etcdoperator.v0.9.2`, base64-encoded as it appears in an
/// `olm.bundle.object` property.
pub const ETCD_CSV_DATA: &str = "eyJhcGlWZXJzaW9uIjoib3BlcmF0b3JzLmNvcmVvcy5jb20vdjFhbHBoYTEiLCJraW5kIjoiQ2x1c3RlclNlcnZpY2VWZXJzaW9uIiwibWV0YWRhdGEiOnsibmFtZSI6ImV0Y2RvcGVyYXRvci52MC45LjIifSwic3BlYyI6eyJkaXNwbGF5TmFtZSI6ImV0Y2QifX0=";

/// The decoded form of [`ETCD_CSV_DATA`].
pub const ETCD_CSV_JSON: &str = r#"{"apiVersion":"operators.coreos.com/v1alpha1","kind":"ClusterServiceVersion","metadata":{"name":"etcdoperator.v0.9.2"},"spec":{"displayName":"etcd"}}"#;

/// CRD manifest embedded next to the CSV, base64-encoded.
pub const ETCD_CRD_DATA: &str = "eyJhcGlWZXJzaW9uIjoiYXBpZXh0ZW5zaW9ucy5rOHMuaW8vdjFiZXRhMSIsImtpbmQiOiJDdXN0b21SZXNvdXJjZURlZmluaXRpb24iLCJtZXRhZGF0YSI6eyJuYW1lIjoiZXRjZGNsdXN0ZXJzLmV0Y2QuZGF0YWJhc2UuY29yZW9zLmNvbSJ9fQ==";

/// The decoded form of [`ETCD_CRD_DATA`].
pub const ETCD_CRD_JSON: &str = r#"{"apiVersion":"apiextensions.k8s.io/v1beta1","kind":"CustomResourceDefinition","metadata":{"name":"etcdclusters.etcd.database.coreos.com"}}"#;

pub const COCKROACHDB_CATALOG: &str = r#"{
	"defaultChannel": "stable-v6.x",
	"name": "cockroachdb",
	"schema": "olm.package"
}
{
	"entries": [
		{
			"name": "cockroachdb.v5.0.3"
		},
		{
			"name": "cockroachdb.v5.0.4",
			"replaces": "cockroachdb.v5.0.3"
		}
	],
	"name": "stable-5.x",
	"package": "cockroachdb",
	"schema": "olm.channel"
}
{
	"entries": [
		{
			"name": "cockroachdb.v6.0.0",
			"skipRange": "<6.0.0"
		}
	],
	"name": "stable-v6.x",
	"package": "cockroachdb",
	"schema": "olm.channel"
}
{
	"image": "quay.io/openshift-community-operators/cockroachdb@sha256:a5d4f4467250074216eb1ba1c36e06a3ab797d81c431427fc2aca97ecaf4e9d8",
	"name": "cockroachdb.v5.0.3",
	"package": "cockroachdb",
	"properties": [
		{
			"type": "olm.gvk",
			"value": {
				"group": "charts.operatorhub.io",
				"kind": "Cockroachdb",
				"version": "v1alpha1"
			}
		},
		{
			"type": "olm.package",
			"value": {
				"packageName": "cockroachdb",
				"version": "5.0.3"
			}
		}
	],
	"schema": "olm.bundle"
}
{
	"image": "quay.io/openshift-community-operators/cockroachdb@sha256:f42337e7b85a46d83c94694638e2312e10ca16a03542399a65ba783c94a32b63",
	"name": "cockroachdb.v5.0.4",
	"package": "cockroachdb",
	"properties": [
		{
			"type": "olm.gvk",
			"value": {
				"group": "charts.operatorhub.io",
				"kind": "Cockroachdb",
				"version": "v1alpha1"
			}
		},
		{
			"type": "olm.package",
			"value": {
				"packageName": "cockroachdb",
				"version": "5.0.4"
			}
		}
	],
	"schema": "olm.bundle"
}
{
	"image": "quay.io/openshift-community-operators/cockroachdb@sha256:d3016b1507515fc7712f9c47fd9082baf9ccb070aaab58ed0ef6e5abdedde8ba",
	"name": "cockroachdb.v6.0.0",
	"package": "cockroachdb",
	"properties": [
		{
			"type": "olm.gvk",
			"value": {
				"group": "charts.operatorhub.io",
				"kind": "Cockroachdb",
				"version": "v1alpha1"
			}
		},
		{
			"type": "olm.package",
			"value": {
				"packageName": "cockroachdb",
				"version": "6.0.0"
			}
		}
	],
	"schema": "olm.bundle"
}
"#;

pub const COCKROACHDB_DEPRECATIONS: &str = r#"---
schema: olm.deprecations
package: cockroachdb
entries:
- reference:
    schema: olm.bundle
    name: cockroachdb.v5.0.3
  message: |
    cockroachdb.v5.0.3 is deprecated. Uninstall and install cockroachdb.v5.0.4 for support.
- reference:
    schema: olm.package
  message: |
    package cockroachdb is end of life.  Please use 'nouveau-cockroachdb' package for support.
- reference:
    schema: olm.channel
    name: stable-5.x
  message: |
    channel stable-5.x is no longer supported.  Please switch to channel 'stable-6.x'.
"#;

/// Write the cockroachdb catalog (one JSON stream plus a YAML deprecations
/// document) into `dir`.
pub fn write_cockroachdb_catalog(dir: &Path) -> io::Result<()> {
	fs::write(dir.join("cockroachdb.json"), COCKROACHDB_CATALOG)?;
	fs::write(dir.join("deprecations.yaml"), COCKROACHDB_DEPRECATIONS)
}

/// Write the three-channel etcd catalog into `dir`.
///
/// Channel layout: `alpha` and `stable` run v0.6.1 -> v0.9.0 -> v0.9.2 (which
/// also skips the never-published v0.9.1), `beta` stops at v0.9.0. The
/// default channel is `alpha`.
pub fn write_etcd_catalog(dir: &Path) -> io::Result<()> {
	let catalog = format!(
		r#"{{
	"defaultChannel": "alpha",
	"name": "etcd",
	"description": "etcd operator",
	"schema": "olm.package"
}}
{{
	"entries": [
		{{
			"name": "etcdoperator.v0.6.1"
		}},
		{{
			"name": "etcdoperator.v0.9.0",
			"replaces": "etcdoperator.v0.6.1"
		}},
		{{
			"name": "etcdoperator.v0.9.2",
			"replaces": "etcdoperator.v0.9.0",
			"skips": ["etcdoperator.v0.9.1"],
			"skipRange": "< 0.6.0"
		}}
	],
	"name": "alpha",
	"package": "etcd",
	"schema": "olm.channel"
}}
{{
	"entries": [
		{{
			"name": "etcdoperator.v0.6.1"
		}},
		{{
			"name": "etcdoperator.v0.9.0",
			"replaces": "etcdoperator.v0.6.1"
		}}
	],
	"name": "beta",
	"package": "etcd",
	"schema": "olm.channel"
}}
{{
	"entries": [
		{{
			"name": "etcdoperator.v0.6.1"
		}},
		{{
			"name": "etcdoperator.v0.9.0",
			"replaces": "etcdoperator.v0.6.1"
		}},
		{{
			"name": "etcdoperator.v0.9.2",
			"replaces": "etcdoperator.v0.9.0",
			"skips": ["etcdoperator.v0.9.1"],
			"skipRange": "< 0.6.0"
		}}
	],
	"name": "stable",
	"package": "etcd",
	"schema": "olm.channel"
}}
{{
	"image": "quay.io/coreos/etcd-operator@sha256:v0.6.1",
	"name": "etcdoperator.v0.6.1",
	"package": "etcd",
	"properties": [
		{{
			"type": "olm.gvk",
			"value": {{
				"group": "etcd.database.coreos.com",
				"kind": "EtcdCluster",
				"version": "v1beta2"
			}}
		}},
		{{
			"type": "olm.package",
			"value": {{
				"packageName": "etcd",
				"version": "0.6.1"
			}}
		}}
	],
	"schema": "olm.bundle"
}}
{{
	"image": "quay.io/coreos/etcd-operator@sha256:v0.9.0",
	"name": "etcdoperator.v0.9.0",
	"package": "etcd",
	"properties": [
		{{
			"type": "olm.gvk",
			"value": {{
				"group": "etcd.database.coreos.com",
				"kind": "EtcdCluster",
				"version": "v1beta2"
			}}
		}},
		{{
			"type": "olm.gvk",
			"value": {{
				"group": "etcd.database.coreos.com",
				"kind": "EtcdBackup",
				"version": "v1beta2"
			}}
		}},
		{{
			"type": "olm.gvk",
			"value": {{
				"group": "etcd.database.coreos.com",
				"kind": "EtcdRestore",
				"version": "v1beta2"
			}}
		}},
		{{
			"type": "olm.package",
			"value": {{
				"packageName": "etcd",
				"version": "0.9.0"
			}}
		}}
	],
	"schema": "olm.bundle"
}}
{{
	"image": "fake/etcd-operator:v0.9.2",
	"name": "etcdoperator.v0.9.2",
	"package": "etcd",
	"properties": [
		{{
			"type": "olm.package",
			"value": {{
				"packageName": "etcd",
				"version": "0.9.2"
			}}
		}},
		{{
			"type": "olm.gvk",
			"value": {{
				"group": "etcd.database.coreos.com",
				"kind": "EtcdCluster",
				"version": "v1beta2"
			}}
		}},
		{{
			"type": "olm.gvk",
			"value": {{
				"group": "etcd.database.coreos.com",
				"kind": "EtcdBackup",
				"version": "v1beta2"
			}}
		}},
		{{
			"type": "olm.gvk",
			"value": {{
				"group": "etcd.database.coreos.com",
				"kind": "EtcdRestore",
				"version": "v1beta2"
			}}
		}},
		{{
			"type": "olm.gvk.required",
			"value": {{
				"group": "etcd.database.coreos.com",
				"kind": "EtcdCluster",
				"version": "v1beta2"
			}}
		}},
		{{
			"type": "olm.label",
			"value": {{
				"label": "testlabel"
			}}
		}},
		{{
			"type": "olm.label",
			"value": {{
				"label": "testlabel1"
			}}
		}},
		{{
			"type": "other",
			"value": {{
				"its": "notdefined"
			}}
		}},
		{{
			"type": "olm.bundle.object",
			"value": {{
				"data": "{csv}"
			}}
		}},
		{{
			"type": "olm.bundle.object",
			"value": {{
				"data": "{crd}"
			}}
		}}
	],
	"relatedImages": [
		{{
			"image": "fake/etcd-operator:v0.9.2",
			"name": "operator"
		}}
	],
	"schema": "olm.bundle"
}}
"#,
		csv = ETCD_CSV_DATA,
		crd = ETCD_CRD_DATA
	);
	fs::write(dir.join("etcd.json"), catalog)
}
