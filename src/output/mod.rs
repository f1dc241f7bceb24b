//! Result persistence: line-delimited JSON snapshots and run manifests.

mod json;

pub use json::{JsonlWriter, RunManifest};
