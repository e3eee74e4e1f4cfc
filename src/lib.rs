//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `provider-file`, `provider-asset`). Host
//! applications can depend on `blobsource-workspace` and enable the documented
//! features without needing to wire each crate individually.
