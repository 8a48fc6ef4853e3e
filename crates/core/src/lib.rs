//! DevPooja Core - Shared catalog types.
//!
//! This crate provides the types shared by every DevPooja component:
//! - `catalog` - Product data loader, queries and admin write client
//! - `cli` - Command-line tools for loading and inspecting the catalog
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog items, categories, provenance
//!   tags and stock levels

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
