//! Core engine for aggregating and mutating Chromium-family profile data.
//!
//! The CLI in `main.rs` is a thin shell over [`instance::BrowserInstance`],
//! which owns discovery, indexing and deletion across an installation's
//! profiles.

pub mod bookmarks;
pub mod browser_paths;
pub mod data_types;
pub mod deletion;
pub mod extensions;
pub mod instance;
pub mod json_utils;
pub mod registry;
pub mod safety;
