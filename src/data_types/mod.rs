//! Data records for browser profile aggregation
//!
//! One record type per entity: profiles, extensions, bookmarks.

pub mod bookmark;
pub mod extension;
pub mod profile;

pub use bookmark::Bookmark;
pub use extension::Extension;
pub use profile::Profile;
