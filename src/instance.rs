//! Aggregated view of one browser installation's user-data directory.
//!
//! `BrowserInstance` owns the three global indices (profiles, extensions,
//! bookmarks) and rebuilds them from disk on demand. Nothing here is fatal:
//! missing files, invalid JSON and absent sections degrade to warnings and
//! partial results, which is the normal state of a real user-data tree.

use indexmap::IndexMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::data_types::profile::profile_sort_key;
use crate::data_types::{Bookmark, Extension, Profile};
use crate::json_utils::get_chained;

/// Why a profile-scoped store could not be used. Always logged and
/// swallowed at the scope that hit it, never propagated.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("[{}] is not a file or does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read [{}]: {1}", .0.display())]
    Unreadable(PathBuf, std::io::Error),
    #[error("[{}] is not valid JSON", .0.display())]
    InvalidJson(PathBuf, #[source] serde_json::Error),
    #[error("[{}] does not contain {1}", .0.display())]
    MissingSection(PathBuf, &'static str),
}

/// One browser installation, rooted at a user-data directory.
#[derive(Debug, Default)]
pub struct BrowserInstance {
    pub userdata_dir: PathBuf,
    /// Profiles in `Local State` declaration order.
    pub profiles: IndexMap<String, Profile>,
    /// Extension id -> deduplicated record, in first-seen order.
    pub extensions: IndexMap<String, Extension>,
    /// URL -> deduplicated record, in first-seen order.
    pub bookmarks: IndexMap<String, Bookmark>,
}

impl BrowserInstance {
    pub fn new(userdata_dir: impl Into<PathBuf>) -> Self {
        BrowserInstance {
            userdata_dir: userdata_dir.into(),
            ..Default::default()
        }
    }

    /// Full refresh: profiles first, then both item indices.
    pub fn rebuild(&mut self) {
        self.fetch_all_profiles();
        self.fetch_extensions_from_all_profiles();
        self.fetch_bookmarks_from_all_profiles();
    }

    /// Rebuild the profile index from `Local State`. Any failure leaves the
    /// index empty: an unreadable root is reported, not fatal.
    pub fn fetch_all_profiles(&mut self) {
        if !self.userdata_dir.is_dir() {
            warn!(
                "[READ] [{}] is not a directory or does not exist",
                self.userdata_dir.display()
            );
            return;
        }

        let local_state_file = self.userdata_dir.join("Local State");
        let local_state = match read_json_file(&local_state_file) {
            Ok(data) => data,
            Err(err) => {
                warn!("[READ] {err}");
                return;
            }
        };

        let Some(info_cache) =
            get_chained(&local_state, &["profile", "info_cache"]).and_then(Value::as_object)
        else {
            warn!(
                "[READ] {}",
                StoreError::MissingSection(local_state_file, "profile/info_cache")
            );
            return;
        };

        self.profiles.clear();
        for (profile_id, info) in info_cache {
            let profile = Profile::from_info_cache(profile_id, &self.userdata_dir, info);
            self.profiles.insert(profile_id.clone(), profile);
        }
    }

    /// Profile ids in display order: "Default", then numbered profiles.
    pub fn sorted_profile_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.profiles.keys().cloned().collect();
        ids.sort_by_key(|id| profile_sort_key(id));
        ids
    }
}

/// Read and parse one JSON store, classifying the failure for the caller's
/// warning.
pub(crate) fn read_json_file(path: &Path) -> Result<Value, StoreError> {
    if !path.is_file() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|err| StoreError::Unreadable(path.to_path_buf(), err))?;
    serde_json::from_str(&text).map_err(|err| StoreError::InvalidJson(path.to_path_buf(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_leaves_profiles_empty() {
        let mut instance = BrowserInstance::new("/no/such/userdata/root");
        instance.fetch_all_profiles();
        assert!(instance.profiles.is_empty());
    }

    #[test]
    fn invalid_local_state_leaves_profiles_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Local State"), "{not json").unwrap();
        let mut instance = BrowserInstance::new(dir.path());
        instance.fetch_all_profiles();
        assert!(instance.profiles.is_empty());
    }

    #[test]
    fn missing_info_cache_leaves_profiles_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Local State"), r#"{"profile": {}}"#).unwrap();
        let mut instance = BrowserInstance::new(dir.path());
        instance.fetch_all_profiles();
        assert!(instance.profiles.is_empty());
    }
}
