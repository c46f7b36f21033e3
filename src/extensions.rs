//! Extension indexing across profiles.
//!
//! Every profile declares its extensions in two preference stores,
//! `Preferences` and `Secure Preferences`. Both are read for every profile:
//! modern Chromium keeps the settings in the secure store, but older data
//! can still carry them in the general one, and visiting both also records
//! which of the two files exist on the profile.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::data_types::Extension;
use crate::instance::{read_json_file, BrowserInstance, StoreError};
use crate::json_utils::{get_chained, path_not_exist};

impl BrowserInstance {
    /// Rebuild the global extension index from every profile's preference
    /// stores. Profiles are visited in `Local State` declaration order, so
    /// the first profile that declares an id owns its metadata.
    pub fn fetch_extensions_from_all_profiles(&mut self) {
        self.extensions.clear();
        let profile_ids: Vec<String> = self.profiles.keys().cloned().collect();
        for profile_id in profile_ids {
            // usually only the secure store has extension data, the general
            // one is read for completeness
            self.fetch_extensions_in_pref(&profile_id);
            self.fetch_extensions_in_secure_pref(&profile_id);
        }
    }

    fn fetch_extensions_in_pref(&mut self, profile_id: &str) {
        let Some(profile) = self.profiles.get_mut(profile_id) else {
            return;
        };
        let pref_file = profile.profile_dir.join("Preferences");
        if !pref_file.is_file() {
            warn!("[READ] {}", StoreError::NotFound(pref_file));
            return;
        }
        profile.pref_file = Some(pref_file.clone());

        self.fetch_extensions_from_preferences(&pref_file, profile_id);
    }

    fn fetch_extensions_in_secure_pref(&mut self, profile_id: &str) {
        let Some(profile) = self.profiles.get_mut(profile_id) else {
            return;
        };
        let secure_pref_file = profile.profile_dir.join("Secure Preferences");
        if !secure_pref_file.is_file() {
            warn!("[READ] {}", StoreError::NotFound(secure_pref_file));
            return;
        }
        profile.secure_pref_file = Some(secure_pref_file.clone());

        self.fetch_extensions_from_preferences(&secure_pref_file, profile_id);
    }

    fn fetch_extensions_from_preferences(&mut self, either_pref_file: &Path, profile_id: &str) {
        let pref_data = match read_json_file(either_pref_file) {
            Ok(data) => data,
            Err(err) => {
                warn!("[READ] {err}");
                return;
            }
        };

        // A store without extensions/settings is common and not worth a
        // warning.
        let Some(ext_settings) =
            get_chained(&pref_data, &["extensions", "settings"]).and_then(Value::as_object)
        else {
            return;
        };

        self.fetch_extensions_from_settings(ext_settings, profile_id);
    }

    fn fetch_extensions_from_settings(
        &mut self,
        ext_settings: &Map<String, Value>,
        profile_id: &str,
    ) {
        let Self {
            profiles,
            extensions,
            ..
        } = self;
        let Some(profile) = profiles.get_mut(profile_id) else {
            return;
        };

        // Recorded whenever the directory exists, even if every id below
        // takes the fast path: deletion later removes unpacked files from
        // every affected profile, not only the one that was indexed first.
        let extensions_dir = profile.profile_dir.join("Extensions");
        if extensions_dir.is_dir() {
            profile.extensions_dir = Some(extensions_dir.clone());
        }

        for (ext_id, ext_set) in ext_settings {
            // Fast path: some other profile (or the other store) already
            // revealed this id, only the relationship sides grow.
            if let Some(ext) = extensions.get_mut(ext_id) {
                profile.extensions.insert(ext_id.clone());
                ext.profiles.insert(profile.id.clone());
                continue;
            }

            if profile.extensions_dir.is_none() {
                warn!(
                    "[READ] [{}] is not a directory or does not exist",
                    extensions_dir.display()
                );
                continue;
            }

            let ext_path = ext_set.get("path").and_then(Value::as_str).unwrap_or("");
            if ext_path.is_empty() {
                continue;
            }
            // A path-like value starting with a separator would make the
            // join below jump to the filesystem root.
            let ext_path = ext_path.strip_prefix('/').unwrap_or(ext_path);

            let (manifest_data, icon_parent_path) = if ext_path.starts_with(ext_id.as_str()) {
                // store-installed: the manifest travels inside the settings
                // entry and the files live under the Extensions directory
                let manifest = ext_set.get("manifest").cloned().unwrap_or(Value::Null);
                (manifest, extensions_dir.join(ext_path))
            } else if !path_not_exist(ext_path) {
                // probably sideloaded from an external directory
                let manifest_file = Path::new(ext_path).join("manifest.json");
                if !manifest_file.is_file() {
                    // internal extension with an incomplete layout
                    continue;
                }
                match read_json_file(&manifest_file) {
                    Ok(manifest) => (manifest, PathBuf::from(ext_path)),
                    Err(err) => {
                        warn!("[READ] {err}");
                        continue;
                    }
                }
            } else {
                // internal extension without usable information
                continue;
            };

            let extension = Extension {
                id: ext_id.clone(),
                name: manifest_data
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                description: manifest_data
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                icon: resolve_manifest_icon(&manifest_data, &icon_parent_path),
                profiles: BTreeSet::from([profile.id.clone()]),
                raw_data: ext_set.clone(),
            };
            extensions.insert(ext_id.clone(), extension);
            profile.extensions.insert(ext_id.clone());
        }
    }
}

/// Pick the largest icon the manifest offers and resolve it relative to the
/// extension's directory. Anything unresolvable yields `None`.
fn resolve_manifest_icon(manifest: &Value, icon_parent_path: &Path) -> Option<PathBuf> {
    let icons = manifest.get("icons")?.as_object()?;
    let (_, icon_short_path) = icons
        .iter()
        .filter_map(|(size, path)| Some((size.parse::<u64>().ok()?, path.as_str()?)))
        .max_by_key(|(size, _)| *size)?;

    // Same separator problem as the declared extension path.
    let icon_short_path = icon_short_path.strip_prefix('/').unwrap_or(icon_short_path);
    let icon_path = icon_parent_path.join(icon_short_path);
    icon_path.is_file().then_some(icon_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn largest_icon_size_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();

        let manifest = json!({"icons": {"16": "a.png", "48": "b.png"}});
        let icon = resolve_manifest_icon(&manifest, dir.path());
        assert_eq!(icon, Some(dir.path().join("b.png")));
    }

    #[test]
    fn numeric_not_lexicographic_icon_ordering() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.png"), b"x").unwrap();
        std::fs::write(dir.path().join("small.png"), b"x").unwrap();

        // "9" sorts after "128" as a string; 128 must still win
        let manifest = json!({"icons": {"9": "small.png", "128": "big.png"}});
        let icon = resolve_manifest_icon(&manifest, dir.path());
        assert_eq!(icon, Some(dir.path().join("big.png")));
    }

    #[test]
    fn missing_icon_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = json!({"icons": {"48": "gone.png"}});
        assert_eq!(resolve_manifest_icon(&manifest, dir.path()), None);
    }

    #[test]
    fn empty_icon_map_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_manifest_icon(&json!({"icons": {}}), dir.path()), None);
        assert_eq!(resolve_manifest_icon(&json!({}), dir.path()), None);
    }

    #[test]
    fn leading_separator_stripped_from_icon_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("icon.png"), b"x").unwrap();
        let manifest = json!({"icons": {"32": "/icon.png"}});
        assert_eq!(
            resolve_manifest_icon(&manifest, dir.path()),
            Some(dir.path().join("icon.png"))
        );
    }
}
