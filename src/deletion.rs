//! Consistent deletion of extensions and bookmarks across profiles.
//!
//! A delete touches up to four redundant stores per profile (two preference
//! files, the bookmarks file, the on-disk extension directory) plus both
//! in-memory relationship sides. The on-disk rewrites are whole-file and
//! last-writer-wins; the in-memory sides go through a single detach entry
//! point so the profile<->item symmetry cannot drift.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

use crate::data_types::{Bookmark, Profile};
use crate::instance::{read_json_file, BrowserInstance};
use crate::json_utils::get_chained_mut;

/// Nested secure-preferences section that mirrors extension settings keys.
const SECURE_PREF_MACS_PATH: &[&str] = &["protection", "macs", "extensions", "settings"];
/// Nested general-preferences section listing pinned extension ids.
const PREF_PINNED_PATH: &[&str] = &["extensions", "pinned_extensions"];

impl BrowserInstance {
    /// Delete extensions from every profile that has them, or only from the
    /// given subset. Unknown ids and out-of-scope profiles are no-ops.
    pub fn delete_extensions(
        &mut self,
        ext_ids_to_delete: &[String],
        profile_ids: Option<&[String]>,
    ) -> Result<()> {
        // Union of the named extensions' profile sets: if A lives in 1,2,3
        // and B in 2,3,4 then profiles 1..4 all need a pass.
        let mut default_profile_ids = BTreeSet::new();
        for ext_id in ext_ids_to_delete {
            if let Some(ext) = self.extensions.get(ext_id) {
                default_profile_ids.extend(ext.profiles.iter().cloned());
            }
        }
        let affected = restrict_profiles(default_profile_ids, profile_ids);

        for profile_id in &affected {
            self.delete_extensions_in_secure_pref(ext_ids_to_delete, profile_id)?;
            self.delete_extensions_in_pref(ext_ids_to_delete, profile_id)?;
            self.delete_extensions_from_disk(ext_ids_to_delete, profile_id);
        }
        Ok(())
    }

    fn delete_extensions_in_secure_pref(
        &mut self,
        ext_ids: &[String],
        profile_id: &str,
    ) -> Result<()> {
        let Some(secure_pref_file) = self
            .profiles
            .get(profile_id)
            .and_then(|p| p.secure_pref_file.clone())
        else {
            return Ok(());
        };
        self.delete_extensions_from_preferences(
            &secure_pref_file,
            ext_ids,
            profile_id,
            SECURE_PREF_MACS_PATH,
        )
    }

    fn delete_extensions_in_pref(&mut self, ext_ids: &[String], profile_id: &str) -> Result<()> {
        let Some(pref_file) = self
            .profiles
            .get(profile_id)
            .and_then(|p| p.pref_file.clone())
        else {
            return Ok(());
        };
        self.delete_extensions_from_preferences(&pref_file, ext_ids, profile_id, PREF_PINNED_PATH)
    }

    /// Remove the ids from one preference store and re-serialize the whole
    /// file. An unreadable store skips this profile's file, a failed write
    /// propagates.
    fn delete_extensions_from_preferences(
        &mut self,
        either_pref_file: &Path,
        ext_ids: &[String],
        profile_id: &str,
        special_parts_path: &[&str],
    ) -> Result<()> {
        let mut pref_data = match read_json_file(either_pref_file) {
            Ok(data) => data,
            Err(err) => {
                info!("[DELETE] {err}");
                return Ok(());
            }
        };

        if let Some(ext_settings) =
            get_chained_mut(&mut pref_data, &["extensions", "settings"]).and_then(Value::as_object_mut)
        {
            for ext_id in ext_ids {
                if ext_settings.shift_remove(ext_id).is_some() {
                    self.detach_extension(ext_id, profile_id);
                    info!("[DELETE] deleted {ext_id} from {profile_id}");
                }
            }
        }

        // The nested section is a keyed map in the secure store and a plain
        // id list in the general one; handle either shape.
        match get_chained_mut(&mut pref_data, special_parts_path) {
            Some(Value::Object(map)) => {
                for ext_id in ext_ids {
                    map.shift_remove(ext_id.as_str());
                }
            }
            Some(Value::Array(list)) => {
                list.retain(|entry| {
                    entry
                        .as_str()
                        .map_or(true, |id| !ext_ids.iter().any(|e| e == id))
                });
            }
            _ => {}
        }

        let text = serde_json::to_string_pretty(&pref_data)?;
        std::fs::write(either_pref_file, text)
            .with_context(|| format!("failed to rewrite [{}]", either_pref_file.display()))
    }

    /// Remove each id's directory under the profile's `Extensions` tree.
    /// Sideloaded extensions live elsewhere, so their absence here is the
    /// expected no-op.
    fn delete_extensions_from_disk(&self, ext_ids: &[String], profile_id: &str) {
        let Some(extensions_dir) = self
            .profiles
            .get(profile_id)
            .and_then(|p| p.extensions_dir.as_deref())
        else {
            return;
        };
        for ext_id in ext_ids {
            let ext_dir = extensions_dir.join(ext_id);
            if ext_dir.exists() {
                if let Err(err) = std::fs::remove_dir_all(&ext_dir) {
                    warn!("[DELETE] failed to remove [{}]: {err}", ext_dir.display());
                }
            }
        }
    }

    /// Delete bookmarks by URL from every profile that files them, or only
    /// from the given subset.
    pub fn delete_bookmarks(
        &mut self,
        urls_to_delete: &[String],
        profile_ids: Option<&[String]>,
    ) -> Result<()> {
        let mut default_profile_ids = BTreeSet::new();
        for url in urls_to_delete {
            if let Some(bookmark) = self.bookmarks.get(url) {
                default_profile_ids.extend(bookmark.profiles.keys().cloned());
            }
        }
        let affected = restrict_profiles(default_profile_ids, profile_ids);

        for profile_id in &affected {
            self.delete_bookmarks_in_profile(urls_to_delete, profile_id)?;
        }
        Ok(())
    }

    fn delete_bookmarks_in_profile(&mut self, urls: &[String], profile_id: &str) -> Result<()> {
        let Some(profile) = self.profiles.get(profile_id) else {
            return Ok(());
        };

        // A stale backup would resurrect deleted entries on browser repair.
        let _ = std::fs::remove_file(profile.profile_dir.join("Bookmarks.bak"));

        let Some(bookmark_file) = profile.bookmark_file.clone() else {
            return Ok(());
        };
        let mut bookmark_data = match read_json_file(&bookmark_file) {
            Ok(data) => data,
            Err(err) => {
                warn!("[DELETE] {err}");
                return Ok(());
            }
        };

        // The checksum covers the old content and must not survive the
        // rewrite.
        if let Some(top) = bookmark_data.as_object_mut() {
            top.shift_remove("checksum");
        }

        if let Some(roots) = get_chained_mut(&mut bookmark_data, &["roots"])
            .and_then(Value::as_object_mut)
        {
            for root in roots.values_mut() {
                delete_bookmarks_in_folder(
                    root,
                    urls,
                    profile_id,
                    &mut self.profiles,
                    &mut self.bookmarks,
                );
            }
        }

        let text = serde_json::to_string_pretty(&bookmark_data)?;
        std::fs::write(&bookmark_file, text)
            .with_context(|| format!("failed to rewrite [{}]", bookmark_file.display()))
    }

    /// Single mutation entry point for the profile<->extension relation:
    /// both sides change together and an emptied extension record is pruned
    /// from the global index.
    fn detach_extension(&mut self, ext_id: &str, profile_id: &str) {
        if let Some(profile) = self.profiles.get_mut(profile_id) {
            profile.extensions.remove(ext_id);
        }
        if let Some(ext) = self.extensions.get_mut(ext_id) {
            ext.profiles.remove(profile_id);
            if ext.profiles.is_empty() {
                self.extensions.shift_remove(ext_id);
            }
        }
    }
}

/// Same symmetric detach for bookmarks, free-standing because the bookmark
/// file walk already holds disjoint borrows of both indices.
fn detach_bookmark(
    url: &str,
    profile_id: &str,
    profiles: &mut IndexMap<String, Profile>,
    bookmarks: &mut IndexMap<String, Bookmark>,
) {
    if let Some(profile) = profiles.get_mut(profile_id) {
        profile.bookmarks.remove(url);
    }
    if let Some(bookmark) = bookmarks.get_mut(url) {
        bookmark.profiles.remove(profile_id);
        if bookmark.profiles.is_empty() {
            bookmarks.shift_remove(url);
        }
    }
}

/// Walk one folder node, removing matching url leaves. Children are visited
/// in reverse index order so removals cannot invalidate the iteration.
fn delete_bookmarks_in_folder(
    node: &mut Value,
    urls: &[String],
    profile_id: &str,
    profiles: &mut IndexMap<String, Profile>,
    bookmarks: &mut IndexMap<String, Bookmark>,
) {
    if node.get("type").and_then(Value::as_str) != Some("folder") {
        return;
    }
    let Some(children) = node.get_mut("children").and_then(Value::as_array_mut) else {
        return;
    };

    for i in (0..children.len()).rev() {
        if children[i].get("type").and_then(Value::as_str) == Some("url") {
            let Some(url) = children[i]
                .get("url")
                .and_then(Value::as_str)
                .map(str::to_string)
            else {
                continue;
            };
            if urls.contains(&url) {
                children.remove(i);
                detach_bookmark(&url, profile_id, profiles, bookmarks);
                info!("[DELETE] deleted {url} from {profile_id}");
            }
        } else {
            delete_bookmarks_in_folder(&mut children[i], urls, profile_id, profiles, bookmarks);
        }
    }
}

/// Default affected set intersected with an optional caller restriction.
fn restrict_profiles(
    default_profile_ids: BTreeSet<String>,
    profile_ids: Option<&[String]>,
) -> BTreeSet<String> {
    match profile_ids {
        None => default_profile_ids,
        Some(restriction) => default_profile_ids
            .into_iter()
            .filter(|id| restriction.contains(id))
            .collect(),
    }
}

impl BrowserInstance {
    /// Substring search over the global bookmark index, optionally limited
    /// to bookmarks present in at least one of the given profiles.
    pub fn search_bookmarks(
        &self,
        url_contains: &str,
        profile_ids: Option<&[String]>,
    ) -> IndexMap<String, Bookmark> {
        self.bookmarks
            .iter()
            .filter(|(url, bookmark)| {
                url.contains(url_contains)
                    && match profile_ids {
                        None => true,
                        Some(ids) => bookmark.profiles.keys().any(|p| ids.contains(p)),
                    }
            })
            .map(|(url, bookmark)| (url.clone(), bookmark.clone()))
            .collect()
    }
}
