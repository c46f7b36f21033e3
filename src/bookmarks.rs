//! Bookmark indexing across profiles.
//!
//! Each profile's `Bookmarks` store is a set of named root folders, each a
//! recursive folder/url tree. The walk flattens every tree into the global
//! URL-keyed index while keeping, per profile, the slash-joined folder path
//! under which the URL is filed.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::data_types::{Bookmark, Profile};
use crate::instance::{read_json_file, BrowserInstance, StoreError};
use crate::json_utils::get_chained;

impl BrowserInstance {
    /// Rebuild the global bookmark index from every profile's `Bookmarks`
    /// store. A profile without the file (no bookmarks saved yet) or with
    /// an unreadable one is skipped, the others still contribute.
    pub fn fetch_bookmarks_from_all_profiles(&mut self) {
        self.bookmarks.clear();
        let profile_ids: Vec<String> = self.profiles.keys().cloned().collect();

        for profile_id in profile_ids {
            let Self {
                profiles,
                bookmarks,
                ..
            } = self;
            let Some(profile) = profiles.get_mut(&profile_id) else {
                continue;
            };

            let bookmark_file = profile.profile_dir.join("Bookmarks");
            if bookmark_file.is_file() {
                profile.bookmark_file = Some(bookmark_file.clone());
            }
            let bookmark_data = match read_json_file(&bookmark_file) {
                Ok(data) => data,
                Err(err) => {
                    // a profile that never saved a bookmark has no file
                    warn!("[READ] {err}");
                    continue;
                }
            };

            let Some(roots) = get_chained(&bookmark_data, &["roots"]).and_then(Value::as_object)
            else {
                warn!("[READ] {}", StoreError::MissingSection(bookmark_file, "roots"));
                continue;
            };

            for root in roots.values() {
                // The named root folder itself acts as the empty-string
                // sentinel, so paths come out "/"-prefixed without the
                // category name in them.
                let Some(children) = root.get("children").and_then(Value::as_array) else {
                    continue;
                };
                for child in children {
                    collect_bookmarks(child, profile, bookmarks, &[String::new()]);
                }
            }
        }
    }
}

/// Depth-first walk of one bookmark node, children in stored order.
/// `path_ls` carries the ancestor folder names, e.g. `["", "Bar", "Work"]`.
fn collect_bookmarks(
    node: &Value,
    profile: &mut Profile,
    bookmarks: &mut IndexMap<String, Bookmark>,
    path_ls: &[String],
) {
    match node.get("type").and_then(Value::as_str) {
        Some("url") => {
            let Some(url) = node.get("url").and_then(Value::as_str) else {
                return;
            };
            let bmk_path = path_ls.join("/");
            // A URL seen twice in one tree just overwrites its own path,
            // last write wins.
            profile
                .bookmarks
                .insert(url.to_string(), bmk_path.clone());

            if let Some(bookmark) = bookmarks.get_mut(url) {
                bookmark.profiles.insert(profile.id.clone(), bmk_path);
            } else {
                bookmarks.insert(
                    url.to_string(),
                    Bookmark {
                        name: node
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        url: url.to_string(),
                        profiles: BTreeMap::from([(profile.id.clone(), bmk_path)]),
                    },
                );
            }
        }
        Some("folder") => {
            let name = node
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let mut new_path_ls = path_ls.to_vec();
            new_path_ls.push(name);

            if let Some(children) = node.get("children").and_then(Value::as_array) {
                for child in children {
                    collect_bookmarks(child, profile, bookmarks, &new_path_ls);
                }
            }
        }
        _ => {}
    }
}
