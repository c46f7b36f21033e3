use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Unset fill color in `Local State` profile entries (transparent).
pub const DEFAULT_AVATAR_FILL_COLOR: i64 = -4278190081;
/// Unset stroke color (white).
pub const DEFAULT_AVATAR_STROKE_COLOR: i64 = -1;

/// One user profile inside a browser installation.
///
/// Built in bulk by profile discovery from `Local State`; the indexers fill
/// in file paths and back-references afterwards, and the deletion engine
/// removes back-reference entries. Individual profiles are never destroyed,
/// the whole map is rebuilt on refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Directory name under the user-data root, e.g. "Default", "Profile 1".
    pub id: String,
    pub name: String,
    pub user_name: String,
    pub gaia_name: String,
    pub gaia_given_name: String,
    /// Built-in avatar key, reduced to its filename component.
    pub avatar_icon: String,
    /// Packed ARGB as signed 32-bit, widened to i64 to hold the sentinel.
    pub default_avatar_fill_color: i64,
    pub default_avatar_stroke_color: i64,
    pub gaia_picture_file_name: String,
    pub userdata_dir: PathBuf,
    /// Always `userdata_dir/id`; existence is not verified at discovery time.
    pub profile_dir: PathBuf,
    /// `None` means the file was not found (yet). Filled by the indexers.
    pub pref_file: Option<PathBuf>,
    pub secure_pref_file: Option<PathBuf>,
    pub bookmark_file: Option<PathBuf>,
    pub extensions_dir: Option<PathBuf>,
    /// Extension ids installed in this profile (back-reference).
    pub extensions: BTreeSet<String>,
    /// URL -> folder path where this profile files it (back-reference).
    pub bookmarks: BTreeMap<String, String>,
    /// Original `Local State` entry, retained for inspection.
    pub raw_data: Value,
}

impl Profile {
    /// Decode one `profile.info_cache` entry. Missing fields fall back to
    /// explicit defaults rather than failing the whole profile.
    pub fn from_info_cache(id: &str, userdata_dir: &Path, info: &Value) -> Self {
        let str_field = |key: &str| {
            info.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        // Some browsers store a resource path here; only the filename is a
        // usable icon key, and stripping the prefix avoids path traversal.
        let avatar_icon = info
            .get("avatar_icon")
            .and_then(Value::as_str)
            .map(|raw| {
                Path::new(raw)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        Profile {
            id: id.to_string(),
            name: str_field("name"),
            user_name: str_field("user_name"),
            gaia_name: str_field("gaia_name"),
            gaia_given_name: str_field("gaia_given_name"),
            avatar_icon,
            default_avatar_fill_color: info
                .get("default_avatar_fill_color")
                .and_then(Value::as_i64)
                .unwrap_or(DEFAULT_AVATAR_FILL_COLOR),
            default_avatar_stroke_color: info
                .get("default_avatar_stroke_color")
                .and_then(Value::as_i64)
                .unwrap_or(DEFAULT_AVATAR_STROKE_COLOR),
            gaia_picture_file_name: str_field("gaia_picture_file_name"),
            userdata_dir: userdata_dir.to_path_buf(),
            profile_dir: userdata_dir.join(id),
            pref_file: None,
            secure_pref_file: None,
            bookmark_file: None,
            extensions_dir: None,
            extensions: BTreeSet::new(),
            bookmarks: BTreeMap::new(),
            raw_data: info.clone(),
        }
    }
}

/// Sort key for profile ids: "Default" first, then "Profile N" by number,
/// anything unparsable after those.
pub fn profile_sort_key(profile_id: &str) -> u32 {
    if profile_id == "Default" {
        return 0;
    }
    // splitn always yields at least one piece, so last() is safe
    profile_id
        .splitn(2, ' ')
        .last()
        .and_then(|seq| seq.parse().ok())
        .unwrap_or(999)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn info_cache_defaults_applied() {
        let info = json!({"name": "Personal"});
        let p = Profile::from_info_cache("Profile 2", Path::new("/tmp/ud"), &info);
        assert_eq!(p.name, "Personal");
        assert_eq!(p.user_name, "");
        assert_eq!(p.default_avatar_fill_color, DEFAULT_AVATAR_FILL_COLOR);
        assert_eq!(p.default_avatar_stroke_color, DEFAULT_AVATAR_STROKE_COLOR);
        assert_eq!(p.profile_dir, PathBuf::from("/tmp/ud/Profile 2"));
        assert!(p.pref_file.is_none());
    }

    #[test]
    fn avatar_icon_reduced_to_filename() {
        let info = json!({"avatar_icon": "chrome://theme/IDR_PROFILE_AVATAR_33"});
        let p = Profile::from_info_cache("Default", Path::new("/tmp/ud"), &info);
        assert_eq!(p.avatar_icon, "IDR_PROFILE_AVATAR_33");
    }

    #[test]
    fn profile_ids_sort_default_first() {
        let mut ids = vec!["Profile 11", "Default", "Profile 2", "Weird"];
        ids.sort_by_key(|id| profile_sort_key(id));
        assert_eq!(ids, vec!["Default", "Profile 2", "Profile 11", "Weird"]);
    }
}
