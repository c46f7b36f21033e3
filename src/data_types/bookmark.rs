use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One saved URL, deduplicated across profiles. The URL itself is the
/// primary key; Chromium's internal numeric node ids are discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    /// Display name from the first profile that revealed the URL. Not
    /// reconciled if other profiles use a different title.
    pub name: String,
    pub url: String,
    /// Profile id -> slash-joined folder path under which that profile
    /// files this URL. A record with an empty map must not remain in the
    /// global index.
    pub profiles: BTreeMap<String, String>,
}
