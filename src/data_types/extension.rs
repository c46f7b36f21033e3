use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One browser extension, deduplicated across every profile that installs
/// the same store id.
///
/// Created the first time any profile's preference store reveals the id;
/// later profiles only extend `profiles`. A record whose `profiles` set is
/// empty must not remain in the global index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extension {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Resolved largest manifest icon, `None` if unresolvable.
    pub icon: Option<PathBuf>,
    /// Ids of profiles that have this extension installed.
    pub profiles: BTreeSet<String>,
    /// Original settings entry from the preference store.
    pub raw_data: Value,
}
