use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use browser_profile_manager::instance::BrowserInstance;
use browser_profile_manager::registry::Registry;
use browser_profile_manager::safety::{mark_map, SafetyClient, SAFE_UNKNOWN};

const DEFAULT_SAFETY_API: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "browser-profile-manager")]
#[command(about = "Cross-profile extension and bookmark manager for Chromium-family browsers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry database path
    #[arg(long, default_value = "userdata.db", global = true)]
    registry: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered browser installations
    Browsers,

    /// Register a browser installation
    AddBrowser {
        /// Display name (unique)
        #[arg(short, long)]
        name: String,

        /// Browser type tag (chrome, edge, brave, vivaldi, yandex, chromium)
        #[arg(short = 't', long = "type", default_value = "chromium")]
        kind: String,

        /// Executable path (optional)
        #[arg(short, long, default_value = "")]
        exec_path: String,

        /// User-data root directory
        #[arg(short, long)]
        data_path: String,
    },

    /// Unregister a browser installation
    RemoveBrowser {
        /// Display name of the entry to remove
        #[arg(short, long)]
        name: String,
    },

    /// Re-detect installed browsers and rebuild the registry
    ResetBrowsers,

    /// List profiles of one installation
    Profiles {
        /// User-data directory (overrides --browser)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Registered browser name
        #[arg(short, long)]
        browser: Option<String>,
    },

    /// List extensions across all profiles
    Extensions {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(short, long)]
        browser: Option<String>,

        /// Fetch safety marks from the classification service
        #[arg(long)]
        marks: bool,

        /// Safety marks API base URL
        #[arg(long, default_value = DEFAULT_SAFETY_API)]
        api: String,
    },

    /// List bookmarks across all profiles
    Bookmarks {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(short, long)]
        browser: Option<String>,

        /// Only show bookmarks whose URL contains this substring
        #[arg(short, long)]
        contains: Option<String>,

        /// Only show bookmarks present in these profiles (comma-separated)
        #[arg(short, long)]
        profiles: Option<String>,
    },

    /// Delete extensions from every profile that has them
    DeleteExtensions {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(short, long)]
        browser: Option<String>,

        /// Extension ids (comma-separated)
        #[arg(short, long)]
        ids: String,

        /// Restrict the deletion to these profiles (comma-separated)
        #[arg(short, long)]
        profiles: Option<String>,
    },

    /// Delete bookmarks by URL from every profile that has them
    DeleteBookmarks {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(short, long)]
        browser: Option<String>,

        /// URL to delete (repeatable)
        #[arg(short, long = "url")]
        urls: Vec<String>,

        /// Restrict the deletion to these profiles (comma-separated)
        #[arg(short, long)]
        profiles: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Browsers => {
            let registry = Registry::open(&cli.registry)?;
            let entries = registry.select_all()?;
            if entries.is_empty() {
                println!("No browser installations registered.");
            }
            for entry in entries {
                println!(
                    "{:<12} [{}] data: {}  exec: {}",
                    entry.name,
                    entry.kind,
                    entry.data_path,
                    if entry.exec_path.is_empty() {
                        "-"
                    } else {
                        entry.exec_path.as_str()
                    }
                );
            }
        }

        Commands::AddBrowser {
            name,
            kind,
            exec_path,
            data_path,
        } => {
            let registry = Registry::open(&cli.registry)?;
            registry.insert_one(&name, &kind, &exec_path, &data_path)?;
            info!("✅ Registered {name}");
        }

        Commands::RemoveBrowser { name } => {
            let registry = Registry::open(&cli.registry)?;
            registry.delete_one(&name)?;
            info!("✅ Removed {name}");
        }

        Commands::ResetBrowsers => {
            let registry = Registry::open(&cli.registry)?;
            registry.reset()?;
            info!("✅ Registry rebuilt from detected browsers");
            for entry in registry.select_all()? {
                println!("{:<12} [{}] {}", entry.name, entry.kind, entry.data_path);
            }
        }

        Commands::Profiles { data_dir, browser } => {
            let mut instance = open_instance(&cli.registry, data_dir, browser)?;
            instance.rebuild();

            for profile_id in instance.sorted_profile_ids() {
                let profile = &instance.profiles[&profile_id];
                println!(
                    "{:<12} {:<20} extensions: {:<3} bookmarks: {}",
                    profile.id,
                    profile.name,
                    profile.extensions.len(),
                    profile.bookmarks.len()
                );
            }
        }

        Commands::Extensions {
            data_dir,
            browser,
            marks,
            api,
        } => {
            let mut instance = open_instance(&cli.registry, data_dir, browser)?;
            instance.fetch_all_profiles();
            instance.fetch_extensions_from_all_profiles();

            let safe_marks = if marks {
                info!("🔍 Fetching safety marks from {api}");
                let client = SafetyClient::new(api);
                mark_map(client.query_necessary().await?)
            } else {
                Default::default()
            };

            for ext in instance.extensions.values() {
                let safe = safe_marks.get(&ext.id).map_or(SAFE_UNKNOWN, |m| m.safe);
                let mark = if marks {
                    format!(" safe: {safe}")
                } else {
                    String::new()
                };
                println!(
                    "{} {:<32} profiles: {:?}{}",
                    ext.id,
                    ext.name,
                    ext.profiles.iter().collect::<Vec<_>>(),
                    mark
                );
            }
        }

        Commands::Bookmarks {
            data_dir,
            browser,
            contains,
            profiles,
        } => {
            let mut instance = open_instance(&cli.registry, data_dir, browser)?;
            instance.fetch_all_profiles();
            instance.fetch_bookmarks_from_all_profiles();

            let profile_ids = profiles.map(parse_id_list);
            let filtered = instance.search_bookmarks(
                contains.as_deref().unwrap_or(""),
                profile_ids.as_deref(),
            );
            for bookmark in filtered.values() {
                println!("{:<40} {}", bookmark.name, bookmark.url);
                for (profile_id, path) in &bookmark.profiles {
                    println!("    {profile_id}: {path}");
                }
            }
        }

        Commands::DeleteExtensions {
            data_dir,
            browser,
            ids,
            profiles,
        } => {
            let mut instance = open_instance(&cli.registry, data_dir, browser)?;
            instance.fetch_all_profiles();
            instance.fetch_extensions_from_all_profiles();

            let ext_ids = parse_id_list(ids);
            let profile_ids = profiles.map(parse_id_list);
            info!("🗑️  Deleting {} extension(s)", ext_ids.len());
            instance.delete_extensions(&ext_ids, profile_ids.as_deref())?;
            info!("✅ Deletion complete");
        }

        Commands::DeleteBookmarks {
            data_dir,
            browser,
            urls,
            profiles,
        } => {
            if urls.is_empty() {
                bail!("no URLs given, use --url at least once");
            }
            let mut instance = open_instance(&cli.registry, data_dir, browser)?;
            instance.fetch_all_profiles();
            instance.fetch_bookmarks_from_all_profiles();

            let profile_ids = profiles.map(parse_id_list);
            info!("🗑️  Deleting {} bookmark(s)", urls.len());
            instance.delete_bookmarks(&urls, profile_ids.as_deref())?;
            info!("✅ Deletion complete");
        }
    }

    Ok(())
}

/// Resolve the user-data root from an explicit directory or a registered
/// browser name.
fn open_instance(
    registry_path: &PathBuf,
    data_dir: Option<PathBuf>,
    browser: Option<String>,
) -> Result<BrowserInstance> {
    if let Some(dir) = data_dir {
        return Ok(BrowserInstance::new(dir));
    }
    let Some(name) = browser else {
        bail!("either --data-dir or --browser is required");
    };
    let registry = Registry::open(registry_path)?;
    let Some(entry) = registry.find(&name)? else {
        bail!("no registered browser named [{name}], see the browsers command");
    };
    Ok(BrowserInstance::new(entry.data_path))
}

fn parse_id_list(list: String) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
