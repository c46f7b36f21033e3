//! Default install locations for the supported Chromium-family browsers.
//!
//! Used to seed the installation registry. A browser missing from the
//! machine resolves to `None`, never an error.

use std::path::PathBuf;

pub const SUPPORTED_BROWSERS: &[&str] =
    &["chrome", "edge", "brave", "vivaldi", "yandex", "chromium"];

/// Default user-data root for the browser, `None` when not present on this
/// machine.
pub fn browser_data_path(browser: &str) -> Option<PathBuf> {
    let path = default_data_path(browser)?;
    path.is_dir().then_some(path)
}

/// Default executable path, `None` when not present. Only recorded for the
/// registry; nothing in the engine launches it.
pub fn browser_exec_path(browser: &str) -> Option<PathBuf> {
    let path = default_exec_path(browser)?;
    path.is_file().then_some(path)
}

#[cfg(target_os = "macos")]
fn default_data_path(browser: &str) -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let suffix = match browser {
        "chrome" => "Google/Chrome",
        "edge" => "Microsoft Edge",
        "brave" => "BraveSoftware/Brave-Browser",
        "vivaldi" => "Vivaldi",
        "yandex" => "Yandex/YandexBrowser",
        "chromium" => "Chromium",
        _ => return None,
    };
    Some(PathBuf::from(format!(
        "{home}/Library/Application Support/{suffix}"
    )))
}

#[cfg(target_os = "macos")]
fn default_exec_path(browser: &str) -> Option<PathBuf> {
    let path = match browser {
        "chrome" => "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "edge" => "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        "brave" => "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
        "vivaldi" => "/Applications/Vivaldi.app/Contents/MacOS/Vivaldi",
        "yandex" => "/Applications/Yandex.app/Contents/MacOS/Yandex",
        "chromium" => "/Applications/Chromium.app/Contents/MacOS/Chromium",
        _ => return None,
    };
    Some(PathBuf::from(path))
}

#[cfg(target_os = "linux")]
fn default_data_path(browser: &str) -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let suffix = match browser {
        "chrome" => "google-chrome",
        "edge" => "microsoft-edge",
        "brave" => "BraveSoftware/Brave-Browser",
        "vivaldi" => "vivaldi",
        "yandex" => "yandex-browser",
        "chromium" => "chromium",
        _ => return None,
    };
    Some(PathBuf::from(format!("{home}/.config/{suffix}")))
}

#[cfg(target_os = "linux")]
fn default_exec_path(browser: &str) -> Option<PathBuf> {
    let path = match browser {
        "chrome" => "/usr/bin/google-chrome",
        "edge" => "/usr/bin/microsoft-edge",
        "brave" => "/usr/bin/brave-browser",
        "vivaldi" => "/usr/bin/vivaldi",
        "yandex" => "/usr/bin/yandex-browser",
        "chromium" => "/usr/bin/chromium",
        _ => return None,
    };
    Some(PathBuf::from(path))
}

#[cfg(target_os = "windows")]
fn default_data_path(browser: &str) -> Option<PathBuf> {
    let local = std::env::var("LOCALAPPDATA").ok()?;
    let suffix = match browser {
        "chrome" => r"Google\Chrome\User Data",
        "edge" => r"Microsoft\Edge\User Data",
        "brave" => r"BraveSoftware\Brave-Browser\User Data",
        "vivaldi" => r"Vivaldi\User Data",
        "yandex" => r"Yandex\YandexBrowser\User Data",
        "chromium" => r"Chromium\User Data",
        _ => return None,
    };
    Some(PathBuf::from(format!(r"{local}\{suffix}")))
}

#[cfg(target_os = "windows")]
fn default_exec_path(browser: &str) -> Option<PathBuf> {
    let program_files = std::env::var("ProgramFiles").ok()?;
    let suffix = match browser {
        "chrome" => r"Google\Chrome\Application\chrome.exe",
        "edge" => r"Microsoft\Edge\Application\msedge.exe",
        "brave" => r"BraveSoftware\Brave-Browser\Application\brave.exe",
        "vivaldi" => r"Vivaldi\Application\vivaldi.exe",
        "yandex" => r"Yandex\YandexBrowser\Application\browser.exe",
        "chromium" => r"Chromium\Application\chrome.exe",
        _ => return None,
    };
    Some(PathBuf::from(format!(r"{program_files}\{suffix}")))
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn default_data_path(_browser: &str) -> Option<PathBuf> {
    None
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn default_exec_path(_browser: &str) -> Option<PathBuf> {
    None
}
