use directories::ProjectDirs;
use pdflink::config::{LinkOptions, PlatformProfile};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn get_config_dir() -> PathBuf {
    ProjectDirs::from("com", "SV-stark", "pdfnav")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_settings_path() -> PathBuf {
    get_config_dir().join("settings.json")
}

/// Load link options from `path`, or from the per-user settings file.
///
/// A missing file gives the defaults. A corrupted one is reported and
/// whatever fields can still be read are kept.
pub fn load_options(path: Option<&Path>) -> LinkOptions {
    let path = path.map_or_else(default_settings_path, Path::to_path_buf);
    match fs::read_to_string(&path) {
        Ok(data) => parse_options(&data),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no settings file, using defaults");
            LinkOptions::default()
        }
    }
}

fn parse_options(data: &str) -> LinkOptions {
    if let Ok(options) = LinkOptions::from_json(data) {
        return options;
    }

    warn!("Corrupted settings.json, using defaults");
    let mut options = LinkOptions::default();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(data) {
        if let Some(obj) = value.as_object() {
            if let Some(platform) = obj.get("platform").and_then(|v| v.as_str()) {
                options.platform = PlatformProfile::from(platform);
            }
            if let Some(depth) = obj.get("max_dest_depth").and_then(serde_json::Value::as_u64) {
                let depth = usize::try_from(depth).unwrap_or(usize::MAX);
                options = options.with_max_dest_depth(depth);
            }
        }
    }
    options
}
