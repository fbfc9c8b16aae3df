//! Link resolution options

use crate::fitz::error::Result;
use serde::{Deserialize, Serialize};

/// Maximum number of indirection hops followed when resolving a destination.
///
/// This is a heuristic bound, not a format limit: real documents rarely
/// chain more than two or three named destinations, and a small bound
/// stops reference cycles (`A -> B -> A`) without tracking visited nodes.
pub const MAX_DEST_DEPTH: usize = 10;

/// Upper bound on a configured [`LinkOptions::max_dest_depth`].
///
/// Resolution recurses once per hop, so the configured depth is capped.
pub const MAX_DEST_DEPTH_LIMIT: usize = 64;

/// Path conventions used when turning file specifications into URIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformProfile {
    /// Prefer the `Unix` key; paths are used verbatim
    #[serde(alias = "posix", alias = "unix")]
    Posix,
    /// Prefer the `DOS` key; `/C/dir/file` becomes `C:/dir/file`
    #[serde(alias = "windows", alias = "dos")]
    Windows,
}

impl PlatformProfile {
    /// Profile of the platform this program was built for
    pub fn host() -> Self {
        if cfg!(windows) {
            PlatformProfile::Windows
        } else {
            PlatformProfile::Posix
        }
    }

    /// Name of the platform-specific file specification key
    pub fn native_file_key(self) -> &'static str {
        match self {
            PlatformProfile::Posix => "Unix",
            PlatformProfile::Windows => "DOS",
        }
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::host()
    }
}

impl From<&str> for PlatformProfile {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("windows") || s.eq_ignore_ascii_case("dos") {
            PlatformProfile::Windows
        } else {
            PlatformProfile::Posix
        }
    }
}

/// Options for [`LinkResolver`](crate::pdf::link::LinkResolver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    pub platform: PlatformProfile,
    pub max_dest_depth: usize,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            platform: PlatformProfile::host(),
            max_dest_depth: MAX_DEST_DEPTH,
        }
    }
}

impl LinkOptions {
    /// Options for an explicit platform profile
    pub fn for_platform(platform: PlatformProfile) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    /// Parse options from a JSON settings document; missing fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        Ok(options.with_max_dest_depth(options.max_dest_depth))
    }

    /// Set the destination depth bound, capped at [`MAX_DEST_DEPTH_LIMIT`].
    pub fn with_max_dest_depth(mut self, depth: usize) -> Self {
        self.max_dest_depth = depth.min(MAX_DEST_DEPTH_LIMIT);
        self
    }

    /// The destination depth bound in effect
    pub fn dest_depth(&self) -> usize {
        self.max_dest_depth.min(MAX_DEST_DEPTH_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = LinkOptions::default();
        assert_eq!(opts.max_dest_depth, 10);
        assert_eq!(opts.platform, PlatformProfile::host());
    }

    #[test]
    fn test_from_json_partial() {
        let opts = LinkOptions::from_json(r#"{ "platform": "Windows" }"#).unwrap();
        assert_eq!(opts.platform, PlatformProfile::Windows);
        assert_eq!(opts.max_dest_depth, MAX_DEST_DEPTH);

        let opts = LinkOptions::from_json(r#"{ "platform": "unix", "max_dest_depth": 3 }"#).unwrap();
        assert_eq!(opts.platform, PlatformProfile::Posix);
        assert_eq!(opts.max_dest_depth, 3);
    }

    #[test]
    fn test_from_json_caps_depth() {
        let opts = LinkOptions::from_json(r#"{ "max_dest_depth": 100000000 }"#).unwrap();
        assert_eq!(opts.max_dest_depth, MAX_DEST_DEPTH_LIMIT);

        let mut opts = LinkOptions::default();
        opts.max_dest_depth = usize::MAX;
        assert_eq!(opts.dest_depth(), MAX_DEST_DEPTH_LIMIT);
        assert_eq!(LinkOptions::default().with_max_dest_depth(7).dest_depth(), 7);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(LinkOptions::from_json(r#"{ "platform": "Amiga" }"#).is_err());
        assert!(LinkOptions::from_json("[").is_err());
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!(PlatformProfile::from("WINDOWS"), PlatformProfile::Windows);
        assert_eq!(PlatformProfile::from("dos"), PlatformProfile::Windows);
        assert_eq!(PlatformProfile::from("linux"), PlatformProfile::Posix);
        assert_eq!(PlatformProfile::Windows.native_file_key(), "DOS");
        assert_eq!(PlatformProfile::Posix.native_file_key(), "Unix");
    }
}
