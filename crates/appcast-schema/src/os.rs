//! Operating-system tags carried by manifest items.
//!
//! Tags are free text in manifest files (`windows`, `macos`, `linux-x64`),
//! so recognition is by keyword containment rather than exact match.

/// Operating systems an update item can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    /// Microsoft Windows
    Windows,
    /// `macOS` (`mac`, `macos`)
    Mac,
    /// Linux distributions
    Linux,
}

impl OperatingSystem {
    /// Keywords accepted in an operating-system tag.
    pub const KEYWORDS: [&'static str; 3] = ["windows", "mac", "linux"];

    /// Recognize a free-text tag by keyword containment, ignoring case.
    ///
    /// ```
    /// use appcast_schema::OperatingSystem;
    ///
    /// assert_eq!(OperatingSystem::from_tag("macOS"), Some(OperatingSystem::Mac));
    /// assert_eq!(OperatingSystem::from_tag("beos"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        let t = tag.trim().to_lowercase();
        if t.contains("windows") {
            Some(Self::Windows)
        } else if t.contains("mac") {
            Some(Self::Mac)
        } else if t.contains("linux") {
            Some(Self::Linux)
        } else {
            None
        }
    }

    /// Canonical tag written for this operating system.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Linux => "linux",
        }
    }
}

impl std::fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OperatingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| {
            format!(
                "Unknown operating system: {s} (expected one of: {})",
                Self::KEYWORDS.join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_tags() {
        assert_eq!(OperatingSystem::from_tag("windows"), Some(OperatingSystem::Windows));
        assert_eq!(OperatingSystem::from_tag("macos"), Some(OperatingSystem::Mac));
        assert_eq!(OperatingSystem::from_tag("Linux-x64"), Some(OperatingSystem::Linux));
        assert_eq!(OperatingSystem::from_tag(""), None);
    }

    #[test]
    fn from_str_reports_valid_options() {
        let err = "solaris".parse::<OperatingSystem>().unwrap_err();
        assert!(err.contains("windows, mac, linux"));
    }

    #[test]
    fn canonical_tags_round_trip() {
        for os in [OperatingSystem::Windows, OperatingSystem::Mac, OperatingSystem::Linux] {
            assert_eq!(OperatingSystem::from_tag(os.as_str()), Some(os));
            assert_eq!(os.to_string(), os.as_str());
        }
    }
}
