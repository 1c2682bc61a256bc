//! Heuristic version extraction from file names and paths.
//!
//! Used when a binary carries no authoritative version metadata. The
//! extractor looks at the file name and up to three parent folders, and
//! prefers a version at the end of a name (`My App 1.2.zip`) over one at the
//! start (`1.2 My App.zip`).

use regex::Regex;
use std::path::{MAIN_SEPARATOR, Path};
use std::sync::LazyLock;

/// Path segments examined, counting the file name itself.
pub const MAX_FOLDER_DEPTH: usize = 4;

/// Extensions stripped before looking for a version. Compound extensions
/// come before their last component.
pub const BUILTIN_EXTENSIONS: [&str; 13] = [
    ".tar.gz", ".tar", ".gz", ".zip", ".txt", ".exe", ".bin", ".msi", ".excel", ".mcdx", ".pdf",
    ".dll", ".ted",
];

// X.Y, X.Y.Z or X.Y.Z.W
static SIMPLE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+){1,3}$").expect("simple version regex"));

// https://semver.org grammar
static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)",
        r"(-((0|[1-9][0-9]*)|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)",
        r"(\.(0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*)?",
        r"(\+[0-9a-zA-Z-]+(\.[0-9a-zA-Z-]+)*)?$",
    ))
    .expect("semver regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Finds versions in file names.
///
/// Holds only configuration: a prefix to remove from every path (usually
/// the directory that was searched) and extra extensions to strip.
///
/// ```
/// use appcast_core::extract::VersionExtractor;
///
/// let extractor = VersionExtractor::new().with_extensions(["dmg"]);
/// assert_eq!(extractor.extract("MyApp 2.1.0-beta.3.dmg").as_deref(), Some("2.1.0-beta.3"));
/// assert_eq!(extractor.extract("MyApp.dmg"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VersionExtractor {
    prefix: String,
    extensions: Vec<String>,
}

impl VersionExtractor {
    /// An extractor with no prefix and only the built-in extensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the first occurrence of `prefix` from every path before
    /// searching, so folders above the search root are never considered.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Strip these extensions (with or without a leading dot) after the
    /// built-in ones.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().to_string())
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        self
    }

    /// Extract a version from a path.
    pub fn extract_path(&self, path: &Path) -> Option<String> {
        self.extract(&path.to_string_lossy())
    }

    /// Extract a version from a file name or path string.
    ///
    /// Returns `None` when no segment within [`MAX_FOLDER_DEPTH`] holds a
    /// version with at least a major and minor component.
    pub fn extract(&self, path: &str) -> Option<String> {
        if path.trim().is_empty() || path.ends_with('.') {
            return None;
        }

        let mut name = path.to_string();
        if !self.prefix.trim().is_empty() {
            name = name.replacen(self.prefix.as_str(), "", 1).trim().to_string();
        }

        let extensions = BUILTIN_EXTENSIONS
            .iter()
            .copied()
            .chain(self.extensions.iter().map(String::as_str));
        for ext in extensions {
            if let Some(stripped) = strip_suffix_ignore_case(&name, ext) {
                name = stripped.trim().to_string();
                break;
            }
        }

        let name = WHITESPACE.replace_all(&name, " ").replace('_', " ");

        name.split(MAIN_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .rev()
            .take(MAX_FOLDER_DEPTH)
            .find_map(version_in_segment)
    }
}

/// `s` without `suffix`, comparing ASCII case-insensitively.
fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(suffix.len())?;
    let tail = s.get(cut..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &s[..cut])
}

/// Extract a version from a file name or path using the default extractor.
pub fn version_from_name(path: &str) -> Option<String> {
    VersionExtractor::new().extract(path)
}

/// Whether `s` is a plain dotted version or a full semantic version.
pub fn is_valid_version(s: &str) -> bool {
    SIMPLE_VERSION.is_match(s) || SEMVER.is_match(s)
}

/// Check the first and last words of one path segment. The last word wins.
fn version_in_segment(segment: &str) -> Option<String> {
    let mut words = segment.split(' ');
    let left = words.next().unwrap_or_default();
    let right = words.last().unwrap_or(left);

    find_version(right, false).or_else(|| find_version(left, true))
}

fn find_version(word: &str, from_left: bool) -> Option<String> {
    if word.trim().is_empty() {
        return None;
    }

    let word = if from_left {
        trim_text_from_left(word)
    } else {
        trim_text_from_right(word)
    };

    if !word.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if is_valid_version(word) {
        return Some(word.to_string());
    }
    scan_segments(word)
}

/// End of the ASCII letter run starting at `start`.
fn letter_run_end(bytes: &[u8], start: usize) -> usize {
    start
        + bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_alphabetic())
            .count()
}

fn run_followed_by_digit(bytes: &[u8], start: usize) -> bool {
    bytes
        .get(letter_run_end(bytes, start))
        .is_some_and(u8::is_ascii_digit)
}

/// Keep the text before the first block of letters (`0.1foo` -> `0.1`).
///
/// With `+`/`-` present only a letter block that is not attached to a
/// separator and runs into a digit counts, so prerelease tags survive.
fn trim_text_from_left(word: &str) -> &str {
    let bytes = word.as_bytes();
    if !bytes.iter().any(u8::is_ascii_digit) {
        return "";
    }

    let cut = if bytes.iter().any(|&b| b == b'+' || b == b'-') {
        (0..bytes.len()).find(|&i| {
            bytes[i].is_ascii_alphabetic()
                && (i == 0 || !matches!(bytes[i - 1], b'+' | b'-'))
                && run_followed_by_digit(bytes, i)
        })
    } else {
        bytes.iter().position(u8::is_ascii_alphabetic)
    };

    cut.map_or(word, |i| &word[..i])
}

/// Drop everything up to the first block of letters that runs into a digit
/// (`appsetup2.10.1` -> `2.10.1`). Blocks glued to a letter, `+` or `-` are
/// part of a version tag and are left alone.
fn trim_text_from_right(word: &str) -> &str {
    let bytes = word.as_bytes();
    (0..bytes.len())
        .find(|&i| {
            bytes[i].is_ascii_alphabetic()
                && (i == 0
                    || !(bytes[i - 1].is_ascii_alphabetic() || matches!(bytes[i - 1], b'+' | b'-')))
                && run_followed_by_digit(bytes, i)
        })
        .map_or(word, |i| &word[letter_run_end(bytes, i)..])
}

/// For a dot segment mixing letters and digits, the text after the last
/// letter of its first letter-bearing `+`/`-` run (`8foo6` -> `6`,
/// `setup-2` -> `2`).
fn cut_text_prefix(segment: &str) -> Option<&str> {
    let bytes = segment.as_bytes();
    if !(bytes.iter().any(u8::is_ascii_alphabetic) && bytes.iter().any(u8::is_ascii_digit)) {
        return None;
    }

    let mut start = 0;
    for run in segment.split(['+', '-']) {
        if let Some(last_letter) = run.bytes().rposition(|b| b.is_ascii_alphabetic()) {
            let mut end = start + last_letter + 1;
            if matches!(bytes.get(end), Some(b'+' | b'-')) {
                end += 1;
            }
            return Some(&segment[end..]);
        }
        start += run.len() + 1;
    }
    None
}

/// Grow a tail of dot segments from the right, remembering the longest one
/// that is a valid version. Cutting text off a segment ends the scan.
fn scan_segments(word: &str) -> Option<String> {
    let mut tail = String::new();
    let mut found = None;

    for segment in word.split('.').rev() {
        let (segment, last) = match cut_text_prefix(segment) {
            Some(rest) => (rest, true),
            None => (segment, false),
        };

        tail = if tail.trim().is_empty() {
            segment.to_string()
        } else {
            format!("{segment}.{tail}")
        };
        tail = tail.trim_matches('.').to_string();

        if is_valid_version(&tail) {
            found = Some(tail.clone());
        }
        if last {
            break;
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(name: &str) -> Option<String> {
        version_from_name(name)
    }

    fn path(parts: &[&str]) -> String {
        parts.join(std::path::MAIN_SEPARATOR_STR)
    }

    #[test]
    fn blank_or_dot_terminated_input_has_no_version() {
        assert_eq!(v(""), None);
        assert_eq!(v("   "), None);
        assert_eq!(v("foo"), None);
        assert_eq!(v("foo1."), None);
        assert_eq!(v("1.0."), None);
    }

    #[test]
    fn needs_major_and_minor() {
        assert_eq!(v("hello 1.txt"), None);
        assert_eq!(v("hello 1.0.txt").as_deref(), Some("1.0"));
        assert_eq!(v("hello 1.0            .txt").as_deref(), Some("1.0"));
        assert_eq!(v("hello 1 .0.txt"), None);
    }

    #[test]
    fn strips_text_around_versions() {
        assert_eq!(v("hello a2.3.txt").as_deref(), Some("2.3"));
        assert_eq!(v("My Favorite App 4.3.2.zip").as_deref(), Some("4.3.2"));
        assert_eq!(v("foo1.0").as_deref(), Some("1.0"));
        assert_eq!(v("foo0.1").as_deref(), Some("0.1"));
        assert_eq!(v("foo 0.1").as_deref(), Some("0.1"));
        assert_eq!(v("foo_0.1").as_deref(), Some("0.1"));
        assert_eq!(v("0.1foo").as_deref(), Some("0.1"));
        assert_eq!(v("0.1 My App").as_deref(), Some("0.1"));
        assert_eq!(v("foo0.0.3.1").as_deref(), Some("0.0.3.1"));
        assert_eq!(v("foo1.2.4").as_deref(), Some("1.2.4"));
        assert_eq!(v("foo1.2.4.8").as_deref(), Some("1.2.4.8"));
    }

    #[test]
    fn rightmost_version_wins() {
        assert_eq!(v("1.0bar7.8foo 1.2.4.8").as_deref(), Some("1.2.4.8"));
        assert_eq!(v("1.0bar7.8foo6.3 2.0").as_deref(), Some("2.0"));
        assert_eq!(v("1.0bar7.8foo6.3.2.0").as_deref(), Some("6.3.2.0"));
    }

    #[test]
    fn caps_at_four_components() {
        assert_eq!(v("My Favorite App 4.3.2.1.0.zip").as_deref(), Some("3.2.1.0"));
    }

    #[test]
    fn strips_compound_extensions() {
        assert_eq!(v(".tar.gz"), None);
        assert_eq!(v("hello 1.0.tar.gz").as_deref(), Some("1.0"));
        assert_eq!(v("My Favorite App 4.3.2.tar.gz").as_deref(), Some("4.3.2"));
        assert_eq!(
            v("My Favorite Tools (Linux-x64) 0.0.0.tar.gz").as_deref(),
            Some("0.0.0")
        );
    }

    #[test]
    fn user_extensions_are_stripped() {
        let extractor = VersionExtractor::new().with_extensions(["dmg", ".AppImage", " "]);
        assert_eq!(extractor.extract("MyApp 1.2.3.dmg").as_deref(), Some("1.2.3"));
        assert_eq!(extractor.extract("MyApp-x86_64 2.0.AppImage").as_deref(), Some("2.0"));
        // Only one extension is removed
        assert_eq!(extractor.extract("MyApp 1.2.3.tar.dmg"), None);
    }

    #[test]
    fn extensions_match_any_case() {
        assert_eq!(v("App 1.0.ZIP").as_deref(), Some("1.0"));
        assert_eq!(v("Setup 2.0.Exe").as_deref(), Some("2.0"));
        assert_eq!(v("tool 3.1.TAR.GZ").as_deref(), Some("3.1"));
        let extractor = VersionExtractor::new().with_extensions(["dmg"]);
        assert_eq!(extractor.extract("MyApp 1.2.3.DMG").as_deref(), Some("1.2.3"));
    }

    #[test]
    fn accepts_semantic_versions() {
        let cases = [
            ("MyApp 3.0.0-beta1.exe", "3.0.0-beta1"),
            ("app 0.0.4.txt", "0.0.4"),
            ("app 10.20.30.txt", "10.20.30"),
            ("app 1.1.2-prerelease+meta.txt", "1.1.2-prerelease+meta"),
            ("app 1.1.2+meta.txt", "1.1.2+meta"),
            ("app 1.1.2+meta-valid.txt", "1.1.2+meta-valid"),
            ("app 1.0.0-alpha.txt", "1.0.0-alpha"),
            ("app 1.0.0-beta.txt", "1.0.0-beta"),
            ("app 1.0.0-alpha.beta.txt", "1.0.0-alpha.beta"),
            ("app 1.0.0-alpha.beta.1.txt", "1.0.0-alpha.beta.1"),
            ("app 1.0.0-alpha.1.txt", "1.0.0-alpha.1"),
            ("app 1.0.0-alpha0.valid.txt", "1.0.0-alpha0.valid"),
            ("app 1.0.0-alpha.0valid.txt", "1.0.0-alpha.0valid"),
            (
                "app 1.0.0-alpha-a.b-c-somethinglong+build.1-aef.1-its-okay.txt",
                "1.0.0-alpha-a.b-c-somethinglong+build.1-aef.1-its-okay",
            ),
            ("app 1.0.0-rc.1+build.1.txt", "1.0.0-rc.1+build.1"),
            ("app 2.0.0-rc.1+build.123.txt", "2.0.0-rc.1+build.123"),
            ("app 1.2.3-beta.txt", "1.2.3-beta"),
            ("app 10.2.3-DEV-SNAPSHOT.txt", "10.2.3-DEV-SNAPSHOT"),
            ("app 1.2.3-SNAPSHOT-123.txt", "1.2.3-SNAPSHOT-123"),
            ("app 1.0.0.txt", "1.0.0"),
            ("app 2.0.0+build.1848.txt", "2.0.0+build.1848"),
            ("app 2.0.1-alpha.1227.txt", "2.0.1-alpha.1227"),
            ("app 1.0.0-alpha+beta.txt", "1.0.0-alpha+beta"),
            (
                "app 1.2.3----RC-SNAPSHOT.12.9.1--.12+788.txt",
                "1.2.3----RC-SNAPSHOT.12.9.1--.12+788",
            ),
            ("app 1.2.3----R-S.12.9.1--.12+meta.txt", "1.2.3----R-S.12.9.1--.12+meta"),
            (
                "app 1.0.0+0.build.1-rc.10000aaa-kk-0.1.txt",
                "1.0.0+0.build.1-rc.10000aaa-kk-0.1",
            ),
            (
                "app 99999999999999999999999.999999999999999999.99999999999999999.txt",
                "99999999999999999999999.999999999999999999.99999999999999999",
            ),
            ("app 1.0.0-0A.is.legal.txt", "1.0.0-0A.is.legal"),
        ];
        for (name, expected) in cases {
            assert_eq!(v(name).as_deref(), Some(expected), "{name}");
        }
    }

    #[test]
    fn installer_name_variants() {
        assert_eq!(v("appsetup-2.10.1.exe").as_deref(), Some("2.10.1"));
        assert_eq!(v("appsetup_2.10.1.exe").as_deref(), Some("2.10.1"));
        assert_eq!(v("appsetup 2.10.1.exe").as_deref(), Some("2.10.1"));
        assert_eq!(v("appsetup2.10.1.exe").as_deref(), Some("2.10.1"));
    }

    #[test]
    fn rejects_malformed_versions() {
        let cases = [
            "app 1.2.3-0123.txt",
            "app 1.2.3-0123.0123.txt",
            "app 1.1.2+.123.txt",
            "app +invalid.txt",
            "app -invalid.txt",
            "app -invalid+invalid.txt",
            "app -invalid.01.txt",
            "app alpha.txt",
            "app alpha.beta.txt",
            "app alpha.beta.1.txt",
            "app alpha.1.txt",
            "app alpha+beta.txt",
            "app alpha_beta.txt",
            "app alpha..txt",
            "app beta.txt",
            "app 1.0.0-alpha_beta.txt",
            "app -alpha.txt",
            "app 1.0.0-alpha..txt",
            "app 1.0.0-alpha..1.txt",
            "app 1.0.0-alpha...1.txt",
            "app 1.0.0-alpha....1.txt",
            "app 1.2.3.DEV.txt",
            "app 1.2-SNAPSHOT.txt",
            "app 1.2.31.2.3----RC-SNAPSHOT.12.09.1--..12+788.txt",
            "app 1.2-RC-SNAPSHOT.txt",
            "app -1.0.3-gamma+b7718.txt",
            "app +justmeta.txt",
            "app 9.8.7+meta+meta.txt",
            "app 9.8.7-whatever+meta+meta.txt",
            "app 99999999999999999999999.999999999999999999.99999999999999999----RC-SNAPSHOT.12.09.1--------------------------------..12.txt",
        ];
        for name in cases {
            assert_eq!(v(name), None, "{name}");
        }
    }

    #[test]
    fn searches_parent_folders() {
        assert_eq!(v(&path(&["output", "2.0.4", "file.ext"])).as_deref(), Some("2.0.4"));
        assert_eq!(
            v(&path(&["myapp", "bin", "100.2.303", "myapp.zip"])).as_deref(),
            Some("100.2.303")
        );
        assert_eq!(
            v(&path(&["myapp", "1.4.3.1", "bin", "myapp.zip"])).as_deref(),
            Some("1.4.3.1")
        );
        assert_eq!(v(&path(&["foo 100.2.303", "myapp.zip"])).as_deref(), Some("100.2.303"));
        // Nearest folder wins
        assert_eq!(
            v(&path(&["myapp", "1.4", "3.1", "bin", "myapp.zip"])).as_deref(),
            Some("3.1")
        );
    }

    #[test]
    fn folder_search_is_bounded() {
        assert_eq!(
            v(&path(&["boo", "moo", "1.0", "dir", "dir", "myapp", "bin", "myapp.zip"])),
            None
        );
        assert_eq!(
            v(&path(&["boo", "moo", "3.0", "1.0", "dir", "myapp", "bin", "myapp.zip"])),
            None
        );
        assert_eq!(
            v(&path(&["boo", "moo", "3.0", "dir", "1.0", "myapp", "bin", "myapp.zip"])).as_deref(),
            Some("1.0")
        );
    }

    #[test]
    fn prefix_hides_search_root() {
        let file = path(&["output", "2.0.4", "file.ext"]);
        let with = |prefix: &str| VersionExtractor::new().with_prefix(prefix).extract(&file);
        assert_eq!(with("").as_deref(), Some("2.0.4"));
        assert_eq!(with(&format!("output{MAIN_SEPARATOR}")).as_deref(), Some("2.0.4"));

        let nested = path(&["output", "1.0", "foo", "2.0.4", "file.ext"]);
        let prefix = path(&["output", "1.0", "foo"]);
        assert_eq!(
            VersionExtractor::new().with_prefix(prefix).extract(&nested).as_deref(),
            Some("2.0.4")
        );

        let shallow = path(&["output", "1.0", "file.ext"]);
        assert_eq!(
            VersionExtractor::new()
                .with_prefix(path(&["output", "1.0"]))
                .extract(&shallow),
            None
        );
        assert_eq!(
            VersionExtractor::new().with_prefix(shallow.clone()).extract(&shallow),
            None
        );
    }

    #[test]
    fn extracts_from_path_values() {
        let p = Path::new("builds").join("foo 100.0.302").join("hello.tar.gz");
        assert_eq!(
            VersionExtractor::new().extract_path(&p).as_deref(),
            Some("100.0.302")
        );
    }

    #[test]
    fn validity_checks() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("1.2.3.4"));
        assert!(!is_valid_version("1"));
        assert!(!is_valid_version("1.2.3.4.5"));
        assert!(is_valid_version("1.2.3-rc.1+b.2"));
        assert!(!is_valid_version("01.2.3-rc"));
    }
}
