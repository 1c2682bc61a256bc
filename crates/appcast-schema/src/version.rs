//! Permissive version parsing and ordering.
//!
//! Release artifacts are named by humans, so versions show up as `1.0`,
//! `2.0-beta1`, `3.2.1.0` or `1.0.0+build.7`. [`SemVerLike`] accepts all of
//! them and orders them with semver precedence where it applies, padding
//! short numeric cores with zeros.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::str::FromStr;

/// A numeric version core of 1-4 components plus an optional raw suffix.
///
/// Core components are kept as the digit strings that were found, so
/// arbitrarily wide numbers (`99999999999999999999999.1`) survive parsing
/// and still compare numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken {
    core: Vec<String>,
    suffix: Option<String>,
}

impl VersionToken {
    /// Maximum number of dot-separated numeric components in a core.
    pub const MAX_CORE_COMPONENTS: usize = 4;

    /// Parse the leading numeric core of `raw`; whatever follows the core is
    /// kept verbatim as the suffix.
    ///
    /// Returns `None` when `raw` does not start with a digit, so a token
    /// with an empty core cannot exist.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let bytes = raw.as_bytes();
        let mut core = Vec::new();
        let mut pos = 0;

        while core.len() < Self::MAX_CORE_COMPONENTS {
            let digits = bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
            if digits == 0 {
                break;
            }
            core.push(raw[pos..pos + digits].to_string());
            pos += digits;

            // Only a dot followed by another digit continues the core
            let rest = &bytes[pos..];
            if core.len() < Self::MAX_CORE_COMPONENTS
                && rest.len() > 1
                && rest[0] == b'.'
                && rest[1].is_ascii_digit()
            {
                pos += 1;
            } else {
                break;
            }
        }

        if core.is_empty() {
            return None;
        }

        let suffix = &raw[pos..];
        Some(Self {
            core,
            suffix: (!suffix.is_empty()).then(|| suffix.to_string()),
        })
    }

    /// The numeric components, in order.
    pub fn core(&self) -> &[String] {
        &self.core
    }

    /// Raw prerelease/build text following the core, including its leading
    /// `-` or `+`.
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// The dotted numeric core (`"1.2.3"`).
    pub fn core_text(&self) -> String {
        self.core.join(".")
    }
}

/// A semantic-version-like value used as a sort and dedup key.
///
/// Equality is textual (same core text, same suffix text); ordering follows
/// semver precedence with zero-padded cores. Values parsed from input
/// without a numeric core are *invalid* and sort below every valid version.
///
/// ```
/// use appcast_schema::SemVerLike;
///
/// let mut versions = vec![
///     SemVerLike::parse("2.0-alpha.1"),
///     SemVerLike::parse("2.0"),
///     SemVerLike::parse("2.0-beta1"),
/// ];
/// versions.sort_by(|a, b| b.cmp(a));
/// assert_eq!(versions[0].to_string(), "2.0");
/// assert_eq!(versions[1].to_string(), "2.0-beta1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemVerLike {
    version: String,
    all_suffixes: String,
}

impl SemVerLike {
    /// Parse any string. Never fails; see [`SemVerLike::is_valid`].
    pub fn parse(raw: &str) -> Self {
        match VersionToken::parse(raw) {
            Some(token) => Self {
                version: token.core_text(),
                all_suffixes: token.suffix.unwrap_or_default(),
            },
            None => Self {
                version: String::new(),
                all_suffixes: raw.trim().to_string(),
            },
        }
    }

    /// The dotted numeric core, empty for invalid input.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Prerelease and build markers, including their leading `-`/`+`.
    /// Holds the whole input when no numeric core was found.
    pub fn all_suffixes(&self) -> &str {
        &self.all_suffixes
    }

    /// Whether a numeric core was found.
    pub fn is_valid(&self) -> bool {
        !self.version.is_empty()
    }

    /// Prerelease identifiers without the leading `-` (`"beta.1"`).
    pub fn prerelease(&self) -> Option<&str> {
        let pre = self.all_suffixes.split('+').next().unwrap_or_default();
        let pre = pre.strip_prefix('-').unwrap_or(pre);
        (!pre.is_empty()).then_some(pre)
    }

    /// Build metadata after the first `+`.
    pub fn build(&self) -> Option<&str> {
        self.all_suffixes.split_once('+').map(|(_, build)| build)
    }

    /// Compare by release precedence only. Build metadata and the textual
    /// form of the core (`1.0` vs `1.0.0`) are ignored here.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        let core = cmp_cores(&self.version, &other.version);
        if core != Ordering::Equal {
            return core;
        }

        match (self.all_suffixes.is_empty(), other.all_suffixes.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match (self.prerelease(), other.prerelease()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => cmp_prerelease(a, b),
            },
        }
    }
}

impl Ord for SemVerLike {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => self.all_suffixes.cmp(&other.all_suffixes),
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => self
                .cmp_precedence(other)
                .then_with(|| self.version.cmp(&other.version))
                .then_with(|| self.all_suffixes.cmp(&other.all_suffixes)),
        }
    }
}

impl PartialOrd for SemVerLike {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for SemVerLike {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.version, self.all_suffixes)
    }
}

impl FromStr for SemVerLike {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for SemVerLike {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Compare two digit strings numerically without parsing them.
fn cmp_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Component-wise core comparison; missing components count as zero.
fn cmp_cores(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => {
                let ord = cmp_numeric(l.unwrap_or("0"), r.unwrap_or("0"));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn is_numeric_identifier(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

fn cmp_identifier(a: &str, b: &str) -> Ordering {
    match (is_numeric_identifier(a), is_numeric_identifier(b)) {
        (true, true) => cmp_numeric(a, b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

fn cmp_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = cmp_identifier(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
