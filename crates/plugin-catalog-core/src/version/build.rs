//! Build numbers and compatibility windows
//!
//! Build numbers are dot-separated integers ("212.5712.43"). A `*` segment is
//! a wildcard that sorts as newest within its position.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, Result};

/// Value substituted for a `*` wildcard
pub const SNAPSHOT_VALUE: i64 = 99999;

/// Parsed build number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildNumber {
    segments: Vec<i64>,
}

impl BuildNumber {
    pub fn segments(&self) -> &[i64] {
        &self.segments
    }

    /// Signed comparison against `other`.
    ///
    /// Positive when `self` is newer, negative when older, zero when equal.
    /// Only the sign is meaningful; the magnitude is the first differing
    /// segment delta or the segment count delta.
    pub fn compare(&self, other: &Self) -> i64 {
        for (&a, &b) in self.segments.iter().zip(&other.segments) {
            match (a == SNAPSHOT_VALUE, b == SNAPSHOT_VALUE) {
                (true, true) => continue,
                (true, false) => return 1,
                (false, true) => return -1,
                (false, false) => {
                    let diff = a.saturating_sub(b);
                    if diff != 0 {
                        return diff;
                    }
                }
            }
        }

        self.segments.len() as i64 - other.segments.len() as i64
    }
}

impl FromStr for BuildNumber {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self> {
        let substituted = raw.replace('*', &SNAPSHOT_VALUE.to_string());
        let segments = substituted
            .split('.')
            .map(|segment| {
                segment
                    .parse::<i64>()
                    .map_err(|_| CatalogError::BuildParse {
                        build: raw.to_string(),
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| {
                if *s == SNAPSHOT_VALUE {
                    "*".to_string()
                } else {
                    s.to_string()
                }
            })
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

impl PartialOrd for BuildNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BuildNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other).cmp(&0)
    }
}

/// Compare two build number strings.
///
/// Negative when `a` is older than `b`, positive when newer, zero when equal.
pub fn is_build_older(a: &str, b: &str) -> Result<i64> {
    let a: BuildNumber = a.parse()?;
    let b: BuildNumber = b.parse()?;
    Ok(a.compare(&b))
}

/// A plugin's declared `(since, until)` range. Both bounds are exclusive and
/// optional; empty strings count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompatibilityWindow<'a> {
    pub since: Option<&'a str>,
    pub until: Option<&'a str>,
}

impl<'a> CompatibilityWindow<'a> {
    pub fn new(since: Option<&'a str>, until: Option<&'a str>) -> Self {
        Self {
            since: since.filter(|s| !s.is_empty()),
            until: until.filter(|s| !s.is_empty()),
        }
    }

    /// Whether `build` lies strictly inside the window
    pub fn admits(&self, build: &str) -> Result<bool> {
        if let Some(since) = self.since {
            if is_build_older(since, build)? >= 0 {
                return Ok(false);
            }
        }

        if let Some(until) = self.until {
            if is_build_older(until, build)? <= 0 {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Whether `build` is strictly newer than `since` and strictly older than `until`
pub fn is_compatible(build: &str, since: Option<&str>, until: Option<&str>) -> Result<bool> {
    CompatibilityWindow::new(since, until).admits(build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_number() {
        let build: BuildNumber = "212.5712.43".parse().unwrap();
        assert_eq!(build.segments(), &[212, 5712, 43]);
        assert_eq!(build.to_string(), "212.5712.43");
    }

    #[test]
    fn test_parse_wildcard() {
        let build: BuildNumber = "213.*".parse().unwrap();
        assert_eq!(build.segments(), &[213, SNAPSHOT_VALUE]);
        assert_eq!(build.to_string(), "213.*");
    }

    #[test]
    fn test_parse_error() {
        let err = "212.abc".parse::<BuildNumber>().unwrap_err();
        match err {
            CatalogError::BuildParse { build, segment } => {
                assert_eq!(build, "212.abc");
                assert_eq!(segment, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!("".parse::<BuildNumber>().is_err());
        assert!("1..2".parse::<BuildNumber>().is_err());
    }

    #[test]
    fn test_is_build_older_equal() {
        for build in ["1", "1.2.3", "213.*", "*"] {
            assert_eq!(is_build_older(build, build).unwrap(), 0);
        }
    }

    #[test]
    fn test_is_build_older_ordering() {
        assert!(is_build_older("1.2.3", "1.2.4").unwrap() < 0);
        assert!(is_build_older("1.2.4", "1.2.3").unwrap() > 0);
        assert!(is_build_older("2", "10").unwrap() < 0);
    }

    #[test]
    fn test_is_build_older_keeps_magnitude() {
        assert_eq!(is_build_older("1.2.10", "1.2.3").unwrap(), 7);
        assert_eq!(is_build_older("1.2", "1.2.0.0").unwrap(), -2);
    }

    #[test]
    fn test_wildcard_is_newest() {
        assert!(is_build_older("1.*", "1.5").unwrap() > 0);
        assert!(is_build_older("1.5", "1.*").unwrap() < 0);
        assert!(is_build_older("*", "999").unwrap() > 0);
    }

    #[test]
    fn test_wildcard_tie_continues() {
        assert!(is_build_older("*.1", "*.2").unwrap() < 0);
        assert!(is_build_older("1.*.3", "1.*.2").unwrap() > 0);
        assert!(is_build_older("1.*", "1.*.1").unwrap() < 0);
    }

    #[test]
    fn test_trailing_segments_count() {
        assert!(is_build_older("1.2.0", "1.2").unwrap() > 0);
        assert!(is_build_older("1.2", "1.2.5").unwrap() < 0);
    }

    #[test]
    fn test_build_number_ord() {
        let mut builds: Vec<BuildNumber> = ["213.*", "212.10", "212.9", "212.10.1"]
            .iter()
            .map(|b| b.parse().unwrap())
            .collect();
        builds.sort();
        let sorted: Vec<String> = builds.iter().map(|b| b.to_string()).collect();
        assert_eq!(sorted, vec!["212.9", "212.10", "212.10.1", "213.*"]);
    }

    fn admits(build: &str, since: &str, until: &str) -> bool {
        is_compatible(build, Some(since), Some(until)).unwrap()
    }

    #[test]
    fn test_is_compatible_window() {
        assert!(admits("212.500", "212.0", "213.0"));
        assert!(!admits("213.0", "212.0", "213.0"));
        assert!(!admits("212.0", "212.0", "213.0"));
    }

    #[test]
    fn test_is_compatible_open_bounds() {
        assert!(is_compatible("100", None, Some("200")).unwrap());
        assert!(!is_compatible("250", None, Some("200")).unwrap());
        assert!(is_compatible("250", Some("200"), None).unwrap());
        assert!(is_compatible("1", None, None).unwrap());
    }

    #[test]
    fn test_is_compatible_empty_bounds_are_open() {
        assert!(is_compatible("212.1", Some(""), Some("")).unwrap());
    }

    #[test]
    fn test_is_compatible_wildcard_until() {
        assert!(admits("213.7172.25", "211.0", "213.*"));
        assert!(!admits("214.1", "211.0", "213.*"));
    }

    #[test]
    fn test_is_compatible_parse_error() {
        assert!(is_compatible("212.1", Some("not-a-build"), None).is_err());
        assert!(is_compatible("bogus", None, Some("213.0")).is_err());
    }
}
