//! Release tag rules: shape validation, legacy normalization and bumping.
//!
//! A tag is either `MAJOR.MINOR.PATCH` (current) or `MAJOR.MINOR.PATCH.BUILD`
//! (legacy). Legacy tags are accepted on read and always reduced to the
//! current shape before any arithmetic.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::domain::version::{BuildType, Version};
use crate::error::{Result, TagkeeperError};

const CURRENT_PARTS: usize = 3;
const LEGACY_PARTS: usize = 4;

fn has_shape(tag: &str, parts: usize) -> bool {
    let pattern = format!(r"^[0-9]+(\.[0-9]+){{{}}}$", parts - 1);
    Regex::new(&pattern)
        .map(|re| re.is_match(tag))
        .unwrap_or(false)
}

/// True iff `tag` is exactly three dot-separated unsigned integers
pub fn is_valid(tag: &str) -> bool {
    has_shape(tag, CURRENT_PARTS)
}

/// True iff `tag` is exactly four dot-separated unsigned integers
pub fn is_valid_legacy(tag: &str) -> bool {
    has_shape(tag, LEGACY_PARTS)
}

/// True iff `tag` has either accepted shape
pub fn is_accepted(tag: &str) -> bool {
    is_valid(tag) || is_valid_legacy(tag)
}

/// Drop the BUILD component of a legacy tag; any other input is returned unchanged.
pub fn normalize(tag: &str) -> String {
    if is_valid_legacy(tag) {
        tag.splitn(LEGACY_PARTS, '.')
            .take(CURRENT_PARTS)
            .collect::<Vec<_>>()
            .join(".")
    } else {
        tag.to_string()
    }
}

/// Next staging tag (PATCH + 1), or `None` for empty or invalid input
pub fn bump_for_stage(tag: &str) -> Option<String> {
    bump(tag, BuildType::Stage)
}

/// Next production tag (MINOR + 1, PATCH = 0), or `None` for empty or invalid input
pub fn bump_for_prod(tag: &str) -> Option<String> {
    bump(tag, BuildType::Prod)
}

fn bump(tag: &str, build_type: BuildType) -> Option<String> {
    Tag::parse(tag)
        .ok()?
        .bump(build_type)
        .map(|next| next.to_string())
}

/// A validated release tag, always in the current three-part shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    name: String,
}

impl Tag {
    /// Parse a current or legacy tag, normalizing legacy input.
    pub fn parse(text: &str) -> Result<Self> {
        let normalized = normalize(text);
        if !is_valid(&normalized) {
            return Err(TagkeeperError::invalid_tag(text));
        }
        // Shape is valid but components may still exceed u32
        Version::parse(&normalized)?;
        Ok(Tag { name: normalized })
    }

    pub fn from_version(version: Version) -> Self {
        Tag {
            name: version.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Version {
        // Constructors guarantee a parseable three-part name
        Version::parse(&self.name).unwrap_or(Version::new(0, 0, 0))
    }

    /// The tag that follows this one for the given release class
    pub fn bump(&self, build_type: BuildType) -> Option<Tag> {
        self.version().bump(build_type).map(Tag::from_version)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Tag {
    type Err = TagkeeperError;

    fn from_str(s: &str) -> Result<Self> {
        Tag::parse(s)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid() {
        assert!(is_valid("1.2.3"));
        assert!(is_valid("0.0.0"));
        assert!(is_valid("10.20.300"));
        assert!(!is_valid("1.2"));
        assert!(!is_valid("1.2.3.4"));
        assert!(!is_valid("v1.2.3"));
        assert!(!is_valid("+1.2.3"));
        assert!(!is_valid(" 1.2.3"));
        assert!(!is_valid("1.2.3\n"));
        assert!(!is_valid("1.2.-3"));
        assert!(!is_valid(""));
        assert!(!is_valid("not-a-tag"));
    }

    #[test]
    fn test_is_valid_rejects_non_ascii_digits() {
        // Arabic-Indic digits are Unicode decimal digits but not tag components
        assert!(!is_valid("\u{0661}.2.3"));
    }

    #[test]
    fn test_is_valid_legacy() {
        assert!(is_valid_legacy("1.2.3.4"));
        assert!(!is_valid_legacy("1.2.3"));
        assert!(!is_valid_legacy("1.2.3.4.5"));
        assert!(!is_valid_legacy("1.2.3.x"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("1.2.3.9"), "1.2.3");
        assert_eq!(normalize("1.2.3"), "1.2.3");
        assert_eq!(normalize("garbage"), "garbage");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_legacy_always_yields_current() {
        for legacy in ["0.0.0.0", "1.2.3.4", "99.0.12.7", "4.5.6.000"] {
            assert!(is_valid_legacy(legacy));
            assert!(is_valid(&normalize(legacy)), "{}", legacy);
        }
    }

    #[test]
    fn test_bump_for_stage() {
        assert_eq!(bump_for_stage("1.2.3").as_deref(), Some("1.2.4"));
        assert_eq!(bump_for_stage("1.2.3.9").as_deref(), Some("1.2.4"));
    }

    #[test]
    fn test_bump_for_prod() {
        assert_eq!(bump_for_prod("1.2.3").as_deref(), Some("1.3.0"));
        assert_eq!(bump_for_prod("0.0.0").as_deref(), Some("0.1.0"));
        assert_eq!(bump_for_prod("2.5.2.17").as_deref(), Some("2.6.0"));
    }

    #[test]
    fn test_bump_invalid_input_is_empty() {
        assert_eq!(bump_for_stage("not-a-tag"), None);
        assert_eq!(bump_for_stage(""), None);
        assert_eq!(bump_for_prod("1.2"), None);
    }

    #[test]
    fn test_tag_parse_normalizes_legacy() {
        let tag = Tag::parse("3.1.4.1").unwrap();
        assert_eq!(tag.as_str(), "3.1.4");
        assert_eq!(tag.version(), Version::new(3, 1, 4));
    }

    #[test]
    fn test_tag_parse_rejects_out_of_range_components() {
        assert!(is_valid("1.2.4294967296"));
        assert!(Tag::parse("1.2.4294967296").is_err());
    }

    #[test]
    fn test_tag_bump() {
        let tag: Tag = "2.5.1".parse().unwrap();
        assert_eq!(tag.bump(BuildType::Stage).unwrap().as_str(), "2.5.2");
        assert_eq!(tag.bump(BuildType::Prod).unwrap().as_str(), "2.6.0");
    }
}
