use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TagkeeperError};

/// Numeric `MAJOR.MINOR.PATCH` triple behind a release tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a three-part version (e.g., "1.2.3" -> Version(1,2,3)).
    ///
    /// Components must be plain ASCII digits; signs, whitespace and
    /// prefixes such as `v` are rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 3 {
            return Err(TagkeeperError::invalid_tag(text));
        }

        let major = parse_component(parts[0]).ok_or_else(|| TagkeeperError::invalid_tag(text))?;
        let minor = parse_component(parts[1]).ok_or_else(|| TagkeeperError::invalid_tag(text))?;
        let patch = parse_component(parts[2]).ok_or_else(|| TagkeeperError::invalid_tag(text))?;

        Ok(Version {
            major,
            minor,
            patch,
        })
    }

    /// Bump version according to the release class.
    ///
    /// Returns `None` if the bumped component would overflow.
    pub fn bump(&self, build_type: BuildType) -> Option<Self> {
        match build_type {
            BuildType::Stage => Some(Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1)?,
            }),
            BuildType::Prod => Some(Version {
                major: self.major,
                minor: self.minor.checked_add(1)?,
                patch: 0,
            }),
        }
    }
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse::<u32>().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = TagkeeperError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Release class selecting which component of a tag is bumped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildType {
    /// Staging build: PATCH += 1
    Stage,
    /// Production build: MINOR += 1, PATCH = 0
    Prod,
}

impl BuildType {
    pub fn name(&self) -> &'static str {
        match self {
            BuildType::Stage => "STAGE",
            BuildType::Prod => "PROD",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildType {
    type Err = TagkeeperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stage" => Ok(BuildType::Stage),
            "prod" => Ok(BuildType::Prod),
            _ => Err(TagkeeperError::config(format!(
                "Unknown build type '{}' - expected STAGE or PROD",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_parse_rejects_prefix_and_signs() {
        assert!(Version::parse("v1.2.3").is_err());
        assert!(Version::parse("+1.2.3").is_err());
        assert!(Version::parse("1.+2.3").is_err());
        assert!(Version::parse(" 1.2.3").is_err());
        assert!(Version::parse("1.2.3 ").is_err());
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("1..3").is_err());
        assert!(Version::parse("").is_err());
        assert!(Version::parse("1.2.99999999999").is_err());
    }

    #[test]
    fn test_version_bump_stage() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(BuildType::Stage), Some(Version::new(1, 2, 4)));
    }

    #[test]
    fn test_version_bump_prod() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(BuildType::Prod), Some(Version::new(1, 3, 0)));
        assert_eq!(
            Version::new(0, 0, 0).bump(BuildType::Prod),
            Some(Version::new(0, 1, 0))
        );
    }

    #[test]
    fn test_version_bump_overflow() {
        assert_eq!(Version::new(1, 2, u32::MAX).bump(BuildType::Stage), None);
        assert_eq!(Version::new(1, u32::MAX, 0).bump(BuildType::Prod), None);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_build_type_from_str() {
        assert_eq!("stage".parse::<BuildType>().unwrap(), BuildType::Stage);
        assert_eq!("PROD".parse::<BuildType>().unwrap(), BuildType::Prod);
        assert!("release".parse::<BuildType>().is_err());
        assert_eq!(BuildType::Prod.to_string(), "PROD");
    }
}
