use std::fmt;

use crate::error::TagkeeperError;

/// Non-fatal conditions at the edges of the tag lifecycle that should be
/// reported to the user alongside the main result.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Repository has no tag yet, so no next tag can be derived
    NoCurrentTag,
    /// Current tag exists but is not a release tag
    UnparsableTag { tag: String },
    /// A four-part tag was reduced to three parts
    LegacyTagNormalized { from: String, to: String },
    /// Local tag state changed but the remote was not updated
    PartialTagState { tag: String, remote: String },
}

impl BoundaryWarning {
    /// Warning implied by an operation error, if any
    pub fn from_error(err: &TagkeeperError, remote: &str) -> Option<Self> {
        match err {
            TagkeeperError::PartialTagState { tag, .. } => Some(BoundaryWarning::PartialTagState {
                tag: tag.clone(),
                remote: remote.to_string(),
            }),
            _ => None,
        }
    }

    /// Warning for the current tag when no next tag could be computed
    pub fn for_missing_next(current: Option<&str>) -> Self {
        match current {
            Some(tag) => BoundaryWarning::UnparsableTag {
                tag: tag.to_string(),
            },
            None => BoundaryWarning::NoCurrentTag,
        }
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoCurrentTag => {
                write!(f, "Repository has no tag yet; set the first tag explicitly")
            }
            BoundaryWarning::UnparsableTag { tag } => {
                write!(f, "Current tag '{}' is not a MAJOR.MINOR.PATCH release tag", tag)
            }
            BoundaryWarning::LegacyTagNormalized { from, to } => {
                write!(f, "Legacy tag '{}' normalized to '{}'", from, to)
            }
            BoundaryWarning::PartialTagState { tag, remote } => {
                write!(
                    f,
                    "Tag '{}' was changed locally but not on '{}'; local and remote now differ",
                    tag, remote
                )
            }
        }
    }
}
