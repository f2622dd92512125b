/// Detects failures that git reports in text while still exiting 0
/// (signing failures, hook output written to stdout).
///
/// Used in addition to the exit code, never instead of it.
pub trait OutputClassifier: Send + Sync {
    fn has_failure_marker(&self, lines: &[&str]) -> bool;
}

/// Case-insensitive substring match against a list of markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClassifier {
    markers: Vec<String>,
}

impl MarkerClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MarkerClassifier {
            markers: markers
                .into_iter()
                .map(|marker| marker.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        MarkerClassifier::new(["error", "fatal"])
    }
}

impl OutputClassifier for MarkerClassifier {
    fn has_failure_marker(&self, lines: &[&str]) -> bool {
        lines.iter().any(|line| {
            let lowered = line.to_lowercase();
            self.markers.iter().any(|marker| lowered.contains(marker))
        })
    }
}
