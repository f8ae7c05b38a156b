//! Label set mapping model output positions to class names

use serde::Serialize;

use crate::error::{ClassifierError, Result};

/// Classes the bundled emergency model was trained on, in output order
pub const DEFAULT_LABELS: [&str; 4] = ["blood-loss", "fire-burn", "normal-faint", "poison"];

/// Label returned when the predicted index has no entry in the set
pub const UNKNOWN_LABEL: &str = "unknown";

/// Ordered class names, index-aligned with the model's output vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(ClassifierError::Config("label set must not be empty".to_string()));
        }
        if let Some(blank) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(ClassifierError::Config(format!("label {} is blank", blank)));
        }
        Ok(Self { labels })
    }

    /// Parse a comma-separated list such as `"blood-loss,fire-burn"`
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(',').map(str::trim))
    }

    /// Label for an output index, `"unknown"` when out of range
    pub fn get(&self, index: usize) -> &str {
        self.labels
            .get(index)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels_in_output_order() {
        let labels = LabelSet::default();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels.get(0), "blood-loss");
        assert_eq!(labels.get(3), "poison");
    }

    #[test]
    fn test_out_of_range_is_unknown() {
        let labels = LabelSet::default();
        assert_eq!(labels.get(4), UNKNOWN_LABEL);
        assert_eq!(labels.get(usize::MAX), UNKNOWN_LABEL);
    }

    #[test]
    fn test_parse_trims_entries() {
        let labels = LabelSet::parse(" cat , dog ").unwrap();
        assert_eq!(labels.iter().collect::<Vec<_>>(), vec!["cat", "dog"]);
    }

    #[test]
    fn test_rejects_blank_labels() {
        assert!(LabelSet::parse("cat,,dog").is_err());
        assert!(LabelSet::new(Vec::<String>::new()).is_err());
    }
}
