//! Inference configuration

use image::imageops::FilterType;

use crate::labels::LabelSet;

/// Configuration for the classification pipeline
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Class names, index-aligned with the model output
    pub labels: LabelSet,

    /// Interpolation used when resizing to the model input size
    pub resize_filter: FilterType,

    /// Maximum number of inference calls running at the same time
    pub max_concurrent: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            labels: LabelSet::default(),
            resize_filter: FilterType::Triangle,
            max_concurrent: 1,
        }
    }
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the label set
    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = labels;
        self
    }

    /// Builder method to set the resize interpolation
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Builder method to set the concurrency limit (at least 1)
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.labels.len(), 4);
        assert_eq!(config.max_concurrent, 1);
        assert_eq!(config.resize_filter, FilterType::Triangle);
    }

    #[test]
    fn test_builder_pattern() {
        let config = InferenceConfig::new()
            .with_labels(LabelSet::parse("a,b").unwrap())
            .with_filter(FilterType::Nearest)
            .with_max_concurrent(0);

        assert_eq!(config.labels.len(), 2);
        assert_eq!(config.resize_filter, FilterType::Nearest);
        assert_eq!(config.max_concurrent, 1);
    }
}
