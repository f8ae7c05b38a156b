//! Mapping raw output vectors to labelled results

use serde::Serialize;

use crate::error::{ClassifierError, Result};
use crate::labels::LabelSet;

/// One class with its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedClass {
    pub index: usize,
    pub label: String,
    pub confidence: f32,
}

/// Index and value of the largest score. Ties resolve to the lowest index;
/// NaN scores never win.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best
}

/// Pick the top class from a (batch-flattened) output vector.
///
/// The score is used as-is for the confidence; the model's final layer is
/// expected to be normalized already.
pub fn top_class(output: &[f32], labels: &LabelSet) -> Result<RankedClass> {
    let (index, confidence) = argmax(output).ok_or_else(|| {
        ClassifierError::Inference(format!(
            "model output has no usable scores ({} values)",
            output.len()
        ))
    })?;

    Ok(RankedClass {
        index,
        label: labels.get(index).to_string(),
        confidence,
    })
}

/// The `k` best classes, highest score first
pub fn ranked(output: &[f32], labels: &LabelSet, k: usize) -> Vec<RankedClass> {
    let mut indexed: Vec<(usize, f32)> = output
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| !s.is_nan())
        .collect();
    // stable sort keeps lower indices first among equal scores
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));

    indexed
        .into_iter()
        .take(k)
        .map(|(index, confidence)| RankedClass {
            index,
            label: labels.get(index).to_string(),
            confidence,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::UNKNOWN_LABEL;

    #[test]
    fn test_argmax_first_occurrence_wins() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.1]), Some((1, 0.7)));
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.1]), Some((1, 0.2)));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_top_class_maps_label() {
        let labels = LabelSet::default();
        let top = top_class(&[0.05, 0.9, 0.03, 0.02], &labels).unwrap();
        assert_eq!(top.index, 1);
        assert_eq!(top.label, "fire-burn");
        assert_eq!(top.confidence, 0.9);
    }

    #[test]
    fn test_index_beyond_labels_is_unknown() {
        let labels = LabelSet::default();
        let top = top_class(&[0.1, 0.1, 0.1, 0.1, 0.6], &labels).unwrap();
        assert_eq!(top.index, 4);
        assert_eq!(top.label, UNKNOWN_LABEL);
    }

    #[test]
    fn test_empty_output_is_inference_error() {
        let err = top_class(&[], &LabelSet::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
    }

    #[test]
    fn test_ranked_order() {
        let labels = LabelSet::default();
        let top = ranked(&[0.2, 0.5, 0.2, 0.1], &labels, 3);
        let names: Vec<&str> = top.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(names, vec!["fire-burn", "blood-loss", "normal-faint"]);
    }
}
