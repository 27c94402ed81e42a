use {
    crate::error::{InferError, Result},
    serde::{Deserialize, Serialize},
};

/// Class index treated as positive for multi-score classifiers. Index 0 is
/// negative; any other index also counts as negative.
pub const POSITIVE_CLASS_INDEX: usize = 1;

/// A single sigmoid score above this is positive.
pub const SIGMOID_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Score index gradients are attributed to; always 0 for sigmoid outputs.
    pub class_index: usize,
    pub label: Label,
    pub confidence: f32,
}

/// Turns a score vector into a decision.
///
/// One score is read as the sigmoid probability of the positive class.
/// Several scores are read as per-class probabilities; the first maximal
/// score wins.
pub fn interpret(scores: &[f32]) -> Result<Decision> {
    if let Some(score) = scores.iter().find(|score| !score.is_finite()) {
        return Err(InferError::Shape(format!(
            "classifier returned non-finite score {score}"
        )));
    }
    match scores {
        [] => Err(InferError::Shape("classifier returned no scores".to_string())),
        [score] => {
            let positive = *score > SIGMOID_THRESHOLD;
            Ok(Decision {
                class_index: 0,
                label: if positive { Label::Positive } else { Label::Negative },
                confidence: if positive { *score } else { 1.0 - *score },
            })
        }
        _ => {
            let mut class_index = 0;
            for (index, &score) in scores.iter().enumerate().skip(1) {
                if score > scores[class_index] {
                    class_index = index;
                }
            }
            Ok(Decision {
                class_index,
                label: if class_index == POSITIVE_CLASS_INDEX {
                    Label::Positive
                } else {
                    Label::Negative
                },
                confidence: scores[class_index],
            })
        }
    }
}
