//! Classification adapter: reduce a classifier's probability list to the
//! single best detection of a frame

use super::frame::Frame;
use crate::quiz::Detection;
use thiserror::Error;

/// Classifier failures
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid model metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("invalid model weights: {0}")]
    Weights(String),
    #[error("frame is {got_w}x{got_h}, model expects {want}x{want}")]
    FrameShape {
        got_w: usize,
        got_h: usize,
        want: usize,
    },
    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),
    #[error("classifier returned no predictions")]
    Empty,
}

/// One class probability as reported by the classifier
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub class_name: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(class_name: impl Into<String>, probability: f32) -> Self {
        Prediction {
            class_name: class_name.into(),
            probability,
        }
    }
}

/// Black-box image classifier. The returned list covers every class in
/// no particular order.
pub trait Classifier {
    fn predict(&mut self, frame: &Frame) -> Result<Vec<Prediction>, ClassifierError>;

    /// Class names the classifier can report
    fn class_names(&self) -> Vec<String>;
}

/// Highest-probability prediction; ties keep the first one seen
pub fn best_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    let mut iter = predictions.iter();
    let mut best = iter.next()?;
    for p in iter {
        if p.probability > best.probability {
            best = p;
        }
    }
    Some(best)
}

/// Classify a frame into its single best detection
pub fn classify<C: Classifier + ?Sized>(
    classifier: &mut C,
    frame: &Frame,
) -> Result<Detection, ClassifierError> {
    let predictions = classifier.predict(frame)?;
    let best = best_prediction(&predictions).ok_or(ClassifierError::Empty)?;
    Ok(Detection::new(best.class_name.as_str(), best.probability))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Prediction>);

    impl Classifier for Fixed {
        fn predict(&mut self, _frame: &Frame) -> Result<Vec<Prediction>, ClassifierError> {
            Ok(self.0.clone())
        }

        fn class_names(&self) -> Vec<String> {
            self.0.iter().map(|p| p.class_name.clone()).collect()
        }
    }

    #[test]
    fn test_argmax_over_unsorted_output() {
        let mut classifier = Fixed(vec![
            Prediction::new("1-2", 0.1),
            Prediction::new("13-14", 0.7),
            Prediction::new("7-8", 0.2),
        ]);
        let detection = classify(&mut classifier, &Frame::filled(1, 1, [0, 0, 0])).unwrap();
        assert_eq!(detection, Detection::new("13-14", 0.7));
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let predictions = vec![
            Prediction::new("9-10", 0.5),
            Prediction::new("11-12", 0.5),
        ];
        assert_eq!(best_prediction(&predictions).unwrap().class_name, "9-10");
    }

    #[test]
    fn test_empty_prediction_list_is_an_error() {
        let mut classifier = Fixed(vec![]);
        let result = classify(&mut classifier, &Frame::filled(1, 1, [0, 0, 0]));
        assert!(matches!(result, Err(ClassifierError::Empty)));
    }
}
