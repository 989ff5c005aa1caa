use crate::Label;

/// Predicted and true labels cannot be compared.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScoreError {
    #[display("{predicted} predictions for {truth} true labels")]
    LengthMismatch { predicted: usize, truth: usize },
    #[display("no labels to score")]
    Empty,
}

/// Misclassification rate: `1 - matches / len`.
///
/// # Examples
///
/// ```
/// use misspec_core::{Label, score::error_rate};
///
/// let truth = [Label::Zero, Label::One, Label::One, Label::Zero];
/// let predicted = [Label::Zero, Label::One, Label::Zero, Label::Zero];
/// assert_eq!(error_rate(&predicted, &truth).unwrap(), 0.25);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn error_rate(predicted: &[Label], truth: &[Label]) -> Result<f64, ScoreError> {
    if predicted.len() != truth.len() {
        return Err(ScoreError::LengthMismatch {
            predicted: predicted.len(),
            truth: truth.len(),
        });
    }
    if truth.is_empty() {
        return Err(ScoreError::Empty);
    }
    let matches = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    Ok(1.0 - matches as f64 / truth.len() as f64)
}
