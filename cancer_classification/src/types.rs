use crate::error::InferenceError;
use serde::Serialize;
use std::fmt;

/// The two class scores produced by the model: `[non_cancer, cancer]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputVector([f32; 2]);

impl OutputVector {
    pub const LEN: usize = 2;

    pub fn new(class_0: f32, class_1: f32) -> Self {
        Self([class_0, class_1])
    }

    /// Rejects anything but two finite scores.
    pub fn from_slice(values: &[f32]) -> Result<Self, InferenceError> {
        match values {
            [class_0, class_1] if class_0.is_finite() && class_1.is_finite() => {
                Ok(Self::new(*class_0, *class_1))
            }
            [class_0, class_1] => Err(InferenceError::NonFiniteOutput([*class_0, *class_1])),
            _ => Err(InferenceError::UnexpectedOutputShape {
                expected: Self::LEN,
                actual: values.len(),
            }),
        }
    }

    pub fn scores(&self) -> [f32; 2] {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    #[serde(rename = "Cancer")]
    Cancer,
    #[serde(rename = "Non-Cancer")]
    NonCancer,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cancer => "Cancer",
            Label::NonCancer => "Non-Cancer",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn confidence_percent(&self) -> f32 {
        self.confidence * 100.0
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Result: {}, Confidence: {:.2}%",
            self.label,
            self.confidence_percent()
        )
    }
}
