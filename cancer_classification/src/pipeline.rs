use crate::{
    error::{ClassificationError, InferenceError},
    model_service::ModelService,
    preprocess::{preprocess, ImageSource, NormalizedTensor},
    types::{ClassificationResult, Label, OutputVector},
};
use std::sync::Arc;

pub fn infer<M: ModelService + ?Sized>(
    model: &M,
    tensor: &NormalizedTensor,
) -> Result<OutputVector, InferenceError> {
    let values = model.run(tensor)?;
    tracing::debug!("Confidences: {:?}", values);
    OutputVector::from_slice(&values)
}

/// Class 1 wins only on a strict majority; ties go to class 0.
pub fn interpret(output: &OutputVector) -> ClassificationResult {
    let [non_cancer, cancer] = output.scores();
    let label = if cancer > non_cancer {
        Label::Cancer
    } else {
        Label::NonCancer
    };

    ClassificationResult {
        label,
        confidence: non_cancer.max(cancer),
    }
}

/// Preprocess, infer and interpret over a single shared model.
pub struct ClassificationPipeline<M: ModelService> {
    model: Arc<M>,
}

impl<M: ModelService> Clone for ClassificationPipeline<M> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
        }
    }
}

impl<M: ModelService> ClassificationPipeline<M> {
    pub fn new(model: M) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn classify(
        &self,
        source: &ImageSource,
    ) -> Result<ClassificationResult, ClassificationError> {
        let tensor = preprocess(source)?;
        let output = infer(self.model.as_ref(), &tensor)?;
        let result = interpret(&output);

        tracing::debug!(
            label = %result.label,
            confidence = result.confidence,
            "Classified image"
        );

        Ok(result)
    }
}
