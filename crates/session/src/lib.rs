pub mod onnxruntime;

use std::borrow::Cow;

use imval_core::{model::ModelLoadError, tensor::Tensor, tensor::TensorError};
use ndarray::ShapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Errors reported by ONNX Runtime.
    #[error("Ort: {0}")]
    Ort(#[from] ort::OrtError),

    #[error("Shape: {0}")]
    Shape(#[from] ShapeError),

    #[error("Tensor: {0}")]
    Tensor(#[from] TensorError),

    #[error("Io: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model: {0}")]
    ModelLoad(#[from] ModelLoadError),

    /// General error messages.
    #[error("Something went wrong: {0}")]
    Message(Cow<'static, str>),
}

/// A loaded model that can run forward passes.
pub trait Session {
    fn run(&self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>, SessionError>;
}

impl<S: Session + ?Sized> Session for &S {
    fn run(&self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>, SessionError> {
        (**self).run(inputs)
    }
}

impl<S: Session + ?Sized> Session for Box<S> {
    fn run(&self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>, SessionError> {
        (**self).run(inputs)
    }
}
