pub mod config;
pub mod dataset;
pub mod loader;
pub mod transforms;

use std::{borrow::Cow, path::PathBuf};

use imval_core::tensor::TensorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Io: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset directory not found: {0}")]
    NotFound(PathBuf),

    #[error("No images found under {0}")]
    NoImages(PathBuf),

    #[error("Failed to walk dataset: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Unknown interpolation '{0}' (expected nearest, bilinear, bicubic or lanczos)")]
    UnknownInterpolation(String),

    #[error("Invalid data config: {0}")]
    InvalidConfig(Cow<'static, str>),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Tensor: {0}")]
    Tensor(#[from] TensorError),
}
