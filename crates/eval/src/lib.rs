pub mod accuracy;
pub mod config;
pub mod evaluate;
pub mod meter;

use std::{borrow::Cow, io::Write};

use imval_core::model::{ModelLoadError, ModelSource};
use imval_data::{
    config::resolve_data_config, dataset::Dataset, loader::Loader, transforms::EvalTransform,
    DataError,
};
use imval_session::{onnxruntime::OrtSessionBuilder, SessionError};
use thiserror::Error;

use crate::{
    config::Config,
    evaluate::{Evaluator, Summary},
};

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("empty dataset: no batches processed")]
    EmptyDataset,

    #[error("session returned no outputs")]
    NoOutput,

    #[error("output has {outputs} rows but the batch has {labels} labels")]
    ShapeMismatch { outputs: usize, labels: usize },

    #[error("invalid output: {0}")]
    InvalidOutput(Cow<'static, str>),

    #[error("invalid config: {0}")]
    InvalidConfig(Cow<'static, str>),

    #[error(transparent)]
    Model(#[from] ModelLoadError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Io: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs a whole validation: resolves preprocessing, opens the dataset,
/// loads the model and evaluates it, writing progress lines to `out`.
pub fn validate<W: Write>(config: &Config, out: W) -> Result<Summary, EvalError> {
    let data_config = resolve_data_config(&config.data_args)?;
    let dataset = Dataset::open(&config.data)?;
    let loader = Loader::new(
        dataset,
        EvalTransform::new(&data_config),
        config.batch_size,
        config.workers,
    )?;

    let source = ModelSource::from_path(&config.model_input)?;
    let session = OrtSessionBuilder::new(&source)
        .with_intra_op_num_threads(config.intra_op_num_threads)
        .build()?;

    Evaluator::new(config.print_freq, out).run(&session, &loader)
}
