use std::{num::NonZeroUsize, path::PathBuf};

use imval_data::config::DataArgs;
use structopt::StructOpt;

use crate::EvalError;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "imval",
    about = "Measures top-1/top-5 accuracy and latency of an exported image classifier"
)]
pub struct Opt {
    #[structopt(parse(from_os_str), name = "DIR", help = "Path to dataset")]
    pub data: PathBuf,

    #[structopt(
        long = "model-input",
        parse(from_os_str),
        value_name = "PATH",
        help = "Path to the model file (.onnx or .dfg)"
    )]
    pub model_input: Option<PathBuf>,

    #[structopt(
        short = "j",
        long = "workers",
        default_value = "2",
        help = "Number of data loading workers"
    )]
    pub workers: usize,

    #[structopt(
        short = "b",
        long = "batch-size",
        default_value = "256",
        help = "Mini-batch size"
    )]
    pub batch_size: usize,

    #[structopt(
        long = "img-size",
        help = "Input image dimension, uses 224 if empty"
    )]
    pub img_size: Option<u32>,

    #[structopt(long = "mean", help = "Override mean pixel value of dataset")]
    pub mean: Option<Vec<f32>>,

    #[structopt(long = "std", help = "Override std deviation of dataset")]
    pub std: Option<Vec<f32>>,

    #[structopt(long = "crop-pct", help = "Override default crop pct of 0.875")]
    pub crop_pct: Option<f32>,

    #[structopt(
        long = "interpolation",
        help = "Image resize interpolation type (nearest, bilinear, bicubic, lanczos)"
    )]
    pub interpolation: Option<String>,

    #[structopt(long = "tf-preprocessing", help = "Use TensorFlow style center crop")]
    pub tf_preprocessing: bool,

    #[structopt(
        short = "p",
        long = "print-freq",
        default_value = "500",
        help = "Print frequency in batches"
    )]
    pub print_freq: usize,

    #[structopt(
        long = "intra-threads",
        default_value = "1",
        help = "The number of computation threads used by the runtime"
    )]
    pub intra_op_num_threads: usize,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data: PathBuf,
    pub model_input: PathBuf,
    pub workers: usize,
    pub batch_size: usize,
    pub print_freq: NonZeroUsize,
    pub intra_op_num_threads: usize,
    pub data_args: DataArgs,
}

impl TryFrom<Opt> for Config {
    type Error = EvalError;

    fn try_from(opt: Opt) -> Result<Self, Self::Error> {
        let model_input = opt
            .model_input
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(EvalError::InvalidConfig("no model given (--model-input)".into()))?;
        if opt.batch_size == 0 {
            return Err(EvalError::InvalidConfig("batch size must be positive".into()));
        }
        let print_freq = NonZeroUsize::new(opt.print_freq)
            .ok_or(EvalError::InvalidConfig("print frequency must be positive".into()))?;

        Ok(Self {
            data: opt.data,
            model_input,
            workers: opt.workers,
            batch_size: opt.batch_size,
            print_freq,
            intra_op_num_threads: opt.intra_op_num_threads,
            data_args: DataArgs {
                img_size: opt.img_size,
                mean: opt.mean,
                std: opt.std,
                crop_pct: opt.crop_pct,
                interpolation: opt.interpolation.unwrap_or_default(),
                tf_preprocessing: opt.tf_preprocessing,
            },
        })
    }
}
