use std::num::NonZeroUsize;

use imval_eval::{
    config::{Config, Opt},
    EvalError,
};
use structopt::StructOpt;

#[cfg(test)]
fn parse(args: &[&str]) -> Result<Config, EvalError> {
    let opt = Opt::from_iter_safe(std::iter::once("imval").chain(args.iter().copied())).unwrap();
    Config::try_from(opt)
}

#[test]
fn defaults() {
    let config = parse(&["/data/val", "--model-input", "model.onnx"]).unwrap();
    assert_eq!(config.data, std::path::PathBuf::from("/data/val"));
    assert_eq!(config.model_input, std::path::PathBuf::from("model.onnx"));
    assert_eq!(config.workers, 2);
    assert_eq!(config.batch_size, 256);
    assert_eq!(config.print_freq, NonZeroUsize::new(500).unwrap());
    assert_eq!(config.intra_op_num_threads, 1);
    assert_eq!(config.data_args, Default::default());
}

#[test]
fn all_flags() {
    let config = parse(&[
        "/data/val",
        "--model-input",
        "model.dfg",
        "-j",
        "0",
        "-b",
        "32",
        "--img-size",
        "256",
        "--mean",
        "0.5",
        "0.5",
        "0.5",
        "--std",
        "0.25",
        "--crop-pct",
        "0.9",
        "--interpolation",
        "bicubic",
        "--tf-preprocessing",
        "-p",
        "1",
        "--intra-threads",
        "4",
    ])
    .unwrap();
    assert_eq!(config.workers, 0);
    assert_eq!(config.batch_size, 32);
    assert_eq!(config.print_freq.get(), 1);
    assert_eq!(config.intra_op_num_threads, 4);
    assert_eq!(config.data_args.img_size, Some(256));
    assert_eq!(config.data_args.mean, Some(vec![0.5, 0.5, 0.5]));
    assert_eq!(config.data_args.std, Some(vec![0.25]));
    assert_eq!(config.data_args.crop_pct, Some(0.9));
    assert_eq!(config.data_args.interpolation, "bicubic");
    assert!(config.data_args.tf_preprocessing);
}

#[test]
fn invalid_configs() {
    for args in [
        &["/data/val"][..],
        &["/data/val", "--model-input", ""],
        &["/data/val", "--model-input", "m.onnx", "-b", "0"],
        &["/data/val", "--model-input", "m.onnx", "-p", "0"],
    ] {
        assert!(
            matches!(parse(args), Err(EvalError::InvalidConfig(_))),
            "{args:?}"
        );
    }
}
