use std::{io, process};

use imval_eval::{
    config::{Config, Opt},
    validate, EvalError,
};
use structopt::StructOpt;

fn main() {
    env_logger::init();
    color_backtrace::install();

    let opt = Opt::from_args();
    if let Err(err) = run(opt) {
        log::error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), EvalError> {
    let config = Config::try_from(opt)?;
    log::info!("config: {config:?}");

    let summary = validate(&config, io::stdout().lock())?;
    println!("{summary}");
    Ok(())
}
