use anyhow::Context;
use clap::Parser;
use odometer_reader_lib::{
    load_config, CancelFlag, FixtureRecognizer, MileagePipeline, PipelineConfig, Recognizer,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Read the mileage off an instrument-cluster photo.
#[derive(Debug, Parser)]
#[command(name = "odometer-reader", version)]
struct Args {
    /// Photo of the instrument cluster (JPEG or PNG)
    image: PathBuf,

    /// Replay recorded OCR observations from a JSON fixture instead of running an engine
    #[arg(long)]
    observations: Option<PathBuf>,

    /// PaddleOCR recognition model (ONNX)
    #[cfg(feature = "oar")]
    #[arg(long, requires = "dict", conflicts_with = "observations")]
    rec_model: Option<PathBuf>,

    /// Character dictionary for --rec-model
    #[cfg(feature = "oar")]
    #[arg(long, requires = "rec_model")]
    dict: Option<PathBuf>,

    /// Last known mileage of the vehicle
    #[arg(long)]
    prior: Option<i64>,

    /// Pipeline configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only submit the unmodified photo
    #[arg(long)]
    no_enhance: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn build_recognizer(args: &Args) -> anyhow::Result<Box<dyn Recognizer>> {
    #[cfg(feature = "oar")]
    if let (Some(model), Some(dict)) = (&args.rec_model, &args.dict) {
        let rec = odometer_reader_lib::ocr::oar::OarRecognizer::from_files(model, dict)?;
        return Ok(Box::new(rec));
    }

    match &args.observations {
        Some(path) => Ok(Box::new(FixtureRecognizer::load(path)?)),
        None => anyhow::bail!("no recognizer: pass --observations (or --rec-model with the `oar` feature)"),
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    if args.no_enhance {
        config.enhance_enabled = false;
    }

    let pipeline = MileagePipeline::from_boxed(build_recognizer(args)?).with_config(config);
    log::debug!("[config] {:?}", pipeline.config());

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("cannot read {}", args.image.display()))?;

    match pipeline.recognize_bytes(&bytes, args.prior, &CancelFlag::default()) {
        Ok(reading) => {
            println!("{}", serde_json::to_string_pretty(&reading)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::from(2))
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
