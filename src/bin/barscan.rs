use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use barscan::{Config, default_viewer};
use clap::Parser;
use env_logger::Env;
use log::error;

#[derive(Parser)]
#[command(name = "barscan", version, about = "Decode barcodes in an image and show where they are")]
struct Cli {
    /// Path to input image
    #[arg(short, long)]
    image: PathBuf,
    /// Font file for labels instead of the built-in face
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = Config {
        font: cli.font,
        ..Config::new(cli.image)
    };
    let mut viewer = default_viewer();
    let mut stdout = io::stdout().lock();
    match barscan::run(&config, viewer.as_mut(), &mut stdout) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
