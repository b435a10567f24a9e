mod config;
mod data;
mod errors;
mod etl;

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::{error, info};
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::config::UserConfig;
use crate::errors::{Error, ErrorKind, Result};
use crate::etl::apron_gen::ApronGenEtl;
use crate::etl::Etl;

const USAGE: &str = "Usage: aprongen <OSM file> <MSFS scenery XML file>";

// Standard output is for the user, structured logs go to stderr.
fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

fn parse_args(args: &[String]) -> Result<(PathBuf, PathBuf)> {
    match args {
        [osm_path, scenery_path] => Ok((PathBuf::from(osm_path), PathBuf::from(scenery_path))),
        _ => Err(Error::new(ErrorKind::Usage, USAGE)),
    }
}

fn check_exists(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::NotFound, format!("{} does not exist.", what)))
    }
}

fn run(args: &[String], config: &UserConfig) -> Result<()> {
    let (osm_path, scenery_path) = parse_args(args)?;
    check_exists(&osm_path, "OSM file")?;
    check_exists(&scenery_path, "MSFS scenery XML file")?;

    let mut etl = ApronGenEtl::new(&osm_path, &scenery_path, config);
    etl.process()?;
    info!(appended = etl.appended(), scenery = scenery_path.display().to_string().as_str(); "Scenery updated");
    Ok(())
}

fn report(err: &Error) {
    match err.kind {
        ErrorKind::Usage => println!("{}", err.message),
        _ => println!("Error: {}", err.message),
    }
}

fn main() -> ExitCode {
    println!("aprongen v{}\n", env!("CARGO_PKG_VERSION"));

    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(err) => {
            report(&err);
            return ExitCode::FAILURE;
        },
    };
    setup_logging(&config.log_level);

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args, &config) {
        Ok(()) => {
            println!("\nFinished.");
            ExitCode::SUCCESS
        },
        Err(err) => {
            error!(kind = format!("{:?}", err.kind).as_str(), err = err.message.as_str(); "Run failed");
            report(&err);
            ExitCode::FAILURE
        },
    }
}
