//! Mirra offline comparison
//!
//! Compares a performer's angle table against a reference angle table:
//!
//! ```text
//! mirra-compare --ref reference.csv --usr performance.csv [--samples 200]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use mirra_core::{MirraError, MirraResult};
use mirra_runtime::load_angle_file;
use mirra_score::{compare, SeriesComparison, DEFAULT_SAMPLES};

const USAGE: &str = "usage: mirra-compare --ref <csv> --usr <csv> [--samples N]";

#[derive(Debug, PartialEq)]
struct Args {
    reference: PathBuf,
    performance: PathBuf,
    samples: usize,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> MirraResult<Args> {
    let mut reference = None;
    let mut performance = None;
    let mut samples = DEFAULT_SAMPLES;

    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| MirraError::InvalidArgument(format!("{flag} needs a value")))
        };
        match flag.as_str() {
            "--ref" => reference = Some(PathBuf::from(value()?)),
            "--usr" => performance = Some(PathBuf::from(value()?)),
            "--samples" => {
                let text = value()?;
                samples = text.parse().map_err(|_| {
                    MirraError::InvalidArgument(format!("--samples expects an integer, got {text:?}"))
                })?;
            }
            other => {
                return Err(MirraError::InvalidArgument(format!(
                    "unknown argument {other:?}\n{USAGE}"
                )))
            }
        }
    }

    match (reference, performance) {
        (Some(reference), Some(performance)) => Ok(Args {
            reference,
            performance,
            samples,
        }),
        _ => Err(MirraError::InvalidArgument(format!(
            "--ref and --usr are required\n{USAGE}"
        ))),
    }
}

fn report(result: &SeriesComparison) -> String {
    let (start, end) = result.window;
    format!(
        "Overlapping time window: {start:.2}s to {end:.2}s\nMean: {:.3}  Min: {:.3}  Max: {:.3}  (N={})",
        result.mean, result.min, result.max, result.n
    )
}

fn run() -> MirraResult<String> {
    let args = parse_args(std::env::args().skip(1))?;
    let reference = load_angle_file(&args.reference)?;
    let performance = load_angle_file(&args.performance)?;
    let result = compare(&reference, &performance, args.samples)?;
    Ok(report(&result))
}

fn main() -> ExitCode {
    match run() {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
