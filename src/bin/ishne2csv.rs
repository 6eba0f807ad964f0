//! Converts an ISHNE Holter ECG file to CSV with a `time` column in Unix
//! epoch nanoseconds.
//!
//! Usage: `ishne2csv [--quiet] [--no-progress] <input> [output]`

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use ishne::{convert, IshneReader, Result};

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    quiet: bool,
    progress: bool,
}

fn parse_args() -> Option<Args> {
    let mut input = None;
    let mut output = None;
    let mut quiet = false;
    let mut progress = true;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--quiet" | "-q" => quiet = true,
            "--no-progress" => progress = false,
            "--help" | "-h" => return None,
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ if output.is_none() => output = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }

    Some(Args {
        input: input?,
        output,
        quiet,
        progress,
    })
}

fn run(args: &Args) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| convert::derive_output_path(&args.input));

    let mut reader = IshneReader::open(&args.input)?;
    if !args.quiet {
        print!("\n{}", reader.header());
    }

    let total = reader.header().total_samples;
    let recording = if args.progress {
        // Coarse line-based progress; one update per ~1% of rows.
        let step = (total / 100).max(1);
        let mut stderr = std::io::stderr();
        let recording = reader.read_recording_with_progress(|rows| {
            if rows % step == 0 || rows == total {
                write!(stderr, "\rReading ECG Samples: {}/{}", rows, total).ok();
            }
        })?;
        eprintln!();
        recording
    } else {
        reader.read_recording()?
    };

    convert::write_csv(&recording, File::create(&output)?)?;
    if !args.quiet {
        println!("CSV file written to: {}", output.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let Some(args) = parse_args() else {
        eprintln!("Usage: ishne2csv [--quiet] [--no-progress] <input> [output]");
        process::exit(2);
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
