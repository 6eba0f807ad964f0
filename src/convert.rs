use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{IshneError, Result};
use crate::reader::IshneReader;
use crate::types::Recording;

/// Default output path for a converted file: the input path with its
/// extension replaced by `csv`.
pub fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension("csv")
}

/// Writes a decoded recording as CSV: a `time,Lead_0,...,Lead_{n-1}`
/// header row, then one row per sample with the timestamp in epoch
/// nanoseconds.
///
/// # Examples
///
/// ```rust
/// use ishne::{convert, Recording};
///
/// let recording = Recording {
///     timestamps: vec![0, 1_000_000],
///     leads: vec![vec![100, 101], vec![-50, -49]],
/// };
///
/// let mut out = Vec::new();
/// convert::write_csv(&recording, &mut out)?;
/// let text = String::from_utf8(out).unwrap();
/// assert_eq!(text, "time,Lead_0,Lead_1\n0,100,-50\n1000000,101,-49\n");
/// # Ok::<(), ishne::IshneError>(())
/// ```
pub fn write_csv<W: Write>(recording: &Recording, writer: W) -> Result<()> {
    // Recording fields are public; reject a ragged value rather than
    // indexing past a short lead.
    let expected = recording.num_samples();
    for (lead, samples) in recording.leads.iter().enumerate() {
        if samples.len() != expected {
            return Err(IshneError::RaggedRecording {
                lead,
                got: samples.len(),
                expected,
            });
        }
    }

    let mut writer = BufWriter::new(writer);

    write!(writer, "time")?;
    for i in 0..recording.num_leads() {
        write!(writer, ",{}", Recording::lead_label(i))?;
    }
    writeln!(writer)?;

    for (i, ts) in recording.timestamps.iter().enumerate() {
        write!(writer, "{}", ts)?;
        for lead in &recording.leads {
            write!(writer, ",{}", lead[i])?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts an ISHNE file to CSV in one call.
///
/// When `output` is `None` the output path is derived from the input path
/// by swapping the extension for `.csv`. Returns the path actually
/// written.
///
/// # Examples
///
/// ```rust
/// use ishne::convert;
///
/// # ishne::doctest_utils::create_test_ishne_file("convert_me.ecg")?;
/// let out = convert::ishne_to_csv("convert_me.ecg", None)?;
/// assert_eq!(out, std::path::PathBuf::from("convert_me.csv"));
/// # std::fs::remove_file("convert_me.ecg").ok();
/// # std::fs::remove_file("convert_me.csv").ok();
/// # Ok::<(), ishne::IshneError>(())
/// ```
pub fn ishne_to_csv<P: AsRef<Path>>(input: P, output: Option<&Path>) -> Result<PathBuf> {
    let input = input.as_ref();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derive_output_path(input));

    let mut reader = IshneReader::open(input)?;
    let recording = reader.read_recording()?;
    write_csv(&recording, File::create(&output)?)?;

    log::info!("CSV file written to: {}", output.display());
    Ok(output)
}
