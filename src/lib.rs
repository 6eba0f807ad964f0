//! # ISHNE Holter Library for Rust
//!
//! A pure Rust library for reading and writing ISHNE-format Holter ECG
//! recordings. The ISHNE format (International Society for Holter and
//! Noninvasive Electrocardiology) stores multi-lead ambulatory ECG as a
//! fixed-layout binary header followed by an interleaved stream of signed
//! 16-bit samples.
//!
//! Decoding is strictly sequential: the header is parsed and validated
//! first, then the sample stream is read row by row and paired with
//! evenly-spaced epoch-nanosecond timestamps derived from the recording's
//! start date/time and sampling rate.
//!
//! ## Quick Start
//!
//! ### Reading an ISHNE file
//!
//! ```rust
//! use ishne::{IshneReader, Result};
//!
//! fn main() -> Result<()> {
//!     # // Create a test file first
//!     # ishne::doctest_utils::create_test_ishne_file("recording.ecg")?;
//!     let mut reader = IshneReader::open("recording.ecg")?;
//!
//!     // Header metadata: patient, timing, lead configuration
//!     let header = reader.header();
//!     println!("Subject: {} {}", header.first_name, header.last_name);
//!     println!("Leads: {}, {} Hz", header.num_leads, header.sampling_rate);
//!
//!     // Decode all samples with synthesized timestamps
//!     let recording = reader.read_recording()?;
//!     for (i, lead) in recording.leads.iter().enumerate() {
//!         println!("{}: {} samples", ishne::Recording::lead_label(i), lead.len());
//!     }
//!
//!     # std::fs::remove_file("recording.ecg").ok();
//!     Ok(())
//! }
//! ```
//!
//! ### Creating an ISHNE file
//!
//! ```rust
//! use ishne::{IshneWriter, Result};
//!
//! fn main() -> Result<()> {
//!     let mut writer = IshneWriter::create("test_output.ecg")?;
//!     writer.set_patient_info("Jane", "Doe", "P001", 2, 0)?;
//!     writer.set_record_date(15, 6, 2021)?;
//!     writer.set_start_time(8, 30, 0)?;
//!     writer.set_sampling_rate(250)?;
//!     writer.add_lead(5)?; // lead I
//!
//!     // One second of a crude sawtooth
//!     for i in 0..250i16 {
//!         writer.write_row(&[i % 100])?;
//!     }
//!     writer.finalize()?;
//!
//!     # std::fs::remove_file("test_output.ecg").ok();
//!     Ok(())
//! }
//! ```
//!
//! ### Converting to CSV
//!
//! The [`convert`] module reproduces the classic ISHNE-to-CSV workflow:
//! a `time` column in epoch nanoseconds followed by one `Lead_{i}` column
//! per recorded lead.
//!
//! ```rust
//! # ishne::doctest_utils::create_test_ishne_file("walk.ecg")?;
//! let csv_path = ishne::convert::ishne_to_csv("walk.ecg", None)?;
//! assert!(csv_path.ends_with("walk.csv"));
//! # std::fs::remove_file("walk.ecg").ok();
//! # std::fs::remove_file("walk.csv").ok();
//! # Ok::<(), ishne::IshneError>(())
//! ```

pub mod convert;
pub mod error;
pub mod reader;
pub mod types;
pub mod utils;
pub mod writer;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use error::{IshneError, Result};
pub use reader::IshneReader;
pub use types::{lead_spec_name, IshneDate, IshneHeader, IshneTime, Recording};
pub use writer::IshneWriter;

/// The 8-byte magic string opening every ISHNE file.
pub const ISHNE_MAGIC: &[u8; 8] = b"ISHNE1.0";

/// Total size of the fixed header region: magic (8) + checksum (2) +
/// 512-byte fixed header block. Sample data in canonical files starts
/// right after it.
pub const ISHNE_HEADER_SIZE: usize = 522;

/// Number of lead-spec slots in the header; also the maximum lead count.
pub const ISHNE_MAX_LEADS: usize = 12;

/// Library version
///
/// # Examples
///
/// ```rust
/// let version = ishne::version();
/// assert!(!version.is_empty());
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
