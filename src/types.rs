use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{IshneError, Result};

/// Calendar date as stored in the ISHNE header: (day, month, year),
/// each a little-endian u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IshneDate {
    pub day: u16,
    pub month: u16,
    pub year: u16,
}

/// Time of day as stored in the ISHNE header: (hour, minute, second),
/// one byte each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IshneTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Metadata decoded from the fixed ISHNE header.
///
/// Produced once by [`IshneReader::open`](crate::IshneReader::open) and not
/// mutated afterwards. All string fields are fixed-width ASCII in the file
/// with trailing NUL padding stripped.
#[derive(Debug, Clone)]
pub struct IshneHeader {
    /// Declared length of the variable header region in bytes.
    /// The region itself is not parsed, only skipped over.
    pub variable_header_size: u32,
    /// Number of sample rows in the data region.
    pub total_samples: u32,
    /// Absolute file offset of the variable header region.
    pub offset_variable_header: u32,
    /// Absolute file offset of the first sample byte.
    pub offset_data: u32,
    /// Format version field.
    pub version: u16,
    pub first_name: String,
    pub last_name: String,
    pub subject_id: String,
    pub sex: u16,
    pub race: u16,
    pub birth_date: IshneDate,
    pub record_date: IshneDate,
    pub file_date: IshneDate,
    pub start_time: IshneTime,
    /// Number of recorded leads, 1 to 12.
    pub num_leads: u16,
    /// Lead-type codes for the recorded leads, in channel order.
    /// The file stores 12 slots; only the first `num_leads` are kept.
    pub lead_spec: Vec<u16>,
    /// Sampling rate in Hz, guaranteed nonzero.
    pub sampling_rate: u16,
}

impl IshneHeader {
    /// Combines `record_date` and `start_time` into the recording start
    /// instant.
    ///
    /// # Errors
    ///
    /// Returns [`IshneError::InvalidDateTime`] when the stored fields do
    /// not form a valid calendar instant (e.g. day 31 in a 30-day month).
    pub fn start_datetime(&self) -> Result<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(
            self.record_date.year as i32,
            self.record_date.month as u32,
            self.record_date.day as u32,
        )
        .ok_or(IshneError::InvalidDateTime)?;
        let time = NaiveTime::from_hms_opt(
            self.start_time.hour as u32,
            self.start_time.minute as u32,
            self.start_time.second as u32,
        )
        .ok_or(IshneError::InvalidDateTime)?;
        Ok(date.and_time(time))
    }

    /// Nanoseconds between consecutive samples.
    ///
    /// Integer division truncates; for sampling rates that do not divide
    /// 1e9 evenly the sub-nanosecond remainder is dropped, matching the
    /// reference converter this format tooling interoperates with.
    pub fn sample_interval_ns(&self) -> i64 {
        1_000_000_000 / self.sampling_rate as i64
    }

    /// Exact byte length of the sample region: two bytes per lead per row.
    pub fn sample_region_len(&self) -> u64 {
        self.total_samples as u64 * self.num_leads as u64 * 2
    }
}

impl fmt::Display for IshneHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ISHNE File Info:")?;
        writeln!(f, "  Name        : {} {}", self.first_name, self.last_name)?;
        writeln!(f, "  Subject ID  : {}", self.subject_id)?;
        writeln!(f, "  Sex         : {} | Race: {}", self.sex, self.race)?;
        writeln!(
            f,
            "  Record Date : {:02}-{:02}-{}",
            self.record_date.day, self.record_date.month, self.record_date.year
        )?;
        writeln!(
            f,
            "  Start Time  : {:02}:{:02}:{:02}",
            self.start_time.hour, self.start_time.minute, self.start_time.second
        )?;
        let names: Vec<&str> = self
            .lead_spec
            .iter()
            .map(|&code| lead_spec_name(code))
            .collect();
        writeln!(f, "  Leads       : {} ({})", self.num_leads, names.join(", "))?;
        writeln!(f, "  Samples     : {}", self.total_samples)?;
        writeln!(f, "  Sampling Hz : {}", self.sampling_rate)
    }
}

/// A fully decoded recording: one timestamp column plus one sample column
/// per lead.
///
/// Produced once by [`IshneReader::read_recording`](crate::IshneReader::read_recording)
/// and read-only afterwards. Holds no reference back to the source file.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Nanoseconds since the Unix epoch, one per sample row, strictly
    /// increasing by a constant step.
    pub timestamps: Vec<i64>,
    /// One sequence per lead, each `timestamps.len()` long, in channel
    /// order.
    pub leads: Vec<Vec<i16>>,
}

impl Recording {
    pub fn num_samples(&self) -> usize {
        self.timestamps.len()
    }

    pub fn num_leads(&self) -> usize {
        self.leads.len()
    }

    /// Column name for lead index `i`: `Lead_0`, `Lead_1`, ...
    pub fn lead_label(i: usize) -> String {
        format!("Lead_{}", i)
    }
}

/// Human-readable name for an ISHNE lead-type code.
///
/// Codes are taken from the ISHNE Holter standard's lead specification
/// table; codes outside the table map to `"Unknown"`.
///
/// # Examples
///
/// ```rust
/// assert_eq!(ishne::lead_spec_name(6), "II");
/// assert_eq!(ishne::lead_spec_name(11), "V1");
/// assert_eq!(ishne::lead_spec_name(999), "Unknown");
/// ```
pub fn lead_spec_name(code: u16) -> &'static str {
    match code {
        1 => "Generic bipolar",
        2 => "X",
        3 => "Y",
        4 => "Z",
        5 => "I",
        6 => "II",
        7 => "III",
        8 => "aVR",
        9 => "aVL",
        10 => "aVF",
        11 => "V1",
        12 => "V2",
        13 => "V3",
        14 => "V4",
        15 => "V5",
        16 => "V6",
        17 => "ES",
        18 => "AS",
        19 => "AI",
        _ => "Unknown",
    }
}
