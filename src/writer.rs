use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{IshneError, Result};
use crate::types::{IshneDate, IshneTime};
use crate::{ISHNE_HEADER_SIZE, ISHNE_MAGIC, ISHNE_MAX_LEADS};

/// Byte offset of the `total_samples` field, back-patched on finalize.
const TOTAL_SAMPLES_OFFSET: u64 = 14;

/// ISHNE Holter file writer.
///
/// Produces files with the canonical fixed layout: a 522-byte header
/// (8-byte magic, 2-byte checksum, 512-byte fixed block), an empty
/// variable header, and the interleaved sample stream starting directly
/// after the header.
///
/// # File Creation Workflow
///
/// 1. Create writer with [`IshneWriter::create`]
/// 2. Configure patient info, record date/time, sampling rate, leads
/// 3. Write sample rows with [`write_row`](Self::write_row)
/// 4. Finalize the file with [`finalize`](Self::finalize)
///
/// The header is emitted lazily before the first row, freezing the
/// configuration; `total_samples` is back-patched when the file is
/// finalized, so the row count never has to be known up front.
///
/// # Examples
///
/// ```rust
/// use ishne::IshneWriter;
///
/// let mut writer = IshneWriter::create("output.ecg")?;
/// writer.set_patient_info("John", "Doe", "JD001", 1, 0)?;
/// writer.set_record_date(1, 1, 2020)?;
/// writer.set_start_time(0, 0, 0)?;
/// writer.set_sampling_rate(200)?;
/// writer.add_lead(6)?;  // lead II
/// writer.add_lead(11)?; // V1
///
/// for i in 0..200i16 {
///     writer.write_row(&[i, -i])?;
/// }
/// writer.finalize()?;
///
/// # std::fs::remove_file("output.ecg").ok();
/// # Ok::<(), ishne::IshneError>(())
/// ```
pub struct IshneWriter {
    file: BufWriter<File>,
    first_name: String,
    last_name: String,
    subject_id: String,
    sex: u16,
    race: u16,
    birth_date: IshneDate,
    record_date: IshneDate,
    start_time: IshneTime,
    lead_spec: Vec<u16>,
    sampling_rate: u16,
    rows_written: u32,
    header_written: bool,
}

impl IshneWriter {
    /// Creates a new ISHNE file at `path`, truncating any existing file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(&path)?;

        Ok(IshneWriter {
            file: BufWriter::new(file),
            first_name: String::new(),
            last_name: String::new(),
            subject_id: String::new(),
            sex: 0,
            race: 0,
            birth_date: IshneDate { day: 1, month: 1, year: 1970 },
            record_date: IshneDate { day: 1, month: 1, year: 1970 },
            start_time: IshneTime { hour: 0, minute: 0, second: 0 },
            lead_spec: Vec::new(),
            sampling_rate: 0,
            rows_written: 0,
            header_written: false,
        })
    }

    /// Sets patient name, subject id and the sex/race code fields.
    ///
    /// Names longer than their fixed-width header slots (40/40/20 ASCII
    /// bytes) are truncated on write.
    pub fn set_patient_info(
        &mut self,
        first_name: &str,
        last_name: &str,
        subject_id: &str,
        sex: u16,
        race: u16,
    ) -> Result<()> {
        self.check_mutable()?;
        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();
        self.subject_id = subject_id.to_string();
        self.sex = sex;
        self.race = race;
        Ok(())
    }

    /// Sets the patient birth date, stored as (day, month, year).
    pub fn set_birth_date(&mut self, day: u16, month: u16, year: u16) -> Result<()> {
        self.check_mutable()?;
        self.birth_date = IshneDate { day, month, year };
        Ok(())
    }

    /// Sets the recording date, stored as (day, month, year).
    ///
    /// The values are written as given; whether they form a valid calendar
    /// date is only checked by readers when synthesizing timestamps.
    pub fn set_record_date(&mut self, day: u16, month: u16, year: u16) -> Result<()> {
        self.check_mutable()?;
        self.record_date = IshneDate { day, month, year };
        Ok(())
    }

    /// Sets the recording start time of day.
    pub fn set_start_time(&mut self, hour: u8, minute: u8, second: u8) -> Result<()> {
        self.check_mutable()?;
        self.start_time = IshneTime { hour, minute, second };
        Ok(())
    }

    /// Sets the sampling rate in Hz.
    ///
    /// # Errors
    ///
    /// [`IshneError::InvalidSamplingRate`] when `rate` is zero; a zero rate
    /// would make the file unreadable.
    pub fn set_sampling_rate(&mut self, rate: u16) -> Result<()> {
        self.check_mutable()?;
        if rate == 0 {
            return Err(IshneError::InvalidSamplingRate);
        }
        self.sampling_rate = rate;
        Ok(())
    }

    /// Appends a recorded lead with the given ISHNE lead-type code.
    ///
    /// # Errors
    ///
    /// [`IshneError::InvalidLeadCount`] when the format's 12 lead slots are
    /// already taken.
    pub fn add_lead(&mut self, spec_code: u16) -> Result<()> {
        self.check_mutable()?;
        if self.lead_spec.len() >= ISHNE_MAX_LEADS {
            return Err(IshneError::InvalidLeadCount(self.lead_spec.len() as u16 + 1));
        }
        self.lead_spec.push(spec_code);
        Ok(())
    }

    /// Number of sample rows written so far.
    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    /// Writes one sample row, one value per configured lead, in lead order.
    ///
    /// The first call emits the header and freezes the configuration.
    ///
    /// # Errors
    ///
    /// * [`IshneError::LeadCountMismatch`] - row length differs from the
    ///   configured lead count
    /// * [`IshneError::InvalidSamplingRate`] / [`IshneError::InvalidLeadCount`] -
    ///   header emission with no sampling rate or no leads configured
    pub fn write_row(&mut self, row: &[i16]) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }

        if row.len() != self.lead_spec.len() {
            return Err(IshneError::LeadCountMismatch {
                expected: self.lead_spec.len(),
                got: row.len(),
            });
        }

        for &sample in row {
            self.file.write_all(&sample.to_le_bytes())?;
        }
        self.rows_written += 1;
        Ok(())
    }

    /// Finishes the file: emits the header if no row was ever written,
    /// back-patches `total_samples`, and flushes.
    pub fn finalize(mut self) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }

        self.file.flush()?;
        self.file.seek(SeekFrom::Start(TOTAL_SAMPLES_OFFSET))?;
        self.file.write_all(&self.rows_written.to_le_bytes())?;
        self.file.flush()?;

        log::debug!(
            "finalized ISHNE file: {} rows x {} leads",
            self.rows_written,
            self.lead_spec.len()
        );
        Ok(())
    }

    fn check_mutable(&self) -> Result<()> {
        if self.header_written {
            return Err(IshneError::HeaderFrozen);
        }
        Ok(())
    }

    /// Emits the fixed 522-byte header with `total_samples = 0`.
    fn write_header(&mut self) -> Result<()> {
        if self.sampling_rate == 0 {
            return Err(IshneError::InvalidSamplingRate);
        }
        if self.lead_spec.is_empty() {
            return Err(IshneError::InvalidLeadCount(0));
        }

        let mut header = Vec::with_capacity(ISHNE_HEADER_SIZE);
        header.extend_from_slice(ISHNE_MAGIC);
        // Checksum slot: this crate's reader discards it, written as zero.
        header.extend_from_slice(&0u16.to_le_bytes());

        header.extend_from_slice(&0u32.to_le_bytes()); // variable_header_size
        header.extend_from_slice(&0u32.to_le_bytes()); // total_samples, patched on finalize
        header.extend_from_slice(&(ISHNE_HEADER_SIZE as u32).to_le_bytes()); // offset_variable_header
        header.extend_from_slice(&(ISHNE_HEADER_SIZE as u32).to_le_bytes()); // offset_data
        header.extend_from_slice(&1u16.to_le_bytes()); // version

        push_ascii(&mut header, &self.first_name, 40);
        push_ascii(&mut header, &self.last_name, 40);
        push_ascii(&mut header, &self.subject_id, 20);
        header.extend_from_slice(&self.sex.to_le_bytes());
        header.extend_from_slice(&self.race.to_le_bytes());

        push_date(&mut header, self.birth_date);
        push_date(&mut header, self.record_date);
        // File creation date: this writer records the recording date.
        push_date(&mut header, self.record_date);

        header.push(self.start_time.hour);
        header.push(self.start_time.minute);
        header.push(self.start_time.second);
        header.extend_from_slice(&[0u8; 3]); // reserved

        header.extend_from_slice(&(self.lead_spec.len() as u16).to_le_bytes());
        for slot in 0..ISHNE_MAX_LEADS {
            let code = self.lead_spec.get(slot).copied().unwrap_or(0);
            header.extend_from_slice(&code.to_le_bytes());
        }

        header.extend_from_slice(&[0u8; 24]); // lead quality
        header.extend_from_slice(&[0u8; 24]); // amplitude resolution
        header.extend_from_slice(&[0u8; 2]); // pacemaker code
        header.extend_from_slice(&[0u8; 40]); // recorder type

        header.extend_from_slice(&self.sampling_rate.to_le_bytes());

        // Pad the reserved tail so the data region starts at offset_data.
        header.resize(ISHNE_HEADER_SIZE, 0);

        self.file.write_all(&header)?;
        self.header_written = true;
        Ok(())
    }
}

/// Writes `s` into a fixed-width ASCII slot, truncated and NUL-padded.
fn push_ascii(buf: &mut Vec<u8>, s: &str, width: usize) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(width);
    buf.extend_from_slice(&bytes[..n]);
    buf.resize(buf.len() + (width - n), 0);
}

fn push_date(buf: &mut Vec<u8>, date: IshneDate) {
    buf.extend_from_slice(&date.day.to_le_bytes());
    buf.extend_from_slice(&date.month.to_le_bytes());
    buf.extend_from_slice(&date.year.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleanup_test_file(filename: &str) {
        std::fs::remove_file(filename).ok();
    }

    #[test]
    fn test_zero_sampling_rate_rejected() {
        let filename = "test_writer_zero_rate.ecg";
        let mut writer = IshneWriter::create(filename).unwrap();
        assert!(matches!(
            writer.set_sampling_rate(0),
            Err(IshneError::InvalidSamplingRate)
        ));
        cleanup_test_file(filename);
    }

    #[test]
    fn test_modification_after_header_written() {
        let filename = "test_writer_frozen.ecg";
        let mut writer = IshneWriter::create(filename).unwrap();
        writer.set_sampling_rate(200).unwrap();
        writer.add_lead(6).unwrap();
        writer.write_row(&[0]).unwrap();

        assert!(matches!(
            writer.set_sampling_rate(100),
            Err(IshneError::HeaderFrozen)
        ));
        assert!(matches!(writer.add_lead(7), Err(IshneError::HeaderFrozen)));

        writer.finalize().unwrap();
        cleanup_test_file(filename);
    }

    #[test]
    fn test_row_width_must_match_leads() {
        let filename = "test_writer_row_width.ecg";
        let mut writer = IshneWriter::create(filename).unwrap();
        writer.set_sampling_rate(200).unwrap();
        writer.add_lead(6).unwrap();
        writer.add_lead(7).unwrap();

        assert!(matches!(
            writer.write_row(&[1]),
            Err(IshneError::LeadCountMismatch { expected: 2, got: 1 })
        ));
        writer.write_row(&[1, 2]).unwrap();
        writer.finalize().unwrap();
        cleanup_test_file(filename);
    }

    #[test]
    fn test_thirteenth_lead_rejected() {
        let filename = "test_writer_lead_limit.ecg";
        let mut writer = IshneWriter::create(filename).unwrap();
        for _ in 0..12 {
            writer.add_lead(1).unwrap();
        }
        assert!(matches!(
            writer.add_lead(1),
            Err(IshneError::InvalidLeadCount(13))
        ));
        cleanup_test_file(filename);
    }

    #[test]
    fn test_header_is_exactly_one_block() {
        let filename = "test_writer_header_size.ecg";
        let mut writer = IshneWriter::create(filename).unwrap();
        writer.set_sampling_rate(128).unwrap();
        writer.add_lead(2).unwrap();
        writer.finalize().unwrap();

        let len = std::fs::metadata(filename).unwrap().len();
        assert_eq!(len, ISHNE_HEADER_SIZE as u64);
        cleanup_test_file(filename);
    }
}
