use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{IshneError, Result};
use crate::types::{IshneDate, IshneHeader, IshneTime, Recording};
use crate::utils::FieldReader;
use crate::{ISHNE_HEADER_SIZE, ISHNE_MAGIC, ISHNE_MAX_LEADS};

/// ISHNE Holter file reader.
///
/// Opening a file parses and validates the fixed header immediately;
/// the sample stream is decoded afterwards in a single sequential pass.
/// The underlying file handle is owned by the reader and closed when it
/// is dropped, on success and error paths alike.
///
/// # Examples
///
/// ```rust
/// use ishne::IshneReader;
///
/// # // Generate test file (hidden from docs)
/// # ishne::doctest_utils::create_test_ishne_file("holter.ecg")?;
/// #
/// let mut reader = IshneReader::open("holter.ecg")?;
///
/// let total_samples = reader.header().total_samples;
/// let num_leads = reader.header().num_leads;
/// println!("Leads: {}", num_leads);
/// println!("Sampling rate: {} Hz", reader.header().sampling_rate);
///
/// let recording = reader.read_recording()?;
/// assert_eq!(recording.num_samples(), total_samples as usize);
/// assert_eq!(recording.num_leads(), num_leads as usize);
///
/// # // Cleanup (hidden from docs)
/// # std::fs::remove_file("holter.ecg").ok();
/// # Ok::<(), ishne::IshneError>(())
/// ```
pub struct IshneReader {
    file: BufReader<File>,
    header: IshneHeader,
}

impl IshneReader {
    /// Opens an ISHNE file and parses its fixed header.
    ///
    /// # Errors
    ///
    /// * [`IshneError::FileNotFound`] - file doesn't exist or can't be opened
    /// * [`IshneError::InvalidMagic`] - first 8 bytes are not `ISHNE1.0`
    /// * [`IshneError::TruncatedHeader`] - file ends inside the header region
    /// * [`IshneError::InvalidSamplingRate`] - sampling rate field is zero
    /// * [`IshneError::InvalidLeadCount`] - lead count outside 1..=12
    /// * [`IshneError::InvalidDataOffset`] - data offset inside the header
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ishne::{IshneReader, IshneError};
    ///
    /// match IshneReader::open("nonexistent.ecg") {
    ///     Ok(_) => println!("Unexpected success"),
    ///     Err(IshneError::FileNotFound(msg)) => println!("File not found: {}", msg),
    ///     Err(e) => println!("Other error: {}", e),
    /// }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .map_err(|e| IshneError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;

        let mut reader = BufReader::new(file);
        let header = Self::parse_header(&mut reader)?;

        log::debug!(
            "parsed ISHNE header: {} leads, {} samples at {} Hz, data at offset {}",
            header.num_leads,
            header.total_samples,
            header.sampling_rate,
            header.offset_data
        );

        Ok(IshneReader { file: reader, header })
    }

    /// Gets a reference to the decoded header.
    pub fn header(&self) -> &IshneHeader {
        &self.header
    }

    /// Decodes the full sample stream into a [`Recording`].
    ///
    /// Equivalent to [`read_recording_with_progress`](Self::read_recording_with_progress)
    /// with a no-op callback.
    pub fn read_recording(&mut self) -> Result<Recording> {
        self.read_recording_with_progress(|_| {})
    }

    /// Decodes the full sample stream, invoking `progress` with the number
    /// of completed rows after each row.
    ///
    /// The callback is purely observational: it cannot alter decode order
    /// or results. The sample region length is verified against the file
    /// size up front, so a truncated file fails before any sample is read
    /// rather than producing a short recording.
    ///
    /// Timestamps are synthesized from the header's record date and start
    /// time (interpreted as UTC): `timestamps[i] = base_epoch_ns + i *
    /// interval_ns` with `interval_ns = 1e9 / sampling_rate`, truncating.
    ///
    /// # Errors
    ///
    /// * [`IshneError::TruncatedData`] - fewer than
    ///   `total_samples * num_leads * 2` bytes available at `offset_data`
    /// * [`IshneError::InvalidDateTime`] - record date/start time fields do
    ///   not form a valid calendar instant
    /// * [`IshneError::TimestampOutOfRange`] - recording start (or a
    ///   synthesized sample timestamp) does not fit in i64 nanoseconds
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ishne::IshneReader;
    ///
    /// # ishne::doctest_utils::create_test_ishne_file("progress.ecg")?;
    /// let mut reader = IshneReader::open("progress.ecg")?;
    /// let total = reader.header().total_samples;
    ///
    /// let mut last = 0;
    /// let recording = reader.read_recording_with_progress(|rows| last = rows)?;
    /// assert_eq!(last, total);
    ///
    /// // Constant sampling interval between consecutive timestamps
    /// let step = recording.timestamps[1] - recording.timestamps[0];
    /// assert!(recording.timestamps.windows(2).all(|w| w[1] - w[0] == step));
    /// # std::fs::remove_file("progress.ecg").ok();
    /// # Ok::<(), ishne::IshneError>(())
    /// ```
    pub fn read_recording_with_progress<F>(&mut self, mut progress: F) -> Result<Recording>
    where
        F: FnMut(u32),
    {
        let offset = self.header.offset_data as u64;
        let needed = self.header.sample_region_len();

        // Fail on truncation before reading a single sample.
        let file_len = self.file.seek(SeekFrom::End(0))?;
        if file_len < offset.saturating_add(needed) {
            return Err(IshneError::TruncatedData {
                offset,
                needed,
                available: file_len.saturating_sub(offset),
            });
        }

        // Timestamps depend only on the header; compute the base first so
        // an invalid calendar date fails without touching the data region.
        // A valid calendar instant can still fall outside the i64
        // nanosecond range (years past 2262), so the conversion is checked.
        let base_epoch_ns = self
            .header
            .start_datetime()?
            .and_utc()
            .timestamp_nanos_opt()
            .ok_or(IshneError::TimestampOutOfRange)?;
        let interval_ns = self.header.sample_interval_ns();

        // The file may contain a gap between header and data; always seek
        // to the declared absolute offset.
        self.file.seek(SeekFrom::Start(offset))?;

        let num_leads = self.header.num_leads as usize;
        let total_samples = self.header.total_samples;

        let mut leads: Vec<Vec<i16>> = (0..num_leads)
            .map(|_| Vec::with_capacity(total_samples as usize))
            .collect();
        let mut row = vec![0u8; num_leads * 2];

        for i in 0..total_samples {
            self.file.read_exact(&mut row)?;
            for (lead, chunk) in leads.iter_mut().zip(row.chunks_exact(2)) {
                lead.push(i16::from_le_bytes([chunk[0], chunk[1]]));
            }
            progress(i + 1);
        }

        let mut timestamps = Vec::with_capacity(total_samples as usize);
        for i in 0..total_samples as i64 {
            let ts = i
                .checked_mul(interval_ns)
                .and_then(|step| base_epoch_ns.checked_add(step))
                .ok_or(IshneError::TimestampOutOfRange)?;
            timestamps.push(ts);
        }

        log::debug!("decoded {} rows x {} leads", total_samples, num_leads);

        Ok(Recording { timestamps, leads })
    }

    /// Parses the fixed 522-byte header region.
    fn parse_header(reader: &mut BufReader<File>) -> Result<IshneHeader> {
        reader.seek(SeekFrom::Start(0))?;
        let mut buf = vec![0u8; ISHNE_HEADER_SIZE];
        reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                IshneError::TruncatedHeader
            } else {
                IshneError::Io(e)
            }
        })?;

        let mut r = FieldReader::new(&buf);

        let magic = r.read_bytes(8)?;
        if magic != ISHNE_MAGIC {
            return Err(IshneError::InvalidMagic(
                String::from_utf8_lossy(magic).into_owned(),
            ));
        }

        // Checksum field: read and discarded, not validated.
        r.skip(2)?;

        let variable_header_size = r.read_u32()?;
        let total_samples = r.read_u32()?;
        let offset_variable_header = r.read_u32()?;
        let offset_data = r.read_u32()?;
        let version = r.read_u16()?;

        let first_name = r.read_ascii(40)?;
        let last_name = r.read_ascii(40)?;
        let subject_id = r.read_ascii(20)?;
        let sex = r.read_u16()?;
        let race = r.read_u16()?;

        let birth_date = Self::read_date(&mut r)?;
        let record_date = Self::read_date(&mut r)?;
        let file_date = Self::read_date(&mut r)?;

        let start_time = IshneTime {
            hour: r.read_u8()?,
            minute: r.read_u8()?,
            second: r.read_u8()?,
        };
        r.skip(3)?; // reserved

        let num_leads = r.read_u16()?;
        if num_leads == 0 || num_leads as usize > ISHNE_MAX_LEADS {
            return Err(IshneError::InvalidLeadCount(num_leads));
        }

        // 12 lead-spec slots are always present; only the first num_leads
        // describe recorded channels.
        let mut lead_spec = Vec::with_capacity(num_leads as usize);
        for i in 0..ISHNE_MAX_LEADS {
            let code = r.read_u16()?;
            if i < num_leads as usize {
                lead_spec.push(code);
            }
        }

        r.skip(24)?; // lead quality
        r.skip(24)?; // amplitude resolution
        r.skip(2)?; // pacemaker code
        r.skip(40)?; // recorder type

        let sampling_rate = r.read_u16()?;
        if sampling_rate == 0 {
            return Err(IshneError::InvalidSamplingRate);
        }

        // Remainder of the fixed header is reserved.
        debug_assert_eq!(r.position(), 274);

        // The data region must start past the variable header.
        let header_end = offset_variable_header as u64 + variable_header_size as u64;
        if (offset_data as u64) < header_end {
            return Err(IshneError::InvalidDataOffset(offset_data));
        }

        Ok(IshneHeader {
            variable_header_size,
            total_samples,
            offset_variable_header,
            offset_data,
            version,
            first_name,
            last_name,
            subject_id,
            sex,
            race,
            birth_date,
            record_date,
            file_date,
            start_time,
            num_leads,
            lead_spec,
            sampling_rate,
        })
    }

    fn read_date(r: &mut FieldReader<'_>) -> Result<IshneDate> {
        Ok(IshneDate {
            day: r.read_u16()?,
            month: r.read_u16()?,
            year: r.read_u16()?,
        })
    }
}
