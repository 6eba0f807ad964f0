// Internal utilities for documentation tests
// This file contains helper functions to generate fixture files for doctests

use crate::error::Result;
use crate::writer::IshneWriter;

/// Creates a small two-lead ISHNE file for doctests.
///
/// 200 rows of lead II / V1 data at 200 Hz, recorded 2020-01-01 00:00:00.
/// Not part of the public API.
pub fn create_test_ishne_file(path: &str) -> Result<()> {
    let mut writer = IshneWriter::create(path)?;
    writer.set_patient_info("John", "Doe", "JD001", 1, 0)?;
    writer.set_birth_date(15, 3, 1985)?;
    writer.set_record_date(1, 1, 2020)?;
    writer.set_start_time(0, 0, 0)?;
    writer.set_sampling_rate(200)?;
    writer.add_lead(6)?; // lead II
    writer.add_lead(11)?; // V1

    for i in 0..200i16 {
        writer.write_row(&[i, -i])?;
    }
    writer.finalize()
}
