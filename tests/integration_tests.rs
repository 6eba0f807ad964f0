use ishne::{convert, IshneReader, IshneWriter, Recording};
use std::fs;
use std::path::Path;

// Helper to remove fixture files between runs
fn cleanup_test_file(filename: &str) {
    if Path::new(filename).exists() {
        fs::remove_file(filename).ok();
    }
}

// Writes a two-lead recording with deterministic sample data
fn create_two_lead_file(filename: &str, total_samples: i16) {
    let mut writer = IshneWriter::create(filename).unwrap();
    writer
        .set_patient_info("John", "Doe", "JD001", 1, 2)
        .unwrap();
    writer.set_birth_date(15, 3, 1985).unwrap();
    writer.set_record_date(1, 1, 2020).unwrap();
    writer.set_start_time(0, 0, 0).unwrap();
    writer.set_sampling_rate(1000).unwrap();
    writer.add_lead(6).unwrap(); // lead II
    writer.add_lead(11).unwrap(); // V1

    for i in 0..total_samples {
        writer.write_row(&[100 + i, -50 + i]).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_header_round_trip() {
    let filename = "test_header_round_trip.ecg";
    create_two_lead_file(filename, 10);

    let reader = IshneReader::open(filename).unwrap();
    let header = reader.header();

    assert_eq!(header.first_name, "John");
    assert_eq!(header.last_name, "Doe");
    assert_eq!(header.subject_id, "JD001");
    assert_eq!(header.sex, 1);
    assert_eq!(header.race, 2);
    assert_eq!(
        (header.birth_date.day, header.birth_date.month, header.birth_date.year),
        (15, 3, 1985)
    );
    assert_eq!(
        (header.record_date.day, header.record_date.month, header.record_date.year),
        (1, 1, 2020)
    );
    assert_eq!(
        (header.start_time.hour, header.start_time.minute, header.start_time.second),
        (0, 0, 0)
    );
    assert_eq!(header.num_leads, 2);
    assert_eq!(header.lead_spec, vec![6, 11]);
    assert_eq!(header.sampling_rate, 1000);
    assert_eq!(header.total_samples, 10);
    assert_eq!(header.version, 1);
    assert_eq!(header.offset_data, ishne::ISHNE_HEADER_SIZE as u32);
    assert_eq!(header.variable_header_size, 0);

    cleanup_test_file(filename);
}

// The worked reference case: 2 leads x 3 samples at 1000 Hz starting
// 2020-01-01T00:00:00 UTC.
#[test]
fn test_two_lead_reference_recording() {
    let filename = "test_reference_recording.ecg";
    create_two_lead_file(filename, 3);

    let mut reader = IshneReader::open(filename).unwrap();
    assert_eq!(reader.header().sample_interval_ns(), 1_000_000);

    let recording = reader.read_recording().unwrap();

    let base = 1_577_836_800_000_000_000i64; // 2020-01-01T00:00:00 UTC in ns
    assert_eq!(
        recording.timestamps,
        vec![base, base + 1_000_000, base + 2_000_000]
    );
    assert_eq!(recording.leads[0], vec![100, 101, 102]);
    assert_eq!(recording.leads[1], vec![-50, -49, -48]);

    cleanup_test_file(filename);
}

#[test]
fn test_recording_shape_invariants() {
    let filename = "test_recording_shape.ecg";
    create_two_lead_file(filename, 500);

    let mut reader = IshneReader::open(filename).unwrap();
    let total = reader.header().total_samples as usize;
    let num_leads = reader.header().num_leads as usize;
    let step = reader.header().sample_interval_ns();

    let recording = reader.read_recording().unwrap();

    assert_eq!(recording.timestamps.len(), total);
    assert_eq!(recording.leads.len(), num_leads);
    for lead in &recording.leads {
        assert_eq!(lead.len(), total);
    }

    // Strictly increasing with a constant successive difference
    assert!(recording
        .timestamps
        .windows(2)
        .all(|w| w[1] - w[0] == step && step > 0));

    cleanup_test_file(filename);
}

#[test]
fn test_twelve_lead_recording() {
    let filename = "test_twelve_lead.ecg";
    let specs: Vec<u16> = (5..17).collect(); // I..V6

    let mut writer = IshneWriter::create(filename).unwrap();
    writer.set_record_date(29, 2, 2020).unwrap(); // leap day
    writer.set_start_time(23, 59, 59).unwrap();
    writer.set_sampling_rate(128).unwrap();
    for &spec in &specs {
        writer.add_lead(spec).unwrap();
    }
    for i in 0..64i16 {
        let row: Vec<i16> = (0..12).map(|l| i * 12 + l).collect();
        writer.write_row(&row).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = IshneReader::open(filename).unwrap();
    assert_eq!(reader.header().lead_spec, specs);

    let recording = reader.read_recording().unwrap();
    assert_eq!(recording.num_leads(), 12);
    // Interleaved values landed on the right channels
    for (l, lead) in recording.leads.iter().enumerate() {
        for (i, &v) in lead.iter().enumerate() {
            assert_eq!(v as usize, i * 12 + l);
        }
    }

    cleanup_test_file(filename);
}

#[test]
fn test_progress_callback_observes_every_row() {
    let filename = "test_progress_rows.ecg";
    create_two_lead_file(filename, 50);

    let mut reader = IshneReader::open(filename).unwrap();
    let mut seen = Vec::new();
    let with_progress = reader
        .read_recording_with_progress(|rows| seen.push(rows))
        .unwrap();

    assert_eq!(seen, (1..=50).collect::<Vec<u32>>());

    // The callback is observational only: a silent decode is identical
    let mut reader = IshneReader::open(filename).unwrap();
    let silent = reader.read_recording().unwrap();
    assert_eq!(silent.timestamps, with_progress.timestamps);
    assert_eq!(silent.leads, with_progress.leads);

    cleanup_test_file(filename);
}

#[test]
fn test_decoder_honors_data_offset_gap() {
    let filename = "test_offset_gap.ecg";
    create_two_lead_file(filename, 3);

    // Splice 4 junk bytes between header and data and re-point offset_data,
    // emulating a file with a variable header the decoder must skip.
    let mut bytes = fs::read(filename).unwrap();
    let data_start = ishne::ISHNE_HEADER_SIZE;
    for _ in 0..4 {
        bytes.insert(data_start, 0xEE);
    }
    let new_offset = (data_start as u32 + 4).to_le_bytes();
    bytes[22..26].copy_from_slice(&new_offset);
    fs::write(filename, &bytes).unwrap();

    let mut reader = IshneReader::open(filename).unwrap();
    let recording = reader.read_recording().unwrap();
    assert_eq!(recording.leads[0], vec![100, 101, 102]);
    assert_eq!(recording.leads[1], vec![-50, -49, -48]);

    cleanup_test_file(filename);
}

#[test]
fn test_long_names_truncated_to_field_width() {
    let filename = "test_long_names.ecg";
    let long = "X".repeat(60);

    let mut writer = IshneWriter::create(filename).unwrap();
    writer
        .set_patient_info(&long, &long, &long, 0, 0)
        .unwrap();
    writer.set_record_date(2, 2, 2022).unwrap();
    writer.set_sampling_rate(100).unwrap();
    writer.add_lead(1).unwrap();
    writer.write_row(&[0]).unwrap();
    writer.finalize().unwrap();

    let reader = IshneReader::open(filename).unwrap();
    assert_eq!(reader.header().first_name.len(), 40);
    assert_eq!(reader.header().last_name.len(), 40);
    assert_eq!(reader.header().subject_id.len(), 20);

    cleanup_test_file(filename);
}

#[test]
fn test_csv_conversion() {
    let filename = "test_csv_conversion.ecg";
    create_two_lead_file(filename, 3);

    let out = convert::ishne_to_csv(filename, None).unwrap();
    assert_eq!(out, Path::new("test_csv_conversion.csv"));

    let base = 1_577_836_800_000_000_000i64;
    let expected = format!(
        "time,Lead_0,Lead_1\n{},100,-50\n{},101,-49\n{},102,-48\n",
        base,
        base + 1_000_000,
        base + 2_000_000
    );
    assert_eq!(fs::read_to_string(&out).unwrap(), expected);

    cleanup_test_file(filename);
    cleanup_test_file("test_csv_conversion.csv");
}

#[test]
fn test_csv_explicit_output_path() {
    let filename = "test_csv_explicit.ecg";
    let target = "test_csv_explicit_out.csv";
    create_two_lead_file(filename, 1);

    let out = convert::ishne_to_csv(filename, Some(Path::new(target))).unwrap();
    assert_eq!(out, Path::new(target));
    assert!(fs::read_to_string(target)
        .unwrap()
        .starts_with("time,Lead_0,Lead_1\n"));

    cleanup_test_file(filename);
    cleanup_test_file(target);
}

#[test]
fn test_lead_labels() {
    assert_eq!(Recording::lead_label(0), "Lead_0");
    assert_eq!(Recording::lead_label(11), "Lead_11");
}

#[test]
fn test_empty_recording_round_trip() {
    let filename = "test_empty_recording.ecg";

    let mut writer = IshneWriter::create(filename).unwrap();
    writer.set_record_date(1, 1, 2020).unwrap();
    writer.set_sampling_rate(200).unwrap();
    writer.add_lead(6).unwrap();
    writer.finalize().unwrap();

    let mut reader = IshneReader::open(filename).unwrap();
    assert_eq!(reader.header().total_samples, 0);

    let recording = reader.read_recording().unwrap();
    assert_eq!(recording.num_samples(), 0);
    assert_eq!(recording.num_leads(), 1);
    assert!(recording.leads[0].is_empty());

    cleanup_test_file(filename);
}
