use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IshneError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Not a valid ISHNE file (bad magic: {0:?})")]
    InvalidMagic(String),

    #[error("Invalid sampling rate read from file")]
    InvalidSamplingRate,

    #[error("Invalid number of leads: {0}")]
    InvalidLeadCount(u16),

    #[error("Truncated header: file ends inside the fixed header region")]
    TruncatedHeader,

    #[error("Truncated sample data: need {needed} bytes at offset {offset}, only {available} available")]
    TruncatedData {
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("Data offset {0} overlaps the header region")]
    InvalidDataOffset(u32),

    #[error("Invalid record date or start time")]
    InvalidDateTime,

    #[error("Record instant out of range for epoch nanoseconds")]
    TimestampOutOfRange,

    #[error("Lead {lead} has {got} samples, expected {expected}")]
    RaggedRecording {
        lead: usize,
        got: usize,
        expected: usize,
    },

    #[error("Row has {got} samples, recording is configured for {expected} leads")]
    LeadCountMismatch { expected: usize, got: usize },

    #[error("Header already written, configuration is frozen")]
    HeaderFrozen,
}

pub type Result<T> = std::result::Result<T, IshneError>;
