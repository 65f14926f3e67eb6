//! Error taxonomy for the crate.
//!
//! One enum per subsystem, matching the granularity each subsystem actually
//! needs to report — a single crate-wide error type would force unrelated
//! call sites to match on variants they can never produce.

/// Errors raised while parsing a CAS byte stream.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A file-record or data-block header was truncated before the expected
    /// number of bytes could be read.
    #[error("malformed header at byte offset {0}")]
    MalformedHeader(usize),

    /// The input ended before a required terminator (e.g. the ASCII `0x1A`
    /// marker) was found.
    #[error("unexpected end of input at byte offset {0}")]
    UnexpectedEof(usize),
}

/// Errors raised by [`crate::process::synth`] when a requested frequency
/// cannot be represented at the configured sample rate.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthError {
    /// `sample_rate / frequency` rounded down to zero: no sample would be
    /// emitted for a full cycle.
    #[error("frequency {frequency} Hz too high for sample rate {sample_rate} Hz")]
    FrequencyTooHigh { frequency: u32, sample_rate: u32 },
}

/// Configuration errors raised before any modulation work begins.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("baud rate must be 1200 or 2400, got {0}")]
    InvalidBaud(u32),

    #[error("sample rate must be a positive multiple of 1200 Hz, got {0}")]
    InvalidSampleRate(u32),

    #[error("bits_per_sample must be 8 or 16, got {0}")]
    InvalidBitsPerSample(u16),

    #[error("channels must be 1 or 2, got {0}")]
    InvalidChannels(u16),

    #[error("amplitude {amplitude} exceeds the {bits_per_sample}-bit limit of {max}")]
    AmplitudeOutOfRange {
        amplitude: u16,
        bits_per_sample: u16,
        max: u16,
    },

    #[error("amplitude must be greater than 0")]
    ZeroAmplitude,

    #[error("trapezoid_rise_pct must be between 1 and 50, got {0}")]
    InvalidTrapezoidRise(u8),

    #[error("low_pass cutoff_hz must be greater than 0, got {0}")]
    InvalidLowPassCutoff(u32),
}

/// Errors raised while composing the tape-modulated WAV stream.
#[derive(thiserror::Error, Debug)]
pub enum ModulateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by [`crate::process::export`].
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("refusing to overwrite existing file {0}")]
    FileExists(std::path::PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
