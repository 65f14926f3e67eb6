//! Audio estimator: closed-form duration and WAV byte-size calculations
//! from container contents and a parameter bundle, without generating any
//! samples.

use crate::structs::config::ModulationConfig;
use crate::structs::container::{Container, FileKind};

const SYNC_LONG: u32 = 8000;
const SYNC_SHORT: u32 = 2000;
const HEADER_BYTES: u32 = 16;
const BINARY_ADDRESS_BYTES: u32 = 6;

fn sync_time(n: u32, t_bit: f64) -> f64 {
    n as f64 * t_bit
}

/// Expected total audio duration, in seconds, of modulating `container`
/// under `config` — the same arithmetic [`crate::process::modulate`]
/// performs, computed without synthesising any samples.
pub fn estimate_duration_secs(container: &Container<'_>, config: &ModulationConfig) -> f64 {
    let t_bit = 1.0 / config.baud as f64;
    let t_byte = 11.0 * t_bit;
    let mut total = 0.0;

    for file in container.iter() {
        match &file.kind {
            FileKind::Ascii { blocks, .. } => {
                total += config.long_silence + sync_time(SYNC_LONG, t_bit) + HEADER_BYTES as f64 * t_byte;
                let last = blocks.len().saturating_sub(1);
                for (i, block) in blocks.iter().enumerate() {
                    // The final block's payload is re-joined with the
                    // in-band EOF marker stripped off by the parser.
                    let eof_byte = if i == last { 1 } else { 0 };
                    let payload_bytes = block.payload.len() as u32 + eof_byte;
                    total += config.short_silence
                        + sync_time(SYNC_SHORT, t_bit)
                        + payload_bytes as f64 * t_byte;
                }
            }
            FileKind::Binary { block, .. } => {
                total += config.long_silence + sync_time(SYNC_LONG, t_bit) + HEADER_BYTES as f64 * t_byte;
                let payload_bytes = BINARY_ADDRESS_BYTES + block.payload.len() as u32;
                total += config.short_silence
                    + sync_time(SYNC_SHORT, t_bit)
                    + payload_bytes as f64 * t_byte;
            }
            FileKind::Basic { block, .. } => {
                total += config.long_silence + sync_time(SYNC_LONG, t_bit) + HEADER_BYTES as f64 * t_byte;
                total += config.short_silence
                    + sync_time(SYNC_SHORT, t_bit)
                    + block.payload.len() as f64 * t_byte;
            }
            FileKind::Custom { block } => {
                total += config.short_silence
                    + sync_time(SYNC_SHORT, t_bit)
                    + block.payload.len() as f64 * t_byte;
            }
        }
    }

    total
}

/// Expected WAV file size in bytes for a given duration, ignoring any cue
/// chunks (whose size is `O(markers)` and must be accounted for separately
/// by the caller if markers are enabled).
pub fn estimate_wav_size_bytes(duration_secs: f64, config: &ModulationConfig) -> u64 {
    let samples = (duration_secs * config.sample_rate as f64).ceil() as u64;
    let bytes_per_sample = (config.bits_per_sample / 8) as u64;
    44 + samples * bytes_per_sample * config.channels as u64
}
