//! Tape modulator: composes the full MSX cassette program for a
//! [`Container`] — silence, sync pulse trains, byte framing, and
//! per-record-type header emission — onto a [`Writer`].

use std::io::{Seek, Write};

use crate::byteorder::WriteBytesLe;
use crate::process::synth::{synth_cycle, LowPassFilter};
use crate::structs::config::ModulationConfig;
use crate::structs::container::{self, Container, File, FileKind};
use crate::utils::errors::ModulateError;
use crate::utils::wav::{MarkerCategory, Writer};

const SYNC_LONG: u32 = 8000;
const SYNC_SHORT: u32 = 2000;

/// Modulates every file in `container` onto `writer`, in order.
///
/// Validates `config` before writing any samples, matching the error
/// ordering spec'd for `InvalidConfig`.
pub fn modulate<W: Write + Seek>(
    container: &Container<'_>,
    config: &ModulationConfig,
    writer: &mut Writer<W>,
) -> Result<(), ModulateError> {
    config.validate()?;

    let mut low_pass = config
        .low_pass_cutoff_hz
        .map(|cutoff| LowPassFilter::new(cutoff, config.sample_rate, writer.centre() as f64));

    log::debug!(
        "modulating {} file(s) at {} baud, {} Hz sample rate",
        container.len(),
        config.baud,
        config.sample_rate
    );

    for file in container.iter() {
        modulate_file(file, config, writer, &mut low_pass)?;
    }
    Ok(())
}

struct Emitter<'a, W: Write + Seek> {
    writer: &'a mut Writer<W>,
    config: &'a ModulationConfig,
    low_pass: &'a mut Option<LowPassFilter>,
}

impl<'a, W: Write + Seek> Emitter<'a, W> {
    fn marker(&mut self, category: MarkerCategory, label: &str) {
        if self.config.markers {
            let pos = self.writer.samples_written();
            self.writer.add_marker(pos, category, label);
        }
    }

    fn emit_samples(&mut self, deviations: &[f64]) -> Result<(), ModulateError> {
        let centre = self.writer.centre() as f64;
        let mut buf = Vec::with_capacity(deviations.len());
        for &d in deviations {
            let absolute = centre + d;
            let absolute = match self.low_pass.as_mut() {
                Some(filter) => filter.apply(absolute),
                None => absolute,
            };
            buf.push(absolute.round() as i32);
        }
        self.writer.write_samples(&buf)?;
        Ok(())
    }

    fn emit_silence(&mut self, seconds: f64) -> Result<(), ModulateError> {
        let n = (seconds * self.config.sample_rate as f64).round() as usize;
        self.emit_samples(&vec![0.0; n])
    }

    fn emit_bit(&mut self, bit: bool) -> Result<(), ModulateError> {
        log::trace!("emit bit {bit}");
        let (frequency, cycles) = if bit {
            (2 * self.config.baud, 2)
        } else {
            (self.config.baud, 1)
        };
        for _ in 0..cycles {
            let cycle = synth_cycle(
                self.config.waveform,
                self.config.amplitude as i32,
                self.config.sample_rate,
                frequency,
                self.config.trapezoid_rise_pct,
            )?;
            self.emit_samples(&cycle)?;
        }
        Ok(())
    }

    fn emit_sync(&mut self, count: u32) -> Result<(), ModulateError> {
        for _ in 0..count {
            self.emit_bit(true)?;
        }
        Ok(())
    }

    /// One 11-bit frame: start (0), 8 data bits LSB-first, two stop bits.
    fn emit_byte(&mut self, byte: u8) -> Result<(), ModulateError> {
        self.emit_bit(false)?;
        for i in 0..8 {
            self.emit_bit((byte >> i) & 1 == 1)?;
        }
        self.emit_bit(true)?;
        self.emit_bit(true)?;
        Ok(())
    }

    fn emit_bytes(&mut self, bytes: &[u8]) -> Result<(), ModulateError> {
        for &b in bytes {
            self.emit_byte(b)?;
        }
        Ok(())
    }

    fn emit_header(&mut self, type_marker: &[u8; 10], name: &[u8; 6]) -> Result<(), ModulateError> {
        self.emit_bytes(type_marker)?;
        self.emit_bytes(name)?;
        Ok(())
    }
}

fn modulate_file<W: Write + Seek>(
    file: &File<'_>,
    config: &ModulationConfig,
    writer: &mut Writer<W>,
    low_pass: &mut Option<LowPassFilter>,
) -> Result<(), ModulateError> {
    let mut em = Emitter { writer, config, low_pass };
    em.marker(MarkerCategory::Structure, "file boundary");

    match &file.kind {
        FileKind::Ascii { name, blocks } => {
            em.emit_silence(config.long_silence)?;
            em.marker(MarkerCategory::Structure, "sync start");
            em.emit_sync(SYNC_LONG)?;
            em.marker(MarkerCategory::Detail, "header start");
            em.emit_header(&container::TYPE_ASCII, &name.0)?;

            let last = blocks.len().saturating_sub(1);
            for (i, block) in blocks.iter().enumerate() {
                em.marker(MarkerCategory::Structure, "silence");
                em.emit_silence(config.short_silence)?;
                em.marker(MarkerCategory::Structure, "sync start");
                em.emit_sync(SYNC_SHORT)?;
                em.marker(MarkerCategory::Detail, "data block");
                em.emit_bytes(block.payload)?;
                if i == last {
                    em.emit_byte(container::ASCII_EOF_MARKER)?;
                }
            }
        }
        FileKind::Binary { name, address, block, .. } => {
            em.emit_silence(config.long_silence)?;
            em.marker(MarkerCategory::Structure, "sync start");
            em.emit_sync(SYNC_LONG)?;
            em.marker(MarkerCategory::Detail, "header start");
            em.emit_header(&container::TYPE_BINARY, &name.0)?;

            em.marker(MarkerCategory::Structure, "silence");
            em.emit_silence(config.short_silence)?;
            em.marker(MarkerCategory::Structure, "sync start");
            em.emit_sync(SYNC_SHORT)?;
            em.marker(MarkerCategory::Detail, "data block");
            let mut address_bytes = Vec::with_capacity(6);
            address.write_le(&mut address_bytes);
            em.emit_bytes(&address_bytes)?;
            em.emit_bytes(block.payload)?;
        }
        FileKind::Basic { name, block } => {
            em.emit_silence(config.long_silence)?;
            em.marker(MarkerCategory::Structure, "sync start");
            em.emit_sync(SYNC_LONG)?;
            em.marker(MarkerCategory::Detail, "header start");
            em.emit_header(&container::TYPE_BASIC, &name.0)?;

            em.marker(MarkerCategory::Structure, "silence");
            em.emit_silence(config.short_silence)?;
            em.marker(MarkerCategory::Structure, "sync start");
            em.emit_sync(SYNC_SHORT)?;
            em.marker(MarkerCategory::Detail, "data block");
            em.emit_bytes(block.payload)?;
        }
        FileKind::Custom { block } => {
            em.marker(MarkerCategory::Structure, "silence");
            em.emit_silence(config.short_silence)?;
            em.marker(MarkerCategory::Structure, "sync start");
            em.emit_sync(SYNC_SHORT)?;
            em.marker(MarkerCategory::Detail, "data block");
            em.emit_bytes(block.payload)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::parse::parse;
    use crate::structs::config::Waveform;
    use std::io::Cursor;

    fn config() -> ModulationConfig {
        ModulationConfig {
            baud: 1200,
            sample_rate: 48_000,
            waveform: Waveform::Square,
            ..Default::default()
        }
    }

    #[test]
    fn silence_region_advances_expected_sample_count() {
        let mut writer = Writer::new(Cursor::new(Vec::new()), 48_000, 1, 8).unwrap();
        let mut low_pass = None;
        let cfg = config();
        let mut em = Emitter {
            writer: &mut writer,
            config: &cfg,
            low_pass: &mut low_pass,
        };
        em.emit_silence(0.01).unwrap();
        assert_eq!(writer.samples_written(), 480);
        writer.close().unwrap();
    }

    #[test]
    fn cycle_count_law_p5() {
        // A 0-bit at 1200 baud, 48000 Hz occupies floor(48000/1200) samples.
        let cycle = synth_cycle(Waveform::Square, 100, 48_000, 1200, 10).unwrap();
        assert_eq!(cycle.len(), 48_000 / 1200);
        // A 1-bit is two cycles at 2*baud.
        let cycle = synth_cycle(Waveform::Square, 100, 48_000, 2400, 10).unwrap();
        assert_eq!(cycle.len() * 2, 2 * (48_000 / 2400));
    }

    #[test]
    fn modulating_ascii_file_reappends_eof_marker() {
        let data = [
            container::MAGIC.as_slice(),
            &container::TYPE_ASCII,
            b"HELLO ",
            &container::MAGIC,
            b"HI\x1a",
        ]
        .concat();
        let outcome = parse(&data);
        assert_eq!(outcome.error, None);

        let mut writer = Writer::new(Cursor::new(Vec::new()), 48_000, 1, 8).unwrap();
        let cfg = config();
        modulate(&outcome.container, &cfg, &mut writer).unwrap();

        // At 1200 baud / 48000 Hz, every bit cell (0 or 1) is exactly 40
        // samples, so the total is an exact integer count.
        let bit_cells = SYNC_LONG + 16 * 11 + SYNC_SHORT + 3 * 11;
        let silence_samples =
            (cfg.long_silence * 48_000.0) as u64 + (cfg.short_silence * 48_000.0) as u64;
        let expected = bit_cells as u64 * 40 + silence_samples;
        assert_eq!(writer.samples_written(), expected);
        writer.close().unwrap();
    }
}
