//! RIFF/WAVE PCM writer.
//!
//! Streams 8- or 16-bit PCM samples to a seekable sink, back-patching the
//! RIFF and `data` chunk sizes on [`Writer::close`]. When markers are
//! enabled, `close` also appends a `cue ` chunk and a `LIST/adtl` chunk
//! carrying one `labl` per cue.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use msxtape_macros::ToBytes;

use crate::byteorder::WriteBytesLe;

/// The `fmt ` chunk body for canonical PCM: fixed 16-byte layout written in
/// field-declaration order.
#[derive(ToBytes)]
struct FmtChunk {
    audio_format: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

/// Category tag embedded at the start of a marker's label, so a
/// category-filtered player UI can group cue points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerCategory {
    Structure,
    Detail,
}

impl MarkerCategory {
    fn tag(self) -> &'static str {
        match self {
            MarkerCategory::Structure => "STRUCTURE",
            MarkerCategory::Detail => "DETAIL",
        }
    }
}

struct Marker {
    sample_index: u32,
    category: MarkerCategory,
    label: String,
}

/// A canonical RIFF/WAVE/PCM writer over a seekable sink.
///
/// Any I/O error from `write_samples`/`write_silence`/`add_marker` is
/// sticky: once one occurs, every subsequent call on this writer fails
/// immediately without touching the underlying stream.
pub struct Writer<W: Write + Seek> {
    inner: BufWriter<W>,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
    riff_size_position: u64,
    data_size_position: u64,
    samples_written: u64,
    markers: Vec<Marker>,
    sticky_error: bool,
    closed: bool,
}

impl Writer<File> {
    /// Creates a fresh WAV file at `path`, writing the RIFF header, `fmt `
    /// chunk, and a placeholder `data` chunk immediately.
    pub fn create(
        path: impl AsRef<Path>,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
    ) -> io::Result<Self> {
        let file = File::create(path)?;
        Self::new(file, sample_rate, channels, bits_per_sample)
    }
}

impl<W: Write + Seek> Writer<W> {
    pub fn new(
        inner: W,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
    ) -> io::Result<Self> {
        let mut inner = BufWriter::new(inner);

        inner.write_all(b"RIFF")?;
        let riff_size_position = inner.stream_position()?;
        inner.write_all(&0u32.to_le_bytes())?;
        inner.write_all(b"WAVE")?;

        let block_align = channels * (bits_per_sample / 8);
        let fmt = FmtChunk {
            audio_format: 1, // PCM
            channels,
            sample_rate,
            byte_rate: sample_rate * block_align as u32,
            block_align,
            bits_per_sample,
        };
        let mut fmt_bytes = Vec::with_capacity(16);
        fmt.write_le(&mut fmt_bytes);

        inner.write_all(b"fmt ")?;
        inner.write_all(&(fmt_bytes.len() as u32).to_le_bytes())?;
        inner.write_all(&fmt_bytes)?;

        inner.write_all(b"data")?;
        let data_size_position = inner.stream_position()?;
        inner.write_all(&0u32.to_le_bytes())?;

        Ok(Self {
            inner,
            sample_rate,
            channels,
            bits_per_sample,
            riff_size_position,
            data_size_position,
            samples_written: 0,
            markers: Vec::new(),
            sticky_error: false,
            closed: false,
        })
    }

    /// Centre value of the configured bit depth: 128 for 8-bit, 0 for
    /// 16-bit.
    pub fn centre(&self) -> i32 {
        if self.bits_per_sample == 8 { 128 } else { 0 }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Current count of PCM samples (per channel) written so far; the
    /// position a marker captured now would refer to.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    fn check_sticky(&self) -> io::Result<()> {
        if self.sticky_error {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "writer is sticky-failed after a previous I/O error",
            ))
        } else {
            Ok(())
        }
    }

    fn write_one(&mut self, value: i32) -> io::Result<()> {
        if self.bits_per_sample == 8 {
            self.inner.write_all(&[value.clamp(0, 255) as u8])?;
        } else {
            let clamped = value.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
            self.inner.write_all(&clamped.to_le_bytes())?;
        }
        Ok(())
    }

    /// Writes one absolute PCM sample per channel, duplicating across
    /// channels when `channels == 2`.
    pub fn write_samples(&mut self, samples: &[i32]) -> io::Result<()> {
        self.check_sticky()?;
        let result = (|| {
            for &sample in samples {
                for _ in 0..self.channels {
                    self.write_one(sample)?;
                }
                self.samples_written += 1;
            }
            Ok(())
        })();
        if result.is_err() {
            self.sticky_error = true;
        }
        result
    }

    /// Writes `seconds` of centre-value silence.
    pub fn write_silence(&mut self, seconds: f64) -> io::Result<()> {
        self.check_sticky()?;
        let n = (seconds * self.sample_rate as f64).round() as usize;
        let centre = self.centre();
        let samples = vec![centre; n];
        self.write_samples(&samples)
    }

    /// Records a cue point at the given sample index, to be written out as
    /// a `cue `/`labl` pair when the writer closes.
    pub fn add_marker(&mut self, sample_index: u64, category: MarkerCategory, label: &str) {
        self.markers.push(Marker {
            sample_index: sample_index as u32,
            category,
            label: label.to_string(),
        });
    }

    fn write_cue_chunks(&mut self) -> io::Result<()> {
        if self.markers.is_empty() {
            return Ok(());
        }

        let count = self.markers.len() as u32;
        let cue_size = 4 + 24 * count;
        self.inner.write_all(b"cue ")?;
        self.inner.write_all(&cue_size.to_le_bytes())?;
        self.inner.write_all(&count.to_le_bytes())?;
        for (i, marker) in self.markers.iter().enumerate() {
            self.inner.write_all(&(i as u32).to_le_bytes())?;
            self.inner.write_all(&marker.sample_index.to_le_bytes())?;
            self.inner.write_all(b"data")?;
            self.inner.write_all(&0u32.to_le_bytes())?;
            self.inner.write_all(&0u32.to_le_bytes())?;
            self.inner.write_all(&marker.sample_index.to_le_bytes())?;
        }
        if cue_size % 2 == 1 {
            self.inner.write_all(&[0u8])?;
        }

        let mut adtl_body = Vec::new();
        adtl_body.extend_from_slice(b"adtl");
        for (i, marker) in self.markers.iter().enumerate() {
            let text = format!("{}: {}", marker.category.tag(), marker.label);
            let mut text_bytes = text.into_bytes();
            text_bytes.push(0);
            if text_bytes.len() % 2 == 1 {
                text_bytes.push(0);
            }
            let labl_size = 4 + text_bytes.len() as u32;
            adtl_body.extend_from_slice(b"labl");
            adtl_body.extend_from_slice(&labl_size.to_le_bytes());
            adtl_body.extend_from_slice(&(i as u32).to_le_bytes());
            adtl_body.extend_from_slice(&text_bytes);
        }

        self.inner.write_all(b"LIST")?;
        self.inner.write_all(&(adtl_body.len() as u32).to_le_bytes())?;
        self.inner.write_all(&adtl_body)?;
        if adtl_body.len() % 2 == 1 {
            self.inner.write_all(&[0u8])?;
        }

        Ok(())
    }

    /// Back-patches the RIFF and `data` chunk sizes, writes any buffered
    /// markers, and flushes. Consumes the writer so it cannot be written to
    /// afterwards.
    pub fn close(mut self) -> io::Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }

        let block_align = (self.channels * (self.bits_per_sample / 8)) as u64;
        let data_size = self.samples_written * block_align;

        self.write_cue_chunks()?;

        let end_position = self.inner.stream_position()?;

        self.inner.seek(SeekFrom::Start(self.data_size_position))?;
        self.inner.write_all(&(data_size as u32).to_le_bytes())?;

        self.inner.seek(SeekFrom::Start(self.riff_size_position))?;
        let riff_size = (end_position - self.riff_size_position - 4) as u32;
        self.inner.write_all(&riff_size.to_le_bytes())?;

        self.inner.seek(SeekFrom::Start(end_position))?;
        self.inner.flush()?;
        self.closed = true;
        Ok(())
    }
}

impl<W: Write + Seek> Drop for Writer<W> {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!("WAV writer dropped without an explicit close(); flushing best-effort");
            let _ = self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn new_in_memory(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Writer<Cursor<Vec<u8>>> {
        Writer::new(Cursor::new(Vec::new()), sample_rate, channels, bits_per_sample).unwrap()
    }

    #[test]
    fn header_chunk_ids_are_correct() {
        let mut writer = new_in_memory(48_000, 1, 8);
        writer.inner.flush().unwrap();
        let bytes = writer.inner.get_ref().get_ref().clone();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[36..40], b"data");
    }

    #[test]
    fn close_back_patches_sizes() {
        let mut writer = new_in_memory(48_000, 1, 8);
        writer.write_samples(&[128, 129, 130]).unwrap();
        writer.finish().unwrap();
        let bytes = writer.inner.get_ref().get_ref().clone();
        let data_size = u32::from_le_bytes(bytes[40..44].try_into().unwrap());
        assert_eq!(data_size, 3);
        let riff_size = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        assert_eq!(riff_size, bytes.len() as u32 - 8);
    }

    #[test]
    fn data_chunk_size_law_p6() {
        let mut writer = new_in_memory(48_000, 2, 16);
        writer.write_samples(&[0, 100, -100]).unwrap();
        assert_eq!(writer.samples_written(), 3);
        writer.finish().unwrap();
        let bytes = writer.inner.get_ref().get_ref().clone();
        let data_size = u32::from_le_bytes(bytes[40..44].try_into().unwrap());
        // 3 samples * 2 channels * 2 bytes/sample
        assert_eq!(data_size, 3 * 2 * 2);
    }

    #[test]
    fn silence_samples_are_centre_value() {
        let mut writer = new_in_memory(1000, 1, 8);
        writer.write_silence(0.01).unwrap();
        assert_eq!(writer.samples_written(), 10);
    }

    #[test]
    fn sticky_error_blocks_further_writes() {
        let mut writer = new_in_memory(48_000, 1, 8);
        writer.sticky_error = true;
        assert!(writer.write_samples(&[128]).is_err());
        assert!(writer.write_silence(0.1).is_err());
    }
}
