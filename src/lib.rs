//! Bidirectional codec and inspection toolkit for MSX home-computer
//! cassette archives.
//!
//! ## Technical Overview
//!
//! Two bit-exact artefacts meet here: a CAS container concatenating typed
//! logical files behind fixed 8-byte magic delimiters, and a RIFF/WAVE PCM
//! file carrying the same content as frequency-shift-keyed tones following
//! the MSX BIOS cassette protocol.
//!
//! Only the CAS-to-audio direction is implemented; decoding audio back to
//! CAS is out of scope.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use msxtape::process::{parse, modulate, estimate};
//! use msxtape::structs::config::ModulationConfig;
//! use msxtape::utils::wav::Writer;
//!
//! let bytes = std::fs::read("game.cas")?;
//! let outcome = parse::parse(&bytes);
//!
//! let config = ModulationConfig::default();
//! let duration = estimate::estimate_duration_secs(&outcome.container, &config);
//! println!("expected duration: {duration:.2}s");
//!
//! let mut writer = Writer::create("game.wav", config.sample_rate, config.channels, config.bits_per_sample)?;
//! modulate::modulate(&outcome.container, &config, &mut writer)?;
//! writer.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Little-endian wire-format serialization helpers, used by the fixed-layout
/// structs in [`structs::container`] and the chunk headers in [`utils::wav`].
pub mod byteorder;

/// The codec's operations.
///
/// - **Parsing** ([`process::parse`]): recovers a [`structs::container::Container`] from CAS bytes.
/// - **Synthesis** ([`process::synth`]): one cycle of a carrier waveform, plus the low-pass filter.
/// - **Modulation** ([`process::modulate`]): composes a full tape program onto a [`utils::wav::Writer`].
/// - **Export** ([`process::export`]): writes a parsed file back to disk in its on-disk layout.
/// - **Auditing** ([`process::audit`]): flags embedded disk-format marker bytes.
/// - **Estimation** ([`process::estimate`]): closed-form duration and size without synthesising samples.
pub mod process;

/// Typed data model.
///
/// - **Container** ([`structs::container`]): the parsed sequence of files.
/// - **Configuration** ([`structs::config`]): modulation parameters and presets.
pub mod structs;

/// Supporting infrastructure.
///
/// - **ByteCursor** ([`utils::cursor`]): bounds-checked forward reader.
/// - **WAV writer** ([`utils::wav`]): RIFF/WAVE PCM output with cue markers.
/// - **Errors** ([`utils::errors`]): the per-subsystem error taxonomy.
pub mod utils;
