//! Modulation configuration: the parameter surface for turning a [`Container`]
//! into audio, plus the small preset-resolution mechanism described in the
//! system overview as the "Preset bundle" component.
//!
//! [`Container`]: crate::structs::container::Container

use crate::utils::errors::ConfigError;

/// Per-cycle waveform shape for the FSK carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Trapezoid,
}

/// Every tunable parameter of the tape modulator (spec §3's Configuration
/// table). All fields have a designated default, reachable via
/// [`ModulationConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationConfig {
    /// Symbol rate in bits/second: 1200 (standard) or 2400 (turbo).
    pub baud: u32,
    /// Samples per second; must be a positive multiple of 1200.
    pub sample_rate: u32,
    pub waveform: Waveform,
    /// Percentage of a trapezoid half-cycle spent ramping, 1..=50. Ignored
    /// unless `waveform == Waveform::Trapezoid`.
    pub trapezoid_rise_pct: u8,
    /// Peak deviation from centre: 1..=127 for 8-bit, 1..=255 for 16-bit.
    pub amplitude: u16,
    pub bits_per_sample: u16,
    pub channels: u16,
    /// Silence, in seconds, inserted before a file-header block.
    pub long_silence: f64,
    /// Silence, in seconds, inserted before a data block.
    pub short_silence: f64,
    /// Single-pole IIR low-pass cutoff in Hz, or `None` to disable.
    pub low_pass_cutoff_hz: Option<u32>,
    /// Whether to emit cue points and labels into the WAV file.
    pub markers: bool,
}

impl Default for ModulationConfig {
    fn default() -> Self {
        Self {
            baud: 1200,
            sample_rate: 43_200,
            waveform: Waveform::Sine,
            trapezoid_rise_pct: 10,
            amplitude: 120,
            bits_per_sample: 8,
            channels: 1,
            long_silence: 2.0,
            short_silence: 1.0,
            low_pass_cutoff_hz: None,
            markers: false,
        }
    }
}

impl ModulationConfig {
    /// Maximum representable amplitude for the configured bit depth.
    pub fn max_amplitude(&self) -> u16 {
        if self.bits_per_sample == 8 { 127 } else { 255 }
    }

    /// Validates every field against spec §3's stated ranges, independent
    /// of any particular container being modulated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud != 1200 && self.baud != 2400 {
            return Err(ConfigError::InvalidBaud(self.baud));
        }
        if self.sample_rate == 0 || self.sample_rate % 1200 != 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.bits_per_sample != 8 && self.bits_per_sample != 16 {
            return Err(ConfigError::InvalidBitsPerSample(self.bits_per_sample));
        }
        if self.channels != 1 && self.channels != 2 {
            return Err(ConfigError::InvalidChannels(self.channels));
        }
        if self.amplitude == 0 {
            return Err(ConfigError::ZeroAmplitude);
        }
        let max = self.max_amplitude();
        if self.amplitude > max {
            return Err(ConfigError::AmplitudeOutOfRange {
                amplitude: self.amplitude,
                bits_per_sample: self.bits_per_sample,
                max,
            });
        }
        if self.waveform == Waveform::Trapezoid
            && !(1..=50).contains(&self.trapezoid_rise_pct)
        {
            return Err(ConfigError::InvalidTrapezoidRise(self.trapezoid_rise_pct));
        }
        if let Some(cutoff) = self.low_pass_cutoff_hz {
            if cutoff == 0 {
                return Err(ConfigError::InvalidLowPassCutoff(cutoff));
            }
        }
        Ok(())
    }
}

/// A named, immutable parameter bundle.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub config: ModulationConfig,
}

/// The built-in preset table. This is the resolution mechanism only — not
/// the full descriptive CLI preset catalogue (names, categories, rationale
/// text), which is an external consumer's concern.
pub fn presets() -> &'static [Preset] {
    const STANDARD: ModulationConfig = ModulationConfig {
        baud: 1200,
        sample_rate: 43_200,
        waveform: Waveform::Sine,
        trapezoid_rise_pct: 10,
        amplitude: 120,
        bits_per_sample: 8,
        channels: 1,
        long_silence: 2.0,
        short_silence: 1.0,
        low_pass_cutoff_hz: None,
        markers: false,
    };
    const TURBO: ModulationConfig = ModulationConfig {
        baud: 2400,
        ..STANDARD
    };
    const CONSERVATIVE: ModulationConfig = ModulationConfig {
        long_silence: 3.0,
        short_silence: 2.0,
        ..STANDARD
    };
    const COMPUTER_DIRECT: ModulationConfig = ModulationConfig {
        low_pass_cutoff_hz: Some(6000),
        ..STANDARD
    };

    &[
        Preset { name: "standard", config: STANDARD },
        Preset { name: "turbo", config: TURBO },
        Preset { name: "conservative", config: CONSERVATIVE },
        Preset { name: "computer-direct", config: COMPUTER_DIRECT },
    ]
}

pub fn find_preset(name: &str) -> Option<&'static Preset> {
    presets().iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Explicit per-field overrides to layer over a preset's defaults.
///
/// `low_pass_cutoff_hz` is doubly-optional: `None` means "don't override",
/// `Some(None)` means "explicitly force low-pass off", `Some(Some(hz))`
/// means "explicitly set this cutoff".
#[derive(Debug, Clone, Copy, Default)]
pub struct ModulationOverrides {
    pub baud: Option<u32>,
    pub sample_rate: Option<u32>,
    pub waveform: Option<Waveform>,
    pub trapezoid_rise_pct: Option<u8>,
    pub amplitude: Option<u16>,
    pub bits_per_sample: Option<u16>,
    pub channels: Option<u16>,
    pub long_silence: Option<f64>,
    pub short_silence: Option<f64>,
    pub low_pass_cutoff_hz: Option<Option<u32>>,
    pub markers: Option<bool>,
}

impl ModulationOverrides {
    /// Merges these overrides over `base`, returning a fully-resolved
    /// config. Fields left as `None` in the overrides pass `base` through
    /// unchanged.
    pub fn resolve(&self, base: ModulationConfig) -> ModulationConfig {
        ModulationConfig {
            baud: self.baud.unwrap_or(base.baud),
            sample_rate: self.sample_rate.unwrap_or(base.sample_rate),
            waveform: self.waveform.unwrap_or(base.waveform),
            trapezoid_rise_pct: self.trapezoid_rise_pct.unwrap_or(base.trapezoid_rise_pct),
            amplitude: self.amplitude.unwrap_or(base.amplitude),
            bits_per_sample: self.bits_per_sample.unwrap_or(base.bits_per_sample),
            channels: self.channels.unwrap_or(base.channels),
            long_silence: self.long_silence.unwrap_or(base.long_silence),
            short_silence: self.short_silence.unwrap_or(base.short_silence),
            low_pass_cutoff_hz: self.low_pass_cutoff_hz.unwrap_or(base.low_pass_cutoff_hz),
            markers: self.markers.unwrap_or(base.markers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ModulationConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_baud() {
        let config = ModulationConfig { baud: 1000, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::InvalidBaud(1000)));
    }

    #[test]
    fn rejects_amplitude_over_8bit_limit() {
        let config = ModulationConfig { amplitude: 200, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AmplitudeOutOfRange { .. })
        ));
    }

    #[test]
    fn find_preset_is_case_insensitive() {
        assert!(find_preset("TURBO").is_some());
        assert!(find_preset("nonexistent").is_none());
    }

    #[test]
    fn overrides_merge_over_preset_defaults() {
        let preset = find_preset("standard").unwrap().config;
        let overrides = ModulationOverrides {
            baud: Some(2400),
            ..Default::default()
        };
        let resolved = overrides.resolve(preset);
        assert_eq!(resolved.baud, 2400);
        assert_eq!(resolved.sample_rate, preset.sample_rate);
    }
}
