//! Waveform synthesis: one cycle of a chosen shape at a chosen frequency,
//! plus the single-pole low-pass filter the modulator carries across the
//! entire sample stream.

use std::f64::consts::PI;

use crate::structs::config::Waveform;
use crate::utils::errors::SynthError;

/// Produces `⌊sample_rate / frequency⌋` samples of one complete cycle of
/// `waveform`, as deviations from centre in `[-amplitude, +amplitude]`.
///
/// Fails with [`SynthError::FrequencyTooHigh`] if the quotient is zero — no
/// sample would be emitted for a full cycle at this sample rate.
pub fn synth_cycle(
    waveform: Waveform,
    amplitude: i32,
    sample_rate: u32,
    frequency: u32,
    trapezoid_rise_pct: u8,
) -> Result<Vec<f64>, SynthError> {
    let n = sample_rate / frequency;
    if n == 0 {
        return Err(SynthError::FrequencyTooHigh {
            frequency,
            sample_rate,
        });
    }

    let amplitude = amplitude as f64;
    let rise = (trapezoid_rise_pct as f64 / 100.0).min(0.5);

    Ok((0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            match waveform {
                Waveform::Sine => amplitude * (2.0 * PI * t).sin(),
                Waveform::Square => {
                    if t < 0.5 { amplitude } else { -amplitude }
                }
                Waveform::Triangle => {
                    if t < 0.5 {
                        4.0 * amplitude * t - amplitude
                    } else {
                        3.0 * amplitude - 4.0 * amplitude * t
                    }
                }
                Waveform::Trapezoid => trapezoid_value(t, amplitude, rise),
            }
        })
        .collect())
}

fn trapezoid_value(t: f64, amplitude: f64, rise: f64) -> f64 {
    let t1 = rise;
    let t2 = 0.5 - rise;
    let t3 = 0.5 + rise;
    let t4 = 1.0 - rise;

    if t < t1 {
        amplitude * (t / t1)
    } else if t < t2 {
        amplitude
    } else if t < t3 {
        let frac = (t - t2) / (t3 - t2);
        amplitude - 2.0 * amplitude * frac
    } else if t < t4 {
        -amplitude
    } else {
        let frac = (t - t4) / (1.0 - t4);
        -amplitude + amplitude * frac
    }
}

/// Single-pole IIR low-pass, carrying its state across an entire sample
/// stream rather than resetting per cycle.
///
/// `y[n] = alpha * x[n] + (1 - alpha) * y[n-1]`, with `y[-1]` initialised to
/// the stream's centre value.
#[derive(Debug, Clone, Copy)]
pub struct LowPassFilter {
    alpha: f64,
    prev: f64,
}

impl LowPassFilter {
    pub fn new(cutoff_hz: u32, sample_rate: u32, centre: f64) -> Self {
        let omega = 2.0 * PI * cutoff_hz as f64;
        let dt = 1.0 / sample_rate as f64;
        let alpha = (omega * dt) / (1.0 + omega * dt);
        Self { alpha, prev: centre }
    }

    pub fn apply(&mut self, x: f64) -> f64 {
        let y = self.alpha * x + (1.0 - self.alpha) * self.prev;
        self.prev = y;
        y
    }
}
