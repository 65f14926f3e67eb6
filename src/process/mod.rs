//! The codec's operations: parsing CAS bytes, synthesising waveforms,
//! modulating a container to tape audio, exporting files to disk, auditing
//! for embedded disk-format markers, and estimating audio duration/size.

pub mod audit;
pub mod estimate;
pub mod export;
pub mod modulate;
pub mod parse;
pub mod synth;
