//! Audio output for the CLI frontend.
//!
//! Writes raw PCM to stdout so the renderer can be piped straight into
//! ffmpeg or any other tool that accepts headerless f32le audio.

use std::io::{self, Write};

use crate::circuits::TorporSlothCircuit;
use crate::error::{CircuitError, Result};
use crate::VPOS;

/// Buffer size for audio output (in frames).
pub const BUFFER_SIZE: usize = 256;

/// Number of interleaved channels per frame (x and y oscillator outputs).
pub const CHANNELS: usize = 2;

/// Audio output writer to stdout.
pub struct AudioOutput {
    buffer: Vec<u8>,
}

impl AudioOutput {
    /// Create a new audio output writer.
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; BUFFER_SIZE * CHANNELS * 4], // 4 bytes per f32
        }
    }

    /// Write a block of interleaved samples to stdout.
    pub fn write_block(&mut self, samples: &[f32]) -> Result<()> {
        let bytes_needed = samples.len() * 4;
        if self.buffer.len() < bytes_needed {
            self.buffer.resize(bytes_needed, 0);
        }

        for (i, &sample) in samples.iter().enumerate() {
            self.buffer[i * 4..i * 4 + 4].copy_from_slice(&sample.to_le_bytes());
        }

        io::stdout()
            .write_all(&self.buffer[..bytes_needed])
            .map_err(|e| CircuitError::AudioOutputError {
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Flush the output stream.
    pub fn flush(&mut self) -> Result<()> {
        io::stdout()
            .flush()
            .map_err(|e| CircuitError::AudioOutputError {
                message: e.to_string(),
            })
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the oscillator's x/y outputs as interleaved stereo f32le frames
/// on stdout, normalized to the supply rails.
pub fn render(circuit: &mut TorporSlothCircuit, sample_rate_hz: f64, seconds: f64) -> Result<()> {
    let mut output = AudioOutput::new();
    let mut samples = Vec::with_capacity(BUFFER_SIZE * CHANNELS);

    let total_frames = (seconds * sample_rate_hz).round().max(0.0) as u64;
    let scale = (1.0 / VPOS) as f32;

    let mut frames_written = 0u64;
    while frames_written < total_frames {
        samples.clear();
        let block = BUFFER_SIZE.min((total_frames - frames_written) as usize);
        for _ in 0..block {
            circuit.update(sample_rate_hz)?;
            samples.push(circuit.x_voltage() as f32 * scale);
            samples.push(circuit.y_voltage() as f32 * scale);
        }
        output.write_block(&samples)?;
        frames_written += block as u64;
    }

    output.flush()
}
