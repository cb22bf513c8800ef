//! Slothsim - renders the Torpor Sloth chaotic oscillator as raw audio.
//!
//! # Usage
//!
//! ```bash
//! slothsim --seconds 30 | ffmpeg -f f32le -ac 2 -ar 44100 -i - sloth.wav
//! ```

use clap::Parser;
use slothsim::{error::Result, TorporSlothCircuit};

/// Chaotic analog oscillator renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Duration to render, in seconds
    #[arg(short = 'n', long, default_value_t = 10.0)]
    seconds: f64,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = 44100.0)]
    sample_rate: f64,

    /// Knob position for the variable resistor, 0.0 to 1.0
    #[arg(short, long, default_value_t = 0.25)]
    knob: f64,

    /// Control voltage in volts, clamped to the supply rails
    #[arg(short, long, default_value_t = -1.3)]
    control_voltage: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut circuit = TorporSlothCircuit::new()?;
    circuit.set_knob_position(args.knob)?;
    circuit.set_control_voltage(args.control_voltage)?;

    slothsim::audio::render(&mut circuit, args.sample_rate, args.seconds)?;

    let stats = circuit.performance_stats();
    eprintln!(
        "rendered {:.3} s in {} samples; mean iterations/sample = {:.3}, mean current updates/sample = {:.1}",
        stats.simulation_time_seconds,
        stats.total_samples,
        stats.mean_adjust_node_voltages_per_sample(),
        stats.mean_current_updates_per_sample(),
    );

    Ok(())
}
