//! # Slothsim
//!
//! An audio-rate analog circuit simulator for chaotic oscillators.
//!
//! This library simulates idealized analog circuits built from resistors,
//! capacitors, linear operational amplifiers, and comparators. Instead of
//! assembling a nodal matrix, it solves Kirchhoff's current law directly:
//! at every output sample an iterative solver perturbs the unknown node
//! voltages until the net current error at every unforced node falls below
//! a tolerance measured in nanoamps.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - Circuit topology, node flags, and the build/lock lifecycle
//! - [`components`] - Component models (resistors, capacitors, op-amps, comparators)
//! - [`solver`] - Current evaluator, coordinate-descent solver, and sample driver
//! - [`circuits`] - Prebuilt circuits, including the Torpor Sloth chaotic oscillator
//! - [`audio`] - Raw PCM output for the CLI renderer (CLI only)
//!
//! ## Usage
//!
//! ```
//! use slothsim::Circuit;
//!
//! let mut circuit = Circuit::new();
//! let supply = circuit.create_forced_voltage_node(3.0)?;
//! let tap = circuit.create_node()?;
//! let ground = circuit.create_ground_node()?;
//! circuit.add_resistor(1000.0, supply, tap)?;
//! circuit.add_resistor(2000.0, tap, ground)?;
//! circuit.lock();
//!
//! circuit.update(44100.0)?;
//! assert!((circuit.node_voltage(tap) - 2.0).abs() < 1e-5);
//! # Ok::<(), slothsim::CircuitError>(())
//! ```
//!
//! ### Native CLI
//!
//! With the `cli` feature, the `slothsim` binary renders the Torpor Sloth
//! oscillator's x/y outputs as interleaved stereo f32le PCM on stdout:
//!
//! ```bash
//! slothsim --seconds 30 | ffmpeg -f f32le -ac 2 -ar 44100 -i - sloth.wav
//! ```
//!
//! ## Simulation Method
//!
//! For each audio sample, the driver oversamples as needed to keep the
//! internal step rate at or above a minimum (40 kHz by default). Each
//! internal step shifts the per-node voltage history, extrapolates an
//! initial guess, and runs a coordinate-descent search over the unforced
//! node voltages. Capacitor currents use the trapezoidal rule over the
//! step interval; comparator outputs are latched between samples so they
//! cannot toggle while the solver is still searching.

pub mod circuit;
pub mod circuits;
pub mod components;
pub mod error;
pub mod solver;

#[cfg(feature = "cli")]
pub mod audio;

// Re-export main types for convenience
pub use circuit::{Circuit, NodeId};
pub use circuits::TorporSlothCircuit;
pub use components::{COMPARATOR_HI_VOLTAGE, COMPARATOR_LO_VOLTAGE};
pub use error::{CircuitError, Result};
pub use solver::{PerformanceStats, SolutionResult, SolverConfig};

/// Positive supply voltage fed to all op-amps [volts].
pub const VPOS: f64 = 12.0;

/// Negative supply voltage fed to all op-amps [volts].
pub const VNEG: f64 = -12.0;
