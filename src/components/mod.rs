//! Component models for circuit simulation.
//!
//! The component set is intentionally small and idealized:
//! - Passive: [`Resistor`], [`Capacitor`]
//! - Active: [`LinearAmp`], [`Comparator`]
//!
//! Components live in parallel collections inside the circuit and are
//! evaluated in insertion order; they carry no behavior of their own beyond
//! their dynamic current state.

mod linear;
mod opamp;

pub use linear::{Capacitor, Resistor};
pub use opamp::{Comparator, LinearAmp, COMPARATOR_HI_VOLTAGE, COMPARATOR_LO_VOLTAGE};
