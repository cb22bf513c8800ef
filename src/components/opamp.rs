//! Active devices: linear op-amps and comparators.
//!
//! Both devices assume a grounded positive input. Neither contributes any
//! node current during evaluation; their effect is realized entirely through
//! node flags (virtual ground, current sink) and voltage forcing.

use crate::circuit::NodeId;

/// Comparator low-side saturation voltage, measured from a TL074CN stage.
pub const COMPARATOR_LO_VOLTAGE: f64 = -10.64;

/// Comparator high-side saturation voltage, measured from a TL074CN stage.
pub const COMPARATOR_HI_VOLTAGE: f64 = 11.38;

/// An ideal op-amp with a grounded positive input and a virtual ground
/// assumed on the negative input.
///
/// The output is not a forced voltage. It is a current sink whose voltage is
/// an unknown the solver determines, such that the negative input remains a
/// virtual ground.
#[derive(Debug, Clone)]
pub struct LinearAmp {
    pub neg_node: NodeId,
    pub out_node: NodeId,
}

impl LinearAmp {
    /// Create a new linear amplifier.
    pub fn new(neg_node: NodeId, out_node: NodeId) -> Self {
        Self { neg_node, out_node }
    }
}

/// An op-amp driven to saturation: arbitrary negative input, binary output.
///
/// The output voltage is forced to one of the two saturation rails based on
/// the sign of the negative input, and is latched between samples so that it
/// cannot toggle while the solver is still searching.
#[derive(Debug, Clone)]
pub struct Comparator {
    pub neg_node: NodeId,
    pub out_node: NodeId,
}

impl Comparator {
    /// Create a new comparator.
    pub fn new(neg_node: NodeId, out_node: NodeId) -> Self {
        Self { neg_node, out_node }
    }

    /// The saturated output voltage for a given negative-input voltage.
    pub fn output_voltage(neg_voltage: f64) -> f64 {
        if neg_voltage < 0.0 {
            COMPARATOR_HI_VOLTAGE
        } else {
            COMPARATOR_LO_VOLTAGE
        }
    }
}
