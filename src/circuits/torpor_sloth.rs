//! The Torpor Sloth chaotic oscillator.
//!
//! A slow chaotic circuit built from three integrating op-amp stages and
//! one comparator. The x, y, and z outputs drift around a bounded,
//! non-repeating orbit at sub-audio rates, which makes the circuit a good
//! modulation source: it must run for hours at audio sample rates without
//! diverging.

use crate::circuit::{Circuit, NodeId, ResistorId};
use crate::error::Result;
use crate::solver::SolutionResult;
use crate::{PerformanceStats, VNEG, VPOS};

/// Base value of the variable resistor chain [ohms]: a 100 kΩ fixed
/// resistor in series with a 10 kΩ potentiometer.
const KNOB_BASE_RESISTANCE: f64 = 100.0e3;

/// Full-scale travel of the 10 kΩ potentiometer [ohms].
const KNOB_SPAN_RESISTANCE: f64 = 10.0e3;

/// A ready-to-run Torpor Sloth circuit.
///
/// Construction builds the fixed topology, locks it, and retains handles to
/// the control knob, the control-voltage input node, and the three output
/// nodes.
#[derive(Debug)]
pub struct TorporSlothCircuit {
    circuit: Circuit,
    variable_resistor: ResistorId,
    control_node: NodeId,
    x_node: NodeId,
    y_node: NodeId,
    z_node: NodeId,
}

impl TorporSlothCircuit {
    /// Build and lock the oscillator.
    pub fn new() -> Result<Self> {
        let mut circuit = Circuit::new();

        let ng = circuit.create_ground_node()?;
        let n1 = circuit.create_node()?;
        let n2 = circuit.create_node()?;
        let n3 = circuit.create_node()?;
        let n4 = circuit.create_node()?;
        let n5 = circuit.create_node()?;
        let n6 = circuit.create_node()?;
        let n7 = circuit.create_node()?;
        let n8 = circuit.create_node()?;
        let n9 = circuit.create_forced_voltage_node(0.0)?; // CV input node

        circuit.add_linear_amp(n1, n2)?; // U3
        circuit.add_linear_amp(n4, n5)?; // U4
        circuit.add_linear_amp(n6, n7)?; // U2
        circuit.add_comparator(n7, n8)?; // U1

        circuit.add_resistor(1.0e6, n1, n7)?; // R1
        circuit.add_resistor(4.7e6, n1, n8)?; // R2
        let variable_resistor = circuit.add_resistor(KNOB_BASE_RESISTANCE, n1, n3)?; // R3 + R9
        circuit.add_resistor(100.0e3, n6, n7)?; // R4
        circuit.add_resistor(100.0e3, n5, n6)?; // R5
        circuit.add_resistor(100.0e3, n2, n3)?; // R6
        circuit.add_resistor(100.0e3, n3, n4)?; // R7
        circuit.add_resistor(470.0e3, n9, n6)?; // R8

        circuit.add_capacitor(2.0e-6, n1, n2)?; // C1
        circuit.add_capacitor(1.0e-6, n4, n5)?; // C2
        circuit.add_capacitor(50.0e-6, n3, ng)?; // C3

        circuit.lock();

        // The tight op-amp feedback in this circuit rewards running the
        // solver to its convergence floor on every step.
        circuit.config.rms_current_error_tolerance_nano_amps = 1.0e-4;

        Ok(Self {
            circuit,
            variable_resistor,
            control_node: n9,
            x_node: n2,
            y_node: n5,
            z_node: n7,
        })
    }

    /// Set the variable resistor from a knob position, clamped to `[0, 1]`.
    pub fn set_knob_position(&mut self, fraction: f64) -> Result<()> {
        let clamped = fraction.clamp(0.0, 1.0);
        self.circuit.resistor_mut(self.variable_resistor)?.resistance =
            KNOB_BASE_RESISTANCE + clamped * KNOB_SPAN_RESISTANCE;
        Ok(())
    }

    /// Set the control voltage, clamped to the supply rails.
    pub fn set_control_voltage(&mut self, cv: f64) -> Result<()> {
        *self.circuit.node_voltage_mut(self.control_node)? = cv.clamp(VNEG, VPOS);
        Ok(())
    }

    /// The x output voltage (first integrator stage).
    pub fn x_voltage(&self) -> f64 {
        self.circuit.node_voltage(self.x_node)
    }

    /// The y output voltage (second integrator stage).
    pub fn y_voltage(&self) -> f64 {
        self.circuit.node_voltage(self.y_node)
    }

    /// The z output voltage (third integrator stage).
    pub fn z_voltage(&self) -> f64 {
        self.circuit.node_voltage(self.z_node)
    }

    /// Advance the oscillator by one audio sample.
    pub fn update(&mut self, audio_sample_rate_hz: f64) -> Result<SolutionResult> {
        self.circuit.update(audio_sample_rate_hz)
    }

    /// Reset dynamic state for a fresh run. The knob and control voltage
    /// are preserved.
    pub fn initialize(&mut self) {
        self.circuit.initialize();
    }

    /// Snapshot of the cumulative performance counters.
    pub fn performance_stats(&self) -> PerformanceStats {
        self.circuit.performance_stats()
    }

    /// Borrow the underlying circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Borrow the underlying circuit mutably, e.g. to adjust tunables.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_matches_the_schematic() {
        use crate::circuit::{CapacitorId, ComparatorId, LinearAmpId};

        let sloth = TorporSlothCircuit::new().unwrap();
        let circuit = sloth.circuit();
        assert_eq!(circuit.node_count(), 10);
        assert_eq!(circuit.resistor_count(), 8);
        assert_eq!(circuit.capacitor_count(), 3);
        assert_eq!(circuit.linear_amp_count(), 3);
        assert_eq!(circuit.comparator_count(), 1);
        assert!(circuit.is_locked());

        // U3 integrates from node 1 onto node 2; U1 squares up node 7.
        let u3 = circuit.linear_amp(LinearAmpId(0)).unwrap();
        assert_eq!((u3.neg_node, u3.out_node), (NodeId(1), NodeId(2)));
        let u1 = circuit.comparator(ComparatorId(0)).unwrap();
        assert_eq!((u1.neg_node, u1.out_node), (NodeId(7), NodeId(8)));

        let c3 = circuit.capacitor(CapacitorId(2)).unwrap();
        assert_eq!(c3.capacitance, 50.0e-6);
    }

    #[test]
    fn knob_position_is_clamped() {
        let mut sloth = TorporSlothCircuit::new().unwrap();

        sloth.set_knob_position(-1.0).unwrap();
        let id = sloth.variable_resistor;
        assert_eq!(sloth.circuit().resistor(id).unwrap().resistance, 100.0e3);

        sloth.set_knob_position(2.0).unwrap();
        assert_eq!(sloth.circuit().resistor(id).unwrap().resistance, 110.0e3);

        sloth.set_knob_position(0.5).unwrap();
        assert_eq!(sloth.circuit().resistor(id).unwrap().resistance, 105.0e3);
    }

    #[test]
    fn control_voltage_is_clamped_to_the_rails() {
        let mut sloth = TorporSlothCircuit::new().unwrap();

        sloth.set_control_voltage(-99.0).unwrap();
        assert_eq!(sloth.circuit().node_voltage(sloth.control_node), VNEG);

        sloth.set_control_voltage(99.0).unwrap();
        assert_eq!(sloth.circuit().node_voltage(sloth.control_node), VPOS);

        sloth.set_control_voltage(-1.3).unwrap();
        assert_eq!(sloth.circuit().node_voltage(sloth.control_node), -1.3);
    }
}
