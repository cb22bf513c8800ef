//! The current evaluator: net node currents and the scalar score.

use crate::circuit::Circuit;

impl Circuit {
    /// Recompute every component current and every node's net current for
    /// the present voltage vector, and return the root-mean-square current
    /// error in nanoamps.
    ///
    /// Linear amps contribute nothing here: their inputs are virtual grounds
    /// and their outputs are current sinks with unknown voltages to be
    /// solved. Comparators contribute nothing either: their binary output
    /// voltages only change between samples, once the solver has stabilized.
    pub(crate) fn update_currents(&mut self, dt: f64) -> f64 {
        self.total_current_updates += 1;

        for n in &mut self.nodes {
            n.current = 0.0;
        }

        // Each resistor current immediately reflects the voltage drop
        // across the resistor.
        for r in &mut self.resistors {
            let va = self.nodes[r.a_node.0].voltage[0];
            let vb = self.nodes[r.b_node.0].voltage[0];
            r.current = (va - vb) / r.resistance;
            self.nodes[r.a_node.0].current -= r.current;
            self.nodes[r.b_node.0].current += r.current;
        }

        // Capacitor currents derive from the change in the voltage drop
        // over the step interval.
        for c in &mut self.capacitors {
            let a = c.a_node.0;
            let b = c.b_node.0;
            let dv = (self.nodes[a].voltage[0] - self.nodes[b].voltage[0])
                - (self.nodes[a].voltage[1] - self.nodes[b].voltage[1]);
            c.current[0] = c.step_current(dv, dt);
            self.nodes[a].current -= c.current[0];
            self.nodes[b].current += c.current[0];
        }

        // Score the solution. Current-sink nodes (ground, forced sources,
        // amplifier outputs) act collectively as a single return path: each
        // may absorb an arbitrary current, but the sum over all of them must
        // cancel to preserve the total charge in the circuit.
        let mut score = 0.0;
        let mut sink = 0.0;
        for n in &self.nodes {
            if n.current_sink {
                sink += n.current;
            } else {
                score += n.current * n.current;
            }
        }
        score += sink * sink;

        let rms = 1.0e9 * score.sqrt();
        debug_assert!(rms.is_finite(), "non-finite rms current error");
        rms
    }
}

#[cfg(test)]
mod tests {
    use crate::circuit::Circuit;

    #[test]
    fn resistor_current_follows_voltage_drop() {
        let mut circuit = Circuit::new();
        let a = circuit.create_forced_voltage_node(2.0).unwrap();
        let b = circuit.create_ground_node().unwrap();
        let r = circuit.add_resistor(1000.0, a, b).unwrap();
        circuit.lock();

        circuit.update_currents(1.0 / 44100.0);
        assert_eq!(circuit.resistor(r).unwrap().current, 2.0e-3);
    }

    #[test]
    fn score_counts_unforced_node_imbalance() {
        // A lone resistor from a 1 V source to an open node: the open node
        // cannot absorb the 1 mA, so the score reports it.
        let mut circuit = Circuit::new();
        let src = circuit.create_forced_voltage_node(1.0).unwrap();
        let open = circuit.create_node().unwrap();
        circuit.add_resistor(1000.0, src, open).unwrap();
        circuit.lock();

        let rms = circuit.update_currents(1.0 / 44100.0);
        // 1 mA imbalance at one node, doubled by the matching sink excess.
        let expected = 1.0e9 * (1.0e-3_f64.powi(2) * 2.0).sqrt();
        assert!((rms - expected).abs() < 1e-3);
    }

    #[test]
    fn balanced_sinks_cancel() {
        // Two forced sources joined by one resistor: both nodes are sinks,
        // their currents are equal and opposite, so the score is zero.
        let mut circuit = Circuit::new();
        let a = circuit.create_forced_voltage_node(5.0).unwrap();
        let b = circuit.create_ground_node().unwrap();
        circuit.add_resistor(1000.0, a, b).unwrap();
        circuit.lock();

        let rms = circuit.update_currents(1.0 / 44100.0);
        assert_eq!(rms, 0.0);
    }
}
