//! Coordinate descent over the unforced node voltages.

use crate::circuit::Circuit;
use crate::{VNEG, VPOS};

impl Circuit {
    /// Assign a trial voltage to a node, honoring op-amp saturation.
    ///
    /// Amplifier output nodes (current sinks whose voltage is unknown)
    /// cannot swing beyond the supply rails, so trial values are clamped to
    /// `[VNEG, VPOS]`. When the linear solution would overshoot a rail, the
    /// output pins there and the search settles on the saturated state.
    pub(crate) fn assign_trial_voltage(&mut self, index: usize, voltage: f64) {
        let n = &mut self.nodes[index];
        n.voltage[0] = if n.current_sink && !n.forced_voltage {
            voltage.clamp(VNEG, VPOS)
        } else {
            voltage
        };
    }

    /// One solver iteration: search along each unforced-node axis in turn,
    /// committing any voltage change that lowers the score.
    ///
    /// Returns the RMS current error of the committed state and a halt flag
    /// that is set when the whole pass produced no improvement, meaning no
    /// further iterations can help.
    pub(crate) fn adjust_node_voltages(&mut self, dt: f64) -> (f64, bool) {
        self.total_adjust_node_voltages_count += 1;

        // Baseline score before changing any voltages, and a saved copy of
        // every voltage so any probe can be rewound.
        let score0 = self.update_currents(dt);
        for n in &mut self.nodes {
            n.saved_voltage = n.voltage[0];
        }

        let delta_voltage = self.config.delta_voltage;
        let step_dilation = self.config.step_dilation;
        let step_contraction = self.config.step_contraction;
        let backtrack_limit = self.config.backtrack_limit;

        // The search space is the vector of all unforced node voltages.
        // Search along each orthogonal axis, one at a time, and only commit
        // a change when it lowers the score.
        let mut best_score = score0;
        for i in 0..self.nodes.len() {
            if self.nodes[i].forced_voltage {
                continue;
            }

            let saved = self.nodes[i].saved_voltage;

            // Does raising the voltage make the score better (smaller)?
            self.assign_trial_voltage(i, saved + delta_voltage);
            let v_plus = self.nodes[i].voltage[0];
            let plus_score = self.update_currents(dt);

            // Does lowering it?
            self.assign_trial_voltage(i, saved - delta_voltage);
            let v_minus = self.nodes[i].voltage[0];
            let minus_score = self.update_currents(dt);

            let mut best_voltage;
            let mut voltage_step;
            if plus_score < score0 && plus_score < minus_score {
                best_score = plus_score;
                best_voltage = v_plus;
                voltage_step = delta_voltage;
            } else if minus_score < score0 && minus_score < plus_score {
                best_score = minus_score;
                best_voltage = v_minus;
                voltage_step = -delta_voltage;
            } else {
                // No improvement along this axis; rewind and move on.
                self.nodes[i].voltage[0] = saved;
                continue;
            }

            // Keep going in the improving direction by an exponentially
            // growing step until the scores stop improving, then shrink the
            // step a bounded number of times to refine.
            let mut backtrack_count = 0;
            while backtrack_count < backtrack_limit {
                self.assign_trial_voltage(i, best_voltage + voltage_step);
                let score1 = self.update_currents(dt);
                if score1 < best_score {
                    best_score = score1;
                    best_voltage = self.nodes[i].voltage[0];
                    voltage_step *= step_dilation;
                } else {
                    voltage_step /= step_contraction;
                    backtrack_count += 1;
                }
            }

            // Commit the improved voltage and move to the next axis.
            self.nodes[i].voltage[0] = best_voltage;
        }

        let halt = best_score == score0;

        // Re-evaluate at the committed state so every component current
        // reflects the final voltage vector rather than the last probe.
        let rms = self.update_currents(dt);
        (rms, halt)
    }
}
