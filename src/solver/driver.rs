//! The sample driver: history shifts, extrapolation, comparator latching,
//! and oversampling.

use log::{debug, trace};

use crate::circuit::Circuit;
use crate::components::Comparator;
use crate::error::{CircuitError, Result};

use super::SolutionResult;

impl Circuit {
    /// Advance the simulation by one audio sample.
    ///
    /// Chooses an integer oversample factor so the internal step rate
    /// reaches at least the configured minimum, then runs that many
    /// simulation steps, latching comparator outputs between steps. The
    /// returned [`SolutionResult`] aggregates the solver work across the
    /// oversample steps; its RMS error is from the final step.
    pub fn update(&mut self, audio_sample_rate_hz: f64) -> Result<SolutionResult> {
        self.confirm_can_solve()?;
        if !(audio_sample_rate_hz > 0.0) {
            return Err(CircuitError::range(format!(
                "audio sample rate must be positive, got {audio_sample_rate_hz}"
            )));
        }

        // Round the oversample factor up to the next integer, and make
        // absolutely sure it is at least one.
        let factor = (self.config.min_internal_sampling_rate / audio_sample_rate_hz)
            .ceil()
            .max(1.0) as u32;
        let sim_sampling_rate_hz = f64::from(factor) * audio_sample_rate_hz;

        self.latch_comparator_outputs();

        let mut result = SolutionResult::default();
        for step in 0..factor {
            if self.config.debug {
                debug!(
                    "update: audio sample {}, oversample step {} of {}",
                    self.total_samples, step, factor
                );
            }
            let step_result = self.simulation_step(sim_sampling_rate_hz)?;
            self.latch_comparator_outputs();
            result.adjust_node_voltages_count += step_result.adjust_node_voltages_count;
            result.current_updates += step_result.current_updates;
            result.rms_current_error = step_result.rms_current_error;
        }

        self.total_samples += 1;
        self.simulation_time += 1.0 / audio_sample_rate_hz;
        Ok(result)
    }

    fn confirm_can_solve(&self) -> Result<()> {
        if self.is_locked() {
            Ok(())
        } else {
            Err(CircuitError::unlocked("update"))
        }
    }

    /// One internal simulation step at the (possibly oversampled) rate.
    fn simulation_step(&mut self, sim_sampling_rate_hz: f64) -> Result<SolutionResult> {
        let dt = 1.0 / sim_sampling_rate_hz;

        // Shift the voltage history by one sample. Capacitor currents are
        // based on the rate of change of the voltage across each capacitor,
        // and the history also feeds the extrapolated initial guess below.
        for n in &mut self.nodes {
            for i in (1..n.voltage.len()).rev() {
                n.voltage[i] = n.voltage[i - 1];
            }
        }
        for c in &mut self.capacitors {
            c.current[1] = c.current[0];
        }

        self.extrapolate_unforced_node_voltages();

        let current_updates_before = self.total_current_updates;
        let mut rms_current_error = f64::MAX;
        for count in 1..=self.config.retry_limit {
            let (rms, halt) = self.adjust_node_voltages(dt);
            rms_current_error = rms;
            if self.config.debug {
                debug!("simulation_step({count}): rms = {rms} nA");
                self.log_state();
            }
            if halt || rms < self.config.rms_current_error_tolerance_nano_amps {
                return Ok(SolutionResult {
                    adjust_node_voltages_count: count as u64,
                    current_updates: self.total_current_updates - current_updates_before,
                    rms_current_error: rms,
                });
            }
        }

        Err(CircuitError::ConvergenceFailure {
            sample: self.total_samples,
            iterations: self.config.retry_limit,
            rms_nano_amps: rms_current_error,
        })
    }

    /// Give the solver an initial boost by extrapolating the recent trend
    /// in each unforced node voltage to the next sample.
    fn extrapolate_unforced_node_voltages(&mut self) {
        for i in 0..self.nodes.len() {
            if !self.nodes[i].forced_voltage {
                let v1 = self.nodes[i].voltage[1];
                let v2 = self.nodes[i].voltage[2];
                self.assign_trial_voltage(i, v1 + (v1 - v2));
            }
        }
    }

    /// Latch every comparator output from the present negative-input
    /// voltage.
    ///
    /// Comparator outputs change only between solver steps. This acts as a
    /// one-sample slew limit: an output cannot toggle back and forth while
    /// the solver is searching, which would prevent it from ever settling.
    fn latch_comparator_outputs(&mut self) {
        for k in &self.comparators {
            let neg_voltage = self.nodes[k.neg_node.0].voltage[0];
            self.nodes[k.out_node.0].voltage[0] = Comparator::output_voltage(neg_voltage);
        }
    }

    fn log_state(&self) {
        for (i, n) in self.nodes.iter().enumerate() {
            trace!(
                "{}{} node[{}] voltage={}, current={}",
                if n.forced_voltage { 'F' } else { ' ' },
                if n.current_sink { 'S' } else { ' ' },
                i,
                n.voltage[0],
                n.current
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::circuit::Circuit;
    use crate::error::CircuitError;

    fn divider() -> Circuit {
        let mut circuit = Circuit::new();
        let top = circuit.create_forced_voltage_node(2.0).unwrap();
        let mid = circuit.create_node().unwrap();
        let ground = circuit.create_ground_node().unwrap();
        circuit.add_resistor(1000.0, top, mid).unwrap();
        circuit.add_resistor(1000.0, mid, ground).unwrap();
        circuit
    }

    #[test]
    fn update_rejects_non_positive_sample_rates() {
        let mut circuit = divider();
        circuit.lock();
        assert!(matches!(
            circuit.update(0.0),
            Err(CircuitError::RangeError { .. })
        ));
        assert!(matches!(
            circuit.update(-44100.0),
            Err(CircuitError::RangeError { .. })
        ));
        assert!(matches!(
            circuit.update(f64::NAN),
            Err(CircuitError::RangeError { .. })
        ));
    }

    #[test]
    fn update_requires_lock() {
        let mut circuit = divider();
        assert!(matches!(
            circuit.update(44100.0),
            Err(CircuitError::LockStateViolation { .. })
        ));
    }

    #[test]
    fn oversampling_reaches_the_minimum_internal_rate() {
        let mut circuit = divider();
        // A huge tolerance makes every step converge in one iteration, so
        // the iteration count exposes the oversample factor directly.
        circuit.config.rms_current_error_tolerance_nano_amps = 1e18;
        circuit.lock();

        assert_eq!(circuit.update(44100.0).unwrap().adjust_node_voltages_count, 1);
        assert_eq!(circuit.update(40000.0).unwrap().adjust_node_voltages_count, 1);
        assert_eq!(circuit.update(39999.0).unwrap().adjust_node_voltages_count, 2);
        assert_eq!(circuit.update(8000.0).unwrap().adjust_node_voltages_count, 5);
    }

    #[test]
    fn counters_advance_only_on_successful_samples() {
        let mut circuit = divider();
        circuit.lock();

        assert!(circuit.update(0.0).is_err());
        assert_eq!(circuit.performance_stats().total_samples, 0);

        circuit.update(44100.0).unwrap();
        let stats = circuit.performance_stats();
        assert_eq!(stats.total_samples, 1);
        assert!((stats.simulation_time_seconds - 1.0 / 44100.0).abs() < 1e-15);
    }
}
