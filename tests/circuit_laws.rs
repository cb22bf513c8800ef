//! Cross-cutting laws: history shifts, counters, determinism, resets.

use slothsim::{Circuit, CircuitError, NodeId, SolutionResult, TorporSlothCircuit};

const SAMPLE_RATE: f64 = 44100.0;

/// A small RC network with one free node, so every update does real work.
fn rc_divider() -> (Circuit, NodeId) {
    let mut circuit = Circuit::new();
    let top = circuit.create_forced_voltage_node(3.0).unwrap();
    let mid = circuit.create_node().unwrap();
    let ground = circuit.create_ground_node().unwrap();
    circuit.add_resistor(1000.0, top, mid).unwrap();
    circuit.add_resistor(2000.0, mid, ground).unwrap();
    circuit.add_capacitor(1.0e-6, mid, ground).unwrap();
    circuit.lock();
    (circuit, mid)
}

#[test]
fn voltage_history_shifts_one_slot_per_update() {
    let (mut circuit, mid) = rc_divider();

    let mut previous = Vec::new();
    for _ in 0..5 {
        circuit.update(SAMPLE_RATE).unwrap();
        previous.push(circuit.node_voltage(mid));
    }

    let history = circuit.node(mid).unwrap().voltage;
    let n = previous.len();
    assert_eq!(history[0], previous[n - 1]);
    assert_eq!(history[1], previous[n - 2]);
    assert_eq!(history[2], previous[n - 3]);
}

#[test]
fn performance_stats_match_the_sum_of_solution_results() {
    let (mut circuit, _) = rc_divider();

    let mut total = SolutionResult::default();
    let updates = 50;
    for _ in 0..updates {
        let result = circuit.update(SAMPLE_RATE).unwrap();
        total.adjust_node_voltages_count += result.adjust_node_voltages_count;
        total.current_updates += result.current_updates;
    }

    let stats = circuit.performance_stats();
    assert_eq!(stats.total_samples, updates);
    assert_eq!(
        stats.total_adjust_node_voltages_count,
        total.adjust_node_voltages_count
    );
    assert_eq!(stats.total_current_updates, total.current_updates);
    assert!(
        (stats.simulation_time_seconds - updates as f64 / SAMPLE_RATE).abs() < 1e-12
    );

    let expected_mean = total.adjust_node_voltages_count as f64 / updates as f64;
    assert_eq!(stats.mean_adjust_node_voltages_per_sample(), expected_mean);
}

#[test]
fn kirchhoff_holds_at_every_unforced_node() {
    let (mut circuit, _) = rc_divider();

    let result = circuit.update(SAMPLE_RATE).unwrap();
    let bound = result.rms_current_error * 1.0e-9; // nA -> A

    for i in 0..circuit.node_count() {
        let node = circuit.node(NodeId(i)).unwrap();
        if !node.current_sink {
            assert!(
                node.current.abs() <= bound,
                "node {i} leaks {} A",
                node.current
            );
        }
    }

    // The solver never touches forced voltages.
    assert_eq!(circuit.node_voltage(NodeId(0)), 3.0);
}

#[test]
fn resistor_currents_reflect_the_final_voltages() {
    let (mut circuit, _) = rc_divider();
    circuit.update(SAMPLE_RATE).unwrap();

    for i in 0..circuit.resistor_count() {
        let r = circuit.resistor(slothsim::circuit::ResistorId(i)).unwrap();
        let drop = circuit.node_voltage(r.a_node) - circuit.node_voltage(r.b_node);
        assert_eq!(r.current, drop / r.resistance);
    }
}

#[test]
fn identical_circuits_produce_bit_identical_traces() {
    let mut a = TorporSlothCircuit::new().unwrap();
    let mut b = TorporSlothCircuit::new().unwrap();
    for sloth in [&mut a, &mut b] {
        sloth.set_control_voltage(-1.3).unwrap();
        sloth.set_knob_position(0.25).unwrap();
    }

    for _ in 0..200 {
        a.update(SAMPLE_RATE).unwrap();
        b.update(SAMPLE_RATE).unwrap();
        assert_eq!(a.x_voltage().to_bits(), b.x_voltage().to_bits());
        assert_eq!(a.y_voltage().to_bits(), b.y_voltage().to_bits());
        assert_eq!(a.z_voltage().to_bits(), b.z_voltage().to_bits());
    }
}

#[test]
fn initialize_restores_the_first_run_exactly() {
    let mut sloth = TorporSlothCircuit::new().unwrap();
    sloth.set_control_voltage(-1.3).unwrap();
    sloth.set_knob_position(0.25).unwrap();

    let mut first_run = Vec::new();
    for _ in 0..100 {
        sloth.update(SAMPLE_RATE).unwrap();
        first_run.push((sloth.x_voltage(), sloth.y_voltage(), sloth.z_voltage()));
    }

    sloth.initialize();
    assert_eq!(sloth.performance_stats().total_samples, 0);

    for expected in &first_run {
        sloth.update(SAMPLE_RATE).unwrap();
        let replay = (sloth.x_voltage(), sloth.y_voltage(), sloth.z_voltage());
        assert_eq!(replay, *expected);
    }
}

#[test]
fn starved_retry_limit_raises_convergence_failure() {
    let mut circuit = Circuit::new();
    let top = circuit.create_forced_voltage_node(3.0).unwrap();
    let n1 = circuit.create_node().unwrap();
    let n2 = circuit.create_node().unwrap();
    let ground = circuit.create_ground_node().unwrap();
    circuit.add_resistor(1000.0, top, n1).unwrap();
    circuit.add_resistor(1000.0, n1, n2).unwrap();
    circuit.add_resistor(1000.0, n2, ground).unwrap();
    circuit.config.retry_limit = 1;
    circuit.config.rms_current_error_tolerance_nano_amps = 1.0e-12;
    circuit.lock();

    // From a cold start, one iteration improves the solution (so the solver
    // does not halt) but cannot possibly reach the absurd tolerance.
    let err = circuit.update(SAMPLE_RATE).unwrap_err();
    assert!(matches!(err, CircuitError::ConvergenceFailure { .. }));

    // A failed sample leaves the counters untouched.
    assert_eq!(circuit.performance_stats().total_samples, 0);
}
