use criterion::{criterion_group, criterion_main, Criterion};
use slothsim::TorporSlothCircuit;

fn build_sloth() -> TorporSlothCircuit {
    let mut circuit = TorporSlothCircuit::new().unwrap();
    circuit.set_control_voltage(-1.3).unwrap();
    circuit.set_knob_position(0.25).unwrap();
    // Settle the startup transient so the bench measures steady state.
    for _ in 0..1000 {
        circuit.update(44100.0).unwrap();
    }
    circuit
}

fn bench_sloth_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("torpor_sloth");
    let mut circuit = build_sloth();

    // Real-time audio at 44.1 kHz leaves about 22.7 us per sample.
    group.bench_function("update_44k1", |b| {
        b.iter(|| circuit.update(44100.0).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_sloth_update);
criterion_main!(benches);
