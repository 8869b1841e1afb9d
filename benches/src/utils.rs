//! Measurement selection: wall-clock by default, cycles per byte with the `cpb` feature.

use criterion::Criterion;

#[cfg(not(feature = "cpb"))]
pub type Benchmarker = Criterion;

#[cfg(feature = "cpb")]
pub type Benchmarker = Criterion<criterion_cycles_per_byte::CyclesPerByte>;

/// Criterion configuration shared by every benchmark group.
#[cfg(not(feature = "cpb"))]
pub fn config() -> Benchmarker {
    Criterion::default().sample_size(50)
}

/// Criterion configuration shared by every benchmark group.
#[cfg(feature = "cpb")]
pub fn config() -> Benchmarker {
    Criterion::default()
        .sample_size(50)
        .with_measurement(criterion_cycles_per_byte::CyclesPerByte)
}
