use rand::Rng;

/// Bernoulli gate deciding which calls get timed.
///
/// Each call to [`SampleGate::admit`] is an independent draw; the gate keeps
/// no counter between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGate {
    rate: f64,
}

impl SampleGate {
    /// Rates are taken as given: `>= 1.0` admits every call, `<= 0.0` (or NaN)
    /// admits none.
    pub const fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub const fn always() -> Self {
        Self::new(1.0)
    }

    pub const fn never() -> Self {
        Self::new(0.0)
    }
}

impl SampleGate {
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    pub fn admit(&self) -> bool {
        self.admit_with(&mut rand::thread_rng())
    }

    /// Draw from `rng` instead of the thread-local generator
    pub fn admit_with<R: Rng>(&self, rng: &mut R) -> bool {
        rng.r#gen::<f64>() < self.rate
    }
}

impl Default for SampleGate {
    fn default() -> Self {
        Self::always()
    }
}
