//! Cyclic triangular learning-rate schedule.
//!
//! The rate climbs linearly from `min_lr` to `max_lr` over `period` steps,
//! falls back over the next `period`, and repeats:
//!
//! ```text
//! cycle = floor(1 + it / (2 * period))
//! x     = |it / period - 2 * cycle + 1|
//! lr    = min_lr + (max_lr - min_lr) * max(0, 1 - x)
//! ```
//!
//! `it` starts at 1, so the first rate is one step above the floor.

/// Infinite iterator of learning rates.
#[derive(Debug, Clone)]
pub struct CyclicTriangularRate {
    min_lr: f64,
    max_lr: f64,
    period: usize,
    it:     usize,
}

impl CyclicTriangularRate {
    /// `period` is the half-cycle length in steps, clamped to at least 1.
    pub fn new(min_lr: f64, max_lr: f64, period: usize) -> Self {
        Self { min_lr, max_lr, period: period.max(1), it: 1 }
    }

    /// Schedule used for fine-tuning: floor `learn_rate / 3`, ceiling
    /// `learn_rate * 3`, half-cycle `2 * train_len / batch_size`.
    pub fn for_training(learn_rate: f64, train_len: usize, batch_size: usize) -> Self {
        let period = 2 * train_len / batch_size.max(1);
        Self::new(learn_rate / 3.0, learn_rate * 3.0, period)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    fn rate_at(&self, it: usize) -> f64 {
        let it     = it as f64;
        let period = self.period as f64;
        let cycle  = (1.0 + it / (2.0 * period)).floor();
        let x      = (it / period - 2.0 * cycle + 1.0).abs();
        let relative = (1.0 - x).max(0.0);
        self.min_lr + (self.max_lr - self.min_lr) * relative
    }
}

impl Iterator for CyclicTriangularRate {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let lr = self.rate_at(self.it);
        self.it += 1;
        Some(lr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_triangle_peaks_and_returns() {
        let rates: Vec<f64> = CyclicTriangularRate::new(1.0, 3.0, 4).take(8).collect();
        // it = 1..=8 with period 4: up to the peak at it=4, back to the floor at it=8
        let expected = [1.5, 2.0, 2.5, 3.0, 2.5, 2.0, 1.5, 1.0];
        for (got, want) in rates.iter().zip(expected) {
            assert!(close(*got, want), "{got} != {want}");
        }
    }

    #[test]
    fn test_cycle_repeats() {
        let rates: Vec<f64> = CyclicTriangularRate::new(0.0, 1.0, 2).take(8).collect();
        assert!(close(rates[1], rates[5]));
        assert!(close(rates[3], 0.0));
    }

    #[test]
    fn test_training_bounds() {
        let lr    = 2e-5;
        let sched = CyclicTriangularRate::for_training(lr, 240, 24);
        assert_eq!(sched.period(), 20);
        for rate in sched.take(100) {
            assert!(rate >= lr / 3.0 - 1e-15 && rate <= lr * 3.0 + 1e-15);
        }
    }

    #[test]
    fn test_tiny_dataset_has_nonzero_period() {
        let sched = CyclicTriangularRate::for_training(1e-3, 3, 24);
        assert_eq!(sched.period(), 1);
    }
}
