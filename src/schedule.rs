// --- Learning Rate Schedule ---

/// Exponentially decayed learning rate for the gradient descent.
///
/// Formula (continuous, not staircased):
/// ```text
/// lr_t = init_lr * decay_rate^(t / decay_steps)
/// ```
/// so the rate has decayed by a full factor of `decay_rate` once the step
/// counter reaches `decay_steps`.
pub struct ExponentialDecay {
    init_lr: f64,
    decay_steps: usize,
    decay_rate: f64,
    step: usize,
}

impl ExponentialDecay {
    /// Create a new schedule.
    ///
    /// # Arguments
    /// * `init_lr` - Learning rate at step 0
    /// * `decay_steps` - Number of steps over which one decay factor is applied
    /// * `decay_rate` - Multiplicative factor reached at `decay_steps`
    pub fn new(init_lr: f64, decay_steps: usize, decay_rate: f64) -> Self {
        Self {
            init_lr,
            decay_steps,
            decay_rate,
            step: 0,
        }
    }

    /// Learning rate at the current step.
    pub fn lr(&self) -> f64 {
        if self.decay_steps == 0 {
            return self.init_lr;
        }
        let exponent = self.step as f64 / self.decay_steps as f64;
        self.init_lr * self.decay_rate.powf(exponent)
    }

    /// Advance the step counter by one.
    pub fn step(&mut self) {
        self.step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial_rate() {
        let schedule = ExponentialDecay::new(0.99, 10_000, 0.005);
        assert!((schedule.lr() - 0.99).abs() < 1e-12);
    }

    #[test]
    fn reaches_one_decay_factor_at_decay_steps() {
        let mut schedule = ExponentialDecay::new(1.0, 100, 0.5);
        for _ in 0..100 {
            schedule.step();
        }
        assert!((schedule.lr() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn decays_monotonically_for_rate_below_one() {
        let mut schedule = ExponentialDecay::new(0.99, 10, 0.1);
        let mut previous = schedule.lr();
        for _ in 0..50 {
            schedule.step();
            let current = schedule.lr();
            assert!(current < previous);
            previous = current;
        }
    }

    #[test]
    fn zero_decay_steps_keeps_rate_constant() {
        let mut schedule = ExponentialDecay::new(0.25, 0, 0.5);
        schedule.step();
        schedule.step();
        assert!((schedule.lr() - 0.25).abs() < 1e-12);
    }
}
