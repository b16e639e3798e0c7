//! Randomised pause between oracle calls

use rand::Rng;
use std::time::Duration;

/// Bounds for the random delay applied after every oracle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Politeness {
    min: Duration,
    max: Duration,
}

impl Politeness {
    /// Create delay bounds; the bounds are swapped if given in the wrong order
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No pause at all, for tests and offline runs
    #[must_use]
    pub const fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn next_delay(&self) -> Duration {
        self.next_delay_with(&mut rand::rng())
    }

    pub fn next_delay_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }
}

impl Default for Politeness {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_millis(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn delay_within_bounds() {
        let politeness = Politeness::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let delay = politeness.next_delay_with(&mut rng);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(500));
        }
    }

    #[test]
    fn swapped_bounds_are_fixed() {
        let politeness = Politeness::new(Duration::from_millis(9), Duration::from_millis(3));
        let delay = politeness.next_delay();
        assert!(delay >= Duration::from_millis(3) && delay <= Duration::from_millis(9));
    }

    #[test]
    fn none_is_zero() {
        assert_eq!(Politeness::none().next_delay(), Duration::ZERO);
    }
}
