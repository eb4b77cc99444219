//! Random sampling of candidate points

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{Position, RandomSource, SamplingBounds};

/// Reseedable generator backed by `StdRng`
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Draw a point in `bounds` at the altitude of the destination waypoint
///
/// North is drawn before east. The point is not checked against obstacles.
pub fn sample_point<R: RandomSource + ?Sized>(rng: &mut R, bounds: &SamplingBounds, d: f64) -> Position {
    let n = rng.uniform() * (bounds.max_n - bounds.min_n) + bounds.min_n;
    let e = rng.uniform() * (bounds.max_e - bounds.min_e) + bounds.min_e;
    Position::new(n, e, d)
}

/// Point `length` away from `from` towards `to`, `None` if they coincide
pub fn step_toward(from: &Position, to: &Position, length: f64) -> Option<Position> {
    (*to - *from).normalized().map(|dir| *from + dir * length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Replays a fixed list of values
    struct Scripted(Vec<f64>, usize);

    impl RandomSource for Scripted {
        fn reseed(&mut self, _seed: u64) {
            self.1 = 0;
        }

        fn uniform(&mut self) -> f64 {
            let v = self.0[self.1 % self.0.len()];
            self.1 += 1;
            v
        }
    }

    #[test]
    fn test_sample_maps_linearly_into_bounds() {
        let bounds = SamplingBounds::new(-100.0, 100.0, 0.0, 50.0);
        let mut rng = Scripted(vec![0.0, 0.5, 0.75, 0.1], 0);

        let first = sample_point(&mut rng, &bounds, -40.0);
        assert_eq!(first, Position::new(-100.0, 25.0, -40.0));
        let second = sample_point(&mut rng, &bounds, -40.0);
        assert_relative_eq!(second.n, 50.0);
        assert_relative_eq!(second.e, 5.0);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        let xs: Vec<f64> = (0..8).map(|_| a.uniform()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.uniform()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&x| (0.0..1.0).contains(&x)));

        a.reseed(42);
        assert_eq!(a.uniform(), xs[0]);
    }

    #[test]
    fn test_samples_stay_inside_bounds() {
        let bounds = SamplingBounds::new(-10.0, 10.0, 5.0, 6.0);
        let mut rng = SeededRandom::new(3);
        for _ in 0..200 {
            let pt = sample_point(&mut rng, &bounds, 0.0);
            assert!(pt.n >= -10.0 && pt.n < 10.0);
            assert!(pt.e >= 5.0 && pt.e < 6.0);
        }
    }

    #[test]
    fn test_step_toward() {
        let from = Position::new(0.0, 0.0, -10.0);
        let step = step_toward(&from, &Position::new(300.0, 400.0, -10.0), 100.0).unwrap();
        assert_relative_eq!(step.n, 60.0, epsilon = 1e-9);
        assert_relative_eq!(step.e, 80.0, epsilon = 1e-9);
        assert!(step_toward(&from, &from, 100.0).is_none());
    }
}
