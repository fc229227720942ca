//! Particle store: parallel per-particle arrays and the Euler advection step.
//!
//! All arrays are indexed by particle id and always share one length. The
//! store never evaluates fields itself; a driver writes velocities and
//! accelerations, then calls [`ParticleSystem::advect`].

use crate::color::Srgb;
use crate::point::Point;
use crate::prng::RandomSource;

/// Grid jitter amplitude, in cells.
pub const GRID_JITTER: f64 = 1.0;
/// Smallest radius `create_grid` assigns.
pub const MIN_RADIUS: f64 = 3.0;
/// Width of the radius range above [`MIN_RADIUS`].
pub const RADIUS_SPAN: f64 = 4.0;

/// Structure-of-arrays particle storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSystem {
    position: Vec<Point>,
    velocity: Vec<Point>,
    acceleration: Vec<Point>,
    rest: Vec<Point>,
    radius: Vec<f64>,
    color: Vec<Srgb>,
    alpha: Vec<f64>,
}

impl ParticleSystem {
    /// An empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// A system of `n` default particles (see [`initialize`](Self::initialize)).
    pub fn with_len(n: usize) -> Self {
        let mut system = Self::new();
        system.initialize(n);
        system
    }

    /// A jittered `w × h` grid (see [`create_grid`](Self::create_grid)).
    pub fn grid<R: RandomSource + ?Sized>(w: usize, h: usize, rng: &mut R) -> Self {
        let mut system = Self::new();
        system.create_grid(w, h, rng);
        system
    }

    /// Reallocates every array to length `n`.
    ///
    /// Positions, velocities, accelerations and rest positions are zero, radii
    /// are zero, colors are opaque white.
    pub fn initialize(&mut self, n: usize) {
        self.position = vec![Point::ZERO; n];
        self.velocity = vec![Point::ZERO; n];
        self.acceleration = vec![Point::ZERO; n];
        self.rest = vec![Point::ZERO; n];
        self.radius = vec![0.0; n];
        self.color = vec![Srgb::WHITE; n];
        self.alpha = vec![1.0; n];
    }

    /// Lays out `w * h` particles on a jittered grid in [0, 1]².
    ///
    /// Cell `(x, y)` gets position
    /// `((x + 0.5 + jitter·(U − 0.5)) / w, (y + 0.5 + jitter·(U − 0.5)) / h)`,
    /// which is also its rest position. Velocity and acceleration start at
    /// zero, radius is `U³ · 4 + 3`, color opaque white. Particles are stored
    /// row by row.
    pub fn create_grid<R: RandomSource + ?Sized>(&mut self, w: usize, h: usize, rng: &mut R) {
        self.initialize(w * h);
        let (wf, hf) = (w as f64, h as f64);
        let cells = (0..h).flat_map(|y| (0..w).map(move |x| (x, y)));
        for (i, (x, y)) in cells.enumerate() {
            let gx = (x as f64 + 0.5 + GRID_JITTER * (rng.next_f64() - 0.5)) / wf;
            let gy = (y as f64 + 0.5 + GRID_JITTER * (rng.next_f64() - 0.5)) / hf;
            let p = Point::new(gx, gy);
            self.position[i] = p;
            self.rest[i] = p;
            self.radius[i] = rng.next_f64().powi(3) * RADIUS_SPAN + MIN_RADIUS;
        }
    }

    /// Explicit Euler step: `position += dt · velocity` for every particle.
    pub fn advect(&mut self, dt: f64) {
        self.position
            .iter_mut()
            .zip(&self.velocity)
            .for_each(|(p, v)| *p += dt * *v);
    }

    /// Moves every particle back to its rest position and stops it.
    pub fn reset(&mut self) {
        self.position.copy_from_slice(&self.rest);
        self.velocity.fill(Point::ZERO);
        self.acceleration.fill(Point::ZERO);
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn positions(&self) -> &[Point] {
        &self.position
    }

    pub fn positions_mut(&mut self) -> &mut [Point] {
        &mut self.position
    }

    pub fn velocities(&self) -> &[Point] {
        &self.velocity
    }

    pub fn velocities_mut(&mut self) -> &mut [Point] {
        &mut self.velocity
    }

    pub fn accelerations(&self) -> &[Point] {
        &self.acceleration
    }

    pub fn accelerations_mut(&mut self) -> &mut [Point] {
        &mut self.acceleration
    }

    pub fn rest_positions(&self) -> &[Point] {
        &self.rest
    }

    pub fn rest_positions_mut(&mut self) -> &mut [Point] {
        &mut self.rest
    }

    pub fn radii(&self) -> &[f64] {
        &self.radius
    }

    pub fn radii_mut(&mut self) -> &mut [f64] {
        &mut self.radius
    }

    pub fn colors(&self) -> &[Srgb] {
        &self.color
    }

    pub fn colors_mut(&mut self) -> &mut [Srgb] {
        &mut self.color
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alpha
    }

    pub fn alphas_mut(&mut self) -> &mut [f64] {
        &mut self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::Xorshift64;

    /// Always returns the same draw.
    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_f64(&mut self) -> f64 {
            self.0
        }
    }

    fn assert_lengths(ps: &ParticleSystem, n: usize) {
        assert_eq!(ps.len(), n);
        assert_eq!(ps.velocities().len(), n);
        assert_eq!(ps.accelerations().len(), n);
        assert_eq!(ps.rest_positions().len(), n);
        assert_eq!(ps.radii().len(), n);
        assert_eq!(ps.colors().len(), n);
        assert_eq!(ps.alphas().len(), n);
    }

    #[test]
    fn new_is_empty() {
        let ps = ParticleSystem::new();
        assert!(ps.is_empty());
        assert_lengths(&ps, 0);
    }

    #[test]
    fn initialize_allocates_every_array() {
        let mut ps = ParticleSystem::new();
        ps.initialize(5);
        assert_lengths(&ps, 5);
        assert!(ps.positions().iter().all(|&p| p == Point::ZERO));
        assert!(ps.colors().iter().all(|&c| c == Srgb::WHITE));
        assert!(ps.alphas().iter().all(|&a| a == 1.0));
    }

    #[test]
    fn initialize_shrinks_previous_allocation() {
        let mut ps = ParticleSystem::with_len(10);
        ps.initialize(3);
        assert_lengths(&ps, 3);
    }

    #[test]
    fn create_grid_count_and_defaults() {
        let mut rng = Xorshift64::new(42);
        let ps = ParticleSystem::grid(8, 5, &mut rng);
        assert_lengths(&ps, 40);
        assert!(ps.velocities().iter().all(|&v| v == Point::ZERO));
        assert!(ps.accelerations().iter().all(|&a| a == Point::ZERO));
        assert!(ps
            .radii()
            .iter()
            .all(|&r| (MIN_RADIUS..=MIN_RADIUS + RADIUS_SPAN).contains(&r)));
        assert_eq!(ps.positions(), ps.rest_positions());
    }

    #[test]
    fn create_grid_without_jitter_hits_cell_centers() {
        let ps = ParticleSystem::grid(4, 2, &mut Fixed(0.5));
        assert_eq!(ps.positions()[0], Point::new(0.125, 0.25));
        assert_eq!(ps.positions()[3], Point::new(0.875, 0.25));
        assert_eq!(ps.positions()[4], Point::new(0.125, 0.75));
        assert!(ps.radii().iter().all(|&r| r == 3.5));
    }

    #[test]
    fn create_grid_positions_stay_in_unit_square() {
        let mut rng = Xorshift64::new(3);
        let ps = ParticleSystem::grid(16, 16, &mut rng);
        for p in ps.positions() {
            assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y), "{p:?}");
        }
    }

    #[test]
    fn create_grid_zero_width_is_empty() {
        let ps = ParticleSystem::grid(0, 7, &mut Fixed(0.1));
        assert!(ps.is_empty());
    }

    #[test]
    fn advect_zero_dt_is_identity() {
        let mut ps = ParticleSystem::grid(3, 3, &mut Xorshift64::new(9));
        ps.velocities_mut().fill(Point::new(1.0, -2.0));
        let before = ps.positions().to_vec();
        ps.advect(0.0);
        assert_eq!(ps.positions(), &before[..]);
    }

    #[test]
    fn advect_applies_euler_step() {
        let mut ps = ParticleSystem::with_len(2);
        ps.positions_mut()[0] = Point::new(0.5, 0.5);
        ps.positions_mut()[1] = Point::new(0.1, 0.9);
        ps.velocities_mut()[0] = Point::new(0.2, -0.4);
        ps.advect(0.5);
        assert_eq!(ps.positions()[0], Point::new(0.5 + 0.5 * 0.2, 0.5 + 0.5 * -0.4));
        assert_eq!(ps.positions()[1], Point::new(0.1, 0.9));
    }

    #[test]
    fn reset_returns_to_rest() {
        let mut ps = ParticleSystem::grid(2, 2, &mut Xorshift64::new(1));
        ps.velocities_mut().fill(Point::new(1.0, 1.0));
        ps.accelerations_mut().fill(Point::new(3.0, 3.0));
        ps.advect(1.0);
        ps.reset();
        assert_eq!(ps.positions(), ps.rest_positions());
        assert!(ps.velocities().iter().all(|&v| v == Point::ZERO));
        assert!(ps.accelerations().iter().all(|&a| a == Point::ZERO));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn grid_invariants_hold_for_any_seed(
                w in 0_usize..24,
                h in 0_usize..24,
                seed: u64,
            ) {
                let ps = ParticleSystem::grid(w, h, &mut Xorshift64::new(seed));
                prop_assert_eq!(ps.len(), w * h);
                prop_assert_eq!(ps.radii().len(), w * h);
                for &r in ps.radii() {
                    prop_assert!((3.0..=7.0).contains(&r), "radius {r}");
                }
            }

            #[test]
            fn advect_matches_closed_form(
                dt in -2.0_f64..2.0,
                vx in -10.0_f64..10.0,
                vy in -10.0_f64..10.0,
            ) {
                let mut ps = ParticleSystem::with_len(1);
                ps.positions_mut()[0] = Point::new(0.25, 0.75);
                ps.velocities_mut()[0] = Point::new(vx, vy);
                ps.advect(dt);
                prop_assert_eq!(ps.positions()[0], Point::new(0.25 + dt * vx, 0.75 + dt * vy));
            }
        }
    }
}
