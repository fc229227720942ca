#![deny(unsafe_code)]
//! Simulation driver for flowfield scenes.
//!
//! Each [`Simulation::step`] evaluates the scene's field over the current
//! particle positions, turns the weighted displacement (plus an optional
//! spring toward rest) into acceleration, integrates velocity with damping,
//! advects positions, and recolors particles. The [`pixel`] module rasterizes
//! particles into RGBA buffers; [`snapshot`] writes them as PNG.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use flowfield_core::error::FlowError;
use flowfield_core::params::{param_f64, param_usize};
use flowfield_core::scene::{ColorMode, Scene};
use flowfield_core::{
    hsv_to_srgb, Falloff, FalloffKind, Field, FieldKind, ParticleSystem, Point, Xorshift64,
};
use serde_json::{json, Value};
use tracing::{debug, trace};

/// Default time step per substep, in seconds.
const DEFAULT_DT: f64 = 1.0 / 60.0;
/// Default velocity retention per substep.
const DEFAULT_DAMPING: f64 = 0.95;
/// Default spring constant pulling particles toward rest.
const DEFAULT_STIFFNESS: f64 = 0.0;
/// Default number of integration substeps per `step()`.
const DEFAULT_SUBSTEPS: usize = 1;
/// Hue reached at `max_speed` in the speed color mode (2/3 = blue).
const SPEED_HUE_RANGE: f64 = 2.0 / 3.0;

/// Integration parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// Time step per substep.
    pub dt: f64,
    /// Factor applied to velocity after each substep (1 = no damping).
    pub damping: f64,
    /// Spring constant toward each particle's rest position (0 = free).
    pub stiffness: f64,
    /// Substeps per `step()`.
    pub substeps: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            damping: DEFAULT_DAMPING,
            stiffness: DEFAULT_STIFFNESS,
            substeps: DEFAULT_SUBSTEPS,
        }
    }
}

impl SimParams {
    /// Reads parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            dt: param_f64(params, "dt", DEFAULT_DT),
            damping: param_f64(params, "damping", DEFAULT_DAMPING),
            stiffness: param_f64(params, "stiffness", DEFAULT_STIFFNESS),
            substeps: param_usize(params, "substeps", DEFAULT_SUBSTEPS),
        }
    }

    /// Current values as a JSON object.
    pub fn to_json(&self) -> Value {
        json!({
            "dt": self.dt,
            "damping": self.damping,
            "stiffness": self.stiffness,
            "substeps": self.substeps,
        })
    }

    /// Types, ranges and defaults of every parameter.
    pub fn param_schema() -> Value {
        json!({
            "dt": {
                "type": "number",
                "default": DEFAULT_DT,
                "min": 0.0,
                "max": 1.0,
                "description": "Time step per substep"
            },
            "damping": {
                "type": "number",
                "default": DEFAULT_DAMPING,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of velocity kept after each substep"
            },
            "stiffness": {
                "type": "number",
                "default": DEFAULT_STIFFNESS,
                "min": 0.0,
                "max": 100.0,
                "description": "Spring constant pulling particles back to rest"
            },
            "substeps": {
                "type": "integer",
                "default": DEFAULT_SUBSTEPS,
                "min": 1,
                "max": 64,
                "description": "Integration substeps per step"
            }
        })
    }

    fn validate(&self) -> Result<(), FlowError> {
        let ok = self.dt.is_finite()
            && self.dt >= 0.0
            && self.damping.is_finite()
            && self.stiffness.is_finite()
            && self.substeps > 0;
        if ok {
            Ok(())
        } else {
            Err(FlowError::InvalidScene(format!(
                "invalid simulation parameters: {}",
                self.to_json()
            )))
        }
    }
}

/// A particle system driven by one field, an optional mask and a color mode.
pub struct Simulation {
    particles: ParticleSystem,
    field: FieldKind,
    mask: Option<FalloffKind>,
    params: SimParams,
    color: ColorMode,
    time: f64,
    step_count: usize,
}

impl Simulation {
    /// Wraps an existing particle system.
    ///
    /// Returns `FlowError::InvalidScene` for non-finite or non-positive
    /// integration parameters.
    pub fn new(
        particles: ParticleSystem,
        field: FieldKind,
        mask: Option<FalloffKind>,
        params: SimParams,
        color: ColorMode,
    ) -> Result<Self, FlowError> {
        params.validate()?;
        let mut sim = Self {
            particles,
            field,
            mask,
            params,
            color,
            time: 0.0,
            step_count: 0,
        };
        sim.apply_color();
        Ok(sim)
    }

    /// Builds a simulation from a validated scene: a jittered grid seeded by
    /// the scene seed, the scene's combined field and mask, and its params.
    pub fn from_scene(scene: &Scene) -> Result<Self, FlowError> {
        scene.validate()?;
        let mut rng = Xorshift64::new(scene.seed);
        let particles = ParticleSystem::grid(scene.grid_width, scene.grid_height, &mut rng);
        let field = scene.build_field();
        debug!(
            particles = particles.len(),
            field = field.name(),
            masked = scene.falloff.is_some(),
            seed = scene.seed,
            "built simulation from scene"
        );
        Self::new(
            particles,
            field,
            scene.build_falloff(),
            SimParams::from_json(&scene.params),
            scene.color.clone(),
        )
    }

    /// Advances the simulation by one step (`params.substeps` integrations).
    pub fn step(&mut self) {
        for _ in 0..self.params.substeps {
            self.integrate();
        }
        self.apply_color();
        self.step_count += 1;
        trace!(step = self.step_count, time = self.time, "stepped");
    }

    /// Runs `steps` steps.
    pub fn run(&mut self, steps: usize) {
        (0..steps).for_each(|_| self.step());
        debug!(steps, total = self.step_count, "run finished");
    }

    fn integrate(&mut self) {
        let SimParams {
            dt,
            damping,
            stiffness,
            ..
        } = self.params;

        let output = self.field.evaluate(self.particles.positions());
        let mask = match &self.mask {
            Some(m) => m.evaluate(self.particles.positions()),
            None => vec![1.0; self.particles.len()],
        };

        let accelerations: Vec<Point> = self
            .particles
            .positions()
            .iter()
            .zip(self.particles.rest_positions())
            .enumerate()
            .map(|(i, (&pos, &rest))| {
                // Sums accumulate one falloff per constituent; cap the weight at 1.
                let weight = output.falloff[i].clamp(0.0, 1.0) * mask[i];
                output.field[i] * weight + stiffness * (rest - pos)
            })
            .collect();

        self.particles
            .velocities_mut()
            .iter_mut()
            .zip(&accelerations)
            .for_each(|(v, &a)| *v = (*v + dt * a) * damping);
        self.particles
            .accelerations_mut()
            .copy_from_slice(&accelerations);

        self.particles.advect(dt);
        self.time += dt;
    }

    fn apply_color(&mut self) {
        match self.color {
            ColorMode::Uniform { color } => self.particles.colors_mut().fill(color),
            ColorMode::Speed {
                max_speed,
                saturation,
            } => {
                let speeds: Vec<f64> = self
                    .particles
                    .velocities()
                    .iter()
                    .map(|v| v.length())
                    .collect();
                for (c, speed) in self.particles.colors_mut().iter_mut().zip(speeds) {
                    let t = (speed / max_speed).clamp(0.0, 1.0);
                    *c = hsv_to_srgb(t * SPEED_HUE_RANGE, saturation, 1.0);
                }
            }
        }
    }

    /// The particle store.
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Mutable particle store, e.g. to inject velocities between steps.
    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    /// The field driving the particles.
    pub fn field(&self) -> &FieldKind {
        &self.field
    }

    /// Mutable field, for animating field parameters between steps.
    pub fn field_mut(&mut self) -> &mut FieldKind {
        &mut self.field
    }

    pub fn params(&self) -> SimParams {
        self.params
    }

    /// Simulated seconds elapsed.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Completed `step()` calls.
    pub fn step_count(&self) -> usize {
        self.step_count
    }
}
