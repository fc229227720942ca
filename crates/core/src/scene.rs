//! Reproducible scene descriptions.
//!
//! A [`Scene`] captures everything needed to replay a particle animation:
//! grid and screen dimensions, the fields and optional mask acting on the
//! particles, the color mode, simulation parameter overrides, the PRNG seed
//! and the step count. Scenes are plain JSON:
//!
//! ```json
//! {
//!   "grid_width": 32, "grid_height": 32,
//!   "screen_width": 512, "screen_height": 512,
//!   "fields": [{ "type": "vortex", "center": [0.5, 0.5], "omega": 0.5 }],
//!   "seed": 42, "steps": 120
//! }
//! ```

use crate::color::Srgb;
use crate::error::FlowError;
use crate::falloff::{ConstantFalloff, FalloffKind, RadialFalloff};
use crate::field::{
    BrownianField, FieldKind, LinearField, RadialField, SumField, VortexField, WaveField,
};
use crate::point::Point;
use crate::prng::Xorshift64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field kinds accepted in scene files.
pub const FIELD_TYPES: &[&str] = &["linear", "radial", "vortex", "wave", "brownian", "sum"];
/// Falloff kinds accepted in scene files.
pub const FALLOFF_TYPES: &[&str] = &["constant", "radial"];
/// Color modes accepted in scene files.
pub const COLOR_MODES: &[&str] = &["uniform", "speed"];

/// Serializable description of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSpec {
    Linear {
        direction: Point,
    },
    Radial {
        center: Point,
        magnitude: f64,
    },
    Vortex {
        center: Point,
        omega: f64,
    },
    Wave {
        axis: Point,
        magnitude: f64,
        #[serde(default)]
        frequency: f64,
        #[serde(default)]
        phase: f64,
    },
    Brownian {
        magnitude: Point,
    },
    Sum {
        fields: Vec<FieldSpec>,
    },
}

impl FieldSpec {
    fn validate(&self) -> Result<(), FlowError> {
        let finite = match self {
            FieldSpec::Linear { direction } => direction.is_finite(),
            FieldSpec::Radial { center, magnitude } => center.is_finite() && magnitude.is_finite(),
            FieldSpec::Vortex { center, omega } => center.is_finite() && omega.is_finite(),
            FieldSpec::Wave {
                axis,
                magnitude,
                frequency,
                phase,
            } => axis.is_finite() && [magnitude, frequency, phase].iter().all(|v| v.is_finite()),
            FieldSpec::Brownian { magnitude } => magnitude.is_finite(),
            FieldSpec::Sum { fields } => return fields.iter().try_for_each(FieldSpec::validate),
        };
        if finite {
            Ok(())
        } else {
            Err(FlowError::InvalidScene(format!(
                "{} field has non-finite parameters",
                self.type_name()
            )))
        }
    }

    /// The `"type"` tag of this spec.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldSpec::Linear { .. } => "linear",
            FieldSpec::Radial { .. } => "radial",
            FieldSpec::Vortex { .. } => "vortex",
            FieldSpec::Wave { .. } => "wave",
            FieldSpec::Brownian { .. } => "brownian",
            FieldSpec::Sum { .. } => "sum",
        }
    }

    /// Builds the runtime field.
    ///
    /// Brownian fields draw from `Xorshift64::derived(seed, n)` where `n`
    /// counts Brownian specs in depth-first order, shared via `stream`.
    pub fn build(&self, screen_size: Point, seed: u64, stream: &mut u64) -> FieldKind {
        match self {
            FieldSpec::Linear { direction } => LinearField::new(*direction).into(),
            FieldSpec::Radial { center, magnitude } => {
                RadialField::new(*center, *magnitude, screen_size).into()
            }
            FieldSpec::Vortex { center, omega } => VortexField::new(*center, *omega).into(),
            FieldSpec::Wave {
                axis,
                magnitude,
                frequency,
                phase,
            } => WaveField::new(*axis, *magnitude, *frequency, *phase).into(),
            FieldSpec::Brownian { magnitude } => {
                let rng = Xorshift64::derived(seed, *stream);
                *stream += 1;
                BrownianField::new(*magnitude, rng).into()
            }
            FieldSpec::Sum { fields } => SumField::new(
                fields
                    .iter()
                    .map(|f| f.build(screen_size, seed, stream))
                    .collect(),
            )
            .into(),
        }
    }
}

fn default_wrap() -> bool {
    true
}

/// Serializable description of a falloff mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FalloffSpec {
    Constant {
        value: f64,
    },
    Radial {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        #[serde(default = "default_wrap")]
        wrap: bool,
    },
}

impl FalloffSpec {
    fn validate(&self) -> Result<(), FlowError> {
        match self {
            FalloffSpec::Constant { value } if !value.is_finite() => Err(FlowError::InvalidScene(
                "constant falloff value must be finite".into(),
            )),
            FalloffSpec::Radial {
                center,
                inner_radius,
                outer_radius,
                ..
            } => {
                if !center.is_finite() || !inner_radius.is_finite() || !outer_radius.is_finite() {
                    Err(FlowError::InvalidScene(
                        "radial falloff has non-finite parameters".into(),
                    ))
                } else if inner_radius > outer_radius {
                    Err(FlowError::InvalidScene(format!(
                        "radial falloff inner_radius {inner_radius} exceeds outer_radius {outer_radius}"
                    )))
                } else {
                    Ok(())
                }
            }
            FalloffSpec::Constant { .. } => Ok(()),
        }
    }

    /// Builds the runtime falloff.
    pub fn build(&self, screen_size: Point) -> FalloffKind {
        match self {
            FalloffSpec::Constant { value } => ConstantFalloff::new(*value).into(),
            FalloffSpec::Radial {
                center,
                inner_radius,
                outer_radius,
                wrap,
            } => RadialFalloff::new(*center, *inner_radius, *outer_radius, screen_size)
                .with_wrap(*wrap)
                .into(),
        }
    }
}

fn default_saturation() -> f64 {
    0.8
}

/// How particles are tinted after each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColorMode {
    /// Every particle keeps one color.
    Uniform { color: Srgb },
    /// Hue follows speed: 0 (red) at rest, sweeping toward blue at `max_speed`.
    Speed {
        max_speed: f64,
        #[serde(default = "default_saturation")]
        saturation: f64,
    },
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Uniform {
            color: Srgb::WHITE,
        }
    }
}

fn empty_params() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Everything needed to recreate a particle animation.
///
/// Two identical scenes run by the same binary produce bit-identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub grid_width: usize,
    pub grid_height: usize,
    pub screen_width: usize,
    pub screen_height: usize,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub falloff: Option<FalloffSpec>,
    #[serde(default)]
    pub color: ColorMode,
    #[serde(default = "empty_params")]
    pub params: Value,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub steps: usize,
}

impl Scene {
    /// A scene with no fields, no mask, white particles, empty params and zero steps.
    pub fn new(
        grid_width: usize,
        grid_height: usize,
        screen_width: usize,
        screen_height: usize,
        seed: u64,
    ) -> Self {
        Self {
            grid_width,
            grid_height,
            screen_width,
            screen_height,
            fields: Vec::new(),
            falloff: None,
            color: ColorMode::default(),
            params: empty_params(),
            seed,
            steps: 0,
        }
    }

    /// Appends a field (builder style).
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the mask (builder style).
    pub fn with_falloff(mut self, falloff: FalloffSpec) -> Self {
        self.falloff = Some(falloff);
        self
    }

    /// A demonstration scene: a swirling, wave-rippled cloud held by springs
    /// inside a soft circular mask.
    pub fn example() -> Self {
        let mut scene = Scene::new(64, 64, 512, 512, 42)
            .with_field(FieldSpec::Vortex {
                center: Point::new(0.5, 0.5),
                omega: 0.5,
            })
            .with_field(FieldSpec::Radial {
                center: Point::new(0.5, 0.5),
                magnitude: 40.0,
            })
            .with_field(FieldSpec::Wave {
                axis: Point::new(0.0, 1.0),
                magnitude: 0.05,
                frequency: 4.0,
                phase: 0.0,
            })
            .with_field(FieldSpec::Brownian {
                magnitude: Point::new(0.02, 0.02),
            })
            .with_falloff(FalloffSpec::Radial {
                center: Point::new(0.5, 0.5),
                inner_radius: 0.1,
                outer_radius: 0.35,
                wrap: true,
            });
        scene.color = ColorMode::Speed {
            max_speed: 0.1,
            saturation: default_saturation(),
        };
        scene.params = serde_json::json!({ "damping": 0.92, "stiffness": 0.5 });
        scene.steps = 240;
        scene
    }

    /// Screen size as a point, for screen-space fields and falloffs.
    pub fn screen_size(&self) -> Point {
        Point::new(self.screen_width as f64, self.screen_height as f64)
    }

    /// Checks dimensions and numeric parameters.
    ///
    /// Returns `FlowError::InvalidDimensions` for zero or overflowing grid or
    /// screen sizes and `FlowError::InvalidScene` for unusable parameters.
    pub fn validate(&self) -> Result<(), FlowError> {
        for (w, h) in [
            (self.grid_width, self.grid_height),
            (self.screen_width, self.screen_height),
        ] {
            if w == 0 || h == 0 {
                return Err(FlowError::InvalidDimensions);
            }
            w.checked_mul(h).ok_or(FlowError::InvalidDimensions)?;
        }
        self.fields.iter().try_for_each(FieldSpec::validate)?;
        if let Some(falloff) = &self.falloff {
            falloff.validate()?;
        }
        if let ColorMode::Speed {
            max_speed,
            saturation,
        } = self.color
        {
            if !(max_speed.is_finite() && max_speed > 0.0) {
                return Err(FlowError::InvalidScene(format!(
                    "speed color max_speed must be positive, got {max_speed}"
                )));
            }
            if !(0.0..=1.0).contains(&saturation) {
                return Err(FlowError::InvalidScene(format!(
                    "speed color saturation must be in [0, 1], got {saturation}"
                )));
            }
        }
        Ok(())
    }

    /// Builds the combined field: the single listed field as is, or a
    /// [`SumField`] over all of them (empty when none are listed).
    pub fn build_field(&self) -> FieldKind {
        let screen = self.screen_size();
        let mut stream = 0;
        let mut built: Vec<FieldKind> = self
            .fields
            .iter()
            .map(|f| f.build(screen, self.seed, &mut stream))
            .collect();
        match built.len() {
            1 => built.remove(0),
            _ => SumField::new(built).into(),
        }
    }

    /// Builds the mask, if any.
    pub fn build_falloff(&self) -> Option<FalloffKind> {
        self.falloff.as_ref().map(|f| f.build(self.screen_size()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use serde_json::json;

    #[test]
    fn new_has_empty_defaults() {
        let s = Scene::new(10, 20, 300, 400, 7);
        assert!(s.fields.is_empty());
        assert!(s.falloff.is_none());
        assert_eq!(s.color, ColorMode::default());
        assert_eq!(s.params, json!({}));
        assert_eq!(s.steps, 0);
        assert_eq!(s.screen_size(), Point::new(300.0, 400.0));
    }

    #[test]
    fn example_is_valid_and_round_trips() {
        let s = Scene::example();
        s.validate().unwrap();
        let json = serde_json::to_string_pretty(&s).unwrap();
        let back: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let s: Scene = serde_json::from_value(json!({
            "grid_width": 4, "grid_height": 4,
            "screen_width": 64, "screen_height": 64
        }))
        .unwrap();
        assert!(s.fields.is_empty());
        assert_eq!(s.seed, 0);
        assert_eq!(s.params, json!({}));
        s.validate().unwrap();
    }

    #[test]
    fn field_specs_use_type_tag_and_point_arrays() {
        let spec: FieldSpec = serde_json::from_value(json!({
            "type": "wave", "axis": [1.0, 0.0], "magnitude": 2.0
        }))
        .unwrap();
        assert_eq!(
            spec,
            FieldSpec::Wave {
                axis: Point::new(1.0, 0.0),
                magnitude: 2.0,
                frequency: 0.0,
                phase: 0.0,
            }
        );
        let v = serde_json::to_value(FieldSpec::Vortex {
            center: Point::new(0.5, 0.25),
            omega: 1.0,
        })
        .unwrap();
        assert_eq!(v, json!({"type": "vortex", "center": [0.5, 0.25], "omega": 1.0}));
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        let r = serde_json::from_value::<FieldSpec>(json!({"type": "magnet", "center": [0, 0]}));
        assert!(r.is_err());
    }

    #[test]
    fn radial_falloff_wrap_defaults_to_true() {
        let spec: FalloffSpec = serde_json::from_value(json!({
            "type": "radial", "center": [0.5, 0.5], "inner_radius": 0.1, "outer_radius": 0.2
        }))
        .unwrap();
        assert!(matches!(spec, FalloffSpec::Radial { wrap: true, .. }));
    }

    #[test]
    fn color_modes_parse() {
        let c: ColorMode = serde_json::from_value(json!({"mode": "uniform", "color": "#ff0000"}))
            .unwrap();
        assert_eq!(
            c,
            ColorMode::Uniform {
                color: Srgb::new(1.0, 0.0, 0.0)
            }
        );
        let c: ColorMode =
            serde_json::from_value(json!({"mode": "speed", "max_speed": 2.0})).unwrap();
        assert_eq!(
            c,
            ColorMode::Speed {
                max_speed: 2.0,
                saturation: 0.8
            }
        );
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        assert!(matches!(
            Scene::new(0, 4, 64, 64, 1).validate(),
            Err(FlowError::InvalidDimensions)
        ));
        assert!(Scene::new(4, 4, 64, 0, 1).validate().is_err());
        assert!(Scene::new(usize::MAX, 2, 64, 64, 1).validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_nested_field() {
        let s = Scene::new(4, 4, 64, 64, 1).with_field(FieldSpec::Sum {
            fields: vec![FieldSpec::Vortex {
                center: Point::new(0.5, f64::NAN),
                omega: 1.0,
            }],
        });
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("vortex"), "{err}");
    }

    #[test]
    fn validate_rejects_inverted_radii() {
        let s = Scene::new(4, 4, 64, 64, 1).with_falloff(FalloffSpec::Radial {
            center: Point::new(0.5, 0.5),
            inner_radius: 0.5,
            outer_radius: 0.1,
            wrap: false,
        });
        assert!(matches!(s.validate(), Err(FlowError::InvalidScene(_))));
    }

    #[test]
    fn validate_rejects_bad_speed_color() {
        let mut s = Scene::new(4, 4, 64, 64, 1);
        s.color = ColorMode::Speed {
            max_speed: 0.0,
            saturation: 0.5,
        };
        assert!(s.validate().is_err());
        s.color = ColorMode::Speed {
            max_speed: 1.0,
            saturation: 1.5,
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn single_field_is_built_unwrapped() {
        let s = Scene::new(4, 4, 64, 64, 1).with_field(FieldSpec::Linear {
            direction: Point::new(1.0, 0.0),
        });
        assert_eq!(s.build_field().name(), "linear");
    }

    #[test]
    fn several_fields_are_summed() {
        let s = Scene::new(4, 4, 64, 64, 1)
            .with_field(FieldSpec::Linear {
                direction: Point::new(1.0, 0.0),
            })
            .with_field(FieldSpec::Linear {
                direction: Point::new(0.0, 1.0),
            });
        let mut field = s.build_field();
        assert_eq!(field.name(), "sum");
        let out = field.evaluate(&[Point::ZERO]);
        assert_eq!(out.field[0], Point::new(1.0, 1.0));
        assert_eq!(out.falloff[0], 2.0);
    }

    #[test]
    fn no_fields_builds_empty_sum() {
        let mut field = Scene::new(4, 4, 64, 64, 1).build_field();
        assert_eq!(field.evaluate(&[Point::ONE]).field[0], Point::ZERO);
    }

    #[test]
    fn radial_field_receives_screen_size() {
        let s = Scene::new(4, 4, 640, 480, 1).with_field(FieldSpec::Radial {
            center: Point::new(0.5, 0.5),
            magnitude: 1.0,
        });
        match s.build_field() {
            FieldKind::Radial(f) => assert_eq!(f.screen_size, Point::new(640.0, 480.0)),
            other => panic!("expected radial, got {}", other.name()),
        }
    }

    #[test]
    fn brownian_fields_get_distinct_reproducible_streams() {
        let brownian = FieldSpec::Brownian {
            magnitude: Point::ONE,
        };
        let s = Scene::new(4, 4, 64, 64, 99)
            .with_field(brownian.clone())
            .with_field(FieldSpec::Sum {
                fields: vec![brownian],
            });
        let build = || match s.build_field() {
            FieldKind::Sum(sum) => sum,
            other => panic!("expected sum, got {}", other.name()),
        };
        let (a, b) = (build(), build());
        assert_eq!(a, b);

        let first = match &a.fields()[0] {
            FieldKind::Brownian(f) => f.rng().clone(),
            other => panic!("expected brownian, got {}", other.name()),
        };
        let nested = match &a.fields()[1] {
            FieldKind::Sum(inner) => match &inner.fields()[0] {
                FieldKind::Brownian(f) => f.rng().clone(),
                other => panic!("expected brownian, got {}", other.name()),
            },
            other => panic!("expected sum, got {}", other.name()),
        };
        assert_eq!(first, Xorshift64::derived(99, 0));
        assert_eq!(nested, Xorshift64::derived(99, 1));
    }

    #[test]
    fn falloff_is_built_with_screen_size() {
        let s = Scene::example();
        match s.build_falloff() {
            Some(FalloffKind::Radial(f)) => {
                assert_eq!(f.screen_size, Point::new(512.0, 512.0));
                assert!(f.wrap);
            }
            other => panic!("expected radial falloff, got {other:?}"),
        }
        assert!(Scene::new(1, 1, 1, 1, 0).build_falloff().is_none());
    }

    #[test]
    fn type_lists_match_spec_tags() {
        let tags: Vec<_> = [
            FieldSpec::Linear {
                direction: Point::ZERO,
            },
            FieldSpec::Radial {
                center: Point::ZERO,
                magnitude: 0.0,
            },
            FieldSpec::Vortex {
                center: Point::ZERO,
                omega: 0.0,
            },
            FieldSpec::Wave {
                axis: Point::ZERO,
                magnitude: 0.0,
                frequency: 0.0,
                phase: 0.0,
            },
            FieldSpec::Brownian { magnitude: Point::ZERO },
            FieldSpec::Sum { fields: vec![] },
        ]
        .iter()
        .map(FieldSpec::type_name)
        .collect();
        assert_eq!(tags, FIELD_TYPES);
    }
}
