//! Reproducible parameter-space sampler.
//!
//! [`sample`] draws `N` independent [`ParamAssignment`]s from a
//! [`ParameterSpace`], seeded deterministically when a seed is supplied so
//! that two invocations of the same `(space, method, N, seed)` tuple produce
//! byte-identical sequences.

use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric class a parameter is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamClass {
    Int,
    Float,
}

/// Distribution a parameter is drawn from when no explicit `values` list is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    Uniform,
    LogUniform,
    Fixed,
}

/// How assignments are generated. Both variants currently sample N
/// independent draws from each parameter's distribution; a true Cartesian
/// grid enumeration is not implemented (matches the observed behavior of
/// the system this sampler's contract was distilled from).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMethod {
    Grid,
    MonteCarlo,
}

/// A concrete drawn value: either an integer or a real number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Int(i) => *i as f64,
            ParamValue::Float(f) => *f,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            ParamValue::Float(_) => None,
        }
    }
}

/// A single parameter's descriptor: numeric class, distribution, optional
/// bounds, and an optional explicit value list. A present value list takes
/// precedence over the distribution (categorical draw).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub class: ParamClass,
    pub distribution: Distribution,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub values: Option<Vec<ParamValue>>,
}

/// Insertion-ordered mapping from parameter name to its descriptor, so the
/// RNG consumes parameters in config declaration order.
pub type ParameterSpace = IndexMap<String, ParamSpec>;

/// A concrete draw: one value per parameter, keyed the same way as its
/// originating [`ParameterSpace`].
pub type ParamAssignment = IndexMap<String, ParamValue>;

/// Sampler configuration: method, sample count, and optional reproducibility seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    pub method: SampleMethod,
    pub samples: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Errors raised while sampling a parameter space.
#[derive(Debug, Error, PartialEq)]
pub enum SamplerError {
    #[error("parameter {0:?} has no values and is missing min/max bounds")]
    MissingBounds(String),
    #[error("parameter {0:?} uses log_uniform but min is not > 0")]
    NonPositiveLogUniformMin(String),
    #[error("parameter {0:?} has min >= max")]
    InvalidRange(String),
}

/// Draw `config.samples` assignments from `space`.
///
/// `config.samples == 0` is a boundary case, not an error: it returns an
/// empty sequence without touching the RNG.
pub fn sample(
    space: &ParameterSpace,
    config: &SamplerConfig,
) -> Result<Vec<ParamAssignment>, SamplerError> {
    if config.samples == 0 {
        return Ok(Vec::new());
    }

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut out = Vec::with_capacity(config.samples);
    for _ in 0..config.samples {
        let mut assignment = ParamAssignment::with_capacity(space.len());
        for (name, spec) in space {
            let value = draw_one(name, spec, &mut rng)?;
            assignment.insert(name.clone(), value);
        }
        out.push(assignment);
    }
    Ok(out)
}

fn draw_one(
    name: &str,
    spec: &ParamSpec,
    rng: &mut ChaCha8Rng,
) -> Result<ParamValue, SamplerError> {
    if let Some(values) = &spec.values {
        if spec.distribution == Distribution::Fixed {
            return values
                .first()
                .copied()
                .ok_or_else(|| SamplerError::MissingBounds(name.to_string()));
        }
        if !values.is_empty() {
            let idx = rng.gen_range(0..values.len());
            return Ok(values[idx]);
        }
    }

    match spec.distribution {
        Distribution::Fixed => spec
            .min
            .map(|m| cast(m, spec.class))
            .ok_or_else(|| SamplerError::MissingBounds(name.to_string())),
        Distribution::Uniform => {
            let (min, max) = bounds(name, spec)?;
            let draw = rng.gen_range(min..max);
            Ok(cast(draw, spec.class))
        }
        Distribution::LogUniform => {
            let (min, max) = bounds(name, spec)?;
            if min <= 0.0 {
                return Err(SamplerError::NonPositiveLogUniformMin(name.to_string()));
            }
            let log_min = min.log10();
            let log_max = max.log10();
            let u = rng.gen_range(log_min..log_max);
            Ok(cast(10f64.powf(u), spec.class))
        }
    }
}

fn bounds(name: &str, spec: &ParamSpec) -> Result<(f64, f64), SamplerError> {
    let min = spec
        .min
        .ok_or_else(|| SamplerError::MissingBounds(name.to_string()))?;
    let max = spec
        .max
        .ok_or_else(|| SamplerError::MissingBounds(name.to_string()))?;
    if min >= max {
        return Err(SamplerError::InvalidRange(name.to_string()));
    }
    Ok((min, max))
}

fn cast(x: f64, class: ParamClass) -> ParamValue {
    match class {
        ParamClass::Int => ParamValue::Int(x.floor() as i64),
        ParamClass::Float => ParamValue::Float(x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_int(min: f64, max: f64) -> ParamSpec {
        ParamSpec {
            class: ParamClass::Int,
            distribution: Distribution::Uniform,
            min: Some(min),
            max: Some(max),
            values: None,
        }
    }

    fn log_uniform_float(min: f64, max: f64) -> ParamSpec {
        ParamSpec {
            class: ParamClass::Float,
            distribution: Distribution::LogUniform,
            min: Some(min),
            max: Some(max),
            values: None,
        }
    }

    #[test]
    fn zero_samples_is_empty() {
        let space = ParameterSpace::new();
        let config = SamplerConfig {
            method: SampleMethod::MonteCarlo,
            samples: 0,
            seed: Some(1),
        };
        assert!(sample(&space, &config).unwrap().is_empty());
    }

    #[test]
    fn reproducible_with_seed() {
        let mut space = ParameterSpace::new();
        space.insert("window".to_string(), uniform_int(10.0, 500.0));
        space.insert("threshold".to_string(), log_uniform_float(0.5, 5.0));
        let config = SamplerConfig {
            method: SampleMethod::MonteCarlo,
            samples: 20,
            seed: Some(42),
        };
        let first = sample(&space, &config).unwrap();
        let second = sample(&space, &config).unwrap();
        assert_eq!(first.len(), 20);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn int_class_draws_within_range() {
        let mut space = ParameterSpace::new();
        space.insert("window".to_string(), uniform_int(10.0, 20.0));
        let config = SamplerConfig {
            method: SampleMethod::Grid,
            samples: 200,
            seed: Some(7),
        };
        for assignment in sample(&space, &config).unwrap() {
            let v = assignment.get("window").unwrap().as_i64().unwrap();
            assert!((10..20).contains(&v), "v={v}");
        }
    }

    #[test]
    fn log_uniform_within_bounds() {
        let mut space = ParameterSpace::new();
        space.insert("threshold".to_string(), log_uniform_float(0.5, 5.0));
        let config = SamplerConfig {
            method: SampleMethod::MonteCarlo,
            samples: 500,
            seed: Some(3),
        };
        for assignment in sample(&space, &config).unwrap() {
            let v = assignment.get("threshold").unwrap().as_f64();
            assert!((0.5..5.0).contains(&v), "v={v}");
        }
    }

    #[test]
    fn log_uniform_rejects_nonpositive_min() {
        let mut space = ParameterSpace::new();
        space.insert("x".to_string(), log_uniform_float(0.0, 5.0));
        let config = SamplerConfig {
            method: SampleMethod::MonteCarlo,
            samples: 1,
            seed: Some(1),
        };
        assert_eq!(
            sample(&space, &config).unwrap_err(),
            SamplerError::NonPositiveLogUniformMin("x".to_string())
        );
    }

    #[test]
    fn categorical_values_take_precedence() {
        let mut space = ParameterSpace::new();
        space.insert(
            "mode".to_string(),
            ParamSpec {
                class: ParamClass::Int,
                distribution: Distribution::Uniform,
                min: None,
                max: None,
                values: Some(vec![ParamValue::Int(1), ParamValue::Int(2), ParamValue::Int(3)]),
            },
        );
        let config = SamplerConfig {
            method: SampleMethod::MonteCarlo,
            samples: 50,
            seed: Some(9),
        };
        for assignment in sample(&space, &config).unwrap() {
            let v = assignment.get("mode").unwrap().as_i64().unwrap();
            assert!((1..=3).contains(&v));
        }
    }

    #[test]
    fn fixed_distribution_returns_first_value_or_min() {
        let mut space = ParameterSpace::new();
        space.insert(
            "a".to_string(),
            ParamSpec {
                class: ParamClass::Float,
                distribution: Distribution::Fixed,
                min: None,
                max: None,
                values: Some(vec![ParamValue::Float(2.5)]),
            },
        );
        space.insert(
            "b".to_string(),
            ParamSpec {
                class: ParamClass::Float,
                distribution: Distribution::Fixed,
                min: Some(1.5),
                max: None,
                values: None,
            },
        );
        let config = SamplerConfig {
            method: SampleMethod::Grid,
            samples: 1,
            seed: Some(1),
        };
        let result = &sample(&space, &config).unwrap()[0];
        assert_eq!(result.get("a").unwrap().as_f64(), 2.5);
        assert_eq!(result.get("b").unwrap().as_f64(), 1.5);
    }

    #[test]
    fn enumeration_order_matches_insertion() {
        let mut space = ParameterSpace::new();
        space.insert("z".to_string(), uniform_int(0.0, 1.0));
        space.insert("a".to_string(), uniform_int(0.0, 1.0));
        let names: Vec<&String> = space.keys().collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    proptest::proptest! {
        #[test]
        fn prop_log_uniform_log_is_uniform(seed in 0u64..1000) {
            let mut space = ParameterSpace::new();
            space.insert("x".to_string(), log_uniform_float(1.0, 1000.0));
            let config = SamplerConfig { method: SampleMethod::MonteCarlo, samples: 1, seed: Some(seed) };
            let v = sample(&space, &config).unwrap()[0].get("x").unwrap().as_f64();
            proptest::prop_assert!(v >= 1.0 && v < 1000.0);
            let log_v = v.log10();
            proptest::prop_assert!(log_v >= 0.0 && log_v < 3.0);
        }
    }
}
