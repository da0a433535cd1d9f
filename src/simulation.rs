//! Open loop simulation of a model described in TOML.
//!
//! ```toml
//! steps = 50
//!
//! [model]
//! type = "first_order_filter"
//! cut_freq = 2.0
//! ts = 0.01
//!
//! [input]
//! type = "step"
//! amplitude = 1.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::SystemError;
use crate::ss::SsLinear;
use crate::system::DiscreteSystem;
use crate::tf::{TfDifferentiator, TfFirstOrderFilter, TfIntegrator, TfSiso};
use crate::types::{Vector, matrix_from_nested};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid simulation file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid model: {0}")]
    Model(#[from] SystemError),

    #[error("Sampling time must be positive, got {0}")]
    InvalidSamplingTime(f64),
}

pub type SimulationResult<T> = Result<T, SimulationError>;

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    TransferFunction {
        num: Vec<f64>,
        den: Vec<f64>,
        #[serde(default)]
        ts: Option<f64>,
    },
    Integrator {
        #[serde(default)]
        ts: Option<f64>,
        #[serde(default = "one")]
        gain: f64,
    },
    FirstOrderFilter {
        /// Hz
        cut_freq: f64,
        #[serde(default)]
        ts: Option<f64>,
        #[serde(default = "one")]
        gain: f64,
    },
    Differentiator {
        tau: f64,
        #[serde(default)]
        ts: Option<f64>,
        #[serde(default = "one")]
        gain: f64,
    },
    StateSpace {
        a: Vec<Vec<f64>>,
        b: Vec<Vec<f64>>,
        c: Vec<Vec<f64>>,
        #[serde(default)]
        d: Option<Vec<Vec<f64>>>,
        #[serde(default)]
        initial_state: Option<Vec<f64>>,
    },
}

impl ModelSpec {
    /// The model's own sampling time, or `default_ts`.
    pub fn sampling_time(&self, default_ts: f64) -> f64 {
        let ts = match self {
            Self::TransferFunction { ts, .. }
            | Self::Integrator { ts, .. }
            | Self::FirstOrderFilter { ts, .. }
            | Self::Differentiator { ts, .. } => *ts,
            Self::StateSpace { .. } => None,
        };
        ts.unwrap_or(default_ts)
    }
}

/// Input applied to every channel of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputSignal {
    Step {
        #[serde(default = "one")]
        amplitude: f64,
        /// Seconds
        #[serde(default)]
        start: f64,
    },
    /// `amplitude` at the first step, zero after.
    Impulse {
        #[serde(default = "one")]
        amplitude: f64,
    },
    Ramp {
        #[serde(default = "one")]
        slope: f64,
    },
    Constant {
        value: f64,
    },
}

impl InputSignal {
    pub fn value(&self, k: usize, t: f64) -> f64 {
        match *self {
            Self::Step { amplitude, start } => {
                if t >= start {
                    amplitude
                } else {
                    0.0
                }
            }
            Self::Impulse { amplitude } => {
                if k == 0 {
                    amplitude
                } else {
                    0.0
                }
            }
            Self::Ramp { slope } => slope * t,
            Self::Constant { value } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationFile {
    pub model: ModelSpec,
    pub input: InputSignal,
    #[serde(default)]
    pub steps: Option<usize>,
}

impl SimulationFile {
    pub fn load(path: &Path) -> SimulationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SimulationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SimulationResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub k: usize,
    pub t: f64,
    pub input: f64,
    pub output: Vec<f64>,
}

/// Instantiate the model. Models without a sampling time use `default_ts`.
pub fn build_system(spec: &ModelSpec, default_ts: f64) -> SimulationResult<Box<dyn DiscreteSystem>> {
    let ts = spec.sampling_time(default_ts);
    if ts.is_nan() || ts <= 0.0 {
        return Err(SimulationError::InvalidSamplingTime(ts));
    }

    let system: Box<dyn DiscreteSystem> = match spec {
        ModelSpec::TransferFunction { num, den, .. } => Box::new(TfSiso::new(num, den, Some(ts))?),
        ModelSpec::Integrator { gain, .. } => Box::new(TfIntegrator::new(ts, *gain)?),
        ModelSpec::FirstOrderFilter { cut_freq, gain, .. } => {
            Box::new(TfFirstOrderFilter::new(*cut_freq, ts, *gain)?)
        }
        ModelSpec::Differentiator { tau, gain, .. } => {
            Box::new(TfDifferentiator::two_poles(ts, *tau, *gain)?)
        }
        ModelSpec::StateSpace {
            a,
            b,
            c,
            d,
            initial_state,
        } => {
            let a = matrix_from_nested(a)?;
            let b = matrix_from_nested(b)?;
            let c = matrix_from_nested(c)?;
            let mut system = match d {
                Some(d) => SsLinear::new(a, b, c, matrix_from_nested(d)?)?,
                None => SsLinear::without_feedthrough(a, b, c)?,
            };
            if let Some(x0) = initial_state {
                system = system.with_initial_state(&Vector::from_column_slice(x0))?;
            }
            Box::new(system)
        }
    };
    debug!("Built model: {}", system.describe());
    Ok(system)
}

/// Run `steps` steps from the system's current state.
pub fn run(
    system: &mut dyn DiscreteSystem,
    input: &InputSignal,
    steps: usize,
    ts: f64,
) -> SimulationResult<Vec<Sample>> {
    let channels = system.size_input();
    let mut samples = Vec::with_capacity(steps);
    for k in 0..steps {
        let t = k as f64 * ts;
        let u = input.value(k, t);
        let output = system.apply(&Vector::from_element(channels, u))?;
        samples.push(Sample {
            k,
            t,
            input: u,
            output: output.as_slice().to_vec(),
        });
    }
    Ok(samples)
}
