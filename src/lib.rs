pub mod cli;
pub mod config;
pub mod continuous;
pub mod discretization;
pub mod docindex;
pub mod error;
pub mod io;
pub mod logging;
pub mod observers;
pub mod simulation;
pub mod ss;
pub mod system;
pub mod tf;
pub mod types;

pub use config::Settings;
pub use continuous::{ContinuousLuenberger, ContinuousObserver, ContinuousSystem, FnContinuousSystem};
pub use discretization::{Discretizer, Rk4};
pub use docindex::{IndexError, IndexResult, SearchRecord, SymbolTable};
pub use error::{SystemError, SystemResult};
pub use observers::{KalmanFilter, LuenbergerObserver, Observer, SsObserver};
pub use ss::{Ss, SsLinear, StateSpace};
pub use system::{DiscreteSystem, SisoSystem};
pub use tf::{TfDifferentiator, TfFirstOrderFilter, TfIntegrator, TfMimo, TfMimoDiagonal, TfSiso};
pub use types::{Matrix, Vector};
