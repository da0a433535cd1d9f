//! Discrete time transfer functions.
//!
//! [`TfSiso`] is the generic linear filter. The integrator, the first order
//! filter and the differentiator are fixed-structure wrappers around it.
//! [`TfMimo`] and [`TfMimoDiagonal`] arrange SISO systems in a grid.

mod differentiator;
mod first_order_filter;
mod integrator;
mod mimo;
mod mimo_diagonal;
mod siso;

pub use differentiator::TfDifferentiator;
pub use first_order_filter::TfFirstOrderFilter;
pub use integrator::TfIntegrator;
pub use mimo::TfMimo;
pub use mimo_diagonal::TfMimoDiagonal;
pub use siso::TfSiso;
