//! Grid-based 3D smoke solver: clipped MacCormack advection with an RK3
//! backtrace, and a fixed-budget Jacobi pressure projection.

pub mod advection;
pub mod conditions;
pub mod config;
pub mod grid;
pub mod pressure_computation;
pub mod sampler;
pub mod simulation;
pub mod snapshot;
pub mod sources;
pub mod util;
pub mod visualization;

pub use config::SimConfig;
pub use grid::{Field3, Grid3};
pub use simulation::{Diagnostics, Simulation};
