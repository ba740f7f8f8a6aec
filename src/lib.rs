//! Coupling algebra of spherical tensor operators.
//!
//! Operators are built by coupling tensors that act in declared subspaces,
//! recoupled into a canonical order by subspace, and decoupled between
//! coupled states into phases, Kronecker deltas, 6j/9j symbols and reduced
//! matrix elements per subspace.
extern crate fnv;
extern crate num;
extern crate once_cell;
#[macro_use]
extern crate quick_error;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_yaml;
extern crate wigner_symbols;

pub mod ang_mom;
pub mod decouple;
pub mod error;
pub mod evaluate;
pub mod half;
pub mod isqrt;
pub mod label;
pub mod recouple;
pub mod report;
pub mod scalar;
pub mod space;
pub mod state;
pub mod tensor;
pub mod utils;
pub mod vector;

pub use decouple::MatrixElement;
pub use error::{Error, Result};
pub use evaluate::Assignment;
pub use half::Half;
pub use label::QLabel;
pub use scalar::Scalar;
pub use space::{Registry, Scheme, Space};
pub use state::{CoupledState, State};
pub use tensor::{Expr, Tensor};
