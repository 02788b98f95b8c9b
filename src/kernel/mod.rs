//! Kernel functions and kernel composition

pub mod discrete;
pub mod linear;
pub mod mkl;
pub mod params;
pub mod polynomial;
pub mod rbf;
pub mod scaled;
pub mod subrange;
pub mod traits;
pub mod weighted_sum;

pub use self::discrete::DiscreteKernel;
pub use self::linear::LinearKernel;
pub use self::mkl::{FieldKernel, MklKernel};
pub use self::params::{ChildSet, KernelNode, ParameterSlots};
pub use self::polynomial::PolynomialKernel;
pub use self::rbf::RBFKernel;
pub use self::scaled::ScaledKernel;
pub use self::subrange::SubrangeKernel;
pub use self::traits::*;
pub use self::weighted_sum::WeightedSumKernel;
