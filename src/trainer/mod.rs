//! Trainers that fit kernel parameters from data
//!
//! Only variance normalization lives here: it computes its single
//! parameter in closed form instead of iterating.

pub mod normalize;

pub use self::normalize::*;
