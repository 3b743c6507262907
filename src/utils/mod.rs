pub mod asset;
pub mod config_loader;
pub mod constants;
pub mod precise_math;

pub use asset::Asset;
pub use config_loader::*;
pub use constants::*;
pub use precise_math::{precise_div, precise_mul, precise_mul_ceil};
