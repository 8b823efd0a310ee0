mod interpolation;
mod prediction;

pub use interpolation::{
    DEFAULT_INTERPOLATION_PERIOD, DEFAULT_STALE_AFTER, Interpolator, interpolation_ratio,
};
pub use prediction::LocalPredictor;
