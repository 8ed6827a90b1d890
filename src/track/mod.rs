pub mod interpolate;
pub mod preprocess;

pub use interpolate::interpolate;
pub use preprocess::{annotate, append};
