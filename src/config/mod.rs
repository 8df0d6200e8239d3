pub mod builder;
pub mod types;

pub use builder::GrabConfigBuilder;
pub use types::{GrabConfig, ImageFormat};
