/// Camera module

pub mod camera;

pub use camera::*;
