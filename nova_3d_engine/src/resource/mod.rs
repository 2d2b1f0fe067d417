/// Resource module - shared GPU-side assets

pub mod mesh;

pub use mesh::*;
