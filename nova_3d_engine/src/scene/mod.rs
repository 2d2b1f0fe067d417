/// Scene module - the store of renderable objects and lights

pub mod scene;
pub mod object;
pub mod transform;

pub use scene::*;
pub use object::*;
pub use transform::*;
