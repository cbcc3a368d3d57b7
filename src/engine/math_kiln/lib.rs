mod aabb;
pub use aabb::*;

mod transform;
pub use transform::*;
