mod scene;
pub use scene::*;

mod raw;
pub use raw::*;

mod model;
pub use model::*;

mod transformer;
pub use transformer::*;
