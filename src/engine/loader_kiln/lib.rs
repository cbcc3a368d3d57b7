mod errors;
pub use errors::*;

mod progress;
pub use progress::*;

mod fetch;
pub use fetch::*;

mod gltf_fetcher;
pub use gltf_fetcher::*;

mod load_task;
pub use load_task::*;

mod scoped_cache;
pub use scoped_cache::*;

mod options;
pub use options::*;

mod scene_loader;
pub use scene_loader::*;

mod config;
pub use config::*;

#[cfg(test)]
mod test_utils;
