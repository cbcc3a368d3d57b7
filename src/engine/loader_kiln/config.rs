use crate::{ConfigError, GltfFetcher};
use futures::executor::ThreadPool;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Loader settings, read from TOML. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig
{
    pub assets_root: Option<PathBuf>,
    pub report_progress: bool, // default for loads that don't say
    pub progress_chunk_size: usize,
    pub worker_threads: usize,
}
impl Default for LoaderConfig
{
    fn default() -> Self
    {
        Self
        {
            assets_root: None,
            report_progress: false,
            progress_chunk_size: GltfFetcher::DEFAULT_CHUNK_SIZE,
            worker_threads: 1,
        }
    }
}
impl LoaderConfig
{
    pub fn load(reader: &mut impl Read) -> Result<Self, ConfigError>
    {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(toml::from_str(&buf)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError>
    {
        let mut file = std::fs::File::open(path.as_ref())?;
        let config = Self::load(&mut file)?;
        log::debug!("Loaded loader config from {:?}: {config:?}", path.as_ref());
        Ok(config)
    }

    #[must_use]
    pub fn gltf_fetcher(&self) -> GltfFetcher
    {
        let fetcher = GltfFetcher::new().with_chunk_size(self.progress_chunk_size);
        match &self.assets_root
        {
            Some(root) => fetcher.with_assets_root(root),
            None => fetcher,
        }
    }

    pub fn build_thread_pool(&self) -> std::io::Result<ThreadPool>
    {
        ThreadPool::builder()
            .pool_size(self.worker_threads.max(1))
            .name_prefix("kiln-loader-")
            .create()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_is_default()
    {
        let config = LoaderConfig::load(&mut "".as_bytes()).unwrap();
        assert_eq!(LoaderConfig::default(), config);
    }

    #[test]
    fn partial()
    {
        let config = LoaderConfig::load(&mut "report_progress = true\nworker_threads = 4\n".as_bytes()).unwrap();
        assert!(config.report_progress);
        assert_eq!(4, config.worker_threads);
        assert_eq!(GltfFetcher::DEFAULT_CHUNK_SIZE, config.progress_chunk_size);
        assert!(config.assets_root.is_none());
    }

    #[test]
    fn bad_toml()
    {
        assert!(matches!(LoaderConfig::load(&mut "worker_threads = \"many\"".as_bytes()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn from_file()
    {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "assets_root = \"/assets\"").unwrap();
        writeln!(file, "progress_chunk_size = 1024").unwrap();

        let config = LoaderConfig::from_file(file.path()).unwrap();
        assert_eq!(Some(PathBuf::from("/assets")), config.assets_root);
        assert_eq!(Path::new("/assets/models/robot.glb"), config.gltf_fetcher().resolve_path("models", "robot.glb"));
    }

    #[test]
    fn missing_file()
    {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(LoaderConfig::from_file(dir.path().join("loader.toml")), Err(ConfigError::Io(_))));
    }

    #[test]
    fn thread_pool()
    {
        let config = LoaderConfig { worker_threads: 2, ..Default::default() };
        let pool = config.build_thread_pool().unwrap();
        assert_eq!(3, futures::executor::block_on(futures::task::SpawnExt::spawn_with_handle(&pool, async { 1 + 2 }).unwrap()));
    }
}
