use crate::Suspender;
use scene_kiln::TransformFault;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum FetchFault
{
    #[error("failed to read {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse resource: {0}")]
    Parse(String),
    #[error("no loader found for extension {extension:?}")]
    NoLoader { extension: String },
    #[error("the loader shut down before the fetch could run")]
    Shutdown,
    #[error("{0}")]
    Failed(String),
    #[error("the fetch failed without a reason")]
    Unknown, // the fetcher supplied no fault
}

/// The terminal failure of a load task.
///
/// Cheap to clone: every caller of a failed key receives the same underlying fault.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadFault
{
    #[error(transparent)]
    Fetch(Arc<FetchFault>),
    #[error(transparent)]
    Transform(Arc<TransformFault>),
}
impl From<FetchFault> for LoadFault
{
    fn from(fault: FetchFault) -> Self { Self::Fetch(Arc::new(fault)) }
}
impl From<TransformFault> for LoadFault
{
    fn from(fault: TransformFault) -> Self { Self::Transform(Arc::new(fault)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationFault
{
    #[error("scene loads need a scene: pass one in the options or provide an ambient scene")]
    NoScene,
}

// Outcome of a single, non-blocking access
#[derive(Debug, thiserror::Error)]
pub enum AccessError
{
    #[error("model is still loading")]
    Suspended(Suspender),
    #[error(transparent)]
    Load(LoadFault),
    #[error(transparent)]
    Configuration(ConfigurationFault),
}
impl AccessError
{
    // Split off the suspend case, leaving only real failures
    pub fn into_suspender(self) -> Result<Suspender, SceneLoadError>
    {
        match self
        {
            Self::Suspended(suspender) => Ok(suspender),
            Self::Load(fault) => Err(SceneLoadError::Load(fault)),
            Self::Configuration(fault) => Err(SceneLoadError::Configuration(fault)),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneLoadError
{
    #[error(transparent)]
    Load(#[from] LoadFault),
    #[error(transparent)]
    Configuration(#[from] ConfigurationFault),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError
{
    #[error("failed to read loader config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse loader config: {0}")]
    Parse(#[from] toml::de::Error),
}
