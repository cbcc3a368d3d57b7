use crate::{AccessError, ConfigurationFault, LoadSource, ModelKey, ProgressRelay, ProgressSink, ResourceFetcher, SceneLoadError, SceneLoaderOptions, ScopedCache, TaskPoll};
use futures::task::Spawn;
use futures::FutureExt;
use scene_kiln::{Model, ModelTransformer, Scene, SceneProvider, StandardModelTransformer};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Loads models into the current scene, at most once per model per scene.
///
/// [`SceneLoader::access`] never blocks. A model that is not ready yet comes back as
/// [`AccessError::Suspended`], whose suspender settles when the load finishes; the caller
/// then repeats the same access. Every access re-checks the scene, and a scene change drops
/// everything cached for the previous one.
pub struct SceneLoader<S: Spawn>
{
    cache: ScopedCache,
    spawner: S,
    fetcher: Arc<dyn ResourceFetcher>,
    transformer: Arc<dyn ModelTransformer>,
    scene_provider: Option<Arc<dyn SceneProvider>>,
    progress_relay: Option<Arc<ProgressRelay>>,
}
impl<S: Spawn> SceneLoader<S>
{
    #[must_use]
    pub fn new(spawner: S, fetcher: Arc<dyn ResourceFetcher>) -> Self
    {
        Self
        {
            cache: ScopedCache::new(),
            spawner,
            fetcher,
            transformer: Arc::new(StandardModelTransformer),
            scene_provider: None,
            progress_relay: None,
        }
    }

    #[must_use]
    pub fn with_transformer(mut self, transformer: Arc<dyn ModelTransformer>) -> Self
    {
        self.transformer = transformer;
        self
    }

    // The scene used when the options don't name one
    #[must_use]
    pub fn with_scene_provider(mut self, provider: Arc<dyn SceneProvider>) -> Self
    {
        self.scene_provider = Some(provider);
        self
    }

    // Receives progress from loads started with `report_progress`
    #[must_use]
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self
    {
        self.progress_relay = Some(Arc::new(ProgressRelay::new(sink)));
        self
    }

    fn resolve_scene(&self, options: &SceneLoaderOptions) -> Result<Arc<Scene>, ConfigurationFault>
    {
        options.scene.clone()
            .or_else(|| self.scene_provider.as_ref().and_then(|p| p.current_scene()))
            .ok_or(ConfigurationFault::NoScene)
    }

    /// Get the model for `root_url`/`file_name` in the current scene, starting its load if needed.
    ///
    /// `plugin_extension` picks the fetch plugin instead of the file's extension.
    /// The first access of a model in a scene decides the options its load runs with.
    pub fn access(
        &self,
        root_url: &str,
        file_name: &str,
        plugin_extension: Option<&str>,
        options: &SceneLoaderOptions) -> Result<Arc<Model>, AccessError>
    {
        let scene = self.resolve_scene(options).map_err(AccessError::Configuration)?;

        let key = ModelKey::new(root_url, file_name);
        let (created, task) = self.cache.resolve(&key, scene.id());
        if created
        {
            if options.report_progress
            {
                match &self.progress_relay
                {
                    Some(relay) => task.add_progress_listener(Arc::downgrade(relay)),
                    None => log::debug!("{key:?} asked for progress but the loader has no progress sink"),
                }
            }

            task.start(
                &self.spawner,
                &self.fetcher,
                &self.transformer,
                LoadSource
                {
                    root_url: root_url.to_string(),
                    file_name: file_name.to_string(),
                    plugin_extension: plugin_extension.map(str::to_string),
                    scene,
                },
                options.transform_options(),
                options.on_model_loaded.clone());
        }

        match task.poll()
        {
            TaskPoll::Loaded(model) => Ok(model),
            TaskPoll::Failed(fault) => Err(AccessError::Load(fault)),
            TaskPoll::Pending => Err(AccessError::Suspended(task.ready())),
        }
    }

    /// Access the model, waiting out any suspensions.
    ///
    /// Each wake-up repeats the whole access, so a scene change while waiting restarts the
    /// load in the new scene.
    pub async fn load(
        &self,
        root_url: &str,
        file_name: &str,
        plugin_extension: Option<&str>,
        options: &SceneLoaderOptions) -> Result<Arc<Model>, SceneLoadError>
    {
        loop
        {
            match self.access(root_url, file_name, plugin_extension, options)
            {
                Ok(model) => return Ok(model),
                Err(err) => err.into_suspender()?.await,
            }
        }
    }

    // Single-step form of `load` for hand-written futures. Registers `cx` to be woken when a retry may succeed
    pub fn poll_access(
        &self,
        cx: &mut Context<'_>,
        root_url: &str,
        file_name: &str,
        plugin_extension: Option<&str>,
        options: &SceneLoaderOptions) -> Poll<Result<Arc<Model>, SceneLoadError>>
    {
        loop
        {
            let mut suspender = match self.access(root_url, file_name, plugin_extension, options)
            {
                Ok(model) => return Poll::Ready(Ok(model)),
                Err(err) => match err.into_suspender()
                {
                    Ok(suspender) => suspender,
                    Err(err) => return Poll::Ready(Err(err)),
                },
            };

            // finished between the access and now, go again
            if suspender.poll_unpin(cx).is_pending()
            {
                return Poll::Pending;
            }
        }
    }

    // Number of loads cached for the current scene
    #[must_use]
    pub fn cached_count(&self) -> usize { self.cache.len() }
}
