use scene_kiln::{Model, Scene, TransformOptions};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

// Fired once per task, on the loading task, before the model is visible to any caller
pub type OnModelLoaded = Arc<dyn Fn(&Arc<Model>) + Send + Sync>;

/// Per-call options for [`crate::SceneLoader::access`].
///
/// Only the options of the call that creates a task are used. Later calls for the same model
/// in the same scene share that task as-is.
#[derive(Default, Clone)]
pub struct SceneLoaderOptions
{
    pub receive_shadows: bool,
    pub scale_to_dimension: Option<f32>, // scale the root so its longest axis is this long
    pub always_select_as_active_mesh: bool,
    pub report_progress: bool,
    pub scene: Option<Arc<Scene>>, // overrides the loader's scene provider
    pub on_model_loaded: Option<OnModelLoaded>,
}
impl SceneLoaderOptions
{
    #[must_use]
    pub fn with_scene(mut self, scene: Arc<Scene>) -> Self
    {
        self.scene = Some(scene);
        self
    }

    #[must_use]
    pub fn on_model_loaded(mut self, callback: impl Fn(&Arc<Model>) + Send + Sync + 'static) -> Self
    {
        self.on_model_loaded = Some(Arc::new(callback));
        self
    }

    #[inline] #[must_use]
    pub fn transform_options(&self) -> TransformOptions
    {
        TransformOptions
        {
            receive_shadows: self.receive_shadows,
            scale_to_dimension: self.scale_to_dimension,
            always_select_as_active_mesh: self.always_select_as_active_mesh,
        }
    }
}
impl Debug for SceneLoaderOptions
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("SceneLoaderOptions")
            .field("receive_shadows", &self.receive_shadows)
            .field("scale_to_dimension", &self.scale_to_dimension)
            .field("always_select_as_active_mesh", &self.always_select_as_active_mesh)
            .field("report_progress", &self.report_progress)
            .field("scene", &self.scene)
            .field("on_model_loaded", &self.on_model_loaded.is_some())
            .finish()
    }
}
