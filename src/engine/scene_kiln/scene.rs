use arc_swap::ArcSwapOption;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Identity of a scene instance. Allocated once per Scene, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(u64);
impl SceneId
{
    fn next() -> Self
    {
        static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The environment loaded models are bound to.
///
/// Scenes are compared by identity, never by content: two scenes created with the same
/// name are distinct scopes. Scenes are intentionally not `Clone`.
pub struct Scene
{
    id: SceneId,
    name: String,
}
impl Scene
{
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self
    {
        Self
        {
            id: SceneId::next(),
            name: name.into(),
        }
    }

    #[inline] #[must_use]
    pub fn id(&self) -> SceneId { self.id }

    #[inline] #[must_use]
    pub fn name(&self) -> &str { &self.name }
}
impl Debug for Scene
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.write_fmt(format_args!("Scene({:?} #{})", self.name, self.id.0))
    }
}

// Supplies the ambient scene when a load does not name one explicitly
pub trait SceneProvider: Send + Sync
{
    fn current_scene(&self) -> Option<Arc<Scene>>;
}

// a fixed scene is its own provider
impl SceneProvider for Arc<Scene>
{
    fn current_scene(&self) -> Option<Arc<Scene>> { Some(self.clone()) }
}

/// A swappable ambient scene.
///
/// Replacing the scene here changes the scope of every loader reading from this slot:
/// their caches are cleared on their next access.
#[derive(Default)]
pub struct SceneSlot
{
    current: ArcSwapOption<Scene>,
}
impl SceneSlot
{
    #[must_use]
    pub fn new(scene: Option<Arc<Scene>>) -> Self
    {
        Self { current: ArcSwapOption::new(scene) }
    }

    // returns the previous scene
    pub fn set(&self, scene: Option<Arc<Scene>>) -> Option<Arc<Scene>>
    {
        if let Some(s) = &scene
        {
            log::debug!("Ambient scene set to {s:?}");
        }
        self.current.swap(scene)
    }
}
impl SceneProvider for SceneSlot
{
    fn current_scene(&self) -> Option<Arc<Scene>>
    {
        self.current.load_full()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn identity_not_content()
    {
        let a = Scene::new("main");
        let b = Scene::new("main");
        assert_eq!(a.name(), b.name());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.id());
    }

    #[test]
    fn slot()
    {
        let slot = SceneSlot::default();
        assert!(slot.current_scene().is_none());

        let first = Arc::new(Scene::new("first"));
        assert!(slot.set(Some(first.clone())).is_none());
        assert_eq!(slot.current_scene().map(|s| s.id()), Some(first.id()));

        let second = Arc::new(Scene::new("second"));
        let prev = slot.set(Some(second.clone()));
        assert_eq!(prev.map(|s| s.id()), Some(first.id()));
        assert_eq!(slot.current_scene().map(|s| s.id()), Some(second.id()));

        slot.set(None);
        assert!(slot.current_scene().is_none());
    }

    #[test]
    fn fixed_provider()
    {
        let scene = Arc::new(Scene::new("fixed"));
        let provider: &dyn SceneProvider = &scene;
        assert!(Arc::ptr_eq(&provider.current_scene().unwrap(), &scene));
    }
}
