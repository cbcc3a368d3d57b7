use crate::{LoadTask, ModelKey};
use parking_lot::Mutex;
use scene_kiln::SceneId;
use std::collections::HashMap;
use std::sync::Arc;

type LoadTaskBank = HashMap<ModelKey, Arc<LoadTask>>;

struct ScopedCacheInner
{
    scene_id: Option<SceneId>, // None until the first lookup
    entries: LoadTaskBank,
}

/// Load tasks for the models of a single scene.
///
/// Every entry was created while the current scene was active. Resolving with a different
/// scene drops all entries before the lookup, as loaded models are bound to the scene they
/// were loaded into. There is no other eviction.
pub struct ScopedCache
{
    inner: Mutex<ScopedCacheInner>,
}
impl Default for ScopedCache
{
    fn default() -> Self
    {
        Self
        {
            inner: Mutex::new(ScopedCacheInner
            {
                scene_id: None,
                entries: LoadTaskBank::new(),
            }),
        }
    }
}
impl ScopedCache
{
    #[must_use]
    pub fn new() -> Self { Self::default() }

    // Get or create the task for `key` in `scene_id`'s scope. The bool is true if this call created the task
    #[must_use]
    pub fn resolve(&self, key: &ModelKey, scene_id: SceneId) -> (bool /* created */, Arc<LoadTask>)
    {
        let mut inner = self.inner.lock();

        if inner.scene_id != Some(scene_id)
        {
            if !inner.entries.is_empty()
            {
                log::debug!("Scene changed from {:?} to {scene_id:?}, dropping {} cached load(s)", inner.scene_id, inner.entries.len());
            }
            // in-flight tasks are orphaned, not cancelled
            inner.entries.clear();
            inner.scene_id = Some(scene_id);
        }

        let mut created = false;
        let task = inner.entries.entry(key.clone()).or_insert_with(||
        {
            created = true;
            log::debug!("Creating load task for {key:?}");
            Arc::new(LoadTask::new(key.clone()))
        }).clone();

        (created, task)
    }

    #[must_use]
    pub fn get(&self, key: &ModelKey) -> Option<Arc<LoadTask>>
    {
        self.inner.lock().entries.get(key).cloned()
    }

    // drop every entry but keep the current scope
    pub fn clear(&self)
    {
        self.inner.lock().entries.clear();
    }

    #[must_use]
    pub fn scene_id(&self) -> Option<SceneId>
    {
        self.inner.lock().scene_id
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.inner.lock().entries.is_empty()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use scene_kiln::Scene;

    fn key(name: &str) -> ModelKey { ModelKey::new("models/", name) }

    #[test]
    fn creates_once()
    {
        let cache = ScopedCache::new();
        let scene = Scene::new("main");

        let (created_a, a) = cache.resolve(&key("robot.glb"), scene.id());
        let (created_b, b) = cache.resolve(&key("robot.glb"), scene.id());
        assert!(created_a);
        assert!(!created_b);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(1, cache.len());
    }

    #[test]
    fn distinct_keys()
    {
        let cache = ScopedCache::new();
        let scene = Scene::new("main");

        let (_, a) = cache.resolve(&key("robot.glb"), scene.id());
        let (_, b) = cache.resolve(&key("tree.glb"), scene.id());
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(2, cache.len());
    }

    #[test]
    fn scene_change_clears_all()
    {
        let cache = ScopedCache::new();
        let first = Scene::new("main");
        let second = Scene::new("main"); // same name, different scene

        let (_, robot) = cache.resolve(&key("robot.glb"), first.id());
        let _ = cache.resolve(&key("tree.glb"), first.id());
        assert_eq!(2, cache.len());
        assert_eq!(Some(first.id()), cache.scene_id());

        let (created, robot_again) = cache.resolve(&key("robot.glb"), second.id());
        assert!(created);
        assert!(!Arc::ptr_eq(&robot, &robot_again));
        assert_eq!(1, cache.len());
        assert!(cache.get(&key("tree.glb")).is_none());
        assert_eq!(Some(second.id()), cache.scene_id());
    }

    #[test]
    fn switching_back_is_still_a_change()
    {
        let cache = ScopedCache::new();
        let first = Scene::new("first");
        let second = Scene::new("second");

        let (_, a) = cache.resolve(&key("robot.glb"), first.id());
        let _ = cache.resolve(&key("robot.glb"), second.id());
        let (created, b) = cache.resolve(&key("robot.glb"), first.id());
        assert!(created);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn clear_keeps_scope()
    {
        let cache = ScopedCache::new();
        let scene = Scene::new("main");
        let _ = cache.resolve(&key("robot.glb"), scene.id());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(Some(scene.id()), cache.scene_id());
    }
}
