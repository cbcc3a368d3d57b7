// End-to-end loads of glTF files from disk through a threaded loader
use approx::assert_abs_diff_eq;
use futures::executor::{block_on, ThreadPool};
use glam::Vec3;
use loader_kiln::{FetchFault, LastProgress, LoadFault, SceneLoadError, SceneLoader, SceneLoaderOptions};
use scene_kiln::{MeshParent, Scene, SceneSlot};
use std::sync::Arc;
use tempfile::TempDir;

const ROBOT_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [ { "nodes": [ 0 ] } ],
    "nodes": [
        { "name": "body", "mesh": 0, "children": [ 1 ], "translation": [ 0.0, 1.0, 0.0 ] },
        { "name": "arm", "translation": [ 1.0, 0.0, 0.0 ] }
    ],
    "meshes": [ { "name": "body_mesh", "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
    "buffers": [ { "uri": "robot.bin", "byteLength": 24 } ],
    "bufferViews": [ { "buffer": 0, "byteLength": 24 } ],
    "accessors": [ {
        "bufferView": 0,
        "componentType": 5126,
        "count": 2,
        "type": "VEC3",
        "min": [ -2.0, -0.5, -0.5 ],
        "max": [ 2.0, 0.5, 0.5 ]
    } ]
}"#;

struct Harness
{
    assets: TempDir,
    slot: Arc<SceneSlot>,
    progress: Arc<LastProgress>,
    loader: SceneLoader<ThreadPool>,
}
impl Harness
{
    fn new() -> Self
    {
        let assets = tempfile::tempdir().unwrap();
        std::fs::create_dir(assets.path().join("models")).unwrap();
        std::fs::write(assets.path().join("models/robot.gltf"), ROBOT_GLTF).unwrap();
        std::fs::write(assets.path().join("models/robot.model"), ROBOT_GLTF).unwrap();

        let config = loader_kiln::LoaderConfig
        {
            assets_root: Some(assets.path().to_path_buf()),
            progress_chunk_size: 32,
            worker_threads: 2,
            ..Default::default()
        };

        let slot = Arc::new(SceneSlot::new(Some(Arc::new(Scene::new("main")))));
        let progress = Arc::new(LastProgress::default());
        let loader = SceneLoader::new(config.build_thread_pool().unwrap(), Arc::new(config.gltf_fetcher()))
            .with_scene_provider(slot.clone())
            .with_progress_sink(progress.clone());

        Self { assets, slot, progress, loader }
    }

    fn load(&self, file_name: &str, plugin_extension: Option<&str>, options: &SceneLoaderOptions) -> Result<Arc<scene_kiln::Model>, SceneLoadError>
    {
        block_on(self.loader.load("models", file_name, plugin_extension, options))
    }
}

#[test]
fn loads_gltf_hierarchy()
{
    let harness = Harness::new();
    let options = SceneLoaderOptions { scale_to_dimension: Some(2.0), receive_shadows: true, ..Default::default() };
    let model = harness.load("robot.gltf", None, &options).unwrap();

    assert_eq!("robot.gltf-root-model", model.root.name);
    assert_eq!("gltf", model.loader_name);
    assert_abs_diff_eq!(Vec3::splat(0.5), model.root.transform.scale);

    let (body_index, body) = model.find_mesh("body").unwrap();
    assert_eq!(MeshParent::Root, body.parent);
    assert!(body.receive_shadows);

    let (_, arm) = model.find_mesh("arm").unwrap();
    assert_eq!(MeshParent::Mesh(body_index), arm.parent);

    let bounds = model.world_bounds().unwrap();
    assert_abs_diff_eq!(Vec3::new(2.0, 0.5, 0.5), bounds.size(), epsilon = 1e-5);
}

#[test]
fn repeated_loads_share_model()
{
    let harness = Harness::new();
    let options = SceneLoaderOptions::default();

    let first = harness.load("robot.gltf", None, &options).unwrap();
    let second = harness.load("robot.gltf", None, &options).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(1, harness.loader.cached_count());
}

#[test]
fn scene_switch_reloads()
{
    let harness = Harness::new();
    let options = SceneLoaderOptions::default();

    let first = harness.load("robot.gltf", None, &options).unwrap();
    harness.slot.set(Some(Arc::new(Scene::new("main"))));
    let second = harness.load("robot.gltf", None, &options).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

#[test]
fn plugin_extension_overrides_file_extension()
{
    let harness = Harness::new();
    let options = SceneLoaderOptions::default();

    match harness.load("robot.model", None, &options)
    {
        Err(SceneLoadError::Load(LoadFault::Fetch(fault))) => assert!(matches!(*fault, FetchFault::NoLoader { .. })),
        other => panic!("Expected no loader, got {other:?}"),
    }

    // failures stick until the scene changes
    harness.slot.set(Some(Arc::new(Scene::new("main"))));
    let model = harness.load("robot.model", Some(".gltf"), &options).unwrap();
    assert_eq!(2, model.meshes.len());
}

#[test]
fn missing_file()
{
    let harness = Harness::new();
    match harness.load("missing.glb", None, &SceneLoaderOptions::default())
    {
        Err(SceneLoadError::Load(LoadFault::Fetch(fault))) => match &*fault
        {
            FetchFault::Io { path, .. } => assert_eq!(harness.assets.path().join("models").join("missing.glb"), *path),
            other => panic!("Expected an io fault, got {other:?}"),
        },
        other => panic!("Expected a fetch fault, got {other:?}"),
    }
}

#[test]
fn progress_reaches_the_end()
{
    let harness = Harness::new();
    let options = SceneLoaderOptions { report_progress: true, ..Default::default() };
    harness.load("robot.gltf", None, &options).unwrap();

    let last = harness.progress.last().unwrap();
    assert!(last.length_computable);
    assert_eq!(ROBOT_GLTF.len() as u64, last.total);
    assert_eq!(Some(1.0), last.fraction());
}

#[test]
fn no_scene()
{
    let harness = Harness::new();
    harness.slot.set(None);
    let result = harness.load("robot.gltf", None, &SceneLoaderOptions::default());
    assert!(matches!(result, Err(SceneLoadError::Configuration(_))));
    assert_eq!(0, harness.loader.cached_count());
}
