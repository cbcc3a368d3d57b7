use crate::{yield_now, FetchFault, FetchRequest, ProgressEvent, ProgressReporter, ResourceFetcher};
use futures::future::{BoxFuture, FutureExt};
use glam::{Quat, Vec3};
use math_kiln::{Transform, AABB};
use scene_kiln::{RawLoadResult, RawMesh};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use unicase::UniCase;

/// Loads glTF (`.gltf` and `.glb`) files from disk.
///
/// Only the document is read: every node becomes a raw mesh (keeping the node hierarchy),
/// with bounds taken from the POSITION accessors' min/max. Buffers and images are not loaded.
///
/// Files are read with blocking IO, one chunk per poll, yielding to the executor between chunks.
/// A single-threaded executor still stalls for each chunk read, so large assets want a
/// thread pool spawner (see `LoaderConfig::build_thread_pool`).
#[derive(Debug, Clone)]
pub struct GltfFetcher
{
    assets_root: Option<PathBuf>, // relative root urls are joined onto this
    chunk_size: usize,
}
impl Default for GltfFetcher
{
    fn default() -> Self
    {
        Self
        {
            assets_root: None,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }
}
impl GltfFetcher
{
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
    pub const SUPPORTED_EXTENSIONS: &'static [&'static str] = &["glb", "gltf"];

    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_assets_root(mut self, assets_root: impl Into<PathBuf>) -> Self
    {
        self.assets_root = Some(assets_root.into());
        self
    }

    // bytes read between progress reports
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self
    {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn resolve_path(&self, root_url: &str, file_name: &str) -> PathBuf
    {
        match &self.assets_root
        {
            Some(root) => root.join(root_url).join(file_name),
            None => Path::new(root_url).join(file_name),
        }
    }

    #[must_use]
    pub fn supports(extension: &str) -> bool
    {
        let extension = UniCase::new(extension);
        Self::SUPPORTED_EXTENSIONS.iter().any(|e| UniCase::new(*e) == extension)
    }

    async fn read_file(path: &Path, chunk_size: usize, progress: &ProgressReporter) -> Result<Vec<u8>, FetchFault>
    {
        let io_fault = |source| FetchFault::Io { path: path.to_path_buf(), source };

        let mut file = File::open(path).map_err(io_fault)?;
        let total = file.metadata().map(|m| m.len()).ok();

        let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = vec![0u8; chunk_size];
        loop
        {
            let read = match file.read(&mut chunk)
            {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(io_fault(err)),
            };
            bytes.extend_from_slice(&chunk[..read]);
            progress.report(ProgressEvent::new(bytes.len() as u64, total));
            yield_now().await;
        }

        log::debug!("Read {path:?} ({}B)", nab_kiln::format_binary!(bytes.len()));
        Ok(bytes)
    }

    fn parse(bytes: &[u8]) -> Result<RawLoadResult, FetchFault>
    {
        let gltf = gltf::Gltf::from_slice(bytes).map_err(|err| FetchFault::Parse(err.to_string()))?;

        let mut parents = vec![None; gltf.nodes().len()];
        for node in gltf.nodes()
        {
            for child in node.children()
            {
                parents[child.index()] = Some(node.index());
            }
        }

        let meshes = gltf.nodes().map(|node|
        {
            let name = node.name()
                .or_else(|| node.mesh().and_then(|m| m.name()))
                .map_or_else(|| format!("node{}", node.index()), str::to_string);

            let (translation, rotation, scale) = node.transform().decomposed();
            let mut raw = RawMesh::new(name).with_transform(Transform
            {
                position: Vec3::from(translation),
                rotation: Quat::from_array(rotation),
                scale: Vec3::from(scale),
            });

            if let Some(parent) = parents[node.index()]
            {
                raw = raw.with_parent(parent);
            }
            if let Some(bounds) = node.mesh().and_then(|m| m.primitives().filter_map(|p| Self::primitive_bounds(&p)).reduce(AABB::unioned_with))
            {
                raw = raw.with_bounds(bounds);
            }
            raw
        }).collect();

        Ok(RawLoadResult
        {
            meshes,
            particle_systems: Vec::new(),
            skeletons: gltf.skins().map(|s| s.name().map_or_else(|| format!("skin{}", s.index()), str::to_string)).collect(),
            animation_groups: gltf.animations().map(|a| a.name().map_or_else(|| format!("animation{}", a.index()), str::to_string)).collect(),
            loader_name: Some("gltf".to_string()),
        })
    }

    // min/max are optional on accessors, skip primitives without them
    fn primitive_bounds(primitive: &gltf::Primitive) -> Option<AABB>
    {
        let positions = primitive.get(&gltf::Semantic::Positions)?;
        let min = json_vec3(&positions.min()?)?;
        let max = json_vec3(&positions.max()?)?;
        Some(AABB::new(min, max))
    }
}
impl ResourceFetcher for GltfFetcher
{
    fn name(&self) -> &str { "gltf" }

    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, Result<RawLoadResult, FetchFault>>
    {
        let path = self.resolve_path(&request.root_url, &request.file_name);
        let chunk_size = self.chunk_size;
        async move
        {
            match request.extension()
            {
                Some(ext) if Self::supports(ext) => {},
                other => return Err(FetchFault::NoLoader { extension: other.unwrap_or_default().to_string() }),
            }

            let bytes = Self::read_file(&path, chunk_size, &request.progress).await?;
            Self::parse(&bytes)
        }.boxed()
    }
}

fn json_vec3(value: &gltf::json::Value) -> Option<Vec3>
{
    match value.as_array()?.as_slice()
    {
        [x, y, z] => Some(Vec3::new(x.as_f64()? as f32, y.as_f64()? as f32, z.as_f64()? as f32)),
        _ => None,
    }
}
