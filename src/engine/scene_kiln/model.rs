use glam::Mat4;
use math_kiln::{Transform, AABB};

pub const NO_LOADER_NAME: &str = "no loader found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshParent
{
    Root, // the model's synthetic root node
    Mesh(usize), // index into Model::meshes
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh
{
    pub name: String,
    pub parent: MeshParent,
    pub transform: Transform,
    pub bounds: Option<AABB>,
    pub receive_shadows: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootNode
{
    pub name: String,
    pub transform: Transform,
    pub always_select_as_active_mesh: bool,
}

/// The final, post-processed representation of a loaded resource.
///
/// Loaded models are shared between every caller that requested the same key in the same
/// scene, so they are handed out behind an `Arc` and treated as read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Model
{
    pub name: String,
    pub root: RootNode,
    pub meshes: Vec<Mesh>,
    pub particle_systems: Vec<String>,
    pub skeletons: Vec<String>,
    pub animation_groups: Vec<String>,
    pub loader_name: String,
}
impl Model
{
    #[must_use]
    pub fn find_mesh(&self, name: &str) -> Option<(usize, &Mesh)>
    {
        self.meshes.iter().enumerate().find(|(_, m)| m.name == name)
    }

    // Meshes parented directly to the root
    pub fn root_children(&self) -> impl Iterator<Item = usize> + '_
    {
        self.meshes.iter().enumerate()
            .filter(|(_, m)| m.parent == MeshParent::Root)
            .map(|(i, _)| i)
    }

    pub fn children_of(&self, parent: usize) -> impl Iterator<Item = usize> + '_
    {
        self.meshes.iter().enumerate()
            .filter(move |(_, m)| m.parent == MeshParent::Mesh(parent))
            .map(|(i, _)| i)
    }

    // Mesh space -> root space, not including the root's own transform
    #[must_use]
    pub fn root_space_mtx(&self, mesh_index: usize) -> Mat4
    {
        let mut mtx = Mat4::IDENTITY;
        let mut current = Some(mesh_index);
        let mut depth = 0;
        while let Some(index) = current
        {
            let mesh = &self.meshes[index];
            mtx = mesh.transform.to_world_mtx() * mtx;
            current = match mesh.parent
            {
                MeshParent::Root => None,
                MeshParent::Mesh(p) => Some(p),
            };

            // models are built acyclic, this only guards against hand-edited ones
            depth += 1;
            if depth > self.meshes.len()
            {
                log::error!("Mesh parent cycle detected in model {:?}", self.name);
                break;
            }
        }
        mtx
    }

    #[inline] #[must_use]
    pub fn world_mtx(&self, mesh_index: usize) -> Mat4
    {
        self.root.transform.to_world_mtx() * self.root_space_mtx(mesh_index)
    }

    // Bounds of all meshes in root space, None if no mesh has geometry
    #[must_use]
    pub fn root_space_bounds(&self) -> Option<AABB>
    {
        self.bounds_by(|i| self.root_space_mtx(i))
    }

    #[must_use]
    pub fn world_bounds(&self) -> Option<AABB>
    {
        self.bounds_by(|i| self.world_mtx(i))
    }

    fn bounds_by(&self, mtx_fn: impl Fn(usize) -> Mat4) -> Option<AABB>
    {
        self.meshes.iter().enumerate()
            .filter_map(|(i, m)| m.bounds.map(|b| b.transformed_by(mtx_fn(i))))
            .reduce(AABB::unioned_with)
    }
}
