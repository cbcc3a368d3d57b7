use math_kiln::{Transform, AABB};

// A mesh as produced by a fetcher, before any post-processing
#[derive(Debug, Clone, PartialEq)]
pub struct RawMesh
{
    pub name: String,
    pub parent: Option<usize>, // index into RawLoadResult::meshes
    pub transform: Transform, // relative to the parent
    pub bounds: Option<AABB>, // local space, None for meshes with no geometry
}
impl RawMesh
{
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self
    {
        Self
        {
            name: name.into(),
            parent: None,
            transform: Transform::IDENTITY,
            bounds: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: usize) -> Self
    {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: AABB) -> Self
    {
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self
    {
        self.transform = transform;
        self
    }
}

/// Everything a fetch produced for one resource.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawLoadResult
{
    pub meshes: Vec<RawMesh>,
    pub particle_systems: Vec<String>,
    pub skeletons: Vec<String>,
    pub animation_groups: Vec<String>,
    pub loader_name: Option<String>, // the plugin that parsed the resource
}
