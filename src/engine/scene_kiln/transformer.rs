use crate::{Mesh, MeshParent, Model, RawLoadResult, RootNode, NO_LOADER_NAME};
use math_kiln::Transform;

#[derive(Debug, thiserror::Error)]
pub enum TransformFault
{
    #[error("mesh {mesh:?} names parent {parent} but only {count} meshes were loaded")]
    InvalidParent { mesh: String, parent: usize, count: usize },
    #[error("mesh {mesh:?} is its own ancestor")]
    ParentCycle { mesh: String },
    #[error("transform rejected the load: {0}")]
    Rejected(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TransformOptions
{
    pub receive_shadows: bool,
    pub scale_to_dimension: Option<f32>,
    pub always_select_as_active_mesh: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest
{
    pub file_name: String,
    pub options: TransformOptions,
}

// Turns a raw fetch result into the final model
pub trait ModelTransformer: Send + Sync
{
    fn transform(&self, raw: RawLoadResult, request: &TransformRequest) -> Result<Model, TransformFault>;
}

/// Builds a model under a synthetic root node.
///
/// Meshes the fetch left unparented are attached to the root; meshes with a parent keep it.
/// Shadow and active flags are applied per the options, and when a target dimension is
/// given the root is uniformly scaled so the model's longest axis matches it. A model with
/// no geometry is left unscaled.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardModelTransformer;
impl StandardModelTransformer
{
    fn validate_hierarchy(raw: &RawLoadResult) -> Result<(), TransformFault>
    {
        let count = raw.meshes.len();
        for mesh in &raw.meshes
        {
            match mesh.parent
            {
                Some(parent) if parent >= count =>
                    return Err(TransformFault::InvalidParent { mesh: mesh.name.clone(), parent, count }),
                _ => {},
            }
        }

        for (index, mesh) in raw.meshes.iter().enumerate()
        {
            let mut current = mesh.parent;
            let mut steps = 0;
            while let Some(p) = current
            {
                steps += 1;
                if p == index || steps > count
                {
                    return Err(TransformFault::ParentCycle { mesh: mesh.name.clone() });
                }
                current = raw.meshes[p].parent;
            }
        }
        Ok(())
    }
}
impl ModelTransformer for StandardModelTransformer
{
    fn transform(&self, raw: RawLoadResult, request: &TransformRequest) -> Result<Model, TransformFault>
    {
        Self::validate_hierarchy(&raw)?;

        let options = &request.options;
        let root = RootNode
        {
            name: format!("{}-root-model", request.file_name),
            transform: Transform::IDENTITY,
            always_select_as_active_mesh: options.always_select_as_active_mesh,
        };

        let meshes = raw.meshes.into_iter().map(|raw_mesh| Mesh
        {
            name: raw_mesh.name,
            // leave meshes already parented to maintain the model hierarchy
            parent: raw_mesh.parent.map_or(MeshParent::Root, MeshParent::Mesh),
            transform: raw_mesh.transform,
            bounds: raw_mesh.bounds,
            receive_shadows: options.receive_shadows,
        }).collect();

        let mut model = Model
        {
            name: request.file_name.clone(),
            root,
            meshes,
            particle_systems: raw.particle_systems,
            skeletons: raw.skeletons,
            animation_groups: raw.animation_groups,
            loader_name: raw.loader_name.unwrap_or_else(|| NO_LOADER_NAME.to_string()),
        };

        match options.scale_to_dimension
        {
            Some(dimension) if !(dimension.is_finite() && dimension > 0.0) =>
                log::warn!("Ignoring scale to {dimension} for {:?}, the dimension must be positive", model.name),
            Some(dimension) => match model.root_space_bounds()
            {
                Some(bounds) if bounds.max_axis() > 0.0 =>
                {
                    let scale = dimension / bounds.max_axis();
                    model.root.transform.set_uniform_scale(scale);
                },
                _ => log::debug!("{:?} has no extents, skipping scale to {dimension}", model.name),
            },
            None => {},
        }

        Ok(model)
    }
}
