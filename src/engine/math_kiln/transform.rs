use glam::{Mat4, Quat, Vec3};

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Transform
{
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}
impl Default for Transform
{
    fn default() -> Self { Self
    {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    }}
}
impl Transform
{
    pub const IDENTITY: Self = Self { position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE };

    #[inline] #[must_use]
    pub fn from_position(position: Vec3) -> Self
    {
        Self { position, ..Self::IDENTITY }
    }

    #[inline] #[must_use]
    pub fn from_scale(scale: Vec3) -> Self
    {
        Self { scale, ..Self::IDENTITY }
    }

    #[inline]
    pub fn set_uniform_scale(&mut self, scale: f32)
    {
        self.scale = Vec3::splat(scale);
    }

    #[inline] #[must_use]
    pub fn to_world_mtx(&self) -> Mat4 { Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position) }
}

impl From<(Vec3, Quat, Vec3)> for Transform
{
    fn from((position, rotation, scale): (Vec3, Quat, Vec3)) -> Self
    {
        Transform { position, rotation, scale }
    }
}
impl From<Transform> for Mat4
{
    fn from(t: Transform) -> Self { t.to_world_mtx() }
}
impl From<Mat4> for Transform
{
    fn from(m: Mat4) -> Self
    {
        let (scale, rotation, position) = m.to_scale_rotation_translation();
        Transform { position, rotation, scale }
    }
}
