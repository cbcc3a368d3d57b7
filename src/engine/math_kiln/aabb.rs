use glam::{Mat4, Vec3};

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct AABB
{
    pub min: Vec3,
    pub max: Vec3,
}
impl AABB
{
    pub const MAX_MIN: Self = Self { min: Vec3::MAX, max: Vec3::MIN }; // for finding min volume

    #[inline] #[must_use] pub const fn new(min: Vec3, max: Vec3) -> Self { Self { min, max } }
    #[inline] #[must_use] pub const fn empty() -> Self { Self { min: Vec3::ZERO, max: Vec3::ZERO } }

    #[inline] #[must_use] pub fn size(self) -> Vec3 { self.max - self.min }
    #[inline] #[must_use] pub fn center(self) -> Vec3 { (self.min + self.max) / 2.0 }

    // min <= max on all axes (MAX_MIN is not valid until something is unioned into it)
    #[inline] #[must_use]
    pub fn is_valid(self) -> bool
    {
        self.min.cmple(self.max).all()
    }

    #[inline] #[must_use]
    pub fn max_axis(self) -> f32
    {
        let size = self.size();
        size.x.max(size.y.max(size.z))
    }

    #[inline]
    pub fn union_with(&mut self, other: Self)
    {
        *self = self.unioned_with(other);
    }

    #[inline] #[must_use]
    pub fn unioned_with(self, rhs: Self) -> Self
    {
        Self
        {
            min: self.min.min(rhs.min),
            max: self.max.max(rhs.max),
        }
    }

    #[must_use]
    pub fn corners(self) -> [Vec3; 8]
    {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    // the axis-aligned box enclosing this box after transformation
    #[must_use]
    pub fn transformed_by(self, mtx: Mat4) -> Self
    {
        self.corners().into_iter().fold(Self::MAX_MIN, |acc, corner|
        {
            let p = mtx.transform_point3(corner);
            Self
            {
                min: acc.min.min(p),
                max: acc.max.max(p),
            }
        })
    }
}
