use std::fmt::{Display, Formatter};

// A byte count, displayed with a binary unit prefix (Ki, Mi, Gi). `{:#}` puts a space before the prefix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatBinary
{
    pub bytes: f64
}
impl FormatBinary
{
    const PREFIXES: [&'static str; 4] = ["Ki", "Mi", "Gi", "Ti"];
    pub const KIBI: f64 = 1024.0;

    fn scaled(self) -> (f64, &'static str)
    {
        let mut value = self.bytes;
        let mut prefix = "";
        for next in Self::PREFIXES
        {
            if value <= Self::KIBI
            {
                break;
            }
            value /= Self::KIBI;
            prefix = next;
        }
        (value, prefix)
    }
}
impl Display for FormatBinary
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        let (value, prefix) = self.scaled();
        Display::fmt(&value, f)?;
        if f.alternate() && !prefix.is_empty() { f.write_str(" ")?; }
        f.write_str(prefix)
    }
}
#[macro_export]
macro_rules! format_binary
{
    ($val:expr) => { $crate::utils::FormatBinary { bytes: $val as f64 } };
}

pub trait ShortTypeName
{
    fn short_type_name() -> &'static str;
}
impl<T: ?Sized> ShortTypeName for T
{
    #[inline]
    fn short_type_name() -> &'static str
    {
        let type_name = std::any::type_name::<T>();
        match type_name.rfind(':')
        {
            None => type_name,
            Some(i) => &type_name[(i + 1)..]
        }
    }
}
