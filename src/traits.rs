use palette::cast::ArrayCast;

/// A color type that can be cast to and from an array of `N` components.
///
/// This is implemented for any type implementing [`ArrayCast`], for example `palette::Srgb<u8>`
/// with `Component = u8` and `N = 3`.
pub trait ColorComponents<Component, const N: usize>:
    ArrayCast<Array = [Component; N]> + Copy + 'static
{
}

impl<Color, Component, const N: usize> ColorComponents<Component, N> for Color where
    Color: ArrayCast<Array = [Component; N]> + Copy + 'static
{
}
