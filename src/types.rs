//! Contains the image and count types needed across the crate.

use crate::{ColorComponents, MAX_CLUSTERS, MAX_PIXELS, SENTINEL};
use palette::cast::{self, AsArrays};
use std::{
    error::Error,
    fmt::{Debug, Display},
};
#[cfg(feature = "image")]
use image::RgbImage;

/// An error type for when the length of an input (e.g., `Vec` or slice)
/// is above the maximum supported value.
///
/// The inner value is the maximum supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AboveMaxLen<T>(pub T);

impl<T: Display> Display for AboveMaxLen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "above the maximum length of {}", self.0)
    }
}

impl<T: Debug + Display> Error for AboveMaxLen<T> {}

/// An error type for when planar channel buffers do not have the shape given by the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMismatch {
    /// `width * height` is larger than [`MAX_PIXELS`].
    TooManyPixels(AboveMaxLen<u32>),
    /// Two images that must have the same shape have different dimensions.
    Dimensions {
        /// The expected `(width, height)`.
        expected: (u32, u32),
        /// The `(width, height)` that was provided.
        actual: (u32, u32),
    },
    /// A channel (or interleaved pixel slice) does not have `width * height` elements.
    Length {
        /// The expected length, `width * height`.
        expected: usize,
        /// The length that was provided.
        actual: usize,
    },
}

impl Display for ShapeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeMismatch::TooManyPixels(err) => write!(f, "image size is {err}"),
            ShapeMismatch::Dimensions { expected, actual } => write!(
                f,
                "expected an image of size {expected:?} but got one of size {actual:?}"
            ),
            ShapeMismatch::Length { expected, actual } => write!(
                f,
                "expected a buffer of {expected} pixels (width * height) but got {actual}"
            ),
        }
    }
}

impl Error for ShapeMismatch {}

impl From<AboveMaxLen<u32>> for ShapeMismatch {
    fn from(err: AboveMaxLen<u32>) -> Self {
        Self::TooManyPixels(err)
    }
}

/// Returns `width * height` as a `usize`, or an error if it is above [`MAX_PIXELS`].
#[allow(clippy::cast_possible_truncation)]
fn num_pixels(width: u32, height: u32) -> Result<usize, AboveMaxLen<u32>> {
    let len = u64::from(width) * u64::from(height);
    if len <= u64::from(MAX_PIXELS) {
        Ok(len as usize)
    } else {
        Err(AboveMaxLen(MAX_PIXELS))
    }
}

/// Ensures that a buffer of length `actual` matches `expected`.
fn check_len(expected: usize, actual: usize) -> Result<(), ShapeMismatch> {
    if expected == actual {
        Ok(())
    } else {
        Err(ShapeMismatch::Length { expected, actual })
    }
}

/// A read-only view over three equal-length channel buffers in row-major order.
///
/// The pixel at column `col` and row `row` is found at index `col + row * width`
/// in each of the three channels.
///
/// # Examples
/// ```
/// # use seedmeans::{PlanarImage, ShapeMismatch};
/// # fn main() -> Result<(), ShapeMismatch> {
/// let red: [u8; 2] = [255, 0];
/// let green: [u8; 2] = [0, 255];
/// let blue: [u8; 2] = [0, 0];
/// let image = PlanarImage::new(2, 1, [&red[..], &green[..], &blue[..]])?;
/// assert_eq!(image.pixel(1), [0, 255, 0]);
///
/// // channel lengths must match the dimensions
/// assert!(PlanarImage::new(3, 1, [&red[..], &green[..], &blue[..]]).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanarImage<'a> {
    /// The width of the image in pixels.
    width: u32,
    /// The height of the image in pixels.
    height: u32,
    /// The three channels, each of length `width * height`.
    channels: [&'a [u8]; 3],
}

impl<'a> PlanarImage<'a> {
    /// Creates a new [`PlanarImage`] after checking that each channel has `width * height` elements.
    pub fn new(width: u32, height: u32, channels: [&'a [u8]; 3]) -> Result<Self, ShapeMismatch> {
        let len = num_pixels(width, height)?;
        for channel in channels {
            check_len(len, channel.len())?;
        }
        Ok(Self { width, height, channels })
    }

    /// Returns the width of the image.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the `(width, height)` of the image.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the number of pixels in the image.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Returns whether the image has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the three channels of the image.
    #[must_use]
    pub const fn channels(&self) -> [&'a [u8]; 3] {
        self.channels
    }

    /// Returns the channel triplet of the pixel at the given row-major index.
    ///
    /// # Panics
    /// Panics if `index` is not less than [`PlanarImage::len`].
    #[must_use]
    pub fn pixel(&self, index: usize) -> [u8; 3] {
        self.channels.map(|channel| channel[index])
    }

    /// Returns the channel triplet of the pixel at the given column and row,
    /// or `None` if the coordinate lies outside the image.
    #[must_use]
    pub fn pixel_at(&self, col: u32, row: u32) -> Option<[u8; 3]> {
        if col < self.width && row < self.height {
            Some(self.pixel(col as usize + row as usize * self.width as usize))
        } else {
            None
        }
    }

    /// Returns an iterator over the channel triplets of every pixel in row-major order.
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = [u8; 3]> + '_ {
        let [c0, c1, c2] = self.channels;
        c0.iter()
            .zip(c1)
            .zip(c2)
            .map(|((&a, &b), &c)| [a, b, c])
    }
}

/// An owned three-channel planar buffer.
///
/// This is the output type of the clustering functions, and it can also be used
/// to hold an input image before borrowing it via [`PlanarBuffer::as_image`].
///
/// # Examples
/// From interleaved colors:
/// ```
/// # use seedmeans::{PlanarBuffer, ShapeMismatch};
/// # use palette::Srgb;
/// # fn main() -> Result<(), ShapeMismatch> {
/// let colors = vec![Srgb::new(1u8, 2, 3), Srgb::new(4, 5, 6)];
/// let buffer = PlanarBuffer::from_interleaved(2, 1, &colors)?;
/// assert_eq!(buffer.channels()[2], vec![3, 6]);
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use seedmeans::PlanarBuffer;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
/// let buffer = PlanarBuffer::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarBuffer {
    /// The width of the image in pixels.
    width: u32,
    /// The height of the image in pixels.
    height: u32,
    /// The three channels, each of length `width * height`.
    channels: [Vec<u8>; 3],
}

impl PlanarBuffer {
    /// Creates a new [`PlanarBuffer`] with every channel value set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self, AboveMaxLen<u32>> {
        let len = num_pixels(width, height)?;
        Ok(Self {
            width,
            height,
            channels: [vec![value; len], vec![value; len], vec![value; len]],
        })
    }

    /// Creates a new [`PlanarBuffer`] filled with the [`SENTINEL`] value.
    pub fn sentinel(width: u32, height: u32) -> Result<Self, AboveMaxLen<u32>> {
        Self::filled(width, height, SENTINEL)
    }

    /// Creates a [`PlanarBuffer`] with the same shape as `image`, filled with the [`SENTINEL`] value.
    pub(crate) fn sentinel_like(image: &PlanarImage) -> Self {
        let (width, height) = image.dimensions();
        let len = image.len();
        Self {
            width,
            height,
            channels: [vec![SENTINEL; len], vec![SENTINEL; len], vec![SENTINEL; len]],
        }
    }

    /// Creates a new [`PlanarBuffer`] from three owned channels.
    pub fn from_channels(width: u32, height: u32, channels: [Vec<u8>; 3]) -> Result<Self, ShapeMismatch> {
        let len = num_pixels(width, height)?;
        for channel in &channels {
            check_len(len, channel.len())?;
        }
        Ok(Self { width, height, channels })
    }

    /// Splits a slice of interleaved channel triplets into a [`PlanarBuffer`].
    pub fn from_arrays(width: u32, height: u32, pixels: &[[u8; 3]]) -> Result<Self, ShapeMismatch> {
        let len = num_pixels(width, height)?;
        check_len(len, pixels.len())?;

        let mut channels = [
            Vec::with_capacity(len),
            Vec::with_capacity(len),
            Vec::with_capacity(len),
        ];

        for pixel in pixels {
            for (channel, &value) in channels.iter_mut().zip(pixel) {
                channel.push(value);
            }
        }

        Ok(Self { width, height, channels })
    }

    /// Splits a slice of interleaved colors (e.g., `palette::Srgb<u8>`) into a [`PlanarBuffer`].
    ///
    /// The first component of each color goes to channel 0, the second to channel 1, and so on.
    pub fn from_interleaved<Color>(width: u32, height: u32, colors: &[Color]) -> Result<Self, ShapeMismatch>
    where
        Color: ColorComponents<u8, 3>,
    {
        Self::from_arrays(width, height, colors.as_arrays())
    }

    /// Merges the channels back into a `Vec` of interleaved colors.
    #[must_use]
    pub fn to_interleaved<Color>(&self) -> Vec<Color>
    where
        Color: ColorComponents<u8, 3>,
    {
        self.as_image().pixels().map(cast::from_array).collect()
    }

    /// Borrows this buffer as a [`PlanarImage`].
    #[must_use]
    pub fn as_image(&self) -> PlanarImage<'_> {
        let [c0, c1, c2] = &self.channels;
        PlanarImage {
            width: self.width,
            height: self.height,
            channels: [c0, c1, c2],
        }
    }

    /// Returns the width of the image.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the `(width, height)` of the image.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the number of pixels in the image.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Returns whether the image has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the three channels.
    #[must_use]
    pub const fn channels(&self) -> &[Vec<u8>; 3] {
        &self.channels
    }

    /// Returns the channel triplet of the pixel at the given row-major index.
    ///
    /// # Panics
    /// Panics if `index` is not less than [`PlanarBuffer::len`].
    #[must_use]
    pub fn pixel(&self, index: usize) -> [u8; 3] {
        self.as_image().pixel(index)
    }

    /// Writes a channel triplet to the pixel at the given row-major index.
    #[inline]
    pub(crate) fn set_pixel(&mut self, index: usize, color: [u8; 3]) {
        for (channel, value) in self.channels.iter_mut().zip(color) {
            channel[index] = value;
        }
    }

    /// Consumes the buffer and returns the three channels.
    #[must_use]
    pub fn into_channels(self) -> [Vec<u8>; 3] {
        self.channels
    }
}

impl<'a> From<&'a PlanarBuffer> for PlanarImage<'a> {
    fn from(buffer: &'a PlanarBuffer) -> Self {
        buffer.as_image()
    }
}

#[cfg(feature = "image")]
impl TryFrom<&RgbImage> for PlanarBuffer {
    type Error = ShapeMismatch;

    fn try_from(image: &RgbImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        let len = num_pixels(width, height)?;
        let pixels = image
            .as_raw()
            .get(..(len * 3))
            .ok_or(ShapeMismatch::Length { expected: len * 3, actual: image.as_raw().len() })?;

        let mut channels = [
            Vec::with_capacity(len),
            Vec::with_capacity(len),
            Vec::with_capacity(len),
        ];

        for pixel in pixels.chunks_exact(3) {
            for (channel, &value) in channels.iter_mut().zip(pixel) {
                channel.push(value);
            }
        }

        Ok(Self { width, height, channels })
    }
}

#[cfg(feature = "image")]
impl From<&PlanarBuffer> for RgbImage {
    fn from(buffer: &PlanarBuffer) -> Self {
        let (width, height) = buffer.dimensions();
        let buf = buffer.as_image().pixels().flatten().collect::<Vec<_>>();

        #[allow(clippy::expect_used)]
        {
            // the channels always have width * height elements,
            // so buf is large enough by nature of its construction
            RgbImage::from_vec(width, height, buf).expect("large enough buffer")
        }
    }
}

/// This type is used to specify the number of clusters `k`.
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// less than or equal to [`MAX_CLUSTERS`].
///
/// # Examples
/// Use `into` to create [`ClusterCount`]s from `u8`s.
/// For `u16`s, use `try_into` or [`ClusterCount::from_clamped`].
///
/// ```
/// # use seedmeans::{ClusterCount, AboveMaxLen};
/// # fn main() -> Result<(), AboveMaxLen<u16>> {
/// let k = ClusterCount::from(3);
/// let k: ClusterCount = 128u16.try_into()?;
/// let k = ClusterCount::from_clamped(1024);
/// assert_eq!(k, ClusterCount::MAX);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ClusterCount(u16);

impl ClusterCount {
    /// The maximum supported number of clusters (given by [`MAX_CLUSTERS`]).
    pub const MAX: Self = Self(MAX_CLUSTERS);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Gets the inner value as a `usize`.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Creates a [`ClusterCount`] by clamping the given `u16` to be less than or equal to [`MAX_CLUSTERS`].
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value <= MAX_CLUSTERS {
            Self(value)
        } else {
            Self(MAX_CLUSTERS)
        }
    }
}

impl From<ClusterCount> for u16 {
    fn from(val: ClusterCount) -> Self {
        val.into_inner()
    }
}

impl From<u8> for ClusterCount {
    fn from(value: u8) -> Self {
        Self(value.into())
    }
}

impl TryFrom<u16> for ClusterCount {
    type Error = AboveMaxLen<u16>;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= MAX_CLUSTERS {
            Ok(ClusterCount(value))
        } else {
            Err(AboveMaxLen(MAX_CLUSTERS))
        }
    }
}

impl Display for ClusterCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;
    use palette::Srgb;

    #[test]
    fn planar_image_rejects_bad_lengths() {
        let short = [0u8; 3];
        let full = [0u8; 4];

        assert_eq!(
            PlanarImage::new(2, 2, [&full[..], &short[..], &full[..]]),
            Err(ShapeMismatch::Length { expected: 4, actual: 3 })
        );

        assert!(PlanarImage::new(2, 2, [&full[..], &full[..], &full[..]]).is_ok());
    }

    #[test]
    fn too_many_pixels() {
        assert_eq!(
            PlanarBuffer::filled(u32::MAX, 2, 0),
            Err(AboveMaxLen(MAX_PIXELS))
        );
    }

    #[test]
    fn empty_image() {
        let image = PlanarImage::new(0, 5, [&[], &[], &[]]).unwrap();
        assert!(image.is_empty());
        assert_eq!(image.pixels().len(), 0);
        assert_eq!(image.pixel_at(0, 0), None);
    }

    #[test]
    fn row_major_indexing() {
        let image = two_by_two();
        let image = image.as_image();

        assert_eq!(image.pixel_at(0, 0), Some([10; 3]));
        assert_eq!(image.pixel_at(1, 0), Some([200; 3]));
        assert_eq!(image.pixel_at(0, 1), Some([12; 3]));
        assert_eq!(image.pixel_at(1, 1), Some([210; 3]));
        assert_eq!(image.pixel_at(2, 1), None);
        assert_eq!(image.pixel_at(1, 2), None);
    }

    #[test]
    fn interleaved_colors_keep_component_order() {
        let colors = vec![Srgb::new(1u8, 2, 3), Srgb::new(4, 5, 6), Srgb::new(7, 8, 9)];
        let buffer = PlanarBuffer::from_interleaved(3, 1, &colors).unwrap();

        assert_eq!(buffer.channels(), &[vec![1, 4, 7], vec![2, 5, 8], vec![3, 6, 9]]);
        assert_eq!(buffer.to_interleaved::<Srgb<u8>>(), colors);
    }

    #[test]
    fn sentinel_fill() {
        let buffer = PlanarBuffer::sentinel(3, 2).unwrap();
        assert_eq!(buffer.len(), 6);
        assert!(buffer.channels().iter().flatten().all(|&v| v == SENTINEL));
    }

    #[cfg(feature = "image")]
    #[test]
    fn rgbimage_split_and_merge() {
        let buffer = test_image();
        let image = RgbImage::from(buffer);
        assert_eq!(image.dimensions(), (TEST_WIDTH, TEST_HEIGHT));
        assert_eq!(image.get_pixel(3, 2).0, buffer.pixel(3 + 2 * TEST_WIDTH as usize));

        let split = PlanarBuffer::try_from(&image).unwrap();
        assert_eq!(&split, buffer);
    }

    #[test]
    fn cluster_count_bounds() {
        assert_eq!(ClusterCount::try_from(MAX_CLUSTERS), Ok(ClusterCount::MAX));
        assert_eq!(ClusterCount::try_from(MAX_CLUSTERS + 1), Err(AboveMaxLen(MAX_CLUSTERS)));
        assert_eq!(ClusterCount::from_clamped(u16::MAX), ClusterCount::MAX);
        assert_eq!(ClusterCount::from(7).as_usize(), 7);
    }
}
