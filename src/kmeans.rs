//! Seeded k-means over planar three-channel images.
//!
//! Each cluster starts from the color of a caller-supplied seed pixel. The algorithm then
//! alternates between two steps until no centroid changes or the iteration cap is reached:
//! 1. The convergence check: every centroid is set to the mean color (truncated to an integer)
//!    of the pixels that were assigned to it.
//! 2. The assignment pass: every pixel is assigned to its nearest centroid, and the output pixel
//!    is set to that centroid's color.
//!
//! Before the first convergence check, every centroid is zero and its accumulator holds only the
//! seed color. So the first check reports a change (unless the seed color is black) and at least one
//! assignment pass runs even when the seeds are already a fixed point.
//!
//! The loop stops as soon as a convergence check reports no change. The output is the one written
//! by the last assignment pass; no extra pass is run with the centroids from the final check.
//!
//! # Examples
//! ```
//! # use seedmeans::{kmeans, KmeansOptions, PlanarBuffer};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = PlanarBuffer::from_arrays(2, 2, &[[10; 3], [200; 3], [12; 3], [210; 3]])?;
//! let options = KmeansOptions::from_points([(0, 0), (1, 1)]);
//!
//! let mut centroids = Vec::new();
//! let (posterized, output) = kmeans::quantize_with_observer(image.as_image(), &options, |iteration| {
//!     centroids.push(iteration.centroids.to_vec());
//! })?;
//!
//! assert_eq!(centroids, vec![vec![[10; 3], [210; 3]], vec![[11; 3], [205; 3]]]);
//! assert_eq!(output.indices, vec![0, 1, 0, 1]);
//! assert!(output.converged);
//! assert_eq!(posterized.pixel(3), [205; 3]);
//! # Ok(())
//! # }
//! ```

use crate::{
    ColorComponents, DistanceMode, KmeansOptions, PlanarBuffer, PlanarImage, SeedError,
    ShapeMismatch, MAX_K,
};
use palette::cast;
use std::{error::Error, fmt::Display};

/// Returns the per-channel signed difference `a - b`.
#[must_use]
#[inline]
pub fn channelwise_difference(a: [u8; 3], b: [u8; 3]) -> [i16; 3] {
    [0, 1, 2].map(|c| i16::from(a[c]) - i16::from(b[c]))
}

/// Returns the squared euclidean distance between two channel triplets.
#[must_use]
#[inline]
pub fn squared_color_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    channelwise_difference(a, b)
        .into_iter()
        .map(|d| {
            let d = u32::from(d.unsigned_abs());
            d * d
        })
        .sum()
}

/// Returns the sum of the squared per-channel differences,
/// where each difference wraps around in 8 bits before it is squared.
///
/// See [`DistanceMode::Wrapping`].
#[must_use]
#[inline]
pub fn wrapping_squared_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    [0, 1, 2]
        .into_iter()
        .map(|c| {
            let d = u32::from(a[c].wrapping_sub(b[c]));
            d * d
        })
        .sum()
}

impl DistanceMode {
    /// Computes the distance between a pixel and a centroid under this mode.
    #[must_use]
    #[inline]
    pub fn distance(self, pixel: [u8; 3], centroid: [u8; 3]) -> u32 {
        match self {
            DistanceMode::Exact => squared_color_distance(pixel, centroid),
            DistanceMode::Wrapping => wrapping_squared_distance(pixel, centroid),
        }
    }
}

/// Returns the index of the centroid nearest to `pixel`, or `None` if `centroids` is empty.
///
/// If several centroids are equally near, the one with the lowest index is returned.
#[must_use]
#[inline]
pub fn nearest_centroid(pixel: [u8; 3], centroids: &[[u8; 3]], mode: DistanceMode) -> Option<usize> {
    let mut nearest = None;
    let mut min_distance = u32::MAX;
    for (i, &centroid) in centroids.iter().enumerate() {
        let distance = mode.distance(pixel, centroid);
        if nearest.is_none() || distance < min_distance {
            min_distance = distance;
            nearest = Some(i);
        }
    }
    nearest
}

/// The running per-cluster channel sums and pixel counts used to compute the next centroids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Accumulator {
    /// The channel sums for each cluster.
    sums: Vec<[u64; 3]>,
    /// The number of pixels added to each cluster.
    counts: Vec<u32>,
}

impl Accumulator {
    /// Creates an accumulator where each cluster holds only the color of its seed.
    fn seeded(seed_colors: impl ExactSizeIterator<Item = [u8; 3]>) -> Self {
        let k = seed_colors.len();
        Self {
            sums: seed_colors.map(|color| color.map(u64::from)).collect(),
            counts: vec![1; k],
        }
    }

    /// Clears all sums and counts.
    fn reset(&mut self) {
        self.sums.fill([0; 3]);
        self.counts.fill(0);
    }

    /// Adds a pixel to the given cluster.
    #[inline]
    fn add(&mut self, cluster: usize, pixel: [u8; 3]) {
        let sum = &mut self.sums[cluster];
        for (s, c) in sum.iter_mut().zip(pixel) {
            *s += u64::from(c);
        }
        self.counts[cluster] += 1;
    }

    /// Returns the truncated mean color of each cluster, or `None` for clusters with no pixels.
    #[allow(clippy::cast_possible_truncation)]
    fn means(&self) -> impl Iterator<Item = Option<[u8; 3]>> + '_ {
        self.sums.iter().zip(&self.counts).map(|(sum, &count)| {
            (count > 0).then(|| {
                let count = u64::from(count);
                // the mean of u8 values always fits in a u8
                sum.map(|s| (s / count) as u8)
            })
        })
    }

    /// The number of pixels added to each cluster.
    fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// The total number of pixels added across all clusters.
    fn total_count(&self) -> u64 {
        self.counts.iter().copied().map(u64::from).sum()
    }
}

/// The current centroid color of each cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CentroidSet(Vec<[u8; 3]>);

impl CentroidSet {
    /// Creates `k` unset (all zero) centroids.
    fn unset(k: usize) -> Self {
        Self(vec![[0; 3]; k])
    }

    /// Moves each centroid to the mean of its accumulated pixels.
    ///
    /// Returns whether any centroid changed.
    /// A cluster with no pixels keeps its current centroid.
    fn update(&mut self, accumulator: &Accumulator) -> bool {
        let mut changed = false;
        for (centroid, mean) in self.0.iter_mut().zip(accumulator.means()) {
            if let Some(mean) = mean {
                if *centroid != mean {
                    *centroid = mean;
                    changed = true;
                }
            }
        }
        changed
    }

    /// The centroid colors.
    fn colors(&self) -> &[[u8; 3]] {
        &self.0
    }
}

/// The state of one completed assignment pass, given to the observer of
/// [`quantize_with_observer`] and [`quantize_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration<'a> {
    /// The number of this assignment pass, starting at `1`.
    pub pass: u32,
    /// The centroid colors that the pixels were assigned to during this pass.
    pub centroids: &'a [[u8; 3]],
    /// The number of pixels assigned to each centroid during this pass.
    pub counts: &'a [u32],
}

/// The output struct returned by the clustering functions (alongside the posterized image).
///
/// `palette` holds the centroid colors used by the last assignment pass, and `counts` and `indices`
/// describe that pass. If no pass ran, `palette` is all zeros, `counts` is all zeros,
/// and `indices` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuantizeOutput {
    /// The centroid color of each cluster.
    ///
    /// The colors are not guaranteed to be unique.
    pub palette: Vec<[u8; 3]>,
    /// The number of pixels assigned to each cluster.
    ///
    /// Each count is not guaranteed to be non-zero.
    pub counts: Vec<u32>,
    /// The cluster index of each pixel in row-major order.
    pub indices: Vec<u8>,
    /// The number of assignment passes performed.
    pub passes: u32,
    /// Whether the loop stopped because no centroid changed (as opposed to reaching the iteration cap).
    pub converged: bool,
}

impl QuantizeOutput {
    /// Returns the palette as colors of the given type (e.g., `palette::Srgb<u8>`).
    #[must_use]
    pub fn palette_colors<Color>(&self) -> Vec<Color>
    where
        Color: ColorComponents<u8, 3>,
    {
        self.palette.iter().copied().map(cast::from_array).collect()
    }
}

/// An error type for [`quantize_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizeError {
    /// The seeds are not valid for the given `k` or image.
    Seed(SeedError),
    /// The output buffer does not have the same shape as the input image.
    Shape(ShapeMismatch),
}

impl Display for QuantizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantizeError::Seed(err) => write!(f, "{err}"),
            QuantizeError::Shape(err) => write!(f, "output buffer mismatch: {err}"),
        }
    }
}

impl Error for QuantizeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            QuantizeError::Seed(err) => Some(err),
            QuantizeError::Shape(err) => Some(err),
        }
    }
}

impl From<SeedError> for QuantizeError {
    fn from(err: SeedError) -> Self {
        Self::Seed(err)
    }
}

impl From<ShapeMismatch> for QuantizeError {
    fn from(err: ShapeMismatch) -> Self {
        Self::Shape(err)
    }
}

/// Holds the state for a single clustering run.
struct State<'a, 'b> {
    /// The input image.
    image: PlanarImage<'a>,
    /// The output image, overwritten by each assignment pass.
    output: &'b mut PlanarBuffer,
    /// The distance used to find the nearest centroid.
    mode: DistanceMode,
    /// The current centroids.
    centroids: CentroidSet,
    /// The sums and counts for computing the next centroids.
    accumulator: Accumulator,
    /// The cluster index of each pixel from the last assignment pass.
    indices: Vec<u8>,
}

impl<'a, 'b> State<'a, 'b> {
    /// Creates the initial state with zeroed centroids and the accumulator holding the seed colors.
    ///
    /// The seeds must have been validated against `image`.
    fn new(image: PlanarImage<'a>, options: &KmeansOptions, output: &'b mut PlanarBuffer) -> Self {
        let seed_colors = options
            .seed_points()
            .map(|(col, row)| image.pixel(col as usize + row as usize * image.width() as usize))
            .collect::<Vec<_>>();

        Self {
            image,
            output,
            mode: options.distance_mode,
            centroids: CentroidSet::unset(seed_colors.len()),
            accumulator: Accumulator::seeded(seed_colors.into_iter()),
            indices: Vec::new(),
        }
    }

    /// Assigns every pixel to its nearest centroid, accumulating the pixel into that cluster
    /// and writing the centroid color to the output.
    fn assignment_pass(&mut self) {
        let Self { image, output, mode, centroids, accumulator, indices } = self;

        accumulator.reset();
        indices.clear();
        indices.reserve(image.len());

        let colors = centroids.colors();
        for (i, pixel) in image.pixels().enumerate() {
            let Some(nearest) = nearest_centroid(pixel, colors, *mode) else {
                continue;
            };

            accumulator.add(nearest, pixel);
            output.set_pixel(i, colors[nearest]);

            // k <= MAX_K = 256, so the index fits in a u8
            #[allow(clippy::cast_possible_truncation)]
            indices.push(nearest as u8);
        }

        debug_assert_eq!(accumulator.total_count(), image.len() as u64);
    }

    /// Runs the loop until convergence or until the iteration counter reaches `iteration_cap`.
    fn run(mut self, iteration_cap: u32, mut observer: impl FnMut(&Iteration)) -> QuantizeOutput {
        let mut iteration = 1;
        let mut passes = 0;
        let mut converged = false;

        while iteration < iteration_cap {
            if !self.centroids.update(&self.accumulator) {
                converged = true;
                break;
            }

            self.assignment_pass();
            passes += 1;

            log::debug!(
                "k-means pass {passes}: centroids {:?}, counts {:?}",
                self.centroids.colors(),
                self.accumulator.counts()
            );

            observer(&Iteration {
                pass: passes,
                centroids: self.centroids.colors(),
                counts: self.accumulator.counts(),
            });

            iteration += 1;
        }

        log::debug!(
            "k-means finished after {passes} passes ({})",
            if converged { "converged" } else { "reached the iteration cap" }
        );

        let Self { centroids, accumulator, indices, .. } = self;
        let counts = if passes == 0 {
            vec![0; centroids.colors().len()]
        } else {
            accumulator.counts
        };

        QuantizeOutput {
            palette: centroids.0,
            counts,
            indices,
            passes,
            converged,
        }
    }
}

/// Runs seeded k-means on `image` and returns the posterized image
/// alongside the centroids and per-pixel assignments.
///
/// The returned image has the same shape as `image`, with each pixel replaced by the
/// color of its cluster. It is filled with [`SENTINEL`](crate::SENTINEL) if no assignment pass ran
/// (e.g., `k` is `0` or the iteration cap is `1` or less).
///
/// # Errors
/// Returns a [`SeedError`] if the seeds in `options` are not valid for `image`
/// (see [`KmeansOptions::validate`]). No clustering is performed in this case.
pub fn quantize(
    image: PlanarImage,
    options: &KmeansOptions,
) -> Result<(PlanarBuffer, QuantizeOutput), SeedError> {
    quantize_with_observer(image, options, |_| {})
}

/// Runs seeded k-means on `image`, calling `observer` after each assignment pass.
///
/// See [`quantize`] for more details.
///
/// # Errors
/// Returns a [`SeedError`] if the seeds in `options` are not valid for `image`.
pub fn quantize_with_observer(
    image: PlanarImage,
    options: &KmeansOptions,
    observer: impl FnMut(&Iteration),
) -> Result<(PlanarBuffer, QuantizeOutput), SeedError> {
    options.validate(&image)?;
    let mut output = PlanarBuffer::sentinel_like(&image);
    let summary = State::new(image, options, &mut output).run(options.iteration_cap, observer);
    Ok((output, summary))
}

/// Runs seeded k-means on `image`, writing the posterized image into `output`.
///
/// `output` is not cleared first: each assignment pass overwrites every pixel,
/// but if no pass runs then `output` keeps its previous contents.
///
/// # Errors
/// Returns a [`QuantizeError`] if the seeds are not valid for `image`
/// or if `output` does not have the same dimensions as `image`.
/// `output` is left untouched in either case.
pub fn quantize_into(
    image: PlanarImage,
    options: &KmeansOptions,
    output: &mut PlanarBuffer,
    observer: impl FnMut(&Iteration),
) -> Result<QuantizeOutput, QuantizeError> {
    if output.dimensions() != image.dimensions() {
        return Err(ShapeMismatch::Dimensions {
            expected: image.dimensions(),
            actual: output.dimensions(),
        }
        .into());
    }

    options.validate(&image)?;
    debug_assert!(options.k.as_usize() <= MAX_K);
    Ok(State::new(image, options, output).run(options.iteration_cap, observer))
}
