//! Contains the options builder for seeded k-means and the validation of seed coordinates.

use crate::{ClusterCount, PlanarImage, DEFAULT_ITERATION_CAP};
use std::{error::Error, fmt::Display};

/// How the distance between a pixel and a centroid is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    /// The squared euclidean distance over the three channels,
    /// with each channel difference computed in a signed type wide enough to not overflow.
    #[default]
    Exact,
    /// Each channel difference wraps around in 8 bits before it is squared
    /// (e.g., `10 - 210` becomes `56` instead of `-200`).
    ///
    /// This is not a proper distance metric, but it reproduces the output of
    /// older tools that stored channel differences back into an 8-bit value.
    Wrapping,
}

/// A builder struct to specify the parameters for seeded k-means.
///
/// # Examples
/// ```
/// # use seedmeans::{KmeansOptions, DistanceMode};
/// // k = 3, seeds at (647, 793), (1661, 1019), and (362, 939)
/// let options = KmeansOptions::new(3.into(), vec![647, 793, 1661, 1019, 362, 939])
///     .iteration_cap(20)
///     .distance_mode(DistanceMode::Exact);
///
/// // the same, with k derived from the number of points
/// let options = KmeansOptions::from_points([(647, 793), (1661, 1019), (362, 939)]);
/// assert_eq!(options.k(), 3.into());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmeansOptions {
    /// The number of clusters.
    pub(crate) k: ClusterCount,
    /// The seed coordinates as `[col0, row0, col1, row1, ...]`.
    pub(crate) seeds: Vec<u32>,
    /// The value at which the iteration counter (starting at `1`) stops the loop.
    pub(crate) iteration_cap: u32,
    /// The distance used to find the nearest centroid.
    pub(crate) distance_mode: DistanceMode,
}

impl KmeansOptions {
    /// Creates a new [`KmeansOptions`] from the number of clusters and a flat list of seed coordinates.
    ///
    /// `seeds` should contain `2 * k` values: a column followed by a row for each cluster.
    /// This is not checked until [`KmeansOptions::validate`] or one of the
    /// [`kmeans`](crate::kmeans) functions is called.
    #[must_use]
    pub const fn new(k: ClusterCount, seeds: Vec<u32>) -> Self {
        Self {
            k,
            seeds,
            iteration_cap: DEFAULT_ITERATION_CAP,
            distance_mode: DistanceMode::Exact,
        }
    }

    /// Creates a new [`KmeansOptions`] with one cluster per `(col, row)` point.
    ///
    /// If more than [`MAX_CLUSTERS`](crate::MAX_CLUSTERS) points are given,
    /// `k` is clamped while all points are kept, so validation will fail.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let seeds = points
            .into_iter()
            .flat_map(|(col, row)| [col, row])
            .collect::<Vec<_>>();

        let k = u16::try_from(seeds.len() / 2).unwrap_or(u16::MAX);
        Self::new(ClusterCount::from_clamped(k), seeds)
    }

    /// Sets the iteration cap.
    ///
    /// The iteration counter starts at `1` and is incremented after each assignment pass.
    /// The loop stops once the counter reaches the cap, so at most `cap - 1` passes are performed.
    /// A cap of `0` or `1` performs no passes, leaving the output filled with
    /// [`SENTINEL`](crate::SENTINEL).
    ///
    /// The default cap is [`DEFAULT_ITERATION_CAP`].
    #[must_use]
    pub const fn iteration_cap(mut self, cap: u32) -> Self {
        self.iteration_cap = cap;
        self
    }

    /// Sets how pixel to centroid distances are computed.
    ///
    /// The default is [`DistanceMode::Exact`].
    #[must_use]
    pub const fn distance_mode(mut self, mode: DistanceMode) -> Self {
        self.distance_mode = mode;
        self
    }

    /// Returns the number of clusters.
    #[must_use]
    pub const fn k(&self) -> ClusterCount {
        self.k
    }

    /// Returns the flat list of seed coordinates.
    #[must_use]
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Returns the `(col, row)` seed points.
    ///
    /// A trailing unpaired value is ignored.
    pub fn seed_points(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.seeds
            .chunks_exact(2)
            .map(|point| (point[0], point[1]))
    }

    /// Checks that the seeds are consistent with `k` and lie within the given image.
    ///
    /// Seed coordinates are bounded exclusively: a column must be less than the image width
    /// and a row must be less than the image height.
    ///
    /// # Errors
    /// Returns [`SeedError::ConfigurationMismatch`] if the seed list does not have exactly
    /// `2 * k` values, or [`SeedError::SeedOutOfBounds`] for the first seed that lies outside the image.
    pub fn validate(&self, image: &PlanarImage) -> Result<(), SeedError> {
        let k = self.k.as_usize();
        if self.seeds.len() != 2 * k {
            return Err(SeedError::ConfigurationMismatch { k: self.k, seeds: self.seeds.len() });
        }

        let (width, height) = image.dimensions();
        for (index, (col, row)) in self.seed_points().enumerate() {
            if col >= width || row >= height {
                return Err(SeedError::SeedOutOfBounds { index, col, row, width, height });
            }
        }

        Ok(())
    }
}

/// An error type for seed lists that cannot be used with the given `k` or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedError {
    /// The seed list does not have exactly `2 * k` values.
    ConfigurationMismatch {
        /// The number of clusters.
        k: ClusterCount,
        /// The number of values in the seed list.
        seeds: usize,
    },
    /// A seed coordinate lies outside `[0, width) x [0, height)`.
    SeedOutOfBounds {
        /// The index of the offending seed (i.e., the cluster index).
        index: usize,
        /// The seed column.
        col: u32,
        /// The seed row.
        row: u32,
        /// The image width.
        width: u32,
        /// The image height.
        height: u32,
    },
}

impl Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            SeedError::ConfigurationMismatch { k, seeds } => write!(
                f,
                "mismatch between k and the seed list: k = {k} needs {} seed values but got {seeds}",
                2 * k.as_usize()
            ),
            SeedError::SeedOutOfBounds { index, col, row, width, height } => write!(
                f,
                "seed {index} at ({col}, {row}) is out of bounds for an image of size ({width}, {height})"
            ),
        }
    }
}

impl Error for SeedError {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn seed_count_must_match_k() {
        let image = two_by_two();
        let image = image.as_image();

        let options = KmeansOptions::new(2.into(), vec![0, 0, 1]);
        assert_eq!(
            options.validate(&image),
            Err(SeedError::ConfigurationMismatch { k: 2.into(), seeds: 3 })
        );

        let options = KmeansOptions::new(1.into(), vec![0, 0, 1, 1]);
        assert_eq!(
            options.validate(&image),
            Err(SeedError::ConfigurationMismatch { k: 1.into(), seeds: 4 })
        );

        let options = KmeansOptions::new(2.into(), vec![0, 0, 1, 1]);
        assert_eq!(options.validate(&image), Ok(()));
    }

    #[test]
    fn bounds_are_exclusive() {
        let image = two_by_two();
        let image = image.as_image();

        let options = KmeansOptions::from_points([(1, 1), (2, 0)]);
        assert_eq!(
            options.validate(&image),
            Err(SeedError::SeedOutOfBounds { index: 1, col: 2, row: 0, width: 2, height: 2 })
        );

        let options = KmeansOptions::from_points([(0, 2)]);
        assert_eq!(
            options.validate(&image),
            Err(SeedError::SeedOutOfBounds { index: 0, col: 0, row: 2, width: 2, height: 2 })
        );
    }

    #[test]
    fn no_clusters_is_valid() {
        let image = two_by_two();
        let options = KmeansOptions::from_points(Vec::<(u32, u32)>::new());
        assert_eq!(options.k(), ClusterCount::from(0));
        assert_eq!(options.validate(&image.as_image()), Ok(()));
    }

    #[test]
    fn too_many_points_fail_validation() {
        let image = test_image();
        let options = KmeansOptions::from_points((0..300).map(|i| (i % TEST_WIDTH, 0)));
        assert_eq!(options.k(), ClusterCount::MAX);
        assert!(matches!(
            options.validate(&image.as_image()),
            Err(SeedError::ConfigurationMismatch { seeds: 600, .. })
        ));
    }

    #[test]
    fn error_messages() {
        let err = SeedError::ConfigurationMismatch { k: 3.into(), seeds: 4 };
        assert_eq!(
            err.to_string(),
            "mismatch between k and the seed list: k = 3 needs 6 seed values but got 4"
        );

        let err = SeedError::SeedOutOfBounds { index: 0, col: 5, row: 1, width: 4, height: 4 };
        assert_eq!(
            err.to_string(),
            "seed 0 at (5, 1) is out of bounds for an image of size (4, 4)"
        );
    }
}
