//! A library for seeded k-means color segmentation over planar three-channel images.
//!
//! `seedmeans` clusters the pixels of an image into `k` groups, starting from caller-supplied
//! seed pixels, and replaces each pixel with the representative color of its group.
//! The result is a posterized image with at most `k` distinct colors.
//!
//! The algorithm works on in-memory planar buffers: three equal-length channel slices plus
//! a width and height (see [`PlanarImage`]). It never looks at channel semantics, so the
//! three channels can be RGB, BGR, or any other ordering the caller chooses.
//!
//! # Features
//! To reduce dependencies and compile times, `seedmeans` has a single optional `cargo` feature:
//! - `image`: enables splitting an [`image::RgbImage`] into a [`PlanarBuffer`] and merging
//!   it back (on by default).
//!
//! # Example
//! ```
//! # use seedmeans::{kmeans, KmeansOptions, PlanarImage};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let channel: [u8; 4] = [10, 200, 12, 210];
//! let image = PlanarImage::new(2, 2, [&channel[..], &channel[..], &channel[..]])?;
//!
//! // two clusters, seeded from the pixels at (0, 0) and (1, 1)
//! let options = KmeansOptions::from_points([(0, 0), (1, 1)]);
//! let (posterized, output) = kmeans::quantize(image, &options)?;
//!
//! assert_eq!(output.palette, vec![[11; 3], [205; 3]]);
//! assert_eq!(posterized.channels()[0], vec![11, 205, 11, 205]);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod options;
mod traits;
mod types;

pub mod kmeans;

pub use options::*;
pub use traits::*;
pub use types::*;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The maximum supported number of clusters is `256`.
pub const MAX_CLUSTERS: u16 = u8::MAX as u16 + 1;

/// `MAX_CLUSTERS` as a `usize` for array and `Vec` lengths.
pub(crate) const MAX_K: usize = MAX_CLUSTERS as usize;

/// The default iteration cap.
///
/// The iteration counter starts at `1`, so this allows at most `9` assignment passes.
pub const DEFAULT_ITERATION_CAP: u32 = 10;

/// The value every output channel is filled with before the first assignment pass.
pub const SENTINEL: u8 = u8::MAX;
