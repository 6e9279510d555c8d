#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use seedmeans::PlanarBuffer;

pub fn load_images(images: &[PathBuf]) -> Vec<(String, PlanarBuffer)> {
    images
        .iter()
        .map(|path| {
            image::open(path).map(|image| {
                (
                    path.file_name().unwrap().to_owned().into_string().unwrap(),
                    PlanarBuffer::try_from(&image.into_rgb8()).unwrap(),
                )
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, PlanarBuffer)> {
    let mut paths = std::fs::read_dir(dir)
        .expect("read img directory")
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

/// Generates an image made of noisy color blobs, so that k-means has structure to find.
pub fn synthetic_image(width: u32, height: u32, blobs: usize, seed: u64) -> PlanarBuffer {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);

    let centers = (0..blobs)
        .map(|_| [rng.gen::<u8>(), rng.gen(), rng.gen()])
        .collect::<Vec<_>>();

    let pixels = (0..(width * height))
        .map(|_| {
            let center = centers[rng.gen_range(0..centers.len())];
            center.map(|c| c.saturating_add_signed(rng.gen_range(-20..=20)))
        })
        .collect::<Vec<_>>();

    PlanarBuffer::from_arrays(width, height, &pixels).unwrap()
}

/// The directory checked for real benchmark images, relative to the crate root.
pub const IMG_DIR: &str = "img";

static IMAGES: OnceLock<Vec<(String, PlanarBuffer)>> = OnceLock::new();

/// Returns the images in [`IMG_DIR`] if it exists, otherwise a few synthetic images.
pub fn bench_images() -> &'static [(String, PlanarBuffer)] {
    IMAGES.get_or_init(|| {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(IMG_DIR);
        if dir.is_dir() {
            load_image_dir(dir)
        } else {
            [(256, 256), (640, 480), (1920, 1080)]
                .into_iter()
                .enumerate()
                .map(|(i, (width, height))| {
                    (
                        format!("synthetic_{width}x{height}"),
                        synthetic_image(width, height, 12, i as u64),
                    )
                })
                .collect()
        }
    })
}
