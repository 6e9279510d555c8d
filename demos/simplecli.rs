#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use image::RgbImage;
use seedmeans::{kmeans, DistanceMode, KmeansOptions, PlanarBuffer, DEFAULT_ITERATION_CAP};

#[derive(Parser)]
pub struct Options {
    /// Seed pixel as `COL,ROW`; give one per cluster.
    #[arg(short, long = "seed", value_parser = parse_point, required = true)]
    seeds: Vec<(u32, u32)>,

    #[arg(long, default_value_t = DEFAULT_ITERATION_CAP)]
    iteration_cap: u32,

    /// Let channel differences wrap around in 8 bits like older tools did.
    #[arg(long)]
    wrapping: bool,

    #[arg(long)]
    verbose: bool,

    input: PathBuf,

    output: PathBuf,
}

fn parse_point(s: &str) -> Result<(u32, u32), String> {
    let (col, row) = s
        .split_once(',')
        .ok_or_else(|| format!("expected COL,ROW but got {s}"))?;
    let col = col.trim().parse().map_err(|e| format!("{e}"))?;
    let row = row.trim().parse().map_err(|e| format!("{e}"))?;
    Ok((col, row))
}

fn main() -> ExitCode {
    let Options {
        seeds,
        iteration_cap,
        wrapping,
        verbose,
        input,
        output,
    } = Options::parse();

    macro_rules! log {
        ($name: literal, $val: expr) => {
            if verbose {
                let time = std::time::Instant::now();
                let value = $val;
                println!("{} took {}ms", $name, time.elapsed().as_millis());
                value
            } else {
                $val
            }
        };
    }

    let image = match log!("read image", image::open(&input)) {
        Ok(image) => image.into_rgb8(),
        Err(err) => {
            eprintln!("cannot load {}: {err}", input.display());
            return ExitCode::FAILURE;
        }
    };

    if verbose {
        println!("image loaded with size ({}, {})", image.width(), image.height());
    }

    let planar = match log!("split channels", PlanarBuffer::try_from(&image)) {
        Ok(planar) => planar,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mode = if wrapping {
        DistanceMode::Wrapping
    } else {
        DistanceMode::Exact
    };

    let options = KmeansOptions::from_points(seeds)
        .iteration_cap(iteration_cap)
        .distance_mode(mode);

    let result = log!(
        "k-means",
        kmeans::quantize_with_observer(planar.as_image(), &options, |iteration| {
            if verbose {
                println!("pass {}:", iteration.pass);
                for ([c0, c1, c2], count) in iteration.centroids.iter().zip(iteration.counts) {
                    println!("  [{c0} {c1} {c2}] x {count}");
                }
            }
        })
    );

    let (posterized, summary) = match result {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if verbose {
        println!(
            "{} after {} passes",
            if summary.converged { "converged" } else { "stopped at the iteration cap" },
            summary.passes
        );
    }

    let image = log!("merge channels", RgbImage::from(&posterized));

    match log!("write image", image.save(&output)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cannot write {}: {err}", output.display());
            ExitCode::FAILURE
        }
    }
}
