extern crate clap;
extern crate image;
extern crate mandelbrot;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use image::png::PNGEncoder;
use image::ColorType;
use mandelbrot::{GridSpec, Palette, PlaneBounds, Renderer, Rgb};
use num::Complex;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const COLORS: &str = "colors";
const INSIDE: &str = "inside";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot set renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-1.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the plane window"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0,1.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the plane window"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads; defaults to one per CPU"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Iteration budget for the escape time test"),
        )
        .arg(
            Arg::with_name(COLORS)
                .required(false)
                .long(COLORS)
                .short("c")
                .takes_value(true)
                .validator(|s| {
                    Palette::from_hex_list(&s)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .help("Comma-separated RRGGBB palette; defaults to a built-in gradient"),
        )
        .arg(
            Arg::with_name(INSIDE)
                .required(false)
                .long(INSIDE)
                .short("m")
                .takes_value(true)
                .default_value("000000")
                .validator(|s| Rgb::from_hex(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("RRGGBB color for points inside the set"),
        )
        .get_matches()
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let encoder = PNGEncoder::new(output);
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

fn main() {
    let matches = args();
    let image_size: (usize, usize) = parse_pair(matches.value_of(SIZE).unwrap(), 'x')
        .expect("Error parsing image dimensions");
    let leftlower =
        parse_complex(matches.value_of(LEFTLOWER).unwrap()).expect("Error parsing left lower point");
    let rightupper = parse_complex(matches.value_of(RIGHTUPPER).unwrap())
        .expect("Error parsing right upper point");
    let threads = match matches.value_of(THREADS) {
        Some(s) => usize::from_str(s).expect("Could not parse thread count."),
        None => num_cpus::get(),
    };
    let iterations = usize::from_str(matches.value_of(ITERATIONS).unwrap())
        .expect("Could not parse iteration count.");
    let palette = match matches.value_of(COLORS) {
        Some(s) => Palette::from_hex_list(s).expect("Could not parse color list."),
        None => Palette::warm_to_cool(),
    };
    let inside =
        Rgb::from_hex(matches.value_of(INSIDE).unwrap()).expect("Could not parse inside color.");

    let grid = GridSpec {
        width: image_size.0,
        height: image_size.1,
    };
    let bounds = PlaneBounds::from_corners(leftlower, rightupper);

    let renderer = match Renderer::new(grid, bounds, iterations) {
        Ok(renderer) => renderer,
        Err(e) => {
            eprintln!("Configuration failure: {}", e);
            std::process::exit(1);
        }
    };

    match renderer.render(threads) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(values) => {
            // The encoder wants the whole image as one byte run, so
            // color the buffer row by row, top to bottom, into it.
            let mut pixels = Vec::with_capacity(values.len() * 3);
            for row in values.chunks(grid.width) {
                pixels.extend(palette.color_row(row, inside));
            }
            if let Err(e) = write_image(matches.value_of(OUTPUT).unwrap(), &pixels, image_size) {
                eprintln!("Write failure: {}", e);
                std::process::exit(1);
            }
        }
    }
}
