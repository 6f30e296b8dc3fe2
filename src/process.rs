use std::collections::VecDeque;

use image::imageops::{BiLevel, dither};
use image::{GrayImage, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold as ip_threshold};
use imageproc::distance_transform::euclidean_squared_distance_transform;
use imageproc::filter::gaussian_blur_f32;
use log::debug;

use crate::config::{Binarization, BitmapOptions};

/// A single transformation step applied to a coverage image (ink = 255).
#[derive(Debug, Clone, PartialEq)]
pub enum BitmapOperation {
    Blur { sigma: f32 },
    /// Coverage values strictly above `value` become ink.
    Threshold { value: u8 },
    Otsu,
    Dither,
    Dilate { radius: f32 },
    FillHoles { threshold: u8 },
}

impl BitmapOperation {
    pub fn apply(&self, input: &GrayImage) -> GrayImage {
        let (w, h) = input.dimensions();
        if w == 0 || h == 0 {
            return input.clone();
        }
        match self {
            BitmapOperation::Blur { sigma } if *sigma > 0.0 => gaussian_blur_f32(input, *sigma),
            BitmapOperation::Blur { .. } => input.clone(),
            BitmapOperation::Threshold { value } => threshold_coverage(input, *value),
            BitmapOperation::Otsu => {
                let level = otsu_level(input);
                debug!("otsu level {level}");
                threshold_coverage(input, level)
            }
            BitmapOperation::Dither => dither_coverage(input),
            BitmapOperation::Dilate { radius } => dilate_euclidean(input, *radius),
            BitmapOperation::FillHoles { threshold } => fill_holes(input, *threshold),
        }
    }
}

/// Run a list of operations against the provided coverage image.
pub fn apply_operations(source: &GrayImage, operations: &[BitmapOperation]) -> GrayImage {
    let mut current = source.clone();
    for op in operations {
        debug!("applying {op:?}");
        current = op.apply(&current);
    }
    current
}

/// Produce the operation sequence for the given options: blur, binarize, dilate, fill holes.
pub fn operations_from_options(options: &BitmapOptions) -> Vec<BitmapOperation> {
    let mut operations = Vec::new();
    if let Some(sigma) = options.blur {
        operations.push(BitmapOperation::Blur { sigma });
    }
    operations.push(match options.binarization {
        Binarization::Threshold(luma) => BitmapOperation::Threshold {
            value: luma_to_coverage_threshold(luma),
        },
        Binarization::Otsu => BitmapOperation::Otsu,
        Binarization::Dither => BitmapOperation::Dither,
    });
    if let Some(radius) = options.dilate {
        operations.push(BitmapOperation::Dilate { radius });
    }
    if options.fill_holes {
        operations.push(BitmapOperation::FillHoles { threshold: 128 });
    }
    operations
}

/// Map a luma threshold (`luma < t` is ink) onto the coverage threshold (`coverage > v` is ink).
pub fn luma_to_coverage_threshold(luma: u8) -> u8 {
    255 - luma
}

/// Threshold the coverage image into a binary one.
pub fn threshold_coverage(coverage: &GrayImage, value: u8) -> GrayImage {
    ip_threshold(coverage, value, ThresholdType::Binary)
}

/// Floyd-Steinberg dither the coverage image down to two levels.
pub fn dither_coverage(coverage: &GrayImage) -> GrayImage {
    let mut out = coverage.clone();
    dither(&mut out, &BiLevel);
    out
}

/// Grow ink by `r` pixels using a Euclidean distance transform.
pub fn dilate_euclidean(coverage: &GrayImage, r: f32) -> GrayImage {
    let d2 = euclidean_squared_distance_transform(coverage);
    let r2: f64 = (r as f64) * (r as f64);
    let (w, h) = coverage.dimensions();
    let mut out = GrayImage::new(w, h);
    for (o_pixel, d2pixel) in out.pixels_mut().zip(d2.pixels()) {
        let v: u8 = if d2pixel[0] <= r2 { 255 } else { 0 };
        *o_pixel = Luma([v]);
    }
    out
}

/// Fill paper regions that are not 4-connected to the image border.
pub fn fill_holes(coverage: &GrayImage, threshold: u8) -> GrayImage {
    let (w, h) = coverage.dimensions();
    if w == 0 || h == 0 {
        return coverage.clone();
    }
    let w_usize = w as usize;
    let mut visited = vec![false; w_usize * h as usize];
    let mut queue = VecDeque::new();

    let idx = |x: u32, y: u32| -> usize { (y as usize) * w_usize + x as usize };
    let raw = coverage.as_raw();
    let is_paper = |id: usize| raw[id] < threshold;

    for x in 0..w {
        for y in [0, h - 1] {
            if is_paper(idx(x, y)) {
                queue.push_back((x, y));
            }
        }
    }
    for y in 0..h {
        for x in [0, w - 1] {
            if is_paper(idx(x, y)) {
                queue.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let id = idx(x, y);
        if visited[id] {
            continue;
        }
        visited[id] = true;

        let neighbors = [
            (x > 0).then(|| (x - 1, y)),
            (x + 1 < w).then(|| (x + 1, y)),
            (y > 0).then(|| (x, y - 1)),
            (y + 1 < h).then(|| (x, y + 1)),
        ];
        for (nx, ny) in neighbors.into_iter().flatten() {
            let nid = idx(nx, ny);
            if !visited[nid] && is_paper(nid) {
                queue.push_back((nx, ny));
            }
        }
    }

    let mut out = GrayImage::new(w, h);
    for ((x, y, out_pixel), pixel) in out.enumerate_pixels_mut().zip(coverage.pixels()) {
        // Paper that the border flood never reached is an enclosed hole.
        let ink = pixel[0] >= threshold || !visited[idx(x, y)];
        *out_pixel = Luma([if ink { 255 } else { 0 }]);
    }

    out
}
