use visioncortex::PathSimplifyMode;
use vtracer::{ColorImage, ColorMode, Config, Hierarchical, SvgFile, convert};

use crate::bitmap::Bitmap;
use crate::{MonotraceError, MonotraceResult};

use super::BitmapVectorizer;

/// Options for tracing the bitmap to SVG using VTracer.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    pub tracer_color_mode: ColorMode,
    pub tracer_hierarchical: Hierarchical,
    pub tracer_mode: PathSimplifyMode,
    pub tracer_filter_speckle: usize,
    pub tracer_color_precision: i32,
    pub tracer_layer_difference: i32,
    pub tracer_corner_threshold: i32,
    pub tracer_length_threshold: f64,
    pub tracer_max_iterations: usize,
    pub tracer_splice_threshold: i32,
    pub tracer_path_precision: Option<u32>,
    /// Trace paper instead of ink.
    pub invert: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            tracer_color_mode: ColorMode::Binary,
            tracer_hierarchical: Hierarchical::Stacked,
            tracer_mode: PathSimplifyMode::Spline,
            tracer_filter_speckle: 4,
            tracer_color_precision: 6,
            tracer_layer_difference: 16,
            tracer_corner_threshold: 60,
            tracer_length_threshold: 4.0,
            tracer_max_iterations: 10,
            tracer_splice_threshold: 45,
            tracer_path_precision: Some(2),
            invert: false,
        }
    }
}

/// VTracer-based SVG vectorizer implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct VtracerSvgVectorizer;

impl BitmapVectorizer for VtracerSvgVectorizer {
    type Options = TraceOptions;
    type Output = String;

    fn vectorize(&self, bitmap: &Bitmap, options: &Self::Options) -> MonotraceResult<Self::Output> {
        trace_to_svg_string(bitmap, options)
    }
}

/// Convert a bitmap into an opaque black-on-white RGBA image for VTracer.
pub fn bitmap_to_color_image(bitmap: &Bitmap, invert: bool) -> ColorImage {
    let (w, h) = bitmap.dimensions();
    let (w_usize, h_usize) = (w as usize, h as usize);
    let mut rgba = vec![0u8; 4 * w_usize * h_usize];

    for y in 0..h {
        for (x, ink) in bitmap.row(y).iter().enumerate() {
            let v = if *ink != invert { 0 } else { 255 };
            let idx = (y as usize * w_usize + x) * 4;
            rgba[idx..idx + 3].fill(v);
            rgba[idx + 3] = 255;
        }
    }

    ColorImage {
        pixels: rgba,
        width: w_usize,
        height: h_usize,
    }
}

/// The helper function that uses VTracer to trace a bitmap to an SVG string.
pub fn trace_to_svg_string(bitmap: &Bitmap, options: &TraceOptions) -> MonotraceResult<String> {
    let color_img = bitmap_to_color_image(bitmap, options.invert);
    let svg_file = trace(color_img, options)?;
    Ok(svg_file.to_string())
}

/// Trace a ColorImage into an SVG using VTracer with the given options.
pub fn trace(img: ColorImage, options: &TraceOptions) -> MonotraceResult<SvgFile> {
    let cfg = Config {
        color_mode: options.tracer_color_mode.clone(),
        hierarchical: options.tracer_hierarchical.clone(),
        mode: options.tracer_mode,
        filter_speckle: options.tracer_filter_speckle,
        color_precision: options.tracer_color_precision,
        layer_difference: options.tracer_layer_difference,
        corner_threshold: options.tracer_corner_threshold,
        length_threshold: options.tracer_length_threshold,
        max_iterations: options.tracer_max_iterations,
        splice_threshold: options.tracer_splice_threshold,
        path_precision: options.tracer_path_precision,
    };

    let svg_file = convert(img, cfg).map_err(MonotraceError::Trace)?;
    Ok(svg_file)
}
