use std::path::{Path, PathBuf};

use log::warn;
use monotrace::{
    Binarization, BitmapHandle, BitmapOptions, ContourOptions, ContourSvgVectorizer, Monotrace,
    MonotraceResult, PotraceOptions, PotraceSvgVectorizer, TraceOptions, VtracerSvgVectorizer,
};

use crate::cli::{BitmapArgs, EngineArg, EngineArgs};

/// Build a Monotrace instance from the command line bitmap options.
pub fn build_monotrace(args: &BitmapArgs, fallback: Binarization) -> Monotrace {
    let options = args.to_options(fallback);
    warn_soft_conflicts(&options);
    Monotrace::new().with_bitmap_options(options)
}

fn warn_soft_conflicts(options: &BitmapOptions) {
    if options.binarization == Binarization::Dither && options.has_morphology() {
        warn!("dithered output is mostly isolated dots; --dilate/--fill-holes may merge it into solid areas");
    }
}

/// Warn when a dithered bitmap is about to be traced.
pub fn warn_if_tracing_dither(options: &BitmapOptions) {
    if options.binarization == Binarization::Dither {
        warn!("tracing a dithered bitmap produces one outline per dot; consider --threshold");
    }
}

/// Derive an output path by changing the extension, falling back to a variant
/// name when that would overwrite the input.
pub fn derive_output_path(input: &Path, extension: &str) -> PathBuf {
    let mut path = input.to_path_buf();
    path.set_extension(extension);
    if path == input {
        derive_variant_path(input, "mono", extension)
    } else {
        path
    }
}

/// Derive a variant file path by appending a suffix before the extension.
pub fn derive_variant_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut derived = input.to_path_buf();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| suffix.to_string());
    let filename = format!("{}-{}.{}", stem, suffix, extension);
    derived.set_file_name(filename);
    derived
}

fn path_precision(args: &EngineArgs, default: Option<u32>) -> Option<u32> {
    if args.no_path_precision {
        None
    } else {
        args.path_precision.or(default)
    }
}

/// Trace the bitmap into an SVG string with the selected engine.
pub fn render_svg(handle: &BitmapHandle, args: &EngineArgs) -> MonotraceResult<String> {
    match args.engine {
        EngineArg::Contour => {
            let defaults = ContourOptions::default();
            let options = ContourOptions {
                turn_policy: args.turn_policy.into(),
                filter_speckle: args.filter_speckle.unwrap_or(defaults.filter_speckle),
                curve: args.curve.into(),
                corner_length: args.corner_length,
                path_precision: path_precision(args, defaults.path_precision),
                fill: args.fill,
                invert: args.invert_svg,
            };
            handle.trace(&ContourSvgVectorizer, &options)
        }
        EngineArg::Vtracer => {
            let defaults = TraceOptions::default();
            let options = TraceOptions {
                tracer_mode: args.mode.into(),
                tracer_filter_speckle: args
                    .filter_speckle
                    .unwrap_or(defaults.tracer_filter_speckle),
                tracer_corner_threshold: args.corner_threshold,
                tracer_length_threshold: args.length_threshold,
                tracer_max_iterations: args.max_iterations,
                tracer_splice_threshold: args.splice_threshold,
                tracer_path_precision: path_precision(args, defaults.tracer_path_precision),
                invert: args.invert_svg,
                ..defaults
            };
            handle.trace(&VtracerSvgVectorizer, &options)
        }
        EngineArg::Potrace => {
            let mut extra_args = Vec::new();
            if args.invert_svg {
                extra_args.push("--invert".to_string());
            }
            let options = PotraceOptions {
                turd_size: args.filter_speckle.map(|v| v as u32),
                alpha_max: args.alpha_max,
                extra_args,
            };
            handle.trace(&PotraceSvgVectorizer::new(&args.potrace_program), &options)
        }
    }
}

/// Write a 16x16 PNG with a black 8x8 square on a transparent canvas.
#[cfg(test)]
pub fn write_sample_png(dir: &Path, name: &str) -> PathBuf {
    let img = image::RgbaImage::from_fn(16, 16, |x, y| {
        if (4..12).contains(&x) && (4..12).contains(&y) {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}
