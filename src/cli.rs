use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use monotrace::config::{DEFAULT_THRESHOLD, parse_color};
use monotrace::vectorizer::potrace::DEFAULT_POTRACE_PROGRAM;
use monotrace::{Binarization, BitmapOptions, CurveMode, ENV_TRACE_ENGINE, GrayscaleMethod, TurnPolicy};
use visioncortex::PathSimplifyMode;

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an image to a monochrome PBM bitmap
    Bitmap(BitmapCommand),
    /// Trace an image or PBM bitmap into an SVG outline
    Trace(TraceCommand),
    /// Write both the PBM bitmap and its traced SVG next to the input
    Convert(ConvertCommand),
}

#[derive(Args, Debug)]
pub struct BitmapCommand {
    /// Input image path
    pub input: PathBuf,
    /// Output path (defaults to `<name>.pbm`; other extensions are saved as PNG/etc.)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Write the ASCII (`P1`) variant instead of raw (`P4`)
    #[arg(long)]
    pub plain: bool,
    #[command(flatten)]
    pub bitmap: BitmapArgs,
}

#[derive(Args, Debug)]
pub struct TraceCommand {
    /// Input image or PBM path
    pub input: PathBuf,
    /// Output SVG path (defaults to input name with `.svg`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub bitmap: BitmapArgs,
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// Input image path
    pub input: PathBuf,
    /// PBM output path (defaults to input name with `.pbm`)
    #[arg(long = "pbm-output", value_name = "PATH")]
    pub pbm_output: Option<PathBuf>,
    /// SVG output path (defaults to input name with `.svg`)
    #[arg(long = "svg-output", value_name = "PATH")]
    pub svg_output: Option<PathBuf>,
    /// Write the ASCII (`P1`) variant instead of raw (`P4`)
    #[arg(long)]
    pub plain: bool,
    #[command(flatten)]
    pub bitmap: BitmapArgs,
    #[command(flatten)]
    pub engine: EngineArgs,
}

/// A threshold given on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThresholdArg {
    Level(u8),
    Auto,
}

/// Luma weights for color reduction.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GrayscaleArg {
    Rec601,
    Rec709,
}

impl From<GrayscaleArg> for GrayscaleMethod {
    fn from(value: GrayscaleArg) -> Self {
        match value {
            GrayscaleArg::Rec601 => GrayscaleMethod::Rec601,
            GrayscaleArg::Rec709 => GrayscaleMethod::Rec709,
        }
    }
}

#[derive(Args, Debug)]
pub struct BitmapArgs {
    /// Pixels darker than this become ink (0-255, 0.0-1.0, or `auto` for Otsu)
    #[arg(long, value_parser = parse_threshold, conflicts_with = "dither")]
    pub threshold: Option<ThresholdArg>,
    /// Use Floyd-Steinberg dithering instead of a threshold
    #[arg(long, overrides_with = "no_dither")]
    pub dither: bool,
    /// Use the default threshold instead of dithering
    #[arg(long = "no-dither", overrides_with = "dither")]
    pub no_dither: bool,
    /// Luma weights used to reduce color
    #[arg(long, value_enum, default_value_t = GrayscaleArg::Rec601)]
    pub grayscale: GrayscaleArg,
    /// Color that transparent pixels are flattened onto (#rgb, #rrggbb, white, black)
    #[arg(long, default_value = "white", value_parser = parse_color_arg)]
    pub background: [u8; 3],
    /// Gaussian blur before binarization, with optional sigma
    #[arg(long, value_name = "SIGMA", num_args = 0..=1, default_missing_value = "1.0", value_parser = parse_positive)]
    pub blur: Option<f32>,
    /// Grow the ink by a radius in pixels after binarization
    #[arg(long, value_name = "RADIUS", num_args = 0..=1, default_missing_value = "1.0", value_parser = parse_positive)]
    pub dilate: Option<f32>,
    /// Fill enclosed paper regions with ink
    #[arg(long = "fill-holes")]
    pub fill_holes: bool,
    /// Swap ink and paper
    #[arg(long)]
    pub invert: bool,
}

impl BitmapArgs {
    /// Resolve the binarization, using `fallback` when neither `--threshold` nor `--dither` is given.
    pub fn binarization(&self, fallback: Binarization) -> Binarization {
        match self.threshold {
            Some(ThresholdArg::Level(level)) => Binarization::Threshold(level),
            Some(ThresholdArg::Auto) => Binarization::Otsu,
            None if self.dither => Binarization::Dither,
            None if self.no_dither => Binarization::Threshold(DEFAULT_THRESHOLD),
            None => fallback,
        }
    }

    pub fn to_options(&self, fallback: Binarization) -> BitmapOptions {
        BitmapOptions {
            grayscale: self.grayscale.into(),
            background: self.background,
            binarization: self.binarization(fallback),
            blur: self.blur,
            dilate: self.dilate,
            fill_holes: self.fill_holes,
            invert: self.invert,
        }
    }
}

/// The default binarization for commands whose output is traced.
pub const TRACE_BINARIZATION: Binarization = Binarization::Threshold(DEFAULT_THRESHOLD);

fn parse_threshold(value: &str) -> Result<ThresholdArg, String> {
    if value.eq_ignore_ascii_case("auto") || value.eq_ignore_ascii_case("otsu") {
        return Ok(ThresholdArg::Auto);
    }

    if let Ok(int_value) = value.parse::<u8>() {
        return Ok(ThresholdArg::Level(int_value));
    }

    let float_value = value
        .parse::<f32>()
        .map_err(|_| format!("threshold must be numeric (0-255 or 0.0-1.0) or `auto`, got `{value}`"))?;

    if (0.0..=1.0).contains(&float_value) {
        let scaled = (float_value * 255.0).round() as i32;
        return Ok(ThresholdArg::Level(scaled.clamp(0, 255) as u8));
    }

    if float_value.fract().abs() <= f32::EPSILON && (0.0..=255.0).contains(&float_value) {
        return Ok(ThresholdArg::Level(float_value as u8));
    }

    Err(format!(
        "threshold {value} is out of range; expected 0-255 or 0.0-1.0"
    ))
}

fn parse_color_arg(value: &str) -> Result<[u8; 3], String> {
    parse_color(value).map_err(|e| e.to_string())
}

fn parse_positive(value: &str) -> Result<f32, String> {
    let parsed = value
        .parse::<f32>()
        .map_err(|_| format!("expected a number, got `{value}`"))?;
    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err(format!("expected a positive number, got `{value}`"))
    }
}

/// Available tracing engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// Built-in pixel-edge contour tracer
    Contour,
    /// VTracer spline tracer
    Vtracer,
    /// External `potrace` program
    Potrace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TurnPolicyArg {
    Black,
    White,
    Majority,
    Minority,
}

impl From<TurnPolicyArg> for TurnPolicy {
    fn from(value: TurnPolicyArg) -> Self {
        match value {
            TurnPolicyArg::Black => TurnPolicy::Black,
            TurnPolicyArg::White => TurnPolicy::White,
            TurnPolicyArg::Majority => TurnPolicy::Majority,
            TurnPolicyArg::Minority => TurnPolicy::Minority,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CurveArg {
    Polygon,
    Smooth,
}

impl From<CurveArg> for CurveMode {
    fn from(value: CurveArg) -> Self {
        match value {
            CurveArg::Polygon => CurveMode::Polygon,
            CurveArg::Smooth => CurveMode::Smooth,
        }
    }
}

/// Path simplification modes for VTracer.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TracerMode {
    None,
    Polygon,
    Spline,
}

impl From<TracerMode> for PathSimplifyMode {
    /// Convert TracerMode to visioncortex::PathSimplifyMode.
    fn from(value: TracerMode) -> Self {
        match value {
            TracerMode::None => PathSimplifyMode::None,
            TracerMode::Polygon => PathSimplifyMode::Polygon,
            TracerMode::Spline => PathSimplifyMode::Spline,
        }
    }
}

#[derive(Args, Debug)]
pub struct EngineArgs {
    /// Tracing engine
    #[arg(long, value_enum, env = ENV_TRACE_ENGINE, default_value_t = EngineArg::Contour)]
    pub engine: EngineArg,
    /// Drop outlines up to this many pixels (engine default when omitted)
    #[arg(long = "filter-speckle")]
    pub filter_speckle: Option<usize>,
    /// Path precision (decimal places)
    #[arg(long = "path-precision")]
    pub path_precision: Option<u32>,
    /// Disable explicit path precision
    #[arg(long = "no-path-precision", conflicts_with = "path_precision")]
    pub no_path_precision: bool,
    /// Trace paper instead of ink
    #[arg(long = "invert-svg")]
    pub invert_svg: bool,

    /// [contour] How diagonal ink pixels are connected
    #[arg(long = "turn-policy", value_enum, default_value_t = TurnPolicyArg::Minority)]
    pub turn_policy: TurnPolicyArg,
    /// [contour] Corner rendering
    #[arg(long = "curve", value_enum, default_value_t = CurveArg::Smooth)]
    pub curve: CurveArg,
    /// [contour] Corners between segments at least this long stay sharp
    #[arg(long = "corner-length", default_value_t = 4.0)]
    pub corner_length: f64,
    /// [contour] Fill color of the traced outline
    #[arg(long, default_value = "black", value_parser = parse_color_arg)]
    pub fill: [u8; 3],

    /// [vtracer] Path simplification mode
    #[arg(long = "mode", value_enum, default_value_t = TracerMode::Spline)]
    pub mode: TracerMode,
    /// [vtracer] Corner threshold in degrees
    #[arg(long = "corner-threshold", default_value_t = 60)]
    pub corner_threshold: i32,
    /// [vtracer] Segment length threshold
    #[arg(long = "length-threshold", default_value_t = 4.0)]
    pub length_threshold: f64,
    /// [vtracer] Maximum subdivision iterations
    #[arg(long = "max-iterations", default_value_t = 10)]
    pub max_iterations: usize,
    /// [vtracer] Splice threshold in degrees
    #[arg(long = "splice-threshold", default_value_t = 45)]
    pub splice_threshold: i32,

    /// [potrace] Program to run
    #[arg(long = "potrace-program", default_value = DEFAULT_POTRACE_PROGRAM)]
    pub potrace_program: String,
    /// [potrace] Corner threshold (alphamax)
    #[arg(long = "alpha-max")]
    pub alpha_max: Option<f64>,
}
