use crate::{MonotraceError, MonotraceResult};

/// Environment variable holding the `env_logger` filter used by the CLI.
pub const ENV_LOG: &str = "MONOTRACE_LOG";
/// Environment variable selecting the default trace engine for the CLI.
pub const ENV_TRACE_ENGINE: &str = "MONOTRACE_ENGINE";

/// Default luma threshold: pixels darker than this become ink.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Weights used to reduce a color pixel to a single luma value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrayscaleMethod {
    /// ITU-R 601-2 integer weights (299/587/114).
    #[default]
    Rec601,
    /// ITU-R 709 weights, as applied by `image`'s own luma conversion.
    Rec709,
}

/// How a grayscale image is reduced to ink and paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binarization {
    /// Pixels with luma strictly below the value become ink.
    Threshold(u8),
    /// Threshold picked per image with Otsu's method.
    Otsu,
    /// Floyd-Steinberg error diffusion.
    #[default]
    Dither,
}

/// Options describing how a source image becomes a bitmap.
#[derive(Debug, Clone)]
pub struct BitmapOptions {
    pub grayscale: GrayscaleMethod,
    /// Opaque color that transparent pixels are composited onto.
    pub background: [u8; 3],
    pub binarization: Binarization,
    /// Gaussian blur sigma applied before binarization.
    pub blur: Option<f32>,
    /// Euclidean dilation radius applied to the ink after binarization.
    pub dilate: Option<f32>,
    /// Fill paper regions that do not touch the image border.
    pub fill_holes: bool,
    /// Swap ink and paper in the final bitmap.
    pub invert: bool,
}

impl Default for BitmapOptions {
    fn default() -> Self {
        Self {
            grayscale: GrayscaleMethod::Rec601,
            background: [255, 255, 255],
            binarization: Binarization::Dither,
            blur: None,
            dilate: None,
            fill_holes: false,
            invert: false,
        }
    }
}

impl BitmapOptions {
    /// Whether any step beyond plain binarization was requested.
    pub fn has_morphology(&self) -> bool {
        self.dilate.is_some() || self.fill_holes
    }
}

/// Parse a color given as `#rgb`, `#rrggbb`, `white` or `black`.
pub fn parse_color(value: &str) -> MonotraceResult<[u8; 3]> {
    let trimmed = value.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "white" => return Ok([255, 255, 255]),
        "black" => return Ok([0, 0, 0]),
        _ => {}
    }

    let invalid = || MonotraceError::InvalidColor(value.to_string());
    let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
                let v = digit.to_digit(16).ok_or_else(invalid)? as u8;
                *slot = v * 17;
            }
            Ok(rgb)
        }
        6 => {
            let mut rgb = [0u8; 3];
            for (i, slot) in rgb.iter_mut().enumerate() {
                *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
            }
            Ok(rgb)
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_color {
        use super::*;

        #[test]
        fn named_colors() {
            assert_eq!(parse_color("white").unwrap(), [255, 255, 255]);
            assert_eq!(parse_color("Black").unwrap(), [0, 0, 0]);
        }

        #[test]
        fn short_hex_expands_each_digit() {
            assert_eq!(parse_color("#f80").unwrap(), [255, 136, 0]);
        }

        #[test]
        fn long_hex() {
            assert_eq!(parse_color("#1a2B3c").unwrap(), [0x1a, 0x2b, 0x3c]);
        }

        #[test]
        fn missing_hash_is_rejected() {
            assert!(matches!(
                parse_color("ffffff"),
                Err(MonotraceError::InvalidColor(_))
            ));
        }

        #[test]
        fn bad_digits_are_rejected() {
            assert!(parse_color("#ggg").is_err());
            assert!(parse_color("#+f+f+f").is_err());
            assert!(parse_color("#12345").is_err());
            assert!(parse_color("#ééé").is_err());
        }
    }

    #[test]
    fn defaults_match_reference_conversion() {
        let options = BitmapOptions::default();
        assert_eq!(options.grayscale, GrayscaleMethod::Rec601);
        assert_eq!(options.binarization, Binarization::Dither);
        assert_eq!(options.background, [255, 255, 255]);
        assert!(!options.has_morphology());
    }
}
