pub mod bitmap;
pub mod config;
pub mod error;
pub mod luma;
pub mod pbm;
pub mod process;
pub mod vectorizer;

pub use bitmap::Bitmap;
pub use config::{Binarization, BitmapOptions, ENV_LOG, ENV_TRACE_ENGINE, GrayscaleMethod};
pub use error::{MonotraceError, MonotraceResult};
pub use pbm::PbmEncoding;
pub use vectorizer::BitmapVectorizer;
pub use vectorizer::contour::{ContourOptions, ContourSvgVectorizer, CurveMode, TurnPolicy};
pub use vectorizer::potrace::{PotraceOptions, PotraceSvgVectorizer};
#[cfg(feature = "vectorizer-vtracer")]
pub use vectorizer::vtracer::{TraceOptions, VtracerSvgVectorizer, trace_to_svg_string};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::{GrayImage, RgbaImage};
use log::debug;

use crate::luma::{flatten_alpha, to_coverage, to_luma};
use crate::process::{apply_operations, operations_from_options};

/// Entry point for configuring and running monochrome conversion.
#[derive(Debug, Clone, Default)]
pub struct Monotrace {
    options: BitmapOptions,
}

impl Monotrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all bitmap options at once.
    pub fn with_bitmap_options(mut self, options: BitmapOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the luma weights used to reduce color.
    pub fn with_grayscale(mut self, grayscale: GrayscaleMethod) -> Self {
        self.options.grayscale = grayscale;
        self
    }

    /// Set how gray levels are reduced to ink and paper.
    pub fn with_binarization(mut self, binarization: Binarization) -> Self {
        self.options.binarization = binarization;
        self
    }

    /// Set the color that transparent pixels are flattened onto.
    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.options.background = background;
        self
    }

    /// Get a reference to the configured bitmap options.
    pub fn bitmap_options(&self) -> &BitmapOptions {
        &self.options
    }

    /// Decode a raster image for conversion.
    pub fn for_image(&self, image_path: impl AsRef<Path>) -> MonotraceResult<SourceImage> {
        let path = image_path.as_ref();
        let rgba = image::open(path)?.to_rgba8();
        debug!(
            "loaded {}x{} image from {}",
            rgba.width(),
            rgba.height(),
            path.display()
        );
        Ok(SourceImage::new(rgba, self.options.clone()))
    }

    /// Read an existing PBM file as a bitmap, skipping conversion.
    pub fn for_pbm(&self, pbm_path: impl AsRef<Path>) -> MonotraceResult<BitmapHandle> {
        let bitmap = pbm::read_pbm(pbm_path)?;
        Ok(BitmapHandle::new(bitmap))
    }

    /// Load any input as a bitmap: PBM data is read directly, everything else is converted.
    ///
    /// Only the `invert` option applies to PBM input.
    pub fn load_bitmap(&self, path: impl AsRef<Path>) -> MonotraceResult<BitmapHandle> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        if pbm::is_pbm(&data) {
            debug!("reading {} as PBM", path.display());
            let handle = BitmapHandle::new(pbm::decode(&data)?);
            return Ok(if self.options.invert {
                handle.inverted()
            } else {
                handle
            });
        }
        let rgba = image::load_from_memory(&data)?.to_rgba8();
        debug!(
            "loaded {}x{} image from {}",
            rgba.width(),
            rgba.height(),
            path.display()
        );
        Ok(SourceImage::new(rgba, self.options.clone()).bitmap())
    }
}

/// A decoded source image together with the options used to convert it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    rgba: Arc<RgbaImage>,
    options: BitmapOptions,
}

impl SourceImage {
    pub fn new(rgba: RgbaImage, options: BitmapOptions) -> Self {
        Self {
            rgba: Arc::new(rgba),
            options,
        }
    }

    /// Get a reference to the decoded RGBA image.
    pub fn rgba(&self) -> &RgbaImage {
        self.rgba.as_ref()
    }

    /// Luma after flattening alpha onto the background.
    pub fn luma(&self) -> GrayImage {
        let rgb = flatten_alpha(&self.rgba, self.options.background);
        to_luma(&rgb, self.options.grayscale)
    }

    /// Ink coverage (255 = ink) before binarization.
    pub fn coverage(&self) -> GrayImage {
        to_coverage(&self.luma())
    }

    /// Run the full conversion with the stored options.
    pub fn bitmap(&self) -> BitmapHandle {
        self.bitmap_with(&self.options)
    }

    /// Run the conversion with custom options; the stored options are left untouched.
    pub fn bitmap_with(&self, options: &BitmapOptions) -> BitmapHandle {
        let rgb = flatten_alpha(&self.rgba, options.background);
        let coverage = to_coverage(&to_luma(&rgb, options.grayscale));
        let ops = operations_from_options(options);
        let processed = apply_operations(&coverage, &ops);

        let mut bitmap = Bitmap::from_coverage(&processed);
        if options.invert {
            bitmap.invert();
        }
        debug!(
            "bitmap {}x{} with {} ink pixels",
            bitmap.width(),
            bitmap.height(),
            bitmap.ink_count()
        );
        BitmapHandle::new(bitmap)
    }
}

/// Represents a finished bitmap ready to be saved or traced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapHandle {
    bitmap: Bitmap,
}

impl BitmapHandle {
    pub fn new(bitmap: Bitmap) -> Self {
        Self { bitmap }
    }

    /// Get a reference to the bitmap.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Consume the handle and return the bitmap.
    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }

    /// Swap ink and paper.
    pub fn inverted(mut self) -> Self {
        self.bitmap.invert();
        self
    }

    /// Write the bitmap as PBM with the given encoding.
    pub fn save_pbm(&self, path: impl AsRef<Path>, encoding: PbmEncoding) -> MonotraceResult<()> {
        pbm::write_pbm(path, &self.bitmap, encoding)
    }

    /// Save the bitmap, choosing the format from the file extension.
    ///
    /// `.pbm` goes through the raw PBM codec; other extensions are written as
    /// black-on-white grayscale by `image`.
    pub fn save(&self, path: impl AsRef<Path>) -> MonotraceResult<()> {
        let path = path.as_ref();
        if has_pbm_extension(path) {
            self.save_pbm(path, PbmEncoding::Raw)
        } else {
            self.bitmap.to_gray().save(path)?;
            Ok(())
        }
    }

    /// Trace the bitmap using the specified vectorizer and options.
    pub fn trace<V>(&self, vectorizer: &V, options: &V::Options) -> MonotraceResult<V::Output>
    where
        V: BitmapVectorizer,
    {
        vectorizer.vectorize(&self.bitmap, options)
    }
}

/// Whether the path ends in `.pbm`, ignoring case.
pub fn has_pbm_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pbm"))
}
