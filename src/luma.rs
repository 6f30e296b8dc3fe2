use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, RgbaImage};

use crate::config::GrayscaleMethod;

/// Composite every pixel over an opaque background color.
pub fn flatten_alpha(rgba: &RgbaImage, background: [u8; 3]) -> RgbImage {
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let a = src[3] as u32;
        let mut rgb = [0u8; 3];
        for c in 0..3 {
            let fg = src[c] as u32;
            let bg = background[c] as u32;
            rgb[c] = ((fg * a + bg * (255 - a) + 127) / 255) as u8;
        }
        *dst = Rgb(rgb);
    }
    out
}

/// Reduce an RGB image to luma.
pub fn to_luma(rgb: &RgbImage, method: GrayscaleMethod) -> GrayImage {
    match method {
        GrayscaleMethod::Rec601 => {
            let (w, h) = rgb.dimensions();
            let mut out = GrayImage::new(w, h);
            for (src, dst) in rgb.pixels().zip(out.pixels_mut()) {
                let [r, g, b] = src.0;
                let l = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000;
                *dst = Luma([l as u8]);
            }
            out
        }
        GrayscaleMethod::Rec709 => DynamicImage::ImageRgb8(rgb.clone()).to_luma8(),
    }
}

/// Turn luma into ink coverage, where 255 is full ink and 0 is bare paper.
pub fn to_coverage(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    for px in out.pixels_mut() {
        px[0] = 255 - px[0];
    }
    out
}
