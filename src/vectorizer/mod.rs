use crate::MonotraceResult;
use crate::bitmap::Bitmap;

/// A trait representing an algorithm that can turn a bitmap into a vector representation.
pub trait BitmapVectorizer {
    type Options;
    type Output;

    fn vectorize(&self, bitmap: &Bitmap, options: &Self::Options) -> MonotraceResult<Self::Output>;
}

pub mod contour;
pub mod potrace;
pub mod svg;
#[cfg(feature = "vectorizer-vtracer")]
pub mod vtracer;
