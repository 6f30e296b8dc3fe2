//! Netpbm bitmap (PBM) reading and writing on top of `image`'s PNM codec.
//!
//! Supports the plain (`P1`) and raw (`P4`) variants. A `1` bit is black, which
//! maps to ink in [`Bitmap`].

use std::fs;
use std::path::Path;

use image::codecs::pnm::{PnmDecoder, PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageError};

use crate::bitmap::Bitmap;
use crate::{MonotraceError, MonotraceResult};

/// Largest pixel count accepted when decoding.
pub const MAX_PIXELS: u64 = 1 << 28;

/// The two PBM sample encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PbmEncoding {
    /// Packed binary rows (`P4`).
    #[default]
    Raw,
    /// ASCII `0`/`1` digits (`P1`).
    Plain,
}

impl From<PbmEncoding> for SampleEncoding {
    fn from(value: PbmEncoding) -> Self {
        match value {
            PbmEncoding::Raw => SampleEncoding::Binary,
            PbmEncoding::Plain => SampleEncoding::Ascii,
        }
    }
}

fn pbm_error(msg: impl Into<String>) -> MonotraceError {
    MonotraceError::Pbm(msg.into())
}

fn decode_error(err: ImageError) -> MonotraceError {
    pbm_error(err.to_string())
}

/// Serialize a bitmap into PBM bytes.
pub fn encode(bitmap: &Bitmap, encoding: PbmEncoding) -> MonotraceResult<Vec<u8>> {
    let (w, h) = bitmap.dimensions();
    // Ink is 0 in the gray image; the PNM encoder writes 0 samples as black `1` bits.
    let gray = bitmap.to_gray();
    let mut out = Vec::new();
    PnmEncoder::new(&mut out)
        .with_subtype(PnmSubtype::Bitmap(encoding.into()))
        .write_image(gray.as_raw(), w, h, ExtendedColorType::L8)?;
    Ok(out)
}

/// Parse PBM bytes in either encoding.
pub fn decode(data: &[u8]) -> MonotraceResult<Bitmap> {
    let decoder = PnmDecoder::new(data).map_err(decode_error)?;
    let encoding = match decoder.subtype() {
        PnmSubtype::Bitmap(SampleEncoding::Binary) => PbmEncoding::Raw,
        PnmSubtype::Bitmap(SampleEncoding::Ascii) => PbmEncoding::Plain,
        other => {
            return Err(pbm_error(format!("expected a P1 or P4 bitmap, found {other:?}")));
        }
    };
    let (width, height) = decoder.dimensions();
    check_dimensions(width, height, encoding, data.len())?;

    let gray = DynamicImage::from_decoder(decoder)
        .map_err(decode_error)?
        .into_luma8();
    Ok(Bitmap::from_fn(width, height, |x, y| gray.get_pixel(x, y).0[0] < 128))
}

/// Reject headers that are degenerate, oversized, or promise more raster than the data holds.
fn check_dimensions(
    width: u32,
    height: u32,
    encoding: PbmEncoding,
    available: usize,
) -> MonotraceResult<()> {
    if (width == 0) != (height == 0) {
        return Err(pbm_error(format!(
            "degenerate {width}x{height} bitmap: one side is zero"
        )));
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_PIXELS {
        return Err(pbm_error(format!(
            "{width}x{height} bitmap exceeds the limit of {MAX_PIXELS} pixels"
        )));
    }
    let min_raster = match encoding {
        PbmEncoding::Raw => u64::from(width.div_ceil(8)) * u64::from(height),
        PbmEncoding::Plain => pixels,
    };
    if min_raster > available as u64 {
        return Err(pbm_error(format!(
            "raster for {width}x{height} exceeds the available data"
        )));
    }
    Ok(())
}

/// Encode a bitmap and write it to `path`.
pub fn write_pbm(
    path: impl AsRef<Path>,
    bitmap: &Bitmap,
    encoding: PbmEncoding,
) -> MonotraceResult<()> {
    fs::write(path, encode(bitmap, encoding)?)?;
    Ok(())
}

/// Read and decode a PBM file.
pub fn read_pbm(path: impl AsRef<Path>) -> MonotraceResult<Bitmap> {
    let data = fs::read(path)?;
    decode(&data)
}

/// Whether the bytes start with a PBM magic number.
pub fn is_pbm(data: &[u8]) -> bool {
    matches!(data.get(..2), Some(b"P1") | Some(b"P4"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> Bitmap {
        Bitmap::from_fn(w, h, |x, y| (x + y) % 2 == 0)
    }

    mod encode {
        use super::*;

        #[test]
        fn raw_packs_ink_as_set_bits() {
            let bm = Bitmap::from_fn(10, 1, |x, _| x == 0 || x == 9);
            let bytes = encode(&bm, PbmEncoding::Raw).unwrap();
            assert!(bytes.starts_with(b"P4"));
            // 10 pixels need two bytes; trailing bits are zero padding.
            assert_eq!(&bytes[bytes.len() - 2..], &[0b1000_0000, 0b0100_0000]);
        }

        #[test]
        fn plain_uses_digits() {
            let bm = checker(3, 2);
            let bytes = encode(&bm, PbmEncoding::Plain).unwrap();
            assert!(bytes.starts_with(b"P1"));
            assert!(bytes.iter().all(|b| b.is_ascii()));
            assert_eq!(decode(&bytes).unwrap(), bm);
        }

        #[test]
        fn plain_lines_are_wrapped() {
            let bm = Bitmap::from_fn(150, 1, |_, _| true);
            let bytes = encode(&bm, PbmEncoding::Plain).unwrap();
            let text = String::from_utf8(bytes.clone()).unwrap();
            assert!(text.lines().all(|l| l.len() <= 70));
            assert_eq!(decode(&bytes).unwrap().ink_count(), 150);
        }
    }

    mod decode {
        use super::*;

        #[test]
        fn header_comments_and_whitespace() {
            let data = b"P1\n# created by hand\n3 2\n1 0 1\n0 1 0\n";
            let bm = decode(data).unwrap();
            assert_eq!(bm, checker(3, 2));
        }

        #[test]
        fn plain_without_separators() {
            let bm = decode(b"P1\n2 2\n1001\n").unwrap();
            assert!(bm.get(0, 0));
            assert!(!bm.get(1, 0));
            assert!(!bm.get(0, 1));
            assert!(bm.get(1, 1));
        }

        #[test]
        fn raw_ignores_padding_bits() {
            let data = [b"P4\n3 1\n".as_slice(), &[0b1011_1111]].concat();
            let bm = decode(&data).unwrap();
            assert_eq!(bm.row(0), &[true, false, true]);
        }

        #[test]
        fn graymap_is_rejected() {
            let err = decode(b"P2\n1 1\n255\n0\n").unwrap_err();
            assert!(matches!(err, MonotraceError::Pbm(msg) if msg.contains("P1 or P4")));
        }

        #[test]
        fn too_short() {
            assert!(matches!(decode(b"P"), Err(MonotraceError::Pbm(_))));
        }

        #[test]
        fn truncated_raw_raster() {
            let data = [b"P4\n16 2\n".as_slice(), &[0xff, 0xff, 0x00]].concat();
            assert!(matches!(decode(&data), Err(MonotraceError::Pbm(_))));
        }

        #[test]
        fn header_larger_than_data() {
            let err = decode(b"P4\n10000 10000\n\x00").unwrap_err();
            assert!(matches!(err, MonotraceError::Pbm(msg) if msg.contains("available data")));
        }

        #[test]
        fn zero_width_with_huge_height() {
            let err = decode(b"P4\n0 4000000000\n").unwrap_err();
            assert!(matches!(err, MonotraceError::Pbm(_)));
        }

        #[test]
        fn zero_height_with_huge_width() {
            let err = decode(b"P4\n4000000000 0\n").unwrap_err();
            assert!(matches!(err, MonotraceError::Pbm(_)));
        }

        #[test]
        fn degenerate_header_is_reported() {
            let err = check_dimensions(0, 4_000_000_000, PbmEncoding::Raw, 16).unwrap_err();
            assert!(matches!(err, MonotraceError::Pbm(msg) if msg.contains("degenerate")));
            assert!(check_dimensions(0, 0, PbmEncoding::Raw, 7).is_ok());
        }

        #[test]
        fn pixel_limit() {
            let err = decode(b"P4\n65536 65536\n").unwrap_err();
            assert!(matches!(err, MonotraceError::Pbm(msg) if msg.contains("limit")));
        }

        #[test]
        fn truncated_plain_raster() {
            assert!(matches!(decode(b"P1\n2 2\n1 0 1"), Err(MonotraceError::Pbm(_))));
        }

        #[test]
        fn non_numeric_dimension() {
            assert!(matches!(decode(b"P1\nx 2\n"), Err(MonotraceError::Pbm(_))));
        }

        #[test]
        fn invalid_plain_digit() {
            assert!(matches!(decode(b"P1\n2 1\n1 2\n"), Err(MonotraceError::Pbm(_))));
        }
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_bitmap() -> impl Strategy<Value = Bitmap> {
            (1u32..40, 1u32..12).prop_flat_map(|(w, h)| {
                proptest::collection::vec(any::<bool>(), (w * h) as usize).prop_map(move |bits| {
                    Bitmap::from_fn(w, h, |x, y| bits[(y * w + x) as usize])
                })
            })
        }

        proptest! {
            /// Both encodings decode back to the original bitmap.
            #[test]
            fn decode_inverts_encode(bm in arb_bitmap()) {
                prop_assert_eq!(&decode(&encode(&bm, PbmEncoding::Raw).unwrap()).unwrap(), &bm);
                prop_assert_eq!(&decode(&encode(&bm, PbmEncoding::Plain).unwrap()).unwrap(), &bm);
            }

            /// The raw raster is whole bytes per row at the end of the output.
            #[test]
            fn raw_raster_size(bm in arb_bitmap()) {
                let (w, h) = bm.dimensions();
                let bytes = encode(&bm, PbmEncoding::Raw).unwrap();
                let raster = (w as usize).div_ceil(8) * h as usize;
                prop_assert!(bytes.len() > raster);
                prop_assert!(bytes.len() <= raster + 32);
            }
        }
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.pbm");
        let bm = checker(9, 5);
        write_pbm(&path, &bm, PbmEncoding::Raw).unwrap();
        assert!(is_pbm(&std::fs::read(&path).unwrap()));
        assert_eq!(read_pbm(&path).unwrap(), bm);
    }
}
