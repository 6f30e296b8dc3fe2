use image::{GrayImage, Luma};

/// A two-level image. `true` marks ink (black), `false` marks paper (white).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Bitmap {
    /// Create a bitmap where every pixel is paper.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Build a bitmap from a predicate called once per pixel.
    pub fn from_fn(width: u32, height: u32, mut ink: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(ink(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Build a bitmap from a coverage image, where values of 128 and above are ink.
    pub fn from_coverage(coverage: &GrayImage) -> Self {
        let (width, height) = coverage.dimensions();
        Self {
            width,
            height,
            bits: coverage.pixels().map(|p| p[0] >= 128).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Whether the pixel is ink. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.bits[self.index(x, y)]
    }

    /// Like [`Bitmap::get`], treating everything outside the image as paper.
    pub fn get_or_paper(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.bits[self.index(x as u32, y as u32)]
    }

    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = self.index(x, y);
        self.bits[idx] = ink;
    }

    /// Swap ink and paper.
    pub fn invert(&mut self) {
        for bit in &mut self.bits {
            *bit = !*bit;
        }
    }

    pub fn ink_count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// One row of pixels, left to right.
    pub fn row(&self, y: u32) -> &[bool] {
        let start = self.index(0, y);
        &self.bits[start..start + self.width as usize]
    }

    /// Render as a grayscale image with black ink on white paper.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.get(x, y) { 0 } else { 255 }])
        })
    }

    /// Render as a coverage image (ink = 255).
    pub fn to_coverage(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod unit {
        use super::*;

        #[test]
        fn new_is_all_paper() {
            let bm = Bitmap::new(4, 3);
            assert_eq!(bm.dimensions(), (4, 3));
            assert_eq!(bm.ink_count(), 0);
        }

        #[test]
        fn set_and_get() {
            let mut bm = Bitmap::new(3, 3);
            bm.set(2, 1, true);
            assert!(bm.get(2, 1));
            assert!(!bm.get(1, 2));
            assert_eq!(bm.ink_count(), 1);
        }

        #[test]
        fn outside_is_paper() {
            let bm = Bitmap::from_fn(2, 2, |_, _| true);
            assert!(bm.get_or_paper(0, 0));
            assert!(!bm.get_or_paper(-1, 0));
            assert!(!bm.get_or_paper(0, 2));
            assert!(!bm.get_or_paper(2, 1));
        }

        #[test]
        fn from_coverage_uses_midpoint() {
            let mut cov = GrayImage::new(3, 1);
            cov.put_pixel(0, 0, Luma([127]));
            cov.put_pixel(1, 0, Luma([128]));
            cov.put_pixel(2, 0, Luma([255]));

            let bm = Bitmap::from_coverage(&cov);
            assert!(!bm.get(0, 0));
            assert!(bm.get(1, 0));
            assert!(bm.get(2, 0));
        }

        #[test]
        fn gray_rendering_is_black_on_white() {
            let bm = Bitmap::from_fn(2, 1, |x, _| x == 0);
            let gray = bm.to_gray();
            assert_eq!(gray.get_pixel(0, 0)[0], 0);
            assert_eq!(gray.get_pixel(1, 0)[0], 255);
        }

        #[test]
        fn row_slices() {
            let bm = Bitmap::from_fn(3, 2, |x, y| x == y);
            assert_eq!(bm.row(0), &[true, false, false]);
            assert_eq!(bm.row(1), &[false, true, false]);
        }

        #[test]
        #[should_panic(expected = "pixel out of bounds")]
        fn get_out_of_bounds_panics() {
            Bitmap::new(2, 2).get(2, 0);
        }
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Inverting twice restores the bitmap, and once swaps the ink count.
            #[test]
            fn invert_is_involution(
                w in 0u32..16,
                h in 0u32..16,
                seed in proptest::num::u64::ANY
            ) {
                let original = Bitmap::from_fn(w, h, |x, y| (seed >> ((x + y * 3) % 64)) & 1 == 1);
                let mut bm = original.clone();
                bm.invert();
                prop_assert_eq!(bm.ink_count(), (w * h) as usize - original.ink_count());
                bm.invert();
                prop_assert_eq!(bm, original);
            }

            /// Coverage rendering reads back to the same bitmap.
            #[test]
            fn coverage_reads_back(
                w in 1u32..16,
                h in 1u32..16,
                seed in proptest::num::u64::ANY
            ) {
                let bm = Bitmap::from_fn(w, h, |x, y| (seed >> ((x * 7 + y) % 64)) & 1 == 1);
                prop_assert_eq!(Bitmap::from_coverage(&bm.to_coverage()), bm);
            }
        }
    }
}
