//! Native outline tracer.
//!
//! Boundaries are followed along the pixel grid edges that separate ink from
//! paper, always keeping ink on the right-hand side. Outer boundaries therefore
//! run clockwise on screen and holes counter-clockwise, which lets the whole
//! outline be filled with a single even-odd path.

use std::fmt::Write as _;

use log::debug;

use super::BitmapVectorizer;
use super::svg::{SvgDocument, format_number};
use crate::MonotraceResult;
use crate::bitmap::Bitmap;

/// Largest window radius consulted by the majority and minority turn policies.
const MAX_POLICY_RADIUS: i64 = 4;

/// Decides whether two ink pixels touching only at a corner belong to the same outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPolicy {
    /// Always join diagonal ink.
    Black,
    /// Never join diagonal ink.
    White,
    /// Join whichever color is more common around the corner.
    Majority,
    /// Join whichever color is less common around the corner.
    #[default]
    Minority,
}

/// How polygon corners are rendered into SVG path data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveMode {
    /// Straight, axis-aligned segments along the pixel edges.
    Polygon,
    /// Quadratic curves between edge midpoints, keeping long corners sharp.
    #[default]
    Smooth,
}

/// Options for the native contour tracer.
#[derive(Debug, Clone)]
pub struct ContourOptions {
    pub turn_policy: TurnPolicy,
    /// Outlines enclosing this many pixels or fewer are dropped.
    pub filter_speckle: usize,
    pub curve: CurveMode,
    /// In smooth mode, a corner stays sharp when both adjacent segments are at least this long.
    pub corner_length: f64,
    pub path_precision: Option<u32>,
    pub fill: [u8; 3],
    /// Trace paper instead of ink.
    pub invert: bool,
}

impl Default for ContourOptions {
    fn default() -> Self {
        Self {
            turn_policy: TurnPolicy::Minority,
            filter_speckle: 2,
            curve: CurveMode::Smooth,
            corner_length: 4.0,
            path_precision: Some(2),
            fill: [0, 0, 0],
            invert: false,
        }
    }
}

/// A closed outline made of its corner vertices, in pixel-grid coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<(i64, i64)>,
}

impl Contour {
    /// Twice the signed area; positive for outer boundaries, negative for holes.
    pub fn doubled_signed_area(&self) -> i64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let (x0, y0) = self.points[i];
                let (x1, y1) = self.points[(i + 1) % n];
                x0 * y1 - x1 * y0
            })
            .sum()
    }

    /// Number of pixels enclosed by the outline.
    pub fn area(&self) -> u64 {
        self.doubled_signed_area().unsigned_abs() / 2
    }

    pub fn is_hole(&self) -> bool {
        self.doubled_signed_area() < 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    East,
    South,
    West,
    North,
}

impl Dir {
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    fn from_index(i: u8) -> Dir {
        match i & 3 {
            0 => Dir::East,
            1 => Dir::South,
            2 => Dir::West,
            _ => Dir::North,
        }
    }

    fn right(self) -> Dir {
        Dir::from_index(self as u8 + 1)
    }

    fn left(self) -> Dir {
        Dir::from_index(self as u8 + 3)
    }

    fn step(self, (x, y): (i64, i64)) -> (i64, i64) {
        match self {
            Dir::East => (x + 1, y),
            Dir::South => (x, y + 1),
            Dir::West => (x - 1, y),
            Dir::North => (x, y - 1),
        }
    }

    fn first_in(mask: u8) -> Option<Dir> {
        (0..4).map(Dir::from_index).find(|d| mask & d.bit() != 0)
    }
}

/// Outgoing boundary edges for every vertex of the `(w + 1) x (h + 1)` grid.
struct EdgeGrid {
    stride: usize,
    edges: Vec<u8>,
}

impl EdgeGrid {
    fn build(bitmap: &Bitmap) -> Self {
        let (w, h) = bitmap.dimensions();
        let stride = w as usize + 1;
        let mut grid = Self {
            stride,
            edges: vec![0; stride * (h as usize + 1)],
        };
        for y in 0..h as i64 {
            for x in 0..w as i64 {
                if !bitmap.get_or_paper(x, y) {
                    continue;
                }
                if !bitmap.get_or_paper(x, y - 1) {
                    grid.add((x, y), Dir::East);
                }
                if !bitmap.get_or_paper(x + 1, y) {
                    grid.add((x + 1, y), Dir::South);
                }
                if !bitmap.get_or_paper(x, y + 1) {
                    grid.add((x + 1, y + 1), Dir::West);
                }
                if !bitmap.get_or_paper(x - 1, y) {
                    grid.add((x, y + 1), Dir::North);
                }
            }
        }
        grid
    }

    fn index(&self, (x, y): (i64, i64)) -> usize {
        y as usize * self.stride + x as usize
    }

    fn add(&mut self, v: (i64, i64), dir: Dir) {
        let i = self.index(v);
        self.edges[i] |= dir.bit();
    }

    fn get(&self, v: (i64, i64)) -> u8 {
        self.edges[self.index(v)]
    }
}

/// Whether diagonal ink meeting at vertex `v` should be joined into one outline.
fn joins_diagonal(bitmap: &Bitmap, (vx, vy): (i64, i64), policy: TurnPolicy) -> bool {
    let prefer_majority = match policy {
        TurnPolicy::Black => return true,
        TurnPolicy::White => return false,
        TurnPolicy::Majority => true,
        TurnPolicy::Minority => false,
    };
    for r in 2..=MAX_POLICY_RADIUS {
        let mut ink = 0i64;
        for y in vy - r..vy + r {
            for x in vx - r..vx + r {
                if bitmap.get_or_paper(x, y) {
                    ink += 1;
                }
            }
        }
        let total = 4 * r * r;
        if ink * 2 != total {
            let ink_is_majority = ink * 2 > total;
            return ink_is_majority == prefer_majority;
        }
    }
    true
}

/// Decompose the bitmap into closed outlines, reduced to their corner vertices.
pub fn trace_contours(bitmap: &Bitmap, policy: TurnPolicy) -> Vec<Contour> {
    let original = EdgeGrid::build(bitmap);
    let mut remaining = original.edges.clone();
    let (w, h) = bitmap.dimensions();
    let mut contours = Vec::new();

    for vy in 0..=h as i64 {
        for vx in 0..=w as i64 {
            let start = (vx, vy);
            while let Some(start_dir) = Dir::first_in(remaining[original.index(start)]) {
                let mut vertices = Vec::new();
                let mut headings = Vec::new();
                let mut pos = start;
                let mut dir = start_dir;
                loop {
                    vertices.push(pos);
                    headings.push(dir);
                    remaining[original.index(pos)] &= !dir.bit();
                    pos = dir.step(pos);

                    let out = original.get(pos);
                    let next = if out.count_ones() == 2 {
                        if joins_diagonal(bitmap, pos, policy) {
                            dir.left()
                        } else {
                            dir.right()
                        }
                    } else {
                        match Dir::first_in(out) {
                            Some(d) => d,
                            None => break,
                        }
                    };
                    if remaining[original.index(pos)] & next.bit() == 0 {
                        break;
                    }
                    dir = next;
                }
                contours.push(corners_only(&vertices, &headings));
            }
        }
    }

    contours
}

/// Keep the vertices where the heading changes.
fn corners_only(vertices: &[(i64, i64)], headings: &[Dir]) -> Contour {
    let n = vertices.len();
    let points = (0..n)
        .filter(|&i| headings[(i + n - 1) % n] != headings[i])
        .map(|i| vertices[i])
        .collect();
    Contour { points }
}

/// Render straight path data for one contour.
fn polygon_path(contour: &Contour, out: &mut String) {
    let pts = &contour.points;
    let Some(&(x0, y0)) = pts.first() else {
        return;
    };
    let _ = write!(out, "M{x0} {y0}");
    for pair in pts.windows(2) {
        let (px, py) = pair[0];
        let (x, y) = pair[1];
        if y == py {
            let _ = write!(out, "H{x}");
        } else if x == px {
            let _ = write!(out, "V{y}");
        } else {
            let _ = write!(out, "L{x} {y}");
        }
    }
    out.push('Z');
}

fn segment_length(a: (i64, i64), b: (i64, i64)) -> f64 {
    let dx = (b.0 - a.0) as f64;
    let dy = (b.1 - a.1) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Render rounded path data for one contour.
fn smooth_path(contour: &Contour, corner_length: f64, precision: Option<u32>, out: &mut String) {
    let pts = &contour.points;
    let n = pts.len();
    if n < 3 {
        return;
    }
    let fmt = |v: f64| format_number(v, precision);
    let midpoint = |i: usize| {
        let (ax, ay) = pts[i % n];
        let (bx, by) = pts[(i + 1) % n];
        ((ax + bx) as f64 / 2.0, (ay + by) as f64 / 2.0)
    };

    let (sx, sy) = midpoint(n - 1);
    let _ = write!(out, "M{} {}", fmt(sx), fmt(sy));
    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let corner = pts[i];
        let next = pts[(i + 1) % n];
        let (mx, my) = midpoint(i);
        let (cx, cy) = (corner.0 as f64, corner.1 as f64);
        if segment_length(prev, corner) >= corner_length
            && segment_length(corner, next) >= corner_length
        {
            let _ = write!(out, "L{} {}L{} {}", fmt(cx), fmt(cy), fmt(mx), fmt(my));
        } else {
            let _ = write!(out, "Q{} {} {} {}", fmt(cx), fmt(cy), fmt(mx), fmt(my));
        }
    }
    out.push('Z');
}

/// Trace a bitmap into an SVG document.
pub fn trace_to_svg_document(bitmap: &Bitmap, options: &ContourOptions) -> SvgDocument {
    let inverted;
    let source = if options.invert {
        let mut copy = bitmap.clone();
        copy.invert();
        inverted = copy;
        &inverted
    } else {
        bitmap
    };

    let contours = trace_contours(source, options.turn_policy);
    let total = contours.len();
    let mut data = String::new();
    let mut kept = 0usize;
    for contour in contours
        .iter()
        .filter(|c| c.area() > options.filter_speckle as u64)
    {
        kept += 1;
        match options.curve {
            CurveMode::Polygon => polygon_path(contour, &mut data),
            CurveMode::Smooth => {
                smooth_path(contour, options.corner_length, options.path_precision, &mut data)
            }
        }
    }
    debug!("traced {total} outlines, kept {kept} after speckle filter");

    let (w, h) = bitmap.dimensions();
    let mut doc = SvgDocument::new(w, h);
    doc.add_path(data, options.fill);
    doc
}

/// Native SVG vectorizer built on [`trace_contours`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourSvgVectorizer;

impl BitmapVectorizer for ContourSvgVectorizer {
    type Options = ContourOptions;
    type Output = String;

    fn vectorize(&self, bitmap: &Bitmap, options: &Self::Options) -> MonotraceResult<Self::Output> {
        Ok(trace_to_svg_document(bitmap, options).to_string())
    }
}
