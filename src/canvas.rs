//! Raster surface that accumulates pencil trails.

use crate::color::Rgb;
use crate::geometry::Geometry;
use crate::pencils::Pencil;
use std::sync::OnceLock;
use tracing::warn;

/// Largest surface, in pixels, that gets backing storage
pub const MAX_SURFACE_PIXELS: usize = 1 << 28;

static MIN_DISTANCE: OnceLock<f64> = OnceLock::new();

/// Smallest per-axis movement the surface renders as a line.
///
/// Shorter movements are drawn as a dot. Probed once per process.
pub fn min_distance() -> f64 {
    *MIN_DISTANCE.get_or_init(probe_min_distance)
}

fn probe_min_distance() -> f64 {
    let candidates = [0.0, 2f64.powi(-150) * (1.0 + f64::EPSILON)];
    for candidate in candidates {
        let mut probe = TrailCanvas::with_scale(1, 1, 1.0);
        probe.stroke_pixels((0.0, 0.5), (candidate, 0.5), 0.5, Rgb::BLACK);
        if probe.is_painted() {
            return candidate;
        }
    }
    0.01
}

/// Width x height grid of painted pixels, `None` where nothing was drawn.
///
/// A surface too large to back stays blank: it accepts every drawing call
/// and paints nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailCanvas {
    width: u32,
    height: u32,
    scale: f64,
    pixels: Vec<Option<Rgb>>,
}

impl TrailCanvas {
    /// Empty surface for the given geometry
    pub fn new(geometry: &Geometry) -> Self {
        Self::with_scale(geometry.width, geometry.height, geometry.pencil_size)
    }

    fn with_scale(width: u32, height: u32, scale: f64) -> Self {
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .filter(|&len| len <= MAX_SURFACE_PIXELS)
            .and_then(|len| {
                let mut pixels = Vec::new();
                pixels.try_reserve_exact(len).ok()?;
                pixels.resize(len, None);
                Some(pixels)
            });
        if pixels.is_none() {
            warn!(width, height, "surface too large, trails will not be drawn");
        }
        Self {
            width,
            height,
            scale,
            pixels: pixels.unwrap_or_default(),
        }
    }

    /// Whether the surface has backing storage and can be drawn on
    pub fn is_backed(&self) -> bool {
        !self.pixels.is_empty()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied().flatten()
    }

    pub fn is_painted(&self) -> bool {
        self.pixels.iter().any(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(None);
    }

    fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.width as f64 / 2.0 + x * self.scale,
            self.height as f64 / 2.0 - y * self.scale,
        )
    }

    /// Draw a pencil's movement from `previous` to its current position
    pub fn draw_move(&mut self, pencil: &Pencil, previous: (f64, f64)) {
        let (x0, y0) = previous;
        let min_distance = min_distance();
        let radius = self.scale / 2.0;
        let to = self.to_pixel(pencil.x, pencil.y);
        if (pencil.x - x0).abs() < min_distance && (pencil.y - y0).abs() < min_distance {
            self.stroke_pixels(to, to, radius, pencil.color);
        } else {
            let from = self.to_pixel(x0, y0);
            self.stroke_pixels(from, to, radius, pencil.color);
        }
    }

    /// Mark each pencil's starting position
    pub fn draw_pencils(&mut self, pencils: &[Pencil]) {
        for pencil in pencils {
            self.draw_move(pencil, (pencil.x, pencil.y));
        }
    }

    /// Round-capped segment in pixel space; a zero-length segment is a dot
    fn stroke_pixels(&mut self, from: (f64, f64), to: (f64, f64), radius: f64, color: Rgb) {
        if !(radius > 0.0) || !self.is_backed() {
            return;
        }
        let (ax, ay) = from;
        let (bx, by) = to;
        let x_start = (ax.min(bx) - radius).floor().max(0.0) as u32;
        let x_end = ((ax.max(bx) + radius).ceil().max(0.0) as u32).min(self.width);
        let y_start = (ay.min(by) - radius).floor().max(0.0) as u32;
        let y_end = ((ay.max(by) + radius).ceil().max(0.0) as u32).min(self.height);
        let radius_sq = radius * radius;

        for py in y_start..y_end {
            for px in x_start..x_end {
                let center = (px as f64 + 0.5, py as f64 + 0.5);
                if distance_sq_to_segment(center, from, to) <= radius_sq {
                    let index = self.index(px, py);
                    self.pixels[index] = Some(color);
                }
            }
        }
    }
}

fn distance_sq_to_segment(point: (f64, f64), from: (f64, f64), to: (f64, f64)) -> f64 {
    let (px, py) = point;
    let (ax, ay) = from;
    let (vx, vy) = (to.0 - ax, to.1 - ay);
    let length_sq = vx * vx + vy * vy;
    let t = if length_sq > 0.0 {
        (((px - ax) * vx + (py - ay) * vy) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dx = px - (ax + t * vx);
    let dy = py - (ay + t * vy);
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_distance_is_cached() {
        let first = min_distance();
        assert_eq!(first, 0.0);
        assert_eq!(min_distance(), first);
    }

    #[test]
    fn test_initial_dot() {
        let geometry = Geometry::resolve(Some(20.0), Some(20.0), Some(4.0));
        let mut canvas = TrailCanvas::new(&geometry);
        let color = Rgb::new(255, 0, 0);
        canvas.draw_pencils(&[Pencil::at_rest(0.0, 0.0, color)]);
        // Dot of radius 2 pixels around (10, 10)
        assert_eq!(canvas.pixel(9, 9), Some(color));
        assert_eq!(canvas.pixel(10, 10), Some(color));
        assert_eq!(canvas.pixel(13, 10), None);
        assert_eq!(canvas.pixel(0, 0), None);
    }

    #[test]
    fn test_stroke_follows_y_up() {
        let geometry = Geometry::resolve(Some(40.0), Some(40.0), Some(2.0));
        let mut canvas = TrailCanvas::new(&geometry);
        let color = Rgb::new(0, 0, 255);
        let pencil = Pencil::at_rest(0.0, 5.0, color);
        canvas.draw_move(&pencil, (0.0, 0.0));
        // Internal (0, 0)..(0, 5) maps to pixels (20, 20)..(20, 10)
        assert_eq!(canvas.pixel(20, 15), Some(color));
        assert_eq!(canvas.pixel(19, 11), Some(color));
        assert_eq!(canvas.pixel(20, 25), None);
        assert_eq!(canvas.pixel(25, 15), None);
    }

    #[test]
    fn test_zero_scale_draws_nothing() {
        let geometry = Geometry::resolve(Some(10.0), Some(10.0), Some(0.0));
        let mut canvas = TrailCanvas::new(&geometry);
        canvas.draw_pencils(&[Pencil::at_rest(0.0, 0.0, Rgb::WHITE)]);
        assert!(!canvas.is_painted());
    }

    #[test]
    fn test_clear() {
        let geometry = Geometry::default();
        let mut canvas = TrailCanvas::new(&geometry);
        canvas.draw_pencils(&[Pencil::at_rest(1.0, 1.0, Rgb::WHITE)]);
        assert!(canvas.is_painted());
        canvas.clear();
        assert!(!canvas.is_painted());
        assert_eq!(canvas.pixel(1000, 0), None);
    }

    #[test]
    fn test_oversized_surface_stays_blank() {
        let geometry = Geometry::resolve(Some(1e6), Some(1e6), None);
        let mut canvas = TrailCanvas::new(&geometry);
        assert!(!canvas.is_backed());
        assert_eq!(canvas.width(), 1_000_000);

        let pencil = Pencil::at_rest(3.0, -2.0, Rgb::WHITE);
        canvas.draw_pencils(&[pencil]);
        canvas.draw_move(&pencil, (0.0, 0.0));
        assert!(!canvas.is_painted());
        assert_eq!(canvas.pixel(500_000, 500_000), None);
        assert_eq!(canvas.pixel(999_999, 999_999), None);
    }

    #[test]
    fn test_wide_surface_indexes_rows() {
        let geometry = Geometry::resolve(Some(70_000.0), Some(4.0), Some(2.0));
        let mut canvas = TrailCanvas::new(&geometry);
        assert!(canvas.is_backed());
        canvas.draw_pencils(&[Pencil::at_rest(0.0, 0.0, Rgb::WHITE)]);
        assert_eq!(canvas.pixel(35_000, 2), Some(Rgb::WHITE));
        assert_eq!(canvas.pixel(35_000, 0), None);
    }
}
