//! Widget geometry and the internal coordinate system.
//!
//! Pencil positions are expressed in units of one pencil radius, with the
//! origin at the center of the widget and the y axis pointing up.

pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 150;
pub const DEFAULT_PENCIL_SIZE: f64 = 5.0;

/// Convert a requested dimension into a pixel size.
///
/// The number wraps like a 32-bit signed integer; absent or negative values
/// fall back to `default`.
pub fn to_size(value: Option<f64>, default: u32) -> u32 {
    match value {
        Some(value) => {
            let size = to_int32(value);
            if size >= 0 {
                size as u32
            } else {
                default
            }
        }
        None => default,
    }
}

/// 32-bit signed wrap-around conversion (NaN and infinities become 0)
pub fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let wrapped = value.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

/// Resolve the pencil radius in pixels for the given widget size
pub fn resolve_pencil_size(requested: Option<f64>, width: u32, height: u32) -> f64 {
    let mut size = requested.unwrap_or(f64::NAN);
    if size <= 0.0 {
        return 0.0;
    }
    if size.is_nan() {
        size = DEFAULT_PENCIL_SIZE;
    }
    size.min(width as f64 / 2.0).min(height as f64 / 2.0)
}

/// Rectangle handed to pencil arrangements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangeRect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    /// Full horizontal extent (2 * max_x)
    pub width: f64,
    /// Full vertical extent (2 * max_y)
    pub height: f64,
}

impl ArrangeRect {
    /// Rectangle with explicit bounds; extents derived from the maxima
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            width: 2.0 * max_x,
            height: 2.0 * max_y,
        }
    }
}

/// Allowed pencil positions, per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn resolve(width: u32, height: u32, pencil_size: f64) -> Self {
        let max_x = (width as f64 - pencil_size) / pencil_size / 2.0;
        let max_y = (height as f64 - pencil_size) / pencil_size / 2.0;
        Self {
            min_x: -max_x,
            max_x,
            min_y: -max_y,
            max_y,
        }
    }

    pub fn arrange_rect(&self) -> ArrangeRect {
        ArrangeRect::new(self.min_x, self.max_x, self.min_y, self.max_y)
    }
}

/// Resolved, immutable geometry of one widget instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub pencil_size: f64,
    pub bounds: Bounds,
}

impl Geometry {
    pub fn resolve(width: Option<f64>, height: Option<f64>, pencil_size: Option<f64>) -> Self {
        let width = to_size(width, DEFAULT_WIDTH);
        let height = to_size(height, DEFAULT_HEIGHT);
        let pencil_size = resolve_pencil_size(pencil_size, width, height);
        Self {
            width,
            height,
            pencil_size,
            bounds: Bounds::resolve(width, height, pencil_size),
        }
    }

    /// Map an internal position to pixel coordinates (y axis flipped)
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.width as f64 / 2.0 + x * self.pencil_size,
            self.height as f64 / 2.0 - y * self.pencil_size,
        )
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::resolve(None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_size_defaults() {
        assert_eq!(to_size(None, DEFAULT_WIDTH), DEFAULT_WIDTH);
        assert_eq!(to_size(Some(-1.0), DEFAULT_WIDTH), DEFAULT_WIDTH);
        assert_eq!(to_size(Some(4_294_967_295.0), DEFAULT_HEIGHT), DEFAULT_HEIGHT);
    }

    #[test]
    fn test_to_size_wraps_to_32_bits() {
        assert_eq!(to_size(Some(42.9), DEFAULT_WIDTH), 42);
        assert_eq!(to_size(Some(4_294_967_296.0 + 43.0), DEFAULT_WIDTH), 43);
        assert_eq!(to_size(Some(f64::NAN), DEFAULT_WIDTH), 0);
        assert_eq!(to_size(Some(f64::INFINITY), DEFAULT_WIDTH), 0);
    }

    #[test]
    fn test_pencil_size() {
        assert_eq!(resolve_pencil_size(None, 300, 150), DEFAULT_PENCIL_SIZE);
        assert_eq!(resolve_pencil_size(Some(f64::NAN), 300, 150), DEFAULT_PENCIL_SIZE);
        assert_eq!(resolve_pencil_size(Some(-42.0), 300, 150), 0.0);
        assert_eq!(resolve_pencil_size(Some(-0.0), 300, 150), 0.0);
        assert_eq!(resolve_pencil_size(Some(f64::NEG_INFINITY), 300, 150), 0.0);
        assert_eq!(resolve_pencil_size(Some(f64::INFINITY), 99, 150), 49.5);
        assert_eq!(resolve_pencil_size(Some(f64::INFINITY), 300, 99), 49.5);
        assert_eq!(resolve_pencil_size(None, 1, 150), 0.5);
        assert_eq!(resolve_pencil_size(None, 0, 150), 0.0);
    }

    #[test]
    fn test_default_bounds() {
        let geometry = Geometry::default();
        assert_eq!(geometry.width, 300);
        assert_eq!(geometry.height, 150);
        assert_eq!(geometry.bounds.min_x, -29.5);
        assert_eq!(geometry.bounds.max_x, 29.5);
        assert_eq!(geometry.bounds.min_y, -14.5);
        assert_eq!(geometry.bounds.max_y, 14.5);

        let rect = geometry.bounds.arrange_rect();
        assert_eq!(rect.width, 59.0);
        assert_eq!(rect.height, 29.0);
    }

    #[test]
    fn test_to_pixel() {
        let geometry = Geometry::resolve(Some(50.0), Some(50.0), Some(5.0));
        assert_eq!(geometry.to_pixel(0.0, 0.0), (25.0, 25.0));
        assert_eq!(geometry.to_pixel(1.0, 1.0), (30.0, 20.0));
    }
}
