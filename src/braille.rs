use pencilfloor::canvas::TrailCanvas;
use pencilfloor::color::Rgb;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// A single rendered Braille cell with position and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Terminal cells needed to show a surface of the given pixel size at 1:1
pub fn cells_for_pixels(width: u32, height: u32) -> (u16, u16) {
    (
        width.div_ceil(2).min(u16::MAX as u32) as u16,
        height.div_ceil(4).min(u16::MAX as u32) as u16,
    )
}

/// Pixel size of a surface that fills the given number of terminal cells
pub fn pixels_for_cells(cells_width: u16, cells_height: u16) -> (u32, u32) {
    (cells_width as u32 * 2, cells_height as u32 * 4)
}

/// Render the trail surface to Braille characters, scaled to fit the canvas area.
/// Each cell takes the average color of its painted dots.
pub fn render_to_braille(
    surface: &TrailCanvas,
    canvas_width: u16,
    canvas_height: u16,
) -> Vec<BrailleCell> {
    let (braille_width, braille_height) = pixels_for_cells(canvas_width, canvas_height);
    if surface.width() == 0 || surface.height() == 0 || braille_width == 0 || braille_height == 0 {
        return Vec::new();
    }

    // Never upscale: a small surface keeps 1:1 pixels and sits in the top-left corner
    let scale = (surface.width() as f32 / braille_width as f32)
        .max(surface.height() as f32 / braille_height as f32)
        .max(1.0);
    let (used_width, used_height) = cells_for_pixels(
        (surface.width() as f32 / scale).ceil() as u32,
        (surface.height() as f32 / scale).ceil() as u32,
    );
    let cols = used_width.min(canvas_width);
    let rows = used_height.min(canvas_height);

    let mut cells = Vec::with_capacity(cols as usize * rows as usize);

    for cy in 0..rows {
        for cx in 0..cols {
            let mut pattern: u8 = 0;
            let mut totals = [0u32; 3];
            let mut dot_count = 0u32;

            let base_bx = cx as u32 * 2;
            let base_by = cy as u32 * 4;

            for (dx, column) in BRAILLE_DOTS.iter().enumerate() {
                for (dy, bit) in column.iter().enumerate() {
                    let px = ((base_bx + dx as u32) as f32 * scale) as u32;
                    let py = ((base_by + dy as u32) as f32 * scale) as u32;

                    if let Some(rgb) = surface.pixel(px, py) {
                        pattern |= bit;
                        totals[0] += rgb.r as u32;
                        totals[1] += rgb.g as u32;
                        totals[2] += rgb.b as u32;
                        dot_count += 1;
                    }
                }
            }

            // Only emit cells that have at least one dot
            if pattern != 0 {
                let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                let color = Rgb::new(
                    (totals[0] / dot_count) as u8,
                    (totals[1] / dot_count) as u8,
                    (totals[2] / dot_count) as u8,
                )
                .into();
                cells.push(BrailleCell {
                    x: cx,
                    y: cy,
                    char: braille_char,
                    color,
                });
            }
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use pencilfloor::geometry::Geometry;
    use pencilfloor::pencils::Pencil;

    #[test]
    fn test_braille_pattern() {
        assert_eq!(BRAILLE_DOTS[0][0], 0x01); // Top-left
        assert_eq!(BRAILLE_DOTS[1][0], 0x08); // Top-right
        assert_eq!(BRAILLE_DOTS[0][3], 0x40); // Bottom-left
        assert_eq!(BRAILLE_DOTS[1][3], 0x80); // Bottom-right

        let all_dots: u8 = BRAILLE_DOTS[0].iter().sum::<u8>() + BRAILLE_DOTS[1].iter().sum::<u8>();
        assert_eq!(all_dots, 0xFF);
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(cells_for_pixels(300, 150), (150, 38));
        assert_eq!(pixels_for_cells(150, 38), (300, 152));
    }

    #[test]
    fn test_empty_surface() {
        let geometry = Geometry::resolve(Some(20.0), Some(20.0), None);
        let surface = TrailCanvas::new(&geometry);
        assert!(render_to_braille(&surface, 10, 5).is_empty());
        assert!(render_to_braille(&surface, 0, 0).is_empty());
    }

    #[test]
    fn test_dot_keeps_color() {
        let geometry = Geometry::resolve(Some(8.0), Some(8.0), Some(2.0));
        let mut surface = TrailCanvas::new(&geometry);
        let color = Rgb::new(255, 128, 0);
        surface.draw_pencils(&[Pencil::at_rest(0.0, 0.0, color)]);

        let cells = render_to_braille(&surface, 4, 2);
        assert!(!cells.is_empty());
        assert!(cells.iter().all(|cell| cell.color == Color::Rgb(255, 128, 0)));
        assert!(cells.iter().all(|cell| cell.x < 4 && cell.y < 2));
    }
}
