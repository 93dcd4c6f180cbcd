use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque 8-bit color, the only kind of color a pencil carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(rgb: Rgb) -> Self {
        ratatui::style::Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// A parsed CSS color before it hits the surface.
/// Channels are 0-255, alpha is 0-1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    const OPAQUE_BLACK: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Read back what a 1x1 alpha-quantizing surface would store for this fill.
    /// A fully transparent pixel reads back as black.
    pub fn read_back(&self) -> Rgb {
        let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round();
        if alpha == 0.0 {
            return Rgb::BLACK;
        }
        Rgb::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

fn channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

/// Turns arbitrary CSS color strings into opaque colors.
///
/// Mirrors a scratch surface whose fill style is only replaced by valid
/// colors: an invalid or missing color reuses the last valid one.
#[derive(Debug, Clone)]
pub struct ColorNormalizer {
    fill_style: Rgba,
}

impl Default for ColorNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorNormalizer {
    pub fn new() -> Self {
        Self {
            fill_style: Rgba::OPAQUE_BLACK,
        }
    }

    pub fn normalize(&mut self, color: Option<&str>) -> Rgb {
        if let Some(parsed) = color.and_then(parse_css_color) {
            self.fill_style = parsed;
        }
        self.fill_style.read_back()
    }
}

/// Parse a CSS color: hex, rgb()/rgba(), hsl()/hsla(), named colors, `transparent`
pub fn parse_css_color(input: &str) -> Option<Rgba> {
    let input = input.trim().to_ascii_lowercase();

    if let Some(hex) = input.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(open) = input.find('(') {
        let inner = input[open + 1..].strip_suffix(')')?;
        return match input[..open].trim() {
            "rgb" | "rgba" => parse_rgb_args(inner),
            "hsl" | "hsla" => parse_hsl_args(inner),
            _ => None,
        };
    }

    if input == "transparent" {
        return Some(Rgba {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 0.0,
        });
    }

    named_color(&input).map(|rgb| Rgba::opaque(rgb.r as f64, rgb.g as f64, rgb.b as f64))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (r, g, b, a) = match hex.len() {
        3 => (digit(0)?, digit(1)?, digit(2)?, 255),
        4 => (digit(0)?, digit(1)?, digit(2)?, digit(3)?),
        6 => (pair(0)?, pair(2)?, pair(4)?, 255),
        8 => (pair(0)?, pair(2)?, pair(4)?, pair(6)?),
        _ => return None,
    };
    Some(Rgba {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64 / 255.0,
    })
}

/// Split functional notation arguments on commas, slashes and whitespace
fn split_args(inner: &str) -> Vec<&str> {
    inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_number(token: &str) -> Option<f64> {
    let value: f64 = token.parse().ok()?;
    value.is_finite().then_some(value)
}

fn parse_percentage(token: &str) -> Option<f64> {
    token.strip_suffix('%').and_then(parse_number)
}

fn parse_alpha(token: Option<&&str>) -> Option<f64> {
    let alpha = match token {
        None => 1.0,
        Some(token) => match parse_percentage(token) {
            Some(percent) => percent / 100.0,
            None => parse_number(token)?,
        },
    };
    Some(alpha.clamp(0.0, 1.0))
}

fn parse_rgb_args(inner: &str) -> Option<Rgba> {
    let args = split_args(inner);
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let component = |token: &str| match parse_percentage(token) {
        Some(percent) => Some(percent * 255.0 / 100.0),
        None => parse_number(token),
    };
    Some(Rgba {
        r: component(args[0])?.clamp(0.0, 255.0),
        g: component(args[1])?.clamp(0.0, 255.0),
        b: component(args[2])?.clamp(0.0, 255.0),
        a: parse_alpha(args.get(3))?,
    })
}

fn parse_hsl_args(inner: &str) -> Option<Rgba> {
    let args = split_args(inner);
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let hue = parse_number(args[0].strip_suffix("deg").unwrap_or(args[0]))?;
    let saturation = (parse_percentage(args[1])? / 100.0).clamp(0.0, 1.0);
    let lightness = (parse_percentage(args[2])? / 100.0).clamp(0.0, 1.0);
    let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
    Some(Rgba {
        r,
        g,
        b,
        a: parse_alpha(args.get(3))?,
    })
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (f64, f64, f64) {
    if saturation == 0.0 {
        let gray = lightness * 255.0;
        return (gray, gray, gray);
    }
    let h = hue.rem_euclid(360.0) / 360.0;
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    (
        hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0,
        hue_to_channel(p, q, h) * 255.0,
        hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0,
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// CSS named colors, sorted by name
const NAMED_COLORS: [(&str, Rgb); 148] = [
    ("aliceblue", Rgb::new(240, 248, 255)),
    ("antiquewhite", Rgb::new(250, 235, 215)),
    ("aqua", Rgb::new(0, 255, 255)),
    ("aquamarine", Rgb::new(127, 255, 212)),
    ("azure", Rgb::new(240, 255, 255)),
    ("beige", Rgb::new(245, 245, 220)),
    ("bisque", Rgb::new(255, 228, 196)),
    ("black", Rgb::new(0, 0, 0)),
    ("blanchedalmond", Rgb::new(255, 235, 205)),
    ("blue", Rgb::new(0, 0, 255)),
    ("blueviolet", Rgb::new(138, 43, 226)),
    ("brown", Rgb::new(165, 42, 42)),
    ("burlywood", Rgb::new(222, 184, 135)),
    ("cadetblue", Rgb::new(95, 158, 160)),
    ("chartreuse", Rgb::new(127, 255, 0)),
    ("chocolate", Rgb::new(210, 105, 30)),
    ("coral", Rgb::new(255, 127, 80)),
    ("cornflowerblue", Rgb::new(100, 149, 237)),
    ("cornsilk", Rgb::new(255, 248, 220)),
    ("crimson", Rgb::new(220, 20, 60)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("darkblue", Rgb::new(0, 0, 139)),
    ("darkcyan", Rgb::new(0, 139, 139)),
    ("darkgoldenrod", Rgb::new(184, 134, 11)),
    ("darkgray", Rgb::new(169, 169, 169)),
    ("darkgreen", Rgb::new(0, 100, 0)),
    ("darkgrey", Rgb::new(169, 169, 169)),
    ("darkkhaki", Rgb::new(189, 183, 107)),
    ("darkmagenta", Rgb::new(139, 0, 139)),
    ("darkolivegreen", Rgb::new(85, 107, 47)),
    ("darkorange", Rgb::new(255, 140, 0)),
    ("darkorchid", Rgb::new(153, 50, 204)),
    ("darkred", Rgb::new(139, 0, 0)),
    ("darksalmon", Rgb::new(233, 150, 122)),
    ("darkseagreen", Rgb::new(143, 188, 143)),
    ("darkslateblue", Rgb::new(72, 61, 139)),
    ("darkslategray", Rgb::new(47, 79, 79)),
    ("darkslategrey", Rgb::new(47, 79, 79)),
    ("darkturquoise", Rgb::new(0, 206, 209)),
    ("darkviolet", Rgb::new(148, 0, 211)),
    ("deeppink", Rgb::new(255, 20, 147)),
    ("deepskyblue", Rgb::new(0, 191, 255)),
    ("dimgray", Rgb::new(105, 105, 105)),
    ("dimgrey", Rgb::new(105, 105, 105)),
    ("dodgerblue", Rgb::new(30, 144, 255)),
    ("firebrick", Rgb::new(178, 34, 34)),
    ("floralwhite", Rgb::new(255, 250, 240)),
    ("forestgreen", Rgb::new(34, 139, 34)),
    ("fuchsia", Rgb::new(255, 0, 255)),
    ("gainsboro", Rgb::new(220, 220, 220)),
    ("ghostwhite", Rgb::new(248, 248, 255)),
    ("gold", Rgb::new(255, 215, 0)),
    ("goldenrod", Rgb::new(218, 165, 32)),
    ("gray", Rgb::new(128, 128, 128)),
    ("green", Rgb::new(0, 128, 0)),
    ("greenyellow", Rgb::new(173, 255, 47)),
    ("grey", Rgb::new(128, 128, 128)),
    ("honeydew", Rgb::new(240, 255, 240)),
    ("hotpink", Rgb::new(255, 105, 180)),
    ("indianred", Rgb::new(205, 92, 92)),
    ("indigo", Rgb::new(75, 0, 130)),
    ("ivory", Rgb::new(255, 255, 240)),
    ("khaki", Rgb::new(240, 230, 140)),
    ("lavender", Rgb::new(230, 230, 250)),
    ("lavenderblush", Rgb::new(255, 240, 245)),
    ("lawngreen", Rgb::new(124, 252, 0)),
    ("lemonchiffon", Rgb::new(255, 250, 205)),
    ("lightblue", Rgb::new(173, 216, 230)),
    ("lightcoral", Rgb::new(240, 128, 128)),
    ("lightcyan", Rgb::new(224, 255, 255)),
    ("lightgoldenrodyellow", Rgb::new(250, 250, 210)),
    ("lightgray", Rgb::new(211, 211, 211)),
    ("lightgreen", Rgb::new(144, 238, 144)),
    ("lightgrey", Rgb::new(211, 211, 211)),
    ("lightpink", Rgb::new(255, 182, 193)),
    ("lightsalmon", Rgb::new(255, 160, 122)),
    ("lightseagreen", Rgb::new(32, 178, 170)),
    ("lightskyblue", Rgb::new(135, 206, 250)),
    ("lightslategray", Rgb::new(119, 136, 153)),
    ("lightslategrey", Rgb::new(119, 136, 153)),
    ("lightsteelblue", Rgb::new(176, 196, 222)),
    ("lightyellow", Rgb::new(255, 255, 224)),
    ("lime", Rgb::new(0, 255, 0)),
    ("limegreen", Rgb::new(50, 205, 50)),
    ("linen", Rgb::new(250, 240, 230)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("maroon", Rgb::new(128, 0, 0)),
    ("mediumaquamarine", Rgb::new(102, 205, 170)),
    ("mediumblue", Rgb::new(0, 0, 205)),
    ("mediumorchid", Rgb::new(186, 85, 211)),
    ("mediumpurple", Rgb::new(147, 112, 219)),
    ("mediumseagreen", Rgb::new(60, 179, 113)),
    ("mediumslateblue", Rgb::new(123, 104, 238)),
    ("mediumspringgreen", Rgb::new(0, 250, 154)),
    ("mediumturquoise", Rgb::new(72, 209, 204)),
    ("mediumvioletred", Rgb::new(199, 21, 133)),
    ("midnightblue", Rgb::new(25, 25, 112)),
    ("mintcream", Rgb::new(245, 255, 250)),
    ("mistyrose", Rgb::new(255, 228, 225)),
    ("moccasin", Rgb::new(255, 228, 181)),
    ("navajowhite", Rgb::new(255, 222, 173)),
    ("navy", Rgb::new(0, 0, 128)),
    ("oldlace", Rgb::new(253, 245, 230)),
    ("olive", Rgb::new(128, 128, 0)),
    ("olivedrab", Rgb::new(107, 142, 35)),
    ("orange", Rgb::new(255, 165, 0)),
    ("orangered", Rgb::new(255, 69, 0)),
    ("orchid", Rgb::new(218, 112, 214)),
    ("palegoldenrod", Rgb::new(238, 232, 170)),
    ("palegreen", Rgb::new(152, 251, 152)),
    ("paleturquoise", Rgb::new(175, 238, 238)),
    ("palevioletred", Rgb::new(219, 112, 147)),
    ("papayawhip", Rgb::new(255, 239, 213)),
    ("peachpuff", Rgb::new(255, 218, 185)),
    ("peru", Rgb::new(205, 133, 63)),
    ("pink", Rgb::new(255, 192, 203)),
    ("plum", Rgb::new(221, 160, 221)),
    ("powderblue", Rgb::new(176, 224, 230)),
    ("purple", Rgb::new(128, 0, 128)),
    ("rebeccapurple", Rgb::new(102, 51, 153)),
    ("red", Rgb::new(255, 0, 0)),
    ("rosybrown", Rgb::new(188, 143, 143)),
    ("royalblue", Rgb::new(65, 105, 225)),
    ("saddlebrown", Rgb::new(139, 69, 19)),
    ("salmon", Rgb::new(250, 128, 114)),
    ("sandybrown", Rgb::new(244, 164, 96)),
    ("seagreen", Rgb::new(46, 139, 87)),
    ("seashell", Rgb::new(255, 245, 238)),
    ("sienna", Rgb::new(160, 82, 45)),
    ("silver", Rgb::new(192, 192, 192)),
    ("skyblue", Rgb::new(135, 206, 235)),
    ("slateblue", Rgb::new(106, 90, 205)),
    ("slategray", Rgb::new(112, 128, 144)),
    ("slategrey", Rgb::new(112, 128, 144)),
    ("snow", Rgb::new(255, 250, 250)),
    ("springgreen", Rgb::new(0, 255, 127)),
    ("steelblue", Rgb::new(70, 130, 180)),
    ("tan", Rgb::new(210, 180, 140)),
    ("teal", Rgb::new(0, 128, 128)),
    ("thistle", Rgb::new(216, 191, 216)),
    ("tomato", Rgb::new(255, 99, 71)),
    ("turquoise", Rgb::new(64, 224, 208)),
    ("violet", Rgb::new(238, 130, 238)),
    ("wheat", Rgb::new(245, 222, 179)),
    ("white", Rgb::new(255, 255, 255)),
    ("whitesmoke", Rgb::new(245, 245, 245)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("yellowgreen", Rgb::new(154, 205, 50)),
];

fn named_color(name: &str) -> Option<Rgb> {
    NAMED_COLORS
        .binary_search_by(|(candidate, _)| candidate.cmp(&name))
        .ok()
        .map(|index| NAMED_COLORS[index].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(color: &str) -> String {
        ColorNormalizer::new().normalize(Some(color)).to_string()
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(normalize("#FF8000"), "rgb(255, 128, 0)");
        assert_eq!(normalize("#0F0"), "rgb(0, 255, 0)");
        assert_eq!(normalize("#8000FF"), "rgb(128, 0, 255)");
        assert_eq!(normalize("#ff000080"), "rgb(255, 0, 0)");
        assert_eq!(normalize("#f000"), "rgb(0, 0, 0)");
    }

    #[test]
    fn test_alpha_is_dropped() {
        assert_eq!(normalize("rgba(255,0,0,0.5)"), "rgb(255, 0, 0)");
        assert_eq!(normalize("transparent"), "rgb(0, 0, 0)");
        assert_eq!(normalize("hsla(120,100%,50%,0.023529411)"), "rgb(0, 255, 0)");
        // Quantizes to an alpha of 0
        assert_eq!(normalize("rgba(0, 0, 255, 0.001)"), "rgb(0, 0, 0)");
    }

    #[test]
    fn test_functional_syntax_variants() {
        assert_eq!(normalize("rgb(10 20 30)"), "rgb(10, 20, 30)");
        assert_eq!(normalize("rgb(100%, 0%, 50%)"), "rgb(255, 0, 128)");
        assert_eq!(normalize("rgb(0 0 255 / 50%)"), "rgb(0, 0, 255)");
        assert_eq!(normalize("hsl(0, 100%, 50%)"), "rgb(255, 0, 0)");
        assert_eq!(normalize("hsl(240deg 100% 50%)"), "rgb(0, 0, 255)");
        assert_eq!(normalize("hsl(0, 0%, 100%)"), "rgb(255, 255, 255)");
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(normalize("Green"), "rgb(0, 128, 0)");
        assert_eq!(normalize(" dimgray "), "rgb(105, 105, 105)");
        assert_eq!(normalize("cornflowerblue"), "rgb(100, 149, 237)");
        assert_eq!(normalize("SlateGray"), "rgb(112, 128, 144)");
        assert_eq!(normalize("yellowgreen"), "rgb(154, 205, 50)");
        assert!(parse_css_color("notacolor").is_none());
    }

    #[test]
    fn test_named_color_table_is_sorted() {
        assert!(NAMED_COLORS.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_invalid_color_keeps_previous_fill() {
        let mut normalizer = ColorNormalizer::new();
        assert_eq!(normalizer.normalize(None), Rgb::BLACK);
        assert_eq!(normalizer.normalize(Some("not a color")), Rgb::BLACK);
        assert_eq!(normalizer.normalize(Some("red")), Rgb::new(255, 0, 0));
        assert_eq!(normalizer.normalize(Some("#12")), Rgb::new(255, 0, 0));
        assert_eq!(normalizer.normalize(None), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_rejects_malformed_functions() {
        assert!(parse_css_color("rgb(1, 2)").is_none());
        assert!(parse_css_color("rgb(1, 2, 3").is_none());
        assert!(parse_css_color("cmyk(1, 2, 3, 4)").is_none());
        assert!(parse_css_color("#ggg").is_none());
    }
}
