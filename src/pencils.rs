//! Pencil records and construction of the initial pencil set.

use crate::color::{ColorNormalizer, Rgb};
use crate::error::{PencilfloorError, Result};
use crate::geometry::{ArrangeRect, Bounds};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

/// Radius of the default triangular arrangement, in pencil units
const DEFAULT_ARRANGEMENT_RADIUS: f64 = 4.0;

const DEFAULT_COLORS: [&str; 3] = ["#FF8000", "#0F0", "#8000FF"];

fn nan() -> f64 {
    f64::NAN
}

/// Requested initial pencil: position in pencil units and any CSS color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PencilParam {
    #[serde(default = "nan")]
    pub x: f64,
    #[serde(default = "nan")]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PencilParam {
    pub fn new(x: f64, y: f64, color: impl Into<String>) -> Self {
        Self {
            x,
            y,
            color: Some(color.into()),
        }
    }

    /// Pencil without a color (it inherits the previous pencil's color)
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, color: None }
    }
}

/// Live pencil state, mutated every instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pencil {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub color: Rgb,
}

impl Pencil {
    pub fn at_rest(x: f64, y: f64, color: Rgb) -> Self {
        Self {
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            color,
        }
    }
}

/// Detached copy of a pencil handed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PencilSnapshot {
    pub x: f64,
    pub y: f64,
    pub color: String,
}

impl From<&Pencil> for PencilSnapshot {
    fn from(pencil: &Pencil) -> Self {
        Self {
            x: pencil.x,
            y: pencil.y,
            color: pencil.color.to_string(),
        }
    }
}

/// Arrangement callback: produces a fresh sequence every time it is called
pub type Arrangement = Box<dyn Fn(&ArrangeRect) -> Box<dyn Iterator<Item = PencilParam>>>;

/// Where the initial pencils come from
#[derive(Default)]
pub enum PencilSource {
    /// The built-in triangle
    #[default]
    Default,
    List(Vec<PencilParam>),
    Arrange(Arrangement),
}

impl PencilSource {
    pub fn arrange<F, I>(arrangement: F) -> Self
    where
        F: Fn(&ArrangeRect) -> I + 'static,
        I: IntoIterator<Item = PencilParam>,
        I::IntoIter: 'static,
    {
        PencilSource::Arrange(Box::new(
            move |rect: &ArrangeRect| -> Box<dyn Iterator<Item = PencilParam>> {
                Box::new(arrangement(rect).into_iter())
            },
        ))
    }

    fn params(&self, rect: &ArrangeRect) -> Box<dyn Iterator<Item = PencilParam>> {
        match self {
            PencilSource::Default => Box::new(default_arrange_pencils(rect)),
            PencilSource::List(params) => Box::new(params.clone().into_iter()),
            PencilSource::Arrange(arrangement) => arrangement(rect),
        }
    }
}

impl fmt::Debug for PencilSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PencilSource::Default => f.write_str("Default"),
            PencilSource::List(params) => f.debug_tuple("List").field(params).finish(),
            PencilSource::Arrange(_) => f.write_str("Arrange(..)"),
        }
    }
}

impl From<Vec<PencilParam>> for PencilSource {
    fn from(params: Vec<PencilParam>) -> Self {
        PencilSource::List(params)
    }
}

pub fn square_of_distance(dist_x: f64, dist_y: f64) -> f64 {
    dist_x * dist_x + dist_y * dist_y
}

/// Validate the requested pencils against the bounds and normalize their colors.
///
/// Fails on the first pencil that is out of range or overlaps an earlier one.
pub fn build_pencils(source: &PencilSource, bounds: &Bounds) -> Result<Vec<Pencil>> {
    let mut normalizer = ColorNormalizer::new();
    let mut pencils: Vec<Pencil> = Vec::new();

    for param in source.params(&bounds.arrange_rect()) {
        let x = param.x;
        if !(x >= bounds.min_x && x <= bounds.max_x) {
            return Err(PencilfloorError::PencilOutOfRange {
                axis: 'X',
                value: x,
                min: bounds.min_x,
                max: bounds.max_x,
            });
        }
        let y = param.y;
        if !(y >= bounds.min_y && y <= bounds.max_y) {
            return Err(PencilfloorError::PencilOutOfRange {
                axis: 'Y',
                value: y,
                min: bounds.min_y,
                max: bounds.max_y,
            });
        }
        if let Some(other) = pencils
            .iter()
            .find(|other| square_of_distance(x - other.x, y - other.y) < 1.0)
        {
            return Err(PencilfloorError::PencilOverlap {
                x,
                y,
                x0: other.x,
                y0: other.y,
            });
        }
        let color = normalizer.normalize(param.color.as_deref());
        pencils.push(Pencil::at_rest(x, y, color));
    }

    Ok(pencils)
}

/// Three pencils on a circle of radius 4 around the origin, at a random rotation
pub fn default_arrange_pencils(rect: &ArrangeRect) -> DefaultArrangement {
    default_arrange_pencils_with(rect, rand::thread_rng().gen::<f64>())
}

/// Default arrangement starting at `turns` full revolutions
pub fn default_arrange_pencils_with(rect: &ArrangeRect, turns: f64) -> DefaultArrangement {
    let radius = DEFAULT_ARRANGEMENT_RADIUS;
    let fits = rect.min_x <= -radius
        && rect.max_x >= radius
        && rect.min_y <= -radius
        && rect.max_y >= radius;
    DefaultArrangement {
        turns,
        next_color: if fits { 0 } else { DEFAULT_COLORS.len() },
    }
}

/// Lazy sequence produced by [`default_arrange_pencils`]
#[derive(Debug, Clone)]
pub struct DefaultArrangement {
    turns: f64,
    next_color: usize,
}

impl Iterator for DefaultArrangement {
    type Item = PencilParam;

    fn next(&mut self) -> Option<PencilParam> {
        let color = DEFAULT_COLORS.get(self.next_color)?;
        let angle = TAU * self.turns;
        let param = PencilParam::new(
            DEFAULT_ARRANGEMENT_RADIUS * angle.cos(),
            DEFAULT_ARRANGEMENT_RADIUS * angle.sin(),
            *color,
        );
        self.turns += 1.0 / 3.0;
        self.next_color += 1;
        Some(param)
    }
}
