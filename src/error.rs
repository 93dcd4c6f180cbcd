use thiserror::Error;

/// Errors raised while configuring or mutating a pencilfloor
#[derive(Error, Debug)]
pub enum PencilfloorError {
    /// A pencil position lies outside the allowed range for its axis
    #[error("Pencil {axis}-position {value} out of range {min} to {max}")]
    PencilOutOfRange {
        axis: char,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Two pencils start closer than one unit apart
    #[error("Pencils ({x}, {y}) and ({x0}, {y0}) overlap")]
    PencilOverlap { x: f64, y: f64, x0: f64, y0: f64 },

    /// The pencils parameter is neither a list nor an arrangement
    #[error("Parameter \"pencils\" must be an iterable or a function returning an iterable")]
    InvalidPencils,

    /// A unit-interval property was assigned a value outside [0, 1]
    #[error("{property} must be between 0 and 1")]
    OutOfUnitRange { property: &'static str, value: f64 },

    /// Attempt to write a read-only property
    #[error("Cannot assign to read only property '{property}'")]
    ReadOnly { property: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PencilfloorError {
    /// True for the range-class failures (out-of-range positions and properties)
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            PencilfloorError::PencilOutOfRange { .. } | PencilfloorError::OutOfUnitRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PencilfloorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = PencilfloorError::PencilOutOfRange {
            axis: 'X',
            value: 100.0,
            min: -14.5,
            max: 14.5,
        };
        assert_eq!(err.to_string(), "Pencil X-position 100 out of range -14.5 to 14.5");
        assert!(err.is_range_error());

        let err = PencilfloorError::PencilOverlap {
            x: 0.5,
            y: 0.5,
            x0: 0.0,
            y0: 0.0,
        };
        assert_eq!(err.to_string(), "Pencils (0.5, 0.5) and (0, 0) overlap");
        assert!(!err.is_range_error());

        let err = PencilfloorError::OutOfUnitRange {
            property: "Quickness",
            value: 2.0,
        };
        assert_eq!(err.to_string(), "Quickness must be between 0 and 1");
    }
}
