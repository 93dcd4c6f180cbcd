//! One discrete simulation step: pairwise attraction, then movement with
//! reflection at the bounds.

use crate::geometry::Bounds;
use crate::pencils::{square_of_distance, Pencil};

/// Accumulate the attraction between every unordered pair of pencils
pub fn apply_forces(pencils: &mut [Pencil], quickness: f64) {
    let count = pencils.len();
    for index1 in 0..count {
        let (head, tail) = pencils.split_at_mut(index1 + 1);
        let pencil1 = &mut head[index1];
        for pencil2 in tail.iter_mut() {
            let dist_x = pencil1.x - pencil2.x;
            let dist_y = pencil1.y - pencil2.y;
            let k = quickness * square_of_distance(dist_x, dist_y).powf(-1.5);
            let dx_incr = k * dist_x;
            let dy_incr = k * dist_y;
            pencil1.dx += dx_incr;
            pencil1.dy += dy_incr;
            pencil2.dx -= dx_incr;
            pencil2.dy -= dy_incr;
        }
    }
}

/// Advance one coordinate, reflecting off `min` and `max` as many times as needed.
///
/// Returns the new position; `velocity` flips sign once per reflection.
fn reflect(pos0: f64, velocity: &mut f64, min: f64, max: f64, quickness: f64) -> f64 {
    let mut pos1 = pos0 + quickness * *velocity;
    loop {
        if pos1 < min {
            pos1 = 2.0 * min - pos1;
        } else if pos1 > max {
            pos1 = 2.0 * max - pos1;
        } else {
            break;
        }
        *velocity = -*velocity;
    }
    pos1
}

/// Move a pencil by its velocity and return its previous position
pub fn move_pencil(pencil: &mut Pencil, bounds: &Bounds, quickness: f64) -> (f64, f64) {
    let previous = (pencil.x, pencil.y);
    pencil.x = reflect(pencil.x, &mut pencil.dx, bounds.min_x, bounds.max_x, quickness);
    pencil.y = reflect(pencil.y, &mut pencil.dy, bounds.min_y, bounds.max_y, quickness);
    previous
}

/// Run a full step. `on_move` sees each pencil after it moved, with its previous position.
pub fn step<F>(pencils: &mut [Pencil], bounds: &Bounds, quickness: f64, mut on_move: F)
where
    F: FnMut(&Pencil, (f64, f64)),
{
    apply_forces(pencils, quickness);
    for pencil in pencils.iter_mut() {
        let previous = move_pencil(pencil, bounds, quickness);
        on_move(pencil, previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::geometry::Geometry;

    #[test]
    fn test_symmetric_pair_regression() {
        let geometry = Geometry::resolve(Some(50.0), Some(50.0), None);
        let x = 0.25 * (1.0 + f64::EPSILON);
        let y = 3f64.sqrt() / 4.0;
        let mut pencils = vec![
            Pencil::at_rest(x, y, Rgb::BLACK),
            Pencil::at_rest(-x, -y, Rgb::BLACK),
        ];
        step(&mut pencils, &geometry.bounds, 1.0, |_, _| {});

        let expected_x = 0.75;
        let expected_y = 3.0 * 3f64.sqrt() / 4.0;
        assert!((pencils[0].x - expected_x).abs() < 1e-15);
        assert!((pencils[0].y - expected_y).abs() < 1e-15);
        assert!((pencils[1].x + expected_x).abs() < 1e-15);
        assert!((pencils[1].y + expected_y).abs() < 1e-15);
    }

    #[test]
    fn test_forces_are_antisymmetric() {
        let mut pencils = vec![
            Pencil::at_rest(0.0, 0.0, Rgb::BLACK),
            Pencil::at_rest(2.0, 0.0, Rgb::BLACK),
            Pencil::at_rest(0.0, 3.0, Rgb::BLACK),
        ];
        apply_forces(&mut pencils, 0.5);
        let total_dx: f64 = pencils.iter().map(|p| p.dx).sum();
        let total_dy: f64 = pencils.iter().map(|p| p.dy).sum();
        assert!(total_dx.abs() < 1e-15);
        assert!(total_dy.abs() < 1e-15);
    }

    #[test]
    fn test_single_pencil_is_not_pulled() {
        let geometry = Geometry::default();
        let mut pencils = vec![Pencil::at_rest(1.0, 2.0, Rgb::BLACK)];
        let mut moves = Vec::new();
        step(&mut pencils, &geometry.bounds, 1.0, |pencil, previous| {
            moves.push(((pencil.x, pencil.y), previous));
        });
        assert_eq!(moves, vec![((1.0, 2.0), (1.0, 2.0))]);

        let mut none: Vec<Pencil> = Vec::new();
        step(&mut none, &geometry.bounds, 1.0, |_, _| panic!("no pencils to move"));
    }

    #[test]
    fn test_reflects_repeatedly() {
        // Crosses the [-1, 1] interval more than once in a single step
        let mut velocity = 5.5;
        let pos = reflect(0.0, &mut velocity, -1.0, 1.0, 1.0);
        assert_eq!(pos, 0.5);
        assert_eq!(velocity, -5.5);

        let mut velocity = -1.5;
        let pos = reflect(0.0, &mut velocity, -1.0, 1.0, 1.0);
        assert_eq!(pos, -0.5);
        assert_eq!(velocity, 1.5);
    }

    #[test]
    fn test_positions_stay_in_bounds() {
        let geometry = Geometry::resolve(Some(60.0), Some(40.0), Some(5.0));
        let bounds = geometry.bounds;
        let mut pencils = vec![
            Pencil::at_rest(-2.0, 0.0, Rgb::BLACK),
            Pencil::at_rest(2.0, 0.5, Rgb::BLACK),
            Pencil::at_rest(0.0, -2.5, Rgb::BLACK),
        ];
        for _ in 0..500 {
            step(&mut pencils, &bounds, 0.025, |pencil, _| {
                assert!(pencil.x >= bounds.min_x && pencil.x <= bounds.max_x);
                assert!(pencil.y >= bounds.min_y && pencil.y <= bounds.max_y);
            });
        }
    }
}
