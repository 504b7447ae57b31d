//! Contour geometry: polygon measures and the minimum enclosing circle.

/// Circle returned by the enclosing-circle solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy)]
struct CircleF64 {
    cx: f64,
    cy: f64,
    r: f64,
}

/// Shoelace area of a closed pixel-coordinate polygon.
pub fn polygon_area(points: &[(f32, f32)]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for i in 0..points.len() {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % points.len()];
        sum += f64::from(x1) * f64::from(y2) - f64::from(x2) * f64::from(y1);
    }
    (sum.abs() * 0.5) as f32
}

/// Perimeter of the closed polygon.
pub fn polygon_perimeter(points: &[(f32, f32)]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for i in 0..points.len() {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % points.len()];
        let dx = f64::from(x2) - f64::from(x1);
        let dy = f64::from(y2) - f64::from(y1);
        sum += (dx * dx + dy * dy).sqrt();
    }
    sum as f32
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

fn contains(circle: &CircleF64, point: (f64, f64)) -> bool {
    distance((circle.cx, circle.cy), point) <= circle.r + 1e-7
}

fn from_two(a: (f64, f64), b: (f64, f64)) -> CircleF64 {
    let cx = (a.0 + b.0) * 0.5;
    let cy = (a.1 + b.1) * 0.5;
    CircleF64 {
        cx,
        cy,
        r: distance(a, b) * 0.5,
    }
}

fn from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> CircleF64 {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < 1e-9 {
        // collinear: the widest pairwise circle covers all three
        let mut best = from_two(a, b);
        for candidate in [from_two(a, c), from_two(b, c)] {
            if candidate.r > best.r {
                best = candidate;
            }
        }
        return best;
    }
    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;
    let cx = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let cy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
    let center = (cx, cy);
    CircleF64 {
        cx,
        cy,
        r: distance(center, a),
    }
}

/// Minimum enclosing circle via incremental Welzl-style construction.
/// Deterministic; handles the degenerate 0/1/2-point inputs directly.
pub fn min_enclosing_circle(points: &[(f32, f32)]) -> Circle {
    if points.is_empty() {
        return Circle {
            cx: 0.0,
            cy: 0.0,
            radius: 0.0,
        };
    }
    let pts: Vec<(f64, f64)> = points
        .iter()
        .map(|&(x, y)| (f64::from(x), f64::from(y)))
        .collect();

    let mut circle = CircleF64 {
        cx: pts[0].0,
        cy: pts[0].1,
        r: 0.0,
    };
    for i in 1..pts.len() {
        if contains(&circle, pts[i]) {
            continue;
        }
        circle = CircleF64 {
            cx: pts[i].0,
            cy: pts[i].1,
            r: 0.0,
        };
        for j in 0..i {
            if contains(&circle, pts[j]) {
                continue;
            }
            circle = from_two(pts[i], pts[j]);
            for k in 0..j {
                if contains(&circle, pts[k]) {
                    continue;
                }
                circle = from_three(pts[i], pts[j], pts[k]);
            }
        }
    }
    Circle {
        cx: circle.cx as f32,
        cy: circle.cy as f32,
        radius: circle.r as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_and_perimeter_of_unit_square() {
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!((polygon_area(&square) - 1.0).abs() < 1e-6);
        assert!((polygon_perimeter(&square) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_polygons_measure_zero() {
        assert_eq!(polygon_area(&[(1.0, 1.0)]), 0.0);
        assert_eq!(polygon_perimeter(&[(1.0, 1.0)]), 0.0);
    }

    #[test]
    fn enclosing_circle_of_single_point_is_that_point() {
        let circle = min_enclosing_circle(&[(3.0, 4.0)]);
        assert_eq!(circle.cx, 3.0);
        assert_eq!(circle.cy, 4.0);
        assert_eq!(circle.radius, 0.0);
    }

    #[test]
    fn enclosing_circle_of_two_points_spans_them() {
        let circle = min_enclosing_circle(&[(0.0, 0.0), (6.0, 0.0)]);
        assert!((circle.cx - 3.0).abs() < 1e-5);
        assert!((circle.radius - 3.0).abs() < 1e-5);
    }

    #[test]
    fn enclosing_circle_is_tight_on_a_square() {
        let circle = min_enclosing_circle(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        assert!((circle.cx - 1.0).abs() < 1e-4);
        assert!((circle.cy - 1.0).abs() < 1e-4);
        assert!((circle.radius - (2.0f32).sqrt()).abs() < 1e-4);
    }

    #[test]
    fn collinear_points_fall_back_to_widest_pair() {
        let circle = min_enclosing_circle(&[(0.0, 0.0), (2.0, 0.0), (5.0, 0.0)]);
        assert!((circle.radius - 2.5).abs() < 1e-4);
        assert!((circle.cx - 2.5).abs() < 1e-4);
    }
}
