//! Shape tessellation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Color, Vertex};

/// Segments used for ellipses the size of a worm dot
pub const ELLIPSE_SEGMENTS: u32 = 16;

/// Outline thickness in pixels
pub const OUTLINE_WIDTH: f32 = 1.0;

/// Two triangles covering the box with top-left corner `origin`
pub fn rect(origin: Vec2, size: Vec2, color: Color) -> Vec<Vertex> {
    let max = origin + size;
    vec![
        Vertex::new(origin.x, origin.y, color),
        Vertex::new(max.x, origin.y, color),
        Vertex::new(origin.x, max.y, color),
        Vertex::new(origin.x, max.y, color),
        Vertex::new(max.x, origin.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

fn point_on(center: Vec2, radii: Vec2, theta: f32) -> Vec2 {
    Vec2::new(
        center.x + radii.x * theta.cos(),
        center.y + radii.y * theta.sin(),
    )
}

/// Filled ellipse inscribed in the given bounding box
pub fn ellipse(origin: Vec2, size: Vec2, color: Color, segments: u32) -> Vec<Vertex> {
    let radii = size * 0.5;
    let center = origin + radii;
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let edge1 = point_on(center, radii, theta1);
        let edge2 = point_on(center, radii, theta2);

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(edge1.x, edge1.y, color));
        vertices.push(Vertex::new(edge2.x, edge2.y, color));
    }

    vertices
}

/// Ellipse outline of `width` pixels drawn just inside the bounding box
pub fn ellipse_outline(
    origin: Vec2,
    size: Vec2,
    width: f32,
    color: Color,
    segments: u32,
) -> Vec<Vertex> {
    let outer = size * 0.5;
    let inner = (outer - Vec2::splat(width)).max(Vec2::ZERO);
    let center = origin + outer;
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = point_on(center, inner, theta1);
        let outer1 = point_on(center, outer, theta1);
        let inner2 = point_on(center, inner, theta2);
        let outer2 = point_on(center, outer, theta2);

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_rect_covers_its_box() {
        let vertices = rect(Vec2::new(10.0, 20.0), Vec2::new(12.0, 12.0), RED);
        assert_eq!(vertices.len(), 6);
        for v in &vertices {
            assert!((10.0..=22.0).contains(&v.position[0]));
            assert!((20.0..=32.0).contains(&v.position[1]));
        }
        assert!(vertices.iter().any(|v| v.position == [22.0, 32.0]));
    }

    #[test]
    fn test_ellipse_stays_inside_bounding_box() {
        let origin = Vec2::new(100.0, 50.0);
        let size = Vec2::new(12.0, 12.0);
        let vertices = ellipse(origin, size, RED, ELLIPSE_SEGMENTS);

        assert_eq!(vertices.len(), (ELLIPSE_SEGMENTS * 3) as usize);
        for v in &vertices {
            let p = Vec2::from(v.position);
            assert!(p.distance(origin + size * 0.5) <= 6.0 + 1e-4);
        }
    }

    #[test]
    fn test_outline_is_a_band() {
        let origin = Vec2::ZERO;
        let size = Vec2::new(20.0, 20.0);
        let vertices = ellipse_outline(origin, size, OUTLINE_WIDTH, RED, 8);

        assert_eq!(vertices.len(), 8 * 6);
        let center = Vec2::new(10.0, 10.0);
        for v in &vertices {
            let r = Vec2::from(v.position).distance(center);
            assert!((9.0 - 1e-4..=10.0 + 1e-4).contains(&r));
        }
    }
}
