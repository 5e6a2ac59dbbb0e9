//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// RGBA, each channel in 0..=1
pub type Color = [f32; 4];

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [1.0, 1.0, 1.0, 1.0];
    pub const WORM_BODY: Color = [0.0, 0.0, 0.0, 1.0];
    pub const WORM_HEAD: Color = [1.0, 0.0, 0.0, 1.0];
    pub const OBSTACLE: Color = [0.0, 0.0, 1.0, 1.0];
    pub const HUD_TEXT: Color = [0.0, 0.0, 1.0, 1.0];
    pub const BUTTON: Color = [0.0, 0.0, 0.0, 1.0];
    pub const BUTTON_HOVER: Color = [0.0, 1.0, 0.0, 1.0];
    pub const GAME_OVER: Color = [1.0, 0.0, 0.0, 1.0];
}
