//! Headless drawing surface
//!
//! [`VertexBatch`] turns draw calls into a triangle list plus a list of text
//! runs, the same data a GPU backend would upload each frame.
//! [`HeadlessPresenter`] wraps one and counts presented frames.

use glam::Vec2;

use super::shapes::{self, ELLIPSE_SEGMENTS, OUTLINE_WIDTH};
use super::vertex::{Color, Vertex};
use super::{PresentStatus, Presenter, RenderError, Surface};

/// Advance of one glyph in the fixed-width metric
pub const GLYPH_WIDTH: i32 = 7;

/// A line of text queued for the host's text rasterizer
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: i32,
    /// Baseline
    pub y: i32,
    pub color: Color,
}

/// Vertex and text output of one frame
#[derive(Debug, Clone)]
pub struct VertexBatch {
    width: i32,
    height: i32,
    clear_color: Color,
    vertices: Vec<Vertex>,
    text: Vec<TextRun>,
}

impl VertexBatch {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            vertices: Vec::new(),
            text: Vec::new(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn text_runs(&self) -> &[TextRun] {
        &self.text
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Raw vertex data for a buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Vertices mapped from pixels to normalized device coordinates
    pub fn to_ndc(&self) -> Vec<Vertex> {
        let half = Vec2::new(self.width.max(1) as f32, self.height.max(1) as f32) * 0.5;
        self.vertices
            .iter()
            .map(|v| {
                let p = (Vec2::from(v.position) - half) / half;
                Vertex::new(p.x, -p.y, v.color)
            })
            .collect()
    }

    fn bounds(x: i32, y: i32, width: i32, height: i32) -> (Vec2, Vec2) {
        (
            Vec2::new(x as f32, y as f32),
            Vec2::new(width as f32, height as f32),
        )
    }
}

impl Surface for VertexBatch {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
        self.text.clear();
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let (origin, size) = Self::bounds(x, y, width, height);
        self.vertices.extend(shapes::rect(origin, size, color));
    }

    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let (origin, size) = Self::bounds(x, y, width, height);
        self.vertices
            .extend(shapes::ellipse(origin, size, color, ELLIPSE_SEGMENTS));
    }

    fn stroke_oval(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let (origin, size) = Self::bounds(x, y, width, height);
        self.vertices.extend(shapes::ellipse_outline(
            origin,
            size,
            OUTLINE_WIDTH,
            color,
            ELLIPSE_SEGMENTS,
        ));
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Color) {
        self.text.push(TextRun {
            text: text.to_owned(),
            x,
            y,
            color,
        });
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * GLYPH_WIDTH
    }
}

/// Presenter with no display; keeps the last frame for inspection
#[derive(Debug)]
pub struct HeadlessPresenter {
    batch: VertexBatch,
    frames_presented: u64,
    last_vertex_count: usize,
    last_text: Vec<TextRun>,
}

impl HeadlessPresenter {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            batch: VertexBatch::new(width, height),
            frames_presented: 0,
            last_vertex_count: 0,
            last_text: Vec::new(),
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Triangle vertices in the most recently presented frame
    pub fn last_vertex_count(&self) -> usize {
        self.last_vertex_count
    }

    /// Text drawn in the most recently presented frame
    pub fn last_text(&self) -> &[TextRun] {
        &self.last_text
    }
}

impl Presenter for HeadlessPresenter {
    fn surface(&mut self) -> &mut dyn Surface {
        &mut self.batch
    }

    fn present_frame(&mut self) -> Result<PresentStatus, RenderError> {
        self.frames_presented += 1;
        self.last_vertex_count = self.batch.vertices().len();
        self.last_text = self.batch.text_runs().to_vec();
        log::trace!(
            "Presented frame {} ({} vertices, {} bytes)",
            self.frames_presented,
            self.last_vertex_count,
            self.batch.as_bytes().len()
        );
        Ok(PresentStatus::Shown)
    }
}
