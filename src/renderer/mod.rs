//! Rendering contract
//!
//! The simulation draws into a [`Surface`] and hands the finished frame to a
//! [`Presenter`]. Window management, buffer flipping and text rasterization
//! belong to the host; the crate ships a headless [`VertexBatch`] surface that
//! tessellates every draw call into triangles ready for upload.

pub mod batch;
pub mod shapes;
pub mod vertex;

use thiserror::Error;

pub use batch::{HeadlessPresenter, TextRun, VertexBatch};
pub use vertex::{Color, Vertex, colors};

/// Failures while drawing or presenting a frame
#[derive(Debug, Error)]
pub enum RenderError {
    /// The drawing surface went away and cannot be recovered
    #[error("drawing surface lost")]
    SurfaceLost,

    #[error("render backend error: {0}")]
    Backend(String),
}

/// Result of handing a frame to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentStatus {
    Shown,
    /// The display dropped the frame's contents; the next frame redraws anyway
    ContentsLost,
}

/// 2D drawing target with a top-left origin, y pointing down.
/// Shapes are given by their bounding box.
pub trait Surface {
    fn size(&self) -> (i32, i32);

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color);

    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color);

    fn stroke_oval(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color);

    /// Draw a line of text with its baseline at `y`
    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Color);

    /// Advance width of `text` in pixels
    fn text_width(&self, text: &str) -> i32;
}

/// Host side of the frame: the surface to draw into and how to show it
pub trait Presenter {
    fn surface(&mut self) -> &mut dyn Surface;

    fn present_frame(&mut self) -> Result<PresentStatus, RenderError>;
}
