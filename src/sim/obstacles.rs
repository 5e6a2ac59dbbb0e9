//! Obstacle field
//!
//! Append-only set of fixed-size boxes. The loop thread queries it while the
//! input thread inserts, so every access goes through one mutex.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::IVec2;

use super::rect::Rect;
use crate::consts::BOX_LENGTH;
use crate::renderer::{Surface, colors};

type CountObserver = Box<dyn Fn(usize) + Send + Sync>;

pub struct Obstacles {
    boxes: Mutex<Vec<Rect>>,
    /// Told the new count after every insert
    observer: Option<CountObserver>,
}

impl Default for Obstacles {
    fn default() -> Self {
        Self::new()
    }
}

impl Obstacles {
    pub fn new() -> Self {
        Self {
            boxes: Mutex::new(Vec::new()),
            observer: None,
        }
    }

    pub fn with_observer(observer: impl Fn(usize) + Send + Sync + 'static) -> Self {
        Self {
            boxes: Mutex::new(Vec::new()),
            observer: Some(Box::new(observer)),
        }
    }

    // A panic elsewhere can't leave a half-pushed Vec behind, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, Vec<Rect>> {
        self.boxes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a `BOX_LENGTH` box at (`x`, `y`) and return the new count
    pub fn add(&self, x: i32, y: i32) -> usize {
        let count = {
            let mut boxes = self.lock();
            boxes.push(Rect::new(x, y, BOX_LENGTH, BOX_LENGTH));
            boxes.len()
        };
        log::debug!("Obstacle {count} added at ({x}, {y})");
        if let Some(observer) = &self.observer {
            observer(count);
        }
        count
    }

    /// Would a `size` square at `pos` overlap any obstacle?
    pub fn hits(&self, pos: IVec2, size: i32) -> bool {
        let candidate = Rect::square(pos, size);
        self.lock().iter().any(|b| b.intersects(&candidate))
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Copy of the current boxes in insertion order
    pub fn boxes(&self) -> Vec<Rect> {
        self.lock().clone()
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for b in self.lock().iter() {
            surface.fill_rect(b.x, b.y, b.width, b.height, colors::OBSTACLE);
        }
    }
}

impl fmt::Debug for Obstacles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obstacles")
            .field("boxes", &*self.lock())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
