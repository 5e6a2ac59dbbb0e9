//! The worm: a bounded trail of dots that wanders the viewport
//!
//! Cells live in a fixed ring buffer. Each move appends a new head one dot
//! away from the old one; once the buffer is full the oldest tail cell is
//! dropped. The heading drifts by a small random offset each move and turns
//! away when the next cell would land on an obstacle.

use std::f32::consts::FRAC_1_SQRT_2;

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacles::Obstacles;
use crate::consts::{DOT_SIZE, MAX_POINTS, RADIUS};
use crate::renderer::{Surface, colors};

/// Compass heading, clockwise from north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bearing {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// Per-bearing step direction in screen space (y down)
const INCREMENTS: [Vec2; Bearing::COUNT] = [
    Vec2::new(0.0, -1.0),
    Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    Vec2::new(1.0, 0.0),
    Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    Vec2::new(0.0, 1.0),
    Vec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    Vec2::new(-1.0, 0.0),
    Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

impl Bearing {
    pub const COUNT: usize = 8;

    pub const ALL: [Bearing; Self::COUNT] = [
        Bearing::N,
        Bearing::NE,
        Bearing::E,
        Bearing::SE,
        Bearing::S,
        Bearing::SW,
        Bearing::W,
        Bearing::NW,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wraps modulo 8
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    /// Rotate by `offset` eighth-turns (positive is clockwise)
    pub fn turn(self, offset: i32) -> Self {
        let index = (self.index() as i32 + offset).rem_euclid(Self::COUNT as i32);
        Self::from_index(index as usize)
    }

    /// Unit step for this heading (diagonals are normalized)
    pub fn increment(self) -> Vec2 {
        INCREMENTS[self.index()]
    }
}

/// Heading drift drawn uniformly from these nine slots: straight ahead most
/// often, one eighth-turn sometimes, a quarter-turn rarely
pub const OFFSET_TABLE: [i32; 9] = [0, 0, 0, 1, 1, 2, -1, -1, -2];

/// Turns tried in order when the drifted cell is blocked
pub const FALLBACK_OFFSETS: [i32; 3] = [2, -2, 4];

/// Source of the worm's random choices
pub trait Steering {
    /// Heading for the very first cell
    fn initial_bearing(&mut self) -> Bearing;

    /// Index into [`OFFSET_TABLE`]
    fn offset_slot(&mut self) -> usize;
}

/// Steering backed by a random number generator
#[derive(Debug, Clone)]
pub struct RandomSteering<R> {
    rng: R,
}

impl<R: Rng> RandomSteering<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSteering<Pcg32> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Steering for RandomSteering<R> {
    fn initial_bearing(&mut self) -> Bearing {
        Bearing::from_index(self.rng.random_range(0..Bearing::COUNT))
    }

    fn offset_slot(&mut self) -> usize {
        self.rng.random_range(0..OFFSET_TABLE.len())
    }
}

/// Wrap one axis of a cell's top-left corner around the viewport.
///
/// A cell wraps only once it is completely off the low edge, or its corner is
/// past the high edge.
pub fn wrap_coordinate(coord: i32, extent: i32) -> i32 {
    if coord + DOT_SIZE < 0 {
        coord + extent
    } else if coord > extent {
        coord - extent
    } else {
        coord
    }
}

/// One cell as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WormCell {
    /// Top-left corner of the dot
    pub pos: IVec2,
    pub is_head: bool,
}

#[derive(Debug, Clone)]
pub struct Worm<S = RandomSteering<Pcg32>> {
    cells: [IVec2; MAX_POINTS],
    point_count: usize,
    head: usize,
    tail: usize,
    bearing: Bearing,
    viewport: IVec2,
    steering: S,
}

impl Worm {
    /// Worm for a `width` x `height` viewport with seeded random steering
    pub fn new(width: i32, height: i32, seed: u64) -> Self {
        Self::with_steering(width, height, RandomSteering::seeded(seed))
    }
}

impl<S: Steering> Worm<S> {
    pub fn with_steering(width: i32, height: i32, steering: S) -> Self {
        Self {
            cells: [IVec2::ZERO; MAX_POINTS],
            point_count: 0,
            // First move lands the head on slot 0
            head: MAX_POINTS - 1,
            tail: 0,
            bearing: Bearing::N,
            viewport: IVec2::new(width, height),
            steering,
        }
    }

    /// Grow a new head, dropping the oldest cell when full
    pub fn advance(&mut self, obstacles: &Obstacles) {
        let prev = self.head;
        self.head = (self.head + 1) % MAX_POINTS;

        if self.point_count == 0 {
            self.tail = self.head;
            self.bearing = self.steering.initial_bearing();
            self.cells[self.head] = self.viewport / 2;
            self.point_count = 1;
            return;
        }

        if self.point_count == MAX_POINTS {
            self.tail = (self.tail + 1) % MAX_POINTS;
        } else {
            self.point_count += 1;
        }
        self.new_head(self.cells[prev], obstacles);
    }

    fn new_head(&mut self, from: IVec2, obstacles: &Obstacles) {
        let slot = self.steering.offset_slot() % OFFSET_TABLE.len();
        let mut bearing = self.bearing.turn(OFFSET_TABLE[slot]);
        let mut pos = self.next_point(from, bearing);

        if obstacles.hits(pos, DOT_SIZE) {
            for offset in FALLBACK_OFFSETS {
                bearing = self.bearing.turn(offset);
                pos = self.next_point(from, bearing);
                if !obstacles.hits(pos, DOT_SIZE) {
                    break;
                }
            }
            if obstacles.hits(pos, DOT_SIZE) {
                log::debug!("Worm boxed in at {from}, moving {bearing:?} through an obstacle");
            }
        }

        self.cells[self.head] = pos;
        self.bearing = bearing;
    }

    /// Cell one dot from `from` along `bearing`, wrapped to the viewport
    fn next_point(&self, from: IVec2, bearing: Bearing) -> IVec2 {
        let step = (bearing.increment() * DOT_SIZE as f32).as_ivec2();
        let raw = from + step;
        IVec2::new(
            wrap_coordinate(raw.x, self.viewport.x),
            wrap_coordinate(raw.y, self.viewport.y),
        )
    }
}

impl<S> Worm<S> {
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn head_index(&self) -> usize {
        self.head
    }

    pub fn tail_index(&self) -> usize {
        self.tail
    }

    pub fn bearing(&self) -> Bearing {
        self.bearing
    }

    pub fn head_position(&self) -> Option<IVec2> {
        (self.point_count > 0).then(|| self.cells[self.head])
    }

    /// Is (`x`, `y`) within one dot of the head's center on both axes?
    pub fn is_near_head(&self, x: i32, y: i32) -> bool {
        self.head_position().is_some_and(|head| {
            (head.x + RADIUS - x).abs() <= DOT_SIZE && (head.y + RADIUS - y).abs() <= DOT_SIZE
        })
    }

    /// Is (`x`, `y`) on any body cell? The head doesn't count.
    pub fn touched_at(&self, x: i32, y: i32) -> bool {
        self.cells()
            .filter(|cell| !cell.is_head)
            .any(|cell| {
                (cell.pos.x + RADIUS - x).abs() <= RADIUS
                    && (cell.pos.y + RADIUS - y).abs() <= RADIUS
            })
    }

    /// Live cells from tail to head
    pub fn cells(&self) -> impl Iterator<Item = WormCell> + '_ {
        (0..self.point_count).map(move |i| {
            let index = (self.tail + i) % MAX_POINTS;
            WormCell {
                pos: self.cells[index],
                is_head: index == self.head,
            }
        })
    }

    /// Black body, red head
    pub fn draw(&self, surface: &mut dyn Surface) {
        for cell in self.cells() {
            let color = if cell.is_head {
                colors::WORM_HEAD
            } else {
                colors::WORM_BODY
            };
            surface.fill_oval(cell.pos.x, cell.pos.y, DOT_SIZE, DOT_SIZE, color);
        }
    }
}
