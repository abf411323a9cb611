//! Tumbling-E optotype: a canonical right-opening E rotated through the
//! four cardinal directions.

use crate::bandpass::BandpassMask;
use crate::error::QcsfError;
use crate::optotypes::{build_template, rotate_cw, Bitmap, Template, DEFAULT_DELTA_OCT, DEFAULT_FC};

/// The direction the E's opening faces — what the observer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    /// Number of clockwise 90-degree rotations from the canonical
    /// right-opening E to reach this direction.
    fn rotation_steps(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }
}

const T: bool = true;
const F: bool = false;

/// Canonical right-opening E: left vertical bar plus three horizontals.
const CANONICAL_E: Bitmap = [
    [T, T, T, T, T],
    [T, F, F, F, F],
    [T, T, T, T, T],
    [T, F, F, F, F],
    [T, T, T, T, T],
];

fn bitmap_for(direction: Direction) -> Bitmap {
    let mut bitmap = CANONICAL_E;
    for _ in 0..direction.rotation_steps() {
        bitmap = rotate_cw(&bitmap);
    }
    bitmap
}

/// The four filtered tumbling-E templates, built once per session by
/// `TumblingEMode::prepare`.
#[derive(Debug, Clone)]
pub struct TumblingETemplates {
    templates: [Template; 4],
}

impl TumblingETemplates {
    pub fn build(n: usize, f_c: f64, delta_oct: f64) -> Result<Self, QcsfError> {
        let mask = BandpassMask::build(n, f_c, delta_oct);
        let mut templates: Vec<Template> = Vec::with_capacity(4);
        for &direction in Direction::ALL.iter() {
            let bitmap = bitmap_for(direction);
            templates.push(build_template(&bitmap, n, &mask)?);
        }
        let templates: [Template; 4] = templates
            .try_into()
            .map_err(|_| QcsfError::Configuration { message: "template build count mismatch".to_string() })?;
        Ok(Self { templates })
    }

    pub fn build_default(n: usize) -> Result<Self, QcsfError> {
        Self::build(n, DEFAULT_FC, DEFAULT_DELTA_OCT)
    }

    pub fn get(&self, direction: Direction) -> &Template {
        &self.templates[direction.rotation_steps()]
    }
}
