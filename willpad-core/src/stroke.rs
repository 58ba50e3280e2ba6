//! # Strokes
//!
//! Vector ink, and the normalization of raw pointer input into surface-local positions.

/// A single recorded sample of a stroke.
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, PartialEq, Debug)]
#[repr(C)]
pub struct Point {
    /// Surface-local position, in logical pixels.
    pub pos: [f32; 2],
    /// Cumulative arc length from the start of the stroke.
    pub dist: f32,
}

/// One continuous contact trace. Immutable once the gesture that made it ends.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Stroke {
    points: Vec<Point>,
}
impl Stroke {
    pub(crate) fn begin(pos: [f32; 2]) -> Self {
        Self {
            points: vec![Point { pos, dist: 0.0 }],
        }
    }
    /// Append a position, returning the point it continues from.
    pub(crate) fn push(&mut self, pos: [f32; 2]) -> Option<Point> {
        let last = *self.points.last()?;
        let delta = [pos[0] - last.pos[0], pos[1] - last.pos[1]];
        self.points.push(Point {
            pos,
            dist: last.dist + (delta[0] * delta[0] + delta[1] * delta[1]).sqrt(),
        });
        Some(last)
    }
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    /// Total arc length of the stroke.
    #[must_use]
    pub fn arc_length(&self) -> f32 {
        self.points.last().map_or(0.0, |point| point.dist)
    }
    /// Iterate over consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// The client-space origin of the surface, i.e. the top-left of its bounding box.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
}

/// The position part of a raw pointer event, before normalization.
#[derive(Clone, PartialEq, Debug)]
pub enum PointerInput {
    /// Mouse-style event with a single client position.
    Mouse { client: [f32; 2] },
    /// Touch event carrying every active touch. Only the first is used.
    Touch {
        touches: smallvec::SmallVec<[[f32; 2]; 2]>,
    },
}
impl PointerInput {
    #[must_use]
    pub fn mouse(x: f32, y: f32) -> Self {
        Self::Mouse { client: [x, y] }
    }
    #[must_use]
    pub fn touch(x: f32, y: f32) -> Self {
        Self::Touch {
            touches: smallvec::smallvec![[x, y]],
        }
    }
    /// Normalize into a surface-local position.
    ///
    /// `None` for a touch event with no touches, or a non-finite position.
    #[must_use]
    pub fn local_position(&self, bounds: SurfaceBounds) -> Option<[f32; 2]> {
        let client = match self {
            Self::Mouse { client } => *client,
            Self::Touch { touches } => *touches.first()?,
        };
        let local = [client[0] - bounds.left, client[1] - bounds.top];
        local.iter().all(|v| v.is_finite()).then_some(local)
    }
}

/// What a pointer event is doing.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::AsRefStr)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The pointer left the surface. Treated exactly like [`PointerPhase::Up`].
    Leave,
}

#[derive(Clone, PartialEq, Debug)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub input: PointerInput,
}
impl PointerEvent {
    #[must_use]
    pub fn new(phase: PointerPhase, input: PointerInput) -> Self {
        Self { phase, input }
    }
}
