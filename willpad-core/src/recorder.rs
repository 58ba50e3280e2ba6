//! # Stroke Recorder
//!
//! Captures pointer contact into vector [`Stroke`]s and paints them incrementally onto the owned
//! [`Surface`]. Owns the "has ink been drawn" flag for the current session.
//!
//! Out-of-order input (a move with no press, a release with nothing held) is silently absorbed.

use crate::raster::{EncodeError, StrokeStyle};
use crate::stroke::{PointerEvent, PointerPhase, Stroke, SurfaceBounds};
use crate::surface::{SizingPolicy, Surface, SurfaceGeometry};

#[derive(thiserror::Error, Debug)]
pub enum RasterizeError {
    #[error("surface has not been laid out")]
    Unmounted,
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// What [`StrokeRecorder::process`] did with an event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Processed {
    /// Out of order, or no usable position. Nothing changed.
    Ignored,
    /// A stroke was opened.
    Began {
        /// This was the first ink of the session.
        first_ink: bool,
    },
    /// The open stroke was extended.
    Extended,
    /// The open stroke was closed.
    Ended,
}

pub struct StrokeRecorder {
    style: StrokeStyle,
    policy: SizingPolicy,
    surface: Option<Surface>,
    bounds: SurfaceBounds,
    /// Finished strokes of this session, oldest first.
    strokes: Vec<Stroke>,
    in_progress_stroke: Option<Stroke>,
    has_ink: bool,
}
impl StrokeRecorder {
    /// Create an unmounted recorder. Nothing is painted until [`Self::mount`] succeeds, but strokes
    /// are still recorded and will be painted on mount.
    #[must_use]
    pub fn new(style: StrokeStyle, policy: SizingPolicy) -> Self {
        Self {
            style,
            policy,
            surface: None,
            bounds: SurfaceBounds::default(),
            strokes: Vec::new(),
            in_progress_stroke: None,
            has_ink: false,
        }
    }
    /// (Re)measure the surface. Allocates a new backing bitmap and repaints everything recorded so far.
    ///
    /// If the measurement is unusable and the policy has no fallback, this is a no-op and `false` is returned.
    pub fn mount(&mut self, measured: SurfaceGeometry, bounds: SurfaceBounds) -> bool {
        let Some(geometry) = self.policy.resolve(measured) else {
            log::debug!("deferring surface sizing, container reported {measured:?}");
            return false;
        };
        // Resolved geometry always has area.
        let Some(mut surface) = Surface::new(geometry) else {
            return false;
        };
        for (from, to) in self
            .strokes
            .iter()
            .chain(self.in_progress_stroke.as_ref())
            .flat_map(|stroke| stroke.segments())
        {
            surface.stroke_segment(from.pos, to.pos, &self.style);
        }
        log::debug!(
            "mounted surface {:?} backed by {:?}",
            geometry.css_size(),
            surface.backing_size()
        );
        self.surface = Some(surface);
        self.bounds = bounds;
        true
    }
    /// Update where the surface sits in client space, eg. after scrolling.
    pub fn set_bounds(&mut self, bounds: SurfaceBounds) {
        self.bounds = bounds;
    }
    #[must_use]
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }
    #[must_use]
    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }
    #[must_use]
    pub fn has_ink(&self) -> bool {
        self.has_ink
    }
    /// Is a gesture currently in progress?
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.in_progress_stroke.is_some()
    }
    /// Finished strokes of the current session.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }
    /// Open a new stroke at a surface-local position.
    ///
    /// Returns `true` if this is the first ink of the session.
    pub fn begin_stroke(&mut self, pos: [f32; 2]) -> bool {
        // Only one contact at a time - a second press implies the first was lost.
        self.end_stroke();
        self.in_progress_stroke = Some(Stroke::begin(pos));

        let first = !self.has_ink;
        self.has_ink = true;
        first
    }
    /// Extend the open stroke, painting just the new segment. No-op if no stroke is open.
    pub fn extend_stroke(&mut self, pos: [f32; 2]) {
        let Some(stroke) = self.in_progress_stroke.as_mut() else {
            return;
        };
        let Some(last) = stroke.push(pos) else {
            return;
        };
        if let Some(surface) = self.surface.as_mut() {
            surface.stroke_segment(last.pos, pos, &self.style);
        }
    }
    /// Close the open stroke. No-op if no stroke is open.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.in_progress_stroke.take() {
            self.strokes.push(stroke);
        }
    }
    /// Dispatch a raw pointer event.
    pub fn process(&mut self, event: &PointerEvent) -> Processed {
        if matches!(event.phase, PointerPhase::Up | PointerPhase::Leave) {
            if !self.is_drawing() {
                return Processed::Ignored;
            }
            self.end_stroke();
            return Processed::Ended;
        }
        let Some(pos) = event.input.local_position(self.bounds) else {
            log::trace!("ignoring {} event with no usable position", event.phase.as_ref());
            return Processed::Ignored;
        };
        if event.phase == PointerPhase::Down {
            Processed::Began {
                first_ink: self.begin_stroke(pos),
            }
        } else if self.is_drawing() {
            self.extend_stroke(pos);
            Processed::Extended
        } else {
            Processed::Ignored
        }
    }
    /// Wipe every stroke, the ink flag, and every painted pixel.
    pub fn reset(&mut self) {
        self.strokes.clear();
        self.in_progress_stroke = None;
        self.has_ink = false;
        if let Some(surface) = self.surface.as_mut() {
            surface.reset_surface();
        }
    }
    /// Flatten the surface to a PNG.
    pub fn rasterize(&self) -> Result<Rasterized, RasterizeError> {
        let surface = self.surface.as_ref().ok_or(RasterizeError::Unmounted)?;
        let [width, height] = surface.backing_size();
        Ok(Rasterized {
            width,
            height,
            png: surface.encode_png()?,
        })
    }
}

/// Raw output of [`StrokeRecorder::rasterize`].
pub struct Rasterized {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}
