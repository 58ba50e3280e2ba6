//! # Signature lifecycle
//!
//! Mediates draw -> confirm -> clear over a [`StrokeRecorder`], and publishes state changes to anyone listening.
//!
//! ```text
//!   Empty --first ink--> Drawing --confirm()--> Confirmed
//!     ^                     ^                       |
//!     |                     +------more ink---------+
//!     +------------------ clear() (from anywhere)
//! ```

use crate::recorder::{Processed, RasterizeError, StrokeRecorder};
use crate::stroke::{PointerEvent, SurfaceBounds};
use crate::surface::SurfaceGeometry;

/// Listeners that fall this far behind start missing events.
const EVENT_CAPACITY: usize = 16;

/// A flattened signature. Cheap to clone, the encoded data is shared.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterizedSignature {
    width: u32,
    height: u32,
    png: std::sync::Arc<[u8]>,
}
impl RasterizedSignature {
    /// Size in physical pixels.
    #[must_use]
    pub fn dimensions(&self) -> [u32; 2] {
        [self.width, self.height]
    }
    /// The encoded PNG.
    #[must_use]
    pub fn png(&self) -> &[u8] {
        &self.png
    }
    /// Encode as a `data:` URL, suitable for an `<img>` source.
    #[must_use]
    pub fn data_url(&self) -> String {
        use base64::Engine;
        let mut url = String::from("data:image/png;base64,");
        base64::engine::general_purpose::STANDARD.encode_string(&self.png, &mut url);
        url
    }
}
impl std::fmt::Debug for RasterizedSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterizedSignature")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png", &human_bytes::human_bytes(self.png.len() as f64))
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::AsRefStr)]
pub enum SignatureState {
    /// No ink, no image.
    Empty,
    /// Ink has been put down that isn't reflected in the published image (if any).
    Drawing,
    /// The published image reflects the surface.
    Confirmed,
}

/// Broadcast to subscribers on every transition.
#[derive(Clone, PartialEq, Debug)]
pub enum SignatureEvent {
    /// The ink flag changed. Gate "confirm" controls on this.
    InkChanged(bool),
    /// A new image was published.
    Confirmed(RasterizedSignature),
    /// Ink and image are gone.
    Cleared,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfirmError {
    #[error("nothing to confirm")]
    NothingToConfirm,
    #[error(transparent)]
    Rasterize(#[from] RasterizeError),
}

pub struct SignaturePad {
    recorder: StrokeRecorder,
    state: SignatureState,
    confirmed: Option<RasterizedSignature>,
    events: bus::Bus<SignatureEvent>,
}
impl SignaturePad {
    #[must_use]
    pub fn new(recorder: StrokeRecorder) -> Self {
        Self {
            recorder,
            state: SignatureState::Empty,
            confirmed: None,
            events: bus::Bus::new(EVENT_CAPACITY),
        }
    }
    /// Listen for state changes from now on.
    pub fn subscribe(&mut self) -> bus::BusReader<SignatureEvent> {
        self.events.add_rx()
    }
    /// See [`StrokeRecorder::mount`]
    pub fn mount(&mut self, measured: SurfaceGeometry, bounds: SurfaceBounds) -> bool {
        self.recorder.mount(measured, bounds)
    }
    #[must_use]
    pub fn state(&self) -> SignatureState {
        self.state
    }
    #[must_use]
    pub fn has_ink(&self) -> bool {
        self.recorder.has_ink()
    }
    /// Whether a confirm control should be enabled.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.has_ink()
    }
    /// The most recently confirmed image, if not since cleared.
    #[must_use]
    pub fn rasterized(&self) -> Option<&RasterizedSignature> {
        self.confirmed.as_ref()
    }
    #[must_use]
    pub fn recorder(&self) -> &StrokeRecorder {
        &self.recorder
    }
    pub fn begin_stroke(&mut self, pos: [f32; 2]) {
        let first = self.recorder.begin_stroke(pos);
        self.after_begin(first);
    }
    pub fn extend_stroke(&mut self, pos: [f32; 2]) {
        self.recorder.extend_stroke(pos);
    }
    pub fn end_stroke(&mut self) {
        self.recorder.end_stroke();
    }
    /// Feed a raw pointer event to the recorder.
    pub fn pointer(&mut self, event: &PointerEvent) {
        if let Processed::Began { first_ink } = self.recorder.process(event) {
            self.after_begin(first_ink);
        }
    }
    fn after_begin(&mut self, first_ink: bool) {
        if first_ink {
            self.notify(SignatureEvent::InkChanged(true));
        }
        if self.state != SignatureState::Drawing {
            log::debug!("signature {} -> Drawing", self.state.as_ref());
            self.state = SignatureState::Drawing;
        }
    }
    /// Flatten the surface and publish it.
    ///
    /// # Errors
    /// [`ConfirmError::NothingToConfirm`] if no ink has been put down since the last clear.
    pub fn confirm(&mut self) -> Result<RasterizedSignature, ConfirmError> {
        if !self.has_ink() {
            return Err(ConfirmError::NothingToConfirm);
        }
        let raw = self.recorder.rasterize()?;
        let rasterized = RasterizedSignature {
            width: raw.width,
            height: raw.height,
            png: raw.png.into(),
        };
        log::debug!("signature {} -> Confirmed, {rasterized:?}", self.state.as_ref());
        self.state = SignatureState::Confirmed;
        self.confirmed = Some(rasterized.clone());
        self.notify(SignatureEvent::Confirmed(rasterized.clone()));
        Ok(rasterized)
    }
    /// Discard all ink and any published image, and reallocate the surface. Valid in any state.
    pub fn clear(&mut self) {
        self.recorder.reset();
        self.confirmed = None;
        if self.state != SignatureState::Empty {
            log::debug!("signature {} -> Empty", self.state.as_ref());
        }
        self.state = SignatureState::Empty;
        self.notify(SignatureEvent::Cleared);
    }
    fn notify(&mut self, event: SignatureEvent) {
        if let Err(event) = self.events.try_broadcast(event) {
            log::warn!("signature listener lagging, dropped {event:?}");
        }
    }
}
