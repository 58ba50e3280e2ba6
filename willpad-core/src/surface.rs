//! # Surface
//!
//! The drawing surface and the policy for sizing its backing bitmap.
//!
//! A surface has two sizes: its layout size in logical (CSS) pixels, and the size of its backing bitmap in
//! physical pixels. They're related by the device pixel ratio, and all painting is done in logical pixels
//! with the ratio applied on the way down, so one drawing unit is always one logical pixel.

use crate::raster::{Bitmap, EncodeError, StrokeStyle};

/// Largest backing bitmap side, in physical pixels. Measurements beyond this are treated as unusable.
pub const MAX_BACKING_DIMENSION: u32 = 16_384;

/// A measurement of the surface's container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceGeometry {
    /// Layout width, in logical pixels.
    pub css_width: f32,
    /// Layout height, in logical pixels.
    pub css_height: f32,
    /// Ratio of physical pixels per logical pixel.
    pub device_pixel_ratio: f32,
}
impl SurfaceGeometry {
    #[must_use]
    pub fn new(css_width: f32, css_height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            css_width,
            css_height,
            device_pixel_ratio,
        }
    }
    /// Get the layout size, in logical pixels.
    #[must_use]
    pub fn css_size(&self) -> [f32; 2] {
        [self.css_width, self.css_height]
    }
    /// Get the size of the backing bitmap, in physical pixels. Fractional sizes truncate.
    ///
    /// `None` if the container hasn't been laid out yet, or this measurement would otherwise produce
    /// a surface with no area, or a side longer than [`MAX_BACKING_DIMENSION`].
    #[must_use]
    pub fn backing_size(&self) -> Option<[u32; 2]> {
        let dpr = self.device_pixel_ratio;
        if !dpr.is_finite() || dpr <= 0.0 {
            return None;
        }
        let physical = self.css_size().map(|logical| logical * dpr);
        // Anything that would truncate to more than the limit.
        #[allow(clippy::cast_precision_loss)]
        let max = MAX_BACKING_DIMENSION as f32 + 1.0;
        if physical
            .iter()
            .any(|v| !v.is_finite() || *v < 1.0 || *v >= max)
        {
            return None;
        }
        // In [1, MAX_BACKING_DIMENSION], cast cannot misbehave.
        Some(physical.map(|v| v as u32))
    }
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.backing_size().is_some()
    }
}

/// Decides what to do with a measurement before a surface is built from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SizingPolicy {
    /// Logical size to use when the container reports no area, or an unusable one.
    /// If `None`, sizing is deferred until a usable measurement arrives.
    pub fallback_css_size: Option<[f32; 2]>,
}
impl SizingPolicy {
    /// Resolve a measurement into one that can back a surface, or `None` to defer.
    #[must_use]
    pub fn resolve(&self, measured: SurfaceGeometry) -> Option<SurfaceGeometry> {
        if measured.is_laid_out() {
            return Some(measured);
        }
        let [css_width, css_height] = self.fallback_css_size?;
        // Keep the reported density if it's sane.
        let dpr = if measured.device_pixel_ratio.is_finite() && measured.device_pixel_ratio > 0.0
        {
            measured.device_pixel_ratio
        } else {
            1.0
        };
        let fallback = SurfaceGeometry::new(css_width, css_height, dpr);
        if fallback.is_laid_out() {
            log::debug!("surface not laid out, using fallback size {css_width}x{css_height}");
            Some(fallback)
        } else {
            log::warn!("fallback surface size {css_width}x{css_height} is degenerate, ignoring");
            None
        }
    }
}

/// A mounted drawing surface. Owns its backing bitmap, which is never handed out mutably.
pub struct Surface {
    geometry: SurfaceGeometry,
    bitmap: Bitmap,
}
impl Surface {
    /// Allocate a fresh, blank surface. `None` if the geometry has no area.
    #[must_use]
    pub fn new(geometry: SurfaceGeometry) -> Option<Self> {
        let [width, height] = geometry.backing_size()?;
        Some(Self {
            geometry,
            bitmap: Bitmap::new(width, height),
        })
    }
    #[must_use]
    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }
    /// Size of the backing bitmap, in physical pixels.
    #[must_use]
    pub fn backing_size(&self) -> [u32; 2] {
        [self.bitmap.width(), self.bitmap.height()]
    }
    /// Discard all painted pixels by reallocating the backing bitmap at the same size.
    pub fn reset_surface(&mut self) {
        let [width, height] = self.backing_size();
        self.bitmap = Bitmap::new(width, height);
    }
    /// Paint one segment. Coordinates are in logical pixels.
    pub fn stroke_segment(&mut self, from: [f32; 2], to: [f32; 2], style: &StrokeStyle) {
        let dpr = self.geometry.device_pixel_ratio;
        self.bitmap.fill_segment(
            from.map(|v| v * dpr),
            to.map(|v| v * dpr),
            style.width * dpr,
            style.color,
        );
    }
    /// True if nothing has been painted since allocation or the last reset.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.bitmap.is_blank()
    }
    /// Read a physical pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.bitmap.pixel(x, y)
    }
    /// Flatten the current contents to PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, EncodeError> {
        self.bitmap.encode_png()
    }
}
impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("geometry", &self.geometry)
            .field("bitmap", &self.bitmap)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::{SizingPolicy, Surface, SurfaceGeometry, MAX_BACKING_DIMENSION};
    use crate::raster::StrokeStyle;

    #[test]
    fn backing_scales_by_dpr() {
        let geometry = SurfaceGeometry::new(300.0, 128.0, 2.0);
        assert_eq!(geometry.backing_size(), Some([600, 256]));

        let surface = Surface::new(geometry).unwrap();
        assert_eq!(surface.backing_size(), [600, 256]);
        // Layout size is untouched.
        assert_eq!(surface.geometry().css_size(), [300.0, 128.0]);
    }
    #[test]
    fn fractional_backing_truncates() {
        let geometry = SurfaceGeometry::new(301.5, 128.0, 1.5);
        assert_eq!(geometry.backing_size(), Some([452, 192]));
    }
    #[test]
    fn unlaid_out_is_deferred() {
        assert_eq!(SurfaceGeometry::new(0.0, 128.0, 2.0).backing_size(), None);
        assert_eq!(SurfaceGeometry::new(300.0, 128.0, 0.0).backing_size(), None);
        assert_eq!(SurfaceGeometry::new(f32::NAN, 128.0, 1.0).backing_size(), None);
        assert!(Surface::new(SurfaceGeometry::new(0.0, 0.0, 1.0)).is_none());

        let policy = SizingPolicy::default();
        assert_eq!(policy.resolve(SurfaceGeometry::new(0.0, 0.0, 2.0)), None);
    }
    #[test]
    fn oversized_is_rejected() {
        assert_eq!(SurfaceGeometry::new(1.0e9, 1.0e9, 3.0).backing_size(), None);
        assert_eq!(SurfaceGeometry::new(100.0, f32::MAX, 1.0).backing_size(), None);
        assert_eq!(
            SurfaceGeometry::new(8192.0, 10.0, 2.0).backing_size(),
            Some([MAX_BACKING_DIMENSION, 20])
        );
        assert_eq!(SurfaceGeometry::new(8193.0, 10.0, 2.0).backing_size(), None);
        assert!(Surface::new(SurfaceGeometry::new(1.0e9, 1.0e9, 3.0)).is_none());

        // Deferred like any other unusable measurement, or replaced by the fallback.
        assert_eq!(
            SizingPolicy::default().resolve(SurfaceGeometry::new(1.0e9, 1.0e9, 3.0)),
            None
        );
        let policy = SizingPolicy {
            fallback_css_size: Some([320.0, 128.0]),
        };
        let resolved = policy
            .resolve(SurfaceGeometry::new(1.0e9, 1.0e9, 3.0))
            .unwrap();
        assert_eq!(resolved.backing_size(), Some([960, 384]));
    }
    #[test]
    fn fallback_keeps_density() {
        let policy = SizingPolicy {
            fallback_css_size: Some([320.0, 128.0]),
        };
        let resolved = policy.resolve(SurfaceGeometry::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(resolved.backing_size(), Some([960, 384]));

        let resolved = policy
            .resolve(SurfaceGeometry::new(0.0, 0.0, f32::NAN))
            .unwrap();
        assert_eq!(resolved.device_pixel_ratio, 1.0);

        // A good measurement is passed through untouched.
        let measured = SurfaceGeometry::new(100.0, 50.0, 2.0);
        assert_eq!(policy.resolve(measured), Some(measured));
    }
    #[test]
    fn painting_is_in_logical_units() {
        let mut surface = Surface::new(SurfaceGeometry::new(40.0, 20.0, 2.0)).unwrap();
        surface.stroke_segment([5.0, 10.0], [35.0, 10.0], &StrokeStyle::default());

        // Logical (20, 10) lands on physical (40, 20).
        assert_eq!(surface.pixel(40, 19).unwrap()[3], 255);
        // Physical line width is 5px: two rows away from center is still ink, seven is not.
        assert!(surface.pixel(40, 17).unwrap()[3] > 0);
        assert_eq!(surface.pixel(40, 12).unwrap()[3], 0);

        surface.reset_surface();
        assert!(surface.is_blank());
        assert_eq!(surface.backing_size(), [80, 40]);
    }
}
