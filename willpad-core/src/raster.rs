//! # Raster
//!
//! A tiny software rasterizer for signature ink. Everything here speaks in *physical* pixels - the
//! logical-to-physical scale is applied by the [surface](crate::surface) before anything reaches a [`Bitmap`].
//!
//! Segments are painted as capsules (a line with round caps), which gives round joins for free when
//! consecutive segments share an endpoint.

/// How ink is laid down onto the surface.
#[derive(Clone, Copy, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    /// Straight (not premultiplied) RGBA8 color.
    pub color: [u8; 4],
    /// Line width, in logical pixels.
    pub width: f32,
}
impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: [0, 0, 0, 255],
            width: 2.5,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    Png(#[from] png::EncodingError),
}

/// Straight-alpha RGBA8 image, row-major, top-left origin.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    /// Invariant: `pixels.len() == width * height`
    pixels: Vec<[u8; 4]>,
}
impl Bitmap {
    /// Allocate a fully transparent bitmap. Callers bound the size, see
    /// [`MAX_BACKING_DIMENSION`](crate::surface::MAX_BACKING_DIMENSION).
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            pixels: vec![[0; 4]; len],
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    /// Fetch a pixel. `None` if out-of-bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
    /// True if no pixel carries any coverage.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|px| px[3] == 0)
    }
    /// The packed RGBA8 bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
    /// Paint a capsule from `from` to `to` with the given physical `width`.
    ///
    /// Edges get a one pixel coverage ramp. Parts falling outside the bitmap are clipped.
    pub fn fill_segment(&mut self, from: [f32; 2], to: [f32; 2], width: f32, color: [u8; 4]) {
        if self.pixels.is_empty() || !(width > 0.0) {
            return;
        }
        let radius = width / 2.0;
        // Extra pixel of margin for the AA ramp.
        let reach = radius + 1.0;

        let clip = |value: f32, max: u32| -> u32 {
            // Saturating float->int cast, NaN becomes 0.
            (value.floor().max(0.0) as u32).min(max)
        };
        let x_start = clip(from[0].min(to[0]) - reach, self.width);
        let x_end = clip(from[0].max(to[0]) + reach + 1.0, self.width);
        let y_start = clip(from[1].min(to[1]) - reach, self.height);
        let y_end = clip(from[1].max(to[1]) + reach + 1.0, self.height);

        for y in y_start..y_end {
            for x in x_start..x_end {
                let center = [x as f32 + 0.5, y as f32 + 0.5];
                let dist = distance_to_segment(center, from, to);
                let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
    /// Source-over blend a straight-alpha color, scaled by `coverage`.
    fn blend(&mut self, x: u32, y: u32, color: [u8; 4], coverage: f32) {
        let idx = y as usize * self.width as usize + x as usize;
        let Some(dst) = self.pixels.get_mut(idx) else {
            return;
        };
        let src_a = f32::from(color[3]) / 255.0 * coverage;
        let dst_a = f32::from(dst[3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let mix = |src: u8, dst: u8| -> u8 {
            let value =
                (f32::from(src) * src_a + f32::from(dst) * dst_a * (1.0 - src_a)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        *dst = [
            mix(color[0], dst[0]),
            mix(color[1], dst[1]),
            mix(color[2], dst[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ];
    }
    /// Encode as an 8-bit RGBA PNG. Deterministic for identical pixel data.
    pub fn encode_png(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(self.bytes())?;
            writer.finish()?;
        }
        Ok(out)
    }
}
impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Pixel dump would be useless noise.
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("blank", &self.is_blank())
            .finish()
    }
}

fn distance_to_segment(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
    // Degenerate segment is a dot.
    let t = if len_sq > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = [a[0] + ab[0] * t, a[1] + ab[1] * t];
    let delta = [p[0] - closest[0], p[1] - closest[1]];
    (delta[0] * delta[0] + delta[1] * delta[1]).sqrt()
}
