// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The synthetic mouse cursor.
//!
//! While cursor drawing is on, the system cursor is hidden and the effect
//! draws its own copy of the cursor image at the foreground depth, once per
//! eye, so that it lines up with the windows in stereo.

use kurbo::{Point, Rect, Vec2};
use stereo3d_core::transform::Transform3d;

use crate::error::GpuError;
use crate::gpu::GpuContext;
use crate::resource::TextureId;

/// A cursor image as captured from the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Hot spot, from the image's top-left corner.
    pub hot_x: u32,
    /// Hot spot, from the image's top-left corner.
    pub hot_y: u32,
    /// Row-major pixels, `0xAARRGGBB`.
    pub pixels: Vec<u32>,
}

impl CursorImage {
    /// A single opaque white pixel.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            hot_x: 0,
            hot_y: 0,
            pixels: vec![0xffff_ffff],
        }
    }

    fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && u64::try_from(self.pixels.len()).ok()
                == Some(u64::from(self.width) * u64::from(self.height))
    }

    /// Pixels as tightly packed BGRA bytes.
    #[must_use]
    pub fn to_bgra(&self) -> Vec<u8> {
        let le: Vec<u32> = self.pixels.iter().map(|p| p.to_le()).collect();
        bytemuck::cast_slice(&le).to_vec()
    }
}

/// Where cursor images and pointer positions come from.
pub trait CursorSource {
    /// The current cursor image, or `None` if it cannot be captured.
    fn image(&mut self) -> Option<CursorImage>;

    /// Shows or hides the host's own cursor.
    fn set_system_cursor_visible(&mut self, visible: bool) {
        _ = visible;
    }

    /// Starts or stops delivering pointer positions.
    fn set_polling(&mut self, enabled: bool) {
        _ = enabled;
    }

    /// The pointer position right now, in output pixels.
    fn pointer_position(&mut self) -> Option<Point> {
        None
    }
}

/// A [`CursorSource`] that hands out a fixed image.
///
/// Remembers what the effect asked of it, for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct StaticCursorSource {
    image: Option<CursorImage>,
    /// Reported by [`CursorSource::pointer_position`].
    pub pointer: Option<Point>,
    system_cursor_visible: bool,
    polling: bool,
}

impl StaticCursorSource {
    /// A source that always returns `image`.
    #[must_use]
    pub fn new(image: Option<CursorImage>) -> Self {
        Self {
            image,
            pointer: None,
            system_cursor_visible: true,
            polling: false,
        }
    }

    /// Whether the host's cursor is currently shown.
    #[must_use]
    pub fn system_cursor_visible(&self) -> bool {
        self.system_cursor_visible
    }

    /// Whether pointer polling is on.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.polling
    }
}

impl CursorSource for StaticCursorSource {
    fn image(&mut self) -> Option<CursorImage> {
        self.image.clone()
    }

    fn set_system_cursor_visible(&mut self, visible: bool) {
        self.system_cursor_visible = visible;
    }

    fn set_polling(&mut self, enabled: bool) {
        self.polling = enabled;
    }

    fn pointer_position(&mut self) -> Option<Point> {
        self.pointer
    }
}

/// What [`CursorTexture::update`] uploaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorCapture {
    /// The source's image.
    Captured,
    /// The source had nothing usable; the placeholder pixel was uploaded.
    Placeholder,
}

/// The cursor image on the GPU.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CursorTexture {
    texture: Option<TextureId>,
    size: (u32, u32),
    hot: Vec2,
}

impl CursorTexture {
    /// Nothing uploaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a texture is uploaded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.texture.is_some()
    }

    /// The uploaded texture.
    #[must_use]
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Image size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Hot spot in pixels.
    #[must_use]
    pub fn hot_spot(&self) -> Vec2 {
        self.hot
    }

    /// Replaces the texture with the source's current image.
    ///
    /// On failure the texture is left invalid.
    pub fn update(
        &mut self,
        gpu: &mut dyn GpuContext,
        source: &mut dyn CursorSource,
    ) -> Result<CursorCapture, GpuError> {
        let (image, capture) = match source.image() {
            Some(image) if image.is_well_formed() => (image, CursorCapture::Captured),
            _ => {
                log::warn!("cursor image unavailable, drawing a placeholder");
                (CursorImage::placeholder(), CursorCapture::Placeholder)
            }
        };
        self.release(gpu);
        let texture = gpu.create_texture(image.width, image.height, &image.to_bgra())?;
        self.texture = Some(texture);
        self.size = (image.width, image.height);
        self.hot = Vec2::new(f64::from(image.hot_x), f64::from(image.hot_y));
        Ok(capture)
    }

    /// Frees the texture, if any.
    pub fn release(&mut self, gpu: &mut dyn GpuContext) {
        if let Some(texture) = self.texture.take() {
            gpu.destroy_texture(texture);
        }
    }

    /// Where the quad goes with the pointer at `mouse`.
    #[must_use]
    pub fn quad(&self, mouse: Point) -> Rect {
        let (w, h) = self.size;
        Rect::from_origin_size(mouse - self.hot, (f64::from(w), f64::from(h)))
    }

    /// Draws the cursor with its hot spot at `mouse`. Returns whether
    /// anything was drawn.
    pub fn draw(&self, gpu: &mut dyn GpuContext, transform: &Transform3d, mouse: Point) -> bool {
        let Some(texture) = self.texture else {
            return false;
        };
        gpu.draw_textured_quad(texture, transform, self.quad(mouse));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessGpu;

    fn arrow() -> CursorImage {
        CursorImage {
            width: 2,
            height: 1,
            hot_x: 1,
            hot_y: 0,
            pixels: vec![0x80ff_0000, 0xff00_00ff],
        }
    }

    #[test]
    fn argb_uploads_as_bgra() {
        assert_eq!(
            arrow().to_bgra(),
            [0x00, 0x00, 0xff, 0x80, 0xff, 0x00, 0x00, 0xff]
        );
    }

    #[test]
    fn update_uploads_image() {
        let mut gpu = HeadlessGpu::new();
        let mut source = StaticCursorSource::new(Some(arrow()));
        let mut cursor = CursorTexture::new();

        assert_eq!(
            cursor.update(&mut gpu, &mut source).unwrap(),
            CursorCapture::Captured
        );
        let texture = gpu.texture(cursor.texture().unwrap()).unwrap();
        assert_eq!((texture.width, texture.height), (2, 1));
        assert_eq!(cursor.hot_spot(), Vec2::new(1.0, 0.0));
        assert_eq!(
            cursor.quad(Point::new(10.0, 20.0)),
            Rect::new(9.0, 20.0, 11.0, 21.0)
        );
    }

    #[test]
    fn missing_image_uses_placeholder() {
        let mut gpu = HeadlessGpu::new();
        let mut source = StaticCursorSource::new(None);
        let mut cursor = CursorTexture::new();

        assert_eq!(
            cursor.update(&mut gpu, &mut source).unwrap(),
            CursorCapture::Placeholder
        );
        let texture = gpu.texture(cursor.texture().unwrap()).unwrap();
        assert_eq!(texture.bgra, [0xff; 4]);
    }

    #[test]
    fn malformed_image_uses_placeholder() {
        let mut gpu = HeadlessGpu::new();
        let mut image = arrow();
        image.pixels.pop();
        let mut source = StaticCursorSource::new(Some(image));
        let mut cursor = CursorTexture::new();

        assert_eq!(
            cursor.update(&mut gpu, &mut source).unwrap(),
            CursorCapture::Placeholder
        );
        assert_eq!(cursor.size(), (1, 1));
    }

    #[test]
    fn update_replaces_previous_texture() {
        let mut gpu = HeadlessGpu::new();
        let mut source = StaticCursorSource::new(Some(arrow()));
        let mut cursor = CursorTexture::new();
        cursor.update(&mut gpu, &mut source).unwrap();
        cursor.update(&mut gpu, &mut source).unwrap();
        assert_eq!(gpu.live_textures(), 1);

        cursor.release(&mut gpu);
        assert_eq!(gpu.live_textures(), 0);
        assert!(!cursor.is_valid());
        assert!(!cursor.draw(&mut gpu, &Transform3d::IDENTITY, Point::ZERO));
    }

    #[test]
    fn failed_upload_leaves_texture_invalid() {
        let mut gpu = HeadlessGpu::new();
        gpu.fail_textures = true;
        let mut source = StaticCursorSource::new(Some(arrow()));
        let mut cursor = CursorTexture::new();
        assert!(cursor.update(&mut gpu, &mut source).is_err());
        assert!(!cursor.is_valid());
    }
}
