use std::fmt;
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use egui::{ColorImage, TextureHandle, TextureOptions};

pub const THUMB_MAX_DIM: usize = 96;

/// Preview image shown for a series in the explorer.
pub trait Thumbnail: Send + Sync {
    fn dispose(&self) -> Result<()>;
    fn repaint(&self);
}

/// Thumbnail backed by an egui texture. Repaint requests a new frame;
/// dispose frees the texture.
pub struct TextureThumbnail {
    ctx: egui::Context,
    texture: Mutex<Option<TextureHandle>>,
}

impl TextureThumbnail {
    /// Uploads `preview`, downsampled so its longest edge is at most `max_dim`.
    pub fn new(
        ctx: &egui::Context,
        name: impl Into<String>,
        preview: &ColorImage,
        max_dim: usize,
    ) -> Self {
        let thumb = downsample_color_image(preview, max_dim);
        let texture = ctx.load_texture(name, thumb, TextureOptions::LINEAR);
        Self {
            ctx: ctx.clone(),
            texture: Mutex::new(Some(texture)),
        }
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.texture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Thumbnail for TextureThumbnail {
    fn dispose(&self) -> Result<()> {
        let released = self
            .texture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(texture) = released {
            log::trace!("releasing thumbnail texture {:?}", texture.id());
        }
        Ok(())
    }

    fn repaint(&self) {
        self.ctx.request_repaint();
    }
}

impl fmt::Debug for TextureThumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureThumbnail")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

pub fn downsample_color_image(source: &ColorImage, max_dim: usize) -> ColorImage {
    let source_width = source.size[0];
    let source_height = source.size[1];
    if source_width == 0 || source_height == 0 || max_dim == 0 {
        return source.clone();
    }

    let longest_edge = source_width.max(source_height);
    if longest_edge <= max_dim {
        return source.clone();
    }

    let scale = max_dim as f32 / longest_edge as f32;
    let target_width = ((source_width as f32 * scale).round() as usize).max(1);
    let target_height = ((source_height as f32 * scale).round() as usize).max(1);

    let mut pixels = Vec::with_capacity(target_width * target_height);
    for target_y in 0..target_height {
        let source_y = ((target_y * source_height) / target_height).min(source_height - 1);
        for target_x in 0..target_width {
            let source_x = ((target_x * source_width) / target_width).min(source_width - 1);
            pixels.push(source.pixels[source_y * source_width + source_x]);
        }
    }

    ColorImage {
        size: [target_width, target_height],
        pixels,
    }
}
