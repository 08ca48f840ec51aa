//! Off-screen rendering of composed markup.
//!
//! A [`SurfaceProvider`] hands out a fresh [`RenderSurface`] per render; the
//! surface is never shared between exports. [`render_markup`] drives it:
//! attach, wait for images, settle the layout, capture. The surface is
//! wrapped in an [`AttachedSurface`] guard, so it is detached on every exit
//! path.
//!
//! [`SoftwareSurface`] is the built-in surface. Hosts with a real layout
//! engine plug theirs in through the same traits.

mod software;
mod wait;

pub use software::{
    BODY_FONT_PX, CHAR_WIDTH_EM, HEADING_FONT_PX, LINE_HEIGHT, PAGE_PADDING_PX, SoftwareSurface,
    SoftwareSurfaceProvider,
};
pub use wait::{ImageLoad, LoadOutcome, WaitSummary, wait_for_images};

use std::ops::{Deref, DerefMut};

use image::RgbaImage;

use crate::config::ExportConfig;
use crate::error::{Error, Result};

/// An isolated drawing surface that markup can be laid out on.
pub trait RenderSurface {
    /// Put composed markup on the surface.
    fn attach(&mut self, markup: &str) -> Result<()>;

    /// One future per embedded image, resolving when it has loaded or failed.
    fn image_loads(&self) -> Vec<ImageLoad>;

    /// Force a synchronous layout and read the content size in CSS pixels.
    fn reflow(&mut self) -> Result<(u32, u32)>;

    /// Paint the whole content into one bitmap at `scale` device pixels per
    /// CSS pixel.
    fn capture(&mut self, scale: f32) -> Result<RgbaImage>;

    /// Remove the markup and release anything attached.
    fn detach(&mut self);
}

/// Creates surfaces.
pub trait SurfaceProvider {
    type Surface: RenderSurface;

    fn create(&self, width_px: u32) -> Result<Self::Surface>;

    /// Brand colour for headings that set none themselves. Providers whose
    /// surfaces honour the composed print CSS can ignore it.
    fn set_heading_color(&mut self, color: &str) {
        let _ = color;
    }
}

/// A surface with markup attached; detaches when dropped.
pub struct AttachedSurface<S: RenderSurface> {
    surface: S,
}

impl<S: RenderSurface> AttachedSurface<S> {
    /// Attach `markup`. If that fails the surface is detached before the
    /// error is returned.
    pub fn attach(surface: S, markup: &str) -> Result<Self> {
        let mut guard = AttachedSurface { surface };
        guard.surface.attach(markup)?;
        Ok(guard)
    }
}

impl<S: RenderSurface> Deref for AttachedSurface<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.surface
    }
}

impl<S: RenderSurface> DerefMut for AttachedSurface<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: RenderSurface> Drop for AttachedSurface<S> {
    fn drop(&mut self) {
        self.surface.detach();
        log::debug!("render surface detached");
    }
}

/// Render markup to a single bitmap as tall as the laid-out content.
///
/// A zero-sized layout or capture is a render failure.
pub async fn render_markup<P: SurfaceProvider>(
    provider: &P,
    markup: &str,
    config: &ExportConfig,
) -> Result<RgbaImage> {
    let surface = provider.create(config.virtual_page_width_px)?;
    let mut surface = AttachedSurface::attach(surface, markup)?;

    let summary = wait_for_images(surface.image_loads(), config.image_timeout()).await;
    if summary.total() > 0 {
        log::info!(
            "{} of {} image(s) ready for capture",
            summary.loaded,
            summary.total()
        );
    }

    let (width, height) = settle(&mut *surface, config).await?;
    if width == 0 || height == 0 {
        return Err(Error::Render(format!(
            "content failed to render: layout is {width}x{height} px"
        )));
    }

    let bitmap = surface.capture(config.capture_scale)?;
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err(Error::Render(format!(
            "content failed to render: captured bitmap is {}x{}",
            bitmap.width(),
            bitmap.height()
        )));
    }
    log::debug!("captured {}x{} bitmap", bitmap.width(), bitmap.height());
    Ok(bitmap)
}

/// Read the layout until it is non-zero and unchanged between two reads,
/// sleeping the settle delay in between. Gives up after the configured
/// number of reads and returns the last size.
async fn settle<S: RenderSurface>(surface: &mut S, config: &ExportConfig) -> Result<(u32, u32)> {
    let attempts = config.max_reflow_attempts.max(1);
    let mut last = None;

    for attempt in 1..=attempts {
        let size = surface.reflow()?;
        if size.0 > 0 && size.1 > 0 && last == Some(size) {
            log::debug!("layout settled at {}x{} after {attempt} read(s)", size.0, size.1);
            return Ok(size);
        }
        last = Some(size);
        if attempt < attempts {
            tokio::time::sleep(config.settle_delay()).await;
        }
    }

    let size = last.unwrap_or((0, 0));
    log::debug!(
        "layout still changing after {attempts} read(s); using {}x{}",
        size.0,
        size.1
    );
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Grows for a few reads, then holds still.
    struct GrowingSurface {
        reads: Arc<AtomicU32>,
        detached: Arc<AtomicBool>,
        final_height: u32,
    }

    impl RenderSurface for GrowingSurface {
        fn attach(&mut self, _markup: &str) -> Result<()> {
            Ok(())
        }

        fn image_loads(&self) -> Vec<ImageLoad> {
            Vec::new()
        }

        fn reflow(&mut self) -> Result<(u32, u32)> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((100, (n * 10).min(self.final_height)))
        }

        fn capture(&mut self, _scale: f32) -> Result<RgbaImage> {
            Ok(RgbaImage::new(100, self.final_height))
        }

        fn detach(&mut self) {
            self.detached.store(true, Ordering::SeqCst);
        }
    }

    struct Provider {
        reads: Arc<AtomicU32>,
        detached: Arc<AtomicBool>,
        final_height: u32,
    }

    impl SurfaceProvider for Provider {
        type Surface = GrowingSurface;

        fn create(&self, _width_px: u32) -> Result<GrowingSurface> {
            Ok(GrowingSurface {
                reads: self.reads.clone(),
                detached: self.detached.clone(),
                final_height: self.final_height,
            })
        }
    }

    fn fast_config() -> ExportConfig {
        ExportConfig {
            settle_delay_ms: 1,
            max_reflow_attempts: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_settles_once_height_is_stable() {
        let provider = Provider {
            reads: Arc::new(AtomicU32::new(0)),
            detached: Arc::new(AtomicBool::new(false)),
            final_height: 30,
        };
        let bitmap = render_markup(&provider, "<p>x</p>", &fast_config())
            .await
            .unwrap();
        assert_eq!(bitmap.height(), 30);
        // 10, 20, 30, 30
        assert_eq!(provider.reads.load(Ordering::SeqCst), 4);
        assert!(provider.detached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_zero_height_is_render_failure_and_still_detaches() {
        let provider = Provider {
            reads: Arc::new(AtomicU32::new(0)),
            detached: Arc::new(AtomicBool::new(false)),
            final_height: 0,
        };
        let err = render_markup(&provider, "", &fast_config()).await.unwrap_err();
        assert_eq!(err.cause(), crate::error::FailureCause::Render);
        assert!(provider.detached.load(Ordering::SeqCst));
    }
}
