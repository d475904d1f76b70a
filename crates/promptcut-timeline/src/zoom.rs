//! Display zoom derived from content duration and clip density.
//!
//! Zoom is expressed as pixels per second of content. The controller only
//! recomputes while auto-zoom is enabled; any manual adjustment disables it
//! until the user asks to fit again.

use crate::composition::Composition;

/// Tunable zoom constants.
#[derive(Debug, Clone)]
pub struct ZoomConfig {
    /// Legibility floor for the derived pixels-per-second.
    pub min_pixels_per_sec: f32,
    /// Ceiling to avoid over-zooming short timelines.
    pub max_pixels_per_sec: f32,
    /// Density boost added per clip (busier timelines zoom in slightly).
    pub density_boost_per_clip: f32,
    /// Cap on the total density boost.
    pub max_density_boost: f32,
    /// Overall zoom bounds after the boost.
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_pixels_per_sec: 2.0,
            max_pixels_per_sec: 120.0,
            density_boost_per_clip: 0.015,
            max_density_boost: 0.5,
            min_zoom: 1.0,
            max_zoom: 200.0,
        }
    }
}

/// Derives the timeline's display zoom from its content.
#[derive(Debug, Clone)]
pub struct ViewportZoomController {
    pub config: ZoomConfig,
    auto_enabled: bool,
    zoom: f32,
}

impl Default for ViewportZoomController {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

impl ViewportZoomController {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config,
            auto_enabled: true,
            // Starting value before the first refresh.
            zoom: 10.0,
        }
    }

    /// Current zoom (pixels per second).
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Whether auto-zoom is currently driving the value.
    pub fn auto_enabled(&self) -> bool {
        self.auto_enabled
    }

    /// Derive a zoom value from content, independent of controller state.
    ///
    /// Base zoom fits the duration into the container, clamped into the
    /// pixels-per-second range; a mild density boost is applied for higher
    /// clip counts; the result is clamped to the overall zoom bounds.
    pub fn compute_zoom(
        &self,
        clip_count: usize,
        content_duration: f64,
        container_width_px: f32,
        current_zoom: f32,
    ) -> f32 {
        if content_duration <= 0.0 {
            return current_zoom;
        }
        let base = (container_width_px / content_duration as f32)
            .clamp(self.config.min_pixels_per_sec, self.config.max_pixels_per_sec);
        let boost = 1.0
            + (clip_count as f32 * self.config.density_boost_per_clip)
                .min(self.config.max_density_boost);
        (base * boost).clamp(self.config.min_zoom, self.config.max_zoom)
    }

    /// Recompute from the composition if auto-zoom is enabled. Returns the
    /// (possibly unchanged) zoom.
    pub fn refresh(&mut self, comp: &Composition, container_width_px: f32) -> f32 {
        if self.auto_enabled {
            self.zoom = self.compute_zoom(
                comp.clip_count(),
                comp.duration(),
                container_width_px,
                self.zoom,
            );
        }
        self.zoom
    }

    /// Apply a manual zoom. Disables auto-zoom until `fit` is called.
    pub fn set_manual_zoom(&mut self, zoom: f32) {
        self.auto_enabled = false;
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
    }

    /// Re-enable auto-zoom and recompute immediately ("fit" action).
    pub fn fit(&mut self, comp: &Composition, container_width_px: f32) -> f32 {
        self.auto_enabled = true;
        self.refresh(comp, container_width_px)
    }
}
