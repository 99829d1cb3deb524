//! Viewing session state and the per-interaction recomputation pass.
//!
//! A [`ViewerSession`] owns the loaded volume and the parameters a user can
//! change. Every setter keeps the indices valid for the current volume, and
//! [`ViewerSession::render`] turns the current state into display-ready views.

use crate::{
    enums::PlaneAxis,
    geometry::{DisplayGeometry, IndicatorLine, cross_plane_indicator},
    volume::Volume,
    volume_loader::Metadata,
    windowing::{
        BRIGHTNESS_RANGE, CONTRAST_RANGE, GAMMA_RANGE, MIN_WINDOW_WIDTH, WindowRanges,
        WindowSettings, tone_map,
    },
};

use ndarray::Array2;

/// The view every other plane is indicated on.
pub const PRIMARY_PLANE: PlaneAxis = PlaneAxis::Axial;

#[derive(Debug, Clone)]
pub struct LoadedVolume {
    pub volume: Volume,
    pub metadata: Metadata,
    pub window_ranges: WindowRanges,
}

/// One tone-mapped view ready for a renderer.
#[derive(Debug, Clone)]
pub struct RenderedView {
    pub plane: PlaneAxis,
    pub index: usize,
    pub pixels: Array2<u8>,
    pub geometry: DisplayGeometry,
    pub indicator: Option<IndicatorLine>,
    pub label: String,
}

impl RenderedView {
    /// Natural (width, height) of the tone-mapped slice.
    pub fn natural_size(&self) -> (usize, usize) {
        let (rows, columns) = self.pixels.dim();
        (columns, rows)
    }
}

#[derive(Debug, Clone)]
pub struct SessionFrame {
    pub primary: RenderedView,
    pub secondary: RenderedView,
}

#[derive(Debug, Clone, Default)]
pub struct ViewerSession {
    loaded: Option<LoadedVolume>,
    current_plane: PlaneAxis,
    axial_index: usize,
    plane_index: usize,
    window: WindowSettings,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the volume, resetting plane and window and re-clamping indices.
    pub fn load(&mut self, volume: Volume, metadata: Metadata) {
        let (min, max) = volume.value_range();
        self.window = WindowSettings::from_value_range(min, max);
        self.current_plane = PlaneAxis::Axial;
        self.axial_index = self.axial_index.min(volume.extent(PlaneAxis::Axial) - 1);
        self.plane_index = 0;
        self.loaded = Some(LoadedVolume {
            volume,
            metadata,
            window_ranges: WindowRanges::from_value_range(min, max),
        });
    }

    pub fn loaded(&self) -> Option<&LoadedVolume> {
        self.loaded.as_ref()
    }

    pub fn volume(&self) -> Option<&Volume> {
        self.loaded.as_ref().map(|loaded| &loaded.volume)
    }

    pub fn current_plane(&self) -> PlaneAxis {
        self.current_plane
    }

    pub fn axial_index(&self) -> usize {
        self.axial_index
    }

    pub fn plane_index(&self) -> usize {
        self.plane_index
    }

    pub fn window(&self) -> &WindowSettings {
        &self.window
    }

    /// Slices available along the axial axis, 0 without a volume.
    pub fn axial_extent(&self) -> usize {
        self.extent(PlaneAxis::Axial)
    }

    /// Slices available along the current plane, 0 without a volume.
    pub fn plane_extent(&self) -> usize {
        self.extent(self.current_plane)
    }

    fn extent(&self, plane: PlaneAxis) -> usize {
        self.volume().map_or(0, |volume| volume.extent(plane))
    }

    fn clamp(&self, plane: PlaneAxis, index: i64) -> usize {
        self.volume()
            .map_or(0, |volume| volume.clamp_index(plane, index))
    }

    pub fn set_plane(&mut self, plane: PlaneAxis) {
        self.current_plane = plane;
        self.plane_index = self.clamp(plane, self.plane_index as i64);
    }

    pub fn next_plane(&mut self) {
        self.set_plane(self.current_plane.next());
    }

    pub fn previous_plane(&mut self) {
        self.set_plane(self.current_plane.previous());
    }

    pub fn set_axial_index(&mut self, index: i64) {
        self.axial_index = self.clamp(PlaneAxis::Axial, index);
    }

    pub fn set_plane_index(&mut self, index: i64) {
        self.plane_index = self.clamp(self.current_plane, index);
    }

    pub fn step_plane_index(&mut self, delta: i64) {
        self.set_plane_index(self.plane_index as i64 + delta);
    }

    pub fn set_window(&mut self, window: WindowSettings) {
        self.window = window.clamped();
    }

    /// Non-finite centers are ignored.
    pub fn set_window_center(&mut self, center: f32) {
        if center.is_finite() {
            self.window.center = center;
        }
    }

    pub fn set_window_width(&mut self, width: f32) {
        self.window.width = width.max(MIN_WINDOW_WIDTH);
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.window.brightness = brightness.clamp(BRIGHTNESS_RANGE.0, BRIGHTNESS_RANGE.1);
    }

    pub fn set_contrast(&mut self, contrast: f32) {
        self.window.contrast = contrast.clamp(CONTRAST_RANGE.0, CONTRAST_RANGE.1);
    }

    pub fn set_gamma(&mut self, gamma: f32) {
        self.window.gamma = gamma.clamp(GAMMA_RANGE.0, GAMMA_RANGE.1);
    }

    /// Recompute both views for a canvas of `canvas` (width, height).
    ///
    /// Returns `None` until a volume has been loaded.
    pub fn render(&self, canvas: (u32, u32)) -> Option<SessionFrame> {
        let volume = self.volume()?;

        let mut primary = self.render_view(volume, PRIMARY_PLANE, self.axial_index, canvas);
        primary.indicator = cross_plane_indicator(
            PRIMARY_PLANE,
            self.current_plane,
            self.plane_index,
            &primary.geometry,
        );
        let secondary = self.render_view(volume, self.current_plane, self.plane_index, canvas);

        Some(SessionFrame { primary, secondary })
    }

    fn render_view(
        &self,
        volume: &Volume,
        plane: PlaneAxis,
        index: usize,
        canvas: (u32, u32),
    ) -> RenderedView {
        let slice = volume.extract_slice(plane, index as i64);
        let pixels = tone_map(slice, &self.window);
        RenderedView {
            plane,
            index,
            geometry: DisplayGeometry::fit(volume.slice_size(plane), canvas),
            pixels,
            indicator: None,
            label: format!("{plane}: {index}/{}", volume.extent(plane) - 1),
        }
    }

    /// Human-readable description of the session state.
    pub fn summary(&self) -> String {
        let Some(loaded) = &self.loaded else {
            return "No volume loaded".to_owned();
        };
        let (depth, rows, columns) = loaded.volume.dim();
        format!(
            "Volume shape (z, y, x): ({depth}, {rows}, {columns})\nPlane: {plane}\nAxial: {axial}/{axial_max}\n{plane} slice: {index}/{plane_max}\nModality: {modality}",
            plane = self.current_plane,
            axial = self.axial_index,
            axial_max = depth - 1,
            index = self.plane_index,
            plane_max = self.plane_extent() - 1,
            modality = loaded.metadata.modality,
        )
    }
}
