//! Configuration structs for GPU settings.
//!
//! Provides configurable options for GPU context and rendering
//! with sensible defaults for an interactive 3D model viewer.

/// Configuration for GPU context initialization.
#[derive(Debug, Clone)]
pub struct GpuConfig {
    /// Power preference for adapter selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (VSync behavior).
    pub present_mode: wgpu::PresentMode,
    /// Maximum frames in flight.
    pub max_frame_latency: u32,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::default(),
            present_mode: wgpu::PresentMode::Fifo, // VSync on
            max_frame_latency: 2,
        }
    }
}

impl GpuConfig {
    /// Create config optimized for low latency.
    pub fn low_latency() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::Mailbox,
            max_frame_latency: 1,
        }
    }

    /// Set power preference.
    pub fn with_power_preference(mut self, pref: wgpu::PowerPreference) -> Self {
        self.power_preference = pref;
        self
    }

    /// Set present mode.
    pub fn with_present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.present_mode = mode;
        self
    }
}

/// Configuration for render passes.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Clear color for the background.
    pub clear_color: ClearColor,
    /// Direction the key light travels, in world space.
    pub light_direction: [f32; 3],
    /// Ambient light term added to every surface.
    pub ambient: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: ClearColor::BLACK,
            light_direction: [-10.0, -10.0, -10.0],
            ambient: 0.45,
        }
    }
}

impl RenderConfig {
    /// Create config with a specific clear color.
    pub fn with_clear_color(mut self, color: ClearColor) -> Self {
        self.clear_color = color;
        self
    }
}

/// Clear color for render passes.
#[derive(Debug, Clone, Copy)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    /// Dark gray.
    pub const DARK_GRAY: ClearColor = ClearColor {
        r: 0.1,
        g: 0.1,
        b: 0.1,
        a: 1.0,
    };
    /// Black (default viewer background).
    pub const BLACK: ClearColor = ClearColor {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Create from RGB (alpha = 1.0).
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        wgpu::Color {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}
