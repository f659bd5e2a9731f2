//! Global constants for the body explorer

// ============================================================================
// Highlight Colors (sRGB hex)
// ============================================================================

/// Base color of a selected mesh
pub const SELECTED_COLOR: u32 = 0x00aaff;

/// Emissive glow of a selected mesh
pub const SELECTED_EMISSIVE: u32 = 0x0066ff;

/// Emissive glow of a hovered mesh (color is left untouched)
pub const HOVER_EMISSIVE: u32 = 0x333333;

/// Fallback base color for primitives without a material
pub const DEFAULT_MESH_COLOR: u32 = 0xe8c4a8;

// ============================================================================
// Hotspot Markers
// ============================================================================

/// Hotspot sphere radius in model-local units
pub const HOTSPOT_RADIUS: f32 = 0.25;

/// Idle hotspot color and glow
pub const HOTSPOT_IDLE_COLOR: u32 = 0xffffff;
pub const HOTSPOT_IDLE_EMISSIVE: u32 = 0x222222;

/// Hovered hotspot color and glow
pub const HOTSPOT_HOVER_COLOR: u32 = 0xffcc00;
pub const HOTSPOT_HOVER_EMISSIVE: u32 = 0x664400;

/// Selected hotspot color and glow
pub const HOTSPOT_SELECTED_COLOR: u32 = 0x00aaff;
pub const HOTSPOT_SELECTED_EMISSIVE: u32 = 0x0066ff;

/// Sphere tessellation for hotspot markers
pub const HOTSPOT_SEGMENTS: u32 = 16;
pub const HOTSPOT_RINGS: u32 = 12;

// ============================================================================
// Labels
// ============================================================================

/// Approximate glyph advance used to size label boxes (pixels)
pub const LABEL_CHAR_WIDTH: f32 = 8.0;

/// Label box height (pixels)
pub const LABEL_HEIGHT: f32 = 20.0;

/// Horizontal padding inside a label box (pixels, each side)
pub const LABEL_PADDING: f32 = 6.0;

/// Vertical distance between the anchor and the label center (pixels)
pub const LABEL_OFFSET_Y: f32 = 24.0;

// ============================================================================
// Model & Camera Defaults
// ============================================================================

/// URL path of the body model
pub const DEFAULT_MODEL_URL: &str = "/human_body.glb";

/// Directory the model URL is resolved against natively
pub const DEFAULT_ASSET_ROOT: &str = "public";

/// Uniform display scale applied to the model
pub const DEFAULT_DISPLAY_SCALE: f32 = 0.3;

/// Display translation applied after scaling
pub const DEFAULT_DISPLAY_OFFSET: [f32; 3] = [0.0, -1.0, 0.0];

/// Seconds after which the loading overlay clears regardless of load state
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 10;

/// Initial camera position
pub const DEFAULT_CAMERA_POSITION: [f32; 3] = [0.0, 0.0, 15.0];

/// Vertical field of view (degrees)
pub const DEFAULT_FOV_DEGREES: f32 = 50.0;

/// Orbit distance limits
pub const DEFAULT_MIN_DISTANCE: f32 = 3.0;
pub const DEFAULT_MAX_DISTANCE: f32 = 20.0;

/// Perspective clip planes
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Radians of orbit per dragged pixel
pub const ORBIT_SENSITIVITY: f32 = 0.005;

/// Distance factor applied per wheel line
pub const ZOOM_STEP: f32 = 0.9;

// ============================================================================
// Input
// ============================================================================

/// Pointer travel (pixels) beyond which a press becomes a camera drag
pub const DEFAULT_CLICK_TOLERANCE_PX: f32 = 4.0;

/// Initial window size
pub const DEFAULT_WINDOW_WIDTH: u32 = 1280;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 800;
