//! Hotspot overlay.
//!
//! One marker sphere per region, placed at the region anchor, plus a floating
//! text label above it. Markers are the primary pick target; labels are
//! display only and never capture the pointer, so whatever the ray hits
//! beneath a label is what gets picked.

use glam::{Vec2, Vec3};

use crate::camera::OrbitCamera;
use crate::color::Color;
use crate::constants::{
    HOTSPOT_HOVER_COLOR, HOTSPOT_HOVER_EMISSIVE, HOTSPOT_IDLE_COLOR, HOTSPOT_IDLE_EMISSIVE,
    HOTSPOT_RADIUS, HOTSPOT_SELECTED_COLOR, HOTSPOT_SELECTED_EMISSIVE, LABEL_CHAR_WIDTH,
    LABEL_HEIGHT, LABEL_OFFSET_Y, LABEL_PADDING,
};
use crate::geometry::{Aabb, DisplayTransform, Ray, ScreenRect};
use crate::region::{RegionId, RegionRegistry};
use crate::resolver::PickHit;
use crate::selection::SelectionState;

// ============================================================================
// Visual State
// ============================================================================

/// Visual state of one marker. Later variants take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum HotspotVisual {
    #[default]
    Idle,
    Hovered,
    Selected,
}

impl HotspotVisual {
    /// Selected wins over hovered, hovered over idle.
    pub fn for_region(region: RegionId, state: &SelectionState) -> Self {
        if state.selected == Some(region) {
            HotspotVisual::Selected
        } else if state.hovered == Some(region) {
            HotspotVisual::Hovered
        } else {
            HotspotVisual::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotStyle {
    pub color: Color,
    pub emissive: Color,
}

/// Colors for each visual state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotStyles {
    pub idle: HotspotStyle,
    pub hovered: HotspotStyle,
    pub selected: HotspotStyle,
}

impl HotspotStyles {
    pub fn get(&self, visual: HotspotVisual) -> HotspotStyle {
        match visual {
            HotspotVisual::Idle => self.idle,
            HotspotVisual::Hovered => self.hovered,
            HotspotVisual::Selected => self.selected,
        }
    }
}

impl Default for HotspotStyles {
    fn default() -> Self {
        let style = |color, emissive| HotspotStyle {
            color: Color::from_hex(color),
            emissive: Color::from_hex(emissive),
        };
        Self {
            idle: style(HOTSPOT_IDLE_COLOR, HOTSPOT_IDLE_EMISSIVE),
            hovered: style(HOTSPOT_HOVER_COLOR, HOTSPOT_HOVER_EMISSIVE),
            selected: style(HOTSPOT_SELECTED_COLOR, HOTSPOT_SELECTED_EMISSIVE),
        }
    }
}

// ============================================================================
// Overlay
// ============================================================================

/// One marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub region: RegionId,
    pub label: String,
    /// Model-local position.
    pub anchor: Vec3,
    pub visual: HotspotVisual,
}

/// A ray hit on a marker, distance in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotIntersection {
    pub region: RegionId,
    pub distance: f32,
}

/// Screen placement of one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub region: RegionId,
    pub text: String,
    pub rect: ScreenRect,
    /// Projected marker center.
    pub anchor_px: Vec2,
}

#[derive(Debug, Clone)]
pub struct HotspotOverlay {
    hotspots: Vec<Hotspot>,
    radius: f32,
    styles: HotspotStyles,
}

impl HotspotOverlay {
    /// A marker for every region in the registry.
    pub fn new(registry: &RegionRegistry) -> Self {
        let ids: Vec<RegionId> = registry.all().iter().map(|r| r.id).collect();
        Self::with_regions(registry, &ids)
    }

    /// Markers for the given regions, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if a region is missing from the registry or has a non-finite anchor.
    pub fn with_regions(registry: &RegionRegistry, regions: &[RegionId]) -> Self {
        let hotspots = regions
            .iter()
            .map(|&id| {
                let region = registry.lookup(id).unwrap_or_else(|| {
                    panic!("hotspot for region '{id}' has no entry in the region registry")
                });
                assert!(
                    region.anchor.is_finite(),
                    "hotspot anchor for region '{id}' is not finite"
                );
                Hotspot {
                    region: id,
                    label: region.label.clone(),
                    anchor: region.anchor,
                    visual: HotspotVisual::Idle,
                }
            })
            .collect();
        Self {
            hotspots,
            radius: HOTSPOT_RADIUS,
            styles: HotspotStyles::default(),
        }
    }

    pub fn with_styles(mut self, styles: HotspotStyles) -> Self {
        self.styles = styles;
        self
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn hotspot(&self, region: RegionId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.region == region)
    }

    /// Marker radius in model-local units.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn visual(&self, region: RegionId) -> Option<HotspotVisual> {
        self.hotspot(region).map(|h| h.visual)
    }

    pub fn style(&self, region: RegionId) -> Option<HotspotStyle> {
        self.visual(region).map(|v| self.styles.get(v))
    }

    /// Recompute every marker's visual state. Returns true if any changed.
    pub fn sync(&mut self, state: &SelectionState) -> bool {
        let mut changed = false;
        for hotspot in &mut self.hotspots {
            let visual = HotspotVisual::for_region(hotspot.region, state);
            if hotspot.visual != visual {
                hotspot.visual = visual;
                changed = true;
            }
        }
        changed
    }

    /// Regions whose anchor lies outside `bounds` (model-local).
    pub fn anchors_outside(&self, bounds: &Aabb) -> Vec<RegionId> {
        self.hotspots
            .iter()
            .filter(|h| !bounds.contains(h.anchor))
            .map(|h| h.region)
            .collect()
    }

    /// World-space marker spheres hit by a world ray, near first.
    pub fn intersect(&self, ray: &Ray, display: &DisplayTransform) -> Vec<HotspotIntersection> {
        let radius = self.radius * display.scale;
        let mut hits: Vec<HotspotIntersection> = self
            .hotspots
            .iter()
            .filter_map(|h| {
                ray.intersect_sphere(display.to_world(h.anchor), radius)
                    .map(|distance| HotspotIntersection {
                        region: h.region,
                        distance,
                    })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// The pick a click on a marker produces.
    ///
    /// # Panics
    ///
    /// Panics if the overlay has no marker for `region`.
    pub fn click(&self, region: RegionId) -> PickHit {
        assert!(
            self.hotspot(region).is_some(),
            "click on unknown hotspot '{region}'"
        );
        PickHit::Hotspot { region }
    }

    /// Lay out labels above their projected markers. Markers behind the
    /// camera get no label.
    pub fn labels(
        &self,
        camera: &OrbitCamera,
        viewport: Vec2,
        display: &DisplayTransform,
    ) -> Vec<LabelLayout> {
        self.hotspots
            .iter()
            .filter_map(|h| {
                let anchor_px = camera.project(display.to_world(h.anchor), viewport)?;
                let width = h.label.chars().count() as f32 * LABEL_CHAR_WIDTH + 2.0 * LABEL_PADDING;
                let center = anchor_px - Vec2::new(0.0, LABEL_OFFSET_Y);
                Some(LabelLayout {
                    region: h.region,
                    text: h.label.clone(),
                    rect: ScreenRect::centered(center, width, LABEL_HEIGHT),
                    anchor_px,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn overlay() -> HotspotOverlay {
        HotspotOverlay::new(&RegionRegistry::builtin())
    }

    fn display() -> DisplayTransform {
        DisplayTransform::new(0.3, Vec3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn test_one_marker_per_region() {
        let overlay = overlay();
        assert_eq!(overlay.hotspots().len(), RegionId::ALL.len());
        let head = overlay.hotspot(RegionId::Head).unwrap();
        assert_eq!(head.label, "Head");
        assert_eq!(head.anchor.y, 5.0);
    }

    #[test]
    #[should_panic(expected = "no entry in the region registry")]
    fn test_unknown_region_fails_at_construction() {
        let partial = RegionRegistry::from_regions(
            RegionRegistry::builtin()
                .all()
                .iter()
                .filter(|r| r.id != RegionId::Hands)
                .cloned()
                .collect(),
        )
        .unwrap();
        HotspotOverlay::with_regions(&partial, &[RegionId::Head, RegionId::Hands]);
    }

    #[test]
    fn test_visual_precedence() {
        let both = SelectionState::new(Some(RegionId::Head), Some(RegionId::Head));
        assert_eq!(
            HotspotVisual::for_region(RegionId::Head, &both),
            HotspotVisual::Selected
        );
        let hover = SelectionState::new(Some(RegionId::Neck), Some(RegionId::Head));
        assert_eq!(
            HotspotVisual::for_region(RegionId::Head, &hover),
            HotspotVisual::Hovered
        );
        assert_eq!(
            HotspotVisual::for_region(RegionId::Feet, &hover),
            HotspotVisual::Idle
        );
    }

    #[test]
    fn test_sync_reports_changes() {
        let mut overlay = overlay();
        let state = SelectionState::new(Some(RegionId::Chest), None);
        assert!(overlay.sync(&state));
        assert!(!overlay.sync(&state));
        assert_eq!(overlay.visual(RegionId::Chest), Some(HotspotVisual::Selected));
        assert_eq!(
            overlay.style(RegionId::Chest),
            Some(HotspotStyles::default().selected)
        );
        assert!(overlay.sync(&SelectionState::default()));
        assert_eq!(overlay.visual(RegionId::Chest), Some(HotspotVisual::Idle));
    }

    #[test]
    fn test_styles_are_distinct() {
        let styles = HotspotStyles::default();
        assert_ne!(styles.idle, styles.hovered);
        assert_ne!(styles.hovered, styles.selected);
        assert_ne!(styles.idle, styles.selected);
    }

    #[test]
    fn test_intersect_head_marker() {
        let overlay = overlay();
        let display = display();
        let head_world = display.to_world(Vec3::new(0.0, 5.0, 0.3));
        let ray = Ray::new(Vec3::new(head_world.x, head_world.y, 15.0), Vec3::NEG_Z);
        let hits = overlay.intersect(&ray, &display);
        assert_eq!(hits[0].region, RegionId::Head);
        let expected = 15.0 - head_world.z - HOTSPOT_RADIUS * display.scale;
        assert!((hits[0].distance - expected).abs() < 1e-4);
    }

    #[test]
    fn test_click_synthesises_hotspot_pick() {
        assert_eq!(
            overlay().click(RegionId::Back),
            PickHit::Hotspot {
                region: RegionId::Back
            }
        );
    }

    #[test]
    fn test_labels_sit_above_markers() {
        let overlay = overlay();
        let camera = OrbitCamera::new(&CameraConfig::default());
        let viewport = Vec2::new(800.0, 600.0);
        let labels = overlay.labels(&camera, viewport, &display());
        assert_eq!(labels.len(), RegionId::ALL.len());
        for label in &labels {
            assert!(label.rect.y + label.rect.height <= label.anchor_px.y);
            assert!(!label.rect.contains(label.anchor_px));
        }
        let head = labels.iter().find(|l| l.region == RegionId::Head).unwrap();
        assert_eq!(head.text, "Head");
        assert!(!head.rect.contains(Vec2::new(-100.0, -100.0)));
    }

    #[test]
    fn test_anchors_outside_bounds() {
        let overlay = overlay();
        let body = Aabb::new(Vec3::new(-3.0, -3.0, -1.0), Vec3::new(3.0, 6.0, 1.0));
        assert!(overlay.anchors_outside(&body).is_empty());
        let short = Aabb::new(Vec3::new(-3.0, -3.0, -1.0), Vec3::new(3.0, 4.0, 1.0));
        assert_eq!(overlay.anchors_outside(&short), vec![RegionId::Head]);
    }
}
