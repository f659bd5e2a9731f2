//! Pointer picking.
//!
//! [`cast`] turns a pointer position into a [`Picked`] value: a ray from the
//! camera is tested against hotspot markers and model meshes, all hits are
//! sorted by distance and the nearest one wins. [`PickingPipeline`] runs the
//! per-surface press/commit state machine on top of that and coalesces hover
//! changes so at most one is emitted per frame.

use glam::Vec2;

use crate::camera::OrbitCamera;
use crate::geometry::{DisplayTransform, Ray};
use crate::hotspot::HotspotOverlay;
use crate::model::{MeshId, ModelScene};
use crate::region::RegionId;
use crate::resolver::{PickHit, Resolver};

// ============================================================================
// Ray Casting
// ============================================================================

/// Identity of the interactive surface under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Hotspot(RegionId),
    Mesh(MeshId),
    Background,
}

/// Nearest surface under the pointer and the pick it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Picked {
    pub target: PickTarget,
    pub hit: PickHit,
}

impl Picked {
    pub fn background() -> Self {
        Self {
            target: PickTarget::Background,
            hit: PickHit::Background,
        }
    }

    pub fn hotspot(region: RegionId) -> Self {
        Self {
            target: PickTarget::Hotspot(region),
            hit: PickHit::Hotspot { region },
        }
    }
}

/// Everything a cast reads. Borrowed for the duration of one cast.
#[derive(Debug, Clone, Copy)]
pub struct PickContext<'a> {
    pub camera: &'a OrbitCamera,
    pub viewport: Vec2,
    pub display: &'a DisplayTransform,
    pub overlay: &'a HotspotOverlay,
    /// `None` until the model has loaded; every cast is then background.
    pub model: Option<&'a ModelScene>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Surface {
    Hotspot(RegionId),
    Mesh(MeshId),
}

/// One ray hit, distance in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Intersection {
    surface: Surface,
    distance: f32,
}

/// Pick the nearest surface under `pointer`.
pub fn cast(ctx: &PickContext<'_>, pointer: Vec2) -> Picked {
    let Some(model) = ctx.model else {
        return Picked::background();
    };

    let ray = ctx.camera.ray_through(pointer, ctx.viewport);
    let intersections = intersect_all(&ray, ctx.display, ctx.overlay, model);

    // Labels are not pick surfaces; only ray hits count
    match intersections.first() {
        Some(Intersection {
            surface: Surface::Mesh(mesh),
            distance,
        }) => {
            let name = model
                .mesh(*mesh)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| mesh.to_string().into());
            Picked {
                target: PickTarget::Mesh(*mesh),
                hit: PickHit::Mesh {
                    mesh: *mesh,
                    name,
                    local_hit: ctx.display.untranslate(ray.at(*distance)),
                },
            }
        }
        Some(Intersection {
            surface: Surface::Hotspot(region),
            ..
        }) => Picked::hotspot(*region),
        None => Picked::background(),
    }
}

fn intersect_all(
    ray: &Ray,
    display: &DisplayTransform,
    overlay: &HotspotOverlay,
    model: &ModelScene,
) -> Vec<Intersection> {
    let local_ray = display.ray_to_local(ray);
    let mut hits: Vec<Intersection> = overlay
        .intersect(ray, display)
        .into_iter()
        .map(|h| Intersection {
            surface: Surface::Hotspot(h.region),
            distance: h.distance,
        })
        .chain(model.intersect(&local_ray).into_iter().map(|h| Intersection {
            surface: Surface::Mesh(h.mesh),
            distance: h.distance * display.scale,
        }))
        .collect();
    // Stable sort: at equal depth the marker drawn over the mesh wins
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

// ============================================================================
// Surface State Machine
// ============================================================================

/// Interaction state of the surface under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceState {
    Idle,
    Hovered(PickTarget),
    Pressed { target: PickTarget, origin: Vec2 },
    Committed(PickTarget),
}

/// A completed click.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub hit: PickHit,
    pub region: Option<RegionId>,
}

/// Pointer state machine with per-frame hover coalescing.
#[derive(Debug, Clone)]
pub struct PickingPipeline {
    resolver: Resolver,
    click_tolerance: f32,
    state: SurfaceState,
    /// Hover value emitted by the last flush.
    hovered: Option<RegionId>,
    /// Change waiting for the next flush; the last write in a frame wins.
    pending_hover: Option<Option<RegionId>>,
}

impl PickingPipeline {
    pub fn new(resolver: Resolver, click_tolerance: f32) -> Self {
        Self {
            resolver,
            click_tolerance,
            state: SurfaceState::Idle,
            hovered: None,
            pending_hover: None,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn hovered(&self) -> Option<RegionId> {
        self.hovered
    }

    pub fn has_pending_hover(&self) -> bool {
        self.pending_hover.is_some()
    }

    pub fn pointer_move(&mut self, picked: &Picked, position: Vec2) {
        self.state = match self.state {
            SurfaceState::Pressed { target, origin } => {
                if position.distance(origin) > self.click_tolerance {
                    log::debug!("Press on {:?} cancelled by drag", target);
                    SurfaceState::Idle
                } else {
                    SurfaceState::Pressed { target, origin }
                }
            }
            _ => hover_state(picked.target),
        };
        let region = self.resolver.resolve(&picked.hit);
        self.request_hover(region);
    }

    /// Pointer left the rendering surface.
    pub fn pointer_leave(&mut self) {
        self.state = SurfaceState::Idle;
        self.request_hover(None);
    }

    pub fn pointer_down(&mut self, picked: &Picked, position: Vec2) {
        self.state = SurfaceState::Pressed {
            target: picked.target,
            origin: position,
        };
    }

    /// Release; commits only if the press is alive and the nearest surface is
    /// still the pressed one.
    pub fn pointer_up(&mut self, picked: &Picked) -> Option<Commit> {
        match self.state {
            SurfaceState::Pressed { target, .. } if target == picked.target => {
                self.state = SurfaceState::Committed(target);
                let region = self.resolver.resolve(&picked.hit);
                log::debug!("Pick committed: {:?} -> {:?}", picked.hit, region);
                Some(Commit {
                    hit: picked.hit.clone(),
                    region,
                })
            }
            SurfaceState::Pressed { target, .. } => {
                log::debug!(
                    "Press on {:?} released over {:?}; cancelled",
                    target,
                    picked.target
                );
                self.state = hover_state(picked.target);
                None
            }
            _ => None,
        }
    }

    /// Queue a hover change for the next frame.
    pub fn request_hover(&mut self, region: Option<RegionId>) {
        self.pending_hover = (region != self.hovered).then_some(region);
    }

    /// Flush the hover change of this frame, if any.
    pub fn end_frame(&mut self) -> Option<Option<RegionId>> {
        let change = self.pending_hover.take()?;
        self.hovered = change;
        Some(change)
    }
}

fn hover_state(target: PickTarget) -> SurfaceState {
    match target {
        PickTarget::Background => SurfaceState::Idle,
        target => SurfaceState::Hovered(target),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::config::CameraConfig;
    use crate::model::box_mesh;
    use crate::region::RegionRegistry;
    use crate::resolver::SlabTable;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    struct Fixture {
        camera: OrbitCamera,
        display: DisplayTransform,
        overlay: HotspotOverlay,
        model: ModelScene,
    }

    impl Fixture {
        fn new() -> Self {
            let model = ModelScene::from_meshes(vec![box_mesh(
                "Body_Mesh",
                Vec3::new(-1.0, -3.0, -0.2),
                Vec3::new(1.0, 5.5, 0.2),
                None,
            )])
            .unwrap();
            Self {
                camera: OrbitCamera::new(&CameraConfig::default()),
                display: DisplayTransform::new(0.3, Vec3::new(0.0, -1.0, 0.0)),
                overlay: HotspotOverlay::new(&RegionRegistry::builtin()),
                model,
            }
        }

        fn ctx(&self) -> PickContext<'_> {
            PickContext {
                camera: &self.camera,
                viewport: VIEWPORT,
                display: &self.display,
                overlay: &self.overlay,
                model: Some(&self.model),
            }
        }

        fn pixel_of(&self, local: Vec3) -> Vec2 {
            self.camera
                .project(self.display.to_world(local), VIEWPORT)
                .unwrap()
        }
    }

    fn pipeline() -> PickingPipeline {
        let resolver = Resolver::new(
            Arc::new(RegionRegistry::builtin()),
            SlabTable::default(),
            0.3,
        );
        PickingPipeline::new(resolver, 4.0)
    }

    #[test]
    fn test_hotspot_in_front_of_mesh_wins() {
        let f = Fixture::new();
        // Head anchor sits at z = 0.3, in front of the body surface at z = 0.2
        let pixel = f.pixel_of(Vec3::new(0.0, 5.0, 0.3));
        assert_eq!(cast(&f.ctx(), pixel), Picked::hotspot(RegionId::Head));
    }

    #[test]
    fn test_mesh_hit_reports_untranslated_point() {
        let f = Fixture::new();
        // Between the neck and chest markers, on the body front face
        let pixel = f.pixel_of(Vec3::new(0.6, 0.0, 0.2));
        let picked = cast(&f.ctx(), pixel);
        assert_eq!(picked.target, PickTarget::Mesh(MeshId(0)));
        let PickHit::Mesh { name, local_hit, .. } = picked.hit else {
            panic!("expected a mesh hit, got {:?}", picked.hit);
        };
        assert_eq!(&*name, "Body_Mesh");
        // World y is 0 * 0.3 - 1 = -1; only the translation is removed
        assert!(local_hit.y.abs() < 1e-3);
        assert!((local_hit.z - 0.06).abs() < 1e-3);
    }

    #[test]
    fn test_background_and_unloaded() {
        let f = Fixture::new();
        assert_eq!(cast(&f.ctx(), Vec2::new(5.0, 5.0)), Picked::background());

        let mut ctx = f.ctx();
        ctx.model = None;
        let head = f.pixel_of(Vec3::new(0.0, 5.0, 0.3));
        assert_eq!(cast(&ctx, head), Picked::background());
    }

    #[test]
    fn test_label_over_body_does_not_capture_pick() {
        let f = Fixture::new();
        let labels = f.overlay.labels(&f.camera, VIEWPORT, &f.display);
        let neck = labels.iter().find(|l| l.region == RegionId::Neck).unwrap();
        let over_label = Vec2::new(
            neck.rect.x + neck.rect.width / 2.0,
            neck.rect.y + neck.rect.height / 2.0,
        );
        assert!(neck.rect.contains(over_label));

        let picked = cast(&f.ctx(), over_label);
        assert_eq!(picked.target, PickTarget::Mesh(MeshId(0)));
        assert!(matches!(picked.hit, PickHit::Mesh { .. }));
    }

    #[test]
    fn test_press_release_same_target_commits() {
        let mut p = pipeline();
        let head = Picked::hotspot(RegionId::Head);
        p.pointer_move(&head, Vec2::new(10.0, 10.0));
        assert_eq!(p.state(), SurfaceState::Hovered(PickTarget::Hotspot(RegionId::Head)));
        p.pointer_down(&head, Vec2::new(10.0, 10.0));
        let commit = p.pointer_up(&head).unwrap();
        assert_eq!(commit.region, Some(RegionId::Head));
        assert_eq!(p.state(), SurfaceState::Committed(PickTarget::Hotspot(RegionId::Head)));
    }

    #[test]
    fn test_release_elsewhere_cancels() {
        let mut p = pipeline();
        p.pointer_down(&Picked::hotspot(RegionId::Head), Vec2::ZERO);
        assert!(p.pointer_up(&Picked::hotspot(RegionId::Neck)).is_none());
        assert_eq!(p.state(), SurfaceState::Hovered(PickTarget::Hotspot(RegionId::Neck)));
    }

    #[test]
    fn test_drag_beyond_tolerance_cancels_press() {
        let mut p = pipeline();
        let bg = Picked::background();
        p.pointer_down(&bg, Vec2::ZERO);
        p.pointer_move(&bg, Vec2::new(3.0, 0.0));
        assert!(matches!(p.state(), SurfaceState::Pressed { .. }));
        p.pointer_move(&bg, Vec2::new(30.0, 0.0));
        assert_eq!(p.state(), SurfaceState::Idle);
        assert!(p.pointer_up(&bg).is_none());
    }

    #[test]
    fn test_background_click_commits_none() {
        let mut p = pipeline();
        let bg = Picked::background();
        p.pointer_down(&bg, Vec2::ZERO);
        let commit = p.pointer_up(&bg).unwrap();
        assert_eq!(commit.hit, PickHit::Background);
        assert_eq!(commit.region, None);
    }

    #[test]
    fn test_hover_coalesces_to_last_value_per_frame() {
        let mut p = pipeline();
        p.pointer_move(&Picked::hotspot(RegionId::Head), Vec2::ZERO);
        p.pointer_move(&Picked::hotspot(RegionId::Neck), Vec2::ZERO);
        p.pointer_move(&Picked::hotspot(RegionId::Chest), Vec2::ZERO);
        assert_eq!(p.end_frame(), Some(Some(RegionId::Chest)));
        assert_eq!(p.end_frame(), None);
        assert_eq!(p.hovered(), Some(RegionId::Chest));
    }

    #[test]
    fn test_redundant_hover_suppressed() {
        let mut p = pipeline();
        let head = Picked::hotspot(RegionId::Head);
        p.pointer_move(&head, Vec2::ZERO);
        p.end_frame();
        p.pointer_move(&head, Vec2::new(1.0, 0.0));
        assert_eq!(p.end_frame(), None);

        // Away and back within one frame is no change
        p.pointer_move(&Picked::background(), Vec2::ZERO);
        p.pointer_move(&head, Vec2::ZERO);
        assert_eq!(p.end_frame(), None);
    }

    #[test]
    fn test_pointer_leave_clears_hover() {
        let mut p = pipeline();
        p.pointer_move(&Picked::hotspot(RegionId::Feet), Vec2::ZERO);
        p.end_frame();
        p.pointer_leave();
        assert_eq!(p.state(), SurfaceState::Idle);
        assert_eq!(p.end_frame(), Some(None));
    }
}
