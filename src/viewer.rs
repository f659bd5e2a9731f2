//! Viewer orchestration.
//!
//! [`Viewer`] owns the region registry, the selection, the highlight
//! controller, the hotspot overlay, the picking pipeline and the camera, and
//! wires them together. It is driven by backend-independent input calls
//! (pointer, wheel, keys, resize) plus one [`Viewer::frame`] call per
//! animation frame. Highlight writes only ever happen inside `frame`, never
//! while a pick is being computed.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec2;
use web_time::Instant;

use crate::camera::OrbitCamera;
use crate::config::ViewerConfig;
use crate::geometry::DisplayTransform;
use crate::highlight::HighlightController;
use crate::hotspot::{HotspotOverlay, LabelLayout};
use crate::info::InfoCard;
use crate::keyboard::{FocusRing, Key, KeyAction, KeyBindings};
use crate::loader::{LoadEvent, LoadOverlay, ModelLoader};
use crate::model::{LoadError, ModelScene};
use crate::picking::{Commit, PickContext, Picked, PickingPipeline, cast};
use crate::region::{RegionId, RegionRegistry};
use crate::resolver::{PickHit, Resolver};
use crate::selection::{ListenerId, SelectionChange, SelectionModel, SelectionState};

/// Pointer buttons the viewer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Picks, and orbits when dragged
    Primary,
    /// Pans when dragged
    Secondary,
}

/// Camera drag in progress.
#[derive(Debug, Clone, Copy)]
struct DragState {
    button: PointerButton,
    origin: Vec2,
    last: Vec2,
    /// Set once the pointer travels past the click tolerance
    active: bool,
}

/// The interactive body viewer.
pub struct Viewer {
    config: ViewerConfig,
    registry: Arc<RegionRegistry>,
    display: DisplayTransform,
    camera: OrbitCamera,
    viewport: Vec2,

    selection: SelectionModel,
    highlight: HighlightController,
    overlay: HotspotOverlay,
    picking: PickingPipeline,
    focus: FocusRing,
    keys: KeyBindings,

    model: Option<ModelScene>,
    loader: Option<ModelLoader>,
    load_overlay: LoadOverlay,
    on_loaded: Option<Box<dyn FnOnce()>>,

    labels: Vec<LabelLayout>,
    pointer: Option<Vec2>,
    drag: Option<DragState>,
    info: InfoCard,

    /// Set by the selection listener; cleared when highlights are applied
    dirty: Rc<Cell<bool>>,
    selection_listener: ListenerId,
}

impl Viewer {
    /// Build a viewer from a validated configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration breaks the invariants `validate` checks.
    pub fn new(config: ViewerConfig) -> Self {
        let registry = Arc::new(RegionRegistry::builtin());
        let display = config.model.display();
        let resolver = Resolver::new(registry.clone(), config.slabs.clone(), display.scale);

        let selection = SelectionModel::new();
        let dirty = Rc::new(Cell::new(true));
        let flag = dirty.clone();
        let selection_listener = selection.subscribe(move |_, _| flag.set(true));

        let overlay = HotspotOverlay::new(&registry);
        let focus = FocusRing::new(overlay.hotspots().iter().map(|h| h.region).collect());

        Self {
            camera: OrbitCamera::new(&config.camera),
            viewport: Vec2::new(1.0, 1.0),
            highlight: HighlightController::new(registry.clone()),
            picking: PickingPipeline::new(resolver, config.picking.click_tolerance_px),
            load_overlay: LoadOverlay::new(config.model.load_timeout()),
            overlay,
            focus,
            keys: KeyBindings::default(),
            selection,
            model: None,
            loader: None,
            on_loaded: None,
            labels: Vec::new(),
            pointer: None,
            drag: None,
            info: InfoCard::placeholder(),
            dirty,
            selection_listener,
            registry,
            display,
            config,
        }
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Invoke `callback` on every change of the selected region.
    pub fn on_part_select(&self, mut callback: impl FnMut(Option<RegionId>) + 'static) -> ListenerId {
        self.selection.subscribe(move |change, _| {
            if let SelectionChange::Selected { current, .. } = change {
                callback(*current);
            }
        })
    }

    /// Invoke `callback` once, on the first successful model load.
    pub fn on_loaded(&mut self, callback: impl FnOnce() + 'static) {
        if self.model.is_some() {
            callback();
        } else {
            self.on_loaded = Some(Box::new(callback));
        }
    }

    // ========================================================================
    // Model Lifecycle
    // ========================================================================

    /// Start loading the configured model in the background.
    pub fn start_loading(&mut self) -> Result<(), LoadError> {
        if self.model.is_some() || self.loader.is_some() {
            log::debug!("Model already loaded or loading");
            return Ok(());
        }
        self.load_overlay = LoadOverlay::new(self.config.model.load_timeout());
        self.loader = Some(ModelLoader::spawn(self.config.model.asset_path())?);
        Ok(())
    }

    /// Abandon an in-flight load; its model is never installed.
    pub fn cancel_loading(&mut self) {
        if let Some(loader) = self.loader.take() {
            loader.cancel();
        }
    }

    /// Install a decoded model. Only the first model is accepted.
    pub fn install_model(&mut self, scene: ModelScene) {
        if self.model.is_some() {
            log::warn!("Ignoring second model; mesh state is already installed");
            return;
        }
        for region in self.overlay.anchors_outside(&scene.bounds()) {
            log::warn!("Hotspot anchor for '{}' lies outside the model bounds", region);
        }
        self.highlight.install(&scene);
        self.model = Some(scene);
        self.load_overlay.finish(Ok(()));
        self.dirty.set(true);
        log::info!("Model installed");

        if let Some(callback) = self.on_loaded.take() {
            callback();
        }
    }

    fn poll_loader(&mut self) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };
        let mut finished = None;
        while let Some(event) = loader.poll() {
            match event {
                LoadEvent::Progress(progress) => self.load_overlay.set_progress(progress),
                LoadEvent::Finished(result) => {
                    finished = Some(result);
                    break;
                }
            }
        }
        let Some(result) = finished else {
            return;
        };
        self.loader = None;
        match result {
            Ok(scene) => self.install_model(scene),
            Err(LoadError::Cancelled) => log::debug!("Model load cancelled"),
            Err(e) => {
                log::error!("Failed to load model: {}", e);
                self.load_overlay.finish(Err(&e));
            }
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    /// Pick whatever is under `pointer` without changing any state.
    pub fn pick_at(&self, pointer: Vec2) -> Picked {
        let ctx = PickContext {
            camera: &self.camera,
            viewport: self.viewport,
            display: &self.display,
            overlay: &self.overlay,
            model: self.model.as_ref(),
        };
        cast(&ctx, pointer)
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.pointer = Some(position);
        if let Some(drag) = self.drag.as_mut() {
            if !drag.active && position.distance(drag.origin) > self.config.picking.click_tolerance_px
            {
                drag.active = true;
            }
            if drag.active {
                let delta = position - drag.last;
                match drag.button {
                    PointerButton::Primary => self.camera.orbit(delta),
                    PointerButton::Secondary => self.camera.pan(delta, self.viewport),
                }
            }
            drag.last = position;
        }
        let picked = self.pick_at(position);
        self.picking.pointer_move(&picked, position);
    }

    pub fn pointer_pressed(&mut self, button: PointerButton, position: Vec2) {
        self.pointer = Some(position);
        self.drag = Some(DragState {
            button,
            origin: position,
            last: position,
            active: false,
        });
        if button == PointerButton::Primary {
            let picked = self.pick_at(position);
            self.picking.pointer_down(&picked, position);
        }
    }

    pub fn pointer_released(&mut self, button: PointerButton, position: Vec2) {
        self.pointer = Some(position);
        if self.drag.is_some_and(|d| d.button == button) {
            self.drag = None;
        }
        if button != PointerButton::Primary {
            return;
        }
        let picked = self.pick_at(position);
        if let Some(commit) = self.picking.pointer_up(&picked) {
            self.commit(commit);
        }
    }

    /// Pointer left the rendering surface.
    pub fn pointer_left(&mut self) {
        self.pointer = None;
        self.drag = None;
        self.picking.pointer_leave();
    }

    /// Wheel scroll in lines; positive zooms in.
    pub fn wheel(&mut self, lines: f32) {
        self.camera.zoom(lines);
    }

    pub fn key_pressed(&mut self, key: Key, shift: bool) {
        let Some(action) = self.keys.action_for_key(key, shift) else {
            return;
        };
        match action {
            KeyAction::FocusNext => {
                let focused = self.focus.next();
                self.picking.request_hover(focused);
            }
            KeyAction::FocusPrevious => {
                let focused = self.focus.previous();
                self.picking.request_hover(focused);
            }
            KeyAction::Commit => {
                if let Some(region) = self.focus.focused() {
                    let hit = self.overlay.click(region);
                    let region = self.picking.resolver().resolve(&hit);
                    self.commit(Commit { hit, region });
                }
            }
            KeyAction::Clear => {
                self.focus.clear();
                self.selection.select(None);
                self.picking.request_hover(None);
            }
            KeyAction::ResetView => self.camera.reset(),
        }
    }

    /// Close the info card; clears the selection.
    pub fn close_info(&mut self) {
        self.selection.select(None);
    }

    fn commit(&mut self, commit: Commit) {
        match (commit.region, &commit.hit) {
            (Some(region), _) => {
                self.focus.focus(region);
                self.selection.select(Some(region));
            }
            (None, PickHit::Background) => {
                self.focus.clear();
                self.selection.select(None);
            }
            // An unresolvable mesh pick leaves the selection alone
            (None, hit) => log::debug!("Pick {:?} resolved to no region", hit),
        }
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Advance one animation frame.
    ///
    /// Returns whether the frame changed what is drawn: the model arrived or
    /// the highlight was reapplied.
    pub fn frame(&mut self, now: Instant) -> bool {
        let was_loaded = self.model.is_some();
        self.poll_loader();
        self.load_overlay.tick(now);

        if let Some(hovered) = self.picking.end_frame() {
            self.selection.hover(hovered);
        }

        let repaint = self.dirty.replace(false);
        if repaint {
            let state = self.selection.state();
            self.highlight.apply(state);
            self.overlay.sync(&state);
            let info = InfoCard::for_selection(&self.registry, state.selected);
            if info != self.info {
                log::info!("Info card:\n{}", info);
                self.info = info;
            }
        }

        self.labels = if self.model.is_some() {
            self.overlay.labels(&self.camera, self.viewport, &self.display)
        } else {
            Vec::new()
        };

        repaint || was_loaded != self.model.is_some()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// A handle to the shared selection.
    pub fn selection(&self) -> SelectionModel {
        self.selection.clone()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn highlight(&self) -> &HighlightController {
        &self.highlight
    }

    pub fn overlay(&self) -> &HotspotOverlay {
        &self.overlay
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn display(&self) -> &DisplayTransform {
        &self.display
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn model(&self) -> Option<&ModelScene> {
        self.model.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Last pointer position on the surface.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn labels(&self) -> &[LabelLayout] {
        &self.labels
    }

    pub fn info(&self) -> &InfoCard {
        &self.info
    }

    pub fn focused(&self) -> Option<RegionId> {
        self.focus.focused()
    }

    pub fn load_overlay(&self) -> &LoadOverlay {
        &self.load_overlay
    }

    /// Window title reflecting hover and selection.
    pub fn title(&self) -> String {
        let label = |id: Option<RegionId>| {
            id.and_then(|id| self.registry.lookup(id))
                .map(|r| r.label.as_str())
        };
        let state = self.selection.state();
        let mut title = String::from("Body Explorer");
        if let Some(message) = self.load_overlay.message() {
            title.push_str(&format!(" | {message}"));
        }
        if let Some(selected) = label(state.selected) {
            title.push_str(&format!(" | Selected: {selected}"));
        }
        if let Some(hovered) = label(state.hovered) {
            title.push_str(&format!(" | Hover: {hovered}"));
        }
        title
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.cancel_loading();
        self.selection.unsubscribe(self.selection_listener);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use glam::Vec3;

    use super::*;
    use crate::highlight::HighlightStyle;
    use crate::hotspot::HotspotVisual;
    use crate::model::{MaterialDesc, box_mesh};
    use crate::color::Color;
    use crate::picking::PickTarget;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);
    const CORNER: Vec2 = Vec2::new(5.0, 5.0);
    /// Front face center of the forearm box, in world space
    const FOREARM: Vec3 = Vec3::new(-1.65, -0.85, 0.06);
    /// Front face center of the head box, in world space
    const HEAD_GEO: Vec3 = Vec3::new(-1.65, 0.05, 0.06);

    fn skin(index: usize) -> Option<MaterialDesc> {
        Some(MaterialDesc {
            index,
            color: Color::from_hex(0xe8c4a8),
            emissive: Color::BLACK,
        })
    }

    /// A slab body plus a separately named forearm and head. Pick points sit
    /// left of the markers and their labels.
    fn body() -> ModelScene {
        ModelScene::from_meshes(vec![
            box_mesh(
                "Body_Mesh",
                Vec3::new(-4.0, -4.5, -0.2),
                Vec3::new(1.0, 5.5, 0.2),
                skin(0),
            ),
            box_mesh(
                "LeftForearm_01",
                Vec3::new(-6.0, 0.0, -0.2),
                Vec3::new(-5.0, 1.0, 0.2),
                skin(1),
            ),
            box_mesh(
                "Head_Geo",
                Vec3::new(-6.0, 3.0, -0.2),
                Vec3::new(-5.0, 4.0, 0.2),
                skin(2),
            ),
        ])
        .unwrap()
    }

    fn viewer() -> Viewer {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.resize(VIEWPORT.x, VIEWPORT.y);
        viewer.install_model(body());
        viewer.frame(Instant::now());
        viewer
    }

    fn record_selections(viewer: &Viewer) -> Rc<RefCell<Vec<Option<RegionId>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        viewer.on_part_select(move |id| sink.borrow_mut().push(id));
        log
    }

    /// Pixel of a point given in world space.
    fn pixel(viewer: &Viewer, world: Vec3) -> Vec2 {
        viewer.camera().project(world, VIEWPORT).unwrap()
    }

    fn anchor_pixel(viewer: &Viewer, region: RegionId) -> Vec2 {
        let anchor = viewer.registry().lookup(region).unwrap().anchor;
        pixel(viewer, viewer.display().to_world(anchor))
    }

    fn click(viewer: &mut Viewer, at: Vec2) {
        viewer.pointer_moved(at);
        viewer.pointer_pressed(PointerButton::Primary, at);
        viewer.pointer_released(PointerButton::Primary, at);
        viewer.frame(Instant::now());
    }

    #[test]
    fn test_s1_click_head_hotspot() {
        let mut viewer = viewer();
        let selections = record_selections(&viewer);
        let head = anchor_pixel(&viewer, RegionId::Head);
        assert_eq!(viewer.pick_at(head).target, PickTarget::Hotspot(RegionId::Head));

        click(&mut viewer, head);

        assert_eq!(viewer.selection_state().selected, Some(RegionId::Head));
        assert_eq!(*selections.borrow(), vec![Some(RegionId::Head)]);
        assert_eq!(
            viewer.overlay().visual(RegionId::Head),
            Some(HotspotVisual::Selected)
        );
        assert_eq!(viewer.info().title, "Head");
    }

    #[test]
    fn test_s2_mesh_pick_resolves_neck() {
        let mut viewer = viewer();
        let selections = record_selections(&viewer);
        // localHit.y = 0.75, world y = 0.75 - 1
        let at = pixel(&viewer, Vec3::new(-1.0, -0.25, 0.06));
        let PickHit::Mesh { local_hit, .. } = viewer.pick_at(at).hit else {
            panic!("expected a mesh hit");
        };
        assert!((local_hit.y - 0.75).abs() < 1e-3);

        click(&mut viewer, at);
        assert_eq!(*selections.borrow(), vec![Some(RegionId::Neck)]);
    }

    #[test]
    fn test_s3_mesh_pick_resolves_feet() {
        let mut viewer = viewer();
        let selections = record_selections(&viewer);
        // localHit.y = -0.9
        let at = pixel(&viewer, Vec3::new(-1.0, -1.9, 0.06));
        click(&mut viewer, at);
        assert_eq!(*selections.borrow(), vec![Some(RegionId::Feet)]);
    }

    #[test]
    fn test_s4_forearm_name_resolves_arms() {
        let mut viewer = viewer();
        let at = pixel(&viewer, FOREARM);
        let picked = viewer.pick_at(at);
        assert!(matches!(&picked.hit, PickHit::Mesh { name, .. } if &**name == "LeftForearm_01"));

        click(&mut viewer, at);
        assert_eq!(viewer.selection_state().selected, Some(RegionId::Arms));

        // Arms is marked by its hotspot alone; the forearm keeps its look
        let forearm = &viewer.highlight().mesh_states()[1];
        assert_eq!(forearm.material().color, forearm.original_color());
        assert_eq!(forearm.material().emissive, forearm.original_emissive());
        assert_eq!(
            viewer.overlay().visual(RegionId::Arms),
            Some(HotspotVisual::Selected)
        );
    }

    #[test]
    fn test_named_head_mesh_is_painted() {
        let mut viewer = viewer();
        let at = pixel(&viewer, HEAD_GEO);
        let picked = viewer.pick_at(at);
        assert!(matches!(&picked.hit, PickHit::Mesh { name, .. } if &**name == "Head_Geo"));

        click(&mut viewer, at);
        assert_eq!(viewer.selection_state().selected, Some(RegionId::Head));
        let head = viewer.highlight().mesh_states()[2].material();
        let style = HighlightStyle::default();
        assert_eq!(head.color, style.selected_color);
        assert_eq!(head.emissive, style.selected_emissive);

        // The slab body shares no region name and stays untouched
        let slab = &viewer.highlight().mesh_states()[0];
        assert_eq!(slab.material().color, slab.original_color());
    }

    #[test]
    fn test_s5_background_click_clears_and_restores() {
        let mut viewer = viewer();
        let selections = record_selections(&viewer);
        let forearm = pixel(&viewer, FOREARM);
        click(&mut viewer, forearm);
        assert_eq!(viewer.selection_state().selected, Some(RegionId::Arms));

        click(&mut viewer, CORNER);
        assert_eq!(viewer.selection_state().selected, None);
        assert_eq!(*selections.borrow(), vec![Some(RegionId::Arms), None]);
        for mesh in viewer.highlight().mesh_states() {
            assert_eq!(mesh.material().color, mesh.original_color());
            assert_eq!(mesh.material().emissive, mesh.original_emissive());
        }
        assert_eq!(viewer.overlay().visual(RegionId::Arms), Some(HotspotVisual::Idle));
        assert_eq!(viewer.info(), &InfoCard::placeholder());
    }

    #[test]
    fn test_s6_hover_then_leave_before_release() {
        let mut viewer = viewer();
        let head = anchor_pixel(&viewer, RegionId::Head);

        viewer.pointer_moved(head);
        viewer.frame(Instant::now());
        assert_eq!(viewer.selection_state().hovered, Some(RegionId::Head));
        assert_eq!(
            viewer.overlay().visual(RegionId::Head),
            Some(HotspotVisual::Hovered)
        );

        viewer.pointer_pressed(PointerButton::Primary, head);
        viewer.pointer_moved(CORNER);
        viewer.frame(Instant::now());
        assert_eq!(viewer.selection_state().hovered, None);

        viewer.pointer_released(PointerButton::Primary, CORNER);
        viewer.frame(Instant::now());
        assert_eq!(viewer.selection_state(), SelectionState::default());
    }

    #[test]
    fn test_click_through_label_picks_body() {
        let mut viewer = viewer();
        let neck = viewer
            .labels()
            .iter()
            .find(|l| l.region == RegionId::Neck)
            .unwrap()
            .clone();
        let at = Vec2::new(
            neck.rect.x + neck.rect.width / 2.0,
            neck.rect.y + neck.rect.height / 2.0,
        );
        assert!(neck.rect.contains(at));
        assert_eq!(
            viewer.pick_at(at).target,
            PickTarget::Mesh(crate::model::MeshId(0))
        );

        // Resolved by height on the body, above the neck slab
        click(&mut viewer, at);
        assert_eq!(viewer.selection_state().selected, Some(RegionId::Head));
        assert_ne!(
            viewer.overlay().visual(RegionId::Neck),
            Some(HotspotVisual::Selected)
        );
    }

    #[test]
    fn test_unresolvable_mesh_pick_keeps_selection() {
        let mut viewer = viewer();
        viewer.selection().select(Some(RegionId::Chest));
        viewer.commit(Commit {
            hit: PickHit::Mesh {
                mesh: crate::model::MeshId(0),
                name: Arc::from("Body_Mesh"),
                local_hit: Vec3::new(0.0, f32::NAN, 0.0),
            },
            region: None,
        });
        assert_eq!(viewer.selection_state().selected, Some(RegionId::Chest));
    }

    #[test]
    fn test_picks_are_background_before_load() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.resize(VIEWPORT.x, VIEWPORT.y);
        let center = VIEWPORT / 2.0;
        assert_eq!(viewer.pick_at(center), Picked::background());
        click(&mut viewer, center);
        assert_eq!(viewer.selection_state().selected, None);
    }

    #[test]
    fn test_on_loaded_fires_once() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        viewer.on_loaded(move || c.set(c.get() + 1));
        viewer.install_model(body());
        viewer.install_model(body());
        assert_eq!(count.get(), 1);
        assert!(viewer.highlight().is_installed());
    }

    #[test]
    fn test_keyboard_focus_parity() {
        let mut viewer = viewer();
        let selections = record_selections(&viewer);

        viewer.key_pressed(Key::Tab, false);
        viewer.frame(Instant::now());
        assert_eq!(viewer.focused(), Some(RegionId::Head));
        assert_eq!(viewer.selection_state().hovered, Some(RegionId::Head));

        viewer.key_pressed(Key::Tab, false);
        viewer.key_pressed(Key::Enter, false);
        viewer.frame(Instant::now());
        assert_eq!(viewer.selection_state().selected, Some(RegionId::Neck));

        viewer.key_pressed(Key::Tab, true);
        viewer.key_pressed(Key::Space, false);
        assert_eq!(viewer.selection_state().selected, Some(RegionId::Head));

        viewer.key_pressed(Key::Escape, false);
        viewer.frame(Instant::now());
        assert_eq!(viewer.selection_state(), SelectionState::default());
        assert_eq!(viewer.focused(), None);
        assert_eq!(
            *selections.borrow(),
            vec![Some(RegionId::Neck), Some(RegionId::Head), None]
        );
    }

    #[test]
    fn test_close_info_clears_selection() {
        let mut viewer = viewer();
        let feet = anchor_pixel(&viewer, RegionId::Feet);
        click(&mut viewer, feet);
        assert!(viewer.info().is_closable());
        viewer.close_info();
        viewer.frame(Instant::now());
        assert_eq!(viewer.selection_state().selected, None);
        assert!(!viewer.info().is_closable());
    }

    #[test]
    fn test_pointer_leave_clears_hover() {
        let mut viewer = viewer();
        viewer.pointer_moved(anchor_pixel(&viewer, RegionId::Neck));
        viewer.frame(Instant::now());
        assert_eq!(viewer.selection_state().hovered, Some(RegionId::Neck));
        viewer.pointer_left();
        viewer.frame(Instant::now());
        assert_eq!(viewer.selection_state().hovered, None);
    }

    #[test]
    fn test_title_shows_selection_and_hover() {
        let viewer = viewer();
        viewer.selection().select(Some(RegionId::Legs));
        viewer.selection().hover(Some(RegionId::Feet));
        assert_eq!(viewer.title(), "Body Explorer | Selected: Legs | Hover: Feet");
    }

    #[test]
    fn test_highlight_applied_only_in_frame() {
        let mut viewer = viewer();
        let head = pixel(&viewer, HEAD_GEO);
        viewer.pointer_moved(head);
        viewer.pointer_pressed(PointerButton::Primary, head);
        viewer.pointer_released(PointerButton::Primary, head);
        // Selected, but not painted until the frame runs
        assert_eq!(viewer.selection_state().selected, Some(RegionId::Head));
        let mesh = &viewer.highlight().mesh_states()[2];
        assert_eq!(mesh.material().color, mesh.original_color());
        viewer.frame(Instant::now());
        let mesh = &viewer.highlight().mesh_states()[2];
        assert_eq!(mesh.material().color, HighlightStyle::default().selected_color);
    }

    #[test]
    fn test_frame_reports_visible_changes() {
        let mut viewer = viewer();
        assert!(!viewer.frame(Instant::now()));

        viewer.selection().select(Some(RegionId::Chest));
        assert!(viewer.frame(Instant::now()));
        assert!(!viewer.frame(Instant::now()));

        // Hover on a new target lands with the next frame
        viewer.pointer_moved(anchor_pixel(&viewer, RegionId::Head));
        assert!(viewer.frame(Instant::now()));
        assert!(!viewer.frame(Instant::now()));
    }

    #[test]
    fn test_failed_load_shows_message() {
        let mut config = ViewerConfig::default();
        config.model.asset_root = std::path::PathBuf::from("/nonexistent");
        let mut viewer = Viewer::new(config);
        viewer.start_loading().unwrap();
        let start = Instant::now();
        while viewer.load_overlay().message().is_some_and(|m| m.ends_with("loaded"))
            && start.elapsed() < std::time::Duration::from_secs(5)
        {
            viewer.frame(Instant::now());
            std::thread::yield_now();
        }
        assert!(!viewer.is_loaded());
        assert!(
            viewer
                .load_overlay()
                .message()
                .is_some_and(|m| m.starts_with("Failed to read model"))
        );
    }
}
