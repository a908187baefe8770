//! Interactive map navigation: pan, zoom, orbit and tilt with inertia.
//!
//! Input handlers take explicit timestamps (seconds) so the controller can be
//! driven by any event source and replayed in tests. The render loop calls
//! [`MapControls::update`] once per frame to advance inertia and animated
//! zoom, then drains [`MapControls::drain_events`].

use std::collections::VecDeque;
use std::sync::Arc;

use foundation::math::{Projection, Vec2, Vec3};
use tracing::{debug, trace};

use crate::camera::MapCamera;
use crate::config::ControlsConfig;
use crate::events::{ControlEvent, ControlEventRecord, ControlEvents};

/// Maximum samples to keep for velocity estimation.
const VELOCITY_HISTORY_SIZE: usize = 5;

/// Samples older than this at release time do not contribute to inertia.
const RELEASE_WINDOW_S: f64 = 0.1;

/// Cap on a single update step to avoid large jumps after stalls.
const MAX_STEP_S: f64 = 0.1;

const PAN_STOP_PX_PER_S: f64 = 1.0;
const ROTATE_STOP_DEG_PER_S: f64 = 0.1;
const ZOOM_SNAP: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragButton {
    #[default]
    None,
    /// Pan.
    Left,
    /// Orbit: heading and pitch.
    Right,
    /// Tilt only.
    Middle,
}

impl DragButton {
    /// Maps a DOM-style button index (0 left, 1 middle, 2 right).
    pub fn from_index(button: i32) -> Self {
        match button {
            1 => DragButton::Middle,
            2 => DragButton::Right,
            _ => DragButton::Left,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MotionSample {
    pan: Vec3,
    heading_deg: f64,
    dt: f64,
    time_s: f64,
}

#[derive(Debug, Clone)]
pub struct MapControls {
    config: ControlsConfig,
    camera: MapCamera,
    projection: Arc<dyn Projection>,
    events: ControlEvents,

    drag_button: DragButton,
    last_pos_px: Vec2,
    last_input_s: f64,
    touches: Vec<Vec2>,
    history: VecDeque<MotionSample>,

    /// World units per second.
    pan_velocity: Vec3,
    /// Degrees per second.
    heading_velocity: f64,
    target_zoom: f64,
    zoom_anchor_px: Vec2,

    interacting: bool,
    clock_s: f64,
}

impl MapControls {
    pub fn new(projection: Arc<dyn Projection>, config: ControlsConfig) -> Self {
        let camera = MapCamera::default();
        Self {
            target_zoom: camera.zoom_level,
            zoom_anchor_px: Vec2::new(camera.viewport_width * 0.5, camera.viewport_height * 0.5),
            config,
            camera,
            projection,
            events: ControlEvents::new(),
            drag_button: DragButton::None,
            last_pos_px: Vec2::default(),
            last_input_s: 0.0,
            touches: Vec::new(),
            history: VecDeque::with_capacity(VELOCITY_HISTORY_SIZE),
            pan_velocity: Vec3::ZERO,
            heading_velocity: 0.0,
            interacting: false,
            clock_s: 0.0,
        }
    }

    pub fn camera(&self) -> &MapCamera {
        &self.camera
    }

    /// Replaces the camera, cancelling any inertia or zoom animation.
    pub fn set_camera(&mut self, mut camera: MapCamera) {
        camera.zoom_level = self.config.clamp_zoom(camera.zoom_level);
        camera.pitch_deg = self.config.clamp_pitch(camera.pitch_deg);
        self.camera = camera;
        self.stop_inertia();
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ControlsConfig) {
        self.config = config;
        self.camera.zoom_level = self.config.clamp_zoom(self.camera.zoom_level);
        self.camera.pitch_deg = self.config.clamp_pitch(self.camera.pitch_deg);
        self.target_zoom = self.camera.zoom_level;
    }

    pub fn projection(&self) -> &Arc<dyn Projection> {
        &self.projection
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.camera.set_viewport(width, height);
    }

    pub fn events(&self) -> &ControlEvents {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ControlEventRecord> {
        self.events.drain()
    }

    pub fn drag_button(&self) -> DragButton {
        self.drag_button
    }

    /// Between `BeginInteraction` and `EndInteraction`.
    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    pub fn is_animating(&self) -> bool {
        self.pan_velocity != Vec3::ZERO
            || self.heading_velocity != 0.0
            || self.target_zoom != self.camera.zoom_level
    }

    pub fn stop_inertia(&mut self) {
        self.pan_velocity = Vec3::ZERO;
        self.heading_velocity = 0.0;
        self.target_zoom = self.camera.zoom_level;
        self.history.clear();
    }

    pub fn on_pointer_down(&mut self, pos_px: Vec2, button: DragButton, time_s: f64) {
        self.begin(time_s);
        self.drag_button = button;
        self.last_pos_px = pos_px;
        self.last_input_s = time_s;
    }

    pub fn on_pointer_move(&mut self, pos_px: Vec2, time_s: f64) {
        if self.drag_button == DragButton::None {
            return;
        }
        self.clock_s = time_s;
        let dt = (time_s - self.last_input_s).max(1e-6);
        let dx = pos_px.x - self.last_pos_px.x;
        let dy = pos_px.y - self.last_pos_px.y;

        let (pan, heading_deg) = match self.drag_button {
            DragButton::Left => (self.pan(self.last_pos_px, pos_px), 0.0),
            DragButton::Right => (Vec3::ZERO, self.orbit(dx, dy)),
            DragButton::Middle => {
                self.tilt(dy, self.config.orbit_degrees_per_pixel);
                (Vec3::ZERO, 0.0)
            }
            DragButton::None => return,
        };
        self.record_sample(pan, heading_deg, dt, time_s);

        self.last_pos_px = pos_px;
        self.last_input_s = time_s;
        self.events.emit(time_s, ControlEvent::Update);
    }

    pub fn on_pointer_up(&mut self, time_s: f64) {
        if self.drag_button == DragButton::None {
            return;
        }
        self.clock_s = time_s;
        self.release(time_s);
        self.drag_button = DragButton::None;
        self.finish_if_idle(time_s);
    }

    /// Positive `delta` zooms out, negative zooms in, by
    /// `zoom_level_delta_on_mouse_wheel` per event.
    pub fn on_wheel(&mut self, pos_px: Vec2, delta: f64, time_s: f64) {
        if delta == 0.0 {
            return;
        }
        self.clock_s = time_s;
        self.open_interaction(time_s);
        self.pan_velocity = Vec3::ZERO;
        self.heading_velocity = 0.0;
        let step = -delta.signum() * self.config.zoom_level_delta_on_mouse_wheel;
        self.request_zoom(step, pos_px, time_s);
        self.finish_if_idle(time_s);
    }

    pub fn on_double_click(&mut self, pos_px: Vec2, time_s: f64) {
        self.clock_s = time_s;
        self.open_interaction(time_s);
        self.pan_velocity = Vec3::ZERO;
        self.heading_velocity = 0.0;
        self.request_zoom(self.config.zoom_level_delta_on_double_click, pos_px, time_s);
        self.finish_if_idle(time_s);
    }

    pub fn on_touch_start(&mut self, touches: &[Vec2], time_s: f64) {
        self.begin(time_s);
        self.touches = touches.to_vec();
        self.last_input_s = time_s;
    }

    /// One finger pans, two fingers pinch-zoom and twist, three tilt.
    pub fn on_touch_move(&mut self, touches: &[Vec2], time_s: f64) {
        if self.touches.is_empty() {
            return;
        }
        self.clock_s = time_s;
        if touches.len() != self.touches.len() {
            // Finger count changed: restart from the new contact set.
            self.touches = touches.to_vec();
            self.history.clear();
            self.last_input_s = time_s;
            return;
        }
        let dt = (time_s - self.last_input_s).max(1e-6);
        let prev = std::mem::replace(&mut self.touches, touches.to_vec());

        let (pan, heading_deg) = match touches.len() {
            0 => return,
            1 => (self.pan(prev[0], touches[0]), 0.0),
            2 => self.pinch([prev[0], prev[1]], [touches[0], touches[1]]),
            _ => {
                let dy = centroid(touches).y - centroid(&prev).y;
                self.tilt(dy, self.config.touch_tilt_degrees_per_pixel);
                (Vec3::ZERO, 0.0)
            }
        };
        self.record_sample(pan, heading_deg, dt, time_s);
        self.last_input_s = time_s;
        self.events.emit(time_s, ControlEvent::Update);
    }

    /// `remaining` are the contacts still down after the lift.
    pub fn on_touch_end(&mut self, remaining: &[Vec2], time_s: f64) {
        if self.touches.is_empty() {
            return;
        }
        self.clock_s = time_s;
        if remaining.is_empty() {
            self.release(time_s);
            self.touches.clear();
            self.finish_if_idle(time_s);
        } else {
            self.touches = remaining.to_vec();
            self.history.clear();
            self.last_input_s = time_s;
        }
    }

    /// Advances inertia and animated zoom by `dt` seconds. Returns `true`
    /// when the camera changed.
    pub fn update(&mut self, dt: f64) -> bool {
        let dt = dt.clamp(0.0, MAX_STEP_S);
        self.clock_s += dt;
        if dt == 0.0 {
            return false;
        }

        let mut changed = false;
        let dragging = self.drag_button != DragButton::None || !self.touches.is_empty();

        if !dragging && self.pan_velocity != Vec3::ZERO {
            self.camera
                .translate_target(self.projection.as_ref(), self.pan_velocity * dt);
            self.pan_velocity = self.pan_velocity * decay(self.config.pan_inertia_damping, dt);
            let stop = PAN_STOP_PX_PER_S * self.camera.world_units_per_pixel(self.projection.as_ref());
            if self.pan_velocity.length() < stop {
                trace!("pan inertia stopped");
                self.pan_velocity = Vec3::ZERO;
            }
            changed = true;
        }

        if !dragging && self.heading_velocity != 0.0 {
            self.set_heading(self.camera.heading_deg + self.heading_velocity * dt);
            self.heading_velocity *= decay(self.config.rotate_inertia_damping, dt);
            if self.heading_velocity.abs() < ROTATE_STOP_DEG_PER_S {
                trace!("rotate inertia stopped");
                self.heading_velocity = 0.0;
            }
            changed = true;
        }

        if self.target_zoom != self.camera.zoom_level {
            let zoom = self.camera.zoom_level;
            let alpha = 1.0 - decay(self.config.zoom_inertia_damping, dt);
            let mut next = zoom + (self.target_zoom - zoom) * alpha;
            if (self.target_zoom - next).abs() < ZOOM_SNAP {
                next = self.target_zoom;
            }
            self.zoom_to(next, self.zoom_anchor_px);
            changed = true;
        }

        if changed {
            self.events.emit(self.clock_s, ControlEvent::Update);
        }
        self.finish_if_idle(self.clock_s);
        changed
    }

    fn begin(&mut self, time_s: f64) {
        self.clock_s = time_s;
        self.stop_inertia();
        self.open_interaction(time_s);
    }

    fn open_interaction(&mut self, time_s: f64) {
        if !self.interacting {
            debug!(time_s, "interaction began");
            self.interacting = true;
            self.events.emit(time_s, ControlEvent::BeginInteraction);
        }
    }

    fn finish_if_idle(&mut self, time_s: f64) {
        let dragging = self.drag_button != DragButton::None || !self.touches.is_empty();
        if self.interacting && !dragging && !self.is_animating() {
            debug!(time_s, "interaction ended");
            self.interacting = false;
            self.events.emit(time_s, ControlEvent::EndInteraction);
        }
    }

    fn record_sample(&mut self, pan: Vec3, heading_deg: f64, dt: f64, time_s: f64) {
        self.history.push_back(MotionSample {
            pan,
            heading_deg,
            dt,
            time_s,
        });
        if self.history.len() > VELOCITY_HISTORY_SIZE {
            self.history.pop_front();
        }
    }

    /// Turns recent motion into inertia velocities.
    fn release(&mut self, time_s: f64) {
        if self.config.inertia_enabled {
            let mut pan = Vec3::ZERO;
            let mut heading = 0.0;
            let mut total_dt = 0.0;
            for s in self
                .history
                .iter()
                .filter(|s| time_s - s.time_s <= RELEASE_WINDOW_S)
            {
                pan = pan + s.pan;
                heading += s.heading_deg;
                total_dt += s.dt;
            }
            if total_dt > 0.0 {
                if self.config.pan_inertia_damping > 0.0 {
                    self.pan_velocity = pan * (1.0 / total_dt);
                }
                if self.config.rotate_inertia_damping > 0.0 {
                    self.heading_velocity = heading / total_dt;
                }
            }
        }
        self.history.clear();
    }

    /// Moves the camera so the ground point under `from` ends up under `to`.
    /// Returns the world-space target displacement.
    fn pan(&mut self, from: Vec2, to: Vec2) -> Vec3 {
        let projection = self.projection.as_ref();
        let (Some(a), Some(b)) = (
            self.camera.pick_world(projection, from),
            self.camera.pick_world(projection, to),
        ) else {
            return Vec3::ZERO;
        };
        let delta = a - b;
        self.camera.translate_target(projection, delta);
        delta
    }

    /// Returns the heading change in degrees.
    fn orbit(&mut self, dx: f64, dy: f64) -> f64 {
        let k = self.config.orbit_degrees_per_pixel;
        let mut heading_change = 0.0;
        if self.config.rotate_enabled {
            heading_change = dx * k;
            self.set_heading(self.camera.heading_deg + heading_change);
        }
        self.tilt(dy, k);
        heading_change
    }

    /// Dragging up tilts toward the horizon.
    fn tilt(&mut self, dy: f64, degrees_per_pixel: f64) {
        if self.config.tilt_enabled {
            self.camera.pitch_deg = self.config.clamp_pitch(self.camera.pitch_deg - dy * degrees_per_pixel);
        }
    }

    fn pinch(&mut self, prev: [Vec2; 2], cur: [Vec2; 2]) -> (Vec3, f64) {
        let prev_center = centroid(&prev);
        let cur_center = centroid(&cur);
        let pan = self.pan(prev_center, cur_center);

        let prev_span = span(prev);
        let next_span = span(cur);
        if prev_span.length() > 1e-6 && next_span.length() > 1e-6 {
            let dz = (next_span.length() / prev_span.length()).log2() * self.config.touch_zoom_factor;
            self.zoom_to(self.camera.zoom_level + dz, cur_center);
            self.target_zoom = self.camera.zoom_level;
        }

        let mut heading_change = 0.0;
        if self.config.rotate_enabled {
            let twist = (next_span.y.atan2(next_span.x) - prev_span.y.atan2(prev_span.x)).to_degrees();
            heading_change = -((twist + 180.0).rem_euclid(360.0) - 180.0);
            self.set_heading(self.camera.heading_deg + heading_change);
        }
        (pan, heading_change)
    }

    fn request_zoom(&mut self, delta: f64, anchor_px: Vec2, time_s: f64) {
        self.target_zoom = self.config.clamp_zoom(self.target_zoom + delta);
        self.zoom_anchor_px = anchor_px;
        if !self.config.inertia_enabled || self.config.zoom_inertia_damping <= 0.0 {
            self.zoom_to(self.target_zoom, anchor_px);
        }
        self.events.emit(time_s, ControlEvent::Update);
    }

    /// Sets the zoom level keeping the ground point under `anchor_px` fixed.
    fn zoom_to(&mut self, zoom: f64, anchor_px: Vec2) {
        let projection = self.projection.as_ref();
        let before = self.camera.pick_world(projection, anchor_px);
        self.camera.zoom_level = self.config.clamp_zoom(zoom);
        let after = self.camera.pick_world(projection, anchor_px);
        if let (Some(before), Some(after)) = (before, after) {
            self.camera.translate_target(projection, before - after);
        }
    }

    fn set_heading(&mut self, heading_deg: f64) {
        self.camera.heading_deg = heading_deg.rem_euclid(360.0);
    }
}

/// Exponential damping factor over `dt` for a decay lasting `duration_s`.
fn decay(duration_s: f64, dt: f64) -> f64 {
    if duration_s <= 0.0 {
        0.0
    } else {
        (-4.0 * dt / duration_s).exp()
    }
}

fn centroid(points: &[Vec2]) -> Vec2 {
    let n = points.len().max(1) as f64;
    let sum = points.iter().fold(Vec2::default(), |acc, &p| acc + p);
    Vec2::new(sum.x / n, sum.y / n)
}

fn span(pair: [Vec2; 2]) -> Vec2 {
    pair[1] - pair[0]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use foundation::GeoCoordinates;
    use foundation::math::{MercatorProjection, SphereProjection, Vec2};
    use pretty_assertions::assert_eq;

    use super::{DragButton, MapControls};
    use crate::camera::MapCamera;
    use crate::config::ControlsConfig;
    use crate::events::ControlEvent;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn controls(config: ControlsConfig) -> MapControls {
        let mut c = MapControls::new(Arc::new(MercatorProjection), config);
        c.set_camera(MapCamera {
            target: GeoCoordinates::new(0.0, 0.0),
            zoom_level: 4.0,
            ..MapCamera::default()
        });
        c
    }

    fn no_inertia() -> ControlsConfig {
        ControlsConfig {
            inertia_enabled: false,
            ..ControlsConfig::default()
        }
    }

    fn kinds(c: &mut MapControls) -> Vec<ControlEvent> {
        c.drain_events().into_iter().map(|r| r.event).collect()
    }

    #[test]
    fn left_drag_pans_with_cursor() {
        let mut c = controls(no_inertia());
        let grabbed = c
            .camera()
            .pick(c.projection().as_ref(), Vec2::new(640.0, 360.0))
            .expect("hit");

        c.on_pointer_down(Vec2::new(640.0, 360.0), DragButton::Left, 0.0);
        c.on_pointer_move(Vec2::new(740.0, 360.0), 0.016);
        c.on_pointer_up(0.03);

        assert!(c.camera().target.longitude < 0.0);
        assert_close(c.camera().target.latitude, 0.0, 1e-9);
        let under_cursor = c
            .camera()
            .pick(c.projection().as_ref(), Vec2::new(740.0, 360.0))
            .expect("hit");
        assert_close(under_cursor.longitude, grabbed.longitude, 1e-6);
        assert_close(under_cursor.latitude, grabbed.latitude, 1e-6);

        assert_eq!(
            kinds(&mut c),
            vec![
                ControlEvent::BeginInteraction,
                ControlEvent::Update,
                ControlEvent::EndInteraction
            ]
        );
        assert!(!c.is_interacting());
    }

    #[test]
    fn pan_inertia_decays_and_ends_interaction() {
        let mut c = controls(ControlsConfig::default());
        c.on_pointer_down(Vec2::new(640.0, 360.0), DragButton::Left, 0.0);
        for i in 1..=3 {
            let x = 640.0 - 10.0 * f64::from(i);
            c.on_pointer_move(Vec2::new(x, 360.0), 0.016 * f64::from(i));
        }
        c.on_pointer_up(0.05);
        assert!(c.is_animating());
        assert!(c.is_interacting());

        let lon = c.camera().target.longitude;
        assert!(c.update(0.016));
        assert!(c.camera().target.longitude > lon);

        for _ in 0..200 {
            c.update(0.05);
        }
        assert!(!c.is_animating());
        assert!(!c.is_interacting());
        let events = kinds(&mut c);
        assert_eq!(events.first(), Some(&ControlEvent::BeginInteraction));
        assert_eq!(events.last(), Some(&ControlEvent::EndInteraction));
        assert!(!c.update(0.05));
    }

    #[test]
    fn new_press_stops_inertia() {
        let mut c = controls(ControlsConfig::default());
        c.on_pointer_down(Vec2::new(640.0, 360.0), DragButton::Left, 0.0);
        c.on_pointer_move(Vec2::new(600.0, 360.0), 0.016);
        c.on_pointer_up(0.02);
        assert!(c.is_animating());
        c.on_pointer_down(Vec2::new(10.0, 10.0), DragButton::Left, 0.1);
        assert!(!c.is_animating());
    }

    #[test]
    fn wheel_zoom_keeps_cursor_anchor() {
        let mut c = controls(no_inertia());
        let pos = Vec2::new(900.0, 200.0);
        let before = c.camera().pick(c.projection().as_ref(), pos).expect("hit");

        c.on_wheel(pos, -1.0, 1.0);
        assert_close(c.camera().zoom_level, 4.2, 1e-12);
        let after = c.camera().pick(c.projection().as_ref(), pos).expect("hit");
        assert_close(after.latitude, before.latitude, 1e-7);
        assert_close(after.longitude, before.longitude, 1e-7);
        assert_eq!(
            kinds(&mut c),
            vec![
                ControlEvent::BeginInteraction,
                ControlEvent::Update,
                ControlEvent::EndInteraction
            ]
        );
    }

    #[test]
    fn animated_zoom_converges() {
        let mut c = controls(ControlsConfig::default());
        c.on_wheel(Vec2::new(640.0, 360.0), 3.0, 0.0);
        assert_eq!(c.camera().zoom_level, 4.0);
        assert!(c.is_interacting());

        for _ in 0..100 {
            c.update(0.05);
        }
        assert_close(c.camera().zoom_level, 3.8, 1e-12);
        assert_eq!(kinds(&mut c).last(), Some(&ControlEvent::EndInteraction));
    }

    #[test]
    fn double_click_zoom_is_clamped() {
        let mut c = controls(no_inertia());
        let mut camera = c.camera().clone();
        camera.zoom_level = 19.5;
        c.set_camera(camera);
        c.on_double_click(Vec2::new(640.0, 360.0), 0.0);
        assert_eq!(c.camera().zoom_level, 20.0);
    }

    #[test]
    fn right_drag_orbits() {
        let mut c = controls(no_inertia());
        c.on_pointer_down(Vec2::new(640.0, 360.0), DragButton::Right, 0.0);
        c.on_pointer_move(Vec2::new(690.0, 260.0), 0.1);
        c.on_pointer_up(0.2);
        assert_close(c.camera().heading_deg, 5.0, 1e-9);
        assert_close(c.camera().pitch_deg, 10.0, 1e-9);

        c.on_pointer_down(Vec2::new(0.0, 0.0), DragButton::Right, 1.0);
        c.on_pointer_move(Vec2::new(0.0, -2000.0), 1.1);
        assert_eq!(c.camera().pitch_deg, 80.0);
    }

    #[test]
    fn disabled_rotation_and_tilt() {
        let mut c = controls(ControlsConfig {
            rotate_enabled: false,
            tilt_enabled: false,
            ..no_inertia()
        });
        c.on_pointer_down(Vec2::new(640.0, 360.0), DragButton::Right, 0.0);
        c.on_pointer_move(Vec2::new(740.0, 200.0), 0.1);
        c.on_pointer_up(0.2);
        assert_eq!(c.camera().heading_deg, 0.0);
        assert_eq!(c.camera().pitch_deg, 0.0);
    }

    #[test]
    fn middle_drag_only_tilts() {
        let mut c = controls(no_inertia());
        c.on_pointer_down(Vec2::new(640.0, 360.0), DragButton::Middle, 0.0);
        c.on_pointer_move(Vec2::new(900.0, 160.0), 0.1);
        assert_close(c.camera().pitch_deg, 20.0, 1e-9);
        assert_eq!(c.camera().heading_deg, 0.0);
        assert_eq!(c.camera().target, GeoCoordinates::new(0.0, 0.0));
    }

    #[test]
    fn pinch_zooms_and_twist_rotates() {
        let mut c = controls(no_inertia());
        c.on_touch_start(&[Vec2::new(540.0, 360.0), Vec2::new(740.0, 360.0)], 0.0);
        c.on_touch_move(&[Vec2::new(440.0, 360.0), Vec2::new(840.0, 360.0)], 0.1);
        assert_close(c.camera().zoom_level, 5.0, 1e-9);
        assert_close(c.camera().heading_deg, 0.0, 1e-9);

        c.on_touch_move(&[Vec2::new(640.0, 160.0), Vec2::new(640.0, 560.0)], 0.2);
        assert_close(c.camera().heading_deg, 270.0, 1e-9);
        assert_close(c.camera().zoom_level, 5.0, 1e-9);

        c.on_touch_end(&[], 0.3);
        assert!(!c.is_interacting());
    }

    #[test]
    fn three_finger_tilt() {
        let mut c = controls(no_inertia());
        let start = [
            Vec2::new(600.0, 400.0),
            Vec2::new(640.0, 400.0),
            Vec2::new(680.0, 400.0),
        ];
        let moved = start.map(|p| Vec2::new(p.x, p.y - 100.0));
        c.on_touch_start(&start, 0.0);
        c.on_touch_move(&moved, 0.1);
        assert_close(c.camera().pitch_deg, 10.0, 1e-9);
    }

    #[test]
    fn one_finger_pan_on_globe() {
        let mut c = MapControls::new(Arc::new(SphereProjection), no_inertia());
        c.set_camera(MapCamera {
            target: GeoCoordinates::new(30.0, 10.0),
            zoom_level: 6.0,
            ..MapCamera::default()
        });
        c.on_touch_start(&[Vec2::new(640.0, 360.0)], 0.0);
        c.on_touch_move(&[Vec2::new(640.0, 460.0)], 0.05);
        c.on_touch_end(&[], 0.1);
        assert!(c.camera().target.latitude > 30.0);
        assert_close(c.camera().target.longitude, 10.0, 1e-6);
    }
}
