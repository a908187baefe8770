use serde::{Deserialize, Serialize};

/// Tunables of [`crate::MapControls`].
///
/// Damping durations are in seconds; `0` disables the matching inertia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub tilt_enabled: bool,
    pub rotate_enabled: bool,
    pub inertia_enabled: bool,
    pub min_zoom_level: f64,
    pub max_zoom_level: f64,
    pub min_pitch_deg: f64,
    pub max_pitch_deg: f64,
    pub pan_inertia_damping: f64,
    pub zoom_inertia_damping: f64,
    pub rotate_inertia_damping: f64,
    pub zoom_level_delta_on_mouse_wheel: f64,
    pub zoom_level_delta_on_double_click: f64,
    pub orbit_degrees_per_pixel: f64,
    /// Zoom levels per doubling of the pinch distance.
    pub touch_zoom_factor: f64,
    pub touch_tilt_degrees_per_pixel: f64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            tilt_enabled: true,
            rotate_enabled: true,
            inertia_enabled: true,
            min_zoom_level: 0.0,
            max_zoom_level: 20.0,
            min_pitch_deg: 0.0,
            max_pitch_deg: 80.0,
            pan_inertia_damping: 0.6,
            zoom_inertia_damping: 0.6,
            rotate_inertia_damping: 0.6,
            zoom_level_delta_on_mouse_wheel: 0.2,
            zoom_level_delta_on_double_click: 1.0,
            orbit_degrees_per_pixel: 0.1,
            touch_zoom_factor: 1.0,
            touch_tilt_degrees_per_pixel: 0.1,
        }
    }
}

impl ControlsConfig {
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom_level, self.max_zoom_level.max(self.min_zoom_level))
    }

    pub fn clamp_pitch(&self, pitch_deg: f64) -> f64 {
        pitch_deg.clamp(self.min_pitch_deg, self.max_pitch_deg.max(self.min_pitch_deg))
    }
}

#[cfg(test)]
mod tests {
    use super::ControlsConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ControlsConfig =
            serde_json::from_str(r#"{ "tilt_enabled": false, "max_zoom_level": 17.5 }"#)
                .expect("parse config");
        assert!(!cfg.tilt_enabled);
        assert_eq!(cfg.max_zoom_level, 17.5);
        assert_eq!(cfg.pan_inertia_damping, ControlsConfig::default().pan_inertia_damping);
    }

    #[test]
    fn clamps() {
        let cfg = ControlsConfig::default();
        assert_eq!(cfg.clamp_zoom(25.0), 20.0);
        assert_eq!(cfg.clamp_zoom(-1.0), 0.0);
        assert_eq!(cfg.clamp_pitch(95.0), 80.0);
    }
}
