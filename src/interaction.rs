//! Camera / sun interaction state machine.
//!
//! [`InteractionState`] is a plain value. Every input event goes through
//! [`InteractionState::apply`], which returns the next state and whether the
//! event was consumed. Nothing here touches the window or the GPU.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::camera::{sun_direction, OrbitCamera};

/// Pointer pixels per radian of drag.
pub const DRAG_SCALE: f64 = 500.0;
/// View distance ratio applied per scroll step.
pub const ZOOM_RATIO: f64 = 1.05;
/// Exposure ratio applied per `+` / `-` key press.
pub const EXPOSURE_RATIO: f64 = 1.1;

pub const VIEW_ZENITH_RANGE: (f64, f64) = (0.0, FRAC_PI_2);
pub const SUN_ZENITH_RANGE: (f64, f64) = (0.0, PI);

pub const HELP_TEXT: &str = "\
Mouse:
  drag                    orbit the camera
  ctrl + drag             move the sun
  wheel                   zoom in / out
Keys:
  + / -                   increase / decrease exposure
  1 - 9                   predefined views
  h                       show / hide this help
  esc                     quit";

/// Everything the user can change about the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    pub view_distance_m: f64,
    pub view_zenith: f64,
    pub view_azimuth: f64,
    pub sun_zenith: f64,
    pub sun_azimuth: f64,
    pub exposure: f64,
}

impl ViewParams {
    pub const fn new(
        view_distance_m: f64,
        view_zenith: f64,
        view_azimuth: f64,
        sun_zenith: f64,
        sun_azimuth: f64,
        exposure: f64,
    ) -> Self {
        Self {
            view_distance_m,
            view_zenith,
            view_azimuth,
            sun_zenith,
            sun_azimuth,
            exposure,
        }
    }

    pub fn camera(&self) -> OrbitCamera {
        OrbitCamera::new(self.view_distance_m, self.view_zenith, self.view_azimuth)
    }

    pub fn sun_direction(&self) -> glam::DVec3 {
        sun_direction(self.sun_zenith, self.sun_azimuth)
    }

    /// View preset bound to keys `1`..=`9`.
    pub fn preset(index: u8) -> Option<Self> {
        let index = usize::from(index);
        (1..=PRESETS.len()).contains(&index).then(|| PRESETS[index - 1])
    }
}

impl Default for ViewParams {
    fn default() -> Self {
        Self::new(9000.0, 1.47, -0.1, 1.3, 2.9, 10.0)
    }
}

#[rustfmt::skip]
const PRESETS: [ViewParams; 9] = [
    ViewParams::new(9000.0,  1.47, 0.0, 1.3,    3.0,    10.0),
    ViewParams::new(9000.0,  1.47, 0.0, 1.564, -3.0,    10.0),
    ViewParams::new(7000.0,  1.57, 0.0, 1.54,  -2.96,   10.0),
    ViewParams::new(7000.0,  1.57, 0.0, 1.328, -3.044,  10.0),
    ViewParams::new(9000.0,  1.39, 0.0, 1.2,    0.7,    10.0),
    ViewParams::new(9000.0,  1.5,  0.0, 1.628,  1.05,  200.0),
    ViewParams::new(7000.0,  1.43, 0.0, 1.57,   1.34,   40.0),
    ViewParams::new(2.7e6,   0.81, 0.0, 1.57,   2.0,    10.0),
    ViewParams::new(1.2e7,   0.0,  0.0, 0.93,  -2.0,    10.0),
];

/// What a pointer drag is currently moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragTarget {
    #[default]
    Idle,
    Camera,
    Sun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Towards the origin.
    In,
    /// Away from the origin.
    Out,
}

/// Host-independent input events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64, modifier: bool },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    Scroll(ScrollDirection),
    Key(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    pub params: ViewParams,
    pub drag: DragTarget,
    pub last_pointer: (f64, f64),
    pub help_visible: bool,
}

impl InteractionState {
    pub fn new(params: ViewParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Returns the next state and whether the event was consumed.
    pub fn apply(self, event: InputEvent) -> (Self, bool) {
        let mut next = self;
        let consumed = match event {
            InputEvent::PointerDown { x, y, modifier } => {
                next.drag = if modifier {
                    DragTarget::Sun
                } else {
                    DragTarget::Camera
                };
                next.last_pointer = (x, y);
                true
            }
            InputEvent::PointerMove { x, y } => {
                let (prev_x, prev_y) = self.last_pointer;
                let dx = (prev_x - x) / DRAG_SCALE;
                let dy = (prev_y - y) / DRAG_SCALE;
                let p = &mut next.params;
                match self.drag {
                    DragTarget::Camera => {
                        p.view_zenith = clamp_range(p.view_zenith + dy, VIEW_ZENITH_RANGE);
                        p.view_azimuth += dx;
                    }
                    DragTarget::Sun => {
                        p.sun_zenith = clamp_range(p.sun_zenith - dy, SUN_ZENITH_RANGE);
                        p.sun_azimuth += dx;
                    }
                    DragTarget::Idle => {}
                }
                next.last_pointer = (x, y);
                self.drag != DragTarget::Idle
            }
            InputEvent::PointerUp => {
                next.drag = DragTarget::Idle;
                true
            }
            InputEvent::Scroll(direction) => {
                next.params.view_distance_m = match direction {
                    ScrollDirection::Out => self.params.view_distance_m * ZOOM_RATIO,
                    ScrollDirection::In => self.params.view_distance_m / ZOOM_RATIO,
                };
                true
            }
            InputEvent::Key(key) => next.apply_key(key),
        };

        if next.params != self.params {
            log::debug!("view params: {:?}", next.params);
        }
        (next, consumed)
    }

    fn apply_key(&mut self, key: char) -> bool {
        match key {
            '+' => self.params.exposure *= EXPOSURE_RATIO,
            '-' => self.params.exposure /= EXPOSURE_RATIO,
            'h' => self.help_visible = !self.help_visible,
            '1'..='9' => {
                let Some(preset) = key
                    .to_digit(10)
                    .and_then(|d| ViewParams::preset(d as u8))
                else {
                    return false;
                };
                self.params = preset;
            }
            _ => return false,
        }
        true
    }
}

fn clamp_range(value: f64, (min, max): (f64, f64)) -> f64 {
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn drag(state: InteractionState, modifier: bool, from: (f64, f64), to: (f64, f64)) -> InteractionState {
        let (s, _) = state.apply(InputEvent::PointerDown {
            x: from.0,
            y: from.1,
            modifier,
        });
        let (s, _) = s.apply(InputEvent::PointerMove { x: to.0, y: to.1 });
        let (s, _) = s.apply(InputEvent::PointerUp);
        s
    }

    #[test]
    fn drag_state_transitions() {
        let s = InteractionState::default();
        assert_eq!(s.drag, DragTarget::Idle);

        let (s, consumed) = s.apply(InputEvent::PointerDown {
            x: 10.0,
            y: 20.0,
            modifier: false,
        });
        assert!(consumed);
        assert_eq!(s.drag, DragTarget::Camera);
        assert_eq!(s.last_pointer, (10.0, 20.0));

        let (s, _) = s.apply(InputEvent::PointerMove { x: 15.0, y: 25.0 });
        assert_eq!(s.drag, DragTarget::Camera);

        let (s, _) = s.apply(InputEvent::PointerUp);
        assert_eq!(s.drag, DragTarget::Idle);

        let (s, _) = s.apply(InputEvent::PointerDown {
            x: 0.0,
            y: 0.0,
            modifier: true,
        });
        assert_eq!(s.drag, DragTarget::Sun);
        let (s, _) = s.apply(InputEvent::PointerUp);
        assert_eq!(s.drag, DragTarget::Idle);
    }

    #[test]
    fn camera_drag_moves_view_angles_only() {
        let start = InteractionState::new(ViewParams::default());
        let s = drag(start, false, (100.0, 100.0), (50.0, 150.0));

        // dx = (100 - 50) / 500, dy = (100 - 150) / 500
        assert_relative_eq!(s.params.view_azimuth, -0.1 + 0.1, epsilon = 1e-12);
        assert_relative_eq!(s.params.view_zenith, 1.47 - 0.1, epsilon = 1e-12);
        assert_eq!(s.params.sun_zenith, start.params.sun_zenith);
        assert_eq!(s.params.sun_azimuth, start.params.sun_azimuth);
    }

    #[test]
    fn sun_drag_moves_sun_angles_only() {
        let start = InteractionState::new(ViewParams::default());
        let s = drag(start, true, (100.0, 100.0), (150.0, 50.0));

        // dx = -50 / 500, dy = 50 / 500; sun zenith moves opposite to dy
        assert_relative_eq!(s.params.sun_azimuth, 2.9 - 0.1, epsilon = 1e-12);
        assert_relative_eq!(s.params.sun_zenith, 1.3 - 0.1, epsilon = 1e-12);
        assert_eq!(s.params.view_zenith, start.params.view_zenith);
        assert_eq!(s.params.view_azimuth, start.params.view_azimuth);
    }

    #[test]
    fn idle_move_only_tracks_pointer() {
        let start = InteractionState::new(ViewParams::default());
        let (s, consumed) = start.apply(InputEvent::PointerMove { x: 400.0, y: -300.0 });
        assert!(!consumed);
        assert_eq!(s.params, start.params);
        assert_eq!(s.last_pointer, (400.0, -300.0));
    }

    #[test]
    fn zenith_stays_clamped_for_huge_deltas() {
        let mut s = InteractionState::new(ViewParams::default());
        for &(modifier, dy) in &[
            (false, 1e9),
            (false, -1e9),
            (true, 1e9),
            (true, -1e9),
            (false, 5000.0),
            (true, -5000.0),
        ] {
            s = drag(s, modifier, (0.0, 0.0), (0.0, dy));
            assert!((0.0..=FRAC_PI_2).contains(&s.params.view_zenith));
            assert!((0.0..=PI).contains(&s.params.sun_zenith));
        }

        let s = drag(InteractionState::default(), false, (0.0, 0.0), (0.0, -1e6));
        assert_eq!(s.params.view_zenith, FRAC_PI_2);
        let s = drag(InteractionState::default(), true, (0.0, 0.0), (0.0, -1e6));
        assert_eq!(s.params.sun_zenith, 0.0);
        let s = drag(InteractionState::default(), true, (0.0, 0.0), (0.0, 1e6));
        assert_eq!(s.params.sun_zenith, PI);
    }

    #[test]
    fn scroll_is_geometric() {
        let start = InteractionState::default();
        let d0 = start.params.view_distance_m;

        let mut s = start;
        for n in 1..=20 {
            let (next, consumed) = s.apply(InputEvent::Scroll(ScrollDirection::Out));
            assert!(consumed);
            s = next;
            assert_relative_eq!(
                s.params.view_distance_m,
                d0 * 1.05f64.powi(n),
                max_relative = 1e-12
            );
        }

        let mut s = start;
        for n in 1..=20 {
            s = s.apply(InputEvent::Scroll(ScrollDirection::In)).0;
            assert_relative_eq!(
                s.params.view_distance_m,
                d0 * (1.0 / 1.05f64).powi(n),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn preset_one_is_exact() {
        let (s, consumed) = InteractionState::default().apply(InputEvent::Key('1'));
        assert!(consumed);
        assert_eq!(s.params.view_distance_m, 9000.0);
        assert_eq!(s.params.view_zenith, 1.47);
        assert_eq!(s.params.view_azimuth, 0.0);
        assert_eq!(s.params.sun_zenith, 1.3);
        assert_eq!(s.params.sun_azimuth, 3.0);
        assert_eq!(s.params.exposure, 10.0);
    }

    #[test]
    fn every_digit_has_a_preset() {
        for key in '1'..='9' {
            let (s, consumed) = InteractionState::default().apply(InputEvent::Key(key));
            assert!(consumed, "key {key}");
            let index = key.to_digit(10).unwrap() as u8;
            assert_eq!(Some(s.params), ViewParams::preset(index));
        }
        assert_eq!(ViewParams::preset(0), None);
        assert_eq!(ViewParams::preset(10), None);
        assert_eq!(ViewParams::preset(9).unwrap().view_distance_m, 1.2e7);
    }

    #[test]
    fn exposure_keys() {
        let s = InteractionState::default();
        let (up, _) = s.apply(InputEvent::Key('+'));
        assert_relative_eq!(up.params.exposure, 11.0, epsilon = 1e-12);
        let (back, _) = up.apply(InputEvent::Key('-'));
        assert_relative_eq!(back.params.exposure, 10.0, epsilon = 1e-12);
        assert_eq!(back.params.view_distance_m, s.params.view_distance_m);
    }

    #[test]
    fn help_toggles_and_unknown_keys_pass_through() {
        let s = InteractionState::default();
        assert!(!s.help_visible);
        let (s, consumed) = s.apply(InputEvent::Key('h'));
        assert!(consumed && s.help_visible);
        let (s, _) = s.apply(InputEvent::Key('h'));
        assert!(!s.help_visible);

        let (after, consumed) = s.apply(InputEvent::Key('q'));
        assert!(!consumed);
        assert_eq!(after, s);
    }

    #[test]
    fn derived_camera_follows_distance() {
        let s = InteractionState::default();
        let (s, _) = s.apply(InputEvent::Scroll(ScrollDirection::Out));
        let cam = s.params.camera();
        assert_relative_eq!(cam.position().length(), 9000.0 * 1.05, max_relative = 1e-12);
    }
}
