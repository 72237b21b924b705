use tracing::{debug, info, warn};

use super::{pick, ActionContext, Profile, ProfileKind};
use crate::buttons::ButtonStateTracker;
use crate::clipboard::{Capture, CaptureStatus, PendingCapture};
use crate::config::ProfileConfig;
use crate::error::DispatchError;
use crate::event::Direction;
use crate::host::{HostStore, PropertyRef};
use crate::velocity::VelocityTracker;

/// Property the dials adjust, with its value at capture time.
///
/// A zero initial value switches the tall dial from proportional to additive
/// steps.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetProperty {
    pub property: PropertyRef,
    pub initial: f64,
}

/// Generic editing profile.
#[derive(Debug)]
pub struct BaseProfile {
    config: ProfileConfig,
    buttons: ButtonStateTracker,
    velocity: VelocityTracker,
    target: Option<TargetProperty>,
    pending: Option<PendingCapture>,
}

impl BaseProfile {
    pub fn new(config: ProfileConfig) -> Self {
        Self {
            buttons: ButtonStateTracker::new(config.press_policy()),
            config,
            velocity: VelocityTracker::new(),
            target: None,
            pending: None,
        }
    }

    pub fn buttons(&self) -> &ButtonStateTracker {
        &self.buttons
    }

    pub fn velocity(&self) -> &VelocityTracker {
        &self.velocity
    }

    pub fn target(&self) -> Option<&TargetProperty> {
        self.target.as_ref()
    }

    /// Point the dials at `target` directly, bypassing the clipboard bridge.
    pub fn set_target(&mut self, target: TargetProperty) {
        self.target = Some(target);
    }

    pub fn capture_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance to the next mode in the cycle the host accepts.
    ///
    /// Starts after the current mode (or at the head if the current mode is not
    /// in the cycle) and tries each entry at most once. Returns the mode
    /// entered, or `None` if every candidate was refused.
    fn cycle_mode(&self, host: &mut dyn HostStore) -> Option<String> {
        let cycle = &self.config.mode_cycle;
        let current = host.mode();
        let start = cycle
            .iter()
            .position(|m| *m == current)
            .map_or(0, |i| i + 1);

        for offset in 0..cycle.len() {
            let candidate = &cycle[(start + offset) % cycle.len()];
            match host.set_mode(candidate) {
                Ok(()) => {
                    debug!(from = %current, to = %candidate, "mode cycled");
                    return Some(candidate.clone());
                }
                Err(e) => debug!("skipping mode {candidate}: {e}"),
            }
        }
        None
    }

    fn toggle_mode(&self, host: &mut dyn HostStore) -> Result<(), DispatchError> {
        let [home, other] = &self.config.toggle_modes;
        let next = if host.mode() != *home { home } else { other };
        host.set_mode(next)?;
        Ok(())
    }

    fn adopt_capture(&mut self, host: &dyn HostStore, capture: Capture) {
        let property = match host.resolve_property(&capture.path) {
            Ok(property) => property,
            Err(e) => {
                warn!("captured path not usable: {e}");
                self.target = None;
                return;
            }
        };
        let initial = match capture.value {
            Some(value) => value,
            None => match host.property(&property) {
                Ok(value) => value,
                Err(e) => {
                    warn!("captured property unreadable: {e}");
                    self.target = None;
                    return;
                }
            },
        };
        info!(path = %property, initial, "dial target captured");
        self.target = Some(TargetProperty { property, initial });
    }
}

impl Profile for BaseProfile {
    fn kind(&self) -> ProfileKind {
        ProfileKind::Base
    }

    fn tall_dial(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError> {
        let Some(target) = &self.target else {
            debug!("tall dial ignored: no captured property");
            return Ok(());
        };
        let mut value = cx.host.property(&target.property)?;
        if target.initial == 0.0 {
            value += direction.factor() * pick(pressed, 0.1, 1.0);
        } else {
            value += direction.factor() * pick(pressed, 0.01, 0.1) * target.initial;
        }
        cx.host.set_property(&target.property, value)?;
        Ok(())
    }

    fn flat_wheel(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError> {
        if pressed {
            cx.host.jump_keyframe(direction.is_forward())?;
            return Ok(());
        }
        let step = self.velocity.step(cx.now, direction);
        let frame = cx.host.frame() + direction.sign() * step;
        cx.host.set_frame(frame);
        Ok(())
    }

    fn mouse_wheel(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError> {
        let Some(target) = &self.target else {
            debug!("mouse wheel ignored: no captured property");
            return Ok(());
        };
        let value = cx.host.property(&target.property)?;
        let scaled = value * (1.0 - direction.factor() * pick(pressed, 0.01, 0.1));
        cx.host.set_property(&target.property, scaled)?;
        Ok(())
    }

    fn button_press(
        &mut self,
        cx: &mut ActionContext<'_>,
        control: &str,
    ) -> Result<(), DispatchError> {
        self.buttons.press(control)?;

        if control == self.config.cycle_button {
            if self.cycle_mode(cx.host).is_none() {
                debug!("no mode in the cycle was accepted");
            }
        } else if control == self.config.toggle_button {
            self.toggle_mode(cx.host)?;
        } else if let Some(keys) = self.config.modifier_keys.get(control) {
            cx.effector.key_down(keys)?;
        } else if control == self.config.capture_button {
            cx.effector.key_chord(&self.config.capture_chord)?;
            // Replacing an outstanding request cancels it.
            self.pending = Some(cx.clipboard.request());
        }
        Ok(())
    }

    fn button_release(
        &mut self,
        cx: &mut ActionContext<'_>,
        control: &str,
    ) -> Result<(), DispatchError> {
        self.buttons.release(control)?;

        if let Some(keys) = self.config.modifier_keys.get(control) {
            cx.effector.key_up(keys)?;
        }
        Ok(())
    }

    fn button_state(&self, control: &str) -> bool {
        self.buttons.state(control)
    }

    fn poll_capture(&mut self, host: &dyn HostStore) {
        let Some(pending) = &mut self.pending else {
            return;
        };
        match pending.poll() {
            CaptureStatus::Pending => {}
            CaptureStatus::Ready(capture) => {
                self.pending = None;
                self.adopt_capture(host, capture);
            }
            CaptureStatus::Failed => {
                self.pending = None;
                debug!("clipboard capture produced nothing; keeping previous target");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::sim::{KeyCommand, RecordingEffector, SimHost};

    const PATH: &str = "objects.Cube.scale_x";

    struct Rig {
        host: SimHost,
        effector: RecordingEffector,
        profile: BaseProfile,
        capture: Option<Capture>,
    }

    impl Rig {
        fn new(host: SimHost) -> Self {
            Self {
                host,
                effector: RecordingEffector::new(),
                profile: BaseProfile::new(ProfileConfig::default()),
                capture: None,
            }
        }

        fn run<R>(
            &mut self,
            now: Instant,
            f: impl FnOnce(&mut BaseProfile, &mut ActionContext<'_>) -> R,
        ) -> R {
            let capture = self.capture.clone();
            let bridge = move || match &capture {
                Some(c) => PendingCapture::ready(c.clone()),
                None => PendingCapture::failed(),
            };
            let mut cx = ActionContext {
                host: &mut self.host,
                effector: &mut self.effector,
                clipboard: &bridge,
                now,
            };
            f(&mut self.profile, &mut cx)
        }

        fn target(&mut self, initial: f64) {
            let property = self.host.resolve_property(PATH).unwrap();
            self.profile.set_target(TargetProperty { property, initial });
        }
    }

    #[test]
    fn mouse_wheel_scales_target() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 10.0));
        rig.target(10.0);
        rig.run(Instant::now(), |p, cx| p.mouse_wheel(cx, false, Direction::Positive))
            .unwrap();
        assert!((rig.host.property_value(PATH).unwrap() - 9.0).abs() < 1e-9);

        rig.run(Instant::now(), |p, cx| p.mouse_wheel(cx, true, Direction::Negative))
            .unwrap();
        assert!((rig.host.property_value(PATH).unwrap() - 9.09).abs() < 1e-9);
    }

    #[test]
    fn tall_dial_additive_when_initial_is_zero() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 5.0));
        rig.target(0.0);
        rig.run(Instant::now(), |p, cx| p.tall_dial(cx, true, Direction::Negative))
            .unwrap();
        assert!((rig.host.property_value(PATH).unwrap() - 4.9).abs() < 1e-9);

        rig.run(Instant::now(), |p, cx| p.tall_dial(cx, false, Direction::Positive))
            .unwrap();
        assert!((rig.host.property_value(PATH).unwrap() - 5.9).abs() < 1e-9);
    }

    #[test]
    fn tall_dial_proportional_to_initial_value() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 3.0));
        rig.target(2.0);
        rig.run(Instant::now(), |p, cx| p.tall_dial(cx, false, Direction::Positive))
            .unwrap();
        assert!((rig.host.property_value(PATH).unwrap() - 3.2).abs() < 1e-9);
        rig.run(Instant::now(), |p, cx| p.tall_dial(cx, true, Direction::Negative))
            .unwrap();
        assert!((rig.host.property_value(PATH).unwrap() - 3.18).abs() < 1e-9);
    }

    #[test]
    fn dials_without_target_are_noops() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 1.0));
        rig.run(Instant::now(), |p, cx| p.tall_dial(cx, false, Direction::Positive))
            .unwrap();
        rig.run(Instant::now(), |p, cx| p.mouse_wheel(cx, false, Direction::Positive))
            .unwrap();
        assert_eq!(rig.host.property_value(PATH), Some(1.0));
    }

    #[test]
    fn flat_wheel_accelerates_frames() {
        let mut rig = Rig::new(SimHost::new());
        let t0 = Instant::now();
        rig.run(t0, |p, cx| p.flat_wheel(cx, false, Direction::Positive))
            .unwrap();
        assert_eq!(rig.host.frame(), 2);
        rig.run(t0 + Duration::from_millis(60), |p, cx| {
            p.flat_wheel(cx, false, Direction::Positive)
        })
        .unwrap();
        assert_eq!(rig.host.frame(), 9);
        rig.run(t0 + Duration::from_millis(61), |p, cx| {
            p.flat_wheel(cx, false, Direction::Negative)
        })
        .unwrap();
        assert_eq!(rig.host.frame(), 8);
    }

    #[test]
    fn held_flat_wheel_jumps_keyframes() {
        let mut rig = Rig::new(SimHost::new().with_keyframes([1, 30, 60]));
        rig.run(Instant::now(), |p, cx| p.flat_wheel(cx, true, Direction::Positive))
            .unwrap();
        assert_eq!(rig.host.frame(), 30);
        rig.run(Instant::now(), |p, cx| p.flat_wheel(cx, true, Direction::Negative))
            .unwrap();
        assert_eq!(rig.host.frame(), 1);
        // Jumping does not touch the velocity state.
        assert_eq!(rig.profile.velocity(), &VelocityTracker::new());
    }

    #[test]
    fn cycle_skips_rejected_modes() {
        let mut rig = Rig::new(SimHost::new().with_mode("SCULPT").reject_mode("POSE"));
        rig.run(Instant::now(), |p, cx| p.button_press(cx, "LogoButtonRight"))
            .unwrap();
        assert_eq!(rig.host.mode(), "SCULPT_CURVES");
        rig.run(Instant::now(), |p, cx| p.button_release(cx, "LogoButtonRight"))
            .unwrap();
        rig.run(Instant::now(), |p, cx| p.button_press(cx, "LogoButtonRight"))
            .unwrap();
        assert_eq!(rig.host.mode(), "SCULPT");
    }

    #[test]
    fn cycle_from_outside_list_starts_at_head() {
        let mut rig = Rig::new(SimHost::new());
        rig.run(Instant::now(), |p, cx| p.button_press(cx, "LogoButtonRight"))
            .unwrap();
        assert_eq!(rig.host.mode(), "SCULPT");
    }

    #[test]
    fn cycle_gives_up_silently_when_all_rejected() {
        let host = SimHost::new()
            .reject_mode("SCULPT")
            .reject_mode("POSE")
            .reject_mode("SCULPT_CURVES");
        let mut rig = Rig::new(host);
        rig.run(Instant::now(), |p, cx| p.button_press(cx, "LogoButtonRight"))
            .unwrap();
        assert_eq!(rig.host.mode(), "OBJECT");
    }

    #[test]
    fn toggle_flips_between_object_and_edit() {
        let mut rig = Rig::new(SimHost::new());
        for expected in ["EDIT", "OBJECT"] {
            rig.run(Instant::now(), |p, cx| p.button_press(cx, "LogoButtonLeft"))
                .unwrap();
            rig.run(Instant::now(), |p, cx| p.button_release(cx, "LogoButtonLeft"))
                .unwrap();
            assert_eq!(rig.host.mode(), expected);
        }
        rig.host.set_mode("SCULPT").unwrap();
        rig.run(Instant::now(), |p, cx| p.button_press(cx, "LogoButtonLeft"))
            .unwrap();
        assert_eq!(rig.host.mode(), "OBJECT");
    }

    #[test]
    fn modifier_buttons_hold_keys() {
        let mut rig = Rig::new(SimHost::new());
        rig.run(Instant::now(), |p, cx| p.button_press(cx, "SideThumb"))
            .unwrap();
        assert!(rig.profile.button_state("SideThumb"));
        rig.run(Instant::now(), |p, cx| p.button_release(cx, "SideThumb"))
            .unwrap();
        assert_eq!(
            rig.effector.commands,
            [
                KeyCommand::Down(vec!["ctrl".into()]),
                KeyCommand::Up(vec!["ctrl".into()]),
            ]
        );
    }

    #[test]
    fn release_of_unheld_button_sends_no_key_up() {
        let mut rig = Rig::new(SimHost::new());
        let err = rig
            .run(Instant::now(), |p, cx| p.button_release(cx, "LongBarButton"))
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidState { .. }));
        assert!(rig.effector.commands.is_empty());
    }

    #[test]
    fn capture_button_adopts_clipboard_path() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 4.0));
        rig.capture = Some(Capture {
            path: PATH.into(),
            value: None,
        });
        rig.run(Instant::now(), |p, cx| {
            p.button_press(cx, "BottomRightClickerLeft")
        })
        .unwrap();
        assert_eq!(
            rig.effector.commands,
            [KeyCommand::Chord("ctrl+alt+shift+c".into())]
        );
        assert!(rig.profile.capture_pending());

        rig.profile.poll_capture(&rig.host);
        let target = rig.profile.target().unwrap();
        assert_eq!(target.property.path(), PATH);
        assert_eq!(target.initial, 4.0);
        assert!(!rig.profile.capture_pending());
    }

    #[test]
    fn captured_value_line_overrides_host_read() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 4.0));
        rig.capture = Some(Capture {
            path: PATH.into(),
            value: Some(0.0),
        });
        rig.run(Instant::now(), |p, cx| {
            p.button_press(cx, "BottomRightClickerLeft")
        })
        .unwrap();
        rig.profile.poll_capture(&rig.host);
        assert_eq!(rig.profile.target().unwrap().initial, 0.0);
    }

    #[test]
    fn non_finite_value_line_falls_back_to_host_read() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 4.0));
        rig.capture = Capture::parse(&format!("{PATH}\nNaN\n"));
        rig.run(Instant::now(), |p, cx| {
            p.button_press(cx, "BottomRightClickerLeft")
        })
        .unwrap();
        rig.profile.poll_capture(&rig.host);
        assert_eq!(rig.profile.target().unwrap().initial, 4.0);

        rig.run(Instant::now(), |p, cx| p.tall_dial(cx, false, Direction::Positive))
            .unwrap();
        assert!((rig.host.property_value(PATH).unwrap() - 4.4).abs() < 1e-9);
    }

    #[test]
    fn failed_capture_keeps_previous_target() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 4.0));
        rig.target(4.0);
        rig.run(Instant::now(), |p, cx| {
            p.button_press(cx, "BottomRightClickerLeft")
        })
        .unwrap();
        rig.profile.poll_capture(&rig.host);
        assert_eq!(rig.profile.target().unwrap().property.path(), PATH);
    }

    #[test]
    fn unresolvable_capture_clears_target() {
        let mut rig = Rig::new(SimHost::new().with_property(PATH, 4.0));
        rig.target(4.0);
        rig.capture = Some(Capture {
            path: "objects.Missing.x".into(),
            value: Some(1.0),
        });
        rig.run(Instant::now(), |p, cx| {
            p.button_press(cx, "BottomRightClickerLeft")
        })
        .unwrap();
        rig.profile.poll_capture(&rig.host);
        assert!(rig.profile.target().is_none());
    }
}
