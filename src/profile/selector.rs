use tracing::debug;

use super::{BaseProfile, BrushProfile, Profile, ProfileKind};
use crate::config::{BrushConfig, ProfileConfig};
use crate::host::HostStore;

/// Owns both profiles for the life of the process and picks one per event.
#[derive(Debug)]
pub struct ProfileSelector {
    base: BaseProfile,
    brush: BrushProfile,
    active: ProfileKind,
}

impl ProfileSelector {
    pub fn new(profile: ProfileConfig, brush: BrushConfig) -> Self {
        Self {
            base: BaseProfile::new(profile.clone()),
            brush: BrushProfile::new(profile, brush),
            active: ProfileKind::Base,
        }
    }

    /// Choose the profile for the host's current context.
    ///
    /// The brush profile wins whenever the host exposes a brush; its handle is
    /// refreshed to that brush on every call.
    pub fn select(&mut self, host: &dyn HostStore) -> &mut dyn Profile {
        let kind = match host.active_brush() {
            Some(brush) => {
                self.brush.bind(brush);
                ProfileKind::Brush
            }
            None => ProfileKind::Base,
        };
        if kind != self.active {
            debug!(from = %self.active, to = %kind, "profile switched");
            self.active = kind;
        }
        match kind {
            ProfileKind::Base => &mut self.base,
            ProfileKind::Brush => &mut self.brush,
        }
    }

    /// Profile chosen by the most recent [`select`](Self::select).
    pub fn active(&self) -> ProfileKind {
        self.active
    }

    /// Let both profiles adopt finished clipboard captures.
    pub fn poll_captures(&mut self, host: &dyn HostStore) {
        self.base.poll_capture(host);
        self.brush.poll_capture(host);
    }

    pub fn base(&self) -> &BaseProfile {
        &self.base
    }

    pub fn brush(&self) -> &BrushProfile {
        &self.brush
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::clipboard::PendingCapture;
    use crate::error::DispatchError;
    use crate::event::Direction;
    use crate::host::BrushRef;
    use crate::profile::ActionContext;
    use crate::sim::{BrushSettings, RecordingEffector, SimHost};

    fn selector() -> ProfileSelector {
        ProfileSelector::new(ProfileConfig::default(), BrushConfig::default())
    }

    #[test]
    fn picks_brush_profile_only_with_active_brush() {
        let mut selector = selector();
        let mut host = SimHost::new().with_brush("Draw", BrushSettings::default());

        assert_eq!(selector.select(&host).kind(), ProfileKind::Base);
        host.set_mode("SCULPT").unwrap();
        assert_eq!(selector.select(&host).kind(), ProfileKind::Brush);
        assert_eq!(selector.active(), ProfileKind::Brush);
        assert_eq!(selector.brush().brush(), Some(&BrushRef("Draw".into())));
    }

    #[test]
    fn switching_leaves_each_profiles_state_alone() {
        let mut selector = selector();
        let mut host = SimHost::new().with_brush("Draw", BrushSettings::default());
        let mut effector = RecordingEffector::new();
        let bridge = PendingCapture::failed;
        let t0 = Instant::now();

        // Base profile: hold a modifier and scroll the timeline once.
        {
            let profile = selector.select(&host);
            let mut cx = ActionContext {
                host: &mut host,
                effector: &mut effector,
                clipboard: &bridge,
                now: t0,
            };
            profile.button_press(&mut cx, "LongBarButton").unwrap();
            profile.flat_wheel(&mut cx, false, Direction::Positive).unwrap();
        }
        let base_buttons = selector.base().buttons().clone();
        let base_velocity = selector.base().velocity().clone();
        let brush_buttons = selector.brush().base().buttons().clone();

        // Enter a paint mode and back out again.
        host.set_mode("SCULPT").unwrap();
        assert_eq!(selector.select(&host).kind(), ProfileKind::Brush);
        assert!(!selector.select(&host).button_state("LongBarButton"));
        host.set_mode("OBJECT").unwrap();
        assert_eq!(selector.select(&host).kind(), ProfileKind::Base);

        assert_eq!(selector.base().buttons(), &base_buttons);
        assert_eq!(selector.base().velocity(), &base_velocity);
        assert_eq!(selector.brush().base().buttons(), &brush_buttons);
        assert!(selector.select(&host).button_state("LongBarButton"));
    }

    #[test]
    fn release_under_other_profile_is_invalid_state() {
        // Held-button state does not follow a profile switch.
        let mut selector = selector();
        let mut host = SimHost::new().with_brush("Draw", BrushSettings::default());
        let mut effector = RecordingEffector::new();
        let bridge = PendingCapture::failed;
        let t0 = Instant::now();

        {
            let profile = selector.select(&host);
            let mut cx = ActionContext {
                host: &mut host,
                effector: &mut effector,
                clipboard: &bridge,
                now: t0,
            };
            profile.button_press(&mut cx, "DpadUp").unwrap();
        }
        host.set_mode("SCULPT").unwrap();
        let profile = selector.select(&host);
        let mut cx = ActionContext {
            host: &mut host,
            effector: &mut effector,
            clipboard: &bridge,
            now: t0 + Duration::from_millis(10),
        };
        let err = profile.button_release(&mut cx, "DpadUp").unwrap_err();
        assert!(matches!(err, DispatchError::InvalidState { .. }));
    }
}
