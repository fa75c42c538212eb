use crate::target::TargetId;

/// What the viewer is looking at and how far along the dwell is.
///
/// `current` is refreshed every render frame by the raycaster. `locked`,
/// `progress` and the tick count behind it belong to the dwell controller,
/// which runs on its own interval and may see a `current` that is a few
/// frames old. Mutators are crate-private so nothing else can write here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverState {
    current: Option<TargetId>,
    locked: Option<TargetId>,
    progress: f32,
    dwell_ticks: u32,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target under the gaze as of the last raycast.
    pub fn current_target(&self) -> Option<TargetId> {
        self.current
    }

    /// Target the dwell is accumulating on.
    pub fn locked_target(&self) -> Option<TargetId> {
        self.locked
    }

    pub fn dwell_progress(&self) -> f32 {
        self.progress
    }

    /// Consecutive controller ticks spent on the locked target.
    pub fn dwell_ticks(&self) -> u32 {
        self.dwell_ticks
    }

    pub fn is_dwelling(&self) -> bool {
        self.locked.is_some()
    }

    pub(crate) fn set_current(&mut self, target: Option<TargetId>) {
        self.current = target;
    }

    pub(crate) fn lock(&mut self, target: TargetId) {
        self.locked = Some(target);
        self.progress = 0.0;
        self.dwell_ticks = 0;
    }

    /// One more tick on the locked target. Progress is derived from the tick
    /// count so repeated float addition cannot drift below the threshold.
    pub(crate) fn advance(&mut self, step: f32, threshold: f32) {
        self.dwell_ticks += 1;
        self.progress = (self.dwell_ticks as f32 * step).min(threshold);
    }

    pub(crate) fn release(&mut self) {
        self.locked = None;
        self.progress = 0.0;
        self.dwell_ticks = 0;
    }

    /// Panics if progress exists without a lock. That state cannot come from
    /// any gaze input, so reaching it is a bug in this crate.
    pub(crate) fn assert_consistent(&self) {
        assert!(
            self.progress.is_finite() && self.progress >= 0.0,
            "dwell progress out of range: {}",
            self.progress
        );
        if self.locked.is_none() {
            assert!(
                self.progress == 0.0 && self.dwell_ticks == 0,
                "dwell progress {} without a locked target",
                self.progress
            );
        }
    }
}
