/// Fixed-timestep accumulator.
///
/// Frame time is accumulated and converted into whole simulation steps, so
/// the simulation advances by the same `step` regardless of render rate.
/// When a frame would need more than `max_substeps` steps the excess time is
/// dropped instead of carried over, which keeps a long stall from turning
/// into a spiral of catch-up steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Leftover time not yet consumed by a step.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Add `frame_dt` seconds and return how many fixed steps are due.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if self.accumulator >= self.step {
            let dropped = self.accumulator - self.accumulator % self.step;
            tracing::debug!(dropped, steps, "fixed timestep dropped excess frame time");
            self.accumulator %= self.step;
        }
        steps
    }
}
