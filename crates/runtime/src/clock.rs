use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Most interval firings delivered for one task in a single advance. Anything
/// beyond this after a long stall is dropped rather than replayed.
const MAX_CATCH_UP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Handle to a scheduled task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TaskGuard {
    id: TaskId,
    alive: Rc<Cell<bool>>,
}

impl TaskGuard {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.alive.get()
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.alive.set(false);
    }
}

#[derive(Debug, Clone, Copy)]
enum TaskKind {
    Frame,
    Interval { period: Duration, next_due: Duration, fired: u64 },
}

#[derive(Debug)]
struct Task {
    id: TaskId,
    kind: TaskKind,
    alive: Rc<Cell<bool>>,
}

/// One callback the caller should run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Frame { task: TaskId, frame: u64, dt: Duration },
    Interval { task: TaskId, seq: u64 },
}

impl Dispatch {
    pub fn task(&self) -> TaskId {
        match self {
            Dispatch::Frame { task, .. } | Dispatch::Interval { task, .. } => *task,
        }
    }
}

/// Virtual-time scheduler for the per-refresh frame task and fixed-period
/// interval tasks, all on one logical thread.
///
/// Callers drive it with [`FrameClock::advance`] once per display refresh and
/// run the returned dispatches in order. Frame tasks always precede the
/// interval firings that became due during the same advance.
#[derive(Debug)]
pub struct FrameClock {
    now: Duration,
    frames: u64,
    next_id: u64,
    dropped: u64,
    tasks: Vec<Task>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            frames: 0,
            next_id: 0,
            dropped: 0,
            tasks: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Interval firings skipped because a stall exceeded the catch-up bound.
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped
    }

    /// Live (not yet cancelled) tasks.
    pub fn active_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.alive.get()).count()
    }

    /// Run a task once per display refresh.
    pub fn schedule_frame(&mut self) -> TaskGuard {
        self.schedule(TaskKind::Frame)
    }

    /// Run a task every `period`, first firing one period from now.
    ///
    /// # Panics
    /// Panics if `period` is zero.
    pub fn schedule_interval(&mut self, period: Duration) -> TaskGuard {
        assert!(!period.is_zero(), "interval period must be non-zero");
        self.schedule(TaskKind::Interval {
            period,
            next_due: self.now + period,
            fired: 0,
        })
    }

    fn schedule(&mut self, kind: TaskKind) -> TaskGuard {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let alive = Rc::new(Cell::new(true));
        self.tasks.push(Task {
            id,
            kind,
            alive: Rc::clone(&alive),
        });
        tracing::trace!(task = id.0, ?kind, "task scheduled");
        TaskGuard { id, alive }
    }

    /// Move virtual time forward by one display refresh of length `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<Dispatch> {
        self.tasks.retain(|t| t.alive.get());
        self.now += dt;
        self.frames += 1;

        let mut out = Vec::new();
        for task in &self.tasks {
            if let TaskKind::Frame = task.kind {
                out.push(Dispatch::Frame {
                    task: task.id,
                    frame: self.frames,
                    dt,
                });
            }
        }

        let now = self.now;
        for task in &mut self.tasks {
            let TaskKind::Interval {
                period,
                next_due,
                fired,
            } = &mut task.kind
            else {
                continue;
            };
            let mut delivered = 0;
            while *next_due <= now {
                if delivered == MAX_CATCH_UP {
                    let mut skipped = 0;
                    while *next_due <= now {
                        *next_due += *period;
                        skipped += 1;
                    }
                    self.dropped += skipped;
                    tracing::debug!(task = task.id.0, skipped, "interval fell behind, dropping ticks");
                    break;
                }
                *fired += 1;
                out.push(Dispatch::Interval {
                    task: task.id,
                    seq: *fired,
                });
                *next_due += *period;
                delivered += 1;
            }
        }
        out
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
