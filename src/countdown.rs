use std::time::Duration;

/// Identifies one scheduled countdown. A fresh id is issued on every start so a
/// signal can always be matched against the task that is currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownSignal {
    Tick { task: TaskId, remaining: u32 },
    Expired { task: TaskId },
}

#[derive(Debug, Clone)]
struct ActiveTask {
    id: TaskId,
    remaining: u32,
    carry: Duration,
}

/// Cancellable repeating countdown driven by elapsed time from the event loop.
///
/// Only one task is live at a time. Starting a task cancels the previous one and
/// a cancelled task never produces another signal.
#[derive(Debug, Clone)]
pub struct Countdown {
    unit: Duration,
    next_id: u64,
    active: Option<ActiveTask>,
}

impl Countdown {
    pub fn new(unit: Duration) -> Self {
        Self {
            unit: unit.max(Duration::from_millis(1)),
            next_id: 0,
            active: None,
        }
    }

    /// Schedules a countdown of `units` steps, replacing any running one
    pub fn start(&mut self, units: u32) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.active = Some(ActiveTask {
            id,
            remaining: units.max(1),
            carry: Duration::ZERO,
        });
        id
    }

    /// Stops the live task, returning its id if one was running
    pub fn cancel(&mut self) -> Option<TaskId> {
        self.active.take().map(|t| t.id)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.active.as_ref().map(|t| t.remaining)
    }

    /// Feeds elapsed time in and returns one `Tick` per whole unit that passed,
    /// followed by `Expired` when the count reaches zero. Expiry ends the task.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<CountdownSignal> {
        let mut signals = Vec::new();
        let Some(task) = self.active.as_mut() else {
            return signals;
        };

        task.carry += elapsed;
        while task.carry >= self.unit {
            task.carry -= self.unit;
            task.remaining -= 1;
            signals.push(CountdownSignal::Tick {
                task: task.id,
                remaining: task.remaining,
            });

            if task.remaining == 0 {
                signals.push(CountdownSignal::Expired { task: task.id });
                self.active = None;
                break;
            }
        }

        signals
    }
}
