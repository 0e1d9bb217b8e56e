//! Countdown timer state machine and its cancellable tick task
//!
//! The state machine is pure: `on_tick` drives it. When built with a tick
//! sender, entering `Running` spawns a tokio task that emits one [`Tick`] per
//! second, and leaving `Running` aborts it. Every (re)start bumps a
//! generation so ticks already queued by a cancelled task are ignored.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Length of one countdown cycle in seconds
pub const COUNTDOWN_SECS: u32 = 300;

/// Interval between ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Countdown phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerPhase {
    /// Not running, time at its last value
    #[default]
    Idle,
    /// Ticking
    Running,
    /// Reached zero
    Expired,
}

/// One scheduled tick, tagged with the generation that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Result of applying a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale or not running; nothing changed
    Ignored,
    /// Decremented, still running
    Counting(u32),
    /// Just reached zero
    Expired,
}

/// Countdown timer
#[derive(Debug)]
pub struct Countdown {
    remaining: u32,
    phase: TimerPhase,
    generation: u64,
    ticks: Option<UnboundedSender<Tick>>,
    task: Option<JoinHandle<()>>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    /// Manually driven countdown (no tick task)
    pub fn new() -> Self {
        Self {
            remaining: COUNTDOWN_SECS,
            phase: TimerPhase::Idle,
            generation: 0,
            ticks: None,
            task: None,
        }
    }

    /// Countdown that schedules ticks onto `ticks` while running.
    /// Must be used inside a tokio runtime.
    pub fn with_ticks(ticks: UnboundedSender<Tick>) -> Self {
        let mut countdown = Self::new();
        countdown.ticks = Some(ticks);
        countdown
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a tick task is currently scheduled
    pub fn has_pending_task(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Idle → Running. Returns false when already running or at zero.
    ///
    /// An expired countdown is not resumable: with nothing left to count it
    /// would expire again on the next tick and ring the alarm twice for one
    /// cycle. Only [`Countdown::reset`] (a new movie) leaves `Expired`.
    pub fn resume(&mut self) -> bool {
        if self.phase == TimerPhase::Running || self.remaining == 0 {
            return false;
        }
        self.enter_running();
        true
    }

    /// Running → Idle, keeping the remaining time
    pub fn pause(&mut self) -> bool {
        if self.phase != TimerPhase::Running {
            return false;
        }
        self.cancel_task();
        self.phase = TimerPhase::Idle;
        true
    }

    /// Any → Running with a full cycle
    pub fn reset(&mut self) {
        self.remaining = COUNTDOWN_SECS;
        self.enter_running();
    }

    /// Stop without changing the remaining time (shutdown)
    pub fn stop(&mut self) {
        self.cancel_task();
        if self.phase == TimerPhase::Running {
            self.phase = TimerPhase::Idle;
        }
    }

    /// Apply one tick
    pub fn on_tick(&mut self, tick: Tick) -> TickOutcome {
        if tick.generation != self.generation || self.phase != TimerPhase::Running {
            return TickOutcome::Ignored;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.cancel_task();
            self.phase = TimerPhase::Expired;
            return TickOutcome::Expired;
        }
        TickOutcome::Counting(self.remaining)
    }

    /// Tick for the current generation (manual driving)
    pub fn tick(&mut self) -> TickOutcome {
        let tick = Tick {
            generation: self.generation,
        };
        self.on_tick(tick)
    }

    fn enter_running(&mut self) {
        self.cancel_task();
        self.phase = TimerPhase::Running;
        if let Some(tx) = &self.ticks {
            self.task = Some(spawn_ticker(tx.clone(), self.generation));
        }
    }

    /// Abort the task and invalidate anything it already queued
    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn spawn_ticker(tx: UnboundedSender<Tick>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + TICK_INTERVAL;
        let mut interval = tokio::time::interval_at(start, TICK_INTERVAL);
        loop {
            interval.tick().await;
            if tx.send(Tick { generation }).is_err() {
                break;
            }
        }
    })
}
