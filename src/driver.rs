//! Animation Driver: the cooperative single-threaded preview loop.
//!
//! The driver owns the current render configuration and a `TickScheduler`
//! that stands in for the host's refresh callback. Each tick computes elapsed
//! time from the injected clock, invokes the Frame Composer, then yields back
//! to the scheduler. Stopping only prevents the next tick from being
//! scheduled; an in-flight tick always completes.

use tiny_skia::Pixmap;

use crate::clock::Clock;
use crate::compose::compose_frame;
use crate::schema::RenderConfig;
use std::time::Duration;

/// Yields until the host's next refresh opportunity.
///
/// Returns `false` when the host has no further ticks to offer (window
/// closed, test budget exhausted), which stops the loop cooperatively.
pub trait TickScheduler {
    fn next_tick(&mut self) -> bool;
}

/// Sleeps toward fixed `1/fps` deadlines. Used for headless driving where
/// there is no compositor to pace us.
pub struct FixedCadence {
    period: Duration,
    next_deadline: Option<std::time::Instant>,
}

impl FixedCadence {
    pub fn new(fps: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
            next_deadline: None,
        }
    }
}

impl TickScheduler for FixedCadence {
    fn next_tick(&mut self) -> bool {
        let now = std::time::Instant::now();
        let deadline = match self.next_deadline {
            Some(deadline) => deadline,
            None => now + self.period,
        };
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        // Schedule from the deadline, not from wake-up, so oversleeping one
        // tick does not push every later tick.
        self.next_deadline = Some(deadline + self.period);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

/// What the tick observer wants the loop to do next. Configuration swaps are
/// applied between ticks, never mid-frame.
pub enum TickControl {
    Continue,
    Switch(RenderConfig),
    Stop,
}

pub struct AnimationDriver {
    clock: Box<dyn Clock>,
    scheduler: Box<dyn TickScheduler>,
    config: RenderConfig,
    state: DriverState,
    started_at: Option<Duration>,
}

impl AnimationDriver {
    pub fn new(
        clock: Box<dyn Clock>,
        scheduler: Box<dyn TickScheduler>,
        config: RenderConfig,
    ) -> Self {
        Self {
            clock,
            scheduler,
            config,
            state: DriverState::Stopped,
            started_at: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// Captures a fresh start time and enters `Running`. Starting while
    /// already running restarts the loop: elapsed time resets to zero
    /// relative to this call, and the previous pending tick is superseded
    /// (single-threaded, so two loops can never actually interleave).
    pub fn start(&mut self) {
        self.started_at = Some(self.clock.now());
        self.state = DriverState::Running;
    }

    /// Cancels the pending next tick. The current tick, if one is executing
    /// on this thread, has already completed by the time this can run.
    pub fn stop(&mut self) {
        self.state = DriverState::Stopped;
    }

    /// Seconds since the most recent `start()`, while running.
    pub fn elapsed_seconds(&self) -> Option<f64> {
        match (self.state, self.started_at) {
            (DriverState::Running, Some(started_at)) => {
                Some((self.clock.now().saturating_sub(started_at)).as_secs_f64())
            }
            _ => None,
        }
    }

    /// Renders one frame if running and returns the elapsed time it used.
    pub fn tick(&mut self, surface: &mut Pixmap) -> Option<f64> {
        let elapsed = self.elapsed_seconds()?;
        compose_frame(surface, elapsed, &self.config);
        Some(elapsed)
    }

    /// Runs the preview loop until the observer asks to stop or the
    /// scheduler runs out of ticks. The observer sees the surface after each
    /// frame and may swap the configuration for the next tick.
    pub fn run(
        &mut self,
        surface: &mut Pixmap,
        mut observe: impl FnMut(&mut Pixmap, f64) -> TickControl,
    ) {
        self.start();
        loop {
            let Some(elapsed) = self.tick(surface) else {
                break;
            };
            match observe(surface, elapsed) {
                TickControl::Continue => {}
                TickControl::Switch(config) => self.config = config,
                TickControl::Stop => {
                    self.stop();
                    break;
                }
            }
            if !self.scheduler.next_tick() {
                self.stop();
                break;
            }
        }
    }
}
