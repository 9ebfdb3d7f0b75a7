//! The single timeline value in `[0, 100]` and the named eras along it.
//!
//! The controller is the only writer of the value. Three sources move it:
//! explicit seeks and steps, a timed eased transition to the end, and a
//! repeating auto-advance. Subscribers receive the raw value on every change.

use std::time::Duration;

use bevy::log::debug;

use crate::catalog::TimePoint;
use crate::error::{ExplorerError, Result};
use crate::notify::{Subscribers, Subscription, SubscriptionId};
use crate::scene::Easing;

pub const TIME_MIN: f32 = 0.0;
pub const TIME_MAX: f32 = 100.0;

const STEP_EPSILON: f32 = 1e-4;
const MIN_RATE: f32 = 0.1;
const MAX_RATE: f32 = 5.0;

/// Reject empty, non-finite, out-of-range or non-ascending time points.
pub fn validate_points(points: &[TimePoint]) -> Result<()> {
    if points.is_empty() {
        return Err(ExplorerError::InvalidTimeline(
            "at least one time point is required".into(),
        ));
    }
    for point in points {
        if !point.threshold.is_finite() || !(TIME_MIN..=TIME_MAX).contains(&point.threshold) {
            return Err(ExplorerError::InvalidTimeline(format!(
                "threshold {} of '{}' is outside [0, 100]",
                point.threshold, point.label
            )));
        }
    }
    if let Some(pair) = points
        .windows(2)
        .find(|pair| pair[1].threshold <= pair[0].threshold)
    {
        return Err(ExplorerError::InvalidTimeline(format!(
            "'{}' ({}) does not come after '{}' ({})",
            pair[1].label, pair[1].threshold, pair[0].label, pair[0].threshold
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSettings {
    /// Time units added per auto-advance tick.
    pub auto_advance_step: f32,
    pub auto_advance_interval: Duration,
    /// Length of the timed transition to the end.
    pub transition: Duration,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            auto_advance_step: 0.5,
            auto_advance_interval: Duration::from_millis(100),
            transition: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f32,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug)]
pub struct TimelineController {
    points: Vec<TimePoint>,
    current: f32,
    settings: TimelineSettings,
    auto_advance: bool,
    accumulator: Duration,
    transition: Option<Transition>,
    subscribers: Subscribers<f32>,
    disposed: bool,
}

impl TimelineController {
    pub fn new(points: Vec<TimePoint>, mut settings: TimelineSettings) -> Result<Self> {
        validate_points(&points)?;
        settings.auto_advance_step = clamp_rate(settings.auto_advance_step);
        settings.auto_advance_interval = settings
            .auto_advance_interval
            .max(Duration::from_millis(1));
        Ok(Self {
            points,
            current: TIME_MIN,
            settings,
            auto_advance: false,
            accumulator: Duration::ZERO,
            transition: None,
            subscribers: Subscribers::new(),
            disposed: false,
        })
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn current_time(&self) -> f32 {
        self.current
    }

    /// Current time as a fraction of the full range.
    pub fn progress(&self) -> f32 {
        (self.current - TIME_MIN) / (TIME_MAX - TIME_MIN)
    }

    /// Last time point at or before the current time.
    pub fn current_era(&self) -> Option<&TimePoint> {
        self.points
            .iter()
            .rev()
            .find(|point| point.threshold <= self.current)
    }

    /// First time point after the current time; `None` at the end.
    pub fn next_era(&self) -> Option<&TimePoint> {
        self.points
            .iter()
            .find(|point| point.threshold > self.current)
    }

    pub fn is_auto_advancing(&self) -> bool {
        self.auto_advance
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Clamp and apply `time`, then notify every subscriber, even when the
    /// value did not change. Supersedes a running timed transition.
    /// NaN is ignored.
    pub fn seek(&mut self, time: f32) {
        if self.disposed || time.is_nan() {
            return;
        }
        self.transition = None;
        self.set(time);
    }

    /// Jump to the neighbouring time point. Returns false at either end.
    pub fn step(&mut self, direction: Direction) -> bool {
        if self.disposed {
            return false;
        }
        let current = self.current;
        let target = match direction {
            Direction::Forward => self
                .points
                .iter()
                .find(|point| point.threshold > current + STEP_EPSILON),
            Direction::Backward => self
                .points
                .iter()
                .rev()
                .find(|point| point.threshold < current - STEP_EPSILON),
        }
        .map(|point| point.threshold);

        match target {
            Some(threshold) => {
                self.seek(threshold);
                true
            }
            None => false,
        }
    }

    /// Ease from the current time to the end over `duration`.
    /// Stops auto-advance; a later seek cancels the transition.
    pub fn play_timed_transition(&mut self, duration: Duration) {
        if self.disposed {
            return;
        }
        self.auto_advance = false;
        if duration.is_zero() {
            self.seek(TIME_MAX);
            return;
        }
        debug!("timed transition from {} over {:?}", self.current, duration);
        self.transition = Some(Transition {
            from: self.current,
            elapsed: 0.0,
            duration: duration.as_secs_f32(),
        });
    }

    /// Start or stop auto-advance. Starting at the end restarts from zero.
    /// Returns whether auto-advance is now running.
    pub fn toggle_auto_advance(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        if self.auto_advance {
            self.auto_advance = false;
            return false;
        }
        self.transition = None;
        if self.current >= TIME_MAX {
            self.set(TIME_MIN);
        }
        self.auto_advance = true;
        self.accumulator = Duration::ZERO;
        true
    }

    pub fn set_auto_advance_rate(&mut self, step: f32) {
        self.settings.auto_advance_step = clamp_rate(step);
    }

    /// Stop everything and go back to the start.
    pub fn reset(&mut self) {
        self.auto_advance = false;
        self.seek(TIME_MIN);
    }

    /// Advance the running transition or auto-advance by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if self.disposed {
            return;
        }

        if let Some(mut transition) = self.transition {
            transition.elapsed += dt.as_secs_f32();
            let t = (transition.elapsed / transition.duration).min(1.0);
            if t >= 1.0 {
                self.transition = None;
                self.set(TIME_MAX);
            } else {
                self.transition = Some(transition);
                let eased = Easing::CubicInOut.apply(t);
                self.set(transition.from + (TIME_MAX - transition.from) * eased);
            }
            return;
        }

        if !self.auto_advance {
            return;
        }
        self.accumulator += dt;
        while self.auto_advance && self.accumulator >= self.settings.auto_advance_interval {
            self.accumulator -= self.settings.auto_advance_interval;
            let next = (self.current + self.settings.auto_advance_step).min(TIME_MAX);
            self.set(next);
            if next >= TIME_MAX {
                self.auto_advance = false;
                debug!("auto-advance reached the end");
            }
        }
    }

    pub fn subscribe(&mut self) -> Subscription<f32> {
        self.subscribers.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Detach subscribers and stop animations. Later calls are no-ops.
    pub fn dispose(&mut self) {
        self.auto_advance = false;
        self.transition = None;
        self.subscribers.clear();
        self.disposed = true;
    }

    fn set(&mut self, time: f32) {
        self.current = time.clamp(TIME_MIN, TIME_MAX);
        self.subscribers.notify(self.current);
    }
}

fn clamp_rate(step: f32) -> f32 {
    if step.is_nan() {
        return TimelineSettings::default().auto_advance_step;
    }
    step.clamp(MIN_RATE, MAX_RATE)
}
