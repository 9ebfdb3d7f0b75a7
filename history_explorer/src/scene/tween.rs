//! Per-property animation slots.
//!
//! An [`Animated`] value owns at most one running animation. Starting a new
//! one replaces whatever was in flight, and a finished animation lands on its
//! target exactly.

use std::collections::VecDeque;

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadOut,
    QuadInOut,
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

pub trait Lerp: Copy {
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// One leg of an animation: wait `delay` seconds, then ease to `target`
/// over `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<T> {
    pub target: T,
    pub delay: f32,
    pub duration: f32,
    pub easing: Easing,
}

impl<T> Segment<T> {
    pub fn new(target: T, duration: f32, easing: Easing) -> Self {
        Self {
            target,
            delay: 0.0,
            duration,
            easing,
        }
    }

    pub fn after(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
struct Running<T> {
    from: T,
    elapsed: f32,
    segments: VecDeque<Segment<T>>,
}

#[derive(Debug, Clone)]
pub struct Animated<T> {
    value: T,
    running: Option<Running<T>>,
}

impl<T: Lerp> Animated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            running: None,
        }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.running.is_some()
    }

    /// Where the value will settle once the running animation finishes.
    pub fn target(&self) -> T {
        self.running
            .as_ref()
            .and_then(|run| run.segments.back())
            .map_or(self.value, |segment| segment.target)
    }

    pub fn animate(&mut self, target: T, duration: f32, easing: Easing) {
        self.sequence([Segment::new(target, duration, easing)]);
    }

    /// Replace any running animation with a chain of segments played in order.
    pub fn sequence(&mut self, segments: impl IntoIterator<Item = Segment<T>>) {
        let segments: VecDeque<_> = segments.into_iter().collect();
        self.running = (!segments.is_empty()).then(|| Running {
            from: self.value,
            elapsed: 0.0,
            segments,
        });
    }

    /// Jump straight to `value`, dropping any running animation.
    pub fn snap(&mut self, value: T) {
        self.running = None;
        self.value = value;
    }

    /// Stop where the value currently is.
    pub fn cancel(&mut self) {
        self.running = None;
    }

    /// Advance by `dt` seconds. Returns true while the value may have moved.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(mut run) = self.running.take() else {
            return false;
        };

        let mut budget = dt.max(0.0);
        while let Some(&segment) = run.segments.front() {
            let span = segment.delay + segment.duration;
            let reached = run.elapsed + budget;
            if reached >= span {
                self.value = segment.target;
                budget = reached - span;
                run.from = segment.target;
                run.elapsed = 0.0;
                run.segments.pop_front();
                continue;
            }

            run.elapsed = reached;
            if run.elapsed > segment.delay {
                let t = (run.elapsed - segment.delay) / segment.duration;
                self.value = run.from.lerp_to(segment.target, segment.easing.apply(t));
            }
            self.running = Some(run);
            return true;
        }
        true
    }
}
