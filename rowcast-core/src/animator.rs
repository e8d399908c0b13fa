//! Time-based scroll tweens.
//!
//! One channel for the global vertical offset and one per category for
//! horizontal offsets. Starting a tween on a busy channel replaces the
//! running one; nothing is queued. Time is passed in by the caller so
//! ticking is deterministic.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Easing curves used by scroll animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Short corrective nudges.
    EaseOutQuad,
    /// Navigation scrolls.
    #[default]
    EaseOutCubic,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Which offset a tween drives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Vertical,
    Horizontal(String),
}

/// Work to run once a tween lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleAction {
    /// Recompute visibility and reload around the focused item.
    EnsureFocusVisible,
    /// Like `EnsureFocusVisible`, then check that the focused last row is
    /// fully on screen and nudge if not.
    LastRowCorrective,
}

#[derive(Debug, Clone)]
struct Tween {
    start: f32,
    target: f32,
    started_at: Instant,
    duration: Duration,
    easing: Easing,
    settle: Option<SettleAction>,
}

impl Tween {
    /// Offset at `now` and whether the tween is done.
    fn sample(&self, now: Instant) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.started_at);
        if self.duration.is_zero() || elapsed >= self.duration {
            return (self.target, true);
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        let eased = self.easing.apply(t);
        (self.start + (self.target - self.start) * eased, false)
    }
}

/// Parameters of a new tween.
#[derive(Debug, Clone, Copy)]
pub struct TweenSpec {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
    pub easing: Easing,
    pub settle: Option<SettleAction>,
}

/// One channel's output for a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub channel: Channel,
    pub offset: f32,
    pub finished: bool,
    /// Set on the final frame of a tween that carries a settle action.
    pub settle: Option<SettleAction>,
}

/// Per-channel tween driver.
#[derive(Debug, Default)]
pub struct ScrollAnimator {
    vertical: Option<Tween>,
    horizontal: HashMap<String, Tween>,
}

impl ScrollAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween on `channel`. Returns `true` if a running tween was
    /// cancelled to make room.
    pub fn start(&mut self, channel: Channel, spec: TweenSpec, now: Instant) -> bool {
        let tween = Tween {
            start: spec.from,
            target: spec.to,
            started_at: now,
            duration: spec.duration,
            easing: spec.easing,
            settle: spec.settle,
        };
        let replaced = match channel {
            Channel::Vertical => self.vertical.replace(tween).is_some(),
            Channel::Horizontal(category) => {
                self.horizontal.insert(category, tween).is_some()
            }
        };
        if replaced {
            log::trace!("Scroll animation restarted before completion");
        }
        replaced
    }

    pub fn is_active(&self) -> bool {
        self.vertical.is_some() || !self.horizontal.is_empty()
    }

    /// Final offset the channel is heading to.
    pub fn target(&self, channel: &Channel) -> Option<f32> {
        match channel {
            Channel::Vertical => self.vertical.as_ref().map(|t| t.target),
            Channel::Horizontal(category) => {
                self.horizontal.get(category).map(|t| t.target)
            }
        }
    }

    /// Cancel one channel without settling it.
    pub fn cancel(&mut self, channel: &Channel) -> bool {
        match channel {
            Channel::Vertical => self.vertical.take().is_some(),
            Channel::Horizontal(category) => self.horizontal.remove(category).is_some(),
        }
    }

    /// Drop every tween without settling. Returns how many were running.
    pub fn stop_all(&mut self) -> usize {
        let count = usize::from(self.vertical.is_some()) + self.horizontal.len();
        self.vertical = None;
        self.horizontal.clear();
        count
    }

    /// Advance every channel to `now`. Finished tweens are removed and
    /// report their settle action. Vertical comes first, then categories in
    /// name order.
    pub fn tick(&mut self, now: Instant) -> Vec<AnimationFrame> {
        let mut frames = Vec::new();

        if let Some(tween) = &self.vertical {
            let (offset, finished) = tween.sample(now);
            frames.push(AnimationFrame {
                channel: Channel::Vertical,
                offset,
                finished,
                settle: if finished { tween.settle } else { None },
            });
            if finished {
                self.vertical = None;
            }
        }

        let ordered: BTreeMap<&String, &Tween> = self.horizontal.iter().collect();
        let mut done = Vec::new();
        for (category, tween) in ordered {
            let (offset, finished) = tween.sample(now);
            frames.push(AnimationFrame {
                channel: Channel::Horizontal(category.clone()),
                offset,
                finished,
                settle: if finished { tween.settle } else { None },
            });
            if finished {
                done.push(category.clone());
            }
        }
        for category in done {
            self.horizontal.remove(&category);
        }

        frames
    }
}
