//! Per-light eased transitions.
//!
//! Each light advances independently through at most one transition at a
//! time. While a transition is in flight, new target colors are dropped, not
//! queued: the capture device sends frames far faster than an animation
//! completes, and interrupting mid-flight would defeat the easing. Once a
//! transition finishes the next step picks up whatever target is current.

use crate::color::{lerp_brightness, Rgb};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Time-based interpolation shape for a transition.
///
/// `FadeIn` and `FadeOut` are deliberately identical: both hold the target
/// color and ramp brightness from zero up to the target. The capture
/// protocol defines both names, and the distinction never materialized in
/// observed device behavior, so the symmetry is kept rather than guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EasingMode {
    /// Linear blend from the last-sent color/brightness to the target
    Blend,
    /// Hold target color, ramp brightness 0 -> target
    FadeIn,
    /// Hold target color, ramp brightness 0 -> target (see type docs)
    FadeOut,
    /// Fade previous state down to zero brightness, then the new target up
    FadeOutIn,
}

/// Active scene context: easing shape plus animation length.
///
/// When no scene is configured the engine bypasses transitions entirely and
/// passes targets straight through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    /// Interpolation shape applied to every new transition
    pub easing: EasingMode,
    /// Full animation duration in seconds
    pub animation_seconds: f64,
}

/// Which half of a two-phase easing is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Single-phase easing (blend, fadeIn, fadeOut)
    Single,
    /// First half of fadeOutIn: previous state down to zero brightness
    FadeDown,
    /// Second half of fadeOutIn: zero brightness up to the new target
    FadeUp,
}

/// State of one in-flight transition for a single light.
#[derive(Debug, Clone)]
pub struct TransitionState {
    start_color: Rgb,
    target_color: Rgb,
    start_brightness: u8,
    target_brightness: u8,
    started_at: Instant,
    /// Duration of the current phase (half the animation for fadeOutIn)
    duration: Duration,
    phase: Phase,
    finished: bool,
}

impl TransitionState {
    fn start(
        scene: &SceneContext,
        last_color: Rgb,
        last_brightness: u8,
        target_color: Rgb,
        target_brightness: u8,
        now: Instant,
    ) -> Self {
        let seconds = scene.animation_seconds.max(0.0);
        match scene.easing {
            EasingMode::Blend => Self {
                start_color: last_color,
                target_color,
                start_brightness: last_brightness,
                target_brightness,
                started_at: now,
                duration: Duration::from_secs_f64(seconds),
                phase: Phase::Single,
                finished: false,
            },
            // Brightness ramps from dark; the color never changes.
            EasingMode::FadeIn | EasingMode::FadeOut => Self {
                start_color: target_color,
                target_color,
                start_brightness: 0,
                target_brightness,
                started_at: now,
                duration: Duration::from_secs_f64(seconds),
                phase: Phase::Single,
                finished: false,
            },
            // Two phases of half the animation each.
            EasingMode::FadeOutIn => Self {
                start_color: last_color,
                target_color,
                start_brightness: last_brightness,
                target_brightness,
                started_at: now,
                duration: Duration::from_secs_f64(seconds / 2.0),
                phase: Phase::FadeDown,
                finished: false,
            },
        }
    }

    /// Whether the transition has reached its target.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Interpolation fraction for the current phase, clamped to `[0, 1]`.
    fn fraction(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started_at);
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn sample(&mut self, now: Instant) -> StepOutput {
        let f = self.fraction(now);
        match self.phase {
            Phase::Single => {
                if f >= 1.0 {
                    self.finished = true;
                    return StepOutput {
                        color: self.target_color,
                        brightness: self.target_brightness,
                    };
                }
                StepOutput {
                    color: self.start_color.lerp(self.target_color, f),
                    brightness: lerp_brightness(self.start_brightness, self.target_brightness, f),
                }
            }
            Phase::FadeDown => {
                if f >= 1.0 {
                    // Roll into the second half and re-evaluate from there.
                    self.phase = Phase::FadeUp;
                    self.started_at += self.duration;
                    return self.sample(now);
                }
                StepOutput {
                    color: self.start_color,
                    brightness: lerp_brightness(self.start_brightness, 0, f),
                }
            }
            Phase::FadeUp => {
                if f >= 1.0 {
                    self.finished = true;
                    return StepOutput {
                        color: self.target_color,
                        brightness: self.target_brightness,
                    };
                }
                StepOutput {
                    color: self.target_color,
                    brightness: lerp_brightness(0, self.target_brightness, f),
                }
            }
        }
    }
}

/// Per-light channel state owned by the streaming loop.
#[derive(Debug, Clone)]
pub struct LightChannelState {
    /// Last color actually produced for this light
    pub last_color: Rgb,
    /// Last brightness actually produced for this light
    pub last_brightness: u8,
    /// In-flight transition, if any
    pub transition: Option<TransitionState>,
}

impl LightChannelState {
    /// A light that has never been driven: black at zero brightness.
    pub fn new() -> Self {
        Self {
            last_color: Rgb::BLACK,
            last_brightness: 0,
            transition: None,
        }
    }
}

impl Default for LightChannelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of one engine step: what to actually send to the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutput {
    /// Color to send
    pub color: Rgb,
    /// Brightness to send, already capped
    pub brightness: u8,
}

/// Computes eased output colors per light.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    scene: Option<SceneContext>,
}

impl TransitionEngine {
    /// Build an engine; `None` means direct passthrough (plain streaming
    /// without animation).
    pub fn new(scene: Option<SceneContext>) -> Self {
        Self { scene }
    }

    /// The active scene context, if any.
    pub fn scene(&self) -> Option<SceneContext> {
        self.scene
    }

    /// Advance one light by one tick.
    ///
    /// The target brightness is clamped to `brightness_cap` here, once, at
    /// target-selection time; an already-running transition keeps the cap it
    /// started with. While a transition is unfinished the new target is
    /// ignored entirely.
    pub fn step(
        &self,
        light: &mut LightChannelState,
        target_color: Rgb,
        target_brightness: u8,
        brightness_cap: u8,
        now: Instant,
    ) -> StepOutput {
        let target_brightness = target_brightness.min(brightness_cap);

        let Some(scene) = &self.scene else {
            light.transition = None;
            light.last_color = target_color;
            light.last_brightness = target_brightness;
            return StepOutput {
                color: target_color,
                brightness: target_brightness,
            };
        };

        if let Some(transition) = &mut light.transition {
            if !transition.is_finished() {
                let out = transition.sample(now);
                light.last_color = out.color;
                light.last_brightness = out.brightness;
                return out;
            }
        }

        let mut transition = TransitionState::start(
            scene,
            light.last_color,
            light.last_brightness,
            target_color,
            target_brightness,
            now,
        );
        let out = transition.sample(now);
        light.transition = Some(transition);
        light.last_color = out.color;
        light.last_brightness = out.brightness;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb = Rgb::new(255, 255, 255);
    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn at(t0: Instant, seconds: f64) -> Instant {
        t0 + Duration::from_secs_f64(seconds)
    }

    fn engine(easing: EasingMode, seconds: f64) -> TransitionEngine {
        TransitionEngine::new(Some(SceneContext {
            easing,
            animation_seconds: seconds,
        }))
    }

    #[test]
    fn test_blend_midpoint_and_completion() {
        let engine = engine(EasingMode::Blend, 2.0);
        let mut light = LightChannelState::new();
        let t0 = Instant::now();

        // Start: black at zero brightness toward white at full.
        let out = engine.step(&mut light, WHITE, 255, 255, t0);
        assert_eq!(out.color, Rgb::BLACK);
        assert_eq!(out.brightness, 0);

        // Halfway: ~50% brightness, ~#808080.
        let out = engine.step(&mut light, WHITE, 255, 255, at(t0, 1.0));
        assert_eq!(out.color, Rgb::new(128, 128, 128));
        assert_eq!(out.brightness, 128);

        // At the full duration: exactly the target, finished.
        let out = engine.step(&mut light, WHITE, 255, 255, at(t0, 2.0));
        assert_eq!(out.color, WHITE);
        assert_eq!(out.brightness, 255);
        assert!(light.transition.as_ref().unwrap().is_finished());
    }

    #[test]
    fn test_busy_transition_drops_new_target() {
        let engine = engine(EasingMode::Blend, 2.0);
        let mut light = LightChannelState::new();
        let t0 = Instant::now();

        engine.step(&mut light, WHITE, 255, 255, t0);

        // A different target arrives mid-flight and must be ignored.
        let out = engine.step(&mut light, RED, 255, 255, at(t0, 1.5));
        assert_eq!(out.color, Rgb::new(191, 191, 191)); // still heading to white
        assert!(!light.transition.as_ref().unwrap().is_finished());

        // Finish the original transition.
        let out = engine.step(&mut light, RED, 255, 255, at(t0, 2.0));
        assert_eq!(out.color, WHITE);

        // Only now does the (stale) red target start a new transition.
        engine.step(&mut light, RED, 255, 255, at(t0, 2.5));
        let out = engine.step(&mut light, RED, 255, 255, at(t0, 4.5));
        assert_eq!(out.color, RED);
    }

    #[test]
    fn test_fade_in_holds_color_ramps_brightness() {
        let engine = engine(EasingMode::FadeIn, 2.0);
        let mut light = LightChannelState::new();
        light.last_color = RED;
        light.last_brightness = 200;
        let t0 = Instant::now();

        let out = engine.step(&mut light, BLUE, 200, 255, t0);
        assert_eq!(out.color, BLUE); // color snaps to target immediately
        assert_eq!(out.brightness, 0);

        let out = engine.step(&mut light, BLUE, 200, 255, at(t0, 1.0));
        assert_eq!(out.color, BLUE);
        assert_eq!(out.brightness, 100);
    }

    #[test]
    fn test_fade_out_matches_fade_in() {
        let t0 = Instant::now();
        for easing in [EasingMode::FadeIn, EasingMode::FadeOut] {
            let engine = engine(easing, 2.0);
            let mut light = LightChannelState::new();
            let out = engine.step(&mut light, BLUE, 200, 255, at(t0, 0.5));
            assert_eq!(out.color, BLUE);
            assert_eq!(out.brightness, 0);
        }
    }

    #[test]
    fn test_fade_out_in_phases() {
        // Red at 80 to blue at 80 over 4 seconds: two 2-second phases.
        let engine = engine(EasingMode::FadeOutIn, 4.0);
        let mut light = LightChannelState::new();
        light.last_color = RED;
        light.last_brightness = 80;
        let t0 = Instant::now();

        engine.step(&mut light, BLUE, 80, 255, t0);

        // Quarter-way: still the old color, brightness halfway down.
        let out = engine.step(&mut light, BLUE, 80, 255, at(t0, 1.0));
        assert_eq!(out.color, RED);
        assert_eq!(out.brightness, 40);

        // Midpoint: fully dark.
        let out = engine.step(&mut light, BLUE, 80, 255, at(t0, 2.0));
        assert_eq!(out.brightness, 0);

        // Three-quarter: new color, ramping back up.
        let out = engine.step(&mut light, BLUE, 80, 255, at(t0, 3.0));
        assert_eq!(out.color, BLUE);
        assert_eq!(out.brightness, 40);

        // Done: target color at target brightness.
        let out = engine.step(&mut light, BLUE, 80, 255, at(t0, 4.0));
        assert_eq!(out.color, BLUE);
        assert_eq!(out.brightness, 80);
        assert!(light.transition.as_ref().unwrap().is_finished());
    }

    #[test]
    fn test_passthrough_without_scene() {
        let engine = TransitionEngine::new(None);
        let mut light = LightChannelState::new();
        let t0 = Instant::now();

        let out = engine.step(&mut light, RED, 200, 127, t0);
        assert_eq!(out.color, RED);
        assert_eq!(out.brightness, 127); // capped immediately
        assert!(light.transition.is_none());
    }

    #[test]
    fn test_cap_applied_at_target_selection() {
        let engine = engine(EasingMode::Blend, 2.0);
        let mut light = LightChannelState::new();
        let t0 = Instant::now();

        engine.step(&mut light, WHITE, 255, 100, t0);
        // Raising the cap mid-flight does not touch the running transition.
        let out = engine.step(&mut light, WHITE, 255, 255, at(t0, 2.0));
        assert_eq!(out.brightness, 100);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let engine = engine(EasingMode::Blend, 0.0);
        let mut light = LightChannelState::new();
        let t0 = Instant::now();

        let out = engine.step(&mut light, WHITE, 255, 255, t0);
        assert_eq!(out.color, WHITE);
        assert!(light.transition.as_ref().unwrap().is_finished());
    }

    #[test]
    fn test_finished_transition_holds_target() {
        let engine = engine(EasingMode::Blend, 1.0);
        let mut light = LightChannelState::new();
        let t0 = Instant::now();

        engine.step(&mut light, RED, 255, 255, t0);
        let out = engine.step(&mut light, RED, 255, 255, at(t0, 5.0));
        assert_eq!(out.color, RED);
        assert_eq!(out.brightness, 255);
    }
}
