// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth layout and easing.
//!
//! Every frame [`AnimationManager::advance_frame`] classifies each window,
//! gives it a target pose and lighting, and moves its current pose half way
//! toward the target. Floating windows are spread evenly between the
//! background plane and the foreground depth: with `n` floating windows the
//! `i`-th (bottom to top) sits at
//!
//! ```text
//!   depth − (i + 1) · (depth + foreground) / n
//! ```
//!
//! so the topmost one lands on the foreground plane. Windows further back
//! are darkened and desaturated in proportion to their depth.
//!
//! The mouse position and the foreground (camera) depth are eased by the same
//! manager; the foreground depth converges faster (`1/1.5` per frame instead
//! of `1/2`).

use kurbo::{Point, Rect};

use crate::classify::{FloatingCategory, classify};
use crate::matching::MatchRules;
use crate::transform::Transform3d;
use crate::window::{PaintAttribs, WindowId, WindowStore};

/// Divisor applied to the remaining distance each frame for window poses and
/// the mouse position.
pub const EASE_DIVISOR: f64 = 2.0;

/// Divisor applied to the remaining distance each frame for the foreground
/// depth.
pub const FOREGROUND_EASE_DIVISOR: f64 = 1.5;

/// Foreground depth change per push action.
pub const FOREGROUND_STEP: f64 = 0.02;

/// Largest foreground depth a push can reach.
pub const FOREGROUND_LIMIT: f64 = 0.18;

/// Brightness lost by the deepest window at full lighting strength.
const BRIGHTNESS_FALLOFF: f64 = 0.8;

/// Saturation lost by the deepest window at full lighting strength.
const SATURATION_FALLOFF: f64 = 0.5;

/// A window pose: rotation in degrees, translation and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationAttrs {
    /// Rotation about x, y and z, in degrees.
    pub rotation: [f64; 3],
    /// Translation. `x` and `y` are in output pixels, `z` in scene units
    /// (negative is away from the viewer).
    pub translation: [f64; 3],
    /// Uniform scale in the window plane.
    pub scale: f64,
}

impl AnimationAttrs {
    /// No rotation, no translation, unit scale.
    pub const IDENTITY: Self = Self {
        rotation: [0.0; 3],
        translation: [0.0; 3],
        scale: 1.0,
    };

    /// Moves every component half way toward `target`.
    pub fn ease_toward(&mut self, target: &Self) {
        for (c, t) in self.rotation.iter_mut().zip(target.rotation) {
            *c += (t - *c) / EASE_DIVISOR;
        }
        for (c, t) in self.translation.iter_mut().zip(target.translation) {
            *c += (t - *c) / EASE_DIVISOR;
        }
        self.scale += (target.scale - self.scale) / EASE_DIVISOR;
    }

    /// Window-space transform for a window covering `geometry`.
    ///
    /// Scales and rotates about the window center (rotation about y first,
    /// then x), then applies the translation.
    #[must_use]
    pub fn window_transform(&self, geometry: Rect) -> Transform3d {
        let center = geometry.center();
        let [tx, ty, tz] = self.translation;
        Transform3d::from_translation(center.x, center.y, 0.0)
            .scaled(self.scale, self.scale, 1.0)
            .rotated_y_degrees(self.rotation[1])
            .rotated_x_degrees(self.rotation[0])
            .translated(-center.x, -center.y, 0.0)
            .translated(tx, ty, tz)
    }
}

impl Default for AnimationAttrs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-window effect state.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowVisualState {
    /// Category from the most recent frame.
    pub category: FloatingCategory,
    /// Pose being drawn.
    pub current: AnimationAttrs,
    /// Pose being eased toward.
    pub target: AnimationAttrs,
    /// Opacity multiplier.
    pub opacity: f64,
    /// Brightness multiplier.
    pub brightness: f64,
    /// Saturation multiplier.
    pub saturation: f64,
    /// Whether the cursor is drawn right after this window.
    pub cursor_anchor: bool,
}

impl WindowVisualState {
    /// Unclassified, identity pose, unmodified color.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            category: FloatingCategory::None,
            current: AnimationAttrs::IDENTITY,
            target: AnimationAttrs::IDENTITY,
            opacity: 1.0,
            brightness: 1.0,
            saturation: 1.0,
            cursor_anchor: false,
        }
    }

    /// Multiplies the host's paint attributes by this window's multipliers.
    #[must_use]
    pub fn paint(&self, base: PaintAttribs) -> PaintAttribs {
        base.modulate(PaintAttribs {
            opacity: self.opacity,
            brightness: self.brightness,
            saturation: self.saturation,
        })
    }

    /// Scene depth the window is currently drawn at (positive is away from
    /// the viewer).
    #[must_use]
    pub fn current_depth(&self) -> f64 {
        -self.current.translation[2]
    }

    fn reset_frame_multipliers(&mut self) {
        self.opacity = 1.0;
        self.brightness = 1.0;
        self.saturation = 1.0;
        self.cursor_anchor = false;
    }
}

impl Default for WindowVisualState {
    fn default() -> Self {
        Self::new()
    }
}

/// What [`AnimationManager::advance_frame`] decided for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Number of floating windows, at least 1.
    pub floating_count: u32,
    /// Window after which the cursor is drawn.
    pub anchor: Option<WindowId>,
    /// The background window, if one was classified.
    pub background: Option<WindowId>,
}

/// Mouse and foreground-depth animation for one output, plus the per-frame
/// depth layout of its windows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationManager {
    mouse_current: Point,
    mouse_target: Point,
    foreground_current: f64,
    foreground_target: f64,
    background_depth: f64,
}

impl AnimationManager {
    /// Mouse at the origin, foreground at the screen plane.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame of classification, layout and easing.
    ///
    /// `depth` is the background plane distance and must be positive;
    /// `lighting_strength` scales how much deeper windows are darkened.
    pub fn advance_frame<R: MatchRules + ?Sized>(
        &mut self,
        windows: &mut WindowStore,
        rules: &R,
        depth: f64,
        lighting_strength: f64,
    ) -> FrameOutcome {
        self.background_depth = depth;
        self.ease_mouse_position();

        let mut floating = 0_u32;
        windows.for_each_mut(|_, record| {
            let category = classify(&record.info, rules);
            record.visual.category = category;
            if category == FloatingCategory::Window {
                floating += 1;
            }
        });
        let floating_count = floating.max(1);
        let step = (depth + self.foreground_current) / f64::from(floating_count);

        let mut index = 0_u32;
        let mut last_window = None;
        let mut background = None;
        windows.for_each_mut(|id, record| {
            let visual = &mut record.visual;
            visual.reset_frame_multipliers();
            match visual.category {
                FloatingCategory::Background => {
                    visual.target.translation[2] = -depth;
                    visual.target.rotation[1] = 0.0;
                    visual.brightness = 1.0 - BRIGHTNESS_FALLOFF * lighting_strength;
                    visual.saturation = 1.0 - SATURATION_FALLOFF * lighting_strength;
                    background = Some(id);
                }
                FloatingCategory::Dock => {
                    visual.target.translation[2] = 0.0;
                    visual.target.rotation[1] = 0.0;
                }
                FloatingCategory::Window => {
                    let window_depth = (depth - f64::from(index + 1) * step).min(depth);
                    let ratio = window_depth / depth;
                    visual.brightness =
                        (1.0 - ratio * BRIGHTNESS_FALLOFF * lighting_strength).min(1.0);
                    visual.saturation =
                        (1.0 - ratio * SATURATION_FALLOFF * lighting_strength).min(1.0);
                    visual.target.translation[2] = -window_depth;
                    visual.target.rotation[1] = 0.0;
                    last_window = Some(id);
                    index += 1;
                }
                FloatingCategory::None => {}
            }
            let target = visual.target;
            visual.current.ease_toward(&target);
        });

        let anchor = last_window.or(background);
        match anchor.and_then(|id| windows.get_mut(id)) {
            Some(record) => record.visual.cursor_anchor = true,
            None => log::warn!("no window found to anchor the cursor"),
        }

        FrameOutcome {
            floating_count,
            anchor,
            background,
        }
    }

    /// Eases the mouse half way toward its destination and the foreground
    /// depth by `1/1.5` of the remaining distance.
    pub fn ease_mouse_position(&mut self) {
        self.mouse_current += (self.mouse_target - self.mouse_current) / EASE_DIVISOR;
        self.foreground_current +=
            (self.foreground_target - self.foreground_current) / FOREGROUND_EASE_DIVISOR;
    }

    /// Moves the foreground target toward the background by one step, unless
    /// that would reach the background plane.
    pub fn push_foreground_closer(&mut self) {
        let next = self.foreground_target - FOREGROUND_STEP;
        if next > -self.background_depth {
            self.foreground_target = next;
        }
    }

    /// Moves the foreground target away from the background by one step, up
    /// to [`FOREGROUND_LIMIT`].
    pub fn push_foreground_farther(&mut self) {
        let next = self.foreground_target + FOREGROUND_STEP;
        self.foreground_target = if next < FOREGROUND_LIMIT {
            next
        } else {
            FOREGROUND_LIMIT
        };
    }

    /// Puts the foreground target back on the screen plane.
    pub fn reset_foreground_depth(&mut self) {
        self.foreground_target = 0.0;
    }

    /// Foreground depth being drawn.
    #[must_use]
    pub fn foreground_depth(&self) -> f64 {
        self.foreground_current
    }

    /// Foreground depth being eased toward.
    #[must_use]
    pub fn foreground_target(&self) -> f64 {
        self.foreground_target
    }

    /// Background depth applied by the last frame.
    #[must_use]
    pub fn background_depth(&self) -> f64 {
        self.background_depth
    }

    /// Mouse position being drawn.
    #[must_use]
    pub fn mouse_position(&self) -> Point {
        self.mouse_current
    }

    /// Sets the position the mouse eases toward.
    pub fn set_mouse_target(&mut self, target: Point) {
        self.mouse_target = target;
    }

    /// Places the mouse at `position` without easing.
    pub fn jump_mouse_to(&mut self, position: Point) {
        self.mouse_current = position;
        self.mouse_target = position;
    }
}
