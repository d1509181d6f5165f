//! Two-generation device state and edge detection.
//!
//! A [`DigitalSnapshot`] holds the *current* and *previous* state of a dense
//! range of digital inputs (keys, mouse buttons, gamepad buttons). Pressed and
//! released edges are derived by diffing the two generations rather than by
//! listening for discrete press/release events.
//!
//! # Semantics
//! - `previous` for frame N is exactly `current` of frame N-1: [`DigitalSnapshot::advance`]
//!   copies current into previous *before* the new state is written, and is
//!   called once per frame.
//! - Identifiers never observed default to "up" in both generations, so the
//!   first frame an input is seen down registers as pressed.
//! - Out-of-range indices read as up; they are never an error.
//!
//! Axes carry magnitude only. [`normalize_axis`] maps raw `i16` readings into
//! `[-1, 1]` and [`shape_axis`] applies the deadzone curve.
//!
//! # Examples
//! ```
//! use deckinput::snapshot::DigitalSnapshot;
//!
//! let mut keys = DigitalSnapshot::<8>::new();
//! keys.refresh(|i| i == 3);
//! assert!(keys.is_pressed(3));
//! keys.refresh(|i| i == 3);
//! assert!(keys.is_down(3) && !keys.is_pressed(3));
//! keys.refresh(|_| false);
//! assert!(keys.is_released(3));
//! ```

/// Deadzone used when a binding or query does not name one.
pub const DEFAULT_DEADZONE: f32 = 0.15;

/// Largest accepted deadzone; keeps the rescale in [`shape_axis`] finite.
pub const MAX_DEADZONE: f32 = 0.95;

/// Current/previous state for `N` digital inputs.
#[derive(Clone, Debug)]
pub struct DigitalSnapshot<const N: usize> {
    current: [bool; N],
    previous: [bool; N],
}

impl<const N: usize> Default for DigitalSnapshot<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DigitalSnapshot<N> {
    pub fn new() -> Self {
        Self {
            current: [false; N],
            previous: [false; N],
        }
    }

    /// Start a new frame: previous becomes a copy of current.
    #[inline]
    pub fn advance(&mut self) {
        self.previous = self.current;
    }

    /// Write one input of the current generation. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&mut self, idx: usize, down: bool) {
        if let Some(slot) = self.current.get_mut(idx) {
            *slot = down;
        }
    }

    /// Release everything in the current generation (device went away).
    pub fn clear(&mut self) {
        self.current = [false; N];
    }

    /// Advance, then rebuild the current generation wholesale from `read`.
    pub fn refresh(&mut self, mut read: impl FnMut(usize) -> bool) {
        self.advance();
        for (idx, slot) in self.current.iter_mut().enumerate() {
            *slot = read(idx);
        }
    }

    #[inline]
    pub fn is_down(&self, idx: usize) -> bool {
        self.current.get(idx).copied().unwrap_or(false)
    }

    #[inline]
    pub fn was_down(&self, idx: usize) -> bool {
        self.previous.get(idx).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_pressed(&self, idx: usize) -> bool {
        self.is_down(idx) && !self.was_down(idx)
    }

    #[inline]
    pub fn is_released(&self, idx: usize) -> bool {
        !self.is_down(idx) && self.was_down(idx)
    }

    pub fn current(&self) -> &[bool; N] {
        &self.current
    }

    pub fn previous(&self) -> &[bool; N] {
        &self.previous
    }
}

/// Normalize a signed 16-bit axis reading into `[-1, 1]`.
#[inline]
pub fn normalize_axis(raw: i16) -> f32 {
    if raw >= 0 {
        raw as f32 / 32767.0
    } else {
        raw as f32 / 32768.0
    }
}

/// Clamp a requested deadzone into `[0, MAX_DEADZONE]`; non-finite input falls back to the default.
pub fn clamp_deadzone(deadzone: f32) -> f32 {
    if deadzone.is_finite() {
        deadzone.clamp(0.0, MAX_DEADZONE)
    } else {
        DEFAULT_DEADZONE
    }
}

/// `sign(v) * max(0, |v| - dz) / (1 - dz)`.
///
/// Zero inside the deadzone, continuous at its edge, and rescaled so that the
/// remaining travel covers the full unit range.
pub fn shape_axis(value: f32, deadzone: f32) -> f32 {
    let dz = clamp_deadzone(deadzone);
    let v = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
    let magnitude = ((v.abs() - dz).max(0.0) / (1.0 - dz)).min(1.0);
    if magnitude == 0.0 {
        0.0
    } else {
        magnitude.copysign(v)
    }
}
