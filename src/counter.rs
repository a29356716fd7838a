//! Odometer digit-rotation planning.
//!
//! The animated counter renders every decimal digit as a vertical strip of
//! glyphs (`0 1 2 … 9 0 1 …`) that scrolls upward until the final digit is in
//! view. How far each strip travels is the digit's *rotation count*: the
//! number of single-glyph steps between the resting `0` and the landing digit.
//!
//! For a target like `1234` the natural rotation count of a position is the
//! target divided by the position's place value: the thousands wheel turns
//! once, the units wheel turns 1234 times. Large targets would make the low
//! wheels blur through hundreds of cycles, so counts above a cap are folded
//! back to `floor(cap / 10) * 10 + final_digit`: the same landing digit after
//! a bounded number of full cycles.
//!
//! ```text
//! target = 1234, cap = 20
//!
//! position   full   final   rotations
//! 3 (1000)      1       1           1
//! 2 (100)      12       2          12
//! 1 (10)      123       3          23   (capped: 2 cycles + 3)
//! 0 (1)      1234       4          24   (capped: 2 cycles + 4)
//! ```
//!
//! Everything here is pure arithmetic; rendering and easing live in the web
//! layer that consumes the plan.

use serde::Serialize;
use thiserror::Error;

/// Rotation cap used by the counter component unless configured otherwise.
pub const DEFAULT_MAX_ROTATIONS: u64 = 20;

#[derive(Error, Debug, PartialEq)]
pub enum CounterError {
    #[error("Invalid counter input: {0}")]
    InvalidInput(String),
}

/// Animation plan for a single digit wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitWheel {
    /// Digit the wheel settles on (0-9).
    pub final_digit: u8,
    /// Glyph steps travelled before settling. Always `≡ final_digit (mod 10)`.
    pub rotations: u64,
}

impl DigitWheel {
    /// Glyph sequence stacked in the wheel, top to bottom.
    ///
    /// Yields `rotations + 1` glyphs so the last one is the final digit.
    /// Lazy; with a large cap one wheel can span billions of glyphs.
    pub fn strip(&self) -> impl Iterator<Item = u8> + use<> {
        (0..=self.rotations).map(|i| (i % 10) as u8)
    }

    /// Upward translation that brings the final glyph into view.
    pub fn offset(&self, glyph_height: f64) -> f64 {
        self.rotations as f64 * glyph_height
    }
}

/// Per-digit plan for one counter, most-significant digit first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationPlan {
    pub target: u64,
    pub cap: u64,
    pub wheels: Vec<DigitWheel>,
}

impl RotationPlan {
    /// Build the plan for a validated target.
    pub fn new(target: u64, cap: u64) -> Self {
        let digit_count = digit_count(target);
        let wheels = (0..digit_count)
            .rev()
            .map(|position| wheel_at(target, position, cap))
            .collect();
        Self {
            target,
            cap,
            wheels,
        }
    }

    /// Plan for a fractional target. The value is floored; NaN, infinities and
    /// negatives are rejected.
    pub fn from_float(target: f64, cap: u64) -> Result<Self, CounterError> {
        if !target.is_finite() {
            return Err(CounterError::InvalidInput(format!(
                "target must be finite, got {target}"
            )));
        }
        if target < 0.0 {
            return Err(CounterError::InvalidInput(format!(
                "target must be non-negative, got {target}"
            )));
        }
        let floored = target.floor();
        if floored >= u64::MAX as f64 {
            return Err(CounterError::InvalidInput(format!(
                "target {target} is out of range"
            )));
        }
        Ok(Self::new(floored as u64, cap))
    }

    /// The number the wheels display once settled.
    pub fn value(&self) -> u64 {
        self.wheels
            .iter()
            .fold(0, |acc, wheel| acc * 10 + u64::from(wheel.final_digit))
    }

    /// `(final_digit, rotations)` pairs in display order.
    pub fn pairs(&self) -> Vec<(u8, u64)> {
        self.wheels
            .iter()
            .map(|w| (w.final_digit, w.rotations))
            .collect()
    }
}

/// Compute the rotation plan for `target` with the given cap.
///
/// Both arguments must be non-negative.
pub fn compute_rotation_plan(
    target: i64,
    max_rotation_cap: i64,
) -> Result<RotationPlan, CounterError> {
    if target < 0 {
        return Err(CounterError::InvalidInput(format!(
            "target must be non-negative, got {target}"
        )));
    }
    if max_rotation_cap < 0 {
        return Err(CounterError::InvalidInput(format!(
            "max rotation cap must be non-negative, got {max_rotation_cap}"
        )));
    }
    Ok(RotationPlan::new(target as u64, max_rotation_cap as u64))
}

/// Plan for a target typed by a user.
///
/// Integers are taken exactly (including values above `i64::MAX`); anything
/// else that parses as a number is floored.
pub fn plan_from_input(input: &str, max_rotation_cap: i64) -> Result<RotationPlan, CounterError> {
    let input = input.trim();
    if let Ok(target) = input.parse::<i64>() {
        return compute_rotation_plan(target, max_rotation_cap);
    }
    let cap = u64::try_from(max_rotation_cap).map_err(|_| {
        CounterError::InvalidInput(format!(
            "max rotation cap must be non-negative, got {max_rotation_cap}"
        ))
    })?;
    if let Ok(target) = input.parse::<u64>() {
        return Ok(RotationPlan::new(target, cap));
    }
    let target: f64 = input
        .parse()
        .map_err(|_| CounterError::InvalidInput(format!("not a number: {input:?}")))?;
    RotationPlan::from_float(target, cap)
}

/// Number of decimal digits, with zero counting as one digit.
fn digit_count(target: u64) -> u32 {
    target.checked_ilog10().map_or(1, |log| log + 1)
}

fn wheel_at(target: u64, position: u32, cap: u64) -> DigitWheel {
    let divisor = 10u64.pow(position);
    let full_rotations = target / divisor;
    let final_digit = (full_rotations % 10) as u8;

    let rotations = if full_rotations <= cap {
        full_rotations
    } else {
        (cap / 10) * 10 + u64::from(final_digit)
    };

    DigitWheel {
        final_digit,
        rotations,
    }
}
