//! Deterministic PRNG based on Marsaglia's xorshift128.
//!
//! Every sketch owns its generator outright: there is no ambient global
//! randomness anywhere in the core. Same seed and same call order always
//! produce the same sequence on every platform, because the core algorithm
//! is pure 32-bit integer arithmetic.
//!
//! Every derived helper consumes a fixed, documented number of
//! [`Xorshift128::next_u32`] draws so that adding a `pick` in one place
//! shifts the rest of the sequence predictably.

use serde::{Deserialize, Serialize};

use crate::config::SeedValue;
use crate::error::EngineError;

/// 2^32 as f64, the divisor mapping a 32-bit draw onto [0, 1).
const U32_RANGE: f64 = 4_294_967_296.0;

/// xorshift128 PRNG with four 32-bit state words.
///
/// Recurrence (Marsaglia 2003, shifts 11/19/8):
///
/// ```text
/// t = x ^ (x << 11)
/// x, y, z = y, z, w
/// w = w ^ (w >> 19) ^ t ^ (t >> 8)
/// ```
///
/// The all-zero state is a fixed point and is remapped to
/// [`Xorshift128::FALLBACK_STATE`] whenever seeding would produce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct Xorshift128 {
    state: [u32; 4],
}

impl Xorshift128 {
    /// State used in place of the forbidden all-zero state.
    pub const FALLBACK_STATE: [u32; 4] = [0x5EED_DEAD, 0xBEEF_CAFE, 0x1234_5678, 0x9ABC_DEF0];

    /// Creates a generator by expanding `seed` through splitmix64.
    ///
    /// Two splitmix64 outputs provide the low and high halves of the four
    /// state words, so nearby seeds still start from well-mixed states.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let a = splitmix64(&mut sm);
        let b = splitmix64(&mut sm);
        Self::from_state([a as u32, (a >> 32) as u32, b as u32, (b >> 32) as u32])
    }

    /// Creates a generator from explicit state words.
    ///
    /// An all-zero `state` is remapped to [`Self::FALLBACK_STATE`].
    pub fn from_state(state: [u32; 4]) -> Self {
        match check_state(state) {
            Ok(state) => Self { state },
            Err(_) => {
                tracing::debug!("all-zero xorshift128 state remapped to fallback");
                Self {
                    state: Self::FALLBACK_STATE,
                }
            }
        }
    }

    /// Creates a generator from a numeric or textual seed.
    ///
    /// Text seeds are reduced with [`hash_text`] first.
    pub fn from_seed(seed: &SeedValue) -> Self {
        match seed {
            SeedValue::Number(n) => Self::new(*n),
            SeedValue::Text(s) => Self::new(u64::from(hash_text(s))),
        }
    }

    /// Current state words, for snapshots and diagnostics.
    pub fn state(&self) -> [u32; 4] {
        self.state
    }

    /// Advances the state and returns the next 32-bit draw.
    pub fn next_u32(&mut self) -> u32 {
        let [x, y, z, w] = self.state;
        let t = x ^ (x << 11);
        let next = w ^ (w >> 19) ^ t ^ (t >> 8);
        self.state = [y, z, w, next];
        next
    }

    /// Returns a uniformly distributed f64 in [0, 1). One draw.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / U32_RANGE
    }

    /// Returns a uniformly distributed f64 in `[min, max)`. One draw.
    ///
    /// `min == max` returns `min`. Returns `EngineError::EmptyInput` when
    /// `min > max` or either bound is not finite.
    pub fn uniform(&mut self, min: f64, max: f64) -> Result<f64, EngineError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(EngineError::EmptyInput(format!(
                "uniform range [{min}, {max}) is empty"
            )));
        }
        let u = self.next_f64();
        let span = max - min;
        let v = if span.is_finite() {
            min + u * span
        } else {
            // span overflows f64; scale each bound separately
            (min + u * max) - u * min
        };
        // rounding can land exactly on `max` for wide ranges
        Ok(if v < max { v } else { min })
    }

    /// Returns a uniformly distributed integer in `[min, max]`, both bounds
    /// inclusive. One draw.
    ///
    /// Returns `EngineError::EmptyInput` when `min > max`.
    pub fn uniform_int(&mut self, min: i64, max: i64) -> Result<i64, EngineError> {
        if min > max {
            return Err(EngineError::EmptyInput(format!(
                "integer range [{min}, {max}] is empty"
            )));
        }
        let span = i128::from(max) - i128::from(min) + 1;
        let k = (self.next_f64() * span as f64).floor() as i128;
        let k = k.clamp(0, span - 1);
        Ok((i128::from(min) + k) as i64)
    }

    /// Returns a value in `[center - half_width, center + half_width)`. One draw.
    ///
    /// Returns `EngineError::EmptyInput` for a negative or non-finite
    /// `half_width`.
    pub fn interval(&mut self, center: f64, half_width: f64) -> Result<f64, EngineError> {
        if !(half_width >= 0.0) {
            return Err(EngineError::EmptyInput(format!(
                "interval half width {half_width} is negative"
            )));
        }
        self.uniform(center - half_width, center + half_width)
    }

    /// Returns `true` with probability `p`, clamped to [0, 1]. One draw.
    pub fn boolean(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Fair coin flip. One draw.
    pub fn coin(&mut self) -> bool {
        self.boolean(0.5)
    }

    /// Returns a uniformly chosen element. One draw.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, EngineError> {
        if items.is_empty() {
            return Err(EngineError::EmptyInput("pick from empty slice".into()));
        }
        let idx = self.index_below(items.len());
        Ok(&items[idx])
    }

    /// Returns an element chosen with probability proportional to its
    /// weight. One draw.
    ///
    /// Returns `EngineError::EmptyInput` if `items` is empty, the lengths
    /// differ, any weight is negative or the total weight is not positive.
    pub fn pick_weighted<'a, T>(
        &mut self,
        items: &'a [T],
        weights: &[f64],
    ) -> Result<&'a T, EngineError> {
        if items.is_empty() || items.len() != weights.len() {
            return Err(EngineError::EmptyInput(format!(
                "weighted pick over {} items with {} weights",
                items.len(),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !(*w >= 0.0) || !w.is_finite()) {
            return Err(EngineError::EmptyInput(
                "weights must be finite and non-negative".into(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if !(total > 0.0) {
            return Err(EngineError::EmptyInput("total weight is zero".into()));
        }

        let target = self.next_f64() * total;
        let mut cumulative = 0.0;
        let mut last_positive = 0;
        for (i, w) in weights.iter().enumerate() {
            if *w > 0.0 {
                last_positive = i;
            }
            cumulative += w;
            if target < cumulative {
                return Ok(&items[i]);
            }
        }
        Ok(&items[last_positive])
    }

    /// Shuffles `items` in place with Fisher–Yates.
    ///
    /// Consumes exactly `items.len() - 1` draws (none for zero or one item).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index_below(i + 1);
            items.swap(i, j);
        }
    }

    /// Returns a shuffled copy of `items`, leaving the input untouched.
    pub fn shuffled<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        self.shuffle(&mut out);
        out
    }

    /// Derives an independent child generator. Two draws.
    pub fn fork(&mut self) -> Xorshift128 {
        let hi = u64::from(self.next_u32());
        let lo = u64::from(self.next_u32());
        Xorshift128::new((hi << 32) | lo)
    }

    /// Uniform index in `[0, len)`. One draw. `len` must be non-zero.
    fn index_below(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len - 1)
    }
}

impl From<[u32; 4]> for Xorshift128 {
    fn from(state: [u32; 4]) -> Self {
        Self::from_state(state)
    }
}

impl From<Xorshift128> for [u32; 4] {
    fn from(rng: Xorshift128) -> Self {
        rng.state
    }
}

/// Rejects the all-zero xorshift fixed point.
pub fn check_state(state: [u32; 4]) -> Result<[u32; 4], EngineError> {
    if state == [0; 4] {
        Err(EngineError::InvalidSeedState)
    } else {
        Ok(state)
    }
}

/// 32-bit rolling hash (`h = h * 31 + c`) over the UTF-16 code units of `text`.
pub fn hash_text(text: &str) -> u32 {
    text.encode_utf16()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(u32::from(c)))
}

/// One step of splitmix64, used only to expand seeds.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
