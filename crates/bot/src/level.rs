//! Pure level model: cumulative XP to level progression and back.
//!
//! The cumulative cost to reach level `L` is quadratic-in-level:
//! `base*L + first_increment*C(L,2) + increment_delta*C(L,3)`, so each
//! successive level costs `first_increment` more than the last, with that
//! step itself growing by `increment_delta`. No I/O, fully deterministic.

/// Level-curve coefficients, taken from `Config` at startup.
#[derive(Debug, Clone, Copy)]
pub struct LevelCurve {
    pub base: i64,
    pub first_increment: i64,
    pub increment_delta: i64,
}

/// Progression information for a given cumulative XP total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u32,
    /// XP earned past the threshold of the current level.
    pub xp_into_level: i64,
    /// XP span between the current level and the next.
    pub xp_for_next_level: i64,
}

impl LevelCurve {
    pub fn new(base: i64, first_increment: i64, increment_delta: i64) -> Self {
        Self {
            base,
            first_increment,
            increment_delta,
        }
    }

    /// Cumulative XP required to reach `level`. Zero at level 0 and
    /// strictly increasing for positive coefficients.
    pub fn exp_for_level(&self, level: u32) -> i64 {
        let l = i64::from(level);
        // C(l,2) and C(l,3); the products are multiples of 2 and 6.
        let pairs = l * (l - 1) / 2;
        let triples = l * (l - 1) * (l - 2) / 6;
        self.base * l + self.first_increment * pairs + self.increment_delta * triples
    }

    /// XP span between `level` and `level + 1`, computed in closed form
    /// rather than by differencing two cumulative evaluations.
    fn span(&self, level: u32) -> i64 {
        let l = i64::from(level);
        let pairs = l * (l - 1) / 2;
        self.base + self.first_increment * l + self.increment_delta * pairs
    }

    /// Level progression for a cumulative XP total. Negative input is
    /// clamped to zero. Finds the unique `level` with
    /// `exp_for_level(level) <= exp < exp_for_level(level + 1)` by
    /// doubling an upper bound and binary-searching below it.
    pub fn level_info(&self, exp: i64) -> LevelInfo {
        let exp = exp.max(0);
        if exp == 0 {
            return LevelInfo {
                level: 0,
                xp_into_level: 0,
                xp_for_next_level: self.span(0),
            };
        }

        let mut hi: u32 = 1;
        while self.exp_for_level(hi) <= exp {
            hi *= 2;
        }

        // Largest level whose threshold is still <= exp, in [hi/2, hi).
        let mut lo = hi / 2;
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            if self.exp_for_level(mid) <= exp {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        LevelInfo {
            level: lo,
            xp_into_level: exp - self.exp_for_level(lo),
            xp_for_next_level: self.span(lo),
        }
    }
}
