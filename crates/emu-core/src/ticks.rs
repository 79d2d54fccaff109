//! Elapsed clock units.

/// A count of CPU clock cycles (T-states).
///
/// Every cost the core reports is expressed in T-states. `Ticks` is the
/// running total a host keeps to line other devices up against the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Ticks elapsed since `earlier`, zero if `earlier` is in the future.
    #[must_use]
    pub const fn since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl From<u32> for Ticks {
    fn from(t_states: u32) -> Self {
        Self(u64::from(t_states))
    }
}

impl core::ops::Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::ops::AddAssign<u32> for Ticks {
    fn add_assign(&mut self, rhs: u32) {
        self.0 += u64::from(rhs);
    }
}

impl core::fmt::Display for Ticks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}T", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_t_states() {
        let mut total = Ticks::ZERO;
        total += 4u32;
        total += Ticks::new(7);
        assert_eq!(total.get(), 11);
        assert_eq!(total.to_string(), "11T");
    }

    #[test]
    fn since_saturates() {
        let a = Ticks::new(10);
        let b = Ticks::new(25);
        assert_eq!(b.since(a), 15);
        assert_eq!(a.since(b), 0);
    }
}
