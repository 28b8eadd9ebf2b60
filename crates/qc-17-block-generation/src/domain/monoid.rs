//! Accumulators for chain generation results
//!
//! The driver maps every generated point to a caller-chosen value and
//! folds the values with [`Monoid::combine`], starting from
//! [`Monoid::empty`]. `combine` must be associative with `empty` as its
//! identity.

use shared_types::Blund;

/// Associative combine with an identity element
pub trait Monoid: Sized {
    /// Identity element
    fn empty() -> Self;

    /// Combine two values; `self` comes first in chain order
    fn combine(self, other: Self) -> Self;

    /// Fold an iterator of values
    fn concat<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::combine)
    }
}

impl Monoid for () {
    fn empty() -> Self {}

    fn combine(self, _other: Self) -> Self {}
}

impl<T> Monoid for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }

    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

impl Monoid for u64 {
    fn empty() -> Self {
        0
    }

    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl Monoid for usize {
    fn empty() -> Self {
        0
    }

    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl<A: Monoid, B: Monoid> Monoid for (A, B) {
    fn empty() -> Self {
        (A::empty(), B::empty())
    }

    fn combine(self, other: Self) -> Self {
        (self.0.combine(other.0), self.1.combine(other.1))
    }
}

/// Produced/skipped tally
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Count {
    /// Points that produced a block
    pub produced: u64,
    /// Slots skipped for lack of a key
    pub skipped: u64,
}

impl Count {
    /// Injection counting one generation outcome
    pub fn of(outcome: Option<Blund>) -> Self {
        match outcome {
            Some(_) => Self {
                produced: 1,
                skipped: 0,
            },
            None => Self {
                produced: 0,
                skipped: 1,
            },
        }
    }
}

impl Monoid for Count {
    fn empty() -> Self {
        Self::default()
    }

    fn combine(self, other: Self) -> Self {
        Self {
            produced: self.produced + other.produced,
            skipped: self.skipped + other.skipped,
        }
    }
}
