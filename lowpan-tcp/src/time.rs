/*! Time structures.

 - [Instant] is an absolute point in time, in milliseconds since an arbitrary epoch such as
   system start. The stack is told the current instant by its owner.
 - [Duration] is relative time, used for the send timeout and neighbor entry lifetimes.
 - [Expiration] is the point at which a cached entry stops being valid, if ever.

[Instant]: struct.Instant.html
[Duration]: struct.Duration.html
[Expiration]: enum.Expiration.html
*/
use core::{cmp, fmt, ops};
pub use core::time::Duration;

/// A representation of an absolute time value.
///
/// A value of `0` is arbitrary, negative values are points before it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instant {
    millis: i64,
}

/// An expiration time, inversion of `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiration {
    /// Expires at the given instant.
    When(Instant),
    /// Never expires.
    Never,
}

use Expiration::{When, Never};

impl Instant {
    /// Create a new `Instant` from a number of milliseconds.
    pub fn from_millis<T: Into<i64>>(millis: T) -> Instant {
        Instant { millis: millis.into() }
    }

    /// Create a new `Instant` from a number of seconds.
    pub fn from_secs<T: Into<i64>>(secs: T) -> Instant {
        Instant { millis: secs.into() * 1000 }
    }

    /// The number of whole seconds since the epoch.
    pub fn secs(&self) -> i64 {
        self.millis / 1000
    }

    /// The fractional milliseconds of the current second.
    pub fn millis(&self) -> i64 {
        self.millis % 1000
    }

    /// The total number of milliseconds since the epoch.
    pub fn total_millis(&self) -> i64 {
        self.millis
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:03}s", self.secs(), self.millis())
    }
}

impl ops::Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant::from_millis(self.millis + rhs.as_millis() as i64)
    }
}

impl ops::AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        self.millis += rhs.as_millis() as i64;
    }
}

impl ops::Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Instant {
        Instant::from_millis(self.millis - rhs.as_millis() as i64)
    }
}

impl ops::Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        Duration::from_millis((self.millis - rhs.millis).abs() as u64)
    }
}

impl Expiration {
    /// Check if the expiration is reached at the given instant.
    ///
    /// An entry is considered expired at exactly its expiration instant.
    pub fn is_expired(self, now: Instant) -> bool {
        When(now) >= self
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Never
    }
}

impl From<Option<Instant>> for Expiration {
    fn from(opt: Option<Instant>) -> Self {
        match opt {
            Some(instant) => When(instant),
            None => Never,
        }
    }
}

impl From<Expiration> for Option<Instant> {
    fn from(exp: Expiration) -> Self {
        match exp {
            When(instant) => Some(instant),
            Never => None,
        }
    }
}

impl cmp::PartialOrd<Self> for Expiration {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl cmp::Ord for Expiration {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (*self, *other) {
            (Never, Never) => cmp::Ordering::Equal,
            (Never, When(_)) => cmp::Ordering::Greater,
            (When(_), Never) => cmp::Ordering::Less,
            (When(ref a), When(ref b)) => a.cmp(b),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn instant_ops() {
        assert_eq!(Instant::from_millis(4) + Duration::from_millis(6), Instant::from_millis(10));
        assert_eq!(Instant::from_millis(7) - Duration::from_millis(5), Instant::from_millis(2));
        assert_eq!(Instant::from_millis(7) - Instant::from_millis(12), Duration::from_millis(5));
    }

    #[test]
    fn instant_display() {
        assert_eq!(format!("{}", Instant::from_millis(5674)), "5.674s");
        assert_eq!(format!("{}", Instant::from_millis(5004)), "5.004s");
    }

    #[test]
    fn expiration_order() {
        let early = Expiration::When(Instant::from_millis(10));
        let late = Expiration::When(Instant::from_millis(20));
        assert!(early < late);
        assert!(late < Expiration::Never);
        assert_eq!(Expiration::from(None), Expiration::Never);
    }

    #[test]
    fn expiration_reached() {
        let exp = Expiration::When(Instant::from_millis(10));
        assert!(!exp.is_expired(Instant::from_millis(9)));
        assert!(exp.is_expired(Instant::from_millis(10)));
        assert!(!Expiration::Never.is_expired(Instant::from_secs(1_000_000)));
    }
}
