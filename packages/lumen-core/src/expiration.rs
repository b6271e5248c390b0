use std::fmt;

/// An ordinal render priority, historically named "expiration time".
///
/// Larger values are more urgent and are scheduled sooner. `NO_WORK` is the
/// minimum sentinel and means "nothing scheduled"; every real priority is
/// strictly greater than it. All of the root's range bookkeeping is plain
/// `Ord` comparison over these values.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpirationTime(u32);

impl ExpirationTime {
    /// Sentinel: no work scheduled. Compares lower than every real priority.
    pub const NO_WORK: Self = Self(0);
    /// Work that never expires on its own (offscreen / hidden trees).
    pub const NEVER: Self = Self(1);
    /// Idle-priority work; only processed when nothing else is pending.
    pub const IDLE: Self = Self(2);
    /// Synchronous work; preempts everything.
    pub const SYNC: Self = Self(u32::MAX);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_no_work(self) -> bool {
        self.0 == 0
    }

    /// The next less urgent priority. Used when a range bound must exclude
    /// this level ("everything strictly below `t` stays suspended").
    pub const fn succ(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The priority just below this one. Saturates at the sentinel rather
    /// than wrapping.
    pub const fn pred(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Debug for ExpirationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NO_WORK => write!(f, "NoWork"),
            Self::NEVER => write!(f, "Never"),
            Self::IDLE => write!(f, "Idle"),
            Self::SYNC => write!(f, "Sync"),
            Self(t) => write!(f, "ExpirationTime({t})"),
        }
    }
}
