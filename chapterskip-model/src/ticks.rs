use std::fmt;

/// Host clocks count media positions in 100ns units.
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// A media position or length expressed in host ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    pub const fn new(raw: u64) -> Self {
        Ticks(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Wall-clock rendering (`h:mm:ss.mmm`) for log lines.
    pub fn clock(self) -> Clock {
        Clock(self)
    }
}

impl From<u64> for Ticks {
    fn from(raw: u64) -> Self {
        Ticks(raw)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display adapter returned by [`Ticks::clock`].
#[derive(Debug, Clone, Copy)]
pub struct Clock(Ticks);

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_millis = self.0.0 / (TICKS_PER_SECOND / 1_000);
        let millis = total_millis % 1_000;
        let total_secs = total_millis / 1_000;
        let (hours, minutes, secs) =
            (total_secs / 3_600, (total_secs / 60) % 60, total_secs % 60);
        write!(f, "{hours}:{minutes:02}:{secs:02}.{millis:03}")
    }
}
