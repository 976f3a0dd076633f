//! Delays, repeat counts, expiry and verification bounds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Time unit names as used by MockServer (Java `TimeUnit` constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    #[default]
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Convert `value` in this unit into a [`Duration`], saturating on overflow.
    pub fn to_duration(self, value: u64) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(value),
            TimeUnit::Microseconds => Duration::from_micros(value),
            TimeUnit::Milliseconds => Duration::from_millis(value),
            TimeUnit::Seconds => Duration::from_secs(value),
            TimeUnit::Minutes => Duration::from_secs(value.saturating_mul(60)),
            TimeUnit::Hours => Duration::from_secs(value.saturating_mul(3_600)),
            TimeUnit::Days => Duration::from_secs(value.saturating_mul(86_400)),
        }
    }
}

/// Delay applied by the server before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delay {
    #[serde(default)]
    pub time_unit: TimeUnit,
    #[serde(default)]
    pub value: u64,
}

impl Delay {
    pub fn new(time_unit: TimeUnit, value: u64) -> Self {
        Self { time_unit, value }
    }

    pub fn milliseconds(value: u64) -> Self {
        Self::new(TimeUnit::Milliseconds, value)
    }

    pub fn seconds(value: u64) -> Self {
        Self::new(TimeUnit::Seconds, value)
    }

    pub fn to_duration(&self) -> Duration {
        self.time_unit.to_duration(self.value)
    }
}

/// Uses the coarsest of milliseconds, microseconds or nanoseconds that
/// represents `duration` exactly.
impl From<Duration> for Delay {
    fn from(duration: Duration) -> Self {
        let nanos = duration.as_nanos();
        let (unit, value) = if nanos % 1_000_000 == 0 {
            (TimeUnit::Milliseconds, nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            (TimeUnit::Microseconds, nanos / 1_000)
        } else {
            (TimeUnit::Nanoseconds, nanos)
        };
        Delay::new(unit, u64::try_from(value).unwrap_or(u64::MAX))
    }
}

/// How many times an expectation may still match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "TimesWire", into = "TimesWire")]
pub enum Times {
    #[default]
    Unlimited,
    Exactly(u32),
}

impl Times {
    pub fn unlimited() -> Self {
        Times::Unlimited
    }

    pub fn once() -> Self {
        Times::Exactly(1)
    }

    pub fn exactly(count: u32) -> Self {
        Times::Exactly(count)
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Times::Unlimited)
    }

    /// Remaining count, `None` when unlimited.
    pub fn remaining(&self) -> Option<u32> {
        match self {
            Times::Unlimited => None,
            Times::Exactly(n) => Some(*n),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimesWire {
    #[serde(default)]
    remaining_times: u32,
    #[serde(default)]
    unlimited: bool,
}

impl From<TimesWire> for Times {
    fn from(wire: TimesWire) -> Self {
        if wire.unlimited {
            Times::Unlimited
        } else {
            Times::Exactly(wire.remaining_times)
        }
    }
}

impl From<Times> for TimesWire {
    fn from(times: Times) -> Self {
        match times {
            Times::Unlimited => TimesWire {
                remaining_times: 0,
                unlimited: true,
            },
            Times::Exactly(n) => TimesWire {
                remaining_times: n,
                unlimited: false,
            },
        }
    }
}

/// How long an expectation stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "TimeToLiveWire", into = "TimeToLiveWire")]
pub enum TimeToLive {
    #[default]
    Unlimited,
    Exactly(Duration),
}

impl TimeToLive {
    pub fn unlimited() -> Self {
        TimeToLive::Unlimited
    }

    pub fn exactly(ttl: Duration) -> Self {
        TimeToLive::Exactly(ttl)
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, TimeToLive::Unlimited)
    }

    pub fn millis(&self) -> Option<u64> {
        match self {
            TimeToLive::Unlimited => None,
            TimeToLive::Exactly(ttl) => Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeToLiveWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    time_unit: Option<TimeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_to_live: Option<u64>,
    #[serde(default)]
    unlimited: bool,
}

impl From<TimeToLiveWire> for TimeToLive {
    fn from(wire: TimeToLiveWire) -> Self {
        match (wire.unlimited, wire.time_to_live) {
            (false, Some(value)) => {
                TimeToLive::Exactly(wire.time_unit.unwrap_or_default().to_duration(value))
            }
            _ => TimeToLive::Unlimited,
        }
    }
}

impl From<TimeToLive> for TimeToLiveWire {
    fn from(ttl: TimeToLive) -> Self {
        match ttl.millis() {
            None => TimeToLiveWire {
                time_unit: None,
                time_to_live: None,
                unlimited: true,
            },
            Some(ms) => TimeToLiveWire {
                time_unit: Some(TimeUnit::Milliseconds),
                time_to_live: Some(ms),
                unlimited: false,
            },
        }
    }
}

/// Bounds a verification asserts on the number of matching requests.
///
/// `at_most == None` means there is no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VerificationTimesWire", into = "VerificationTimesWire")]
pub struct VerificationTimes {
    pub at_least: u32,
    pub at_most: Option<u32>,
}

impl VerificationTimes {
    pub fn never() -> Self {
        Self::exactly(0)
    }

    pub fn once() -> Self {
        Self::exactly(1)
    }

    pub fn exactly(count: u32) -> Self {
        Self {
            at_least: count,
            at_most: Some(count),
        }
    }

    pub fn at_least(count: u32) -> Self {
        Self {
            at_least: count,
            at_most: None,
        }
    }

    pub fn at_most(count: u32) -> Self {
        Self {
            at_least: 0,
            at_most: Some(count),
        }
    }

    pub fn between(at_least: u32, at_most: u32) -> Self {
        Self {
            at_least,
            at_most: Some(at_most),
        }
    }

    /// A lower bound above the upper bound can never be satisfied.
    pub fn is_satisfiable(&self) -> bool {
        self.at_most.map_or(true, |max| self.at_least <= max)
    }
}

impl fmt::Display for VerificationTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: u32| if n == 1 { "time" } else { "times" };
        match self.at_most {
            Some(max) if max == self.at_least => write!(f, "exactly {max} {}", plural(max)),
            Some(max) if self.at_least == 0 => write!(f, "at most {max} {}", plural(max)),
            Some(max) => write!(f, "between {} and {max} times", self.at_least),
            None => write!(f, "at least {} {}", self.at_least, plural(self.at_least)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationTimesWire {
    #[serde(default)]
    at_least: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    at_most: Option<i64>,
}

impl From<VerificationTimesWire> for VerificationTimes {
    fn from(wire: VerificationTimesWire) -> Self {
        let clamp = |v: i64| u32::try_from(v.max(0)).unwrap_or(u32::MAX);
        Self {
            at_least: clamp(wire.at_least),
            at_most: wire.at_most.filter(|v| *v >= 0).map(clamp),
        }
    }
}

impl From<VerificationTimes> for VerificationTimesWire {
    fn from(times: VerificationTimes) -> Self {
        Self {
            at_least: i64::from(times.at_least),
            at_most: times.at_most.map(i64::from),
        }
    }
}
