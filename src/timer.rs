//! Monotonic stopwatch used to time wrapped calls

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("cannot read a duration before the timer has been started")]
    NotStarted,
    #[error("invalid resolution `{0}`: expected one of s, ms or ns")]
    InvalidResolution(String),
}

/// Unit a duration is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "s")]
    Seconds,
    #[default]
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "ns")]
    Nanoseconds,
}

impl Resolution {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Nanoseconds => "ns",
        }
    }

    /// Whole units contained in `elapsed`; the sub-unit remainder is dropped.
    pub const fn units(self, elapsed: Duration) -> u128 {
        match self {
            Self::Seconds => elapsed.as_secs() as u128,
            Self::Milliseconds => elapsed.as_millis(),
            Self::Nanoseconds => elapsed.as_nanos(),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(Self::Seconds),
            "ms" => Ok(Self::Milliseconds),
            "ns" => Ok(Self::Nanoseconds),
            other => Err(TimerError::InvalidResolution(other.to_string())),
        }
    }
}

/// Stopwatch over the monotonic clock.
///
/// ```
/// use femur::{Resolution, Timer};
///
/// let mut timer = Timer::new();
/// timer.start();
/// // do work...
/// let elapsed_ms = timer.duration(Resolution::Milliseconds).unwrap();
/// # let _ = elapsed_ms;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    start: Option<Instant>,
}

impl Timer {
    pub const fn new() -> Self {
        Self { start: None }
    }

    /// Create a timer that is already running
    pub fn started() -> Self {
        Self {
            start: Some(Instant::now()),
        }
    }
}

impl Timer {
    /// Start the timer. Calling it again restarts the measurement.
    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    pub const fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// Raw time elapsed since [`Timer::start`]
    pub fn elapsed(&self) -> Result<Duration, TimerError> {
        self.start
            .map(|start| start.elapsed())
            .ok_or(TimerError::NotStarted)
    }

    /// Time elapsed since [`Timer::start`], floored to whole `resolution` units.
    ///
    /// Every call measures from the same start point, so repeated calls never
    /// decrease.
    pub fn duration(&self, resolution: Resolution) -> Result<u128, TimerError> {
        self.elapsed().map(|elapsed| resolution.units(elapsed))
    }

    /// Same as [`Timer::duration`] with the unit given as `"s"`, `"ms"` or `"ns"`.
    pub fn duration_str(&self, resolution: &str) -> Result<u128, TimerError> {
        let elapsed = self.elapsed()?;
        let resolution = resolution.parse::<Resolution>()?;
        Ok(resolution.units(elapsed))
    }
}
