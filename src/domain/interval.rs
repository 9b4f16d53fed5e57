//! Reload and cache timing.
//!
//! Both knobs are either switched off or a positive amount of time. Reload
//! timeouts are measured in seconds, cache lifetimes in minutes; the unit is
//! decided by the field that holds the interval.

use std::{fmt, time::Duration};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use tracing::trace;

/// Largest accepted amount, in either unit. Larger amounts are clamped.
///
/// Far below `u64::MAX` seconds even when read as minutes.
pub const MAX_AMOUNT: f64 = 1e15;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interval {
    #[default]
    Disabled,
    Every(Amount),
}

/// Finite amount in `(0, MAX_AMOUNT]`; only built through [`Interval::every`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Interval {
    /// Build an interval, collapsing non-positive and non-finite amounts to
    /// `Disabled` and clamping amounts above [`MAX_AMOUNT`].
    pub fn every(amount: f64) -> Self {
        if !(amount.is_finite() && amount > 0.0) {
            return Self::Disabled;
        }
        if amount > MAX_AMOUNT {
            trace!(amount, max = MAX_AMOUNT, "Clamped interval amount");
            return Self::Every(Amount(MAX_AMOUNT));
        }
        Self::Every(Amount(amount))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Every(_))
    }

    /// Raw amount in the unit of the owning field.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Disabled => None,
            Self::Every(amount) => Some(amount.get()),
        }
    }

    /// Interpret the amount as seconds.
    pub fn seconds_as_duration(&self) -> Option<Duration> {
        self.amount()
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }

    /// Interpret the amount as minutes.
    pub fn minutes_as_duration(&self) -> Option<Duration> {
        self.amount()
            .and_then(|minutes| Duration::try_from_secs_f64(minutes * 60.0).ok())
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Disabled => serializer.serialize_bool(false),
            Self::Every(amount) => serializer.serialize_f64(amount.get()),
        }
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntervalVisitor)
    }
}

struct IntervalVisitor;

impl<'de> Visitor<'de> for IntervalVisitor {
    type Value = Interval;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("`false`, `null` or a number")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Interval, E> {
        if value {
            Err(E::invalid_value(de::Unexpected::Bool(true), &self))
        } else {
            Ok(Interval::Disabled)
        }
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Interval, E> {
        Ok(Interval::every(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Interval, E> {
        Ok(Interval::every(value as f64))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Interval, E> {
        Ok(Interval::every(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Interval, E> {
        Ok(Interval::Disabled)
    }

    fn visit_none<E: de::Error>(self) -> Result<Interval, E> {
        Ok(Interval::Disabled)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Interval, D::Error> {
        deserializer.deserialize_any(IntervalVisitor)
    }
}
