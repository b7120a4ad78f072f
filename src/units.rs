use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const METERS_TO_YARDS: f64 = 1.09361;
pub const METERS_TO_MILES: f64 = 0.000621371;

/// Standard yard-pool lengths in meters, with the display value in yards.
const YARD_POOLS: [(f64, f64); 3] = [(22.86, 25.0), (45.72, 50.0), (27.43, 30.0)];
const POOL_TOLERANCE_M: f64 = 0.5;

pub fn meters_to_yards(meters: f64) -> f64 {
    meters * METERS_TO_YARDS
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters * METERS_TO_MILES
}

/// Formats elapsed seconds as `H:MM:SS` above an hour, `MM:SS` below.
/// Truncates toward zero, never rounds.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let hours = (total / 3600.0) as u64;
    let minutes = ((total % 3600.0) / 60.0) as u64;
    let secs = (total % 60.0) as u64;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceUnit {
    Per100m,
    Per100yd,
}

/// Seconds needed to cover 100 m or 100 yd. Kept numeric internally;
/// formats as a clock string only at the serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pace(f64);

impl Pace {
    pub fn from_seconds(seconds: f64) -> Self {
        Pace(seconds)
    }

    /// Returns `None` for zero or negative speed — "no pace", never infinity.
    pub fn from_speed(speed_mps: f64, unit: PaceUnit) -> Option<Self> {
        if speed_mps <= 0.0 || !speed_mps.is_finite() {
            return None;
        }
        let speed = match unit {
            PaceUnit::Per100m => speed_mps,
            PaceUnit::Per100yd => speed_mps * METERS_TO_YARDS,
        };
        Some(Pace(100.0 / speed))
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Floor-truncated seconds, the precision the clock string carries.
    pub fn whole_seconds(self) -> u64 {
        self.0.max(0.0) as u64
    }

    pub fn to_clock(self) -> String {
        format_clock(self.0)
    }

    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(':');
        let first: u64 = parts.next()?.parse().ok()?;
        let second: u64 = parts.next()?.parse().ok()?;
        let seconds = match parts.next() {
            Some(third) => {
                let third: u64 = third.parse().ok()?;
                first * 3600 + second * 60 + third
            }
            None => first * 60 + second,
        };
        Some(Pace(seconds as f64))
    }
}

impl Serialize for Pace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_clock())
    }
}

impl<'de> Deserialize<'de> for Pace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pace::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid pace: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolClass {
    pub pool_length_yd: f64,
    pub is_yard_pool: bool,
}

/// Classifies a pool length as a yard or meter pool. Yard pools are
/// recognized within 0.5 m of a standard yard length and snap their
/// displayed length to the integer yard value; everything else, including
/// ambiguous lengths, is treated as a meter pool.
pub fn classify_pool(pool_length_m: f64) -> PoolClass {
    for (meters, yards) in YARD_POOLS {
        if (pool_length_m - meters).abs() < POOL_TOLERANCE_M {
            return PoolClass {
                pool_length_yd: yards,
                is_yard_pool: true,
            };
        }
    }
    PoolClass {
        pool_length_yd: meters_to_yards(pool_length_m),
        is_yard_pool: false,
    }
}
