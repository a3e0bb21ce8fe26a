//! # Constants and type definitions for skysweep
//!
//! This module centralizes the **unit-bearing type aliases** and the
//! **object identifier** type used throughout the crate.
//!
//! ## Conventions
//!
//! - All times are Modified Julian Dates (days), tagged with a
//!   [`Timescale`](crate::time_grid::Timescale) wherever they cross the
//!   propagation-service boundary.
//! - Sky angles exchanged with callers are in degrees; the service row
//!   layout is the only place where angular orbital elements are converted
//!   to radians.
//! - Sky motion rates are degrees per day.

use std::fmt;

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Astronomical magnitude
pub type Magnitude = f64;
/// Duration in seconds
pub type Seconds = f64;
/// On-sky motion in degrees per day
pub type DegPerDay = f64;
/// MPC code identifying an observatory (e.g. "807", "F51")
pub type MpcCode = String;

/// Identifier of a solar system object.
///
/// Either a numbered designation (e.g. `Int(433)`) or a string-based one
/// (provisional designations, comets).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectNumber {
    /// Integer-based designation (e.g. 1, 433, ...)
    Int(u32),
    /// String-based designation (provisional, comet, etc.)
    String(String),
}

impl fmt::Display for ObjectNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectNumber::Int(n) => write!(f, "{n}"),
            ObjectNumber::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for ObjectNumber {
    fn from(n: u32) -> Self {
        ObjectNumber::Int(n)
    }
}

impl From<&str> for ObjectNumber {
    fn from(s: &str) -> Self {
        ObjectNumber::String(s.to_string())
    }
}

impl From<String> for ObjectNumber {
    fn from(s: String) -> Self {
        ObjectNumber::String(s)
    }
}
