//! Device status line parsing.
//!
//! The device reports acknowledgments (`ok` or an `ok`-prefixed line) and
//! position lines of the form
//! `POS:<machineX>,<machineY>,<machineZ>|<workX>,<workY>,<workZ>`.
//! This module parses those inbound lines; nothing here generates them.

use serde::{Deserialize, Serialize};

/// Whether an inbound line acknowledges the outstanding command.
pub fn is_ack(line: &str) -> bool {
    line.trim_start().starts_with("ok")
}

/// One XYZ triple from a position report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AxisPosition {
    /// Parse a comma-separated coordinate triple.
    fn parse(text: &str) -> Option<Self> {
        let coords: Vec<f64> = text
            .split(',')
            .filter_map(|s| s.trim().parse::<f64>().ok())
            .collect();
        if coords.len() < 3 {
            return None;
        }
        Some(Self {
            x: coords[0],
            y: coords[1],
            z: coords[2],
        })
    }
}

/// A parsed `POS:` report: machine coordinates and work coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub machine: AxisPosition,
    pub work: AxisPosition,
}

impl PositionReport {
    /// Parse a `POS:mx,my,mz|wx,wy,wz` line; `None` for anything else.
    pub fn parse(line: &str) -> Option<Self> {
        let payload = line.trim().strip_prefix("POS:")?;
        let (machine_text, work_text) = payload.split_once('|')?;
        Some(Self {
            machine: AxisPosition::parse(machine_text)?,
            work: AxisPosition::parse(work_text)?,
        })
    }
}
