//! G-code generation from placed layouts.
//!
//! Consumes the layout's bed-space segments and emits a complete motion
//! program: absolute millimeter coordinates, connectivity-aware tool
//! lifts, and arcs encoded as `G2`/`G3` with I/J center offsets. The
//! program is regenerated wholesale on every export; nothing is mutated in
//! place.
//!
//! All coordinates are formatted to a fixed 3 decimal places (0.001 mm),
//! stated once in the program header.

use chrono::Utc;
use plotkit_core::{GcodeError, Point, Segment};
use tracing::debug;

use crate::item::MachineParams;
use crate::layout::Layout;

/// Gap above which a segment starts a new stroke (tool lift + travel), mm.
pub const DISCONTINUITY_THRESHOLD: f64 = 0.05;

/// Moves shorter than this are dropped as numeric noise, mm.
pub const NOISE_THRESHOLD: f64 = 0.005;

/// What the Z axis actuates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Pen plotter: engagement is purely the Z height.
    #[default]
    Pen,
    /// Pick-and-place head: engagement additionally switches the vacuum
    /// with `M3`/`M5`.
    Vacuum,
}

/// Aggregate figures for one generated program.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgramStats {
    /// Total length of cutting/drawing moves, mm.
    pub cut_length: f64,
    /// Total length of rapid travel moves, mm.
    pub travel_length: f64,
    /// Run time estimate from the feed rates, minutes.
    pub estimated_minutes: f64,
}

/// A generated G-code program: ordered text lines plus statistics.
#[derive(Debug, Clone)]
pub struct GcodeProgram {
    lines: Vec<String>,
    stats: ProgramStats,
}

impl GcodeProgram {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn stats(&self) -> &ProgramStats {
        &self.stats
    }

    /// The full program as newline-terminated text.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Motion lines only (no comments or blanks), for streaming to a
    /// device.
    pub fn motion_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter(|l| !l.is_empty() && !l.starts_with(';'))
            .map(|l| match l.find(';') {
                Some(idx) => l[..idx].trim_end().to_string(),
                None => l.clone(),
            })
            .collect()
    }
}

/// G-code generator for placed layouts.
#[derive(Debug, Clone, Default)]
pub struct GcodeGenerator {
    pub tool_mode: ToolMode,
}

impl GcodeGenerator {
    pub fn new(tool_mode: ToolMode) -> Self {
        Self { tool_mode }
    }

    /// Generate the full program for a layout.
    ///
    /// An empty layout is a caller-visible [`GcodeError::NothingToExport`],
    /// never a crash.
    pub fn generate(&self, layout: &Layout) -> Result<GcodeProgram, GcodeError> {
        let segments = layout.bed_segments();
        if segments.is_empty() {
            return Err(GcodeError::NothingToExport);
        }

        let first_params = segments[0].1;
        let (body, stats, last_params, tool_down) = self.generate_body(&segments)?;

        let mut lines = Vec::with_capacity(body.len() + 16);
        lines.push("; Plotkit G-code".to_string());
        lines.push(format!(
            "; Generated: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.push(format!("; Items: {}", layout.items().len()));
        lines.push("; Units: millimeters, 3 decimal places".to_string());
        lines.push(format!("; Cut length: {:.3}mm", stats.cut_length));
        lines.push(format!("; Travel length: {:.3}mm", stats.travel_length));
        lines.push(format!(
            "; Estimated time: {:.1} min",
            stats.estimated_minutes
        ));
        lines.push(String::new());
        lines.push("G90         ; Absolute positioning".to_string());
        lines.push("G21         ; Millimeter units".to_string());
        lines.push(format!(
            "G0 Z{} F{:.0} ; Lift tool to travel height",
            coord(first_params.tool_up_height),
            first_params.travel_feed_rate
        ));
        lines.push(String::new());
        lines.extend(body);
        lines.push(String::new());
        if tool_down {
            self.emit_tool_up(&mut lines, &last_params);
        } else {
            lines.push(format!(
                "G0 Z{} F{:.0}",
                coord(last_params.tool_up_height),
                last_params.travel_feed_rate
            ));
        }
        lines.push("G0 X0 Y0    ; Return to origin".to_string());
        lines.push("M2          ; End program".to_string());

        debug!(
            lines = lines.len(),
            cut_mm = stats.cut_length,
            travel_mm = stats.travel_length,
            "generated program"
        );
        Ok(GcodeProgram { lines, stats })
    }

    fn generate_body(
        &self,
        segments: &[(Segment, MachineParams)],
    ) -> Result<(Vec<String>, ProgramStats, MachineParams, bool), GcodeError> {
        let mut lines = Vec::new();
        let mut stats = ProgramStats::default();
        let mut last_end: Option<Point> = None;
        let mut position = Point::new(0.0, 0.0);
        let mut tool_down = false;
        let mut last_params = segments[0].1;

        for (segment, params) in segments {
            let Some(start) = segment.start() else {
                continue;
            };
            if segment.is_curve() {
                return Err(GcodeError::UnsupportedSegment {
                    reason: "un-flattened Bezier curve in emitter input".to_string(),
                });
            }

            let new_stroke = match last_end {
                Some(p) => p.distance_to(&start) > DISCONTINUITY_THRESHOLD,
                None => true,
            };
            if new_stroke {
                if tool_down {
                    self.emit_tool_up(&mut lines, params);
                    tool_down = false;
                }
                lines.push(format!(
                    "G0 X{} Y{} F{:.0}",
                    coord(start.x),
                    coord(start.y),
                    params.travel_feed_rate
                ));
                if let Some(p) = last_end {
                    let d = p.distance_to(&start);
                    stats.travel_length += d;
                    stats.estimated_minutes += d / params.travel_feed_rate;
                }
                self.emit_tool_down(&mut lines, params);
                tool_down = true;
                position = start;
            }

            match segment {
                Segment::Line(points) => {
                    for p in points.iter().skip(1) {
                        if p.distance_to(&position) < NOISE_THRESHOLD {
                            continue;
                        }
                        lines.push(format!(
                            "G1 X{} Y{} F{:.0}",
                            coord(p.x),
                            coord(p.y),
                            params.work_feed_rate
                        ));
                        let d = position.distance_to(p);
                        stats.cut_length += d;
                        stats.estimated_minutes += d / params.work_feed_rate;
                        position = *p;
                    }
                }
                Segment::Arc(arc) => {
                    let cmd = if arc.clockwise { "G2" } else { "G3" };
                    let i = arc.center.x - arc.start.x;
                    let j = arc.center.y - arc.start.y;
                    lines.push(format!(
                        "{} X{} Y{} I{} J{} F{:.0}",
                        cmd,
                        coord(arc.end.x),
                        coord(arc.end.y),
                        coord(i),
                        coord(j),
                        params.work_feed_rate
                    ));
                    let d = arc.radius() * arc.sweep_angle().abs();
                    stats.cut_length += d;
                    stats.estimated_minutes += d / params.work_feed_rate;
                    position = arc.end;
                }
                Segment::Curve(_) => unreachable!(),
            }

            last_end = segment.end();
            last_params = *params;
        }

        Ok((lines, stats, last_params, tool_down))
    }

    fn emit_tool_down(&self, lines: &mut Vec<String>, params: &MachineParams) {
        lines.push(format!(
            "G1 Z{} F{:.0}",
            coord(params.tool_down_height),
            params.work_feed_rate
        ));
        if self.tool_mode == ToolMode::Vacuum {
            lines.push("M3          ; Engage vacuum".to_string());
        }
    }

    fn emit_tool_up(&self, lines: &mut Vec<String>, params: &MachineParams) {
        if self.tool_mode == ToolMode::Vacuum {
            lines.push("M5          ; Release vacuum".to_string());
        }
        lines.push(format!(
            "G0 Z{} F{:.0}",
            coord(params.tool_up_height),
            params.travel_feed_rate
        ));
    }
}

/// Fixed 3-decimal coordinate formatting; normalizes negative zero.
fn coord(v: f64) -> String {
    let v = if v.abs() < 0.0005 { 0.0 } else { v };
    format!("{:.3}", v)
}
