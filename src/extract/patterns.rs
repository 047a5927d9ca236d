//! Line pattern tables for each probe kind
//!
//! Order matters: for a given line the first entry whose triggers all match
//! wins, and later entries are not consulted.

use super::ValueKind::{self, Float, Int};
use crate::models::ProbeKind;

/// Uncompiled line pattern
#[derive(Debug, Clone, Copy)]
pub struct PatternDef {
    /// Substrings that must all be present for the pattern to apply
    pub triggers: &'static [&'static str],
    pub regex: &'static str,
    /// Metric key and value type for each capture group, in group order
    pub captures: &'static [(&'static str, ValueKind)],
    /// Only the first line the regex matches counts; later matches are ignored
    pub first_match: bool,
}

const fn line(
    triggers: &'static [&'static str],
    regex: &'static str,
    captures: &'static [(&'static str, ValueKind)],
) -> PatternDef {
    PatternDef { triggers, regex, captures, first_match: false }
}

const fn first_line(
    triggers: &'static [&'static str],
    regex: &'static str,
    captures: &'static [(&'static str, ValueKind)],
) -> PatternDef {
    PatternDef { triggers, regex, captures, first_match: true }
}

const RENDER_2D: &[PatternDef] = &[
    line(&["Total Sprites Generated:"], r"Total Sprites Generated: (\d+)", &[("2D Total Sprites", Int)]),
    line(&["Lowest FPS:"], r"Lowest FPS: ([\d.]+)", &[("2D Lowest FPS", Float)]),
    line(&["Highest FPS:"], r"Highest FPS: ([\d.]+)", &[("2D Highest FPS", Float)]),
    line(&["Average FPS:"], r"Average FPS: ([\d.]+)", &[("2D Average FPS", Float)]),
];

const RENDER_3D: &[PatternDef] = &[
    line(&["Total Cubes Generated:"], r"Total Cubes Generated: (\d+)", &[("3D Total Cubes", Int)]),
    line(&["Lowest FPS:"], r"Lowest FPS: ([\d.]+)", &[("3D Lowest FPS", Float)]),
    line(&["Highest FPS:"], r"Highest FPS: ([\d.]+)", &[("3D Highest FPS", Float)]),
    line(&["Average FPS:"], r"Average FPS: ([\d.]+)", &[("3D Average FPS", Float)]),
];

// `seconds.` takes any trailing character, so "seconds!" still counts
const SEED_GEN: &[PatternDef] = &[first_line(
    &["Generated"],
    r"Generated (\d+) seeds in ([\d.]+) seconds.",
    &[("MC Seeds Generated", Int), ("MC Generation Time (s)", Float)],
)];

const CPU: &[PatternDef] = &[
    line(&["Total Primes Found:"], r"Total Primes Found: (\d+)", &[("CPU Primes Found", Int)]),
    line(&["Time Taken:"], r"Time Taken: ([\d.]+) seconds", &[("CPU Time Taken (s)", Float)]),
];

const MEMORY: &[PatternDef] = &[
    line(&["Total Allocation Cycles:"], r"Total Allocation Cycles: (\d+)", &[("Memory Allocation Cycles", Int)]),
    line(&["Time Taken:"], r"Time Taken: ([\d.]+) seconds", &[("Memory Time Taken (s)", Float)]),
];

const FILE_IO: &[PatternDef] = &[
    line(&["Write Speed:"], r"Write Speed: ([\d.]+) MB/s", &[("File I/O Write Speed (MB/s)", Float)]),
    line(&["Read Speed:"], r"Read Speed: ([\d.]+) MB/s", &[("File I/O Read Speed (MB/s)", Float)]),
];

const SIMULATED_GPU: &[PatternDef] = &[
    line(
        &["Total Matrix Multiplications"],
        r"Total Matrix Multiplications \(size \d+x\d+\): (\d+)",
        &[("Simulated GPU Matrix Multiplications", Int)],
    ),
    line(&["Time Taken:"], r"Time Taken: ([\d.]+) seconds", &[("Simulated GPU Time Taken (s)", Float)]),
];

const REAL_GPU: &[PatternDef] = &[
    line(
        &["Total Matrix Multiplications", "size"],
        r"Total Matrix Multiplications \(size \d+x\d+\): (\d+)",
        &[("Real GPU Matrix Multiplications", Int)],
    ),
    line(&["Time Taken:"], r"Time Taken: ([\d.]+) seconds", &[("Real GPU Time Taken (s)", Float)]),
];

const NET_CLIENT: &[PatternDef] = &[
    line(&["Send Speed:"], r"Send Speed: ([\d.]+) MB/s", &[("Net Send Speed (MB/s)", Float)]),
    line(&["Receive Speed:"], r"Receive Speed: ([\d.]+) MB/s", &[("Net Receive Speed (MB/s)", Float)]),
];

/// Pattern table for `kind`; empty for probes whose output carries no metrics
pub fn pattern_defs(kind: ProbeKind) -> &'static [PatternDef] {
    match kind {
        ProbeKind::Render2d => RENDER_2D,
        ProbeKind::Render3d => RENDER_3D,
        ProbeKind::SeedGen => SEED_GEN,
        ProbeKind::Cpu => CPU,
        ProbeKind::Memory => MEMORY,
        ProbeKind::FileIo => FILE_IO,
        ProbeKind::SimulatedGpu => SIMULATED_GPU,
        ProbeKind::RealGpu => REAL_GPU,
        ProbeKind::NetServer => &[],
        ProbeKind::NetClient => NET_CLIENT,
    }
}
