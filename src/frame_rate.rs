//! Frame rate to FCPXML `frameDuration` conversion.

/// A common editing rate and its canonical frame duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardRate {
    pub fps: f64,
    pub frame_duration: &'static str,
}

pub const STANDARD_RATES: [StandardRate; 8] = [
    StandardRate { fps: 23.976, frame_duration: "1001/24000s" },
    StandardRate { fps: 24.0, frame_duration: "100/2400s" },
    StandardRate { fps: 25.0, frame_duration: "100/2500s" },
    StandardRate { fps: 29.97, frame_duration: "1001/30000s" },
    StandardRate { fps: 30.0, frame_duration: "100/3000s" },
    StandardRate { fps: 50.0, frame_duration: "100/5000s" },
    StandardRate { fps: 59.94, frame_duration: "1001/60000s" },
    StandardRate { fps: 60.0, frame_duration: "100/6000s" },
];

/// Absolute distance in frames per second under which a rate snaps.
pub const TOLERANCE: f64 = 0.01;

/// The first standard rate within [`TOLERANCE`] of `timescale / sample_delta`.
pub fn standard_rate(timescale: u32, sample_delta: u32) -> Option<&'static StandardRate> {
    if sample_delta == 0 {
        return None;
    }
    let fps = timescale as f64 / sample_delta as f64;
    STANDARD_RATES.iter().find(|r| (fps - r.fps).abs() < TOLERANCE)
}

/// Frame duration as a rational-seconds string.
///
/// Snaps to a standard rate when one is close enough, otherwise the exact
/// `"{sample_delta}/{timescale}s"`, left unreduced. Never fails.
pub fn resolve(timescale: u32, sample_delta: u32) -> String {
    match standard_rate(timescale, sample_delta) {
        Some(rate) => rate.frame_duration.to_string(),
        None => format!("{sample_delta}/{timescale}s"),
    }
}
