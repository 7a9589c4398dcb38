//! dmxtap core library for live Art-Net capture.
//!
//! This crate implements the passive capture tap used to verify what a
//! lighting-control server actually puts on the wire: a `Receiver` binds a
//! UDP socket and runs one receive thread, the ArtDMX decoder turns raw
//! datagrams into typed frames, and the frame buffer hands race-free
//! snapshots to test code. Parsing is byte-oriented and side-effect free;
//! all I/O is isolated in the `capture` layer.
//!
//! Invariants:
//! - Every frame carries exactly 512 channels, zero-padded past the wire
//!   data length, and frames are stored in strict arrival order.
//! - Malformed and foreign packets are dropped in silence; the receive loop
//!   never surfaces them.
//! - Capture is receive-only: nothing in this crate ever transmits Art-Net.
//! - Report output is deterministic (universes in ascending order).
//!
//! Version française (résumé):
//! Cette crate fournit une écoute passive Art-Net : un `Receiver` par socket
//! UDP et par thread de réception, un décodeur ArtDMX pur, et un tampon de
//! trames partagé offrant des instantanés sans course. Les paquets étrangers
//! ou malformés sont écartés en silence. Garanties : 512 canaux par trame,
//! ordre d'arrivée strict, rapport déterministe.
//!
//! # Examples
//! ```no_run
//! use std::time::Duration;
//!
//! use dmxtap_core::Receiver;
//!
//! let mut receiver = Receiver::new(dmxtap_core::ARTNET_PORT);
//! receiver.start()?;
//! // Trigger the scene change under test here, then read what arrived.
//! let frames = receiver.capture_for(Duration::from_secs(1));
//! println!("captured {} frames", frames.len());
//! receiver.stop();
//! # Ok::<(), dmxtap_core::CaptureError>(())
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

mod capture;
mod protocols;
mod summary;

pub use capture::{CaptureError, Frame, FrameBuffer, Receiver};
pub use protocols::artnet::layout::{ARTNET_PORT, DMX_MAX_SLOTS};
pub use protocols::artnet::{ArtDmx, parse_artdmx};
pub use summary::{channel_trace, frames_for_universe};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Fallback timestamp used when the wall clock cannot be formatted.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated capture report with deterministic ordering.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use dmxtap_core::summarize;
///
/// let report = summarize(&[], 6454, Duration::from_secs(2));
/// assert_eq!(report.report_version, dmxtap_core::REPORT_VERSION);
/// assert!(report.universes.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,
    /// Listening endpoint metadata.
    pub listen: ListenInfo,
    /// Capture window metadata.
    pub window: WindowInfo,
    /// Per-universe summaries in stable order.
    pub universes: Vec<UniverseSummary>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use dmxtap_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "dmxtap".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "dmxtap");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "dmxtap").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Listening endpoint metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenInfo {
    /// UDP port the capture socket was bound to.
    pub port: u16,
}

/// Capture window metadata embedded in reports.
///
/// # Examples
/// ```
/// use dmxtap_core::WindowInfo;
///
/// let window = WindowInfo {
///     duration_s: 2.0,
///     frames_total: 88,
/// };
/// assert_eq!(window.frames_total, 88);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Requested window length in seconds.
    pub duration_s: f64,
    /// Total ArtDMX frames captured in the window, across all universes.
    pub frames_total: u64,
}

/// Per-universe metrics summary.
///
/// # Examples
/// ```
/// use dmxtap_core::UniverseSummary;
///
/// let summary = UniverseSummary {
///     universe: 1,
///     frames_count: 0,
///     fps: None,
///     loss_packets: None,
///     loss_rate: None,
/// };
/// assert_eq!(summary.universe, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseSummary {
    /// 15-bit Art-Net Port-Address, as a flat identifier.
    pub universe: u16,
    /// Number of captured frames for this universe.
    pub frames_count: u64,
    /// Observed frame rate over the first..last arrival span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Packets lost according to ArtDMX sequence gaps, when the sender
    /// numbers its packets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_packets: Option<u64>,
    /// Loss ratio against expected packet count, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_rate: Option<f64>,
}

/// Aggregate one capture window into a report.
///
/// `port` is the bound listening port, `window` the requested capture
/// duration. Universe summaries come out in ascending universe order.
pub fn summarize(frames: &[Frame], port: u16, window: Duration) -> CaptureReport {
    CaptureReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "dmxtap".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string()),
        listen: ListenInfo { port },
        window: WindowInfo {
            duration_s: window.as_secs_f64(),
            frames_total: frames.len() as u64,
        },
        universes: summary::build_universe_summaries(frames),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn frame(universe: u16, at: Instant) -> Frame {
        Frame {
            universe,
            sequence: None,
            channels: [0u8; DMX_MAX_SLOTS],
            received_at: at,
        }
    }

    #[test]
    fn report_omits_optional_metrics_when_none() {
        let base = Instant::now();
        let report = summarize(&[frame(1, base)], 6454, Duration::from_secs(2));

        let value = serde_json::to_value(&report).expect("report json");
        assert_eq!(value["report_version"], REPORT_VERSION);
        assert_eq!(value["listen"]["port"], 6454);
        assert_eq!(value["window"]["frames_total"], 1);

        // A single unsequenced frame has no rate or loss metrics.
        let universe = &value["universes"][0];
        assert!(universe.get("fps").is_none());
        assert!(universe.get("loss_packets").is_none());
        assert!(universe.get("loss_rate").is_none());
    }

    #[test]
    fn report_orders_universes_ascending() {
        let base = Instant::now();
        let frames = vec![frame(4, base), frame(0, base), frame(2, base)];
        let report = summarize(&frames, 0, Duration::from_millis(200));

        let order: Vec<u16> = report.universes.iter().map(|s| s.universe).collect();
        assert_eq!(order, vec![0, 2, 4]);
        assert_eq!(report.window.frames_total, 3);
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = summarize(&[], 6454, Duration::from_secs(1));
        let json = serde_json::to_string(&report).expect("serialize");
        let back: CaptureReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.report_version, report.report_version);
        assert_eq!(back.tool.name, "dmxtap");
    }
}
