use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::UniverseSummary;
use crate::capture::Frame;
use crate::protocols::artnet::layout::DMX_MAX_SLOTS;

#[derive(Debug, Default)]
struct UniverseStats {
    frames: u64,
    first_at: Option<Instant>,
    last_at: Option<Instant>,
    last_seq: Option<u8>,
    seq_seen: bool,
    loss: u64,
}

/// Aggregate captured frames into per-universe summaries, sorted by
/// universe for deterministic report output.
pub(crate) fn build_universe_summaries(frames: &[Frame]) -> Vec<UniverseSummary> {
    let mut stats: HashMap<u16, UniverseStats> = HashMap::new();

    for frame in frames {
        let entry = stats.entry(frame.universe).or_default();
        entry.frames += 1;
        if entry.first_at.is_none() {
            entry.first_at = Some(frame.received_at);
        }
        entry.last_at = Some(frame.received_at);

        if let Some(seq) = frame.sequence {
            if let Some(last) = entry.last_seq {
                // Wrapping gap against the expected successor; gaps of 128+
                // look like restarts rather than loss and are not counted.
                let gap = seq.wrapping_sub(last.wrapping_add(1));
                if gap > 0 && gap < 128 {
                    entry.loss += u64::from(gap);
                }
            }
            entry.seq_seen = true;
            entry.last_seq = Some(seq);
        }
    }

    let mut universes: Vec<UniverseSummary> = stats
        .into_iter()
        .map(|(universe, stats)| {
            let fps = match (stats.first_at, stats.last_at) {
                (Some(first), Some(last)) if last > first => {
                    Some(stats.frames as f64 / last.duration_since(first).as_secs_f64())
                }
                _ => None,
            };
            let loss_packets = if stats.seq_seen && stats.frames > 1 {
                Some(stats.loss)
            } else {
                None
            };
            let loss_rate =
                loss_packets.map(|loss| loss as f64 / (stats.frames + loss) as f64);

            UniverseSummary {
                universe,
                frames_count: stats.frames,
                fps,
                loss_packets,
                loss_rate,
            }
        })
        .collect();

    universes.sort_by_key(|summary| summary.universe);
    universes
}

/// Frames belonging to one universe, arrival order preserved.
pub fn frames_for_universe(frames: &[Frame], universe: u16) -> Vec<Frame> {
    frames
        .iter()
        .filter(|frame| frame.universe == universe)
        .cloned()
        .collect()
}

/// Value series for one channel of one universe, each entry offset from the
/// first matching frame. The raw material for fade-progression assertions:
/// a 1s fade to full should show values rising across the window, a snap a
/// single step.
pub fn channel_trace(frames: &[Frame], universe: u16, channel: usize) -> Vec<(Duration, u8)> {
    if channel >= DMX_MAX_SLOTS {
        return Vec::new();
    }
    let mut first_at: Option<Instant> = None;
    frames
        .iter()
        .filter(|frame| frame.universe == universe)
        .map(|frame| {
            let base = *first_at.get_or_insert(frame.received_at);
            (frame.received_at.duration_since(base), frame.channels[channel])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{build_universe_summaries, channel_trace, frames_for_universe};
    use crate::capture::Frame;
    use crate::protocols::artnet::layout::DMX_MAX_SLOTS;

    fn frame(universe: u16, sequence: Option<u8>, level: u8, at: Instant) -> Frame {
        let mut channels = [0u8; DMX_MAX_SLOTS];
        channels[0] = level;
        Frame {
            universe,
            sequence,
            channels,
            received_at: at,
        }
    }

    #[test]
    fn summaries_compute_fps_over_observed_span() {
        let base = Instant::now();
        let frames: Vec<Frame> = (0..5)
            .map(|i| {
                frame(
                    1,
                    Some(i as u8 + 1),
                    0,
                    base + Duration::from_millis(25 * i),
                )
            })
            .collect();

        let summaries = build_universe_summaries(&frames);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].universe, 1);
        assert_eq!(summaries[0].frames_count, 5);
        let fps = summaries[0].fps.unwrap();
        // 5 frames over a 100ms span.
        assert!((fps - 50.0).abs() < 1.0, "fps = {fps}");
        assert_eq!(summaries[0].loss_packets, Some(0));
    }

    #[test]
    fn summaries_count_sequence_gaps_as_loss() {
        let base = Instant::now();
        let frames = vec![
            frame(0, Some(1), 0, base),
            frame(0, Some(2), 0, base + Duration::from_millis(25)),
            frame(0, Some(5), 0, base + Duration::from_millis(50)),
        ];

        let summaries = build_universe_summaries(&frames);
        assert_eq!(summaries[0].loss_packets, Some(2));
        let rate = summaries[0].loss_rate.unwrap();
        assert!((rate - 0.4).abs() < 1e-9, "loss_rate = {rate}");
    }

    #[test]
    fn summaries_without_sequences_omit_loss() {
        let base = Instant::now();
        let frames = vec![
            frame(0, None, 0, base),
            frame(0, None, 0, base + Duration::from_millis(25)),
        ];

        let summaries = build_universe_summaries(&frames);
        assert_eq!(summaries[0].loss_packets, None);
        assert_eq!(summaries[0].loss_rate, None);
    }

    #[test]
    fn summaries_sort_by_universe() {
        let base = Instant::now();
        let frames = vec![
            frame(7, None, 0, base),
            frame(0, None, 0, base),
            frame(3, None, 0, base),
        ];

        let summaries = build_universe_summaries(&frames);
        let order: Vec<u16> = summaries.iter().map(|s| s.universe).collect();
        assert_eq!(order, vec![0, 3, 7]);
    }

    #[test]
    fn channel_trace_tracks_one_channel_over_time() {
        let base = Instant::now();
        let frames = vec![
            frame(1, None, 0, base),
            frame(2, None, 99, base + Duration::from_millis(10)),
            frame(1, None, 128, base + Duration::from_millis(40)),
            frame(1, None, 255, base + Duration::from_millis(80)),
        ];

        let trace = channel_trace(&frames, 1, 0);
        assert_eq!(
            trace,
            vec![
                (Duration::ZERO, 0),
                (Duration::from_millis(40), 128),
                (Duration::from_millis(80), 255),
            ]
        );

        assert!(channel_trace(&frames, 1, DMX_MAX_SLOTS).is_empty());
    }

    #[test]
    fn frames_for_universe_filters_and_keeps_order() {
        let base = Instant::now();
        let frames = vec![
            frame(1, None, 10, base),
            frame(2, None, 20, base),
            frame(1, None, 30, base + Duration::from_millis(5)),
        ];

        let filtered = frames_for_universe(&frames, 1);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].channels[0], 10);
        assert_eq!(filtered[1].channels[0], 30);
    }
}
