use serde::Serialize;

use crate::format::{BRAND_COLOR, Styled, WARNING_COLOR};
use crate::table::TrackRecord;

/// Arithmetic mean of `streams`, or `None` for an empty table.
pub fn average_streams(records: &[TrackRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let total: f64 = records.iter().map(|t| t.streams as f64).sum();
    Some(total / records.len() as f64)
}

/// First entry of a most-streamed-first ordering.
pub fn top_track<'a>(sorted: &[&'a TrackRecord]) -> Option<&'a TrackRecord> {
    sorted.first().copied()
}

/// Relative excess of the top track over the average: `(top - avg) / avg`.
/// `None` when the average is exactly zero.
pub fn top_song_vs_average(top_streams: f64, average_streams: f64) -> Option<f64> {
    if average_streams == 0.0 {
        return None;
    }
    Some((top_streams - average_streams) / average_streams)
}

/// Colours used when rendering a KPI delta.
#[derive(Debug, Clone, Copy)]
pub struct KpiColors<'a> {
    pub up: &'a str,
    pub down: &'a str,
}

impl Default for KpiColors<'_> {
    fn default() -> Self {
        Self {
            up: BRAND_COLOR,
            down: WARNING_COLOR,
        }
    }
}

/// `"50.0% ▲"` for a positive ratio, `"-12.5% ▼"` otherwise.
///
/// Zero counts as down.
pub fn format_kpi(ratio: Option<f64>, colors: KpiColors<'_>) -> Styled {
    match ratio {
        None => Styled::no_data(),
        Some(r) if r > 0.0 => Styled::colored(format!("{:.1}% ▲", r * 100.0), colors.up),
        Some(r) => Styled::colored(format!("{:.1}% ▼", r * 100.0), colors.down),
    }
}

/// Global KPIs over the cleaned table, computed once per load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub track_count: usize,
    pub average_streams: Option<f64>,
    pub top_track_name: Option<String>,
    pub top_track_streams: Option<u64>,
    pub top_vs_average: Option<f64>,
}

impl Summary {
    /// `sorted` must be `records` ordered most-streamed first.
    pub fn compute(records: &[TrackRecord], sorted: &[&TrackRecord]) -> Self {
        let average = average_streams(records);
        let top = top_track(sorted);
        let ratio = match (top, average) {
            (Some(t), Some(avg)) => top_song_vs_average(t.streams as f64, avg),
            _ => None,
        };
        Self {
            track_count: records.len(),
            average_streams: average,
            top_track_name: top.map(|t| t.track_name.clone()),
            top_track_streams: top.map(|t| t.streams),
            top_vs_average: ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::transforms::sort_by_streams_desc;
    use crate::table::{AudioFeatures, release_date};

    fn make_track(name: &str, streams: u64) -> TrackRecord {
        TrackRecord {
            row: 0,
            track_name: name.to_string(),
            artists: "Artist".to_string(),
            streams,
            released_year: 2020,
            released_month: 1,
            released_day: 1,
            release_date: release_date(2020, 1, 1).unwrap(),
            features: AudioFeatures::default(),
            cover_url: String::new(),
        }
    }

    #[test]
    fn test_ratio_basic() {
        assert_eq!(top_song_vs_average(150.0, 100.0), Some(0.5));
        assert_eq!(top_song_vs_average(50.0, 100.0), Some(-0.5));
    }

    #[test]
    fn test_ratio_zero_average() {
        assert_eq!(top_song_vs_average(150.0, 0.0), None);
        assert_eq!(top_song_vs_average(0.0, 0.0), None);
    }

    #[test]
    fn test_kpi_up() {
        let s = format_kpi(Some(0.5), KpiColors::default());
        assert_eq!(s.text(), "50.0% ▲");
        assert_eq!(s.color.as_deref(), Some(BRAND_COLOR));
    }

    #[test]
    fn test_kpi_down() {
        let s = format_kpi(Some(-0.125), KpiColors::default());
        assert_eq!(s.text(), "-12.5% ▼");
        assert_eq!(s.color.as_deref(), Some(WARNING_COLOR));
    }

    #[test]
    fn test_kpi_zero_is_down() {
        let s = format_kpi(Some(0.0), KpiColors::default());
        assert_eq!(s.text(), "0.0% ▼");
        assert_eq!(s.color.as_deref(), Some(WARNING_COLOR));
    }

    #[test]
    fn test_kpi_absent() {
        assert!(format_kpi(None, KpiColors::default()).is_no_data());
    }

    #[test]
    fn test_kpi_custom_colors() {
        let colors = KpiColors { up: "lime", down: "orange" };
        assert_eq!(format_kpi(Some(1.0), colors).color.as_deref(), Some("lime"));
        assert_eq!(format_kpi(Some(-1.0), colors).color.as_deref(), Some("orange"));
    }

    #[test]
    fn test_average() {
        let records = vec![make_track("a", 100), make_track("b", 300), make_track("c", 200)];
        assert_eq!(average_streams(&records), Some(200.0));
        assert_eq!(average_streams(&[]), None);
    }

    #[test]
    fn test_summary_three_tracks() {
        let records = vec![make_track("a", 100), make_track("b", 300), make_track("c", 200)];
        let sorted = sort_by_streams_desc(&records);
        let s = Summary::compute(&records, &sorted);

        assert_eq!(s.track_count, 3);
        assert_eq!(s.average_streams, Some(200.0));
        assert_eq!(s.top_track_name.as_deref(), Some("b"));
        assert_eq!(s.top_track_streams, Some(300));
        assert_eq!(s.top_vs_average, Some(0.5));
        assert_eq!(format_kpi(s.top_vs_average, KpiColors::default()).text(), "50.0% ▲");
    }

    #[test]
    fn test_summary_empty_table() {
        let s = Summary::compute(&[], &[]);
        assert_eq!(s.track_count, 0);
        assert_eq!(s.average_streams, None);
        assert_eq!(s.top_track_name, None);
        assert_eq!(s.top_vs_average, None);
    }

    #[test]
    fn test_summary_all_zero_streams() {
        let records = vec![make_track("a", 0), make_track("b", 0)];
        let sorted = sort_by_streams_desc(&records);
        let s = Summary::compute(&records, &sorted);
        assert_eq!(s.average_streams, Some(0.0));
        assert_eq!(s.top_vs_average, None);
    }
}
