use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::TrackRecord;

/// Inclusive range of release dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `start <= date <= end`. An inverted range contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Earliest and latest release dates in the table, or `None` if empty.
    pub fn bounds(records: &[TrackRecord]) -> Option<Self> {
        let start = records.iter().map(|t| t.release_date).min()?;
        let end = records.iter().map(|t| t.release_date).max()?;
        Some(Self { start, end })
    }

    /// Fill whichever end the user left out from `bounds`.
    ///
    /// A lone start past the latest release (or a lone end before the
    /// earliest) gives an inverted range, so the chart comes out empty.
    pub fn with_defaults(
        bounds: DateRange,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        Self {
            start: start.unwrap_or(bounds.start),
            end: end.unwrap_or(bounds.end),
        }
    }
}

/// Number of tracks released in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Tracks ordered by streams, most-streamed first. Ties keep table order.
pub fn sort_by_streams_desc<'a, I>(records: I) -> Vec<&'a TrackRecord>
where
    I: IntoIterator<Item = &'a TrackRecord>,
{
    let mut sorted: Vec<&TrackRecord> = records.into_iter().collect();
    // sort_by is stable
    sorted.sort_by(|a, b| b.streams.cmp(&a.streams));
    sorted
}

/// Tracks whose release date falls inside `range`, in table order.
pub fn filter_by_date<'a, I>(records: I, range: &DateRange) -> Vec<&'a TrackRecord>
where
    I: IntoIterator<Item = &'a TrackRecord>,
{
    records
        .into_iter()
        .filter(|t| range.contains(t.release_date))
        .collect()
}

/// The `n` most-streamed tracks released inside `range`.
/// Returns an empty list when nothing falls in the range.
pub fn top_n_in_range<'a>(
    records: &'a [TrackRecord],
    range: &DateRange,
    n: usize,
) -> Vec<&'a TrackRecord> {
    let mut top = sort_by_streams_desc(filter_by_date(records, range));
    top.truncate(n);
    top
}

/// Count tracks per `released_year`, ascending by year.
pub fn releases_per_year(records: &[TrackRecord]) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for t in records {
        *counts.entry(t.released_year).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// First track with exactly this name in `sorted` order.
pub fn find_track<'a>(sorted: &[&'a TrackRecord], name: &str) -> Option<&'a TrackRecord> {
    sorted.iter().find(|t| t.track_name == name).copied()
}

/// First track in `sorted` order whose name contains `needle`, ignoring case.
pub fn search_track<'a>(sorted: &[&'a TrackRecord], needle: &str) -> Option<&'a TrackRecord> {
    let needle = needle.to_lowercase();
    sorted
        .iter()
        .find(|t| t.track_name.to_lowercase().contains(&needle))
        .copied()
}
