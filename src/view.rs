use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::format::{Styled, format_large_number, format_percentage};
use crate::metrics::{KpiColors, Summary, format_kpi};
use crate::table::transforms::{self, DateRange, YearCount};
use crate::table::{Table, TrackRecord};

#[derive(Error, Debug, PartialEq)]
pub enum ViewError {
    #[error("no track named \"{0}\"")]
    UnknownTrack(String),
}

/// Knobs for building a view.
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions<'c> {
    /// Bars in the most-streamed chart.
    pub top_n: usize,
    /// `up` doubles as the brand colour for values.
    pub colors: KpiColors<'c>,
}

impl Default for ViewOptions<'_> {
    fn default() -> Self {
        Self {
            top_n: 10,
            colors: KpiColors::default(),
        }
    }
}

/// Detail panel for the selected track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackDetail {
    pub name: String,
    pub first_artist: String,
    pub artists: Vec<String>,
    pub artist_count: usize,
    pub streams: u64,
    pub streams_display: Styled,
    pub release_date: NaiveDate,
    /// Release date as `year-month-day` without zero padding.
    pub date_label: String,
    pub cover_url: String,
}

/// One audio-feature tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureTile {
    pub label: &'static str,
    pub value: Styled,
}

/// One bar of the most-streamed chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub track_name: String,
    pub streams: u64,
    pub streams_display: Styled,
}

/// The three summary tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiTiles {
    pub average_streams: Styled,
    pub top_song_label: String,
    pub top_song_streams: Styled,
    pub top_vs_average: Styled,
}

/// Everything the presentation layer binds to widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    /// `None` only when the table is empty.
    pub track: Option<TrackDetail>,
    pub features: Vec<FeatureTile>,
    /// `None` only when the table is empty.
    pub range: Option<DateRange>,
    /// Empty when no track was released inside `range`.
    pub top_tracks: Vec<ChartBar>,
    pub kpis: KpiTiles,
    pub releases: Vec<YearCount>,
}

/// The immutable song table plus the aggregates that stay fixed for a
/// session: the descending sort, the summary KPIs and the date bounds.
///
/// [`Dashboard::view`] is a pure function of this state and the two user
/// inputs, and is recomputed from scratch for every interaction.
pub struct Dashboard<'a> {
    table: &'a Table,
    sorted: Vec<&'a TrackRecord>,
    summary: Summary,
    bounds: Option<DateRange>,
    releases: Vec<YearCount>,
}

impl<'a> Dashboard<'a> {
    pub fn new(table: &'a Table) -> Self {
        let sorted = transforms::sort_by_streams_desc(&table.records);
        let summary = Summary::compute(&table.records, &sorted);
        let bounds = DateRange::bounds(&table.records);
        let releases = transforms::releases_per_year(&table.records);
        log::debug!(
            "Dashboard over {} tracks, bounds {:?}, {} release years",
            table.len(),
            bounds,
            releases.len()
        );
        Self {
            table,
            sorted,
            summary,
            bounds,
            releases,
        }
    }

    /// Tracks most-streamed first; this is also the track selector order.
    pub fn sorted(&self) -> &[&'a TrackRecord] {
        &self.sorted
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Min/max release dates, the default range.
    pub fn bounds(&self) -> Option<DateRange> {
        self.bounds
    }

    pub fn releases(&self) -> &[YearCount] {
        &self.releases
    }

    /// Resolve a selection by exact name. No name selects the top track.
    pub fn select(&self, name: Option<&str>) -> Result<Option<&'a TrackRecord>, ViewError> {
        match name {
            None => Ok(self.sorted.first().copied()),
            Some(n) => transforms::find_track(&self.sorted, n)
                .map(Some)
                .ok_or_else(|| ViewError::UnknownTrack(n.to_string())),
        }
    }

    /// Most-streamed track whose name contains `needle`, ignoring case.
    pub fn search(&self, needle: &str) -> Option<&'a TrackRecord> {
        transforms::search_track(&self.sorted, needle)
    }

    pub fn track_detail(&self, t: &TrackRecord, opts: &ViewOptions<'_>) -> TrackDetail {
        TrackDetail {
            name: t.track_name.clone(),
            first_artist: t.first_artist().to_string(),
            artists: t.artist_names().into_iter().map(String::from).collect(),
            artist_count: t.artist_count(),
            streams: t.streams,
            streams_display: format_large_number(Some(t.streams as f64), Some(opts.colors.up)),
            release_date: t.release_date,
            date_label: format!("{}-{}-{}", t.released_year, t.released_month, t.released_day),
            cover_url: t.cover_url.clone(),
        }
    }

    pub fn feature_tiles(&self, t: &TrackRecord, opts: &ViewOptions<'_>) -> Vec<FeatureTile> {
        t.features
            .labelled()
            .into_iter()
            .map(|(label, v)| FeatureTile {
                label,
                value: format_percentage(v, Some(opts.colors.up)),
            })
            .collect()
    }

    /// Bars for the most-streamed chart within `range`.
    pub fn top_tracks(&self, range: &DateRange, opts: &ViewOptions<'_>) -> Vec<ChartBar> {
        transforms::top_n_in_range(&self.table.records, range, opts.top_n)
            .into_iter()
            .map(|t| ChartBar {
                track_name: t.track_name.clone(),
                streams: t.streams,
                streams_display: format_large_number(Some(t.streams as f64), None),
            })
            .collect()
    }

    pub fn kpi_tiles(&self, opts: &ViewOptions<'_>) -> KpiTiles {
        let s = &self.summary;
        KpiTiles {
            average_streams: format_large_number(s.average_streams, None),
            top_song_label: match &s.top_track_name {
                Some(name) => format!("Streams for Top Song: {name}"),
                None => "Streams for Top Song".to_string(),
            },
            top_song_streams: format_large_number(s.top_track_streams.map(|v| v as f64), None),
            top_vs_average: format_kpi(s.top_vs_average, opts.colors),
        }
    }

    /// Build the whole view for one interaction.
    ///
    /// `range` defaults to the table's date bounds.
    pub fn view(
        &self,
        selection: Option<&str>,
        range: Option<DateRange>,
        opts: &ViewOptions<'_>,
    ) -> Result<DerivedView, ViewError> {
        let selected = self.select(selection)?;
        let range = range.or(self.bounds);

        let top_tracks = match &range {
            Some(r) => self.top_tracks(r, opts),
            None => Vec::new(),
        };
        if top_tracks.is_empty() && !self.table.is_empty() {
            log::info!("No tracks released in {:?}", range);
        }

        Ok(DerivedView {
            track: selected.map(|t| self.track_detail(t, opts)),
            features: selected
                .map(|t| self.feature_tiles(t, opts))
                .unwrap_or_default(),
            range,
            top_tracks,
            kpis: self.kpi_tiles(opts),
            releases: self.releases.clone(),
        })
    }
}
