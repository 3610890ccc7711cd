use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// An impossible (year, month, day) combination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid release date {year}-{month}-{day}")]
pub struct DateError {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Combine the three `released_*` columns into a calendar date.
pub fn release_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, DateError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateError { year, month, day })
}

/// The five 0–100 audio features. An empty cell is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AudioFeatures {
    pub acousticness: Option<u8>,
    pub danceability: Option<u8>,
    pub liveness: Option<u8>,
    pub speechiness: Option<u8>,
    pub valence: Option<u8>,
}

impl AudioFeatures {
    /// Labelled values in dashboard order.
    pub fn labelled(&self) -> [(&'static str, Option<u8>); 5] {
        [
            ("Acousticness", self.acousticness),
            ("Danceability", self.danceability),
            ("Liveness", self.liveness),
            ("Speechiness", self.speechiness),
            ("Valence", self.valence),
        ]
    }
}

/// One row of the song table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    /// Zero-based position in the raw spreadsheet, before any rows were dropped.
    pub row: usize,
    pub track_name: String,
    /// Comma-separated, as stored in the `artist(s)_name` column.
    pub artists: String,
    pub streams: u64,
    pub released_year: i32,
    pub released_month: u32,
    pub released_day: u32,
    pub release_date: NaiveDate,
    pub features: AudioFeatures,
    pub cover_url: String,
}

impl TrackRecord {
    /// First name in the artist list.
    pub fn first_artist(&self) -> &str {
        self.artists.split(',').next().unwrap_or("").trim()
    }

    /// Number of comma-separated segments. No dedup, no validation.
    pub fn artist_count(&self) -> usize {
        self.artists.split(',').count()
    }

    /// Trimmed artist names in listed order.
    pub fn artist_names(&self) -> Vec<&str> {
        self.artists.split(',').map(str::trim).collect()
    }
}
