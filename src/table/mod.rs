pub mod delimited;
pub mod record;
pub mod transforms;
pub mod workbook;

pub use delimited::load_from_reader;
pub use record::{AudioFeatures, DateError, TrackRecord, release_date};

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Columns the loader insists on, by their exact spreadsheet names.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "track_name",
    "artist(s)_name",
    "streams",
    "released_year",
    "released_month",
    "released_day",
    "cover_url",
    "acousticness_%",
    "danceability_%",
    "liveness_%",
    "speechiness_%",
    "valence_%",
];

/// Raw position of the one corrupt row in the published dataset (its
/// `streams` cell holds a mangled string). Dropped by position, not content.
pub const KNOWN_BAD_ROW: usize = 574;

/// File extensions read through the workbook loader; anything else is CSV.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Error, Debug)]
pub enum TableError {
    #[error("data file '{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook '{}' has no worksheets", .0.display())]
    EmptyWorkbook(PathBuf),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("{0}")]
    InvalidRow(RowError),
}

pub type Result<T> = std::result::Result<T, TableError>;

/// One data row as trimmed cell text, or why the reader could not produce it.
pub type RawRow = std::result::Result<Vec<String>, String>;

/// A row that could not be turned into a [`TrackRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line in the file (the header is line 1).
    pub line: usize,
    /// Zero-based raw row position.
    pub row: usize,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// How the loader treats the source table.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Raw row positions discarded before parsing.
    pub known_bad_rows: Vec<usize>,
    /// Exclude malformed rows instead of failing the whole load.
    pub skip_invalid_rows: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            known_bad_rows: vec![KNOWN_BAD_ROW],
            skip_invalid_rows: false,
        }
    }
}

/// The cleaned, immutable song table plus what happened while loading it.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub records: Vec<TrackRecord>,
    pub rows_read: usize,
    /// Raw positions removed by [`drop_known_bad_rows`].
    pub dropped_rows: Vec<usize>,
    /// Rows excluded under the lenient row policy.
    pub skipped_rows: Vec<RowError>,
}

impl Table {
    pub fn from_records(records: Vec<TrackRecord>) -> Self {
        Self {
            rows_read: records.len(),
            records,
            dropped_rows: Vec::new(),
            skipped_rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load the song table from a spreadsheet file.
///
/// Workbooks (`.xlsx` and friends) are read from their first worksheet;
/// everything else is parsed as CSV.
pub fn load(path: &Path, opts: &LoadOptions) -> Result<Table> {
    if !path.exists() {
        return Err(TableError::NotFound(path.to_path_buf()));
    }
    let table = if is_workbook(path) {
        workbook::load_workbook(path, opts)?
    } else {
        load_from_reader(File::open(path)?, opts)?
    };
    log::info!(
        "Loaded {} tracks from {} ({} rows read, {} dropped, {} skipped)",
        table.len(),
        path.display(),
        table.rows_read,
        table.dropped_rows.len(),
        table.skipped_rows.len()
    );
    Ok(table)
}

/// Turn a header plus raw rows into the cleaned table.
///
/// Shared by the CSV and workbook readers: resolves columns, applies
/// [`drop_known_bad_rows`], then parses each survivor under the row policy.
pub fn build_table(header: &[String], raw: Vec<RawRow>, opts: &LoadOptions) -> Result<Table> {
    let columns = Columns::resolve(header)?;

    let rows_read = raw.len();
    let (kept, dropped_rows) = drop_known_bad_rows(raw, &opts.known_bad_rows);

    let mut records = Vec::with_capacity(kept.len());
    let mut skipped_rows = Vec::new();

    for (row, result) in kept {
        let line = row + 2;
        let parsed = result.and_then(|cells| parse_row(&cells, &columns, row));

        match parsed {
            Ok(track) => records.push(track),
            Err(message) => {
                let err = RowError { line, row, message };
                if !opts.skip_invalid_rows {
                    return Err(TableError::InvalidRow(err));
                }
                log::warn!("Skipping {}", err);
                skipped_rows.push(err);
            }
        }
    }

    Ok(Table {
        records,
        rows_read,
        dropped_rows,
        skipped_rows,
    })
}

/// Discard rows at fixed raw positions, keeping each survivor's position.
///
/// This is a content-blind cleanup tied to one specific dataset; the
/// lenient row policy (`skip_invalid_rows`) is the content-based alternative.
/// Positions past the end of the table are ignored.
pub fn drop_known_bad_rows<T>(
    rows: Vec<T>,
    bad_rows: &[usize],
) -> (Vec<(usize, T)>, Vec<usize>) {
    let mut kept = Vec::with_capacity(rows.len());
    let mut dropped = Vec::new();
    for (pos, row) in rows.into_iter().enumerate() {
        if bad_rows.contains(&pos) {
            log::debug!("Dropping known-bad row {}", pos);
            dropped.push(pos);
        } else {
            kept.push((pos, row));
        }
    }
    (kept, dropped)
}

/// Header positions of the required columns.
struct Columns {
    track_name: usize,
    artists: usize,
    streams: usize,
    year: usize,
    month: usize,
    day: usize,
    cover_url: usize,
    acousticness: usize,
    danceability: usize,
    liveness: usize,
    speechiness: usize,
    valence: usize,
}

impl Columns {
    fn resolve(header: &[String]) -> Result<Self> {
        // Excel-exported CSVs can carry a BOM on the first header
        let names: Vec<&str> = header
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}'))
            .collect();

        let mut idx = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, col) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = names
                .iter()
                .position(|n| *n == col)
                .ok_or(TableError::MissingColumn(col))?;
        }

        let [
            track_name,
            artists,
            streams,
            year,
            month,
            day,
            cover_url,
            acousticness,
            danceability,
            liveness,
            speechiness,
            valence,
        ] = idx;
        Ok(Self {
            track_name,
            artists,
            streams,
            year,
            month,
            day,
            cover_url,
            acousticness,
            danceability,
            liveness,
            speechiness,
            valence,
        })
    }
}

fn cell(cells: &[String], idx: usize) -> &str {
    cells.get(idx).map(String::as_str).unwrap_or("")
}

fn parse_num<T: std::str::FromStr>(
    cells: &[String],
    idx: usize,
    col: &str,
) -> std::result::Result<T, String> {
    let raw = cell(cells, idx);
    raw.parse::<T>()
        .map_err(|_| format!("bad {col} value \"{raw}\""))
}

fn parse_feature(
    cells: &[String],
    idx: usize,
    col: &str,
) -> std::result::Result<Option<u8>, String> {
    let raw = cell(cells, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u8>() {
        Ok(v) if v <= 100 => Ok(Some(v)),
        _ => Err(format!("bad {col} value \"{raw}\" (expected 0-100)")),
    }
}

fn parse_row(
    cells: &[String],
    c: &Columns,
    row: usize,
) -> std::result::Result<TrackRecord, String> {
    let track_name = cell(cells, c.track_name).to_string();
    if track_name.is_empty() {
        return Err("empty track_name".to_string());
    }

    let year: i32 = parse_num(cells, c.year, "released_year")?;
    let month: u32 = parse_num(cells, c.month, "released_month")?;
    let day: u32 = parse_num(cells, c.day, "released_day")?;
    let date = release_date(year, month, day).map_err(|e| e.to_string())?;

    Ok(TrackRecord {
        row,
        track_name,
        artists: cell(cells, c.artists).to_string(),
        streams: parse_num(cells, c.streams, "streams")?,
        released_year: year,
        released_month: month,
        released_day: day,
        release_date: date,
        features: AudioFeatures {
            acousticness: parse_feature(cells, c.acousticness, "acousticness_%")?,
            danceability: parse_feature(cells, c.danceability, "danceability_%")?,
            liveness: parse_feature(cells, c.liveness, "liveness_%")?,
            speechiness: parse_feature(cells, c.speechiness, "speechiness_%")?,
            valence: parse_feature(cells, c.valence, "valence_%")?,
        },
        cover_url: cell(cells, c.cover_url).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn row(name: &str, streams: &str, y: &str, m: &str, d: &str) -> RawRow {
        Ok([name, "X", streams, y, m, d, "u", "1", "2", "3", "4", "5"]
            .iter()
            .map(|c| c.to_string())
            .collect())
    }

    #[test]
    fn test_build_table_columns_in_any_order() {
        let mut h = header();
        h.reverse();
        let cells: Vec<String> = ["5", "4", "3", "2", "1", "u", "1", "1", "2020", "9", "X", "A"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let table = build_table(&h, vec![Ok(cells)], &LoadOptions::default()).unwrap();
        let t = &table.records[0];
        assert_eq!(t.track_name, "A");
        assert_eq!(t.streams, 9);
        assert_eq!(t.features.acousticness, Some(1));
        assert_eq!(t.features.valence, Some(5));
    }

    #[test]
    fn test_build_table_reader_error_is_row_error() {
        let raw = vec![row("A", "1", "2020", "1", "1"), Err("CSV parse error: boom".into())];
        let err = build_table(&header(), raw, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "line 3: CSV parse error: boom");
    }

    #[test]
    fn test_short_row_reads_missing_cells_as_empty() {
        let raw = vec![Ok(vec!["A".to_string()])];
        let err = build_table(&header(), raw, &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("bad released_year value \"\""));
    }

    #[test]
    fn test_empty_track_name_rejected() {
        let raw = vec![row("", "1", "2020", "1", "1")];
        assert!(build_table(&header(), raw, &LoadOptions::default()).is_err());
    }

    #[test]
    fn test_drop_known_bad_rows_by_position() {
        let rows: Vec<u32> = (0..600).collect();
        let (kept, dropped) = drop_known_bad_rows(rows, &[KNOWN_BAD_ROW]);
        assert_eq!(dropped, vec![574]);
        assert_eq!(kept.len(), 599);
        assert!(kept.iter().all(|(pos, v)| *pos as u32 == *v && *pos != 574));
        assert_eq!(kept[574], (575, 575));
    }

    #[test]
    fn test_drop_known_bad_rows_short_table() {
        let (kept, dropped) = drop_known_bad_rows(vec!['a', 'b'], &[KNOWN_BAD_ROW]);
        assert!(dropped.is_empty());
        assert_eq!(kept, vec![(0, 'a'), (1, 'b')]);
    }

    #[test]
    fn test_is_workbook() {
        assert!(is_workbook(Path::new("dataSet/spotify.xlsx")));
        assert!(is_workbook(Path::new("dataSet/SPOTIFY.XLSX")));
        assert!(is_workbook(Path::new("songs.ods")));
        assert!(!is_workbook(Path::new("dataSet/spotify.csv")));
        assert!(!is_workbook(Path::new("spotify")));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataSet").join("spotify.xlsx");
        let err = load(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            format!("data file '{}' not found", path.display())
        );
    }
}
