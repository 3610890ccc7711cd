use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use super::{LoadOptions, RawRow, Result, Table, TableError, build_table};

/// Load the song table from the first worksheet of a spreadsheet workbook.
pub fn load_workbook(path: &Path, opts: &LoadOptions) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::EmptyWorkbook(path.to_path_buf()))??;
    log::debug!(
        "Worksheet {} has {} rows x {} columns",
        path.display(),
        range.height(),
        range.width()
    );
    table_from_range(&range, opts)
}

/// The first row of the range is the header; every later row is data.
pub fn table_from_range(range: &Range<Data>, opts: &LoadOptions) -> Result<Table> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(cell_text).collect())
        .unwrap_or_default();
    let raw: Vec<RawRow> = rows
        .map(|r| Ok(r.iter().map(cell_text).collect()))
        .collect();
    build_table(&header, raw, opts)
}

/// Cell text as the shared row parser expects it.
///
/// Workbooks store every number as a float, so whole values drop the `.0`
/// that would otherwise fail integer parsing.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{KNOWN_BAD_ROW, REQUIRED_COLUMNS, load};

    fn sheet(rows: &[Vec<Data>]) -> Range<Data> {
        let width = REQUIRED_COLUMNS.len() as u32;
        let mut range = Range::new((0, 0), (rows.len() as u32, width - 1));
        for (c, name) in REQUIRED_COLUMNS.iter().enumerate() {
            range.set_value((0, c as u32), Data::String(name.to_string()));
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                range.set_value((r as u32 + 1, c as u32), v.clone());
            }
        }
        range
    }

    fn track(name: &str, streams: Data, y: f64, m: f64, d: f64) -> Vec<Data> {
        let s = |v: &str| Data::String(v.to_string());
        vec![
            s(name),
            s("Latto, Jung Kook"),
            streams,
            Data::Float(y),
            Data::Float(m),
            Data::Float(d),
            s("https://i.scdn.co/image/a"),
            Data::Float(31.0),
            Data::Float(80.0),
            Data::Empty,
            Data::Int(4),
            Data::Float(89.0),
        ]
    }

    fn no_drops() -> LoadOptions {
        LoadOptions {
            known_bad_rows: Vec::new(),
            skip_invalid_rows: false,
        }
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  Seven ".into())), "Seven");
        assert_eq!(cell_text(&Data::Float(141381703.0)), "141381703");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Int(2023)), "2023");
    }

    #[test]
    fn test_range_rows_parse_like_csv() {
        let range = sheet(&[track("Seven", Data::Float(141381703.0), 2023.0, 7.0, 14.0)]);
        let table = table_from_range(&range, &no_drops()).unwrap();
        assert_eq!(table.len(), 1);

        let t = &table.records[0];
        assert_eq!(t.track_name, "Seven");
        assert_eq!(t.artist_count(), 2);
        assert_eq!(t.streams, 141_381_703);
        assert_eq!((t.released_year, t.released_month, t.released_day), (2023, 7, 14));
        assert_eq!(t.features.acousticness, Some(31));
        assert_eq!(t.features.liveness, None);
        assert_eq!(t.features.speechiness, Some(4));
    }

    #[test]
    fn test_range_invalid_date_reports_line() {
        let range = sheet(&[
            track("A", Data::Float(5.0), 2020.0, 1.0, 1.0),
            track("B", Data::Float(5.0), 2021.0, 2.0, 30.0),
        ]);
        let err = table_from_range(&range, &no_drops()).unwrap_err();
        assert_eq!(err.to_string(), "line 3: invalid release date 2021-2-30");
    }

    #[test]
    fn test_range_drops_row_574() {
        let mut rows: Vec<Vec<Data>> = (0..576)
            .map(|i| track(&format!("T{i}"), Data::Float(i as f64), 2020.0, 1.0, 1.0))
            .collect();
        rows[KNOWN_BAD_ROW] = track(
            "Broken",
            Data::String("BPM110KeyAModeMajor".into()),
            2020.0,
            1.0,
            1.0,
        );
        let table = table_from_range(&sheet(&rows), &LoadOptions::default()).unwrap();
        assert_eq!(table.rows_read, 576);
        assert_eq!(table.len(), 575);
        assert_eq!(table.dropped_rows, vec![KNOWN_BAD_ROW]);
        assert!(table.records.iter().all(|t| t.track_name != "Broken"));
    }

    #[test]
    fn test_empty_sheet_is_missing_columns() {
        let range: Range<Data> = Range::empty();
        let err = table_from_range(&range, &no_drops()).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("track_name")));
    }

    #[test]
    fn test_load_xlsx_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spotify.xlsx");

        let mut book = rust_xlsxwriter::Workbook::new();
        let ws = book.add_worksheet();
        let header = [
            "track_name",
            "artist(s)_name",
            "released_year",
            "released_month",
            "released_day",
            "streams",
            "danceability_%",
            "valence_%",
            "acousticness_%",
            "liveness_%",
            "speechiness_%",
            "cover_url",
        ];
        for (c, name) in header.iter().enumerate() {
            ws.write_string(0, c as u16, *name).unwrap();
        }
        let rows = [
            ("Seven", "Latto, Jung Kook", 141381703.0),
            ("Flowers", "Miley Cyrus", 1316855716.0),
        ];
        for (r, (name, artists, streams)) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            ws.write_string(r, 0, *name).unwrap();
            ws.write_string(r, 1, *artists).unwrap();
            ws.write_number(r, 2, 2023.0).unwrap();
            ws.write_number(r, 3, 7.0).unwrap();
            ws.write_number(r, 4, 14.0).unwrap();
            ws.write_number(r, 5, *streams).unwrap();
            for c in 6..11 {
                ws.write_number(r, c, 50.0).unwrap();
            }
            ws.write_string(r, 11, "https://i.scdn.co/image/a").unwrap();
        }
        book.save(&path).unwrap();

        let table = load(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].first_artist(), "Latto");
        assert_eq!(table.records[1].streams, 1_316_855_716);
        assert_eq!(table.records[1].features.valence, Some(50));
    }
}
