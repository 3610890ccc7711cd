use std::io::Read;

use super::{LoadOptions, RawRow, Result, Table, build_table};

/// Load the song table from CSV text.
///
/// Cells are decoded lossily so a stray non-UTF-8 byte in a title does not
/// take the whole row down.
pub fn load_from_reader<R: Read>(reader: R, opts: &LoadOptions) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let raw: Vec<RawRow> = rdr
        .byte_records()
        .map(|rec| {
            rec.map(|r| {
                r.iter()
                    .map(|c| String::from_utf8_lossy(c).into_owned())
                    .collect()
            })
            .map_err(|e| format!("CSV parse error: {e}"))
        })
        .collect();

    build_table(&header, raw, opts)
}
