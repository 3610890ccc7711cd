use std::fmt::Write;

use crate::format::escape_html;
use crate::table::transforms::{DateRange, YearCount};
use crate::view::{ChartBar, DerivedView, FeatureTile, KpiTiles, TrackDetail};

const BAR_WIDTH: usize = 40;

/// Shorten to `max` characters, ending in `...` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// `value / max` scaled to `width` columns of `#`, at least one for non-zero values.
fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let cols = ((value as f64 / max as f64) * width as f64).round() as usize;
    "#".repeat(cols.max(1))
}

pub fn track_detail(d: &TrackDetail) -> String {
    let mut out = String::new();
    writeln!(out, "Track Details").ok();
    writeln!(out, "=============").ok();
    writeln!(out, "Track Name:    {}", d.name).ok();
    writeln!(out, "First Artist:  {}", d.first_artist).ok();
    writeln!(out, "Artist Count:  {}", d.artist_count).ok();
    writeln!(out, "Streams:       {}", d.streams_display).ok();
    writeln!(out, "Date:          {}", d.date_label).ok();
    if !d.cover_url.is_empty() {
        writeln!(out, "Cover:         {}", d.cover_url).ok();
    }
    out
}

pub fn feature_tiles(tiles: &[FeatureTile]) -> String {
    let mut out = String::new();
    writeln!(out, "Audio Features").ok();
    writeln!(out, "==============").ok();
    for t in tiles {
        writeln!(out, "  {:<14} {:>8}", t.label, t.value).ok();
    }
    out
}

pub fn top_tracks(bars: &[ChartBar], range: Option<&DateRange>) -> String {
    let mut out = String::new();
    match range {
        Some(r) => writeln!(
            out,
            "Top {} Most Streamed Tracks ({} to {})",
            bars.len(),
            r.start.format("%Y-%m-%d"),
            r.end.format("%Y-%m-%d")
        )
        .ok(),
        None => writeln!(out, "Top Most Streamed Tracks").ok(),
    };
    writeln!(out, "{}", "-".repeat(80)).ok();

    if bars.is_empty() {
        writeln!(out, "No tracks released in the selected date range.").ok();
        return out;
    }

    let max = bars.iter().map(|b| b.streams).max().unwrap_or(0);
    for b in bars {
        writeln!(
            out,
            "{:<30} {:>8}  {}",
            truncate(&b.track_name, 30),
            b.streams_display,
            bar(b.streams, max, BAR_WIDTH)
        )
        .ok();
    }
    out
}

pub fn kpi_tiles(k: &KpiTiles) -> String {
    let mut out = String::new();
    writeln!(out, "Overall Dataset Summary").ok();
    writeln!(out, "=======================").ok();
    writeln!(out, "Average Streams (All Songs):  {}", k.average_streams).ok();
    writeln!(out, "{}:  {}", k.top_song_label, k.top_song_streams).ok();
    writeln!(out, "Top Song vs. Average:  {}", k.top_vs_average).ok();
    out
}

pub fn releases(years: &[YearCount]) -> String {
    let mut out = String::new();
    writeln!(out, "Number of Tracks Released Per Year").ok();
    writeln!(out, "{:<6} {:>6}", "Year", "Tracks").ok();
    writeln!(out, "{}", "-".repeat(60)).ok();
    let max = years.iter().map(|y| y.count as u64).max().unwrap_or(0);
    for y in years {
        writeln!(
            out,
            "{:<6} {:>6}  {}",
            y.year,
            y.count,
            bar(y.count as u64, max, BAR_WIDTH)
        )
        .ok();
    }
    out
}

/// Every section, separated by blank lines.
pub fn dashboard_text(view: &DerivedView) -> String {
    let mut sections = Vec::new();
    if let Some(d) = &view.track {
        sections.push(track_detail(d));
        sections.push(feature_tiles(&view.features));
    }
    sections.push(top_tracks(&view.top_tracks, view.range.as_ref()));
    sections.push(kpi_tiles(&view.kpis));
    sections.push(releases(&view.releases));
    sections.join("\n")
}

fn html_card(out: &mut String, label: &str, value_html: &str) {
    writeln!(
        out,
        concat!(
            "<div class=\"bento-card\"><div class=\"bento-label\">{}</div>",
            "<div class=\"bento-value\">{}</div></div>"
        ),
        escape_html(label),
        value_html
    )
    .ok();
}

/// HTML fragment with the detail, feature and KPI tiles. Charts are left to
/// whatever consumes the JSON output.
pub fn dashboard_html(view: &DerivedView) -> String {
    let mut out = String::new();
    if let Some(d) = &view.track {
        writeln!(out, "<div class=\"bento-grid\">").ok();
        if !d.cover_url.is_empty() {
            writeln!(
                out,
                "<img src=\"{}\" style=\"width:100%;border-radius:8px;margin:0;\">",
                escape_html(&d.cover_url)
            )
            .ok();
        }
        html_card(&mut out, "Track Name", &escape_html(&d.name));
        html_card(&mut out, "First Artist", &escape_html(&d.first_artist));
        html_card(&mut out, "Artist Count", &d.artist_count.to_string());
        html_card(&mut out, "Streams", &d.streams_display.to_html());
        html_card(&mut out, "Date", &escape_html(&d.date_label));
        writeln!(out, "</div>").ok();

        writeln!(out, "<div class=\"bento-grid\">").ok();
        for t in &view.features {
            html_card(&mut out, t.label, &t.value.to_html());
        }
        writeln!(out, "</div>").ok();
    }

    writeln!(out, "<div class=\"bento-grid\">").ok();
    html_card(&mut out, "Average Streams (All Songs)", &view.kpis.average_streams.to_html());
    html_card(&mut out, &view.kpis.top_song_label, &view.kpis.top_song_streams.to_html());
    html_card(&mut out, "Top Song vs. Average", &view.kpis.top_vs_average.to_html());
    writeln!(out, "</div>").ok();
    out
}
