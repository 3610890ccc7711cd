use std::fmt;

use serde::Serialize;

/// Spotify green, used for values and positive deltas.
pub const BRAND_COLOR: &str = "#1db954";

/// Colour for negative (or flat) deltas.
pub const WARNING_COLOR: &str = "red";

/// Shown in place of a value that is absent from the data.
pub const NO_DATA: &str = "No data";

/// Display text with an optional colour tag.
///
/// Every formatter returns one. Colour only matters once a renderer turns it
/// into markup via [`Styled::to_html`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Styled {
    pub text: String,
    pub color: Option<String>,
}

impl Styled {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, color: &str) -> Self {
        Self {
            text: text.into(),
            color: Some(color.to_string()),
        }
    }

    fn with_color(text: String, color: Option<&str>) -> Self {
        match color {
            Some(c) => Self::colored(text, c),
            None => Self::plain(text),
        }
    }

    pub fn no_data() -> Self {
        Self::plain(NO_DATA)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_no_data(&self) -> bool {
        self.color.is_none() && self.text == NO_DATA
    }

    /// Wrap the text in a colour span. Uncoloured values are returned as-is.
    pub fn to_html(&self) -> String {
        match &self.color {
            Some(color) => format!(
                "<span style='color: {};'>{}</span>",
                color,
                escape_html(&self.text)
            ),
            None => escape_html(&self.text),
        }
    }
}

impl fmt::Display for Styled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.text)
    }
}

/// Minimal escaping for text placed inside an HTML element.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Insert `,` between groups of three digits: `1234567` → `"1,234,567"`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Scale a number into a short B/M/K form.
///
/// The bucket is picked from `|value|`, but the sign is kept in the output.
/// Values under a thousand print as-is (whole numbers without a fraction).
pub fn format_large_number(value: Option<f64>, color: Option<&str>) -> Styled {
    let Some(value) = value else {
        return Styled::no_data();
    };

    let abs = value.abs();
    let text = if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        group_thousands(value as i64)
    } else {
        value.to_string()
    };

    Styled::with_color(text, color)
}

/// Render a 0–100 feature value as `"57%"`. Defaults to the brand colour.
pub fn format_percentage<T: fmt::Display>(value: Option<T>, color: Option<&str>) -> Styled {
    match value {
        Some(v) => Styled::colored(format!("{v}%"), color.unwrap_or(BRAND_COLOR)),
        None => Styled::no_data(),
    }
}
