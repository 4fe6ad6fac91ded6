//! Date helper functions

use chrono::{DateTime, FixedOffset, Locale, NaiveDate};

/// Parse a CMS publication timestamp
///
/// Accepts RFC 3339, Prismic's `2021-03-15T19:25:28+0000` and bare
/// `2021-03-15` dates (taken as midnight UTC). Anything else yields `None`.
pub fn parse_publication_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().fixed_offset())
        })
}

/// Format a publication date with localized month names
///
/// The date is shown in the offset it was published with. A missing date
/// renders as `None` so templates can leave the field out.
///
/// # Examples
/// ```ignore
/// format_publication_date(Some(&date), "%d %b %Y", "en_US") // -> Some("15 Mar 2021")
/// format_publication_date(Some(&date), "%d %b %Y", "pt_BR") // -> Some("15 mar 2021")
/// ```
pub fn format_publication_date(
    date: Option<&DateTime<FixedOffset>>,
    format: &str,
    language: &str,
) -> Option<String> {
    let date = date?;
    Some(
        date.format_localized(format, locale_for(language))
            .to_string(),
    )
}

/// Format a date in ISO 8601 for `<time datetime="...">`
pub fn date_xml(date: &DateTime<FixedOffset>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Map a configured language to a chrono locale, falling back to `en_US`
pub fn locale_for(language: &str) -> Locale {
    match language.replace('-', "_").as_str() {
        "pt_BR" | "pt" => Locale::pt_BR,
        "pt_PT" => Locale::pt_PT,
        "en_GB" => Locale::en_GB,
        "es_ES" | "es" => Locale::es_ES,
        "fr_FR" | "fr" => Locale::fr_FR,
        "de_DE" | "de" => Locale::de_DE,
        "it_IT" | "it" => Locale::it_IT,
        "en_US" | "en" => Locale::en_US,
        other => {
            tracing::debug!("Unknown language {:?}, using en_US", other);
            Locale::en_US
        }
    }
}
