use chrono::NaiveDate;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use super::post_form;
use crate::calendar::{format_form_date, week_anchor};

/// What the service reports about the most recent bulletin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    /// The identification cell names the bulletin's week and year.
    Found { week: u32, year: i32 },
    /// A bulletin table came back but its identification cell is missing or unreadable.
    FoundNoMarker,
    /// No bulletin table, a non-success status, or the request failed.
    NotFound,
}

/// Read the bulletin identification ("NÚMERO n AÑO yyyy") from a probe page.
pub fn parse_availability(html: &str) -> Availability {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("table selector should parse");
    let cell_sel =
        Selector::parse(r#"td.tdblanco[align="center"]"#).expect("marker selector should parse");

    let has_table = document
        .select(&table_sel)
        .any(|t| t.text().collect::<String>().contains("NÚMERO"));
    if !has_table {
        return Availability::NotFound;
    }

    let Some(cell) = document.select(&cell_sel).next() else {
        return Availability::FoundNoMarker;
    };
    let text = cell.text().collect::<Vec<_>>().join(" ");

    let re = Regex::new(r"NÚMERO\s+([0-9]+)\s+AÑO\s+([0-9]{4})").expect("marker regex should parse");
    re.captures(text.trim())
        .and_then(|caps| {
            let week = caps[1].parse().ok()?;
            let year = caps[2].parse().ok()?;
            Some(Availability::Found { week, year })
        })
        .unwrap_or(Availability::FoundNoMarker)
}

/// Ask the service which bulletin is current as of `reference`.
///
/// Failures are folded into [`Availability::NotFound`]; the caller simply
/// keeps the requested range.
pub async fn probe_availability(client: &Client, endpoint: &Url, reference: NaiveDate) -> Availability {
    let form = [("date".to_string(), format_form_date(reference))];
    let page = match post_form(client, endpoint, &form).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "availability probe failed");
            return Availability::NotFound;
        }
    };
    if !page.is_success() {
        warn!(status = %page.status, "availability probe returned non-success status");
        return Availability::NotFound;
    }

    let availability = parse_availability(&page.body);
    if let Availability::Found { week, year } = availability {
        info!(week, year, "latest bulletin available");
    }
    availability
}

/// Pull `requested_end` back to the start of the latest published week.
pub fn clamp_end_date(requested_end: NaiveDate, availability: Availability) -> NaiveDate {
    match availability {
        Availability::Found { week, year } => {
            let Some(anchor) = week_anchor(year, week) else {
                warn!(week, year, "latest bulletin week out of range; end date kept");
                return requested_end;
            };
            if requested_end > anchor {
                warn!(
                    requested = %format_form_date(requested_end),
                    latest = %format_form_date(anchor),
                    "end date is after the latest bulletin week; adjusting"
                );
                anchor
            } else {
                requested_end
            }
        }
        Availability::FoundNoMarker => {
            warn!("bulletin found without week/year marker; end date kept");
            requested_end
        }
        Availability::NotFound => {
            warn!("no bulletin availability information; end date kept");
            requested_end
        }
    }
}
