use anyhow::Result;
use chrono::NaiveDate;
use reqwest::Client;
use url::Url;

use super::{post_form, BulletinPage};
use crate::{calendar::format_form_date, districts::District};

/// Value of the form's view selector for the reservoir report.
const RESERVOIR_VIEW: &str = "17";

/// Form fields that request one district's reservoir report for `date`.
pub fn district_form(date: NaiveDate, district: &District) -> Vec<(String, String)> {
    vec![
        ("xVal".to_string(), RESERVOIR_VIEW.to_string()),
        ("fechaCalendario".to_string(), format_form_date(date)),
        (district.button_key(), district.button_value()),
    ]
}

/// Fetch the reservoir report of one district for `date`.
///
/// The status is returned as-is; only transport failures are errors.
pub async fn fetch_district(
    client: &Client,
    endpoint: &Url,
    date: NaiveDate,
    district: &District,
) -> Result<BulletinPage> {
    post_form(client, endpoint, &district_form(date, district)).await
}
