use anyhow::Result;
use chrono::NaiveDate;
use futures::{stream, StreamExt};
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::{
    calendar::{format_form_date, BulletinWeek, WeeklyDates},
    config::ScraperConfig,
    districts::DISTRICTS,
    extract::{extract_records, ReservoirRecord},
    fetch::{self, clamp_end_date, probe_availability},
    sink::CsvSink,
};

/// Totals for one run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub effective_end: NaiveDate,
    pub weeks: usize,
    pub district_requests: usize,
    pub records: usize,
    pub files: Vec<PathBuf>,
}

/// Drives the weekly scrape: clamp the range, walk it week by week, fetch
/// every district and hand each week's records to the sink.
pub struct Scraper {
    client: Client,
    config: ScraperConfig,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = fetch::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Requested end date, pulled back to the latest published bulletin when needed.
    pub async fn effective_end(&self, requested_end: NaiveDate) -> NaiveDate {
        let availability =
            probe_availability(&self.client, &self.config.endpoint, requested_end).await;
        clamp_end_date(requested_end, availability)
    }

    /// Scrape every district for one query date, in catalog order.
    ///
    /// Districts that fail or return no table are logged and left out.
    #[instrument(level = "info", skip(self, date), fields(date = %format_form_date(date)))]
    pub async fn scrape_week(&self, date: NaiveDate) -> Vec<ReservoirRecord> {
        let tag = BulletinWeek::of(date);
        let client = &self.client;
        let endpoint = &self.config.endpoint;

        // `buffered` yields in input order, so rows stay in catalog order
        let pages: Vec<_> = stream::iter(DISTRICTS.iter())
            .map(move |district| async move {
                let page = fetch::fetch_district(client, endpoint, date, district).await;
                (district, page)
            })
            .buffered(self.config.fetch_concurrency.max(1))
            .collect()
            .await;

        let mut records = Vec::new();
        for (district, page) in pages {
            match page {
                Ok(page) if page.is_success() => {
                    records.extend(extract_records(&page.body, district.name, tag));
                }
                Ok(page) => {
                    warn!(district = district.name, status = %page.status, "error fetching district data");
                }
                Err(e) => {
                    warn!(district = district.name, error = %e, "error fetching district data");
                }
            }
        }

        info!(year = tag.year, week = tag.week, rows = records.len(), "week scraped");
        records
    }

    /// Scrape `start..=requested_end` into `sink`.
    pub async fn run(
        &self,
        start: NaiveDate,
        requested_end: NaiveDate,
        mut sink: CsvSink,
    ) -> Result<RunSummary> {
        let effective_end = self.effective_end(requested_end).await;
        let dates = WeeklyDates::new(start, effective_end);
        info!(
            start = %format_form_date(start),
            end = %format_form_date(effective_end),
            weeks = dates.len(),
            mode = ?sink.mode(),
            "starting scrape"
        );

        let mut weeks = 0;
        for date in dates {
            let records = self.scrape_week(date).await;
            sink.accept_week(BulletinWeek::of(date), records)?;
            weeks += 1;
        }

        let report = sink.finish()?;
        let summary = RunSummary {
            effective_end,
            weeks,
            district_requests: weeks * DISTRICTS.len(),
            records: report.records,
            files: report.files,
        };
        info!(
            weeks = summary.weeks,
            records = summary.records,
            files = summary.files.len(),
            "all done"
        );
        Ok(summary)
    }
}
