use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::calendar::BulletinWeek;

/// Header fragment that identifies the reservoir table on a district page.
pub const TABLE_MARKER: &str = "Embalsada (hm";

/// Header rows at the top of the reservoir table.
const HEADER_ROWS: usize = 2;

/// Cells a row must have to be read as a reservoir.
const MIN_CELLS: usize = 7;

/// One reservoir row of a weekly bulletin.
///
/// Figures are kept exactly as published (Spanish decimal commas, blanks, dashes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservoirRecord {
    pub district: String,
    pub reservoir_name: String,
    pub river: String,
    pub capacity: String,
    pub current_volume: String,
    pub difference_from_previous: String,
    pub available_energy: String,
    pub energy_capacity: String,
    pub year: i32,
    pub week: u32,
}

/// Pull every reservoir row out of one district page.
///
/// A page without the reservoir table yields no records.
pub fn extract_records(html: &str, district: &str, tag: BulletinWeek) -> Vec<ReservoirRecord> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("table selector should parse");
    let row_sel = Selector::parse("tr").expect("row selector should parse");
    let cell_sel = Selector::parse("td").expect("cell selector should parse");

    let Some(table) = document
        .select(&table_sel)
        .find(|t| t.text().collect::<String>().contains(TABLE_MARKER))
    else {
        warn!(district, week = tag.week, year = tag.year, "reservoir table not found");
        return Vec::new();
    };

    let records: Vec<ReservoirRecord> = table
        .select(&row_sel)
        .skip(HEADER_ROWS)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            if cells.len() < MIN_CELLS {
                return None;
            }
            Some(ReservoirRecord {
                district: district.to_string(),
                reservoir_name: clean_reservoir_name(&cells[0]),
                river: cells[1].clone(),
                capacity: cells[2].clone(),
                current_volume: cells[3].clone(),
                difference_from_previous: cells[4].clone(),
                available_energy: cells[5].clone(),
                energy_capacity: cells[6].clone(),
                year: tag.year,
                week: tag.week,
            })
        })
        .collect();

    debug!(district, week = tag.week, rows = records.len(), "extracted reservoirs");
    records
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Drop line breaks from a reservoir name and collapse the tab padding the
/// bulletin puts after the footnote asterisk.
pub fn clean_reservoir_name(raw: &str) -> String {
    raw.trim()
        .replace(['\n', '\r'], "")
        .replace("*\t\t\t", "*")
}
