use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::{parse_form_date, FORM_DATE_FORMAT};

/// Reasons a requested date range is refused before any request is made.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`{0}` is not a valid dd/mm/yyyy date")]
    MalformedDate(String),

    #[error(
        "end date {} is before start date {}",
        .end.format(FORM_DATE_FORMAT),
        .start.format(FORM_DATE_FORMAT)
    )]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error(
        "end date {} is later than today ({})",
        .end.format(FORM_DATE_FORMAT),
        .today.format(FORM_DATE_FORMAT)
    )]
    EndInFuture { end: NaiveDate, today: NaiveDate },
}

/// Parse and check a `dd/mm/yyyy` range against `today`.
pub fn validate_range(
    start: &str,
    end: &str,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let parse = |raw: &str| {
        parse_form_date(raw).ok_or_else(|| ValidationError::MalformedDate(raw.to_string()))
    };
    let start = parse(start)?;
    let end = parse(end)?;

    if end < start {
        return Err(ValidationError::EndBeforeStart { start, end });
    }
    if end > today {
        return Err(ValidationError::EndInFuture { end, today });
    }
    Ok((start, end))
}
