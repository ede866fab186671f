//! Scrapes the rating page. The page is a third-party layout, so every lookup
//! is by fixed position and any mismatch is reported as a [`ParseError`].

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{ProgramId, Variant};
use crate::types::{FetchPayload, FetchResult, ParsedRecord};

/// A parsed record plus what the scan noticed about the rating table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    pub record: ParsedRecord,
    /// Fewer agreed rows than seats were listed, so no score row was reached.
    pub below_quota: bool,
}

const CAPACITY_ITEM: usize = 1;
const CURRENT_ITEM: usize = 7;
const RATING_CONTAINER_ID: &str = "div4";
const SCORE_CELL: usize = 14;
const AGREEMENT_CELL: usize = 16;
const AGREEMENT_MARKER: &str = "да ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("portal request failed: {0}")]
    Transport(String),
    #[error("summary list not found")]
    MissingList,
    #[error("summary list has {found} items, expected at least {expected}")]
    ShortList { found: usize, expected: usize },
    #[error("no digits in {field}: {text:?}")]
    MalformedNumber { field: &'static str, text: String },
    #[error("{field} out of range: {text:?}")]
    NumberOutOfRange { field: &'static str, text: String },
    #[error("seat capacity is zero")]
    ZeroCapacity,
    #[error("rating table #{0} not found")]
    MissingTable(&'static str),
    #[error("rating table #{0} has no data rows")]
    EmptyTable(&'static str),
    #[error("rating row has {found} cells, expected at least {expected}")]
    ShortRow { found: usize, expected: usize },
}

/// Turns one fetch result into a record. The score is only scraped when the
/// variant tracks it.
pub fn parse(result: &FetchResult, variant: Variant) -> Result<ParsedPage, ParseError> {
    let html = match &result.payload {
        FetchPayload::Body(body) => body,
        FetchPayload::Failed(reason) => return Err(ParseError::Transport(reason.clone())),
    };
    parse_html(result.program, html, variant)
}

pub fn parse_html(
    program: ProgramId,
    html: &str,
    variant: Variant,
) -> Result<ParsedPage, ParseError> {
    let document = Html::parse_document(html);
    let (max_count, current_count) = parse_summary(&document)?;
    let record = ParsedRecord::new(program, current_count, max_count);
    if !variant.tracks_score() {
        return Ok(ParsedPage {
            record,
            below_quota: false,
        });
    }

    match parse_accepted_score(&document, max_count)? {
        Some(score) => Ok(ParsedPage {
            record: record.with_score(score),
            below_quota: false,
        }),
        None => {
            warn!("{program}: fewer agreed rows than {max_count} seats, accepted score left at 0");
            Ok(ParsedPage {
                record: record.with_score(0),
                below_quota: true,
            })
        }
    }
}

fn parse_summary(document: &Html) -> Result<(u32, u32), ParseError> {
    let list = document
        .select(&selector("ul"))
        .next()
        .ok_or(ParseError::MissingList)?;
    let items = list
        .select(&selector("li"))
        .map(|item| item_text(&item))
        .collect::<Vec<_>>();
    if items.len() <= CURRENT_ITEM {
        return Err(ParseError::ShortList {
            found: items.len(),
            expected: CURRENT_ITEM + 1,
        });
    }
    let max_count = digits_only(&items[CAPACITY_ITEM], "seat capacity")?;
    let current_count = digits_only(&items[CURRENT_ITEM], "agreement count")?;
    if max_count == 0 {
        return Err(ParseError::ZeroCapacity);
    }
    Ok((max_count, current_count))
}

/// Walks the rating table counting agreed rows and returns the score of the
/// row where the count reaches `capacity`, or `None` when it never does.
/// Rows without `<td>` cells are headers; any other row must be full width.
fn parse_accepted_score(document: &Html, capacity: u32) -> Result<Option<u32>, ParseError> {
    let container = document
        .select(&selector(&format!("#{RATING_CONTAINER_ID}")))
        .next()
        .ok_or(ParseError::MissingTable(RATING_CONTAINER_ID))?;
    let table = container
        .select(&selector("table"))
        .next()
        .ok_or(ParseError::MissingTable(RATING_CONTAINER_ID))?;

    let row_selector = selector("tr");
    let cell_selector = selector("td");
    let mut agreed = 0u32;
    let mut data_rows = 0usize;
    for row in table.select(&row_selector) {
        let cells = row.select(&cell_selector).collect::<Vec<_>>();
        if cells.is_empty() {
            continue;
        }
        if cells.len() <= AGREEMENT_CELL {
            return Err(ParseError::ShortRow {
                found: cells.len(),
                expected: AGREEMENT_CELL + 1,
            });
        }
        data_rows += 1;
        if !item_text(&cells[AGREEMENT_CELL]).contains(AGREEMENT_MARKER) {
            continue;
        }
        agreed += 1;
        if agreed == capacity {
            let score = digits_only(&item_text(&cells[SCORE_CELL]), "accepted score")?;
            return Ok(Some(score));
        }
    }
    if data_rows == 0 {
        return Err(ParseError::EmptyTable(RATING_CONTAINER_ID));
    }
    Ok(None)
}

/// Drops everything that is not an ASCII digit and parses the remainder.
pub fn digits_only(text: &str, field: &'static str) -> Result<u32, ParseError> {
    let digits = text
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    if digits.is_empty() {
        return Err(ParseError::MalformedNumber {
            field,
            text: text.to_string(),
        });
    }
    digits.parse().map_err(|_| ParseError::NumberOutOfRange {
        field,
        text: text.to_string(),
    })
}

fn item_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

fn selector(css: &str) -> Selector {
    // selectors are crate constants; a failure here is a programming error
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}
