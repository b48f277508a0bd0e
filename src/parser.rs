use crate::assemble::assemble_records;
use crate::config::parse_selector;
use crate::errors::ExtractError;
use crate::model::{RawRow, Record};
use anyhow::{Context, Result, anyhow};
use scraper::{ElementRef, Html};
use url::Url;

/// Collects the label/value cell pairs of every listing row in document order.
///
/// Cell text is the concatenation of all descendant text nodes, untrimmed. A
/// row without a value cell yields an empty value.
pub fn extract_rows(html: &str, rows_selector: &str) -> Result<Vec<RawRow>> {
    let selector = parse_selector(rows_selector)?;
    let document = Html::parse_document(html);

    let mut rows = Vec::new();
    for (index, tr) in document.select(&selector).enumerate() {
        let mut cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td");

        let Some(label) = cells.next() else {
            return Err(ExtractError::EmptyRow { row: index }.into());
        };
        let value = cells.next().map(cell_text).unwrap_or_default();
        rows.push(RawRow::new(cell_text(label), value));
    }

    if rows.is_empty() {
        return Err(ExtractError::NoRows.into());
    }

    Ok(rows)
}

/// Turns one cached listing page into its records.
pub fn parse_page_records(html: &str, rows_selector: &str) -> Result<Vec<Record>> {
    let rows = extract_rows(html, rows_selector)?;
    let records = assemble_records(&rows)?;
    Ok(records)
}

/// Reads the total page count from the pagination block: the `page` query
/// parameter of the last pagination link, resolved against `page_url`.
pub fn parse_last_page_number(html: &str, link_selector: &str, page_url: &str) -> Result<u32> {
    let selector = parse_selector(link_selector)?;
    let document = Html::parse_document(html);

    let href = document
        .select(&selector)
        .last()
        .and_then(|link| link.value().attr("href"))
        .ok_or_else(|| anyhow!("failed to find last page link"))?;

    let base = Url::parse(page_url).with_context(|| format!("invalid page url {page_url}"))?;
    let link = base
        .join(href)
        .with_context(|| format!("invalid last page link {href}"))?;

    let page = link
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| anyhow!("failed to find page param in last page link {href}"))?;

    page.trim()
        .parse::<u32>()
        .with_context(|| format!("page param {page} in last page link is not a number"))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>()
}
