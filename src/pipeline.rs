use crate::config::AppConfig;
use crate::fetch::PageFetcher;
use crate::model::{DatasetPage, Record, sort_records};
use crate::parser::parse_page_records;
use crate::store::DatasetStore;
use crate::xlsx::write_workbook;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub config: AppConfig,
    pub year: i32,
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub config: AppConfig,
    pub year: i32,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub config: AppConfig,
    pub year: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchReport {
    pub year: i32,
    pub total_pages: u32,
    pub already_downloaded: usize,
    pub downloaded: usize,
    pub failed_pages: Vec<u32>,
    pub dataset_pages: usize,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub year: i32,
    pub pages: usize,
    pub records: usize,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub page: DatasetPage,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub year: i32,
    pub pages: usize,
    pub records: usize,
    pub failures: Vec<PageFailure>,
}

/// Downloads every listing page of the year that is not cached yet.
///
/// Whole passes over the page range are repeated up to `attempts` times; a
/// page that failed in one pass is tried again in the next.
pub fn fetch_dataset(options: &FetchOptions) -> Result<FetchReport> {
    let store = DatasetStore::new(&options.config.dataset.dir);
    let fetcher = PageFetcher::new(&options.config)?;
    let year = options.year;

    let cached = store.list_pages(year)?;
    info!(year, pages = cached.len(), "current dataset");

    let total_pages = fetcher
        .fetch_page_count(year)
        .with_context(|| format!("failed to discover page count for {year}"))?;
    info!(year, total_pages, "total pages");

    let mut report = FetchReport {
        year,
        total_pages,
        ..FetchReport::default()
    };
    let interval = Duration::from_millis(options.config.fetch.request_interval_ms);
    let mut failed = BTreeSet::new();

    for attempt in 1..=options.attempts.max(1) {
        failed.clear();
        for page in 1..=total_pages {
            let dataset_page = DatasetPage::new(year, page);
            if store.contains(dataset_page) {
                if attempt == 1 {
                    info!(year, page, "page already downloaded");
                    report.already_downloaded += 1;
                }
                continue;
            }

            std::thread::sleep(interval);
            match fetcher
                .fetch_page(year, page)
                .and_then(|body| store.write_page(dataset_page, &body))
            {
                Ok(()) => {
                    report.downloaded += 1;
                    info!(year, page, total_pages, "page downloaded");
                }
                Err(err) => {
                    failed.insert(page);
                    let message = format!("{err:#}");
                    warn!(year, page, attempt, error = %message, "failed to download page");
                }
            }
        }

        if failed.is_empty() {
            break;
        }
    }

    report.failed_pages = failed.into_iter().collect();
    report.dataset_pages = store.list_pages(year)?.len();

    if report.is_complete() {
        info!(year, pages = report.dataset_pages, "dataset downloaded successfully");
    } else {
        error!(
            year,
            failed = ?report.failed_pages,
            "dataset downloaded with errors"
        );
    }

    Ok(report)
}

/// Parses every cached page of the year and returns the records sorted by identifier.
///
/// The first page that fails to parse aborts the run.
pub fn collect_year_records(config: &AppConfig, year: i32) -> Result<(Vec<Record>, usize)> {
    let store = DatasetStore::new(&config.dataset.dir);
    let pages = store.list_pages(year)?;
    if pages.is_empty() {
        bail!("no dataset pages for {year} in {}", store.dir().display());
    }

    let mut records = Vec::new();
    for page in &pages {
        let page_records = parse_stored_page(&store, config, *page)
            .with_context(|| format!("failed to read dataset file {}", page.file_name()))?;
        records.extend(page_records);
        info!(year, page = page.page, parsed = records.len(), "parsed items");
    }

    info!(records = records.len(), "sorting items");
    sort_records(&mut records);
    Ok((records, pages.len()))
}

pub fn write_report(options: &WriteOptions) -> Result<WriteReport> {
    let (records, pages) = collect_year_records(&options.config, options.year)?;
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| options.config.output_path(options.year));

    info!(records = records.len(), output = %output.display(), "generating xlsx file");
    write_workbook(
        &records,
        options.year,
        &options.config.output.worksheet_name,
        &output,
    )?;
    info!(output = %output.display(), "dataset saved to xlsx file");

    Ok(WriteReport {
        year: options.year,
        pages,
        records: records.len(),
        output,
    })
}

/// Parses every cached page of the year, collecting failures instead of stopping.
pub fn check_dataset(options: &CheckOptions) -> Result<CheckReport> {
    let store = DatasetStore::new(&options.config.dataset.dir);
    let pages = store.list_pages(options.year)?;

    let mut report = CheckReport {
        year: options.year,
        pages: pages.len(),
        ..CheckReport::default()
    };

    for page in pages {
        match parse_stored_page(&store, &options.config, page) {
            Ok(records) => report.records += records.len(),
            Err(err) => {
                let message = format!("{err:#}");
                warn!(page = %page, error = %message, "page failed to parse");
                report.failures.push(PageFailure {
                    page,
                    error: message,
                });
            }
        }
    }

    info!(
        year = options.year,
        pages = report.pages,
        records = report.records,
        failures = report.failures.len(),
        "dataset check complete"
    );
    Ok(report)
}

fn parse_stored_page(
    store: &DatasetStore,
    config: &AppConfig,
    page: DatasetPage,
) -> Result<Vec<Record>> {
    let html = store.read_page(page)?;
    parse_page_records(&html, &config.source.rows_selector)
}
