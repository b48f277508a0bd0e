use anyhow::Result;
use inspect::config::{AppConfig, load_config};
use inspect::model::{DatasetPage, FieldTag, Record, sort_records};
use inspect::pipeline::{
    CheckOptions, WriteOptions, check_dataset, collect_year_records, write_report,
};
use inspect::store::DatasetStore;
use inspect::xlsx::{Align, column_headers, columns, record_cells, write_workbook};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[test]
fn store_lists_only_pages_of_the_requested_year() -> Result<()> {
    let store = DatasetStore::new(fixture_dir("dataset"));

    let pages = store.list_pages(2024)?;
    assert_eq!(
        pages,
        vec![DatasetPage::new(2024, 1), DatasetPage::new(2024, 2)]
    );
    assert_eq!(store.list_pages(2023)?, vec![DatasetPage::new(2023, 1)]);
    assert!(store.list_pages(2030)?.is_empty());

    Ok(())
}

#[test]
fn store_round_trips_page_bodies() -> Result<()> {
    let temp = tempdir()?;
    let store = DatasetStore::new(temp.path().join("dataset"));
    let page = DatasetPage::new(2025, 7);

    assert!(!store.contains(page));
    assert!(store.list_pages(2025)?.is_empty());

    store.write_page(page, "<html>страница</html>".as_bytes())?;
    assert!(store.contains(page));
    assert_eq!(store.read_page(page)?, "<html>страница</html>");
    assert_eq!(store.list_pages(2025)?, vec![page]);
    assert_eq!(
        store.page_path(page).file_name().and_then(|n| n.to_str()),
        Some("2025.7.dat")
    );

    Ok(())
}

#[test]
fn dataset_file_names_round_trip() {
    let page = DatasetPage::parse_file_name("2024.13.dat").unwrap();
    assert_eq!(page, DatasetPage::new(2024, 13));
    assert_eq!(page.file_name(), "2024.13.dat");

    assert_eq!(DatasetPage::parse_file_name("24.1.dat"), None);
    assert_eq!(DatasetPage::parse_file_name("2024.1.html"), None);
    assert_eq!(DatasetPage::parse_file_name("notes.txt"), None);
}

#[test]
fn records_sort_numerically_with_non_numeric_ids_first() {
    let mut records: Vec<Record> = ["10", "2", "abc", "1", "2"]
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let mut record = Record::default();
            record.insert(FieldTag::Id, id.to_string());
            record.insert(FieldTag::Inn, index.to_string());
            record
        })
        .collect();

    sort_records(&mut records);

    let ids: Vec<_> = records.iter().filter_map(Record::id).collect();
    assert_eq!(ids, vec!["abc", "1", "2", "2", "10"]);
    // Equal keys keep their original order.
    assert_eq!(records[2].get(FieldTag::Inn), Some("1"));
    assert_eq!(records[3].get(FieldTag::Inn), Some("4"));
}

#[test]
fn collects_and_sorts_records_across_pages() -> Result<()> {
    let config = config_for(fixture_dir("dataset"));

    let (records, pages) = collect_year_records(&config, 2024)?;
    assert_eq!(pages, 2);

    let ids: Vec<_> = records.iter().filter_map(Record::id).collect();
    assert_eq!(ids, vec!["1", "2", "3", "10"]);

    Ok(())
}

#[test]
fn write_report_produces_workbook() -> Result<()> {
    let temp = tempdir()?;
    let config = config_for(fixture_dir("dataset"));
    let output = temp.path().join("out/inspect.2024.xlsx");

    let report = write_report(&WriteOptions {
        config,
        year: 2024,
        output: Some(output.clone()),
    })?;

    assert_eq!(report.pages, 2);
    assert_eq!(report.records, 4);
    assert_eq!(report.output, output);

    let bytes = fs::read(&output)?;
    assert!(bytes.len() > 100);
    // xlsx is a zip container
    assert_eq!(&bytes[..2], b"PK");

    Ok(())
}

#[test]
fn write_report_aborts_on_broken_page() -> Result<()> {
    let temp = tempdir()?;
    let config = config_for(fixture_dir("broken"));
    let output = temp.path().join("broken.xlsx");

    let err = write_report(&WriteOptions {
        config,
        year: 2024,
        output: Some(output.clone()),
    })
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("2024.2.dat"), "{message}");
    assert!(message.contains("Foo Bar Baz"), "{message}");
    assert!(!output.exists());

    Ok(())
}

#[test]
fn write_report_requires_cached_pages() -> Result<()> {
    let temp = tempdir()?;
    let config = config_for(temp.path().join("empty"));

    let err = write_report(&WriteOptions {
        config,
        year: 2024,
        output: Some(temp.path().join("out.xlsx")),
    })
    .unwrap_err();
    assert!(err.to_string().contains("no dataset pages for 2024"));

    Ok(())
}

#[test]
fn check_reports_every_failing_page() -> Result<()> {
    let config = config_for(fixture_dir("broken"));

    let report = check_dataset(&CheckOptions { config, year: 2024 })?;
    assert_eq!(report.pages, 3);
    assert_eq!(report.records, 2);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].page, DatasetPage::new(2024, 2));
    assert!(report.failures[0].error.contains("Foo Bar Baz"));
    assert_eq!(report.failures[1].page, DatasetPage::new(2024, 3));

    Ok(())
}

#[test]
fn report_cells_follow_column_order() -> Result<()> {
    let config = config_for(fixture_dir("dataset"));
    let (records, _) = collect_year_records(&config, 2024)?;

    let headers = column_headers();
    assert_eq!(headers.len(), 12);
    assert_eq!(headers[0], "ID");
    assert_eq!(headers[1], "Форма");
    assert_eq!(headers[11], "Орган(ы) государственного контроля");

    let first = record_cells(&records[0]);
    assert_eq!(first.len(), 12);
    assert_eq!(first[0], "1");
    assert_eq!(first[1], "ИП");
    assert_eq!(first[2], "Индивидуальный предприниматель Иванов Иван Иванович");
    assert_eq!(first[3], "");
    assert_eq!(first[9], "Завершена");

    let ten = record_cells(&records[3]);
    assert_eq!(ten[0], "10");
    assert_eq!(ten[1], "МБОУ");
    assert_eq!(ten[6], "15.09.2024");

    let two = record_cells(&records[1]);
    assert_eq!(two[1], "???");

    Ok(())
}

#[test]
fn column_layout_covers_whole_columns() {
    let layout: Vec<_> = columns()
        .iter()
        .map(|column| (column.header, column.width, column.align, column.wrap))
        .collect();

    assert_eq!(layout.len(), column_headers().len());
    assert_eq!(layout[0], ("ID", 10.0, Align::Right, false));
    assert_eq!(layout[2], ("Наименование организации", 100.0, Align::Left, true));
    assert_eq!(layout[3], ("ОГРН", 18.0, Align::Center, false));
    assert_eq!(layout[5], ("Места проведения", 100.0, Align::Left, true));
    assert_eq!(layout[6], ("Дата начала проверки", 20.0, Align::Right, false));
    assert_eq!(
        layout[11],
        ("Орган(ы) государственного контроля", 100.0, Align::Left, true)
    );
}

#[test]
fn empty_record_set_still_writes_a_table() -> Result<()> {
    let temp = tempdir()?;
    let output = temp.path().join("nested/empty.xlsx");

    write_workbook(&[], 2024, "Dataset", &output)?;

    let bytes = fs::read(&output)?;
    assert_eq!(&bytes[..2], b"PK");

    Ok(())
}

#[test]
fn config_defaults_apply_to_missing_and_partial_files() -> Result<()> {
    let temp = tempdir()?;

    let defaults = load_config(&temp.path().join("missing.toml"))?;
    assert_eq!(
        defaults.page_url(2024, 3),
        "https://inspect.rospotrebnadzor.ru/2024/?page=3"
    );
    assert_eq!(
        defaults.output_path(2024),
        PathBuf::from("output/inspect.rospotrebnadzor.2024.xlsx")
    );

    let partial = temp.path().join("partial.toml");
    fs::write(&partial, "[dataset]\ndir = \"cache\"\n\n[fetch]\nretry_attempts = 5\n")?;
    let config = load_config(&partial)?;
    assert_eq!(config.dataset.dir, PathBuf::from("cache"));
    assert_eq!(config.fetch.retry_attempts, 5);
    assert_eq!(config.fetch.timeout_secs, 20);
    assert_eq!(config.source.rows_selector, "table.tlist > tbody > tr");

    Ok(())
}

#[test]
fn config_rejects_template_without_placeholders() -> Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("bad.toml");
    fs::write(&path, "[source]\nurl_template = \"https://example.invalid/\"\n")?;

    let err = load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("url_template"));

    Ok(())
}

fn fixture_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn config_for(dataset_dir: PathBuf) -> AppConfig {
    let mut config = AppConfig::default();
    config.dataset.dir = dataset_dir;
    config
}
