use crate::business_form::simplify_business_form;
use crate::model::{FieldTag, Record};
use anyhow::{Context, Result};
use rust_xlsxwriter::{
    DocProperties, Format, FormatAlign, Table, TableColumn, TableStyle, Workbook, Worksheet,
};
use std::path::Path;

const TABLE_NAME: &str = "Dataset";

#[derive(Debug, Clone, Copy)]
enum CellSource {
    Field(FieldTag),
    BusinessFormCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Layout of one report column. Width, alignment and wrapping apply to the whole column.
#[derive(Debug)]
pub struct ColumnSpec {
    pub header: &'static str,
    source: CellSource,
    pub width: f64,
    pub align: Align,
    pub wrap: bool,
}

const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        header: "ID",
        source: CellSource::Field(FieldTag::Id),
        width: 10.0,
        align: Align::Right,
        wrap: false,
    },
    ColumnSpec {
        header: "Форма",
        source: CellSource::BusinessFormCategory,
        width: 10.0,
        align: Align::Left,
        wrap: false,
    },
    ColumnSpec {
        header: "Наименование организации",
        source: CellSource::Field(FieldTag::BusinessForm),
        width: 100.0,
        align: Align::Left,
        wrap: true,
    },
    ColumnSpec {
        header: "ОГРН",
        source: CellSource::Field(FieldTag::Ogrn),
        width: 18.0,
        align: Align::Center,
        wrap: false,
    },
    ColumnSpec {
        header: "ИНН",
        source: CellSource::Field(FieldTag::Inn),
        width: 18.0,
        align: Align::Center,
        wrap: false,
    },
    ColumnSpec {
        header: "Места проведения",
        source: CellSource::Field(FieldTag::Locations),
        width: 100.0,
        align: Align::Left,
        wrap: true,
    },
    ColumnSpec {
        header: "Дата начала проверки",
        source: CellSource::Field(FieldTag::AuditStartDate),
        width: 20.0,
        align: Align::Right,
        wrap: false,
    },
    ColumnSpec {
        header: "Срок проведения проверки",
        source: CellSource::Field(FieldTag::AuditDuration),
        width: 24.0,
        align: Align::Left,
        wrap: false,
    },
    ColumnSpec {
        header: "Форма проведения проверки",
        source: CellSource::Field(FieldTag::AuditType),
        width: 26.0,
        align: Align::Left,
        wrap: false,
    },
    ColumnSpec {
        header: "Статус проверки",
        source: CellSource::Field(FieldTag::AuditStatus),
        width: 26.0,
        align: Align::Left,
        wrap: false,
    },
    ColumnSpec {
        header: "Цель проверки",
        source: CellSource::Field(FieldTag::AuditTarget),
        width: 26.0,
        align: Align::Left,
        wrap: false,
    },
    ColumnSpec {
        header: "Орган(ы) государственного контроля",
        source: CellSource::Field(FieldTag::AuditAuditor),
        width: 100.0,
        align: Align::Left,
        wrap: true,
    },
];

/// Report columns, in output order.
pub fn columns() -> &'static [ColumnSpec] {
    COLUMNS
}

/// Column headers of the report, in output order.
pub fn column_headers() -> Vec<&'static str> {
    COLUMNS.iter().map(|column| column.header).collect()
}

/// Flattens a record into report cells, one per column. Missing fields are empty.
pub fn record_cells(record: &Record) -> Vec<String> {
    COLUMNS
        .iter()
        .map(|column| match column.source {
            CellSource::Field(tag) => record.get(tag).unwrap_or_default().to_string(),
            CellSource::BusinessFormCategory => record
                .get(FieldTag::BusinessForm)
                .map(simplify_business_form)
                .unwrap_or_default()
                .to_string(),
        })
        .collect()
}

/// Writes `records` in the given order as a single table workbook.
pub fn write_workbook(
    records: &[Record],
    year: i32,
    worksheet_name: &str,
    path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let properties =
        DocProperties::new().set_author(&format!("План проверок Роспотребнадзором на {year} год"));
    workbook.set_properties(&properties);

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(worksheet_name)
        .with_context(|| format!("invalid worksheet name {worksheet_name}"))?;
    fill_worksheet(worksheet, records)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir {}", parent.display()))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to write xlsx {}", path.display()))?;
    Ok(())
}

fn fill_worksheet(worksheet: &mut Worksheet, records: &[Record]) -> Result<()> {
    let formats: Vec<Format> = COLUMNS.iter().map(column_format).collect();

    for (col, column) in COLUMNS.iter().enumerate() {
        worksheet.set_column_width(col as u16, column.width)?;
        worksheet.set_column_format(col as u16, &formats[col])?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in record_cells(record).iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet.write_string_with_format(row, col as u16, value, &formats[col])?;
        }
    }

    let columns: Vec<TableColumn> = COLUMNS
        .iter()
        .map(|column| TableColumn::new().set_header(column.header))
        .collect();
    let table = Table::new()
        .set_name(TABLE_NAME)
        .set_style(TableStyle::Light13)
        .set_banded_rows(true)
        .set_columns(&columns);

    // A table with a header row needs at least one data row.
    let last_row = records.len().max(1) as u32;
    let last_col = (COLUMNS.len() - 1) as u16;
    worksheet
        .add_table(0, 0, last_row, last_col, &table)
        .context("failed to add dataset table")?;

    Ok(())
}

fn column_format(column: &ColumnSpec) -> Format {
    let horizontal = match column.align {
        Align::Left => FormatAlign::Left,
        Align::Center => FormatAlign::Center,
        Align::Right => FormatAlign::Right,
    };
    let format = Format::new().set_align(horizontal).set_align(FormatAlign::Top);
    if column.wrap {
        format.set_text_wrap()
    } else {
        format
    }
}
