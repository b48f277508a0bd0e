use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static DATASET_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})\.(\d+)\.dat$").expect("dataset file name regex must be valid")
});

/// Semantic meaning of a listing row, decided from its label cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldTag {
    Id,
    BusinessForm,
    Ogrn,
    Inn,
    Locations,
    AuditStartDate,
    AuditDuration,
    AuditType,
    AuditAuditor,
    AuditStatus,
    AuditTarget,
}

impl FieldTag {
    pub const ALL: [FieldTag; 11] = [
        FieldTag::Id,
        FieldTag::BusinessForm,
        FieldTag::Ogrn,
        FieldTag::Inn,
        FieldTag::Locations,
        FieldTag::AuditStartDate,
        FieldTag::AuditDuration,
        FieldTag::AuditType,
        FieldTag::AuditAuditor,
        FieldTag::AuditStatus,
        FieldTag::AuditTarget,
    ];
}

/// One `<tr>` of a listing table: the label cell and the value cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub label: String,
    pub value: String,
}

impl RawRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A single scheduled inspection. Fields missing from the page stay absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<FieldTag, String>,
}

impl Record {
    pub fn get(&self, tag: FieldTag) -> Option<&str> {
        self.fields.get(&tag).map(String::as_str)
    }

    pub fn insert(&mut self, tag: FieldTag, value: String) {
        self.fields.insert(tag, value);
    }

    pub fn contains(&self, tag: FieldTag) -> bool {
        self.fields.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn id(&self) -> Option<&str> {
        self.get(FieldTag::Id)
    }

    /// Numeric identifier used for ordering; anything that is not an integer sorts as zero.
    pub fn sort_key(&self) -> i64 {
        self.id()
            .and_then(|id| id.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }
}

/// Sorts ascending by identifier. Stable, so records sharing a key keep page order.
pub fn sort_records(records: &mut [Record]) {
    records.sort_by_key(Record::sort_key);
}

/// Identifies one cached listing page of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DatasetPage {
    pub year: i32,
    pub page: u32,
}

impl DatasetPage {
    pub fn new(year: i32, page: u32) -> Self {
        Self { year, page }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}.dat", self.year, self.page)
    }

    pub fn parse_file_name(name: &str) -> Option<Self> {
        let caps = DATASET_FILE_RE.captures(name)?;
        let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
        let page = caps.get(2)?.as_str().parse::<u32>().ok()?;
        Some(Self { year, page })
    }
}

impl std::fmt::Display for DatasetPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.year, self.page)
    }
}
