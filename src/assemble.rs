use crate::errors::ExtractError;
use crate::fields::{classify_label, normalize_value};
use crate::model::{FieldTag, RawRow, Record};

/// Folds the rows of one listing page into records.
///
/// Every identifier row closes the record in progress and opens a new one;
/// all other rows are written into the record in progress. Rows are expected
/// in document order.
#[derive(Debug, Default)]
pub struct RecordAssembler {
    completed: Vec<Record>,
    current: Option<Record>,
    rows_seen: usize,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: &RawRow) -> Result<(), ExtractError> {
        let index = self.rows_seen;
        self.rows_seen += 1;

        let tag = classify_label(&row.label).ok_or_else(|| ExtractError::UnknownLabel {
            label: row.label.trim().to_string(),
        })?;
        let value = normalize_value(tag, &row.label, &row.value)?;

        if tag == FieldTag::Id {
            self.commit();
            self.current = Some(Record::default());
        }

        let Some(record) = self.current.as_mut() else {
            return Err(ExtractError::RowBeforeIdentifier {
                row: index,
                label: row.label.trim().to_string(),
            });
        };
        record.insert(tag, value);
        Ok(())
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Records finished so far, not counting the one in progress.
    pub fn completed(&self) -> &[Record] {
        &self.completed
    }

    pub fn finish(mut self) -> Vec<Record> {
        self.commit();
        self.completed
    }

    fn commit(&mut self) {
        if let Some(record) = self.current.take() {
            self.completed.push(record);
        }
    }
}

/// Assembles the complete row sequence of one page. Any failing row fails the page.
pub fn assemble_records<'a, I>(rows: I) -> Result<Vec<Record>, ExtractError>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut assembler = RecordAssembler::new();
    for row in rows {
        assembler.push(row)?;
    }
    Ok(assembler.finish())
}
