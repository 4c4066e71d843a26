use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One matched row of a distribution document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub entity: String,
    pub amount: f64,
    pub source_document: String,
}

/// Every record of a run, in document order then row order.
///
/// Rows are never deduplicated or reordered; a run always produces a fresh
/// table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    records: Vec<ExtractedRecord>,
}

impl ResultTable {
    /// Column names, written as the header row.
    pub const COLUMNS: [&'static str; 3] = ["entity", "amount", "source_document"];

    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate per-document outputs in the order given.
    pub fn concat<I>(outputs: I) -> Self
    where
        I: IntoIterator<Item = Vec<ExtractedRecord>>,
    {
        outputs.into_iter().collect()
    }

    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header row followed by one row per record, amounts as numbers.
    pub fn to_rows(&self) -> Vec<Vec<Value>> {
        let header = Self::COLUMNS.iter().map(|col| Value::from(*col)).collect();

        std::iter::once(header)
            .chain(self.records.iter().map(|record| {
                vec![
                    Value::from(record.entity.as_str()),
                    Value::from(record.amount),
                    Value::from(record.source_document.as_str()),
                ]
            }))
            .collect()
    }

    /// Rebuild a table from rows read back out of a store.
    ///
    /// The first row is taken as the header and skipped. Stores may hand
    /// numbers back as formatted text, so amounts are coerced the same way
    /// extraction coerces them; rows that still do not fit are skipped.
    pub fn from_rows(rows: &[Vec<Value>]) -> Self {
        let records = rows
            .iter()
            .skip(1)
            .filter_map(|row| {
                let text = |i: usize| match row.get(i)? {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                };
                let amount = match row.get(1)? {
                    Value::Number(n) => n.as_f64()?,
                    Value::String(s) => crate::extract::parse_amount(s)?,
                    _ => return None,
                };
                Some(ExtractedRecord {
                    entity: text(0)?,
                    amount,
                    source_document: text(2)?,
                })
            })
            .collect();

        Self { records }
    }
}

impl Extend<ExtractedRecord> for ResultTable {
    fn extend<T: IntoIterator<Item = ExtractedRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl FromIterator<Vec<ExtractedRecord>> for ResultTable {
    fn from_iter<T: IntoIterator<Item = Vec<ExtractedRecord>>>(iter: T) -> Self {
        let mut table = Self::new();
        for records in iter {
            table.extend(records);
        }
        table
    }
}

impl IntoIterator for ResultTable {
    type Item = ExtractedRecord;
    type IntoIter = std::vec::IntoIter<ExtractedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
