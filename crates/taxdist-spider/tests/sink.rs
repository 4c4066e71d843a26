use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap as Map;
use std::sync::Mutex;
use taxdist_spider::sheets::{SheetStore, Sink};
use taxdist_spider::table::{ExtractedRecord, ResultTable};
use taxdist_spider::{Error, Result};

/// Tabs held in memory; every call is logged as `(operation, tab)`.
#[derive(Default)]
struct MemoryStore {
    tabs: Mutex<Map<String, Vec<Vec<Value>>>>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl MemoryStore {
    fn with_tab(tab: &str, rows: Vec<Vec<Value>>) -> Self {
        let store = Self::default();
        store.tabs.lock().unwrap().insert(tab.to_string(), rows);
        store
    }

    fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn rows(&self, tab: &str) -> Vec<Vec<Value>> {
        self.tabs.lock().unwrap().get(tab).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn clear(&self, tab: &str) -> Result<()> {
        self.calls.lock().unwrap().push(("clear", tab.to_string()));
        self.tabs.lock().unwrap().insert(tab.to_string(), Vec::new());
        Ok(())
    }

    async fn write(&self, tab: &str, rows: &[Vec<Value>]) -> Result<()> {
        self.calls.lock().unwrap().push(("write", tab.to_string()));
        let mut tabs = self.tabs.lock().unwrap();
        let existing = tabs.entry(tab.to_string()).or_default();
        for (i, row) in rows.iter().enumerate() {
            if i < existing.len() {
                existing[i] = row.clone();
            } else {
                existing.push(row.clone());
            }
        }
        Ok(())
    }

    async fn read(&self, tab: &str) -> Result<Vec<Vec<Value>>> {
        self.calls.lock().unwrap().push(("read", tab.to_string()));
        Ok(self.rows(tab))
    }
}

/// Clears fine, refuses every write.
struct ReadOnlyStore;

#[async_trait]
impl SheetStore for ReadOnlyStore {
    async fn clear(&self, _tab: &str) -> Result<()> {
        Ok(())
    }

    async fn write(&self, tab: &str, _rows: &[Vec<Value>]) -> Result<()> {
        Err(Error::MissingTab(tab.to_string()))
    }

    async fn read(&self, _tab: &str) -> Result<Vec<Vec<Value>>> {
        Ok(Vec::new())
    }
}

fn record(entity: &str, amount: f64, source: &str) -> ExtractedRecord {
    ExtractedRecord {
        entity: entity.to_string(),
        amount,
        source_document: source.to_string(),
    }
}

fn sample() -> ResultTable {
    ResultTable::concat([
        vec![
            record("Moab City", 1234.56, "2401ut_ftr022.pdf"),
            record("Grand County", 99.0, "2401ut_ftr022.pdf"),
        ],
        vec![record("Moab City", 17.25, "2402ut_ftr022.pdf")],
    ])
}

#[tokio::test]
async fn empty_table_never_touches_the_store() {
    let previous = vec![vec![json!("entity")], vec![json!("kept")]];
    let sink = Sink::new(MemoryStore::with_tab("Raw", previous.clone()), "Raw");

    let written = sink.replace(&ResultTable::new()).await.unwrap();

    assert!(!written);
    assert!(sink.store().calls().is_empty());
    assert_eq!(sink.store().rows("Raw"), previous);
}

#[tokio::test]
async fn replace_clears_then_writes_header_and_rows() {
    let sink = Sink::new(MemoryStore::default(), "Raw");

    assert!(sink.replace(&sample()).await.unwrap());

    assert_eq!(
        sink.store().calls(),
        vec![("clear", "Raw".to_string()), ("write", "Raw".to_string())]
    );
    let rows = sink.store().rows("Raw");
    assert_eq!(
        rows[0],
        vec![json!("entity"), json!("amount"), json!("source_document")]
    );
    assert_eq!(
        rows[1],
        vec![json!("Moab City"), json!(1234.56), json!("2401ut_ftr022.pdf")]
    );
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn previous_contents_are_discarded() {
    let stale: Vec<Vec<Value>> = (0..10).map(|i| vec![json!(format!("old {i}"))]).collect();
    let sink = Sink::new(MemoryStore::with_tab("Raw", stale), "Raw");

    sink.replace(&sample()).await.unwrap();

    assert_eq!(sink.store().rows("Raw").len(), 4);
}

#[tokio::test]
async fn written_table_reads_back_unchanged() {
    let sink = Sink::new(MemoryStore::default(), "Raw");
    let table = sample();

    sink.replace(&table).await.unwrap();
    let read_back = sink.fetch().await.unwrap();

    assert_eq!(read_back, table);
}

#[tokio::test]
async fn other_tabs_are_left_alone() {
    let other = vec![vec![json!("notes")]];
    let sink = Sink::new(MemoryStore::with_tab("Notes", other.clone()), "Raw");

    sink.replace(&sample()).await.unwrap();

    assert_eq!(sink.store().rows("Notes"), other);
}

#[tokio::test]
async fn write_failures_propagate() {
    let sink = Sink::new(ReadOnlyStore, "Raw");
    let err = sink.replace(&sample()).await.unwrap_err();
    assert!(matches!(err, Error::MissingTab(tab) if tab == "Raw"));
}
