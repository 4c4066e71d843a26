use crate::table::{ExtractedRecord, ResultTable};
use crate::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace};

lazy_static::lazy_static! {
    /// The two local governments whose distributions we track.
    static ref ENTITY: Regex = Regex::new(r"(?i)\b(Moab|Grand\s+County)\b")
        .expect("valid entity pattern");

    /// Cell boundaries within a line of page text.
    static ref COLUMN_GAP: Regex = Regex::new(r"\t+|\s{2,}").expect("valid column pattern");
}

/// A cell is absent when the table has no text at that position.
pub type Cell = Option<String>;
pub type Row = Vec<Cell>;

/// Best-effort table structure recovered from a single page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// A document whose pages can be asked for a table.
pub trait TableDocument {
    fn page_count(&self) -> usize;

    /// `None` when the page (zero based) holds nothing table-like.
    fn extract_table(&self, page: usize) -> Option<Table>;
}

/// [`TableDocument`] over a PDF read with [`lopdf`].
///
/// Cells are the text runs the page places with its own positioning
/// operator; runs sharing a baseline form a row. Pages whose runs never line
/// up into a row fall back to splitting the extracted page text.
pub struct PdfDocument {
    doc: lopdf::Document,
    pages: Vec<(u32, lopdf::ObjectId)>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = lopdf::Document::load(path).map_err(|err| {
            error!("failed to open {path:?}, error({err})");
            err
        })?;
        let pages = doc.get_pages().into_iter().collect();
        Ok(Self { doc, pages })
    }
}

impl TableDocument for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_table(&self, page: usize) -> Option<Table> {
        let (number, id) = *self.pages.get(page)?;

        match self.doc.get_and_decode_page_content(id) {
            Ok(content) => {
                if let Some(table) = table_from_runs(text_runs(&content.operations)) {
                    return Some(table);
                }
            }
            Err(err) => trace!("undecodable content on page {number}, error({err})"),
        }

        match self.doc.extract_text(&[number]) {
            Ok(text) => table_from_text(&text),
            Err(err) => {
                trace!("no text on page {number}, error({err})");
                None
            }
        }
    }
}

// layout
// ----------------------------------------------------------------------------

/// Baselines closer than this, in text space units, belong to the same row.
const ROW_TOLERANCE: f64 = 2.0;

/// Kerning adjustments in a `TJ` array below this (thousandths of an em)
/// read as a word gap.
const TJ_GAP: f64 = -200.0;

/// Text shown from one position, before the next positioning operator.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TextRun {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn translate(m: Matrix, tx: f64, ty: f64) -> Matrix {
    [
        m[0],
        m[1],
        m[2],
        m[3],
        tx * m[0] + ty * m[2] + m[4],
        tx * m[1] + ty * m[3] + m[5],
    ]
}

fn number(object: &lopdf::Object) -> Option<f64> {
    match object {
        lopdf::Object::Integer(n) => Some(*n as f64),
        lopdf::Object::Real(n) => Some(f64::from(*n)),
        _ => None,
    }
}

fn decode(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xfe, 0xff]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Text of the string operands of a show operator.
fn shown_text(operands: &[lopdf::Object]) -> String {
    let mut text = String::new();
    for operand in operands {
        match operand {
            lopdf::Object::String(bytes, _) => text.push_str(&decode(bytes)),
            lopdf::Object::Array(items) => {
                for item in items {
                    match item {
                        lopdf::Object::String(bytes, _) => text.push_str(&decode(bytes)),
                        other => {
                            if number(other).is_some_and(|adjust| adjust < TJ_GAP) {
                                text.push(' ');
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    text
}

/// Follow the text positioning operators of a content stream and collect
/// every run of shown text with its starting point.
pub(crate) fn text_runs(operations: &[lopdf::content::Operation]) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut line = IDENTITY;
    let mut leading = 0.0;
    // consecutive shows without repositioning extend the same run
    let mut extending = false;

    for op in operations {
        let nums: Vec<f64> = op.operands.iter().filter_map(number).collect();
        match (op.operator.as_str(), nums.as_slice()) {
            ("BT", _) => {
                line = IDENTITY;
                extending = false;
            }
            ("Tm", &[a, b, c, d, e, f]) => {
                line = [a, b, c, d, e, f];
                extending = false;
            }
            ("Td", &[tx, ty]) => {
                line = translate(line, tx, ty);
                extending = false;
            }
            ("TD", &[tx, ty]) => {
                leading = -ty;
                line = translate(line, tx, ty);
                extending = false;
            }
            ("TL", &[tl]) => leading = tl,
            ("T*", _) => {
                line = translate(line, 0.0, -leading);
                extending = false;
            }
            (show @ ("Tj" | "TJ" | "'" | "\""), _) => {
                if show == "'" || show == "\"" {
                    line = translate(line, 0.0, -leading);
                    extending = false;
                }
                let text = shown_text(&op.operands);
                match runs.last_mut() {
                    Some(run) if extending => run.text.push_str(&text),
                    _ => runs.push(TextRun {
                        x: line[4],
                        y: line[5],
                        text,
                    }),
                }
                extending = true;
            }
            _ => {}
        }
    }

    runs
}

/// Group runs into rows by baseline, top of the page first, and order each
/// row's cells left to right.
///
/// Rows with fewer than two cells are not table rows.
pub(crate) fn table_from_runs(runs: Vec<TextRun>) -> Option<Table> {
    let mut lines: Vec<(f64, Vec<TextRun>)> = Vec::new();
    for run in runs {
        if run.text.trim().is_empty() {
            continue;
        }
        match lines
            .iter_mut()
            .find(|(y, _)| (*y - run.y).abs() <= ROW_TOLERANCE)
        {
            Some((_, line)) => line.push(run),
            None => lines.push((run.y, vec![run])),
        }
    }
    lines.sort_by(|a, b| b.0.total_cmp(&a.0));

    let rows: Vec<Row> = lines
        .into_iter()
        .map(|(_, mut line)| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            line.into_iter()
                .map(|run| Some(run.text.trim().to_string()))
                .collect::<Row>()
        })
        .filter(|row| row.len() >= 2)
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(Table { rows })
    }
}

/// Split page text into rows of cells at tabs or runs of two or more blanks.
///
/// Lines that do not divide into at least two cells are not table rows.
pub fn table_from_text(text: &str) -> Option<Table> {
    let rows: Vec<Row> = text
        .lines()
        .map(|line| {
            COLUMN_GAP
                .split(line.trim())
                .map(|cell| Some(cell.trim().to_string()).filter(|cell| !cell.is_empty()))
                .collect::<Row>()
        })
        .filter(|row| row.len() >= 2)
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(Table { rows })
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn normalize_label(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a normalized label names one of the tracked entities.
pub fn is_entity(label: &str) -> bool {
    ENTITY.is_match(label)
}

/// Coerce a currency formatted cell, e.g. `$1,234.56`, to a number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| !matches!(c, ',' | '$')).collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Every tracked entity row of `doc`, in page then row order.
pub fn extract_records<D: TableDocument + ?Sized>(doc: &D, source: &str) -> Vec<ExtractedRecord> {
    let mut records = Vec::new();

    for page in 0..doc.page_count() {
        let Some(table) = doc.extract_table(page) else {
            trace!("{source}: no table on page {}", page + 1);
            continue;
        };

        for row in &table.rows {
            let Some(first) = row.first().and_then(|cell| cell.as_deref()) else {
                continue;
            };
            let entity = normalize_label(first);
            if entity.is_empty() || !is_entity(&entity) {
                continue;
            }

            let last = row.last().and_then(|cell| cell.as_deref()).unwrap_or("");
            match parse_amount(last) {
                Some(amount) => records.push(ExtractedRecord {
                    entity,
                    amount,
                    source_document: source.to_string(),
                }),
                None => trace!("{source}: dropping {entity:?}, amount {last:?} is not numeric"),
            }
        }
    }

    records
}

/// Open the PDF at `path` and extract its tracked entity rows.
pub fn extract_file(path: &Path) -> Result<Vec<ExtractedRecord>> {
    let doc = PdfDocument::open(path)?;
    let source = crate::fs::display_name(path);
    let records = extract_records(&doc, &source);
    debug!("{source}: {} matching rows", records.len());
    Ok(records)
}

/// Extract every document in order and concatenate the results.
pub fn extract_documents(paths: &[PathBuf], tui: bool) -> Result<ResultTable> {
    let time = std::time::Instant::now();
    crate::tui::banner("Extraction", tui);

    let pb = crate::tui::progress_bar(paths.len(), "extracting tables ...", tui);
    let mut table = ResultTable::new();
    for path in paths {
        table.extend(extract_file(path)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    debug!(
        "{} rows extracted from {} documents, {}",
        table.len(),
        paths.len(),
        crate::time_elapsed(time)
    );
    crate::tui::done("extracting tables", tui);

    Ok(table)
}
