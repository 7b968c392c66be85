use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DataConfig;
use crate::error::DataError;
use crate::view::PhaseSchema;

pub const NAME_KEY: &str = "champion";

pub const SPELL_LABEL: &str = "spell_combo";
pub const ITEM_LABEL: &str = "item";
pub const SUMMARY_COLUMNS: [&str; 3] = ["games", "wins", "winrate"];

const MISSING_MARKERS: [&str; 5] = ["nan", "na", "n/a", "null", "none"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_missing_marker(trimmed) {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_nan() => Cell::Missing,
            Ok(value) => Cell::Number(value),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

fn is_missing_marker(raw: &str) -> bool {
    raw.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| raw.eq_ignore_ascii_case(marker))
}

#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
    names: OnceCell<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            index.entry(header.clone()).or_insert(idx);
        }
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        Self {
            headers,
            index,
            rows,
            names: OnceCell::new(),
        }
    }

    /// Reads a header-first, comma-delimited CSV. Columns listed in
    /// `text_columns` are kept as text instead of being number-inferred.
    pub fn from_reader<R: Read>(reader: R, text_columns: &[&str]) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let as_text: Vec<bool> = headers
            .iter()
            .map(|h| text_columns.contains(&h.as_str()))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = as_text
                .iter()
                .enumerate()
                .map(|(idx, text)| {
                    let raw = record.get(idx).unwrap_or("");
                    if *text { Cell::text(raw) } else { Cell::parse(raw) }
                })
                .collect();
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    pub fn from_path(path: &Path, text_columns: &[&str]) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, text_columns).map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    pub fn names(&self) -> &[String] {
        self.names.get_or_init(|| {
            let mut names: Vec<String> = self
                .rows()
                .filter_map(|row| row.name().map(str::to_string))
                .collect();
            names.sort();
            names.dedup();
            names
        })
    }

    pub fn duplicate_names(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in self.rows() {
            if let Some(name) = row.name() {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        let idx = self.table.column_index(column)?;
        self.table.cell(self.index, idx)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.get(NAME_KEY).and_then(Cell::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct SummaryTable {
    label_column: String,
    table: Arc<Table>,
}

impl SummaryTable {
    pub fn from_table(table: Arc<Table>, label_column: &str) -> Option<Self> {
        let complete = table.has_column(label_column)
            && SUMMARY_COLUMNS.iter().all(|col| table.has_column(col));
        if !complete {
            return None;
        }
        Some(Self {
            label_column: label_column.to_string(),
            table,
        })
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

#[derive(Debug, Clone)]
struct CachedTable {
    table: Option<Arc<Table>>,
    loaded_at: DateTime<Local>,
}

/// Path-keyed cache of parsed tables. Entries live as long as the cache.
#[derive(Debug, Default)]
pub struct DataCache {
    entries: HashMap<PathBuf, CachedTable>,
    warnings: Vec<String>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the first existing candidate. Later candidates are never
    /// consulted once an earlier one exists.
    pub fn load_primary(&mut self, candidates: &[PathBuf]) -> Result<(Arc<Table>, String), DataError> {
        for path in candidates {
            if let Some(CachedTable {
                table: Some(table), ..
            }) = self.entries.get(path)
            {
                debug!(path = %path.display(), "primary table cache hit");
                return Ok((Arc::clone(table), file_label(path)));
            }
            if !path.exists() {
                debug!(path = %path.display(), "primary candidate absent");
                continue;
            }

            let table = Table::from_path(path, &[NAME_KEY])?;
            if !table.has_column(NAME_KEY) {
                return Err(DataError::MissingColumn {
                    path: path.clone(),
                    column: NAME_KEY.to_string(),
                });
            }
            let duplicates = table.duplicate_names();
            if !duplicates.is_empty() {
                let msg = format!(
                    "{} repeats champions ({}); the first row of each is used",
                    file_label(path),
                    duplicates.join(", ")
                );
                warn!("{msg}");
                self.warnings.push(msg);
            }
            info!(path = %path.display(), rows = table.len(), "loaded primary table");

            let table = Arc::new(table);
            self.entries.insert(
                path.clone(),
                CachedTable {
                    table: Some(Arc::clone(&table)),
                    loaded_at: Local::now(),
                },
            );
            return Ok((table, file_label(path)));
        }

        let dir = candidates
            .first()
            .and_then(|path| path.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Err(DataError::MissingData {
            dir,
            candidates: candidates.iter().map(|path| file_label(path)).collect(),
        })
    }

    /// Loads an optional table. Missing files and parse failures both come
    /// back as `None`; the outcome is cached either way.
    pub fn load_optional(&mut self, path: &Path) -> Option<Arc<Table>> {
        if let Some(entry) = self.entries.get(path) {
            debug!(path = %path.display(), "optional table cache hit");
            return entry.table.clone();
        }

        let table = if !path.exists() {
            info!(path = %path.display(), "optional table not present");
            None
        } else {
            match Table::from_path(path, &[]) {
                Ok(table) => {
                    info!(path = %path.display(), rows = table.len(), "loaded optional table");
                    Some(Arc::new(table))
                }
                Err(err) => {
                    let msg = format!("{}: {err}", file_label(path));
                    warn!("skipping unreadable optional table {msg}");
                    self.warnings.push(msg);
                    None
                }
            }
        };

        self.entries.insert(
            path.to_path_buf(),
            CachedTable {
                table: table.clone(),
                loaded_at: Local::now(),
            },
        );
        table
    }

    pub fn loaded_at(&self, path: &Path) -> Option<DateTime<Local>> {
        self.entries.get(path).map(|entry| entry.loaded_at)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Datasets {
    pub master: Arc<Table>,
    pub source_name: String,
    pub loaded_at: Option<DateTime<Local>>,
    pub phase: PhaseSchema,
    pub spell_summary: Option<SummaryTable>,
    pub item_summary: Option<SummaryTable>,
}

impl Datasets {
    pub fn load(cache: &mut DataCache, config: &DataConfig) -> Result<Self, DataError> {
        let candidates = config.primary_candidates();
        let (master, source_name) = cache.load_primary(&candidates)?;
        let loaded_at = cache.loaded_at(&config.data_dir.join(&source_name));

        let spell_summary = cache
            .load_optional(&config.spell_summary_path())
            .and_then(|table| SummaryTable::from_table(table, SPELL_LABEL));
        let item_summary = cache
            .load_optional(&config.item_summary_path())
            .and_then(|table| SummaryTable::from_table(table, ITEM_LABEL));

        Ok(Self::from_parts(
            master,
            source_name,
            loaded_at,
            spell_summary,
            item_summary,
        ))
    }

    pub fn from_parts(
        master: Arc<Table>,
        source_name: String,
        loaded_at: Option<DateTime<Local>>,
        spell_summary: Option<SummaryTable>,
        item_summary: Option<SummaryTable>,
    ) -> Self {
        let phase = PhaseSchema::detect(&master);
        Self {
            master,
            source_name,
            loaded_at,
            phase,
            spell_summary,
            item_summary,
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::{Cell, Table};

    #[test]
    fn missing_markers_parse_as_missing() {
        for raw in ["", "  ", "NaN", "nan", "NA", "null", "None", "n/a"] {
            assert_eq!(Cell::parse(raw), Cell::Missing, "raw {raw:?}");
        }
        assert_eq!(Cell::parse(" 12.5 "), Cell::Number(12.5));
        assert_eq!(Cell::parse("Flash+Mark"), Cell::Text("Flash+Mark".to_string()));
    }

    #[test]
    fn ragged_rows_are_padded() {
        let raw = "champion,games,kda\nAhri,10\nLux,4,2.5,extra\n";
        let table = Table::from_reader(raw.as_bytes(), &["champion"]).unwrap();
        assert_eq!(table.len(), 2);
        let ahri = table.row(0).unwrap();
        assert_eq!(ahri.get("kda"), Some(&Cell::Missing));
        let lux = table.row(1).unwrap();
        assert_eq!(lux.get("kda"), Some(&Cell::Number(2.5)));
        assert_eq!(table.headers().len(), 3);
    }

    #[test]
    fn text_columns_keep_numeric_names() {
        let raw = "champion,games\n123,5\n";
        let table = Table::from_reader(raw.as_bytes(), &["champion"]).unwrap();
        assert_eq!(table.row(0).unwrap().name(), Some("123"));
        assert_eq!(table.names().to_vec(), vec!["123".to_string()]);
    }
}
