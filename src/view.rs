use std::cmp::Ordering;

use serde::Serialize;

use crate::config::{ITEM_SUMMARY_FILE, SPELL_SUMMARY_FILE};
use crate::dataset::{Cell, Datasets, Row, SummaryTable, Table};
use crate::error::DataError;
use crate::selector::resolve_row;

pub const MISSING_DISPLAY: &str = "—";
pub const WINRATE_COLUMN: &str = "winrate";
pub const FOOTER_CAPTION: &str =
    "ARAM champion board. Swap the CSV files to refresh the board with new data.";

const META_SHIFT_COLUMN: &str = "delta_winrate";

static MISSING_CELL: Cell = Cell::Missing;

pub trait FromCell: Sized {
    fn from_cell(cell: &Cell) -> Option<Self>;
}

impl FromCell for f64 {
    fn from_cell(cell: &Cell) -> Option<Self> {
        cell.as_f64()
    }
}

impl FromCell for i64 {
    fn from_cell(cell: &Cell) -> Option<Self> {
        cell.as_f64()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    }
}

impl FromCell for u64 {
    fn from_cell(cell: &Cell) -> Option<Self> {
        cell.as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.trunc() as u64)
    }
}

impl FromCell for String {
    fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Missing => None,
            Cell::Text(text) => Some(text.clone()),
            Cell::Number(_) => Some(format_cell(cell)),
        }
    }
}

impl<T: FromCell> FromCell for Option<T> {
    fn from_cell(cell: &Cell) -> Option<Self> {
        T::from_cell(cell).map(Some)
    }
}

/// Value of `field` in `row`, or `default` when the column is absent, the
/// cell is missing, or the cell does not convert to `T`.
pub fn extract_field<T: FromCell>(row: &Row<'_>, field: &str, default: T) -> T {
    row.get(field).and_then(T::from_cell).unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KpiFormat {
    Percent,
    Count,
    Ratio,
    PerMinute,
}

struct KpiField {
    label: &'static str,
    column: &'static str,
    format: KpiFormat,
}

const KPI_FIELDS: [KpiField; 6] = [
    KpiField {
        label: "Win rate",
        column: "winrate",
        format: KpiFormat::Percent,
    },
    KpiField {
        label: "Pick rate",
        column: "pickrate",
        format: KpiFormat::Percent,
    },
    KpiField {
        label: "Games",
        column: "games",
        format: KpiFormat::Count,
    },
    KpiField {
        label: "KDA",
        column: "kda",
        format: KpiFormat::Ratio,
    },
    KpiField {
        label: "Damage / min",
        column: "avg_dpm",
        format: KpiFormat::PerMinute,
    },
    KpiField {
        label: "Gold / min",
        column: "avg_gpm",
        format: KpiFormat::PerMinute,
    },
];

struct TextField {
    label: &'static str,
    // Tried in order; the first present value wins.
    columns: &'static [&'static str],
}

const BUILD_FIELDS: [TextField; 5] = [
    TextField {
        label: "Rune",
        columns: &["best_rune"],
    },
    TextField {
        label: "Spells",
        columns: &["best_spell_combo", "best_spells"],
    },
    TextField {
        label: "Starting items",
        columns: &["best_start"],
    },
    TextField {
        label: "Boots",
        columns: &["best_boots"],
    },
    TextField {
        label: "Core build",
        columns: &["best_core3"],
    },
];

struct PairingField {
    label: &'static str,
    name_column: &'static str,
    winrate_column: &'static str,
}

const PAIRING_FIELDS: [PairingField; 2] = [
    PairingField {
        label: "Best with",
        name_column: "synergy_top1",
        winrate_column: "synergy_wr",
    },
    PairingField {
        label: "Hard matchup",
        name_column: "enemy_hard_top1",
        winrate_column: "enemy_wr",
    },
];

pub const PHASE_FIELDS: [(&str, &str); 3] = [
    ("0-8 min (Early)", "dpm_early"),
    ("8-16 min (Mid)", "dpm_mid"),
    ("16+ min (Late)", "dpm_late"),
];

const BASE_STAT_FIELDS: [(&str, &str); 14] = [
    ("HP", "hp"),
    ("HP / lvl", "hpperlevel"),
    ("Mana", "mp"),
    ("Mana / lvl", "mpperlevel"),
    ("Armor", "armor"),
    ("Armor / lvl", "armorperlevel"),
    ("Magic resist", "spellblock"),
    ("MR / lvl", "spellblockperlevel"),
    ("Attack damage", "attackdamage"),
    ("AD / lvl", "attackdamageperlevel"),
    ("Attack speed", "attackspeed"),
    ("AS / lvl", "attackspeedperlevel"),
    ("Move speed", "movespeed"),
    ("Attack range", "attackrange"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairingLine {
    pub label: &'static str,
    pub champion: String,
    pub winrate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhasePoint {
    pub label: &'static str,
    pub value: Option<f64>,
}

/// Whether the master table carries any phase column. Detected once per
/// table, not per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseSchema {
    enabled: bool,
}

impl PhaseSchema {
    pub fn detect(table: &Table) -> Self {
        Self {
            enabled: PHASE_FIELDS.iter().any(|(_, col)| table.has_column(col)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

pub fn build_phase_series(row: &Row<'_>, phase_fields: &[(&'static str, &str)]) -> Vec<PhasePoint> {
    phase_fields
        .iter()
        .map(|&(label, column)| PhasePoint {
            label,
            value: extract_field(row, column, None),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionProfile {
    pub champion: String,
    pub kpis: Vec<Tile>,
    pub meta_shift: Option<String>,
    pub build: Vec<Tile>,
    pub pairings: Vec<PairingLine>,
    pub phase: Option<Vec<PhasePoint>>,
    pub base_stats: Vec<Tile>,
}

impl ChampionProfile {
    pub fn from_row(row: &Row<'_>, phase: PhaseSchema) -> Self {
        Self {
            champion: row.name().unwrap_or_default().to_string(),
            kpis: KPI_FIELDS.iter().map(|field| kpi_tile(row, field)).collect(),
            meta_shift: extract_field::<Option<f64>>(row, META_SHIFT_COLUMN, None)
                .map(|delta| format!("{delta:+.2}%p")),
            build: BUILD_FIELDS.iter().map(|field| build_tile(row, field)).collect(),
            pairings: PAIRING_FIELDS
                .iter()
                .filter_map(|field| pairing_line(row, field))
                .collect(),
            phase: phase
                .is_enabled()
                .then(|| build_phase_series(row, &PHASE_FIELDS)),
            base_stats: base_stat_tiles(row),
        }
    }

    pub fn kpi(&self, label: &str) -> Option<&str> {
        self.kpis
            .iter()
            .find(|tile| tile.label == label)
            .map(|tile| tile.value.as_str())
    }
}

fn kpi_tile(row: &Row<'_>, field: &KpiField) -> Tile {
    let value = match field.format {
        KpiFormat::Percent => format_percent(extract_field(row, field.column, None)),
        KpiFormat::Count => group_thousands(extract_field(row, field.column, 0u64)),
        KpiFormat::Ratio => format_decimal(extract_field(row, field.column, None), 2),
        KpiFormat::PerMinute => format_decimal(extract_field(row, field.column, None), 0),
    };
    Tile {
        label: field.label,
        value,
    }
}

fn build_tile(row: &Row<'_>, field: &TextField) -> Tile {
    let value = field
        .columns
        .iter()
        .filter_map(|col| extract_field::<Option<String>>(row, col, None))
        .find(|val| !val.trim().is_empty())
        .unwrap_or_else(|| MISSING_DISPLAY.to_string());
    Tile {
        label: field.label,
        value,
    }
}

fn pairing_line(row: &Row<'_>, field: &PairingField) -> Option<PairingLine> {
    let champion = row
        .get(field.name_column)
        .and_then(Cell::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())?;
    Some(PairingLine {
        label: field.label,
        champion: champion.to_string(),
        winrate: format_percent(extract_field(row, field.winrate_column, None)),
    })
}

fn base_stat_tiles(row: &Row<'_>) -> Vec<Tile> {
    let table = row.table();
    BASE_STAT_FIELDS
        .iter()
        .filter(|&&(_, col)| table.has_column(col))
        .filter_map(|&(label, col)| {
            extract_field::<Option<f64>>(row, col, None).map(|value| Tile {
                label,
                value: format!("{value:.2}"),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<'a> {
    pub column: &'a str,
    pub descending: bool,
}

impl<'a> SortKey<'a> {
    pub const fn asc(column: &'a str) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub const fn desc(column: &'a str) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

pub const SUMMARY_SORT: [SortKey<'static>; 2] =
    [SortKey::desc("games"), SortKey::desc(WINRATE_COLUMN)];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TopTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|col| col == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or_default())
                .collect(),
        )
    }
}

/// Stable multi-key sort truncated to `n` rows, rendered for display.
/// The win rate column comes out as a percent string; the source table is
/// left as it was. Text and missing sort values go last whatever the
/// direction.
pub fn top_n(summary: &Table, n: usize, sort_keys: &[SortKey<'_>]) -> TopTable {
    let keys: Vec<(usize, bool)> = sort_keys
        .iter()
        .filter_map(|key| {
            summary
                .column_index(key.column)
                .map(|idx| (idx, key.descending))
        })
        .collect();

    let mut order: Vec<usize> = (0..summary.len()).collect();
    order.sort_by(|&a, &b| {
        for &(col, descending) in &keys {
            let ord = compare_cells(
                summary.cell(a, col).unwrap_or(&MISSING_CELL),
                summary.cell(b, col).unwrap_or(&MISSING_CELL),
                descending,
            );
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    let winrate_idx = summary.column_index(WINRATE_COLUMN);
    let width = summary.headers().len();
    let rows = order
        .into_iter()
        .take(n)
        .map(|row| {
            (0..width)
                .map(|col| {
                    let cell = summary.cell(row, col).unwrap_or(&MISSING_CELL);
                    if Some(col) == winrate_idx {
                        format_percent(cell.as_f64())
                    } else {
                        format_cell(cell)
                    }
                })
                .collect()
        })
        .collect();

    TopTable {
        columns: summary.headers().to_vec(),
        rows,
    }
}

// Numbers, then text, then missing cells. Direction only applies within a
// kind, so stray text in a numeric column never outranks the numbers.
fn compare_cells(a: &Cell, b: &Cell, descending: bool) -> Ordering {
    let ord = match (a, b) {
        (Cell::Number(x), Cell::Number(y)) => x.total_cmp(y),
        (Cell::Text(x), Cell::Text(y)) => x.cmp(y),
        _ => return cell_rank(a).cmp(&cell_rank(b)),
    };
    if descending { ord.reverse() } else { ord }
}

fn cell_rank(cell: &Cell) -> u8 {
    match cell {
        Cell::Number(_) => 0,
        Cell::Text(_) => 1,
        Cell::Missing => 2,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummarySection {
    Ready(TopTable),
    Unavailable { caption: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPanel {
    pub title: &'static str,
    pub section: SummarySection,
}

fn summary_panel(
    title: &'static str,
    summary: Option<&SummaryTable>,
    file_name: &str,
    n: usize,
) -> SummaryPanel {
    let section = match summary {
        Some(summary) => SummarySection::Ready(top_n(summary.table(), n, &SUMMARY_SORT)),
        None => SummarySection::Unavailable {
            caption: format!("No data available: {file_name} is missing."),
        },
    };
    SummaryPanel { title, section }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub source_caption: String,
    pub profile: ChampionProfile,
    pub spells: SummaryPanel,
    pub items: SummaryPanel,
}

pub fn assemble_dashboard(
    datasets: &Datasets,
    champion: &str,
    top: usize,
) -> Result<DashboardView, DataError> {
    let row = resolve_row(&datasets.master, champion)?;
    let profile = ChampionProfile::from_row(&row, datasets.phase);
    Ok(DashboardView {
        title: format!("ARAM | {champion} dashboard"),
        source_caption: format!("Data source: {}", datasets.source_name),
        profile,
        spells: summary_panel(
            "Spell combos (all games)",
            datasets.spell_summary.as_ref(),
            SPELL_SUMMARY_FILE,
            top,
        ),
        items: summary_panel(
            "Item performance (all games)",
            datasets.item_summary.as_ref(),
            ITEM_SUMMARY_FILE,
            top,
        ),
    })
}

pub fn format_percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| MISSING_DISPLAY.to_string())
}

fn format_decimal(value: Option<f64>, places: usize) -> String {
    value
        .map(|v| format!("{v:.places$}"))
        .unwrap_or_else(|| MISSING_DISPLAY.to_string())
}

pub fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Missing => MISSING_DISPLAY.to_string(),
        Cell::Text(text) => text.clone(),
        Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
        Cell::Number(v) => v.to_string(),
    }
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{FromCell, format_cell, group_thousands};
    use crate::dataset::Cell;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn integral_numbers_render_without_decimals() {
        assert_eq!(format_cell(&Cell::Number(120.0)), "120");
        assert_eq!(format_cell(&Cell::Number(0.5)), "0.5");
        assert_eq!(format_cell(&Cell::Missing), "—");
    }

    #[test]
    fn conversions_reject_mismatched_cells() {
        assert_eq!(f64::from_cell(&Cell::Text("x".to_string())), None);
        assert_eq!(u64::from_cell(&Cell::Number(-3.0)), None);
        assert_eq!(i64::from_cell(&Cell::Number(-3.7)), Some(-3));
        assert_eq!(Option::<f64>::from_cell(&Cell::Number(1.5)), Some(Some(1.5)));
        assert_eq!(Option::<f64>::from_cell(&Cell::Missing), None);
        assert_eq!(String::from_cell(&Cell::Number(7.0)), Some("7".to_string()));
    }
}
