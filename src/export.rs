use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::view::{DashboardView, SummaryPanel, SummarySection};

pub struct ExportReport {
    pub path: PathBuf,
    pub overview_rows: usize,
    pub spell_rows: usize,
    pub item_rows: usize,
}

pub fn export_file_name(champion: &str) -> String {
    let slug: String = champion
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
        .collect();
    format!("aram_board_{slug}.xlsx")
}

pub fn export_dashboard(dir: &Path, view: &DashboardView) -> Result<ExportReport> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create export dir {}", dir.display()))?;
    let path = dir.join(export_file_name(&view.profile.champion));

    let overview = overview_rows(view);
    let spells = section_rows(&view.spells);
    let items = section_rows(&view.items);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Overview")?;
        write_rows(sheet, &overview)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("SpellCombos")?;
        write_rows(sheet, &spells)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Items")?;
        write_rows(sheet, &items)?;
    }

    workbook
        .save(&path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        path,
        overview_rows: overview.len().saturating_sub(1),
        spell_rows: spells.len().saturating_sub(1),
        item_rows: items.len().saturating_sub(1),
    })
}

fn overview_rows(view: &DashboardView) -> Vec<Vec<String>> {
    let profile = &view.profile;
    let mut rows = vec![vec![
        "Section".to_string(),
        "Field".to_string(),
        "Value".to_string(),
    ]];
    rows.push(vec![
        "Champion".to_string(),
        "Name".to_string(),
        profile.champion.clone(),
    ]);
    rows.push(vec![
        "Champion".to_string(),
        "Source".to_string(),
        view.source_caption.clone(),
    ]);
    for tile in &profile.kpis {
        rows.push(vec![
            "KPI".to_string(),
            tile.label.to_string(),
            tile.value.clone(),
        ]);
    }
    if let Some(shift) = &profile.meta_shift {
        rows.push(vec![
            "KPI".to_string(),
            "Meta shift".to_string(),
            shift.clone(),
        ]);
    }
    for tile in &profile.build {
        rows.push(vec![
            "Build".to_string(),
            tile.label.to_string(),
            tile.value.clone(),
        ]);
    }
    for line in &profile.pairings {
        rows.push(vec![
            "Pairing".to_string(),
            line.label.to_string(),
            format!("{} ({})", line.champion, line.winrate),
        ]);
    }
    if let Some(points) = &profile.phase {
        for point in points {
            rows.push(vec![
                "Phase DPM".to_string(),
                point.label.to_string(),
                opt_to_string(point.value.map(f64::round)),
            ]);
        }
    }
    for tile in &profile.base_stats {
        rows.push(vec![
            "Base stats".to_string(),
            tile.label.to_string(),
            tile.value.clone(),
        ]);
    }
    rows
}

fn section_rows(panel: &SummaryPanel) -> Vec<Vec<String>> {
    match &panel.section {
        SummarySection::Ready(table) => {
            let mut rows = Vec::with_capacity(table.rows.len() + 1);
            rows.push(table.columns.clone());
            rows.extend(table.rows.iter().cloned());
            rows
        }
        SummarySection::Unavailable { caption } => vec![vec![caption.clone()]],
    }
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::export_file_name;

    #[test]
    fn file_names_are_filesystem_safe() {
        assert_eq!(export_file_name("Ahri"), "aram_board_Ahri.xlsx");
        assert_eq!(export_file_name("Kai'Sa"), "aram_board_Kai_Sa.xlsx");
        assert_eq!(export_file_name("Dr. Mundo"), "aram_board_Dr__Mundo.xlsx");
    }
}
