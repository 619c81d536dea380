use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::pipeline::ForecastRun;
use crate::season_summary::PerMinuteRow;

#[derive(Debug)]
pub struct ExportReport {
    pub rankings: usize,
    pub projections: usize,
    pub per_minute: usize,
}

/// Write the run as a workbook: Rankings, Projections, Model and PerMinute sheets.
pub fn export_forecast_xlsx(
    path: &Path,
    run: &ForecastRun,
    per_minute: &[PerMinuteRow],
) -> Result<ExportReport> {
    let mut ranking_rows = vec![header(&[
        "Rank",
        "Player",
        "Season",
        "Predicted PTS",
        "Composite Score",
    ])];
    for (idx, player) in run.rankings.iter().enumerate() {
        ranking_rows.push(vec![
            Cell::Number((idx + 1) as f64),
            Cell::Text(player.player.clone()),
            Cell::Text(player.season.clone()),
            Cell::Number(player.predicted_points),
            Cell::Number(player.composite_score),
        ]);
    }

    let mut projection_rows = vec![header(&[
        "Player",
        "Season",
        "PTS",
        "REB",
        "AST",
        "STL",
        "BLK",
        "MIN",
        "Predicted PTS",
    ])];
    for row in &run.projected {
        projection_rows.push(vec![
            Cell::Text(row.player.clone()),
            Cell::Text(row.season.clone()),
            Cell::Number(row.stats.points),
            Cell::Number(row.stats.rebounds),
            Cell::Number(row.stats.assists),
            Cell::Number(row.stats.steals),
            Cell::Number(row.stats.blocks),
            Cell::Number(row.stats.minutes),
            Cell::Number(row.predicted_points),
        ]);
    }

    let model = &run.model;
    let mut model_rows = vec![
        header(&["Term", "Value"]),
        vec![Cell::text("intercept"), Cell::Number(model.model.intercept)],
    ];
    for (name, coeff) in model.model.feature_names.iter().zip(&model.model.coefficients) {
        model_rows.push(vec![Cell::Text(name.clone()), Cell::Number(*coeff)]);
    }
    model_rows.push(vec![Cell::text("train_rows"), Cell::Number(model.train_rows as f64)]);
    model_rows.push(vec![Cell::text("test_rows"), Cell::Number(model.test_rows as f64)]);
    model_rows.push(vec![Cell::text("train_mse"), Cell::Number(model.train_mse)]);
    model_rows.push(vec![Cell::text("test_mse"), Cell::Number(model.test_mse)]);
    // Seeds can exceed f64's exact integer range.
    model_rows.push(vec![Cell::text("seed"), Cell::Text(model.seed.to_string())]);

    let mut per_minute_rows = vec![header(&[
        "Player", "Season", "MIN", "PTS/min", "REB/min", "AST/min", "STL/min", "BLK/min", "FG%",
        "3PT%", "FT%", "FG3A%", "PTS/FGA", "TRU%", "AST/TOV",
    ])];
    for row in per_minute {
        per_minute_rows.push(vec![
            Cell::Text(row.player.clone()),
            Cell::Text(row.season.clone()),
            Cell::Number(row.minutes),
            Cell::Number(row.points_per_min),
            Cell::Number(row.rebounds_per_min),
            Cell::Number(row.assists_per_min),
            Cell::Number(row.steals_per_min),
            Cell::Number(row.blocks_per_min),
            Cell::ratio(row.fg_pct),
            Cell::ratio(row.fg3_pct),
            Cell::ratio(row.ft_pct),
            Cell::ratio(row.fg3a_rate),
            Cell::ratio(row.points_per_fga),
            Cell::ratio(row.true_shooting),
            Cell::ratio(row.ast_to_tov),
        ]);
    }

    let mut workbook = Workbook::new();
    for (name, rows) in [
        ("Rankings", &ranking_rows),
        ("Projections", &projection_rows),
        ("Model", &model_rows),
        ("PerMinute", &per_minute_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_cells(sheet, rows).with_context(|| format!("fill sheet {name}"))?;
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rankings: ranking_rows.len().saturating_sub(1),
        projections: projection_rows.len().saturating_sub(1),
        per_minute: per_minute_rows.len().saturating_sub(1),
    })
}

/// A workbook cell. Ratios with no denominator are left blank.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    fn text(value: &str) -> Self {
        Cell::Text(value.to_string())
    }

    fn ratio(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Blank)
    }
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels.iter().map(|label| Cell::text(label)).collect()
}

fn write_cells(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        let r = u32::try_from(row_idx).context("row index out of range")?;
        for (col_idx, cell) in row.iter().enumerate() {
            let c = u16::try_from(col_idx).context("column index out of range")?;
            match cell {
                Cell::Text(value) => worksheet.write_string(r, c, value).map(|_| ()),
                Cell::Number(value) if value.is_finite() => {
                    worksheet.write_number(r, c, *value).map(|_| ())
                }
                Cell::Number(_) | Cell::Blank => Ok(()),
            }
            .with_context(|| format!("write {cell:?} at ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ratios_become_blank_cells() {
        assert_eq!(Cell::ratio(Some(0.5)), Cell::Number(0.5));
        assert_eq!(Cell::ratio(None), Cell::Blank);
        assert_eq!(header(&["A", "B"]), vec![Cell::text("A"), Cell::text("B")]);
    }

    #[test]
    fn mixed_rows_write_without_error() {
        let mut sheet = Worksheet::new();
        let rows = vec![
            header(&["Player", "PTS", "FG%"]),
            vec![Cell::text("A"), Cell::Number(130.0), Cell::Blank],
            vec![Cell::text("B"), Cell::Number(f64::NAN), Cell::Number(0.45)],
        ];
        write_cells(&mut sheet, &rows).expect("cells should write");
    }
}
