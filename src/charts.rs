//! PNG charts for the distribution tables.
//!
//! Values come from the "Number of ratings" column of the report tables: bar charts for
//! popularity and yearly volume, pie charts for the score and polarity shares. Charts
//! carry no text, the table exported next to each chart holds the labels.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::report::{self, Table};

const COUNT_HEADER: &str = "Number of ratings";
const SIZE: (u32, u32) = (800, 600);
const PALETTE: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, RGBColor(255, 165, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bars,
    Pie,
}

/// Chart drawn for a report table, if any.
pub fn chart_kind(table_name: &str) -> Option<ChartKind> {
    match table_name {
        "popular_products" | "reviews_by_year" | "product_reviews_by_year" => {
            Some(ChartKind::Bars)
        }
        "score_distribution" | "review_types" => Some(ChartKind::Pie),
        _ => None,
    }
}

fn chart_error(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Chart(e.to_string())
}

/// Rating counts of `table` in row order; cells that are not numbers count as zero.
pub fn counts(table: &Table) -> Vec<f64> {
    let Some(col) = table.headers.iter().position(|h| h == COUNT_HEADER) else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .map(|r| r.get(col).and_then(|c| c.parse::<f64>().ok()).unwrap_or(0.0))
        .collect()
}

fn draw_bars(path: &Path, values: &[f64]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let top = values.iter().copied().fold(0.0, f64::max).max(1.0) * 1.1;
    let n = values.len() as i32;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0..n, 0f64..top)
        .map_err(chart_error)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, &v)| {
            let x = i as i32;
            let mut bar = Rectangle::new([(x, 0.0), (x + 1, v)], PALETTE[0].filled());
            bar.set_margin(0, 0, 4, 4);
            bar
        }))
        .map_err(chart_error)?;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(0, 0.0), (n, 0.0)],
            &BLACK,
        )))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

fn draw_pie(path: &Path, values: &[f64]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let total: f64 = values.iter().sum();
    let (w, h) = SIZE;
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.4;

    // slices run clockwise from twelve o'clock
    let mut start = -PI / 2.0;
    for (i, &v) in values.iter().enumerate() {
        if v <= 0.0 {
            continue;
        }
        let sweep = v / total * 2.0 * PI;
        let steps = (sweep.to_degrees().ceil() as usize).max(2);
        let mut points = vec![center];
        points.extend((0..=steps).map(|s| {
            let a = start + sweep * s as f64 / steps as f64;
            (
                center.0 + (radius * a.cos()).round() as i32,
                center.1 + (radius * a.sin()).round() as i32,
            )
        }));
        root.draw(&Polygon::new(points, PALETTE[i % PALETTE.len()].filled()))
            .map_err(chart_error)?;
        start += sweep;
    }

    root.present().map_err(chart_error)?;
    Ok(())
}

/// Draws one PNG per chartable table into `dir`, named like the table exports
/// (`<stem>_<YYYYMMDD_HHMMSS>_<table>.png`). Tables without any count are skipped.
pub fn write_charts(tables: &[Table], stem: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    let stamp = report::export_stamp();
    let mut written = Vec::new();
    for table in tables {
        let Some(kind) = chart_kind(&table.name) else {
            continue;
        };
        let values = counts(table);
        if values.iter().sum::<f64>() <= 0.0 {
            debug!("{} has no counts, chart skipped", table.name);
            continue;
        }
        let path = dir.join(format!("{stem}_{stamp}_{}.png", table.name));
        match kind {
            ChartKind::Bars => draw_bars(&path, &values)?,
            ChartKind::Pie => draw_pie(&path, &values)?,
        }
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
