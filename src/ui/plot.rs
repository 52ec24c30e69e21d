use chrono::{NaiveDate, NaiveTime, Timelike};
use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{GridMark, Line, Plot, PlotPoints, Points};

use bms_dash::{CellValue, Series};

use crate::color::generate_palette;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Charts (upper half of the central panel)
// ---------------------------------------------------------------------------

/// Render the SoC-vs-Time and Voltage-vs-Current charts side by side.
pub fn charts(ui: &mut Ui, state: &AppState, height: f32) {
    let colors = generate_palette(2);
    ui.columns(2, |cols: &mut [Ui]| {
        chart(
            &mut cols[0],
            "soc_vs_time",
            state.view.soc_vs_time.as_ref(),
            ChartKind::Line,
            colors[0],
            height,
        );
        chart(
            &mut cols[1],
            "voltage_vs_current",
            state.view.voltage_vs_current.as_ref(),
            ChartKind::Scatter,
            colors[1],
            height,
        );
    });
}

#[derive(Clone, Copy)]
enum ChartKind {
    Line,
    Scatter,
}

fn chart(ui: &mut Ui, id: &str, series: Option<&Series>, kind: ChartKind, color: Color32, height: f32) {
    let Some(series) = series else {
        ui.label(RichText::new("No chart: required columns are missing.").weak());
        return;
    };

    ui.strong(format!("{} vs {}", series.y_column, series.x_column));

    let (points, clock_axis) = plot_points(series);
    let mut plot = Plot::new(id)
        .height(height)
        .x_axis_label(series.x_column.clone())
        .y_axis_label(series.y_column.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if clock_axis {
        plot = plot.x_axis_formatter(|mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            format_clock(mark.value)
        });
    }

    let name = series.y_column.clone();
    plot.show(ui, |plot_ui| {
        let pts: PlotPoints = points.into_iter().collect();
        match kind {
            ChartKind::Line => plot_ui.line(Line::new(pts).name(&name).color(color).width(1.5)),
            ChartKind::Scatter => {
                plot_ui.points(Points::new(pts).name(&name).color(color).radius(3.0))
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Cell → plot coordinate
// ---------------------------------------------------------------------------

/// Convert a series to plot coordinates.
///
/// Rows whose y is not numeric are skipped. An x that has no numeric reading
/// falls back to the row position. The flag tells whether every x was a
/// clock time, so the axis can be labelled `HH:MM`.
fn plot_points(series: &Series) -> (Vec<[f64; 2]>, bool) {
    let mut clock_axis = !series.is_empty();
    let mut out = Vec::with_capacity(series.len());
    for (i, (x, y)) in series.points.iter().enumerate() {
        let Some(y) = numeric(y) else {
            continue;
        };
        let clock = match x {
            CellValue::Text(s) => clock_seconds(s),
            _ => None,
        };
        clock_axis &= clock.is_some();
        let x = clock.or_else(|| axis_value(x)).unwrap_or(i as f64);
        out.push([x, y]);
    }
    let clock_axis = clock_axis && !out.is_empty();
    (out, clock_axis)
}

fn axis_value(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Date(d) => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
            Some((*d - epoch).num_days() as f64)
        }
        other => numeric(other),
    }
}

/// Numeric reading of a cell; numbers kept as text (`3.70`) are parsed here.
fn numeric(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        other => other.as_f64(),
    }
}

/// Seconds after midnight for `HH:MM` / `HH:MM:SS` text.
fn clock_seconds(s: &str) -> Option<f64> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
        .map(|t| t.num_seconds_from_midnight() as f64)
}

fn format_clock(seconds: f64) -> String {
    let total = seconds.round().rem_euclid(86_400.0) as u32;
    format!("{:02}:{:02}", total / 3600, (total % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: Vec<(CellValue, CellValue)>) -> Series {
        Series {
            x_column: "x".into(),
            y_column: "y".into(),
            points,
        }
    }

    #[test]
    fn test_clock_axis() {
        let s = series(vec![
            (CellValue::Text("10:00".into()), CellValue::Integer(80)),
            (CellValue::Text("10:30:15".into()), CellValue::Float(79.5)),
        ]);
        let (points, clock) = plot_points(&s);
        assert!(clock);
        assert_eq!(points, vec![[36_000.0, 80.0], [37_815.0, 79.5]]);
        assert_eq!(format_clock(37_815.0), "10:30");
    }

    #[test]
    fn test_numeric_axis_and_skipped_rows() {
        let s = series(vec![
            (CellValue::Float(3.7), CellValue::Float(1.2)),
            (CellValue::Float(3.6), CellValue::Null),
            (CellValue::Text("n/a".into()), CellValue::Integer(2)),
            (CellValue::Text("3.50".into()), CellValue::Text("0.90".into())),
        ]);
        let (points, clock) = plot_points(&s);
        assert!(!clock);
        assert_eq!(points, vec![[3.7, 1.2], [2.0, 2.0], [3.5, 0.9]]);
    }

    #[test]
    fn test_dates_are_days() {
        let d = NaiveDate::from_ymd_opt(1970, 1, 11).unwrap();
        assert_eq!(axis_value(&CellValue::Date(d)), Some(10.0));
        assert!(!plot_points(&series(Vec::new())).1);
    }
}
