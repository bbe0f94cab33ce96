//! HTML bar charts rendered with charming (ECharts).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use charming::{
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisType, Tooltip, Trigger},
    series::Bar,
    Chart, HtmlRenderer,
};
use f1stats_core::ChartSeries;

const WIDTH: u64 = 1200;
const HEIGHT: u64 = 700;

pub fn build_bar_chart(series: &ChartSeries) -> Chart {
    Chart::new()
        .title(Title::new().text(series.title.as_str()).left("center"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(Grid::new().left("8%").right("4%").top("12%").bottom("30%"))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .name(series.x_label.as_str())
                .data(series.categories())
                .axis_label(AxisLabel::new().rotate(60.0)),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name(series.y_label.as_str()),
        )
        .series(Bar::new().name(series.y_label.as_str()).data(series.values()))
}

/// Writes `<dir>/<slug>.html`, creating `dir` when needed.
pub fn render_bar_chart(series: &ChartSeries, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create chart directory {}", dir.display()))?;

    let path = dir.join(format!("{}.html", series.slug));
    let chart = build_bar_chart(series);
    HtmlRenderer::new(series.title.as_str(), WIDTH, HEIGHT)
        .save(&chart, &path)
        .map_err(|err| anyhow!("failed to render {}: {err:?}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> ChartSeries {
        ChartSeries {
            slug: "front_row_conversion",
            title: "Podium Finishes per Front-Row Start by Driver".to_string(),
            x_label: "Driver Surname".to_string(),
            y_label: "Conversion Rate".to_string(),
            points: vec![("Rosberg".to_string(), 0.5), ("Hamilton".to_string(), 1.0)],
        }
    }

    #[test]
    fn writes_html_named_after_slug() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("charts");

        let path = render_bar_chart(&series(), &target).unwrap();
        assert_eq!(path, target.join("front_row_conversion.html"));

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("Rosberg"));
        assert!(html.contains("Hamilton"));
    }
}
