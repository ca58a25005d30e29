use std::fs;
use std::io;
use std::panic;
use std::path::Path;

use anyhow::Result;
use cogmind_graph::charts::{Chart, Color as Palette, Fill, RingSize, Stroke};
use cogmind_graph::data::ordinal_date;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use tracing::warn;

const SVG_SIZE: (u32, u32) = (640, 480);
const MARKER_RADIUS: i32 = 4;
const DASHES: usize = 24;

/// Output image format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

/// Render one chart, turning backend errors and panics into a message so a
/// single bad chart does not abort the player. A failed chart leaves no file
/// behind.
pub fn render_chart_guard(
    chart: &Chart,
    player: &str,
    path: &Path,
    format: ImageFormat,
    width: u32,
) -> Result<(), String> {
    guarded(path, || render_chart(chart, player, path, format, width))
}

fn guarded<F>(path: &Path, render: F) -> Result<(), String>
where
    F: FnOnce() -> Result<()>,
{
    let outcome = panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())
        .and_then(|result| result.map_err(|e| format!("plotting error: {}", e)));
    if outcome.is_err() {
        discard(path);
    }
    outcome
}

/// Backends flush on drop, so a failed render can still leave a blank image.
fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("failed to remove {}: {}", path.display(), err),
    }
}

fn render_chart(
    chart: &Chart,
    player: &str,
    path: &Path,
    format: ImageFormat,
    width: u32,
) -> Result<()> {
    match format {
        ImageFormat::Png => {
            let size = (width, width * 3 / 4);
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_chart(root, chart, player)
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
            draw_chart(root, chart, player)
        }
    }
}

fn rgb(color: Palette) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

fn marker_style(color: Palette, fill: Fill, stroke: Stroke) -> ShapeStyle {
    let width = if stroke == Stroke::Dotted { 1 } else { 2 };
    match fill {
        Fill::Solid => rgb(color).filled().stroke_width(width),
        Fill::Hollow | Fill::White => rgb(color).stroke_width(width),
    }
}

/// Break a segment into evenly spaced dashes.
fn dashes(from: (f64, f64), to: (f64, f64), count: usize) -> Vec<[(f64, f64); 2]> {
    let lerp = |t: f64| (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
    let step = 1.0 / (2 * count) as f64;
    (0..count)
        .map(|i| {
            let t = 2.0 * i as f64 * step;
            [lerp(t), lerp(t + step)]
        })
        .collect()
}

fn x_label(chart: &Chart, v: f64) -> String {
    if chart.x_dates {
        ordinal_date(v)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    } else {
        cogmind_graph::stats::eng_format(v)
    }
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, chart: &Chart, player: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let title_font = FontDesc::new(FontFamily::SansSerif, 20.0, FontStyle::Bold);
    let area = root.titled(&format!("{player}'s Cogmind progression"), title_font)?;

    let axis_font = FontDesc::new(FontFamily::SansSerif, 13.0, FontStyle::Normal);
    let small_font = FontDesc::new(FontFamily::SansSerif, 11.0, FontStyle::Normal);
    let (x0, x1) = chart.x_range;
    let (y0, y1) = chart.y_range;

    let mut ctx = ChartBuilder::on(&area)
        .caption(chart.title(), ("sans-serif", 16))
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 55)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    let explicit_ticks = chart.y_ticks.is_some();
    let y_format = chart.y_format;
    ctx.configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(&BLACK.mix(0.08))
        .x_desc(chart.x_label)
        .y_desc(chart.y_label())
        .x_labels(6)
        .x_label_formatter(&|v| x_label(chart, *v))
        .y_label_formatter(&|v| {
            if explicit_ticks {
                String::new()
            } else {
                y_format.format(*v)
            }
        })
        .label_style(axis_font.clone().color(&BLACK.mix(0.85)))
        .draw()?;

    if let Some(ticks) = &chart.y_ticks {
        for &tick in ticks.iter().filter(|&&t| t >= y0 && t <= y1) {
            ctx.draw_series(LineSeries::new(
                [(x0, tick), (x1, tick)],
                BLACK.mix(0.08),
            ))?;
            ctx.draw_series(std::iter::once(
                EmptyElement::at((x0, tick))
                    + Text::new(y_format.format(tick), (4, -14), small_font.clone()),
            ))?;
        }
    }

    let gray = rgb(Palette::Gray);

    for version in &chart.versions {
        match version.x {
            Some(x) => {
                for seg in dashes((x, y0), (x, y1), DASHES) {
                    ctx.draw_series(LineSeries::new(seg, gray.mix(0.6)))?;
                }
                ctx.draw_series(std::iter::once(
                    EmptyElement::at((x, y1))
                        + Text::new(
                            version.label.clone(),
                            (3, 4),
                            small_font.clone().transform(FontTransform::Rotate90),
                        ),
                ))?;
            }
            None => {
                ctx.draw_series(std::iter::once(
                    EmptyElement::at((x0, y1))
                        + Text::new(version.label.clone(), (4, 4), small_font.clone()),
                ))?;
            }
        }
    }

    if let Some((from, to)) = chart.trend_segment() {
        for seg in dashes(from, to, DASHES) {
            ctx.draw_series(LineSeries::new(seg, gray.stroke_width(1)))?;
        }
    }

    for line in &chart.lines {
        let color = rgb(line.color);
        let style = color.stroke_width(2);
        let series = match line.stroke {
            Stroke::Solid => ctx.draw_series(LineSeries::new(line.points.iter().copied(), style))?,
            Stroke::Dashed | Stroke::Dotted => {
                let count = if line.stroke == Stroke::Dashed { 4 } else { 10 };
                let segments: Vec<PathElement<(f64, f64)>> = line
                    .points
                    .windows(2)
                    .flat_map(|w| dashes(w[0], w[1], count))
                    .map(|seg| PathElement::new(seg.to_vec(), style))
                    .collect();
                ctx.draw_series(segments)?
            }
        };
        if let Some(label) = line.label {
            series
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
    }

    for ring in &chart.rings {
        let radius = match ring.size {
            RingSize::Extended => MARKER_RADIUS + 4,
            RingSize::DoubleExtended => MARKER_RADIUS + 8,
        };
        ctx.draw_series(std::iter::once(Circle::new(
            ring.center,
            radius,
            BLACK.mix(0.6).stroke_width(1),
        )))?;
    }

    for group in &chart.markers {
        if group.fill == Fill::White {
            ctx.draw_series(
                group
                    .points
                    .iter()
                    .map(|&p| Circle::new(p, MARKER_RADIUS, WHITE.filled())),
            )?;
        }
        let style = marker_style(group.color, group.fill, group.stroke);
        let series = ctx.draw_series(
            group
                .points
                .iter()
                .map(|&p| Circle::new(p, MARKER_RADIUS, style)),
        )?;
        if let Some(label) = group.label {
            series
                .label(label)
                .legend(move |(x, y)| Circle::new((x, y), MARKER_RADIUS, style));
        }
    }

    for label in &chart.labels {
        ctx.draw_series(std::iter::once(
            EmptyElement::at(label.at) + Text::new(label.text.clone(), (5, -14), small_font.clone()),
        ))?;
    }

    if chart.legend {
        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.7))
            .border_style(&BLACK.mix(0.3))
            .label_font(small_font.color(&BLACK))
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    area.present()?;
    Ok(())
}
