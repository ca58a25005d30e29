//! Catalogue of progression charts.
//!
//! Every [`ChartKind`] turns a player's [`Data`] into a [`Chart`]: a plain
//! description of ranges, marker groups, lines and annotations that a
//! drawing backend can render without knowing anything about runs.

use ndarray::Array1;

use crate::data::{Data, Field};
use crate::record::{Extended, Outcome};
use crate::stats::{
    changed_indices, clip_segment, divide_safe, eng_format, finite_range, linear_fit, nice_ceil,
    percent_format, trim_float, LinearFit,
};

const DATE_MARGIN: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Completion,
    HighScore,
    Score,
    Value,
    Time,
    Turns,
    Actions,
    Tempo,
    Speed,
    Regions,
    Prototypes,
    Parts,
    Slots,
    Damage,
    Melee,
    Em,
    Core,
    Hacking,
    Capacity,
    Influence,
    BestGroup,
}

impl ChartKind {
    pub const ALL: [ChartKind; 21] = [
        ChartKind::Completion,
        ChartKind::HighScore,
        ChartKind::Score,
        ChartKind::Value,
        ChartKind::Time,
        ChartKind::Turns,
        ChartKind::Actions,
        ChartKind::Tempo,
        ChartKind::Speed,
        ChartKind::Regions,
        ChartKind::Prototypes,
        ChartKind::Parts,
        ChartKind::Slots,
        ChartKind::Damage,
        ChartKind::Melee,
        ChartKind::Em,
        ChartKind::Core,
        ChartKind::Hacking,
        ChartKind::Capacity,
        ChartKind::Influence,
        ChartKind::BestGroup,
    ];

    /// File stem of the rendered image.
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Completion => "completion",
            ChartKind::HighScore => "high_score",
            ChartKind::Score => "score",
            ChartKind::Value => "value",
            ChartKind::Time => "time",
            ChartKind::Turns => "turns",
            ChartKind::Actions => "actions",
            ChartKind::Tempo => "tempo",
            ChartKind::Speed => "speed",
            ChartKind::Regions => "regions",
            ChartKind::Prototypes => "prototypes",
            ChartKind::Parts => "parts",
            ChartKind::Slots => "slots",
            ChartKind::Damage => "damage",
            ChartKind::Melee => "melee",
            ChartKind::Em => "em",
            ChartKind::Core => "core",
            ChartKind::Hacking => "hacking",
            ChartKind::Capacity => "capacity",
            ChartKind::Influence => "influence",
            ChartKind::BestGroup => "best_group",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Completion => "Completion",
            ChartKind::HighScore => "High score",
            ChartKind::Score => "Score",
            ChartKind::Value => "Value destroyed",
            ChartKind::Time => "Game length",
            ChartKind::Turns => "Game length (turns taken)",
            ChartKind::Actions => "Game length (actions taken)",
            ChartKind::Tempo => "Playing tempo",
            ChartKind::Speed => "Movement speed",
            ChartKind::Regions => "Regions visited",
            ChartKind::Prototypes => "Prototype IDs",
            ChartKind::Parts => "Part rating",
            ChartKind::Slots => "Slot usage",
            ChartKind::Damage => "Damage rate",
            ChartKind::Melee => "Melee",
            ChartKind::Em => "Electromagnetic damage",
            ChartKind::Core => "Core integrity",
            ChartKind::Hacking => "Hacking",
            ChartKind::Capacity => "Inventory capacity",
            ChartKind::Influence => "Influence",
            ChartKind::BestGroup => "Ally group rating",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            ChartKind::Completion => "completion",
            ChartKind::HighScore | ChartKind::Score => "score",
            ChartKind::Value => "value",
            ChartKind::Time => "game length (h)",
            ChartKind::Turns => "turns",
            ChartKind::Actions => "actions",
            ChartKind::Tempo => "actions per minute",
            ChartKind::Speed => "average speed",
            ChartKind::Regions => "regions",
            ChartKind::Prototypes => "prototype IDs",
            ChartKind::Parts => "peak state rating",
            ChartKind::Slots => "average slot usage",
            ChartKind::Damage => "damage inflicted per 100 turns",
            ChartKind::Melee => "melee damage",
            ChartKind::Em => "EM damage",
            ChartKind::Core => "average core remaining",
            ChartKind::Hacking => "peak offensive hacking",
            ChartKind::Capacity => "average capacity",
            ChartKind::Influence => "average influence",
            ChartKind::BestGroup => "highest-rated group",
        }
    }

    pub fn build(self, data: &Data) -> Chart {
        let mut chart = Chart::frame(self, data);
        let x = data.xaxis();
        let scatter = |chart: &mut Chart, y: Array1<f64>, opts: ScatterOptions| {
            scatter_plot(chart, data, &x, &y, opts)
        };

        match self {
            ChartKind::Completion => completion(&mut chart, data, &x),
            ChartKind::HighScore => high_score(&mut chart, data, &x),
            ChartKind::Influence => influence(&mut chart, data, &x),
            ChartKind::Score => scatter(&mut chart, data.column(Field::Score), ScatterOptions::default()),
            ChartKind::Value => scatter(&mut chart, data.column(Field::Value), ScatterOptions::default()),
            ChartKind::Time => scatter(&mut chart, data.column(Field::Time), ScatterOptions::default()),
            ChartKind::Turns => scatter(&mut chart, data.column(Field::Turns), ScatterOptions::default()),
            ChartKind::Actions => {
                scatter(&mut chart, data.column(Field::Actions), ScatterOptions::default())
            }
            ChartKind::Tempo => {
                let y = data.column(Field::Actions) / (data.column(Field::Time) * 60.0);
                scatter(&mut chart, y, ScatterOptions::default())
            }
            ChartKind::Speed => {
                chart.y_format = YFormat::Percent;
                scatter(&mut chart, data.column(Field::Speed), ScatterOptions::default())
            }
            ChartKind::Regions => {
                scatter(&mut chart, data.column(Field::Regions), ScatterOptions::default())
            }
            ChartKind::Prototypes => {
                scatter(&mut chart, data.column(Field::Prototypes), ScatterOptions::default())
            }
            ChartKind::Parts => scatter(&mut chart, data.column(Field::Parts), ScatterOptions::default()),
            ChartKind::Slots => {
                chart.y_format = YFormat::Percent;
                scatter(&mut chart, data.column(Field::Slots), ScatterOptions::percent())
            }
            ChartKind::Damage => {
                let y = data.column(Field::Damage) / data.column(Field::Turns) * 100.0;
                scatter(&mut chart, y, ScatterOptions::default())
            }
            ChartKind::Melee => {
                chart.y_format = YFormat::Percent;
                let y = divide_safe(&data.column(Field::Melee), &data.column(Field::Damage)) * 100.0;
                scatter(&mut chart, y, ScatterOptions::percent())
            }
            ChartKind::Em => {
                chart.y_format = YFormat::Percent;
                let y = divide_safe(&data.column(Field::Em), &data.column(Field::Damage)) * 100.0;
                scatter(&mut chart, y, ScatterOptions::percent())
            }
            ChartKind::Core => {
                chart.y_format = YFormat::Percent;
                scatter(&mut chart, data.column(Field::Core), ScatterOptions::percent())
            }
            ChartKind::Hacking => {
                scatter(&mut chart, data.column(Field::Hacking), ScatterOptions::default())
            }
            ChartKind::Capacity => {
                chart.y_format = YFormat::Integer;
                scatter(&mut chart, data.column(Field::Capacity), ScatterOptions::default())
            }
            ChartKind::BestGroup => {
                scatter(&mut chart, data.column(Field::BestGroup), ScatterOptions::default())
            }
        }
        chart
    }
}

/// Palette entries; the first four follow the usual category-10 cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Blue,
    Orange,
    Green,
    Red,
    Sky,
    Gray,
    Black,
}

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Blue => (0x1f, 0x77, 0xb4),
            Color::Orange => (0xff, 0x7f, 0x0e),
            Color::Green => (0x2c, 0xa0, 0x2c),
            Color::Red => (0xd6, 0x27, 0x28),
            Color::Sky => (0x5c, 0xa3, 0xe4),
            Color::Gray => (0x80, 0x80, 0x80),
            Color::Black => (0, 0, 0),
        }
    }

    fn for_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::SelfDestructed => Color::Sky,
            Outcome::Loss => Color::Blue,
            Outcome::Win => Color::Orange,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    Solid,
    Hollow,
    White,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stroke {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum YFormat {
    Engineering,
    Percent,
    /// Labels only on whole numbers.
    Integer,
    /// Values are `log2(influence)`; everything at or below the cutoff reads 0.
    Influence { cutoff: f64 },
}

impl YFormat {
    pub fn format(&self, value: f64) -> String {
        match *self {
            YFormat::Engineering => eng_format(value),
            YFormat::Percent => percent_format(value),
            YFormat::Integer => {
                if (value - value.round()).abs() < 1e-9 {
                    eng_format(value.round())
                } else {
                    String::new()
                }
            }
            YFormat::Influence { cutoff } => {
                if value <= cutoff + 1e-9 {
                    "0".to_string()
                } else {
                    trim_float(2f64.powf(value))
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerGroup {
    pub label: Option<&'static str>,
    pub color: Color,
    pub fill: Fill,
    pub stroke: Stroke,
    pub points: Vec<(f64, f64)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub label: Option<&'static str>,
    pub color: Color,
    pub stroke: Stroke,
    pub points: Vec<(f64, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingSize {
    Extended,
    DoubleExtended,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    pub center: (f64, f64),
    pub size: RingSize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointLabel {
    pub at: (f64, f64),
    pub text: String,
}

/// Game version annotation. `x` is `None` for the label of the first
/// version, which sits at the top of the y axis.
#[derive(Clone, Debug, PartialEq)]
pub struct VersionMarker {
    pub x: Option<f64>,
    pub label: String,
}

#[derive(Clone, Debug)]
pub struct Chart {
    pub kind: ChartKind,
    pub x_label: &'static str,
    pub x_dates: bool,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub y_format: YFormat,
    pub y_ticks: Option<Vec<f64>>,
    pub markers: Vec<MarkerGroup>,
    pub lines: Vec<Line>,
    pub rings: Vec<Ring>,
    pub labels: Vec<PointLabel>,
    pub trend: Option<LinearFit>,
    pub versions: Vec<VersionMarker>,
    pub legend: bool,
}

impl Chart {
    fn frame(kind: ChartKind, data: &Data) -> Self {
        let x = data.xaxis();
        Self {
            kind,
            x_label: data.xlabel(),
            x_dates: data.is_date_axis(),
            x_range: x_range(&x, data.is_date_axis()),
            y_range: (0.0, 1.0),
            y_format: YFormat::Engineering,
            y_ticks: None,
            markers: Vec::new(),
            lines: Vec::new(),
            rings: Vec::new(),
            labels: Vec::new(),
            trend: None,
            versions: Vec::new(),
            legend: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn y_label(&self) -> &'static str {
        self.kind.y_label()
    }

    /// Trend line clipped to the visible area.
    pub fn trend_segment(&self) -> Option<((f64, f64), (f64, f64))> {
        self.trend
            .as_ref()
            .and_then(|fit| clip_segment(fit, self.x_range, self.y_range))
    }

    /// All plotted y values, used to size the y axis.
    fn plotted_y(&self) -> Vec<f64> {
        self.markers
            .iter()
            .flat_map(|g| g.points.iter())
            .chain(self.lines.iter().flat_map(|l| l.points.iter()))
            .map(|p| p.1)
            .collect()
    }

    fn fit_y_range(&mut self, y_min: Option<f64>, y_max: Option<f64>) {
        let values = self.plotted_y();
        let observed = finite_range(&values);
        let lo = y_min.unwrap_or_else(|| observed.map_or(0.0, |r| r.0));
        let hi = y_max.unwrap_or_else(|| {
            let top = observed.map_or(1.0, |r| r.1);
            lo + nice_ceil(top - lo)
        });
        self.y_range = if hi > lo { (lo, hi) } else { (lo, lo + 1.0) };
    }
}

fn x_range(x: &Array1<f64>, dates: bool) -> (f64, f64) {
    let Some((lo, hi)) = finite_range(x) else {
        return (0.0, 1.0);
    };
    if dates {
        let margin = if hi > lo { DATE_MARGIN * (hi - lo) } else { 1.0 };
        (lo - margin, hi + margin)
    } else {
        (0.0, nice_ceil(hi))
    }
}

#[derive(Clone, Copy, Debug)]
struct ScatterOptions {
    y_min: Option<f64>,
    y_max: Option<f64>,
    mark_versions: bool,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            y_min: Some(0.0),
            y_max: None,
            mark_versions: true,
        }
    }
}

impl ScatterOptions {
    fn percent() -> Self {
        Self {
            y_max: Some(100.0),
            ..Self::default()
        }
    }
}

fn group_label(difficulty: u8, outcome: Outcome) -> Option<&'static str> {
    match (difficulty, outcome) {
        (2, Outcome::Loss) => Some("easiest"),
        (1, Outcome::Loss) => Some("easy"),
        (0, Outcome::Win) => Some("win"),
        _ => None,
    }
}

fn finite_points<I>(points: I) -> Vec<(f64, f64)>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    points
        .into_iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

/// Markers grouped by difficulty and outcome, extended-run rings, ending
/// labels, a trend line and version markers.
fn scatter_plot(chart: &mut Chart, data: &Data, x: &Array1<f64>, y: &Array1<f64>, opts: ScatterOptions) {
    let runs = data.runs();

    for difficulty in [2u8, 1, 0] {
        for outcome in [Outcome::SelfDestructed, Outcome::Loss, Outcome::Win] {
            let points = finite_points(
                runs.iter()
                    .zip(x.iter().zip(y.iter()))
                    .filter(|(run, _)| run.difficulty == difficulty && run.outcome == outcome)
                    .map(|(_, (&px, &py))| (px, py)),
            );
            if points.is_empty() {
                continue;
            }
            let color = Color::for_outcome(outcome);
            let fill = match (difficulty, outcome) {
                (0, _) => Fill::Solid,
                (_, Outcome::Win) => Fill::White,
                _ => Fill::Hollow,
            };
            chart.markers.push(MarkerGroup {
                label: group_label(difficulty, outcome),
                color,
                fill,
                stroke: if difficulty == 2 { Stroke::Dotted } else { Stroke::Solid },
                points,
            });
        }
    }

    for (run, (&px, &py)) in runs.iter().zip(x.iter().zip(y.iter())) {
        if !(px.is_finite() && py.is_finite()) {
            continue;
        }
        if run.extended.is_extended() {
            chart.rings.push(Ring {
                center: (px, py),
                size: RingSize::Extended,
            });
        }
        if run.extended == Extended::DoublePlus {
            chart.rings.push(Ring {
                center: (px, py),
                size: RingSize::DoubleExtended,
            });
        }
        if !run.ending.is_empty() {
            chart.labels.push(PointLabel {
                at: (px, py),
                text: run.ending.clone(),
            });
        }
    }

    chart.fit_y_range(opts.y_min, opts.y_max);
    chart.trend = linear_fit(&x.to_vec(), &y.to_vec());

    if opts.mark_versions {
        version_markers(chart, data, x);
    }

    chart.legend = chart.markers.iter().any(|g| g.label.is_some());
}

fn version_markers(chart: &mut Chart, data: &Data, x: &Array1<f64>) {
    let versions = data.versions();
    let Some(first) = versions.first() else {
        return;
    };
    chart.versions.push(VersionMarker {
        x: None,
        label: first.to_lowercase(),
    });
    for i in changed_indices(&versions) {
        chart.versions.push(VersionMarker {
            x: Some(x[i]),
            label: versions[i].to_lowercase(),
        });
    }
}

fn completion(chart: &mut Chart, data: &Data, x: &Array1<f64>) {
    // Orange stays reserved for wins.
    for (field, label, color) in [
        (Field::Lore, "lore", Color::Blue),
        (Field::Achievements, "achievements", Color::Green),
        (Field::Gallery, "gallery", Color::Red),
    ] {
        let y = data.column(field);
        chart.lines.push(Line {
            label: Some(label),
            color,
            stroke: Stroke::Solid,
            points: finite_points(x.iter().copied().zip(y.iter().copied())),
        });
    }
    chart.y_range = (0.0, 100.0);
    chart.y_format = YFormat::Percent;
    chart.legend = true;
    version_markers(chart, data, x);
}

fn high_score(chart: &mut Chart, data: &Data, x: &Array1<f64>) {
    let mut easy_modes = false;
    for (difficulty, label, stroke) in [
        (2u8, "easiest", Stroke::Dotted),
        (1, "easy", Stroke::Dashed),
        (0, "normal", Stroke::Solid),
    ] {
        let mask = data.mask(|run| run.difficulty == difficulty);
        let xs = x.iter().zip(&mask).filter(|(_, m)| **m).map(|(&v, _)| v);
        let best = data.running_max(Field::Score, |run| run.difficulty == difficulty);
        let points = finite_points(xs.zip(best.iter().copied()));
        if points.is_empty() {
            continue;
        }
        easy_modes |= difficulty > 0;
        chart.lines.push(Line {
            label: Some(label),
            color: Color::Blue,
            stroke,
            points,
        });
    }
    chart.fit_y_range(Some(0.0), None);
    chart.legend = easy_modes;
    version_markers(chart, data, x);
}

fn influence(chart: &mut Chart, data: &Data, x: &Array1<f64>) {
    let tick = 200f64.log2();
    let cutoff = tick - 6.0;
    let floor = 2f64.powf(cutoff);

    let y = data
        .column(Field::Influence)
        .mapv(|v| {
            if v.is_nan() {
                v
            } else if v <= floor {
                cutoff
            } else {
                v.log2()
            }
        });

    let opts = ScatterOptions {
        y_min: None,
        y_max: None,
        mark_versions: false,
    };
    scatter_plot(chart, data, x, &y, opts);

    if let Some((lo, hi)) = finite_range(&y) {
        let start = (lo - tick).floor() as i64;
        let stop = (hi - tick).ceil() as i64;
        let ticks: Vec<f64> = (start..=stop).map(|k| tick + k as f64).collect();
        let bottom = if lo <= cutoff { cutoff } else { ticks[0] };
        let top = ticks[ticks.len() - 1];
        chart.y_range = if top > bottom { (bottom, top) } else { (bottom, bottom + 1.0) };
        chart.y_ticks = Some(ticks);
    }
    chart.y_format = YFormat::Influence { cutoff };
    version_markers(chart, data, x);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::run;
    use crate::data::XAxis;
    use crate::record::Run;
    use std::collections::HashSet;

    fn sample() -> Data {
        let mut runs: Vec<Run> = (1..=4).map(|d| run(d, d as f64, 1000.0 * d as f64)).collect();
        runs[1].outcome = Outcome::Win;
        runs[1].ending = "3".into();
        runs[2].difficulty = 1;
        runs[3].extended = Extended::DoublePlus;
        runs[3].version = "Beta 11".into();
        for r in &mut runs {
            r.damage = Some(1000.0);
            r.melee = Some(250.0);
            r.influence = Some(400.0);
        }
        runs[0].damage = Some(0.0);
        runs[0].influence = Some(1.0);
        Data::new(runs, XAxis::Runs)
    }

    #[test]
    fn catalogue_names_are_unique() {
        let names: HashSet<_> = ChartKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), ChartKind::ALL.len());
    }

    #[test]
    fn every_chart_builds() {
        let data = sample();
        for kind in ChartKind::ALL {
            let chart = kind.build(&data);
            assert!(chart.y_range.1 > chart.y_range.0, "{}", kind.name());
            assert_eq!(chart.x_range, (0.0, 4.0));
        }
    }

    #[test]
    fn score_chart_groups_by_difficulty_and_outcome() {
        let chart = ChartKind::Score.build(&sample());
        let win = chart
            .markers
            .iter()
            .find(|g| g.label == Some("win"))
            .unwrap();
        assert_eq!(win.points, vec![(2.0, 2000.0)]);
        assert_eq!(win.color, Color::Orange);

        let easy = chart
            .markers
            .iter()
            .find(|g| g.label == Some("easy"))
            .unwrap();
        assert_eq!(easy.fill, Fill::Hollow);

        assert_eq!(chart.rings.len(), 2);
        assert_eq!(chart.labels[0].text, "3");
        assert!(chart.legend);
        assert_eq!(chart.y_range, (0.0, 4000.0));

        let fit = chart.trend.unwrap();
        assert!((fit.slope - 1000.0).abs() < 1e-6);

        assert_eq!(chart.versions.len(), 2);
        assert_eq!(chart.versions[0].label, "beta 10");
        assert_eq!(chart.versions[1].x, Some(4.0));
    }

    #[test]
    fn melee_share_is_zero_without_damage() {
        let chart = ChartKind::Melee.build(&sample());
        let ys: Vec<f64> = chart
            .markers
            .iter()
            .flat_map(|g| g.points.iter().map(|p| p.1))
            .collect();
        assert!(ys.contains(&0.0));
        assert!(ys.contains(&25.0));
        assert_eq!(chart.y_range, (0.0, 100.0));
        assert_eq!(chart.y_format.format(25.0), "25%");
    }

    #[test]
    fn influence_uses_log_scale_with_cutoff() {
        let chart = ChartKind::Influence.build(&sample());
        let YFormat::Influence { cutoff } = chart.y_format else {
            panic!("unexpected format");
        };
        assert_eq!(chart.y_range.0, cutoff);
        let ticks = chart.y_ticks.as_ref().unwrap();
        assert_eq!(ticks[0], cutoff);
        assert!(chart.y_range.1 >= 400f64.log2() - 1e-9);
        assert_eq!(chart.y_format.format(200f64.log2() + 1.0), "400");
        assert_eq!(chart.y_format.format(cutoff), "0");
    }

    #[test]
    fn completion_skips_win_color() {
        let chart = ChartKind::Completion.build(&sample());
        let colors: Vec<Color> = chart.lines.iter().map(|l| l.color).collect();
        assert_eq!(colors, vec![Color::Blue, Color::Green, Color::Red]);
        assert_eq!(chart.y_range, (0.0, 100.0));
    }

    #[test]
    fn high_score_tracks_running_best_per_mode() {
        let chart = ChartKind::HighScore.build(&sample());
        let normal = chart.lines.iter().find(|l| l.label == Some("normal")).unwrap();
        assert_eq!(
            normal.points,
            vec![(1.0, 1000.0), (2.0, 2000.0), (4.0, 4000.0)]
        );
        assert!(chart.legend);
    }

    #[test]
    fn date_axis_gets_margins() {
        let runs: Vec<Run> = (1..=3).map(|d| run(d, 1.0, 1000.0)).collect();
        let data = Data::new(runs, XAxis::Date);
        let chart = ChartKind::Score.build(&data);
        assert!(chart.x_dates);
        let x = data.xaxis();
        assert!((x[0] - chart.x_range.0 - 0.4).abs() < 1e-6);
        assert!((chart.x_range.1 - x[2] - 0.4).abs() < 1e-6);
    }
}
