//! Date-sorted tabular view over one player's runs.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::record::{Extended, Outcome, Run};
use crate::GraphError;

pub use crate::record::Field;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Quantity plotted along the horizontal axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum XAxis {
    #[default]
    Time,
    Turns,
    Actions,
    Runs,
    Date,
}

impl XAxis {
    pub const ALL: [XAxis; 5] = [
        XAxis::Time,
        XAxis::Turns,
        XAxis::Actions,
        XAxis::Runs,
        XAxis::Date,
    ];

    pub fn name(self) -> &'static str {
        match self {
            XAxis::Time => "time",
            XAxis::Turns => "turns",
            XAxis::Actions => "actions",
            XAxis::Runs => "runs",
            XAxis::Date => "date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            XAxis::Time => "cumulative playing time (h)",
            XAxis::Turns => "cumulative turns taken",
            XAxis::Actions => "cumulative actions taken",
            XAxis::Runs => "run count",
            XAxis::Date => "date",
        }
    }
}

impl fmt::Display for XAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for XAxis {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        XAxis::ALL
            .into_iter()
            .find(|axis| axis.name() == s)
            .ok_or_else(|| GraphError::UnknownXAxis(s.to_string()))
    }
}

/// Date as fractional days since the Unix epoch.
pub fn date_ordinal(date: &NaiveDateTime) -> f64 {
    date.and_utc().timestamp() as f64 / SECONDS_PER_DAY
}

pub fn ordinal_date(days: f64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp((days * SECONDS_PER_DAY).round() as i64, 0)
        .map(|dt| dt.naive_utc())
}

#[derive(Clone, Debug)]
pub struct Data {
    runs: Vec<Run>,
    xaxis: XAxis,
}

impl Data {
    pub fn new(mut runs: Vec<Run>, xaxis: XAxis) -> Self {
        runs.sort_by_key(|run| run.date);
        Self { runs, xaxis }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn axis(&self) -> XAxis {
        self.xaxis
    }

    pub fn column(&self, field: Field) -> Array1<f64> {
        self.select(field, |_| true)
    }

    pub fn select<P>(&self, field: Field, mut filter: P) -> Array1<f64>
    where
        P: FnMut(&Run) -> bool,
    {
        self.runs
            .iter()
            .filter(|run| filter(*run))
            .map(|run| run.get(field))
            .collect()
    }

    pub fn mask<P>(&self, filter: P) -> Vec<bool>
    where
        P: FnMut(&Run) -> bool,
    {
        self.runs.iter().map(filter).collect()
    }

    /// Running sum; missing values contribute nothing.
    pub fn cumulative(&self, field: Field) -> Array1<f64> {
        let mut total = 0.0;
        self.runs
            .iter()
            .map(|run| {
                let v = run.get(field);
                if v.is_finite() {
                    total += v;
                }
                total
            })
            .collect()
    }

    /// Running maximum over the rows accepted by `filter`.
    pub fn running_max<P>(&self, field: Field, filter: P) -> Array1<f64>
    where
        P: FnMut(&Run) -> bool,
    {
        let mut best = f64::NAN;
        self.select(field, filter)
            .iter()
            .map(|&v| {
                if v.is_finite() && !(v <= best) {
                    best = v;
                }
                best
            })
            .collect()
    }

    pub fn count(&self) -> Array1<f64> {
        (1..=self.runs.len()).map(|n| n as f64).collect()
    }

    pub fn xaxis(&self) -> Array1<f64> {
        match self.xaxis {
            XAxis::Time => self.cumulative(Field::Time),
            XAxis::Turns => self.cumulative(Field::Turns),
            XAxis::Actions => self.cumulative(Field::Actions),
            XAxis::Runs => self.count(),
            XAxis::Date => self.runs.iter().map(|run| date_ordinal(&run.date)).collect(),
        }
    }

    pub fn xlabel(&self) -> &'static str {
        self.xaxis.label()
    }

    pub fn is_date_axis(&self) -> bool {
        self.xaxis == XAxis::Date
    }

    pub fn versions(&self) -> Vec<&str> {
        self.runs.iter().map(|run| run.version.as_str()).collect()
    }

    pub fn endings(&self) -> Vec<&str> {
        self.runs.iter().map(|run| run.ending.as_str()).collect()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.runs.iter().map(|run| run.outcome).collect()
    }

    pub fn difficulties(&self) -> Vec<u8> {
        self.runs.iter().map(|run| run.difficulty).collect()
    }

    pub fn extended(&self) -> Vec<Extended> {
        self.runs.iter().map(|run| run.extended).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn run(day: u32, time: f64, score: f64) -> Run {
        let date = NaiveDate::from_ymd_opt(2021, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut run = Run::new(date);
        run.time = Some(time);
        run.score = Some(score);
        run.turns = Some(time * 10_000.0);
        run.version = "Beta 10".into();
        run
    }

    #[test]
    fn sorts_runs_by_date() {
        let data = Data::new(
            vec![run(3, 1.0, 300.0), run(1, 2.0, 100.0), run(2, 3.0, 200.0)],
            XAxis::Runs,
        );
        assert_eq!(data.column(Field::Score).to_vec(), vec![100.0, 200.0, 300.0]);
        assert_eq!(data.xaxis().to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(data.xlabel(), "run count");
    }

    #[test]
    fn cumulative_treats_missing_as_zero() {
        let mut runs = vec![run(1, 1.0, 1000.0), run(2, 2.0, 2000.0), run(3, 0.5, 900.0)];
        runs[1].time = None;
        let data = Data::new(runs, XAxis::Time);
        assert_eq!(data.xaxis().to_vec(), vec![1.0, 1.0, 1.5]);
    }

    #[test]
    fn running_max_respects_filter() {
        let mut runs = vec![
            run(1, 1.0, 1000.0),
            run(2, 1.0, 5000.0),
            run(3, 1.0, 3000.0),
            run(4, 1.0, 7000.0),
        ];
        runs[1].difficulty = 1;
        let data = Data::new(runs, XAxis::Runs);
        let normal = data.running_max(Field::Score, |r| r.difficulty == 0);
        assert_eq!(normal.to_vec(), vec![1000.0, 3000.0, 7000.0]);
        assert_eq!(data.mask(|r| r.difficulty == 1), vec![false, true, false, false]);
    }

    #[test]
    fn running_max_skips_leading_nan() {
        let mut runs = vec![run(1, 1.0, 1000.0), run(2, 1.0, 500.0)];
        runs[0].score = None;
        let data = Data::new(runs, XAxis::Runs);
        let best = data.running_max(Field::Score, |_| true);
        assert!(best[0].is_nan());
        assert_eq!(best[1], 500.0);
    }

    #[test]
    fn date_axis_uses_day_ordinals() {
        let data = Data::new(vec![run(1, 1.0, 1.0), run(2, 1.0, 1.0)], XAxis::Date);
        let x = data.xaxis();
        assert!(data.is_date_axis());
        assert!((x[1] - x[0] - 1.0).abs() < 1e-9);
        assert_eq!(ordinal_date(x[0]), Some(data.runs()[0].date));
    }

    #[test]
    fn parses_axis_names() {
        assert_eq!("turns".parse::<XAxis>().unwrap(), XAxis::Turns);
        assert!("bogus".parse::<XAxis>().is_err());
    }
}
