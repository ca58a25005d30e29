use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use cogmind_graph::{Field, Run};

fn cell(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

pub fn write_runs_csv(path: &Path, runs: &[Run]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    write_runs(runs, &mut writer)
}

/// One row per run: identity columns followed by every numeric field.
pub fn write_runs<W: Write>(runs: &[Run], writer: &mut csv::Writer<W>) -> Result<()> {
    let mut header = vec!["date", "version", "extended", "ending"];
    header.extend(Field::ALL.iter().map(|f| f.name()));
    writer.write_record(&header)?;

    for run in runs {
        let mut row = vec![
            run.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            run.version.clone(),
            run.extended.marker().to_string(),
            run.ending.clone(),
        ];
        row.extend(Field::ALL.iter().map(|&f| cell(run.get(f))));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn writes_missing_values_as_empty_cells() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        let mut run = Run::new(date);
        run.score = Some(1234.0);
        run.version = "Beta 11".into();

        let mut writer = csv::Writer::from_writer(Vec::new());
        write_runs(&[run], &mut writer).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("date,version,extended,ending,easy,win,score,value"));
        assert!(lines
            .next()
            .unwrap()
            .starts_with("2021-03-04 05:06:07,Beta 11,,,0,0,1234,,"));
    }
}
