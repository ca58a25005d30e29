//! Per-player aggregation of parsed runs.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::archive::parse_archive;
use crate::record::{parse_sheet, Run};
use crate::{GraphError, Result};

/// Filters applied while collecting runs.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Only keep these players (names as they appear in the records).
    pub players: Option<Vec<String>>,
    /// Runs must score strictly more than this.
    pub min_score: f64,
    /// Players with fewer qualifying runs are not charted.
    pub min_runs: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            players: None,
            min_score: 750.0,
            min_runs: 2,
        }
    }
}

impl ScanOptions {
    pub fn wants_player(&self, player: &str) -> bool {
        self.players
            .as_ref()
            .map_or(true, |names| names.iter().any(|n| n == player))
    }
}

/// Runs keyed by player name.
#[derive(Clone, Debug, Default)]
pub struct Scores {
    players: BTreeMap<String, Vec<Run>>,
}

impl Scores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, player: String, run: Run) {
        self.players.entry(player).or_default().push(run);
    }

    pub fn extend(&mut self, other: Scores) {
        for (player, runs) in other.players {
            self.players.entry(player).or_default().extend(runs);
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, player: &str) -> Option<&[Run]> {
        self.players.get(player).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Run>)> {
        self.players.iter()
    }

    /// Fold aliases that differ only in case or dots into one player. The
    /// merged entry takes the name of the alias with the most runs.
    pub fn merge_aliases(self) -> Scores {
        let mut groups: BTreeMap<String, Vec<(String, Vec<Run>)>> = BTreeMap::new();
        for (player, runs) in self.players {
            groups
                .entry(canonical_name(&player))
                .or_default()
                .push((player, runs));
        }

        let mut merged = BTreeMap::new();
        for (_, aliases) in groups {
            let mut best: Option<(&str, usize)> = None;
            for (name, runs) in &aliases {
                if best.map_or(true, |(_, n)| runs.len() > n) {
                    best = Some((name, runs.len()));
                }
            }
            let name = best.map(|(name, _)| name.to_string()).unwrap_or_default();
            let runs: Vec<Run> = aliases.into_iter().flat_map(|(_, runs)| runs).collect();
            merged.insert(name, runs);
        }
        Scores { players: merged }
    }

    /// Drop players with fewer than `min_runs` runs.
    pub fn retain_active(&mut self, min_runs: usize) {
        self.players.retain(|_, runs| runs.len() >= min_runs);
    }

    /// Players ordered by run count (descending), then name ignoring case.
    pub fn by_activity(&self) -> Vec<(&str, &[Run])> {
        let mut players: Vec<(&str, &[Run])> = self
            .players
            .iter()
            .map(|(name, runs)| (name.as_str(), runs.as_slice()))
            .collect();
        players.sort_by(|a, b| {
            b.1.len()
                .cmp(&a.1.len())
                .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
        });
        players
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<Run>> {
        self.players
    }
}

pub fn canonical_name(player: &str) -> String {
    player.to_lowercase().replace('.', "")
}

/// Legacy sheets look like `<player>-<date>-<time>-<id>.txt`; `_log` files
/// sit next to them and are ignored.
pub fn is_sheet_name(name: &str) -> bool {
    name.ends_with(".txt") && name.matches('-').count() >= 3 && !name.contains("_log")
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(GraphError::NotADirectory(dir.to_path_buf()));
    }
    let io_err = |source: std::io::Error| GraphError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Paths of the legacy score sheets in `dir`.
pub fn sheet_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_files(dir)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_sheet_name)
        })
        .collect())
}

/// Paths of every archived record in `dir`.
pub fn archive_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    list_files(dir)
}

/// Parse one legacy sheet from disk.
pub fn read_sheet(path: &Path) -> Result<(String, Run)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GraphError::InvalidFileName(path.display().to_string()))?;
    let bytes = fs::read(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sheet(&String::from_utf8_lossy(&bytes), name)
}

/// Parse one archived record from disk.
pub fn read_archive(path: &Path) -> Result<Option<(String, Run)>> {
    let bytes = fs::read(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_archive(&bytes)
}

/// Keep a parsed run when it belongs to a wanted player and qualifies.
pub fn accept(opts: &ScanOptions, player: &str, run: &Run) -> bool {
    opts.wants_player(player) && run.qualifies(opts.min_score)
}

/// Fold parsed records into per-player runs. Records that fail to parse are
/// logged and skipped; unwanted players and non-qualifying runs are dropped.
pub fn collect_records<I, E>(records: I, opts: &ScanOptions) -> Scores
where
    I: IntoIterator<Item = (PathBuf, std::result::Result<Option<(String, Run)>, E>)>,
    E: fmt::Display,
{
    let mut scores = Scores::new();
    for (path, record) in records {
        match record {
            Ok(Some((player, run))) if accept(opts, &player, &run) => scores.push(player, run),
            Ok(_) => debug!("{}: filtered out", path.display()),
            Err(err) => warn!("{}: {:#}", path.display(), err),
        }
    }
    scores
}

/// Collect the qualifying runs of every legacy sheet in `dir`. Unreadable
/// sheets are logged and skipped.
pub fn collect_sheets(dir: &Path, opts: &ScanOptions) -> Result<Scores> {
    let records = sheet_paths(dir)?.into_iter().map(|path| {
        let record = read_sheet(&path).map(Some);
        (path, record)
    });
    Ok(collect_records(records, opts))
}

/// Collect the qualifying runs of every archived record in `dir`.
pub fn collect_archives(dir: &Path, opts: &ScanOptions) -> Result<Scores> {
    let records = archive_paths(dir)?.into_iter().map(|path| {
        let record = read_archive(&path);
        (path, record)
    });
    Ok(collect_records(records, opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::archived_sheet;
    use crate::data::tests::run;
    use crate::record::tests::SHEET;

    fn scores(entries: &[(&str, usize)]) -> Scores {
        let mut scores = Scores::new();
        for (name, count) in entries {
            for i in 0..*count {
                scores.push(name.to_string(), run(i as u32 + 1, 1.0, 1000.0));
            }
        }
        scores
    }

    #[test]
    fn merges_aliases_under_most_active_name() {
        let merged = scores(&[("Ape", 3), ("ape", 1), ("a.pe", 1), ("bob", 2)]).merge_aliases();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("Ape").map(<[Run]>::len), Some(5));
        assert_eq!(merged.get("bob").map(<[Run]>::len), Some(2));
    }

    #[test]
    fn alias_ties_take_lexicographically_first_name() {
        let merged = scores(&[("ape", 2), ("Ape", 2)]).merge_aliases();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("Ape").map(<[Run]>::len), Some(4));
    }

    #[test]
    fn orders_players_by_activity() {
        let mut all = scores(&[("zed", 4), ("Amy", 2), ("bob", 2), ("solo", 1)]);
        all.retain_active(2);
        let order: Vec<&str> = all.by_activity().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["zed", "Amy", "bob"]);
    }

    #[test]
    fn recognizes_sheet_names() {
        assert!(is_sheet_name("ape-210101-101010-42.txt"));
        assert!(!is_sheet_name("ape-210101-101010-42_log.txt"));
        assert!(!is_sheet_name("readme.txt"));
    }

    #[test]
    fn collects_qualifying_sheets_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ape-210101-101010-1.txt"), SHEET).unwrap();
        fs::write(dir.path().join("ape-210102-101010-2.txt"), SHEET).unwrap();
        fs::write(dir.path().join("bob-210102-101010-3.txt"), SHEET).unwrap();
        fs::write(
            dir.path().join("ape-210103-101010-4.txt"),
            "   TOTAL SCORE: 100\n Play Time: 5 min",
        )
        .unwrap();
        fs::write(dir.path().join("ape-210103-101010-4_log.txt"), "log").unwrap();

        let all = collect_sheets(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(all.get("ape").map(<[Run]>::len), Some(2));
        assert_eq!(all.get("bob").map(<[Run]>::len), Some(1));

        let opts = ScanOptions {
            players: Some(vec!["bob".into()]),
            ..ScanOptions::default()
        };
        let only_bob = collect_sheets(dir.path(), &opts).unwrap();
        assert_eq!(only_bob.len(), 1);
        assert!(only_bob.get("ape").is_none());
    }

    #[test]
    fn rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            collect_sheets(&missing, &ScanOptions::default()),
            Err(GraphError::NotADirectory(_))
        ));
    }

    #[test]
    fn collects_archives_and_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let ape = archived_sheet("ape", "ape-220101-101010-1.txt", 80);
        fs::write(dir.path().join("1.pb"), &ape).unwrap();
        fs::write(
            dir.path().join("2.pb"),
            archived_sheet("ape", "ape-220102-101010-2.txt", 80),
        )
        .unwrap();
        fs::write(
            dir.path().join("3.pb"),
            archived_sheet("bob", "bob-220102-101010-3.txt", 80),
        )
        .unwrap();
        fs::write(
            dir.path().join("4.pb"),
            archived_sheet("ape", "ape-220103-101010-4.txt", 0),
        )
        .unwrap();
        fs::write(dir.path().join("5.pb"), [0xffu8; 3]).unwrap();

        let all = collect_archives(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(all.get("ape").map(<[Run]>::len), Some(2));
        assert_eq!(all.get("bob").map(<[Run]>::len), Some(1));

        let opts = ScanOptions {
            players: Some(vec!["bob".into()]),
            ..ScanOptions::default()
        };
        let only_bob = collect_archives(dir.path(), &opts).unwrap();
        assert_eq!(only_bob.len(), 1);
        assert!(only_bob.get("bob").is_some());
    }

    #[test]
    fn sheets_and_archives_merge_per_player() {
        let sheets = tempfile::tempdir().unwrap();
        fs::write(sheets.path().join("Ape-210101-101010-1.txt"), SHEET).unwrap();
        let archives = tempfile::tempdir().unwrap();
        fs::write(
            archives.path().join("a.pb"),
            archived_sheet("A.pe", "Ape-220101-101010-1.txt", 80),
        )
        .unwrap();
        fs::write(
            archives.path().join("b.pb"),
            archived_sheet("A.pe", "Ape-220102-101010-2.txt", 80),
        )
        .unwrap();

        let opts = ScanOptions::default();
        let mut all = collect_sheets(sheets.path(), &opts).unwrap();
        all.extend(collect_archives(archives.path(), &opts).unwrap());
        let merged = all.merge_aliases();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("A.pe").map(<[Run]>::len), Some(3));
    }

    #[test]
    fn collect_records_logs_and_skips_errors() {
        let good = run(1, 1.0, 2000.0);
        let records = vec![
            (PathBuf::from("a"), Ok(Some(("ape".to_string(), good.clone())))),
            (PathBuf::from("b"), Err("broken")),
            (PathBuf::from("c"), Ok(None)),
            (PathBuf::from("d"), Ok(Some(("ape".to_string(), run(2, 1.0, 100.0))))),
        ];
        let scores = collect_records(records, &ScanOptions::default());
        assert_eq!(scores.get("ape"), Some(&[good][..]));
    }
}
