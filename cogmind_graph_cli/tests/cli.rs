use std::fs;
use std::path::Path;
use std::process::Command;

use cogmind_graph::archive::{
    ArchivedPostScoresheetRequest, Exploration, Game, Header, Performance, Scoresheet,
    SpacesMoved, Stats,
};
use cogmind_graph::ChartKind;
use prost::Message;

const SHEET: &str = "\
Cogmind - Beta 11 (Prerelease 2)

---[ CORE DESTROYED ]---

 Performance
   Regions Visited                          9
   TOTAL SCORE: 4200
 Play Time: 95 min

 Stats
   Turns Passed                          12000
   Actions Taken                          6000
   Average Speed (%)                        110
";

fn write_sheets(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), SHEET).expect("write sheet");
    }
}

fn archived(player: &str, filename: &str) -> Vec<u8> {
    ArchivedPostScoresheetRequest {
        scoresheet: Some(Scoresheet {
            header: Some(Header {
                player_name: player.into(),
                filename: filename.into(),
                run_result: "Destroyed by Behemoth".into(),
                version: "Beta 12".into(),
                difficulty: 1,
            }),
            game: Some(Game {
                run_time: "2:00:00".into(),
                ..Default::default()
            }),
            performance: Some(Performance {
                total_score: 5100,
                ..Default::default()
            }),
            stats: Some(Stats {
                exploration: Some(Exploration {
                    turns_passed: 15000,
                    spaces_moved: Some(SpacesMoved { average_speed: 95 }),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
    }
    .encode_to_vec()
}

fn plot(scores: &Path, output: &Path, extra: &[&str]) {
    let status = Command::new(env!("CARGO_BIN_EXE_cogmindgraph"))
        .arg("plot")
        .arg(scores)
        .arg(output)
        .args(extra)
        .status()
        .expect("run cli");
    assert!(status.success());
}

#[test]
fn cli_plot_writes_gallery_and_csv() {
    let exe = env!("CARGO_BIN_EXE_cogmindgraph");
    let scores = tempfile::tempdir().expect("tempdir");
    let output = tempfile::tempdir().expect("tempdir");
    write_sheets(
        scores.path(),
        &["ape-210101-101010-1.txt", "ape-210102-101010-2.txt", "bob-210102-101010-3.txt"],
    );

    let status = Command::new(exe)
        .arg("plot")
        .arg(scores.path())
        .arg(output.path())
        .args(["--html", "--csv", "--xaxis", "runs"])
        .status()
        .expect("run cli");
    assert!(status.success());

    let index = fs::read_to_string(output.path().join("index.html")).expect("read index");
    assert!(index.contains("ape</a> (2 games)"));
    assert!(!index.contains("bob"));
    assert!(output.path().join("style.css").is_file());
    assert!(output.path().join("ape").join("index.html").is_file());

    let csv = fs::read_to_string(output.path().join("ape").join("runs.csv")).expect("read csv");
    assert_eq!(csv.lines().count(), 3);

    for kind in ChartKind::ALL.iter() {
        let path = output.path().join("ape").join(format!("{}.svg", kind.name()));
        let svg = fs::read_to_string(&path).expect("read chart");
        assert!(
            svg.contains("<circle") || svg.contains("<polyline"),
            "{} has no plotted data",
            path.display()
        );
    }
    let score = fs::read_to_string(output.path().join("ape").join("score.svg")).expect("read");
    assert!(score.contains("<circle"));
    let completion =
        fs::read_to_string(output.path().join("ape").join("completion.svg")).expect("read");
    assert!(completion.contains("<polyline"));
}

#[test]
fn cli_plot_renders_png_charts() {
    let scores = tempfile::tempdir().expect("tempdir");
    let output = tempfile::tempdir().expect("tempdir");
    write_sheets(
        scores.path(),
        &["ape-210101-101010-1.txt", "ape-210102-101010-2.txt"],
    );
    plot(scores.path(), output.path(), &["--format", "png", "--size", "640"]);

    let png = fs::read(output.path().join("ape").join("score.png")).expect("read png");
    assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
    assert!(!output.path().join("ape").join("score.svg").exists());
}

#[test]
fn cli_plot_merges_archived_records() {
    let scores = tempfile::tempdir().expect("tempdir");
    let archives = tempfile::tempdir().expect("tempdir");
    let output = tempfile::tempdir().expect("tempdir");
    write_sheets(scores.path(), &["ape-210101-101010-1.txt"]);
    fs::write(
        archives.path().join("1.pb"),
        archived("ape", "ape-220101-101010-7.txt"),
    )
    .expect("write archive");
    fs::write(archives.path().join("2.pb"), [0xffu8, 0x00, 0x13]).expect("write garbage");

    plot(scores.path(), output.path(), &[]);
    assert!(!output.path().join("ape").exists());

    let archive_dir = archives.path().to_str().expect("utf-8 path");
    plot(scores.path(), output.path(), &["--pb-path", archive_dir, "--html"]);
    let index = fs::read_to_string(output.path().join("index.html")).expect("read index");
    assert!(index.contains("ape</a> (2 games)"));
    assert!(output.path().join("ape").join("score.svg").is_file());
}

#[test]
fn cli_plot_without_active_players_succeeds() {
    let exe = env!("CARGO_BIN_EXE_cogmindgraph");
    let scores = tempfile::tempdir().expect("tempdir");
    let output = tempfile::tempdir().expect("tempdir");
    write_sheets(scores.path(), &["ape-210101-101010-1.txt"]);

    let result = Command::new(exe)
        .arg("plot")
        .arg(scores.path())
        .arg(output.path())
        .output()
        .expect("run cli");
    assert!(result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Could not find any players with at least 2 games."));
}

#[test]
fn cli_plot_rejects_missing_folder() {
    let exe = env!("CARGO_BIN_EXE_cogmindgraph");
    let output = tempfile::tempdir().expect("tempdir");
    let status = Command::new(exe)
        .arg("plot")
        .arg(output.path().join("missing"))
        .arg(output.path())
        .status()
        .expect("run cli");
    assert!(!status.success());
}

#[test]
fn cli_inspect_reports_parsed_fields() {
    let exe = env!("CARGO_BIN_EXE_cogmindgraph");
    let scores = tempfile::tempdir().expect("tempdir");
    write_sheets(scores.path(), &["ape-210101-101010-1++.txt"]);

    let result = Command::new(exe)
        .arg("inspect")
        .arg(scores.path().join("ape-210101-101010-1++.txt"))
        .output()
        .expect("run cli");
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("player: ape"));
    assert!(stdout.contains("extended: ++"));
    assert!(stdout.contains("qualifies: yes"));
}
