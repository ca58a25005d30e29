//! Legacy text score sheet parsing.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{GraphError, Result};

static FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(.*)-(\d\d)(\d\d)(\d\d)-(\d\d)(\d\d)(\d\d)(?:-\d)?--?\d+(?:_w\d*)?(\++)?\.txt$",
    )
    .expect("file name pattern")
});

/// Final result of a run, ordered the way the charts colour it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Outcome {
    SelfDestructed,
    Loss,
    Win,
}

impl Outcome {
    pub fn code(self) -> i8 {
        match self {
            Outcome::SelfDestructed => -1,
            Outcome::Loss => 0,
            Outcome::Win => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Outcome::SelfDestructed => "self-destructed",
            Outcome::Loss => "loss",
            Outcome::Win => "win",
        }
    }
}

/// Extended-game marker taken from the `+` suffix of the sheet file name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extended {
    #[default]
    None,
    Plus,
    DoublePlus,
    Deeper,
}

impl Extended {
    pub fn from_marker(marker: &str) -> Self {
        match marker.chars().filter(|&c| c == '+').count() {
            0 => Extended::None,
            1 => Extended::Plus,
            2 => Extended::DoublePlus,
            _ => Extended::Deeper,
        }
    }

    pub fn is_extended(self) -> bool {
        self != Extended::None
    }

    pub fn marker(self) -> &'static str {
        match self {
            Extended::None => "",
            Extended::Plus => "+",
            Extended::DoublePlus => "++",
            Extended::Deeper => "+++",
        }
    }
}

/// Numeric columns available on every run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Difficulty,
    Outcome,
    Score,
    Value,
    Time,
    Turns,
    Actions,
    Lore,
    Gallery,
    Achievements,
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

impl Field {
    pub const ALL: [Field; 23] = [
        Field::Difficulty,
        Field::Outcome,
        Field::Score,
        Field::Value,
        Field::Time,
        Field::Turns,
        Field::Actions,
        Field::Lore,
        Field::Gallery,
        Field::Achievements,
        Field::Speed,
        Field::Regions,
        Field::Prototypes,
        Field::Parts,
        Field::Slots,
        Field::Damage,
        Field::Melee,
        Field::Em,
        Field::Core,
        Field::Hacking,
        Field::Capacity,
        Field::Influence,
        Field::BestGroup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Difficulty => "easy",
            Field::Outcome => "win",
            Field::Score => "score",
            Field::Value => "value",
            Field::Time => "time",
            Field::Turns => "turns",
            Field::Actions => "actions",
            Field::Lore => "lore",
            Field::Gallery => "gallery",
            Field::Achievements => "achievements",
            Field::Speed => "speed",
            Field::Regions => "regions",
            Field::Prototypes => "prototypes",
            Field::Parts => "parts",
            Field::Slots => "slots",
            Field::Damage => "damage",
            Field::Melee => "melee",
            Field::Em => "em",
            Field::Core => "core",
            Field::Hacking => "hacking",
            Field::Capacity => "capacity",
            Field::Influence => "influence",
            Field::BestGroup => "best_group",
        }
    }
}

/// One parsed game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub date: NaiveDateTime,
    pub extended: Extended,
    pub outcome: Outcome,
    pub ending: String,
    pub version: String,
    pub difficulty: u8,
    pub score: Option<f64>,
    pub value: Option<f64>,
    /// Play time in hours.
    pub time: Option<f64>,
    pub turns: Option<f64>,
    pub actions: Option<f64>,
    pub lore: f64,
    pub gallery: f64,
    pub achievements: f64,
    pub speed: Option<f64>,
    pub regions: Option<f64>,
    pub prototypes: Option<f64>,
    pub parts: f64,
    pub slots: Option<f64>,
    pub damage: Option<f64>,
    pub melee: Option<f64>,
    pub em: Option<f64>,
    pub core: Option<f64>,
    pub hacking: f64,
    pub capacity: Option<f64>,
    pub influence: Option<f64>,
    pub best_group: Option<f64>,
}

impl Run {
    /// Empty run for the given sheet date; every optional stat is missing.
    pub fn new(date: NaiveDateTime) -> Self {
        Self {
            date,
            extended: Extended::None,
            outcome: Outcome::Loss,
            ending: String::new(),
            version: String::new(),
            difficulty: 0,
            score: None,
            value: None,
            time: None,
            turns: None,
            actions: None,
            lore: 0.0,
            gallery: 0.0,
            achievements: 0.0,
            speed: None,
            regions: None,
            prototypes: None,
            parts: 0.0,
            slots: None,
            damage: None,
            melee: None,
            em: None,
            core: None,
            hacking: 0.0,
            capacity: None,
            influence: None,
            best_group: None,
        }
    }

    /// Value of a numeric column, NaN when the sheet did not record it.
    pub fn get(&self, field: Field) -> f64 {
        let optional = |v: Option<f64>| v.unwrap_or(f64::NAN);
        match field {
            Field::Difficulty => self.difficulty as f64,
            Field::Outcome => self.outcome.code() as f64,
            Field::Score => optional(self.score),
            Field::Value => optional(self.value),
            Field::Time => optional(self.time),
            Field::Turns => optional(self.turns),
            Field::Actions => optional(self.actions),
            Field::Lore => self.lore,
            Field::Gallery => self.gallery,
            Field::Achievements => self.achievements,
            Field::Speed => optional(self.speed),
            Field::Regions => optional(self.regions),
            Field::Prototypes => optional(self.prototypes),
            Field::Parts => self.parts,
            Field::Slots => optional(self.slots),
            Field::Damage => optional(self.damage),
            Field::Melee => optional(self.melee),
            Field::Em => optional(self.em),
            Field::Core => optional(self.core),
            Field::Hacking => self.hacking,
            Field::Capacity => optional(self.capacity),
            Field::Influence => optional(self.influence),
            Field::BestGroup => optional(self.best_group),
        }
    }

    /// Whether the run is long enough to be charted.
    pub fn qualifies(&self, min_score: f64) -> bool {
        matches!(self.time, Some(t) if t > 0.0) && matches!(self.score, Some(s) if s > min_score)
    }
}

/// Components encoded in a score sheet file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetName {
    pub player: String,
    pub date: NaiveDateTime,
    pub extended: Extended,
}

pub fn parse_file_name(name: &str) -> Result<SheetName> {
    let caps = FILE_NAME
        .captures(name)
        .ok_or_else(|| GraphError::InvalidFileName(name.to_string()))?;
    let number = |idx: usize| -> u32 { caps[idx].parse().unwrap_or(0) };

    let date = NaiveDate::from_ymd_opt(2000 + number(2) as i32, number(3), number(4))
        .and_then(|day| day.and_hms_opt(number(5), number(6), number(7)))
        .ok_or_else(|| GraphError::InvalidDate(name.to_string()))?;

    let player = caps[1].replace(['/', '.'], "");
    let extended = caps
        .get(8)
        .map(|m| Extended::from_marker(m.as_str()))
        .unwrap_or_default();

    Ok(SheetName {
        player,
        date,
        extended,
    })
}

/// Classify the run ending from the sheet header and the win type.
pub fn parse_ending(ending: Option<&str>, win_type: Option<i64>) -> (Outcome, String) {
    let ending = ending.map(|e| e.trim().to_uppercase());
    match ending.as_deref() {
        Some("SELF-DESTRUCTED") => return (Outcome::SelfDestructed, String::new()),
        Some("CORE DESTROYED") => return (Outcome::Loss, String::new()),
        Some("SYSTEM CORRUPTED") => return (Outcome::Loss, "C".to_string()),
        Some("CRUSHED BY SINGULARITY!") => return (Outcome::Loss, "!".to_string()),
        _ => {}
    }

    match win_type.unwrap_or(0) {
        w if w < 0 => (Outcome::Loss, String::new()),
        w if w > 0 => (Outcome::Win, w.to_string()),
        _ => (Outcome::Win, String::new()),
    }
}

struct Patterns {
    ending: Regex,
    win_type: Regex,
    version: Regex,
    easy: Regex,
    score: Regex,
    value: Regex,
    play_time: Regex,
    turns: Regex,
    actions: Regex,
    lore: Regex,
    gallery: Regex,
    achievements: Regex,
    speed: Regex,
    regions: Regex,
    prototypes: Regex,
    parts: Regex,
    slots: Regex,
    damage: Regex,
    melee: Regex,
    em: Regex,
    core: Regex,
    hacking: Regex,
    capacity: Regex,
    influence: Regex,
    best_group: Regex,
}

static PATTERNS: Lazy<Patterns> = Lazy::new(|| {
    let re = |pattern: &str| Regex::new(&format!("(?s){pattern}")).expect("sheet pattern");
    Patterns {
        ending: Regex::new(r"---\[ (.*?) \]---").expect("sheet pattern"),
        win_type: re(r"Win Type: (\d+)"),
        version: re(r"Cogmind - (\w+ \d+)"),
        easy: re(r"Easy Mode: (\d+)"),
        score: re(r"\s+TOTAL SCORE: (-?\d+)"),
        value: re(r"Value Destroyed \((\d+)\)"),
        play_time: re(r"Play Time: (\d+) min"),
        turns: re(r"Turns Passed\s+(\d+)"),
        actions: re(r"Actions Taken\s+(\d+)"),
        lore: re(r"Lore%: (\d+)"),
        gallery: re(r"Gallery%: (\d+)"),
        achievements: re(r"Achievement%: (\d+)"),
        speed: re(r"Average Speed \(%\)\s+(\d+)"),
        regions: re(r"Regions Visited\s+(\d+)"),
        prototypes: re(r"Prototype IDs \((\d+)\)"),
        parts: re(r"Peak State.*?\[Rating: (\d+)\]"),
        slots: re(r"Average Slot Usage \(%\)\s+(\d+)"),
        damage: re(r"Damage Inflicted\s+(\d+)"),
        melee: re(r"Damage Inflicted.*?Melee\s+(\d+)"),
        em: re(r"Damage Inflicted.*?Electromagnetic\s+(\d+)"),
        core: re(r"Average Core Remaining \(%\)\s+(\d+)"),
        hacking: re(r"Offensive Hacking\s+(\d+)"),
        capacity: re(r"Average Capacity\s+(\d+)"),
        influence: re(r"Average Influence\s+(\d+)"),
        best_group: re(r"Highest-Rated Group\s+(\d+)"),
    }
});

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn number(re: &Regex, text: &str) -> Option<f64> {
    capture(re, text).and_then(|s| s.parse().ok())
}

/// Parse a legacy text score sheet. `name` is the sheet's file name, which
/// carries the player, date and extended marker.
pub fn parse_sheet(text: &str, name: &str) -> Result<(String, Run)> {
    let sheet = parse_file_name(name)?;
    let p = &*PATTERNS;

    let win_type = capture(&p.win_type, text).and_then(|s| s.parse::<i64>().ok());
    let (outcome, ending) = parse_ending(capture(&p.ending, text), win_type);

    let mut run = Run::new(sheet.date);
    run.extended = sheet.extended;
    run.outcome = outcome;
    run.ending = ending;
    run.version = capture(&p.version, text).unwrap_or_default().to_string();
    run.difficulty = number(&p.easy, text).map(|v| v as u8).unwrap_or(0);
    run.score = number(&p.score, text);
    run.value = number(&p.value, text);
    run.time = number(&p.play_time, text).map(|minutes| minutes / 60.0);
    run.turns = number(&p.turns, text);
    run.actions = number(&p.actions, text);
    run.lore = number(&p.lore, text).unwrap_or(0.0);
    run.gallery = number(&p.gallery, text).unwrap_or(0.0);
    run.achievements = number(&p.achievements, text).unwrap_or(0.0);
    run.speed = number(&p.speed, text);
    run.regions = number(&p.regions, text);
    run.prototypes = number(&p.prototypes, text);
    run.parts = number(&p.parts, text).unwrap_or(0.0);
    run.slots = number(&p.slots, text);
    run.damage = number(&p.damage, text);
    run.melee = number(&p.melee, text);
    run.em = number(&p.em, text);
    run.core = number(&p.core, text);
    run.hacking = number(&p.hacking, text).unwrap_or(0.0);
    run.capacity = number(&p.capacity, text);
    run.influence = number(&p.influence, text);
    run.best_group = number(&p.best_group, text);

    Ok((sheet.player, run))
}
