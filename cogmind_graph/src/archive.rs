//! Archived score sheets stored as protobuf `ArchivedPostScoresheetRequest`
//! messages. Only the fields the charts read are declared; unknown fields
//! are skipped by the decoder.

use once_cell::sync::Lazy;
use prost::Message;
use regex::Regex;

use crate::record::{parse_ending, parse_file_name, Run};
use crate::{GraphError, Result};

static VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+ \d+)").expect("version pattern"));

#[derive(Clone, PartialEq, Message)]
pub struct ArchivedPostScoresheetRequest {
    #[prost(message, optional, tag = "1")]
    pub scoresheet: Option<Scoresheet>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Scoresheet {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    #[prost(message, optional, tag = "2")]
    pub game: Option<Game>,
    #[prost(message, optional, tag = "3")]
    pub performance: Option<Performance>,
    #[prost(message, optional, tag = "4")]
    pub peak_state: Option<PeakState>,
    #[prost(message, optional, tag = "5")]
    pub best_states: Option<BestStates>,
    #[prost(message, optional, tag = "6")]
    pub stats: Option<Stats>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Header {
    #[prost(string, tag = "1")]
    pub player_name: String,
    #[prost(string, tag = "2")]
    pub filename: String,
    #[prost(string, tag = "3")]
    pub run_result: String,
    #[prost(string, tag = "4")]
    pub version: String,
    #[prost(int32, tag = "5")]
    pub difficulty: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Game {
    #[prost(int32, tag = "1")]
    pub win_type: i32,
    /// `H:MM:SS`
    #[prost(string, tag = "2")]
    pub run_time: String,
    #[prost(int32, tag = "3")]
    pub lore_percent: i32,
    #[prost(int32, tag = "4")]
    pub gallery_percent: i32,
    #[prost(int32, tag = "5")]
    pub achievement_percent: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Performance {
    #[prost(int32, tag = "1")]
    pub total_score: i32,
    #[prost(message, optional, tag = "2")]
    pub value_destroyed: Option<Points>,
    #[prost(message, optional, tag = "3")]
    pub regions_visited: Option<Count>,
    #[prost(message, optional, tag = "4")]
    pub prototypes_identified: Option<Count>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Points {
    #[prost(int32, tag = "1")]
    pub points: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Count {
    #[prost(int32, tag = "1")]
    pub count: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct PeakState {
    #[prost(int32, tag = "1")]
    pub rating: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct BestStates {
    #[prost(int32, tag = "1")]
    pub offensive_hacking: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Stats {
    #[prost(message, optional, tag = "1")]
    pub exploration: Option<Exploration>,
    #[prost(message, optional, tag = "2")]
    pub actions: Option<Actions>,
    #[prost(message, optional, tag = "3")]
    pub build: Option<Build>,
    #[prost(message, optional, tag = "4")]
    pub combat: Option<Combat>,
    #[prost(message, optional, tag = "5")]
    pub alert: Option<Alert>,
    #[prost(message, optional, tag = "6")]
    pub allies: Option<Allies>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Exploration {
    #[prost(int32, tag = "1")]
    pub turns_passed: i32,
    #[prost(message, optional, tag = "2")]
    pub spaces_moved: Option<SpacesMoved>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SpacesMoved {
    #[prost(int32, tag = "1")]
    pub average_speed: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Actions {
    #[prost(message, optional, tag = "1")]
    pub total: Option<Overall>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Overall {
    #[prost(int32, tag = "1")]
    pub overall: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Build {
    #[prost(message, optional, tag = "1")]
    pub average_slot_usage_percent: Option<Overall>,
    #[prost(message, optional, tag = "2")]
    pub largest_inventory_capacity: Option<InventoryCapacity>,
}

#[derive(Clone, PartialEq, Message)]
pub struct InventoryCapacity {
    #[prost(int32, tag = "1")]
    pub average_capacity: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Combat {
    #[prost(message, optional, tag = "1")]
    pub damage_inflicted: Option<DamageInflicted>,
    #[prost(int32, tag = "2")]
    pub core_remaining_percent: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct DamageInflicted {
    #[prost(int32, tag = "1")]
    pub overall: i32,
    #[prost(int32, tag = "2")]
    pub melee: i32,
    #[prost(int32, tag = "3")]
    pub electromagnetic: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Alert {
    #[prost(message, optional, tag = "1")]
    pub peak_influence: Option<PeakInfluence>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PeakInfluence {
    #[prost(int32, tag = "1")]
    pub average_influence: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Allies {
    #[prost(message, optional, tag = "1")]
    pub total_allies: Option<TotalAllies>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TotalAllies {
    #[prost(int32, tag = "1")]
    pub highest_rated_group: i32,
}

/// `H:MM[:SS]` to hours; each component is weighted by `60^-i`.
pub fn run_time_hours(run_time: &str) -> Option<f64> {
    run_time
        .split(':')
        .enumerate()
        .map(|(i, part)| {
            part.trim()
                .parse::<f64>()
                .ok()
                .map(|v| v * 60f64.powi(-(i as i32)))
        })
        .sum()
}

/// Decode one archived score sheet.
///
/// Returns `Ok(None)` for incomplete records that carry no movement data.
pub fn parse_archive(bytes: &[u8]) -> Result<Option<(String, Run)>> {
    let request = ArchivedPostScoresheetRequest::decode(bytes)
        .map_err(|e| GraphError::ArchiveDecode(e.to_string()))?;
    let sheet = request.scoresheet.unwrap_or_default();
    let header = sheet.header.unwrap_or_default();
    let game = sheet.game.unwrap_or_default();
    let performance = sheet.performance.unwrap_or_default();
    let stats = sheet.stats.unwrap_or_default();
    let exploration = stats.exploration.unwrap_or_default();
    let build = stats.build.unwrap_or_default();
    let combat = stats.combat.unwrap_or_default();
    let damage = combat.damage_inflicted.unwrap_or_default();

    let average_speed = exploration
        .spaces_moved
        .map(|s| s.average_speed)
        .unwrap_or_default();
    if average_speed == 0 {
        return Ok(None);
    }

    let name = parse_file_name(&header.filename)?;
    let (outcome, ending) = parse_ending(
        Some(header.run_result.to_uppercase().as_str()),
        Some(game.win_type as i64),
    );

    let mut run = Run::new(name.date);
    run.extended = name.extended;
    run.outcome = outcome;
    run.ending = ending;
    run.version = VERSION
        .captures(&header.version)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();
    run.difficulty = header.difficulty.clamp(0, u8::MAX as i32) as u8;
    run.score = Some(performance.total_score as f64);
    run.value = Some(
        performance
            .value_destroyed
            .map(|v| v.points)
            .unwrap_or_default() as f64,
    );
    run.time = run_time_hours(&game.run_time);
    run.turns = Some(exploration.turns_passed as f64);
    run.actions = Some(
        stats
            .actions
            .and_then(|a| a.total)
            .map(|t| t.overall)
            .unwrap_or_default() as f64,
    );
    run.lore = game.lore_percent as f64;
    run.gallery = game.gallery_percent as f64;
    run.achievements = game.achievement_percent as f64;
    run.speed = Some(100.0 * 100.0 / average_speed as f64);
    run.regions = Some(
        performance
            .regions_visited
            .map(|c| c.count)
            .unwrap_or_default() as f64,
    );
    run.prototypes = Some(
        performance
            .prototypes_identified
            .map(|c| c.count)
            .unwrap_or_default() as f64,
    );
    run.parts = sheet.peak_state.map(|p| p.rating).unwrap_or_default() as f64;
    run.slots = Some(
        build
            .average_slot_usage_percent
            .map(|s| s.overall)
            .unwrap_or_default() as f64,
    );
    run.damage = Some(damage.overall as f64);
    run.melee = Some(damage.melee as f64);
    run.em = Some(damage.electromagnetic as f64);
    run.core = Some(combat.core_remaining_percent as f64);
    run.hacking = sheet
        .best_states
        .map(|b| b.offensive_hacking)
        .unwrap_or_default() as f64;
    run.capacity = Some(
        build
            .largest_inventory_capacity
            .map(|c| c.average_capacity)
            .unwrap_or_default() as f64,
    );
    run.influence = Some(
        stats
            .alert
            .and_then(|a| a.peak_influence)
            .map(|p| p.average_influence)
            .unwrap_or_default() as f64,
    );
    run.best_group = Some(
        stats
            .allies
            .and_then(|a| a.total_allies)
            .map(|t| t.highest_rated_group)
            .unwrap_or_default() as f64,
    );

    Ok(Some((header.player_name, run)))
}
