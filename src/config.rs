//! Runtime configuration (`spec.md` §6 `set_config`).
//!
//! All tunables default to the values `spec.md` names throughout §3–§5;
//! `Config::set` validates both the key and the value range, returning
//! `ConfigError` rather than silently accepting nonsense (`spec.md` §7).

use crate::error::OnaError;

#[derive(Debug, Clone)]
pub struct Config {
    pub volume: u8,
    pub debug: bool,
    pub current_time: i64,
    pub stamp_id: u64,
    pub motor_babbling: bool,
    pub motor_babbling_chance: f64,
    pub seed: u64,

    pub decision_threshold: f64,
    pub truth_projection_decay: f64,
    pub max_sequence_len: usize,
    pub max_sequence_timediff: i64,
    pub event_belief_distance: i64,
    pub question_priming: f64,
    pub anticipation_confidence: f64,

    pub belief_event_selections: usize,
    pub goal_event_selections: usize,
    pub concepts_max: usize,
    pub cycling_belief_events_max: usize,
    pub cycling_goal_events_max: usize,
    pub operations_max: u8,
    pub concept_durability: f64,
    pub event_durability: f64,
    pub motor_babbling_suppression_threshold: f64,
    pub prediction_tolerance: i64,

    /// `spec.md` §9 open question 1: the decision path always scans
    /// tables 1..10; this flag only controls whether forward chaining
    /// in the cycle also includes table 0. Defaults to `true`
    /// ("forward-chain 0..10"), matching the resolution recorded in
    /// `DESIGN.md`.
    pub forward_chain_all_tables: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            volume: 0,
            debug: false,
            current_time: 0,
            stamp_id: 0,
            motor_babbling: false,
            motor_babbling_chance: 0.2,
            seed: 0,

            decision_threshold: 0.501,
            truth_projection_decay: 0.8,
            max_sequence_len: 3,
            max_sequence_timediff: 20,
            event_belief_distance: 20,
            question_priming: 0.1,
            anticipation_confidence: 0.01,

            belief_event_selections: 1,
            goal_event_selections: 1,
            concepts_max: 4096,
            cycling_belief_events_max: 40,
            cycling_goal_events_max: 400,
            operations_max: 10,
            concept_durability: 0.9,
            event_durability: 0.9999,
            motor_babbling_suppression_threshold: 0.55,
            prediction_tolerance: 5,

            forward_chain_all_tables: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Set a recognized configuration key from its textual protocol
    /// spelling (`spec.md` §6). Unknown keys or out-of-range values are
    /// rejected and leave the config unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), OnaError> {
        let err = |reason: &str| OnaError::Config {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        let parse_f64 = |v: &str| v.parse::<f64>().map_err(|_| err("expected a number"));
        let parse_i64 = |v: &str| v.parse::<i64>().map_err(|_| err("expected an integer"));
        let parse_bool = |v: &str| v.parse::<bool>().map_err(|_| err("expected true/false"));

        match key {
            "volume" => {
                let v = parse_i64(value)?;
                if !(0..=100).contains(&v) {
                    return Err(err("volume must be in 0..=100"));
                }
                self.volume = v as u8;
            }
            "debug" => self.debug = parse_bool(value)?,
            "current_time" => self.current_time = parse_i64(value)?,
            "stamp_id" => {
                let v = parse_i64(value)?;
                if v < 0 {
                    return Err(err("stamp_id must be non-negative"));
                }
                self.stamp_id = v as u64;
            }
            "motor_babbling" => self.motor_babbling = parse_bool(value)?,
            "motor_babbling_chance" => {
                let v = parse_f64(value)?;
                if !(0.0..=1.0).contains(&v) {
                    return Err(err("motor_babbling_chance must be in [0,1]"));
                }
                self.motor_babbling_chance = v;
            }
            "seed" => {
                let v = parse_i64(value)?;
                if v < 0 {
                    return Err(err("seed must be non-negative"));
                }
                self.seed = v as u64;
            }
            "decision_threshold" => self.decision_threshold = parse_f64(value)?,
            "truth_projection_decay" => self.truth_projection_decay = parse_f64(value)?,
            "max_sequence_len" => {
                let v = parse_i64(value)?;
                if v < 1 {
                    return Err(err("max_sequence_len must be >= 1"));
                }
                self.max_sequence_len = v as usize;
            }
            "max_sequence_timediff" => self.max_sequence_timediff = parse_i64(value)?,
            "event_belief_distance" => self.event_belief_distance = parse_i64(value)?,
            "question_priming" => self.question_priming = parse_f64(value)?,
            "anticipation_confidence" => self.anticipation_confidence = parse_f64(value)?,
            _ => return Err(err("unrecognized config key")),
        }
        Ok(())
    }
}
