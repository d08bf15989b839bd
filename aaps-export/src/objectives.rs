//! AAPS objectives and the preferences that record their completion.
//!
//! Objectives unlock AAPS functionality step by step. Each objective `name`
//! stores two epoch-millisecond timestamps in the preferences:
//!
//! - `Objectives_<name>_started`
//! - `Objectives_<name>_accomplished`
//!
//! plus one preference per task. AAPS stores every preference value as a
//! string, so completed values are written as strings too.
//!
//! Objective numbers follow the AAPS UI. Internally AAPS skips the removed
//! "AMA" objective, so `smb` and `auto` live in `Objective9.kt` and
//! `Objective10.kt` but are shown as 9 and 10 alongside `autosens` as 8.

use crate::document::set_path;
use crate::error::{ExportError, ExportResult};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// A preference value as AAPS stores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

/// One preference touched by a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceTask {
    pub key: String,
    pub default_value: PrefValue,
    pub completed_value: PrefValue,
}

/// Task kinds found in the objectives table.
#[derive(Clone, Copy, Debug)]
pub enum Task {
    /// Boolean preference, `false` until done.
    Flag(&'static str),
    /// Exam question: `ExamTask_<name>` plus its `DisabledTo_<name>` lockout timestamp.
    Exam(&'static str),
    /// Counter that must reach `completed`.
    Counter { key: &'static str, completed: i64 },
}

impl Task {
    pub fn preferences(&self) -> Vec<PreferenceTask> {
        match *self {
            Task::Flag(key) => vec![PreferenceTask {
                key: key.to_string(),
                default_value: PrefValue::Bool(false),
                completed_value: PrefValue::Bool(true),
            }],
            Task::Exam(name) => vec![
                PreferenceTask {
                    key: format!("ExamTask_{name}"),
                    default_value: PrefValue::Bool(false),
                    completed_value: PrefValue::Bool(true),
                },
                PreferenceTask {
                    key: format!("DisabledTo_{name}"),
                    default_value: PrefValue::Int(0),
                    completed_value: PrefValue::Int(0),
                },
            ],
            Task::Counter { key, completed } => vec![PreferenceTask {
                key: key.to_string(),
                default_value: PrefValue::Int(0),
                completed_value: PrefValue::Int(completed),
            }],
        }
    }
}

/// An objective from the AAPS objectives screen.
#[derive(Debug)]
pub struct Objective {
    /// 1-based number as shown in the AAPS UI.
    pub number: u32,
    pub name: &'static str,
    /// How long the objective must have been running before it counts as done.
    pub minimum_days: i64,
    pub tasks: &'static [Task],
}

impl Objective {
    pub fn started_key(&self) -> String {
        format!("Objectives_{}_started", self.name)
    }

    pub fn accomplished_key(&self) -> String {
        format!("Objectives_{}_accomplished", self.name)
    }

    pub fn minimum_duration(&self) -> TimeDelta {
        TimeDelta::days(self.minimum_days)
    }

    /// Backdated start so the minimum duration has already elapsed at `now`.
    pub fn completion_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.minimum_duration()
    }

    /// Marks the objective and all of its tasks as completed in `prefs`.
    pub fn complete(&self, prefs: &mut Map<String, Value>, now: DateTime<Utc>) -> ExportResult<()> {
        let completed_at = self.completion_time(now);
        let millis = completed_at.timestamp_millis().to_string();

        set_path(prefs, &self.started_key(), Value::String(millis.clone()))?;
        set_path(prefs, &self.accomplished_key(), Value::String(millis.clone()))?;
        debug!(
            objective = self.name,
            millis = %millis,
            at = %completed_at.to_rfc2822(),
            "set objective timestamps"
        );

        for task in self.tasks.iter().flat_map(Task::preferences) {
            let value = task.completed_value.to_string();
            debug!(key = %task.key, value = %value, "set task preference");
            set_path(prefs, &task.key, Value::String(value))?;
        }
        Ok(())
    }

    /// Whether `prefs` records this objective as completed at `now`.
    ///
    /// Only the timestamps are checked, not the individual tasks.
    pub fn is_completed(&self, prefs: &Map<String, Value>, now: DateTime<Utc>) -> bool {
        let started = millis_pref(prefs, &self.started_key());
        let accomplished = millis_pref(prefs, &self.accomplished_key());
        let now = now.timestamp_millis();

        let is_started = started != 0;
        let past_minimum = self.minimum_days == 0
            || (is_started
                && now.saturating_sub(started) >= self.minimum_duration().num_milliseconds());
        let is_accomplished = accomplished != 0 && accomplished < now;

        is_started && past_minimum && is_accomplished
    }
}

/// Reads a timestamp preference stored either as a string or a number; 0 when absent.
fn millis_pref(prefs: &Map<String, Value>, key: &str) -> i64 {
    match prefs.get(key) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        _ => 0,
    }
}

const EXAM_QUESTIONS: &[Task] = &[
    Task::Exam("basaltest"),
    Task::Exam("breadgrams"),
    Task::Exam("dia"),
    Task::Exam("exercise"),
    Task::Exam("exercise2"),
    Task::Exam("extendedcarbs"),
    Task::Exam("hypott"),
    Task::Exam("ic"),
    Task::Exam("insulin"),
    Task::Exam("iob"),
    Task::Exam("isf"),
    Task::Exam("noisycgm"),
    Task::Exam("nsclient"),
    Task::Exam("objectives"),
    Task::Exam("objectives2"),
    Task::Exam("otherMedicationWarning"),
    Task::Exam("prerequisites"),
    Task::Exam("prerequisites2"),
    Task::Exam("profileswitch"),
    Task::Exam("profileswitch2"),
    Task::Exam("profileswitch4"),
    Task::Exam("profileswitchtime"),
    Task::Exam("pumpdisconnect"),
    Task::Exam("sensitivity"),
    Task::Exam("troubleshooting"),
    Task::Exam("update"),
    Task::Exam("wrongcarbs"),
    Task::Exam("wronginsulin"),
];

/// Every objective AAPS knows, in UI order.
pub static OBJECTIVES: [Objective; 10] = [
    Objective {
        number: 1,
        name: "config",
        minimum_days: 0,
        tasks: &[
            Task::Flag("ObjectivesbgIsAvailableInNS"),
            Task::Flag("virtualpump_uploadstatus"),
            Task::Flag("ObjectivespumpStatusIsAvailableInNS"),
        ],
    },
    Objective {
        number: 2,
        name: "usage",
        minimum_days: 0,
        tasks: &[
            Task::Flag("ObjectivesProfileSwitchUsed"),
            Task::Flag("ObjectivesDisconnectUsed"),
            Task::Flag("ObjectivesReconnectUsed"),
            Task::Flag("ObjectivesTempTargetUsed"),
            Task::Flag("ObjectivesActionsUsed"),
            Task::Flag("ObjectivesLoopUsed"),
            Task::Flag("ObjectivesScaleUsed"),
        ],
    },
    Objective {
        number: 3,
        name: "exam",
        minimum_days: 0,
        tasks: EXAM_QUESTIONS,
    },
    Objective {
        number: 4,
        name: "openloop",
        minimum_days: 7,
        // AAPS requires 20 manual enacts (Objective3.kt)
        tasks: &[Task::Counter {
            key: "ObjectivesmanualEnacts",
            completed: 20,
        }],
    },
    Objective {
        number: 5,
        name: "maxbasal",
        minimum_days: 0,
        tasks: &[],
    },
    Objective {
        number: 6,
        name: "maxiobzero",
        minimum_days: 5,
        tasks: &[],
    },
    Objective {
        number: 7,
        name: "maxiob",
        minimum_days: 1,
        tasks: &[],
    },
    Objective {
        number: 8,
        name: "autosens",
        minimum_days: 7,
        tasks: &[],
    },
    Objective {
        number: 9,
        name: "smb",
        minimum_days: 28,
        tasks: &[],
    },
    Objective {
        number: 10,
        name: "auto",
        minimum_days: 28,
        tasks: &[],
    },
];

/// Looks up objectives by their 1-based UI numbers.
pub fn objectives_by_number(numbers: &[u32]) -> ExportResult<Vec<&'static Objective>> {
    numbers
        .iter()
        .map(|&n| {
            OBJECTIVES
                .iter()
                .find(|o| o.number == n)
                .ok_or(ExportError::UnknownObjective(n))
        })
        .collect()
}

/// Numbers of the objectives `prefs` records as completed at `now`.
pub fn completed_objectives(prefs: &Map<String, Value>, now: DateTime<Utc>) -> Vec<u32> {
    OBJECTIVES
        .iter()
        .filter(|o| o.is_completed(prefs, now))
        .map(|o| o.number)
        .collect()
}
