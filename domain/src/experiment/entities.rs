//! Experiment entity and its lifecycle state machine

use crate::core::brand::Brand;
use crate::core::error::DomainError;
use crate::core::question::Question;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentId(Uuid);

impl ExperimentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, enough to tell experiments apart in listings
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ExperimentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ExperimentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| DomainError::InvalidExperiment(format!("bad experiment id '{}': {}", s, e)))
    }
}

impl From<Uuid> for ExperimentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Lifecycle state; each variant carries only the timestamps valid in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExperimentState {
    Draft,
    ControlRunning {
        control_start: DateTime<Utc>,
    },
    ControlComplete {
        control_start: DateTime<Utc>,
        control_end: DateTime<Utc>,
    },
    TestRunning {
        control_start: DateTime<Utc>,
        control_end: DateTime<Utc>,
        test_start: DateTime<Utc>,
    },
    Completed {
        control_start: DateTime<Utc>,
        control_end: DateTime<Utc>,
        test_start: DateTime<Utc>,
        test_end: DateTime<Utc>,
    },
    Aborted {
        aborted_at: DateTime<Utc>,
        previous: Box<ExperimentState>,
    },
}

impl ExperimentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentState::Draft => "draft",
            ExperimentState::ControlRunning { .. } => "control_running",
            ExperimentState::ControlComplete { .. } => "control_complete",
            ExperimentState::TestRunning { .. } => "test_running",
            ExperimentState::Completed { .. } => "completed",
            ExperimentState::Aborted { .. } => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExperimentState::Completed { .. } | ExperimentState::Aborted { .. }
        )
    }

    /// Whether checks collected now belong to a period
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            ExperimentState::ControlRunning { .. } | ExperimentState::TestRunning { .. }
        )
    }

    pub fn control_start(&self) -> Option<DateTime<Utc>> {
        match self {
            ExperimentState::ControlRunning { control_start }
            | ExperimentState::ControlComplete { control_start, .. }
            | ExperimentState::TestRunning { control_start, .. }
            | ExperimentState::Completed { control_start, .. } => Some(*control_start),
            ExperimentState::Aborted { previous, .. } => previous.control_start(),
            ExperimentState::Draft => None,
        }
    }

    pub fn control_end(&self) -> Option<DateTime<Utc>> {
        match self {
            ExperimentState::ControlComplete { control_end, .. }
            | ExperimentState::TestRunning { control_end, .. }
            | ExperimentState::Completed { control_end, .. } => Some(*control_end),
            ExperimentState::Aborted { previous, .. } => previous.control_end(),
            _ => None,
        }
    }

    pub fn test_start(&self) -> Option<DateTime<Utc>> {
        match self {
            ExperimentState::TestRunning { test_start, .. }
            | ExperimentState::Completed { test_start, .. } => Some(*test_start),
            ExperimentState::Aborted { previous, .. } => previous.test_start(),
            _ => None,
        }
    }

    pub fn test_end(&self) -> Option<DateTime<Utc>> {
        match self {
            ExperimentState::Completed { test_end, .. } => Some(*test_end),
            ExperimentState::Aborted { previous, .. } => previous.test_end(),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExperimentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A requested lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ExperimentAction {
    StartControl,
    StopControl,
    StartTest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intervention: Option<String>,
    },
    StopTest,
    Abort,
}

impl ExperimentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentAction::StartControl => "start control",
            ExperimentAction::StopControl => "stop control",
            ExperimentAction::StartTest { .. } => "start test",
            ExperimentAction::StopTest => "stop test",
            ExperimentAction::Abort => "abort",
        }
    }
}

impl std::fmt::Display for ExperimentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A before/after visibility experiment (Entity)
///
/// `state` only changes through [`Experiment::apply`]. `version` is bumped on
/// every successful transition and lets repositories reject stale writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: ExperimentId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub brand: Brand,
    pub hypothesis: String,
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention: Option<String>,
    #[serde(flatten)]
    pub state: ExperimentState,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Experiment {
    /// Create a draft experiment. Questions are deduplicated by text.
    pub fn new(
        name: impl Into<String>,
        brand: Brand,
        hypothesis: impl Into<String>,
        questions: Vec<Question>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidExperiment(
                "experiment name cannot be empty".to_string(),
            ));
        }
        brand.validate()?;

        let mut unique: Vec<Question> = Vec::with_capacity(questions.len());
        for question in questions {
            if !unique.contains(&question) {
                unique.push(question);
            }
        }

        Ok(Self {
            id: ExperimentId::new(),
            name: name.trim().to_string(),
            description: None,
            brand,
            hypothesis: hypothesis.into(),
            questions: unique,
            intervention: None,
            state: ExperimentState::Draft,
            created_at,
            version: 0,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_id(mut self, id: ExperimentId) -> Self {
        self.id = id;
        self
    }

    /// Whether a question text is one of the target questions
    pub fn targets(&self, question: &str) -> bool {
        self.questions.iter().any(|q| q.text() == question)
    }

    /// Apply a transition at `now`.
    ///
    /// Invalid transitions return [`DomainError::StateConflict`] and leave the
    /// experiment untouched.
    pub fn apply(&mut self, action: ExperimentAction, now: DateTime<Utc>) -> Result<(), DomainError> {
        let next = self.next_state(&action, now)?;
        if let ExperimentAction::StartTest {
            intervention: Some(note),
        } = action
        {
            self.intervention = Some(note);
        }
        self.state = next;
        self.version += 1;
        Ok(())
    }

    fn next_state(
        &self,
        action: &ExperimentAction,
        now: DateTime<Utc>,
    ) -> Result<ExperimentState, DomainError> {
        let conflict = |reason: &str| DomainError::StateConflict {
            action: action.as_str().to_string(),
            state: self.state.as_str().to_string(),
            reason: reason.to_string(),
        };

        match (&self.state, action) {
            (ExperimentState::Draft, ExperimentAction::StartControl) => {
                if self.questions.is_empty() {
                    return Err(conflict("experiment has no target questions"));
                }
                if self.brand.name.trim().is_empty() {
                    return Err(conflict("experiment has no brand"));
                }
                Ok(ExperimentState::ControlRunning { control_start: now })
            }
            (ExperimentState::ControlRunning { control_start }, ExperimentAction::StopControl) => {
                if now <= *control_start {
                    return Err(conflict("control period has not elapsed yet"));
                }
                Ok(ExperimentState::ControlComplete {
                    control_start: *control_start,
                    control_end: now,
                })
            }
            (
                ExperimentState::ControlComplete {
                    control_start,
                    control_end,
                },
                ExperimentAction::StartTest { .. },
            ) => {
                if now < *control_end {
                    return Err(conflict("test period cannot start before control ended"));
                }
                Ok(ExperimentState::TestRunning {
                    control_start: *control_start,
                    control_end: *control_end,
                    test_start: now,
                })
            }
            (
                ExperimentState::TestRunning {
                    control_start,
                    control_end,
                    test_start,
                },
                ExperimentAction::StopTest,
            ) => {
                if now <= *test_start {
                    return Err(conflict("test period has not elapsed yet"));
                }
                Ok(ExperimentState::Completed {
                    control_start: *control_start,
                    control_end: *control_end,
                    test_start: *test_start,
                    test_end: now,
                })
            }
            (state, ExperimentAction::Abort) if !state.is_terminal() => {
                Ok(ExperimentState::Aborted {
                    aborted_at: now,
                    previous: Box::new(state.clone()),
                })
            }
            (state, _) if state.is_terminal() => Err(conflict("experiment is finished")),
            (_, _) => Err(conflict(expected_for(action))),
        }
    }

    /// Time between control end and test start, once both are known
    pub fn dormant_gap(&self) -> Option<Duration> {
        Some(self.state.test_start()? - self.state.control_end()?)
    }

    /// Time spent in the current running period
    pub fn elapsed_in_period(&self, now: DateTime<Utc>) -> Option<Duration> {
        match &self.state {
            ExperimentState::ControlRunning { control_start } => Some(now - *control_start),
            ExperimentState::TestRunning { test_start, .. } => Some(now - *test_start),
            _ => None,
        }
    }
}

fn expected_for(action: &ExperimentAction) -> &'static str {
    match action {
        ExperimentAction::StartControl => "control can only start from draft",
        ExperimentAction::StopControl => "control period is not running",
        ExperimentAction::StartTest { .. } => "control period has not completed",
        ExperimentAction::StopTest => "test period is not running",
        ExperimentAction::Abort => "experiment is finished",
    }
}
