use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    TypeSelect,
    TimeSelect,
    Details,
    Review,
}

impl WizardStep {
    /// Steps in the only order the wizard walks them.
    pub const ORDER: [WizardStep; 4] = [
        WizardStep::TypeSelect,
        WizardStep::TimeSelect,
        WizardStep::Details,
        WizardStep::Review,
    ];

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::TypeSelect => Some(WizardStep::TimeSelect),
            WizardStep::TimeSelect => Some(WizardStep::Details),
            WizardStep::Details => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::TypeSelect => None,
            WizardStep::TimeSelect => Some(WizardStep::TypeSelect),
            WizardStep::Details => Some(WizardStep::TimeSelect),
            WizardStep::Review => Some(WizardStep::Details),
        }
    }

    /// 1-based position for "step 2 of 4" style progress.
    pub fn position(self) -> usize {
        match self {
            WizardStep::TypeSelect => 1,
            WizardStep::TimeSelect => 2,
            WizardStep::Details => 3,
            WizardStep::Review => 4,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardStep::TypeSelect => write!(f, "type_select"),
            WizardStep::TimeSelect => write!(f, "time_select"),
            WizardStep::Details => write!(f, "details"),
            WizardStep::Review => write!(f, "review"),
        }
    }
}

impl std::str::FromStr for WizardStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "type_select" | "typeselect" | "type" => Ok(WizardStep::TypeSelect),
            "time_select" | "timeselect" | "time" => Ok(WizardStep::TimeSelect),
            "details" => Ok(WizardStep::Details),
            "review" => Ok(WizardStep::Review),
            _ => Err(format!("Unknown wizard step: {}", s)),
        }
    }
}

/// A person invited to the follow-up meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// IANA timezone name, e.g. "America/New_York".
    pub timezone: String,
}

impl Participant {
    pub fn new(name: &str, email: &str, timezone: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            company: None,
            title: None,
            timezone: timezone.to_string(),
        }
    }

    /// Lowercased email used for uniqueness checks.
    pub fn email_key(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// A candidate meeting window issued by a suggestion provider.
///
/// Immutable once issued; a new suggestion round produces new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// 0-100, higher is better.
    pub confidence: u8,
    pub reasoning: String,
    pub timezone: String,
    pub available: bool,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// Context from the sales call the follow-up is scheduled for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// Calendar acknowledgement for a submitted meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_link: Option<String>,
    pub confirmed_at: DateTime<Utc>,
}

/// Loading state of the suggestion list, for the empty/error view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum SuggestionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    #[serde(rename_all = "camelCase")]
    Failed { reason: String, can_retry: bool },
}
