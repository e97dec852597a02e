use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    IssueComment,
    Issues,
    PullRequest,
    PullRequestReviewComment,
    Other(String),
}

impl EventType {
    pub fn parse(raw: &str) -> Self {
        let name = raw.trim();
        let bare = name.strip_suffix("Event").unwrap_or(name);
        match bare {
            "IssueComment" => EventType::IssueComment,
            "Issues" => EventType::Issues,
            "PullRequest" => EventType::PullRequest,
            "PullRequestReviewComment" => EventType::PullRequestReviewComment,
            _ => EventType::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::IssueComment => "IssueCommentEvent",
            EventType::Issues => "IssuesEvent",
            EventType::PullRequest => "PullRequestEvent",
            EventType::PullRequestReviewComment => "PullRequestReviewCommentEvent",
            EventType::Other(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    pub actor_id: i64,
    pub actor_login: String,
    pub repo_id: i64,
    pub repo_name: String,
    pub org_id: Option<i64>,
    pub org_login: Option<String>,
    pub created_at: DateTime<Utc>,
    pub event_type: EventType,
    pub action: Option<String>,
    pub pull_merged: bool,
    pub body: Option<String>,
}
