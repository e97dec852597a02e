use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub actor_id: Option<i64>,
    #[serde(default)]
    pub actor_login: Option<String>,
    #[serde(default)]
    pub repo_id: Option<i64>,
    #[serde(default)]
    pub repo_name: Option<String>,
    #[serde(default)]
    pub org_id: Option<i64>,
    #[serde(default)]
    pub org_login: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub pull_merged: Option<Value>,
    #[serde(default)]
    pub body: Option<String>,
}
