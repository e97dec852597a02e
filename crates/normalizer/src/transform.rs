use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::errors::RecordError;
use crate::models::{EventRecord, EventType};
use crate::payloads::RawEvent;

pub fn normalize_event(raw: &RawEvent) -> Result<EventRecord, RecordError> {
    let actor_id = raw.actor_id.ok_or(RecordError::MissingField("actor_id"))?;
    let actor_login = required_text(&raw.actor_login, "actor_login")?;
    let repo_id = raw.repo_id.ok_or(RecordError::MissingField("repo_id"))?;
    let repo_name = required_text(&raw.repo_name, "repo_name")?;
    let created_at = parse_timestamp(
        raw.created_at
            .as_deref()
            .ok_or(RecordError::MissingField("created_at"))?,
    )?;
    let event_type = EventType::parse(&required_text(&raw.event_type, "type")?);

    Ok(EventRecord {
        actor_id,
        actor_login,
        repo_id,
        repo_name,
        // archives write 0 for repositories without an organization
        org_id: raw.org_id.filter(|id| *id != 0),
        org_login: non_empty(&raw.org_login),
        created_at,
        event_type,
        action: non_empty(&raw.action),
        pull_merged: raw.pull_merged.as_ref().map(truthy).unwrap_or(false),
        body: non_empty(&raw.body),
    })
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RecordError> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| RecordError::InvalidTimestamp(value.to_string()))
}

fn required_text(value: &Option<String>, field: &'static str) -> Result<String, RecordError> {
    non_empty(value).ok_or(RecordError::MissingField(field))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    fn complete() -> Value {
        json!({
            "actor_id": 7,
            "actor_login": "alice",
            "repo_id": 11,
            "repo_name": "org/proj",
            "org_id": 3,
            "org_login": "org",
            "created_at": "2023-05-01 10:00:00",
            "type": "PullRequestEvent",
            "action": "closed",
            "pull_merged": 1,
            "body": "see @bob"
        })
    }

    #[test]
    fn complete_record_normalizes() {
        let event = normalize_event(&raw(complete())).unwrap();
        assert_eq!(event.actor_id, 7);
        assert_eq!(event.repo_name, "org/proj");
        assert_eq!(event.event_type, EventType::PullRequest);
        assert_eq!(event.action.as_deref(), Some("closed"));
        assert!(event.pull_merged);
        assert_eq!(event.created_at.to_rfc3339(), "2023-05-01T10:00:00+00:00");
    }

    #[test]
    fn missing_actor_is_malformed() {
        let mut value = complete();
        value.as_object_mut().unwrap().remove("actor_id");
        let err = normalize_event(&raw(value)).unwrap_err();
        assert!(matches!(err, RecordError::MissingField("actor_id")));
        assert_eq!(err.reason(), "missing_field");
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let mut value = complete();
        value["created_at"] = json!("yesterday");
        let err = normalize_event(&raw(value)).unwrap_err();
        assert!(matches!(err, RecordError::InvalidTimestamp(_)));
    }

    #[test]
    fn empty_body_and_zero_org_become_none() {
        let mut value = complete();
        value["body"] = json!("   ");
        value["org_id"] = json!(0);
        let event = normalize_event(&raw(value)).unwrap();
        assert_eq!(event.body, None);
        assert_eq!(event.org_id, None);
    }

    #[test]
    fn merged_flag_accepts_several_encodings() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!("True")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(null)));
    }

    #[test]
    fn rfc3339_timestamps_are_accepted() {
        let ts = parse_timestamp("2023-05-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-05-01T10:00:00+00:00");
    }
}
