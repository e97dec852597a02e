use normalizer::EventType;

pub const MENTION_WEIGHT: u64 = 2;
pub const REPO_REFERENCE_WEIGHT: u64 = 3;

pub fn contribution_weight(event_type: &EventType, action: Option<&str>, pull_merged: bool) -> u64 {
    match (event_type, action) {
        (EventType::IssueComment, _) => 1,
        (EventType::Issues, Some("opened")) => 2,
        (EventType::PullRequest, Some("opened")) => 3,
        (EventType::PullRequestReviewComment, _) => 4,
        (EventType::PullRequest, Some("closed")) if pull_merged => 5,
        _ => 0,
    }
}
