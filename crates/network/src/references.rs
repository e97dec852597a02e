use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! lazy_regex {
    ($name:ident = $pattern:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).expect("invalid regex"));
    };
}

lazy_regex!(MENTION_RE = r"@([A-Za-z0-9_-]+)");
lazy_regex!(REPO_REF_RE = r"github\.com/([A-Za-z0-9_-]+/[A-Za-z0-9_-]+)");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub mentions: Vec<String>,
    pub repo_refs: Vec<String>,
}

impl References {
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty() && self.repo_refs.is_empty()
    }
}

pub fn extract_references(body: Option<&str>) -> References {
    let Some(text) = body.filter(|text| !text.is_empty()) else {
        return References::default();
    };
    References {
        mentions: captures(&MENTION_RE, text),
        repo_refs: captures(&REPO_REF_RE, text),
    }
}

pub fn normalize_repo_ref(reference: &str) -> String {
    let segments: Vec<&str> = reference
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    let start = segments.len().saturating_sub(2);
    segments[start..].join("/")
}

fn captures(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
