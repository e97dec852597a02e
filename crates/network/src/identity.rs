use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use normalizer::EventRecord;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorIdentity {
    pub id: i64,
    pub login: String,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoIdentity {
    pub id: i64,
    pub name: String,
    pub org_id: Option<i64>,
    pub org_login: Option<String>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct IdentityResolver {
    actors: BTreeMap<i64, ActorIdentity>,
    repos: BTreeMap<i64, RepoIdentity>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &EventRecord) {
        match self.actors.entry(event.actor_id) {
            Entry::Occupied(mut slot) => {
                if event.created_at > slot.get().last_seen {
                    slot.insert(actor_identity(event));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(actor_identity(event));
            }
        }

        match self.repos.entry(event.repo_id) {
            Entry::Occupied(mut slot) => {
                if event.created_at > slot.get().last_seen {
                    slot.insert(repo_identity(event));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(repo_identity(event));
            }
        }
    }

    pub fn observe_chunk(&mut self, events: &[EventRecord]) {
        for event in events {
            self.observe(event);
        }
    }

    /// When several ids held a login or name, the highest id owns the lookup entry.
    pub fn finish(self) -> IdentityTables {
        let mut login_to_actor_id = HashMap::with_capacity(self.actors.len());
        let mut ambiguous_logins = 0usize;
        for (id, actor) in &self.actors {
            if login_to_actor_id.insert(actor.login.clone(), *id).is_some() {
                ambiguous_logins += 1;
                warn!(login = %actor.login, actor_id = id, "login shared by several actors");
            }
        }

        let mut repo_name_to_repo_id = HashMap::with_capacity(self.repos.len());
        let mut ambiguous_repo_names = 0usize;
        for (id, repo) in &self.repos {
            if repo_name_to_repo_id.insert(repo.name.clone(), *id).is_some() {
                ambiguous_repo_names += 1;
                warn!(name = %repo.name, repo_id = id, "repository name shared by several repos");
            }
        }

        IdentityTables {
            actors: self.actors,
            repos: self.repos,
            login_to_actor_id,
            repo_name_to_repo_id,
            ambiguous_logins,
            ambiguous_repo_names,
        }
    }
}

fn actor_identity(event: &EventRecord) -> ActorIdentity {
    ActorIdentity {
        id: event.actor_id,
        login: event.actor_login.clone(),
        last_seen: event.created_at,
    }
}

fn repo_identity(event: &EventRecord) -> RepoIdentity {
    RepoIdentity {
        id: event.repo_id,
        name: event.repo_name.clone(),
        org_id: event.org_id,
        org_login: event.org_login.clone(),
        last_seen: event.created_at,
    }
}

#[derive(Debug, Clone)]
pub struct IdentityTables {
    actors: BTreeMap<i64, ActorIdentity>,
    repos: BTreeMap<i64, RepoIdentity>,
    login_to_actor_id: HashMap<String, i64>,
    repo_name_to_repo_id: HashMap<String, i64>,
    ambiguous_logins: usize,
    ambiguous_repo_names: usize,
}

impl IdentityTables {
    pub fn actor(&self, id: i64) -> Option<&ActorIdentity> {
        self.actors.get(&id)
    }

    pub fn repo(&self, id: i64) -> Option<&RepoIdentity> {
        self.repos.get(&id)
    }

    pub fn actor_id_for_login(&self, login: &str) -> Option<i64> {
        self.login_to_actor_id.get(login).copied()
    }

    pub fn repo_id_for_name(&self, name: &str) -> Option<i64> {
        self.repo_name_to_repo_id.get(name).copied()
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorIdentity> + '_ {
        self.actors.values()
    }

    pub fn repos(&self) -> impl Iterator<Item = &RepoIdentity> + '_ {
        self.repos.values()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn repo_count(&self) -> usize {
        self.repos.len()
    }

    pub fn ambiguous_logins(&self) -> usize {
        self.ambiguous_logins
    }

    pub fn ambiguous_repo_names(&self) -> usize {
        self.ambiguous_repo_names
    }
}
