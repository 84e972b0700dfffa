use crate::github::RawUser;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// A contributor, identified by login
#[derive(Debug, PartialEq, Eq)]
pub struct User {
    /// Login handle
    pub id: String,
    /// Profile URL
    pub url: String,
}

/// Shared handle to a registered user
pub type UserRef = Arc<User>;

impl User {
    /// Markdown reference, e.g. `[@alice]`
    pub fn mention(&self) -> String {
        format!("[@{}]", self.id)
    }

    /// Markdown link definition, e.g. `[@alice]: https://github.com/alice`
    pub fn link(&self) -> String {
        format!("[@{}]: {}", self.id, self.url)
    }
}

/// Identity registry for one run: every login maps to exactly one
/// [`User`] instance.
#[derive(Debug, Default)]
pub struct Users {
    by_login: HashMap<String, UserRef>,
}

impl Users {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the registered user for this login, registering it first
    /// if needed
    pub fn resolve(&mut self, raw: &RawUser) -> UserRef {
        if let Some(user) = self.by_login.get(&raw.login) {
            return Arc::clone(user);
        }

        let url = if raw.html_url.is_empty() {
            format!("https://github.com/{}", raw.login)
        } else {
            raw.html_url.clone()
        };
        let user = Arc::new(User {
            id: raw.login.clone(),
            url,
        });
        debug!(login = %user.id, "Added new user");
        self.by_login.insert(user.id.clone(), Arc::clone(&user));
        user
    }

    pub fn get(&self, login: &str) -> Option<&UserRef> {
        self.by_login.get(login)
    }

    pub fn len(&self) -> usize {
        self.by_login.len()
    }

    /// One link definition per registered user, sorted by login
    pub fn render_links(&self) -> Vec<String> {
        let mut users: Vec<&UserRef> = self.by_login.values().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users.iter().map(|u| u.link()).collect()
    }
}

/// A set of registered users, iterated in login order.
///
/// Keyed by login; since the registry hands out a single instance per
/// login this is the same as keying by identity.
#[derive(Debug, Clone, Default)]
pub struct UserSet {
    users: BTreeMap<String, UserRef>,
}

impl UserSet {
    pub fn insert(&mut self, user: &UserRef) {
        debug_assert!(self
            .users
            .get(&user.id)
            .map_or(true, |known| Arc::ptr_eq(known, user)));
        self.users
            .entry(user.id.clone())
            .or_insert_with(|| Arc::clone(user));
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserRef> {
        self.users.values()
    }
}
