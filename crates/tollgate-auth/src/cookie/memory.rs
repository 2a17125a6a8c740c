//! In-memory cookie jar.

use std::collections::{HashMap, HashSet};

use super::{CookieJar, SessionCookie};

/// A cookie jar backed by a map.
///
/// Holds the cookies a client presented plus everything written during the
/// request, which makes it suitable for tests and for adapting frameworks
/// that expose cookies as a plain map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    cookies: HashMap<String, SessionCookie>,
    cleared: HashSet<String>,
}

impl MemoryCookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a jar holding cookies the client sent with the request.
    pub fn from_request<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut jar = Self::new();
        for (name, value) in values {
            let name = name.into();
            let cookie = SessionCookie {
                name: name.clone(),
                value: value.into(),
                attributes: Default::default(),
            };
            jar.cookies.insert(name, cookie);
        }
        jar
    }

    /// Full cookie, including attributes, if present.
    pub fn cookie(&self, name: &str) -> Option<&SessionCookie> {
        self.cookies.get(name)
    }

    /// Whether `clear` was called for `name` and nothing was written since.
    pub fn was_cleared(&self, name: &str) -> bool {
        self.cleared.contains(name)
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .map(|c| c.value.clone())
            .filter(|v| !v.is_empty())
    }

    fn set(&mut self, cookie: SessionCookie) {
        self.cleared.remove(&cookie.name);
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    fn clear(&mut self, name: &str) {
        self.cookies.remove(name);
        self.cleared.insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::CookieAttributes;
    use tollgate_core::config::SessionConfig;

    #[test]
    fn test_from_request_and_get() {
        let jar = MemoryCookieJar::from_request([("username", "alice"), ("token", "")]);
        assert_eq!(jar.get("username").as_deref(), Some("alice"));
        assert_eq!(jar.get("token"), None);
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn test_set_then_clear() {
        let mut jar = MemoryCookieJar::new();
        let attrs = CookieAttributes::from_config(&SessionConfig::default());
        jar.set(SessionCookie::new("token", "abc", attrs.clone()));
        assert_eq!(jar.get("token").as_deref(), Some("abc"));
        assert_eq!(jar.cookie("token").unwrap().attributes, attrs);

        jar.clear("token");
        assert_eq!(jar.get("token"), None);
        assert!(jar.was_cleared("token"));

        jar.set(SessionCookie::new("token", "def", attrs));
        assert!(!jar.was_cleared("token"));
    }
}
