//! Named, lazily compiled regular expressions shared by the extensions.

use crate::error::Error;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

struct PatternSource {
    name: &'static str,
    source: &'static str,
    case_insensitive: bool,
}

const PATTERNS: &[PatternSource] = &[
    PatternSource {
        name: "url",
        source: concat!(
            r"^https?://",
            r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|",
            r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
            r"(?::\d+)?",
            r"(?:/?|[/?]\S+)$",
        ),
        case_insensitive: true,
    },
    PatternSource {
        name: "user_mention",
        source: r"^<@!?(\d{15,20})>$",
        case_insensitive: false,
    },
    PatternSource {
        name: "invite",
        source: r"^(?:https?://)?(?:www\.)?(?:discord\.gg|discord(?:app)?\.com/invite)/([A-Z0-9-]{2,32})/?$",
        case_insensitive: true,
    },
];

/// Memoizing accessor for the patterns above. Each pattern is compiled on
/// first use and the compiled value is reused for the life of the registry.
#[derive(Default)]
pub struct PatternRegistry {
    compiled: RwLock<HashMap<&'static str, Arc<Regex>>>,
    compilations: AtomicUsize,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every pattern the registry knows about.
    pub fn names() -> impl Iterator<Item = &'static str> {
        PATTERNS.iter().map(|p| p.name)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Regex>, Error> {
        if let Some(found) = self.read_cached(name) {
            return Ok(found);
        }

        let spec = PATTERNS
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownPattern(name.to_string()))?;

        // Two callers may both get here; the first insert wins and the other
        // result is dropped.
        let regex = RegexBuilder::new(spec.source)
            .case_insensitive(spec.case_insensitive)
            .build()?;
        self.compilations.fetch_add(1, Ordering::Relaxed);

        let mut compiled = self
            .compiled
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(compiled
            .entry(spec.name)
            .or_insert_with(|| Arc::new(regex))
            .clone())
    }

    /// Shorthand for `get("url")`.
    pub fn url(&self) -> Result<Arc<Regex>, Error> {
        self.get("url")
    }

    /// How many times a pattern has been compiled.
    pub fn compiled_count(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    fn read_cached(&self, name: &str) -> Option<Arc<Regex>> {
        self.compiled
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn url_pattern_is_compiled_once() {
        let registry = PatternRegistry::new();
        assert_eq!(registry.compiled_count(), 0);

        for _ in 0..5 {
            let url = registry.get("url").unwrap();
            assert!(url.is_match("https://example.com/path"));
            assert!(!url.is_match("not a url"));
        }

        assert_eq!(registry.compiled_count(), 1);
        assert!(Arc::ptr_eq(&registry.url().unwrap(), &registry.get("url").unwrap()));
    }

    #[test]
    fn url_pattern_matches_like_a_url_validator() {
        let registry = PatternRegistry::new();
        let url = registry.url().unwrap();

        for ok in [
            "http://example.com",
            "HTTPS://EXAMPLE.COM/",
            "https://sub.example.co.uk:8443/a?b=c",
            "http://127.0.0.1:8080/health",
        ] {
            assert!(url.is_match(ok), "{ok} should match");
        }

        for bad in [
            "ftp://example.com",
            "https://example",
            "https://example.com/has space",
            "example.com",
        ] {
            assert!(!url.is_match(bad), "{bad} should not match");
        }
    }

    #[test]
    fn every_known_pattern_compiles() {
        let registry = PatternRegistry::new();
        for name in PatternRegistry::names() {
            registry.get(name).unwrap();
        }
        assert_eq!(registry.compiled_count(), PATTERNS.len());
    }

    #[test]
    fn mentions_and_invites() {
        let registry = PatternRegistry::new();
        let mention = registry.get("user_mention").unwrap();
        let invite = registry.get("invite").unwrap();

        let caps = mention.captures("<@!957437570546012240>").unwrap();
        assert_eq!(&caps[1], "957437570546012240");
        assert!(!mention.is_match("@someone"));

        assert!(invite.is_match("https://discord.gg/andeh"));
        assert!(invite.is_match("discord.com/invite/Andeh-Arsenal"));
        assert!(!invite.is_match("https://example.com/invite/andeh"));
    }

    #[test]
    fn unknown_pattern_is_an_error() {
        let registry = PatternRegistry::new();
        assert!(matches!(
            registry.get("nope"),
            Err(Error::UnknownPattern(name)) if name == "nope"
        ));
        assert_eq!(registry.compiled_count(), 0);
    }
}
