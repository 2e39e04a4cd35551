//! # Article Store
//! Immutable article records plus the merge/dedup semantics for the in-memory
//! corpus. Identity is the URL: merging the same batch twice is a no-op, and a
//! colliding incoming record replaces the stored one (freshest metadata wins).

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One news article as handed in by the acquisition collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    /// Unique identity; two articles with the same URL are the same entity.
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    /// Publication instant, UTC.
    pub timestamp: DateTime<Utc>,
}

impl Article {
    /// Normalized text used for scoring and keyword matching:
    /// title + description + content, empty parts skipped.
    pub fn text(&self) -> String {
        let parts = [
            self.title.as_str(),
            self.description.as_str(),
            self.content.as_str(),
        ];
        let joined = parts
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" \n");
        normalize_text(&joined)
    }
}

/// Normalize text: decode HTML entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (but keep the single '\n' part separators).
    // [^\S\n] covers all Unicode whitespace except '\n', including the
    // U+00A0 that decoding &nbsp; produces.
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[^\S\n]+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Merge `incoming` into `existing` by URL identity and return the corpus
/// sorted newest-first (URL lexical order breaks timestamp ties so identical
/// inputs always produce identical output).
///
/// Idempotent: `merge(merge(s, a), a) == merge(s, a)`.
pub fn merge(existing: &[Article], incoming: &[Article]) -> Vec<Article> {
    let mut by_url: HashMap<String, Article> = existing
        .iter()
        .map(|a| (a.url.clone(), a.clone()))
        .collect();

    for a in incoming {
        // Incoming replaces existing: last-seen metadata wins.
        by_url.insert(a.url.clone(), a.clone());
    }

    let mut merged: Vec<Article> = by_url.into_values().collect();
    merged.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.url.cmp(&b.url))
    });
    merged
}

/// Thread-safe in-memory corpus. Callers get owned snapshots so an
/// aggregation run never observes mutation mid-pass; articles are never
/// deleted here (housekeeping, if any, is an external concern).
#[derive(Debug, Default)]
pub struct ArticleStore {
    inner: RwLock<Vec<Article>>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an initial corpus (already deduplicated or not;
    /// merge semantics apply either way).
    pub fn with_articles(articles: Vec<Article>) -> Self {
        let store = Self::new();
        store.merge_batch(&articles);
        store
    }

    /// Merge a batch from the acquisition collaborator.
    /// Returns the corpus size after the merge.
    pub fn merge_batch(&self, incoming: &[Article]) -> usize {
        let mut guard = self.inner.write().expect("article store lock poisoned");
        let merged = merge(&guard, incoming);
        *guard = merged;
        guard.len()
    }

    /// Owned snapshot, newest-first.
    pub fn snapshot(&self) -> Vec<Article> {
        self.inner
            .read()
            .expect("article store lock poisoned")
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("article store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
