// tests/pipeline_e2e.rs
//
// End-to-end pass over a small mixed corpus: fresh strong signal, stale
// signal, and an ambiguous one. Only the fresh strong article may drive the
// index; the others must carry zero weight.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use gold_sentiment_index::aggregate::AggregateError;
use gold_sentiment_index::article::Article;
use gold_sentiment_index::classify::Regime;
use gold_sentiment_index::config::IndexConfig;
use gold_sentiment_index::pipeline::{compute_snapshot, run_once};
use gold_sentiment_index::scores::{SentimentScores, StaticScoreProvider};

fn now() -> DateTime<Utc> {
    "2026-08-25T12:00:00Z".parse().unwrap()
}

fn art(url: &str, title: &str, age_days: i64) -> Article {
    Article {
        url: url.to_string(),
        title: title.to_string(),
        description: String::new(),
        content: String::new(),
        timestamp: now() - Duration::days(age_days),
    }
}

fn corpus() -> Vec<Article> {
    vec![
        art("https://news/a", "Gold surges on safe-haven demand", 0),
        art("https://news/b", "Gold slumped last month", 40),
        art("https://news/c", "Gold flat as traders wait", 2),
    ]
}

fn corpus_scores() -> HashMap<String, SentimentScores> {
    let mut scores = HashMap::new();
    scores.insert(
        "https://news/a".to_string(),
        SentimentScores::new(0.9, 0.05, 0.05),
    );
    scores.insert(
        "https://news/b".to_string(),
        SentimentScores::new(0.1, 0.9, 0.0),
    );
    scores.insert(
        "https://news/c".to_string(),
        SentimentScores::new(0.5, 0.5, 0.0),
    );
    scores
}

#[test]
fn only_the_fresh_strong_article_drives_the_index() {
    let cfg = IndexConfig::default();
    let snap = compute_snapshot(&corpus(), &corpus_scores(), &cfg, now()).unwrap();

    // All three got audited, none skipped.
    assert_eq!(snap.count, 3);
    assert_eq!(snap.skipped.missing_score, 0);
    assert_eq!(snap.skipped.out_of_range, 0);

    let by_url: HashMap<_, _> = snap
        .documents
        .iter()
        .map(|d| (d.url.as_str(), d))
        .collect();

    // (a): fresh, strong margin → highest effective weight.
    let a = by_url["https://news/a"];
    assert_eq!(a.recency_weight, 1.0);
    assert!(a.effective_weight > 0.0);

    // (b): 40 days old → inert despite its strong margin.
    let b = by_url["https://news/b"];
    assert_eq!(b.recency_weight, 0.0);
    assert_eq!(b.effective_weight, 0.0);

    // (c): ambiguous margin → inert despite being recent.
    let c = by_url["https://news/c"];
    assert_eq!(c.impact_weight, 0.0);
    assert_eq!(c.effective_weight, 0.0);

    // With only (a) contributing, the index pegs at the bullish end:
    // nw_raw 0.85 × 2.2 clips to 1.0 → nw_norm 100.
    assert_eq!(snap.nw, 1.0);
    assert_eq!(snap.nw_norm, 100.0);
    assert_eq!(snap.gsi, 100.0);
    assert_eq!(snap.classification, Regime::ExtremelyBullish);
}

#[tokio::test]
async fn run_once_scores_through_the_provider_seam() {
    let cfg = IndexConfig::default();
    let articles = corpus();
    let mut provider = StaticScoreProvider::new();
    for a in &articles {
        let s = corpus_scores()[&a.url];
        provider = provider.with_score(a.text(), s);
    }

    let snap = run_once(&articles, &provider, &cfg, now()).await.unwrap();
    assert_eq!(snap.classification, Regime::ExtremelyBullish);
    assert_eq!(snap.nw_norm, 100.0);
}

#[tokio::test]
async fn all_inert_corpus_reports_insufficient_signal() {
    let cfg = IndexConfig::default();
    // Stale + ambiguous only; no article carries weight.
    let articles = vec![
        art("https://news/b", "Gold slumped last month", 40),
        art("https://news/c", "Gold flat as traders wait", 2),
    ];
    let mut provider = StaticScoreProvider::new();
    provider = provider.with_score(articles[0].text(), SentimentScores::new(0.1, 0.9, 0.0));
    provider = provider.with_score(articles[1].text(), SentimentScores::new(0.5, 0.5, 0.0));

    let err = run_once(&articles, &provider, &cfg, now()).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<AggregateError>(),
        Some(&AggregateError::EmptyCorpus)
    );
}

#[test]
fn lower_sensitivity_lands_mid_band() {
    // Same corpus, sensitivity 1.0: nw = 0.85 → nw_norm 92.5, still extreme.
    let cfg = IndexConfig {
        sensitivity: 1.0,
        ..Default::default()
    };
    let snap = compute_snapshot(&corpus(), &corpus_scores(), &cfg, now()).unwrap();
    assert!((snap.nw - 0.85).abs() < 1e-12);
    assert!((snap.nw_norm - 92.5).abs() < 1e-9);
    assert_eq!(snap.classification, Regime::ExtremelyBullish);
}

#[test]
fn macro_keywords_tilt_the_blend() {
    // Two fresh articles with opposite signals of equal margin; the
    // macro-flagged one gets the 3x boost and dominates.
    let cfg = IndexConfig::default();
    let articles = vec![
        art("https://news/p", "Powell comments sink gold", 0),
        art("https://news/q", "Jewelry demand lifts gold", 0),
    ];
    let mut scores = HashMap::new();
    scores.insert(
        "https://news/p".to_string(),
        SentimentScores::new(0.1, 0.9, 0.0),
    );
    scores.insert(
        "https://news/q".to_string(),
        SentimentScores::new(0.9, 0.1, 0.0),
    );

    let snap = compute_snapshot(&articles, &scores, &cfg, now()).unwrap();
    // avg = (3w*(0.1,0.9) + w*(0.9,0.1)) / 4w → nw_raw = -0.4
    assert!(snap.nw < 0.0);
    assert_eq!(snap.classification, Regime::ExtremelyBearish);
}
