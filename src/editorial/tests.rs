use std::collections::HashSet;

use super::story::split_sentences;
use super::{build_editorial, SignalBundle, Story, MAX_CLUSTERS};
use crate::clustering::{cluster_items, TopicCluster};
use crate::item::{Confidence, Enrichment, FeedItem, Risk};

fn item(title: &str, url: &str, source: &str) -> FeedItem {
    FeedItem {
        title: title.to_string(),
        url: url.to_string(),
        source: source.to_string(),
        ..FeedItem::default()
    }
}

fn enrichment(risk: Risk) -> Enrichment {
    Enrichment {
        risk,
        confidence: Confidence::Medium,
        spicy_take: "Analyst take: patch before the weekend.".to_string(),
        tl_dr: "A widely deployed gateway is under attack.".to_string(),
        what_happened: "Attackers found a flaw. They used it fast.".to_string(),
        why_it_matters: "Exposed devices are easy wins.".to_string(),
        beginner_breakdown: vec!["RCE - running code remotely".to_string()],
        attack_stage: "Initial Access".to_string(),
        soc_focus: vec!["Watch egress from gateway subnets".to_string()],
        tags: vec!["cve".to_string()],
        recommended_actions: vec!["Apply the vendor patch".to_string()],
    }
}

fn manual_cluster(items: Vec<FeedItem>) -> TopicCluster {
    TopicCluster {
        topic_key: "manual".to_string(),
        vendor_key: String::new(),
        exploit_key: String::new(),
        items,
        tokens: HashSet::new(),
    }
}

#[test]
fn sentences_split_only_before_new_sentences() {
    assert_eq!(
        split_sentences("Attackers moved fast. Patch now. e.g. version 2 is safe"),
        vec![
            "Attackers moved fast.".to_string(),
            "Patch now. e.g. version 2 is safe".to_string(),
        ]
    );
    assert!(split_sentences("").is_empty());
    assert_eq!(split_sentences("No terminal punctuation"), vec![
        "No terminal punctuation".to_string()
    ]);
}

#[test]
fn confidence_follows_the_signal_rules() {
    let mut bundle = SignalBundle::default();
    assert_eq!(bundle.confidence(), Confidence::Low);

    bundle.multi_source = true;
    assert_eq!(bundle.confidence(), Confidence::Medium);

    bundle.kev_listed = true;
    assert_eq!(bundle.confidence(), Confidence::High);

    let active_with_authority = SignalBundle {
        active_exploit: true,
        authoritative: true,
        ..SignalBundle::default()
    };
    assert_eq!(active_with_authority.confidence(), Confidence::High);

    let active_alone = SignalBundle {
        active_exploit: true,
        ..SignalBundle::default()
    };
    assert_eq!(active_alone.confidence(), Confidence::Low);
}

#[test]
fn why_here_caps_reasons_and_falls_back() {
    let everything = SignalBundle {
        active_exploit: true,
        kev_listed: true,
        patch_available: true,
        sector_impact: true,
        multi_source: true,
        authoritative: true,
    };
    let rationale = everything.why_here();
    assert_eq!(rationale.matches('.').count(), 2);

    assert_eq!(SignalBundle::default().why_here(), "Relevant context worth tracking.");
}

#[test]
fn slate_reserves_top_three_for_other_vendors() {
    let items = vec![
        item("Cisco ASA zero-day actively exploited", "http://a/1", "CISA"),
        item("Cisco router ransomware steals credentials", "http://a/2", "Feed"),
        item("Microsoft phishing wave hits inboxes", "http://a/3", "Feed"),
        item("Community conference schedule announced", "http://a/4", "Feed"),
        item("Fortinet roadmap discussion", "http://a/5", "Feed"),
    ];
    let clusters = cluster_items(&items);
    assert_eq!(clusters.len(), 5);

    let selection = build_editorial(&clusters, MAX_CLUSTERS);
    let top = selection.top_story.expect("a top story");
    assert_eq!(top.vendor_key, "cisco");

    assert!(selection.top_three.iter().all(|story| story.vendor_key != "cisco"));
    assert_eq!(selection.top_three.len(), 2);
    assert!(selection.context.iter().any(|story| story.vendor_key == "cisco"));
    assert_eq!(selection.all_clusters.len(), 5);

    let total = 1 + selection.top_three.len() + selection.context.len();
    assert_eq!(total, selection.all_clusters.len());
}

#[test]
fn slate_caps_the_cluster_count() {
    let items: Vec<FeedItem> = (0..12)
        .map(|i| {
            item(
                &format!("unrelated{:02}a unrelated{:02}b unrelated{:02}c", i, i, i),
                &format!("http://u/{}", i),
                "Feed",
            )
        })
        .collect();
    let clusters = cluster_items(&items);
    assert_eq!(clusters.len(), 12);

    let selection = build_editorial(&clusters, MAX_CLUSTERS);
    assert_eq!(selection.all_clusters.len(), MAX_CLUSTERS);
}

#[test]
fn sources_are_deduplicated_and_capped() {
    let mut members = vec![
        item("One", "http://s/1", "Feed A"),
        item("One again", "http://s/1", "Feed A"),
        item("Two", "http://s/2", "Feed B"),
        item("Three", "http://s/3", "Feed C"),
        item("Four", "http://s/4", "Feed D"),
    ];
    members[0].enrichment = Some(enrichment(Risk::Medium));
    let story = Story::from_cluster(&manual_cluster(members), 0);

    assert_eq!(story.sources.len(), 3);
    assert_eq!(story.sources[0].url, "http://s/1");
    assert_eq!(story.sources[1].url, "http://s/2");
}

#[test]
fn risk_is_the_highest_across_members() {
    let mut low = item("One", "http://r/1", "Feed A");
    low.enrichment = Some(enrichment(Risk::Low));
    let mut high = item("Two", "http://r/2", "Feed B");
    high.enrichment = Some(enrichment(Risk::High));
    let unenriched = item("Three", "http://r/3", "Feed C");

    let story = Story::from_cluster(&manual_cluster(vec![low, high, unenriched]), 0);
    assert_eq!(story.risk, Risk::High);
}

#[test]
fn narrative_credits_extra_sources_and_pads_short_stories() {
    let mut primary = item("Gateway bug", "http://n/1", "CISA");
    primary.enrichment = Some(enrichment(Risk::High));
    let secondary = item("Gateway bug confirmed", "http://n/2", "BleepingComputer");

    let story = Story::from_cluster(&manual_cluster(vec![primary, secondary]), 0);
    let lines: Vec<&str> = story.the_story.lines().collect();

    assert!(lines.iter().all(|line| line.starts_with("- ")));
    assert!(lines.iter().any(|line| line.contains("Also reported by BleepingComputer")));
    assert!(lines.len() <= 8);

    let mut solo = item("Solo", "http://n/3", "Feed");
    solo.enrichment = Some(Enrichment {
        tl_dr: "One sentence only.".to_string(),
        what_happened: String::new(),
        why_it_matters: String::new(),
        ..enrichment(Risk::Low)
    });
    let padded = Story::from_cluster(&manual_cluster(vec![solo]), 0);
    assert!(padded.the_story.contains("Details are still developing"));
}

#[test]
fn unenriched_clusters_degrade_to_defaults() {
    let story = Story::from_cluster(&manual_cluster(vec![item("Plain", "http://d/1", "Feed")]), 3);
    assert_eq!(story.attack_stage, "Unknown");
    assert_eq!(story.risk, Risk::Low);
    assert!(story.tl_dr.is_empty());
    assert_eq!(story.score, 3);
    assert!(story.the_story.contains("Details are still developing"));
}

#[test]
fn empty_input_yields_an_empty_selection() {
    let selection = build_editorial(&[], MAX_CLUSTERS);
    assert!(selection.top_story.is_none());
    assert!(selection.all_clusters.is_empty());
}
