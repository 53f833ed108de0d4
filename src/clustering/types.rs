//! Type definitions for the clustering module.

use std::collections::HashSet;

use crate::item::FeedItem;

/// A mutable accumulator for one story. Founded by a single item; later
/// items that match one of the assignment rules are appended and their
/// title tokens unioned into `tokens`, so overlap comparisons see the
/// cluster's cumulative vocabulary. The topic, vendor, and exploit keys are
/// fixed at creation and never recomputed from later members.
#[derive(Debug, Clone)]
pub struct TopicCluster {
    pub topic_key: String,
    pub vendor_key: String,
    pub exploit_key: String,
    pub items: Vec<FeedItem>,
    pub tokens: HashSet<String>,
}
