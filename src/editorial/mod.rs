//! Editorial selection: projecting clusters into stories and picking the
//! final slate.

pub mod signals;
pub mod story;
#[cfg(test)]
mod tests;

pub use signals::SignalBundle;
pub use story::{SourceRef, Story};

use serde::Serialize;

use crate::clustering::{score_cluster, TopicCluster};

/// Maximum clusters surfaced in one digest.
pub const MAX_CLUSTERS: usize = 8;

/// Slots in the band after the top story.
const TOP_THREE_SLOTS: usize = 2;

/// The final bounded slate. A cluster appears in at most one of
/// `top_story`, `top_three`, and `context`; `all_clusters` holds every
/// surviving story in score order.
#[derive(Debug, Default, Serialize)]
pub struct EditorialSelection {
    pub top_story: Option<Story>,
    pub top_three: Vec<Story>,
    pub context: Vec<Story>,
    pub all_clusters: Vec<Story>,
}

/// Sorts clusters by score (stable on ties, preserving clustering order),
/// caps the slate, and assigns bands. The two slots after the top story are
/// reserved for clusters from a different vendor than the top story's,
/// unless the top story has no vendor key; clusters skipped by that
/// constraint fall through to context in score order.
pub fn build_editorial(clusters: &[TopicCluster], max_clusters: usize) -> EditorialSelection {
    let mut ranked: Vec<(i64, &TopicCluster)> = clusters
        .iter()
        .map(|cluster| (score_cluster(cluster), cluster))
        .collect();
    ranked.sort_by_key(|(score, _)| std::cmp::Reverse(*score));
    ranked.truncate(max_clusters);

    let mut stories: Vec<Story> = ranked
        .into_iter()
        .map(|(score, cluster)| Story::from_cluster(cluster, score))
        .collect();
    let all_clusters = stories.clone();

    if stories.is_empty() {
        return EditorialSelection::default();
    }

    let top_story = stories.remove(0);
    let mut top_three = Vec::new();
    let mut context = Vec::new();

    for story in stories {
        let distinct_vendor =
            top_story.vendor_key.is_empty() || story.vendor_key != top_story.vendor_key;
        if top_three.len() < TOP_THREE_SLOTS && distinct_vendor {
            top_three.push(story);
        } else {
            context.push(story);
        }
    }

    EditorialSelection {
        top_story: Some(top_story),
        top_three,
        context,
        all_clusters,
    }
}
