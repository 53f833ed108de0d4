//! Markdown rendering of the final digest.

use crate::editorial::{EditorialSelection, Story};
use crate::summarize::ThemePayload;

pub fn render_digest(
    digest_date: &str,
    generated_at: &str,
    editorial: &EditorialSelection,
    themes: Option<&ThemePayload>,
    tone_mode: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Threat Digest for {}\n\n", digest_date));
    out.push_str(&format!("_Generated at {} ({} tone)_\n\n", generated_at, tone_mode));

    if let Some(themes) = themes {
        out.push_str("## Today's themes\n\n");
        for theme in &themes.themes {
            out.push_str(&format!("- {}\n", theme));
        }
        if !themes.one_line_rant.is_empty() {
            out.push_str(&format!("\n> {}\n", themes.one_line_rant));
        }
        out.push('\n');
    }

    match &editorial.top_story {
        Some(top) => {
            out.push_str("## Top story\n\n");
            render_story(&mut out, top);
        }
        None => {
            out.push_str("Nothing made the cut today. Enjoy the quiet.\n");
            return out;
        }
    }

    if !editorial.top_three.is_empty() {
        out.push_str("## Also in the spotlight\n\n");
        for story in &editorial.top_three {
            render_story(&mut out, story);
        }
    }

    if !editorial.context.is_empty() {
        out.push_str("## Worth a skim\n\n");
        for story in &editorial.context {
            out.push_str(&format!(
                "- **{}** (risk {}, confidence {}) {}\n",
                story.cluster_title, story.risk, story.confidence, story.why_this_is_here
            ));
        }
        out.push('\n');
    }

    out
}

fn render_story(out: &mut String, story: &Story) {
    out.push_str(&format!("### {}\n\n", story.cluster_title));
    out.push_str(&format!(
        "**Risk:** {} | **Confidence:** {} | **Stage:** {} | **Labels:** {}\n\n",
        story.risk,
        story.confidence,
        story.attack_stage,
        story.labels.join(", ")
    ));

    if !story.tl_dr.is_empty() {
        out.push_str(&format!("**TL;DR:** {}\n\n", story.tl_dr));
    }
    if !story.spicy_take.is_empty() {
        out.push_str(&format!("_{}_\n\n", story.spicy_take));
    }

    if !story.the_story.is_empty() {
        out.push_str(&story.the_story);
        out.push_str("\n\n");
    }
    out.push_str(&format!("**Why this is here:** {}\n\n", story.why_this_is_here));

    if !story.beginner_breakdown.is_empty() {
        out.push_str("**Jargon buster:**\n");
        for entry in &story.beginner_breakdown {
            out.push_str(&format!("- {}\n", entry));
        }
        out.push('\n');
    }
    if !story.soc_focus.is_empty() {
        out.push_str("**SOC focus:**\n");
        for entry in &story.soc_focus {
            out.push_str(&format!("- {}\n", entry));
        }
        out.push('\n');
    }
    if !story.recommended_actions.is_empty() {
        out.push_str("**Do this:**\n");
        for entry in &story.recommended_actions {
            out.push_str(&format!("- {}\n", entry));
        }
        out.push('\n');
    }

    if !story.sources.is_empty() {
        out.push_str("**Sources:**\n");
        for source in &story.sources {
            out.push_str(&format!("- [{}]({}) via {}\n", source.title, source.url, source.source));
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::cluster_items;
    use crate::editorial::{build_editorial, MAX_CLUSTERS};
    use crate::item::FeedItem;

    #[test]
    fn renders_sections_for_a_populated_digest() {
        let items = vec![
            FeedItem {
                title: "Cisco IOS XE RCE actively exploited".to_string(),
                url: "http://a/1".to_string(),
                source: "CISA".to_string(),
                ..FeedItem::default()
            },
            FeedItem {
                title: "Quarterly threat landscape numbers".to_string(),
                url: "http://a/2".to_string(),
                source: "Vendor Blog".to_string(),
                ..FeedItem::default()
            },
        ];
        let editorial = build_editorial(&cluster_items(&items), MAX_CLUSTERS);
        let themes = ThemePayload {
            themes: vec!["Edge devices again".to_string()],
            one_line_rant: "Patch faster.".to_string(),
        };

        let output = render_digest("2024-01-02", "2024-01-02T06:00:00Z", &editorial, Some(&themes), "spicy");
        assert!(output.contains("# Threat Digest for 2024-01-02"));
        assert!(output.contains("## Today's themes"));
        assert!(output.contains("## Top story"));
        assert!(output.contains("Cisco IOS XE RCE actively exploited"));
        assert!(output.contains("> Patch faster."));
    }

    #[test]
    fn renders_a_placeholder_when_empty() {
        let output = render_digest("2024-01-02", "now", &EditorialSelection::default(), None, "plain");
        assert!(output.contains("Nothing made the cut"));
    }
}
