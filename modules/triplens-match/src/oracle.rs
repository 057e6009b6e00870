//! Claude-backed implementations of the pipeline's two judgement contracts:
//! relevance filtering over candidate titles and the boring-activity check.
//!
//! Both calls sit on the request path, so they use a small fast model and
//! structured output. Callers treat either judgement as fallible and fail
//! open.

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::claude::Claude;
use crate::traits::{BoringClassifier, RelevanceOracle};

pub const ORACLE_MODEL: &str = "claude-haiku-4-5-20251001";

const RELEVANCE_SYSTEM: &str = r#"You judge which bookable travel experiences match a traveler's target activity.

You get the activity and a numbered list of experience titles. Keep a title when a traveler who wants the target activity would plausibly book it:
- The same activity, a close variant, or a guided/lesson/rental form of it. Snorkeling is relevant to scuba diving; a surf lesson is relevant to surfing.

Reject a title when:
- It is a different activity that merely shares a word or a setting. Indoor skydiving is not skydiving; a harbor cruise is not kayaking.
- It crosses the land/water boundary. Land activities are never relevant to water activities, and water activities are never relevant to land activities.
- It is generic sightseeing with the activity as a minor add-on.

Return the zero-based indices of the titles to keep."#;

const BORING_SYSTEM: &str = r#"You judge whether an activity seen in travel content is worth booking as an experience.

Boring means a routine travel moment nobody books: airport or hotel transfers, queueing, walking between sights, packing, checking in, riding ordinary public transport, unremarkable meals, shopping for essentials.

Not boring means a traveler could plausibly book a version of it: sports and outdoor activities, classes and workshops, themed tours, wildlife encounters, shows, food experiences with a cultural angle."#;

#[derive(Debug, Deserialize, JsonSchema)]
struct RelevanceResponse {
    /// Zero-based indices of the titles to keep.
    keep: Vec<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct BoringResponse {
    /// True when the activity is a routine travel moment not worth booking.
    boring: bool,
    /// One short sentence of justification.
    reason: String,
}

pub struct ActivityOracle {
    claude: Claude,
}

impl ActivityOracle {
    pub fn new(api_key: &str) -> Self {
        Self {
            claude: Claude::new(api_key, ORACLE_MODEL),
        }
    }
}

fn relevance_prompt(activity: &str, titles: &[String]) -> String {
    let mut prompt = format!("Target activity: {activity}\n\nCandidate titles:\n");
    for (idx, title) in titles.iter().enumerate() {
        prompt.push_str(&format!("{idx}. {title}\n"));
    }
    prompt
}

#[async_trait]
impl RelevanceOracle for ActivityOracle {
    async fn relevant_indices(&self, activity: &str, titles: &[String]) -> Result<Vec<usize>> {
        let prompt = relevance_prompt(activity, titles);
        let response: RelevanceResponse = self.claude.extract(RELEVANCE_SYSTEM, &prompt).await?;
        debug!(
            kept = response.keep.len(),
            total = titles.len(),
            "Relevance oracle replied"
        );
        Ok(response.keep)
    }
}

#[async_trait]
impl BoringClassifier for ActivityOracle {
    async fn is_boring(&self, activity: &str) -> Result<bool> {
        let prompt = format!("Activity: {activity}");
        let response: BoringResponse = self.claude.extract(BORING_SYSTEM, &prompt).await?;
        if response.boring {
            debug!(activity, reason = %response.reason, "Activity classified boring");
        }
        Ok(response.boring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_prompt_numbers_titles_from_zero() {
        let titles = vec!["Surf Lesson".to_string(), "Harbor Cruise".to_string()];
        let prompt = relevance_prompt("surfing", &titles);
        assert!(prompt.contains("Target activity: surfing"));
        assert!(prompt.contains("0. Surf Lesson"));
        assert!(prompt.contains("1. Harbor Cruise"));
    }

    #[test]
    fn relevance_system_draws_the_domain_boundary() {
        assert!(RELEVANCE_SYSTEM.contains("land/water boundary"));
        assert!(RELEVANCE_SYSTEM.contains("zero-based indices"));
    }

    #[test]
    fn boring_system_names_routine_moments() {
        assert!(BORING_SYSTEM.contains("transfers"));
        assert!(BORING_SYSTEM.contains("queueing"));
    }

    #[test]
    fn responses_deserialize_from_tool_output() {
        let relevance: RelevanceResponse =
            serde_json::from_value(serde_json::json!({ "keep": [0, 2] })).unwrap();
        assert_eq!(relevance.keep, vec![0, 2]);

        let boring: BoringResponse = serde_json::from_value(serde_json::json!({
            "boring": true,
            "reason": "An airport transfer is logistics, not an experience."
        }))
        .unwrap();
        assert!(boring.boring);
        assert!(!boring.reason.is_empty());
    }
}
