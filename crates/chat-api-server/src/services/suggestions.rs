use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::suggestion::{ActionType, SuggestedAction};
use crate::services::llm_service::{ChatMessage, LlmService};

/// Follow-up actions for a reply the user just received
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionsClient: Send + Sync {
    async fn suggest(&self, text: &str) -> Result<Vec<SuggestedAction>>;
}

/// Asks the model for suggestions, one per line as `text|ActionType|data`.
pub struct LlmSuggestionsClient {
    llm: Arc<LlmService>,
    system_prompt: String,
}

impl LlmSuggestionsClient {
    pub fn new(llm: Arc<LlmService>, system_prompt: String) -> Self {
        Self { llm, system_prompt }
    }
}

#[async_trait]
impl SuggestionsClient for LlmSuggestionsClient {
    async fn suggest(&self, text: &str) -> Result<Vec<SuggestedAction>> {
        let messages = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(text),
        ];

        let raw = self
            .llm
            .generate_chat(messages)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;

        let suggestions = parse_suggestions(&raw);
        debug!("Parsed {} suggestions", suggestions.len());
        Ok(suggestions)
    }
}

/// Parse every well-formed line, skipping the rest.
pub fn parse_suggestions(raw: &str) -> Vec<SuggestedAction> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match parse_line(line) {
            Ok(action) => Some(action),
            Err(e) => {
                warn!("Skipping suggestion line {:?}: {}", line, e);
                None
            }
        })
        .collect()
}

fn parse_line(line: &str) -> Result<SuggestedAction, String> {
    let mut fields = line.splitn(3, '|').map(str::trim);

    let text = fields.next().unwrap_or_default();
    if text.is_empty() {
        return Err("missing text".to_string());
    }

    let action_type: ActionType = fields
        .next()
        .ok_or_else(|| "missing action type".to_string())?
        .parse()?;

    let action_data = fields
        .next()
        .filter(|data| !data.is_empty())
        .map(str::to_string);

    Ok(SuggestedAction {
        text: text.to_string(),
        action_type,
        action_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_action_types() {
        let raw = "What time does it open?|Reply\n\
                   Official site|OpenUrl|https://museum.example\n\
                   Show me the way|Map|Piazza del Duomo, Milan\n";

        let actions = parse_suggestions(raw);
        assert_eq!(
            actions,
            vec![
                SuggestedAction {
                    text: "What time does it open?".to_string(),
                    action_type: ActionType::Reply,
                    action_data: None,
                },
                SuggestedAction {
                    text: "Official site".to_string(),
                    action_type: ActionType::OpenUrl,
                    action_data: Some("https://museum.example".to_string()),
                },
                SuggestedAction {
                    text: "Show me the way".to_string(),
                    action_type: ActionType::Map,
                    action_data: Some("Piazza del Duomo, Milan".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_data_may_contain_separator() {
        let actions = parse_suggestions("Search|OpenUrl|https://example.com/?q=a|b");
        assert_eq!(actions[0].action_data.as_deref(), Some("https://example.com/?q=a|b"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let raw = "\n   \njust text\n|Reply\nTell me more|Call|555\nTell me more | Reply | \n";

        let actions = parse_suggestions(raw);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].text, "Tell me more");
        assert_eq!(actions[0].action_type, ActionType::Reply);
        assert_eq!(actions[0].action_data, None);
    }

    #[test]
    fn test_blank_response_yields_nothing() {
        assert!(parse_suggestions("  \n\t").is_empty());
    }
}
