use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    /// Follow-up question; no data
    Reply,
    /// Link with more information; data is the URL
    OpenUrl,
    /// Place to show on a map; data is the location
    Map,
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Reply" => Ok(Self::Reply),
            "OpenUrl" => Ok(Self::OpenUrl),
            "Map" => Ok(Self::Map),
            other => Err(format!("Unknown action type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    pub text: String,
    pub action_type: ActionType,
    pub action_data: Option<String>,
}
