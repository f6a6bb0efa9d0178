use serde::{Deserialize, Serialize};

/// One prior conversation turn as the advisor endpoint expects it.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Clone)]
pub struct AskRequest {
    pub query: String,
    pub history: Vec<HistoryMessage>,
}

/// A reference to supporting material attached to an answer.
///
/// The backend sometimes omits `content` (search-grounded citations carry
/// only a title and URL), so it defaults to empty on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// One decoded increment of a streaming answer.
///
/// In practice each event carries either `text` or `citations`, never both,
/// but nothing here depends on that.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDelta {
    pub text: Option<String>,
    pub citations: Option<Vec<Citation>>,
}

impl StreamDelta {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.citations.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub urgency: Option<String>,
}

/// Response shape of the document-analysis endpoint. Every field is
/// defaulted: the backend returns partial objects when analysis degrades.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentAnalysis {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub risks: Option<String>,
}

pub mod documents;
