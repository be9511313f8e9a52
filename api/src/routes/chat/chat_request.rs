use qabot::Turn;
use serde::{Deserialize, Serialize};

/// Request payload for /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The latest user question.
    pub question: String,
    /// Prior exchanges, oldest first. Empty means single-turn mode.
    #[serde(default)]
    pub history: Vec<Turn>,
}

/// Response payload for /chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}
