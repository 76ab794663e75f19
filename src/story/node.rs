use serde::Deserialize;

/// One choice the player can pick on a [`Question`].
#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    /// Identifier logged into the history trail. Unique within its owning
    /// question, not globally.
    pub id: String,
    /// The line shown to the player for this choice.
    pub text: String,
    /// Where this choice leads. Untyped at authoring time: may name a
    /// question, an epilogue, or nothing at all (dangling reference).
    pub next_question_id: String,
}

/// A decision node in the story graph.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    /// Unique identifier for this question (e.g. "start", "forest_path").
    pub id: String,
    /// Narrative text read to the player when entering this node.
    pub story: String,
    /// The question posed after the narrative.
    pub question_text: String,
    /// Ordered choices. Presented to the player in this order.
    pub answers: Vec<Answer>,
}

/// A terminal node. Reaching one ends the story.
#[derive(Debug, Clone, Deserialize)]
pub struct Epilogue {
    pub id: String,
    pub title: String,
    pub text: String,
}
