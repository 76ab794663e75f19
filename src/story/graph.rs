use std::collections::HashMap;

use log::warn;
use regex::Regex;
use thiserror::Error;

use crate::story::node::{Epilogue, Question};

/// Identifier convention enforced by the authoring pipeline. Ids that break
/// it are flagged at load time but still usable.
const ID_PATTERN: &str = "^[a-z][a-z0-9_]*$";

/// Hard failures while assembling a story graph. Content defects that the
/// engine can survive at runtime (dangling edges, namespace collisions) are
/// only warned about, not raised.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate question id \"{0}\"")]
    DuplicateQuestion(String),
    #[error("duplicate epilogue id \"{0}\"")]
    DuplicateEpilogue(String),
    #[error("start question \"{0}\" not found in graph")]
    MissingStart(String),
}

/// What an answer's `next_question_id` points at. Epilogues take priority
/// over questions when an id exists in both namespaces.
#[derive(Debug)]
pub enum Resolution<'a> {
    Epilogue(&'a Epilogue),
    Question(&'a Question),
    /// Matches neither map: a dangling reference.
    Unknown,
}

// ---------------------------------------------------------------------------
// Story graph
// ---------------------------------------------------------------------------

/// The full story: two id -> record maps plus the designated entry point.
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    questions: HashMap<String, Question>,
    epilogues: HashMap<String, Epilogue>,
    start_question_id: String,
}

impl StoryGraph {
    /// Assemble and validate a graph from authored content.
    ///
    /// Duplicate ids within a namespace and a missing start question are
    /// hard errors. Dangling answer edges, ids shared between the question
    /// and epilogue namespaces, and ids breaking the naming convention are
    /// logged as warnings for content authors.
    pub fn build(
        questions: Vec<Question>,
        epilogues: Vec<Epilogue>,
        start_question_id: impl Into<String>,
    ) -> Result<Self, GraphError> {
        let start_question_id = start_question_id.into();

        let mut question_map = HashMap::with_capacity(questions.len());
        for q in questions {
            if question_map.contains_key(&q.id) {
                return Err(GraphError::DuplicateQuestion(q.id));
            }
            question_map.insert(q.id.clone(), q);
        }

        let mut epilogue_map = HashMap::with_capacity(epilogues.len());
        for e in epilogues {
            if epilogue_map.contains_key(&e.id) {
                return Err(GraphError::DuplicateEpilogue(e.id));
            }
            epilogue_map.insert(e.id.clone(), e);
        }

        if !question_map.contains_key(&start_question_id) {
            return Err(GraphError::MissingStart(start_question_id));
        }

        let graph = Self {
            questions: question_map,
            epilogues: epilogue_map,
            start_question_id,
        };
        graph.lint();
        Ok(graph)
    }

    pub fn start_question_id(&self) -> &str {
        &self.start_question_id
    }

    pub fn has_question(&self, id: &str) -> bool {
        self.questions.contains_key(id)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn has_epilogue(&self, id: &str) -> bool {
        self.epilogues.contains_key(id)
    }

    pub fn epilogue(&self, id: &str) -> Option<&Epilogue> {
        self.epilogues.get(id)
    }

    /// Resolve an answer's target id. Epilogues are checked first; an id
    /// present in both namespaces resolves to the epilogue. `lint` flags
    /// such collisions so authors don't lean on the tie-break.
    pub fn resolve(&self, id: &str) -> Resolution<'_> {
        if let Some(e) = self.epilogues.get(id) {
            Resolution::Epilogue(e)
        } else if let Some(q) = self.questions.get(id) {
            Resolution::Question(q)
        } else {
            Resolution::Unknown
        }
    }

    /// Non-fatal content checks, logged for authors.
    fn lint(&self) {
        // Pattern is a literal, compile cannot fail at runtime.
        let id_re = Regex::new(ID_PATTERN).unwrap();

        for id in self.questions.keys() {
            if self.has_epilogue(id) {
                warn!(
                    "id \"{id}\" names both a question and an epilogue; \
                     the epilogue wins at resolution time"
                );
            }
        }

        for (id, question) in &self.questions {
            if !id_re.is_match(id) {
                warn!("question id \"{id}\" breaks the naming convention ({ID_PATTERN})");
            }
            for answer in &question.answers {
                let target = answer.next_question_id.as_str();
                if !self.has_epilogue(target) && !self.has_question(target) {
                    warn!(
                        "answer \"{}\" on question \"{id}\" points at \"{}\" \
                         which is neither a question nor an epilogue",
                        answer.id, answer.next_question_id
                    );
                }
            }
        }

        for id in self.epilogues.keys() {
            if !id_re.is_match(id) {
                warn!("epilogue id \"{id}\" breaks the naming convention ({ID_PATTERN})");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::node::Answer;

    fn question(id: &str, next: &str) -> Question {
        Question {
            id: id.into(),
            story: "story".into(),
            question_text: "what now?".into(),
            answers: vec![Answer {
                id: "a1".into(),
                text: "onward".into(),
                next_question_id: next.into(),
            }],
        }
    }

    fn epilogue(id: &str) -> Epilogue {
        Epilogue {
            id: id.into(),
            title: "The End".into(),
            text: "it is over".into(),
        }
    }

    #[test]
    fn test_build_rejects_duplicate_question_id() {
        let err = StoryGraph::build(
            vec![question("start", "start"), question("start", "start")],
            vec![],
            "start",
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateQuestion(id) if id == "start"));
    }

    #[test]
    fn test_build_rejects_duplicate_epilogue_id() {
        let err = StoryGraph::build(
            vec![question("start", "end")],
            vec![epilogue("end"), epilogue("end")],
            "start",
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateEpilogue(id) if id == "end"));
    }

    #[test]
    fn test_build_rejects_missing_start() {
        let err = StoryGraph::build(vec![question("q1", "end")], vec![epilogue("end")], "start")
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingStart(id) if id == "start"));
    }

    #[test]
    fn test_resolve_prefers_epilogue_on_collision() {
        // "twist" exists in both namespaces; the epilogue must win.
        let graph = StoryGraph::build(
            vec![question("start", "twist"), question("twist", "start")],
            vec![epilogue("twist")],
            "start",
        )
        .unwrap();
        assert!(matches!(graph.resolve("twist"), Resolution::Epilogue(_)));
    }

    #[test]
    fn test_resolve_unknown_id() {
        let graph =
            StoryGraph::build(vec![question("start", "nowhere")], vec![], "start").unwrap();
        assert!(matches!(graph.resolve("nowhere"), Resolution::Unknown));
        assert!(matches!(graph.resolve("start"), Resolution::Question(_)));
        assert!(!graph.has_epilogue("nowhere"));
        assert!(!graph.has_question("nowhere"));
    }
}
