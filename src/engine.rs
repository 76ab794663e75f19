use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{self, SessionStore};
use crate::story::{Answer, Epilogue, Question, Resolution, StoryGraph};

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// Where the player is in the story. Two reachable shapes: in-progress
/// (`current_question_id` set, not finished) and finished
/// (`final_epilogue_id` set, no current question).
///
/// Serialized field names follow the persisted wire layout
/// (`currentQuestionId` etc.); there is no version field, an unrecognized
/// shape simply fails to parse and the session starts fresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current_question_id: Option<String>,
    /// Ids of the answers chosen so far, in choice order. Append-only.
    pub history: Vec<String>,
    pub is_finished: bool,
    pub final_epilogue_id: Option<String>,
}

impl GameState {
    pub fn initial(start_question_id: &str) -> Self {
        Self {
            current_question_id: Some(start_question_id.into()),
            history: Vec::new(),
            is_finished: false,
            final_epilogue_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transition outcomes
// ---------------------------------------------------------------------------

/// A successful state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Moved to another question.
    Advanced { question_id: String },
    /// Reached an epilogue; the story is over.
    Finished { epilogue_id: String },
}

/// Rejected transitions. Neither variant mutates state; the caller decides
/// whether to log, display, or swallow them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Content defect: the answer's target matches neither namespace. The
    /// player stays on the current question.
    #[error("answer \"{answer_id}\" points at \"{target}\", which is neither a question nor an epilogue")]
    DanglingReference { answer_id: String, target: String },
    /// The story already ended; only a reset leaves the finished state.
    #[error("the story is already finished")]
    AlreadyFinished,
}

// ---------------------------------------------------------------------------
// Progression engine
// ---------------------------------------------------------------------------

/// Single source of truth for the player's position. Owns the `GameState`
/// exclusively; the presentation layer reads snapshots and dispatches
/// intents. Every mutation is written through to the injected session store
/// on a best-effort basis.
pub struct Engine {
    graph: StoryGraph,
    state: GameState,
    store: Box<dyn SessionStore>,
}

enum Resolved {
    Epilogue(String),
    Question(String),
}

impl Engine {
    /// Resumes the saved session from `store` if one exists, otherwise
    /// starts at the graph's start question.
    pub fn new(graph: StoryGraph, store: Box<dyn SessionStore>) -> Self {
        let state = session::load(store.as_ref(), graph.start_question_id());
        Self {
            graph,
            state,
            store,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The question the player is on, if in progress and the saved id still
    /// exists in the graph.
    pub fn current_question(&self) -> Option<&Question> {
        self.state
            .current_question_id
            .as_deref()
            .and_then(|id| self.graph.question(id))
    }

    /// The epilogue the story ended on, if finished.
    pub fn final_epilogue(&self) -> Option<&Epilogue> {
        self.state
            .final_epilogue_id
            .as_deref()
            .and_then(|id| self.graph.epilogue(id))
    }

    /// Apply the player's chosen answer. Trusts the caller to pass an
    /// answer belonging to the current question.
    ///
    /// Epilogues are looked up before questions, so an id shared between
    /// both namespaces finishes the story. A dangling target rejects the
    /// transition without touching state.
    pub fn answer(&mut self, answer: &Answer) -> Result<Transition, TransitionError> {
        if self.state.is_finished {
            return Err(TransitionError::AlreadyFinished);
        }

        let resolved = match self.graph.resolve(&answer.next_question_id) {
            Resolution::Epilogue(e) => Resolved::Epilogue(e.id.clone()),
            Resolution::Question(q) => Resolved::Question(q.id.clone()),
            Resolution::Unknown => {
                return Err(TransitionError::DanglingReference {
                    answer_id: answer.id.clone(),
                    target: answer.next_question_id.clone(),
                })
            }
        };

        let mut history = self.state.history.clone();
        history.push(answer.id.clone());

        match resolved {
            Resolved::Epilogue(epilogue_id) => {
                info!(
                    "transition: {:?} -> epilogue {epilogue_id} (answer {})",
                    self.state.current_question_id, answer.id
                );
                self.commit(GameState {
                    current_question_id: None,
                    history,
                    is_finished: true,
                    final_epilogue_id: Some(epilogue_id.clone()),
                });
                Ok(Transition::Finished { epilogue_id })
            }
            Resolved::Question(question_id) => {
                info!(
                    "transition: {:?} -> question {question_id} (answer {})",
                    self.state.current_question_id, answer.id
                );
                self.commit(GameState {
                    current_question_id: Some(question_id.clone()),
                    history,
                    is_finished: false,
                    final_epilogue_id: None,
                });
                Ok(Transition::Advanced { question_id })
            }
        }
    }

    /// Back to the start question with an empty history. Idempotent.
    pub fn reset(&mut self) {
        info!("game reset");
        self.commit(GameState::initial(self.graph.start_question_id()));
    }

    /// Replace the state in one assignment, then write through. Readers
    /// only ever see a fully-formed state.
    fn commit(&mut self, next: GameState) {
        self.state = next;
        session::save(self.store.as_mut(), &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, SessionStore};
    use anyhow::anyhow;

    fn answer(id: &str, next: &str) -> Answer {
        Answer {
            id: id.into(),
            text: "choice".into(),
            next_question_id: next.into(),
        }
    }

    /// start --a1--> q2 --a2--> end_good, plus a dangling a3 on q2.
    fn graph() -> StoryGraph {
        StoryGraph::build(
            vec![
                Question {
                    id: "start".into(),
                    story: "the beginning".into(),
                    question_text: "?".into(),
                    answers: vec![answer("a1", "q2")],
                },
                Question {
                    id: "q2".into(),
                    story: "the middle".into(),
                    question_text: "?".into(),
                    answers: vec![answer("a2", "end_good"), answer("a3", "nowhere")],
                },
            ],
            vec![Epilogue {
                id: "end_good".into(),
                title: "Fin".into(),
                text: "done".into(),
            }],
            "start",
        )
        .unwrap()
    }

    fn engine() -> Engine {
        Engine::new(graph(), Box::new(MemorySessionStore::default()))
    }

    #[test]
    fn test_initial_state() {
        let engine = engine();
        assert_eq!(engine.state(), &GameState::initial("start"));
        assert_eq!(engine.current_question().unwrap().id, "start");
        assert!(engine.final_epilogue().is_none());
    }

    #[test]
    fn test_advance_to_question() {
        let mut engine = engine();
        let t = engine.answer(&answer("a1", "q2")).unwrap();
        assert_eq!(
            t,
            Transition::Advanced {
                question_id: "q2".into()
            }
        );
        assert_eq!(
            engine.state(),
            &GameState {
                current_question_id: Some("q2".into()),
                history: vec!["a1".into()],
                is_finished: false,
                final_epilogue_id: None,
            }
        );
    }

    #[test]
    fn test_finish_on_epilogue() {
        let mut engine = engine();
        engine.answer(&answer("a1", "q2")).unwrap();
        let t = engine.answer(&answer("a2", "end_good")).unwrap();
        assert_eq!(
            t,
            Transition::Finished {
                epilogue_id: "end_good".into()
            }
        );
        assert_eq!(
            engine.state(),
            &GameState {
                current_question_id: None,
                history: vec!["a1".into(), "a2".into()],
                is_finished: true,
                final_epilogue_id: Some("end_good".into()),
            }
        );
        assert_eq!(engine.final_epilogue().unwrap().id, "end_good");
    }

    #[test]
    fn test_dangling_reference_leaves_state_untouched() {
        let mut engine = engine();
        engine.answer(&answer("a1", "q2")).unwrap();
        let before = engine.state().clone();

        let err = engine.answer(&answer("a3", "nowhere")).unwrap_err();
        assert_eq!(
            err,
            TransitionError::DanglingReference {
                answer_id: "a3".into(),
                target: "nowhere".into(),
            }
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_finished_is_sticky() {
        let mut engine = engine();
        engine.answer(&answer("a1", "q2")).unwrap();
        engine.answer(&answer("a2", "end_good")).unwrap();
        let finished = engine.state().clone();

        // Any answer, even one that would resolve, is rejected.
        let err = engine.answer(&answer("a1", "q2")).unwrap_err();
        assert_eq!(err, TransitionError::AlreadyFinished);
        assert_eq!(engine.state(), &finished);
    }

    #[test]
    fn test_history_records_choices_in_order() {
        let mut engine = engine();
        engine.answer(&answer("a1", "q2")).unwrap();
        engine.answer(&answer("a2", "end_good")).unwrap();
        assert_eq!(engine.state().history, vec!["a1", "a2"]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = engine();
        engine.answer(&answer("a1", "q2")).unwrap();
        engine.reset();
        let once = engine.state().clone();
        engine.reset();
        assert_eq!(engine.state(), &once);
        assert_eq!(engine.state(), &GameState::initial("start"));
    }

    #[test]
    fn test_epilogue_wins_namespace_collision() {
        // "twist" is both a question and an epilogue.
        let graph = StoryGraph::build(
            vec![
                Question {
                    id: "start".into(),
                    story: String::new(),
                    question_text: String::new(),
                    answers: vec![answer("a1", "twist")],
                },
                Question {
                    id: "twist".into(),
                    story: String::new(),
                    question_text: String::new(),
                    answers: vec![],
                },
            ],
            vec![Epilogue {
                id: "twist".into(),
                title: String::new(),
                text: String::new(),
            }],
            "start",
        )
        .unwrap();
        let mut engine = Engine::new(graph, Box::new(MemorySessionStore::default()));

        let t = engine.answer(&answer("a1", "twist")).unwrap();
        assert_eq!(
            t,
            Transition::Finished {
                epilogue_id: "twist".into()
            }
        );
    }

    #[test]
    fn test_resume_from_persisted_session() {
        let mut store = MemorySessionStore::default();
        {
            let mut engine = Engine::new(graph(), Box::new(MemorySessionStore::default()));
            engine.answer(&answer("a1", "q2")).unwrap();
            session::save(&mut store, engine.state());
        }

        let engine = Engine::new(graph(), Box::new(store));
        assert_eq!(engine.current_question().unwrap().id, "q2");
        assert_eq!(engine.state().history, vec!["a1"]);
    }

    #[test]
    fn test_engine_survives_broken_store() {
        struct BrokenStore;
        impl SessionStore for BrokenStore {
            fn read(&self, _key: &str) -> anyhow::Result<Option<String>> {
                Err(anyhow!("storage disabled"))
            }
            fn write(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
                Err(anyhow!("quota exceeded"))
            }
        }

        let mut engine = Engine::new(graph(), Box::new(BrokenStore));
        assert_eq!(engine.state(), &GameState::initial("start"));
        // Transitions keep working in memory.
        engine.answer(&answer("a1", "q2")).unwrap();
        assert_eq!(engine.current_question().unwrap().id, "q2");
    }
}
