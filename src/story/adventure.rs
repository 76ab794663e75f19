use crate::story::graph::{GraphError, StoryGraph};
use crate::story::node::{Answer, Epilogue, Question};

// ---------------------------------------------------------------------------
// Built-in adventure: the dungeons of Ravenmoor Keep
// ---------------------------------------------------------------------------

fn answer(id: &str, text: &str, next: &str) -> Answer {
    Answer {
        id: id.into(),
        text: text.into(),
        next_question_id: next.into(),
    }
}

/// The shipped story. Roughly three to four choices from the cell to an
/// ending, with one good, one grim, and one ambiguous epilogue.
pub fn ravenmoor_keep() -> Result<StoryGraph, GraphError> {
    let questions = vec![
        Question {
            id: "start".into(),
            story: "You wake on cold stone in a torchlit cell beneath Ravenmoor Keep. \
                    Your head throbs and your sword is gone. The cell door, strangely, \
                    hangs ajar."
                .into(),
            question_text: "What do you do?".into(),
            answers: vec![
                answer("slip_out", "Slip quietly into the corridor", "corridor"),
                answer("search_cell", "Search the cell first", "search_cell"),
            ],
        },
        Question {
            id: "search_cell".into(),
            story: "Behind a loose stone you find a rusted dagger and a copper coin \
                    stamped with a raven. Footsteps echo somewhere above."
                .into(),
            question_text: "Take them?".into(),
            answers: vec![
                answer("take_all", "Pocket both and head out", "corridor"),
                answer(
                    "leave_dagger",
                    "Leave the dagger; a blade marks you as an escapee",
                    "corridor",
                ),
            ],
        },
        Question {
            id: "corridor".into(),
            story: "The corridor splits. Stairs climb toward lamplight and low voices. \
                    To your right, a drain grate breathes the stink of the sewers."
                .into(),
            question_text: "Which way?".into(),
            answers: vec![
                answer("take_stairs", "Up the stairs", "guard_room"),
                answer("take_drain", "Down through the drain", "sewers"),
            ],
        },
        Question {
            id: "guard_room".into(),
            story: "A lone guard dozes at a table, an iron key ring hanging on the wall \
                    behind him. His halberd rests against his chair."
                .into(),
            question_text: "How do you get past?".into(),
            answers: vec![
                answer("sneak_keys", "Lift the keys without waking him", "courtyard"),
                answer("rush_guard", "Rush him before he wakes", "end_caught"),
            ],
        },
        Question {
            id: "sewers".into(),
            story: "Knee-deep in black water you meet an old smuggler poling a skiff. \
                    \"The grates to the river are a maze,\" she says. \"I know the way \
                    out. Come along, if you can pay.\""
                .into(),
            question_text: "Trust her?".into(),
            answers: vec![
                answer("trust_smuggler", "Board the skiff", "river_gate"),
                answer("go_alone", "Wade on alone", "end_lost"),
            ],
        },
        Question {
            id: "courtyard".into(),
            story: "The courtyard at dusk. A hay wagon creaks toward the open gate, and \
                    the outer wall is rough enough to climb. Guards chat by the \
                    gatehouse."
                .into(),
            question_text: "Your move?".into(),
            answers: vec![
                answer("hide_wagon", "Burrow into the hay wagon", "end_free"),
                answer("climb_wall", "Climb the wall in plain dusk", "end_caught"),
            ],
        },
        Question {
            id: "river_gate".into(),
            story: "The skiff noses up to a rusted river gate. The smuggler holds out \
                    her palm. \"Payment. That raven coin will do, or the blade.\""
                .into(),
            question_text: "Pay her?".into(),
            answers: vec![
                answer("pay_coin", "Hand over the raven coin", "end_free"),
                answer("refuse_pay", "Refuse and jump for the gate", "end_lost"),
            ],
        },
    ];

    let epilogues = vec![
        Epilogue {
            id: "end_free".into(),
            title: "Free Air".into(),
            text: "By morning the keep is a grey smudge behind you. Ravenmoor will \
                   remember your empty cell for a long time; you intend to be far away \
                   while it does."
                .into(),
        },
        Epilogue {
            id: "end_caught".into(),
            title: "Back in Irons".into(),
            text: "The alarm bell is the last free sound you hear. This time the cell \
                   door is locked, twice, and someone has fixed the loose stone."
                .into(),
        },
        Epilogue {
            id: "end_lost".into(),
            title: "The Dark Below".into(),
            text: "The tunnels turn and turn again. Long after the torch gutters out \
                   you are still walking, and the keep above forgets it ever held you."
                .into(),
        },
    ];

    StoryGraph::build(questions, epilogues, "start")
}
