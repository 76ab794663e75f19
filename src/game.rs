use std::io::{self, Write};

use anyhow::Result;
use log::{info, warn};

use crate::engine::{Engine, TransitionError};
use crate::story::Epilogue;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn show_banner() {
    println!("\n========================================");
    println!("            FANTASY GAME");
    println!("========================================");
    println!("Pick answers by number. [r] restarts, [q] quits.");
    println!("Your progress is saved; quitting mid-story resumes where you left off.\n");
}

fn show_epilogue(epilogue: Option<&Epilogue>, choices_made: usize) {
    println!("\n========================================");
    println!("              THE END");
    println!("========================================");

    match epilogue {
        Some(e) => {
            println!("  {}\n", e.title);
            println!("{}", e.text);
        }
        // Saved ending id no longer in the story content.
        None => println!("The story is over."),
    }

    println!("\n  Choices made: {choices_made}");
    println!("========================================\n");
    println!("  [r] Restart    [q] Quit\n");
}

/// Read the player's post-game choice. Returns `true` to restart, `false`
/// to quit.
fn prompt_restart() -> Result<bool> {
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        match input.trim().to_lowercase().as_str() {
            "r" => return Ok(true),
            "q" => return Ok(false),
            _ => println!("  Press [r] to restart or [q] to quit."),
        }
    }
}

/// What the player typed at a question prompt.
enum PlayerInput {
    Choice(usize),
    Restart,
    Quit,
}

fn prompt_choice(answer_count: usize) -> Result<PlayerInput> {
    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            return Ok(PlayerInput::Quit);
        }
        if input.eq_ignore_ascii_case("r") {
            return Ok(PlayerInput::Restart);
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=answer_count).contains(&n) => return Ok(PlayerInput::Choice(n - 1)),
            _ => println!("  Pick a number from 1 to {answer_count}."),
        }
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Drive the engine from the terminal: render the current node, forward the
/// chosen answer, repeat. All story logic stays inside the engine.
pub fn run(engine: &mut Engine) -> Result<()> {
    show_banner();

    loop {
        if engine.state().is_finished {
            show_epilogue(engine.final_epilogue(), engine.state().history.len());
            if !prompt_restart()? {
                println!("Thanks for playing!");
                return Ok(());
            }
            engine.reset();
            continue;
        }

        let question = match engine.current_question() {
            Some(q) => q.clone(),
            None => {
                // Saved position no longer exists in the story content.
                warn!(
                    "current question {:?} not found in graph, restarting",
                    engine.state().current_question_id
                );
                println!("The story has lost its place. Starting over.");
                engine.reset();
                continue;
            }
        };

        println!("\n{}", question.story);
        println!("\n{}", question.question_text);
        for (i, a) in question.answers.iter().enumerate() {
            println!("  [{}] {}", i + 1, a.text);
        }

        let chosen = match prompt_choice(question.answers.len())? {
            PlayerInput::Choice(i) => &question.answers[i],
            PlayerInput::Restart => {
                engine.reset();
                continue;
            }
            PlayerInput::Quit => {
                println!("See you next time.");
                return Ok(());
            }
        };

        info!("player chose \"{}\" on \"{}\"", chosen.id, question.id);

        match engine.answer(chosen) {
            Ok(_) => {}
            Err(err @ TransitionError::DanglingReference { .. }) => {
                // Content defect; stay on the current question.
                warn!("{err}");
                println!("(Nothing happens.)");
            }
            Err(err @ TransitionError::AlreadyFinished) => {
                warn!("{err}");
            }
        }
    }
}
