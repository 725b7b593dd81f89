//! Prompt-and-read interaction with the user.
//!
//! Workflows take a `&mut dyn Prompt` so they can be driven from tests with a
//! [`ScriptedPrompt`] instead of the terminal.

use crate::core::error::Result;
use colored::*;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Prompt {
    /// Show `question` and return the answer line without its trailing newline
    fn ask(&mut self, question: &str) -> Result<String>;

    /// `y` or `yes` in any case confirms; anything else declines
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(question)?;
        Ok(is_yes(&answer))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Reads answers from standard input
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        print!("\n{} ", question.blue());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Answers questions from a fixed script and remembers what was asked.
/// An exhausted script answers with an empty line.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
