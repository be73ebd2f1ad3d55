use async_trait::async_trait;
use gdman_core::{Confirm, UninstallPrompt};
use std::io::{BufRead, Write};

/// Asks on the terminal. `assume_yes` answers every prompt without reading
/// stdin.
pub struct TerminalConfirm {
    assume_yes: bool,
}

impl TerminalConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub async fn ask(question: String) -> bool {
    tokio::task::spawn_blocking(move || {
        print!("{} [y/N] ", question);
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_yes(&line),
            Err(_) => false,
        }
    })
    .await
    .unwrap_or(false)
}

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &UninstallPrompt) -> bool {
        if self.assume_yes {
            return true;
        }
        println!("{}", prompt.title);
        ask(prompt.message.clone()).await
    }
}
