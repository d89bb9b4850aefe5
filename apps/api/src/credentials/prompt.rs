use std::io;

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input, Password};

use crate::credentials::OperatorPrompt;

const RULE_WIDTH: usize = 60;

/// Interactive prompt on the process terminal.
pub struct TerminalPrompt {
    term: Term,
    theme: ColorfulTheme,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            theme: ColorfulTheme::default(),
        }
    }

    /// Printed when the service refuses to start without a key.
    pub fn show_startup_hint(&self) -> io::Result<()> {
        self.term.write_line(&format!(
            "{}",
            style("Aplikacija se ne može pokrenuti bez valjanog OpenAI API ključa!").red()
        ))?;
        self.term.write_line(
            "Možete postaviti OPENAI_API_KEY varijablu okruženja ili pokrenuti aplikaciju ponovno.",
        )
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn to_io(err: dialoguer::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

impl OperatorPrompt for TerminalPrompt {
    fn show_banner(&mut self) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        self.term.write_line("")?;
        self.term.write_line(&rule)?;
        self.term
            .write_line(&format!("{}", style("KONFIGURACIJA OPENAI API KLJUČA").bold()))?;
        self.term.write_line(&rule)?;
        self.term
            .write_line("Za rad aplikacije potreban je OpenAI API ključ.")?;
        self.term
            .write_line("Možete ga dobiti na: https://platform.openai.com/api-keys")?;
        self.term.write_line(&format!(
            "{}",
            style("VAŽNO: API ključ se neće spremiti u datoteku!").yellow()
        ))?;
        self.term.write_line(&rule)
    }

    fn read_key(&mut self) -> io::Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt("Unesite svoj OpenAI API ključ")
            .allow_empty_password(true)
            .interact_on(&self.term)
            .map_err(to_io)
    }

    fn read_retry_answer(&mut self) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt("Želite li pokušati ponovno? (d/n)")
            .allow_empty(true)
            .interact_text_on(&self.term)
            .map_err(to_io)
    }

    fn report_error(&mut self, message: &str) -> io::Result<()> {
        self.term.write_line(&format!("{}", style(message).red()))
    }

    fn report_success(&mut self, message: &str) -> io::Result<()> {
        self.term.write_line(&format!("{}", style(message).green()))
    }
}
