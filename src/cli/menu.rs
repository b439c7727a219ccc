//! Interactive numbered menu.
//!
//! Free-text fields are read a whole line at a time, identifiers as the
//! first token of a line. End of input leaves the menu like option 9.

use std::io::{BufRead, Write};

use colored::Colorize;

use crate::application::{format_borrowers, format_items, Catalog, OutputFormat};
use crate::domain::{AppError, Result};
use crate::infrastructure::LineGateway;

const MENU: &str = "
===== Library Management Menu =====
1. Display Books
2. Display Users
3. Add Book
4. Remove Book
5. Register User
6. Remove User
7. Borrow Book
8. Return Book
9. Exit";

/// Line-oriented prompt over any reader/writer pair.
struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}").map_err(|e| AppError::io("Failed to write output", e))
    }

    /// Prompt for a whole line. `None` at end of input.
    fn line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")
            .and_then(|()| self.output.flush())
            .map_err(|e| AppError::io("Failed to write prompt", e))?;

        let mut buf = String::new();
        let read = self
            .input
            .read_line(&mut buf)
            .map_err(|e| AppError::io("Failed to read input", e))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    /// Prompt for a single token, skipping blank lines.
    fn token(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            let Some(line) = self.line(prompt)? else {
                return Ok(None);
            };
            if let Some(token) = line.split_whitespace().next() {
                return Ok(Some(token.to_string()));
            }
        }
    }
}

/// Run the menu until the user exits or input ends.
///
/// Recoverable catalog errors are reported inline and the menu keeps
/// going. Anything else ends the session, catalog state already restored.
///
/// # Errors
/// Returns error if terminal I/O fails or a catalog operation fails for a
/// reason other than a status error.
pub fn run_menu<G, R, W>(
    catalog: &mut Catalog<G>,
    input: R,
    output: W,
    format: OutputFormat,
) -> Result<()>
where
    G: LineGateway,
    R: BufRead,
    W: Write,
{
    let mut prompt = Prompt { input, output };

    loop {
        prompt.say(MENU)?;
        let Some(choice) = prompt.line("Enter choice: ")? else {
            break;
        };

        let outcome = match choice.parse::<u8>() {
            Ok(1) => show_items(catalog, &mut prompt, format)?,
            Ok(2) => show_borrowers(catalog, &mut prompt, format)?,
            Ok(3) => add_item(catalog, &mut prompt)?,
            Ok(4) => remove_item(catalog, &mut prompt)?,
            Ok(5) => register(catalog, &mut prompt)?,
            Ok(6) => remove_borrower(catalog, &mut prompt)?,
            Ok(7) => borrow(catalog, &mut prompt)?,
            Ok(8) => return_item(catalog, &mut prompt)?,
            Ok(9) => {
                prompt.say("Exiting...")?;
                return Ok(());
            }
            _ => Step::Invalid,
        };

        match outcome {
            Step::Done(Ok(message)) => prompt.say(&format!("{} {message}", "✓".green().bold()))?,
            Step::Done(Err(e)) if e.is_recoverable() => {
                prompt.say(&format!("{} {e}", "✗".red().bold()))?;
            }
            Step::Done(Err(e)) => return Err(e),
            Step::Invalid => prompt.say("Invalid choice!")?,
            Step::Shown => {}
            Step::EndOfInput => break,
        }
    }

    Ok(())
}

/// What a menu action produced.
enum Step {
    /// Outcome of a catalog operation, with a success message.
    Done(Result<String>),
    /// A listing was printed.
    Shown,
    /// The choice was not a menu number.
    Invalid,
    /// Input ended while prompting.
    EndOfInput,
}

/// Collects prompted values, stopping at end of input.
macro_rules! ask {
    ($prompt:expr, $method:ident, $text:expr) => {
        match $prompt.$method($text)? {
            Some(value) => value,
            None => return Ok(Step::EndOfInput),
        }
    };
}

fn show_items<G: LineGateway, R: BufRead, W: Write>(
    catalog: &Catalog<G>,
    prompt: &mut Prompt<R, W>,
    format: OutputFormat,
) -> Result<Step> {
    prompt.say(&format_items(&catalog.list_items(), format)?)?;
    Ok(Step::Shown)
}

fn show_borrowers<G: LineGateway, R: BufRead, W: Write>(
    catalog: &Catalog<G>,
    prompt: &mut Prompt<R, W>,
    format: OutputFormat,
) -> Result<Step> {
    prompt.say(&format_borrowers(&catalog.list_borrowers(), format)?)?;
    Ok(Step::Shown)
}

fn add_item<G: LineGateway, R: BufRead, W: Write>(
    catalog: &mut Catalog<G>,
    prompt: &mut Prompt<R, W>,
) -> Result<Step> {
    let title = ask!(prompt, line, "Enter title: ");
    let author = ask!(prompt, line, "Enter author: ");
    let id = ask!(prompt, token, "Enter ISBN: ");

    Ok(Step::Done(
        catalog
            .add_item(&title, &author, &id)
            .map(|()| "Book added successfully!".to_string()),
    ))
}

fn remove_item<G: LineGateway, R: BufRead, W: Write>(
    catalog: &mut Catalog<G>,
    prompt: &mut Prompt<R, W>,
) -> Result<Step> {
    let id = ask!(prompt, token, "Enter ISBN to remove: ");

    Ok(Step::Done(
        catalog
            .remove_item(&id)
            .map(|_| "Book removed successfully!".to_string()),
    ))
}

fn register<G: LineGateway, R: BufRead, W: Write>(
    catalog: &mut Catalog<G>,
    prompt: &mut Prompt<R, W>,
) -> Result<Step> {
    let id = ask!(prompt, token, "Enter user ID: ");
    let name = ask!(prompt, line, "Enter name: ");

    Ok(Step::Done(
        catalog
            .register_borrower(&id, &name)
            .map(|()| "User registered successfully!".to_string()),
    ))
}

fn remove_borrower<G: LineGateway, R: BufRead, W: Write>(
    catalog: &mut Catalog<G>,
    prompt: &mut Prompt<R, W>,
) -> Result<Step> {
    let id = ask!(prompt, token, "Enter user ID to remove: ");

    Ok(Step::Done(
        catalog
            .remove_borrower(&id)
            .map(|_| "User removed successfully!".to_string()),
    ))
}

fn borrow<G: LineGateway, R: BufRead, W: Write>(
    catalog: &mut Catalog<G>,
    prompt: &mut Prompt<R, W>,
) -> Result<Step> {
    let borrower = ask!(prompt, token, "Enter user ID: ");
    let item = ask!(prompt, token, "Enter ISBN: ");

    Ok(Step::Done(
        catalog
            .borrow_item(&borrower, &item)
            .map(|()| "Book borrowed successfully!".to_string()),
    ))
}

fn return_item<G: LineGateway, R: BufRead, W: Write>(
    catalog: &mut Catalog<G>,
    prompt: &mut Prompt<R, W>,
) -> Result<Step> {
    let borrower = ask!(prompt, token, "Enter user ID: ");
    let item = ask!(prompt, token, "Enter ISBN: ");

    Ok(Step::Done(
        catalog
            .return_item(&borrower, &item)
            .map(|()| "Book returned successfully!".to_string()),
    ))
}
