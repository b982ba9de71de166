//! Terminal chat surface and line-based form input

use super::ChatSurface;
use crate::conversation::Role;
use crate::planning::{ClarificationPlan, FocusArea, LearningGoal};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, IsTerminal, Write};

/// Writes the conversation to stdout and errors to stderr
#[derive(Debug, Default)]
pub struct TerminalSurface {
    streaming: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn label(role: Role) -> &'static str {
        match role {
            Role::User => "you",
            Role::Assistant => "tutor",
        }
    }
}

impl ChatSurface for TerminalSurface {
    fn render_message(&mut self, role: Role, content: &str) {
        // the terminal already echoed what the user typed
        if role == Role::Assistant {
            println!("{}> {}", Self::label(role), content);
        }
    }

    fn render_fragment(&mut self, fragment: &str) {
        let mut stdout = io::stdout().lock();
        if !self.streaming {
            self.streaming = true;
            let _ = write!(stdout, "{}> ", Self::label(Role::Assistant));
        }
        let _ = write!(stdout, "{}", fragment);
        let _ = stdout.flush();
    }

    fn finish_stream(&mut self) {
        if std::mem::take(&mut self.streaming) {
            println!();
        }
    }

    fn render_error(&mut self, text: &str) {
        eprintln!("error: {}", text);
    }

    fn render_notice(&mut self, text: &str) {
        println!("-- {}", text);
    }

    fn render_planning_prompt(&mut self, question: &str) {
        println!();
        println!("### Detected New Topic: '{}'", question);
        println!("To give you the best explanation, let's clarify your learning goal.");
    }
}

/// Where `LineInput` reads answers and writes option lists
///
/// `Ok(None)` from a read means the input reached end of file.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Read a value that must not be echoed back
    fn read_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.read_line(prompt)
    }

    /// Record a line so it can be recalled later
    fn add_history(&mut self, _line: &str) {}
}

/// Interactive terminal input with line editing and history
pub struct Readline {
    editor: DefaultEditor,
}

impl Readline {
    pub fn new() -> io::Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| io::Error::other(format!("failed to initialize readline: {}", e)))?;
        Ok(Self { editor })
    }
}

impl LineSource for Readline {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => return Ok(Some(line)),
                // Ctrl+C abandons the current line only
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    return Ok(None);
                }
                Err(ReadlineError::Io(e)) => return Err(e),
                Err(e) => return Err(io::Error::other(format!("readline error: {}", e))),
            }
        }
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        // Raw mode needs a terminal; piped input is read as an ordinary line
        if !io::stdin().is_terminal() {
            return self.read_line(prompt);
        }
        read_hidden(prompt)
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

/// Plain reader/writer pair, used for piped input and in tests
pub struct BufferedLines<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> BufferedLines<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> LineSource for BufferedLines<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", text)
    }
}

/// What one key press does to a hidden entry
#[derive(Debug, PartialEq, Eq)]
enum SecretStep {
    Continue,
    Submit,
    Cancel,
}

fn apply_secret_key(buffer: &mut String, key: &KeyEvent) -> SecretStep {
    if key.kind == KeyEventKind::Release {
        return SecretStep::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => SecretStep::Submit,
        KeyCode::Char('c' | 'd') if ctrl => SecretStep::Cancel,
        KeyCode::Esc => SecretStep::Cancel,
        KeyCode::Backspace => {
            buffer.pop();
            SecretStep::Continue
        }
        KeyCode::Char(c) if !ctrl => {
            buffer.push(c);
            SecretStep::Continue
        }
        _ => SecretStep::Continue,
    }
}

/// Read one line in raw mode without echoing it
///
/// Cancelling (Ctrl+C, Ctrl+D, Esc) returns `None`.
fn read_hidden(prompt: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;

    terminal::enable_raw_mode()?;
    let mut buffer = String::new();
    let outcome = loop {
        let step = match event::read() {
            Ok(Event::Key(key)) => apply_secret_key(&mut buffer, &key),
            Ok(_) => SecretStep::Continue,
            Err(e) => {
                let _ = terminal::disable_raw_mode();
                return Err(e);
            }
        };
        match step {
            SecretStep::Continue => {}
            SecretStep::Submit => break Some(buffer),
            SecretStep::Cancel => break None,
        }
    };
    terminal::disable_raw_mode()?;
    writeln!(stdout)?;

    Ok(outcome)
}

/// Form prompts over any [`LineSource`]
pub struct LineInput<S> {
    source: S,
}

impl LineInput<Readline> {
    /// Interactive terminal input
    pub fn terminal() -> io::Result<Self> {
        Ok(Self::new(Readline::new()?))
    }
}

impl<S: LineSource> LineInput<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Ask for one line of free text
    pub fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.source.read_line(prompt)
    }

    /// Ask for a value that is not echoed, such as an API key
    pub fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.source.read_secret(prompt)
    }

    /// Make `line` available for recall at later prompts
    pub fn remember(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.source.add_history(line);
        }
    }

    fn list_options(&mut self, options: &[&str]) -> io::Result<()> {
        for (i, option) in options.iter().enumerate() {
            self.source.write_line(&format!("  {}. {}", i + 1, option))?;
        }
        Ok(())
    }

    /// Pick any number of options by 1-based index, comma or space separated
    ///
    /// Out-of-range and non-numeric entries are ignored; a blank answer
    /// selects nothing.
    pub fn choose_many(&mut self, prompt: &str, options: &[&str]) -> io::Result<Option<Vec<usize>>> {
        self.source.write_line(prompt)?;
        self.list_options(options)?;

        let Some(answer) = self.prompt_line("Select (e.g. 1,3), or press Enter to skip: ")? else {
            return Ok(None);
        };

        let mut picked: Vec<usize> = answer
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|part| part.trim().parse::<usize>().ok())
            .filter(|n| (1..=options.len()).contains(n))
            .map(|n| n - 1)
            .collect();
        picked.sort_unstable();
        picked.dedup();
        Ok(Some(picked))
    }

    /// Pick exactly one option by 1-based index, re-asking on bad input
    ///
    /// A blank answer picks `default`.
    pub fn choose_one(
        &mut self,
        prompt: &str,
        options: &[&str],
        default: usize,
    ) -> io::Result<Option<usize>> {
        self.source.write_line(prompt)?;
        self.list_options(options)?;

        loop {
            let Some(answer) = self.prompt_line(&format!("Select one [{}]: ", default + 1))? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => self.source.write_line(&format!(
                    "Please enter a number between 1 and {}.",
                    options.len()
                ))?,
            }
        }
    }

    /// Run the planning form
    pub fn collect_plan(&mut self) -> io::Result<Option<ClarificationPlan>> {
        let focus_labels: Vec<&str> = FocusArea::ALL.iter().map(|f| f.label()).collect();
        let Some(picked) = self.choose_many(
            "1. Focus Area: What specific part of this topic do you want to cover?",
            &focus_labels,
        )?
        else {
            return Ok(None);
        };
        let Some(other) = self.prompt_line("   Other? Please type here (optional): ")? else {
            return Ok(None);
        };

        let goal_labels: Vec<&str> = LearningGoal::ALL.iter().map(|g| g.label()).collect();
        let Some(goal) = self.choose_one(
            "2. Learning Goal: How do you need to use this information?",
            &goal_labels,
            0,
        )?
        else {
            return Ok(None);
        };

        let Some(confusion) =
            self.prompt_line("3. Prior Knowledge: Any confusion? (e.g. I don't get how...): ")?
        else {
            return Ok(None);
        };

        let plan = picked
            .into_iter()
            .fold(ClarificationPlan::new(LearningGoal::ALL[goal]), |plan, i| {
                plan.with_focus(FocusArea::ALL[i])
            })
            .with_other(other)
            .with_confusion(confusion);

        Ok(Some(plan))
    }
}
