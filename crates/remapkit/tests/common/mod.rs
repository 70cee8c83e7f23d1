//! A small modal editor used to drive the remapping engine in tests.
#![allow(dead_code)]
use std::collections::HashSet;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyModifiers};

use remapkit::config::RemapConfig;
use remapkit::key::{KeyToken, Tokenizer};
use remapkit::keyremap::{
    ActionDispatcher,
    EngineOptions,
    EpisodeId,
    Execution,
    TimerScheduler,
    TimerTicket,
    UndoScope,
};
use remapkit::mode::VimMode;
use remapkit::VimRemapEngine;

/// Parse keys written in Vim notation.
pub fn keys(s: &str) -> Vec<KeyToken> {
    let mut tokenizer = Tokenizer::new();
    let mut keys = tokenizer.feed(s);
    keys.append(&mut tokenizer.finish());
    keys
}

/// Build an engine from JSON configuration, failing if it has any problems.
pub fn engine(json: &str) -> VimRemapEngine {
    let config: RemapConfig = serde_json::from_str(json).unwrap();
    let (engine, diagnostics) = config.engine();
    assert_eq!(diagnostics, vec![]);
    engine
}

/// Build an engine with a short timeout.
pub fn quick_engine(json: &str) -> VimRemapEngine {
    let mut engine = engine(json);
    let options = EngineOptions { timeout: Duration::from_millis(10), ..engine.options().clone() };
    engine.set_options(options);
    engine
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Pending {
    Delete,
    Find,
    Go,
}

type Snapshot = (Vec<String>, (usize, usize));

pub struct MockEditor {
    pub lines: Vec<String>,
    pub cursor: (usize, usize),
    pub mode: VimMode,
    pending: Option<Pending>,
    count: Option<usize>,

    history: Vec<Snapshot>,
    group: Option<Snapshot>,
    grouped: bool,

    pub executed: Vec<KeyToken>,
    pub commands: Vec<(String, Vec<String>)>,
    pub failing_commands: HashSet<String>,
    pub scheduled: Vec<TimerTicket>,
    pub cancelled: Vec<EpisodeId>,
    pub scopes_begun: usize,
    pub scopes_ended: usize,
}

impl MockEditor {
    /// Create an editor whose cursor is at the `|` in `text`.
    pub fn new(text: &[&str]) -> Self {
        let mut cursor = (0, 0);
        let mut lines = vec![];

        for (i, line) in text.iter().enumerate() {
            if let Some(col) = line.chars().position(|c| c == '|') {
                cursor = (i, col);
            }

            lines.push(line.replace('|', ""));
        }

        MockEditor {
            lines,
            cursor,
            mode: VimMode::Normal,
            pending: None,
            count: None,

            history: vec![],
            group: None,
            grouped: false,

            executed: vec![],
            commands: vec![],
            failing_commands: HashSet::new(),
            scheduled: vec![],
            cancelled: vec![],
            scopes_begun: 0,
            scopes_ended: 0,
        }
    }

    /// Show the text with a `|` at the cursor.
    pub fn text(&self) -> Vec<String> {
        let mut res = self.lines.clone();
        let (line, col) = self.cursor;
        let mut chars = res[line].chars().collect::<Vec<_>>();
        chars.insert(col.min(chars.len()), '|');
        res[line] = chars.into_iter().collect();
        res
    }

    pub fn undo_steps(&self) -> usize {
        self.history.len()
    }

    pub fn last_ticket(&self) -> TimerTicket {
        *self.scheduled.last().unwrap()
    }

    fn line(&self) -> Vec<char> {
        self.lines[self.cursor.0].chars().collect()
    }

    fn set_line(&mut self, chars: Vec<char>) {
        self.lines[self.cursor.0] = chars.into_iter().collect();
    }

    fn last_col(&self) -> usize {
        self.line().len().saturating_sub(1)
    }

    fn clamp(&mut self) {
        self.cursor.1 = self.cursor.1.min(self.last_col());
    }

    /// Record the state to return to before making an edit.
    ///
    /// Edits inside an undo scope all return to where the scope began.
    fn snapshot(&mut self) {
        match &self.group {
            Some(_) if self.grouped => {},
            Some(start) => {
                self.history.push(start.clone());
                self.grouped = true;
            },
            None => self.history.push((self.lines.clone(), self.cursor)),
        }
    }

    fn word_starts(&self) -> Vec<(usize, usize)> {
        let mut starts = vec![];

        for (i, line) in self.lines.iter().enumerate() {
            let mut prev = ' ';

            for (j, c) in line.chars().enumerate() {
                if !c.is_whitespace() && prev.is_whitespace() {
                    starts.push((i, j));
                }

                prev = c;
            }
        }

        starts
    }

    /// The count typed so far in Normal mode.
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    fn key(&mut self, key: &KeyToken) -> Result<(), String> {
        match (self.mode, self.pending.take()) {
            (VimMode::Insert, _) => self.insert(key),
            (_, Some(pending)) => self.argument(pending, key),
            (_, None) => self.normal(key),
        }
    }

    fn argument(&mut self, pending: Pending, key: &KeyToken) -> Result<(), String> {
        match (pending, key.get_char()) {
            (Pending::Delete, Some('d')) => {
                self.snapshot();

                if self.lines.len() == 1 {
                    self.lines[0].clear();
                } else {
                    self.lines.remove(self.cursor.0);
                    self.cursor.0 = self.cursor.0.min(self.lines.len() - 1);
                }

                self.cursor.1 = 0;
            },
            (Pending::Delete, Some('w')) => {
                let mut line = self.line();

                if line.is_empty() {
                    return Err("Nothing to delete".into());
                }

                let cursor = self.cursor;
                let end = self
                    .word_starts()
                    .into_iter()
                    .find(|start| *start > cursor && start.0 == cursor.0)
                    .map(|start| start.1)
                    .unwrap_or(line.len());

                self.snapshot();
                line.drain(cursor.1..end);
                self.set_line(line);
                self.clamp();
            },
            (Pending::Find, Some(c)) => {
                let line = self.line();
                let found = line.iter().skip(self.cursor.1 + 1).position(|lc| *lc == c);

                match found {
                    Some(off) => self.cursor.1 += off + 1,
                    None => return Err(format!("{c:?} not found")),
                }
            },
            (Pending::Go, Some('g')) => {
                self.cursor = (0, 0);
            },
            (Pending::Go, Some('j')) => {
                if self.cursor.0 + 1 >= self.lines.len() {
                    return Err("Already on the last line".into());
                }

                self.cursor.0 += 1;
                self.clamp();
            },
            (_, _) => return Err(format!("Invalid argument {key}")),
        }

        Ok(())
    }

    fn normal(&mut self, key: &KeyToken) -> Result<(), String> {
        if key.code() == KeyCode::Esc {
            self.count = None;
            return Ok(());
        }

        let Some(c) = key.get_char() else {
            self.count = None;
            return Err(format!("Unknown key {key}"));
        };

        match (c.to_digit(10), self.count) {
            (Some(d), Some(n)) => {
                self.count = Some(n * 10 + d as usize);
                return Ok(());
            },
            (Some(d), None) if d > 0 => {
                self.count = Some(d as usize);
                return Ok(());
            },
            _ => {},
        }

        let count = self.count.take().unwrap_or(1);

        if matches!(c, 'h' | 'l' | 'j' | 'k' | 'w' | 'b' | 'x') {
            for _ in 0..count {
                self.command(c)?;
            }

            return Ok(());
        }

        self.command(c)
    }

    fn command(&mut self, c: char) -> Result<(), String> {
        match c {
            'h' => {
                if self.cursor.1 == 0 {
                    return Err("Already at the start of the line".into());
                }

                self.cursor.1 -= 1;
            },
            'l' => {
                if self.cursor.1 >= self.last_col() {
                    return Err("Already at the end of the line".into());
                }

                self.cursor.1 += 1;
            },
            'j' => {
                if self.cursor.0 + 1 >= self.lines.len() {
                    return Err("Already on the last line".into());
                }

                self.cursor.0 += 1;
                self.clamp();
            },
            'k' => {
                if self.cursor.0 == 0 {
                    return Err("Already on the first line".into());
                }

                self.cursor.0 -= 1;
                self.clamp();
            },
            'w' => {
                let cursor = self.cursor;
                let next = self.word_starts().into_iter().find(|start| *start > cursor);
                self.cursor = next.ok_or("No next word")?;
            },
            'b' => {
                let cursor = self.cursor;
                let prev = self.word_starts().into_iter().rev().find(|start| *start < cursor);
                self.cursor = prev.ok_or("No previous word")?;
            },
            '0' => self.cursor.1 = 0,
            '$' => self.cursor.1 = self.last_col(),
            'G' | 'L' => self.cursor = (self.lines.len() - 1, 0),
            'x' => {
                let mut line = self.line();

                if line.is_empty() {
                    return Err("Nothing to delete".into());
                }

                self.snapshot();
                line.remove(self.cursor.1);
                self.set_line(line);
                self.clamp();
            },
            'i' => self.mode = VimMode::Insert,
            'a' => {
                self.cursor.1 = (self.cursor.1 + 1).min(self.line().len());
                self.mode = VimMode::Insert;
            },
            'A' => {
                self.cursor.1 = self.line().len();
                self.mode = VimMode::Insert;
            },
            'I' => {
                self.cursor.1 = 0;
                self.mode = VimMode::Insert;
            },
            'o' => {
                self.snapshot();
                self.lines.insert(self.cursor.0 + 1, String::new());
                self.cursor = (self.cursor.0 + 1, 0);
                self.mode = VimMode::Insert;
            },
            'u' => {
                let (lines, cursor) = self.history.pop().ok_or("Already at oldest change")?;
                self.lines = lines;
                self.cursor = cursor;
            },
            'd' => self.pending = Some(Pending::Delete),
            'f' => self.pending = Some(Pending::Find),
            'g' => self.pending = Some(Pending::Go),
            c => return Err(format!("Unknown command {c:?}")),
        }

        Ok(())
    }

    fn insert(&mut self, key: &KeyToken) -> Result<(), String> {
        match (key.code(), key.modifiers()) {
            (KeyCode::Esc, _) => {
                self.mode = VimMode::Normal;
                self.cursor.1 = self.cursor.1.saturating_sub(1);
            },
            (KeyCode::Backspace, _) => {
                if self.cursor.1 == 0 {
                    return Err("Already at the start of the line".into());
                }

                self.snapshot();
                let mut line = self.line();
                line.remove(self.cursor.1 - 1);
                self.set_line(line);
                self.cursor.1 -= 1;
            },
            (KeyCode::Enter, _) => {
                self.snapshot();
                let line = self.line();
                let (before, after) = line.split_at(self.cursor.1);
                self.lines[self.cursor.0] = before.iter().collect();
                self.lines.insert(self.cursor.0 + 1, after.iter().collect());
                self.cursor = (self.cursor.0 + 1, 0);
            },
            (KeyCode::Char(c), KeyModifiers::NONE) => {
                self.snapshot();
                let mut line = self.line();
                line.insert(self.cursor.1, c);
                self.set_line(line);
                self.cursor.1 += 1;
            },
            _ => return Err(format!("Unknown key {key}")),
        }

        Ok(())
    }
}

impl ActionDispatcher<KeyToken, VimMode> for MockEditor {
    type Error = String;

    fn mode(&self) -> VimMode {
        match (self.mode, self.pending) {
            (VimMode::Normal, Some(_)) => VimMode::OperatorPending,
            (mode, _) => mode,
        }
    }

    fn allows_remap(&self, key: &KeyToken) -> bool {
        // A "0" after a count extends it instead of being a command.
        let counting =
            self.mode == VimMode::Normal && self.pending.is_none() && self.count.is_some();

        !(counting && key.get_char() == Some('0'))
    }

    fn execute(&mut self, keys: &[KeyToken], _: VimMode) -> Execution<String> {
        for (index, key) in keys.iter().enumerate() {
            self.executed.push(*key);

            if let Err(error) = self.key(key) {
                return Execution::Failed { index, error };
            }
        }

        Execution::Completed
    }

    fn invoke_command(&mut self, name: &str, args: &[String]) -> Result<(), String> {
        if self.failing_commands.contains(name) {
            return Err(format!("{name} is broken"));
        }

        self.commands.push((name.to_string(), args.to_vec()));

        Ok(())
    }
}

impl UndoScope for MockEditor {
    fn begin(&mut self) {
        self.scopes_begun += 1;
        self.group = Some((self.lines.clone(), self.cursor));
        self.grouped = false;
    }

    fn end(&mut self) {
        self.scopes_ended += 1;
        self.group = None;
        self.grouped = false;
    }
}

impl TimerScheduler for MockEditor {
    fn schedule(&mut self, ticket: TimerTicket) {
        self.scheduled.push(ticket);
    }

    fn cancel(&mut self, episode: EpisodeId) {
        self.cancelled.push(episode);
    }
}
