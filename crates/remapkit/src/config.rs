//! # Remapping configuration
//!
//! ## Overview
//!
//! This module contains [RemapConfig], a snapshot of the user's remapping settings that can be
//! deserialized with [serde], and the code for validating it and turning it into tables.
//!
//! Each mode has two lists of remappings: one for recursive remappings
//! (`normalModeKeyBindings`) and one for non-recursive remappings
//! (`normalModeKeyBindingsNonRecursive`). Entries look like:
//!
//! ```json
//! { "before": ["<leader>", "w"], "after": ["<C-w>", "w"] }
//! { "before": ["Z", "Z"], "commands": [":wq", { "command": "save", "args": ["all"] }] }
//! ```
//!
//! Every string in `before` and `after` holds one or more keys in Vim's key notation. A string
//! that is a key name on its own, like `"space"` or `"C-w"`, is read as that key, and `"leader"`
//! stands for the configured leader key.
//!
//! Problems with individual entries don't prevent the rest of the configuration from loading.
//! The entry is left out of the tables, and a [ConfigDiagnostic] describes what was wrong.
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use keyremap::{EngineOptions, RemapAction, RemapCommand, RemapMode, Remapping};

use crate::key::parse::parse_mapping_str;
use crate::key::{KeyError, KeyToken};
use crate::mode::VimMode;
use crate::{VimConfigProvider, VimRemapEngine, VimRemapTables};

const MODIFIER_WORDS: [(&str, &str); 5] =
    [("ctrl+", "C-"), ("shift+", "S-"), ("alt+", "A-"), ("meta+", "M-"), ("cmd+", "D-")];

fn default_leader() -> String {
    String::from("\\")
}

/// A command to run from a remapping.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum CommandSpec {
    /// A command that takes no arguments.
    Name(String),

    /// A command with arguments.
    Full {
        /// The command's name.
        command: String,

        /// Arguments to pass to the command.
        #[serde(default)]
        args: Vec<String>,
    },
}

impl CommandSpec {
    /// Convert this into the command run by the engine.
    pub fn to_command(&self) -> RemapCommand {
        match self {
            CommandSpec::Name(name) => RemapCommand::new(name.as_str()),
            CommandSpec::Full { command, args } => {
                RemapCommand::with_args(command.as_str(), args.clone())
            },
        }
    }
}

/// A single configured remapping.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct RemapDefinition {
    /// The keys that trigger this remapping.
    #[serde(default)]
    pub before: Vec<String>,

    /// The keys to use instead.
    #[serde(default)]
    pub after: Option<Vec<String>>,

    /// The commands to run instead.
    #[serde(default)]
    pub commands: Option<Vec<CommandSpec>>,
}

/// How serious a [ConfigDiagnostic] is.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DiagnosticLevel {
    /// The entry was skipped, but is otherwise valid.
    Warning,

    /// The entry is malformed.
    Error,
}

/// A problem found while building remapping tables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigDiagnostic {
    /// How serious the problem is.
    pub level: DiagnosticLevel,

    /// The mode whose remappings had the problem, if it's specific to one.
    pub mode: Option<VimMode>,

    /// A description of the problem.
    pub message: String,
}

impl ConfigDiagnostic {
    fn new(level: DiagnosticLevel, mode: Option<VimMode>, message: String) -> Self {
        warn!(?level, ?mode, problem = %message, "Invalid remapping configuration");

        ConfigDiagnostic { level, mode, message }
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };

        match self.mode {
            Some(mode) => write!(f, "{level}: {mode} mode: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

/// The user's remapping settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemapConfig {
    /// The key that `<leader>` stands for.
    pub leader: String,

    /// How long to wait for more keys, in milliseconds, when keys match a remapping that a
    /// longer remapping could extend.
    pub timeout: u64,

    /// How many remappings can be applied in a row without any action being executed.
    pub max_map_depth: usize,

    /// How many remappings a chain can apply before it's treated as an endless loop.
    pub max_chain_length: usize,

    /// Whether to also stop waiting for more keys when they only partially match.
    pub timeout_incomplete: bool,

    /// Recursive Insert mode remappings.
    pub insert_mode_key_bindings: Vec<RemapDefinition>,
    /// Non-recursive Insert mode remappings.
    pub insert_mode_key_bindings_non_recursive: Vec<RemapDefinition>,
    /// Recursive Normal mode remappings.
    pub normal_mode_key_bindings: Vec<RemapDefinition>,
    /// Non-recursive Normal mode remappings.
    pub normal_mode_key_bindings_non_recursive: Vec<RemapDefinition>,
    /// Recursive Visual mode remappings.
    pub visual_mode_key_bindings: Vec<RemapDefinition>,
    /// Non-recursive Visual mode remappings.
    pub visual_mode_key_bindings_non_recursive: Vec<RemapDefinition>,
    /// Recursive Operator-pending mode remappings.
    pub operator_pending_mode_key_bindings: Vec<RemapDefinition>,
    /// Non-recursive Operator-pending mode remappings.
    pub operator_pending_mode_key_bindings_non_recursive: Vec<RemapDefinition>,
    /// Recursive Command-line mode remappings.
    pub command_line_mode_key_bindings: Vec<RemapDefinition>,
    /// Non-recursive Command-line mode remappings.
    pub command_line_mode_key_bindings_non_recursive: Vec<RemapDefinition>,
}

impl Default for RemapConfig {
    fn default() -> Self {
        RemapConfig {
            leader: default_leader(),
            timeout: 1000,
            max_map_depth: 1000,
            max_chain_length: 100_000,
            timeout_incomplete: false,

            insert_mode_key_bindings: vec![],
            insert_mode_key_bindings_non_recursive: vec![],
            normal_mode_key_bindings: vec![],
            normal_mode_key_bindings_non_recursive: vec![],
            visual_mode_key_bindings: vec![],
            visual_mode_key_bindings_non_recursive: vec![],
            operator_pending_mode_key_bindings: vec![],
            operator_pending_mode_key_bindings_non_recursive: vec![],
            command_line_mode_key_bindings: vec![],
            command_line_mode_key_bindings_non_recursive: vec![],
        }
    }
}

impl RemapConfig {
    /// The engine options described by this configuration.
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            timeout: Duration::from_millis(self.timeout),
            max_map_depth: self.max_map_depth,
            timeout_incomplete: self.timeout_incomplete,
            max_chain_length: self.max_chain_length,
        }
    }

    /// The keys that `<leader>` stands for.
    pub fn leader_keys(&self) -> Result<Vec<KeyToken>, KeyError> {
        let keys = parse_element(self.leader.as_str(), &[])?;

        if keys.is_empty() {
            return Err(KeyError::EmptyKey);
        }

        Ok(keys)
    }

    /// The configured remappings for a mode.
    pub fn bindings(&self, mode: VimMode, recursive: bool) -> &[RemapDefinition] {
        let list = match (mode.remap_scope(), recursive) {
            (VimMode::Insert, true) => &self.insert_mode_key_bindings,
            (VimMode::Insert, false) => &self.insert_mode_key_bindings_non_recursive,
            (VimMode::Visual, true) => &self.visual_mode_key_bindings,
            (VimMode::Visual, false) => &self.visual_mode_key_bindings_non_recursive,
            (VimMode::OperatorPending, true) => &self.operator_pending_mode_key_bindings,
            (VimMode::OperatorPending, false) => {
                &self.operator_pending_mode_key_bindings_non_recursive
            },
            (VimMode::CommandLine, true) => &self.command_line_mode_key_bindings,
            (VimMode::CommandLine, false) => &self.command_line_mode_key_bindings_non_recursive,
            (_, true) => &self.normal_mode_key_bindings,
            (_, false) => &self.normal_mode_key_bindings_non_recursive,
        };

        list.as_slice()
    }

    /// Validate the configured remappings, and build tables from the valid ones.
    ///
    /// When the same keys are remapped more than once in a list, the last entry is used. The
    /// recursive list of a mode is read before its non-recursive list, so keys remapped in both
    /// keep the recursive remapping, and the non-recursive entry is reported as a duplicate.
    pub fn build(&self) -> (VimRemapTables, Vec<ConfigDiagnostic>) {
        let mut tables = VimRemapTables::new();
        let mut diagnostics = vec![];

        let leader = match self.leader_keys() {
            Ok(keys) => keys,
            Err(e) => {
                let msg = format!("Invalid leader key {:?}: {e}", self.leader);
                diagnostics.push(ConfigDiagnostic::new(DiagnosticLevel::Error, None, msg));

                vec![KeyToken::from('\\')]
            },
        };

        for mode in VimMode::CONFIGURABLE {
            for recursive in [true, false] {
                for def in self.bindings(mode, recursive).iter().rev() {
                    let remap = match remapping(def, leader.as_slice(), recursive) {
                        Ok(remap) => remap,
                        Err(msg) => {
                            let msg = format!("{:?}: {msg}", def.before);
                            let diag = ConfigDiagnostic::new(DiagnosticLevel::Error, Some(mode), msg);
                            diagnostics.push(diag);
                            continue;
                        },
                    };

                    let duplicate = tables.pair(mode).map_or(false, |pair| {
                        pair.recursive.lookup_exact(remap.before()).is_some() ||
                            pair.nonrecursive.lookup_exact(remap.before()).is_some()
                    });

                    if duplicate {
                        let msg = format!("Duplicate remapped key for {}", remap.describe());
                        let diag = ConfigDiagnostic::new(DiagnosticLevel::Warning, Some(mode), msg);
                        diagnostics.push(diag);
                        continue;
                    }

                    if let Err(e) = tables.insert(mode, remap) {
                        let diag =
                            ConfigDiagnostic::new(DiagnosticLevel::Error, Some(mode), e.to_string());
                        diagnostics.push(diag);
                    }
                }
            }
        }

        (tables, diagnostics)
    }

    /// Build new tables from this configuration, and give them to `provider`.
    pub fn reload(&self, provider: &VimConfigProvider) -> Vec<ConfigDiagnostic> {
        let (tables, diagnostics) = self.build();
        provider.swap(tables);
        diagnostics
    }

    /// Create an engine that uses this configuration.
    pub fn engine(&self) -> (VimRemapEngine, Vec<ConfigDiagnostic>) {
        let (tables, diagnostics) = self.build();
        let engine = VimRemapEngine::from_tables(tables, self.options());

        (engine, diagnostics)
    }
}

fn remapping(
    def: &RemapDefinition,
    leader: &[KeyToken],
    recursive: bool,
) -> Result<Remapping<KeyToken>, String> {
    let before = parse_keys(def.before.as_slice(), leader)
        .map_err(|e| format!("Invalid 'before' keys: {e}"))?;

    let action = match (&def.after, &def.commands) {
        (Some(_), Some(_)) => return Err("Remapping has both 'after' and 'commands'".into()),
        (None, None) => return Err("Missing 'after' key or 'commands'".into()),
        (Some(after), None) => {
            let after = parse_keys(after.as_slice(), leader)
                .map_err(|e| format!("Invalid 'after' keys: {e}"))?;

            RemapAction::Keys(after)
        },
        (None, Some(cmds)) => {
            RemapAction::Commands(cmds.iter().map(CommandSpec::to_command).collect())
        },
    };

    Remapping::new(before, action, recursive).map_err(|e| e.to_string())
}

fn parse_keys(elements: &[String], leader: &[KeyToken]) -> Result<Vec<KeyToken>, KeyError> {
    let mut keys = vec![];

    for element in elements {
        keys.extend(parse_element(element.as_str(), leader)?);
    }

    Ok(keys)
}

/// Rewrite modifier words like `ctrl+x` into key notation like `C-x`.
fn expand_modifier_words(element: &str) -> String {
    let mut rest = element;
    let mut res = String::new();

    'words: loop {
        for (word, prefix) in MODIFIER_WORDS {
            let matched = rest.get(..word.len()).map_or(false, |w| w.eq_ignore_ascii_case(word));

            if matched && rest.len() > word.len() {
                res.push_str(prefix);
                rest = &rest[word.len()..];
                continue 'words;
            }
        }

        break;
    }

    res.push_str(rest);
    res
}

fn parse_element(element: &str, leader: &[KeyToken]) -> Result<Vec<KeyToken>, KeyError> {
    if element.is_empty() {
        return Err(KeyError::EmptyKey);
    }

    if element.eq_ignore_ascii_case("leader") {
        return Ok(leader.to_vec());
    }

    if element.chars().count() > 1 && !element.contains('<') {
        let bracketed = format!("<{}>", expand_modifier_words(element));

        if let Ok(key) = bracketed.parse::<KeyToken>() {
            return Ok(vec![key]);
        }
    }

    match parse_mapping_str(element, leader) {
        Ok((_, keys)) => Ok(keys),
        Err(_) => Err(KeyError::InvalidKey(element.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    fn keys(s: &str) -> Vec<KeyToken> {
        parse_element(s, &[key!(' ')]).unwrap()
    }

    fn def(before: &[&str], after: &[&str]) -> RemapDefinition {
        RemapDefinition {
            before: before.iter().map(ToString::to_string).collect(),
            after: Some(after.iter().map(ToString::to_string).collect()),
            commands: None,
        }
    }

    #[test]
    fn test_parse_element() {
        assert_eq!(keys("j"), vec![key!('j')]);
        assert_eq!(keys("jj"), vec![key!('j'), key!('j')]);
        assert_eq!(keys("<C-w>"), vec![ctl!('w')]);
        assert_eq!(keys("C-w"), vec![ctl!('w')]);
        assert_eq!(keys("ctrl+w"), vec![ctl!('w')]);
        assert_eq!(keys("Alt+x"), vec![key!(KeyCode::Char('x'), crossterm::event::KeyModifiers::ALT)]);
        assert_eq!(keys("esc"), vec![key!(KeyCode::Esc)]);
        assert_eq!(keys("space"), vec![key!(' ')]);
        assert_eq!(keys("leader"), vec![key!(' ')]);
        assert_eq!(keys("<leader>w"), vec![key!(' '), key!('w')]);
        assert_eq!(keys("<"), vec![key!('<')]);
        assert_eq!(keys("+"), vec![key!('+')]);
        assert_eq!(parse_element("", &[]), Err(KeyError::EmptyKey));
    }

    #[test]
    fn test_defaults() {
        let config = RemapConfig::default();
        assert_eq!(config.leader, "\\");
        assert_eq!(config.leader_keys().unwrap(), vec![key!('\\')]);
        assert_eq!(config.options(), EngineOptions::default());

        let (tables, diagnostics) = config.build();
        assert!(tables.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_bindings_lists() {
        let mut config = RemapConfig::default();
        config.visual_mode_key_bindings_non_recursive.push(def(&["x"], &["d"]));

        assert_eq!(config.bindings(VimMode::Visual, false).len(), 1);
        assert_eq!(config.bindings(VimMode::VisualBlock, false).len(), 1);
        assert_eq!(config.bindings(VimMode::Visual, true).len(), 0);
        assert_eq!(config.bindings(VimMode::Normal, false).len(), 0);
    }

    #[test]
    fn test_leader_substitution() {
        let mut config = RemapConfig::default();
        config.leader = String::from("<Space>");
        config.normal_mode_key_bindings.push(def(&["<leader>", "w"], &["leader"]));

        let (tables, diagnostics) = config.build();
        assert!(diagnostics.is_empty());

        let pair = tables.pair(VimMode::Normal).unwrap();
        let remap = pair.recursive.lookup_exact(&[key!(' '), key!('w')]).unwrap();
        assert_eq!(remap.action(), &RemapAction::Keys(vec![key!(' ')]));
    }

    #[test]
    fn test_invalid_leader() {
        let mut config = RemapConfig::default();
        config.leader = String::new();
        config.normal_mode_key_bindings.push(def(&["<leader>"], &["x"]));

        let (tables, diagnostics) = config.build();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, DiagnosticLevel::Error);
        assert_eq!(diagnostics[0].mode, None);

        let pair = tables.pair(VimMode::Normal).unwrap();
        assert!(pair.recursive.lookup_exact(&[key!('\\')]).is_some());
    }

    #[test]
    fn test_validation() {
        let mut config = RemapConfig::default();
        config.normal_mode_key_bindings.push(RemapDefinition {
            before: vec!["a".into()],
            after: Some(vec!["b".into()]),
            commands: Some(vec![CommandSpec::Name("save".into())]),
        });
        config.normal_mode_key_bindings.push(RemapDefinition {
            before: vec!["c".into()],
            after: None,
            commands: None,
        });
        config.normal_mode_key_bindings.push(def(&[], &["x"]));
        config.normal_mode_key_bindings.push(def(&["ok"], &["x"]));

        let (tables, diagnostics) = config.build();
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.iter().all(|d| d.level == DiagnosticLevel::Error));
        assert!(diagnostics.iter().all(|d| d.mode == Some(VimMode::Normal)));

        let pair = tables.pair(VimMode::Normal).unwrap();
        assert_eq!(pair.recursive.len(), 1);
        assert!(pair.recursive.lookup_exact(&[key!('o'), key!('k')]).is_some());
    }

    #[test]
    fn test_duplicates() {
        let mut config = RemapConfig::default();
        config.insert_mode_key_bindings.push(def(&["j", "j"], &["<Esc>"]));
        config.insert_mode_key_bindings.push(def(&["jj"], &["<Esc>", "l"]));
        config.insert_mode_key_bindings_non_recursive.push(def(&["j", "j"], &["x"]));

        let (tables, diagnostics) = config.build();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.level == DiagnosticLevel::Warning));
        assert_eq!(diagnostics[0].to_string(), "warning: Insert mode: Duplicate remapped key for jj");

        // The last recursive entry wins.
        let pair = tables.pair(VimMode::Insert).unwrap();
        assert!(pair.nonrecursive.is_empty());

        let remap = pair.recursive.lookup_exact(&[key!('j'), key!('j')]).unwrap();
        assert_eq!(remap.action(), &RemapAction::Keys(vec![key!(KeyCode::Esc), key!('l')]));
    }

    #[test]
    fn test_recursive_list_read_first() {
        let mut config = RemapConfig::default();
        config.normal_mode_key_bindings.push(def(&["Q"], &["x"]));
        config.normal_mode_key_bindings_non_recursive.push(def(&["Q"], &["d", "d"]));

        let (tables, diagnostics) = config.build();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, DiagnosticLevel::Warning);
        assert_eq!(diagnostics[0].mode, Some(VimMode::Normal));

        let pair = tables.pair(VimMode::Normal).unwrap();
        assert!(pair.nonrecursive.is_empty());

        let remap = pair.recursive.lookup_exact(&[key!('Q')]).unwrap();
        assert!(remap.is_recursive());
        assert_eq!(remap.action(), &RemapAction::Keys(vec![key!('x')]));
    }

    #[test]
    fn test_commands() {
        let mut config = RemapConfig::default();
        config.normal_mode_key_bindings_non_recursive.push(RemapDefinition {
            before: vec!["Z".into(), "Z".into()],
            after: None,
            commands: Some(vec![
                CommandSpec::Name(":wq".into()),
                CommandSpec::Full { command: "save".into(), args: vec!["all".into()] },
            ]),
        });

        let (tables, diagnostics) = config.build();
        assert!(diagnostics.is_empty());

        let pair = tables.pair(VimMode::Normal).unwrap();
        let remap = pair.nonrecursive.lookup_exact(&[key!('Z'), key!('Z')]).unwrap();
        assert_eq!(
            remap.action(),
            &RemapAction::Commands(vec![
                RemapCommand::new(":wq"),
                RemapCommand::with_args("save", vec!["all".into()]),
            ])
        );
    }
}
