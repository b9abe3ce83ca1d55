//! Navigation entries and their storable projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::instruction::ViewportInstruction;
use crate::queue::RequestId;

/// What to navigate to: a path in the instruction grammar, or instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    Path(String),
    Viewports(Vec<ViewportInstruction>),
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction::Path(String::new())
    }
}

impl From<&str> for Instruction {
    fn from(path: &str) -> Self {
        Instruction::Path(path.to_string())
    }
}

/// The part of an entry that is persisted in history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredEntry {
    pub instruction: Instruction,
    pub full_state_instruction: Option<String>,
    pub index: Option<usize>,
    pub first_entry: bool,
    pub path: Option<String>,
    pub title: Option<String>,
    pub query: Option<String>,
    pub parameters: BTreeMap<String, String>,
    pub parameter_list: Vec<String>,
    pub data: Option<serde_json::Value>,
    pub repeating: bool,
}

/// An entry while it is being navigated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationEntry {
    pub instruction: Instruction,
    pub full_state_instruction: Option<String>,
    pub index: Option<usize>,
    pub first_entry: bool,
    pub path: Option<String>,
    pub title: Option<String>,
    pub query: Option<String>,
    pub parameters: BTreeMap<String, String>,
    pub parameter_list: Vec<String>,
    pub data: Option<serde_json::Value>,
    pub repeating: bool,

    // Round-local, never persisted.
    pub from_browser: bool,
    pub replacing: bool,
    pub refreshing: bool,
    pub untracked: bool,
    pub history_movement: isize,
}

impl NavigationEntry {
    pub fn new(instruction: impl Into<Instruction>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Default::default()
        }
    }

    /// Strip the round-local fields.
    pub fn to_storable(&self) -> StoredEntry {
        StoredEntry {
            instruction: self.instruction.clone(),
            full_state_instruction: self.full_state_instruction.clone(),
            index: self.index,
            first_entry: self.first_entry,
            path: self.path.clone(),
            title: self.title.clone(),
            query: self.query.clone(),
            parameters: self.parameters.clone(),
            parameter_list: self.parameter_list.clone(),
            data: self.data.clone(),
            repeating: self.repeating,
        }
    }
}

impl From<StoredEntry> for NavigationEntry {
    fn from(stored: StoredEntry) -> Self {
        Self {
            instruction: stored.instruction,
            full_state_instruction: stored.full_state_instruction,
            index: stored.index,
            first_entry: stored.first_entry,
            path: stored.path,
            title: stored.title,
            query: stored.query,
            parameters: stored.parameters,
            parameter_list: stored.parameter_list,
            data: stored.data,
            repeating: stored.repeating,
            ..Default::default()
        }
    }
}

/// How a round relates to the existing history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationFlags {
    pub first: bool,
    pub new: bool,
    pub refresh: bool,
    pub forward: bool,
    pub back: bool,
    pub replace: bool,
}

/// A dequeued entry handed to the router.
#[derive(Debug, Clone)]
pub struct NavigationInstruction {
    pub id: RequestId,
    pub entry: NavigationEntry,
    pub navigation: NavigationFlags,
    pub previous: Option<StoredEntry>,
}
