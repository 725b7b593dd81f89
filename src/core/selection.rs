//! Numbered multi-resource selection menu.
//!
//! [`SelectionMenu`] numbers branches, stashes and databases in one contiguous
//! sequence (branches sorted by name, stashes in stash order, databases sorted)
//! and maps a typed answer back to a [`Selection`] of typed deletion sets.

use crate::core::{
    deletion::DeletionPolicy,
    git::StashEntry,
    index_parser::IndexParser,
    print_section_header,
};
use colored::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    Branch,
    Stash,
    Database,
}

impl SelectionKind {
    pub fn heading(self) -> &'static str {
        match self {
            SelectionKind::Branch => "Branches",
            SelectionKind::Stash => "Stashes",
            SelectionKind::Database => "Databases",
        }
    }

    /// Databases stop at the first failure; branches and stashes keep going.
    pub fn deletion_policy(self) -> DeletionPolicy {
        match self {
            SelectionKind::Branch | SelectionKind::Stash => DeletionPolicy::BestEffort,
            SelectionKind::Database => DeletionPolicy::FailFast,
        }
    }
}

/// One numbered line of the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOption {
    pub ordinal: usize,
    pub kind: SelectionKind,
    /// Position in the candidate list of `kind`
    pub index: usize,
    pub label: String,
}

/// The user's choice, partitioned by kind
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    pub branches: BTreeSet<String>,
    /// Keyed by stash index so deletions can run from the highest index down
    pub stashes: BTreeMap<usize, StashEntry>,
    pub databases: BTreeSet<String>,
    /// Tokens that were not a valid ordinal
    pub ignored: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.stashes.is_empty() && self.databases.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SelectionMenu {
    branches: Vec<String>,
    stashes: Vec<StashEntry>,
    databases: Vec<String>,
    options: Vec<SelectionOption>,
}

impl SelectionMenu {
    pub fn new(
        mut branches: Vec<String>,
        stashes: Vec<StashEntry>,
        mut databases: Vec<String>,
    ) -> Self {
        branches.sort();
        databases.sort();

        let labels = branches
            .iter()
            .map(|name| (SelectionKind::Branch, name.clone()))
            .chain(
                stashes
                    .iter()
                    .map(|stash| (SelectionKind::Stash, stash.message.clone())),
            )
            .chain(
                databases
                    .iter()
                    .map(|name| (SelectionKind::Database, name.clone())),
            );

        let mut options = Vec::new();
        let mut per_kind = BTreeMap::new();
        for (ordinal, (kind, label)) in labels.enumerate() {
            let index = per_kind.entry(kind.heading()).or_insert(0usize);
            options.push(SelectionOption {
                ordinal: ordinal + 1,
                kind,
                index: *index,
                label,
            });
            *index += 1;
        }

        Self {
            branches,
            stashes,
            databases,
            options,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn options(&self) -> &[SelectionOption] {
        &self.options
    }

    pub fn print(&self) {
        let mut current: Option<SelectionKind> = None;
        for option in &self.options {
            if current != Some(option.kind) {
                print_section_header(option.kind.heading());
                current = Some(option.kind);
            }
            println!(
                "{}{}{} {}",
                "[".bright_black(),
                option.ordinal.to_string().white(),
                "]".bright_black(),
                option.label.blue()
            );
        }
        println!();
    }

    /// Map an answer such as `"1 3 4"` onto the candidates. Invalid tokens are
    /// collected in [`Selection::ignored`]; choosing an ordinal twice is a no-op.
    pub fn parse_answer(&self, answer: &str) -> Selection {
        let parsed = IndexParser::parse_lenient(answer, self.options.len());
        let mut selection = Selection {
            ignored: parsed.ignored,
            ..Selection::default()
        };

        for ordinal in parsed.indices {
            let option = &self.options[ordinal - 1];
            match option.kind {
                SelectionKind::Branch => {
                    selection
                        .branches
                        .insert(self.branches[option.index].clone());
                }
                SelectionKind::Stash => {
                    let stash = &self.stashes[option.index];
                    selection.stashes.insert(stash.index, stash.clone());
                }
                SelectionKind::Database => {
                    selection
                        .databases
                        .insert(self.databases[option.index].clone());
                }
            }
        }

        selection
    }
}
