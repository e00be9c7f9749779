//! Column role resolution.
//!
//! Every chart asks for a few semantic columns (a label, a value, a
//! grouping category). Each role is described by a [`RoleRule`]: an ordered
//! alias list, an optional primitive-type probe and a final fallback. Rules
//! are evaluated against the first record only, and resolution never fails;
//! a poor guess is still a column name.

use crate::data::{Record, Value};

/// Semantic role a column plays in a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Label,
    Value,
    Category,
}

/// Primitive type probed when no alias matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
}

impl ValueKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            ValueKind::Text => value.is_text(),
            ValueKind::Number => value.is_number(),
        }
    }
}

/// Last resort when neither aliases nor the type probe find a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Column at this index (clamped to the last column)
    Position(usize),
    /// Whatever an earlier rule resolved for this role
    Role(ColumnRole),
}

#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub role: ColumnRole,
    pub aliases: &'static [&'static str],
    pub kind: Option<ValueKind>,
    pub fallback: Fallback,
}

/// Resolved role → column assignments for one render
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnMapping {
    columns: Vec<(ColumnRole, String)>,
}

impl ColumnMapping {
    /// Column resolved for `role`, or the empty string if no rule asked for it
    pub fn get(&self, role: ColumnRole) -> &str {
        self.columns
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, c)| c.as_str())
            .unwrap_or("")
    }
}

/// Resolve every rule against the first record, in rule order
pub fn resolve_columns(first: &Record, rules: &[RoleRule]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    for rule in rules {
        let column = find_alias(first, rule.aliases)
            .or_else(|| rule.kind.and_then(|kind| find_by_kind(first, kind)))
            .unwrap_or_else(|| match rule.fallback {
                Fallback::Position(index) => column_at(first, index),
                Fallback::Role(role) if mapping.columns.iter().any(|(r, _)| *r == role) => {
                    mapping.get(role).to_string()
                }
                Fallback::Role(_) => column_at(first, 0),
            });
        mapping.columns.push((rule.role, column));
    }
    mapping
}

/// First alias (in preference order) present as a column
pub fn find_alias(first: &Record, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find(|alias| first.get(alias).is_some())
        .map(|alias| alias.to_string())
}

/// First column (in declaration order) whose value has the given type
pub fn find_by_kind(first: &Record, kind: ValueKind) -> Option<String> {
    first
        .iter()
        .find(|(_, value)| kind.matches(value))
        .map(|(name, _)| name.to_string())
}

fn column_at(first: &Record, index: usize) -> String {
    let columns: Vec<&str> = first.columns().collect();
    match columns.get(index).or_else(|| columns.last()) {
        Some(name) => name.to_string(),
        None => String::new(),
    }
}
