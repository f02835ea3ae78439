use super::*;

use serde::{Deserialize, Serialize};

/// Group `i` holds the secondary options shown while primary index `i` is
/// selected. Each entry is used as both value and label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionTable {
    groups: Vec<Vec<String>>,
}

impl OptionTable {
    pub fn new<G, S>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|group| group.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Reads a JSON array of string arrays, e.g. `[["Ford","BMW"],["Toyota"]]`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::Config(format!("option table: {err}")))
    }

    pub fn to_json(&self) -> String {
        serde_json::Value::from(self.groups.clone()).to_string()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, index: usize) -> Option<&[String]> {
        self.groups.get(index).map(Vec::as_slice)
    }

    pub fn try_group(&self, index: usize) -> Result<&[String]> {
        self.group(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.groups.len(),
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &[String]> {
        self.groups.iter().map(Vec::as_slice)
    }
}

/// Ordered main choice -> sub choices map, as written in choice text such as
/// `one(),two(A,B,C),three`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choices {
    entries: Vec<(String, Vec<String>)>,
}

impl Choices {
    /// Parses choice text with the default `---` placeholder.
    pub fn parse(text: &str) -> Self {
        Self::parse_with_placeholder(text, DEFAULT_PLACEHOLDER)
    }

    /// Parses comma separated main choices, each optionally followed by a
    /// parenthesized, comma separated sub list.
    ///
    /// Entries are trimmed and empty entries are skipped. A main choice that
    /// ends up with no sub choices gets the single `placeholder` entry. A main
    /// choice defined twice keeps its first position and its last sub list.
    /// A sub list with no main name before it belongs to the previous bare main
    /// choice, or is dropped when there is none. A trailing empty entry is
    /// skipped too, so `two(A,B,)` gives `[A, B]` and never adds a
    /// placeholder after `B`.
    pub fn parse_with_placeholder(text: &str, placeholder: &str) -> Self {
        let mut builder = ChoicesBuilder::default();
        let mut read = String::new();
        let mut in_sub_list = false;

        for ch in text.chars() {
            match ch {
                '(' if !in_sub_list => {
                    in_sub_list = true;
                    let name = read.trim();
                    if !name.is_empty() {
                        builder.start_main(name);
                    }
                    read.clear();
                }
                ')' if in_sub_list => {
                    in_sub_list = false;
                    builder.push_sub(read.trim());
                    builder.current = None;
                    read.clear();
                }
                ',' => {
                    let entry = read.trim();
                    if in_sub_list {
                        builder.push_sub(entry);
                    } else if !entry.is_empty() {
                        builder.start_main(entry);
                    }
                    read.clear();
                }
                _ => read.push(ch),
            }
        }

        let entry = read.trim();
        if in_sub_list {
            builder.push_sub(entry);
        } else if !entry.is_empty() {
            builder.start_main(entry);
        }

        builder.finish(placeholder)
    }

    /// Rebuilds choice text that a form builder split on commas, then parses
    /// it. `["two(A", "B", "C)"]` is read as `two(A,B,C)`.
    pub fn from_fragments<I, S>(fragments: I, placeholder: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = fragments
            .into_iter()
            .map(|fragment| fragment.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::parse_with_placeholder(&text, placeholder)
    }

    pub fn from_pairs<I, M, G, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (M, G)>,
        M: Into<String>,
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(main, subs)| (main.into(), subs.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(main, subs)| (main.as_str(), subs.as_slice()))
    }

    pub fn main_choices(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(main, _)| main.as_str())
    }

    pub fn get(&self, index: usize) -> Option<(&str, &[String])> {
        self.entries
            .get(index)
            .map(|(main, subs)| (main.as_str(), subs.as_slice()))
    }

    pub fn first(&self) -> Option<(&str, &[String])> {
        self.get(0)
    }

    /// Position of `main`, compared in NFC.
    pub fn position(&self, main: &str) -> Option<usize> {
        let wanted = main.nfc().collect::<String>();
        self.entries
            .iter()
            .position(|(name, _)| name.nfc().eq(wanted.chars()))
    }

    pub fn sub_choices(&self, main: &str) -> Option<&[String]> {
        self.position(main)
            .and_then(|index| self.get(index))
            .map(|(_, subs)| subs)
    }

    pub fn option_table(&self) -> OptionTable {
        OptionTable {
            groups: self.entries.iter().map(|(_, subs)| subs.clone()).collect(),
        }
    }
}

#[derive(Default)]
struct ChoicesBuilder {
    entries: Vec<(String, Vec<String>)>,
    current: Option<usize>,
}

impl ChoicesBuilder {
    fn start_main(&mut self, name: &str) {
        let index = match self.entries.iter().position(|(main, _)| main == name) {
            Some(index) => {
                self.entries[index].1.clear();
                index
            }
            None => {
                self.entries.push((name.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        self.current = Some(index);
    }

    fn push_sub(&mut self, entry: &str) {
        if entry.is_empty() {
            return;
        }
        match self.current {
            Some(index) => self.entries[index].1.push(entry.to_string()),
            None => trace!(entry, "sub choice without a main choice dropped"),
        }
    }

    fn finish(mut self, placeholder: &str) -> Choices {
        for (_, subs) in &mut self.entries {
            if subs.is_empty() {
                subs.push(placeholder.to_string());
            }
        }
        Choices {
            entries: self.entries,
        }
    }
}
