use super::*;

/// One entry of a selection control.
///
/// For a DOM-backed control, `label` is the option's text with whitespace
/// runs collapsed and the ends trimmed, as `HTMLOptionElement.text` reports
/// it. `value` is never altered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// An option whose value and label are the same string.
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: text.clone(),
            label: text,
        }
    }
}

/// Explicit access to a selection control's option set.
pub trait SelectionControlHandle {
    /// Options in display order. Labels may be normalized by the control,
    /// see [`SelectOption`].
    fn options(&self) -> Vec<SelectOption>;

    /// `None` when the control has no options.
    fn selected_index(&self) -> Option<usize>;

    /// Removes every option.
    fn clear(&mut self) -> Result<()>;

    /// Appends an option after the existing ones.
    fn append(&mut self, value: &str, label: &str) -> Result<()>;
}

/// Outcome of [`repopulate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repopulated {
    /// The control now holds group `index`, which has `len` entries.
    Group { index: usize, len: usize },
    /// The selected index has no group; the control was left empty.
    OutOfRange { index: usize, groups: usize },
    /// The primary control had no selection; the control was left empty.
    NoSelection,
}

/// Replaces the options of `control` with group `index` of `table`.
///
/// The control is always cleared first. An index without a group, or no index
/// at all, leaves it empty instead of failing.
pub fn repopulate<C>(
    control: &mut C,
    table: &OptionTable,
    index: Option<usize>,
) -> Result<Repopulated>
where
    C: SelectionControlHandle + ?Sized,
{
    control.clear()?;

    let Some(index) = index else {
        trace!("primary control has no selection, secondary left empty");
        return Ok(Repopulated::NoSelection);
    };
    let Some(group) = table.group(index) else {
        warn!(
            index,
            groups = table.len(),
            "selected index has no option group, secondary left empty"
        );
        return Ok(Repopulated::OutOfRange {
            index,
            groups: table.len(),
        });
    };

    for entry in group {
        control.append(entry, entry)?;
    }
    trace!(index, len = group.len(), "secondary control repopulated");
    Ok(Repopulated::Group {
        index,
        len: group.len(),
    })
}

/// A `<select>` element inside a [`Document`].
#[derive(Debug)]
pub struct SelectControl<'a> {
    dom: &'a mut Dom,
    node: NodeId,
}

impl<'a> SelectControl<'a> {
    pub(crate) fn new(dom: &'a mut Dom, node: NodeId) -> Result<Self> {
        if !dom.is_tag(node, "select") {
            return Err(Error::TypeMismatch {
                selector: dom.describe(node),
                expected: "select".into(),
                actual: dom.tag_name(node).unwrap_or("#text").to_string(),
            });
        }
        Ok(Self { dom, node })
    }

    /// Current value of the control, `""` when empty.
    pub fn value(&self) -> String {
        self.dom.value(self.node).unwrap_or_default()
    }

    pub fn select_index(&mut self, index: usize) -> Result<()> {
        self.dom.set_selected_index(self.node, index)
    }
}

impl SelectionControlHandle for SelectControl<'_> {
    fn options(&self) -> Vec<SelectOption> {
        self.dom
            .select_options(self.node)
            .into_iter()
            .map(|option| SelectOption {
                value: self.dom.option_value(option),
                label: self.dom.option_label(option),
            })
            .collect()
    }

    fn selected_index(&self) -> Option<usize> {
        self.dom.selected_index(self.node).ok().flatten()
    }

    fn clear(&mut self) -> Result<()> {
        let removed = self.dom.clear_children(self.node);
        trace!(select = %self.dom.describe(self.node), removed, "cleared select");
        Ok(())
    }

    fn append(&mut self, value: &str, label: &str) -> Result<()> {
        let attrs = HashMap::from([("value".to_string(), value.to_string())]);
        let option = self.dom.create_element(None, "option".to_string(), attrs);
        if !label.is_empty() {
            self.dom.create_text(Some(option), label.to_string());
        }
        self.dom.append_child(self.node, option)
    }
}

/// In-memory selection control, for driving [`repopulate`] without a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionList {
    options: Vec<SelectOption>,
    selected: Option<usize>,
}

impl OptionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: values.into_iter().map(SelectOption::same).collect(),
            selected: None,
        }
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.options.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.options.len(),
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn values(&self) -> Vec<&str> {
        self.options.iter().map(|option| option.value.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl SelectionControlHandle for OptionList {
    fn options(&self) -> Vec<SelectOption> {
        self.options.clone()
    }

    fn selected_index(&self) -> Option<usize> {
        if self.options.is_empty() {
            return None;
        }
        Some(self.selected.unwrap_or(0))
    }

    fn clear(&mut self) -> Result<()> {
        self.options.clear();
        self.selected = None;
        Ok(())
    }

    fn append(&mut self, value: &str, label: &str) -> Result<()> {
        self.options.push(SelectOption {
            value: value.to_string(),
            label: label.to_string(),
        });
        Ok(())
    }
}
