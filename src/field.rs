use super::*;

use std::fmt::Write as _;

/// Joins a main and a sub value into one stored value, `main>>>sub` with the
/// default separator.
pub fn compress(main: &str, sub: &str, separator: &str) -> String {
    format!("{main}{separator}{sub}")
}

/// Splits a stored value at the first `separator`. An empty value has neither
/// part; a value without a separator only has a main part.
pub fn decompress(value: &str, separator: &str) -> (Option<String>, Option<String>) {
    if value.is_empty() {
        return (None, None);
    }
    match value.split_once(separator) {
        Some((main, sub)) => (Some(main.to_string()), Some(sub.to_string())),
        None => (Some(value.to_string()), None),
    }
}

/// Form field backed by two selects: a main choice and a sub choice that
/// depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleDropField {
    choices: Choices,
    config: WidgetConfig,
}

impl DoubleDropField {
    pub fn new(choices: Choices) -> Self {
        Self {
            choices,
            config: WidgetConfig::default(),
        }
    }

    /// Parses choice text such as `one(),two(A,B,C),three`.
    pub fn parse(text: &str) -> Self {
        Self::new(Choices::parse(text))
    }

    pub fn with_config(text: &str, config: WidgetConfig) -> Result<Self> {
        config.validate()?;
        let choices = Choices::parse_with_placeholder(text, &config.placeholder);
        Ok(Self { choices, config })
    }

    pub fn choices(&self) -> &Choices {
        &self.choices
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn option_table(&self) -> OptionTable {
        self.choices.option_table()
    }

    pub fn compress(&self, main: &str, sub: &str) -> String {
        compress(main, sub, &self.config.separator)
    }

    pub fn decompress(&self, value: &str) -> (Option<String>, Option<String>) {
        decompress(value, &self.config.separator)
    }

    /// Validates a submitted pair and returns the stored value.
    ///
    /// The main value must be one of the main choices and the sub value one of
    /// its sub choices. Comparison is done in NFC; the stored value uses the
    /// spelling from the choice text.
    pub fn clean(&self, main: &str, sub: &str) -> Result<String> {
        if main.is_empty() {
            return Err(Error::InvalidChoice("main choice is required".into()));
        }
        let Some((main_name, subs)) = self
            .choices
            .position(main)
            .and_then(|index| self.choices.get(index))
        else {
            return Err(Error::InvalidChoice(format!(
                "{main:?} is not one of the main choices"
            )));
        };

        let wanted = sub.nfc().collect::<String>();
        let sub_name = subs
            .iter()
            .find(|candidate| candidate.nfc().eq(wanted.chars()))
            .ok_or_else(|| {
                Error::InvalidChoice(format!(
                    "{sub:?} is not one of the choices for {main_name:?}"
                ))
            })?;

        Ok(self.compress(main_name, sub_name))
    }

    /// Renders both selects. `value` is a stored value; the secondary select
    /// lists the sub choices of its main part, or of the first main choice
    /// when there is no value or the main part is unknown.
    pub fn render(&self, name: &str, value: Option<&str>, id: &str) -> String {
        let (main, sub) = value.map(|value| self.decompress(value)).unwrap_or_default();
        let main_index = main.as_deref().and_then(|main| self.choices.position(main));

        let subs = main_index
            .and_then(|index| self.choices.get(index))
            .or_else(|| self.choices.first())
            .map(|(_, subs)| subs)
            .unwrap_or_default();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "<select id=\"{}_0\" name=\"{}_0\">",
            html::escape_html(id),
            html::escape_html(name)
        );
        for (index, main_choice) in self.choices.main_choices().enumerate() {
            push_option(&mut out, main_choice, Some(index) == main_index);
        }
        out.push_str("</select>\n");

        let _ = writeln!(
            out,
            "<select id=\"{}_1\" name=\"{}_1\">",
            html::escape_html(id),
            html::escape_html(name)
        );
        for sub_choice in subs {
            let selected = main_index.is_some() && sub.as_deref() == Some(sub_choice.as_str());
            push_option(&mut out, sub_choice, selected);
        }
        out.push_str("</select>\n");
        out
    }

    /// Binds the selects rendered under `id` in `document`.
    pub fn bind(&self, document: &Document, id: &str) -> Result<CascadingSelector> {
        CascadingSelector::new(
            document,
            &format!("{id}_0"),
            &format!("{id}_1"),
            self.option_table(),
        )
    }
}

fn push_option(out: &mut String, text: &str, selected: bool) {
    let escaped = html::escape_html(text);
    let selected = if selected { " selected" } else { "" };
    let _ = writeln!(out, "  <option value=\"{escaped}\"{selected}>{escaped}</option>");
}
