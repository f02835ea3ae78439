use super::*;
use std::sync::LazyLock;

use fancy_regex::Regex;

static ELEMENT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<tag>[A-Za-z][A-Za-z0-9-]*)?(?:#(?P<id>[^\s#]+))?\s*$")
        .expect("element reference pattern is valid")
});

/// A parsed element reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElementRef {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
}

impl ElementRef {
    /// Parses selector syntax: `tag`, `#id` or `tag#id`. An id runs to the end
    /// of the reference and may hold any character but whitespace and `#`.
    pub(crate) fn parse(selector: &str) -> Result<Self> {
        let captures = ELEMENT_REF
            .captures(selector)
            .map_err(|err| Error::InvalidSelector(format!("{selector}: {err}")))?
            .ok_or_else(|| Error::InvalidSelector(selector.to_string()))?;
        let tag = captures
            .name("tag")
            .map(|m| m.as_str().to_ascii_lowercase());
        let id = captures.name("id").map(|m| m.as_str().to_string());
        if tag.is_none() && id.is_none() {
            return Err(Error::InvalidSelector(selector.to_string()));
        }
        Ok(Self { tag, id })
    }

    pub(crate) fn resolve(&self, dom: &Dom) -> Option<NodeId> {
        match (&self.id, &self.tag) {
            (Some(id), tag) => {
                let node = dom.by_id(id)?;
                match tag {
                    Some(tag) if !dom.is_tag(node, tag) => None,
                    _ => Some(node),
                }
            }
            (None, Some(tag)) => dom.first_by_tag(tag),
            (None, None) => None,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            write!(f, "{tag}")?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        Ok(())
    }
}
