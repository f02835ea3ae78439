use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
}

/// Node arena rooted at a document node.
///
/// Nodes are never freed. Detaching a node only unlinks it, so ids stay valid
/// and `by_id` skips anything no longer reachable from the root. A `<select>`
/// has no stored value: it is read from its options every time.
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    ids: HashMap<String, Vec<NodeId>>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                node_type: NodeType::Document,
            }],
            root: NodeId(0),
            ids: HashMap::new(),
        }
    }

    fn push(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(node);
        }
        node
    }

    /// Adds an element under `parent`, or detached when `parent` is `None`.
    pub(crate) fn create_element(
        &mut self,
        parent: Option<NodeId>,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let id = attrs.get("id").cloned();
        let node = self.push(parent, NodeType::Element(Element { tag_name, attrs }));
        if let Some(id) = id {
            self.ids.entry(id).or_default().push(node);
        }
        node
    }

    pub(crate) fn create_text(&mut self, parent: Option<NodeId>, text: String) -> NodeId {
        self.push(parent, NodeType::Text(text))
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes.get(node.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag_name.as_str())
    }

    pub(crate) fn is_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag_name(node)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub(crate) fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attrs.get(name).map(String::as_str)
    }

    fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |current| self.parent(*current))
    }

    /// Nodes below `node` in document order, `node` excluded.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = self.children(node).iter().rev().copied().collect::<Vec<_>>();
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.children(next).iter().rev());
        }
        out
    }

    fn is_connected(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).any(|ancestor| ancestor == self.root)
    }

    /// First connected element carrying `id`, in creation order.
    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.ids
            .get(id)?
            .iter()
            .copied()
            .find(|node| self.is_connected(*node))
    }

    pub(crate) fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.is_tag(*node, tag))
    }

    fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].node_type {
            NodeType::Text(text) => text.clone(),
            _ => self
                .descendants(node)
                .into_iter()
                .filter_map(|child| match &self.nodes[child.0].node_type {
                    NodeType::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Moves `child` to the end of `parent`'s children.
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if parent == child || self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(Error::Dom(format!(
                "cannot append {} inside itself",
                self.describe(child)
            )));
        }
        if let Some(previous) = self.parent(child) {
            self.nodes[previous.0].children.retain(|node| *node != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detaches every child of `node` and returns how many there were.
    pub(crate) fn clear_children(&mut self, node: NodeId) -> usize {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        children.len()
    }

    fn ensure_select(&self, node: NodeId) -> Result<()> {
        match self.tag_name(node) {
            Some(tag) if tag.eq_ignore_ascii_case("select") => Ok(()),
            Some(tag) => Err(Error::TypeMismatch {
                selector: self.describe(node),
                expected: "select".into(),
                actual: tag.to_string(),
            }),
            None => Err(Error::Dom(format!("{} is not an element", self.describe(node)))),
        }
    }

    /// `<option>` elements of a select, including those inside `<optgroup>`.
    pub(crate) fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|node| self.is_tag(*node, "option"))
            .collect()
    }

    /// The last option marked `selected`, else the first option.
    pub(crate) fn selected_index(&self, select: NodeId) -> Result<Option<usize>> {
        self.ensure_select(select)?;
        let options = self.select_options(select);
        if options.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            options
                .iter()
                .rposition(|option| self.attr(*option, "selected").is_some())
                .unwrap_or(0),
        ))
    }

    pub(crate) fn set_selected_index(&mut self, select: NodeId, index: usize) -> Result<()> {
        self.ensure_select(select)?;
        let options = self.select_options(select);
        if index >= options.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: options.len(),
            });
        }
        self.mark_selected(&options, index);
        Ok(())
    }

    /// Selects the first option whose value equals `requested` in NFC. Nothing
    /// changes when no option matches.
    pub(crate) fn set_select_value(
        &mut self,
        select: NodeId,
        requested: &str,
    ) -> Result<Option<usize>> {
        self.ensure_select(select)?;
        let requested = requested.nfc().collect::<String>();
        let options = self.select_options(select);
        let matched = options
            .iter()
            .position(|option| self.option_value(*option).nfc().eq(requested.chars()));
        if let Some(index) = matched {
            self.mark_selected(&options, index);
        }
        Ok(matched)
    }

    fn mark_selected(&mut self, options: &[NodeId], index: usize) {
        for (position, option) in options.iter().enumerate() {
            if let Some(element) = self.element_mut(*option) {
                if position == index {
                    element.attrs.insert("selected".into(), String::new());
                } else {
                    element.attrs.remove("selected");
                }
            }
        }
    }

    /// The `value` attribute, or the label when there is none.
    pub(crate) fn option_value(&self, option: NodeId) -> String {
        match self.attr(option, "value") {
            Some(value) => value.to_string(),
            None => self.option_label(option),
        }
    }

    /// Text content with whitespace runs collapsed and the ends trimmed, as
    /// `HTMLOptionElement.text` reports it.
    pub(crate) fn option_label(&self, option: NodeId) -> String {
        self.text_content(option)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A select reports its selected option's value; other elements report
    /// their `value` attribute.
    pub(crate) fn value(&self, node: NodeId) -> Result<String> {
        if self.is_tag(node, "select") {
            let options = self.select_options(node);
            return Ok(self
                .selected_index(node)?
                .map(|index| self.option_value(options[index]))
                .unwrap_or_default());
        }
        match self.element(node) {
            Some(element) => Ok(element.attrs.get("value").cloned().unwrap_or_default()),
            None => Err(Error::Dom(format!("{} has no value", self.describe(node)))),
        }
    }

    /// `tag#id`, `tag`, `#text` or `#document`.
    pub(crate) fn describe(&self, node: NodeId) -> String {
        match &self.nodes[node.0].node_type {
            NodeType::Element(element) => match element.attrs.get("id") {
                Some(id) => format!("{}#{id}", element.tag_name),
                None => element.tag_name.clone(),
            },
            NodeType::Text(_) => "#text".to_string(),
            NodeType::Document => "#document".to_string(),
        }
    }
}
