use super::*;

const SNIPPET_LIMIT: usize = 200;

/// Deterministic in-memory document.
///
/// Element lookups take selector syntax (`#id`, `tag`, `tag#id`). Events are
/// delivered to the listeners of the target element only, synchronously and in
/// registration order.
#[derive(Debug)]
pub struct Document {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document.
    pub fn new() -> Self {
        Self {
            dom: Dom::new(),
            listeners: ListenerStore::default(),
        }
    }

    pub fn from_html(markup: &str) -> Result<Self> {
        let dom = html::parse_html(markup)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
        })
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        html::serialize_node(&self.dom, self.dom.root, &mut out);
        out
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        let reference = ElementRef::parse(selector)?;
        reference
            .resolve(&self.dom)
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))
    }

    /// Resolves an element id, taken verbatim, or else an id-bearing
    /// reference (`#id`, `tag#id`). Anything that does not resolve is
    /// `ElementNotFound`.
    pub(crate) fn resolve_identifier(&self, identifier: &str) -> Result<NodeId> {
        if let Some(node) = self.dom.by_id(identifier) {
            return Ok(node);
        }
        let reference = ElementRef::parse(identifier)
            .ok()
            .filter(|reference| reference.id.is_some());
        match reference {
            Some(reference) => reference
                .resolve(&self.dom)
                .ok_or_else(|| Error::ElementNotFound(reference.to_string())),
            None => Err(Error::ElementNotFound(format!("#{identifier}"))),
        }
    }

    pub(crate) fn select_node(&self, node: NodeId, selector: &str) -> Result<NodeId> {
        if self.dom.is_tag(node, "select") {
            return Ok(node);
        }
        Err(Error::TypeMismatch {
            selector: selector.to_string(),
            expected: "select".into(),
            actual: self.dom.tag_name(node).unwrap_or("#text").to_string(),
        })
    }

    pub(crate) fn control_for(&mut self, node: NodeId) -> Result<SelectControl<'_>> {
        SelectControl::new(&mut self.dom, node)
    }

    /// Direct access to a `<select>` element's options, without dispatching
    /// events.
    pub fn control(&mut self, selector: &str) -> Result<SelectControl<'_>> {
        let target = self.select_one(selector)?;
        let target = self.select_node(target, selector)?;
        self.control_for(target)
    }

    pub fn options(&self, selector: &str) -> Result<Vec<SelectOption>> {
        let target = self.select_one(selector)?;
        let target = self.select_node(target, selector)?;
        Ok(self
            .dom
            .select_options(target)
            .into_iter()
            .map(|option| SelectOption {
                value: self.dom.option_value(option),
                label: self.dom.option_label(option),
            })
            .collect())
    }

    pub fn option_values(&self, selector: &str) -> Result<Vec<String>> {
        Ok(self
            .options(selector)?
            .into_iter()
            .map(|option| option.value)
            .collect())
    }

    pub fn selected_index(&self, selector: &str) -> Result<Option<usize>> {
        let target = self.select_one(selector)?;
        self.dom.selected_index(target)
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    /// Selects option `index` the way a user would, then fires `input` and
    /// `change` on the control.
    pub fn select_index(&mut self, selector: &str, index: usize) -> Result<()> {
        let target = self.select_one(selector)?;
        let target = self.select_node(target, selector)?;
        self.dom.set_selected_index(target, index)?;
        self.dispatch_event(target, "input")?;
        self.dispatch_event(target, "change")?;
        Ok(())
    }

    /// Selects the option whose value equals `value`, then fires `input` and
    /// `change`. Fails with `InvalidChoice` when no option matches.
    pub fn set_select_value(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let target = self.select_node(target, selector)?;
        if self.dom.set_select_value(target, value)?.is_none() {
            return Err(Error::InvalidChoice(format!(
                "{selector} has no option with value {value:?}"
            )));
        }
        self.dispatch_event(target, "input")?;
        self.dispatch_event(target, "change")?;
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    /// Runs the listeners registered on `target` for `event_type` and returns
    /// how many ran. The first listener error stops delivery.
    pub(crate) fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<usize> {
        let listeners = self.listeners.get(target, event_type);
        let event = ChangeEvent::new(&self.dom, event_type, target);
        trace!(
            event = event_type,
            element = %event.target_label,
            listeners = listeners.len(),
            "dispatching event"
        );

        let mut delivered = 0usize;
        for listener in &listeners {
            if !self.listeners.contains(listener.id) {
                continue;
            }
            let Ok(mut handler) = listener.handler.try_borrow_mut() else {
                warn!(
                    listener = ?listener.id,
                    "listener re-entered during its own dispatch, skipped"
                );
                continue;
            };
            (&mut *handler)(self, &event)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    pub fn add_event_listener<F>(
        &mut self,
        selector: &str,
        event: &str,
        handler: F,
    ) -> Result<ListenerId>
    where
        F: FnMut(&mut Document, &ChangeEvent) -> Result<()> + 'static,
    {
        let target = self.select_one(selector)?;
        Ok(self.add_listener_to(target, event, Rc::new(RefCell::new(handler))))
    }

    pub(crate) fn add_listener_to(
        &mut self,
        target: NodeId,
        event: &str,
        handler: runtime_state::Handler,
    ) -> ListenerId {
        let id = self.listeners.add(target, event.to_string(), handler);
        debug!(listener = ?id, event, element = %self.dom.describe(target), "listener added");
        id
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(id);
        debug!(listener = ?id, removed, "listener removed");
        removed
    }

    pub fn listener_count(&self, selector: &str, event: &str) -> Result<usize> {
        let target = self.select_one(selector)?;
        Ok(self.listeners.count(target, event))
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    /// Checks the option values of a `<select>`, in order.
    pub fn assert_options(&self, selector: &str, expected: &[&str]) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.option_values(selector)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    fn node_snippet(&self, node: NodeId) -> String {
        let mut out = String::new();
        html::serialize_node(&self.dom, node, &mut out);
        if out.chars().count() > SNIPPET_LIMIT {
            let mut truncated = out.chars().take(SNIPPET_LIMIT).collect::<String>();
            truncated.push_str("...");
            return truncated;
        }
        out
    }
}
