use super::*;

/// Keeps a secondary `<select>` in step with a primary one.
///
/// The selector holds node references into one [`Document`] and a shared copy
/// of the [`OptionTable`]. The change subscription is an explicit resource:
/// [`start`](Self::start) installs it and [`dispose`](Self::dispose) removes it.
///
/// ```
/// use double_drop::{CascadingSelector, Document, OptionTable};
///
/// let mut doc = Document::from_html(
///     "<select id='a'><option>x</option><option>y</option></select><select id='b'></select>",
/// )?;
/// let table = OptionTable::new(vec![vec!["x1", "x2"], vec!["y1"]]);
/// let mut cascade = CascadingSelector::new(&doc, "a", "b", table)?;
/// cascade.start(&mut doc)?;
///
/// doc.select_index("#a", 0)?;
/// doc.assert_options("#b", &["x1", "x2"])?;
///
/// cascade.dispose(&mut doc);
/// doc.select_index("#a", 1)?;
/// doc.assert_options("#b", &["x1", "x2"])?;
/// # Ok::<(), double_drop::Error>(())
/// ```
#[derive(Debug)]
pub struct CascadingSelector {
    primary: NodeId,
    secondary: NodeId,
    primary_label: String,
    secondary_label: String,
    table: Rc<OptionTable>,
    subscription: Option<ListenerId>,
}

impl CascadingSelector {
    /// Resolves both controls in `document`.
    ///
    /// `primary` and `secondary` are element ids (`make`) or selectors
    /// (`#make`, `select#make`).
    ///
    /// # Errors
    ///
    /// - `ElementNotFound` if either identifier does not resolve
    /// - `TypeMismatch` if a resolved element is not a `<select>`
    /// - `OptionTableMismatch` if the primary option count differs from the
    ///   number of groups in `table`
    pub fn new(
        document: &Document,
        primary: &str,
        secondary: &str,
        table: OptionTable,
    ) -> Result<Self> {
        let primary_node = document.resolve_identifier(primary)?;
        let primary_node = document.select_node(primary_node, primary)?;
        let secondary_node = document.resolve_identifier(secondary)?;
        let secondary_node = document.select_node(secondary_node, secondary)?;

        let choices = document.dom.select_options(primary_node).len();
        if choices != table.len() {
            return Err(Error::OptionTableMismatch {
                selector: primary.to_string(),
                groups: table.len(),
                choices,
            });
        }

        Ok(Self {
            primary: primary_node,
            secondary: secondary_node,
            primary_label: document.dom.describe(primary_node),
            secondary_label: document.dom.describe(secondary_node),
            table: Rc::new(table),
            subscription: None,
        })
    }

    /// Subscribes to `change` on the primary control. Calling it again while
    /// started is a no-op.
    pub fn start(&mut self, document: &mut Document) -> Result<()> {
        if let Some(id) = self.subscription {
            debug!(
                listener = ?id,
                primary = %self.primary_label,
                "cascading selector already started"
            );
            return Ok(());
        }

        let secondary = self.secondary;
        let table = Rc::clone(&self.table);
        let handler = move |document: &mut Document, event: &ChangeEvent| -> Result<()> {
            let index = document.dom.selected_index(event.target)?;
            let mut control = document.control_for(secondary)?;
            let outcome = repopulate(&mut control, &table, index)?;
            trace!(?outcome, primary = %event.target(), "primary selection changed");
            Ok(())
        };
        let id =
            document.add_listener_to(self.primary, "change", Rc::new(RefCell::new(handler)));
        self.subscription = Some(id);

        debug!(
            listener = ?id,
            primary = %self.primary_label,
            secondary = %self.secondary_label,
            groups = self.table.len(),
            "cascading selector started"
        );
        Ok(())
    }

    /// Removes the change subscription. Returns `false` if none was installed.
    pub fn dispose(&mut self, document: &mut Document) -> bool {
        let Some(id) = self.subscription.take() else {
            return false;
        };
        let removed = document.remove_event_listener(id);
        debug!(
            listener = ?id,
            primary = %self.primary_label,
            removed,
            "cascading selector disposed"
        );
        removed
    }

    pub fn is_started(&self) -> bool {
        self.subscription.is_some()
    }

    /// Repopulates the secondary control from the current primary selection
    /// without waiting for a change event.
    pub fn refresh(&self, document: &mut Document) -> Result<Repopulated> {
        let index = document.dom.selected_index(self.primary)?;
        let mut control = document.control_for(self.secondary)?;
        repopulate(&mut control, &self.table, index)
    }

    pub fn option_table(&self) -> &OptionTable {
        &self.table
    }
}

impl Drop for CascadingSelector {
    fn drop(&mut self) {
        if let Some(id) = self.subscription {
            warn!(
                listener = ?id,
                primary = %self.primary_label,
                "cascading selector dropped while started; its listener stays installed"
            );
        }
    }
}
