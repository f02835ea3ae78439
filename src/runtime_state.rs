use super::*;

pub(crate) type Handler = Rc<RefCell<dyn FnMut(&mut Document, &ChangeEvent) -> Result<()>>>;

/// Handle returned by [`Document::add_event_listener`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) handler: Handler,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    pub(crate) map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
    pub(crate) next_id: u64,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: String, handler: Handler) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default()
            .push(Listener { id, handler });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let Some((node_id, event)) = self.map.iter().find_map(|(node_id, events)| {
            events.iter().find_map(|(event, listeners)| {
                listeners
                    .iter()
                    .any(|listener| listener.id == id)
                    .then(|| (*node_id, event.clone()))
            })
        }) else {
            return false;
        };

        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        if let Some(listeners) = events.get_mut(&event) {
            listeners.retain(|listener| listener.id != id);
            if listeners.is_empty() {
                events.remove(&event);
            }
        }
        if events.is_empty() {
            self.map.remove(&node_id);
        }
        true
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.map
            .values()
            .flat_map(HashMap::values)
            .flatten()
            .any(|listener| listener.id == id)
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }
}

/// Event record handed to listeners.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) target_label: String,
}

impl ChangeEvent {
    pub(crate) fn new(dom: &Dom, event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            target_label: dom.describe(target),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// `tag#id` of the element the event was dispatched to.
    pub fn target(&self) -> &str {
        &self.target_label
    }
}
