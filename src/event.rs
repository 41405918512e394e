use crate::tag::TagValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Select,
    Add,
    Remove,
    Update,
    Replace,
    Register,
    Unregister,
}

/// Change notification carried from a series to its observers.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservableEvent {
    pub action: EventAction,
    /// Identifier of the series that produced the event.
    pub source: String,
    pub old_value: Option<TagValue>,
    pub new_value: Option<TagValue>,
}

impl ObservableEvent {
    pub fn new(action: EventAction, source: impl Into<String>) -> Self {
        Self {
            action,
            source: source.into(),
            old_value: None,
            new_value: None,
        }
    }

    pub fn with_values(mut self, old_value: Option<TagValue>, new_value: Option<TagValue>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }
}

pub trait PropertyChangeListener: Send + Sync {
    fn property_change(&self, event: &ObservableEvent);
}

impl<F> PropertyChangeListener for F
where
    F: Fn(&ObservableEvent) + Send + Sync,
{
    fn property_change(&self, event: &ObservableEvent) {
        self(event)
    }
}
