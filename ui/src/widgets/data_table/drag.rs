//! Column drag-reorder state machine.

/// Idle until a drag handle starts moving; Dragging carries the source
/// column key until a drop or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(String),
}

impl DragState {
    pub fn begin(&mut self, key: &str) {
        *self = Self::Dragging(key.to_owned());
    }

    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    pub fn dragging(&self) -> Option<&str> {
        match self {
            Self::Dragging(key) => Some(key),
            Self::Idle => None,
        }
    }

    /// Drops the dragged column onto `target`: the source is removed from
    /// `order` and reinserted immediately before the target's current
    /// position. Returns whether the order changed. No-op when idle or when
    /// source and target are the same column.
    pub fn drop_on(&mut self, target: &str, order: &mut Vec<String>) -> bool {
        let Self::Dragging(source) = std::mem::take(self) else {
            return false;
        };
        if source == target {
            return false;
        }
        let Some(from) = order.iter().position(|k| *k == source) else {
            return false;
        };
        order.remove(from);
        let Some(to) = order.iter().position(|k| *k == target) else {
            order.insert(from, source);
            return false;
        };
        order.insert(to, source);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| (*k).to_owned()).collect()
    }

    #[test]
    fn dropping_reinserts_before_the_target() {
        let mut drag = DragState::default();
        let mut columns = order(&["title", "description", "amount"]);

        drag.begin("amount");
        assert!(drag.drop_on("title", &mut columns));
        assert_eq!(columns, order(&["amount", "title", "description"]));
        assert_eq!(drag, DragState::Idle);
    }

    #[test]
    fn dropping_on_self_is_a_noop() {
        let mut drag = DragState::default();
        let mut columns = order(&["title", "amount"]);

        drag.begin("amount");
        assert!(!drag.drop_on("amount", &mut columns));
        assert_eq!(columns, order(&["title", "amount"]));
        assert_eq!(drag, DragState::Idle);
    }

    #[test]
    fn dropping_without_an_active_drag_is_a_noop() {
        let mut drag = DragState::default();
        let mut columns = order(&["title", "amount"]);
        assert!(!drag.drop_on("title", &mut columns));
        assert_eq!(columns, order(&["title", "amount"]));
    }

    #[test]
    fn unknown_target_restores_the_order() {
        let mut drag = DragState::default();
        let mut columns = order(&["title", "amount"]);
        drag.begin("amount");
        assert!(!drag.drop_on("ghost", &mut columns));
        assert_eq!(columns, order(&["title", "amount"]));
    }
}
