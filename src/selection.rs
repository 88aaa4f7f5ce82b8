//! Selection state for suggestion lists and picker grids.
//!
//! The controller knows nothing about the input surface. Arrow keys, a
//! gamepad or scripted input all reduce to [`SelectionController::move_next`],
//! [`SelectionController::move_previous`] and [`SelectionController::commit`].

use std::fmt;

/// Receives focus changes so a view can repaint only the affected items
pub trait FocusObserver: Send {
    /// Called with the previous and the new focused index whenever they differ
    fn focus_changed(&mut self, previous: Option<usize>, current: Option<usize>);
}

impl<F> FocusObserver for F
where
    F: FnMut(Option<usize>, Option<usize>) + Send,
{
    fn focus_changed(&mut self, previous: Option<usize>, current: Option<usize>) {
        self(previous, current)
    }
}

/// What [`SelectionController::commit_with`] does when nothing is focused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Only a focused item can be committed
    #[default]
    FocusedOnly,
    /// Commit the only candidate when the list has exactly one
    SoleCandidate,
    /// Commit the first candidate (tab-completion behaviour)
    FirstCandidate,
}

/// Tracks the focused item of a candidate list.
///
/// The focus is either `None` or a valid index into the current items. Every
/// list replacement resets it to `None`.
pub struct SelectionController<T> {
    items: Vec<T>,
    focused: Option<usize>,
    observer: Option<Box<dyn FocusObserver>>,
}

impl<T> Default for SelectionController<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            focused: None,
            observer: None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SelectionController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionController")
            .field("items", &self.items)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl<T> SelectionController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: impl FocusObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Focus as a signed index, `-1` meaning nothing is focused
    pub fn focused_index(&self) -> isize {
        self.focused.map_or(-1, |i| i as isize)
    }

    pub fn focused_item(&self) -> Option<&T> {
        self.focused.and_then(|i| self.items.get(i))
    }

    /// Replaces the candidate list and clears the focus
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.set_focus(None);
    }

    /// Empties the candidate list (closes the dropdown)
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Moves focus down, wrapping from the last item to the first.
    /// From no focus it lands on the first item.
    pub fn move_next(&mut self) {
        let count = self.items.len();
        if count == 0 {
            return;
        }
        let next = match self.focused {
            None => 0,
            Some(i) => (i + 1) % count,
        };
        self.set_focus(Some(next));
    }

    /// Moves focus up, wrapping from the first item to the last.
    /// From no focus it lands on the last item.
    pub fn move_previous(&mut self) {
        let count = self.items.len();
        if count == 0 {
            return;
        }
        let previous = match self.focused {
            None | Some(0) => count - 1,
            Some(i) => i - 1,
        };
        self.set_focus(Some(previous));
    }

    /// Takes the focused item and closes the list.
    /// Does nothing and returns `None` when no item is focused.
    pub fn commit(&mut self) -> Option<T> {
        self.commit_with(CommitPolicy::FocusedOnly)
    }

    /// Like [`SelectionController::commit`], with an explicit fallback for the
    /// no-focus case.
    pub fn commit_with(&mut self, policy: CommitPolicy) -> Option<T> {
        let index = self.focused.or(match policy {
            CommitPolicy::FocusedOnly => None,
            CommitPolicy::SoleCandidate if self.items.len() == 1 => Some(0),
            CommitPolicy::SoleCandidate => None,
            CommitPolicy::FirstCandidate if !self.items.is_empty() => Some(0),
            CommitPolicy::FirstCandidate => None,
        })?;

        let mut items = std::mem::take(&mut self.items);
        self.set_focus(None);
        if index < items.len() {
            Some(items.swap_remove(index))
        } else {
            None
        }
    }

    fn set_focus(&mut self, focus: Option<usize>) {
        let previous = self.focused;
        self.focused = focus;
        if previous != focus {
            if let Some(observer) = self.observer.as_mut() {
                observer.focus_changed(previous, focus);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn controller(n: usize) -> SelectionController<usize> {
        let mut c = SelectionController::new();
        c.replace((0..n).collect());
        c
    }

    #[test]
    fn test_starts_without_focus() {
        let c = controller(3);
        assert_eq!(c.focused(), None);
        assert_eq!(c.focused_index(), -1);
        assert!(c.focused_item().is_none());
    }

    #[test]
    fn test_move_next_wraps() {
        let mut c = controller(3);
        c.move_next();
        assert_eq!(c.focused(), Some(0));
        c.move_next();
        c.move_next();
        assert_eq!(c.focused(), Some(2));
        c.move_next();
        assert_eq!(c.focused(), Some(0));
    }

    #[test]
    fn test_move_previous_from_no_focus_lands_on_last() {
        for n in 1..6 {
            let mut c = controller(n);
            c.move_previous();
            assert_eq!(c.focused(), Some(n - 1));
        }
    }

    #[test]
    fn test_move_previous_wraps() {
        let mut c = controller(3);
        c.move_next();
        c.move_previous();
        assert_eq!(c.focused(), Some(2));
        c.move_previous();
        assert_eq!(c.focused(), Some(1));
    }

    #[test]
    fn test_n_moves_is_a_full_circle() {
        let n = 4;
        for start in 0..n {
            let mut c = controller(n);
            for _ in 0..=start {
                c.move_next();
            }
            let before = c.focused();
            for _ in 0..n {
                c.move_next();
            }
            assert_eq!(c.focused(), before);
            for _ in 0..n {
                c.move_previous();
            }
            assert_eq!(c.focused(), before);
        }
    }

    #[test]
    fn test_moves_on_empty_list_are_noops() {
        let mut c: SelectionController<usize> = SelectionController::new();
        c.move_next();
        c.move_previous();
        assert_eq!(c.focused(), None);
        assert_eq!(c.commit(), None);
    }

    #[test]
    fn test_replace_resets_focus() {
        let mut c = controller(3);
        c.move_next();
        c.move_next();
        c.replace(vec![7, 8]);
        assert_eq!(c.focused(), None);
        c.move_next();
        c.replace(Vec::new());
        assert_eq!(c.focused(), None);
        // identical contents still count as a new list
        let mut c = controller(2);
        c.move_next();
        c.replace(vec![0, 1]);
        assert_eq!(c.focused(), None);
    }

    #[test]
    fn test_commit_focused_item_closes_list() {
        let mut c = SelectionController::new();
        c.replace(vec!["Chad", "Chile", "China"]);
        c.move_next();
        c.move_next();
        assert_eq!(c.commit(), Some("Chile"));
        assert!(c.is_empty());
        assert_eq!(c.focused(), None);
    }

    #[test]
    fn test_commit_without_focus_is_noop() {
        let mut c = SelectionController::new();
        c.replace(vec!["Chad"]);
        assert_eq!(c.commit(), None);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_commit_policies() {
        let mut c = SelectionController::new();
        c.replace(vec!["Chad"]);
        assert_eq!(c.commit_with(CommitPolicy::SoleCandidate), Some("Chad"));

        c.replace(vec!["Chad", "Chile"]);
        assert_eq!(c.commit_with(CommitPolicy::SoleCandidate), None);
        assert_eq!(c.len(), 2);
        assert_eq!(c.commit_with(CommitPolicy::FirstCandidate), Some("Chad"));

        c.replace(vec!["Chad", "Chile"]);
        c.move_previous();
        assert_eq!(c.commit_with(CommitPolicy::FirstCandidate), Some("Chile"));

        c.replace(Vec::new());
        assert_eq!(c.commit_with(CommitPolicy::FirstCandidate), None);
    }

    #[test]
    fn test_observer_sees_each_change() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let mut c = SelectionController::new().with_observer(
            move |prev: Option<usize>, next: Option<usize>| {
                sink.lock().unwrap().push((prev, next));
            },
        );

        c.replace(vec!['a']);
        c.move_next();
        // single item: focus stays on 0, nothing to repaint
        c.move_next();
        c.replace(vec!['a', 'b']);
        c.move_previous();
        c.commit();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![(None, Some(0)), (Some(0), None), (None, Some(1)), (Some(1), None)]
        );
    }
}
