//! ChangeNotifier: synchronous Delta fan-out
//!
//! Observers run inside the edit call, in subscription order, and only see
//! a borrowed Delta. Nothing here keeps a Delta alive past delivery.

use super::incremental::Delta;

pub trait ChangeObserver {
    fn delta_committed(&mut self, delta: &Delta);
}

impl<F> ChangeObserver for F
where
    F: FnMut(&Delta),
{
    fn delta_committed(&mut self, delta: &Delta) {
        self(delta)
    }
}

#[derive(Default)]
pub struct ChangeNotifier {
    observers: Vec<Box<dyn ChangeObserver>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl ChangeObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `delta` to every observer, empty or not
    pub fn notify(&mut self, delta: &Delta) {
        for observer in &mut self.observers {
            observer.delta_committed(delta);
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::positions::PositionSet;
    use crate::scanner::span::Span;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn delta_at(start: usize, len: usize) -> Delta {
        Delta {
            added: PositionSet::from_span(Span::new(start, len)),
            removed: PositionSet::new(),
        }
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::new();

        let first = Rc::clone(&log);
        notifier.subscribe(move |_: &Delta| first.borrow_mut().push("first"));
        let second = Rc::clone(&log);
        notifier.subscribe(move |_: &Delta| second.borrow_mut().push("second"));

        notifier.notify(&delta_at(0, 3));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(notifier.len(), 2);
    }

    #[test]
    fn test_observer_sees_delta_contents() {
        let seen = Rc::new(RefCell::new(0));
        let mut notifier = ChangeNotifier::new();
        let counter = Rc::clone(&seen);
        notifier.subscribe(move |delta: &Delta| *counter.borrow_mut() += delta.added.len());

        notifier.notify(&delta_at(4, 6));
        assert_eq!(*seen.borrow(), 6);
    }

    #[test]
    fn test_empty_delta_still_delivered() {
        let calls = Rc::new(RefCell::new(0));
        let mut notifier = ChangeNotifier::new();
        let counter = Rc::clone(&calls);
        notifier.subscribe(move |_: &Delta| *counter.borrow_mut() += 1);

        notifier.notify(&Delta::default());
        assert_eq!(*calls.borrow(), 1);
    }

    struct Recorder {
        batches: Rc<RefCell<Vec<Vec<Span>>>>,
    }

    impl ChangeObserver for Recorder {
        fn delta_committed(&mut self, delta: &Delta) {
            self.batches.borrow_mut().push(delta.added.spans());
        }
    }

    #[test]
    fn test_struct_observer() {
        let batches = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::new();
        notifier.subscribe(Recorder {
            batches: Rc::clone(&batches),
        });

        notifier.notify(&delta_at(2, 2));
        assert_eq!(*batches.borrow(), vec![vec![Span::new(2, 2)]]);
    }
}
