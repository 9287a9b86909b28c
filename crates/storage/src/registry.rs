//! Context registry and fan-out.
//!
//! The registry holds subscribed contexts weakly: dropping the last strong
//! handle to a context unsubscribes it.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use tessel_context::Context;
use tessel_core::{Error, Result};

/// Unique identifier for a subscribed context.
pub type ContextId = u64;

/// Ordered list of contexts notified by a table store.
pub struct ContextRegistry {
    contexts: Vec<(ContextId, Weak<RefCell<dyn Context>>)>,
    next_id: ContextId,
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self {
            contexts: Vec::new(),
            next_id: 1,
        }
    }

    /// Subscribes a context and returns its ID.
    pub fn register(&mut self, ctx: Rc<RefCell<dyn Context>>) -> ContextId {
        let id = self.next_id;
        self.next_id += 1;
        self.contexts.push((id, Rc::downgrade(&ctx)));
        id
    }

    /// Unsubscribes a context by ID.
    ///
    /// Returns true if the context was found and removed.
    pub fn unregister(&mut self, id: ContextId) -> bool {
        let before = self.contexts.len();
        self.contexts.retain(|(cid, _)| *cid != id);
        self.contexts.len() != before
    }

    /// Calls `f` on every live context in subscription order.
    ///
    /// Every context is visited even if `f` fails for some of them; the first
    /// error is returned. A context that is currently borrowed elsewhere is a
    /// phase violation and reported as an error without calling `f`.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(ContextId, &mut dyn Context) -> Result<()>,
    {
        let mut first_err = None;
        for (id, weak) in &self.contexts {
            let Some(ctx) = weak.upgrade() else {
                continue;
            };
            let result = match ctx.try_borrow_mut() {
                Ok(mut ctx) => f(*id, &mut *ctx),
                Err(_) => Err(Error::invalid_operation(
                    "context is borrowed during a store write phase",
                )),
            };
            if let Err(err) = result {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns the number of live contexts.
    pub fn len(&self) -> usize {
        self.contexts
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops entries whose context has been dropped.
    pub fn cleanup(&mut self) {
        self.contexts.retain(|(_, w)| w.strong_count() > 0);
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_context::UnitContext;
    use tessel_core::{DataType, Schema, SymbolTable};

    fn make_context() -> Rc<RefCell<UnitContext>> {
        let schema = Schema::new([("a", DataType::Int64)]).unwrap();
        Rc::new(RefCell::new(UnitContext::new(schema, Rc::new(SymbolTable::new()))))
    }

    #[test]
    fn test_register_assigns_ids() {
        let mut registry = ContextRegistry::new();
        let a = make_context();
        let b = make_context();
        assert_eq!(registry.register(a.clone()), 1);
        assert_eq!(registry.register(b.clone()), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister() {
        let mut registry = ContextRegistry::new();
        let a = make_context();
        let id = registry.register(a.clone());
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dropped_context_is_skipped_and_cleaned() {
        let mut registry = ContextRegistry::new();
        let a = make_context();
        registry.register(a.clone());
        registry.register(make_context());
        assert_eq!(registry.len(), 1);

        let mut visited = 0;
        registry
            .for_each(|_, _| {
                visited += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(visited, 1);

        registry.cleanup();
        assert_eq!(registry.contexts.len(), 1);
    }

    #[test]
    fn test_for_each_reports_borrowed_context() {
        let mut registry = ContextRegistry::new();
        let a = make_context();
        let b = make_context();
        registry.register(a.clone());
        registry.register(b.clone());

        let _reader = a.borrow();
        let mut visited = 0;
        let result = registry.for_each(|_, ctx| {
            ctx.init();
            visited += 1;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(visited, 1);
        assert!(b.borrow().is_initialized());
    }

    #[test]
    fn test_for_each_visits_all_and_returns_first_error() {
        let mut registry = ContextRegistry::new();
        let a = make_context();
        let b = make_context();
        registry.register(a.clone());
        registry.register(b.clone());

        let mut visited = Vec::new();
        let result = registry.for_each(|id, _| {
            visited.push(id);
            Err(Error::invalid_operation("boom"))
        });
        assert_eq!(visited, alloc::vec![1, 2]);
        assert!(matches!(result, Err(Error::InvalidOperation { .. })));
    }
}
