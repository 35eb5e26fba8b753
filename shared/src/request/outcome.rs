use std::{cell::RefCell, rc::Rc};

/// Write-once result cell shared between whoever produces a value and the
/// task waiting on it. Clones observe the same cell.
pub struct Outcome<T> {
    cell: Rc<RefCell<Option<T>>>,
}

impl<T> Clone for Outcome<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Outcome<T> {
    pub fn new() -> Self {
        Self {
            cell: Rc::new(RefCell::new(None)),
        }
    }

    /// Stores the value. Returns false, leaving the first value in place, if
    /// the outcome was already resolved.
    pub fn set(&self, value: T) -> bool {
        let mut cell = self.cell.borrow_mut();
        if cell.is_some() {
            return false;
        }
        *cell = Some(value);
        true
    }

    pub fn is_ready(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Moves the value out. Later calls return None.
    pub fn take(&self) -> Option<T> {
        self.cell.borrow_mut().take()
    }
}

impl<T: Clone> Outcome<T> {
    pub fn peek(&self) -> Option<T> {
        self.cell.borrow().clone()
    }
}
