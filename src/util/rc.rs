use std::{cell::RefCell, rc::Rc};

/// Shared, mutable and single threaded. Used for writers handed to several
/// owners (eg. a test and the code under test).
pub type RcRefCell<T> = Rc<RefCell<T>>;

// Namespace for constructors of the alias above.
pub struct RcRefCellT(());

impl RcRefCellT {
    pub fn new<T>(t: T) -> RcRefCell<T> {
        Rc::new(RefCell::new(t))
    }
}
