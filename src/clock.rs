use chrono::{DateTime, Local};

/// Source of wall-clock time for timestamps and the "today" reference.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Manually advanced clock. Clones share the same instant.
    #[derive(Clone)]
    pub struct FixedClock {
        now: Rc<Cell<DateTime<Local>>>,
    }

    impl FixedClock {
        pub fn at(now: DateTime<Local>) -> Self {
            Self { now: Rc::new(Cell::new(now)) }
        }

        pub fn advance(&self, by: chrono::Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.now.get()
        }
    }
}
