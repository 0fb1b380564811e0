use crate::lang::{LineNumber, MAX_LINE_NUMBER};

/// ## AUTO numbering
///
/// Supplies line numbers for bare content while active. Turned off by
/// any command, a blank line, or running past the last line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoCursor {
    active: bool,
    next: LineNumber,
    increment: LineNumber,
}

impl AutoCursor {
    pub fn start(&mut self, start: LineNumber, increment: LineNumber) {
        self.active = increment > 0 && start <= MAX_LINE_NUMBER;
        self.next = start;
        self.increment = increment;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The number the next bare line would get.
    pub fn peek(&self) -> Option<LineNumber> {
        if self.active {
            Some(self.next)
        } else {
            None
        }
    }

    /// Hand out the pending number and advance past it.
    pub fn take(&mut self) -> Option<LineNumber> {
        let number = self.peek()?;
        self.follow(number);
        Some(number)
    }

    /// Continue after an explicitly numbered line.
    pub fn follow(&mut self, number: LineNumber) {
        if !self.active {
            return;
        }
        match number.checked_add(self.increment) {
            Some(next) if next <= MAX_LINE_NUMBER => self.next = next,
            _ => self.active = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence() {
        let mut auto = AutoCursor::default();
        assert_eq!(auto.take(), None);
        auto.start(100, 5);
        assert_eq!(auto.take(), Some(100));
        assert_eq!(auto.take(), Some(105));
        auto.follow(200);
        assert_eq!(auto.peek(), Some(205));
        auto.stop();
        assert_eq!(auto.take(), None);
    }

    #[test]
    fn test_runs_off_the_end() {
        let mut auto = AutoCursor::default();
        auto.start(MAX_LINE_NUMBER - 1, 10);
        assert_eq!(auto.take(), Some(MAX_LINE_NUMBER - 1));
        assert!(!auto.is_active());
        auto.start(10, 0);
        assert!(!auto.is_active());
    }
}
