/// Seconds left until the next fictitious announce.
///
/// Counts down once per tick and sticks at zero, there is no re-announce.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CountdownTimer {
    seconds_remaining: u64,
}

impl CountdownTimer {
    pub fn new(seconds: u64) -> Self {
        Self {
            seconds_remaining: seconds,
        }
    }

    pub fn tick(&mut self) {
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
    }

    pub fn value(&self) -> u64 {
        self.seconds_remaining
    }
}
