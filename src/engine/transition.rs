/// How a matching rule is debounced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A level condition; must hold for `confirm_frames` consecutive frames.
    Sustained,
    /// A one-shot signal (peak or trough confirmation) that already carries
    /// its own lookback, so it fires on the frame it is raised.
    Event,
}

/// One row of an analyzer's transition table.
///
/// `when` is a pure predicate over the analyzer's per-frame context `C`.
pub struct Transition<P, C> {
    pub from: P,
    pub to: P,
    pub trigger: Trigger,
    pub when: fn(&C) -> bool,
}

impl<P: Copy, C> Clone for Transition<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Copy, C> Copy for Transition<P, C> {}

impl<P: Copy, C> Transition<P, C> {
    pub const fn sustained(from: P, to: P, when: fn(&C) -> bool) -> Self {
        Self {
            from,
            to,
            trigger: Trigger::Sustained,
            when,
        }
    }

    pub const fn event(from: P, to: P, when: fn(&C) -> bool) -> Self {
        Self {
            from,
            to,
            trigger: Trigger::Event,
            when,
        }
    }
}
