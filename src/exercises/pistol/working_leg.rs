use crate::skeleton::{Side, Skeleton};

/// Votes for the more-bent leg until enough votes lock it for good.
#[derive(Debug, Clone)]
pub struct WorkingLegDetector {
    threshold: f64,
    votes_to_lock: u32,
    left_votes: u32,
    right_votes: u32,
    locked: Option<Side>,
}

impl WorkingLegDetector {
    pub fn new(threshold: f64, votes_to_lock: u32) -> Self {
        Self {
            threshold,
            votes_to_lock: votes_to_lock.max(1),
            left_votes: 0,
            right_votes: 0,
            locked: None,
        }
    }

    /// Cast this frame's vote, if any. Returns the side on the frame it locks.
    pub fn observe(&mut self, skeleton: &Skeleton) -> Option<Side> {
        if self.locked.is_some() {
            return None;
        }
        let (Some(left), Some(right)) = (
            skeleton.try_knee_angle(Side::Left),
            skeleton.try_knee_angle(Side::Right),
        ) else {
            return None;
        };
        if (left - right).abs() <= self.threshold {
            return None;
        }

        if left < right {
            self.left_votes += 1;
        } else {
            self.right_votes += 1;
        }

        if self.left_votes + self.right_votes < self.votes_to_lock {
            return None;
        }
        let side = if self.right_votes > self.left_votes {
            Side::Right
        } else {
            Side::Left
        };
        self.locked = Some(side);
        self.locked
    }

    /// The locked side, or left while still voting.
    pub fn working_leg(&self) -> Side {
        self.locked.unwrap_or(Side::Left)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    pub fn votes(&self) -> (u32, u32) {
        (self.left_votes, self.right_votes)
    }

    pub fn reset(&mut self) {
        self.left_votes = 0;
        self.right_votes = 0;
        self.locked = None;
    }
}
