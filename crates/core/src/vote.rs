use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::score::temperature;

/// What a single viewer currently has recorded on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    #[default]
    None,
    Up,
    Down,
}

impl VoteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteState::None => "none",
            VoteState::Up => "up",
            VoteState::Down => "down",
        }
    }
}

impl fmt::Display for VoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(VoteState::None),
            "up" => Ok(VoteState::Up),
            "down" => Ok(VoteState::Down),
            other => Err(format!("unknown vote state: {other}")),
        }
    }
}

/// The button a viewer pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl FromStr for VoteDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" | "+" => Ok(VoteDirection::Up),
            "down" | "d" | "-" => Ok(VoteDirection::Down),
            other => Err(format!("unknown vote direction: {other}")),
        }
    }
}

/// Change applied to the stored counters by one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteDelta {
    pub upvotes: i32,
    pub downvotes: i32,
}

impl VoteDelta {
    pub fn net(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

/// Pressing the button matching the current state cancels it; pressing the
/// other one moves the vote across.
pub fn transition(state: VoteState, direction: VoteDirection) -> (VoteState, VoteDelta) {
    let delta = |upvotes, downvotes| VoteDelta { upvotes, downvotes };

    match (state, direction) {
        (VoteState::Up, VoteDirection::Up) => (VoteState::None, delta(-1, 0)),
        (VoteState::Down, VoteDirection::Up) => (VoteState::Up, delta(1, -1)),
        (VoteState::None, VoteDirection::Up) => (VoteState::Up, delta(1, 0)),
        (VoteState::Down, VoteDirection::Down) => (VoteState::None, delta(0, -1)),
        (VoteState::Up, VoteDirection::Down) => (VoteState::Down, delta(-1, 1)),
        (VoteState::None, VoteDirection::Down) => (VoteState::Down, delta(0, 1)),
    }
}

/// Counters for one item together with the viewer's vote on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    upvotes: u32,
    downvotes: u32,
    state: VoteState,
}

impl VoteTally {
    pub fn new(upvotes: u32, downvotes: u32) -> Self {
        Self::with_state(upvotes, downvotes, VoteState::None)
    }

    /// Counters that already include `state`'s contribution.
    pub fn with_state(upvotes: u32, downvotes: u32, state: VoteState) -> Self {
        Self {
            upvotes,
            downvotes,
            state,
        }
    }

    pub fn apply_upvote(&mut self) -> VoteDelta {
        self.apply(VoteDirection::Up)
    }

    pub fn apply_downvote(&mut self) -> VoteDelta {
        self.apply(VoteDirection::Down)
    }

    pub fn apply(&mut self, direction: VoteDirection) -> VoteDelta {
        let (next, delta) = transition(self.state, direction);
        // Decrements only undo an earlier increment from the same state, so
        // saturation only matters for counters loaded inconsistent.
        self.upvotes = self.upvotes.saturating_add_signed(delta.upvotes);
        self.downvotes = self.downvotes.saturating_add_signed(delta.downvotes);
        self.state = next;
        delta
    }

    pub fn upvotes(&self) -> u32 {
        self.upvotes
    }

    pub fn downvotes(&self) -> u32 {
        self.downvotes
    }

    pub fn state(&self) -> VoteState {
        self.state
    }

    pub fn temperature(&self) -> i64 {
        temperature(self.upvotes, self.downvotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(start: (u32, u32), presses: &[VoteDirection]) -> VoteTally {
        let mut tally = VoteTally::new(start.0, start.1);
        for &direction in presses {
            tally.apply(direction);
        }
        tally
    }

    #[test]
    fn first_upvote_counts_once() {
        let mut tally = VoteTally::new(10, 2);
        let delta = tally.apply_upvote();

        assert_eq!(delta, VoteDelta { upvotes: 1, downvotes: 0 });
        assert_eq!((tally.upvotes(), tally.downvotes()), (11, 2));
        assert_eq!(tally.state(), VoteState::Up);
        assert_eq!(tally.temperature(), 9);
    }

    #[test]
    fn double_upvote_cancels() {
        let tally = run((10, 2), &[VoteDirection::Up, VoteDirection::Up]);

        assert_eq!(tally, VoteTally::new(10, 2));
    }

    #[test]
    fn double_downvote_cancels() {
        let tally = run((0, 0), &[VoteDirection::Down, VoteDirection::Down]);

        assert_eq!(tally, VoteTally::new(0, 0));
    }

    #[test]
    fn switching_moves_one_unit_each_way() {
        let mut tally = VoteTally::new(10, 2);
        tally.apply_upvote();
        let delta = tally.apply_downvote();

        assert_eq!(delta, VoteDelta { upvotes: -1, downvotes: 1 });
        assert_eq!(delta.net(), -2);
        assert_eq!((tally.upvotes(), tally.downvotes()), (10, 3));
        assert_eq!(tally.state(), VoteState::Down);
    }

    #[test]
    fn up_down_down_returns_to_start() {
        let tally = run(
            (10, 2),
            &[VoteDirection::Up, VoteDirection::Down, VoteDirection::Down],
        );

        assert_eq!((tally.upvotes(), tally.downvotes()), (10, 2));
        assert_eq!(tally.state(), VoteState::None);
    }

    #[test]
    fn counters_never_drift_more_than_one_unit() {
        use VoteDirection::{Down, Up};

        // Every press sequence up to length 6.
        for len in 0..=6u32 {
            for mask in 0..(1u32 << len) {
                let presses: Vec<_> = (0..len)
                    .map(|bit| if mask & (1 << bit) == 0 { Up } else { Down })
                    .collect();
                let tally = run((0, 0), &presses);

                assert!(tally.upvotes() <= 1 && tally.downvotes() <= 1);
                let expected = match tally.state() {
                    VoteState::None => (0, 0),
                    VoteState::Up => (1, 0),
                    VoteState::Down => (0, 1),
                };
                assert_eq!((tally.upvotes(), tally.downvotes()), expected);
            }
        }
    }

    #[test]
    fn inconsistent_stored_state_does_not_underflow() {
        let mut tally = VoteTally::with_state(0, 0, VoteState::Up);
        tally.apply_upvote();

        assert_eq!(tally.upvotes(), 0);
        assert_eq!(tally.state(), VoteState::None);
    }

    #[test]
    fn vote_state_round_trips_through_text() {
        for state in [VoteState::None, VoteState::Up, VoteState::Down] {
            assert_eq!(state.as_str().parse::<VoteState>(), Ok(state));
        }
        assert!("sideways".parse::<VoteState>().is_err());
        assert_eq!("D".parse::<VoteDirection>(), Ok(VoteDirection::Down));
    }
}
