use serde::{Deserialize, Serialize};
use strum::VariantArray;

/// A state identifier, the flat row-major index of a grid cell
pub type State = usize;

/// One of the four moves available in every state
///
/// The discriminant is the action index. Greedy selection breaks ties
/// toward the lowest index, so the declaration order matters.
#[derive(
    VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// Number of actions in the action space
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up an action by index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::VARIANTS.get(index).copied()
    }

    /// Row and column offsets applied by this action
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> Self {
        action as u8
    }
}

impl TryFrom<u8> for Action {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Action::from_index(value as usize).ok_or_else(|| format!("invalid action index {value}"))
    }
}

/// The result of applying an action in a state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next_state: State,
    pub reward: f64,
    /// `true` when `next_state` is terminal
    pub done: bool,
}

/// Represents a deterministic, finite Markov decision process in which an agent can operate.
///
/// The environment holds no position of its own: the caller owns the current state and
/// passes it into [`step`](Environment::step), so one environment can be shared by readers
/// and replayed from any state.
pub trait Environment {
    /// Size of the state space. Valid states are `0..num_states()`
    fn num_states(&self) -> usize;

    /// The canonical initial state
    fn reset(&self) -> State;

    /// Apply `action` in `state`, producing the next state and the associated reward
    fn step(&self, state: State, action: Action) -> Transition;

    /// Whether an agent may choose an action in `state`
    ///
    /// Blocked and terminal states have no meaningful greedy action.
    fn is_decision_state(&self, state: State) -> bool;

    /// All states an agent may occupy, in ascending order
    fn open_states(&self) -> Vec<State>;

    /// Manhattan distance from `state` to the terminal goal
    fn distance_to_goal(&self, state: State) -> usize;
}
