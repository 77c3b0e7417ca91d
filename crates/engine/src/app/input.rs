#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

impl InputAction {
    pub const ALL: [InputAction; 5] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Quit,
    ];

    const fn bit(self) -> u8 {
        match self {
            InputAction::MoveUp => 1 << 0,
            InputAction::MoveDown => 1 << 1,
            InputAction::MoveLeft => 1 << 2,
            InputAction::MoveRight => 1 << 3,
            InputAction::Quit => 1 << 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: u8,
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        if is_down {
            self.down |= action.bit();
        } else {
            self.down &= !action.bit();
        }
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down & action.bit() != 0
    }
}

/// Held-control state for one simulation update. The simulation only asks
/// "is this control pressed"; key wiring lives in the loop runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, actions: ActionStates) -> Self {
        Self {
            quit_requested,
            actions,
        }
    }

    pub fn holding(actions: &[InputAction]) -> Self {
        actions
            .iter()
            .fold(Self::empty(), |snapshot, &action| {
                snapshot.with_action_down(action, true)
            })
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn pressed(&self) -> impl Iterator<Item = InputAction> + '_ {
        InputAction::ALL
            .into_iter()
            .filter(|action| self.is_down(*action))
    }
}
