use crate::model::PowerAction;

/// Discrete remote-control keys understood by the launcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Confirm,
    Quit,
    Reboot,
    PowerOff,
}

/// Which row has keyboard focus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tiles,
    /// The settings badge above the tile row
    Settings,
}

/// What a launch request points at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchTarget {
    App(usize),
    Settings,
}

/// Side effect requested by a key press; the scheduler carries it out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Launch(LaunchTarget),
    Confirm(PowerAction),
}

#[derive(Clone, Debug)]
pub struct NavigationState {
    pub selected: usize,
    pub focus: Focus,
    pub needs_redraw: bool,
    app_count: usize,
}

impl NavigationState {
    /// Starts on the first tile with a pending initial paint.
    pub fn new(app_count: usize) -> Self {
        Self {
            selected: 0,
            focus: Focus::Tiles,
            needs_redraw: true,
            app_count,
        }
    }

    pub fn settings_selected(&self) -> bool {
        self.focus == Focus::Settings
    }

    /// Tile drawn as highlighted, if any
    pub fn highlighted_tile(&self) -> Option<usize> {
        match self.focus {
            Focus::Tiles => Some(self.selected),
            Focus::Settings => None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Read and clear the redraw request
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Apply one key press. Every handled key requests a redraw, even when
    /// the selection does not move.
    pub fn handle(&mut self, key: Key) -> Action {
        self.needs_redraw = true;

        match (key, self.focus) {
            (Key::Quit, _) => Action::Quit,
            (Key::Reboot, _) => Action::Confirm(PowerAction::Reboot),
            (Key::PowerOff, _) => Action::Confirm(PowerAction::PowerOff),

            (Key::Left, Focus::Tiles) => {
                if self.app_count > 0 {
                    self.selected = (self.selected + self.app_count - 1) % self.app_count;
                }
                Action::None
            }
            (Key::Right, Focus::Tiles) => {
                if self.app_count > 0 {
                    self.selected = (self.selected + 1) % self.app_count;
                }
                Action::None
            }
            (Key::Up, Focus::Tiles) => {
                self.focus = Focus::Settings;
                Action::None
            }
            (Key::Down, Focus::Tiles) => Action::None,

            (Key::Left, Focus::Settings) | (Key::Down, Focus::Settings) => {
                self.focus = Focus::Tiles;
                Action::None
            }
            (Key::Right, Focus::Settings) => {
                self.focus = Focus::Tiles;
                self.selected = 0;
                Action::None
            }
            (Key::Up, Focus::Settings) => Action::None,

            (Key::Confirm, Focus::Tiles) => Action::Launch(LaunchTarget::App(self.selected)),
            (Key::Confirm, Focus::Settings) => Action::Launch(LaunchTarget::Settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(selected: usize, focus: Focus) -> NavigationState {
        let mut nav = NavigationState::new(5);
        nav.selected = selected;
        nav.focus = focus;
        nav.needs_redraw = false;
        nav
    }

    #[test]
    fn test_wraps_around_both_ends() {
        let mut nav = at(4, Focus::Tiles);
        nav.handle(Key::Right);
        assert_eq!(nav.selected, 0);

        nav.handle(Key::Left);
        assert_eq!(nav.selected, 4);
    }

    #[test]
    fn test_transition_table() {
        // (start focus, key, expected focus, expected selection) from tile 2
        let cases = [
            (Focus::Tiles, Key::Left, Focus::Tiles, 1),
            (Focus::Tiles, Key::Right, Focus::Tiles, 3),
            (Focus::Tiles, Key::Up, Focus::Settings, 2),
            (Focus::Tiles, Key::Down, Focus::Tiles, 2),
            (Focus::Settings, Key::Left, Focus::Tiles, 2),
            (Focus::Settings, Key::Right, Focus::Tiles, 0),
            (Focus::Settings, Key::Up, Focus::Settings, 2),
            (Focus::Settings, Key::Down, Focus::Tiles, 2),
        ];

        for (focus, key, want_focus, want_selected) in cases {
            let mut nav = at(2, focus);
            let action = nav.handle(key);
            assert_eq!(action, Action::None, "{:?} in {:?}", key, focus);
            assert_eq!(nav.focus, want_focus, "{:?} in {:?}", key, focus);
            assert_eq!(nav.selected, want_selected, "{:?} in {:?}", key, focus);
            assert!(nav.needs_redraw, "{:?} in {:?}", key, focus);
        }
    }

    #[test]
    fn test_noop_key_still_requests_redraw() {
        let mut nav = at(0, Focus::Tiles);
        nav.handle(Key::Down);
        assert!(nav.take_redraw());
        assert!(!nav.take_redraw());
    }

    #[test]
    fn test_confirm_targets() {
        let mut nav = at(3, Focus::Tiles);
        assert_eq!(nav.handle(Key::Confirm), Action::Launch(LaunchTarget::App(3)));

        let mut nav = at(3, Focus::Settings);
        assert_eq!(nav.handle(Key::Confirm), Action::Launch(LaunchTarget::Settings));
        assert_eq!(nav.highlighted_tile(), None);
    }

    #[test]
    fn test_global_keys() {
        for focus in [Focus::Tiles, Focus::Settings] {
            let mut nav = at(1, focus);
            assert_eq!(nav.handle(Key::Quit), Action::Quit);
            assert_eq!(nav.handle(Key::Reboot), Action::Confirm(PowerAction::Reboot));
            assert_eq!(
                nav.handle(Key::PowerOff),
                Action::Confirm(PowerAction::PowerOff)
            );
            assert_eq!(nav.focus, focus);
        }
    }

    #[test]
    fn test_empty_menu_does_not_panic() {
        let mut nav = NavigationState::new(0);
        nav.handle(Key::Left);
        nav.handle(Key::Right);
        assert_eq!(nav.selected, 0);
    }
}
