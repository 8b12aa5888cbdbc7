use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};

use tvdeck_core::model::PowerAction;
use tvdeck_core::navigation::Key;
use tvdeck_core::scheduler::{Frontend, InputEvent, View};

use crate::ui::assets::Assets;
use crate::ui::layout::Layout;
use crate::ui::render;

type Term = Terminal<CrosstermBackend<Stdout>>;

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn leave_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    Ok(())
}

/// Best-effort terminal reset for the panic hook, where no handle exists.
pub fn reset_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

/// Remote-control key bindings
pub fn map_key(key: &KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Key::Quit),
        (KeyCode::Left, _) => Some(Key::Left),
        (KeyCode::Right, _) => Some(Key::Right),
        (KeyCode::Up, _) => Some(Key::Up),
        (KeyCode::Down, _) => Some(Key::Down),
        (KeyCode::Enter, _) => Some(Key::Confirm),
        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Some(Key::Quit),
        (KeyCode::Char('r'), _) => Some(Key::Reboot),
        (KeyCode::Char('p'), _) => Some(Key::PowerOff),
        _ => None,
    }
}

/// Fullscreen terminal surface. "Hidden" means the alternate screen has been
/// handed back so a launched program can use the console.
pub struct TerminalFrontend {
    terminal: Term,
    assets: Assets,
    layout: Layout,
    tile_count: usize,
    hidden: bool,
}

impl TerminalFrontend {
    pub fn new(assets: Assets, tile_count: usize) -> io::Result<Self> {
        let terminal = setup_terminal()?;
        let mut frontend = Self {
            terminal,
            assets,
            layout: Layout::compute(Rect::default(), tile_count),
            tile_count,
            hidden: false,
        };
        frontend.refit()?;
        Ok(frontend)
    }

    /// Recompute layout and rescale the backdrop when the surface size changed.
    fn refit(&mut self) -> io::Result<()> {
        let size = self.terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        if self.layout.area != area {
            tracing::debug!(width = area.width, height = area.height, "layout recomputed");
            self.layout = Layout::compute(area, self.tile_count);
            self.assets.backdrop.fit(area.width, area.height);
        }
        Ok(())
    }

    /// Drop input that queued up while a launched program had the console.
    fn discard_pending_input() -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            event::read()?;
        }
        Ok(())
    }

    /// Leave the alternate screen and raw mode for good.
    pub fn restore(mut self) -> io::Result<()> {
        if self.hidden {
            return Ok(());
        }
        leave_terminal(&mut self.terminal)
    }
}

impl Frontend for TerminalFrontend {
    type Error = io::Error;

    fn poll_event(&mut self) -> io::Result<Option<InputEvent>> {
        if self.hidden {
            return Ok(None);
        }
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                CEvent::Key(key) => {
                    if let Some(key) = map_key(&key) {
                        return Ok(Some(InputEvent::Key(key)));
                    }
                }
                CEvent::Resize(_, _) => return Ok(Some(InputEvent::Resized)),
                _ => {}
            }
        }
        Ok(None)
    }

    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        self.refit()?;
        let (assets, layout) = (&self.assets, &self.layout);
        self.terminal.draw(|f| render::draw(f, assets, layout, view))?;
        Ok(())
    }

    fn confirm(&mut self, view: &View<'_>, action: PowerAction) -> io::Result<bool> {
        self.refit()?;
        let (assets, layout) = (&self.assets, &self.layout);
        self.terminal.draw(|f| {
            render::draw(f, assets, layout, view);
            render::draw_confirm(f, assets, layout, action);
        })?;

        loop {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Enter => return Ok(true),
                    KeyCode::Esc => return Ok(false),
                    _ => {}
                }
            }
        }
    }

    fn hide(&mut self) -> io::Result<()> {
        if self.hidden {
            return Ok(());
        }
        leave_terminal(&mut self.terminal)?;
        self.hidden = true;
        Ok(())
    }

    fn show(&mut self) -> io::Result<()> {
        if !self.hidden {
            return Ok(());
        }
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, Hide)?;
        // Forget the previous frame so the next draw repaints every cell
        self.terminal.clear()?;
        Self::discard_pending_input()?;
        self.hidden = false;
        Ok(())
    }
}
