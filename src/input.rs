use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TankInput {
    Quit,
    ToggleHelp,
    Redraw,
    Resize(u16, u16),
    Focus(bool),
    Pointer(u16, u16),
    SelectPrev,
    SelectNext,
    ClearSelection,
}

/// Drains whatever events are already queued without waiting.
pub(crate) fn collect_input_nonblocking() -> anyhow::Result<Vec<TankInput>> {
    let mut out = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Some(input) = map_event(event::read()?) {
            out.push(input);
            if out.len() >= 64 {
                break;
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event(ev: Event) -> Option<TankInput> {
    match ev {
        Event::Resize(w, h) => Some(TankInput::Resize(w, h)),
        Event::FocusGained => Some(TankInput::Focus(true)),
        Event::FocusLost => Some(TankInput::Focus(false)),
        Event::Mouse(m) => match m.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                Some(TankInput::Pointer(m.column, m.row))
            }
            _ => None,
        },
        Event::Key(k) if k.kind != KeyEventKind::Release => {
            if k.modifiers.contains(KeyModifiers::CONTROL) {
                return match k.code {
                    KeyCode::Char('c') => Some(TankInput::Quit),
                    KeyCode::Char('l') => Some(TankInput::Redraw),
                    _ => None,
                };
            }
            match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(TankInput::Quit),
                KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => {
                    Some(TankInput::ToggleHelp)
                }
                KeyCode::Up | KeyCode::Char('k') => Some(TankInput::SelectPrev),
                KeyCode::Down | KeyCode::Char('j') => Some(TankInput::SelectNext),
                KeyCode::Backspace | KeyCode::Char('x') => Some(TankInput::ClearSelection),
                _ => None,
            }
        }
        _ => None,
    }
}
