use crate::ui::ToastLevel;
use ratatui::style::{Color, Modifier, Style};

/// Colours of the submission form, one per role on screen.
#[derive(Clone, Debug)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    // App title in the header
    pub brand: Color,
    // Focused rows, buttons and the summary heading
    pub focus: Color,
    // Row being edited, focused borders and the option cursor
    pub edit: Color,
    pub frame: Color,
    pub ok: Color,
    pub fail: Color,
    pub hint: Color,
}

impl Theme {
    pub fn night() -> Self {
        Self {
            background: Color::Rgb(18, 20, 28),
            text: Color::Rgb(220, 222, 230),
            brand: Color::Rgb(255, 95, 135),
            focus: Color::Rgb(95, 175, 255),
            edit: Color::Rgb(255, 175, 0),
            frame: Color::Rgb(80, 84, 100),
            ok: Color::Rgb(95, 215, 135),
            fail: Color::Rgb(255, 85, 85),
            hint: Color::DarkGray,
        }
    }

    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.text)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.brand).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.edit } else { self.frame })
    }

    /// Value of a form row: highlighted when focused, stronger while editing.
    pub fn row(&self, focused: bool, editing: bool) -> Style {
        match (focused, editing) {
            (true, true) => Style::default().fg(self.edit).add_modifier(Modifier::BOLD),
            (true, false) => self.heading(),
            _ => Style::default(),
        }
    }

    pub fn heading(&self) -> Style {
        Style::default().fg(self.focus).add_modifier(Modifier::BOLD)
    }

    pub fn hint(&self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn ok(&self) -> Style {
        Style::default().fg(self.ok)
    }

    pub fn fail(&self) -> Style {
        Style::default().fg(self.fail)
    }

    fn cursor(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.edit)
            .add_modifier(Modifier::BOLD)
    }

    pub fn button(&self, focused: bool) -> Style {
        if focused {
            self.cursor()
        } else {
            self.heading()
        }
    }

    /// One entry of the response field multi-select.
    pub fn option(&self, on_cursor: bool, list_open: bool) -> Style {
        if on_cursor {
            self.cursor()
        } else if list_open {
            Style::default()
        } else {
            self.hint()
        }
    }

    pub fn toast(&self, level: ToastLevel) -> Color {
        match level {
            ToastLevel::Success => self.ok,
            ToastLevel::Error => self.fail,
            ToastLevel::Info => self.focus,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::night()
    }
}
