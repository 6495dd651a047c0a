use crate::services::encoder::is_image_path;
use crate::ui::{AppState, Focus};
use crate::widgets::chrome::{cursor_mark, panel_block};
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Lines of JSON shown inline before folding.
pub const JSON_PREVIEW_LINES: usize = 6;

// Attachment status shown under the file row
fn file_hint(state: &AppState) -> Option<Line<'static>> {
    let theme = &state.theme;
    let form = &state.form;
    let file = form.file.as_ref()?;
    if form.encoding {
        return Some(Line::from(Span::styled(
            "    encoding…",
            theme.hint(),
        )));
    }
    let mut spans = Vec::new();
    if form.file_b64.is_empty() {
        spans.push(Span::styled("    not readable", theme.fail()));
    } else {
        spans.push(Span::styled(
            format!("    {} base64 chars", form.file_b64.len()),
            theme.ok(),
        ));
    }
    if !is_image_path(file) {
        spans.push(Span::styled(
            "  (not an image, sent anyway)",
            theme.hint(),
        ));
    }
    Some(Line::from(spans))
}

pub fn draw_form(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let form = &state.form;
    let cursor_on = state.tick % 2 == 0;
    let mut lines: Vec<Line> = Vec::new();

    // JSON text area
    let json_focused = state.focus == Focus::Json;
    let value_style = theme.row(json_focused, state.editing);
    lines.push(Line::from(Span::raw(format!(
        "{} Enter JSON:",
        cursor_mark(json_focused)
    ))));
    if form.raw_input.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    {}", state.config.json_placeholder),
            theme.hint(),
        )));
    } else {
        let total = form.raw_input.lines().count();
        for l in form.raw_input.lines().take(JSON_PREVIEW_LINES) {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(l.to_string(), value_style),
            ]));
        }
        if total > JSON_PREVIEW_LINES {
            let more = total - JSON_PREVIEW_LINES;
            lines.push(Line::from(Span::styled(
                format!(
                    "    … ({} more line{})",
                    more,
                    if more == 1 { "" } else { "s" }
                ),
                theme.hint(),
            )));
        }
    }
    lines.push(Line::from(""));

    // File picker
    let file_focused = state.focus == Focus::File;
    let file_text = if file_focused && state.editing {
        let mut s = state.file_input.clone();
        if cursor_on {
            s.push('▏');
        }
        s
    } else {
        form.file.clone().unwrap_or_else(|| "(none)".into())
    };
    let file_style = theme.row(file_focused, state.editing);
    lines.push(Line::from(vec![
        Span::raw(format!("{} Upload File: ", cursor_mark(file_focused))),
        Span::styled(file_text, file_style),
    ]));
    if let Some(hint) = file_hint(state) {
        lines.push(hint);
    }
    lines.push(Line::from(""));

    // Submit button
    let submit_focused = state.focus == Focus::Submit;
    lines.push(Line::from(Span::styled(
        "  [ Submit ]  ",
        theme.button(submit_focused),
    )));

    if let Some(err) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  ! {err}"),
            theme.fail(),
        )));
    }

    let focused = matches!(state.focus, Focus::Json | Focus::File | Focus::Submit);
    let title = if focused && state.editing {
        "Submission • editing"
    } else {
        "Submission"
    };
    let p = Paragraph::new(lines)
        .block(panel_block(title, focused, theme))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
