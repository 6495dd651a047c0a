use crate::model::ResponseField;
use crate::services::response::render_summary;
use crate::ui::{AppState, Focus};
use crate::widgets::chrome::{cursor_mark, panel_block};
use ratatui::prelude::*;
use ratatui::widgets::*;

pub fn draw_result(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let form = &state.form;
    let focused = matches!(state.focus, Focus::Options | Focus::Get);
    let mut lines: Vec<Line> = Vec::new();

    if !form.has_response() {
        lines.push(Line::from(Span::styled(
            "Submit valid JSON to see the response.",
            theme.hint(),
        )));
        let p = Paragraph::new(lines)
            .block(panel_block("Response", focused, theme))
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }

    // Multi-select header with count summary
    let opts_focused = state.focus == Focus::Options;
    let header_style = theme.row(opts_focused, state.editing);
    lines.push(Line::from(vec![
        Span::raw(format!("{} Select Options: ", cursor_mark(opts_focused))),
        Span::styled(format!("{} selected", form.selected.len()), header_style),
    ]));
    for (oi, field) in ResponseField::ALL.into_iter().enumerate() {
        let chk = if form.selected.contains(&field) {
            "[x]"
        } else {
            "[ ]"
        };
        let on_cursor = opts_focused && state.editing && oi == state.option_cursor;
        let st = theme.option(on_cursor, opts_focused && state.editing);
        lines.push(Line::from(Span::styled(
            format!("  {} {chk} {}", cursor_mark(on_cursor), field.label()),
            st,
        )));
    }

    if let Some(summary) = render_summary(form.api_response.as_ref(), &form.selected) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Filtered Response:",
            theme.heading(),
        )));
        lines.push(Line::from(summary));
    }

    if form.can_fetch_code() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  [ GET ]  ",
            theme.button(state.focus == Focus::Get),
        )));
    }

    if let Some(code) = &form.operation_code {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("  • Operation Code: {code}")));
    }

    let p = Paragraph::new(lines)
        .block(panel_block("Response", focused, theme))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
