use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::AppState;

pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let endpoint = format!(
        "{}{}",
        state.config.base_url.trim_end_matches('/'),
        crate::services::api_client::ENDPOINT_PATH
    );
    let line = Line::from(vec![
        Span::styled(state.config.title.clone(), theme.title()),
        Span::raw("  "),
        Span::styled(endpoint, theme.hint()),
    ]);
    let p = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(theme.border(false)),
        );
    f.render_widget(p, area);
}
