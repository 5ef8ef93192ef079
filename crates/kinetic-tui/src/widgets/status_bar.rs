use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use kinetic_core::Phase;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;

        let phase = match app.popover.as_ref().map(|p| p.animator().phase()) {
            None => "UNMOUNTED",
            Some(Phase::Idle) => "IDLE",
            Some(Phase::Scheduled) => "ANIMATING",
            Some(Phase::Converged) => "SETTLED",
            Some(Phase::Dropped) => "DROPPED",
        };
        let generation = app
            .popover
            .as_ref()
            .map(|p| p.animator().generation())
            .unwrap_or(0);

        let date = app.picker.date().date();
        let status_text = if let Some(msg) = &app.status_message {
            format!(" {} | gen {} | {} | {}", phase, generation, date, msg)
        } else {
            format!(" {} | gen {} | {}", phase, generation, date)
        };

        let help_hint = " q:quit enter:popover d:details h/l:wheel tab:field HJKL:anchor ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
