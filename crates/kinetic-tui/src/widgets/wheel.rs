use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::Paragraph,
    Frame,
};

use kinetic_core::wheel::VisibleTick;

use crate::app::CELL_WIDTH;
use crate::theme::Theme;

pub struct WheelWidget;

impl WheelWidget {
    /// Render the visible ticks of a wheel on a single row
    ///
    /// Ticks sit on a drum seen edge-on: each is offset from the center by
    /// `radius · sin(rotation)` and faded by its rotation.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        ticks: &[VisibleTick],
        radius: f64,
        focused: bool,
        theme: &Theme,
        opacity: f64,
    ) {
        let center = area.x as f64 + area.width as f64 / 2.0;

        // Current tick last so it wins where labels overlap
        for tick in ticks.iter().rev() {
            let width = tick.label.chars().count() as u16 + 2;
            let offset = radius * tick.rotation.sin() / CELL_WIDTH;
            let column = (center + offset - width as f64 / 2.0).round();
            if column < area.x as f64 || column + width as f64 > (area.x + area.width) as f64 {
                continue;
            }

            let alpha = tick.opacity * opacity;
            let mut style = if tick.is_current {
                Style::default()
                    .fg(theme.fade(theme.current_tick, alpha))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.fade(theme.fg0, alpha))
            };
            if tick.is_current && focused {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            let cell = Rect::new(column as u16, area.y, width, 1);
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {} ", tick.label), style)),
                cell,
            );
        }
    }
}
