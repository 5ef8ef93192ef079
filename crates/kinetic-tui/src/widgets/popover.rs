use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use kinetic_core::DateField;

use crate::app::{App, ANCHOR_LABEL};
use crate::widgets::WheelWidget;

pub struct PopoverWidget;

impl PopoverWidget {
    /// Render the anchor button and, when mounted, the animated popover
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.bg0)),
            area,
        );

        let anchor = app.anchor_area().intersection(area);
        let anchor_style = if app.open {
            Style::default()
                .fg(theme.bg0)
                .bg(theme.anchor)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.anchor).bg(theme.bg1)
        };
        frame.render_widget(Paragraph::new(ANCHOR_LABEL).style(anchor_style), anchor);

        let Some(geometry) = app.dialog_geometry() else {
            return;
        };
        let dialog = geometry.area.intersection(area);
        if dialog.width < 2 || dialog.height < 2 {
            return;
        }

        let fg = theme.fade(theme.fg0, geometry.opacity);
        let border = theme.fade(theme.border, geometry.opacity);
        let bg = theme.fade(theme.bg2, geometry.opacity);

        frame.render_widget(Clear, dialog);
        let block = Block::default()
            .title(" Notifications ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(bg).fg(fg));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        if let Some((column, row)) = geometry.arrow {
            let arrow = Rect::new(column, row, 1, 1).intersection(area);
            if !arrow.is_empty() {
                frame.render_widget(
                    Paragraph::new("◀").style(Style::default().fg(border).bg(theme.bg0)),
                    arrow,
                );
            }
        }

        if inner.height == 0 {
            return;
        }
        let lines = vec![
            Line::from(Span::styled(
                "Jump to",
                Style::default().fg(theme.fade(theme.grey2, geometry.opacity)),
            )),
            Line::from(""),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);

        for field in [DateField::Month, DateField::Day] {
            let Some(wheel_area) = app.wheel_area(field) else {
                continue;
            };
            let wheel_area = wheel_area.intersection(inner);
            if wheel_area.is_empty() {
                continue;
            }
            WheelWidget::render(
                frame,
                wheel_area,
                &app.picker.visible_ticks(field),
                app.picker.wheel(field).params().radius,
                field == app.focus,
                theme,
                geometry.opacity,
            );
        }

        if app.expanded && inner.height > 6 {
            let details = Rect::new(inner.x, inner.y + 5, inner.width, inner.height - 5);
            let placement = app.popover.as_ref().and_then(|p| p.placement());
            let summary = match placement {
                Some(p) if p.is_floating => format!("floating at ({}, {})", p.x, p.y),
                Some(p) => format!("beside anchor at ({}, {})", p.x, p.y),
                None => String::new(),
            };
            let text = vec![
                Line::from(Span::styled(
                    summary,
                    Style::default().fg(theme.fade(theme.grey0, geometry.opacity)),
                )),
                Line::from(Span::styled(
                    "d: collapse",
                    Style::default().fg(theme.fade(theme.grey0, geometry.opacity)),
                )),
            ];
            frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), details);
        }
    }
}
