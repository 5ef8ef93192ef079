use std::rc::Rc;

use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, info};

use kinetic_core::placement::{Rect as AnchorRect, Size, Viewport};
use kinetic_core::popover::{Popover, PopoverFrame};
use kinetic_core::timeline::{SurfaceHandle, Timeline};
use kinetic_core::{AppConfig, Clock, DateAnchor, DateField, DatePicker, Phase, Style};

use crate::input::Action;
use crate::theme::Theme;

/// Pixels per terminal column
pub const CELL_WIDTH: f64 = 8.0;
/// Pixels per terminal row
pub const CELL_HEIGHT: f64 = 16.0;

/// Popover contents, in cells
const CONTENT_COLUMNS: u16 = 36;
const CONTENT_ROWS: u16 = 7;
const DETAIL_ROWS: u16 = 5;

/// Anchor button label
pub const ANCHOR_LABEL: &str = "[ Notifications ]";

/// Where the popover is drawn this frame, in cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogGeometry {
    pub area: Rect,
    pub opacity: f64,
    /// Arrow cell, if the arrow is visible
    pub arrow: Option<(u16, u16)>,
}

/// Application state
pub struct App {
    pub config: AppConfig,
    pub theme: Theme,
    pub timeline: Timeline<Style>,
    dialog: SurfaceHandle<Style>,
    arrow: SurfaceHandle<Style>,
    pub popover: Option<Popover>,
    pub open: bool,
    pub expanded: bool,
    pub picker: DatePicker,
    /// Wheel the keyboard drives
    pub focus: DateField,
    start: DateAnchor,
    /// Anchor button, in pixels
    pub anchor: AnchorRect,
    /// Scene viewport, in pixels
    pub viewport: Viewport,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub last_change: Option<DateAnchor>,
}

impl App {
    pub fn new(config: AppConfig, theme: Theme, columns: u16, rows: u16) -> Result<Self> {
        let timeline = Timeline::starting_at(0.0);
        let dialog = timeline.create_surface();
        let arrow = timeline.create_surface();
        timeline.detach(dialog.id());
        timeline.detach(arrow.id());

        let start = config
            .ui
            .start_date
            .map(DateAnchor::new)
            .unwrap_or_else(DateAnchor::today);
        let picker = DatePicker::new(start, config.wheel)?;

        let mut app = Self {
            config,
            theme,
            timeline,
            dialog,
            arrow,
            popover: None,
            open: false,
            expanded: false,
            picker,
            focus: DateField::Month,
            start,
            anchor: AnchorRect::new(
                4.0 * CELL_WIDTH,
                2.0 * CELL_HEIGHT,
                ANCHOR_LABEL.len() as f64 * CELL_WIDTH,
                CELL_HEIGHT,
            ),
            viewport: Viewport::new(0.0, 0.0),
            should_quit: false,
            status_message: None,
            last_change: None,
        };
        app.resize(columns, rows);
        Ok(app)
    }

    pub fn now(&self) -> f64 {
        self.timeline.now()
    }

    /// Scene size in cells; the last row belongs to the status bar
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.viewport = Viewport::new(
            columns as f64 * CELL_WIDTH,
            rows.saturating_sub(1) as f64 * CELL_HEIGHT,
        );
    }

    /// Something wants frames at the animation rate
    pub fn is_animating(&self) -> bool {
        let popover_running = self
            .popover
            .as_ref()
            .map(|p| p.animator().phase() == Phase::Scheduled && !p.animator().is_stale())
            .unwrap_or(false);
        popover_running || self.picker.is_active()
    }

    fn popover_frame(&self) -> PopoverFrame {
        let rows = if self.expanded {
            CONTENT_ROWS + DETAIL_ROWS
        } else {
            CONTENT_ROWS
        };
        PopoverFrame {
            open: self.open,
            anchor: self.anchor,
            viewport: self.viewport,
            content: Size::new(
                CONTENT_COLUMNS as f64 * CELL_WIDTH,
                rows as f64 * CELL_HEIGHT,
            ),
        }
    }

    /// Advance time to `now`: timeline callbacks, wheel loop, popover render
    pub fn tick(&mut self, now: f64) -> Result<()> {
        self.timeline.advance_to(now);

        if let Some(date) = self.picker.frame(now)? {
            self.record_change(date);
        }

        let frame = self.popover_frame();
        if let Some(popover) = self.popover.as_mut() {
            popover.update(frame)?;
            if popover.wants_unmount() {
                self.unmount();
            }
        }
        Ok(())
    }

    fn mount(&mut self) -> Result<()> {
        self.timeline.attach(self.dialog.id());
        self.timeline.attach(self.arrow.id());

        let mut popover = Popover::new(
            Box::new(self.dialog.clone()),
            Box::new(self.arrow.clone()),
            Rc::new(self.timeline.clone()),
            self.config.popover,
            self.config.animator,
        )?;
        popover.update(self.popover_frame())?;
        popover.on_mount()?;
        self.popover = Some(popover);
        info!("Popover mounted");
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(popover) = self.popover.take() {
            popover.drop_animations();
        }
        self.timeline.detach(self.dialog.id());
        self.timeline.detach(self.arrow.id());
        info!("Popover unmounted");
    }

    fn record_change(&mut self, date: DateAnchor) {
        debug!(date = %date.date(), "Picker changed");
        self.last_change = Some(date);
        self.status_message = Some(format!("jump to {}", date.date().format("%a %e %b %Y")));
    }

    /// One wheel notch on `field`
    fn scroll(&mut self, field: DateField, notches: f64, now: f64) -> Result<()> {
        let delta = notches * self.picker.wheel(field).params().wheel_divisor;
        if let Some(date) = self.picker.drive(field, now, |w| w.wheel(delta, now))? {
            self.record_change(date);
        }
        Ok(())
    }

    pub fn set_open(&mut self, open: bool) -> Result<()> {
        self.open = open;
        let frame = self.popover_frame();
        if open && self.popover.is_none() {
            self.mount()?;
        } else if let Some(popover) = self.popover.as_mut() {
            popover.update(frame)?;
        }
        Ok(())
    }

    pub fn handle_action(&mut self, action: Action, now: f64) -> Result<()> {
        self.timeline.advance_to(now);
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePopover => self.set_open(!self.open)?,
            Action::ClosePopover => self.set_open(false)?,
            Action::ToggleDetails => self.expanded = !self.expanded,
            Action::WheelPrev => self.scroll(self.focus, -1.0, now)?,
            Action::WheelNext => self.scroll(self.focus, 1.0, now)?,
            Action::SwitchWheel => self.focus = self.focus.other(),
            Action::WheelReset => {
                if self.picker.date() != self.start {
                    self.picker.set_date(self.start, now);
                    self.record_change(self.start);
                }
            }
            Action::MoveAnchor(dx, dy) => self.move_anchor(dx, dy),
            Action::None => {}
        }
        Ok(())
    }

    fn move_anchor(&mut self, dx: i16, dy: i16) {
        let max_left = (self.viewport.width - self.anchor.width).max(0.0);
        let max_top = (self.viewport.height - self.anchor.height).max(0.0);
        self.anchor.left = (self.anchor.left + dx as f64 * CELL_WIDTH).clamp(0.0, max_left);
        self.anchor.top = (self.anchor.top + dy as f64 * CELL_HEIGHT).clamp(0.0, max_top);
    }

    /// Anchor button in cells
    pub fn anchor_area(&self) -> Rect {
        Rect::new(
            (self.anchor.left / CELL_WIDTH) as u16,
            (self.anchor.top / CELL_HEIGHT) as u16,
            (self.anchor.width / CELL_WIDTH) as u16,
            1,
        )
    }

    /// Dialog style currently shown on the timeline, or the live sample
    fn dialog_style(&self) -> Option<Style> {
        let popover = self.popover.as_ref()?;
        self.timeline
            .computed_style(self.dialog.id())
            .or_else(|| popover.current_styles().into_iter().next())
    }

    pub fn dialog_geometry(&self) -> Option<DialogGeometry> {
        let popover = self.popover.as_ref()?;
        let placement = popover.placement()?;
        let style = self.dialog_style()?;

        let x = style.number("x")?;
        let pos_y = style.number("y")?;
        let height = style.number("height")?;
        let zoom = style.number("scale").unwrap_or(1.0);
        let opacity = style.number("opacity").unwrap_or(1.0);

        // Scale around the transform origin, which sits on the anchor point
        let origin_x = placement.anchor.0 - placement.x;
        let origin_y = placement.anchor.1 - placement.y;
        let left = x + origin_x * (1.0 - zoom);
        let top = pos_y + origin_y * (1.0 - zoom);
        let width = CONTENT_COLUMNS as f64 * CELL_WIDTH * zoom;
        let height = height * zoom;

        let area = to_cells(left, top, width, height, self.viewport);

        let arrow = self
            .timeline
            .computed_style(self.arrow.id())
            .filter(|s| s.number("opacity").unwrap_or(0.0) > 0.0 && zoom > 0.5)
            .and_then(|s| s.number("top"))
            .map(|arrow_top| {
                let row = ((pos_y + arrow_top) / CELL_HEIGHT).round().max(0.0) as u16;
                (area.x.saturating_sub(1), row)
            });

        Some(DialogGeometry {
            area,
            opacity,
            arrow,
        })
    }

    /// Row inside the dialog where a wheel is drawn
    pub fn wheel_area(&self, field: DateField) -> Option<Rect> {
        let geometry = self.dialog_geometry()?;
        let area = geometry.area;
        if area.width < 4 || area.height < 6 {
            return None;
        }
        let row = match field {
            DateField::Month => area.y + 3,
            DateField::Day => area.y + 4,
        };
        Some(Rect::new(area.x + 1, row, area.width - 2, 1))
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: f64) -> Result<()> {
        self.timeline.advance_to(now);
        let fields = [DateField::Month, DateField::Day];
        let hovered = fields.into_iter().find(|f| {
            self.wheel_area(*f)
                .map(|a| contains(a, mouse.column, mouse.row))
                .unwrap_or(false)
        });
        let dragging = fields
            .into_iter()
            .find(|f| self.picker.wheel(*f).is_dragging());

        // Pointer offset from the drum center, in pixels
        let x = {
            let area = dragging
                .or(hovered)
                .and_then(|f| self.wheel_area(f))
                .unwrap_or_default();
            let center = area.x as f64 + area.width as f64 / 2.0;
            (mouse.column as f64 + 0.5 - center) * CELL_WIDTH
        };

        match (mouse.kind, hovered, dragging) {
            (MouseEventKind::Down(MouseButton::Left), Some(field), _) => {
                self.focus = field;
                self.picker.drive(field, now, |w| {
                    w.pointer_down(x, now);
                    None
                })?;
            }
            (MouseEventKind::Down(MouseButton::Left), None, _) => {
                if contains(self.anchor_area(), mouse.column, mouse.row) {
                    self.set_open(!self.open)?;
                }
            }
            (MouseEventKind::Drag(MouseButton::Left), _, Some(field)) => {
                if let Some(date) = self.picker.drive(field, now, |w| w.pointer_move(x, now))? {
                    self.record_change(date);
                }
            }
            (MouseEventKind::Up(MouseButton::Left), _, Some(field)) => {
                if let Some(date) = self.picker.drive(field, now, |w| w.pointer_up(x, now))? {
                    self.record_change(date);
                }
            }
            (MouseEventKind::ScrollDown | MouseEventKind::ScrollRight, Some(field), _) => {
                self.scroll(field, 1.0, now)?;
            }
            (MouseEventKind::ScrollUp | MouseEventKind::ScrollLeft, Some(field), _) => {
                self.scroll(field, -1.0, now)?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

/// Pixel box to a cell rect clipped to the viewport
fn to_cells(left: f64, top: f64, width: f64, height: f64, viewport: Viewport) -> Rect {
    let max_cols = (viewport.width / CELL_WIDTH).max(0.0);
    let max_rows = (viewport.height / CELL_HEIGHT).max(0.0);

    let x0 = (left / CELL_WIDTH).round().clamp(0.0, max_cols);
    let y0 = (top / CELL_HEIGHT).round().clamp(0.0, max_rows);
    let x1 = ((left + width) / CELL_WIDTH).round().clamp(x0, max_cols);
    let y1 = ((top + height) / CELL_HEIGHT).round().clamp(y0, max_rows);

    Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16)
}
