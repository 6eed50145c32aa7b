//! Terminal compositing of track scenes.
//!
//! The scene graph is resolution-independent pixel geometry; this module
//! maps it onto terminal cells. One column is one horizontal pixel (the
//! viewport's canvas size is set to the widget width), and one row covers
//! a fixed vertical pixel band.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::scene::{Container, Primitive, TooltipContent};
use crate::ticks::{build_ticks, format_tick_value};
use crate::track::ScrollBar;
use crate::viewport::Viewport;

/// Vertical pixels represented by one terminal row.
pub const PX_PER_ROW: f64 = 10.0;

/// Approximate terminal columns between ruler tick labels.
const RULER_LABEL_SPACING: usize = 14;

/// Render the coordinate ruler for the current viewport.
pub fn render_ruler(viewport: &Viewport, width: usize) -> Line<'static> {
    let mut cells = vec![(' ', false); width];
    let count = (width / RULER_LABEL_SPACING).max(2);
    let range = viewport.brush.size();
    let ticks = build_ticks(range, count);
    for tick in &ticks {
        let bp = viewport.brush.start + tick.value;
        let x = viewport.project_brush_bp_to_pixel(bp);
        if x < 0.0 {
            continue;
        }
        let column = x.round() as usize;
        if column >= width {
            continue;
        }
        cells[column] = ('|', false);
        let label = format_tick_value(bp);
        for (i, ch) in label.chars().enumerate() {
            let at = column + 1 + i;
            if at < width {
                cells[at] = (ch, true);
            }
        }
    }
    let spans: Vec<Span> = cells
        .into_iter()
        .map(|(ch, is_label)| {
            let style = if is_label {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(String::from(ch), style)
        })
        .collect();
    Line::from(spans)
}

/// Render the one-line status bar shown under the tracks.
pub fn render_status_bar(
    region_label: &str,
    fetching: bool,
    tooltip: Option<&TooltipContent>,
) -> Paragraph<'static> {
    let mut spans = vec![
        Span::styled(
            region_label.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    if fetching {
        spans.push(Span::styled(
            "loading...",
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw("  "));
    }
    if let Some(rows) = tooltip {
        let text = rows
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join(" | ");
        spans.push(Span::styled(text, Style::default().fg(Color::White)));
    } else {
        spans.push(Span::styled(
            "q quit | arrows pan/scroll | +/- zoom | r refresh",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Paragraph::new(Line::from(spans))
}

/// Widget drawing one track's scene graph into its area.
pub struct TrackView<'a> {
    pub container: &'a Container,
    pub overlay: &'a Container,
    /// Vertical content offset in pixels, zero or negative.
    pub scroll_offset: f64,
    pub scroll_bar: Option<ScrollBar>,
}

impl TrackView<'_> {
    fn row_of(&self, area: Rect, y: f64) -> Option<u16> {
        let row = ((y + self.scroll_offset) / PX_PER_ROW).floor();
        if row < 0.0 || row >= area.height as f64 {
            return None;
        }
        Some(area.y + row as u16)
    }

    fn column_of(&self, area: Rect, screen_x: f64) -> Option<u16> {
        if screen_x < 0.0 || screen_x >= area.width as f64 {
            return None;
        }
        Some(area.x + screen_x.floor() as u16)
    }

    fn draw_container(&self, container: &Container, area: Rect, buf: &mut Buffer) {
        for child in &container.children {
            match child {
                Primitive::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    let x1 = container.to_screen_x(*x);
                    let x2 = container.to_screen_x(x + width);
                    // thin bars render as a half block
                    let glyph = if *height >= PX_PER_ROW * 0.75 {
                        "█"
                    } else {
                        "▬"
                    };
                    let rows = (*height / PX_PER_ROW).ceil().max(1.0) as u16;
                    for row_index in 0..rows {
                        let Some(row) =
                            self.row_of(area, y + row_index as f64 * PX_PER_ROW)
                        else {
                            continue;
                        };
                        let from = x1.max(0.0).floor() as i64;
                        let to = x2.min(area.width as f64).ceil() as i64;
                        for column in from..to {
                            if let Some(column) = self.column_of(area, column as f64) {
                                buf[(column, row)]
                                    .set_symbol(glyph)
                                    .set_style(Style::default().fg(*color));
                            }
                        }
                    }
                }
                Primitive::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                } => {
                    let sx1 = container.to_screen_x(*x1);
                    let sx2 = container.to_screen_x(*x2);
                    if (y1 - y2).abs() < f64::EPSILON {
                        let Some(row) = self.row_of(area, *y1) else {
                            continue;
                        };
                        let from = sx1.min(sx2).max(0.0).floor() as i64;
                        let to = sx1.max(sx2).min(area.width as f64).ceil() as i64;
                        for column in from..to {
                            if let Some(column) = self.column_of(area, column as f64) {
                                buf[(column, row)]
                                    .set_symbol("─")
                                    .set_style(Style::default().fg(*color));
                            }
                        }
                    } else {
                        let Some(column) = self.column_of(area, sx1) else {
                            continue;
                        };
                        let from = y1.min(*y2);
                        let to = y1.max(*y2);
                        let mut y = from;
                        while y < to {
                            if let Some(row) = self.row_of(area, y) {
                                buf[(column, row)]
                                    .set_symbol("│")
                                    .set_style(Style::default().fg(*color));
                            }
                            y += PX_PER_ROW;
                        }
                    }
                }
                Primitive::Label(label) => {
                    let Some(row) = self.row_of(area, label.y) else {
                        continue;
                    };
                    let start = container.to_screen_x(label.x);
                    for (i, ch) in label.text.chars().enumerate() {
                        let Some(column) = self.column_of(area, start + i as f64) else {
                            continue;
                        };
                        buf[(column, row)]
                            .set_char(ch)
                            .set_style(Style::default().fg(label.color));
                    }
                }
            }
        }
    }

    fn draw_scroll_bar(&self, bar: &ScrollBar, area: Rect, buf: &mut Buffer) {
        if area.width == 0 {
            return;
        }
        let column = area.x + area.width - 1;
        let top = (bar.thumb_y / PX_PER_ROW).floor() as u16;
        let rows = (bar.thumb_height / PX_PER_ROW).ceil().max(1.0) as u16;
        let color = if bar.hovered {
            Color::White
        } else {
            Color::DarkGray
        };
        for row in top..(top + rows).min(area.height) {
            buf[(column, area.y + row)]
                .set_symbol("┃")
                .set_style(Style::default().fg(color));
        }
    }
}

impl Widget for TrackView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.draw_container(self.container, area, buf);
        self.draw_container(self.overlay, area, buf);
        if let Some(bar) = &self.scroll_bar {
            self.draw_scroll_bar(bar, area, buf);
        }
    }
}
