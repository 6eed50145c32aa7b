use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::data::FeatureSource;
use crate::layout::{ZoneDef, ZoneLayout, ZoneLayoutConfig};
use crate::region::Region;
use crate::scene::TooltipContent;
use crate::track::{GeneRenderStrategy, Track, TrackOptions};
use crate::viewer::render::{PX_PER_ROW, TrackView, render_ruler, render_status_bar};
use crate::viewport::Viewport;

/// Fraction of the brush moved by one pan keypress.
const PAN_STEP: f64 = 0.1;

/// Application state for the TUI viewer.
pub struct App {
    /// Region the viewer was opened on.
    pub region: Region,
    /// Live viewport; replaced wholesale on pan, zoom, and resize.
    pub viewport: Viewport,
    /// The gene annotation track.
    pub track: Track,
    /// Vertical layout of the track zones.
    pub zones: ZoneLayout,
    /// Hover payload shown in the status bar.
    pub tooltip: Option<TooltipContent>,
    /// Keyboard-driven inspect cursor, in canvas pixels.
    pub cursor_x: f64,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    pub fn new(region: Region, source: Arc<dyn FeatureSource>, chromosome_size: u64) -> Self {
        let clamped = region.clamped(chromosome_size);
        let viewport = Viewport::new(clamped.to_brush(), 80.0, chromosome_size);
        let track = Track::new(
            TrackOptions::new("genes", 200.0),
            source,
            Box::new(GeneRenderStrategy::new()),
        );
        let mut zones = ZoneLayout::new(ZoneLayoutConfig::default());
        zones.configure(&[ZoneDef::named("genes").with_height(200.0)]);
        Self {
            region: clamped,
            viewport,
            track,
            zones,
            tooltip: None,
            cursor_x: 40.0,
            should_quit: false,
        }
    }

    /// Match the viewport and zone heights to the terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        let canvas = width as f64;
        if (self.viewport.canvas_size - canvas).abs() > f64::EPSILON {
            let mut viewport = Viewport::new(
                self.viewport.brush,
                canvas,
                self.viewport.chromosome_size,
            );
            viewport.shortened_introns = self.viewport.shortened_introns.clone();
            self.viewport = viewport;
            self.track.invalidate();
        }
        // ruler and status bar each take one row
        let track_height = height.saturating_sub(2) as f64 * PX_PER_ROW;
        if self.zones.get_height(&["genes"]) != Some(track_height) {
            let was_expanded = self.zones.is_expanded(&["genes"]);
            let mut def = ZoneDef::named("genes").with_height(track_height);
            def.expanded = Some(was_expanded);
            self.zones.configure(&[def]);
        }
    }

    fn pan(&mut self, direction: f64) {
        let delta = self.viewport.brush.size() * PAN_STEP * direction;
        self.viewport = self.viewport.panned(delta);
    }

    fn zoom(&mut self, scale: f64) {
        self.viewport = self.viewport.zoomed(scale);
    }

    fn inspect(&mut self) {
        // mid-track probe under the cursor column
        let y = -self.track.scroll_offset() + PX_PER_ROW;
        self.tooltip = self.track.hit_test(self.cursor_x, y).cloned();
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left => self.pan(-1.0),
            KeyCode::Right => self.pan(1.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(0.5),
            KeyCode::Char('-') => self.zoom(2.0),
            KeyCode::Up => {
                self.track.on_scroll(-PX_PER_ROW);
            }
            KeyCode::Down => {
                self.track.on_scroll(PX_PER_ROW);
            }
            KeyCode::Char('h') => {
                self.cursor_x = (self.cursor_x - 1.0).max(0.0);
                self.inspect();
            }
            KeyCode::Char('l') => {
                self.cursor_x = (self.cursor_x + 1.0).min(self.viewport.canvas_size - 1.0);
                self.inspect();
            }
            KeyCode::Char('c') => {
                if self.zones.is_expanded(&["genes"]) {
                    self.zones.collapse(&["genes"]);
                } else {
                    self.zones.expand(&["genes"]);
                }
            }
            KeyCode::Char('r') => self.track.invalidate(),
            _ => {}
        }
    }

    /// Drive one frame outside of drawing: fetches, cache swaps, scene
    /// updates.
    pub fn tick(&mut self) {
        let track_height = self.zones.get_height(&["genes"]).unwrap_or(200.0);
        self.track.set_height(track_height);
        self.track.update(&self.viewport);
    }

    fn region_label(&self) -> String {
        format!(
            "{}:{}-{}",
            self.region.chrom,
            self.viewport.brush.start.round() as u64,
            self.viewport.brush.end.round() as u64
        )
    }

    /// Run the TUI event loop.
    pub fn run_tui(&mut self) -> Result<()> {
        enable_raw_mode()?;
        io::stdout().execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        while !self.should_quit {
            let size = terminal.size()?;
            self.resize(size.width, size.height);
            self.tick();

            terminal.draw(|frame| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Min(3),
                        Constraint::Length(1),
                    ])
                    .split(frame.area());

                let ruler = render_ruler(&self.viewport, chunks[0].width as usize);
                frame.render_widget(ruler, chunks[0]);

                let view = TrackView {
                    container: self.track.container(),
                    overlay: self.track.overlay(),
                    scroll_offset: self.track.scroll_offset(),
                    scroll_bar: self.track.scroll_bar(),
                };
                frame.render_widget(view, chunks[1]);

                let status = render_status_bar(
                    &self.region_label(),
                    self.track.has_pending_fetch(),
                    self.tooltip.as_ref(),
                );
                frame.render_widget(status, chunks[2]);
            })?;

            if event::poll(std::time::Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code);
            }
        }

        disable_raw_mode()?;
        io::stdout().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}
