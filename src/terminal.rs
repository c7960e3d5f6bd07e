// SPDX-License-Identifier: GPL-3.0-only

//! Terminal photobooth
//!
//! Renders the live preview and the captured shots to the terminal using
//! Unicode half-block characters for improved vertical resolution, with a
//! side panel for the session state and the delivery controls.

use crate::app::{Booth, BoothEvent, BoothMode, SendStatus};
use crate::backends::camera::{self, CameraFrame, CameraSource, SyntheticCamera};
use crate::config::BoothConfig;
use crate::constants::{SHOT_COUNT, timing};
use crate::delivery::{RelayClient, StripSender};
use crate::errors::AppResult;
use crate::pipelines::photo::{FilterType, Shot, filters::filter_pixel};
use crate::pipelines::strip::StripCompositor;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbaImage;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget, Wrap},
};
use std::collections::HashMap;
use std::io::{self, stdout};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Frame size of the synthetic camera
const SYNTHETIC_SIZE: (u32, u32) = (640, 360);

/// Width of thumbnails kept for the review screen
const THUMBNAIL_WIDTH: u32 = 240;

/// Width of the side panel in cells
const PANEL_WIDTH: u16 = 38;

/// Run the terminal photobooth
pub fn run(config: BoothConfig, synthetic: bool) -> AppResult<()> {
    let compositor = match &config.template_path {
        Some(path) => StripCompositor::from_path(path)?,
        None => StripCompositor::canonical()?,
    };
    let sender: Arc<dyn StripSender> =
        Arc::new(RelayClient::new(&config.relay_url, config.retry_policy())?);

    let camera: Option<Box<dyn CameraSource>> = if synthetic {
        info!("Using synthetic camera");
        Some(Box::new(SyntheticCamera::new(
            SYNTHETIC_SIZE.0,
            SYNTHETIC_SIZE.1,
        )))
    } else {
        camera::acquire_camera(config.camera_index)
    };

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let (mut booth, mut events) = Booth::new(
        camera,
        Arc::new(compositor),
        sender,
        config.booth_settings(),
    );

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut booth, &mut events);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Front-end state that is not part of the booth session
#[derive(Default)]
struct UiState {
    /// Email being typed, `Some` while the field has focus
    email_draft: Option<String>,
    /// Refusal or error from the last key press
    message: Option<String>,
    thumbnails: HashMap<Uuid, RgbaImage>,
}

impl UiState {
    fn thumbnail(&mut self, shot: &Shot) -> Option<&RgbaImage> {
        if !self.thumbnails.contains_key(&shot.id) {
            let decoded = match shot.decode() {
                Ok(image) => image,
                Err(e) => {
                    warn!(shot_id = %shot.id, error = %e, "Thumbnail decode failed");
                    return None;
                }
            };
            let height = (decoded.height() as u64 * THUMBNAIL_WIDTH as u64
                / decoded.width().max(1) as u64)
                .max(1) as u32;
            let thumb = image::imageops::thumbnail(&decoded, THUMBNAIL_WIDTH, height);
            self.thumbnails.insert(shot.id, thumb);
        }
        self.thumbnails.get(&shot.id)
    }

    /// Drop thumbnails of shots that are no longer in the session
    fn prune(&mut self, shots: &[Option<Shot>]) {
        self.thumbnails
            .retain(|id, _| shots.iter().flatten().any(|s| s.id == *id));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    booth: &mut Booth,
    events: &mut UnboundedReceiver<BoothEvent>,
) -> AppResult<()> {
    let mut ui = UiState::default();

    loop {
        while let Ok(event) = events.try_recv() {
            booth.handle_event(event);
        }
        booth.poll_camera();
        ui.prune(&booth.session().shots);

        terminal.draw(|f| draw(f, booth, &mut ui))?;

        // Handle input with timeout for frame updates
        if event::poll(timing::UI_POLL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_key(key, booth, &mut ui) == Flow::Quit
        {
            break;
        }
    }

    info!("Booth closed");
    Ok(())
}

fn handle_key(key: KeyEvent, booth: &mut Booth, ui: &mut UiState) -> Flow {
    // Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }

    // An alert blocks everything until acknowledged
    if booth.alert().is_some() {
        booth.dismiss_alert();
        return Flow::Continue;
    }

    if let Some(draft) = ui.email_draft.as_mut() {
        match key.code {
            KeyCode::Esc => ui.email_draft = None,
            KeyCode::Backspace => {
                draft.pop();
            }
            KeyCode::Enter => {
                let email = std::mem::take(draft);
                ui.email_draft = None;
                ui.message = booth
                    .set_email(email)
                    .and_then(|()| booth.send_email())
                    .err()
                    .map(|e| e.to_string());
            }
            KeyCode::Char(c) => draft.push(c),
            _ => {}
        }
        return Flow::Continue;
    }

    let result = match key.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Char(' ') | KeyCode::Enter => match booth.mode() {
            BoothMode::Retaking(_) => booth.take_retake_shot(),
            _ => booth.start_sequence(),
        },
        KeyCode::Char('f') => {
            booth.cycle_filter();
            Ok(())
        }
        KeyCode::Char(c @ '1'..='9') => {
            let slot = (c as u8 - b'1') as usize;
            booth.retake(slot)
        }
        KeyCode::Char('d') => booth.download(),
        KeyCode::Char('e') => {
            if booth.mode().is_review() && booth.session().send_status == SendStatus::Idle {
                ui.email_draft = Some(booth.session().email.clone());
            }
            Ok(())
        }
        KeyCode::Char('n') => {
            booth.start_over();
            Ok(())
        }
        KeyCode::Char('o') => {
            if let Some(path) = booth.last_saved()
                && let Err(e) = open::that(path)
            {
                error!(path = %path.display(), error = %e, "Failed to open strip");
            }
            Ok(())
        }
        _ => Ok(()),
    };

    ui.message = result.err().map(|e| e.to_string());
    Flow::Continue
}

fn draw(f: &mut Frame, booth: &Booth, ui: &mut UiState) {
    let area = f.area();
    let [main, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    let [preview_area, panel_area] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(PANEL_WIDTH)]).areas(main);

    if booth.mode().is_review() {
        draw_review(f, booth, ui, preview_area);
    } else {
        draw_preview(f, booth, preview_area);
    }

    f.render_widget(panel(booth, ui), panel_area);

    let status = StatusBar {
        message: ui
            .message
            .as_deref()
            .or(booth.notice())
            .unwrap_or_else(|| key_help(booth.mode())),
    };
    f.render_widget(status, status_area);

    if let Some(alert) = booth.alert() {
        draw_alert(f, alert, area);
    }
}

fn draw_preview(f: &mut Frame, booth: &Booth, area: Rect) {
    if !booth.has_camera() {
        f.render_widget(Placeholder("Camera unavailable"), area);
        return;
    }
    match booth.latest_frame() {
        Some(frame) => f.render_widget(
            HalfBlockImage {
                source: frame,
                filter: booth.filter(),
            },
            area,
        ),
        None => f.render_widget(Placeholder("Waiting for camera..."), area),
    }

    if let Some(remaining) = booth.session().countdown {
        let text = format!(" {} ", remaining);
        let width = text.len() as u16 + 2;
        let overlay = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(3) / 2,
            width: width.min(area.width),
            height: 3.min(area.height),
        };
        f.render_widget(Clear, overlay);
        f.render_widget(
            Paragraph::new(text)
                .style(Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .block(Block::bordered()),
            overlay,
        );
    }
}

fn draw_review(f: &mut Frame, booth: &Booth, ui: &mut UiState, area: Rect) {
    let rows = Layout::vertical([Constraint::Ratio(1, SHOT_COUNT as u32); SHOT_COUNT]).split(area);
    for (slot, row) in rows.iter().enumerate() {
        let block = Block::bordered().title(format!(" {} ", slot + 1));
        let inner = block.inner(*row);
        f.render_widget(block, *row);

        let thumb = booth.session().shots[slot]
            .as_ref()
            .and_then(|shot| ui.thumbnail(shot));
        match thumb {
            Some(image) => f.render_widget(
                HalfBlockImage {
                    source: image,
                    filter: FilterType::Normal,
                },
                inner,
            ),
            None => f.render_widget(Placeholder("(empty)"), inner),
        }
    }
}

fn panel<'a>(booth: &'a Booth, ui: &'a UiState) -> Paragraph<'a> {
    let label = Style::new().fg(Color::Gray);
    let value = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);
    let session = booth.session();

    let mode = match session.mode {
        BoothMode::Idle => "Ready".to_string(),
        BoothMode::Capturing(slot) => format!("Shot {} of {}", slot + 1, SHOT_COUNT),
        BoothMode::Review => "Review".to_string(),
        BoothMode::Retaking(slot) => format!("Retake shot {}", slot + 1),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Camera  ", label),
            Span::styled(booth.camera_name().unwrap_or("none"), value),
        ]),
        Line::from(vec![
            Span::styled("Filter  ", label),
            Span::styled(booth.filter().display_name(), value),
        ]),
        Line::from(vec![
            Span::styled("Mode    ", label),
            Span::styled(mode, value),
        ]),
        Line::default(),
    ];

    for (slot, shot) in session.shots.iter().enumerate() {
        let (mark, style) = match shot {
            Some(shot) => (
                format!("■ {}", shot.filter.display_name()),
                Style::new().fg(Color::Green),
            ),
            None => ("□".to_string(), Style::new().fg(Color::DarkGray)),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("Shot {}  ", slot + 1), label),
            Span::styled(mark, style),
        ]));
    }

    if session.mode.is_review() {
        lines.push(Line::default());
        let email = match &ui.email_draft {
            Some(draft) => format!("{}_", draft),
            None if session.email.is_empty() => "-".to_string(),
            None => session.email.clone(),
        };
        lines.push(Line::from(vec![
            Span::styled("Email   ", label),
            Span::styled(email, value),
        ]));
        let (status, color) = match session.send_status {
            SendStatus::Idle => ("not sent", Color::Gray),
            SendStatus::Sending => ("sending...", Color::Yellow),
            SendStatus::Sent => ("sent", Color::Green),
        };
        lines.push(Line::from(vec![
            Span::styled("Status  ", label),
            Span::styled(status, Style::new().fg(color)),
        ]));
        if booth.is_downloading() {
            lines.push(Line::from(Span::styled(
                "Saving strip...",
                Style::new().fg(Color::Yellow),
            )));
        }
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::bordered().title(" Photobooth "))
}

fn key_help(mode: BoothMode) -> &'static str {
    match mode {
        BoothMode::Idle => "space start | f filter | q quit",
        BoothMode::Capturing(_) => "smile! | f filter | n start over | q quit",
        BoothMode::Review => {
            "1-3 retake | d download | e email | o open | n start over | q quit"
        }
        BoothMode::Retaking(_) => "space take shot | f filter | n start over | q quit",
    }
}

fn draw_alert(f: &mut Frame, message: &str, area: Rect) {
    let width = (message.len() as u16 + 4).clamp(20, area.width.max(20)).min(area.width);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(5) / 2,
        width,
        height: 5.min(area.height),
    };
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(message),
            Line::default(),
            Line::from(Span::styled("press any key", Style::new().fg(Color::Gray))),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .title(" Error ")
                .border_style(Style::new().fg(Color::Red)),
        ),
        popup,
    );
}

/// Anything the half-block renderer can sample
trait PixelSource {
    fn dimensions(&self) -> (u32, u32);
    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8);
}

impl PixelSource for CameraFrame {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        self.pixel_rgb(x, y)
    }
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let x = x.min(self.width().saturating_sub(1));
        let y = y.min(self.height().saturating_sub(1));
        match self.get_pixel_checked(x, y) {
            Some(px) => (px.0[0], px.0[1], px.0[2]),
            None => (0, 0, 0),
        }
    }
}

/// Widget that renders an image using half-block characters, with a live
/// filter applied per sample
struct HalfBlockImage<'a, S: PixelSource> {
    source: &'a S,
    filter: FilterType,
}

impl<S: PixelSource> Widget for HalfBlockImage<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.source.dimensions();
        if width == 0 || height == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = width as f64 / height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let w = term_height * frame_aspect;
            (w as u16, area.height)
        } else {
            // Terminal is taller - fit to width
            let h = term_width / frame_aspect;
            (area.width, (h / 2.0) as u16)
        };
        let display_width = display_width.max(1);
        let display_height = display_height.max(1);

        // Center the image
        let x_offset = area.x + area.width.saturating_sub(display_width) / 2;
        let y_offset = area.y + area.height.saturating_sub(display_height) / 2;

        let x_scale = width as f64 / display_width as f64;
        let y_scale = height as f64 / (display_height as f64 * 2.0);

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;
                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let top = self.sample(src_x, src_y_top);
                let bottom = self.sample(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }
    }
}

impl<S: PixelSource> HalfBlockImage<'_, S> {
    fn sample(&self, x: u32, y: u32) -> Color {
        let (r, g, b) = filter_pixel(self.filter, self.source.rgb(x, y));
        Color::Rgb(r, g, b)
    }
}

/// Centred one-line message
struct Placeholder(&'static str);

impl Widget for Placeholder {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let msg = self.0;
        let x = area.x + area.width.saturating_sub(msg.len() as u16) / 2;
        let y = area.y + area.height / 2;
        if y < area.y + area.height && x < area.x + area.width {
            buf.set_string(x, y, msg, Style::default());
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_block_fills_cells() {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        HalfBlockImage {
            source: &image,
            filter: FilterType::Grayscale,
        }
        .render(area, &mut buf);

        let cell = &buf[(1, 1)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(54, 54, 54));
    }

    #[test]
    fn test_status_bar_truncates() {
        let area = Rect::new(0, 0, 5, 1);
        let mut buf = Buffer::empty(area);
        StatusBar {
            message: "abcdefgh",
        }
        .render(area, &mut buf);
        assert_eq!(buf[(4, 0)].symbol(), "e");
    }

    #[test]
    fn test_key_help_mentions_retake_in_review() {
        assert!(key_help(BoothMode::Review).contains("retake"));
        assert!(key_help(BoothMode::Idle).contains("start"));
    }
}
