//! Countdown overlay
//!
//! Normal mode shows the whole control surface:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ 10 min                        [_][x] │
//! │                                      │
//! │                05:00                 │
//! │                                      │
//! │ notice                               │
//! │ ████████████████████░░░░░░░░░░░░░░░░ │
//! │ [Start] [Reset] [Prompt] [Settings]  │
//! └──────────────────────────────────────┘
//! ```
//!
//! Simple mode draws only the readout over a translucent rounded patch.
//! Layout is computed from the window size so clicks can be hit-tested
//! without touching the renderer.

use std::time::{Duration, Instant};

use meetclock_core::types::{AppConfig, PromptKind};
use meetclock_core::{Readout, ViewMode};
use tiny_skia::Color;

use crate::frame::OverlayFrame;
use crate::platform::{OverlayConfig, PlatformError};
use crate::utils::{Bounds, color_from_rgba, truncate_name};
use crate::widgets::colors::with_alpha;
use crate::widgets::{Button, Palette, ProgressBar};

/// Reference size every layout constant is expressed at
pub const BASE_WIDTH: f32 = 350.0;
pub const BASE_HEIGHT: f32 = 250.0;

const BASE_PADDING: f32 = 10.0;
const BASE_HEADER_HEIGHT: f32 = 30.0;
const BASE_CONTROLS_HEIGHT: f32 = 30.0;
const BASE_PROGRESS_HEIGHT: f32 = 10.0;
const BASE_NOTICE_HEIGHT: f32 = 18.0;
const BASE_GAP: f32 = 6.0;
const BASE_MENU_ENTRY_HEIGHT: f32 = 28.0;
const BASE_LABEL_FONT: f32 = 15.0;
const BASE_BUTTON_FONT: f32 = 13.0;
const BASE_NOTICE_FONT: f32 = 12.0;
/// Margin around the readout in simple mode
const BASE_SIMPLE_MARGIN: f32 = 5.0;

/// Readout may use at most this share of its region's height
const READOUT_HEIGHT_RATIO: f32 = 0.85;
const MIN_READOUT_SIZE: f32 = 8.0;
/// The colon sits slightly above the digits' centre
const COLON_LIFT: f32 = 0.075;
const LABEL_MAX_CHARS: usize = 40;

/// How long a notice stays on screen
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

// ─────────────────────────────────────────────────────────────────────────────
// Actions & data
// ─────────────────────────────────────────────────────────────────────────────

/// Something the user clicked that the application must handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    StartPause,
    Reset,
    Prompt(PromptKind),
    Settings,
    Minimize,
    Close,
}

/// What a click position lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Action(OverlayAction),
    /// The Prompt button; opens the prompt menu
    PromptMenu,
}

/// Values shown by the overlay, pushed by the application every tick
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownData {
    pub label: String,
    pub readout: Readout,
    /// Remaining share of the duration (1.0 = full)
    pub progress: f32,
    pub running: bool,
}

impl Default for CountdownData {
    fn default() -> Self {
        Self {
            label: String::new(),
            readout: Readout::Clock {
                minutes: "00".to_string(),
                seconds: "00".to_string(),
            },
            progress: 0.0,
            running: false,
        }
    }
}

/// Appearance derived from the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownStyle {
    pub palette: Palette,
    pub flash_color: Color,
    /// Simple-mode background opacity (0.2 - 1.0)
    pub opacity: f32,
    /// Largest readout size in pixels; shrunk to fit the window
    pub font_size: f32,
}

impl CountdownStyle {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            palette: Palette::for_theme(config.theme),
            flash_color: color_from_rgba(config.reminder.flash_rgba()),
            opacity: config.window.opacity,
            font_size: config.display.font_size as f32,
        }
    }
}

impl Default for CountdownStyle {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_at: Instant,
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Normal-mode layout for a window size
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownLayout {
    pub scale: f32,
    pub label: Bounds,
    pub minimize: Bounds,
    pub close: Bounds,
    pub readout: Bounds,
    pub notice: Bounds,
    pub progress: Bounds,
    pub start: Bounds,
    pub reset: Bounds,
    pub prompt: Bounds,
    pub settings: Bounds,
    /// Regular then confidential, stacked above the Prompt button
    pub prompt_menu: [Bounds; 2],
}

impl CountdownLayout {
    pub fn normal(width: f32, height: f32, scale: f32) -> Self {
        let pad = BASE_PADDING * scale;
        let gap = BASE_GAP * scale;
        let inner_w = (width - pad * 2.0).max(0.0);

        let header_h = BASE_HEADER_HEIGHT * scale;
        let close = Bounds::new(width - pad - header_h, pad, header_h, header_h);
        let minimize = Bounds::new(close.x - gap - header_h, pad, header_h, header_h);
        let label = Bounds::new(pad, pad, (minimize.x - gap - pad).max(0.0), header_h);

        let controls_h = BASE_CONTROLS_HEIGHT * scale;
        let controls = Bounds::new(pad, height - pad - controls_h, inner_w, controls_h);
        let cells = controls.columns(4, gap);

        let progress_h = BASE_PROGRESS_HEIGHT * scale;
        let progress = Bounds::new(pad, controls.y - gap - progress_h, inner_w, progress_h);

        let notice_h = BASE_NOTICE_HEIGHT * scale;
        let notice = Bounds::new(pad, progress.y - gap - notice_h, inner_w, notice_h);

        let readout_y = label.bottom() + gap;
        let readout = Bounds::new(pad, readout_y, inner_w, (notice.y - readout_y).max(0.0));

        let prompt = cells[2];
        let entry_h = BASE_MENU_ENTRY_HEIGHT * scale;
        let menu_w = (prompt.w * 2.0 + gap).min(inner_w);
        let menu_x = prompt.x.min(width - pad - menu_w).max(pad);
        let confidential = Bounds::new(menu_x, controls.y - gap / 2.0 - entry_h, menu_w, entry_h);
        let regular = Bounds::new(menu_x, confidential.y - entry_h, menu_w, entry_h);

        Self {
            scale,
            label,
            minimize,
            close,
            readout,
            notice,
            progress,
            start: cells[0],
            reset: cells[1],
            prompt,
            settings: cells[3],
            prompt_menu: [regular, confidential],
        }
    }

    /// Resolve a click in normal mode
    ///
    /// While the prompt menu is open only its entries respond; a click
    /// anywhere else just closes it.
    pub fn hit_test(&self, menu_open: bool, x: f32, y: f32) -> Option<Hit> {
        if menu_open {
            let [regular, confidential] = self.prompt_menu;
            if regular.contains(x, y) {
                return Some(Hit::Action(OverlayAction::Prompt(PromptKind::Regular)));
            }
            if confidential.contains(x, y) {
                return Some(Hit::Action(OverlayAction::Prompt(PromptKind::Confidential)));
            }
            return None;
        }

        let targets = [
            (self.close, Hit::Action(OverlayAction::Close)),
            (self.minimize, Hit::Action(OverlayAction::Minimize)),
            (self.start, Hit::Action(OverlayAction::StartPause)),
            (self.reset, Hit::Action(OverlayAction::Reset)),
            (self.prompt, Hit::PromptMenu),
            (self.settings, Hit::Action(OverlayAction::Settings)),
        ];
        targets
            .into_iter()
            .find(|(bounds, _)| bounds.contains(x, y))
            .map(|(_, hit)| hit)
    }
}

/// Largest readout size not exceeding `configured` that fits `region`
///
/// `width_at_configured` is the measured width of the text at `configured`.
pub fn fit_font_size(configured: f32, width_at_configured: f32, region: Bounds) -> f32 {
    let mut size = configured;
    if width_at_configured > region.w && width_at_configured > 0.0 {
        size *= region.w / width_at_configured;
    }
    size.min(region.h * READOUT_HEIGHT_RATIO)
        .max(MIN_READOUT_SIZE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay
// ─────────────────────────────────────────────────────────────────────────────

pub struct CountdownOverlay {
    frame: OverlayFrame,
    data: CountdownData,
    style: CountdownStyle,
    mode: ViewMode,
    flash_lit: bool,
    menu_open: bool,
    notice: Option<Notice>,
    needs_render: bool,
}

impl CountdownOverlay {
    pub fn new(config: OverlayConfig, style: CountdownStyle) -> Result<Self, PlatformError> {
        let frame = OverlayFrame::new(config, BASE_WIDTH, BASE_HEIGHT)?;
        Ok(Self {
            frame,
            data: CountdownData::default(),
            style,
            mode: ViewMode::Normal,
            flash_lit: false,
            menu_open: false,
            notice: None,
            needs_render: true,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State updates (each marks the overlay dirty only on change)
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_data(&mut self, data: CountdownData) {
        if self.data != data {
            self.data = data;
            self.needs_render = true;
        }
    }

    pub fn set_style(&mut self, style: CountdownStyle) {
        if self.style != style {
            self.style = style;
            self.needs_render = true;
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        if self.style.opacity != opacity {
            self.style.opacity = opacity;
            self.needs_render = true;
        }
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            self.mode = mode;
            self.menu_open = false;
            self.needs_render = true;
        }
    }

    pub fn set_flash(&mut self, lit: bool) {
        if self.flash_lit != lit {
            self.flash_lit = lit;
            self.needs_render = true;
        }
    }

    pub fn show_notice(&mut self, text: impl Into<String>, now: Instant) {
        self.notice = Some(Notice {
            text: text.into(),
            expires_at: now + NOTICE_DURATION,
        });
        self.needs_render = true;
    }

    /// Drop the notice once it has been shown long enough
    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
            self.needs_render = true;
        }
    }

    /// Force a repaint on the next `render_if_needed`
    pub fn invalidate(&mut self) {
        self.needs_render = true;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    pub fn layout(&self) -> CountdownLayout {
        CountdownLayout::normal(
            self.frame.width() as f32,
            self.frame.height() as f32,
            self.frame.scale_factor(),
        )
    }

    /// Translate a click into an action; menu handling stays internal
    pub fn handle_click(&mut self, x: f32, y: f32) -> Option<OverlayAction> {
        if self.mode == ViewMode::Simple {
            return None;
        }
        let hit = self.layout().hit_test(self.menu_open, x, y);
        if self.menu_open {
            self.menu_open = false;
            self.needs_render = true;
        }
        match hit? {
            Hit::PromptMenu => {
                self.menu_open = true;
                self.needs_render = true;
                None
            }
            Hit::Action(action) => Some(action),
        }
    }

    /// Poll for window events, returns false if the window should close
    pub fn poll_events(&mut self) -> bool {
        let alive = self.frame.window_mut().poll_events();
        if self.frame.window_mut().take_geometry_dirty() {
            self.needs_render = true;
        }
        alive
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut OverlayFrame {
        &mut self.frame
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    pub fn render_if_needed(&mut self) {
        if self.needs_render && self.frame.window().is_visible() {
            self.render();
        }
    }

    pub fn render(&mut self) {
        match self.mode {
            ViewMode::Normal => self.render_normal(),
            ViewMode::Simple => self.render_simple(),
        }
        self.frame.end_frame();
        self.needs_render = false;
    }

    fn render_normal(&mut self) {
        let layout = self.layout();
        let s = layout.scale;
        let palette = self.style.palette;
        let background = if self.flash_lit {
            self.style.flash_color
        } else {
            palette.background
        };
        self.frame.begin_frame(None, background);

        // Header
        let label = truncate_name(&self.data.label, LABEL_MAX_CHARS);
        let label_font = BASE_LABEL_FONT * s;
        let baseline = layout.label.y + layout.label.h / 2.0 + label_font / 3.0;
        self.frame
            .draw_text(&label, layout.label.x, baseline, label_font, palette.label);
        let button_font = BASE_BUTTON_FONT * s;
        Button::new("_", layout.minimize)
            .flat()
            .render(&mut self.frame, &palette, button_font);
        Button::new("x", layout.close)
            .flat()
            .render(&mut self.frame, &palette, button_font);

        self.draw_readout(layout.readout);

        if let Some(notice) = &self.notice {
            let font = BASE_NOTICE_FONT * s;
            let y = layout.notice.y + layout.notice.h / 2.0 + font / 3.0;
            let text = notice.text.clone();
            self.frame
                .draw_text(&text, layout.notice.x, y, font, palette.notice);
        }

        ProgressBar::new(self.data.progress, &palette).render(&mut self.frame, layout.progress);

        let start_label = if self.data.running { "Pause" } else { "Start" };
        for (label, bounds) in [
            (start_label, layout.start),
            ("Reset", layout.reset),
            ("Prompt", layout.prompt),
            ("Settings", layout.settings),
        ] {
            Button::new(label, bounds).render(&mut self.frame, &palette, button_font);
        }

        if self.menu_open {
            self.draw_prompt_menu(&layout);
        }
    }

    fn draw_prompt_menu(&mut self, layout: &CountdownLayout) {
        let palette = self.style.palette;
        let [regular, confidential] = layout.prompt_menu;
        let outline = Bounds::new(
            regular.x,
            regular.y,
            regular.w,
            confidential.bottom() - regular.y,
        );
        let radius = 4.0 * layout.scale;
        self.frame
            .fill_rounded_rect(outline.x, outline.y, outline.w, outline.h, radius, palette.menu_bg);
        self.frame.stroke_rounded_rect(
            outline.x,
            outline.y,
            outline.w,
            outline.h,
            radius,
            1.0,
            palette.button_border,
        );
        let font = BASE_BUTTON_FONT * layout.scale;
        for (kind, bounds) in [
            (PromptKind::Regular, regular),
            (PromptKind::Confidential, confidential),
        ] {
            self.frame
                .draw_text_centered(kind.label(), bounds, font, palette.button_text);
        }
    }

    fn render_simple(&mut self) {
        let width = self.frame.width() as f32;
        let height = self.frame.height() as f32;
        let s = self.frame.scale_factor();
        let margin = BASE_SIMPLE_MARGIN * s;
        let region = Bounds::new(0.0, 0.0, width, height).inset(margin);

        let text = self.data.readout.to_string();
        let (configured_w, _) = self.frame.measure_text_bold(&text, self.style.font_size);
        let size = fit_font_size(self.style.font_size, configured_w, region);
        let (text_w, text_h) = self.frame.measure_text_bold(&text, size);

        let patch = Bounds::new(
            ((width - text_w) / 2.0 - margin).max(0.0),
            ((height - text_h) / 2.0 - margin).max(0.0),
            (text_w + margin * 2.0).min(width),
            (text_h + margin * 2.0).min(height),
        );
        let background = if self.flash_lit {
            self.style.flash_color
        } else {
            let alpha = meetclock_core::mode::background_alpha(self.style.opacity);
            with_alpha(self.style.palette.simple_background, alpha)
        };
        self.frame.begin_frame(Some(patch), background);
        self.draw_readout(region);
    }

    /// Draw the readout centred in `region`, shrinking it to fit
    fn draw_readout(&mut self, region: Bounds) {
        if region.w <= 0.0 || region.h <= 0.0 {
            return;
        }
        let color = self.style.palette.readout;
        let full = self.data.readout.to_string();
        let (configured_w, _) = self.frame.measure_text_bold(&full, self.style.font_size);
        let size = fit_font_size(self.style.font_size, configured_w, region);
        let baseline = region.y + region.h / 2.0 + size * 0.35;

        match self.data.readout.clone() {
            Readout::Clock { minutes, seconds } => {
                let (mw, _) = self.frame.measure_text_bold(&minutes, size);
                let (cw, _) = self.frame.measure_text_bold(":", size);
                let (sw, _) = self.frame.measure_text_bold(&seconds, size);
                let x = region.x + (region.w - (mw + cw + sw)) / 2.0;
                self.frame.draw_text_bold(&minutes, x, baseline, size, color);
                self.frame
                    .draw_text_bold(":", x + mw, baseline - size * COLON_LIFT, size, color);
                self.frame
                    .draw_text_bold(&seconds, x + mw + cw, baseline, size, color);
            }
            Readout::Single(text) => {
                let (tw, _) = self.frame.measure_text_bold(&text, size);
                let x = region.x + (region.w - tw) / 2.0;
                self.frame.draw_text_bold(&text, x, baseline, size, color);
            }
        }
    }
}
