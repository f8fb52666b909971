use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use eframe::{egui, App, Frame};
use egui::{Align, Align2, Color32, ColorImage, Key, Layout, Modifiers, Rect, RichText, TextureHandle, TextureOptions, Vec2};
use rfd::FileDialog;
use tokio::{
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver},
};

use crate::{
    config::AppConfig,
    downloader::{spawn_download, DownloadOptions},
    format::hhmmss,
    frames::FrameGrabber,
    loader::Loader,
    model::{DownloadEvent, DownloadSession, Notice, NoticeLevel, Screen, TrimEvent},
    playback::Playback,
    range_slider::{RangeSlider, SliderChanges},
    splash::{self, Splash},
    theme,
    thumbnail,
    trim::{run_trim, suggested_name, validate_range, TrimRequest},
};

const TITLE: &str = "Lobster Clipper";
const TRIM_LABEL: &str = "Trim & Save";
const TRIMMING_LABEL: &str = "Trimming…";

/// A download in flight, from "Load video" until success or failure
struct ActiveDownload {
    url: String,
    dir: PathBuf,
    rx: UnboundedReceiver<DownloadEvent>,
    loader: Loader,
    title: Option<String>,
}

/// Main window state
pub struct ClipperApp {
    config: AppConfig,
    rt: Handle,
    screen: Screen,
    /// Input field for the video URL
    url_input: String,
    download: Option<ActiveDownload>,
    session: Option<DownloadSession>,
    slider: RangeSlider,
    playback: Playback,
    trimming: bool,
    trim_rx: Option<UnboundedReceiver<TrimEvent>>,
    notice: Option<Notice>,
    /// False until the notice has been on screen for one frame
    notice_armed: bool,
    splash: Option<Splash>,
    grabber: Option<FrameGrabber>,
    preview: Option<TextureHandle>,
    poster: Option<TextureHandle>,
    /// Posters fetched on a blocking task, waiting to become textures
    poster_results: Arc<Mutex<Vec<ColorImage>>>,
}

impl ClipperApp {
    pub fn new(config: AppConfig, rt: Handle) -> Self {
        let splash = config.show_splash.then(Splash::default);
        Self {
            config,
            rt,
            screen: Screen::Download,
            url_input: String::new(),
            download: None,
            session: None,
            slider: RangeSlider::default(),
            playback: Playback::default(),
            trimming: false,
            trim_rx: None,
            notice: None,
            notice_armed: false,
            splash,
            grabber: None,
            preview: None,
            poster: None,
            poster_results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn trim_button_label(&self) -> &'static str {
        if self.trimming { TRIMMING_LABEL } else { TRIM_LABEL }
    }

    fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.notice_armed = false;
    }

    /// Page widgets only react while no splash or notice covers them.
    fn accepts_input(&self) -> bool {
        self.splash.is_none() && self.notice.is_none()
    }

    // ── download flow ───────────────────────────────────────────

    /// Validates the URL, creates the session directory and starts the worker.
    pub fn start_download(&mut self, now: f64) {
        let url = self.url_input.trim().to_string();
        if url.is_empty() {
            self.notify(Notice::warning("No URL", "Paste a YouTube URL."));
            return;
        }
        let dir = match tempfile::Builder::new().prefix("lobster_").tempdir() {
            Ok(dir) => dir.into_path(),
            Err(e) => {
                self.notify(Notice::error("Download error", format!("Could not create a temp folder: {}", e)));
                return;
            }
        };
        log::info!("Starting download of {} into {}", url, dir.display());

        let (tx, rx) = unbounded_channel();
        self.rt.spawn(spawn_download(url.clone(), dir.clone(), DownloadOptions::from(&self.config), tx));
        self.poster = None;
        self.download = Some(ActiveDownload { url, dir, rx, loader: Loader::new(now), title: None });
    }

    pub fn handle_download_event(&mut self, event: DownloadEvent, now: f64) {
        let Some(active) = self.download.as_mut() else { return };
        match event {
            DownloadEvent::Metadata { title, duration, thumbnail: poster_url } => {
                log::debug!("Metadata: \"{}\", {}s", title, duration);
                active.title = Some(title);
                if let Some(url) = poster_url {
                    let results = Arc::clone(&self.poster_results);
                    self.rt.spawn_blocking(move || {
                        if let Some(img) = thumbnail::fetch_poster(&url) {
                            if let Ok(mut pending) = results.lock() {
                                pending.push(img);
                            }
                        }
                    });
                }
            }
            DownloadEvent::Progress(pct) => active.loader.set_progress(pct, now),
            DownloadEvent::Finished { path, duration } => {
                let Some(active) = self.download.take() else { return };
                self.open_session(DownloadSession { url: active.url, dir: active.dir, path, duration });
            }
            DownloadEvent::Failed(msg) => {
                // temp dir stays behind for manual cleanup
                self.download = None;
                self.notify(Notice::error("Download error", msg));
            }
        }
    }

    fn open_session(&mut self, session: DownloadSession) {
        log::info!("Session ready: {} -> {} ({}s)", session.url, session.path.display(), session.duration);
        let duration = session.duration as i64;
        self.slider.set_range(0, duration);
        self.slider.set_lower(0);
        self.slider.set_upper(duration);
        self.slider.set_value(0);
        self.slider.take_changes();
        self.playback = Playback::default();
        self.grabber = None;
        self.preview = None;
        self.session = Some(session);
        self.screen = Screen::Trim;
    }

    // ── trim flow ───────────────────────────────────────────────

    /// Builds a trim request from the current selection. `pick` is only asked
    /// for a destination once the range is known to be valid.
    pub fn request_trim<F>(&mut self, pick: F) -> Option<TrimRequest>
    where
        F: FnOnce(Option<&Path>, &str) -> Option<PathBuf>,
    {
        if self.trimming {
            return None;
        }
        let session = self.session.as_ref()?;
        let (start, end) = (self.slider.lower().max(0) as u64, self.slider.upper().max(0) as u64);
        if let Err(e) = validate_range(start, end) {
            self.notify(Notice::warning("Bad range", e.to_string()));
            return None;
        }
        let mut destination = pick(self.config.last_save_dir.as_deref(), &suggested_name(&session.path))?;
        if destination.extension().is_none() {
            destination.set_extension("mp4");
        }
        TrimRequest::new(session.path.clone(), start, end, destination).ok()
    }

    pub fn start_trim(&mut self, request: TrimRequest) {
        self.playback.pause();
        self.trimming = true;
        let cleanup = self.session.as_ref().map(|s| s.dir.clone());
        let ffmpeg = self.config.ffmpeg_binary.clone();
        let (tx, rx) = unbounded_channel();
        self.trim_rx = Some(rx);
        self.rt.spawn(async move {
            let event = run_trim(ffmpeg, request, cleanup).await;
            let _ = tx.send(event);
        });
    }

    /// Either outcome ends the session and returns to the download page.
    pub fn handle_trim_event(&mut self, event: TrimEvent) {
        self.trimming = false;
        self.trim_rx = None;
        self.notify(match event {
            TrimEvent::Saved(path) => Notice::info("Saved", format!("Clip saved to:\n{}", path.display())),
            TrimEvent::Failed(msg) => Notice::error("FFmpeg error", msg),
        });
        self.session = None;
        self.grabber = None;
        self.preview = None;
        self.poster = None;
        self.playback = Playback::default();
        self.screen = Screen::Download;
    }

    fn remember_save_dir(&mut self, destination: &Path) {
        let dir = destination.parent().map(Path::to_path_buf);
        if dir.is_none() || dir == self.config.last_save_dir {
            return;
        }
        self.config.last_save_dir = dir;
        if let Err(e) = self.config.store() {
            log::warn!("Could not save config: {:#}", e);
        }
    }

    // ── playback ────────────────────────────────────────────────

    fn bounds(&self) -> (f64, f64) {
        (self.slider.lower() as f64, self.slider.upper() as f64)
    }

    fn seek(&mut self, seconds: f64) {
        self.playback.seek(seconds);
        self.slider.sync_value(seconds as i64);
        if let Some(grabber) = self.grabber.as_mut() {
            grabber.request(self.playback.position(), true);
        }
    }

    /// Reacts to what the user did with the slider this frame.
    pub fn apply_slider_changes(&mut self, changes: SliderChanges) {
        for bound in [changes.lower, changes.upper].into_iter().flatten() {
            self.playback.pause();
            self.seek(bound as f64);
        }
        if let (Some(v), None, None) = (changes.value, changes.lower, changes.upper) {
            self.seek(v as f64);
        }
    }

    pub fn toggle_play(&mut self) {
        if self.playback.is_playing() {
            self.playback.pause();
            return;
        }
        if self.playback.position() >= self.slider.upper() as f64 {
            // replay the selection from its start
            let lower = self.slider.lower() as f64;
            self.seek(lower);
        }
        self.playback.play();
    }

    pub fn nudge(&mut self, dt: f64) {
        let (lower, upper) = self.bounds();
        self.playback.nudge(dt, lower, upper);
        let pos = self.playback.position();
        self.slider.sync_value(pos as i64);
        if let Some(grabber) = self.grabber.as_mut() {
            grabber.request(pos, true);
        }
    }

    fn tick(&mut self, dt: f64) {
        let (lower, upper) = self.bounds();
        self.playback.tick(dt, lower, upper);
        let pos = self.playback.position();
        self.slider.sync_value(pos as i64);
        if let Some(grabber) = self.grabber.as_mut() {
            grabber.request(pos, false);
        }
    }

    // ── worker mailboxes ────────────────────────────────────────

    fn poll_workers(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);

        let mut events = Vec::new();
        if let Some(active) = self.download.as_mut() {
            while let Ok(ev) = active.rx.try_recv() {
                events.push(ev);
            }
        }
        for ev in events {
            self.handle_download_event(ev, now);
        }

        let trim_done = self.trim_rx.as_mut().and_then(|rx| rx.try_recv().ok());
        if let Some(ev) = trim_done {
            self.handle_trim_event(ev);
        }

        let posters: Vec<ColorImage> = match self.poster_results.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        if let Some(img) = posters.into_iter().last() {
            self.poster = Some(ctx.load_texture("poster", img, TextureOptions::LINEAR));
        }

        if let Some(frame) = self.grabber.as_ref().and_then(FrameGrabber::take_latest) {
            log::trace!("Preview frame at {:.2}s", frame.seconds);
            match self.preview.as_mut() {
                Some(tex) => tex.set(frame.image, TextureOptions::LINEAR),
                None => self.preview = Some(ctx.load_texture("preview", frame.image, TextureOptions::LINEAR)),
            }
        }
    }

    // ── UI ──────────────────────────────────────────────────────

    fn title_bar(&mut self, ctx: &egui::Context) {
        let buttons_enabled = self.splash.is_none();
        egui::TopBottomPanel::top("title_bar")
            .exact_height(32.0)
            .frame(egui::Frame::none().fill(theme::NAVY).inner_margin(egui::Margin::symmetric(10.0, 4.0)))
            .show(ctx, |ui| {
                let bar = ui.max_rect();
                let drag = ui.interact(bar, egui::Id::new("title_bar_drag"), egui::Sense::click_and_drag());
                if drag.is_pointer_button_down_on() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
                }
                ui.horizontal_centered(|ui| {
                    ui.label(RichText::new(TITLE).size(16.0).color(theme::CREAM));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.set_enabled(buttons_enabled);
                        ui.spacing_mut().item_spacing.x = 4.0;
                        if theme::glow_button(ui, "🗙", theme::RED, theme::RED, theme::RED).clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                        if theme::glow_button(ui, "–", theme::CORAL, theme::CREAM, theme::TRACK).clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
                        }
                    });
                });
            });
    }

    fn download_screen(&mut self, ui: &mut egui::Ui) {
        let now = ui.input(|i| i.time);
        if self.download.is_none() {
            let mut go = false;
            ui.horizontal(|ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut self.url_input)
                        .hint_text("Paste YouTube URL…")
                        .desired_width(ui.available_width() - 140.0),
                );
                // consumed so the notice this may raise does not see it too
                if edit.lost_focus() && ui.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Enter)) {
                    go = true;
                }
                go |= ui.button("Load video").clicked();
            });
            let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), 260.0), egui::Sense::hover());
            splash::paint_logo(ui.painter(), rect.center(), 110.0, 0.0, 1.0);
            ui.vertical_centered(|ui| ui.heading(TITLE));
            if go {
                self.start_download(now);
            }
        } else if let Some(active) = &self.download {
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                if let Some(title) = &active.title {
                    ui.label(RichText::new(title).size(18.0));
                }
                if let Some(poster) = &self.poster {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), 180.0), egui::Sense::hover());
                    let fitted = fit_rect(rect, poster.size_vec2());
                    ui.painter().image(poster.id(), fitted, full_uv(), Color32::WHITE);
                } else {
                    ui.add_space(60.0);
                }
            });
            active.loader.ui(ui);
        }
    }

    fn trim_screen(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.session.as_ref() else {
            self.screen = Screen::Download;
            return;
        };
        if self.grabber.is_none() {
            let mut grabber = FrameGrabber::spawn(&self.rt, self.config.ffmpeg_binary.clone(), session.path.clone(), ui.ctx().clone());
            grabber.request(self.playback.position(), true);
            self.grabber = Some(grabber);
        }
        let duration = session.duration as f64;

        // keyboard fine-tuning
        if self.accepts_input() && !self.trimming {
            // consumed here so a focused button does not also react to Space
            let (space, back, fwd, shift) = ui.input_mut(|i| {
                let m = i.modifiers;
                (
                    i.consume_key(m, Key::Space),
                    i.consume_key(m, Key::A) | i.consume_key(m, Key::ArrowLeft),
                    i.consume_key(m, Key::D) | i.consume_key(m, Key::ArrowRight),
                    m.shift,
                )
            });
            let step = if shift { 0.1 } else { 1.0 };
            if space {
                self.toggle_play();
            }
            if back {
                self.nudge(-step);
            }
            if fwd {
                self.nudge(step);
            }
        }
        if self.playback.is_playing() {
            let dt = ui.input(|i| i.stable_dt) as f64;
            self.tick(dt);
            ui.ctx().request_repaint();
        }

        // playback surface
        let surface_h = (ui.available_height() - 96.0).max(120.0);
        let (surface, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), surface_h), egui::Sense::hover());
        ui.painter().rect_filled(surface, 6.0, Color32::BLACK);
        if let Some(tex) = &self.preview {
            ui.painter().image(tex.id(), fit_rect(surface, tex.size_vec2()), full_uv(), Color32::WHITE);
        }

        // range row
        let (start_lbl, end_lbl) = (hhmmss(self.slider.lower() as f64), hhmmss(self.slider.upper() as f64));
        ui.horizontal(|ui| {
            let w = (ui.available_width() - 170.0).max(100.0);
            ui.allocate_ui(egui::vec2(w, 28.0), |ui| {
                self.slider.ui(ui);
            });
            ui.label(RichText::new(start_lbl).size(14.0));
            ui.label(RichText::new(end_lbl).size(14.0));
        });
        let changes = self.slider.take_changes();
        if !changes.is_empty() {
            self.apply_slider_changes(changes);
        }

        // controls
        let mut trim_clicked = false;
        ui.horizontal(|ui| {
            let icon = if self.playback.is_playing() { "⏸" } else { "▶" };
            if ui.button(icon).clicked() {
                self.toggle_play();
            }
            let time = format!("{} / {}", hhmmss(self.playback.position()), hhmmss(duration));
            ui.label(RichText::new(time).size(14.0));
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let label = self.trim_button_label();
                trim_clicked = ui.add_enabled(!self.trimming, egui::Button::new(label)).clicked();
            });
        });

        if trim_clicked {
            let request = self.request_trim(|dir, name| {
                let mut dialog = FileDialog::new().set_file_name(name).add_filter("MP4 Video", &["mp4"]);
                if let Some(dir) = dir {
                    dialog = dialog.set_directory(dir);
                }
                dialog.save_file()
            });
            if let Some(request) = request {
                self.remember_save_dir(&request.destination);
                self.start_trim(request);
            }
        }
    }

    fn notice_window(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notice.as_ref() else { return };
        // the Enter that raised the notice must not also dismiss it
        let mut close = self.notice_armed && ctx.input(|i| i.key_pressed(Key::Enter));
        let backdrop = ctx.layer_painter(egui::LayerId::new(egui::Order::PanelResizeLine, egui::Id::new("notice_backdrop")));
        backdrop.rect_filled(ctx.screen_rect(), 0.0, Color32::from_black_alpha(150));

        let accent = match notice.level {
            NoticeLevel::Info => theme::CREAM,
            NoticeLevel::Warning => theme::GOLD,
            NoticeLevel::Error => theme::CORAL,
        };
        egui::Window::new(RichText::new(&notice.title).color(accent))
            .id(egui::Id::new("notice"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_max_width(420.0);
                ui.label(&notice.body);
                ui.add_space(6.0);
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
            });
        self.notice_armed = true;
        if close {
            self.notice = None;
        }
    }
}

/// Largest rect with `size`'s aspect ratio centred inside `container`
pub fn fit_rect(container: Rect, size: Vec2) -> Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return container;
    }
    let scale = (container.width() / size.x).min(container.height() / size.y);
    Rect::from_center_size(container.center(), size * scale)
}

fn full_uv() -> Rect {
    Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
}

impl ClipperApp {
    /// Draws one frame of the whole window.
    fn show(&mut self, ctx: &egui::Context) {
        self.poll_workers(ctx);
        self.title_bar(ctx);

        let enabled = self.accepts_input();
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme::NAVY).inner_margin(egui::Margin::same(16.0)))
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| match self.screen {
                    Screen::Download => self.download_screen(ui),
                    Screen::Trim => self.trim_screen(ui),
                });
            });

        self.notice_window(ctx);

        if let Some(splash) = self.splash.as_mut() {
            if splash.show(ctx) {
                self.splash = None;
            }
        }

        // Request periodic repaint for worker updates
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for ClipperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.show(ctx);
    }
}
