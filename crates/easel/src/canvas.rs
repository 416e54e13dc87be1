//! The user-facing canvas: one window, one logical coordinate system, and
//! every drawing, input and pacing call of the library.
//!
//! The canvas owns all state explicitly — style, pen position, retained
//! scene, batch cache, fonts, images — so two pieces of code can only
//! interfere through the `Canvas` value they share. Drawings accumulate
//! across `refresh` calls until [`Canvas::clear`] wipes the scene.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use easel_core::{
    color, tessellate, BatchCache, BatchId, Color, DrawBuffer, DrawStyle, LogicalSpace, Rect,
    Vec2, Viewport, DEFAULT_TEXT_HEIGHT,
};
use winit::dpi::LogicalSize;

use crate::driver::{Driver, DriverConfig};
use crate::gpu::SurfaceErrorAction;
use crate::images::ImageCache;
use crate::input::{Input, Key, MouseButton, WaitResult};
use crate::pacer::Pacer;
use crate::render::SceneRenderer;
use crate::text::TextEngine;

/// Window parameters for [`Canvas::open`]. Width and height fix the
/// logical coordinate system for the lifetime of the canvas.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub fullscreen: bool,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>, width: f64, height: f64) -> Self {
        Self { title: title.into(), width, height, fullscreen: false }
    }

    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("easel window", 800.0, 600.0)
    }
}

/// A window plus everything needed to draw into it.
pub struct Canvas {
    driver: Driver,
    space: LogicalSpace,
    style: DrawStyle,
    pen: Vec2,

    retained: DrawBuffer,
    batches: BatchCache,
    batch_names: HashMap<String, BatchId>,

    text_engine: TextEngine,
    images: ImageCache,
    renderer: SceneRenderer,

    pacer: Pacer,
    started: Instant,
}

impl Canvas {
    /// Opens the window and sets up the GPU. Only one canvas can exist at
    /// a time; a second call while one is open returns an error.
    pub fn open(config: WindowConfig) -> Result<Self> {
        crate::logging::init_logging(crate::logging::LoggingConfig::default());

        anyhow::ensure!(
            config.width.is_finite() && config.width >= 1.0
                && config.height.is_finite() && config.height >= 1.0,
            "window size must be at least 1x1 logical pixels"
        );

        let space = LogicalSpace::new(config.width as f32, config.height as f32);
        let mut driver = Driver::open(DriverConfig {
            title: config.title,
            width: config.width,
            height: config.height,
            fullscreen: config.fullscreen,
        })?;

        let renderer = {
            let gpu = driver.gpu_mut().context("window opened without a GPU context")?;
            SceneRenderer::new(gpu)
        };

        let now = Instant::now();
        let mut canvas = Self {
            driver,
            space,
            style: DrawStyle::default(),
            pen: Vec2::zero(),
            retained: DrawBuffer::new(),
            batches: BatchCache::new(),
            batch_names: HashMap::new(),
            text_engine: TextEngine::new(),
            images: ImageCache::default(),
            renderer,
            pacer: Pacer::new(now),
            started: now,
        };
        canvas.push_background();
        Ok(canvas)
    }

    // ── scene ─────────────────────────────────────────────────────────────

    /// Erases all drawings and fills the window with the current
    /// background color.
    pub fn clear(&mut self) {
        self.retained.clear();
        self.push_background();
    }

    fn push_background(&mut self) {
        let full = Rect::new(0.0, 0.0, self.space.width, self.space.height);
        self.retained.push(
            None,
            &tessellate::quad(full, easel_core::WHITE_UV, easel_core::WHITE_UV, self.style.background),
        );
    }

    // ── pen ───────────────────────────────────────────────────────────────

    /// Moves the pen without drawing.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.pen = Vec2::new(x, y);
    }

    /// Draws from the pen to `(x, y)` and moves the pen there.
    pub fn line_to(&mut self, x: f32, y: f32) {
        let to = Vec2::new(x, y);
        let from = self.pen;
        let style = self.style;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::line(buf, from, to, &style);
        self.pen = to;
    }

    // ── shapes ────────────────────────────────────────────────────────────

    /// Line segment in the stroke color. Leaves the pen at the end point.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let style = self.style;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::line(buf, Vec2::new(x1, y1), Vec2::new(x2, y2), &style);
        self.pen = Vec2::new(x2, y2);
    }

    pub fn triangle(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        let style = self.style;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::triangle(
            buf,
            Vec2::new(x1, y1),
            Vec2::new(x2, y2),
            Vec2::new(x3, y3),
            &style,
        );
    }

    /// Triangle colored by blend vertices 0..=2 instead of the fill color.
    pub fn triangle_blend(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        let style = self.style;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::triangle_blend(
            buf,
            Vec2::new(x1, y1),
            Vec2::new(x2, y2),
            Vec2::new(x3, y3),
            &style,
        );
    }

    pub fn rectangle(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let style = self.style;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::rectangle(buf, Rect::new(x, y, w, h), &style);
    }

    /// Rectangle colored by the four blend vertices at its corners
    /// (top-left, top-right, bottom-right, bottom-left).
    pub fn rectangle_blend(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let style = self.style;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::rectangle_blend(buf, Rect::new(x, y, w, h), &style);
    }

    pub fn circle(&mut self, x: f32, y: f32, r: f32) {
        let style = self.style;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::circle(buf, Vec2::new(x, y), r, &style);
    }

    // ── text ──────────────────────────────────────────────────────────────

    /// Text with its top-left at `(x, y)` at the default height.
    pub fn text(&mut self, x: f32, y: f32, s: &str) {
        self.text_sized(x, y, DEFAULT_TEXT_HEIGHT, s);
    }

    /// Text at an explicit height in logical units.
    pub fn text_sized(&mut self, x: f32, y: f32, height: f32, s: &str) {
        let style = self.style;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        self.text_engine.tessellate(buf, s, x, y, height, 1.0, style.stroke, style.font);
    }

    /// Text stretched horizontally to exactly fill `w` × `h`.
    pub fn text_rect(&mut self, x: f32, y: f32, w: f32, h: f32, s: &str) {
        if s.is_empty() || w <= 0.0 || h <= 0.0 {
            return;
        }
        let natural = self.text_engine.measure_width(s, self.style.font, h);
        if natural <= 0.0 {
            return;
        }
        let style = self.style;
        let x_scale = w / natural;
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        self.text_engine.tessellate(buf, s, x, y, h, x_scale, style.stroke, style.font);
    }

    /// Text centered on `(cx, cy)`.
    pub fn text_centered(&mut self, cx: f32, cy: f32, height: f32, s: &str) {
        let width = self.text_engine.measure_width(s, self.style.font, height);
        self.text_sized(cx - width * 0.5, cy - height * 0.5, height, s);
    }

    /// Width `s` would occupy at `height`, in logical units.
    pub fn text_width(&mut self, height: f32, s: &str) -> f32 {
        self.text_engine.measure_width(s, self.style.font, height)
    }

    /// Switches the active font. An empty path selects the built-in
    /// bitmap font. On failure the call is logged, the previous font is
    /// kept, and `false` is returned.
    pub fn set_font(&mut self, path: &str) -> bool {
        match self.text_engine.load_font(path) {
            Ok(id) => {
                self.style.font = id;
                true
            }
            Err(e) => {
                log::error!("set_font: {e}");
                false
            }
        }
    }

    // ── images ────────────────────────────────────────────────────────────

    /// Draws an image file at its natural pixel size (1 pixel = 1 logical
    /// unit). A missing or undecodable file is logged and skipped.
    pub fn image(&mut self, x: f32, y: f32, path: &str) -> bool {
        let key = match self.images.load_file(path) {
            Ok(key) => key,
            Err(e) => {
                log::error!("image: {e}");
                return false;
            }
        };
        let Some((w, h)) = self.images.size_of(key) else { return false };
        self.push_image_quad(key, Rect::new(x, y, w as f32, h as f32));
        true
    }

    /// Draws an image file scaled to `w` × `h` logical units.
    pub fn image_sized(&mut self, x: f32, y: f32, w: f32, h: f32, path: &str) -> bool {
        let key = match self.images.load_file(path) {
            Ok(key) => key,
            Err(e) => {
                log::error!("image: {e}");
                return false;
            }
        };
        self.push_image_quad(key, Rect::new(x, y, w, h));
        true
    }

    /// Draws a rectangular cut of an image file: the `sw` × `sh` pixel
    /// region at `(sx, sy)` of the source, scaled to `w` × `h` logical
    /// units.
    pub fn image_part(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        sx: u32,
        sy: u32,
        sw: u32,
        sh: u32,
        path: &str,
    ) -> bool {
        let key = match self.images.load_file(path) {
            Ok(key) => key,
            Err(e) => {
                log::error!("image: {e}");
                return false;
            }
        };
        let Some((iw, ih)) = self.images.size_of(key) else { return false };
        if sw == 0 || sh == 0 || u64::from(sx) + u64::from(sw) > u64::from(iw)
            || u64::from(sy) + u64::from(sh) > u64::from(ih)
        {
            log::error!("image_part: cut {sx},{sy} {sw}x{sh} outside {iw}x{ih} image {path}");
            return false;
        }
        let uv_min = [sx as f32 / iw as f32, sy as f32 / ih as f32];
        let uv_max = [(sx + sw) as f32 / iw as f32, (sy + sh) as f32 / ih as f32];
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::textured_quad(buf, Some(key), Rect::new(x, y, w, h), uv_min, uv_max, color::WHITE);
        true
    }

    /// Draws a caller-owned RGBA8 pixel buffer (`pw` × `ph` pixels) scaled
    /// to `w` × `h` logical units. The buffer is identified by its address;
    /// pass `reload = true` after mutating its pixels to re-upload them,
    /// `false` to reuse the texture as uploaded.
    pub fn image_raw(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        pw: u32,
        ph: u32,
        data: &[u8],
        reload: bool,
    ) -> bool {
        let Some(key) = self.images.put_raw(data, pw, ph, reload) else {
            log::error!("image_raw: buffer shorter than {pw}x{ph} RGBA pixels");
            return false;
        };
        self.push_image_quad(key, Rect::new(x, y, w, h));
        true
    }

    fn push_image_quad(&mut self, key: easel_core::TextureKey, rect: Rect) {
        let buf = self.batches.capture_buffer().unwrap_or(&mut self.retained);
        tessellate::textured_quad(buf, Some(key), rect, [0.0, 0.0], [1.0, 1.0], color::WHITE);
    }

    // ── batches ───────────────────────────────────────────────────────────

    /// Starts recording drawing calls into the named batch instead of the
    /// scene. Re-recording an existing name replaces its old contents when
    /// [`end_batch`](Self::end_batch) runs. Nested captures are logged and
    /// ignored.
    pub fn begin_batch(&mut self, name: &str) {
        let reuse = self.batch_names.get(name).copied();
        if let Some(id) = self.batches.begin_into(reuse) {
            self.batch_names.insert(name.to_string(), id);
        }
    }

    /// Stops recording and seals the batch for replay.
    pub fn end_batch(&mut self) {
        self.batches.end();
    }

    /// Draws the named batch with its origin translated to `(x, y)`.
    /// Unknown or still-recording names are logged and draw nothing.
    pub fn draw_batch(&mut self, name: &str, x: f32, y: f32) -> bool {
        let Some(&id) = self.batch_names.get(name) else {
            log::error!("draw_batch: no batch named {name:?}");
            return false;
        };
        self.batches.replay(id, &mut self.retained, Vec2::new(x, y))
    }

    // ── frame loop ────────────────────────────────────────────────────────

    /// Processes window events, presents a frame when one is due, and
    /// sleeps to hold the step rate. Returns `false` once the window has
    /// been closed; the usual program shape is `while canvas.refresh() {}`.
    pub fn refresh(&mut self) -> bool {
        if !self.driver.alive() {
            return false;
        }
        self.driver.pump();
        if !self.driver.alive() {
            return false;
        }

        if self.pacer.should_render(Instant::now()) {
            self.render_frame();
            self.pacer.note_frame(Instant::now());
        }

        let sleep = self.pacer.step_sleep(Instant::now());
        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
        self.driver.alive()
    }

    fn render_frame(&mut self) {
        let Some(gpu) = self.driver.gpu_mut() else { return };
        let size = gpu.size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let fatal = gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal;
                if fatal {
                    log::error!("unrecoverable surface error; closing the window");
                    self.driver.close();
                }
                return;
            }
        };

        self.renderer.sync_atlas(gpu, &mut self.text_engine.atlas);
        self.renderer.sync_images(gpu, &mut self.images);

        let viewport = Viewport::fit(self.space, size.width as f32, size.height as f32);
        self.renderer.render(gpu, &mut frame, &viewport, &self.retained, self.style.inactive);
        gpu.submit(frame);
    }

    /// Runs the frame loop for `seconds`, or until the window closes.
    pub fn wait(&mut self, seconds: f64) {
        let deadline = Instant::now() + Duration::from_secs_f64(seconds.max(0.0));
        while Instant::now() < deadline && self.refresh() {}
    }

    /// Runs the frame loop until the user closes the window.
    pub fn wait_until_closed(&mut self) {
        while self.refresh() {}
    }

    /// Blocks until any input event arrives, the timeout passes, or the
    /// window closes.
    ///
    /// Always runs at least one frame step, so `Some(Duration::ZERO)`
    /// means "one step, then tell me whether anything happened" — the
    /// idiom for key-interruptible animation loops.
    pub fn wait_for_input(&mut self, timeout: Option<Duration>) -> WaitResult {
        self.wait_matching(timeout, |_| true)
    }

    /// Blocks until a key is pressed. Returns `None` if the timeout passes
    /// or the window closes first.
    pub fn wait_for_key(&mut self, timeout: Option<Duration>) -> Option<Key> {
        match self.wait_matching(timeout, |ev| matches!(ev, Input::Key(_))) {
            WaitResult::Input(Input::Key(key)) => Some(key),
            _ => None,
        }
    }

    /// Blocks until a mouse button is pressed. Returns `None` if the
    /// timeout passes or the window closes first.
    pub fn wait_for_mouse(&mut self, timeout: Option<Duration>) -> Option<MouseButton> {
        match self.wait_matching(timeout, |ev| matches!(ev, Input::Mouse(_))) {
            WaitResult::Input(Input::Mouse(btn)) => Some(btn),
            _ => None,
        }
    }

    fn wait_matching(&mut self, timeout: Option<Duration>, filter: impl Fn(Input) -> bool) -> WaitResult {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if !self.refresh() {
                return WaitResult::Closed;
            }
            if let Some(ev) = self.driver.queue_mut().take_next(&filter) {
                return WaitResult::Input(ev);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return WaitResult::TimedOut;
            }
        }
    }

    /// Reads a line of text typed by the user, echoing it at `(x, y)` in
    /// `height`-unit glyphs with a cursor while typing. Enter finishes,
    /// Backspace edits, Escape cancels and returns what was typed so far.
    /// When `persist` is true the final text stays on the canvas. Input
    /// stops growing at `max_chars` characters (`0` = unlimited).
    pub fn read_line(&mut self, x: f32, y: f32, height: f32, persist: bool, max_chars: usize) -> String {
        let mut entered = String::new();
        self.driver.queue_mut().clear();

        let mut done = false;
        while !done {
            // Transient echo: drawn for this frame only, rolled back after.
            let mark = self.retained.vertices().len();
            let style = self.style;
            let shown = format!("{entered}_");
            self.text_engine.tessellate(
                &mut self.retained,
                &shown,
                x,
                y,
                height,
                1.0,
                style.stroke,
                style.font,
            );
            let alive = self.refresh();
            self.retained.truncate(mark);
            if !alive {
                break;
            }

            while let Some(t) = self.driver.queue_mut().take_text() {
                for c in t.chars().filter(|c| !c.is_control()) {
                    if max_chars != 0 && entered.chars().count() >= max_chars {
                        break;
                    }
                    entered.push(c);
                }
            }
            while let Some(ev) = self.driver.queue_mut().take_next(|ev| {
                matches!(ev, Input::Key(Key::Enter | Key::KeypadEnter | Key::Backspace | Key::Escape))
            }) {
                match ev {
                    Input::Key(Key::Backspace) => {
                        entered.pop();
                    }
                    _ => {
                        done = true;
                        break;
                    }
                }
            }
        }

        if persist && !entered.is_empty() {
            let style = self.style;
            self.text_engine.tessellate(
                &mut self.retained,
                &entered,
                x,
                y,
                height,
                1.0,
                style.stroke,
                style.font,
            );
        }
        entered
    }

    // ── input state ───────────────────────────────────────────────────────

    pub fn is_key_down(&self, key: Key) -> bool {
        self.driver.input().key_down(key)
    }

    pub fn is_button_down(&self, btn: MouseButton) -> bool {
        self.driver.input().button_down(btn)
    }

    /// Whether the given input is currently held. Wheel "events" are
    /// momentary and never count as held.
    pub fn is_down(&self, input: Input) -> bool {
        match input {
            Input::Key(key) => self.is_key_down(key),
            Input::Mouse(btn) => self.is_button_down(btn),
            Input::WheelUp | Input::WheelDown => false,
        }
    }

    /// Pointer x in logical coordinates, or `-1.0` while the pointer is
    /// outside the window.
    pub fn mouse_x(&self) -> f32 {
        self.mouse_position().map_or(-1.0, |(x, _)| x)
    }

    /// Pointer y in logical coordinates, or `-1.0` while the pointer is
    /// outside the window.
    pub fn mouse_y(&self) -> f32 {
        self.mouse_position().map_or(-1.0, |(_, y)| y)
    }

    /// Pointer position in logical coordinates, if it is over the window.
    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        let device = self.driver.input().pointer?;
        let gpu = self.driver.gpu()?;
        let size = gpu.size();
        let viewport = Viewport::fit(self.space, size.width as f32, size.height as f32);
        let p = viewport.map_to_logical(device);
        Some((p.x, p.y))
    }

    /// Accumulated mouse wheel position (positive = scrolled away from
    /// the user).
    pub fn mouse_wheel(&self) -> f64 {
        self.driver.input().wheel_pos
    }

    pub fn has_focus(&self) -> bool {
        self.driver.input().focused
    }

    // ── style ─────────────────────────────────────────────────────────────

    /// Stroke color for lines, outlines and text.
    pub fn set_color(&mut self, c: Color) {
        self.style.set_stroke(c);
    }

    pub fn set_fill_color(&mut self, c: Color) {
        self.style.set_fill(c);
    }

    /// Color used by [`clear`](Self::clear). Takes effect on the next
    /// clear, not retroactively.
    pub fn set_background_color(&mut self, c: Color) {
        self.style.set_background(c);
    }

    /// Color of the border that appears when the window aspect ratio
    /// differs from the logical one.
    pub fn set_inactive_color(&mut self, c: Color) {
        self.style.set_inactive(c);
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        self.style.set_thickness(thickness);
    }

    /// One of the four blend-vertex colors used by the `_blend` variants.
    pub fn set_blend_color(&mut self, vertex_idx: usize, c: Color) {
        self.style.set_blend(vertex_idx, c);
    }

    /// Restores default style attributes, keeping the background and
    /// inactive colors.
    pub fn set_defaults(&mut self) {
        self.style.reset();
    }

    // ── window ────────────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: &str) {
        if let Some(window) = self.driver.window() {
            window.set_title(title);
        }
    }

    /// Requests a new window size in logical pixels. The drawing
    /// coordinate system is unaffected; the picture rescales.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if let Some(window) = self.driver.window() {
            let _ = window.request_inner_size(LogicalSize::new(width.max(1.0), height.max(1.0)));
        }
    }

    pub fn maximize(&mut self) {
        if let Some(window) = self.driver.window() {
            window.set_maximized(true);
        }
    }

    /// Logical width, as fixed at creation.
    pub fn width(&self) -> f32 {
        self.space.width
    }

    /// Logical height, as fixed at creation.
    pub fn height(&self) -> f32 {
        self.space.height
    }

    pub fn is_open(&self) -> bool {
        self.driver.alive()
    }

    /// Closes the window. Subsequent `refresh` calls return `false`.
    pub fn close(&mut self) {
        self.driver.close();
    }

    // ── pacing ────────────────────────────────────────────────────────────

    /// Target frames per second (default 25). Under load the frame rate
    /// degrades before the step rate does.
    pub fn set_fps(&mut self, fps: f64) {
        self.pacer.set_fps(fps);
    }

    /// Target `refresh` calls per second (default 50).
    pub fn set_steps_per_second(&mut self, steps: f64) {
        self.pacer.set_steps_per_second(steps);
    }

    /// Frames per second actually presented recently.
    pub fn measured_fps(&self) -> f64 {
        self.pacer.measured_fps()
    }

    /// Seconds since the canvas was opened.
    pub fn time_since_start(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
