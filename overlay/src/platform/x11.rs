//! X11 platform implementation for the overlay window
//!
//! Uses XCB via x11rb for a frameless, per-pixel transparent window.
//! Requires a compositor for transparency.

use std::fs::File;
use std::os::fd::AsFd;

use rustix::fs::{MemfdFlags, memfd_create};
use rustix::mm::{MapFlags, ProtFlags, mmap};
use x11rb::atom_manager;
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::shm::{self, ConnectionExt as _};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::{CursorShape, MonitorInfo, OverlayConfig, OverlayPlatform, PlatformError};
use super::{PointerAction, PointerTracker};

// Atoms needed for EWMH hints
atom_manager! {
    pub AtomCollection: AtomCollectionCookie {
        _NET_WM_NAME,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_UTILITY,
        _NET_WM_STATE,
        _NET_WM_STATE_ABOVE,
        _NET_WM_STATE_SKIP_TASKBAR,
        _NET_WM_STATE_SKIP_PAGER,
        UTF8_STRING,
        ATOM,
    }
}

// Glyphs from the standard X cursor font
const XC_LEFT_PTR: u16 = 68;
const XC_SB_H_DOUBLE_ARROW: u16 = 108;
const XC_SB_V_DOUBLE_ARROW: u16 = 116;
const XC_BOTTOM_RIGHT_CORNER: u16 = 14;
const XC_BOTTOM_LEFT_CORNER: u16 = 12;

// ─────────────────────────────────────────────────────────────────────────────
// Monitor Enumeration
// ─────────────────────────────────────────────────────────────────────────────

fn monitors_on(conn: &RustConnection, root: Window) -> Vec<MonitorInfo> {
    let Ok(monitors) = conn.randr_get_monitors(root, true) else {
        return Vec::new();
    };
    let Ok(monitors) = monitors.reply() else {
        return Vec::new();
    };

    monitors
        .monitors
        .iter()
        .enumerate()
        .map(|(idx, mon)| {
            let id = conn
                .get_atom_name(mon.name)
                .ok()
                .and_then(|r| r.reply().ok())
                .map(|r| String::from_utf8_lossy(&r.name).to_string())
                .unwrap_or_else(|| format!("Monitor {}", idx + 1));

            MonitorInfo {
                id,
                x: mon.x as i32,
                y: mon.y as i32,
                width: mon.width as u32,
                height: mon.height as u32,
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// X11 Overlay Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// SHM buffer for efficient pixel transfer
struct ShmBuffer {
    seg_id: shm::Seg,
    ptr: *mut u8,
    size: usize,
}

pub struct X11Overlay {
    conn: RustConnection,
    root: Window,
    window: Window,
    gc: Gcontext,
    atoms: AtomCollection,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    depth: u8,

    // Pixel buffers
    pixel_data: Vec<u8>, // RGBA from renderer
    shm_buffer: ShmBuffer,

    // Interaction state
    pointer: PointerTracker,
    geometry_dirty: bool,
    pending_click: Option<(f32, f32)>,
    cursor_font: Font,
    cursors: Vec<(CursorShape, Cursor)>,

    // Window state
    visible: bool,
    topmost: bool,

    running: bool,
}

impl X11Overlay {
    /// Find a 32-bit ARGB visual for transparency
    fn find_argb_visual(screen: &Screen) -> Option<(Visualid, u8)> {
        screen
            .allowed_depths
            .iter()
            .filter(|depth| depth.depth == 32)
            .flat_map(|depth| depth.visuals.iter().map(move |v| (v, depth.depth)))
            .find(|(visual, _)| visual.class == VisualClass::TRUE_COLOR)
            .map(|(visual, depth)| (visual.visual_id, depth))
    }

    /// Create a shared memory buffer for efficient pixel transfer
    fn create_shm_buffer(
        conn: &RustConnection,
        width: u32,
        height: u32,
    ) -> Result<ShmBuffer, PlatformError> {
        let size = (width * height * 4) as usize;

        // Create anonymous shared memory
        let fd = memfd_create(c"meetclock-x11-buffer", MemfdFlags::CLOEXEC)
            .map_err(|e| PlatformError::BufferError(format!("memfd_create failed: {}", e)))?;

        rustix::fs::ftruncate(&fd, size as u64)
            .map_err(|e| PlatformError::BufferError(format!("ftruncate failed: {}", e)))?;

        // SAFETY: fresh anonymous mapping of a memfd we own, sized above
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                fd.as_fd(),
                0,
            )
            .map_err(|e| PlatformError::BufferError(format!("mmap failed: {}", e)))?
        };

        let seg_id = conn
            .generate_id()
            .map_err(|e| PlatformError::BufferError(e.to_string()))?;

        // x11rb shm_attach_fd takes ownership of the fd
        let file = File::from(fd);
        conn.shm_attach_fd(seg_id, file, false)
            .map_err(|e| PlatformError::BufferError(format!("shm_attach_fd failed: {}", e)))?;

        Ok(ShmBuffer {
            seg_id,
            ptr: ptr as *mut u8,
            size,
        })
    }

    fn release_shm_buffer(&self) {
        let _ = self.conn.shm_detach(self.shm_buffer.seg_id);
        // SAFETY: ptr/size come from the mmap in create_shm_buffer
        unsafe {
            rustix::mm::munmap(self.shm_buffer.ptr as *mut _, self.shm_buffer.size).ok();
        }
    }

    /// Recreate SHM buffer after resize
    fn recreate_shm_buffer(&mut self) -> Result<(), PlatformError> {
        self.release_shm_buffer();
        self.shm_buffer = Self::create_shm_buffer(&self.conn, self.width, self.height)?;
        self.pixel_data
            .resize((self.width * self.height * 4) as usize, 0);
        Ok(())
    }

    /// Set EWMH name, type and state hints
    fn setup_window_hints(&self, title: &str) -> Result<(), PlatformError> {
        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_NAME,
                self.atoms.UTF8_STRING,
                title.as_bytes(),
            )
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_WINDOW_TYPE,
                self.atoms.ATOM,
                &[self.atoms._NET_WM_WINDOW_TYPE_UTILITY],
            )
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        self.write_state_hint()
    }

    fn write_state_hint(&self) -> Result<(), PlatformError> {
        let mut state = vec![
            self.atoms._NET_WM_STATE_SKIP_TASKBAR,
            self.atoms._NET_WM_STATE_SKIP_PAGER,
        ];
        if self.topmost {
            state.push(self.atoms._NET_WM_STATE_ABOVE);
        }
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_STATE,
                self.atoms.ATOM,
                &state,
            )
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        Ok(())
    }

    /// Make the whole window accept input
    fn update_input_shape(&self) {
        let rect = Rectangle {
            x: 0,
            y: 0,
            width: self.width as u16,
            height: self.height as u16,
        };
        let _ = self.conn.shape_rectangles(
            shape::SO::SET,
            shape::SK::INPUT,
            ClipOrdering::UNSORTED,
            self.window,
            0,
            0,
            &[rect],
        );
    }

    fn raise(&self) {
        let _ = self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        );
        let _ = self.conn.flush();
    }

    fn load_cursors(conn: &RustConnection, font: Font) -> Vec<(CursorShape, Cursor)> {
        [
            (CursorShape::Arrow, XC_LEFT_PTR),
            (CursorShape::Horizontal, XC_SB_H_DOUBLE_ARROW),
            (CursorShape::Vertical, XC_SB_V_DOUBLE_ARROW),
            (CursorShape::DiagonalNwSe, XC_BOTTOM_RIGHT_CORNER),
            (CursorShape::DiagonalNeSw, XC_BOTTOM_LEFT_CORNER),
        ]
        .into_iter()
        .filter_map(|(shape, glyph)| {
            let cursor = conn.generate_id().ok()?;
            conn.create_glyph_cursor(
                cursor,
                font,
                font,
                glyph,
                glyph + 1,
                0,
                0,
                0,
                0xffff,
                0xffff,
                0xffff,
            )
            .ok()?;
            Some((shape, cursor))
        })
        .collect()
    }

    fn set_cursor(&self, shape: CursorShape) {
        if let Some((_, cursor)) = self.cursors.iter().find(|(s, _)| *s == shape) {
            let _ = self.conn.change_window_attributes(
                self.window,
                &ChangeWindowAttributesAux::new().cursor(*cursor),
            );
            let _ = self.conn.flush();
        }
    }

    fn apply_pointer_action(&mut self, action: PointerAction) {
        match action {
            PointerAction::None => {}
            PointerAction::Move { x, y } => {
                self.set_position(x, y);
            }
            PointerAction::Resize(geometry) => {
                self.set_size(geometry.width, geometry.height);
                self.set_position(geometry.x, geometry.y);
                self.geometry_dirty = true;
            }
            PointerAction::Cursor(shape) => self.set_cursor(shape),
        }
    }
}

impl OverlayPlatform for X11Overlay {
    fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        let (conn, screen_num) =
            x11rb::connect(None).map_err(|e| PlatformError::ConnectionFailed(e.to_string()))?;

        let atoms = AtomCollection::new(&conn)
            .map_err(|e| PlatformError::Other(e.to_string()))?
            .reply()
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        let setup = conn.setup();
        let screen = &setup.roots[screen_num];
        let root = screen.root;

        // Check for required extensions
        conn.shape_query_version()
            .map_err(|_| PlatformError::UnsupportedFeature("Shape extension".into()))?
            .reply()
            .map_err(|_| PlatformError::UnsupportedFeature("Shape extension".into()))?;

        conn.shm_query_version()
            .map_err(|_| PlatformError::UnsupportedFeature("SHM extension".into()))?
            .reply()
            .map_err(|_| PlatformError::UnsupportedFeature("SHM extension".into()))?;

        let (visual, depth) = Self::find_argb_visual(screen)
            .ok_or_else(|| PlatformError::UnsupportedFeature("32-bit ARGB visual".into()))?;

        let colormap = conn
            .generate_id()
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, root, visual)
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        let monitors = monitors_on(&conn, root);
        let (x, y) =
            super::clamp_to_virtual_screen(config.x, config.y, config.width, config.height, &monitors);

        let window = conn
            .generate_id()
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        let win_aux = CreateWindowAux::new()
            .background_pixel(0)
            .border_pixel(0)
            .colormap(colormap)
            .event_mask(
                EventMask::EXPOSURE
                    | EventMask::BUTTON_PRESS
                    | EventMask::BUTTON_RELEASE
                    | EventMask::POINTER_MOTION
                    | EventMask::LEAVE_WINDOW
                    | EventMask::VISIBILITY_CHANGE
                    | EventMask::STRUCTURE_NOTIFY,
            )
            .override_redirect(1);

        conn.create_window(
            depth,
            window,
            root,
            x as i16,
            y as i16,
            config.width as u16,
            config.height as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            visual,
            &win_aux,
        )
        .map_err(|e| PlatformError::Other(e.to_string()))?;

        let gc = conn
            .generate_id()
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        conn.create_gc(gc, window, &CreateGCAux::new())
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        let cursor_font = conn
            .generate_id()
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        conn.open_font(cursor_font, b"cursor")
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        let cursors = Self::load_cursors(&conn, cursor_font);

        let shm_buffer = Self::create_shm_buffer(&conn, config.width, config.height)?;

        let overlay = Self {
            conn,
            root,
            window,
            gc,
            atoms,
            width: config.width,
            height: config.height,
            x,
            y,
            depth,
            pixel_data: vec![0u8; (config.width * config.height * 4) as usize],
            shm_buffer,
            pointer: PointerTracker::new(),
            geometry_dirty: false,
            pending_click: None,
            cursor_font,
            cursors,
            visible: true,
            topmost: config.topmost,
            running: true,
        };

        overlay.setup_window_hints(&config.title)?;
        overlay.update_input_shape();
        overlay.set_cursor(CursorShape::Arrow);

        overlay
            .conn
            .map_window(window)
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        overlay
            .conn
            .flush()
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        tracing::debug!(x, y, width = config.width, height = config.height, "X11 overlay created");
        Ok(overlay)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn x(&self) -> i32 {
        self.x
    }

    fn y(&self) -> i32 {
        self.y
    }

    fn take_geometry_dirty(&mut self) -> bool {
        std::mem::take(&mut self.geometry_dirty)
    }

    fn set_position(&mut self, x: i32, y: i32) {
        let monitors = self.get_monitors();
        let (cx, cy) = super::clamp_to_virtual_screen(x, y, self.width, self.height, &monitors);

        if cx == self.x && cy == self.y {
            return;
        }

        self.x = cx;
        self.y = cy;
        self.geometry_dirty = true;

        let _ = self
            .conn
            .configure_window(self.window, &ConfigureWindowAux::new().x(cx).y(cy));
        let _ = self.conn.flush();
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.width && height == self.height {
            return;
        }

        self.width = width;
        self.height = height;

        if let Err(e) = self.recreate_shm_buffer() {
            tracing::warn!(error = %e, "Failed to recreate SHM buffer");
        }

        let _ = self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new().width(width).height(height),
        );
        self.update_input_shape();
        let _ = self.conn.flush();
    }

    fn take_click(&mut self) -> Option<(f32, f32)> {
        self.pending_click.take()
    }

    fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        let _ = if visible {
            self.conn.map_window(self.window)
        } else {
            self.conn.unmap_window(self.window)
        };
        let _ = self.conn.flush();
        if visible && self.topmost {
            self.raise();
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_topmost(&mut self, topmost: bool) {
        self.topmost = topmost;
        if let Err(e) = self.write_state_hint() {
            tracing::debug!(error = %e, "Failed to update _NET_WM_STATE");
        }
        if topmost {
            self.raise();
        }
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.pixel_data)
    }

    fn commit(&mut self) {
        if !self.visible {
            return;
        }
        // SAFETY: the mapping stays valid until release_shm_buffer
        let shm_slice =
            unsafe { std::slice::from_raw_parts_mut(self.shm_buffer.ptr, self.shm_buffer.size) };

        // RGBA -> BGRA
        for (src, dst) in self.pixel_data.chunks_exact(4).zip(shm_slice.chunks_exact_mut(4)) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
            dst[3] = src[3];
        }

        let _ = self.conn.shm_put_image(
            self.window,
            self.gc,
            self.width as u16,
            self.height as u16,
            0,
            0,
            self.width as u16,
            self.height as u16,
            0,
            0,
            self.depth,
            ImageFormat::Z_PIXMAP.into(),
            false,
            self.shm_buffer.seg_id,
            0,
        );
        let _ = self.conn.flush();
    }

    fn poll_events(&mut self) -> bool {
        use x11rb::protocol::Event;

        while let Ok(Some(event)) = self.conn.poll_for_event() {
            match event {
                Event::ButtonPress(e) if e.detail == 1 => {
                    let geometry = self.geometry();
                    self.pointer.press(
                        (e.event_x as i32, e.event_y as i32),
                        (e.root_x as i32, e.root_y as i32),
                        geometry,
                    );
                }
                Event::ButtonRelease(e) if e.detail == 1 => {
                    if let Some(click) = self.pointer.release() {
                        self.pending_click = Some(click);
                    }
                }
                Event::MotionNotify(e) => {
                    let geometry = self.geometry();
                    let action = self.pointer.motion(
                        (e.event_x as i32, e.event_y as i32),
                        (e.root_x as i32, e.root_y as i32),
                        geometry,
                    );
                    self.apply_pointer_action(action);
                }
                Event::LeaveNotify(_) => {
                    let action = self.pointer.leave();
                    self.apply_pointer_action(action);
                }
                Event::VisibilityNotify(e)
                    if self.topmost && e.state != Visibility::UNOBSCURED =>
                {
                    self.raise();
                }
                Event::DestroyNotify(e) if e.window == self.window => {
                    self.running = false;
                    return false;
                }
                _ => {}
            }
        }
        self.running
    }

    fn get_monitors(&self) -> Vec<MonitorInfo> {
        monitors_on(&self.conn, self.root)
    }
}

impl Drop for X11Overlay {
    fn drop(&mut self) {
        self.release_shm_buffer();

        for (_, cursor) in &self.cursors {
            let _ = self.conn.free_cursor(*cursor);
        }
        let _ = self.conn.close_font(self.cursor_font);
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.free_gc(self.gc);
        let _ = self.conn.flush();
    }
}
