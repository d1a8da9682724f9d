//! Windows platform implementation for the overlay window
//!
//! Uses a Win32 layered popup window with per-pixel alpha
//! (`UpdateLayeredWindow`). The message pump drains the whole thread queue,
//! so other windows owned by this thread (such as the global hotkey
//! listener) get their messages dispatched too.

use std::mem;
use std::ptr;

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateCompatibleDC, CreateDIBSection, DIB_RGB_COLORS,
    DeleteDC, EnumDisplayMonitors, GetCurrentObject, GetDC, GetMonitorInfoW, HBITMAP, HDC,
    HMONITOR, MONITORINFOEXW, OBJ_BITMAP, ReleaseDC, SelectObject, SetDIBits,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::{
    CS_HREDRAW, CS_VREDRAW, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetCursorPos, HTCLIENT, HWND_NOTOPMOST, HWND_TOPMOST, IDC_ARROW, IDC_SIZENESW, IDC_SIZENS,
    IDC_SIZENWSE, IDC_SIZEWE, LoadCursorW, MSG, PM_REMOVE, PeekMessageW, RegisterClassExW,
    SW_HIDE, SW_SHOWNOACTIVATE, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SetCursor,
    SetWindowPos, ShowWindow, TranslateMessage, ULW_ALPHA, UpdateLayeredWindow, WM_ERASEBKGND,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_NCHITTEST, WM_QUIT,
    WNDCLASSEXW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};
use windows::core::PCWSTR;

use super::{CursorShape, MonitorInfo, OverlayConfig, OverlayPlatform, PlatformError};
use super::{PointerAction, PointerTracker};

const CLASS_NAME: &str = "MeetClockOverlayClass";

// ─────────────────────────────────────────────────────────────────────────────
// Standalone Monitor Enumeration
// ─────────────────────────────────────────────────────────────────────────────

/// Callback for EnumDisplayMonitors - collects monitor info into a Vec<MonitorInfo>
unsafe extern "system" fn enum_monitors_callback(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    lparam: LPARAM,
) -> windows::Win32::Foundation::BOOL {
    unsafe {
        let monitors = &mut *(lparam.0 as *mut Vec<MonitorInfo>);

        let mut info = MONITORINFOEXW::default();
        info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;

        if GetMonitorInfoW(hmonitor, &mut info.monitorInfo).as_bool() {
            let rc = info.monitorInfo.rcMonitor;
            let name_len = info
                .szDevice
                .iter()
                .position(|&c| c == 0)
                .unwrap_or(info.szDevice.len());

            monitors.push(MonitorInfo {
                id: String::from_utf16_lossy(&info.szDevice[..name_len]),
                x: rc.left,
                y: rc.top,
                width: (rc.right - rc.left) as u32,
                height: (rc.bottom - rc.top) as u32,
            });
        }

        windows::Win32::Foundation::BOOL::from(true)
    }
}

pub fn get_all_monitors() -> Vec<MonitorInfo> {
    let mut monitors: Vec<MonitorInfo> = Vec::new();
    // SAFETY: the callback only runs during this call while `monitors` is alive
    unsafe {
        let raw_ptr = &mut monitors as *mut Vec<MonitorInfo>;
        let _ = EnumDisplayMonitors(None, None, Some(enum_monitors_callback), LPARAM(raw_ptr as isize));
    }
    monitors
}

// ─────────────────────────────────────────────────────────────────────────────
// Windows Overlay Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Windows overlay implementation
///
/// Not `Send`: the HWND and its message queue belong to the creating thread.
pub struct WindowsOverlay {
    hwnd: HWND,
    hdc_mem: HDC,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    pixel_data: Vec<u8>,
    bgra_buffer: Vec<u8>, // Pre-allocated buffer for RGBA->BGRA conversion
    content_dirty: bool,
    geometry_dirty: bool,

    // Interaction state
    pointer: PointerTracker,
    cursor: CursorShape,
    pending_click: Option<(f32, f32)>,

    // Window state
    visible: bool,
    topmost: bool,
    running: bool,
}

impl WindowsOverlay {
    fn register_class() -> Result<(), PlatformError> {
        unsafe {
            let class_name = wide_string(CLASS_NAME);
            let hinstance = GetModuleHandleW(None)
                .map_err(|e| PlatformError::Other(format!("GetModuleHandleW failed: {}", e)))?;

            // No class cursor: the cursor is set explicitly on every mouse move
            let wc = WNDCLASSEXW {
                cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(window_proc),
                hInstance: hinstance.into(),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };

            let atom = RegisterClassExW(&wc);
            if atom == 0 {
                let err = std::io::Error::last_os_error();
                // ERROR_CLASS_ALREADY_EXISTS
                if err.raw_os_error() != Some(1410) {
                    return Err(PlatformError::Other(format!(
                        "RegisterClassExW failed: {}",
                        err
                    )));
                }
            }
        }
        Ok(())
    }

    fn bitmap_info(&self) -> BITMAPINFO {
        BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: self.width as i32,
                biHeight: -(self.height as i32), // Top-down DIB
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn create_dib_section(&mut self) -> Result<(), PlatformError> {
        unsafe {
            let hdc_screen = GetDC(HWND::default());

            if !self.hdc_mem.is_invalid() {
                let _ = DeleteDC(self.hdc_mem);
            }

            self.hdc_mem = CreateCompatibleDC(hdc_screen);
            if self.hdc_mem.is_invalid() {
                ReleaseDC(HWND::default(), hdc_screen);
                return Err(PlatformError::BufferError(
                    "CreateCompatibleDC failed".to_string(),
                ));
            }

            let bmi = self.bitmap_info();
            let mut bits: *mut std::ffi::c_void = ptr::null_mut();
            let hbitmap = CreateDIBSection(hdc_screen, &bmi, DIB_RGB_COLORS, &mut bits, None, 0)
                .map_err(|e| {
                    PlatformError::BufferError(format!("CreateDIBSection failed: {}", e))
                })?;

            SelectObject(self.hdc_mem, hbitmap);
            ReleaseDC(HWND::default(), hdc_screen);
        }

        let size = (self.width * self.height * 4) as usize;
        self.pixel_data.resize(size, 0);
        self.bgra_buffer.resize(size, 0);
        self.content_dirty = true;
        Ok(())
    }

    fn update_layered_window(&mut self) {
        if !self.content_dirty || !self.visible {
            return;
        }
        self.content_dirty = false;

        for (src, dst) in self
            .pixel_data
            .chunks_exact(4)
            .zip(self.bgra_buffer.chunks_exact_mut(4))
        {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
            dst[3] = src[3];
        }

        let bmi = self.bitmap_info();
        unsafe {
            let hdc_screen = GetDC(HWND::default());

            let hgdiobj = GetCurrentObject(self.hdc_mem, OBJ_BITMAP);
            let hbitmap = HBITMAP(hgdiobj.0);
            SetDIBits(
                self.hdc_mem,
                hbitmap,
                0,
                self.height,
                self.bgra_buffer.as_ptr() as *const _,
                &bmi,
                DIB_RGB_COLORS,
            );

            let pt_src = POINT { x: 0, y: 0 };
            let pt_dst = POINT {
                x: self.x,
                y: self.y,
            };
            let size = windows::Win32::Foundation::SIZE {
                cx: self.width as i32,
                cy: self.height as i32,
            };
            let blend = windows::Win32::Graphics::Gdi::BLENDFUNCTION {
                BlendOp: 0, // AC_SRC_OVER
                BlendFlags: 0,
                SourceConstantAlpha: 255,
                AlphaFormat: 1, // AC_SRC_ALPHA
            };

            let _ = UpdateLayeredWindow(
                self.hwnd,
                hdc_screen,
                Some(&pt_dst),
                Some(&size),
                self.hdc_mem,
                Some(&pt_src),
                windows::Win32::Foundation::COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            );

            ReleaseDC(HWND::default(), hdc_screen);
        }
    }

    fn apply_cursor(&self) {
        let id = match self.cursor {
            CursorShape::Arrow => IDC_ARROW,
            CursorShape::Horizontal => IDC_SIZEWE,
            CursorShape::Vertical => IDC_SIZENS,
            CursorShape::DiagonalNwSe => IDC_SIZENWSE,
            CursorShape::DiagonalNeSw => IDC_SIZENESW,
        };
        unsafe {
            if let Ok(cursor) = LoadCursorW(None, id) {
                SetCursor(cursor);
            }
        }
    }

    fn apply_pointer_action(&mut self, action: PointerAction) {
        match action {
            PointerAction::None => {}
            PointerAction::Move { x, y } => self.set_position(x, y),
            PointerAction::Resize(geometry) => {
                self.set_size(geometry.width, geometry.height);
                self.set_position(geometry.x, geometry.y);
                self.geometry_dirty = true;
            }
            PointerAction::Cursor(shape) => self.cursor = shape,
        }
    }

    fn screen_cursor_pos() -> (i32, i32) {
        let mut pt = POINT::default();
        unsafe {
            let _ = GetCursorPos(&mut pt);
        }
        (pt.x, pt.y)
    }
}

impl OverlayPlatform for WindowsOverlay {
    fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        Self::register_class()?;

        let monitors = get_all_monitors();
        let (x, y) =
            super::clamp_to_virtual_screen(config.x, config.y, config.width, config.height, &monitors);

        let hwnd = unsafe {
            let class_name = wide_string(CLASS_NAME);
            let window_name = wide_string(&config.title);
            let hinstance = GetModuleHandleW(None)
                .map_err(|e| PlatformError::Other(format!("GetModuleHandleW failed: {}", e)))?;

            let mut ex_style = WS_EX_LAYERED | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE;
            if config.topmost {
                ex_style |= WS_EX_TOPMOST;
            }

            CreateWindowExW(
                ex_style,
                PCWSTR(class_name.as_ptr()),
                PCWSTR(window_name.as_ptr()),
                WS_POPUP,
                x,
                y,
                config.width as i32,
                config.height as i32,
                None,
                None,
                hinstance,
                None,
            )
            .map_err(|e| PlatformError::Other(format!("CreateWindowExW failed: {}", e)))?
        };

        let size = (config.width * config.height * 4) as usize;
        let mut overlay = Self {
            hwnd,
            hdc_mem: HDC::default(),
            width: config.width,
            height: config.height,
            x,
            y,
            pixel_data: vec![0u8; size],
            bgra_buffer: vec![0u8; size],
            content_dirty: true,
            geometry_dirty: false,
            pointer: PointerTracker::new(),
            cursor: CursorShape::Arrow,
            pending_click: None,
            visible: true,
            topmost: config.topmost,
            running: true,
        };

        overlay.create_dib_section()?;

        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        }
        tracing::debug!(hwnd = ?hwnd, x, y, width = config.width, height = config.height, "Windows overlay created");

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
        mem::take(&mut self.geometry_dirty)
    }

    fn set_position(&mut self, x: i32, y: i32) {
        let monitors = self.get_monitors();
        let (clamped_x, clamped_y) =
            super::clamp_to_virtual_screen(x, y, self.width, self.height, &monitors);

        if clamped_x == self.x && clamped_y == self.y {
            return;
        }
        self.x = clamped_x;
        self.y = clamped_y;
        self.geometry_dirty = true;
        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                HWND::default(),
                clamped_x,
                clamped_y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;

        if let Err(e) = self.create_dib_section() {
            tracing::warn!(error = %e, "Failed to recreate DIB section");
        }

        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                HWND::default(),
                0,
                0,
                width as i32,
                height as i32,
                SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn take_click(&mut self) -> Option<(f32, f32)> {
        self.pending_click.take()
    }

    fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        unsafe {
            let _ = ShowWindow(self.hwnd, if visible { SW_SHOWNOACTIVATE } else { SW_HIDE });
        }
        if visible {
            self.content_dirty = true;
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_topmost(&mut self, topmost: bool) {
        self.topmost = topmost;
        let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                insert_after,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            );
        }
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        self.content_dirty = true; // Assume caller will modify the buffer
        Some(&mut self.pixel_data)
    }

    fn commit(&mut self) {
        self.update_layered_window();
    }

    fn poll_events(&mut self) -> bool {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    self.running = false;
                    return false;
                }
                if msg.hwnd != self.hwnd {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                    continue;
                }

                let local = (
                    (msg.lParam.0 & 0xFFFF) as i16 as i32,
                    ((msg.lParam.0 >> 16) & 0xFFFF) as i16 as i32,
                );

                match msg.message {
                    WM_LBUTTONDOWN => {
                        let geometry = self.geometry();
                        self.pointer.press(local, Self::screen_cursor_pos(), geometry);
                        let _ = SetCapture(self.hwnd);
                    }
                    WM_LBUTTONUP => {
                        if let Some(click) = self.pointer.release() {
                            self.pending_click = Some(click);
                        }
                        let _ = ReleaseCapture();
                    }
                    WM_MOUSEMOVE => {
                        let geometry = self.geometry();
                        let action =
                            self.pointer
                                .motion(local, Self::screen_cursor_pos(), geometry);
                        self.apply_pointer_action(action);
                        self.apply_cursor();
                    }
                    _ => {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }
            }
        }
        self.running
    }

    fn get_monitors(&self) -> Vec<MonitorInfo> {
        get_all_monitors()
    }
}

impl Drop for WindowsOverlay {
    fn drop(&mut self) {
        unsafe {
            if !self.hdc_mem.is_invalid() {
                let _ = DeleteDC(self.hdc_mem);
            }
            if !self.hwnd.is_invalid() {
                let _ = DestroyWindow(self.hwnd);
            }
        }
    }
}

/// Window procedure for overlay windows
unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCHITTEST => LRESULT(HTCLIENT as isize),
        WM_ERASEBKGND => LRESULT(1), // Don't erase background
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Convert a &str to a null-terminated wide string
fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_string_is_nul_terminated() {
        assert_eq!(wide_string("Hi"), vec![0x48, 0x69, 0]);
    }

    #[test]
    fn test_thread_quit_message_stops_the_pump() {
        let mut overlay = WindowsOverlay::new(OverlayConfig::default()).unwrap();
        unsafe { windows::Win32::UI::WindowsAndMessaging::PostQuitMessage(0) };
        assert!(!overlay.poll_events());
    }
}
