//! Windows backend.
//!
//! Sprites are borderless topmost layered windows with color-key
//! transparency (black) and GDI shape drawing; the flash is one full-screen
//! layered window with uniform alpha. Cursor and keyboard reads go through
//! `device_query`, which tracks position more reliably than polling
//! `GetCursorInfo`; cursor writes use `SetCursorPos` and the pointer speed
//! goes through `SystemParametersInfoW(SPI_SETMOUSESPEED)`.
//!
//! All window handles stay on the thread that created them; the paint specs
//! live in a process-wide registry keyed by raw handle so the window
//! procedure can find them.

use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;
use device_query::{DeviceQuery, DeviceState, Keycode};
use lazy_static::lazy_static;
use parking_lot::Mutex;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, COLORREF, FALSE, HWND, LPARAM, LRESULT, RECT, TRUE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreatePen, CreateSolidBrush, DeleteObject, Ellipse, EndPaint, FillRect,
    InvalidateRect, LineTo, MoveToEx, SelectObject, PAINTSTRUCT, PS_SOLID,
};
use windows::Win32::System::Console::{
    GetConsoleWindow, SetConsoleCtrlHandler, CTRL_BREAK_EVENT, CTRL_C_EVENT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetForegroundWindow,
    GetSystemMetrics, PeekMessageW, RegisterClassW, SetCursorPos, SetLayeredWindowAttributes,
    SetWindowPos, ShowWindow, SystemParametersInfoW, TranslateMessage, HWND_TOPMOST, LWA_ALPHA,
    LWA_COLORKEY, MSG, PM_REMOVE, SM_CXSCREEN, SM_CYSCREEN, SPIF_SENDCHANGE, SPI_SETMOUSESPEED,
    SWP_NOACTIVATE, SWP_NOSIZE, SW_SHOWNOACTIVATE, WINDOW_STYLE, WM_ERASEBKGND, WM_PAINT,
    WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST,
    WS_EX_TRANSPARENT, WS_POPUP,
};

use crate::controls::ControlEvent;
use crate::error::{JitterError, Result};
use crate::platform::{
    OverlayOps, PointerOps, SpriteDesc, SpriteHandle, OS_POINTER_SPEED_MAX, OS_POINTER_SPEED_MIN,
};
use crate::settings::SpriteShape;
use crate::state::ChaosState;
use crate::types::{Position, Rgb, ScreenBounds};

const OVERLAY_CLASS: &str = "JitterbugOverlay";

/// Transparent color key. Sprite colors never reach pure black (pastel
/// channels start at 100 and the pulse floor is 0.5), so fills never vanish.
const COLORKEY: COLORREF = COLORREF(0);

fn colorref(color: Rgb) -> COLORREF {
    COLORREF((color.r as u32) | ((color.g as u32) << 8) | ((color.b as u32) << 16))
}

fn widestring(value: &str) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    std::ffi::OsStr::new(value)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

fn hwnd_key(hwnd: HWND) -> isize {
    hwnd.0 as isize
}

fn hwnd_from_key(key: isize) -> HWND {
    HWND(key as *mut core::ffi::c_void)
}

/// What the window procedure draws for one overlay window.
#[derive(Clone, Copy)]
struct PaintSpec {
    /// `None` paints a solid fill (the flash window).
    shape: Option<SpriteShape>,
    color: COLORREF,
    width: i32,
    height: i32,
}

lazy_static! {
    static ref PAINT_SPECS: Mutex<HashMap<isize, PaintSpec>> = Mutex::new(HashMap::new());
    static ref INTERRUPT_STATE: Mutex<Option<Arc<ChaosState>>> = Mutex::new(None);
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

pub struct WinPointer;

impl WinPointer {
    pub fn new() -> Self {
        Self
    }
}

impl PointerOps for WinPointer {
    fn cursor_position(&self) -> Option<Position> {
        let device_state = DeviceState::new();
        let coords = device_state.get_mouse().coords;
        Some(Position::new(coords.0, coords.1))
    }

    fn move_cursor(&self, pos: Position) {
        if let Err(err) = unsafe { SetCursorPos(pos.x, pos.y) } {
            log::warn!("[pointer] SetCursorPos({}, {}) failed: {err}", pos.x, pos.y);
        }
    }

    fn screen_size(&self) -> ScreenBounds {
        let width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
        let height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
        if width <= 0 || height <= 0 {
            log::warn!("[pointer] screen metrics unavailable, assuming 1920x1080");
            return ScreenBounds::new(1920, 1080);
        }
        ScreenBounds::new(width, height)
    }

    fn set_pointer_speed(&self, speed: u32) {
        let clamped = speed.clamp(OS_POINTER_SPEED_MIN, OS_POINTER_SPEED_MAX);
        let result = unsafe {
            SystemParametersInfoW(
                SPI_SETMOUSESPEED,
                0,
                Some(clamped as usize as *mut core::ffi::c_void),
                SPIF_SENDCHANGE,
            )
        };
        if let Err(err) = result {
            log::warn!("[pointer] could not set pointer speed to {clamped}: {err}");
        }
    }

    fn control_surface_focused(&self) -> bool {
        unsafe {
            let foreground = GetForegroundWindow();
            if foreground.0.is_null() {
                // Cannot determine focus: report focused so effects idle.
                return true;
            }
            let console = GetConsoleWindow();
            !console.0.is_null() && foreground == console
        }
    }
}

// ---------------------------------------------------------------------------
// Overlay windows
// ---------------------------------------------------------------------------

pub struct WinOverlay {
    windows: HashMap<SpriteHandle, isize>,
    flash: Option<isize>,
    next_handle: SpriteHandle,
}

impl WinOverlay {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            flash: None,
            next_handle: 1,
        }
    }
}

impl OverlayOps for WinOverlay {
    fn create_sprite(&mut self, desc: &SpriteDesc) -> Result<SpriteHandle> {
        let size = desc.size as i32;
        let spec = PaintSpec {
            shape: Some(desc.shape),
            color: colorref(desc.color),
            width: size,
            height: size,
        };
        let raw = create_overlay_window(desc.position.x, desc.position.y, size, size, spec)?;
        let hwnd = hwnd_from_key(raw);
        unsafe {
            if let Err(err) = SetLayeredWindowAttributes(hwnd, COLORKEY, 255, LWA_COLORKEY) {
                let _ = DestroyWindow(hwnd);
                PAINT_SPECS.lock().remove(&raw);
                return Err(JitterError::Overlay(format!(
                    "transparency setup failed: {err}"
                )));
            }
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        }

        let handle = self.next_handle;
        self.next_handle += 1;
        self.windows.insert(handle, raw);
        Ok(handle)
    }

    fn move_sprite(&mut self, handle: SpriteHandle, pos: Position) {
        let Some(&raw) = self.windows.get(&handle) else {
            return;
        };
        unsafe {
            let _ = SetWindowPos(
                hwnd_from_key(raw),
                HWND_TOPMOST,
                pos.x,
                pos.y,
                0,
                0,
                SWP_NOSIZE | SWP_NOACTIVATE,
            );
        }
    }

    fn restyle_sprite(&mut self, handle: SpriteHandle, shape: SpriteShape, color: Rgb) {
        let Some(&raw) = self.windows.get(&handle) else {
            return;
        };
        if let Some(spec) = PAINT_SPECS.lock().get_mut(&raw) {
            spec.shape = Some(shape);
            spec.color = colorref(color);
        }
        unsafe {
            let _ = InvalidateRect(hwnd_from_key(raw), None, TRUE);
        }
    }

    fn set_sprite_opacity(&mut self, handle: SpriteHandle, opacity: f32) {
        let Some(&raw) = self.windows.get(&handle) else {
            return;
        };
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
        unsafe {
            let _ = SetLayeredWindowAttributes(
                hwnd_from_key(raw),
                COLORKEY,
                alpha,
                LWA_COLORKEY | LWA_ALPHA,
            );
        }
    }

    fn destroy_sprite(&mut self, handle: SpriteHandle) {
        let Some(raw) = self.windows.remove(&handle) else {
            return;
        };
        destroy_window(raw);
    }

    fn flash_screen(&mut self, opacity: f32) {
        if self.flash.is_some() {
            return;
        }
        let width = unsafe { GetSystemMetrics(SM_CXSCREEN) }.max(1);
        let height = unsafe { GetSystemMetrics(SM_CYSCREEN) }.max(1);
        let spec = PaintSpec {
            shape: None,
            color: colorref(Rgb::WHITE),
            width,
            height,
        };
        match create_overlay_window(0, 0, width, height, spec) {
            Ok(raw) => {
                let hwnd = hwnd_from_key(raw);
                let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
                unsafe {
                    let _ = SetLayeredWindowAttributes(hwnd, COLORREF(0), alpha, LWA_ALPHA);
                    let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
                }
                self.flash = Some(raw);
            }
            Err(err) => log::warn!("[overlay] flash window creation failed: {err}"),
        }
    }

    fn clear_flash(&mut self) {
        if let Some(raw) = self.flash.take() {
            destroy_window(raw);
        }
    }

    fn pump_events(&mut self) {
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

impl Drop for WinOverlay {
    fn drop(&mut self) {
        for (_, raw) in self.windows.drain() {
            destroy_window(raw);
        }
        if let Some(raw) = self.flash.take() {
            destroy_window(raw);
        }
    }
}

fn destroy_window(raw: isize) {
    PAINT_SPECS.lock().remove(&raw);
    unsafe {
        let _ = DestroyWindow(hwnd_from_key(raw));
    }
}

fn create_overlay_window(x: i32, y: i32, width: i32, height: i32, spec: PaintSpec) -> Result<isize> {
    static REGISTER_CLASS: Once = Once::new();

    let class_name = widestring(OVERLAY_CLASS);
    let hinstance = unsafe { GetModuleHandleW(PCWSTR::null()) }
        .map_err(|err| JitterError::Overlay(format!("module handle unavailable: {err}")))?;

    REGISTER_CLASS.call_once(|| unsafe {
        let wc = WNDCLASSW {
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            lpfnWndProc: Some(overlay_wnd_proc),
            ..Default::default()
        };
        let _ = RegisterClassW(&wc);
    });

    let hwnd = unsafe {
        CreateWindowExW(
            WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE | WS_EX_TRANSPARENT,
            PCWSTR(class_name.as_ptr()),
            PCWSTR::null(),
            WINDOW_STYLE(WS_POPUP.0),
            x,
            y,
            width,
            height,
            None,
            None,
            hinstance,
            None,
        )
    }
    .map_err(|err| JitterError::Overlay(format!("window creation failed: {err}")))?;

    let raw = hwnd_key(hwnd);
    PAINT_SPECS.lock().insert(raw, spec);
    Ok(raw)
}

unsafe extern "system" fn overlay_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            paint_overlay(hwnd);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

fn paint_overlay(hwnd: HWND) {
    let spec = PAINT_SPECS.lock().get(&hwnd_key(hwnd)).copied();
    let mut ps = PAINTSTRUCT::default();
    let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
    if hdc.0.is_null() {
        return;
    }

    unsafe {
        // Clear to the color key so undrawn pixels stay transparent.
        let background = CreateSolidBrush(COLORKEY);
        FillRect(hdc, &ps.rcPaint, background);
        let _ = DeleteObject(background.into());

        if let Some(spec) = spec {
            let brush = CreateSolidBrush(spec.color);
            let rect = RECT {
                left: 0,
                top: 0,
                right: spec.width,
                bottom: spec.height,
            };
            match spec.shape {
                None | Some(SpriteShape::Square) => {
                    FillRect(hdc, &rect, brush);
                }
                Some(SpriteShape::Dot) => {
                    let pen = CreatePen(PS_SOLID, 1, spec.color);
                    let old_pen = SelectObject(hdc, pen.into());
                    let old_brush = SelectObject(hdc, brush.into());
                    let _ = Ellipse(hdc, 0, 0, spec.width, spec.height);
                    SelectObject(hdc, old_brush);
                    SelectObject(hdc, old_pen);
                    let _ = DeleteObject(pen.into());
                }
                Some(SpriteShape::Cross) => {
                    let pen = CreatePen(PS_SOLID, 2, spec.color);
                    let old_pen = SelectObject(hdc, pen.into());
                    let _ = MoveToEx(hdc, 0, spec.height / 2, None);
                    let _ = LineTo(hdc, spec.width, spec.height / 2);
                    let _ = MoveToEx(hdc, spec.width / 2, 0, None);
                    let _ = LineTo(hdc, spec.width / 2, spec.height);
                    SelectObject(hdc, old_pen);
                    let _ = DeleteObject(pen.into());
                }
            }
            let _ = DeleteObject(brush.into());
        }

        let _ = EndPaint(hwnd, &ps);
    }
}

// ---------------------------------------------------------------------------
// Interrupt handling
// ---------------------------------------------------------------------------

unsafe extern "system" fn interrupt_handler(ctrl_type: u32) -> BOOL {
    match ctrl_type {
        CTRL_C_EVENT | CTRL_BREAK_EVENT => {
            if let Some(state) = INTERRUPT_STATE.lock().as_ref() {
                state.request_stop();
            }
            TRUE
        }
        _ => FALSE,
    }
}

/// Route Ctrl+C / Ctrl+Break into the shared stop signal so an interrupted
/// run still resets the pointer speed on its way out.
pub fn install_interrupt_handler(state: Arc<ChaosState>) {
    *INTERRUPT_STATE.lock() = Some(state);
    if let Err(err) = unsafe { SetConsoleCtrlHandler(Some(interrupt_handler), TRUE) } {
        log::warn!("[platform] could not install interrupt handler: {err}");
    }
}

// ---------------------------------------------------------------------------
// Keyboard control surface
// ---------------------------------------------------------------------------

/// Poll the keyboard at 50 ms and emit one event per fresh key press.
pub fn spawn_hotkey_listener(
    state: Arc<ChaosState>,
    events: Sender<ControlEvent>,
) -> Option<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("hotkeys".into())
        .spawn(move || {
            let device_state = DeviceState::new();
            let mut held: Vec<Keycode> = Vec::new();
            log::info!("[hotkeys] listener started");
            loop {
                if state.wait_for_stop(Duration::from_millis(50)) {
                    break;
                }
                let keys = device_state.get_keys();
                for key in &keys {
                    if !held.contains(key) {
                        if let Some(event) = event_for_key(key) {
                            let _ = events.send(event);
                        }
                    }
                }
                held = keys;
            }
        })
        .map_err(|err| log::warn!("[hotkeys] could not start listener: {err}"))
        .ok()
}

fn event_for_key(key: &Keycode) -> Option<ControlEvent> {
    match key {
        Keycode::P => Some(ControlEvent::TogglePause),
        Keycode::M => Some(ControlEvent::ToggleChaotic),
        Keycode::F => Some(ControlEvent::ToggleFlicker),
        Keycode::T => Some(ControlEvent::ToggleTrail),
        Keycode::X => Some(ControlEvent::ToggleFlash),
        Keycode::Equal => Some(ControlEvent::RaiseIntensity),
        Keycode::Minus => Some(ControlEvent::LowerIntensity),
        Keycode::RightBracket => Some(ControlEvent::MoreCursors),
        Keycode::LeftBracket => Some(ControlEvent::FewerCursors),
        Keycode::S => Some(ControlEvent::CycleShape),
        Keycode::Q => Some(ControlEvent::Quit),
        _ => None,
    }
}
