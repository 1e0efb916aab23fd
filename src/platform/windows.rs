// =============================================================================
// LOUPE - VERSION WINDOWS
// MAGNIFIER - WINDOWS VERSION
// =============================================================================
// Fenêtre « message-only » qui reçoit le raccourci, la minuterie et l'icône
// de notification ; le zoom passe par l'API Magnification.
// Message-only window receiving the hotkey, the timer and the tray icon;
// zooming goes through the Magnification API.
// =============================================================================

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

// -----------------------------------------------------------------------------
// IMPORTS - Windows API
// -----------------------------------------------------------------------------
use windows::{
    core::{w, HSTRING, PCWSTR},
    Win32::{
        Foundation::*,                           // HWND, RECT, BOOL, etc.
        System::LibraryLoader::GetModuleHandleW, // Handle du module courant / Current module handle
        System::Threading::CreateMutexW,         // Instance unique / Single instance
        UI::{
            Input::KeyboardAndMouse::{
                RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_NOREPEAT,
            },
            Magnification::{
                MagInitialize, MagSetFullscreenTransform, MagSetInputTransform, MagUninitialize,
            },
            Shell::{
                Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE,
                NOTIFYICONDATAW,
            },
            WindowsAndMessaging::*, // Messages, fenêtres, timers / Messages, windows, timers
        },
    },
};

use crate::config::RunOptions;
use crate::controller::MagnificationController;
use crate::error::{MagnifierError, Result};
use crate::event::{Dispatcher, Event, Flow};
use crate::hotkey::Hotkey;
use crate::platform::{pump, validate, Pump};
use crate::service::{
    DisplayGeometry, MagnificationService, PointerSource, ScreenRect, TickSource,
};

// =============================================================================
// CONSTANTES
// CONSTANTS
// =============================================================================

/// Nom de la classe de fenêtre Windows
/// Windows window class name
const WINDOW_CLASS: PCWSTR = w!("MagniMessageWindow");

/// Mutex nommé empêchant deux instances
/// Named mutex preventing two instances
const INSTANCE_MUTEX: PCWSTR = w!("Magni.SingleInstance");

/// Texte de l'info-bulle de l'icône
/// Tray icon tooltip
const TRAY_TIP: &str = "Magni (click to exit)";

/// Identifiant du timer de rafraîchissement
/// Refresh timer ID
const TIMER_ID: usize = 1;

/// Identifiant du raccourci global
/// Global hotkey ID
const HOTKEY_ID: i32 = 1;

/// Identifiant de l'icône de notification
/// Tray icon ID
const TRAY_ID: u32 = 1;

/// Message envoyé par l'icône de notification
/// Message sent by the tray icon
const WM_TRAY: u32 = WM_APP + 1;

/// Demande de sortie postée dans la file
/// Exit request posted to the queue
const WM_EXIT_REQUEST: u32 = WM_APP + 2;

// =============================================================================
// GÉOMÉTRIE
// GEOMETRY
// =============================================================================

/// Taille de l'écran principal en pixels physiques (après `SetProcessDPIAware`)
/// Primary screen size in physical pixels (after `SetProcessDPIAware`)
pub fn screen_size() -> Result<DisplayGeometry> {
    let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    DisplayGeometry::new(width, height)
        .map_err(|_| MagnifierError::ServiceUnavailable("no primary display".into()))
}

fn to_rect(rect: ScreenRect) -> RECT {
    RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

fn last_error() -> String {
    windows::core::Error::from_win32().to_string()
}

// =============================================================================
// SERVICE DE LOUPE
// MAGNIFICATION SERVICE
// =============================================================================

/// Session Magnification : `MagInitialize` à la création, `MagUninitialize` à la destruction
/// Magnification session: `MagInitialize` on creation, `MagUninitialize` on drop
pub struct WinMagnification {
    // Lié au thread qui a initialisé l'API / Bound to the thread that initialized the API
    _thread: PhantomData<*const ()>,
}

impl WinMagnification {
    pub fn initialize() -> Result<Self> {
        if !unsafe { MagInitialize() }.as_bool() {
            return Err(MagnifierError::ServiceUnavailable(format!(
                "MagInitialize failed: {}",
                last_error()
            )));
        }
        debug!("magnification API initialized");
        Ok(Self { _thread: PhantomData })
    }
}

impl Drop for WinMagnification {
    fn drop(&mut self) {
        unsafe {
            let _ = MagUninitialize();
        }
        debug!("magnification API released");
    }
}

impl MagnificationService for WinMagnification {
    fn set_fullscreen_transform(&mut self, zoom: f64, x: i32, y: i32) -> Result<()> {
        if unsafe { MagSetFullscreenTransform(zoom as f32, x, y) }.as_bool() {
            Ok(())
        } else {
            Err(MagnifierError::CommandFailed {
                command: "MagSetFullscreenTransform",
                reason: last_error(),
            })
        }
    }

    fn set_input_transform(
        &mut self,
        enabled: bool,
        source: ScreenRect,
        destination: ScreenRect,
    ) -> Result<()> {
        let source = to_rect(source);
        let destination = to_rect(destination);

        // Échoue sans le privilège uiAccess / Fails without the uiAccess privilege
        if unsafe { MagSetInputTransform(BOOL::from(enabled), &source, &destination) }.as_bool() {
            Ok(())
        } else {
            Err(MagnifierError::CommandFailed {
                command: "MagSetInputTransform",
                reason: last_error(),
            })
        }
    }
}

// =============================================================================
// CURSEUR ET MINUTERIE
// CURSOR AND TIMER
// =============================================================================

pub struct WinCursor;

impl PointerSource for WinCursor {
    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        let mut pt = POINT::default();
        unsafe { GetCursorPos(&mut pt) }
            .map_err(|err| MagnifierError::PointerQuery(err.to_string()))?;
        Ok((pt.x, pt.y))
    }
}

/// Timer `WM_TIMER` attaché à la fenêtre de messages
/// `WM_TIMER` timer attached to the message window
pub struct WinTimer {
    hwnd: HWND,
}

impl TickSource for WinTimer {
    fn start(&mut self, interval: Duration) -> Result<()> {
        let elapse = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
        if unsafe { SetTimer(self.hwnd, TIMER_ID, elapse, None) } == 0 {
            return Err(MagnifierError::TickSource(format!("SetTimer failed: {}", last_error())));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        unsafe { KillTimer(self.hwnd, TIMER_ID) }
            .map_err(|err| MagnifierError::TickSource(format!("KillTimer failed: {err}")))
    }
}

// =============================================================================
// RESSOURCES DU PROCESSUS
// PROCESS RESOURCES
// =============================================================================
// Chaque ressource est libérée dans son `Drop`, dans l'ordre inverse de création.
// Each resource is released in its `Drop`, in reverse creation order.

struct SingleInstance(HANDLE);

impl SingleInstance {
    fn acquire() -> Result<Self> {
        let handle = unsafe { CreateMutexW(None, FALSE, INSTANCE_MUTEX) }
            .map_err(|err| MagnifierError::ServiceUnavailable(err.to_string()))?;

        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            unsafe {
                let _ = CloseHandle(handle);
            }
            return Err(MagnifierError::ServiceUnavailable(
                "magni is already running".into(),
            ));
        }
        Ok(Self(handle))
    }
}

impl Drop for SingleInstance {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

struct MessageWindow {
    hwnd: HWND,
    hinst: HINSTANCE,
}

impl MessageWindow {
    fn create() -> Result<Self> {
        unsafe {
            let hinst: HINSTANCE = GetModuleHandleW(None)
                .map_err(|err| MagnifierError::ServiceUnavailable(err.to_string()))?
                .into();

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(wnd_proc),
                hInstance: hinst,
                lpszClassName: WINDOW_CLASS,
                ..Default::default()
            };

            if RegisterClassExW(&wc) == 0 {
                return Err(MagnifierError::ServiceUnavailable(format!(
                    "RegisterClassExW failed: {}",
                    last_error()
                )));
            }

            // Fenêtre invisible, uniquement pour les messages
            // Invisible window, for messages only
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                WINDOW_CLASS,
                w!("Magni"),
                WINDOW_STYLE::default(),
                0, 0, 0, 0,
                HWND_MESSAGE, None, hinst, None,
            );

            match hwnd {
                Ok(hwnd) => Ok(Self { hwnd, hinst }),
                Err(err) => {
                    let _ = UnregisterClassW(WINDOW_CLASS, hinst);
                    Err(MagnifierError::ServiceUnavailable(format!(
                        "CreateWindowExW failed: {err}"
                    )))
                }
            }
        }
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
            let _ = UnregisterClassW(WINDOW_CLASS, self.hinst);
        }
    }
}

struct HotkeyRegistration {
    hwnd: HWND,
}

impl HotkeyRegistration {
    fn register(hwnd: HWND, hotkey: Hotkey) -> Result<Self> {
        // MOD_NOREPEAT : pas de répétition quand la touche reste enfoncée
        // MOD_NOREPEAT: no auto-repeat while the key is held
        let modifiers = HOT_KEY_MODIFIERS(hotkey.modifiers.bits() | MOD_NOREPEAT.0);
        unsafe { RegisterHotKey(hwnd, HOTKEY_ID, modifiers, hotkey.key) }.map_err(|err| {
            MagnifierError::ServiceUnavailable(format!("cannot register hotkey {hotkey}: {err}"))
        })?;
        Ok(Self { hwnd })
    }
}

impl Drop for HotkeyRegistration {
    fn drop(&mut self) {
        unsafe {
            let _ = UnregisterHotKey(self.hwnd, HOTKEY_ID);
        }
    }
}

struct TrayIcon {
    data: NOTIFYICONDATAW,
}

impl TrayIcon {
    /// L'icône est facultative : un échec est journalisé, pas fatal
    /// The icon is optional: a failure is logged, not fatal
    fn add(hwnd: HWND) -> Option<Self> {
        let mut data = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: hwnd,
            uID: TRAY_ID,
            uFlags: NIF_MESSAGE | NIF_ICON | NIF_TIP,
            uCallbackMessage: WM_TRAY,
            hIcon: unsafe { LoadIconW(None, IDI_APPLICATION) }.unwrap_or_default(),
            ..Default::default()
        };

        // Copie l'info-bulle en gardant le zéro final
        // Copy the tooltip, keeping the trailing nul
        let max = data.szTip.len() - 1;
        for (dst, src) in data.szTip.iter_mut().zip(TRAY_TIP.encode_utf16().take(max)) {
            *dst = src;
        }

        if !unsafe { Shell_NotifyIconW(NIM_ADD, &data) }.as_bool() {
            warn!("failed to add tray icon");
            return None;
        }
        Some(Self { data })
    }
}

impl Drop for TrayIcon {
    fn drop(&mut self) {
        unsafe {
            let _ = Shell_NotifyIconW(NIM_DELETE, &self.data);
        }
    }
}

// =============================================================================
// WINDOW PROCEDURE
// =============================================================================

extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wp: WPARAM, lp: LPARAM) -> LRESULT {
    unsafe {
        match msg {
            WM_TRAY => {
                // Clic gauche sur l'icône => demande de sortie dans la file
                // Left click on the icon => exit request in the queue
                if lp.0 as u32 == WM_LBUTTONUP {
                    let _ = PostMessageW(hwnd, WM_EXIT_REQUEST, WPARAM(0), LPARAM(0));
                }
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wp, lp),
        }
    }
}

// =============================================================================
// BOUCLE DE MESSAGES
// MESSAGE LOOP
// =============================================================================

/// Traduit les messages Win32 en `Event` pour le répartiteur
/// Translates Win32 messages into `Event` for the dispatcher
fn translate(msg: &MSG) -> Option<Event> {
    match msg.message {
        WM_HOTKEY if msg.wParam.0 == HOTKEY_ID as usize => Some(Event::Toggle),
        WM_TIMER if msg.wParam.0 == TIMER_ID => Some(Event::Tick),
        WM_EXIT_REQUEST => Some(Event::ExitRequested),
        _ => None,
    }
}

fn message_loop<S, P, T>(dispatcher: &mut Dispatcher<S, P, T>) -> Result<()>
where
    S: MagnificationService,
    P: PointerSource,
    T: TickSource,
{
    let mut msg = MSG::default();
    loop {
        match pump(unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) }.0) {
            Pump::Message => {}
            Pump::Quit => return Ok(()),
            Pump::Failed => {
                let reason = last_error();
                warn!(%reason, "message loop failed");
                return Err(MagnifierError::ServiceUnavailable(format!(
                    "message loop failed: {reason}"
                )));
            }
        }

        match translate(&msg) {
            Some(event) => {
                if dispatcher.handle(event, Instant::now()) == Flow::Exit {
                    return Ok(());
                }
            }
            None => unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
    }
}

// =============================================================================
// API PUBLIQUE
// =============================================================================

pub fn run(options: &RunOptions) -> Result<()> {
    let _instance = SingleInstance::acquire()?;

    // Coordonnées en pixels physiques pour GetCursorPos et GetSystemMetrics
    // Physical-pixel coordinates for GetCursorPos and GetSystemMetrics
    if !unsafe { SetProcessDPIAware() }.as_bool() {
        warn!("failed to enable DPI awareness");
    }
    let geometry = screen_size()?;
    // Zone morte trop large : échouer avant l'icône et le raccourci
    // Oversized dead zone: fail before the tray icon and the hotkey
    validate(options, geometry)?;

    let window = MessageWindow::create()?;
    let _hotkey = HotkeyRegistration::register(window.hwnd, options.hotkey)?;
    let _tray = TrayIcon::add(window.hwnd);

    let controller = MagnificationController::new(
        options.magnifier,
        geometry,
        WinMagnification::initialize()?,
        WinCursor,
        WinTimer { hwnd: window.hwnd },
    )?
    .with_tick_interval(options.tick_interval);
    let mut dispatcher = Dispatcher::new(controller).with_cooldown(options.cooldown);

    info!(hotkey = %options.hotkey, "waiting for hotkey");
    let result = message_loop(&mut dispatcher);

    // Remet l'écran à l'échelle 1 et libère l'API avant la fenêtre
    // Resets the screen to scale 1 and releases the API before the window
    drop(dispatcher);
    result
}

/// Boîte de dialogue d'erreur (pas de console en version release)
/// Error message box (no console in release builds)
pub fn report_fatal(error: &MagnifierError) {
    let text = HSTRING::from(error.to_string());
    unsafe {
        MessageBoxW(None, &text, w!("Magni"), MB_OK | MB_ICONERROR);
    }
}
