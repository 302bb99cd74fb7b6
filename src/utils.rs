//! 控制台日志与 panic hook 等通用工具。

/// Formats a message and writes it to the JS console.
#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        $crate::utils::log_line(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        $crate::utils::warn_line(&format!($($arg)*))
    };
}

// web-sys imports only exist on wasm32; native builds (and `cargo test`) drop the output.
#[cfg(target_arch = "wasm32")]
pub fn log_line(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_line(_message: &str) {}

#[cfg(target_arch = "wasm32")]
pub fn warn_line(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn_line(_message: &str) {}

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}
