//! Backend address resolution

/// Port the reference backend listens on (see `[server] port` in its config.toml)
pub const BACKEND_PORT: u16 = 3000;

/// Base URL of the backend: same host as the console page, backend port.
///
/// Outside a browser (native tests) there is no window and the result is empty.
pub fn api_base() -> String {
    let Some(window) = web_sys::window() else {
        return String::new();
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    base_url(&protocol, &hostname)
}

fn base_url(protocol: &str, hostname: &str) -> String {
    format!("{}//{}:{}", protocol, hostname, BACKEND_PORT)
}
