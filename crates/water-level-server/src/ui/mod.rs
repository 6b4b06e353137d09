//! Leptos SSR UI components
//!
//! Server-rendered HTML pages with embedded JavaScript for interactivity.
//! Initial values come from the dashboard snapshot; the scripts keep them
//! current over the WebSocket and the JSON API.

pub mod analysis;
pub mod components;
pub mod dashboard;
pub mod settings;

/// Styles shared by every page
pub const BASE_STYLES: &str = include_str!("styles/base.css");

/// CSS styles for the dashboard
pub const DASHBOARD_STYLES: &str = include_str!("styles/dashboard.css");

/// CSS styles for the analysis page
pub const ANALYSIS_STYLES: &str = include_str!("styles/analysis.css");

/// CSS styles for the settings page
pub const SETTINGS_STYLES: &str = include_str!("styles/settings.css");

/// JavaScript for the dashboard (gauge + WebSocket)
pub const DASHBOARD_SCRIPT: &str = include_str!("scripts/dashboard.js");

/// JavaScript for the analysis page (charts, export, recording)
pub const ANALYSIS_SCRIPT: &str = include_str!("scripts/analysis.js");

/// JavaScript for settings page interactivity
pub const SETTINGS_SCRIPT: &str = include_str!("scripts/settings.js");

/// Chart library loaded by the analysis page
pub const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// PWA manifest
pub const MANIFEST_JSON: &str = include_str!("manifest.json");

/// Content-Security-Policy for every page
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; style-src 'unsafe-inline'; connect-src 'self' ws: wss:; img-src 'self' data:;";

/// Escape </script> tags in embedded content
pub fn escape_script_tag(s: &str) -> String {
    s.replace("</script>", r#"<\/script>"#)
}

/// Serialize `value` for embedding in an inline script
pub fn embed_json<T: serde::Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
    escape_script_tag(&json)
}
