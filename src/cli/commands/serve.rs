//! Web server command.

use console::style;

use crate::config::Settings;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let (host, port) = match bind {
        Some(bind) => parse_bind_address(bind, &settings.server.host, settings.server.port),
        None => (settings.server.host.clone(), settings.server.port),
    };

    if !settings.llm.has_api_key() {
        println!(
            "{} GEMINI_API_KEY not set, analysis will return sample data",
            style("!").yellow()
        );
    }

    println!(
        "{} Starting Medilens server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8080" -> default host, 8080
/// - Just a host: "127.0.0.1" -> 127.0.0.1, default port
/// - Host and port: "127.0.0.1:8080"
fn parse_bind_address(bind: &str, default_host: &str, default_port: u16) -> (String, u16) {
    if let Ok(port) = bind.parse::<u16>() {
        return (default_host.to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    (bind.to_string(), default_port)
}
