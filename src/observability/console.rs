//! Operator-facing console output.
//!
//! Short colored banners for the person running the server. Everything here
//! also goes to the log; this is the human summary.

use std::error::Error;
use std::io::IsTerminal;

use crate::net::interfaces::ServerUrls;

const BLUE: u8 = 34;
const BRIGHT_RED: u8 = 91;
const BRIGHT_YELLOW: u8 = 93;

fn paint(color: u8, text: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{color}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn render_starting(color: bool) -> String {
    format!("\n{}\n", paint(BLUE, "Starting the server...", color))
}

pub fn render_listening(urls: &ServerUrls, color: bool) -> String {
    let line = |label: &str, url: &str| {
        format!(
            "{} {}\n",
            paint(BLUE, label, color),
            paint(BRIGHT_YELLOW, url, color)
        )
    };

    let mut out = String::from("\n");
    out.push_str(&line("Server running on:", &urls.network));
    out.push_str(&line("You can also use:", &urls.local));
    if let Some(docs) = &urls.docs {
        out.push_str(&line("API docs available on:", docs));
    }
    out.push('\n');
    out
}

/// `error` and every cause beneath it on one line, joined with `: `.
pub fn error_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Failure banner with the full source chain, one cause per line.
pub fn render_failure(error: &dyn Error, color: bool) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str("\n  caused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    format!("\n{}\n", paint(BRIGHT_RED, &text, color))
}

pub fn print_starting() {
    print!("{}", render_starting(std::io::stdout().is_terminal()));
}

pub fn print_listening(urls: &ServerUrls) {
    print!("{}", render_listening(urls, std::io::stdout().is_terminal()));
}

pub fn print_failure(error: &dyn Error) {
    eprint!("{}", render_failure(error, std::io::stderr().is_terminal()));
}
