//! Interactive mode for the server.
//!
//! Prompts for bind address, port, and data source before starting.

use dialoguer::{Confirm, Input, Select};

use crate::ServerError;
use crate::config::{DEFAULT_BIND_ADDR, DEFAULT_PORT};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks for a bind address, a port, and whether to serve from Supabase
/// or a local JSON fixture, sets the corresponding environment variables
/// (`BIND_ADDR`, `PORT`, `PROPERTY_FIXTURE`), and delegates to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns [`ServerError`] if the server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("Glamping Map Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(DEFAULT_BIND_ADDR.to_string())
        .interact_text()
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default(DEFAULT_PORT.to_string())
        .interact_text()
        .unwrap_or_else(|_| DEFAULT_PORT.to_string());

    let sources = ["Supabase", "Local JSON fixture"];
    let source = Select::new()
        .with_prompt("Property data")
        .items(&sources)
        .default(0)
        .interact()
        .unwrap_or(0);

    let fixture: Option<String> = if source == 1 {
        Input::new()
            .with_prompt("Fixture path")
            .interact_text()
            .ok()
    } else {
        None
    };

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        match &fixture {
            Some(path) => std::env::set_var("PROPERTY_FIXTURE", path),
            None => std::env::remove_var("PROPERTY_FIXTURE"),
        }
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
