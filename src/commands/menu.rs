//! `imgconv commands`

use serde::Serialize;
use tabled::Tabled;

use imgconv_core::config::AppConfig;
use imgconv_core::result::AppResult;

use super::{Cli, Session};
use crate::output;

#[derive(Debug, Serialize, Tabled)]
struct CommandRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Context menu")]
    context_menu: bool,
    #[tabled(rename = "Plugin")]
    plugin: String,
}

/// List the registered commands in menu order.
pub fn execute(cli: &Cli, config: &AppConfig) -> AppResult<()> {
    let session = Session::open(cli, config)?;
    let info = session.plugin.info();
    let rows: Vec<CommandRow> = session
        .registry
        .commands()
        .map(|(plugin, handler)| CommandRow {
            id: handler.id().to_string(),
            label: handler.label().to_string(),
            context_menu: handler.in_context_menu(),
            plugin: format!("{plugin} {}", info.version),
        })
        .collect();
    output::print_list(&rows, &rows, cli.format);
    Ok(())
}
