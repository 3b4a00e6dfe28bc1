//! Test server control commands

use anyhow::Result;
use clap::Subcommand;
use wedtest_common::ServerConfig;
use wedtest_e2e::ControlClient;

use crate::output::print_success;

#[derive(Subcommand, Debug)]
pub enum ControlCommands {
    /// Restore the server to its initial state
    Reset,

    /// Reset, then make every subsequent save fail
    FailOnSave,
}

pub async fn execute(cmd: ControlCommands, server: &ServerConfig) -> Result<()> {
    let client = ControlClient::new(server)?;

    match cmd {
        ControlCommands::Reset => {
            client.reset().await?;
            print_success(&format!("Reset {}", client.url()));
        }
        ControlCommands::FailOnSave => {
            client.fail_on_save().await?;
            print_success(&format!("Saves will now fail on {}", client.url()));
        }
    }

    Ok(())
}
