//! Build script rendering man pages for `billing-settings` and each of its
//! subcommands into `OUT_DIR`.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Command, CommandFactory};
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

use cli::Cli;

const PAGE_NAME: &str = env!("CARGO_PKG_NAME");

fn render(command: Command, title: &str, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    Man::new(command).title(title).render(&mut buffer)?;
    fs::write(target, buffer)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "cargo:rerun-if-changed=build.rs")?;
    writeln!(stdout, "cargo:rerun-if-changed=src/cli")?;

    let out_dir =
        PathBuf::from(env::var_os("OUT_DIR").ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR was not set")
        })?);

    let command = Cli::command().version(env!("CARGO_PKG_VERSION"));
    for sub in command.get_subcommands() {
        let page = format!("{PAGE_NAME}-{}", sub.get_name());
        render(
            sub.clone(),
            &page.to_uppercase(),
            &out_dir.join(format!("{page}.1")),
        )?;
    }
    render(
        command,
        &PAGE_NAME.to_uppercase(),
        &out_dir.join(format!("{PAGE_NAME}.1")),
    )?;

    Ok(())
}
