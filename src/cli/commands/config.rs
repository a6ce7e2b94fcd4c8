//! `relia config` command - effective configuration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::output::{effective_format, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration after all layers are applied
    Show,

    /// Print the configuration files consulted, in order
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = match effective_format(global.format, false) {
        OutputFormat::Auto => OutputFormat::Yaml,
        other => other,
    };
    print_structured(&config, format)?;
    Ok(())
}

fn run_path() -> Result<()> {
    match Config::user_config_path() {
        Some(path) => print_path("user", &path),
        None => println!("{} user config: no home directory", style("⚠").yellow()),
    }

    let cwd = std::env::current_dir().map_err(|e| miette::miette!("{}", e))?;
    print_path("project", &Config::project_config_path(&cwd));
    Ok(())
}

fn print_path(layer: &str, path: &std::path::Path) {
    let state = if path.exists() {
        style("found").green()
    } else {
        style("missing").dim()
    };
    println!("{:<8} {} ({})", layer, path.display(), state);
}
