use clap::Parser;
use miette::Result;
use relia::cli::{Cli, Commands};
use relia::core::config::Config;
use relia::core::logging::{init_logging, level_for_flags, LogError};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let configured = Config::load().log_level;
    let level = level_for_flags(&configured, cli.global.verbose, cli.global.trace);
    match init_logging(&level) {
        Ok(()) | Err(LogError::AlreadyInitialized) => {}
        Err(e) => return Err(miette::miette!("{}", e)),
    }

    let global = cli.global;
    match cli.command {
        Commands::Fit(args) => relia::cli::commands::fit::run(args, &global),
        Commands::Analyze(args) => relia::cli::commands::analyze::run(args, &global),
        Commands::Optimize(args) => relia::cli::commands::optimize::run(args, &global),
        Commands::Simulate(args) => relia::cli::commands::simulate::run(args, &global),
        Commands::Config(cmd) => relia::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => relia::cli::commands::completions::run(args),
    }
}
