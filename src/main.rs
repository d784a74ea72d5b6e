use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use gestdoc::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
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
    let global = cli.global;

    init_logging(global.verbose);

    match cli.command {
        Commands::Init(args) => gestdoc::cli::commands::init::run(args),
        Commands::Entity(cmd) => gestdoc::cli::commands::entity::run(cmd, &global),
        Commands::Request(cmd) => gestdoc::cli::commands::request::run(cmd, &global),
        Commands::Status(args) => gestdoc::cli::commands::status::run(args, &global),
        Commands::Config(cmd) => gestdoc::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => gestdoc::cli::commands::completions::run(args),
    }
}

/// Log to stderr, filtered by GESTDOC_LOG (default `warn`); --verbose forces `debug`
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("gestdoc=debug")
    } else {
        EnvFilter::try_from_env("GESTDOC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
