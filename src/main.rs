use clap::Parser;
use fdc::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
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

    match cli.command {
        Commands::Init(args) => fdc::cli::commands::init::run(args),
        Commands::Doc(cmd) => fdc::cli::commands::doc::run(cmd, &global),
        Commands::Submit(args) => args.run(&global),
        Commands::Approve(args) => args.run(&global),
        Commands::Reject(args) => args.run(&global),
        Commands::Review(args) => args.run(&global),
        Commands::Roster(cmd) => fdc::cli::commands::roster::run(cmd, &global),
        Commands::Audit(args) => fdc::cli::commands::audit::run(args, &global),
        Commands::Completions(args) => fdc::cli::commands::completions::run(args),
    }
}
