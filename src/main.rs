use clap::Parser;
use rustdoc_implementors::cli::{Cli, Commands};
use rustdoc_implementors::commands::{handle_check, handle_emit, handle_list, handle_traits};
use rustdoc_implementors::config::Config;
use rustdoc_implementors::registry::Registry;
use rustdoc_implementors::site::Site;
use rustdoc_implementors::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::discover(cli.config.as_deref())?;

    // Logs go to stderr; stdout carries the command output.
    logging::init(cli.log_format.unwrap_or(config.log_format));

    let roots = if cli.doc_roots.is_empty() {
        config.effective_doc_roots()
    } else {
        cli.doc_roots.clone()
    };
    let site = Site::new(roots);

    let output = match cli.command {
        Commands::Traits => handle_traits(&site)?,
        Commands::List {
            trait_path,
            install,
            staging,
            format,
        } => {
            // One invocation loads one page, so the page's registry is the process-wide one.
            let registry = Registry::init_global(staging.unwrap_or(config.staging));
            handle_list(
                &site,
                registry,
                &trait_path,
                install.unwrap_or(config.install),
                format.unwrap_or(config.format),
            )
            .await?
        }
        Commands::Check => {
            let (output, ok) = handle_check(&site).await?;
            print!("{}", output);
            if !ok {
                std::process::exit(1);
            }
            return Ok(());
        }
        Commands::Emit { payload, output } => handle_emit(&payload, &output).await?,
    };

    print!("{}", output);
    Ok(())
}
