use clap::Parser;

mod cli;
mod command;

fn initialize_logger(debug: bool) -> color_eyre::Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("releasaurus")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    match &cli_args.command {
        cli::Command::Plan {
            input,
            out_file,
            write,
        } => {
            command::plan::execute(
                &cli_args,
                input,
                out_file.as_deref(),
                *write,
            )
            .await?
        }
        cli::Command::Release {
            title,
            body_file,
            head_branch,
            sha,
            label,
            out_file,
        } => {
            let merged = command::release::MergedArgs {
                title,
                body_file,
                head_branch,
                sha,
                labels: label,
            };
            command::release::execute(&cli_args, merged, out_file.as_deref())
                .await?
        }
    }

    Ok(())
}
