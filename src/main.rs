use clap::{Arg, Command};

mod commands;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let matches = Command::new("mm-actions")
        .version(VERSION)
        .about("Run Mattermost message actions from the command line")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Mattermost configuration file (TOML)")
                .default_value("mattermost.toml")
                .global(true),
        )
        .subcommand(Command::new("list").about("List the actions this configuration advertises"))
        .subcommand(
            Command::new("run")
                .about("Execute one action and print the JSON result")
                .arg(
                    Arg::new("action")
                        .value_name("ACTION")
                        .help("Action name (send, react, reactions, read, edit, delete, pin, unpin, list-pins)")
                        .required(true),
                )
                .arg(
                    Arg::new("params")
                        .short('p')
                        .long("params")
                        .value_name("JSON")
                        .help("Action parameters as a JSON object")
                        .default_value("{}"),
                )
                .arg(
                    Arg::new("account")
                        .short('a')
                        .long("account")
                        .value_name("ID")
                        .help("Account to act as (defaults to params.accountId, then the default account)"),
                ),
        )
        .get_matches();

    init_tracing();

    let result = match matches.subcommand() {
        Some(("list", sub_matches)) => commands::list::run(sub_matches).await,
        Some(("run", sub_matches)) => commands::run::run(sub_matches).await,
        _ => {
            println!("mm-actions v{}", VERSION);
            println!("Use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
