use clap::Parser;
use secrets_vault::cli::{Cli, Commands};

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => secrets_vault::cli::commands::init::execute(&cli),
        Commands::Unlock => secrets_vault::cli::commands::unlock::execute(&cli),
        Commands::Lock => secrets_vault::cli::commands::lock::execute(&cli),
        Commands::Reset { force } => secrets_vault::cli::commands::reset::execute(&cli, force),
        Commands::Status => secrets_vault::cli::commands::status::execute(&cli),
        Commands::Persistence { ref mode } => {
            secrets_vault::cli::commands::persistence::execute(&cli, mode.as_deref())
        }
        Commands::CheckPassword => secrets_vault::cli::commands::check_password::execute(&cli),
        Commands::Show { reveal } => secrets_vault::cli::commands::show::execute(&cli, reveal),
        Commands::Set {
            ref field,
            ref value,
        } => secrets_vault::cli::commands::set::execute(&cli, field, value.as_deref()),
        Commands::ChangePassword => secrets_vault::cli::commands::change_password::execute(&cli),
    };

    if let Err(e) = result {
        secrets_vault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("secrets_vault=warn,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
