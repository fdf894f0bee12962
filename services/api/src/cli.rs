use crate::scripts::{
    run_create_admin, run_migrate, run_seed, run_setup, AdminArgs, DatabaseArgs, SeedArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_board::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Job Board",
    about = "Run the job board service and its database provisioning scripts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Apply pending schema migrations and list the resulting tables
    Migrate(DatabaseArgs),
    /// Populate companies, categories, accounts, jobs, testimonials, and FAQs
    Seed(SeedArgs),
    /// Create the default staff account if it does not exist yet
    CreateAdmin(AdminArgs),
    /// Connection check, migrations, admin account, and sample data in one pass
    Setup(SeedArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Apply pending migrations before accepting traffic
    #[arg(long)]
    pub(crate) migrate: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Migrate(args) => run_migrate(args),
        Command::Seed(args) => run_seed(args),
        Command::CreateAdmin(args) => run_create_admin(args),
        Command::Setup(args) => run_setup(args),
    }
}
