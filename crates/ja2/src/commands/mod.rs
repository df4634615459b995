pub mod install;
pub mod slf;
pub mod sti;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Install the Wildfire maps into a mod directory
    Install(install::InstallArgs),
    /// Handle SLF archives
    Slf {
        #[command(subcommand)]
        command: slf::SlfCommands,
    },
    /// Handle STI images
    Sti {
        #[command(subcommand)]
        command: sti::StiCommands,
    },
}

impl Commands {
    pub fn handle(&self, verbose: bool) -> miette::Result<()> {
        match self {
            Commands::Install(install) => install.handle(verbose),
            Commands::Slf { command } => command.handle(),
            Commands::Sti { command } => command.handle(),
        }
    }
}
