pub mod extract;
pub mod list;

#[derive(clap::Subcommand)]
pub enum SlfCommands {
    /// List the entries of an SLF file
    List(list::ListArgs),
    /// Extract an SLF file into a directory
    Extract(extract::ExtractArgs),
}

impl SlfCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            SlfCommands::List(list) => list.handle(),
            SlfCommands::Extract(extract) => extract.handle(),
        }
    }
}
