pub mod convert;

#[derive(clap::Subcommand)]
pub enum StiCommands {
    /// Convert a 16-bit STI image to an 8-bit PCX
    Convert(convert::ConvertArgs),
}

impl StiCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            StiCommands::Convert(convert) => convert.handle(),
        }
    }
}
