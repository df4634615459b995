use clap::Args;
use ja2_install::{overlay::Overlay, path::resolve};
use ja2_slf::SlfArchive;
use miette::{miette, Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input SLF file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Only extract this entry, matched ignoring case
    #[arg(short, long, value_name = "NAME")]
    name: Option<String>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut slf = SlfArchive::open(&self.file)
            .context(format!("opening {}", self.file.display()))?;

        let names = match &self.name {
            Some(name) => vec![slf.find(name)?.name.to_string()],
            None => slf.file_names().map(str::to_owned).collect(),
        };

        if !self.overwrite {
            for name in &names {
                let target = resolve(&self.directory, name)?;
                if target.exists() {
                    return Err(miette!(
                        "{} already exists, pass --overwrite to replace it",
                        target.display()
                    ));
                }
            }
        }

        let mut overlay = Overlay::mount(&mut slf, &self.directory)?;
        for name in &names {
            let written = overlay.copy_one(name)?;
            info!("writing {}", written.display());
        }
        Ok(())
    }
}
