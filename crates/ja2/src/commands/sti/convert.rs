use clap::Args;
use ja2_sti::{convert_to_pcx, quantize::DEFAULT_PALETTE_SIZE};
use miette::{Context, IntoDiagnostic, Result};
use std::{fs::File, io::Write, path::PathBuf};
use tracing::info;

#[derive(Args)]
pub struct ConvertArgs {
    /// An input STI file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The PCX file to write, defaults to the input with a pcx extension
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of palette colors
    #[arg(short, long, default_value_t = DEFAULT_PALETTE_SIZE)]
    colors: usize,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| self.file.with_extension("pcx"));

        let sti = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("reading {}", self.file.display()))?;
        let pcx = convert_to_pcx(&sti, self.colors)
            .context(format!("converting {}", self.file.display()))?;

        let mut out = if !self.overwrite {
            File::create_new(&output)
                .into_diagnostic()
                .context(format!("creating {}", output.display()))?
        } else {
            File::create(&output)
                .into_diagnostic()
                .context(format!("creating {}", output.display()))?
        };
        out.write_all(&pcx).into_diagnostic()?;

        info!("wrote {}", output.display());
        Ok(())
    }
}
