use clap::Args;
use itertools::Itertools;
use ja2_slf::SlfArchive;
use miette::{Context, Result};
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input SLF file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Show offset and size of each entry
    #[arg(short, long, default_value_t = false)]
    long: bool,

    /// Sort entries by name, ignoring case, instead of stored order
    #[arg(long, default_value_t = false)]
    sorted: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let slf = SlfArchive::open(&self.file)
            .context(format!("opening {}", self.file.display()))?;

        println!(
            "{} ({}): {} entries",
            slf.library_name(),
            slf.library_path(),
            slf.len()
        );

        let entries = if self.sorted {
            slf.entries()
                .iter()
                .sorted_by_cached_key(|e| e.name.to_lowercase())
                .collect_vec()
        } else {
            slf.entries().iter().collect_vec()
        };

        for entry in entries {
            if self.long {
                println!("{:>10} {:>10}  {}", entry.offset, entry.length, entry.name);
            } else {
                println!("{}", entry.name);
            }
        }
        Ok(())
    }
}
