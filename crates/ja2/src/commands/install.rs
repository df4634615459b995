use clap::Args;
use ja2_install::{InstallOptions, InstallationPlan, Installer};
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream};
use std::{fs, path::PathBuf};
use tracing::info;

/// Plan installing the Wildfire maps on top of vanilla data
pub const WILDFIRE_PLAN: &str = include_str!("../../plans/wildfire.json");

#[derive(Args)]
pub struct InstallArgs {
    /// The Wildfire data directory holding the SLF archives
    #[arg(short, long, value_name = "DIR")]
    src_dir: PathBuf,

    /// The Data directory of the mod
    #[arg(short, long, value_name = "DIR", default_value = "./Data")]
    work_dir: PathBuf,

    /// A JSON installation plan, the Wildfire plan is used when omitted
    #[arg(short, long, value_name = "FILE")]
    plan: Option<PathBuf>,

    /// Palette size of converted images, overriding the plan
    #[arg(long, value_name = "COLORS")]
    colors: Option<usize>,
}

impl InstallArgs {
    fn load_plan(&self) -> Result<InstallationPlan> {
        let mut plan = match &self.plan {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .into_diagnostic()
                    .context(format!("reading {}", path.display()))?;
                InstallationPlan::from_json(&json)
                    .context(format!("parsing {}", path.display()))?
            }
            None => InstallationPlan::from_json(WILDFIRE_PLAN)?,
        };

        if let Some(colors) = self.colors {
            plan.convert.iter_mut().for_each(|c| c.colors = colors);
        }
        Ok(plan)
    }

    pub fn handle(&self, verbose: bool) -> Result<()> {
        let plan = self.load_plan()?;
        let options = InstallOptions::builder()
            .source_dir(&self.src_dir)
            .destination_dir(&self.work_dir)
            .verbose(verbose)
            .build();

        info!(
            "installing from {} into {}",
            self.src_dir.display(),
            self.work_dir.display()
        );
        let report = Installer::new(plan, options).run()?;

        for warning in &report.warnings {
            println!(
                "{} {warning}",
                "[WARN]".if_supports_color(Stream::Stdout, |t| t.yellow())
            );
        }
        println!(
            "{} unpacked {} archives, extracted {} resources, converted {} images",
            "[OK]".if_supports_color(Stream::Stdout, |t| t.green()),
            report.unpacked.len(),
            report.extracted.len(),
            report.converted.len()
        );
        println!(
            "{}",
            "Installation finished".if_supports_color(Stream::Stdout, |t| t.green())
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use ja2_install::InstallationPlan;
    use pretty_assertions::assert_eq;

    use crate::commands::install::WILDFIRE_PLAN;

    #[test]
    fn wildfire_plan_parses() -> miette::Result<()> {
        let plan = InstallationPlan::from_json(WILDFIRE_PLAN)?;

        assert_eq!(
            plan.required_archives().into_iter().collect::<Vec<_>>(),
            vec!["Maps", "RadarMaps", "TileSets"]
        );
        assert_eq!(plan.extract.len(), 8);
        assert!(plan.extract.iter().all(|r| r.archive.is_none()));
        assert_eq!(plan.delete.len(), 5);
        assert_eq!(plan.convert[0].colors, 8);
        assert_eq!(plan.replace[0].to, "Maps/g6.dat");

        Ok(())
    }
}
