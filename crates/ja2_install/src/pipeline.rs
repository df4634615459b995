//! The installation state machine
//!
//! A run walks through the [`Phase`]s in order. Preflight checks every precondition it can and
//! reports all missing archives at once; every later phase stops at its first failure. Each step
//! overwrites what an earlier run may have left behind, so a failed run is fixed by addressing the
//! reported problem and running the same plan again.

use bon::Builder;
use derive_more::Display;
use indexmap::IndexSet;
use ja2_slf::{SlfArchive, SlfEntry};
use md5::{Digest, Md5};
use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::{Error, PipelineError, Result},
    overlay::{write_atomically, DirectoryMount, Overlay},
    path::resolve,
    plan::{ConvertRequest, ExtractRequest, InstallationPlan, ReplaceRequest},
};

/// Stages of an installation run, in the order they execute
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    #[display("preflight")]
    Preflight,
    #[display("unpacking directories")]
    UnpackDirectories,
    #[display("extracting single resources")]
    ExtractSingleResources,
    #[display("deleting excluded files")]
    DeleteExcludedFiles,
    #[display("converting images")]
    ConvertImage,
    #[display("replacing maps")]
    ReplaceMaps,
    #[display("done")]
    Done,
}

impl Phase {
    /// The phase following this one, [`Phase::Done`] stays where it is
    pub fn next(self) -> Phase {
        match self {
            Phase::Preflight => Phase::UnpackDirectories,
            Phase::UnpackDirectories => Phase::ExtractSingleResources,
            Phase::ExtractSingleResources => Phase::DeleteExcludedFiles,
            Phase::DeleteExcludedFiles => Phase::ConvertImage,
            Phase::ConvertImage => Phase::ReplaceMaps,
            Phase::ReplaceMaps | Phase::Done => Phase::Done,
        }
    }
}

/// Where to install from and to
#[derive(Debug, Clone, Builder)]
pub struct InstallOptions {
    /// Directory holding the archives
    #[builder(into)]
    pub source_dir: PathBuf,

    /// Data directory of the mod, has to exist
    #[builder(into)]
    pub destination_dir: PathBuf,

    /// Log the complete error chain when a run fails
    #[builder(default)]
    pub verbose: bool,

    /// Extension of archive files, matched ignoring case
    #[builder(into, default = "slf".to_owned())]
    pub archive_extension: String,
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Non fatal findings of the preflight
    pub warnings: Vec<String>,
    /// Archives unpacked as a whole
    pub unpacked: Vec<String>,
    /// Single resources written
    pub extracted: Vec<PathBuf>,
    /// Excluded files removed
    pub deleted: Vec<PathBuf>,
    /// Excluded files that did not exist
    pub already_absent: Vec<String>,
    /// Converted images written
    pub converted: Vec<PathBuf>,
    /// Swaps performed
    pub replaced: Vec<PathBuf>,
    /// Swaps found already applied
    pub already_replaced: Vec<PathBuf>,
    /// First phase that was not run because the caller stopped the run
    pub stopped_before: Option<Phase>,
}

/// Runs an [`InstallationPlan`]
#[derive(Debug, Clone)]
pub struct Installer {
    plan: InstallationPlan,
    options: InstallOptions,
}

type OpenedArchive = SlfArchive<BufReader<File>>;

/// Suffix of the file recording the digest of a performed swap
pub const REPLACED_MARKER_SUFFIX: &str = ".replaced";

/// Archives of the source directory, opened on demand in lowercase file name order
///
/// Archives are only opened until one holds the requested resource. Opened archives are kept for
/// later lookups, archives that cannot be opened are skipped with a warning.
struct Discovery {
    pending: std::vec::IntoIter<(String, PathBuf)>,
    opened: Vec<(String, OpenedArchive)>,
}

impl Discovery {
    fn new(mut candidates: Vec<(String, PathBuf)>) -> Self {
        candidates.sort_by_key(|(stem, _)| stem.to_lowercase());
        Discovery {
            pending: candidates.into_iter(),
            opened: Vec::new(),
        }
    }

    /// Position of the first archive holding `resource` in [`Discovery::opened`]
    fn find(&mut self, resource: &str) -> Option<usize> {
        if let Some((index, _)) = locate_resource(self.opened.iter().map(|(_, a)| a), resource) {
            return Some(index);
        }

        for (stem, path) in self.pending.by_ref() {
            match SlfArchive::open(&path) {
                Ok(archive) => {
                    debug!("discovered {stem} with {} entries", archive.len());
                    let holds = archive.index_for_name(resource).is_some();
                    self.opened.push((stem, archive));
                    if holds {
                        return Some(self.opened.len() - 1);
                    }
                }
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
        None
    }
}

impl Installer {
    /// Prepare a run of `plan`, nothing is touched until [`Installer::run`]
    pub fn new(plan: InstallationPlan, options: InstallOptions) -> Self {
        Installer { plan, options }
    }

    /// The plan this installer carries out
    pub fn plan(&self) -> &InstallationPlan {
        &self.plan
    }

    /// Source and destination of the run
    pub fn options(&self) -> &InstallOptions {
        &self.options
    }

    /// Run every phase
    pub fn run(&self) -> core::result::Result<InstallReport, PipelineError> {
        self.run_until(|_| true)
    }

    /// Run phases while `proceed` agrees
    ///
    /// `proceed` is asked before each phase starts. Returning `false` ends the run successfully,
    /// with [`InstallReport::stopped_before`] naming the phase that was skipped. Phases are never
    /// interrupted halfway.
    pub fn run_until(
        &self,
        mut proceed: impl FnMut(Phase) -> bool,
    ) -> core::result::Result<InstallReport, PipelineError> {
        let mut report = InstallReport::default();
        let mut phase = Phase::Preflight;

        while phase != Phase::Done {
            if !proceed(phase) {
                info!("stopping before {phase}");
                report.stopped_before = Some(phase);
                return Ok(report);
            }

            info!("{phase}");
            let outcome = match phase {
                Phase::Preflight => self.preflight(&mut report),
                Phase::UnpackDirectories => self.unpack_directories(&mut report),
                Phase::ExtractSingleResources => self.extract_single_resources(&mut report),
                Phase::DeleteExcludedFiles => self.delete_excluded_files(&mut report),
                Phase::ConvertImage => self.convert_images(&mut report),
                Phase::ReplaceMaps => self.replace_maps(&mut report),
                Phase::Done => Ok(()),
            };

            if let Err(e) = outcome {
                self.report_failure(&e);
                return Err(e);
            }
            phase = phase.next();
        }

        info!("installation finished");
        Ok(report)
    }

    fn report_failure(&self, failure: &PipelineError) {
        if self.options.verbose {
            error!("{failure}: {:?}", failure.error);
        } else {
            error!("{failure}: {}", failure.error);
        }
    }

    /// Check the destination and every archive the plan names
    #[instrument(skip_all, err)]
    pub fn preflight(&self, report: &mut InstallReport) -> core::result::Result<(), PipelineError> {
        let phase = Phase::Preflight;
        let destination = &self.options.destination_dir;
        let source = &self.options.source_dir;

        if !destination.is_dir() {
            return Err(fail(
                phase,
                "checking the destination",
                Error::MissingDestination {
                    path: destination.clone(),
                },
            ));
        }

        info!("using {} as source directory", source.display());

        let mut missing = IndexSet::new();
        for name in self.plan.required_archives() {
            let file_name = self.archive_file_name(name);
            let path = resolve(source, &file_name)
                .map_err(|e| fail(phase, format!("looking for {file_name}"), e))?;
            if path.is_file() {
                info!("{} exists", path.logical());
            } else {
                error!("{file_name} does not exist in {}", source.display());
                missing.insert(name.to_owned());
            }

            let output = resolve(destination, name)
                .map_err(|e| fail(phase, format!("looking for {name}"), e))?;
            if output.is_dir() {
                let warning = format!("destination directory {} already exists", output.logical());
                warn!("{warning}");
                report.warnings.push(warning);
            }
        }

        if !missing.is_empty() {
            return Err(fail(
                phase,
                "checking for archives",
                Error::MissingArchives {
                    names: missing.into_iter().collect(),
                },
            ));
        }

        info!("preflight checks passed");
        Ok(())
    }

    /// Copy each whole archive into a directory of the same name
    pub fn unpack_directories(
        &self,
        report: &mut InstallReport,
    ) -> core::result::Result<(), PipelineError> {
        for name in &self.plan.unpack {
            attempt(Phase::UnpackDirectories, format!("unpacking {name}"), || {
                let mut archive = self.open_archive(name)?;
                let output = resolve(&self.options.destination_dir, name)?;
                info!("unpacking {name}");
                let written = Overlay::mount(&mut archive, output.into_path_buf())?.copy_all()?;
                Ok(written.len())
            })?;
            report.unpacked.push(name.clone());
        }
        Ok(())
    }

    /// Copy single resources out of hinted or discovered archives
    pub fn extract_single_resources(
        &self,
        report: &mut InstallReport,
    ) -> core::result::Result<(), PipelineError> {
        let phase = Phase::ExtractSingleResources;

        let candidates = if self.plan.extract.iter().any(|r| r.archive.is_none()) {
            attempt(phase, "listing archives", || self.list_archives())?
        } else {
            Vec::new()
        };
        let mut discovery = Discovery::new(candidates);

        for request in &self.plan.extract {
            let step = format!("extracting {}", request.resource);
            let written = attempt(phase, step, || match &request.archive {
                Some(hint) => {
                    let mut archive = self.open_archive(hint)?;
                    self.extract_from(hint, &mut archive, request)
                }
                None => {
                    let index = discovery.find(&request.resource).ok_or_else(|| {
                        Error::ResourceNotFound {
                            resource: request.resource.clone(),
                            location: self.options.source_dir.display().to_string(),
                        }
                    })?;
                    let (stem, archive) = &mut discovery.opened[index];
                    self.extract_from(stem, archive, request)
                }
            })?;
            report.extracted.push(written);
        }
        Ok(())
    }

    fn extract_from(
        &self,
        stem: &str,
        archive: &mut OpenedArchive,
        request: &ExtractRequest,
    ) -> Result<PathBuf> {
        info!("extracting {stem}/{}", request.resource);
        let output = resolve(&self.options.destination_dir, stem)?;
        let written = Overlay::mount(archive, output.into_path_buf())?.copy_one(&request.resource)?;
        Ok(written)
    }

    /// Remove files the plan does not want, absent files are skipped
    pub fn delete_excluded_files(
        &self,
        report: &mut InstallReport,
    ) -> core::result::Result<(), PipelineError> {
        for name in &self.plan.delete {
            attempt(Phase::DeleteExcludedFiles, format!("deleting {name}"), || {
                let path = resolve(&self.options.destination_dir, name)?;
                match fs::remove_file(&*path) {
                    Ok(()) => {
                        info!("deleted {}", path.logical());
                        report.deleted.push(path.into_path_buf());
                        Ok(())
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        debug!("{name} is already absent");
                        report.already_absent.push(name.clone());
                        Ok(())
                    }
                    Err(source) => Err(Error::IOWrite {
                        path: path.into_path_buf(),
                        source,
                    }),
                }
            })?;
        }
        Ok(())
    }

    /// Convert images to PCX next to the original
    pub fn convert_images(
        &self,
        report: &mut InstallReport,
    ) -> core::result::Result<(), PipelineError> {
        for request in &self.plan.convert {
            let step = format!("converting {}", request.source);
            let written = attempt(Phase::ConvertImage, step, || self.convert(request))?;
            report.converted.push(written);
        }
        Ok(())
    }

    fn convert(&self, request: &ConvertRequest) -> Result<PathBuf> {
        let destination = DirectoryMount::open(&self.options.destination_dir);
        let source = destination.resolve(&request.source)?;
        let data = destination.read(&request.source)?;

        let pcx = ja2_sti::convert_to_pcx(&data, request.colors).map_err(|source| Error::Image {
            name: request.source.clone(),
            source,
        })?;

        let target = source.relative().with_extension(&request.extension);
        let written = destination.write(&target.to_string_lossy(), &pcx)?;
        info!(
            "converted {} to {}",
            source.logical(),
            written.display()
        );
        Ok(written)
    }

    /// Move alternate files over their canonical counterpart
    pub fn replace_maps(
        &self,
        report: &mut InstallReport,
    ) -> core::result::Result<(), PipelineError> {
        for request in &self.plan.replace {
            let step = format!("replacing {} with {}", request.to, request.from);
            attempt(Phase::ReplaceMaps, step, || self.replace(request, report))?;
        }
        Ok(())
    }

    /// Perform a single swap
    ///
    /// A performed swap records the digest of the moved content in a marker next to the canonical
    /// file. Without the alternate file the swap counts as applied only when the canonical file
    /// matches the digest of the plan or, lacking one, the digest of that marker.
    fn replace(&self, request: &ReplaceRequest, report: &mut InstallReport) -> Result<()> {
        let from = resolve(&self.options.destination_dir, &request.from)?;
        let to = resolve(&self.options.destination_dir, &request.to)?;
        let marker = replacement_marker(&to);

        if from.is_file() {
            let digest = file_digest(&from)?;
            fs::rename(&*from, &*to).map_err(|source| Error::IOWrite {
                path: to.to_path_buf(),
                source,
            })?;
            write_atomically(&marker, digest.as_bytes())?;
            info!("replaced {} with {}", to.logical(), from.logical());
            report.replaced.push(to.into_path_buf());
            return Ok(());
        }

        if to.is_file() && holds_replacement(&to, &marker, request.md5.as_deref())? {
            info!("{} was already replaced", to.logical());
            report.already_replaced.push(to.into_path_buf());
            return Ok(());
        }

        Err(Error::MissingReplacementSource {
            from: request.from.clone(),
            to: request.to.clone(),
        })
    }

    fn archive_file_name(&self, name: &str) -> String {
        format!("{name}.{}", self.options.archive_extension)
    }

    fn open_archive(&self, name: &str) -> Result<OpenedArchive> {
        let path = resolve(&self.options.source_dir, &self.archive_file_name(name))?;
        SlfArchive::open(&path).map_err(|source| Error::Archive {
            name: name.to_owned(),
            source,
        })
    }

    /// Every archive in the source directory with its file stem, in directory order
    #[instrument(skip(self), err)]
    fn list_archives(&self) -> Result<Vec<(String, PathBuf)>> {
        let source = &self.options.source_dir;
        let unavailable = |e| Error::FilesystemUnavailable {
            path: source.clone(),
            source: e,
        };

        let mut found = Vec::new();
        for entry in fs::read_dir(source).map_err(unavailable)? {
            let path = entry.map_err(unavailable)?.path();
            let is_archive = path.extension().is_some_and(|ext| {
                ext.to_string_lossy()
                    .eq_ignore_ascii_case(&self.options.archive_extension)
            });
            if !is_archive || !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            found.push((stem, path));
        }
        Ok(found)
    }
}

/// Find the first archive holding `resource`, ignoring case
///
/// Archives are searched in the order given and the search stops at the first match. Returns
/// the position of the archive and the matching entry.
pub fn locate_resource<'a, R: 'a>(
    archives: impl IntoIterator<Item = &'a SlfArchive<R>>,
    resource: &str,
) -> Option<(usize, &'a SlfEntry)> {
    archives
        .into_iter()
        .enumerate()
        .find_map(|(i, archive)| archive.find(resource).ok().map(|entry| (i, entry)))
}

fn replacement_marker(canonical: &Path) -> PathBuf {
    let mut marker = canonical.as_os_str().to_owned();
    marker.push(REPLACED_MARKER_SUFFIX);
    PathBuf::from(marker)
}

fn file_digest(path: &Path) -> Result<String> {
    Ok(format!("{:x}", Md5::digest(fs::read(path)?)))
}

fn holds_replacement(canonical: &Path, marker: &Path, expected: Option<&str>) -> Result<bool> {
    let expected = match expected {
        Some(expected) => expected.to_owned(),
        None => match fs::read_to_string(marker) {
            Ok(recorded) => recorded.trim().to_owned(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} has no record of a swap", canonical.display());
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        },
    };

    let actual = file_digest(canonical)?;
    if !actual.eq_ignore_ascii_case(&expected) {
        warn!(
            "{} has digest {actual}, expected {expected}",
            canonical.display()
        );
        return Ok(false);
    }
    Ok(true)
}

fn fail(phase: Phase, step: impl Into<String>, error: Error) -> PipelineError {
    PipelineError {
        phase,
        step: step.into(),
        error,
    }
}

fn attempt<T>(
    phase: Phase,
    step: impl Into<String>,
    operation: impl FnOnce() -> Result<T>,
) -> core::result::Result<T, PipelineError> {
    operation().map_err(|e| fail(phase, step, e))
}
