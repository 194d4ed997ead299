//! Per-module lifecycle state machine.

use super::follow_up::{FollowUpKey, FollowUpRegistry};
use crate::bundler::{
    BuildConfiguration, Platform, Settings,
    archive::Archive,
    error::{Error, Result},
    klib::{ArtifactRepacker, MergeReport, RepackReport, ResourceMergeWalker},
    settings::capitalize,
};
use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

const COMPILE_STAGE: &str = "onCompileComplete";
const FRAMEWORK_LINK_STAGE: &str = "onFrameworkLinkComplete";
const TEST_LINK_STAGE: &str = "onTestLinkComplete";

/// Kind of link output a module produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LinkKind {
    /// Framework (dynamic or static)
    Framework,
    /// Test executable
    Test,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Framework => f.write_str("framework"),
            LinkKind::Test => f.write_str("test"),
        }
    }
}

/// Where a module is in its build.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModuleState {
    /// Nothing compiled yet.
    PreCompile,
    /// Library compiled and repacked.
    Compiled,
    /// At least one link output received resources; holds the latest kind.
    Linked(LinkKind),
}

/// A completed framework link step.
#[derive(Clone, Debug)]
pub struct FrameworkLink {
    /// Framework output directory.
    pub output_dir: PathBuf,
    /// Libraries the link step consumed, in link order.
    pub upstream: Vec<PathBuf>,
    /// Whether the framework is statically linked.
    pub is_static: bool,
    /// Target platform.
    pub platform: Platform,
    /// Build configuration.
    pub configuration: BuildConfiguration,
    /// Host link task name; derived from configuration and platform if unset.
    pub link_task: Option<String>,
}

impl FrameworkLink {
    /// Dynamic framework link with no upstream libraries.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        platform: Platform,
        configuration: BuildConfiguration,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            upstream: Vec::new(),
            is_static: false,
            platform,
            configuration,
            link_task: None,
        }
    }

    /// Sets the upstream libraries.
    pub fn upstream<I, P>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.upstream = libraries.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the framework as statically linked.
    pub fn static_framework(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Sets the host link task name.
    pub fn link_task(mut self, name: impl Into<String>) -> Self {
        self.link_task = Some(name.into());
        self
    }

    /// Link task name, e.g. `linkReleaseFrameworkIosArm64`.
    pub fn link_task_name(&self) -> String {
        match &self.link_task {
            Some(name) => name.clone(),
            None => format!(
                "link{}Framework{}",
                self.configuration,
                self.platform.task_suffix()
            ),
        }
    }

    /// Copy task paired with the link task: `linkXxx` becomes `copyResourcesXxx`.
    pub fn copy_task_name(&self) -> String {
        let link = self.link_task_name();
        match link.strip_prefix("link") {
            Some(rest) => format!("copyResources{rest}"),
            None => format!("copyResources{}", capitalize(&link)),
        }
    }

    fn follow_up_key(&self) -> FollowUpKey {
        FollowUpKey::new(self.platform, self.configuration)
    }
}

/// A follow-up copy obligation recorded for a static framework.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FollowUpRegistration {
    /// Registry key.
    pub key: FollowUpKey,
    /// Entry-point task the packaging step runs.
    pub entry_point: String,
    /// Copy task the entry point now depends on.
    pub copy_task: String,
}

/// Outcome of [`StageOrchestrator::on_framework_link_complete`].
#[derive(Clone, Debug)]
pub struct FrameworkLinkReport {
    /// Merge counters.
    pub merge: MergeReport,
    /// Set for static frameworks only.
    pub follow_up: Option<FollowUpRegistration>,
}

/// Drives one module through compile and link stages.
///
/// Hooks must be called in order: [`on_compile_complete`] once, then any
/// number of distinct link hooks. Out-of-order or repeated calls fail with
/// [`Error::StageOrder`] without touching the filesystem.
///
/// [`on_compile_complete`]: StageOrchestrator::on_compile_complete
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_resources::bundler::{
///     BuildConfiguration, Platform, SettingsBuilder,
///     archive::ZipArchiver,
///     stage::{FollowUpRegistry, FrameworkLink, StageOrchestrator},
/// };
/// use std::{path::Path, sync::Arc};
///
/// # async fn example() -> kodegen_bundler_resources::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .resources_package("com.example.shared")
///     .platform(Platform::IosArm64)
///     .generation_dir("build/generated/moko-resources/res")
///     .build()?;
/// let follow_ups = Arc::new(FollowUpRegistry::new());
/// let mut module =
///     StageOrchestrator::new("shared", settings, Arc::new(ZipArchiver), follow_ups);
///
/// module.on_compile_complete(Path::new("build/shared.klib")).await?;
/// module
///     .on_framework_link_complete(
///         FrameworkLink::new(
///             "build/shared.framework",
///             Platform::IosArm64,
///             BuildConfiguration::Release,
///         )
///         .static_framework(true),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StageOrchestrator {
    module: String,
    settings: Settings,
    repacker: ArtifactRepacker,
    walker: ResourceMergeWalker,
    follow_ups: Arc<FollowUpRegistry>,
    state: ModuleState,
    artifact: Option<PathBuf>,
    links: HashSet<(LinkKind, PathBuf)>,
}

impl StageOrchestrator {
    /// Creates an orchestrator for `module` in the [`ModuleState::PreCompile`] state.
    pub fn new(
        module: impl Into<String>,
        settings: Settings,
        archive: Arc<dyn Archive>,
        follow_ups: Arc<FollowUpRegistry>,
    ) -> Self {
        let walker = ResourceMergeWalker::new(Arc::clone(&archive), settings.library_extension());
        let repacker = ArtifactRepacker::new(settings.clone(), archive);
        Self {
            module: module.into(),
            settings,
            repacker,
            walker,
            follow_ups,
            state: ModuleState::PreCompile,
            artifact: None,
            links: HashSet::new(),
        }
    }

    /// Resumes a module whose compile stage ran in an earlier process.
    ///
    /// `artifact` is the module's repacked library, if it has one; it is
    /// merged after the link step's upstream libraries.
    pub fn resume_compiled(mut self, artifact: Option<PathBuf>) -> Self {
        self.state = ModuleState::Compiled;
        self.artifact = artifact;
        self
    }

    /// Module name.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Module settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current state.
    pub fn state(&self) -> &ModuleState {
        &self.state
    }

    /// Shared follow-up registry.
    pub fn follow_ups(&self) -> &Arc<FollowUpRegistry> {
        &self.follow_ups
    }

    fn reject(&self, stage: &'static str, reason: impl Into<String>) -> Error {
        Error::StageOrder {
            module: self.module.clone(),
            stage,
            reason: reason.into(),
        }
    }

    fn check_link(&self, stage: &'static str, kind: LinkKind, output_dir: &Path) -> Result<()> {
        if self.state == ModuleState::PreCompile {
            return Err(self.reject(stage, "library has not been compiled yet"));
        }
        if self.links.contains(&(kind, output_dir.to_path_buf())) {
            return Err(self.reject(
                stage,
                format!("{kind} output {} already received resources", output_dir.display()),
            ));
        }
        Ok(())
    }

    /// Upstream libraries followed by the module's own library.
    fn link_inputs(&self, upstream: &[PathBuf]) -> Vec<PathBuf> {
        let mut inputs = upstream.to_vec();
        if let Some(artifact) = &self.artifact
            && !inputs.contains(artifact)
        {
            inputs.push(artifact.clone());
        }
        inputs
    }

    /// Repacks the module's freshly compiled library.
    ///
    /// # Errors
    ///
    /// [`Error::StageOrder`] if the module was already compiled; otherwise
    /// any repack failure, which leaves the module in `PreCompile`.
    pub async fn on_compile_complete(&mut self, artifact: &Path) -> Result<RepackReport> {
        if self.state != ModuleState::PreCompile {
            return Err(self.reject(COMPILE_STAGE, "library was already compiled"));
        }

        let report = self.repacker.repack(artifact).await?;
        self.artifact = Some(artifact.to_path_buf());
        self.state = ModuleState::Compiled;
        Ok(report)
    }

    /// Copies upstream resources into a linked framework.
    ///
    /// Static frameworks additionally register a follow-up copy task keyed
    /// by (platform, configuration) in the shared registry.
    pub async fn on_framework_link_complete(
        &mut self,
        link: FrameworkLink,
    ) -> Result<FrameworkLinkReport> {
        self.check_link(FRAMEWORK_LINK_STAGE, LinkKind::Framework, &link.output_dir)?;

        let inputs = self.link_inputs(&link.upstream);
        let merge = self.walker.merge_into(&link.output_dir, &inputs).await?;

        let follow_up = link.is_static.then(|| {
            if self.settings.warn_on_static_framework() {
                log::warn!(
                    "{} is a static framework; its resources are not embedded automatically. \
                     Run {} when packaging the app, or set \
                     disable_static_framework_warning to hide this warning",
                    link.output_dir.display(),
                    link.follow_up_key().task_name()
                );
            }

            let key = link.follow_up_key();
            let copy_task = link.copy_task_name();
            let task = self.follow_ups.register(key);
            task.depends_on(copy_task.clone());
            log::info!("{} depends on {}", task.name(), copy_task);

            FollowUpRegistration {
                key,
                entry_point: task.name(),
                copy_task,
            }
        });

        self.links.insert((LinkKind::Framework, link.output_dir));
        self.state = ModuleState::Linked(LinkKind::Framework);
        Ok(FrameworkLinkReport { merge, follow_up })
    }

    /// Copies upstream resources next to a linked test executable.
    pub async fn on_test_link_complete(
        &mut self,
        output_dir: &Path,
        upstream: &[PathBuf],
    ) -> Result<MergeReport> {
        self.check_link(TEST_LINK_STAGE, LinkKind::Test, output_dir)?;

        let inputs = self.link_inputs(upstream);
        let merge = self.walker.merge_into(output_dir, &inputs).await?;

        self.links.insert((LinkKind::Test, output_dir.to_path_buf()));
        self.state = ModuleState::Linked(LinkKind::Test);
        Ok(merge)
    }
}
