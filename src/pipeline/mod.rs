//! Fetch -> Process -> Apply composition
//!
//! Only fetching is implemented in this crate. Converting bundle content
//! into objects, extracting a template package and applying it to a target
//! are done by collaborators implementing [`Process`] and [`Apply`];
//! [`Pipeline`] wires the three stages together.

pub mod object;

use tracing::{debug, info, instrument};

use crate::context::Context;
use crate::error::{Result, UnpackError};
use crate::fs::FilesystemView;
use crate::source::{Bundle, ResolvedSource};
use crate::unpack::Fetch;

pub use object::{BundleDeployment, Object, ObjectMeta, TemplatePackage, Values};

/// Turns fetched bundle content into a template package
pub trait Process: Send + Sync {
    /// Read the bundle's content into generic objects
    fn convert(&self, ctx: &Context, view: &dyn FilesystemView, bundle: &Bundle) -> Result<Vec<Object>>;

    /// Build the template package and its values from converted objects
    fn extract_template(&self, objects: &[Object]) -> Result<(TemplatePackage, Values)>;
}

/// Deploys a template package to a target
pub trait Apply: Send + Sync {
    fn apply(&self, deployment: &BundleDeployment, package: &TemplatePackage, values: &Values) -> Result<()>;
}

/// Runs the three stages in order, stopping at the first failure
#[derive(Debug, Clone)]
pub struct Pipeline<F, P, A> {
    fetch: F,
    process: P,
    apply: A,
}

impl<F, P, A> Pipeline<F, P, A> {
    pub fn new(fetch: F, process: P, apply: A) -> Self {
        Self {
            fetch,
            process,
            apply,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetch
    }

    pub fn processor(&self) -> &P {
        &self.process
    }

    pub fn applier(&self) -> &A {
        &self.apply
    }
}

impl<F: Fetch, P: Process, A: Apply> Pipeline<F, P, A> {
    /// Fetch, process and apply `deployment`'s bundle.
    ///
    /// Returns the pinned source that was deployed. Process and Apply
    /// failures are reported as `StageFailed`; fetch errors pass through
    /// unchanged.
    #[instrument(skip_all, fields(deployment = %deployment.name))]
    pub fn run(&self, ctx: &Context, deployment: &BundleDeployment) -> Result<ResolvedSource> {
        let bundle = &deployment.template;
        let fetched = self.fetch.unpack(ctx, bundle)?;

        let objects = self
            .process
            .convert(ctx, &fetched.bundle, bundle)
            .map_err(|e| stage_failed("convert", e))?;
        debug!(objects = objects.len(), "converted bundle content");

        let (package, values) = self
            .process
            .extract_template(&objects)
            .map_err(|e| stage_failed("extract template", e))?;

        self.apply
            .apply(deployment, &package, &values)
            .map_err(|e| stage_failed("apply", e))?;
        info!(
            package = %package.name,
            commit = fetched.resolved_source.commit(),
            "applied bundle"
        );

        Ok(fetched.resolved_source)
    }
}

fn stage_failed(stage: &'static str, err: UnpackError) -> UnpackError {
    match err {
        UnpackError::StageFailed { .. } | UnpackError::Cancelled { .. } => err,
        other => UnpackError::StageFailed {
            stage,
            message: other.to_string(),
        },
    }
}
