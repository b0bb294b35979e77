//! Integration tests for the Fetch -> Process -> Apply pipeline

mod common;

use std::sync::Mutex;

use bundle_unpack::error::fs as fs_error;
use bundle_unpack::fs::storage::MODE_FILE;
use bundle_unpack::pipeline::ObjectMeta;
use bundle_unpack::{
    Apply, Bundle, BundleDeployment, BundleFs, Context, ErrorKind, Fetch, FetchResult,
    FilesystemView, GitSource, MemoryTree, Object, Pipeline, Process, ResolvedSource, Result,
    TemplatePackage, UnpackError, Values,
};
use common::{FixtureRepo, TestUnpacker};

const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

/// Serves a fixed in-memory tree
struct StaticFetch {
    files: Vec<(&'static str, &'static str)>,
}

impl Fetch for StaticFetch {
    fn validate(&self, _bundle: &Bundle) -> Result<()> {
        Ok(())
    }

    fn unpack(&self, _ctx: &Context, bundle: &Bundle) -> Result<FetchResult> {
        let mut tree = MemoryTree::new();
        for (path, content) in &self.files {
            tree.insert_file(path, *content, MODE_FILE)?;
        }
        let git = bundle.source().git.as_ref().ok_or(UnpackError::MissingRepository)?;
        Ok(FetchResult {
            bundle: BundleFs::new(tree),
            resolved_source: ResolvedSource::pin(git, COMMIT)?,
        })
    }
}

/// Reads every YAML document under `manifests/`
struct ManifestProcess;

impl Process for ManifestProcess {
    fn convert(&self, _ctx: &Context, view: &dyn FilesystemView, _bundle: &Bundle) -> Result<Vec<Object>> {
        let mut objects = Vec::new();
        for entry in view.read_dir("manifests")? {
            let path = format!("manifests/{}", entry.name());
            let content = String::from_utf8_lossy(&view.read_file(&path)?).into_owned();
            objects.extend(Object::from_yaml_documents(&content, &path)?);
        }
        Ok(objects)
    }

    fn extract_template(&self, objects: &[Object]) -> Result<(TemplatePackage, Values)> {
        let mut values = Values::new();
        values.insert("objectCount".to_string(), objects.len().into());
        let package = TemplatePackage {
            name: "bundle".to_string(),
            version: "0.0.0".to_string(),
            templates: objects.to_vec(),
        };
        Ok((package, values))
    }
}

/// Records what it was asked to apply
#[derive(Default)]
struct RecordingApply {
    applied: Mutex<Vec<(String, Vec<String>)>>,
    fail: bool,
}

impl Apply for RecordingApply {
    fn apply(&self, deployment: &BundleDeployment, package: &TemplatePackage, _values: &Values) -> Result<()> {
        if self.fail {
            return Err(fs_error::io_error("target unreachable"));
        }
        let names = package.templates.iter().map(|o| o.name().to_string()).collect();
        self.applied
            .lock()
            .unwrap()
            .push((deployment.name.clone(), names));
        Ok(())
    }
}

fn deployment(repository: &str) -> BundleDeployment {
    BundleDeployment::new(
        "web-deployment",
        Bundle::from_git("web", GitSource::new(repository).with_branch("main")),
    )
}

const MANIFESTS: &str = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: settings\n---\napiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n";

#[test]
fn test_pipeline_runs_all_stages() {
    let pipeline = Pipeline::new(
        StaticFetch {
            files: vec![("manifests/all.yaml", MANIFESTS)],
        },
        ManifestProcess,
        RecordingApply::default(),
    );

    let resolved = pipeline
        .run(&Context::background(), &deployment("https://example/web.git"))
        .unwrap();

    assert_eq!(resolved.commit(), COMMIT);
    let applied = pipeline.applier().applied.lock().unwrap();
    assert_eq!(
        *applied,
        vec![(
            "web-deployment".to_string(),
            vec!["settings".to_string(), "web".to_string()]
        )]
    );
}

#[test]
fn test_process_failure_stops_before_apply() {
    let pipeline = Pipeline::new(
        StaticFetch { files: vec![] },
        ManifestProcess,
        RecordingApply::default(),
    );

    let err = pipeline
        .run(&Context::background(), &deployment("https://example/web.git"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Pipeline);
    assert!(err.to_string().starts_with("convert stage failed"));
    assert!(pipeline.applier().applied.lock().unwrap().is_empty());
}

#[test]
fn test_apply_failure_is_stage_failure() {
    let pipeline = Pipeline::new(
        StaticFetch {
            files: vec![("manifests/all.yaml", MANIFESTS)],
        },
        ManifestProcess,
        RecordingApply {
            fail: true,
            ..RecordingApply::default()
        },
    );

    let err = pipeline
        .run(&Context::background(), &deployment("https://example/web.git"))
        .unwrap_err();
    assert_eq!(err.to_string(), "apply stage failed: IO error: target unreachable");
}

#[test]
fn test_fetch_errors_pass_through() {
    let unpacker = TestUnpacker::new();
    let pipeline = Pipeline::new(unpacker.unpacker.clone(), ManifestProcess, RecordingApply::default());
    let mut bad = deployment("https://example/web.git");
    bad.template.spec.source.git.as_mut().unwrap().directory = Some("../up".to_string());

    let err = pipeline.run(&Context::background(), &bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Containment);
}

#[test]
fn test_pipeline_over_git() {
    common::init_tracing();
    let repo = FixtureRepo::new();
    let tip = repo.commit("main", "manifests", &[("manifests/all.yaml", MANIFESTS)]);
    let unpacker = TestUnpacker::new();
    let pipeline = Pipeline::new(unpacker.unpacker.clone(), ManifestProcess, RecordingApply::default());

    let resolved = pipeline
        .run(&Context::background(), &deployment(&repo.url()))
        .unwrap();

    assert_eq!(resolved.commit(), tip.to_string());
    assert_eq!(pipeline.applier().applied.lock().unwrap().len(), 1);
}

#[test]
fn test_object_new_sets_name() {
    let object = Object::new("v1", "ConfigMap", "settings");
    assert_eq!(
        object.metadata,
        ObjectMeta {
            name: "settings".to_string(),
            ..ObjectMeta::default()
        }
    );
}
