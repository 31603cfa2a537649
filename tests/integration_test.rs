use batch_classifier::infrastructure::LocalStore;
use batch_classifier::models::{FuzzyRule, FuzzyRuleBase, InferenceKind};
use batch_classifier::{
    logger, BroadcastHandle, ClassificationWorker, ClassifyJob, ExecutionContext, JobError,
    JobLocations,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const DATASET: &str = r#"
labels = ["zero", "one"]

[[attributes]]
name = "x"
kind = "numeric"
min = 0.0
max = 1.0

[[attributes]]
name = "class"
kind = "label"
"#;

/// 只有一个模糊标签、一条规则的模型，总是预测类别 1
fn always_one_model() -> Vec<u8> {
    FuzzyRuleBase::new(
        vec![(0.0, 1.0)],
        1,
        InferenceKind::WinningRule,
        vec![FuzzyRule {
            antecedent: vec![0],
            class: 1,
            weight: 1.0,
        }],
    )
    .unwrap()
    .to_bytes()
    .unwrap()
}

fn write(root: &Path, key: &str, content: &[u8]) {
    let path = root.join(key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn seed(root: &Path, inputs: &[(&str, &str)]) {
    write(root, "meta/dataset.toml", DATASET.as_bytes());
    write(root, "meta/model.bin", &always_one_model());
    for (name, content) in inputs {
        write(root, &format!("in/{}", name), content.as_bytes());
    }
}

fn job(root: &Path, cache: &Path, workers: usize) -> ClassifyJob<LocalStore> {
    ClassifyJob::new(
        JobLocations {
            model: "meta/model.bin".to_string(),
            input: "in".to_string(),
            dataset: "meta/dataset.toml".to_string(),
            output: "out".to_string(),
        },
        Arc::new(LocalStore::new(root)),
        ExecutionContext {
            max_concurrent_workers: workers,
            broadcast_cache_dir: cache.to_path_buf(),
            skip_corrupt_partitions: false,
        },
    )
}

#[tokio::test]
async fn test_two_files_against_constant_model() {
    logger::init();
    let root = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    seed(
        root.path(),
        &[("a.txt", "0.1,zero\n0.9,one\n"), ("b.txt", "0.5,one\n")],
    );

    let mut job = job(root.path(), cache.path(), 4);
    let report = job.run().await.expect("作业应该成功");

    assert_eq!(report.partitions, 2);
    assert_eq!(report.records, 3);
    assert_eq!(
        fs::read_to_string(root.path().join("out/a.txt.out")).unwrap(),
        "1.0\n1.0\n"
    );
    assert_eq!(
        fs::read_to_string(root.path().join("out/b.txt.out")).unwrap(),
        "1.0\n"
    );
    assert_eq!(job.results().unwrap().len(), 3);
    assert!(!root.path().join("out/partitions").exists());
}

#[tokio::test]
async fn test_output_files_match_sources() {
    let root = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let inputs = [
        ("one.csv", "0.2,zero\n"),
        ("gaps.csv", "\n0.3,one\n\n0.4,zero\r\n0.5,?\n\n"),
        ("blank.csv", "\n\n"),
        ("none.csv", ""),
    ];
    seed(root.path(), &inputs);

    let mut job = job(root.path(), cache.path(), 2);
    job.run().await.expect("作业应该成功");

    let out_files: Vec<_> = fs::read_dir(root.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(out_files.len(), inputs.len());

    let mut expected_rows = 0;
    for (name, content) in inputs {
        let non_empty = content.lines().filter(|l| !l.trim().is_empty()).count();
        let written = fs::read_to_string(root.path().join(format!("out/{}.out", name))).unwrap();
        assert_eq!(written.lines().count(), non_empty, "{}", name);
        expected_rows += non_empty;
    }
    assert_eq!(job.results().unwrap().len(), expected_rows);
}

#[tokio::test]
async fn test_results_independent_of_worker_count() {
    let inputs = [
        ("p1.txt", "0.1,zero\n0.2,one\n"),
        ("p2.txt", "0.3,one\n"),
        ("p3.txt", "0.4,zero\n0.5,zero\n0.6,one\n"),
        ("p4.txt", "0.7,?\n"),
    ];

    let mut sorted_runs = Vec::new();
    for workers in [1, 3] {
        let root = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        seed(root.path(), &inputs);

        let mut job = job(root.path(), cache.path(), workers);
        job.run().await.expect("作业应该成功");

        let mut rows = job.results().unwrap().as_slice().to_vec();
        rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
        sorted_runs.push(rows);
    }

    assert_eq!(sorted_runs[0].len(), 7);
    assert_eq!(sorted_runs[0], sorted_runs[1]);
}

#[tokio::test]
async fn test_existing_output_rejected() {
    let root = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    seed(root.path(), &[("a.txt", "0.1,zero\n")]);
    write(root.path(), "out/keep.me", b"old");

    let mut job = job(root.path(), cache.path(), 2);
    let err = job.run().await.unwrap_err();

    assert!(matches!(err, JobError::OutputAlreadyExists { .. }));
    assert_eq!(
        fs::read_to_string(root.path().join("out/keep.me")).unwrap(),
        "old"
    );
    assert_eq!(fs::read_dir(cache.path()).unwrap().count(), 0);
    assert!(job.results().is_none());
}

#[tokio::test]
async fn test_worker_with_single_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "dataset.toml", DATASET.as_bytes());

    let handle = BroadcastHandle::from_paths(vec![dir.path().join("dataset.toml")]);
    let result = ClassificationWorker::setup(&handle).await;

    assert!(matches!(
        result,
        Err(JobError::MissingArtifact {
            expected: 2,
            found: 1
        })
    ));
}

#[tokio::test]
async fn test_corrupt_model_artifact_fails_job() {
    let root = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    seed(root.path(), &[("a.txt", "0.1,zero\n")]);
    let model = always_one_model();
    write(root.path(), "meta/model.bin", &model[..model.len() - 4]);

    let mut job = job(root.path(), cache.path(), 2);
    let err = job.run().await.unwrap_err();

    match err {
        JobError::ScoringStageFailed { source, .. } => {
            assert!(matches!(*source, JobError::MalformedArtifact { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!root.path().join("out").exists());
    assert_eq!(fs::read_dir(cache.path()).unwrap().count(), 0);
}
