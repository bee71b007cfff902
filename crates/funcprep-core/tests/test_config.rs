use funcprep_core::config::ProjectConfig;
use funcprep_core::error::FuncprepError;
use funcprep_core::plan::generate_fanout;

const PROJECT: &str = r#"
default_experiment = "exp_alpha"

[scan.subj01.sess01]
exp_alpha = ["run01", "run02"]

[scan.subj01.sess02]
exp_alpha = ["run01"]
exp_beta = ["run01", "run02", "run03"]

[scan.subj02.sess01]
exp_alpha = ["run02", "run01", "run03"]
"#;

#[test]
fn test_project_roundtrip_into_hierarchy() {
    let config: ProjectConfig = toml::from_str(PROJECT).unwrap();
    assert_eq!(config.default_experiment.as_deref(), Some("exp_alpha"));

    let hierarchy = config.hierarchy().unwrap();
    let subjects: Vec<&str> = hierarchy.subjects().collect();
    assert_eq!(subjects, ["subj01", "subj02"]);

    // Out-of-order run lists are sorted at validation.
    assert_eq!(
        hierarchy.runs("subj02", "sess01", "exp_alpha").unwrap(),
        &["run01".to_string(), "run02".to_string(), "run03".to_string()]
    );
}

#[test]
fn test_loaded_hierarchy_plans() {
    let config: ProjectConfig = toml::from_str(PROJECT).unwrap();
    let hierarchy = config.hierarchy().unwrap();

    let subjects = vec!["subj01".to_string(), "subj02".to_string()];
    let fanout = generate_fanout(&hierarchy, "exp_beta", &subjects, None);

    assert_eq!(fanout.subjects, vec!["subj01".to_string()]);
    assert_eq!(fanout.runs.len(), 1);
}

#[test]
fn test_duplicate_runs_rejected_at_validation() {
    let text = r#"
[scan.subj01.sess01]
exp_alpha = ["run01", "run01"]
"#;
    let config: ProjectConfig = toml::from_str(text).unwrap();
    let err = config.hierarchy().unwrap_err();
    assert!(matches!(err, FuncprepError::DuplicateRun { .. }));
}

#[test]
fn test_default_experiment_is_optional() {
    let text = r#"
[scan.subj01.sess01]
exp_alpha = ["run01"]
"#;
    let config: ProjectConfig = toml::from_str(text).unwrap();
    assert!(config.default_experiment.is_none());
    assert!(config.hierarchy().is_ok());
}
