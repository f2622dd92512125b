// tests/lifecycle_test.rs
//
// Release scenarios driven through the public manager API against the
// in-memory git.
use tagkeeper::git::MockGit;
use tagkeeper::{BuildType, Config, TagLifecycleManager, TagkeeperError};

fn manager(mock: &MockGit) -> TagLifecycleManager<&MockGit> {
    TagLifecycleManager::new(mock, "/srv/app", Config::default())
}

#[test]
fn test_stage_release_after_current_tag() {
    let mock = MockGit::new().with_tag("2.5.1");
    let m = manager(&mock);

    assert_eq!(m.current_tag().unwrap().as_deref(), Some("2.5.1"));
    let set = m.auto_tag_and_set(BuildType::Stage).unwrap().unwrap();
    assert_eq!(set.as_str(), "2.5.2");
    assert_eq!(m.current_tag().unwrap().as_deref(), Some("2.5.2"));
    assert!(m.list_remote_tags().unwrap().contains(&"2.5.2".to_string()));
}

#[test]
fn test_prod_release_resets_patch() {
    let mock = MockGit::new().with_tag("2.5.2");
    let m = manager(&mock);

    let next = m.compute_next_tag(BuildType::Prod).unwrap().unwrap();
    assert_eq!(next.as_str(), "2.6.0");
    let set = m.auto_tag_and_set(BuildType::Prod).unwrap().unwrap();
    assert_eq!(set, next);
    assert_eq!(m.current_tag().unwrap().as_deref(), Some("2.6.0"));
    assert_eq!(mock.remote_tags(), vec!["2.5.2".to_string(), "2.6.0".to_string()]);
}

#[test]
fn test_first_release_needs_explicit_tag() {
    let mock = MockGit::new();
    let m = manager(&mock);

    assert_eq!(m.auto_tag_and_set(BuildType::Stage).unwrap(), None);
    assert_eq!(mock.calls_to("push"), 0);

    m.set_tag("0.1.0").unwrap();
    assert_eq!(m.current_tag().unwrap().as_deref(), Some("0.1.0"));
}

#[test]
fn test_set_then_delete() {
    let mock = MockGit::new();
    let m = manager(&mock);

    m.set_tag("1.0.0").unwrap();
    assert!(m.list_local_tags().unwrap().contains(&"1.0.0".to_string()));
    assert!(m.list_remote_tags().unwrap().contains(&"1.0.0".to_string()));

    m.delete_tag("1.0.0").unwrap();
    assert!(m.list_local_tags().unwrap().is_empty());
    assert!(m.list_remote_tags().unwrap().is_empty());

    // Deleting again is not an error
    m.delete_tag("1.0.0").unwrap();
}

#[test]
fn test_rejected_push_leaves_local_tag() {
    let mock = MockGit::new().with_tag("1.4.0").failing_pushes(2);
    let m = manager(&mock);

    let err = m.auto_tag_and_set(BuildType::Stage).unwrap_err();
    match err {
        TagkeeperError::PartialTagState { tag, .. } => assert_eq!(tag, "1.4.1"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(mock.local_tags().contains(&"1.4.1".to_string()));
    assert!(!mock.remote_tags().contains(&"1.4.1".to_string()));
    assert_eq!(mock.calls_to("pull"), 2);
}

#[test]
fn test_unconfigured_identity_stops_before_any_tag_command() {
    let mock = MockGit::new().with_tag("1.0.0").unconfigured();
    let m = manager(&mock);

    assert!(!m.is_repository_configured().unwrap());
    assert!(matches!(
        m.set_tag("1.0.1").unwrap_err(),
        TagkeeperError::GitNotConfigured
    ));
    assert!(matches!(
        m.delete_tag("1.0.0").unwrap_err(),
        TagkeeperError::GitNotConfigured
    ));
    assert!(matches!(
        m.compute_next_tag(BuildType::Stage).unwrap_err(),
        TagkeeperError::GitNotConfigured
    ));

    for call in mock.calls() {
        let subcommand = call[0].as_str();
        assert!(
            subcommand == "rev-parse" || subcommand == "config",
            "unexpected git call: {:?}",
            call
        );
    }
    assert_eq!(mock.local_tags(), vec!["1.0.0".to_string()]);
}

#[test]
fn test_outside_repository() {
    let mock = MockGit::new().not_a_repository();
    let m = manager(&mock);

    assert!(!m.is_repository_configured().unwrap());
    match m.current_tag().unwrap_err() {
        TagkeeperError::NotARepository(path) => assert_eq!(path.to_str(), Some("/srv/app")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_checkout_then_tag_on_new_branch() {
    let mock = MockGit::new().with_tag("3.1.0");
    let m = manager(&mock);

    m.checkout("hotfix/3.1", true).unwrap();
    assert_eq!(m.current_branch().unwrap().unwrap().name, "hotfix/3.1");

    m.auto_tag_and_set(BuildType::Stage).unwrap();
    assert!(mock.calls().contains(&vec![
        "push".to_string(),
        "origin".to_string(),
        "hotfix/3.1".to_string(),
        "refs/tags/3.1.1".to_string(),
    ]));
}

#[test]
fn test_configured_remote_is_used() {
    let mock = MockGit::new();
    let mut config = Config::default();
    config.git.remote = "upstream".to_string();
    let m = TagLifecycleManager::new(&mock, "/srv/app", config);

    m.set_tag("1.0.0").unwrap();
    assert!(mock
        .calls()
        .iter()
        .any(|call| call.len() > 1 && call[0] == "pull" && call[1] == "upstream"));
}
