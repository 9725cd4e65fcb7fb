use vercon_core::scenario::Scenario;

const SAMPLE: &str = r#"
root = "app"

[[node]]
name = "app"
version = "1.0.0"
requires = [
    { package = "http", range = "[1.0.0,2.0.0)" },
    { package = "check", range = "[0.3.0,0.4.0)", test = true },
]

[[node]]
name = "http"
version = "1.4.0"
requires = [{ package = "bytes", range = "[0.5.0,0.6.0)" }]

[lock]
http = "1.4.0"

[available]
bytes = ["0.5.1", "0.6.0"]
"#;

#[test]
fn parses_nodes_and_requirements() {
    let s = Scenario::parse_toml(SAMPLE).unwrap();
    assert_eq!(s.root, "app");
    assert_eq!(s.nodes.len(), 2);
    let app = s.node("app").unwrap();
    assert_eq!(app.requires.len(), 2);
    assert!(!app.requires[0].test);
    assert!(app.requires[1].test);
    assert_eq!(s.lock.get("http").map(String::as_str), Some("1.4.0"));
}

#[test]
fn packages_include_required_only_names() {
    let s = Scenario::parse_toml(SAMPLE).unwrap();
    let pkgs: Vec<&str> = s.packages().into_iter().collect();
    assert_eq!(pkgs, vec!["app", "bytes", "check", "http"]);
}

#[test]
fn knows_nodes_and_requirements() {
    let s = Scenario::parse_toml(SAMPLE).unwrap();
    assert!(s.knows("http"));
    assert!(s.knows("bytes"));
    assert!(!s.knows("left-pad"));
}

#[test]
fn availability_defaults_to_everything() {
    let s = Scenario::parse_toml(SAMPLE).unwrap();
    assert!(s.is_available("bytes", "0.5.1"));
    assert!(!s.is_available("bytes", "0.5.2"));
    assert!(s.is_available("http", "9.9.9"));
}

#[test]
fn rejects_missing_root_node() {
    let err = Scenario::parse_toml("root = \"app\"\n").unwrap_err();
    assert!(err.to_string().contains("root package `app` has no node"));
}

#[test]
fn rejects_duplicate_package_nodes() {
    let toml = r#"
root = "app"

[[node]]
name = "app"
version = "1.0.0"

[[node]]
name = "app"
version = "2.0.0"
"#;
    let err = Scenario::parse_toml(toml).unwrap_err();
    assert!(err.to_string().contains("more than one node"));
}

#[test]
fn from_path_reports_missing_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert!(Scenario::from_path(&tmp.path().join("nope.toml")).is_err());
}
