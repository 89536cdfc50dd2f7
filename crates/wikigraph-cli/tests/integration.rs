//! Integration tests for the wikigraph CLI
//!
//! These tests build a small graph database in a temporary directory and
//! run full CLI workflows against it.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wikigraph_core::{LinkRecord, PageRecord, SqliteGraphStore};

/// Get a Command for the wikigraph binary, isolated from the caller's
/// environment: the working directory and home live under `workspace`.
#[allow(deprecated)]
fn wikigraph(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wikigraph").expect("Failed to find wikigraph binary");
    cmd.current_dir(workspace)
        .env("HOME", workspace.join("home"))
        .env_remove("WIKIGRAPH_DATABASE")
        .env_remove("WIKIGRAPH_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Create a workspace holding `wikigraph.db`, the default database name.
fn setup_workspace() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    std::fs::create_dir_all(temp.path().join("home")).unwrap();
    build_database(&temp.path().join("wikigraph.db"));
    temp
}

fn build_database(path: &Path) {
    let store = SqliteGraphStore::create(path).expect("Failed to create database");
    let page = |record: PageRecord| store.insert_page(&record).unwrap();

    let obama = page(
        PageRecord::article("Barack Obama", "en")
            .with_wiki_id("534366")
            .with_parents(1)
            .with_degrees(3, 1),
    );
    let obama_fr = page(PageRecord::article("Barack Obama", "fr").with_wiki_id("534366"));
    let hawaii = page(
        PageRecord::article("Hawaii", "en")
            .with_coordinates(21.3, -157.8)
            .with_globe("earth"),
    );
    let honolulu = page(PageRecord::article("Honolulu", "en"));
    let senate = page(PageRecord::article("United States Senate", "en"));
    let obama_redirect = page(PageRecord::article("Obama", "en").redirect());
    let loop_a = page(PageRecord::article("Loop A", "en").redirect());
    let loop_b = page(PageRecord::article("Loop B", "en").redirect());
    let washington = page(PageRecord::article("Washington", "en").disambiguation());
    let washington_state = page(PageRecord::article("Washington (state)", "en"));
    let washington_dc = page(PageRecord::article("Washington, D.C.", "en"));
    let presidents = page(
        PageRecord::category("Presidents of the United States", "en").with_category_counts(0, 1),
    );

    store
        .insert_link(obama, hawaii, LinkRecord::at(2, 120).in_intro().with_occurrences(4))
        .unwrap();
    store.insert_link(obama, honolulu, LinkRecord::at(5, 900)).unwrap();
    store
        .insert_link(obama, senate, LinkRecord::at(3, 40).in_infobox())
        .unwrap();
    store.insert_link(hawaii, obama_redirect, LinkRecord::at(1, 10)).unwrap();

    store.insert_redirect(obama_redirect, obama).unwrap();
    store.insert_redirect(loop_a, loop_b).unwrap();
    store.insert_redirect(loop_b, loop_a).unwrap();

    for target in [washington_state, washington_dc] {
        store
            .insert_link(washington, target, LinkRecord::default().disambiguation())
            .unwrap();
    }

    store.insert_membership(obama, presidents).unwrap();
    store.insert_crosslink(obama, obama_fr).unwrap();
}

fn local_config(workspace: &Path) -> PathBuf {
    workspace.join(".wikigraph").join("config.toml")
}

// ============================================================================
// Page Command Integration Tests
// ============================================================================

#[test]
fn test_article_shows_attributes() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["article", "Barack Obama"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barack Obama"))
        .stdout(predicate::str::contains("534366"))
        .stdout(predicate::str::contains("outdegree: 3"));
}

#[test]
fn test_article_json_includes_spatial() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["article", "Hawaii", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"latitude\": 21.3"))
        .stdout(predicate::str::contains("\"kind\": \"article\""));
}

#[test]
fn test_article_in_other_language() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["--language", "fr", "article", "Barack Obama", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"language\": \"fr\""));
}

#[test]
fn test_unknown_article_fails() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["article", "Atlantis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No article titled 'Atlantis' in en"));
}

#[test]
fn test_category_members() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["category", "Presidents of the United States", "--members"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barack Obama [en]"));
}

// ============================================================================
// Traversal Command Integration Tests
// ============================================================================

#[test]
fn test_links_lists_targets() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["links", "Barack Obama"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hawaii"))
        .stdout(predicate::str::contains("Honolulu"))
        .stdout(predicate::str::contains("United States Senate"))
        .stderr(predicate::str::contains("3 page(s)"));
}

#[test]
fn test_links_max_rank_excludes_later_links() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["links", "Barack Obama", "--max-rank", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hawaii"))
        .stdout(predicate::str::contains("United States Senate"))
        .stdout(predicate::str::contains("Honolulu").not());
}

#[test]
fn test_links_resolve_redirects() {
    let workspace = setup_workspace();

    // Hawaii links to the redirect "Obama", reported as its target
    wikigraph(workspace.path())
        .args(["links", "Hawaii"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barack Obama [en]"))
        .stdout(predicate::str::contains("Obama [en]").count(1));

    wikigraph(workspace.path())
        .args(["links", "Barack Obama", "--incoming"])
        .assert()
        .success()
        .stderr(predicate::str::contains("0 page(s)"));
}

#[test]
fn test_links_details() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["links", "Barack Obama", "--intro", "--details"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hawaii  rank 2, 4 occurrence(s), intro"));
}

#[test]
fn test_categories_and_crosslinks() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["categories", "Barack Obama"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Presidents of the United States"));

    wikigraph(workspace.path())
        .args(["crosslinks", "Barack Obama", "--to", "fr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barack Obama [fr]"));

    wikigraph(workspace.path())
        .args(["crosslinks", "Barack Obama", "--to", "de"])
        .assert()
        .success()
        .stderr(predicate::str::contains("0 page(s)"));
}

// ============================================================================
// Redirect Command Integration Tests
// ============================================================================

#[test]
fn test_redirect_resolves_target() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["redirect", "Obama"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barack Obama [en]"));
}

#[test]
fn test_redirect_cycle_has_no_target() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["redirect", "Loop A"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no target"));
}

#[test]
fn test_redirect_on_plain_article_fails() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["redirect", "Hawaii"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a redirect"));
}

#[test]
fn test_interpretations() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["interpretations", "Washington"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Washington (state)"))
        .stdout(predicate::str::contains("Washington, D.C."));
}

// ============================================================================
// Status and Database Tests
// ============================================================================

#[test]
fn test_status_reports_counts() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exists\": true"))
        .stdout(predicate::str::contains("\"article_count\": 11"))
        .stdout(predicate::str::contains("\"category_count\": 1"));
}

#[test]
fn test_status_without_database() {
    let workspace = TempDir::new().unwrap();
    std::fs::create_dir_all(workspace.path().join("home")).unwrap();

    wikigraph(workspace.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing"));
}

#[test]
fn test_missing_database_fails() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["--database", "absent.db", "article", "Barack Obama"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open graph database"));
}

#[test]
fn test_database_from_environment() {
    let workspace = setup_workspace();
    let data_dir = workspace.path().join("data");
    build_database(&data_dir.join("enwiki.db"));
    std::fs::remove_file(workspace.path().join("wikigraph.db")).unwrap();

    wikigraph(workspace.path())
        .env("WIKIGRAPH_DATABASE", data_dir.join("enwiki.db"))
        .args(["article", "Honolulu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Honolulu"));
}

// ============================================================================
// Config Command Integration Tests
// ============================================================================

#[test]
fn test_config_init_and_path() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(local_config(workspace.path()).exists());

    wikigraph(workspace.path())
        .args(["config", "path", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"local_exists\": true"))
        .stdout(predicate::str::contains("\"global_exists\": false"));
}

#[test]
fn test_config_set_and_get() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["config", "set", "lookup.default_language", "fr"])
        .assert()
        .success();

    wikigraph(workspace.path())
        .args(["config", "get", "lookup.default_language"])
        .assert()
        .success()
        .stdout(predicate::str::diff("fr\n"));

    // The configured language now drives lookups
    wikigraph(workspace.path())
        .args(["article", "Barack Obama", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"language\": \"fr\""));
}

#[test]
fn test_config_set_global() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["config", "set", "--global", "logging.level", "warn"])
        .assert()
        .success();
    assert!(workspace
        .path()
        .join("home/.wikigraph/config.toml")
        .exists());
    assert!(!local_config(workspace.path()).exists());
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["config", "set", "store.max_idle_sessions", "0"])
        .assert()
        .failure();

    wikigraph(workspace.path())
        .args(["config", "set", "store.nonexistent", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("store.nonexistent"));
}

#[test]
fn test_config_set_repairs_invalid_config() {
    let workspace = setup_workspace();
    let path = local_config(workspace.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[lookup]\ndefault_language = \"\"\n").unwrap();

    wikigraph(workspace.path())
        .args(["article", "Barack Obama"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));

    wikigraph(workspace.path())
        .args(["config", "set", "lookup.default_language", "en"])
        .assert()
        .success();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("default_language = \"en\""));

    wikigraph(workspace.path())
        .args(["article", "Barack Obama"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barack Obama"));
}

#[test]
fn test_explicit_config_file_must_exist() {
    let workspace = setup_workspace();

    wikigraph(workspace.path())
        .args(["--config", "missing.toml", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}
