use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get an fdc command
fn fdc() -> Command {
    Command::cargo_bin("fdc").unwrap()
}

/// Helper to create an initialized vault in a temp directory
fn setup_test_vault() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fdc()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Write a content file into the temp directory and return its path
fn write_content(tmp: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

/// Register a document and return its id (DOC-...)
fn create_test_document(tmp: &TempDir, reference: &str, title: &str) -> String {
    let file = write_content(tmp, &format!("{}.md", reference.to_lowercase()), "# content");
    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "new", "--quiet"])
        .args(["--reference", reference])
        .args(["--title", title])
        .args(["--category", "procedure"])
        .args(["--owner", "qa"])
        .arg("--file")
        .arg(&file)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "doc new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Register, submit and approve a document, returning its id
fn create_approved_document(tmp: &TempDir, reference: &str, title: &str) -> String {
    let id = create_test_document(tmp, reference, title);
    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id])
        .assert()
        .success();
    fdc()
        .current_dir(tmp.path())
        .args(["approve", &id, "--yes"])
        .assert()
        .success();
    id
}

// === CLI Basic Tests ===

#[test]
fn test_help_displays() {
    fdc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("controlled-document"));
}

#[test]
fn test_version_displays() {
    fdc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fdc"));
}

#[test]
fn test_unknown_command_fails() {
    fdc().arg("frobnicate").assert().failure();
}

#[test]
fn test_completions_generate() {
    fdc()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fdc"));
}

// === Init Tests ===

#[test]
fn test_init_creates_vault_structure() {
    let tmp = TempDir::new().unwrap();
    fdc()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized document vault"));

    let fdc_dir = tmp.path().join(".fdc");
    assert!(fdc_dir.join("registry.db").exists());
    assert!(fdc_dir.join("blobs").is_dir());
    assert!(fdc_dir.join("config.yaml").exists());
    assert!(fdc_dir.join("roster.yaml").exists());
}

#[test]
fn test_init_twice_reports_existing() {
    let tmp = setup_test_vault();
    fdc()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_vault_fail() {
    let tmp = TempDir::new().unwrap();
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list"])
        .assert()
        .failure();
}

// === Doc New Tests ===

#[test]
fn test_doc_new_registers_document() {
    let tmp = setup_test_vault();
    let file = write_content(&tmp, "qp.md", "# Purchasing");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "new", "-r", "QP-7.5-01", "-t", "Purchasing Procedure"])
        .args(["-c", "procedure", "--owner", "qa"])
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered"))
        .stdout(predicate::str::contains("QP-7.5-01"));
}

#[test]
fn test_doc_new_quiet_prints_id() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    assert!(id.starts_with("DOC-"), "unexpected id: {}", id);
    assert_eq!(id.len(), 30);
}

#[test]
fn test_doc_new_duplicate_reference_fails() {
    let tmp = setup_test_vault();
    create_test_document(&tmp, "QP-01", "First");
    let file = write_content(&tmp, "other.md", "# other");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "new", "-r", "QP-01", "-t", "Second", "-c", "manual"])
        .arg("--file")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already"));
}

#[test]
fn test_doc_new_invalid_category_fails() {
    let tmp = setup_test_vault();
    let file = write_content(&tmp, "x.md", "# x");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "new", "-r", "QP-01", "-t", "Bad", "-c", "novel"])
        .arg("--file")
        .arg(&file)
        .assert()
        .failure();
}

#[test]
fn test_doc_new_missing_file_fails() {
    let tmp = setup_test_vault();
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "new", "-r", "QP-01", "-t", "No File", "-c", "procedure"])
        .args(["--file", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// === Doc List Tests ===

#[test]
fn test_doc_list_shows_documents() {
    let tmp = setup_test_vault();
    create_test_document(&tmp, "QP-01", "Purchasing Procedure");
    create_test_document(&tmp, "QM-01", "Quality Manual");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QP-01"))
        .stdout(predicate::str::contains("Quality Manual"));
}

#[test]
fn test_doc_list_json_format() {
    let tmp = setup_test_vault();
    create_test_document(&tmp, "QP-01", "Purchasing Procedure");
    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let docs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let docs = docs.as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["reference"], "QP-01");
    assert_eq!(docs[0]["status"], "draft");
    assert_eq!(docs[0]["category"], "procedure");
}

#[test]
fn test_configured_default_format_applies() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Purchasing Procedure");
    fs::write(
        tmp.path().join(".fdc").join("config.yaml"),
        "default_format: json\n",
    )
    .unwrap();

    // Without --format, the vault config decides
    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let docs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(docs[0]["reference"], "QP-01");

    // An explicit --format still wins
    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--format", "id"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), id);
}

#[test]
fn test_doc_list_id_format() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--format", "id"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), id);
}

#[test]
fn test_doc_list_filters() {
    let tmp = setup_test_vault();
    create_test_document(&tmp, "QP-01", "Purchasing Procedure");
    let file = write_content(&tmp, "qm.md", "# manual");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "new", "-r", "QM-01", "-t", "Quality Manual", "-c", "manual"])
        .arg("--file")
        .arg(&file)
        .assert()
        .success();

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--category", "manual"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QM-01"))
        .stdout(predicate::str::contains("QP-01").not());

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--search", "Purchasing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QP-01"))
        .stdout(predicate::str::contains("QM-01").not());

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--status", "approved"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QP-01").not());
}

#[test]
fn test_doc_list_limit_and_offset() {
    let tmp = setup_test_vault();
    for i in 1..=3 {
        create_test_document(&tmp, &format!("QP-0{}", i), &format!("Doc {}", i));
    }

    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--format", "id", "--limit", "2"])
        .output()
        .unwrap();
    let first_page: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect();
    assert_eq!(first_page.len(), 2);

    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--format", "id", "--limit", "2", "--offset", "2"])
        .output()
        .unwrap();
    let second_page: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect();
    assert_eq!(second_page.len(), 1);
    assert!(!first_page.contains(&second_page[0]));
}

// === Doc Show Tests ===

#[test]
fn test_doc_show_by_reference() {
    let tmp = setup_test_vault();
    create_test_document(&tmp, "QP-01", "Purchasing Procedure");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", "qp-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Purchasing Procedure"));
}

#[test]
fn test_doc_show_by_partial_id() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Purchasing Procedure");
    // First 8 ULID chars after the DOC- prefix
    let partial = &id[4..12];
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", partial])
        .assert()
        .success()
        .stdout(predicate::str::contains("Purchasing Procedure"));
}

#[test]
fn test_doc_show_unknown_fails() {
    let tmp = setup_test_vault();
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", "QP-99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// === Lifecycle Tests ===

#[test]
fn test_full_lifecycle() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Purchasing Procedure");

    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Submitted"))
        .stdout(predicate::str::contains("v1"));

    fdc()
        .current_dir(tmp.path())
        .args(["approve", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Approved"))
        .stdout(predicate::str::contains("next review"));

    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["document"]["status"], "approved");
    assert!(detail["document"]["next_review"].is_string());
    assert_eq!(detail["versions"].as_array().unwrap().len(), 1);

    // Revise; the approved version keeps serving while v2 is in review
    let revised = write_content(&tmp, "qp-v2.md", "# revised");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "revise", &id, "-m", "Annual update"])
        .arg("--file")
        .arg(&revised)
        .assert()
        .success()
        .stdout(predicate::str::contains("v2"));

    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["document"]["status"], "approved");

    // Approving v2 retires v1
    fdc()
        .current_dir(tmp.path())
        .args(["approve", &id])
        .assert()
        .success();

    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let versions = detail["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["number"], 2);
    assert_eq!(versions[0]["status"], "approved");
    assert_eq!(versions[1]["number"], 1);
    assert_eq!(versions[1]["status"], "obsolete");
}

#[test]
fn test_submit_requires_draft() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id])
        .assert()
        .success();
    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no draft"));
}

#[test]
fn test_approve_requires_pending() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .args(["approve", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only pending"));
}

#[test]
fn test_reject_cycle() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id])
        .assert()
        .success();
    fdc()
        .current_dir(tmp.path())
        .args(["reject", &id, "--reason", "section 3 is out of date"])
        .assert()
        .success()
        .stdout(predicate::str::contains("back to draft"));

    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["document"]["status"], "draft");

    // The same version goes around again; the number does not change
    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1"));
    fdc()
        .current_dir(tmp.path())
        .args(["approve", &id])
        .assert()
        .success();

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "history", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected"))
        .stdout(predicate::str::contains("section 3 is out of date"));
}

#[test]
fn test_reject_requires_reason() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id])
        .assert()
        .success();
    fdc()
        .current_dir(tmp.path())
        .args(["reject", &id])
        .assert()
        .failure();
}

#[test]
fn test_workflow_dry_run_changes_nothing() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would submit"));

    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["document"]["status"], "draft");
}

#[test]
fn test_revise_requires_approved_version() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    let file = write_content(&tmp, "v2.md", "# v2");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "revise", &id, "-m", "too early"])
        .arg("--file")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no approved version"));
}

// === Update and Archive Tests ===

#[test]
fn test_doc_update_changes_metadata() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Old Title");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "update", &id, "-t", "New Title", "--owner", "engineering"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    let output = fdc()
        .current_dir(tmp.path())
        .args(["doc", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["document"]["title"], "New Title");
    assert_eq!(detail["document"]["owner"], "engineering");
}

#[test]
fn test_doc_update_nothing_fails() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "update", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to update"));
}

#[test]
fn test_doc_archive_excluded_from_list() {
    let tmp = setup_test_vault();
    create_approved_document(&tmp, "QP-01", "Retired Procedure");
    fdc()
        .current_dir(tmp.path())
        .args(["doc", "archive", "QP-01", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived"));

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QP-01").not());

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--archived"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QP-01"));
}

// === Review Tests ===

#[test]
fn test_review_nothing_due() {
    let tmp = setup_test_vault();
    create_approved_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .arg("review")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing due"));
}

#[test]
fn test_review_wide_horizon_catches_upcoming() {
    let tmp = setup_test_vault();
    create_approved_document(&tmp, "QP-01", "Test");
    // 12 months out falls inside a 400-day horizon
    fdc()
        .current_dir(tmp.path())
        .args(["review", "--horizon-days", "400"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Due soon"))
        .stdout(predicate::str::contains("QP-01"));
}

#[test]
fn test_workflow_writes_notification_log() {
    let tmp = setup_test_vault();
    let id = create_test_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .args(["submit", &id])
        .assert()
        .success();

    let log = fs::read_to_string(tmp.path().join(".fdc/notifications.log")).unwrap();
    assert!(log.contains("submitted"));
    assert!(log.contains("QP-01"));
}

// === Roster Tests ===

#[test]
fn test_roster_add_list_remove() {
    let tmp = setup_test_vault();
    fdc()
        .current_dir(tmp.path())
        .args(["roster", "add", "-n", "Jane Smith", "-e", "jane@example.com"])
        .args(["-u", "jsmith", "--approver"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Smith"));

    fdc()
        .current_dir(tmp.path())
        .args(["roster", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jsmith"))
        .stdout(predicate::str::contains("approver"));

    fdc()
        .current_dir(tmp.path())
        .args(["roster", "remove", "jsmith"])
        .assert()
        .success();

    fdc()
        .current_dir(tmp.path())
        .args(["roster", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Roster is empty"));
}

#[test]
fn test_roster_enforces_membership() {
    let tmp = setup_test_vault();
    fdc()
        .current_dir(tmp.path())
        .args(["roster", "add", "-n", "Jane Smith", "-e", "jane@example.com"])
        .args(["-u", "jsmith", "--approver"])
        .assert()
        .success();

    let file = write_content(&tmp, "qp.md", "# qp");
    fdc()
        .current_dir(tmp.path())
        .env("FDC_USER", "stranger")
        .args(["doc", "new", "-r", "QP-01", "-t", "Test", "-c", "procedure"])
        .arg("--file")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not on the approval roster"));
}

#[test]
fn test_approval_requires_roster_authority() {
    let tmp = setup_test_vault();
    fdc()
        .current_dir(tmp.path())
        .args(["roster", "add", "-n", "Bob Wilson", "-e", "bob@example.com"])
        .args(["-u", "bwilson"])
        .assert()
        .success();
    fdc()
        .current_dir(tmp.path())
        .args(["roster", "add", "-n", "Jane Smith", "-e", "jane@example.com"])
        .args(["-u", "jsmith", "--approver"])
        .assert()
        .success();

    let file = write_content(&tmp, "qp.md", "# qp");
    fdc()
        .current_dir(tmp.path())
        .env("FDC_USER", "bwilson")
        .args(["doc", "new", "-r", "QP-01", "-t", "Test", "-c", "procedure"])
        .arg("--file")
        .arg(&file)
        .assert()
        .success();
    fdc()
        .current_dir(tmp.path())
        .env("FDC_USER", "bwilson")
        .args(["submit", "QP-01"])
        .assert()
        .success();

    // Bob cannot approve
    fdc()
        .current_dir(tmp.path())
        .env("FDC_USER", "bwilson")
        .args(["approve", "QP-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not authorized"));

    // Jane can
    fdc()
        .current_dir(tmp.path())
        .env("FDC_USER", "jsmith")
        .args(["approve", "QP-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Approved"));
}

// === Import Tests ===

#[test]
fn test_doc_import_csv() {
    let tmp = setup_test_vault();
    write_content(&tmp, "qp.md", "# purchasing");
    write_content(&tmp, "qm.md", "# manual");
    let csv = write_content(
        &tmp,
        "docs.csv",
        "reference,title,category,file,frequency\n\
         QP-01,Purchasing Procedure,procedure,qp.md,6\n\
         QM-01,Quality Manual,manual,qm.md,\n",
    );

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "import"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2 of 2"));

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QP-01"))
        .stdout(predicate::str::contains("QM-01"));
}

#[test]
fn test_doc_import_dry_run() {
    let tmp = setup_test_vault();
    write_content(&tmp, "qp.md", "# purchasing");
    let csv = write_content(
        &tmp,
        "docs.csv",
        "reference,title,category,file\nQP-01,Purchasing Procedure,procedure,qp.md\n",
    );

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "import", "--dry-run"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("validated 1 of 1"));

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "list", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_doc_import_skip_errors() {
    let tmp = setup_test_vault();
    write_content(&tmp, "qp.md", "# purchasing");
    let csv = write_content(
        &tmp,
        "docs.csv",
        "reference,title,category,file\n\
         QP-01,Good Row,procedure,qp.md\n\
         QP-02,Bad Category,novel,qp.md\n",
    );

    fdc()
        .current_dir(tmp.path())
        .args(["doc", "import", "--skip-errors"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 1 of 2"));
}

// === Audit Tests ===

#[test]
fn test_audit_passes_on_clean_vault() {
    let tmp = setup_test_vault();
    create_approved_document(&tmp, "QP-01", "Test");
    fdc()
        .current_dir(tmp.path())
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Audit passed"));
}

#[test]
fn test_audit_detects_corrupted_blob() {
    let tmp = setup_test_vault();
    create_test_document(&tmp, "QP-01", "Test");

    let blob = walkdir::WalkDir::new(tmp.path().join(".fdc/blobs"))
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file())
        .expect("stored blob");
    fs::write(blob.path(), b"tampered").unwrap();

    fdc()
        .current_dir(tmp.path())
        .arg("audit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
}
