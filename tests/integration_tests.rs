//! Integration tests for the gestdoc CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A home directory that is never created, so no global config is found
fn empty_home() -> std::path::PathBuf {
    std::env::temp_dir().join("gestdoc-tests-empty-home")
}

/// Helper to get a gestdoc command with a clean environment
fn gestdoc() -> Command {
    let mut cmd = Command::cargo_bin("gestdoc").unwrap();
    cmd.env("HOME", empty_home())
        .env("XDG_CONFIG_HOME", empty_home().join(".config"))
        .env_remove("GESTDOC_OPERATOR")
        .env_remove("GESTDOC_FORMAT")
        .env_remove("GESTDOC_PHONE_PREFIX")
        .env_remove("GESTDOC_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    gestdoc().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a command in the project and return its stdout
fn run_ok(tmp: &TempDir, args: &[&str]) -> String {
    let output = gestdoc().current_dir(tmp.path()).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Add an entity and return its id
fn add_entity(tmp: &TempDir, args: &[&str]) -> String {
    let mut full = vec!["--quiet", "entity", "add"];
    full.extend_from_slice(args);
    run_ok(tmp, &full).trim().to_string()
}

/// Project with a requester "Ana" in the seeded "Financeiro" sector
fn setup_with_requester() -> TempDir {
    let tmp = setup_test_project();
    add_entity(&tmp, &["requester", "Ana", "--sector", "Financeiro"]);
    tmp
}

fn create_request(tmp: &TempDir, caixa: &str) -> String {
    run_ok(
        tmp,
        &[
            "--quiet",
            "request",
            "new",
            "--caixa",
            caixa,
            "--cliente",
            "BAI",
            "--sector",
            "Financeiro",
            "--solicitante",
            "Ana",
        ],
    )
    .trim()
    .to_string()
}

fn requests_json(tmp: &TempDir) -> serde_json::Value {
    let out = run_ok(tmp, &["request", "list", "--format", "json"]);
    serde_json::from_str(&out).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    gestdoc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("custody requests"))
        .stdout(predicate::str::contains("entity"))
        .stdout(predicate::str::contains("request"));
}

#[test]
fn test_version_displays() {
    gestdoc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gestdoc"));
}

#[test]
fn test_completions_bash() {
    gestdoc()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gestdoc"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    gestdoc()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized gestdoc project"));

    assert!(tmp.path().join(".gestdoc").is_dir());
    assert!(tmp.path().join(".gestdoc/config.yaml").is_file());
    assert!(tmp.path().join(".gestdoc/data").is_dir());
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_test_project();
    gestdoc()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_reports_seeded_and_kept_data() {
    let tmp = TempDir::new().unwrap();
    gestdoc()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Armazém Central"))
        .stdout(predicate::str::contains("Requests  0"));

    add_entity(&tmp, &["requester", "Ana", "--sector", "Financeiro"]);
    create_request(&tmp, "CX-001");

    gestdoc()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana"))
        .stdout(predicate::str::contains("Requests  1"));
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    gestdoc()
        .current_dir(tmp.path())
        .args(["request", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a gestdoc project"));
}

#[test]
fn test_project_flag_selects_project() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();
    gestdoc()
        .current_dir(elsewhere.path())
        .args(["--project"])
        .arg(tmp.path())
        .args(["entity", "list", "--count"])
        .assert()
        .success()
        .stdout("3\n");
}

// ============================================================================
// Entity Tests
// ============================================================================

#[test]
fn test_fresh_project_lists_seed_entities() {
    let tmp = setup_test_project();
    let out = run_ok(&tmp, &["entity", "list"]);
    assert!(out.contains("Armazém Central"));
    assert!(out.contains("Financeiro"));
    assert!(out.contains("João Silva"));
    // Seeds are not written until the first change
    assert!(!tmp.path().join(".gestdoc/data/entities.json").exists());
}

#[test]
fn test_entity_add_and_list_by_type() {
    let tmp = setup_test_project();
    let id = add_entity(&tmp, &["client", "BAI"]);
    assert!(id.starts_with("ENT-"));

    let out = run_ok(&tmp, &["entity", "list", "--type", "client", "--format", "id"]);
    assert_eq!(out.trim(), id);
    assert!(tmp.path().join(".gestdoc/data/entities.json").exists());
}

#[test]
fn test_entity_add_duplicate_name_is_case_insensitive() {
    let tmp = setup_test_project();
    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "add", "sector", "FINANCEIRO"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // Same name under another type is fine
    add_entity(&tmp, &["client", "Financeiro"]);
}

#[test]
fn test_entity_add_empty_name_rejected() {
    let tmp = setup_test_project();
    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "add", "client", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
}

#[test]
fn test_requester_needs_sector() {
    let tmp = setup_test_project();
    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "add", "requester", "Ana"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a sector"));

    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "add", "requester", "Ana", "--sector", "Compras"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sector named 'Compras'"));
}

#[test]
fn test_requester_list_shows_sector_then_na_when_dangling() {
    let tmp = setup_with_requester();
    let out = run_ok(&tmp, &["entity", "list", "--type", "requester", "--format", "csv"]);
    assert!(out.contains("Ana,Financeiro"));

    run_ok(&tmp, &["entity", "delete", "2", "--yes"]);
    let out = run_ok(&tmp, &["entity", "list", "--type", "requester", "--format", "csv"]);
    assert!(out.contains("Ana,N/A"));
}

#[test]
fn test_contact_phone_digits_with_prefix() {
    let tmp = setup_test_project();
    add_entity(&tmp, &["contact", "Carlos", "--phone", "(923) 111-222"]);

    let out = run_ok(&tmp, &["entity", "list", "--type", "contact"]);
    assert!(out.contains("+244 923111222"));

    let out = gestdoc()
        .current_dir(tmp.path())
        .env("GESTDOC_PHONE_PREFIX", "+351")
        .args(["entity", "list", "--type", "contact"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&out.stdout).contains("+351 923111222"));
}

#[test]
fn test_entity_delete_without_confirmation_is_cancelled() {
    let tmp = setup_test_project();
    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));

    let out = run_ok(&tmp, &["entity", "list", "--count"]);
    assert_eq!(out.trim(), "3");
}

#[test]
fn test_entity_delete_all_of_type() {
    let tmp = setup_test_project();
    add_entity(&tmp, &["client", "BAI"]);
    add_entity(&tmp, &["client", "BFA"]);

    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "delete", "--all", "--type", "client", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2"));

    let out = run_ok(&tmp, &["entity", "list", "--type", "client", "--count"]);
    assert_eq!(out.trim(), "0");
    let out = run_ok(&tmp, &["entity", "list", "--count"]);
    assert_eq!(out.trim(), "3");
}

#[test]
fn test_entity_delete_by_short_id() {
    let tmp = setup_test_project();
    run_ok(&tmp, &["entity", "list", "--type", "operator"]);
    run_ok(&tmp, &["entity", "delete", "@1", "--yes"]);

    let out = run_ok(&tmp, &["entity", "list", "--type", "operator", "--count"]);
    assert_eq!(out.trim(), "0");
}

#[test]
fn test_requesters_filtered_by_exact_sector_name() {
    let tmp = setup_with_requester();
    add_entity(&tmp, &["sector", "Compras"]);
    add_entity(&tmp, &["requester", "Rui", "--sector", "Compras"]);

    let out = run_ok(&tmp, &["entity", "requesters", "--sector", "Financeiro", "--format", "csv"]);
    assert!(out.contains("Ana"));
    assert!(!out.contains("Rui"));

    let out = run_ok(&tmp, &["entity", "requesters", "--sector", "financeiro", "--format", "json"]);
    assert_eq!(out.trim(), "[]");
}

// ============================================================================
// Import Tests
// ============================================================================

#[test]
fn test_import_contacts_from_text_file() {
    let tmp = setup_test_project();
    let file = tmp.path().join("contatos.txt");
    fs::write(&file, "Carlos;923111222\nAna;923333444\n").unwrap();

    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "import", "contact"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2"));

    let out = run_ok(&tmp, &["entity", "list", "--type", "contact", "--format", "json"]);
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(list[0]["name"], "Carlos");
    assert_eq!(list[0]["phone"], "923111222");
    assert_eq!(list[0]["type"], "contatos");

    // Second run skips both
    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "import", "contact"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0"))
        .stdout(predicate::str::contains("skipped 2"));
}

#[test]
fn test_import_contacts_from_spreadsheet() {
    let tmp = setup_test_project();
    let fixture = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/contatos.xlsx");

    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "import", "contact"])
        .arg(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3"));

    let out = run_ok(&tmp, &["entity", "list", "--type", "contact", "--format", "json"]);
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(list[0]["name"], "Carlos");
    assert_eq!(list[0]["phone"], "923111222");
    assert_eq!(list[1]["phone"], "923333444");
    assert!(list[2].get("phone").is_none());
}

#[test]
fn test_import_dry_run_does_not_save() {
    let tmp = setup_test_project();
    let file = tmp.path().join("clientes.csv");
    fs::write(&file, "BAI\nBFA\n").unwrap();

    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "import", "client", "--dry-run"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Would import 2"));

    let out = run_ok(&tmp, &["entity", "list", "--type", "client", "--count"]);
    assert_eq!(out.trim(), "0");
}

#[test]
fn test_import_requesters_attach_sector() {
    let tmp = setup_test_project();
    let file = tmp.path().join("solicitantes.txt");
    fs::write(&file, "Ana\nRui\n").unwrap();

    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "import", "requester"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a sector"));

    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "import", "requester", "--sector", "Financeiro"])
        .arg(&file)
        .assert()
        .success();

    let out = run_ok(&tmp, &["entity", "requesters", "--sector", "Financeiro", "--format", "id"]);
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn test_import_unreadable_spreadsheet_leaves_store_untouched() {
    let tmp = setup_test_project();
    let file = tmp.path().join("broken.xlsx");
    fs::write(&file, "not a spreadsheet").unwrap();

    gestdoc()
        .current_dir(tmp.path())
        .args(["entity", "import", "client"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read spreadsheet"));

    assert!(!tmp.path().join(".gestdoc/data/entities.json").exists());
}

// ============================================================================
// Request Tests
// ============================================================================

#[test]
fn test_request_new_and_list() {
    let tmp = setup_with_requester();
    let id = create_request(&tmp, "CX-001");
    assert!(id.starts_with("SOL-"));

    let list = requests_json(&tmp);
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["caixa"], "CX-001");
    assert_eq!(list[0]["estado"], "Em Curso");
    assert_eq!(list[0]["tratamento"], "Preparação Z1");
    assert!(list[0]["dataInicio"].is_string());
    assert!(list[0]["localizacaoOrigem"].is_string());
}

#[test]
fn test_request_newest_first() {
    let tmp = setup_with_requester();
    create_request(&tmp, "CX-001");
    create_request(&tmp, "CX-002");

    let list = requests_json(&tmp);
    assert_eq!(list[0]["caixa"], "CX-002");
    assert_eq!(list[1]["caixa"], "CX-001");
}

#[test]
fn test_request_dias_from_start_date() {
    let tmp = setup_with_requester();
    run_ok(
        &tmp,
        &[
            "request", "new", "--caixa", "CX-9", "--cliente", "BAI", "--sector", "Financeiro",
            "--solicitante", "Ana", "--inicio", "2000-01-01",
        ],
    );
    let list = requests_json(&tmp);
    assert_eq!(list[0]["dataInicio"], "2000-01-01");
    assert!(list[0]["dias"].as_u64().unwrap() > 9000);
}

#[test]
fn test_request_missing_field_reports_first_empty() {
    let tmp = setup_with_requester();
    gestdoc()
        .current_dir(tmp.path())
        .args(["request", "new", "--cliente", "BAI", "--sector", "Financeiro"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'caixa'"));

    assert_eq!(requests_json(&tmp), serde_json::json!([]));
}

#[test]
fn test_request_unknown_sector_and_ineligible_requester() {
    let tmp = setup_with_requester();
    gestdoc()
        .current_dir(tmp.path())
        .args([
            "request", "new", "--caixa", "CX-1", "--cliente", "BAI", "--sector", "Compras",
            "--solicitante", "Ana",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sector named 'Compras'"));

    gestdoc()
        .current_dir(tmp.path())
        .args([
            "request", "new", "--caixa", "CX-1", "--cliente", "BAI", "--sector", "Financeiro",
            "--solicitante", "Rui",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a requester of sector"));
}

#[test]
fn test_request_operator_from_config() {
    let tmp = setup_with_requester();
    run_ok(&tmp, &["config", "set", "operator", "João Silva"]);
    create_request(&tmp, "CX-001");

    let list = requests_json(&tmp);
    assert_eq!(list[0]["operador"], "João Silva");
}

#[test]
fn test_request_filters() {
    let tmp = setup_with_requester();
    let first = create_request(&tmp, "CX-001");
    create_request(&tmp, "AB-777");
    run_ok(&tmp, &["request", "status", &first, "finished"]);

    let out = run_ok(&tmp, &["request", "list", "--status", "finished", "--format", "id"]);
    assert_eq!(out.trim(), first);

    let out = run_ok(&tmp, &["request", "list", "--search", "ab-", "--count"]);
    assert_eq!(out.trim(), "1");

    let out = run_ok(&tmp, &["request", "list", "--sector", "Compras", "--count"]);
    assert_eq!(out.trim(), "0");
}

#[test]
fn test_request_status_toggles_both_ways() {
    let tmp = setup_with_requester();
    let id = create_request(&tmp, "CX-001");

    run_ok(&tmp, &["request", "status", &id, "finished"]);
    assert_eq!(requests_json(&tmp)[0]["estado"], "Finalizado");

    run_ok(&tmp, &["request", "status", &id, "in-progress"]);
    assert_eq!(requests_json(&tmp)[0]["estado"], "Em Curso");
}

#[test]
fn test_request_show_by_short_id() {
    let tmp = setup_with_requester();
    let id = create_request(&tmp, "CX-001");
    run_ok(&tmp, &["request", "list"]);

    gestdoc()
        .current_dir(tmp.path())
        .args(["request", "show", "@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()))
        .stdout(predicate::str::contains("CX-001"));
}

#[test]
fn test_request_show_unknown_fails() {
    let tmp = setup_test_project();
    gestdoc()
        .current_dir(tmp.path())
        .args(["request", "show", "SOL-NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No request found"));
}

#[test]
fn test_request_delete_requires_confirmation() {
    let tmp = setup_with_requester();
    let id = create_request(&tmp, "CX-001");

    gestdoc()
        .current_dir(tmp.path())
        .args(["request", "delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));
    assert_eq!(requests_json(&tmp).as_array().unwrap().len(), 1);

    run_ok(&tmp, &["request", "delete", &id, "--yes"]);
    assert_eq!(requests_json(&tmp), serde_json::json!([]));
}

#[test]
fn test_request_list_output_formats() {
    let tmp = setup_with_requester();
    create_request(&tmp, "CX-001");

    let csv = run_ok(&tmp, &["request", "list", "--format", "csv"]);
    assert!(csv.starts_with("short_id,id,caixa,cliente"));
    assert!(csv.contains("CX-001,BAI,Financeiro,Ana"));

    let md = run_ok(&tmp, &["request", "list", "--format", "md"]);
    assert!(md.contains("| CAIXA"));
    assert!(md.contains("CX-001"));

    let yaml = run_ok(&tmp, &["request", "list", "--format", "yaml"]);
    assert!(yaml.contains("caixa: CX-001"));
}

#[test]
fn test_default_format_from_env() {
    let tmp = setup_test_project();
    let out = gestdoc()
        .current_dir(tmp.path())
        .env("GESTDOC_FORMAT", "json")
        .args(["request", "list"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "[]");
}

// ============================================================================
// Stored Data Tests
// ============================================================================

#[test]
fn test_corrupt_bucket_is_reported_and_kept() {
    let tmp = setup_test_project();
    let bucket = tmp.path().join(".gestdoc/data/requests.json");
    fs::write(&bucket, "[{\"id\": ").unwrap();

    gestdoc()
        .current_dir(tmp.path())
        .args(["request", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requests.json could not be read"));

    assert_eq!(fs::read_to_string(&bucket).unwrap(), "[{\"id\": ");
}

#[test]
fn test_legacy_bucket_loads() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join(".gestdoc/data/entities.json"),
        r#"[{"id":"2","name":"Financeiro","type":"sectores"},
            {"id":"imp_x1","name":"Ana","type":"solicitantes","parentId":"2"}]"#,
    )
    .unwrap();

    let out = run_ok(&tmp, &["entity", "requesters", "--sector", "Financeiro", "--format", "id"]);
    assert_eq!(out.trim(), "imp_x1");
}

// ============================================================================
// Status and Config Tests
// ============================================================================

#[test]
fn test_status_dashboard_json() {
    let tmp = setup_with_requester();
    let id = create_request(&tmp, "CX-001");
    create_request(&tmp, "CX-002");
    create_request(&tmp, "CX-003");
    run_ok(&tmp, &["request", "status", &id, "finished"]);

    let out = run_ok(&tmp, &["status", "--format", "json"]);
    let status: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(status["requests"]["total"], 3);
    assert_eq!(status["requests"]["in_progress"], 2);
    assert_eq!(status["requests"]["finished"], 1);
    assert_eq!(status["entities"]["requester"], 1);
}

#[test]
fn test_status_dashboard_empty() {
    let tmp = setup_test_project();
    gestdoc()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 total"))
        .stdout(predicate::str::contains("0.0%"));
}

#[test]
fn test_config_set_show_unset() {
    let tmp = setup_test_project();
    run_ok(&tmp, &["config", "set", "phone_prefix", "+351"]);

    gestdoc()
        .current_dir(tmp.path())
        .args(["config", "show", "phone_prefix"])
        .assert()
        .success()
        .stdout("+351\n");

    run_ok(&tmp, &["config", "unset", "phone_prefix"]);
    gestdoc()
        .current_dir(tmp.path())
        .args(["config", "show", "phone_prefix"])
        .assert()
        .failure();
}

#[cfg(target_os = "linux")]
#[test]
fn test_global_config_comes_from_config_home() {
    let tmp = setup_test_project();
    add_entity(&tmp, &["contact", "Carlos", "--phone", "923111222"]);

    let config_home = tmp.path().join("xdg");
    fs::create_dir_all(config_home.join("gestdoc")).unwrap();
    fs::write(config_home.join("gestdoc/config.yaml"), "phone_prefix: \"+1\"\n").unwrap();

    let out = gestdoc()
        .current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", &config_home)
        .args(["entity", "list", "--type", "contact", "--format", "csv"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&out.stdout).contains("Carlos,+1 923111222"));

    // The default test environment sees no global config
    let out = run_ok(&tmp, &["entity", "list", "--type", "contact", "--format", "csv"]);
    assert!(out.contains("Carlos,+244 923111222"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = setup_test_project();
    gestdoc()
        .current_dir(tmp.path())
        .args(["config", "set", "author", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_keys_lists_all() {
    gestdoc()
        .args(["config", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("operator"))
        .stdout(predicate::str::contains("default_format"))
        .stdout(predicate::str::contains("phone_prefix"));
}
