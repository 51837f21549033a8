//! End-to-end tests for the `create` command.

mod common;
use common::prelude::*;

/// Global defaults, local defaults and job fields layer into one presubmit.
#[test]
fn test_create_layers_defaults_to_stdout() {
    let fixture = TestFixture::new()
        .with_file("global.yaml", documents::GLOBAL_IMAGE)
        .with_file("widget.yaml", documents::WIDGET);

    let output = fixture
        .command()
        .args(["create", "-g", "global.yaml", "-i", "widget.yaml"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let config = parse_output(&String::from_utf8(output).unwrap());
    let presubmits = config["presubmits"]["acme/widget"].as_sequence().unwrap();
    assert_eq!(presubmits.len(), 1);

    let lint = &presubmits[0];
    assert_eq!(lint["name"], "lint");
    assert_eq!(lint["spec"]["containers"][0]["image"], "base:latest");
    assert_eq!(lint["spec"]["containers"][0]["command"][1], "lint");
    assert_eq!(lint["branches"][0], "main");
    assert_eq!(lint["always_run"], true);
    assert_eq!(lint["decorate"], true);
    assert!(lint.get("optional").is_none());
    assert!(config.get("postsubmits").is_none());
    assert!(config.get("periodics").is_none());
}

#[test]
fn test_create_reads_stdin_by_default() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("create")
        .write_stdin(documents::WIDGET)
        .assert()
        .success()
        .stdout(predicate::str::contains("name: lint"))
        .stdout(predicate::str::starts_with("# Code generated by pjgen"));
}

#[test]
fn test_create_writes_single_file() {
    let fixture = TestFixture::new().with_file("widget.yaml", documents::WIDGET);

    fixture
        .command()
        .args(["create", "-i", "widget.yaml", "-o", "out/all.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Generated 1 presubmit(s)"));

    let config = parse_output(&fixture.read("out/all.yaml"));
    assert_eq!(config["presubmits"]["acme/widget"][0]["name"], "lint");
}

#[test]
fn test_create_routes_jobs_by_output_template() {
    let fixture = TestFixture::new().with_file("routed.yaml", documents::ROUTED);

    fixture
        .command()
        .args(["create", "-i", "routed.yaml", "-o", "generated"])
        .assert()
        .success();

    let widget = parse_output(&fixture.read("generated/acme/widget.yaml"));
    assert_eq!(widget["presubmits"]["acme/widget"][0]["name"], "unit");
    assert_eq!(widget["postsubmits"]["acme/widget"][0]["name"], "unit");
    assert_eq!(widget["periodics"][0]["name"], "nightly");
    assert_eq!(widget["periodics"][0]["cron"], "0 3 * * *");

    let gadget = parse_output(&fixture.read("generated/acme/gadget.yaml"));
    assert_eq!(gadget["presubmits"]["acme/gadget"][0]["name"], "unit");
    assert!(gadget.get("periodics").is_none());
}

#[test]
fn test_create_groups_jobs_from_different_files() {
    let fixture = TestFixture::new()
        .with_file(
            "jobs/a.yaml",
            "jobs:\n  - {name: zeta, repo: acme/widget, output_tmpl: widget}\n",
        )
        .with_file(
            "jobs/nested/b.yml",
            "jobs:\n  - {name: alpha, repo: acme/widget, output_tmpl: widget.yaml}\n",
        )
        .with_file("jobs/notes.txt", "not a job file");

    fixture
        .command()
        .args(["create", "-i", "jobs", "-o", "out"])
        .assert()
        .success();

    let config = parse_output(&fixture.read("out/widget.yaml"));
    let names: Vec<_> = config["presubmits"]["acme/widget"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|job| job["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn test_create_sorts_descending_from_env() {
    let fixture = TestFixture::new().with_file(
        "jobs.yaml",
        "jobs:\n  - {name: a, repo: o/r}\n  - {name: c, repo: o/r}\n  - {name: b, repo: o/r}\n",
    );

    let output = fixture
        .command()
        .env("PJGEN_SORT", "desc")
        .args(["create", "-i", "jobs.yaml"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let config = parse_output(&String::from_utf8(output).unwrap());
    let names: Vec<_> = config["presubmits"]["o/r"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|job| job["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["c", "b", "a"]);
}

#[test]
fn test_create_applies_requirements() {
    let fixture = TestFixture::new().with_file("jobs.yaml", documents::WITH_REQUIREMENTS);

    let output = fixture
        .command()
        .args(["create", "-i", "jobs.yaml"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let config = parse_output(&String::from_utf8(output).unwrap());
    let build = &config["presubmits"]["acme/widget"][0];
    assert_eq!(build["labels"]["preset-docker"], "true");
    assert_eq!(build["spec"]["volumes"][0]["name"], "docker");
    assert_eq!(
        build["spec"]["containers"][0]["volumeMounts"][0]["mountPath"],
        "/var/lib/docker"
    );
    assert_eq!(build["spec"]["nodeSelector"]["accelerator"], "nvidia");
}

#[test]
fn test_create_skips_empty_destinations() {
    let fixture = TestFixture::new().with_file("empty.yaml", "defaults:\n  image: x\n");

    fixture
        .command()
        .args(["create", "-i", "empty.yaml", "-o", "out"])
        .assert()
        .success();

    assert!(!fixture.join("out").exists());
}

#[test]
fn test_create_writes_valid_jobs_despite_errors() {
    let fixture = TestFixture::new().with_file("jobs.yaml", documents::PARTIALLY_BROKEN);

    fixture
        .command()
        .args(["create", "-i", "jobs.yaml", "-o", "all.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("job 'bad'"))
        .stderr(predicate::str::contains("Invalid repository identifier 'widget'"));

    let config = parse_output(&fixture.read("all.yaml"));
    let jobs = config["presubmits"]["acme/widget"].as_sequence().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["name"], "good");
}

#[test]
fn test_create_quiet_suppresses_summary() {
    let fixture = TestFixture::new().with_file("widget.yaml", documents::WIDGET);

    fixture
        .command()
        .args(["create", "-q", "-i", "widget.yaml", "-o", "all.yaml"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_create_reads_comma_separated_inputs_from_env() {
    let fixture = TestFixture::new()
        .with_file("widget.yaml", documents::WIDGET)
        .with_file("other.yaml", "jobs:\n  - {name: build, repo: acme/gadget}\n");

    fixture
        .command()
        .env("PJGEN_INPUT", "widget.yaml,other.yaml")
        .arg("create")
        .assert()
        .success()
        .stdout(predicate::str::contains("name: lint"))
        .stdout(predicate::str::contains("name: build"));
}

#[test]
fn test_create_overwrites_existing_non_yaml_output_file() {
    let fixture = TestFixture::new()
        .with_file("widget.yaml", documents::WIDGET)
        .with_file("jobs.out", "stale\n");

    fixture
        .command()
        .args(["create", "-i", "widget.yaml", "-o", "jobs.out"])
        .assert()
        .success();

    let content = fixture.read("jobs.out");
    assert!(content.starts_with("# Code generated by pjgen"));
    assert!(content.contains("name: lint"));
    assert!(!content.contains("stale"));
}
