use assert_cmd::Command;
use predicates::prelude::*;

fn iconforge() -> Command {
    Command::cargo_bin("iconforge").unwrap()
}

#[test]
fn missing_subcommand_is_usage_error() {
    iconforge().assert().failure().code(2);
}

#[test]
fn missing_input_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    iconforge()
        .args(["generate", "--class-name", "MyIcons", "--input"])
        .arg(dir.path().join("nope"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("input directory not found"));
}

#[test]
fn empty_input_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    iconforge()
        .args(["generate", "--class-name", "MyIcons", "--input"])
        .arg(dir.path())
        .arg("--font-out")
        .arg(out.path().join("fonts"))
        .arg("--source-out")
        .arg(out.path().join("lib"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no usable SVG files"));
    assert!(!out.path().join("fonts").exists());
    assert!(!out.path().join("lib").exists());
}

#[test]
fn invalid_class_name_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    iconforge()
        .args(["generate", "--class-name", "my icons", "--input"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid Dart class name"));
}

#[test]
fn missing_class_name_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    iconforge()
        .args(["generate", "--input"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("class name is required"));
}

#[test]
fn config_file_supplies_settings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("svg")).unwrap();
    let config = dir.path().join("iconforge.json");
    std::fs::write(
        &config,
        r#"{ "class_name": "AppIcons", "input_dir": "svg" }"#,
    )
    .unwrap();
    // The config resolves `svg` next to itself, which is empty.
    iconforge()
        .args(["generate", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no usable SVG files"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("iconforge.json");
    std::fs::write(&config, r#"{ "class": "AppIcons" }"#).unwrap();
    iconforge()
        .args(["generate", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("failed to load config")
                .and(predicate::str::contains("unknown field `class`")),
        );
}

#[cfg(unix)]
#[test]
fn check_reports_missing_tool() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("iconforge.json");
    std::fs::write(&config, r#"{ "tools": { "python": "/nonexistent/python3" } }"#).unwrap();
    iconforge()
        .args(["check", "--color", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing prerequisite"));
}

/// A `python3` stand-in whose venv `nanoemoji` writes a 1 KiB font.
#[cfg(unix)]
fn fake_python(dir: &std::path::Path) -> std::path::PathBuf {
    use std::io::Write;

    let python = dir.join("python3");
    let script = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "Python 3.12.1"; exit 0; fi
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin"
  printf '#!/bin/sh\nexit 0\n' > "$3/bin/python"
  cat > "$3/bin/nanoemoji" <<'EOF'
#!/bin/sh
for a in "$@"; do
  case "$a" in
    --build_dir=*) build="${a#--build_dir=}";;
    --output_file=*) out="${a#--output_file=}";;
  esac
done
head -c 1024 /dev/zero > "$build/$out"
EOF
  chmod +x "$3/bin/python" "$3/bin/nanoemoji"
  exit 0
fi
exit 1
"#;
    let mut child = std::process::Command::new("sh")
        .arg("-c")
        .arg("cat > \"$0\" && chmod +x \"$0\"")
        .arg(&python)
        .stdin(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    assert!(child.wait().unwrap().success());
    python
}

/// Config for a color run whose source output directory sits below a file.
#[cfg(unix)]
fn undeliverable_config(dir: &std::path::Path, verbose: bool) -> std::path::PathBuf {
    std::fs::create_dir(dir.join("svg")).unwrap();
    std::fs::write(
        dir.join("svg").join("home.svg"),
        iconforge::test_support::SAMPLE_SVG,
    )
    .unwrap();
    std::fs::write(dir.join("blocked"), b"").unwrap();
    let python = fake_python(dir);
    let config = dir.join("iconforge.json");
    let json = format!(
        r#"{{ "class_name": "MyIcons", "input_dir": "svg", "mode": "color",
            "font_out_dir": "fonts", "source_out_dir": "blocked/lib",
            "timeout_secs": 30, "verbose": {verbose},
            "tools": {{ "python": "{}" }} }}"#,
        python.display()
    );
    std::fs::write(&config, json).unwrap();
    config
}

#[cfg(unix)]
#[test]
fn delivery_failure_names_the_cause_on_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let config = undeliverable_config(dir.path(), false);
    iconforge()
        .args(["generate", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("failed to deliver")
                .and(predicate::str::contains("my_icons.dart: "))
                .and(predicate::str::contains("caused by").not()),
        );
    assert!(!dir.path().join("fonts").join("my_icons.ttf").exists());
}

#[cfg(unix)]
#[test]
fn verbose_config_prints_cause_chain() {
    let dir = tempfile::tempdir().unwrap();
    let config = undeliverable_config(dir.path(), true);
    iconforge()
        .args(["generate", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("error: failed to deliver")
                .and(predicate::str::contains("  caused by: ")),
        );
}
