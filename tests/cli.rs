//! End-to-end tests of the command layer against real files

mod common;

use common::{write_temp, SAMPLE};
use iniedit::cli::{execute, CliArgs, Command};
use iniedit::config::ToolConfig;
use iniedit::TextEncoding;
use std::path::PathBuf;
use tempfile::TempDir;

fn run(command: Command) -> anyhow::Result<String> {
    run_with(
        CliArgs {
            case_sensitive: false,
            ignore_case: false,
            escapes: false,
            no_escapes: false,
            encoding: None,
            command,
        },
        &ToolConfig::default(),
    )
}

fn run_with(args: CliArgs, config: &ToolConfig) -> anyhow::Result<String> {
    let mut out = Vec::new();
    execute(&args, config, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

// ========================================================================
// Reading
// ========================================================================

#[test]
fn test_get_prints_value() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf8);
    let out = run(Command::Get {
        file: path,
        section: "server".to_string(),
        key: "port".to_string(),
        default: None,
    })
    .unwrap();
    assert_eq!(out, "8080\n");
}

#[test]
fn test_get_global_with_dash() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf16Le);
    let out = run(Command::Get {
        file: path,
        section: "-".to_string(),
        key: "name".to_string(),
        default: None,
    })
    .unwrap();
    assert_eq!(out, "demo\n");
}

#[test]
fn test_get_missing_key() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf8);
    let with_default = run(Command::Get {
        file: path.clone(),
        section: "Server".to_string(),
        key: "timeout".to_string(),
        default: Some("30".to_string()),
    })
    .unwrap();
    assert_eq!(with_default, "30\n");

    let without = run(Command::Get {
        file: path,
        section: "Server".to_string(),
        key: "timeout".to_string(),
        default: None,
    });
    assert!(without.is_err());
}

#[test]
fn test_get_case_sensitive_flag() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf8);
    let args = CliArgs {
        case_sensitive: true,
        ignore_case: false,
        escapes: false,
        no_escapes: false,
        encoding: None,
        command: Command::Get {
            file: path,
            section: "server".to_string(),
            key: "port".to_string(),
            default: None,
        },
    };
    assert!(run_with(args, &ToolConfig::default()).is_err());
}

#[test]
fn test_missing_file_reports_path() {
    let err = run(Command::Sections {
        file: PathBuf::from("/nonexistent/dir/app.ini"),
    })
    .unwrap_err();
    assert!(format!("{:#}", err).contains("file not found"));
}

#[test]
fn test_keys_and_sections() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf8);
    let sections = run(Command::Sections { file: path.clone() }).unwrap();
    assert_eq!(sections, "\nServer\nPaths\n");

    let keys = run(Command::Keys {
        file: path,
        section: "Server".to_string(),
    })
    .unwrap();
    assert_eq!(keys, "host\nport\n");
}

#[test]
fn test_dump_json() {
    let (_dir, path) = write_temp("[A]\nx=1\nx=2\n", TextEncoding::Utf8);
    let out = run(Command::Dump { file: path, json: true }).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value[0]["name"], "A");
    assert_eq!(value[0]["entries"][0]["key"], "x");
    assert_eq!(value[0]["entries"][0]["value"], "2");
}

#[test]
fn test_tokens_lists_every_token() {
    let (_dir, path) = write_temp("[A]\nx=1", TextEncoding::Utf8);
    let out = run(Command::Tokens { file: path }).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("section"));
    assert!(lines[2].contains("entry"));
}

// ========================================================================
// Writing
// ========================================================================

#[test]
fn test_set_updates_file_in_place() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf8);
    run(Command::Set {
        file: path.clone(),
        section: "Server".to_string(),
        key: "port".to_string(),
        value: "9090".to_string(),
        create: false,
        convert: None,
    })
    .unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        SAMPLE.replace("8080", "9090")
    );
}

#[test]
fn test_set_keeps_utf16_encoding() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf16Be);
    run(Command::Set {
        file: path.clone(),
        section: "Paths".to_string(),
        key: "cache".to_string(),
        value: "/tmp".to_string(),
        create: false,
        convert: None,
    })
    .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let expected = SAMPLE.replace("data=/var/lib/demo\n", "data=/var/lib/demo\ncache=/tmp\n");
    assert_eq!(bytes, TextEncoding::Utf16Be.encode(&expected));
}

#[test]
fn test_set_create() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.ini");

    let refused = run(Command::Set {
        file: path.clone(),
        section: "S".to_string(),
        key: "k".to_string(),
        value: "v".to_string(),
        create: false,
        convert: None,
    });
    assert!(refused.is_err());
    assert!(!path.exists());

    run(Command::Set {
        file: path.clone(),
        section: "S".to_string(),
        key: "k".to_string(),
        value: "v".to_string(),
        create: true,
        convert: None,
    })
    .unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[S]"));
    assert!(text.contains("k=v"));
}

#[test]
fn test_set_with_escapes_from_config() {
    let (_dir, path) = write_temp("[S]\n", TextEncoding::Utf8);
    let config = ToolConfig {
        allow_escapes: true,
        ..ToolConfig::default()
    };
    let args = CliArgs {
        case_sensitive: false,
        ignore_case: false,
        escapes: false,
        no_escapes: false,
        encoding: None,
        command: Command::Set {
            file: path.clone(),
            section: "S".to_string(),
            key: "msg".to_string(),
            value: "a\tb".to_string(),
            create: false,
            convert: None,
        },
    };
    run_with(args, &config).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[S]\nmsg=a\\tb\n");
}

#[test]
fn test_set_convert_rewrites_encoding() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf8);
    run(Command::Set {
        file: path.clone(),
        section: "Server".to_string(),
        key: "port".to_string(),
        value: "8080".to_string(),
        create: false,
        convert: Some(TextEncoding::Utf8Bom),
    })
    .unwrap();
    // The value was already set, the file is still rewritten in the new encoding
    assert_eq!(
        std::fs::read(&path).unwrap(),
        TextEncoding::Utf8Bom.encode(SAMPLE)
    );
}

#[test]
fn test_set_rejects_value_with_comment_marker() {
    let (_dir, path) = write_temp(SAMPLE, TextEncoding::Utf8);
    let result = run(Command::Set {
        file: path.clone(),
        section: "Server".to_string(),
        key: "host".to_string(),
        value: "a;b".to_string(),
        create: false,
        convert: None,
    });
    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SAMPLE);
}

// ========================================================================
// Configuration
// ========================================================================

#[test]
fn test_config_prints_flags_over_defaults() {
    let config = ToolConfig {
        allow_escapes: true,
        ..ToolConfig::default()
    };
    let args = CliArgs {
        case_sensitive: true,
        ignore_case: false,
        escapes: false,
        no_escapes: true,
        encoding: Some(TextEncoding::Utf16Le),
        command: Command::Config { write: false },
    };
    let out = run_with(args, &config).unwrap();
    let printed: ToolConfig = serde_yaml::from_str(&out).unwrap();
    assert_eq!(printed.comparison, iniedit::Comparison::CaseSensitive);
    assert!(!printed.allow_escapes);
    assert_eq!(printed.encoding, Some(TextEncoding::Utf16Le));
    assert!(out.contains("case-sensitive"));
}
