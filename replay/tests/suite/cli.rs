use std::fs;

use assert_cmd::Command;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

fn replay_command() -> anyhow::Result<Command> {
    Ok(Command::cargo_bin("mentions-replay")?)
}

#[test]
fn replays_a_keyword_deletion_with_custom_trigger() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config = dir.path().join("mentions.toml");
    fs::write(&config, "trigger = \"+\"\n")?;
    let script = dir.path().join("script.jsonl");
    fs::write(
        &script,
        r#"{"type": "type", "text": "Hi +bo"}
{"type": "click", "offset": 6}
{"type": "backspace"}
{"type": "settle"}
"#,
    )?;

    let output = replay_command()?
        .arg("--config")
        .arg(&config)
        .arg(&script)
        .output()?;
    assert!(output.status.success());

    let records: Vec<Value> = String::from_utf8(output.stdout)?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    let keywords: Vec<&Value> = records
        .iter()
        .filter(|record| record["callback"] == "keyword")
        .map(|record| &record["keyword"])
        .collect();
    assert_eq!(keywords, vec![&json!("+b"), &json!("+bo")]);

    let last = records.last().expect("final state record");
    assert_eq!(last["final_state"]["text"], json!("Hi "));
    assert_eq!(last["final_state"]["intervals"], json!([]));
    assert_eq!(last["final_state"]["tracking"], json!(false));
    Ok(())
}

#[test]
fn reads_script_from_stdin() -> anyhow::Result<()> {
    replay_command()?
        .arg("-")
        .write_stdin("{\"type\": \"type\", \"text\": \"@x\"}\n")
        .assert()
        .success()
        .stdout(contains(r#""callback":"open_suggestions_panel""#));
    Ok(())
}

#[test]
fn reports_bad_script_lines() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = dir.path().join("broken.jsonl");
    fs::write(&script, "{\"type\": \"settle\"}\n{\"type\": \"fly\"}\n")?;

    replay_command()?
        .arg(&script)
        .assert()
        .failure()
        .stderr(contains("failed to parse script"))
        .stderr(contains("line 2"));
    Ok(())
}

#[test]
fn rejects_invalid_config() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config = dir.path().join("mentions.toml");
    fs::write(&config, "trigger = \" \"\n")?;
    let script = dir.path().join("script.jsonl");
    fs::write(&script, "")?;

    replay_command()?
        .args(["--config"])
        .arg(&config)
        .arg(&script)
        .assert()
        .failure()
        .stderr(contains("failed to load config"));
    Ok(())
}
