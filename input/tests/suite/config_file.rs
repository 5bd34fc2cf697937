use std::fs;

use mentions_input::ConfigLoadError;
use mentions_input::MentionsTextInput;
use mentions_input::RecordingHandler;
use mentions_input::load_config;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn loads_config_from_disk_and_drives_the_input() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("mentions.toml");
    fs::write(
        &path,
        "trigger = \"#\"\ntrigger_location = \"new-word-only\"\ntrigger_delay = 2\n",
    )?;

    let config = load_config(&path)?;
    let mut input = MentionsTextInput::new(config, RecordingHandler::default())?;
    input.type_text("a#b c #rust");

    assert_eq!(input.handler().keywords(), vec!["#ru", "#rus", "#rust"]);
    assert_eq!(input.tracker().intervals().len(), 1);
    Ok(())
}

#[test]
fn missing_file_reports_the_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");

    let err = load_config(&path).expect_err("missing file");
    assert!(matches!(err, ConfigLoadError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}
