use std::fs;
use std::io::Read;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use mentions_input::MentionsConfig;
use mentions_input::load_config;
use serde::Serialize;

use crate::replay::ReplayOptions;
use crate::replay::ReplayOutput;
use crate::replay::replay;
use crate::script::parse_script;

/// Replay a script of host events through the mentions input and print every
/// callback it produces as a JSON line, followed by the final state.
#[derive(Debug, Parser, Clone)]
#[command(name = "mentions-replay")]
pub struct ReplayCommand {
    /// TOML file with trigger and layout settings; defaults apply when omitted.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pretty-print each JSON record.
    #[arg(long)]
    pub pretty: bool,

    /// Run scheduled keyword deletions after every step.
    #[arg(long)]
    pub auto_settle: bool,

    /// Script to replay, one JSON step per line. Use `-` for stdin.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,
}

impl ReplayCommand {
    pub fn run(&self) -> Result<()> {
        let config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config at {}", path.display()))?,
            None => MentionsConfig::default(),
        };
        let contents = self.read_script()?;
        let script = parse_script(&contents)
            .with_context(|| format!("failed to parse script {}", self.script.display()))?;

        let output = replay(
            config,
            &script,
            ReplayOptions {
                auto_settle: self.auto_settle,
            },
        )
        .context("invalid trigger configuration")?;

        let mut stdout = std::io::stdout().lock();
        for line in format_output(&output, self.pretty)? {
            writeln!(stdout, "{line}")?;
        }
        Ok(())
    }

    fn read_script(&self) -> Result<String> {
        if self.script.as_os_str() == "-" {
            let mut contents = String::new();
            std::io::stdin()
                .read_to_string(&mut contents)
                .context("failed to read script from stdin")?;
            return Ok(contents);
        }
        fs::read_to_string(&self.script)
            .with_context(|| format!("failed to read script at {}", self.script.display()))
    }
}

/// Renders the callbacks and a trailing `final_state` record, one per entry.
pub fn format_output(output: &ReplayOutput, pretty: bool) -> Result<Vec<String>> {
    #[derive(Serialize)]
    struct FinalRecord<'a> {
        final_state: &'a crate::replay::FinalState,
    }

    let mut lines = output
        .callbacks
        .iter()
        .map(|record| to_json(record, pretty))
        .collect::<Result<Vec<_>>>()?;
    lines.push(to_json(
        &FinalRecord {
            final_state: &output.final_state,
        },
        pretty,
    )?);
    Ok(lines)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).map_err(Into::into)
    } else {
        serde_json::to_string(value).map_err(Into::into)
    }
}
