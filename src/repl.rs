use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};
use tracing::warn;

use crate::config::Config;
use crate::model::Message;
use crate::model_gateway::ModelGateway;
use crate::session::{Session, TurnOutcome, auto_solve_message};

const GREETING: &str = "Arona: Konnichiwa Sensei! Arona is ready to help! Type 'exit' to quit.";
const FAREWELL: &str = "Arona: Sayonara Sensei! Mata ne! (ﾉ◕ヮ◕)ﾉ*:･ﾟ✧";
const PROMPT: &str = "Sensei: ";
const AUTO_PREVIEW_CHARS: usize = 30;
/// Automatic resubmissions allowed before control returns to the user.
const MAX_AUTO_FOLLOW_UPS: usize = 5;

pub async fn run_repl<G>(gateway: &G, cfg: &Config) -> Result<()>
where
    G: ModelGateway + ?Sized,
{
    let session = Session::new(&cfg.system_prompt);
    run_loop(gateway, session, io::stdin().lock(), io::stdout().lock()).await?;
    Ok(())
}

/// Drives the conversation until an exit keyword or end of input, handing
/// the session back to the caller.
pub async fn run_loop<G, R, W>(
    gateway: &G,
    mut session: Session,
    mut input: R,
    mut out: W,
) -> Result<Session>
where
    G: ModelGateway + ?Sized,
    R: BufRead,
    W: Write,
{
    writeln!(out, "\n{GREETING}\n").context("Failed to write to stdout")?;

    let mut follow_ups = 0;
    let mut buf = Vec::new();
    loop {
        let pending = match session.take_pending_content() {
            Some(_) if follow_ups == MAX_AUTO_FOLLOW_UPS => {
                warn!(limit = MAX_AUTO_FOLLOW_UPS, "automatic follow-up limit reached");
                writeln!(
                    out,
                    "Arona: Stopping after {MAX_AUTO_FOLLOW_UPS} automatic follow-ups. Please continue, Sensei."
                )
                .context("Failed to write to stdout")?;
                None
            }
            pending => pending,
        };

        let message = if let Some(content) = pending {
            follow_ups += 1;
            writeln!(out, "{PROMPT}[AUTO] Solve: {}...", preview(&content))
                .context("Failed to write to stdout")?;
            auto_solve_message(&content)
        } else {
            follow_ups = 0;
            write!(out, "{PROMPT}").context("Failed to write to stdout")?;
            out.flush().context("Failed to flush stdout")?;

            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .context("Failed to read stdin")?;
            if read == 0 {
                writeln!(out).context("Failed to write to stdout")?;
                writeln!(out, "{FAREWELL}").context("Failed to write to stdout")?;
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            let prompt = line.trim();
            if is_exit_command(prompt) {
                writeln!(out, "{FAREWELL}").context("Failed to write to stdout")?;
                break;
            }
            if prompt.is_empty() {
                continue;
            }
            if prompt.eq_ignore_ascii_case("/history") {
                print_history(&mut out, session.transcript())?;
                continue;
            }
            prompt.to_string()
        };

        match session.send(gateway, &message).await {
            Ok(outcome) => render_outcome(&mut out, &outcome)?,
            Err(err) => {
                let detail = format!("{err:#}");
                warn!(error = %detail, "model call failed");
                writeln!(out, "Arona: Error occurred: {detail} (；☉_☉)")
                    .context("Failed to write to stdout")?;
            }
        }
    }

    Ok(session)
}

/// Runs one prompt non-interactively, following any file loads it triggers.
/// Remote failures are returned instead of reported inline.
pub async fn run_single_turn<G, W>(gateway: &G, cfg: &Config, prompt: &str, mut out: W) -> Result<()>
where
    G: ModelGateway + ?Sized,
    W: Write,
{
    let mut session = Session::new(&cfg.system_prompt);
    let outcome = session.send(gateway, prompt).await?;
    render_outcome(&mut out, &outcome)?;

    let mut follow_ups = 0;
    while let Some(content) = session.take_pending_content() {
        if follow_ups == MAX_AUTO_FOLLOW_UPS {
            bail!("Stopped after {MAX_AUTO_FOLLOW_UPS} automatic follow-up turns");
        }
        follow_ups += 1;
        writeln!(out, "{PROMPT}[AUTO] Solve: {}...", preview(&content))
            .context("Failed to write to stdout")?;
        let outcome = session.send(gateway, &auto_solve_message(&content)).await?;
        render_outcome(&mut out, &outcome)?;
    }

    Ok(())
}

pub fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn preview(content: &str) -> String {
    content.chars().take(AUTO_PREVIEW_CHARS).collect()
}

fn render_outcome(out: &mut impl Write, outcome: &TurnOutcome) -> Result<()> {
    let written = match outcome {
        TurnOutcome::Reply(text) => writeln!(out, "Arona: {text}"),
        TurnOutcome::FileLoaded { path } => writeln!(
            out,
            "\nArona: File {path} loaded successfully! (◕‿◕✿)\nArona: Analyzing content now..."
        ),
        TurnOutcome::FileNotFound { path } => {
            writeln!(out, "Arona: File not found: {path}... (＞﹏＜)")
        }
        TurnOutcome::UnknownAction { .. } => {
            writeln!(out, "Arona: Unknown action requested... (◕︿◕✿)")
        }
    };
    written.context("Failed to write to stdout")
}

fn print_history(out: &mut impl Write, history: &[Message]) -> Result<()> {
    if history.is_empty() {
        writeln!(out, "(history is empty)\n").context("Failed to write to stdout")?;
        return Ok(());
    }

    for (idx, msg) in history.iter().enumerate() {
        writeln!(out, "[{}] {}: {}", idx, msg.role.as_str(), msg.content)
            .context("Failed to write to stdout")?;
    }
    writeln!(out).context("Failed to write to stdout")
}
