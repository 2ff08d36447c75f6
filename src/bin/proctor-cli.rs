//! Proctor CLI - Command-line driver for the trial engine
//!
//! Runs trials of the built-in reference environment with scripted actors,
//! wired through the in-process channel transport.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use proctor::env::LineWorld;
use proctor::service::{TrialSupervisor, join_trials};
use proctor::transport::ChannelTransport;
use proctor::trial::roles::{PRIMARY_ACTOR_CLASS, SUPERVISOR_ACTOR_CLASS};
use proctor::trial::{ActionEvent, ActionMessage, ActorMetadata, SessionConfig, Trial};
use serde_json::json;

#[derive(Parser)]
#[command(name = "proctor")]
#[command(about = "Multi-actor trial execution engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run trials of the built-in line-walk environment
    Run {
        /// Number of trials to run in parallel
        #[arg(short, long, default_value = "1")]
        trials: usize,

        /// Half-width of the walk interval (goal distance)
        #[arg(long, default_value = "5")]
        bound: i64,

        /// Step limit per trial
        #[arg(long, default_value = "100")]
        max_steps: u64,

        /// Attach a supervisor that overrides every Nth step (0 = none)
        #[arg(long, default_value = "0")]
        override_every: u64,

        /// Request rendered frames with every observation
        #[arg(long)]
        render: bool,

        /// Target width for rendered frames
        #[arg(long, default_value = "64")]
        render_width: u32,

        /// Write trial reports as JSON files into this directory
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            trials,
            bound,
            max_steps,
            override_every,
            render,
            render_width,
            report_dir,
        } => {
            let config = SessionConfig {
                render,
                render_width,
            };

            let supervisor = TrialSupervisor::new();
            let mut handles = Vec::new();

            for _ in 0..trials.max(1) {
                let mut actors = vec![ActorMetadata::new("walker", PRIMARY_ACTOR_CLASS)];
                if override_every > 0 {
                    actors.push(ActorMetadata::new("guard", SUPERVISOR_ACTOR_CLASS));
                }

                let (transport, event_tx, event_rx, mut outbound) =
                    ChannelTransport::channel(actors);
                let trial = Trial::new(
                    &config,
                    LineWorld::new(bound, max_steps),
                    transport,
                    event_rx,
                )?;
                let (_, handle) = supervisor.spawn(trial);
                handles.push(handle);

                // Scripted actors: the walker always moves toward the goal;
                // the guard, when attached, periodically forces a step back.
                tokio::spawn(async move {
                    let mut step = 0u64;
                    // Drain outbound traffic; each observation triggers the
                    // next round of actions until the trial ends.
                    while let Some(message) = outbound.recv().await {
                        use proctor::transport::OutboundMessage::*;
                        match message {
                            Started(_) | Observations(_) => {
                                step += 1;
                                let mut actions =
                                    vec![ActionMessage::present(0, json!(1))];
                                if override_every > 0 {
                                    let value = if step % override_every == 0 {
                                        Some(json!(-1))
                                    } else {
                                        None
                                    };
                                    actions.push(ActionMessage {
                                        actor_index: 1,
                                        value,
                                    });
                                }
                                if event_tx
                                    .send(ActionEvent::active(actions))
                                    .await
                                    .is_err()
                                {
                                    break;
                                }
                            }
                            Reward(_) => {}
                            Ended(_) => break,
                        }
                    }
                });
            }

            let reports = join_trials(handles).await;
            for report in reports {
                let report = report?;
                println!(
                    "Trial {}: {} steps, total reward {}, termination {:?}",
                    report.trial_id, report.steps, report.total_reward, report.termination
                );

                if let Some(dir) = &report_dir {
                    std::fs::create_dir_all(dir)?;
                    let path = dir.join(format!("{}.json", report.trial_id));
                    report.write_json(&path)?;
                }
            }
        }
    }

    Ok(())
}
