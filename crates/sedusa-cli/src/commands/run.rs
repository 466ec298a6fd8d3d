use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use sedusa_core::{Config, HandyClient, Lifecycle, SessionManager, SessionRequest};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::{load_content, print_json, CliResult};

#[derive(Args)]
pub struct RunArgs {
    /// Shallowest position in mm
    #[arg(long, default_value_t = 20.0)]
    depth_min: f64,
    /// Deepest position in mm
    #[arg(long, default_value_t = 90.0)]
    depth_max: f64,
    /// Slowest speed in Hz
    #[arg(long, default_value_t = 0.5)]
    speed_min: f64,
    /// Fastest speed in Hz
    #[arg(long, default_value_t = 2.5)]
    speed_max: f64,
    /// Session length in minutes
    #[arg(long, default_value_t = 10)]
    length: u32,
    /// Name used by the narrative
    #[arg(long)]
    name: Option<String>,
    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
    /// Device connection key (required when device.mode = "handy")
    #[arg(long, env = "SEDUSA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl RunArgs {
    fn request(&self) -> SessionRequest {
        SessionRequest {
            depth_min: self.depth_min,
            depth_max: self.depth_max,
            speed_min: self.speed_min,
            speed_max: self.speed_max,
            length_min: self.length,
            name: self.name.clone(),
            seed: self.seed,
        }
    }
}

pub async fn run(args: RunArgs) -> CliResult {
    let config = Config::load()?;
    let (library, narrative) = load_content(&config)?;
    let actuator = Arc::new(HandyClient::new(config.handy_settings(args.api_key.clone()))?);
    let manager = SessionManager::new(
        Arc::new(library),
        Arc::new(narrative),
        config.caps,
        config.story.clone(),
    );

    let snapshot = manager.start(&args.request(), actuator).await?;
    print_json(&snapshot)?;
    eprintln!("commands: pause | resume | stop | status");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut last_line = snapshot.last_line;
    let mut watch = tokio::time::interval(Duration::from_millis(500));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted, stopping session");
                manager.stop().await;
                break;
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(command) => match command.trim() {
                    "pause" => {
                        if let Some(status) = manager.pause().await {
                            print_json(&status)?;
                        }
                    }
                    "resume" => {
                        if let Some(status) = manager.resume() {
                            print_json(&status)?;
                        }
                    }
                    "stop" => {
                        manager.stop().await;
                        break;
                    }
                    "status" => {
                        if let Some(status) = manager.status() {
                            print_json(&status)?;
                        }
                    }
                    "" => {}
                    other => eprintln!("unknown command: {other}"),
                },
                None => stdin_open = false,
            },
            _ = watch.tick() => {
                let Some(status) = manager.status() else { break };
                if status.last_line != last_line {
                    last_line = status.last_line.clone();
                    print_json(&status)?;
                }
                if status.state == Lifecycle::Stopped {
                    break;
                }
            }
        }
    }

    if let Some(log) = manager.wait().await {
        info!(phases = log.phases.len(), released = log.released, "session ended");
    }
    if let Some(status) = manager.status() {
        print_json(&status)?;
    }
    Ok(())
}
