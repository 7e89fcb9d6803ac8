//! Command-line interface for rendering dialogue scripts.
//!
//! The CLI wraps the library to render scripts, probe and call a GPT-SoVITS
//! gateway, list the configured cast, and fetch pretrained model assets.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sori::audio::io::WavIo;
use sori::config::{load_config, AppConfig};
use sori::download::{self, find_asset, PRETRAINED_ASSETS};
use sori::gateway::GatewayClient;
use sori::render::{render_script, GatewayMode, RenderOptions};
use sori::script::Script;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sori")]
#[command(about = "Character-dialogue tone shaping and GPT-SoVITS tooling", long_about = None)]
struct Cli {
    /// Optional YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every line of a script into the output directory.
    Render {
        /// YAML script file.
        #[arg(long)]
        script: PathBuf,
        /// Reference clip (local path, hf:// or https:// source).
        #[arg(long)]
        reference: Option<String>,
        /// Output directory.
        #[arg(long, default_value = "dialogue_output")]
        output_dir: PathBuf,
        /// Route lines through the configured TTS gateway.
        #[arg(long)]
        gateway: bool,
    },
    /// Synthesize one line of text through the gateway.
    Say {
        /// Text to speak.
        text: String,
        /// Speaker whose tone profile shapes the reference.
        #[arg(long)]
        speaker: Option<String>,
        /// Emotion label refining the profile.
        #[arg(long, default_value = "neutral")]
        emotion: String,
        /// Reference clip (local path, hf:// or https:// source).
        #[arg(long)]
        reference: Option<String>,
        /// Output WAV path.
        #[arg(long)]
        output: PathBuf,
        /// Gateway endpoint; probed from config when omitted.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Find a live gateway endpoint among the configured candidates.
    Probe,
    /// List configured speakers and their tone factors.
    Speakers,
    /// List known pretrained model assets.
    Models,
    /// Download pretrained assets ("all" or one asset name).
    Download {
        /// Asset name from `sori models`, or "all".
        asset: String,
        /// Destination directory for the weights.
        #[arg(long, default_value = "pretrained_models")]
        dest: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Render {
            script,
            reference,
            output_dir,
            gateway,
        } => run_render(&config, script, reference, output_dir, gateway)?,
        Commands::Say {
            text,
            speaker,
            emotion,
            reference,
            output,
            endpoint,
        } => run_say(&config, &text, speaker, &emotion, reference, output, endpoint)?,
        Commands::Probe => {
            let client = GatewayClient::new(config.gateway.clone());
            let endpoint = client.probe()?;
            println!("{endpoint}");
        }
        Commands::Speakers => {
            let book = config.profile_book();
            for name in book.speaker_names() {
                let profile = book.base_profile(name)?;
                println!(
                    "{name}  pitch {:.2}  speed {:.2}  volume {:.2}",
                    profile.pitch, profile.speed, profile.volume
                );
            }
        }
        Commands::Models => {
            for asset in PRETRAINED_ASSETS {
                println!("{}  ({})", asset.name, asset.file);
            }
        }
        Commands::Download { asset, dest } => run_download(&asset, &dest)?,
    }

    Ok(())
}

fn run_render(
    config: &AppConfig,
    script_path: PathBuf,
    reference: Option<String>,
    output_dir: PathBuf,
    gateway: bool,
) -> Result<()> {
    let script = Script::load(&script_path)?;
    let reference_path = resolve_reference(config, reference)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupt_flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        interrupt_flag.store(true, Ordering::SeqCst);
    })?;

    let gateway_mode = if gateway {
        let client = GatewayClient::new(config.gateway.clone());
        let endpoint = client.probe()?;
        Some(GatewayMode {
            client,
            endpoint,
            request_pause: Duration::from_secs_f64(config.gateway.request_pause_seconds),
        })
    } else {
        None
    };

    let options = RenderOptions {
        reference_path,
        max_duration_seconds: Some(config.reference.max_duration_seconds),
        output_dir,
        gateway: gateway_mode,
        interrupted,
    };
    let report = render_script(&script, &config.profile_book(), &options)?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(path) => println!(
                "{:02} {} ({}) -> {}",
                outcome.index,
                outcome.speaker,
                outcome.emotion,
                path.display()
            ),
            Err(e) => println!(
                "{:02} {} ({}) failed: {e}",
                outcome.index, outcome.speaker, outcome.emotion
            ),
        }
    }
    println!(
        "{} of {} lines rendered, {} failed",
        report.succeeded(),
        script.len(),
        report.failed()
    );
    if report.failed() > 0 {
        anyhow::bail!("{} line(s) failed", report.failed());
    }
    Ok(())
}

fn run_say(
    config: &AppConfig,
    text: &str,
    speaker: Option<String>,
    emotion: &str,
    reference: Option<String>,
    output: PathBuf,
    endpoint: Option<String>,
) -> Result<()> {
    let client = GatewayClient::new(config.gateway.clone());
    let endpoint = match endpoint {
        Some(e) => e,
        None => client.probe()?,
    };

    let reference_path = resolve_reference(config, reference)?;
    let book = config.profile_book();

    // Shape the reference with the speaker's profile before synthesis, so
    // the gateway clones the adjusted tone.
    let mut shaped_ref = None;
    let ref_for_call = match speaker {
        Some(speaker) => {
            let profile = book.resolve(&speaker, emotion)?;
            let buffer = WavIo::read_mono(
                &reference_path,
                Some(config.reference.max_duration_seconds),
            )?;
            let shaped = sori::audio::transform::ToneShaper::shape(&buffer, &profile)?;
            let shaped_path = output.with_extension("ref.wav");
            WavIo::write_mono(&shaped_path, &shaped)?;
            shaped_ref = Some(shaped_path.clone());
            shaped_path
        }
        None => reference_path,
    };

    let result = client.synthesize(&endpoint, text, &ref_for_call);
    if let Some(path) = shaped_ref {
        let _ = std::fs::remove_file(path);
    }
    std::fs::write(&output, result?)?;
    println!("wrote {}", output.display());
    Ok(())
}

fn run_download(asset: &str, dest: &std::path::Path) -> Result<()> {
    let targets: Vec<_> = if asset == "all" {
        PRETRAINED_ASSETS.to_vec()
    } else {
        let found = find_asset(asset)
            .ok_or_else(|| anyhow::anyhow!("unknown asset '{asset}'; see `sori models`"))?;
        vec![found]
    };

    let mut failed = 0usize;
    for target in &targets {
        match download::fetch_asset(*target, dest) {
            Ok(path) => println!("{} -> {}", target.name, path.display()),
            Err(e) => {
                println!("{} failed: {e}", target.name);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} assets failed", targets.len());
    }
    Ok(())
}

/// Pick the reference source: CLI flag wins over config; either may be a
/// local path, `hf://`, or `https://` source.
fn resolve_reference(config: &AppConfig, flag: Option<String>) -> Result<PathBuf> {
    let source = flag
        .or_else(|| config.reference.path.clone())
        .ok_or_else(|| anyhow::anyhow!("no reference clip: pass --reference or set reference.path"))?;
    Ok(download::resolve_source(&source)?)
}
