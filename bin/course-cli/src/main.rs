use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use alist::config::ClientConfig;
use alist::filetype::{is_text, is_video, FileKind};
use alist::prelude::*;
use alist::progress::{self, LoadOutcome, ProgressManager, ProgressStore};
use alist::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    debug: bool,
    /// config file, defaults to <config dir>/alist-course/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// show or change the server address and token
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// log in and remember the token
    Login { username: String, password: String },
    /// list a directory, with progress when a course root is given
    Ls {
        path: String,
        #[arg(long)]
        course: Option<String>,
    },
    /// print a text file
    Cat { path: String },
    /// register every video below a course root
    Scan { root: String },
    /// show the progress of a course
    Progress { root: String },
    /// play a video without a player, recording progress as it goes
    Watch {
        root: String,
        video: String,
        /// video length in seconds
        #[arg(long)]
        duration: f64,
        /// start position in seconds, defaults to where it was left
        #[arg(long)]
        from: Option<f64>,
        /// seconds of playback per update
        #[arg(long, default_value_t = 1.0)]
        step: f64,
        /// wall-clock milliseconds between updates
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set {
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        token: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    let rt = tokio::runtime::Runtime::new().expect("init tokio failed");
    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "debug"
    } else {
        "warn,alist=info,course=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => ClientConfig::default_path()?,
    };
    match cli.command {
        Commands::Config { action } => config_cmd(action, &config_path).await,
        Commands::Login { username, password } => login(&config_path, &username, &password).await,
        Commands::Ls { path, course } => {
            ls(connect(&config_path).await?, &path, course.as_deref()).await
        }
        Commands::Cat { path } => cat(&connect(&config_path).await?, &path).await,
        Commands::Scan { root } => scan(connect(&config_path).await?, &root).await,
        Commands::Progress { root } => show_progress(connect(&config_path).await?, &root).await,
        Commands::Watch {
            root,
            video,
            duration,
            from,
            step,
            interval_ms,
        } => {
            let playback = Playback {
                duration,
                from,
                step,
                interval: Duration::from_millis(interval_ms),
            };
            watch(connect(&config_path).await?, &root, &video, playback).await
        }
    }
}

async fn connect(config_path: &Path) -> anyhow::Result<Service> {
    let config = ClientConfig::load_or_default(Some(config_path)).await?;
    Ok(Service::from_config(&config)?)
}

/// Config as written on disk, without environment overrides.
async fn stored_config(path: &Path) -> anyhow::Result<ClientConfig> {
    if tokio::fs::try_exists(path).await? {
        Ok(ClientConfig::load_from_file(path).await?)
    } else {
        Ok(ClientConfig::default())
    }
}

async fn login(config_path: &Path, username: &str, password: &str) -> anyhow::Result<()> {
    let service = connect(config_path).await?;
    let mut config = stored_config(config_path).await?;
    config.token = service.login(username, password).await?;
    config.save_to(config_path).await?;
    println!("logged in as {username}");
    Ok(())
}

async fn config_cmd(action: ConfigAction, path: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = ClientConfig::load_or_default(Some(path)).await?;
            println!("file:    {}", path.display());
            println!("server:  {}", config.server_url);
            println!("token:   {}", if config.token.is_empty() { "(none)" } else { "(set)" });
            println!("timeout: {}s", config.timeout_secs);
        }
        ConfigAction::Set { server, token } => {
            let mut config = stored_config(path).await?;
            if let Some(server) = server {
                config.server_url = server;
            }
            if let Some(token) = token {
                config.token = token;
            }
            config
                .save_to(path)
                .await
                .with_context(|| format!("saving {}", path.display()))?;
            println!("saved {}", path.display());
        }
    }
    Ok(())
}

async fn open_course(service: Service, root: &str) -> Arc<ProgressStore<Service>> {
    let store = Arc::new(ProgressStore::new(service));
    match store.change_course(root).await {
        LoadOutcome::Loaded => info!(root, "progress loaded"),
        LoadOutcome::Missing => info!(root, "no progress recorded yet"),
        // already logged by the store, carry on with an empty course
        LoadOutcome::Failed(_) => {}
    }
    store
}

async fn ls(service: Service, path: &str, course: Option<&str>) -> anyhow::Result<()> {
    let list = service.list(&ListParam::new(path)).await?;
    let store = match course {
        Some(root) => Some(open_course(service, root).await),
        None => None,
    };
    for file in list.content() {
        let kind = if *file.is_dir() {
            "dir"
        } else {
            match FileKind::of(file) {
                FileKind::Video => "video",
                FileKind::Text => "text",
                FileKind::Other => "file",
            }
        };
        let status = match &store {
            Some(store) if *file.is_dir() => {
                format!("{:>5.1}%", store.get_dir_progress(file.path()))
            }
            Some(store) if is_video(file) => match store.get_video_progress(file.path()) {
                Some(p) => video_status(&p),
                None => "new".to_owned(),
            },
            _ => String::new(),
        };
        println!("{kind:<5} {:>12} {status:>8}  {}", file.size(), file.name());
    }
    Ok(())
}

async fn cat(service: &Service, path: &str) -> anyhow::Result<()> {
    let name = path.rsplit('/').next().unwrap_or(path);
    if FileKind::of_name(name) != FileKind::Text {
        bail!("{path} is not a text file");
    }
    print!("{}", service.fetch_file_content(path).await?);
    Ok(())
}

async fn scan(service: Service, root: &str) -> anyhow::Result<()> {
    let store = open_course(service, root).await;
    let dirs = walk(store.remote(), root.to_owned()).await?;
    let mut added = 0;
    for dir in &dirs {
        let outcome = store.init_dir_child_process(&dir.entries).await;
        added += outcome.added;
        if let Err(e) = outcome.saved {
            warn!(dir = %dir.path, error = %e, "progress not saved");
        }
    }
    let texts: usize = dirs
        .iter()
        .map(|d| d.entries.iter().filter(|f| is_text(f)).count())
        .sum();
    println!(
        "{} directories, {} videos tracked ({added} new), {texts} text files",
        dirs.len(),
        store.snapshot().videos.len()
    );
    Ok(())
}

async fn show_progress(service: Service, root: &str) -> anyhow::Result<()> {
    let store = open_course(service, root).await;
    let state = store.snapshot();
    if state.videos.is_empty() {
        println!("no videos tracked under {root}, run `course scan {root}` first");
        return Ok(());
    }
    for video in state.videos.values() {
        let shown = video.path.strip_prefix(root).unwrap_or(&video.path);
        println!("{:>8}  {shown}", video_status(video));
    }
    println!();
    for dir in state.dir_progress.keys() {
        println!("{:>7.1}%  {dir}", store.get_dir_progress(dir));
    }
    Ok(())
}

fn video_status(p: &progress::VideoProgress) -> String {
    if p.completed {
        return "done".to_owned();
    }
    match (p.current_time, p.duration) {
        (Some(t), Some(d)) if d > 0.0 => format!("{:.0}%", t / d * 100.0),
        _ => "new".to_owned(),
    }
}

struct Playback {
    duration: f64,
    from: Option<f64>,
    step: f64,
    interval: Duration,
}

async fn watch(service: Service, root: &str, video: &str, playback: Playback) -> anyhow::Result<()> {
    if playback.duration <= 0.0 || playback.step <= 0.0 {
        bail!("duration and step must be positive");
    }
    let store = open_course(service, root).await;
    let info = store.remote().get(video).await?;
    if !is_video(info.file()) {
        bail!("{video} is not a video");
    }

    let mut manager = ProgressManager::new(store.clone(), info.file().clone());
    let mut position = playback
        .from
        .or_else(|| manager.get_video_progress().and_then(|p| p.current_time))
        .unwrap_or(0.0)
        .min(playback.duration);
    manager.start_auto_sync();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(playback.interval);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            _ = ticker.tick() => {
                let p = manager.update_progress(position, playback.duration);
                println!(
                    "{:>8.1}s / {:.1}s  {}",
                    position,
                    playback.duration,
                    if p.completed { "done" } else { "" }
                );
                if position >= playback.duration {
                    break;
                }
                position = (position + playback.step).min(playback.duration);
            }
        }
    }

    if let Some(Err(e)) = manager.stop_auto_sync().await {
        warn!(error = %e, "final save failed");
    }
    let dir = progress::parent_dir(video);
    println!("{video}: {:.1}% of {dir} done", store.get_dir_progress(dir));
    Ok(())
}
