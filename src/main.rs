//! wm-tool CLI: inspect working-memory printouts and produce agent I/O strings.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use soar_wm::config::{ClockConfig, WmConfig};
use soar_wm::graph::extract_wm_graph;
use soar_wm::language::{Sentence, translate_message};
use soar_wm::printout::Printout;
use soar_wm::svs::{self, Vec3};
use soar_wm::sync::WmInterface;
use soar_wm::time_info::TimeInfo;
use soar_wm::wm::memory::MemoryStore;

#[derive(Parser)]
#[command(name = "wm-tool", version, about = "Working-memory tools for cognitive agents")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a printout (e.g. the output of `p S1 -d 4`) and show its graph.
    Graph {
        /// File holding the printout.
        #[arg(long)]
        file: PathBuf,

        /// Maximum extraction depth (overrides the config).
        #[arg(long)]
        depth: Option<usize>,

        /// Emit JSON instead of the indented text form.
        #[arg(long)]
        json: bool,
    },

    /// Translate an agent message type into English.
    Message {
        /// Message type, e.g. `get-next-task`.
        message_type: String,
    },

    /// Show how a sentence is laid out on the input link.
    Sentence {
        /// The sentence text.
        text: String,

        /// Sentence number.
        #[arg(long, default_value = "1")]
        number: i64,
    },

    /// Show the simulated clock after a number of ticks.
    Clock {
        #[arg(long, default_value = "1")]
        ticks: u32,
    },

    /// Build SVS scene-graph commands.
    Svs {
        #[command(subcommand)]
        action: SvsAction,
    },
}

#[derive(Subcommand)]
enum SvsAction {
    /// Add a unit box.
    AddBox {
        id: String,
        /// Parent node in the scene graph.
        #[arg(long, default_value = svs::WORLD)]
        parent: String,
        /// Position as `x,y,z`.
        #[arg(long, value_parser = parse_vec3)]
        pos: Option<Vec3>,
        /// Rotation as `x,y,z`.
        #[arg(long, value_parser = parse_vec3)]
        rot: Option<Vec3>,
        /// Scale as `x,y,z`.
        #[arg(long, value_parser = parse_vec3)]
        scl: Option<Vec3>,
    },
    /// Add an empty node, e.g. a frame to hang other objects on.
    AddNode {
        id: String,
        #[arg(long, default_value = svs::WORLD)]
        parent: String,
        #[arg(long, value_parser = parse_vec3)]
        pos: Option<Vec3>,
        #[arg(long, value_parser = parse_vec3)]
        rot: Option<Vec3>,
        #[arg(long, value_parser = parse_vec3)]
        scl: Option<Vec3>,
    },
    /// Move an object.
    Move {
        id: String,
        #[arg(value_parser = parse_vec3)]
        pos: Vec3,
    },
    /// Delete an object.
    Delete { id: String },
    /// Add a tag to an object.
    Tag {
        id: String,
        name: String,
        value: String,
    },
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<std::result::Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(format!("expected x,y,z, got {} component(s)", parts.len())),
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => WmConfig::load(path)?,
        None => WmConfig::default(),
    };

    match cli.command {
        Commands::Graph { file, depth, json } => {
            let text = std::fs::read_to_string(&file).into_diagnostic()?;
            let printout = Printout::parse(&text)?;
            let graph = printout.extract(depth.or(config.extract_depth))?;
            if json {
                let out = serde_json::to_string_pretty(&graph.to_json()).into_diagnostic()?;
                println!("{out}");
            } else {
                println!("{}", graph.display());
            }
        }

        Commands::Message { message_type } => {
            println!("{}", translate_message(&message_type));
        }

        Commands::Sentence { text, number } => {
            let mut wm = MemoryStore::new();
            let root = wm.root();
            let mut sentence = Sentence::new(text, number);
            sentence.attach(&mut wm, &root)?;
            if let Some(id) = sentence.sentence_id() {
                let graph = extract_wm_graph(&wm, id, None)?;
                println!("{}", graph.display());
            }
        }

        Commands::Clock { ticks } => {
            let mut time = TimeInfo::new(ClockConfig {
                sim_clock: true,
                ..config.clock
            });
            for _ in 0..ticks {
                time.tick();
            }
            let clock = time.clock();
            println!(
                "{:02}:{:02}:{:02}.{:03} after {} step(s), epoch {}",
                clock.hour,
                clock.minute,
                clock.second,
                clock.millisecond,
                time.steps(),
                clock.epoch
            );
        }

        Commands::Svs { action } => {
            let cmd = match action {
                SvsAction::AddBox {
                    id,
                    parent,
                    pos,
                    rot,
                    scl,
                } => svs::add_box(&id, &parent, pos, rot, scl),
                SvsAction::AddNode {
                    id,
                    parent,
                    pos,
                    rot,
                    scl,
                } => svs::add_node(&id, &parent, pos, rot, scl),
                SvsAction::Move { id, pos } => svs::change_pos(&id, pos),
                SvsAction::Delete { id } => svs::delete(&id),
                SvsAction::Tag { id, name, value } => svs::add_tag(&id, &name, &value),
            };
            println!("{cmd}");
        }
    }

    Ok(())
}
