mod console;
mod step;

use std::rc::Rc;

use actions_engine::{ActionHost, ActionRegistry, ChainEvent, WorkflowChain};
use actions_types::VariantDescriptor;
use actions_util::UserPreferences;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::{
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
    task::LocalSet,
};
use tracing::{info, warn};

use crate::{
    console::{ConsoleAlerts, ConsoleNotifications, TokioTimer},
    step::{StepExpression, build_chain},
};

#[derive(Debug, Parser)]
#[command(name = "actions", version, about = "Assemble and run small automation workflows")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available actions grouped by category
    Variants {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the properties and return type of one action
    Describe { identifier: String },
    /// Run a workflow given as steps, e.g. `text:string=Hi notification:title=@0`
    Run {
        #[arg(required = true, value_parser = parse_step)]
        steps: Vec<StepExpression>,
        /// Do not ring the terminal bell
        #[arg(long)]
        mute: bool,
        /// Name shown in front of notifications
        #[arg(long)]
        app_name: Option<String>,
        /// Print run events as JSON lines
        #[arg(long)]
        events: bool,
    },
    /// Show or change stored preferences
    Preferences {
        #[arg(long, conflicts_with = "reset_app_name")]
        app_name: Option<String>,
        #[arg(long)]
        mute_alerts: Option<bool>,
        #[arg(long)]
        reset_app_name: bool,
    },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Completed,
    Halted { index: usize },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let registry = ActionRegistry::builtin();

    match cli.command {
        Command::Variants { json } => print_variants(&registry, json),
        Command::Describe { identifier } => {
            let descriptor = registry.lookup(&identifier)?;
            print_descriptor(&descriptor);
            Ok(())
        }
        Command::Run {
            steps,
            mute,
            app_name,
            events,
        } => {
            let preferences = load_preferences();
            let application_name = app_name.unwrap_or_else(|| preferences.application_name());
            let muted = mute || preferences.mute_alerts();
            run_steps(&registry, &steps, application_name, muted, events).await
        }
        Command::Preferences {
            app_name,
            mute_alerts,
            reset_app_name,
        } => update_preferences(&load_preferences(), app_name, mute_alerts, reset_app_name),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_step(input: &str) -> Result<StepExpression, String> {
    input.parse().map_err(|error: anyhow::Error| format!("{error:#}"))
}

fn load_preferences() -> UserPreferences {
    UserPreferences::new().unwrap_or_else(|error| {
        warn!(%error, "failed to load preferences; using defaults for this session");
        UserPreferences::ephemeral()
    })
}

fn print_variants(registry: &ActionRegistry, json: bool) -> Result<()> {
    if json {
        let variants: Vec<&VariantDescriptor> = registry.variants().collect();
        println!("{}", serde_json::to_string_pretty(&variants)?);
        return Ok(());
    }

    for category in registry.categories() {
        println!("{}", category.name);
        for variant in category.variants {
            let properties: Vec<&str> = variant.properties.iter().map(|property| property.name.as_str()).collect();
            println!(
                "  {:<14} {:<22} returns {:<6} icon {:<28} [{}]",
                variant.identifier,
                variant.title,
                variant.return_type,
                variant.icon_name,
                properties.join(", ")
            );
        }
    }
    Ok(())
}

fn print_descriptor(descriptor: &VariantDescriptor) {
    println!("{} ({})", descriptor.title, descriptor.identifier);
    println!("category: {}", descriptor.category);
    println!("returns:  {}", descriptor.return_type);
    if !descriptor.doc.is_empty() {
        println!();
        println!("{}", descriptor.doc);
    }
    if descriptor.properties.is_empty() {
        return;
    }
    println!();
    println!("properties:");
    for property in &descriptor.properties {
        let mut line = format!(
            "  {:<8} {:<6} default {}",
            property.name, property.value_type, property.default
        );
        if let Some(bounds) = property.bounds {
            line.push_str(&format!(" range {}..={}", bounds.lower, bounds.upper));
            if bounds.whole {
                line.push_str(" (whole)");
            }
        }
        println!("{line}");
    }
}

async fn run_steps(
    registry: &ActionRegistry,
    steps: &[StepExpression],
    application_name: String,
    muted: bool,
    print_events: bool,
) -> Result<()> {
    let chain = WorkflowChain::new();
    let ids = build_chain(registry, &chain, steps)?;
    info!(steps = ids.len(), "workflow assembled");

    let host = Rc::new(ActionHost::new(
        Rc::new(ConsoleNotifications::new(application_name)),
        Rc::new(ConsoleAlerts::new(muted)),
        Rc::new(TokioTimer),
    ));
    let (sender, receiver) = unbounded_channel();
    chain.set_event_sender(Some(sender));

    let outcome = LocalSet::new()
        .run_until(drive_run(&chain, host, receiver, print_events))
        .await?;

    for (index, instance) in chain.instances().iter().enumerate() {
        if let Some(value) = instance.return_value() {
            println!("step {index} ({}) returned {value}", instance.variant().identifier);
        }
    }
    if let RunOutcome::Halted { index } = outcome {
        println!("workflow stopped at step {index}");
    }
    Ok(())
}

/// Starts `chain` and waits for it to complete or halt. Must be polled inside a [`LocalSet`].
async fn drive_run(
    chain: &WorkflowChain,
    host: Rc<ActionHost>,
    mut receiver: UnboundedReceiver<ChainEvent>,
    print_events: bool,
) -> Result<RunOutcome> {
    chain.run(host).context("failed to start workflow")?;

    while let Some(event) = receiver.recv().await {
        if print_events {
            println!("{}", serde_json::to_string(&event)?);
        }
        match event {
            ChainEvent::RunCompleted { .. } => return Ok(RunOutcome::Completed),
            ChainEvent::RunHalted { index, .. } => return Ok(RunOutcome::Halted { index }),
            _ => {}
        }
    }
    bail!("workflow stopped reporting progress")
}

fn update_preferences(
    preferences: &UserPreferences,
    app_name: Option<String>,
    mute_alerts: Option<bool>,
    reset_app_name: bool,
) -> Result<()> {
    if reset_app_name {
        preferences.set_application_name(None)?;
    } else if let Some(name) = app_name {
        preferences.set_application_name(Some(name))?;
    }
    if let Some(muted) = mute_alerts {
        preferences.set_mute_alerts(muted)?;
    }

    println!("application name: {}", preferences.application_name());
    println!("mute alerts:      {}", preferences.mute_alerts());
    if !preferences.path().as_os_str().is_empty() {
        println!("stored at:        {}", preferences.path().display());
    }
    Ok(())
}
