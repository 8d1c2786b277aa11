use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use obras_core::{
    Actor, BlockCause, EventSink, ResumeTarget, SignatureDecision, SignatureScope, Task,
    WorkflowEngine, WorkflowEvent,
};
use std::path::PathBuf;

mod seed;
mod state;

use state::{EmployeeRegistry, SiteState};

#[derive(Parser, Debug)]
#[command(name = "obras", version, about = "Construction task workflow CLI")]
struct Cli {
    /// Site state file (default: ~/.obras/site.json)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the demo site (logistics warehouse, installations blocked)
    Seed {
        /// Overwrite an existing site file
        #[arg(long)]
        force: bool,
    },

    /// Print the task tree with statuses, blockings and signatures
    Show,

    /// Move a pending task to in-progress
    Start {
        #[arg(long)]
        task: String,
        #[arg(long)]
        user: String,
    },

    /// Open a blocking record on a task
    Block {
        #[arg(long)]
        task: String,
        #[arg(long)]
        user: String,
        #[arg(long, value_enum)]
        cause: CauseArg,
        #[arg(long)]
        reason: String,
    },

    /// Resolve the open blocking record
    Resolve {
        #[arg(long)]
        task: String,
        #[arg(long)]
        user: String,
        /// Status the task reverts to
        #[arg(long, value_enum, default_value = "pending")]
        resume: ResumeArg,
    },

    /// Record (or replace) a signature on a joint task
    Sign {
        #[arg(long)]
        task: String,
        #[arg(long)]
        user: String,
        /// Submit a rejection instead of an approval
        #[arg(long)]
        reject: bool,
        /// Rejection reason (required with --reject)
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Record an informational signature (allowed on non-joint tasks)
        #[arg(long)]
        informational: bool,
    },

    /// Finish an in-progress task
    Complete {
        #[arg(long)]
        task: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Budget vs. actuals and projected ROI
    Roi,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CauseArg {
    MaterialShortage,
    ExecutionError,
    RegulatoryIssue,
    Weather,
    Other,
}

impl From<CauseArg> for BlockCause {
    fn from(c: CauseArg) -> Self {
        match c {
            CauseArg::MaterialShortage => BlockCause::MaterialShortage,
            CauseArg::ExecutionError => BlockCause::ExecutionError,
            CauseArg::RegulatoryIssue => BlockCause::RegulatoryIssue,
            CauseArg::Weather => BlockCause::Weather,
            CauseArg::Other => BlockCause::Other,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum ResumeArg {
    Pending,
    InProgress,
}

impl From<ResumeArg> for ResumeTarget {
    fn from(r: ResumeArg) -> Self {
        match r {
            ResumeArg::Pending => ResumeTarget::Pending,
            ResumeArg::InProgress => ResumeTarget::InProgress,
        }
    }
}

/// Prints each committed event as a JSON line, the way a notification feed
/// would receive it.
struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, event: WorkflowEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => println!("event: {json}"),
            Err(_) => println!("event: <unserializable>"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let path = match cli.file {
        Some(p) => p,
        None => state::site_path()?,
    };

    match cli.command {
        Command::Seed { force } => {
            if path.exists() && !force {
                bail!("{} already exists (pass --force to overwrite)", path.display());
            }
            let site = seed::demo_site(Utc::now());
            state::write_site(&path, &site)?;
            println!(
                "Seeded '{}' with {} tasks -> {}",
                site.project.name,
                site.project.tasks.len(),
                path.display()
            );
        }

        Command::Show => {
            let site = load(&path)?;
            show(&site);
        }

        Command::Start { task, user } => {
            mutate(&path, &user, |eng, site, actor| {
                let version = current_version(site, &task)?;
                eng.start_task(&mut site.project, actor, &task, version, Utc::now())?;
                Ok(format!("Task '{task}' started"))
            })?;
        }

        Command::Block {
            task,
            user,
            cause,
            reason,
        } => {
            mutate(&path, &user, |eng, site, actor| {
                let version = current_version(site, &task)?;
                eng.block_task(
                    &mut site.project,
                    actor,
                    &task,
                    version,
                    cause.into(),
                    reason.clone(),
                    Utc::now(),
                )?;
                Ok(format!("Task '{task}' blocked"))
            })?;
        }

        Command::Resolve { task, user, resume } => {
            mutate(&path, &user, |eng, site, actor| {
                let version = current_version(site, &task)?;
                eng.resolve_task(
                    &mut site.project,
                    actor,
                    &task,
                    version,
                    resume.into(),
                    Utc::now(),
                )?;
                Ok(format!("Task '{task}' unblocked"))
            })?;
        }

        Command::Sign {
            task,
            user,
            reject,
            reason,
            notes,
            informational,
        } => {
            let mut decision = if reject {
                let reason = reason.context("--reject requires --reason")?;
                SignatureDecision::reject(reason)
            } else {
                SignatureDecision::approve()
            };
            if let Some(n) = notes {
                decision = decision.with_notes(n);
            }
            let scope = if informational {
                SignatureScope::Informational
            } else {
                SignatureScope::CompletionGate
            };
            mutate(&path, &user, |eng, site, actor| {
                let version = current_version(site, &task)?;
                eng.sign_task(
                    &mut site.project,
                    actor,
                    &task,
                    version,
                    decision.clone(),
                    scope,
                    Utc::now(),
                )?;
                Ok(format!("Signature recorded on '{task}'"))
            })?;
        }

        Command::Complete { task, user, notes } => {
            mutate(&path, &user, |eng, site, actor| {
                let version = current_version(site, &task)?;
                eng.complete_task(
                    &mut site.project,
                    actor,
                    &task,
                    version,
                    notes.clone(),
                    Utc::now(),
                )?;
                Ok(format!("Task '{task}' completed"))
            })?;
        }

        Command::Roi => {
            let site = load(&path)?;
            let p = &site.project;
            let estimates: f64 = p.tasks.iter().map(|t| t.estimated_budget).sum();
            println!("Project: {}", p.name);
            match p.budget_total {
                Some(b) => println!("Budget total:    {b:>12.2} EUR"),
                None => println!("Budget total:    (not set)"),
            }
            println!("Task estimates:  {estimates:>12.2} EUR");
            println!("Actual cost:     {:>12.2} EUR", p.total_actual_cost());
            println!("Projected ROI:   {:>11.1} %", p.roi());
            if let Some(b) = p.budget_total {
                if estimates > b {
                    println!("note: task estimates exceed the approved budget");
                }
            }
        }
    }

    Ok(())
}

fn load(path: &PathBuf) -> Result<SiteState> {
    if !path.exists() {
        bail!("No site at {}. Run: obras seed", path.display());
    }
    state::read_site(path)
}

/// Load the site, run one engine operation as `user`, save on success.
fn mutate(
    path: &PathBuf,
    user: &str,
    op: impl FnOnce(
        &WorkflowEngine<EmployeeRegistry, StdoutSink>,
        &mut SiteState,
        &Actor,
    ) -> Result<String>,
) -> Result<()> {
    let mut site = load(path)?;
    let account = site
        .user(user)
        .with_context(|| format!("unknown user '{user}'"))?;
    let actor = Actor::new(account.id.clone(), account.role);

    let engine = WorkflowEngine::new(EmployeeRegistry(site.employees.clone()), StdoutSink);
    let message = op(&engine, &mut site, &actor)?;

    state::write_site(path, &site)?;
    println!("{message}");
    Ok(())
}

fn current_version(site: &SiteState, task_id: &str) -> Result<u64> {
    site.project
        .tasks
        .get(task_id)
        .map(|t| t.version)
        .with_context(|| format!("unknown task '{task_id}'"))
}

fn show(site: &SiteState) {
    let p = &site.project;
    println!("{} — {} ({}/{})", p.id, p.name, p.municipality, p.province);
    println!(
        "status: {:?} | climate zone {:?} | {} tasks, {} open\n",
        p.status,
        p.climate_zone,
        p.tasks.len(),
        p.open_task_count()
    );

    let roots: Vec<&Task> = p.tasks.roots().collect();
    for root in roots {
        print_task(site, root, 0);
    }
}

fn print_task(site: &SiteState, task: &Task, indent: usize) {
    let pad = "  ".repeat(indent);
    let joint = if task.requires_joint_signature { " [joint]" } else { "" };
    println!(
        "{pad}- {} ({}) v{}{joint} | {:?} | {:.0}/{:.0} EUR",
        task.name,
        task.id,
        task.version,
        task.status,
        task.actual_cost,
        task.estimated_budget,
    );
    if !task.predecessors.is_empty() {
        println!("{pad}    after: {}", task.predecessors.join(", "));
    }
    if let Some(b) = task.open_blocking() {
        println!("{pad}    BLOCKED ({:?}): {}", b.cause, b.justification);
    }
    for s in &task.signatures {
        let verdict = if s.approved { "approved" } else { "REJECTED" };
        println!("{pad}    signature {}: {}", s.user_id, verdict);
    }
    for child_id in &task.children {
        if let Some(child) = site.project.tasks.get(child_id) {
            print_task(site, child, indent + 1);
        }
    }
}
