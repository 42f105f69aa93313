//! benhan CLI
//!
//! One-shot driver over the analysis pipeline: list the report sections,
//! inspect the prompt a section would produce, or run a single analysis and
//! print the feedback with the section text highlighted.

use anyhow::{Context, Result};
use benhan::analysis::AnalysisClient;
use benhan::config::Config;
use benhan::feedback::FeedbackRecord;
use benhan::highlight::{align, Category};
use benhan::prompt;
use benhan::report::{CaseReport, SectionEdit, SectionId};
use benhan::session::Session;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

#[derive(Parser, Debug)]
#[command(name = "benhan", about = "AI-guided tutor for clinical case reports", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the ten report sections
    Sections,
    /// Print the reviewer prompt that would be sent for a section
    Prompt {
        /// Path to a case report JSON file
        case: PathBuf,
        /// Section to analyze (wire name, e.g. benhSu)
        #[arg(short, long)]
        section: SectionId,
    },
    /// Run one analysis and print the feedback
    Analyze {
        /// Path to a case report JSON file
        case: PathBuf,
        /// Section to analyze (wire name, e.g. benhSu)
        #[arg(short, long)]
        section: SectionId,
    },
    /// Write a free-text section line by line; analysis runs after each
    /// quiet period
    Tutor {
        /// Section to work on (one of the free-text sections)
        #[arg(short, long)]
        section: SectionId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Sections => {
            for id in SectionId::ALL {
                println!("{:<14} {}", id.as_str(), id.title());
                println!("{:<14} {}", "", id.placeholder());
            }
        }
        Command::Prompt { case, section } => {
            let report = load_case(&case)?;
            println!("{}", prompt::build(section, &report));
        }
        Command::Analyze { case, section } => {
            let report = load_case(&case)?;
            let config = Config::load();
            let client = AnalysisClient::new(&config);
            if !client.is_available() {
                eprintln!("  Note: no API key found. Set {} to enable analysis.", benhan::config::API_KEY_ENV);
            }
            match client.analyze(section, &report).await {
                None => println!("Section '{}' is empty; nothing to analyze.", section),
                Some(feedback) => print_feedback(section, &report, &feedback),
            }
        }
        Command::Tutor { section } => run_tutor(section).await?,
    }
    Ok(())
}

/// Map a typed section body onto its edit variant. Only the free-text
/// sections make sense line by line; the structured ones need a real form.
fn text_edit(section: SectionId, text: String) -> Option<SectionEdit> {
    match section {
        SectionId::LyDoVaoVien => Some(SectionEdit::LyDoVaoVien(text)),
        SectionId::BenhSu => Some(SectionEdit::BenhSu(text)),
        SectionId::TomTatBenhAn => Some(SectionEdit::TomTatBenhAn(text)),
        SectionId::ChanDoan => Some(SectionEdit::ChanDoan(text)),
        SectionId::TienLuong => Some(SectionEdit::TienLuong(text)),
        SectionId::HanhChinh
        | SectionId::TienSu
        | SectionId::KhamBenh
        | SectionId::DatVanDe
        | SectionId::DeNghiCls => None,
    }
}

async fn run_tutor(section: SectionId) -> Result<()> {
    if text_edit(section, String::new()).is_none() {
        anyhow::bail!(
            "section '{}' is structured; tutor mode supports the free-text sections",
            section
        );
    }

    let config = Config::load();
    let client = AnalysisClient::new(&config);
    if !client.is_available() {
        eprintln!("  Note: no API key found. Set {} to enable analysis.", benhan::config::API_KEY_ENV);
    }

    let quiet = config.quiet_interval();
    let mut session = Session::new(client, quiet);
    session.select_section(section);

    println!("{}", section.title());
    println!("  {}", section.placeholder());
    println!("  Type the section line by line; Ctrl-D to finish.");
    println!();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut buffer = String::new();
    let mut tick = tokio::time::interval(Duration::from_millis(200));

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !buffer.is_empty() {
                        buffer.push('\n');
                    }
                    buffer.push_str(&line);
                    if let Some(edit) = text_edit(section, buffer.clone()) {
                        session.apply_edit(edit);
                    }
                }
                None => break,
            },
            _ = tick.tick() => {
                session.drain_messages();
                if session.has_new_feedback() {
                    if let Some(feedback) = session.feedback() {
                        println!();
                        print_feedback(section, session.report(), feedback);
                    }
                    session.mark_feedback_seen();
                }
            }
        }
    }

    // Give the last edit its quiet period plus the in-flight analysis a
    // moment to resolve before the final report.
    tokio::time::sleep(quiet + Duration::from_millis(200)).await;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    loop {
        session.drain_messages();
        if !session.is_loading() || tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    match session.feedback() {
        Some(feedback) => {
            println!();
            print_feedback(section, session.report(), feedback);
        }
        None => println!("No analysis ran (the section stayed empty)."),
    }
    Ok(())
}

fn load_case(path: &PathBuf) -> Result<CaseReport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read case file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid case report", path.display()))
}

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

fn print_feedback(section: SectionId, report: &CaseReport, feedback: &FeedbackRecord) {
    println!("{}", section.title());
    println!();

    let text = report.section(section).canonical_text();
    for span in align(&text, Some(feedback)) {
        match span.category {
            Category::Plain => print!("{}", span.slice(&text)),
            Category::Error => print!("{}{}{}", RED, span.slice(&text), RESET),
            Category::Suggestion => print!("{}{}{}", YELLOW, span.slice(&text), RESET),
        }
    }
    println!();
    println!();

    if feedback.is_clean() {
        println!("No feedback. The section looks good.");
        return;
    }
    for item in &feedback.errors {
        print_card("🔴", &item.kind, &item.message, &item.target_text, &item.details);
    }
    for item in &feedback.suggestions {
        print_card("🟡", &item.kind, &item.message, &item.target_text, &item.details);
    }
}

fn print_card(dot: &str, kind: &str, message: &str, target: &str, details: &[String]) {
    println!("{} [{}] {}", dot, kind, message);
    if !target.is_empty() {
        println!("   ↳ \"{}\"", target);
    }
    for detail in details {
        println!("   - {}", detail);
    }
    println!();
}
