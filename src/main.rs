use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use ledgerbook::audit::AuditLogger;
use ledgerbook::config::LedgerPaths;
use ledgerbook::crypto::SessionKey;
use ledgerbook::csvio;
use ledgerbook::merge::{
    ConflictResolution, ExportEnvelope, ImportOptions, MergeOrchestrator,
};
use ledgerbook::models::{EntryId, Money, NewEntry};
use ledgerbook::storage::{FileEngine, KvEngine, Storage, StorageMode};

#[derive(Parser)]
#[command(
    name = "ledgerbook",
    version,
    about = "Client-side encrypted personal ledger",
    long_about = "ledgerbook keeps your ledger encrypted at rest with a password \
                  that lives only in memory for the duration of a run, and merges \
                  ledgers exported from other devices without silent data loss."
)]
struct Cli {
    /// Encryption passphrase (prompted when omitted unless --plaintext)
    #[arg(long, env = "LEDGERBOOK_PASSPHRASE", global = true)]
    passphrase: Option<String>,

    /// Operate without encryption (legacy/compat mode)
    #[arg(long, global = true)]
    plaintext: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new ledger entry
    Add {
        /// Amount spent, e.g. 12.50
        amount: String,
        /// Transaction date (YYYY-MM-DD)
        date: String,
        /// Category code
        category: String,
        /// Optional notes
        #[arg(default_value = "")]
        notes: String,
    },

    /// List entries, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Search entries by category or notes
    Search { query: String },

    /// Delete an entry by id
    Delete { id: String },

    /// Export the whole ledger to a JSON envelope
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON envelope exported from another device
    Import {
        /// Envelope file
        file: PathBuf,
        /// Skip all duplicate-key matches
        #[arg(long)]
        skip_duplicates: bool,
        /// How to resolve conflicting duplicates
        #[arg(long, value_enum)]
        on_conflict: Option<ConflictPolicy>,
    },

    /// CSV import/export
    #[command(subcommand)]
    Csv(CsvCommands),

    /// Show recent operation logs
    Log {
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
}

#[derive(Subcommand)]
enum CsvCommands {
    /// Import entries from a CSV file (always additive)
    Import { file: PathBuf },
    /// Export entries to a CSV file
    Export { output: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum ConflictPolicy {
    Existing,
    Imported,
    Both,
}

impl From<ConflictPolicy> for ConflictResolution {
    fn from(policy: ConflictPolicy) -> Self {
        match policy {
            ConflictPolicy::Existing => ConflictResolution::KeepExisting,
            ConflictPolicy::Imported => ConflictResolution::KeepImported,
            ConflictPolicy::Both => ConflictResolution::KeepBoth,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let engine: Arc<dyn KvEngine> = Arc::new(FileEngine::new(paths.data_dir())?);
    let session = Arc::new(SessionKey::new());

    if !cli.plaintext {
        let passphrase = match cli.passphrase {
            Some(p) => p,
            None => rpassword::prompt_password("Passphrase (empty for none): ")
                .context("failed to read passphrase")?,
        };
        if !passphrase.is_empty() {
            session.set(passphrase);
        }
    }

    let storage = Storage::new(Arc::clone(&engine), Arc::clone(&session));
    let audit = AuditLogger::new(engine, session);

    match cli.command {
        Commands::Add {
            amount,
            date,
            category,
            notes,
        } => {
            let input = NewEntry {
                amount: Money::parse(&amount).map_err(|e| anyhow::anyhow!("{}", e))?,
                date: date.parse().context("invalid date, expected YYYY-MM-DD")?,
                category,
                notes,
            };
            let (entry, mode) = storage.entries.create(input)?;
            audit.log_success("createEntry", "entry", &format!("created {}", entry.id));
            println!("Created {} ({} on {})", entry.id, entry.amount, entry.date);
            if mode == StorageMode::PlaintextFallback {
                eprintln!("warning: no session passphrase, entry stored unencrypted");
            }
        }

        Commands::List { limit, offset } => {
            for entry in storage.entries.get_all(limit, offset)? {
                println!(
                    "{}  {:>10}  {:<12} {}  {}",
                    entry.date, entry.amount.to_string(), entry.category, entry.id, entry.notes
                );
            }
        }

        Commands::Search { query } => {
            for entry in storage.entries.search(&query)? {
                println!(
                    "{}  {:>10}  {:<12} {}",
                    entry.date, entry.amount.to_string(), entry.category, entry.notes
                );
            }
        }

        Commands::Delete { id } => {
            let id: EntryId = id.parse().context("invalid entry id")?;
            storage.entries.delete(id)?;
            audit.log_success("deleteEntry", "entry", &format!("deleted {}", id));
            println!("Deleted {}", id);
        }

        Commands::Export { output } => {
            let orchestrator = MergeOrchestrator::new(&storage, &audit);
            let envelope = orchestrator.export_account_book()?;
            let json = envelope.to_json()?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!(
                        "Exported {} entries to {}",
                        envelope.data.accounts.len(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }

        Commands::Import {
            file,
            skip_duplicates,
            on_conflict,
        } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let envelope = ExportEnvelope::from_json(&text)?;

            let options = ImportOptions {
                skip_duplicates,
                resolve_conflicts: on_conflict
                    .map(|policy| -> ledgerbook::merge::ConflictResolver<'static> {
                        Box::new(move |_| policy.into())
                    }),
            };

            let orchestrator = MergeOrchestrator::new(&storage, &audit);
            let result = orchestrator.import_account_book(&envelope, options)?;
            println!(
                "Imported {} entries, {} duplicates, {} conflicts",
                result.imported,
                result.duplicates,
                result.conflicts.len()
            );
            for error in &result.errors {
                eprintln!("error: {}", error);
            }
        }

        Commands::Csv(CsvCommands::Import { file }) => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let result = csvio::import_from_csv(&text, &storage.entries)?;
            println!(
                "Imported {} rows, skipped {} blank rows",
                result.imported, result.skipped
            );
            for error in &result.errors {
                eprintln!("error: {}", error);
            }
            if result.errors.is_empty() {
                audit.log_success(
                    "importCSV",
                    "ledger",
                    &format!("imported {} rows", result.imported),
                );
            } else {
                audit.log_failure(
                    "importCSV",
                    "ledger",
                    &format!("imported {} rows", result.imported),
                    &result.errors.join("; "),
                );
            }
        }

        Commands::Csv(CsvCommands::Export { output }) => {
            let entries = storage.entries.get_all(None, None)?;
            let text = csvio::entries_to_csv(&entries)?;
            fs::write(&output, text)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Exported {} entries to {}", entries.len(), output.display());
        }

        Commands::Log { count } => {
            for log in audit.recent(count)? {
                let status = if log.success { "ok" } else { "failed" };
                println!(
                    "{}  {:<6} {:<20} {}",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    status,
                    log.operation,
                    log.content
                );
            }
        }
    }

    Ok(())
}
