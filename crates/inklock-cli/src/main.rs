use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, warn};

use inklock_core::store::STATE_FILE;
use inklock_core::{
    AppState, Browser, Category, ChangeAuth, Exporter, FileView, PinLength, SecurityQuestion,
    Session, SnapshotStore, Vault,
};

mod export;
use export::{read_blob, DiskExporter};

#[derive(Parser)]
#[command(name = "inklock")]
#[command(about = "Hidden vault behind the inklock notes app", long_about = None)]
struct Cli {
    /// Override the data directory (defaults to the platform app dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show setup state
    Status,

    /// List the recovery questions available during setup
    Questions,

    /// Choose 4 or 6 digit codes (before the first setup only)
    SetLength {
        /// 4 or 6
        length: u8,
    },

    /// Set up the vault code and recovery question
    Setup {
        #[arg(long)]
        pin: String,
        /// Second entry of the same code
        #[arg(long)]
        confirm: String,
        /// Recovery question key (see `questions`)
        #[arg(long)]
        question: SecurityQuestion,
        #[arg(long)]
        answer: String,
    },

    /// Unlock with a code and list the folders it opens
    Unlock {
        #[arg(long)]
        pin: String,
    },

    /// Set or replace the decoy code
    SetDecoy {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        decoy: String,
    },

    /// Change the vault code, proving either the current code or the
    /// recovery answer
    ChangePin {
        #[arg(long, conflicts_with = "answer")]
        current: Option<String>,
        #[arg(long)]
        answer: Option<String>,
        #[arg(long)]
        new: String,
    },

    /// List folders, optionally limited to one category
    Folders {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        category: Option<Category>,
    },

    /// Create a folder in a category
    CreateFolder {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        category: Category,
        #[arg(long)]
        name: String,
    },

    /// Import files into a folder
    Import {
        #[arg(long)]
        pin: String,
        /// Folder id or name
        #[arg(long)]
        folder: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List a folder's files (active view, or the bin)
    Ls {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        folder: String,
        /// Show the bin instead of the active files
        #[arg(long)]
        trash: bool,
    },

    /// Move files to the bin
    Delete {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        folder: String,
        /// Select everything in the view
        #[arg(long)]
        all: bool,
        /// File ids to select
        files: Vec<String>,
    },

    /// Restore files from the bin, downloading each one first
    Restore {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        folder: String,
        /// Download destination
        #[arg(long)]
        out: PathBuf,
        /// Select everything in the bin
        #[arg(long)]
        all: bool,
        /// File ids to select
        files: Vec<String>,
    },

    /// Download one active file without touching its state
    Export {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        folder: String,
        /// File id or name
        #[arg(long)]
        file: String,
        #[arg(long)]
        out: PathBuf,
    },

    /// Dismiss the first-run notice
    DismissIntro,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let store = open_store(cli.data_dir.as_deref())?;
    let mut vault = load_vault(&store).await;

    match cli.command {
        Commands::Status => {
            if vault.show_onboarding() {
                println!("first run: long-press the notes logo to reveal the vault");
            }
            let state = if vault.is_set_up() { "set up" } else { "not set up" };
            println!(
                "vault: {state} ({} digit code)",
                vault.credentials().password_length
            );
        }

        Commands::Questions => {
            for question in SecurityQuestion::ALL {
                println!("{:<20} {}", question.key(), question.prompt());
            }
        }

        Commands::SetLength { length } => {
            let length = PinLength::try_from(length).map_err(|e| anyhow!(e))?;
            vault.set_pin_length(length)?;
            println!("code length set to {length}");
            persist(&store, vault.state()).await;
        }

        Commands::Setup {
            pin,
            confirm,
            question,
            answer,
        } => {
            let session = vault.complete_setup(&pin, &confirm, question, &answer)?;
            println!("vault is set up");
            print_folders(&session, None);
            persist(&store, session.state()).await;
            session.close();
        }

        Commands::Unlock { pin } => {
            let session = vault.unlock(&pin)?;
            print_folders(&session, None);
            session.close();
        }

        Commands::SetDecoy { pin, decoy } => {
            let mut session = vault.unlock(&pin)?;
            session.set_decoy(&decoy)?;
            println!("decoy code set");
            persist(&store, session.state()).await;
            session.close();
        }

        Commands::ChangePin {
            current,
            answer,
            new,
        } => {
            let mut session = match (&current, &answer) {
                (Some(pin), None) => vault.unlock(pin)?,
                (None, Some(answer)) => vault.unlock_recovered(answer)?,
                _ => return Err(anyhow!("provide exactly one of --current or --answer")),
            };
            let auth = match &current {
                Some(pin) => ChangeAuth::Current(pin),
                None => ChangeAuth::Recovered,
            };
            session.change_pin(auth, &new)?;
            println!("code changed");
            persist(&store, session.state()).await;
            session.close();
        }

        Commands::Folders { pin, category } => {
            let session = vault.unlock(&pin)?;
            print_folders(&session, category);
            session.close();
        }

        Commands::CreateFolder {
            pin,
            category,
            name,
        } => {
            let mut session = vault.unlock(&pin)?;
            let id = session.create_folder(&name, category);
            println!("created folder {id}");
            persist(&store, session.state()).await;
            session.close();
        }

        Commands::Import { pin, folder, paths } => {
            let mut blobs = Vec::with_capacity(paths.len());
            for path in &paths {
                blobs.push(read_blob(path).await?);
            }
            let mut session = vault.unlock(&pin)?;
            let folder_id = resolve_folder(&session, &folder)?;
            let category = session.folder(&folder_id)?.category;
            for blob in &blobs {
                // Advisory only: the picker filter can always be bypassed,
                // and the vault stores whatever it is given.
                if !category.accepts(&blob.mime_type, &blob.name) {
                    warn!(file = %blob.name, %category, "file type does not match the folder's category");
                }
            }
            let ids = session.import(&folder_id, blobs)?;
            println!("imported {} file(s)", ids.len());
            persist(&store, session.state()).await;
            session.close();
        }

        Commands::Ls { pin, folder, trash } => {
            let session = vault.unlock(&pin)?;
            let folder_id = resolve_folder(&session, &folder)?;
            let mut browser = Browser::new();
            if trash {
                browser.set_view(FileView::Trash);
            }
            let folder_ref = session.folder(&folder_id)?;
            let visible = browser.visible(folder_ref);
            if visible.is_empty() {
                println!("no files");
            }
            for file in visible {
                println!(
                    "{}  {:>9}  {}  {}",
                    file.id,
                    file.size,
                    file.created_at.format("%Y-%m-%d %H:%M"),
                    file.name
                );
            }
            session.close();
        }

        Commands::Delete {
            pin,
            folder,
            all,
            files,
        } => {
            let mut session = vault.unlock(&pin)?;
            let folder_id = resolve_folder(&session, &folder)?;
            let mut browser = Browser::new();
            select(&mut browser, &session, &folder_id, all, &files)?;
            let folder_ref = session.folder_mut(&folder_id)?;
            let flipped = browser.delete_selected(folder_ref)?;
            println!("moved {flipped} file(s) to the bin");
            persist(&store, session.state()).await;
            session.close();
        }

        Commands::Restore {
            pin,
            folder,
            out,
            all,
            files,
        } => {
            let mut session = vault.unlock(&pin)?;
            let folder_id = resolve_folder(&session, &folder)?;
            let mut browser = Browser::new();
            browser.set_view(FileView::Trash);
            select(&mut browser, &session, &folder_id, all, &files)?;
            let exporter = DiskExporter::new(out);
            let folder_ref = session.folder_mut(&folder_id)?;
            let restored = browser.restore_selected(folder_ref, &exporter).await?;
            println!("restored {restored} file(s)");
            persist(&store, session.state()).await;
            session.close();
        }

        Commands::Export {
            pin,
            folder,
            file,
            out,
        } => {
            let session = vault.unlock(&pin)?;
            let folder_id = resolve_folder(&session, &folder)?;
            let folder_ref = session.folder(&folder_id)?;
            let record = folder_ref
                .active_files()
                .find(|f| f.id == file || f.name == file)
                .ok_or_else(|| anyhow!("no active file '{file}' in this folder"))?;
            let exporter = DiskExporter::new(out);
            exporter.export(record).await?;
            println!("saved {}", record.name);
            session.close();
        }

        Commands::DismissIntro => {
            vault.dismiss_onboarding();
            persist(&store, vault.state()).await;
        }
    }

    Ok(())
}

fn open_store(override_dir: Option<&Path>) -> Result<SnapshotStore> {
    match override_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Ok(SnapshotStore::at(dir.join(STATE_FILE)))
        }
        None => SnapshotStore::open_default(),
    }
}

/// Load failure at startup is non-fatal: log it and proceed with a
/// default state rather than blocking.
async fn load_vault(store: &SnapshotStore) -> Vault {
    match store.load().await {
        Ok(Some(state)) => Vault::from_state(state),
        Ok(None) => Vault::new(),
        Err(err) => {
            error!(%err, "failed to load the vault snapshot, starting from defaults");
            Vault::new()
        }
    }
}

/// Save is fire-and-forget: a failure is logged, the in-memory state
/// stands and the command still succeeds.
async fn persist(store: &SnapshotStore, state: &AppState) {
    if let Err(err) = store.save(state).await {
        error!(%err, "failed to save the vault snapshot");
    }
}

/// Accept a folder id or a (first-match) folder name.
fn resolve_folder(session: &Session<'_>, key: &str) -> Result<String> {
    session
        .folders()
        .iter()
        .find(|f| f.id == key || f.name == key)
        .map(|f| f.id.clone())
        .ok_or_else(|| anyhow!("no folder named or identified by '{key}'"))
}

fn select(
    browser: &mut Browser,
    session: &Session<'_>,
    folder_id: &str,
    all: bool,
    files: &[String],
) -> Result<()> {
    let folder = session.folder(folder_id)?;
    if all {
        browser.toggle_select_all(folder);
    } else {
        for id in files {
            browser.toggle(folder, id)?;
        }
    }
    if browser.selected().is_empty() {
        return Err(anyhow!("nothing selected"));
    }
    Ok(())
}

/// Identical output for either universe: nothing here may reveal which
/// code was entered.
fn print_folders(session: &Session<'_>, category: Option<Category>) {
    for cat in Category::ALL {
        if let Some(only) = category {
            if only != cat {
                continue;
            }
        }
        for folder in session.folders_by_category(cat) {
            let active = folder.active_files().count();
            let trashed = folder.trashed_files().count();
            println!(
                "{}  {:<9}  {} file(s), {} in bin  [{}]",
                folder.id, cat, active, trashed, folder.name
            );
        }
    }
}
