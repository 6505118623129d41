use std::path::PathBuf;

use anyhow::Result;
use awalog_backup::{
    backup::{
        self, document_in, AssumeYes, BackupStamp, Confirm, Envelope, ExportJob, ExportOutcome,
        Prompt, WriteMode, DEFAULT_BACKUP_ROOT, DEFAULT_DOCUMENT,
    },
    config::{Settings, DEFAULT_PRODUCTION_ENV},
    error::BackupError,
    firestore::client::{FirestoreClient, DEFAULT_HOST_URL},
    ServiceAccount,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "awalog-backup")]
#[command(about = "Back up and restore awalog Firestore documents")]
#[command(version)]
struct Cli {
    /// Service account key file
    #[arg(long, global = true, env = "AWALOG_CREDENTIALS", value_name = "FILE")]
    credentials: Option<PathBuf>,

    /// Directory holding the backups
    #[arg(long, global = true, env = "AWALOG_BACKUP_DIR", default_value = DEFAULT_BACKUP_ROOT)]
    backup_dir: PathBuf,

    /// Firestore endpoint, e.g. http://127.0.0.1:8081 for the emulator
    #[arg(long, global = true, env = "FIRESTORE_HOST_URL", default_value = DEFAULT_HOST_URL)]
    host_url: String,

    /// Environment whose exports must be confirmed
    #[arg(long, global = true, default_value = DEFAULT_PRODUCTION_ENV)]
    production_env: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Restore a backup file into its remote document
    Export {
        /// Environment (top-level collection), e.g. dev or prod
        env: String,

        /// Backup to restore, as YYYYMMDDHHmm
        stamp: BackupStamp,

        /// Document within the environment
        #[arg(long, default_value = DEFAULT_DOCUMENT)]
        document: String,

        /// How the payload is stored in the document
        #[arg(long, value_enum, default_value_t = Envelope::Bare)]
        envelope: Envelope,

        /// Overwrite in a single write instead of delete-then-create
        #[arg(long)]
        atomic: bool,

        /// Don't ask before exporting into production
        #[arg(short, long)]
        yes: bool,
    },

    /// Save remote documents to new backup files
    Import {
        /// Environment (top-level collection), e.g. dev or 1103
        env: String,

        /// Documents within the environment
        #[arg(long = "document", default_value = DEFAULT_DOCUMENT)]
        documents: Vec<String>,

        /// How the payload is stored in the document
        #[arg(long, value_enum, default_value_t = Envelope::Bare)]
        envelope: Envelope,
    },

    /// List the backups of a document, newest first
    List {
        /// Environment (top-level collection)
        env: String,

        /// Document within the environment
        #[arg(long, default_value = DEFAULT_DOCUMENT)]
        document: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::new(
        cli.credentials,
        cli.backup_dir,
        cli.host_url,
        cli.production_env,
    );

    match cli.command {
        Commands::Export {
            env,
            stamp,
            document,
            envelope,
            atomic,
            yes,
        } => {
            let job = ExportJob {
                environment: env,
                document,
                stamp,
                envelope,
                mode: if atomic {
                    WriteMode::Atomic
                } else {
                    WriteMode::Replace
                },
            };
            let mut confirm: Box<dyn Confirm> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(Prompt::stdio())
            };

            // Credentials are only read once the production guard has passed.
            let outcome = backup::export_with(
                || connect(&settings),
                &settings.layout,
                &settings.production_env,
                &job,
                confirm.as_mut(),
            )
            .await?;

            match outcome {
                ExportOutcome::Exported { document, source } => {
                    println!("exported {} into {}", source.display(), document)
                }
                ExportOutcome::Cancelled => println!("export is cancelled"),
            }
        }
        Commands::Import {
            env,
            documents,
            envelope,
        } => {
            // Every document imported in one run shares the run's start time.
            let stamp = BackupStamp::now();
            let mut client = connect(&settings).await?;

            for document in documents {
                let doc_ref = document_in(&env, &document)?;
                let path = backup::import_document(
                    &mut client,
                    &settings.layout,
                    &doc_ref,
                    envelope,
                    stamp,
                )
                .await?;
                println!("{}", path.display());
            }
        }
        Commands::List { env, document } => {
            let doc_ref = document_in(&env, &document)?;
            for stamp in settings.layout.list(&doc_ref).await? {
                println!("{stamp}");
            }
        }
    }

    Ok(())
}

async fn connect(settings: &Settings) -> Result<FirestoreClient, BackupError> {
    let service_account = ServiceAccount::from_file(settings.credentials()?)?;
    FirestoreClient::initialise(service_account, settings.client_options.clone()).await
}
