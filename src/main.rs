use clap::{Parser, Subcommand};
use folio::admin::{AdminDashboard, Redirect};
use folio::backend::{NotificationSink, ObjectStorage, RecordStore, SessionProvider};
use folio::catalog::Catalog;
use folio::config::{self, FolioConfig};
use folio::output::{self, ConsoleNotifier};
use folio::render;
use folio::resolve::{MediaInput, MediaUpload};
use folio::store::{JsonStore, LocalObjectStorage};
use folio::tags::parse_tech_list;
use folio::types::{Notice, ProjectDraft, RecordId, Role};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio catalog and landing page generator")]
#[command(long_about = "\
Portfolio catalog and landing page generator

Projects, the contact link and the profile picture live in a JSON record
store; uploaded files live in a media directory with one subdirectory per
bucket. `folio render` turns the catalog into a static landing page.

Media strings are classified when rendered:
  YouTube     youtube.com/watch?v=… or youtu.be/…   → player frame
  Vimeo       vimeo.com/…                           → player frame
  Video file  ….mp4 / ….webm / ….ogg                → <video>
  Anything    else                                  → <img>

Commands that change the catalog require a user with the admin role,
given with --as or FOLIO_USER.

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Path to folio.toml
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Acting user for admin commands
    #[arg(long = "as", env = "FOLIO_USER", global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show how a media string is classified and embedded
    Classify {
        /// Pasted link or uploaded file URL
        url: String,
    },
    /// Render the public landing page
    Render {
        /// Output directory (default: [output] dir from config)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also render the admin project list (admin only)
        #[arg(long)]
        admin: bool,
    },
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage site settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Grant a role to a user in the record store
    GrantRole {
        user: String,
        #[arg(long, default_value = "admin")]
        role: String,
    },
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

/// Media for a project form: an uploaded file beats a typed URL.
#[derive(clap::Args, Clone)]
struct MediaArgs {
    /// Media URL (YouTube, Vimeo, video file or image). Empty clears on edit.
    #[arg(long)]
    media_url: Option<String>,
    /// File to upload as the project's media
    #[arg(long)]
    media_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// List projects in display order
    List,
    /// Add a project at the end of the list
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Comma-separated technologies
        #[arg(long, default_value = "")]
        tech: String,
        /// Outbound link
        #[arg(long, default_value = "")]
        link: String,
        #[command(flatten)]
        media: MediaArgs,
    },
    /// Change a project; omitted fields keep their value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated technologies
        #[arg(long)]
        tech: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[command(flatten)]
        media: MediaArgs,
    },
    /// Delete a project
    Delete { id: String },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show the stored settings
    Show,
    /// Set the contact link
    Contact { link: String },
    /// Upload a new profile picture
    ProfileImage { file: PathBuf },
}

struct Backends {
    store: Arc<JsonStore>,
    storage: ObjectStorage,
}

impl Backends {
    async fn open(config: &FolioConfig, user: Option<&str>) -> CliResult<Self> {
        let mut store = JsonStore::open(&config.storage.records).await?;
        if let Some(user) = user {
            store = store.with_session(user);
        }
        let storage =
            LocalObjectStorage::open(&config.storage.media_dir, &config.storage.public_base_url)
                .await?;
        Ok(Self {
            store: Arc::new(store),
            storage,
        })
    }

    fn catalog(&self, config: &FolioConfig) -> Catalog {
        let records: RecordStore = self.store.clone();
        Catalog::new(records, self.storage.clone(), config.storage.buckets())
    }

    async fn dashboard(&self, config: &FolioConfig) -> Result<AdminDashboard, Redirect> {
        let sessions: Arc<dyn SessionProvider> = self.store.clone();
        let notifier: Arc<dyn NotificationSink> = Arc::new(ConsoleNotifier);
        AdminDashboard::open(sessions, self.catalog(config), notifier).await
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> CliResult<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let user = cli.user.as_deref();

    let ok = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            true
        }
        Command::Classify { url } => {
            output::print_classification(&url);
            true
        }
        Command::Render { output, admin } => {
            let (config, backends) = open(&cli.config, user).await?;
            let output_dir = output.unwrap_or_else(|| config.output.dir.clone());
            run_render(&config, &backends, &output_dir, admin).await?
        }
        Command::GrantRole { user: grantee, role } => {
            let (_, backends) = open(&cli.config, user).await?;
            let role = if role == "admin" {
                Role::Admin
            } else {
                Role::Other(role)
            };
            backends.store.set_role(&grantee, role.clone()).await?;
            tracing::info!(user = %grantee, ?role, "role granted");
            true
        }
        Command::Project(command) => {
            let (config, backends) = open(&cli.config, user).await?;
            run_project_command(&config, &backends, command).await?
        }
        Command::Settings(command) => {
            let (config, backends) = open(&cli.config, user).await?;
            run_settings_command(&config, &backends, command).await?
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn open(config_path: &Path, user: Option<&str>) -> CliResult<(FolioConfig, Backends)> {
    let config = config::load_config(config_path)?;
    let backends = Backends::open(&config, user).await?;
    Ok((config, backends))
}

async fn run_render(
    config: &FolioConfig,
    backends: &Backends,
    output_dir: &Path,
    admin: bool,
) -> CliResult<bool> {
    if !admin {
        let mut catalog = backends.catalog(config);
        if let Err(err) = catalog.load().await {
            ConsoleNotifier.notify(Notice::error(err.to_string()));
        }
        let landing =
            render::write_landing_page(config, catalog.projects(), catalog.settings(), output_dir)?;
        output::print_render_output(&[("Landing page", landing.as_path())]);
        return Ok(true);
    }

    let Some(dashboard) = self::admin(config, backends).await else {
        return Ok(false);
    };
    let catalog = dashboard.catalog();
    let landing =
        render::write_landing_page(config, catalog.projects(), catalog.settings(), output_dir)?;
    let admin_page =
        render::write_admin_page(config, catalog.projects(), catalog.settings(), output_dir)?;
    output::print_render_output(&[
        ("Landing page", landing.as_path()),
        ("Admin list", admin_page.as_path()),
    ]);
    Ok(true)
}

async fn run_settings_command(
    config: &FolioConfig,
    backends: &Backends,
    command: SettingsCommand,
) -> CliResult<bool> {
    match command {
        SettingsCommand::Show => {
            let mut catalog = backends.catalog(config);
            catalog.load().await?;
            output::print_settings(catalog.settings());
            Ok(true)
        }
        SettingsCommand::Contact { link } => {
            let Some(mut dashboard) = admin(config, backends).await else {
                return Ok(false);
            };
            Ok(dashboard.update_contact_link(&link).await)
        }
        SettingsCommand::ProfileImage { file } => {
            let Some(mut dashboard) = admin(config, backends).await else {
                return Ok(false);
            };
            let upload = read_upload(&file).await?;
            Ok(dashboard.upload_profile_image(&upload).await.is_some())
        }
    }
}

/// Open the admin dashboard, turning a gate redirect into a terminal message.
async fn admin(config: &FolioConfig, backends: &Backends) -> Option<AdminDashboard> {
    match backends.dashboard(config).await {
        Ok(dashboard) => Some(dashboard),
        Err(Redirect::Login) => {
            eprintln!("Not signed in: pass --as <user> or set FOLIO_USER");
            None
        }
        Err(Redirect::Home) => None,
    }
}

async fn run_project_command(
    config: &FolioConfig,
    backends: &Backends,
    command: ProjectCommand,
) -> CliResult<bool> {
    match command {
        ProjectCommand::List => {
            let mut catalog = backends.catalog(config);
            catalog.load().await?;
            output::print_project_list(catalog.projects());
            Ok(true)
        }
        ProjectCommand::Add {
            title,
            description,
            tech,
            link,
            media,
        } => {
            let Some(mut dashboard) = admin(config, backends).await else {
                return Ok(false);
            };
            let draft = ProjectDraft {
                title,
                description,
                tech,
                link,
            };
            let media = media_input(media).await?;
            match dashboard.add_project(draft, media).await {
                Some(project) => {
                    println!("{}", project.id);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        ProjectCommand::Edit {
            id,
            title,
            description,
            tech,
            link,
            media,
        } => {
            let Some(mut dashboard) = admin(config, backends).await else {
                return Ok(false);
            };
            let id = RecordId::new(id);
            let Some(mut edit) = dashboard.edit_form(&id) else {
                eprintln!("No project with id {id}");
                return Ok(false);
            };
            if let Some(title) = title {
                edit.title = title;
            }
            if let Some(description) = description {
                edit.description = description;
            }
            if let Some(tech) = tech {
                edit.tech = parse_tech_list(&tech);
            }
            if let Some(link) = link {
                edit.link = link;
            }
            let media = media_input(media).await?;
            Ok(dashboard.update_project(edit, media).await)
        }
        ProjectCommand::Delete { id } => {
            let Some(mut dashboard) = admin(config, backends).await else {
                return Ok(false);
            };
            Ok(dashboard.delete_project(&RecordId::new(id)).await)
        }
    }
}

async fn media_input(args: MediaArgs) -> CliResult<MediaInput> {
    let upload = match &args.media_file {
        Some(path) => Some(read_upload(path).await?),
        None => None,
    };
    Ok(MediaInput {
        upload,
        url: args.media_url,
    })
}

async fn read_upload(path: &Path) -> CliResult<MediaUpload> {
    let data = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(MediaUpload::new(name, data))
}
