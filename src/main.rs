//! Theme CLI - light/dark theme management for recovery-house dashboards.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use rtheme::cli::{self, Cli, Commands, MemberCommands};
use rtheme::config::AppConfig;
use rtheme::context::{CssVariables, FileLocalPreferences, ThemeContext, apply_theme};
use rtheme::editor::{COLOR_CATEGORIES, PhonePreview, ThemeEditor};
use rtheme::error::{Result, ResultExt, ThemeError};
use rtheme::logging::init_logging;
use rtheme::output::{ActiveTheme, Output, OutputMode, ThemeSummary, VersionInfo};
use rtheme::service::{Session, ThemeService, export_file_name};
use rtheme::store::{SqliteThemeStore, ThemeStore};
use rtheme::theme::{ColorKey, Theme, ThemeMode, convert_to_native_theme, default_theme};

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

/// Id accepted on the command line for the built-in theme.
const DEFAULT_ID: &str = "default";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let out = OutputMode::from_cli(&cli).into_output(cli.quiet);

    if let Err(e) = run(&cli, out.as_ref()) {
        out.error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, out: &dyn Output) -> Result<()> {
    let Some(command) = &cli.command else {
        print_quick_start(cli);
        return Ok(());
    };

    match command {
        Commands::Version => return cmd_version(out),
        Commands::Completions(args) => return cmd_completions(args),
        _ => {}
    }

    let app = App::open(cli)?;
    match command {
        Commands::List => cmd_list(&app, out),
        Commands::Show(args) => cmd_show(&app, out, args),
        Commands::New(args) => cmd_new(&app, out, args),
        Commands::SetColor(args) => cmd_set_color(&app, out, args),
        Commands::Delete(args) => cmd_delete(&app, out, args),
        Commands::Share(args) => cmd_share(&app, out, args),
        Commands::Use(args) => cmd_use(&app, out, args),
        Commands::ToggleDark => cmd_toggle_dark(&app, out),
        Commands::Active => cmd_active(&app, out),
        Commands::ApplyOrg(args) => cmd_apply_org(&app, out, args),
        Commands::Export(args) => cmd_export(&app, out, args),
        Commands::Import(args) => cmd_import(&app, out, args),
        Commands::Css(args) => cmd_css(&app, out, args),
        Commands::Native(args) => cmd_native(&app, out, args),
        Commands::Categories(args) => cmd_categories(&app, out, args),
        Commands::Preview(args) => cmd_preview(&app, out, args),
        Commands::Member(MemberCommands::Add(args)) => cmd_member_add(&app, out, args),
        Commands::Version | Commands::Completions(_) => Ok(()),
    }
}

// === Wiring ===

/// Resolved configuration plus the opened store.
struct App {
    config: AppConfig,
    store: Arc<SqliteThemeStore>,
    session: Session,
}

impl App {
    fn open(cli: &Cli) -> Result<Self> {
        let mut config = AppConfig::load(cli.config.as_deref())?.with_env_overrides()?;
        if let Some(db) = &cli.db {
            config.database_path = Some(db.clone());
        }
        if let Some(user) = &cli.user {
            config.user_id = Some(user.clone());
        }

        let db_path = config.database_path()?;
        debug!(db = %db_path.display(), user = ?config.user_id, "Opening theme store");
        let store = Arc::new(SqliteThemeStore::open(&db_path)?);
        let session = config
            .user_id
            .clone()
            .map_or_else(Session::anonymous, Session::authenticated);

        Ok(Self {
            config,
            store,
            session,
        })
    }

    fn service(&self) -> ThemeService {
        let store: Arc<dyn ThemeStore> = self.store.clone();
        ThemeService::new(store, self.session.clone())
    }

    /// Context initialized from stored or local preferences.
    fn context(&self) -> ThemeContext {
        let local = FileLocalPreferences::new(self.config.local_preferences_path());
        let mut ctx = ThemeContext::new(self.service(), Box::new(local), CssVariables::new())
            .with_default_mode(ThemeMode::from_dark(self.config.default_dark_mode));
        ctx.init();
        ctx
    }

    /// Looks up `id`, where [`DEFAULT_ID`] names the built-in theme.
    fn resolve_theme(&self, service: &ThemeService, id: &str) -> Result<Theme> {
        if id == DEFAULT_ID {
            return Ok(default_theme());
        }
        service
            .get_theme_by_id(id)?
            .ok_or_else(|| ThemeError::NotFound {
                what: format!("theme '{id}'"),
            })
    }
}

fn active_of(ctx: &ThemeContext) -> ActiveTheme {
    let theme = ctx.current_theme();
    ActiveTheme {
        theme_id: theme.id.clone(),
        name: theme.name.clone(),
        mode: ctx.mode(),
        root_class: ctx.mode().css_class(),
        signed_in: ctx.service().session().is_authenticated(),
    }
}

/// `--dark` forces dark; otherwise the active mode is used.
fn requested_mode(ctx: &ThemeContext, dark: bool) -> ThemeMode {
    if dark { ThemeMode::Dark } else { ctx.mode() }
}

// === Quick Start ===

fn print_quick_start(cli: &Cli) {
    if cli.use_json() {
        let help = serde_json::json!({
            "tool": "rtheme",
            "version": build_info::VERSION,
            "description": "Light/dark theme management with robot mode for agents",
            "themes": {
                "list": "rtheme list --robot",
                "show": "rtheme show <ID|default>",
                "create": "rtheme new <NAME>",
                "edit": "rtheme set-color <ID> <KEY> <VALUE> [--dark]",
                "delete": "rtheme delete <ID>",
            },
            "active": {
                "use": "rtheme use <ID|default> [--dark]",
                "toggle": "rtheme toggle-dark",
                "organization": "rtheme apply-org <ID>",
            },
            "identity": "Pass --user <ID> or set RTHEME_USER",
            "output_modes": {
                "human": "--format=text (default)",
                "robot": "--robot or --format=json",
                "compact": "--format=json-compact",
            },
        });
        if let Ok(json) = serde_json::to_string_pretty(&help) {
            println!("{json}");
        }
        return;
    }

    let cmd = console::Style::new().green();
    println!(
        "{} {} - theme manager\n",
        console::style("rtheme").bold().cyan(),
        build_info::VERSION
    );
    println!("{}", console::style("QUICK START").bold().underlined());
    println!();
    println!("  {}  List themes", cmd.apply_to("rtheme list"));
    println!("  {}  Create a theme", cmd.apply_to("rtheme new \"Ocean\""));
    println!("  {}  Edit a color", cmd.apply_to("rtheme set-color <ID> primary '#0077be'"));
    println!("  {}  Activate a theme", cmd.apply_to("rtheme use <ID>"));
    println!("  {}  Flip light/dark", cmd.apply_to("rtheme toggle-dark"));
    println!("  {}  Print CSS variables", cmd.apply_to("rtheme css"));
    println!();
    println!("Run {} for full help", console::style("rtheme --help").yellow());
}

// === Command Implementations ===

fn cmd_list(app: &App, out: &dyn Output) -> Result<()> {
    let service = app.service();
    let themes = service.get_user_themes();
    let preference = service.get_user_active_theme();
    out.fallbacks(&service.take_fallbacks());
    out.theme_list(&ThemeSummary::from_themes(&themes, &preference));
    Ok(())
}

fn cmd_show(app: &App, out: &dyn Output, args: &cli::ShowArgs) -> Result<()> {
    let service = app.service();
    let theme = app.resolve_theme(&service, &args.id)?;
    out.theme_detail(&theme, args.dark.then_some(ThemeMode::Dark));
    Ok(())
}

fn cmd_new(app: &App, out: &dyn Output, args: &cli::NewArgs) -> Result<()> {
    let service = app.service();
    let saved = if args.organization {
        service.save_organization_theme(&Theme::new_from_default(args.name.trim()))?
    } else {
        let mut editor = ThemeEditor::new(&service);
        editor.new_theme();
        editor.rename(args.name.as_str());
        editor.save()?
    };
    out.theme_saved(&saved, true);
    Ok(())
}

fn cmd_set_color(app: &App, out: &dyn Output, args: &cli::SetColorArgs) -> Result<()> {
    let key: ColorKey = args.key.parse()?;
    let service = app.service();

    let mut editor = ThemeEditor::new(&service);
    editor.load();
    editor.select(Some(&args.id))?;
    editor.set_tab(ThemeMode::from_dark(args.dark));
    editor.set_color(key, &args.value)?;
    let saved = editor.save()?;
    out.theme_saved(&saved, false);
    Ok(())
}

fn cmd_delete(app: &App, out: &dyn Output, args: &cli::DeleteArgs) -> Result<()> {
    if args.id == DEFAULT_ID {
        return Err(ThemeError::DefaultThemeProtected);
    }
    let removed = app.service().delete_theme(&args.id)?;
    out.theme_deleted(&args.id, removed);
    Ok(())
}

fn cmd_share(app: &App, out: &dyn Output, args: &cli::ShareArgs) -> Result<()> {
    let copy = app.service().share_theme(&args.id, &args.user)?;
    out.theme_shared(&copy, &args.user);
    Ok(())
}

fn cmd_use(app: &App, out: &dyn Output, args: &cli::UseArgs) -> Result<()> {
    let mut ctx = app.context();
    if args.id != DEFAULT_ID
        && !ctx
            .available_themes()
            .iter()
            .any(|t| t.id.as_deref() == Some(args.id.as_str()))
    {
        return Err(ThemeError::NotFound {
            what: format!("theme '{}'", args.id),
        });
    }

    ctx.set_theme(&args.id)?;
    if ctx.is_dark_mode() != args.dark {
        ctx.toggle_dark_mode()?;
    }
    out.fallbacks(&ctx.service().take_fallbacks());
    out.active_theme(&active_of(&ctx));
    Ok(())
}

fn cmd_toggle_dark(app: &App, out: &dyn Output) -> Result<()> {
    let mut ctx = app.context();
    ctx.toggle_dark_mode()?;
    out.fallbacks(&ctx.service().take_fallbacks());
    out.active_theme(&active_of(&ctx));
    Ok(())
}

fn cmd_active(app: &App, out: &dyn Output) -> Result<()> {
    let ctx = app.context();
    out.fallbacks(&ctx.service().take_fallbacks());
    out.active_theme(&active_of(&ctx));
    Ok(())
}

fn cmd_apply_org(app: &App, out: &dyn Output, args: &cli::ApplyOrgArgs) -> Result<()> {
    let service = app.service();
    let runtime = tokio::runtime::Runtime::new().with_context(|| "Failed to start runtime")?;
    let report = runtime.block_on(service.apply_theme_to_organization(&args.id))?;
    out.fan_out(&report);
    Ok(())
}

fn cmd_export(app: &App, out: &dyn Output, args: &cli::ExportArgs) -> Result<()> {
    let service = app.service();
    let theme = app.resolve_theme(&service, &args.id)?;
    let text = service.export_theme(&theme);

    let Some(target) = &args.out else {
        println!("{text}");
        return Ok(());
    };

    let path = export_target(target, &theme);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, text)?;
    out.exported(&path, &theme);
    Ok(())
}

/// Directories receive the conventional file name.
fn export_target(target: &Path, theme: &Theme) -> PathBuf {
    if target.is_dir() {
        target.join(export_file_name(theme))
    } else {
        target.to_path_buf()
    }
}

fn cmd_import(app: &App, out: &dyn Output, args: &cli::ImportArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)?;
    let service = app.service();

    if args.save {
        let mut editor = ThemeEditor::new(&service);
        editor.import(&text)?;
        let saved = editor.save()?;
        out.theme_saved(&saved, true);
    } else {
        let theme = service.import_theme(&text);
        out.fallbacks(&service.take_fallbacks());
        out.theme_detail(&theme, None);
    }
    Ok(())
}

fn cmd_css(app: &App, out: &dyn Output, args: &cli::ModeArgs) -> Result<()> {
    let ctx = app.context();
    let mode = requested_mode(&ctx, args.dark);
    let css = if mode == ctx.mode() {
        ctx.styles().clone()
    } else {
        let mut css = CssVariables::new();
        apply_theme(&mut css, ctx.current_theme(), mode);
        css
    };
    out.fallbacks(&ctx.service().take_fallbacks());
    out.stylesheet(&css);
    Ok(())
}

fn cmd_native(app: &App, out: &dyn Output, args: &cli::ModeArgs) -> Result<()> {
    let ctx = app.context();
    let mode = requested_mode(&ctx, args.dark);
    out.fallbacks(&ctx.service().take_fallbacks());
    out.native_theme(&convert_to_native_theme(ctx.current_theme(), mode.is_dark()));
    Ok(())
}

fn cmd_categories(app: &App, out: &dyn Output, args: &cli::ModeArgs) -> Result<()> {
    let ctx = app.context();
    let mode = requested_mode(&ctx, args.dark);
    out.fallbacks(&ctx.service().take_fallbacks());
    out.categories(&COLOR_CATEGORIES, &ctx.current_theme().variant(mode).colors);
    Ok(())
}

fn cmd_preview(app: &App, out: &dyn Output, args: &cli::ModeArgs) -> Result<()> {
    let ctx = app.context();
    let mode = requested_mode(&ctx, args.dark);
    out.fallbacks(&ctx.service().take_fallbacks());
    out.preview(&PhonePreview::new(&ctx.current_theme().variant(mode).colors));
    Ok(())
}

fn cmd_member_add(app: &App, out: &dyn Output, args: &cli::MemberAddArgs) -> Result<()> {
    app.store
        .add_member(&args.organization, &args.user, args.role)?;
    out.member_added(&args.organization, &args.user, args.role);
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(out: &dyn Output) -> Result<()> {
    out.version_info(&VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty() == "true",
        build_timestamp: build_info::build_timestamp(),
        rustc_version: build_info::rustc_semver(),
        target: build_info::target(),
    });
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "rtheme", &mut io::stdout());
    Ok(())
}
