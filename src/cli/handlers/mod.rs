mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use chrono::NaiveDate;
use regex::Regex;
use uuid::Uuid;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::state::{read_app_state, write_app_state};
use crate::io::store::{self, StoreError, load_store, save_store};
use crate::model::filter::FilterState;
use crate::model::task::{Color, Schedule, Task, TaskDraft, Weekday};
use crate::ops::catalog_ops::{find_task, resolve_task_ref};
use crate::ops::ledger_ops::day_of;
use crate::ops::stats::progress;
use crate::screen::{Screen, ViewUpdate};
use crate::util::locale::Locale;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Settings shared by every command
struct Context {
    data_dir: PathBuf,
    json: bool,
    date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let data_dir = store::resolve_data_dir(cli.data_dir.as_deref())?;
    let date = cli.date.as_deref().map(parse_date).transpose()?;
    let ctx = Context {
        data_dir,
        json: cli.json,
        date,
    };
    tracing::debug!(dir = %ctx.data_dir.display(), "data directory");

    match cli.command {
        Commands::Init(args) => cmd_init(args, &ctx.data_dir),

        // Read commands
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Search(args) => cmd_search(&ctx, args),
        Commands::Categories => cmd_categories(&ctx),
        Commands::Stats => cmd_stats(&ctx),

        // Write commands
        Commands::Category(cmd) => match cmd.action {
            CategoryAction::Add { title } => cmd_category_add(&ctx, &title),
        },
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Edit(args) => cmd_edit(&ctx, args),
        Commands::Delete(args) => cmd_delete(&ctx, &args.id),
        Commands::Pin(args) => cmd_pin(&ctx, &args.id, true),
        Commands::Unpin(args) => cmd_pin(&ctx, &args.id, false),
        Commands::Done(args) => cmd_done(&ctx, &args.id),
        Commands::Filter(args) => cmd_filter(&ctx, args),
        Commands::Locale(args) => cmd_locale(&ctx, &args.locale),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD", s))
}

/// Parse a weekday list like `mon,wed fri`
fn parse_days(s: &str) -> Result<Schedule, String> {
    let separator = Regex::new(r"[,\s]+").map_err(|e| e.to_string())?;
    let mut schedule = Schedule::new();
    for part in separator.split(s.trim()).filter(|p| !p.is_empty()) {
        let day = Weekday::from_tag(part)
            .ok_or_else(|| format!("unknown weekday '{}' (use mon, tue, ...)", part))?;
        schedule.insert(day);
    }
    if schedule.is_empty() {
        return Err("--days needs at least one weekday".to_string());
    }
    Ok(schedule)
}

fn parse_filter(s: &str) -> Result<FilterState, Box<dyn std::error::Error>> {
    Ok(s.parse::<FilterState>()?)
}

/// Lock an initialized data directory for writing
fn lock_data_dir(ctx: &Context) -> Result<FileLock, Box<dyn std::error::Error>> {
    if !store::is_initialized(&ctx.data_dir) {
        return Err(StoreError::NotInitialized(ctx.data_dir.clone()).into());
    }
    Ok(FileLock::acquire_default(&ctx.data_dir)?)
}

/// Load the store, state and config into a screen on the selected date
fn open_screen(ctx: &Context) -> Result<Screen, Box<dyn std::error::Error>> {
    let store = load_store(&ctx.data_dir)?;
    let state = read_app_state(&ctx.data_dir).unwrap_or_default();
    let (config, _doc) = config_io::read_config(&ctx.data_dir)?;
    let today = day_of(&chrono::Local::now());
    let mut screen = Screen::new(store, state, config, today);
    if let Some(date) = ctx.date {
        screen.set_date(date);
    }
    Ok(screen)
}

fn save_screen(ctx: &Context, screen: Screen) -> CmdResult {
    let (store, state, _config) = screen.into_parts();
    save_store(&ctx.data_dir, &store)?;
    write_app_state(&ctx.data_dir, &state)?;
    Ok(())
}

fn task_ref(screen: &Screen, reference: &str) -> Result<(Uuid, Task), Box<dyn std::error::Error>> {
    let catalog = screen.store().catalog();
    let id = resolve_task_ref(catalog, reference)?;
    let task = find_task(catalog, id)
        .cloned()
        .ok_or_else(|| format!("not found: {}", reference))?;
    Ok((id, task))
}

fn print_list(ctx: &Context, screen: &Screen) -> CmdResult {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&list_to_json(screen))?);
    } else {
        for line in format_screen(screen) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Confirmation line, then the view update
fn print_update(ctx: &Context, screen: &Screen, update: &ViewUpdate, message: &str) -> CmdResult {
    if ctx.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&update_to_json(screen, update))?
        );
        return Ok(());
    }
    println!("{}", message);
    println!("{}", format_update(&update.reconciliation));
    for line in format_screen(screen) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let mut screen = open_screen(ctx)?;
    if let Some(filter) = args.filter.as_deref() {
        // one-off: not persisted
        screen.choose_filter(parse_filter(filter)?);
    }
    print_list(ctx, &screen)
}

fn cmd_search(ctx: &Context, args: SearchArgs) -> CmdResult {
    let mut screen = open_screen(ctx)?;
    screen.set_search(&args.query);
    print_list(ctx, &screen)
}

fn cmd_categories(ctx: &Context) -> CmdResult {
    let store = load_store(&ctx.data_dir)?;
    if ctx.json {
        let cats = categories_to_json(store.catalog());
        println!("{}", serde_json::to_string_pretty(&cats)?);
    } else {
        for line in format_categories(store.catalog()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_stats(ctx: &Context) -> CmdResult {
    let screen = open_screen(ctx)?;
    let store = screen.store();
    let progress = progress(store.catalog(), store.ledger());
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
    } else {
        for line in format_progress(&progress, screen.locale()) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_category_add(ctx: &Context, title: &str) -> CmdResult {
    let _lock = lock_data_dir(ctx)?;
    let mut screen = open_screen(ctx)?;
    let (title, update) = screen.add_category(title)?;
    print_update(ctx, &screen, &update, &format!("added category: {}", title))?;
    save_screen(ctx, screen)
}

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let _lock = lock_data_dir(ctx)?;
    let mut screen = open_screen(ctx)?;

    let draft = TaskDraft {
        name: args.name,
        color: args.color.parse::<Color>()?,
        emoji: args.emoji,
        schedule: match args.days.as_deref() {
            Some(days) => parse_days(days)?,
            None => Schedule::new(),
        },
    };
    let (task, update) = screen.add_task(&args.category, &draft)?;
    let message = format!(
        "added {} {}: {} {}",
        task.kind(),
        screen.config().ui.noun,
        task.name,
        task.short_id()
    );
    print_update(ctx, &screen, &update, &message)?;
    save_screen(ctx, screen)
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let _lock = lock_data_dir(ctx)?;
    let mut screen = open_screen(ctx)?;
    let (id, task) = task_ref(&screen, &args.id)?;

    let mut draft = TaskDraft::from_task(&task);
    if let Some(name) = args.name {
        draft.name = name;
    }
    if let Some(emoji) = args.emoji {
        draft.emoji = emoji;
    }
    if let Some(color) = args.color.as_deref() {
        draft.color = color.parse()?;
    }
    if let Some(days) = args.days.as_deref() {
        draft.schedule = parse_days(days)?;
    }
    if args.event {
        draft.schedule.clear();
    }

    let (outcome, update) = screen.edit_task(id, &draft, args.category.as_deref())?;
    let mut message = format!(
        "updated {}: {} ({})",
        screen.config().ui.noun,
        outcome.task.name,
        outcome.category
    );
    if outcome.kind_changed {
        message.push_str(&format!("; now {}, history cleared", outcome.task.kind()));
    }
    print_update(ctx, &screen, &update, &message)?;
    save_screen(ctx, screen)
}

fn cmd_delete(ctx: &Context, reference: &str) -> CmdResult {
    let _lock = lock_data_dir(ctx)?;
    let mut screen = open_screen(ctx)?;
    let (id, _) = task_ref(&screen, reference)?;
    let (task, update) = screen.delete_task(id)?;
    let message = format!("deleted {}: {}", screen.config().ui.noun, task.name);
    print_update(ctx, &screen, &update, &message)?;
    save_screen(ctx, screen)
}

fn cmd_pin(ctx: &Context, reference: &str, pin: bool) -> CmdResult {
    let _lock = lock_data_dir(ctx)?;
    let mut screen = open_screen(ctx)?;
    let (id, _) = task_ref(&screen, reference)?;
    let (task, update) = if pin {
        screen.pin(id)?
    } else {
        screen.unpin(id)?
    };
    let verb = if pin { "pinned" } else { "unpinned" };
    print_update(ctx, &screen, &update, &format!("{}: {}", verb, task.name))?;
    save_screen(ctx, screen)
}

fn cmd_done(ctx: &Context, reference: &str) -> CmdResult {
    let _lock = lock_data_dir(ctx)?;
    let mut screen = open_screen(ctx)?;
    let (id, task) = task_ref(&screen, reference)?;
    let (record, update) = screen.toggle(id)?;
    let date = screen.date();
    let done = record.is_some_and(|r| r.dates.contains(&date));
    let message = format!(
        "{}: {} on {} ({})",
        if done { "done" } else { "not done" },
        task.name,
        date,
        screen.days_label(id)
    );
    print_update(ctx, &screen, &update, &message)?;
    save_screen(ctx, screen)
}

fn cmd_filter(ctx: &Context, args: FilterArgs) -> CmdResult {
    let Some(filter) = args.filter.as_deref() else {
        let state = read_app_state(&ctx.data_dir).unwrap_or_default();
        if ctx.json {
            println!(
                "{}",
                serde_json::json!({ "filter": state.filter().key() })
            );
        } else {
            println!("{}", state.filter());
        }
        return Ok(());
    };

    let filter = parse_filter(filter)?;
    let _lock = lock_data_dir(ctx)?;
    let mut screen = open_screen(ctx)?;
    let update = screen.choose_filter(filter);
    print_update(ctx, &screen, &update, &format!("filter: {}", filter))?;
    save_screen(ctx, screen)
}

fn cmd_locale(ctx: &Context, locale: &str) -> CmdResult {
    let locale: Locale = locale.parse()?;
    let _lock = lock_data_dir(ctx)?;
    let mut screen = open_screen(ctx)?;

    let (_config, mut doc) = config_io::read_config(&ctx.data_dir)?;
    config_io::set_locale(&mut doc, locale);
    config_io::write_config(&ctx.data_dir, &doc)?;

    let update = screen.set_locale(locale);
    print_update(ctx, &screen, &update, &format!("locale: {}", locale))?;
    save_screen(ctx, screen)
}
