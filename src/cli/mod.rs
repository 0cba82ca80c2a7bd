//! `quincena_cli`: a thin command-line surface over the engine, storage and reports.

pub mod output;
pub mod render;
pub mod table;

use std::{env, fs::File, io::BufWriter, path::PathBuf};

use crate::{
    config::{Config, ConfigManager},
    errors::{PlanError, Result},
    plan::TransactionKind,
    reporting::{export, filter_periods, summarize, TransactionFilter},
    simulation::SimulationEngine,
    storage::{load_profile_or_default, share, JsonStorage, Profile, ProfileStore},
    utils::build_info,
};

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Project { profile: Option<PathBuf> },
    Timeline { profile: Option<PathBuf> },
    Transactions {
        profile: Option<PathBuf>,
        filter: TransactionFilter,
    },
    Export {
        profile: Option<PathBuf>,
        output: PathBuf,
    },
    Share { profile: Option<PathBuf> },
    Open { code: String },
    Defaults,
    ProfileSave {
        name: String,
        source: Option<PathBuf>,
    },
    ProfileLoad { name: String },
    ProfileList,
    ProfileBackup {
        name: String,
        note: Option<String>,
    },
    ProfileBackups { name: String },
    ProfileRestore { name: String, backup: String },
    ConfigShow,
    ConfigSet { key: String, value: String },
    Version,
    Help,
}

pub fn run_cli() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(err) => {
            print_usage();
            return Err(err);
        }
    };
    execute(command)
}

pub fn parse_args(args: &[String]) -> Result<Command> {
    let mut args = args.iter().map(String::as_str);
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };
    let rest: Vec<&str> = args.collect();

    let command = match command {
        "project" => Command::Project {
            profile: optional_path(&rest)?,
        },
        "timeline" => Command::Timeline {
            profile: optional_path(&rest)?,
        },
        "transactions" => parse_transactions(&rest)?,
        "export" => match rest.as_slice() {
            [profile, output] => Command::Export {
                profile: (*profile != "-").then(|| PathBuf::from(*profile)),
                output: PathBuf::from(*output),
            },
            _ => return Err(usage_error("export needs <profile.json|-> <out.csv>")),
        },
        "share" => Command::Share {
            profile: optional_path(&rest)?,
        },
        "open" => match rest.as_slice() {
            [code] => Command::Open {
                code: code.to_string(),
            },
            _ => return Err(usage_error("open needs exactly one share code")),
        },
        "defaults" => Command::Defaults,
        "profile" => match rest.as_slice() {
            ["save", name] => Command::ProfileSave {
                name: name.to_string(),
                source: None,
            },
            ["save", name, source] => Command::ProfileSave {
                name: name.to_string(),
                source: Some(PathBuf::from(*source)),
            },
            ["load", name] => Command::ProfileLoad {
                name: name.to_string(),
            },
            ["list"] => Command::ProfileList,
            ["backup", name] => Command::ProfileBackup {
                name: name.to_string(),
                note: None,
            },
            ["backup", name, note] => Command::ProfileBackup {
                name: name.to_string(),
                note: Some(note.to_string()),
            },
            ["backups", name] => Command::ProfileBackups {
                name: name.to_string(),
            },
            ["restore", name, backup] => Command::ProfileRestore {
                name: name.to_string(),
                backup: backup.to_string(),
            },
            _ => {
                return Err(usage_error(
                    "profile needs save|load|list|backup|backups|restore",
                ))
            }
        },
        "config" => match rest.as_slice() {
            [] | ["show"] => Command::ConfigShow,
            ["set", key, value] => Command::ConfigSet {
                key: key.to_string(),
                value: value.to_string(),
            },
            _ => return Err(usage_error("config needs show or set <key> <value>")),
        },
        "version" | "--version" | "-V" => Command::Version,
        "help" | "--help" | "-h" => Command::Help,
        other => return Err(usage_error(&format!("unknown command `{other}`"))),
    };
    Ok(command)
}

fn parse_transactions(rest: &[&str]) -> Result<Command> {
    let mut filter = TransactionFilter::default();
    let mut profile = None;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--kind" => {
                let value = iter
                    .next()
                    .ok_or_else(|| usage_error("--kind needs a value"))?;
                let kind = TransactionKind::parse(value).ok_or_else(|| {
                    usage_error(&format!(
                        "unknown kind `{value}` (expected one of: {})",
                        TransactionKind::ALL
                            .iter()
                            .map(|kind| kind.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                })?;
                filter = filter.kind(kind);
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| usage_error("--search needs a value"))?;
                filter = filter.search(*value);
            }
            path if profile.is_none() && !path.starts_with("--") => {
                profile = Some(PathBuf::from(path));
            }
            other => return Err(usage_error(&format!("unexpected argument `{other}`"))),
        }
    }
    Ok(Command::Transactions { profile, filter })
}

fn optional_path(rest: &[&str]) -> Result<Option<PathBuf>> {
    match rest {
        [] => Ok(None),
        [path] => Ok(Some(PathBuf::from(path))),
        _ => Err(usage_error("expected at most one profile path")),
    }
}

fn usage_error(message: &str) -> PlanError {
    PlanError::InvalidInput(message.to_string())
}

pub fn execute(command: Command) -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default();
    let locale = config.locale_config();

    match command {
        Command::Project { profile } => {
            let profile = resolve_profile(profile, &config)?;
            let periods = SimulationEngine::project(&profile)?;
            let summary = summarize(&profile.configuration, &periods);
            output::section(format!(
                "{} ({}, {} periods)",
                profile.name, profile.start, profile.periods
            ));
            println!("{}", render::summary_table(&summary, &locale));
            output::section("Debts");
            println!(
                "{}",
                render::debts_table(&profile.configuration, &summary, &locale)
            );
            output::section("Goals");
            println!(
                "{}",
                render::goals_table(&profile.configuration, &summary, &locale)
            );
            output::section("Debt trend");
            println!("{}", render::trend_table(&periods));
            output::section("Monthly savings");
            println!("{}", render::savings_table(&periods, &locale));
            for goal in &summary.lapsed_goals {
                output::warning(format!("goal `{goal}` lapsed with an unpaid balance"));
            }
            for date in &summary.shortfall_periods {
                output::warning(format!("{date}: fixed expenses exceed income"));
            }
        }
        Command::Timeline { profile } => {
            let profile = resolve_profile(profile, &config)?;
            for period in SimulationEngine::project(&profile)? {
                output::section(format!("{} · {}", period.date, period.date.day.title()));
                println!("{}", render::period_table(&period, &locale));
            }
        }
        Command::Transactions { profile, filter } => {
            let profile = resolve_profile(profile, &config)?;
            let periods = SimulationEngine::project(&profile)?;
            let listings = filter_periods(&periods, &filter);
            if listings.is_empty() {
                output::info("No transactions match the filter.");
            }
            for listing in &listings {
                output::section(format!("{} · {}", listing.date, listing.title));
                println!("{}", render::listing_table(listing, &locale));
            }
            output::info(format!("Showing {} periods", listings.len()));
        }
        Command::Export {
            profile,
            output: destination,
        } => {
            let profile = resolve_profile(profile, &config)?;
            let periods = SimulationEngine::project(&profile)?;
            let file = File::create(&destination)?;
            export::write_csv(&periods, BufWriter::new(file))?;
            output::success(format!(
                "Exported {} periods to {}",
                periods.len(),
                destination.display()
            ));
        }
        Command::Share { profile } => {
            let profile = resolve_profile(profile, &config)?;
            println!("{}", share::encode(&profile)?);
        }
        Command::Open { code } => {
            let profile = share::decode_or_default(&code);
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Defaults => {
            println!("{}", serde_json::to_string_pretty(&default_profile(&config))?);
        }
        Command::ProfileSave { name, source } => {
            let profile = resolve_profile(source, &config)?;
            let storage = JsonStorage::new_default()?;
            storage.save(&profile, &name)?;
            storage.record_last_profile(Some(&name))?;
            output::success(format!("Saved profile `{name}`"));
        }
        Command::ProfileLoad { name } => {
            let storage = JsonStorage::new_default()?;
            let profile = storage.load_or_default(&name)?;
            storage.record_last_profile(Some(&name))?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::ProfileList => {
            let storage = JsonStorage::new_default()?;
            let last = storage.last_profile()?;
            let names = storage.list()?;
            if names.is_empty() {
                output::info("No saved profiles.");
            }
            for name in names {
                let marker = if last.as_deref() == Some(name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {name}");
            }
        }
        Command::ProfileBackup { name, note } => {
            let storage = JsonStorage::new_default()?;
            let profile = storage.load_or_default(&name)?;
            let backup = storage.backup(&profile, &name, note.as_deref())?;
            output::success(format!("Backed up `{name}` as {backup}"));
        }
        Command::ProfileBackups { name } => {
            let storage = JsonStorage::new_default()?;
            let backups = storage.list_backups(&name)?;
            if backups.is_empty() {
                output::info(format!("No backups for `{name}`."));
            }
            for backup in backups {
                println!("{backup}");
            }
        }
        Command::ProfileRestore { name, backup } => {
            let storage = JsonStorage::new_default()?;
            let profile = storage.restore(&name, &backup)?;
            storage.record_last_profile(Some(&name))?;
            output::success(format!(
                "Restored `{name}` from {backup} ({} periods)",
                profile.periods
            ));
        }
        Command::ConfigShow => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::ConfigSet { key, value } => {
            let mut config = config;
            config.set(&key, &value)?;
            manager.save(&config)?;
            output::success(format!("Set {key} in {}", manager.path().display()));
        }
        Command::Version => println!("{}", build_info::current().summary()),
        Command::Help => print_usage(),
    }
    Ok(())
}

fn default_profile(config: &Config) -> Profile {
    Profile {
        periods: config.default_periods,
        ..Profile::default()
    }
}

fn resolve_profile(path: Option<PathBuf>, config: &Config) -> Result<Profile> {
    match path {
        Some(path) => load_profile_or_default(&path),
        None => Ok(default_profile(config)),
    }
}

fn print_usage() {
    eprintln!(
        "Usage: quincena_cli <command>\n\
         Commands:\n  \
         project [profile.json]\n  \
         timeline [profile.json]\n  \
         transactions [--kind K] [--search S] [profile.json]\n  \
         export <profile.json|-> <out.csv>\n  \
         share [profile.json]\n  \
         open <code>\n  \
         defaults\n  \
         profile save <name> [profile.json]\n  \
         profile load <name>\n  \
         profile list\n  \
         profile backup <name> [note]\n  \
         profile backups <name>\n  \
         profile restore <name> <backup>\n  \
         config [show]\n  \
         config set <key> <value>\n  \
         version"
    );
}
