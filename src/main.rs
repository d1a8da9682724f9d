use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use meetclock::app::{self, RunOptions};
use meetclock::commands::{self, NewPreset, PresetChanges, Setting};
use meetclock::error::AppError;
use meetclock::logging;
use meetclock_core::ConfigSource;
use meetclock_core::config::config_dir;
use meetclock_core::types::ShortcutAction;

#[derive(Debug, Parser)]
#[command(version, about = "Countdown timer overlay for meetings")]
struct Cli {
    /// Use this config file instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the timer window (default)
    Run(RunArgs),
    /// Show, locate or reset the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage countdown presets
    #[command(subcommand)]
    Preset(PresetCommand),
    /// Manage global keyboard shortcuts
    #[command(subcommand)]
    Shortcut(ShortcutCommand),
    /// Change a single setting
    #[command(subcommand)]
    Set(Setting),
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Preset to load, by index or name
    #[arg(long)]
    preset: Option<String>,
    /// Start in simple (readout only) mode
    #[arg(long)]
    simple: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    Show,
    Path,
    Reset,
}

#[derive(Debug, Subcommand)]
enum PresetCommand {
    List,
    Add(NewPreset),
    Edit {
        index: usize,
        #[command(flatten)]
        changes: PresetChanges,
    },
    Remove {
        index: usize,
    },
    /// Load presets from a JSON list
    Import {
        file: PathBuf,
        /// Keep the existing presets
        #[arg(long)]
        append: bool,
    },
    /// Write the presets as a JSON list
    Export {
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum ShortcutCommand {
    List,
    /// Bind ACTION to a key sequence such as "ctrl+shift+s"
    Set {
        action: ShortcutAction,
        keys: String,
    },
    Clear {
        action: ShortcutAction,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let source = ConfigSource::from_arg(cli.config);

    let result = match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => {
            let _guard = logging::init(config_dir(&source).as_deref());
            app::run(
                source,
                RunOptions {
                    preset: args.preset,
                    simple: args.simple,
                },
            )
        }
        command => {
            logging::init_cli();
            dispatch(&source, command)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

fn dispatch(source: &ConfigSource, command: Command) -> Result<(), AppError> {
    match command {
        Command::Run(_) => Ok(()),
        Command::Config(ConfigCommand::Show) => commands::config_show(source),
        Command::Config(ConfigCommand::Path) => commands::config_path(source),
        Command::Config(ConfigCommand::Reset) => commands::config_reset(source),
        Command::Preset(PresetCommand::List) => commands::preset_list(source),
        Command::Preset(PresetCommand::Add(new)) => commands::preset_add(source, new),
        Command::Preset(PresetCommand::Edit { index, changes }) => {
            commands::preset_edit(source, index, changes)
        }
        Command::Preset(PresetCommand::Remove { index }) => commands::preset_remove(source, index),
        Command::Preset(PresetCommand::Import { file, append }) => {
            commands::preset_import(source, &file, append)
        }
        Command::Preset(PresetCommand::Export { file }) => commands::preset_export(source, &file),
        Command::Shortcut(ShortcutCommand::List) => commands::shortcut_list(source),
        Command::Shortcut(ShortcutCommand::Set { action, keys }) => {
            commands::shortcut_set(source, action, &keys)
        }
        Command::Shortcut(ShortcutCommand::Clear { action }) => {
            commands::shortcut_clear(source, action)
        }
        Command::Set(setting) => commands::set(source, setting),
    }
}

/// "outer: inner: innermost"
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetclock_core::types::{DisplayFormat, Theme};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("meetclock").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_subcommand_runs() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_run_options_and_global_config() {
        let cli = parse(&["run", "--preset", "standup", "--simple", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        match cli.command {
            Some(Command::Run(args)) => {
                assert_eq!(args.preset.as_deref(), Some("standup"));
                assert!(args.simple);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_preset_add_accepts_clock_durations() {
        let cli = parse(&["preset", "add", "Retro", "1:00:00", "--alert", "5:00", "--flash", "30"]);
        match cli.command {
            Some(Command::Preset(PresetCommand::Add(new))) => {
                assert_eq!(new.name, "Retro");
                assert_eq!(new.duration, 3600);
                assert_eq!(new.alert, 300);
                assert_eq!(new.flash, Some(30));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_preset_add_default_alert() {
        match parse(&["preset", "add", "Quick", "90"]).command {
            Some(Command::Preset(PresetCommand::Add(new))) => assert_eq!(new.alert, 60),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_preset_edit_flags() {
        match parse(&["preset", "edit", "2", "--name", "Weekly", "--default-flash"]).command {
            Some(Command::Preset(PresetCommand::Edit { index, changes })) => {
                assert_eq!(index, 2);
                assert_eq!(changes.name.as_deref(), Some("Weekly"));
                assert!(changes.default_flash);
                assert_eq!(changes.duration, None);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(
            Cli::try_parse_from(["meetclock", "preset", "edit", "0", "--flash", "5", "--default-flash"])
                .is_err()
        );
    }

    #[test]
    fn test_shortcut_action_names() {
        match parse(&["shortcut", "set", "start-pause", "ctrl+1"]).command {
            Some(Command::Shortcut(ShortcutCommand::Set { action, keys })) => {
                assert_eq!(action, ShortcutAction::StartPause);
                assert_eq!(keys, "ctrl+1");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["meetclock", "shortcut", "clear", "explode"]).is_err());
    }

    #[test]
    fn test_set_parses_typed_values() {
        let settings = [
            (vec!["set", "theme", "dark"], Setting::Theme { theme: Theme::Dark }),
            (
                vec!["set", "format", "percent"],
                Setting::Format {
                    format: DisplayFormat::Percent,
                },
            ),
            (vec!["set", "topmost", "false"], Setting::Topmost { enabled: false }),
            (vec!["set", "volume", "70"], Setting::Volume { percent: 70 }),
            (vec!["set", "prompt-regular"], Setting::PromptRegular { path: None }),
        ];
        for (args, expected) in settings {
            match parse(&args).command {
                Some(Command::Set(setting)) => assert_eq!(setting, expected),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(Cli::try_parse_from(["meetclock", "set", "theme", "purple"]).is_err());
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = AppError::AudioThread(std::io::Error::other("no threads left"));
        assert_eq!(
            error_chain(&err),
            "failed to start the audio thread: no threads left"
        );
    }
}
