use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

const DATA_FILE_VAR: &str = "PURPOSE_ANCHOR_DATA_FILE";
const MUTE_VAR: &str = "PURPOSE_ANCHOR_MUTE";
const DEBUG_LOGS_VAR: &str = "DEBUG_LOGS_ENABLED";
const APP_DIR: &str = "purpose-anchor";
const DATA_FILE_NAME: &str = "sessions.json";
const LOG_FILE_NAME: &str = "purpose-anchor.log";

/// Overrides taken from the command line; they win over the environment.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub data_file: Option<PathBuf>,
    pub mute: bool,
    pub ephemeral: bool,
}

#[derive(Debug)]
pub struct Settings {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub mute: bool,
    pub ephemeral: bool,
    pub debug_logs: bool,
}

impl Settings {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        // .env in the working directory is optional
        dotenvy::dotenv().ok();

        let data_file = match cli.data_file {
            Some(path) => path,
            None => match env::var(DATA_FILE_VAR) {
                Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
                _ => Self::default_data_file()?,
            },
        };
        let log_file = data_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .join(LOG_FILE_NAME);

        Ok(Self {
            data_file,
            log_file,
            mute: cli.mute || env_flag(MUTE_VAR),
            ephemeral: cli.ephemeral,
            debug_logs: env_flag(DEBUG_LOGS_VAR),
        })
    }

    fn default_data_file() -> Result<PathBuf> {
        match dirs::data_dir() {
            Some(dir) => Ok(dir.join(APP_DIR).join(DATA_FILE_NAME)),
            None => Ok(env::current_dir()?.join(format!("{}-{}", APP_DIR, DATA_FILE_NAME))),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).ok().as_deref().is_some_and(parse_flag)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_data_file_wins() {
        let settings = Settings::new(CliOverrides {
            data_file: Some(PathBuf::from("/tmp/anchor/history.json")),
            mute: true,
            ephemeral: false,
        })
        .unwrap();

        assert_eq!(settings.data_file, PathBuf::from("/tmp/anchor/history.json"));
        assert_eq!(settings.log_file, PathBuf::from("/tmp/anchor/purpose-anchor.log"));
        assert!(settings.mute);
    }

    #[test]
    fn test_bare_file_name_logs_next_to_it() {
        let settings = Settings::new(CliOverrides {
            data_file: Some(PathBuf::from("history.json")),
            ..CliOverrides::default()
        })
        .unwrap();
        assert_eq!(settings.log_file, PathBuf::from("./purpose-anchor.log"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
