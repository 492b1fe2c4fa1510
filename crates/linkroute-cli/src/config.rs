//! Configuration loading for the binary.
//!
//! Leading arguments that name configuration flags are handed to
//! `ortho_config`; everything from the first other argument onwards is parsed
//! by clap as links and options.

use std::ffi::{OsStr, OsString};

use linkroute_config::Config;
use ortho_config::OrthoConfig;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the configuration arguments.
    ///
    /// Configuration flags (listed in `CONFIG_CLI_FLAGS`) must precede the
    /// links; later occurrences are parsed as ordinary arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let Some(option) = text.strip_prefix("--") else {
        return FlagAction::Stop;
    };
    let (name, inline_value) = match option.split_once('=') {
        Some((name, _)) => (name, true),
        None => (option, false),
    };

    if super::CONFIG_CLI_FLAGS
        .iter()
        .any(|flag| flag.strip_prefix("--") == Some(name))
    {
        return FlagAction::Include {
            needs_value: !inline_value,
        };
    }
    FlagAction::Stop
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut arguments = args.iter();
    let Some(program) = arguments.next() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut command_start = 1_usize;
    let mut awaiting_value = false;

    for argument in arguments {
        if awaiting_value {
            awaiting_value = false;
        } else {
            match classify(argument) {
                FlagAction::Include { needs_value } => awaiting_value = needs_value,
                FlagAction::Stop => break,
            }
        }
        config_arguments.push(argument.clone());
        command_start += 1;
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start,
    }
}
