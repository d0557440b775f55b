//! REPL line parsing

use std::path::PathBuf;

use domain::{DomainError, Language};

/// Something the user typed at the prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain text, sent as a chat turn
    Say(String),
    /// `/audio [path]` - transcribe a recording and reply to it
    Audio(Option<PathBuf>),
    /// `/models`
    Models,
    /// `/model <name>`
    Model(String),
    /// `/teacher on|off`
    Teacher(bool),
    /// `/lang ja|en`
    Lang(Language),
    /// `/speed <x>`
    Speed(f32),
    /// `/temperature <x>`
    Temperature(f32),
    /// `/max-tokens <n>`
    MaxTokens(u32),
    /// `/reset`
    Reset,
    /// `/history`
    History,
    /// `/help`
    Help,
    /// `/quit`
    Quit,
}

/// Why a line could not be understood
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    /// Unrecognized slash command
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),

    /// Command needs an argument
    #[error("/{0} needs an argument")]
    MissingArgument(&'static str),

    /// Argument did not parse
    #[error("Invalid argument for /{command}: {value}")]
    InvalidArgument {
        /// Command name
        command: &'static str,
        /// Offending value
        value: String,
    },

    /// Unsupported language code
    #[error(transparent)]
    Language(#[from] DomainError),
}

/// Help text listing every command
pub const HELP: &str = "\
Type a message to chat. Commands:
  /audio [path]        reply to a recorded WAV/MP3 file
  /models              list installed models
  /model <name>        switch model
  /teacher on|off      toggle language-teacher mode
  /lang ja|en          switch practice language
  /speed <x>           playback speed (0.25 to 4.0)
  /temperature <x>     sampling temperature (0.0 to 2.0)
  /max-tokens <n>      reply length limit (1 to 8192)
  /reset               clear the conversation
  /history             show the conversation
  /help                show this help
  /quit                exit";

impl Command {
    /// Parse one input line
    ///
    /// Returns `Ok(None)` for a blank line.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands and malformed arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Self::Say(line.to_string())));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };

        let command = match name {
            "audio" => Self::Audio(arg.map(PathBuf::from)),
            "models" => Self::Models,
            "model" => Self::Model(required("model", arg)?.to_string()),
            "teacher" => Self::Teacher(parse_switch(required("teacher", arg)?)?),
            "lang" => Self::Lang(required("lang", arg)?.parse()?),
            "speed" => Self::Speed(parse_number("speed", arg)?),
            "temperature" | "temp" => Self::Temperature(parse_number("temperature", arg)?),
            "max-tokens" => Self::MaxTokens(parse_number("max-tokens", arg)?),
            "reset" | "clear" => Self::Reset,
            "history" => Self::History,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn required<'a>(command: &'static str, arg: Option<&'a str>) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument(command))
}

fn parse_number<T: std::str::FromStr>(
    command: &'static str,
    arg: Option<&str>,
) -> Result<T, CommandError> {
    let value = required(command, arg)?;
    value.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

fn parse_switch(value: &str) -> Result<bool, CommandError> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(CommandError::InvalidArgument {
            command: "teacher",
            value: value.to_string(),
        }),
    }
}
