use serde::Deserialize;
use thiserror::Error;

pub const ZC_COMMAND: &str = "/zc";

/// Form fields Slack posts for a slash command invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub response_url: String,
    pub trigger_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZcCommand {
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub response_url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported slash command: {0}")]
    UnsupportedCommand(String),
    #[error("slash command payload has no response_url")]
    MissingResponseUrl,
}

pub fn normalize_zc_command(payload: SlashCommandPayload) -> Result<ZcCommand, CommandParseError> {
    if payload.command.trim() != ZC_COMMAND {
        return Err(CommandParseError::UnsupportedCommand(payload.command));
    }
    if payload.response_url.trim().is_empty() {
        return Err(CommandParseError::MissingResponseUrl);
    }

    Ok(ZcCommand {
        text: payload.text.trim().to_owned(),
        channel_id: payload.channel_id,
        user_id: payload.user_id,
        response_url: payload.response_url,
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_zc_command, CommandParseError, SlashCommandPayload};

    fn payload(command: &str, text: &str, response_url: &str) -> SlashCommandPayload {
        SlashCommandPayload {
            command: command.to_owned(),
            text: text.to_owned(),
            channel_id: "C1".to_owned(),
            user_id: "U1".to_owned(),
            response_url: response_url.to_owned(),
            trigger_id: "T1".to_owned(),
        }
    }

    #[test]
    fn zc_command_text_is_trimmed() {
        let command = normalize_zc_command(payload("/zc", "  遊んでる？ ", "https://hooks.slack.com/x"))
            .expect("zc");
        assert_eq!(command.text, "遊んでる？");
        assert_eq!(command.response_url, "https://hooks.slack.com/x");
    }

    #[test]
    fn other_commands_are_rejected() {
        assert_eq!(
            normalize_zc_command(payload("/quote", "", "https://hooks.slack.com/x")),
            Err(CommandParseError::UnsupportedCommand("/quote".to_owned()))
        );
        assert_eq!(
            normalize_zc_command(payload("/zc", "hi", " ")),
            Err(CommandParseError::MissingResponseUrl)
        );
    }
}
