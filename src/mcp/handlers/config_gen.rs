//! `generate_ssh_config`: deterministic config stanza synthesis.
//!
//! Pure string building, no I/O. Identical inputs always produce
//! byte-identical output. Keys follow the recognized ordering: Host,
//! HostName, User, Port, IdentityFile, then extra options in the
//! caller-supplied order.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{parse_args, to_payload};
use crate::mcp::error::ToolError;
use crate::mcp::schema::{ParamSpec, ParamType, ToolDescriptor};
use crate::mcp::types::SshConfigResponse;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "generate_ssh_config",
        "Generate a deterministic ~/.ssh/config stanza for a host alias. Same inputs \
         always produce byte-identical output.",
        vec![
            ParamSpec::new("alias", ParamType::String, "Host alias for the stanza").required(),
            ParamSpec::new("host", ParamType::String, "Real hostname or IP").required(),
            ParamSpec::new("user", ParamType::String, "Login user"),
            ParamSpec::new("port", ParamType::Integer, "SSH port").with_default(json!(22)),
            ParamSpec::new("identity_file", ParamType::String, "Path to the identity file"),
            ParamSpec::new(
                "extra_options",
                ParamType::StringList,
                "Additional 'Key value' option lines, emitted in the given order",
            ),
        ],
    )
}

#[derive(Debug, Deserialize)]
struct ConfigArgs {
    alias: String,
    host: String,
    user: Option<String>,
    port: u16,
    identity_file: Option<String>,
    extra_options: Option<Vec<String>>,
}

pub async fn generate_ssh_config(args: Map<String, Value>) -> Result<Value, ToolError> {
    let args: ConfigArgs = parse_args(args)?;

    validate_token("alias", &args.alias)?;
    validate_token("host", &args.host)?;
    if let Some(identity_file) = &args.identity_file {
        validate_value("identity_file", identity_file)?;
    }

    let mut stanza = String::new();
    stanza.push_str(&format!("Host {}\n", args.alias));
    stanza.push_str(&format!("    HostName {}\n", args.host));
    if let Some(user) = &args.user {
        validate_token("user", user)?;
        stanza.push_str(&format!("    User {user}\n"));
    }
    stanza.push_str(&format!("    Port {}\n", args.port));
    if let Some(identity_file) = &args.identity_file {
        stanza.push_str(&format!("    IdentityFile {identity_file}\n"));
    }
    for option in args.extra_options.as_deref().unwrap_or_default() {
        validate_option_line(option)?;
        stanza.push_str(&format!("    {option}\n"));
    }

    to_payload(&SshConfigResponse {
        alias: args.alias,
        stanza,
    })
}

/// A single config token: non-empty, no whitespace, no comment or control characters.
fn validate_token(name: &str, value: &str) -> Result<(), ToolError> {
    if value.is_empty() {
        return Err(ToolError::InvalidArguments(format!("'{name}' is empty")));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '#')
    {
        return Err(ToolError::InvalidArguments(format!(
            "'{name}' contains characters illegal in ssh_config: {value:?}"
        )));
    }
    Ok(())
}

/// A config value that may contain spaces (paths), but no line breaks or comments.
fn validate_value(name: &str, value: &str) -> Result<(), ToolError> {
    if value.is_empty() {
        return Err(ToolError::InvalidArguments(format!("'{name}' is empty")));
    }
    if value.chars().any(|c| c.is_control() || c == '#') {
        return Err(ToolError::InvalidArguments(format!(
            "'{name}' contains characters illegal in ssh_config: {value:?}"
        )));
    }
    Ok(())
}

/// An extra option line must be a "Keyword value" pair on one line.
fn validate_option_line(line: &str) -> Result<(), ToolError> {
    validate_value("extra_options entry", line)?;
    if line.split_whitespace().count() < 2 {
        return Err(ToolError::InvalidArguments(format!(
            "extra option {line:?} is not a 'Keyword value' pair"
        )));
    }
    Ok(())
}
