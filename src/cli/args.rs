//! Command-line argument parsing for the parley CLI.
//!
//! Parsing never fails outright: bad input becomes [`CliCommand::Invalid`]
//! carrying the reason, so the caller decides how to report it.

/// Usage text printed by `--help` and after invalid input.
pub const USAGE: &str = "\
Usage: parley <command> [args]

Commands:
  chat <message> [--model M] [--conversation ID]   Send a message and stream the reply
  list                                             List conversations
  messages <conversation-id>                       Show the messages of a conversation
  new [title]                                      Create a conversation
  rename <conversation-id> <title>                 Rename a conversation
  delete <conversation-id>                         Delete a conversation
  models                                           List models for the stored API key
  health                                           Check that the backend is reachable
  set-key <api-key>                                Store the model provider API key
  login <token>                                    Store a session token
  logout                                           Forget the session token

Options:
  -V, --version   Show version
  -h, --help      Show this help
";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Send a message; without a conversation id a new conversation is started
    Chat {
        message: String,
        model: Option<String>,
        conversation_id: Option<String>,
    },
    List,
    Messages { conversation_id: String },
    New { title: Option<String> },
    Rename { conversation_id: String, title: String },
    Delete { conversation_id: String },
    Models,
    Health,
    SetKey { api_key: String },
    Login { token: String },
    Logout,
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Arguments could not be understood
    Invalid(String),
}

/// Parse command-line arguments and return the command to execute.
///
/// # Examples
///
/// ```
/// use parley::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["parley".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let args: Vec<String> = args.skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        return CliCommand::Help;
    };

    match command.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "--help" | "-h" | "help" => CliCommand::Help,
        "chat" => parse_chat(rest),
        "list" => no_args(rest, CliCommand::List),
        "models" => no_args(rest, CliCommand::Models),
        "health" => no_args(rest, CliCommand::Health),
        "logout" => no_args(rest, CliCommand::Logout),
        "messages" => match rest {
            [id] => CliCommand::Messages {
                conversation_id: id.clone(),
            },
            _ => CliCommand::Invalid("messages takes one conversation id".to_string()),
        },
        "new" => CliCommand::New {
            title: Some(rest.join(" ")).filter(|t| !t.trim().is_empty()),
        },
        "rename" => match rest {
            [id, title @ ..] if !title.is_empty() => CliCommand::Rename {
                conversation_id: id.clone(),
                title: title.join(" "),
            },
            _ => CliCommand::Invalid("rename takes a conversation id and a title".to_string()),
        },
        "delete" => match rest {
            [id] => CliCommand::Delete {
                conversation_id: id.clone(),
            },
            _ => CliCommand::Invalid("delete takes one conversation id".to_string()),
        },
        "set-key" => match rest {
            [key] => CliCommand::SetKey {
                api_key: key.clone(),
            },
            _ => CliCommand::Invalid("set-key takes one API key".to_string()),
        },
        "login" => match rest {
            [token] => CliCommand::Login {
                token: token.clone(),
            },
            _ => CliCommand::Invalid("login takes one token".to_string()),
        },
        other => CliCommand::Invalid(format!("unknown command: {}", other)),
    }
}

fn no_args(rest: &[String], command: CliCommand) -> CliCommand {
    if rest.is_empty() {
        command
    } else {
        CliCommand::Invalid(format!("unexpected argument: {}", rest[0]))
    }
}

fn parse_chat(rest: &[String]) -> CliCommand {
    let mut words = Vec::new();
    let mut model = None;
    let mut conversation_id = None;

    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--model" | "-m" => match iter.next() {
                Some(value) => model = Some(value.clone()),
                None => return CliCommand::Invalid("--model needs a value".to_string()),
            },
            "--conversation" | "-c" => match iter.next() {
                Some(value) => conversation_id = Some(value.clone()),
                None => return CliCommand::Invalid("--conversation needs a value".to_string()),
            },
            _ => words.push(arg.as_str()),
        }
    }

    let message = words.join(" ");
    if message.trim().is_empty() {
        return CliCommand::Invalid("chat needs a message".to_string());
    }
    CliCommand::Chat {
        message,
        model,
        conversation_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliCommand {
        let args: Vec<String> = std::iter::once("parley")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();
        parse_args(args.into_iter())
    }

    #[test]
    fn test_parse_version_flags() {
        assert_eq!(parse(&["--version"]), CliCommand::Version);
        assert_eq!(parse(&["-V"]), CliCommand::Version);
    }

    #[test]
    fn test_parse_no_args_shows_help() {
        assert_eq!(parse(&[]), CliCommand::Help);
        assert_eq!(parse(&["--help"]), CliCommand::Help);
    }

    #[test]
    fn test_parse_chat() {
        assert_eq!(
            parse(&["chat", "Hello", "there", "--model", "openai/gpt-4o", "-c", "c1"]),
            CliCommand::Chat {
                message: "Hello there".to_string(),
                model: Some("openai/gpt-4o".to_string()),
                conversation_id: Some("c1".to_string()),
            }
        );
        assert_eq!(
            parse(&["chat", "Hi"]),
            CliCommand::Chat {
                message: "Hi".to_string(),
                model: None,
                conversation_id: None,
            }
        );
    }

    #[test]
    fn test_parse_chat_errors() {
        assert!(matches!(parse(&["chat"]), CliCommand::Invalid(_)));
        assert!(matches!(parse(&["chat", "hi", "--model"]), CliCommand::Invalid(_)));
        assert!(matches!(parse(&["chat", "--conversation", "c1"]), CliCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_conversation_commands() {
        assert_eq!(parse(&["list"]), CliCommand::List);
        assert_eq!(
            parse(&["messages", "c1"]),
            CliCommand::Messages {
                conversation_id: "c1".to_string()
            }
        );
        assert_eq!(parse(&["new"]), CliCommand::New { title: None });
        assert_eq!(
            parse(&["new", "Trip", "plans"]),
            CliCommand::New {
                title: Some("Trip plans".to_string())
            }
        );
        assert_eq!(
            parse(&["rename", "c1", "Better", "title"]),
            CliCommand::Rename {
                conversation_id: "c1".to_string(),
                title: "Better title".to_string()
            }
        );
        assert_eq!(
            parse(&["delete", "c1"]),
            CliCommand::Delete {
                conversation_id: "c1".to_string()
            }
        );
    }

    #[test]
    fn test_parse_credential_commands() {
        assert_eq!(
            parse(&["login", "tok"]),
            CliCommand::Login {
                token: "tok".to_string()
            }
        );
        assert_eq!(parse(&["logout"]), CliCommand::Logout);
        assert_eq!(
            parse(&["set-key", "sk-or-v1"]),
            CliCommand::SetKey {
                api_key: "sk-or-v1".to_string()
            }
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse(&["rename", "c1"]), CliCommand::Invalid(_)));
        assert!(matches!(parse(&["delete"]), CliCommand::Invalid(_)));
        assert!(matches!(parse(&["list", "extra"]), CliCommand::Invalid(_)));
        assert_eq!(
            parse(&["--unknown"]),
            CliCommand::Invalid("unknown command: --unknown".to_string())
        );
    }
}
