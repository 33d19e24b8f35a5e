//! Executes parsed CLI commands against the backend.

use color_eyre::{eyre::eyre, Result};
use std::io::Write;

use super::args::{CliCommand, USAGE};
use super::version::version_line;
use crate::app::{ChatApp, SelectionStore};
use crate::auth;
use crate::backend::BackendClient;
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::Role;
use crate::traits::{CredentialsProvider, HttpClient};

/// Everything a command needs besides its arguments.
pub struct CommandContext<C, P> {
    pub http: C,
    pub credentials: P,
    pub config: ClientConfig,
    /// Where `chat` and `list` remember the selected conversation
    pub selection: Option<SelectionStore>,
}

/// Run `command`, writing its output to `out`.
pub async fn run_command<C, P, W>(
    command: CliCommand,
    ctx: CommandContext<C, P>,
    out: &mut W,
) -> Result<()>
where
    C: HttpClient,
    P: CredentialsProvider,
    W: Write,
{
    let CommandContext {
        http,
        credentials,
        config,
        selection,
    } = ctx;

    match command {
        CliCommand::Version => writeln!(out, "{}", version_line())?,
        CliCommand::Help => write!(out, "{}", USAGE)?,
        CliCommand::Invalid(reason) => return Err(eyre!("{}\n\n{}", reason, USAGE)),
        CliCommand::Login { token } => {
            let creds = auth::login(&credentials, &token).await?;
            match creds.user_id {
                Some(user_id) => writeln!(out, "Signed in as {}", user_id)?,
                None => writeln!(out, "Session token stored")?,
            }
        }
        CliCommand::Logout => {
            auth::logout(&credentials).await?;
            writeln!(out, "Signed out")?;
        }
        CliCommand::SetKey { api_key } => {
            auth::set_api_key(&credentials, &api_key).await?;
            writeln!(out, "API key saved")?;
        }
        CliCommand::Health => {
            let health = BackendClient::from_config(http, &config).health_check().await?;
            match health.version {
                Some(version) => writeln!(out, "{} (backend {})", health.status, version)?,
                None => writeln!(out, "{}", health.status)?,
            }
        }
        command => {
            let creds = auth::require_session(&credentials)
                .await?
                .ok_or(AppError::NotAuthenticated)?;
            let mut app = ChatApp::from_config(http, &config, &creds);
            if let Some(store) = selection {
                app = app.with_selection_store(store);
            }
            run_session_command(command, &mut app, out).await?;
        }
    }
    Ok(())
}

async fn run_session_command<C, W>(
    command: CliCommand,
    app: &mut ChatApp<C>,
    out: &mut W,
) -> Result<()>
where
    C: HttpClient,
    W: Write,
{
    match command {
        CliCommand::List => {
            app.load_conversations().await?;
            let session = app.session();
            if session.conversations.is_empty() {
                writeln!(out, "No conversations yet")?;
            }
            for conversation in &session.conversations {
                let marker = if session.selected_conversation_id.as_deref()
                    == Some(conversation.id.as_str())
                {
                    "*"
                } else {
                    " "
                };
                writeln!(
                    out,
                    "{} {}  {}  [{}]",
                    marker,
                    conversation.id,
                    conversation.display_title(),
                    conversation.model().unwrap_or("-")
                )?;
            }
        }
        CliCommand::Messages { conversation_id } => {
            app.load_messages(&conversation_id).await?;
            for message in &app.session().messages {
                let who = match message.role {
                    Role::User => "you",
                    Role::Assistant => "assistant",
                    Role::System => "system",
                };
                writeln!(out, "{}: {}", who, message.content)?;
            }
        }
        CliCommand::New { title } => {
            let conversation = app.new_conversation(title.as_deref()).await?;
            writeln!(out, "{}  {}", conversation.id, conversation.display_title())?;
        }
        CliCommand::Rename {
            conversation_id,
            title,
        } => {
            let conversation = app.rename_conversation(&conversation_id, &title).await?;
            writeln!(out, "{}  {}", conversation.id, conversation.display_title())?;
        }
        CliCommand::Delete { conversation_id } => {
            app.delete_conversation(&conversation_id).await?;
            writeln!(out, "Deleted {}", conversation_id)?;
        }
        CliCommand::Models => {
            for model in app.list_models().await? {
                match model.name {
                    Some(name) => writeln!(out, "{}  {}", model.id, name)?,
                    None => writeln!(out, "{}", model.id)?,
                }
            }
        }
        CliCommand::Chat {
            message,
            model,
            conversation_id,
        } => {
            if let Some(id) = &conversation_id {
                app.load_conversations().await?;
                app.select_conversation(id).await?;
            }
            if let Some(model) = model {
                app.session_mut().model_id = model;
            }

            let mut write_error = None;
            let reply = app
                .send_message(&message, |token| {
                    if write_error.is_none() {
                        if let Err(e) = write!(out, "{}", token).and_then(|_| out.flush()) {
                            write_error = Some(e);
                        }
                    }
                })
                .await?;
            if let Some(e) = write_error {
                return Err(e.into());
            }

            writeln!(out)?;
            if !reply.completed {
                writeln!(out, "(reply ended early)")?;
            }
            if let Some(id) = reply.conversation_id {
                writeln!(out, "[conversation {}]", id)?;
            }
        }
        other => return Err(eyre!("{:?} does not need a session", other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryCredentials, MockHttpClient, MockResponse};
    use crate::auth::Credentials;
    use std::time::Duration;

    const BASE: &str = "http://backend.test";

    fn context(
        mock: &MockHttpClient,
        creds: &InMemoryCredentials,
    ) -> CommandContext<MockHttpClient, InMemoryCredentials> {
        CommandContext {
            http: mock.clone(),
            credentials: creds.clone(),
            config: ClientConfig::new()
                .with_api_base_url(BASE)
                .with_retries(0)
                .with_retry_delay(Duration::ZERO),
            selection: None,
        }
    }

    fn signed_in() -> InMemoryCredentials {
        InMemoryCredentials::with_credentials(Credentials {
            access_token: Some("tok".to_string()),
            ..Default::default()
        })
    }

    async fn run(
        command: CliCommand,
        mock: &MockHttpClient,
        creds: &InMemoryCredentials,
    ) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run_command(command, context(mock, creds), &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_version_and_help() {
        let mock = MockHttpClient::new();
        let creds = InMemoryCredentials::new();

        let (result, out) = run(CliCommand::Version, &mock, &creds).await;
        result.unwrap();
        assert!(out.starts_with("parley "));

        let (result, out) = run(CliCommand::Help, &mock, &creds).await;
        result.unwrap();
        assert!(out.contains("Usage: parley"));
    }

    #[tokio::test]
    async fn test_invalid_reports_usage() {
        let mock = MockHttpClient::new();
        let (result, _) = run(
            CliCommand::Invalid("unknown command: x".to_string()),
            &mock,
            &InMemoryCredentials::new(),
        )
        .await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("unknown command: x"));
        assert!(message.contains("Usage"));
    }

    #[tokio::test]
    async fn test_session_commands_need_login() {
        let mock = MockHttpClient::new();
        let (result, _) = run(CliCommand::List, &mock, &InMemoryCredentials::new()).await;

        let report = result.unwrap_err();
        assert!(matches!(
            report.downcast_ref::<AppError>(),
            Some(AppError::NotAuthenticated)
        ));
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_login_set_key_logout() {
        let mock = MockHttpClient::new();
        let creds = InMemoryCredentials::new();

        let (result, out) = run(
            CliCommand::Login {
                token: "opaque".to_string(),
            },
            &mock,
            &creds,
        )
        .await;
        result.unwrap();
        assert_eq!(out, "Session token stored\n");

        run(
            CliCommand::SetKey {
                api_key: " sk-1 ".to_string(),
            },
            &mock,
            &creds,
        )
        .await
        .0
        .unwrap();
        assert_eq!(creds.get_credentials().unwrap().api_key.as_deref(), Some("sk-1"));

        run(CliCommand::Logout, &mock, &creds).await.0.unwrap();
        let remaining = creds.get_credentials().unwrap();
        assert!(remaining.access_token.is_none());
        assert_eq!(remaining.api_key.as_deref(), Some("sk-1"));
    }

    #[tokio::test]
    async fn test_list_marks_selection() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/api/conversations", BASE),
            MockResponse::json(serde_json::json!([
                {"id": "c1", "title": "First", "model_id": "m/one"},
                {"id": "c2", "title": null, "model_id": null}
            ])),
        );
        mock.set_response(
            &format!("{}/api/conversations/c1/messages", BASE),
            MockResponse::json(serde_json::json!([])),
        );

        let (result, out) = run(CliCommand::List, &mock, &signed_in()).await;
        result.unwrap();
        assert_eq!(
            out,
            "* c1  First  [m/one]\n  c2  New conversation  [-]\n"
        );
    }

    #[tokio::test]
    async fn test_chat_prints_tokens() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/api/chat", BASE),
            MockResponse::sse([
                "data: {\"token\":\"Hello\"}\n\ndata: {\"tok",
                "en\":\" world\"}\n\ndata: {\"done\":true,\"conversation_id\":\"c7\"}\n\n",
            ]),
        );
        mock.set_response(
            &format!("{}/api/conversations", BASE),
            MockResponse::json(serde_json::json!([{"id": "c7", "title": "Hi", "model_id": "m"}])),
        );
        mock.set_response(
            &format!("{}/api/conversations/c7/messages", BASE),
            MockResponse::json(serde_json::json!([])),
        );

        let (result, out) = run(
            CliCommand::Chat {
                message: "Hi".to_string(),
                model: Some("custom/model".to_string()),
                conversation_id: None,
            },
            &mock,
            &signed_in(),
        )
        .await;
        result.unwrap();
        assert_eq!(out, "Hello world\n[conversation c7]\n");

        let chat = &mock.requests_to("POST", &format!("{}/api/chat", BASE))[0];
        assert_eq!(chat.json_body().unwrap()["model_id"], "custom/model");
    }

    #[tokio::test]
    async fn test_models_needs_key() {
        let mock = MockHttpClient::new();
        let (result, _) = run(CliCommand::Models, &mock, &signed_in()).await;
        assert!(matches!(
            result.unwrap_err().downcast_ref::<AppError>(),
            Some(AppError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_health_needs_no_session() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/health", BASE),
            MockResponse::json(serde_json::json!({"status": "ok", "version": "2.0.0"})),
        );

        let (result, out) = run(CliCommand::Health, &mock, &InMemoryCredentials::new()).await;
        result.unwrap();
        assert_eq!(out, "ok (backend 2.0.0)\n");
    }
}
