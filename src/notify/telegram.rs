use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::TelegramConfig;
use crate::error::{AppError, Result};

use super::Messenger;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API `sendMessage` webhook.
pub struct TelegramMessenger {
    client: Client,
    url: String,
    chat_id: String,
}

impl TelegramMessenger {
    pub fn new(client: Client, config: &TelegramConfig) -> Self {
        Self::with_base_url(client, config, TELEGRAM_API_BASE)
    }

    pub fn with_base_url(client: Client, config: &TelegramConfig, base: &str) -> Self {
        let url = format!(
            "{}/bot{}/sendMessage",
            base.trim_end_matches('/'),
            config.bot_token.expose()
        );
        Self {
            client,
            url,
            chat_id: config.chat_id.clone(),
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, text: &str) -> Result<()> {
        // The URL embeds the bot token, so it is stripped from any error.
        let reply = self
            .client
            .post(&self.url)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| AppError::Notify(err.without_url().to_string()))?
            .text()
            .await
            .map_err(|err| AppError::Notify(err.without_url().to_string()))?;

        // Bot API replies carry `ok`; anything unparseable after a 2xx counts as sent.
        if let Ok(reply) = serde_json::from_str::<Value>(&reply) {
            if reply.get("ok").and_then(Value::as_bool) == Some(false) {
                let description = reply
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("no description");
                return Err(AppError::message(format!(
                    "telegram rejected the message: {description}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:bot-secret";

    fn messenger(server: &MockServer) -> TelegramMessenger {
        let config = TelegramConfig {
            bot_token: Secret::new(TOKEN),
            chat_id: "42".into(),
        };
        TelegramMessenger::with_base_url(Client::new(), &config, &server.uri())
    }

    #[tokio::test]
    async fn posts_chat_id_and_text_as_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_string_contains("chat_id=42"))
            .and(body_string_contains("text=finished"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        messenger(&server).send("finished").await.unwrap();
    }

    #[tokio::test]
    async fn http_failure_hides_the_bot_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = messenger(&server).send("finished").await.unwrap_err();

        assert!(matches!(err, AppError::Notify(_)), "{err:?}");
        assert!(!err.to_string().contains(TOKEN), "{err}");
    }

    #[tokio::test]
    async fn rejected_reply_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "description": "chat not found"})),
            )
            .mount(&server)
            .await;

        let err = messenger(&server).send("finished").await.unwrap_err();

        assert!(matches!(err, AppError::Message(_)));
        assert!(err.to_string().contains("chat not found"));
    }
}
