//! Built-in mail types

use mailroute_core::{HandlerResult, MailApi, SendRequest, Sender};
use mailroute_smtp::message::ContentType;
use serde::{Deserialize, Serialize};

pub const WELCOME: &str = "welcome";
pub const NOTICE: &str = "notice";

pub const MAIL_TYPES: [&str; 2] = [NOTICE, WELCOME];

/// Model shared by the built-in mail types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Greeting {
    pub name: String,
}

pub fn register_all(sender: &impl Sender) {
    sender.register(WELCOME, welcome);
    sender.register(NOTICE, notice);
}

async fn welcome(api: MailApi, request: SendRequest) -> HandlerResult {
    let greeting: Greeting = request.model_as()?;

    let mut body = format!("Hi {},\n\nYour account is ready.\n", greeting.name);
    let base_url = &api.configuration().base_url;
    if !base_url.is_empty() {
        body.push_str(&format!("Sign in at {}\n", base_url));
    }

    let message = api
        .prepare_message(request.destination())?
        .subject("Welcome aboard")
        .header(ContentType::TEXT_PLAIN)
        .body(body)?;

    api.send(message).await?;
    Ok(())
}

async fn notice(api: MailApi, request: SendRequest) -> HandlerResult {
    let greeting: Greeting = request.model_as()?;

    let message = api
        .prepare_message(request.destination())?
        .subject("Account notice")
        .header(ContentType::TEXT_PLAIN)
        .body(format!(
            "Hi {},\n\nThis is a notice about your account.\n",
            greeting.name
        ))?;

    api.send(message).await?;
    Ok(())
}
