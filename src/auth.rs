//! Interactive sign-in
//!
//! The session is reused across runs; the code and 2FA prompts only appear
//! when the stored session is not authorized yet.

use std::future::Future;
use std::io::{self, BufRead, Write};

use grammers_client::types::{LoginToken, PasswordToken};
use grammers_client::{Client, SignInError};
use tracing::info;

use crate::error::{Error, Result};

/// Supplies login credentials on demand.
pub trait CredentialProvider {
    fn phone(&self) -> &str;

    /// Verification code sent by Telegram.
    fn code(&self) -> Result<String>;

    /// Two-step verification password.
    fn password(&self) -> Result<String>;
}

/// Prompts on the controlling terminal.
pub struct TerminalCredentials {
    phone: String,
}

impl TerminalCredentials {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
        }
    }
}

impl CredentialProvider for TerminalCredentials {
    fn phone(&self) -> &str {
        &self.phone
    }

    fn code(&self) -> Result<String> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        prompt_line(&mut stdin.lock(), &mut stdout.lock(), "Enter code: ")
    }

    fn password(&self) -> Result<String> {
        // Renders as "Enter 2FA password: " with input hidden.
        let password = dialoguer::Password::new()
            .with_prompt("Enter 2FA password")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| Error::InvalidArgument(format!("failed to read password: {}", e)))?;
        Ok(password.trim().to_string())
    }
}

/// Print `message` and read one trimmed line.
pub fn prompt_line<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, message: &str) -> Result<String> {
    write!(writer, "{}", message)?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(Error::InvalidArgument(
            "input closed before a value was entered".to_string(),
        ));
    }
    Ok(line.trim().to_string())
}

/// Result of submitting the login code.
#[derive(Debug)]
pub enum SignInOutcome<P> {
    /// Signed in; carries the account's display name.
    SignedIn(String),
    /// Two-step verification is enabled.
    PasswordRequired(P),
    /// The number has no account yet.
    SignUpRequired,
}

/// Login calls used by [`authorize_if_necessary`].
pub trait LoginClient {
    type LoginToken;
    type PasswordToken;

    fn is_authorized(&self) -> impl Future<Output = Result<bool>>;

    fn request_login_code(
        &self,
        phone: &str,
        api_hash: &str,
    ) -> impl Future<Output = Result<Self::LoginToken>>;

    fn sign_in(
        &self,
        token: &Self::LoginToken,
        code: &str,
    ) -> impl Future<Output = Result<SignInOutcome<Self::PasswordToken>>>;

    /// Returns the display name of the signed-in account.
    fn check_password(
        &self,
        token: Self::PasswordToken,
        password: &str,
    ) -> impl Future<Output = Result<String>>;
}

impl LoginClient for Client {
    type LoginToken = LoginToken;
    type PasswordToken = PasswordToken;

    async fn is_authorized(&self) -> Result<bool> {
        Ok(Client::is_authorized(self).await?)
    }

    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<LoginToken> {
        Client::request_login_code(self, phone, api_hash)
            .await
            .map_err(|e| Error::TelegramError(format!("Failed to request code: {}", e)))
    }

    async fn sign_in(&self, token: &LoginToken, code: &str) -> Result<SignInOutcome<PasswordToken>> {
        match Client::sign_in(self, token, code).await {
            Ok(user) => Ok(SignInOutcome::SignedIn(user.full_name())),
            Err(SignInError::PasswordRequired(password_token)) => {
                Ok(SignInOutcome::PasswordRequired(password_token))
            }
            Err(SignInError::SignUpRequired { .. }) => Ok(SignInOutcome::SignUpRequired),
            Err(e) => Err(Error::TelegramError(format!("Failed to sign in: {}", e))),
        }
    }

    async fn check_password(&self, token: PasswordToken, password: &str) -> Result<String> {
        let user = Client::check_password(self, token, password.as_bytes())
            .await
            .map_err(|e| Error::TelegramError(format!("Failed to check password: {}", e)))?;
        Ok(user.full_name())
    }
}

/// Sign in unless the session already is.
pub async fn authorize_if_necessary<C: LoginClient, P: CredentialProvider>(
    client: &C,
    api_hash: &str,
    credentials: &P,
) -> Result<()> {
    if client.is_authorized().await? {
        info!("Session already authorized");
        return Ok(());
    }

    let phone = credentials.phone();
    info!("Requesting login code for {}", phone);
    let token = client.request_login_code(phone, api_hash).await?;

    let code = credentials.code()?;
    let name = match client.sign_in(&token, &code).await? {
        SignInOutcome::SignedIn(name) => name,
        SignInOutcome::PasswordRequired(password_token) => {
            let password = credentials.password()?;
            client.check_password(password_token, &password).await?
        }
        SignInOutcome::SignUpRequired => {
            return Err(Error::SignUpRequired(phone.to_string()));
        }
    };

    info!("Signed in as {}", name);
    Ok(())
}
