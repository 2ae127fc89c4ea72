//! Login command.

use secrecy::{ExposeSecret, SecretString};

use bazaar_storefront::session::Session;

/// Authenticate and print the bearer token for export.
///
/// # Errors
///
/// Returns the backend's login failure message (or the connectivity hint
/// when no response arrived).
pub async fn login(
    session: &Session,
    username: &str,
    password: SecretString,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = session.login(username, &password).await?;
    println!("Welcome, {}!", user.username);

    // The session holds the token now; print it so the shell can carry it
    // into the next invocation.
    if let Some(token) = session_token(session) {
        println!("export BAZAAR_TOKEN={token}");
    }
    Ok(())
}

fn session_token(session: &Session) -> Option<String> {
    session
        .api()
        .token_for_export()
        .map(|t| t.expose_secret().to_string())
}
