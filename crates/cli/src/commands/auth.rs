//! Session commands: register, login, logout, whoami.
//!
//! Login and logout are auth transitions: the cart is reloaded from the
//! newly authoritative store and the previous in-memory cart is discarded.

use tavola_client::error::ApiError;
use tavola_client::session::Session;

use super::Context;

/// Create an account, sign in, and persist the session.
///
/// # Errors
///
/// Returns a classified error if registration is rejected (field-level
/// validation messages surface through the reporter).
pub async fn register(
    ctx: &mut Context,
    email: &str,
    password: &str,
    name: &str,
) -> Result<(), ApiError> {
    let (token, user) = ctx.api.register(email, password, name).await?;
    ctx.session_store.save(&token, &user)?;
    ctx.session = Session::authenticated(token, user);
    tracing::info!("Registered and signed in as {email}");

    reload_cart(ctx).await;
    Ok(())
}

/// Sign in and persist the session.
///
/// # Errors
///
/// Returns a classified error if the credentials are rejected.
pub async fn login(ctx: &mut Context, email: &str, password: &str) -> Result<(), ApiError> {
    let (token, user) = ctx.api.login(email, password).await?;
    ctx.session_store.save(&token, &user)?;
    ctx.session = Session::authenticated(token, user);
    tracing::info!("Signed in as {email}");

    reload_cart(ctx).await;
    Ok(())
}

/// Sign out: invalidate the token server-side (best effort), forget the
/// persisted session, and reload the cart as anonymous.
///
/// # Errors
///
/// Returns an error if the persisted session cannot be removed.
pub async fn logout(ctx: &mut Context) -> Result<(), ApiError> {
    if !ctx.session.is_authenticated() {
        tracing::info!("Not signed in");
        return Ok(());
    }

    if let Err(err) = ctx.api.logout(&ctx.session).await {
        tracing::warn!("Server-side logout failed: {}", err.user_message());
    }
    ctx.session_store.clear()?;
    ctx.session = Session::anonymous();
    tracing::info!("Signed out");

    reload_cart(ctx).await;
    Ok(())
}

/// Show the signed-in user.
///
/// # Errors
///
/// Returns a classified error if the profile fetch fails (e.g., the stored
/// token has expired).
pub async fn whoami(ctx: &Context) -> Result<(), ApiError> {
    if !ctx.session.is_authenticated() {
        tracing::info!("Not signed in");
        return Ok(());
    }

    let user = ctx.api.me(&ctx.session).await?;
    let role = if user.is_admin { " (admin)" } else { "" };
    tracing::info!("{} <{}>{role}", user.name, user.email);
    Ok(())
}

/// Reload the cart after an auth transition. The previous cart is
/// discarded, not merged, so the new store's content wins.
async fn reload_cart(ctx: &Context) {
    let mut cart = ctx.cart();
    cart.load(&ctx.session).await;
    tracing::info!(
        "Cart: {} item(s), {}",
        cart.state().total_items(),
        cart.state().total_price()
    );
}
