//! # Wallet Authorization Adapter
//!
//! Turns the session-scoped external wallet protocol into one internal
//! [`WalletSession`] (auth token plus selected account).
//!
//! ## Protocol Shape
//!
//! Every interaction with the wallet app happens inside a scope opened by a
//! [`WalletTransport`]. Inside the scope the app authorizes (or re-authorizes
//! with a cached token), then signs. The scope is always closed afterwards:
//! [`ScopeGuard`] closes it on drop, so early `?` returns and panics release
//! it too.
//!
//! ## Operations
//!
//! - [`MobileWallet::connect`] / [`MobileWallet::sign_in`]: authorize and
//!   store the session
//! - [`MobileWallet::disconnect`]: deauthorize and clear, idempotent
//! - [`MobileWallet::sign_and_send_transaction`]: first signature or
//!   [`AppError::NoSignatureReturned`]
//! - [`MobileWallet::sign_message`]: first signed payload or
//!   [`AppError::NoSignatureReturned`]
//!
//! Nothing here retries. Errors reach the caller unchanged.

use crate::core::service::WalletAdapter;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lib_core::config::{devnet, NETWORK_CONFIG};
use lib_core::{AppError, Result};
use lib_utils::validation::{validate_not_empty, validate_single_line};
use parking_lot::Mutex;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

// region: --- Types

/// A wallet account the user selected during authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Pubkey,
    pub label: Option<String>,
}

/// The authorization currently held by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    pub account: Account,
    pub auth_token: String,
    pub acquired_at: DateTime<Utc>,
}

/// Sign-in-with-Solana request shown by the wallet app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInPayload {
    pub domain: String,
    pub statement: String,
    pub uri: Option<String>,
}

impl SignInPayload {
    pub fn new(domain: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            statement: statement.into(),
            uri: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Domain must be non-empty; statement must be non-empty and one line.
    pub fn validate(&self) -> Result<()> {
        validate_not_empty(&self.domain, "Domain").map_err(AppError::MalformedPayload)?;
        validate_not_empty(&self.statement, "Statement").map_err(AppError::MalformedPayload)?;
        validate_single_line(&self.statement, "Statement").map_err(AppError::MalformedPayload)?;
        Ok(())
    }
}

/// How the app identifies itself to the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub name: String,
    pub uri: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            name: "DEX Wallet".to_string(),
            uri: "https://dex-wallet.app".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub chain: String,
    pub identity: AppIdentity,
    /// Cached token; the wallet may skip its prompt when it is still valid.
    pub auth_token: Option<String>,
    pub sign_in: Option<SignInPayload>,
}

#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    pub accounts: Vec<Account>,
    pub auth_token: String,
}

// endregion: --- Types

// region: --- Protocol traits

/// Opens session scopes with an external wallet app.
#[async_trait]
pub trait WalletTransport: Send + Sync {
    /// Fails with [`AppError::NoWalletAvailable`] when no wallet app answers.
    async fn open_scope(&self) -> Result<Box<dyn WalletScope>>;
}

/// One open conversation with the wallet app.
#[async_trait]
pub trait WalletScope: Send {
    async fn authorize(&mut self, request: AuthorizationRequest) -> Result<AuthorizationResult>;

    async fn deauthorize(&mut self, auth_token: &str) -> Result<()>;

    async fn sign_and_send_transactions(
        &mut self,
        transactions: Vec<VersionedTransaction>,
        min_context_slot: u64,
    ) -> Result<Vec<Signature>>;

    async fn sign_messages(&mut self, addresses: Vec<Pubkey>, payloads: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>>;

    /// Release the scope. Called exactly once, from [`ScopeGuard`]'s drop.
    fn close(&mut self);
}

/// Closes the wrapped scope when dropped.
pub struct ScopeGuard {
    scope: Box<dyn WalletScope>,
}

impl ScopeGuard {
    pub fn new(scope: Box<dyn WalletScope>) -> Self {
        Self { scope }
    }
}

impl Deref for ScopeGuard {
    type Target = dyn WalletScope;

    fn deref(&self) -> &Self::Target {
        self.scope.as_ref()
    }
}

impl DerefMut for ScopeGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.scope.as_mut()
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.close();
    }
}

// endregion: --- Protocol traits

// region: --- Adapter

/// Wallet adapter over a [`WalletTransport`].
///
/// Holds at most one [`WalletSession`]; callers only ever see clones of it.
pub struct MobileWallet {
    transport: Arc<dyn WalletTransport>,
    identity: AppIdentity,
    chain: String,
    token_refresh_threshold: Duration,
    session: Mutex<Option<WalletSession>>,
}

impl MobileWallet {
    pub fn new(transport: Arc<dyn WalletTransport>) -> Self {
        Self {
            transport,
            identity: AppIdentity::default(),
            chain: devnet::CHAIN_ID.to_string(),
            token_refresh_threshold: NETWORK_CONFIG.auth_token_refresh_threshold,
            session: Mutex::new(None),
        }
    }

    pub fn with_identity(mut self, identity: AppIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Tokens older than `threshold` are not offered to the wallet again.
    pub fn with_token_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.token_refresh_threshold = threshold;
        self
    }

    /// Snapshot of the held session.
    pub fn session(&self) -> Option<WalletSession> {
        self.session.lock().clone()
    }

    fn cached_auth_token(&self) -> Option<String> {
        let session = self.session.lock();
        let session = session.as_ref()?;

        let age = Utc::now().signed_duration_since(session.acquired_at);
        match age.to_std() {
            Ok(age) if age > self.token_refresh_threshold => {
                debug!(age_secs = age.as_secs(), "Cached auth token too old, requesting a fresh one");
                None
            }
            _ => Some(session.auth_token.clone()),
        }
    }

    async fn open(&self) -> Result<ScopeGuard> {
        let scope = self.transport.open_scope().await?;
        Ok(ScopeGuard::new(scope))
    }

    /// Authorize inside `scope` and record the resulting session.
    async fn authorize(&self, scope: &mut ScopeGuard, sign_in: Option<SignInPayload>) -> Result<Account> {
        let request = AuthorizationRequest {
            chain: self.chain.clone(),
            identity: self.identity.clone(),
            auth_token: self.cached_auth_token(),
            sign_in,
        };

        let result = scope.authorize(request).await?;
        let account = result
            .accounts
            .into_iter()
            .next()
            .ok_or_else(|| AppError::AuthorizationDenied("Wallet returned no accounts".to_string()))?;

        *self.session.lock() = Some(WalletSession {
            account: account.clone(),
            auth_token: result.auth_token,
            acquired_at: Utc::now(),
        });

        Ok(account)
    }

    /// Authorize with the wallet and store the session.
    pub async fn connect(&self) -> Result<Account> {
        let mut scope = self.open().await?;
        let account = self.authorize(&mut scope, None).await?;
        info!(address = %account.address, "Wallet authorized");
        Ok(account)
    }

    /// Authorize with a sign-in request. The payload is checked before the
    /// wallet is contacted.
    pub async fn sign_in(&self, payload: SignInPayload) -> Result<Account> {
        payload.validate()?;

        let mut scope = self.open().await?;
        let account = self.authorize(&mut scope, Some(payload)).await?;
        info!(address = %account.address, "Wallet signed in");
        Ok(account)
    }

    /// Deauthorize the held session and forget it.
    ///
    /// No-op without a session. The local session is cleared even when the
    /// wallet call fails; that failure is still returned.
    pub async fn disconnect(&self) -> Result<()> {
        let Some(session) = self.session.lock().take() else {
            debug!("Disconnect without a session");
            return Ok(());
        };

        let mut scope = self.open().await?;
        scope.deauthorize(&session.auth_token).await?;
        info!(address = %session.account.address, "Wallet deauthorized");
        Ok(())
    }

    /// Re-authorize, then have the wallet sign and submit `transaction`.
    pub async fn sign_and_send_transaction(
        &self,
        transaction: VersionedTransaction,
        min_context_slot: u64,
    ) -> Result<Signature> {
        let mut scope = self.open().await?;
        self.authorize(&mut scope, None).await?;

        let signatures = scope
            .sign_and_send_transactions(vec![transaction], min_context_slot)
            .await?;
        let signature = first_or_missing(signatures)?;

        info!(%signature, "Transaction signed and sent");
        Ok(signature)
    }

    /// Re-authorize, then sign `message` with the session account.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        let mut scope = self.open().await?;
        let account = self.authorize(&mut scope, None).await?;

        let signed = scope
            .sign_messages(vec![account.address], vec![message.to_vec()])
            .await?;
        first_or_missing(signed)
    }
}

/// The wallet answers with lists even for single requests; only the first
/// entry counts and an empty list is an error.
fn first_or_missing<T>(items: Vec<T>) -> Result<T> {
    let count = items.len();
    let first = items.into_iter().next().ok_or(AppError::NoSignatureReturned)?;
    if count > 1 {
        warn!(count, "Wallet returned more results than requested, using the first");
    }
    Ok(first)
}

#[async_trait]
impl WalletAdapter for MobileWallet {
    async fn connect(&self) -> Result<Account> {
        MobileWallet::connect(self).await
    }

    async fn sign_in(&self, payload: SignInPayload) -> Result<Account> {
        MobileWallet::sign_in(self, payload).await
    }

    async fn disconnect(&self) -> Result<()> {
        MobileWallet::disconnect(self).await
    }

    async fn sign_and_send_transaction(
        &self,
        transaction: VersionedTransaction,
        min_context_slot: u64,
    ) -> Result<Signature> {
        MobileWallet::sign_and_send_transaction(self, transaction, min_context_slot).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        MobileWallet::sign_message(self, message).await
    }

    fn session(&self) -> Option<WalletSession> {
        MobileWallet::session(self)
    }
}

// endregion: --- Adapter
