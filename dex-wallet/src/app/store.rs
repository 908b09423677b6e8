//! # Application State Store
//!
//! Holds the wallet session and exposes the mutations the UI calls: connect,
//! disconnect, airdrop, transfers and swaps, balance refresh.
//!
//! ## Lifecycle
//!
//! Constructed explicitly with its dependencies and shared by cloning (clones
//! share state). [`AppStore::dispose`] aborts every background task the store
//! started.
//!
//! ## Publication
//!
//! The session is published through a `tokio::sync::watch` channel; every
//! change is visible to [`AppStore::subscribe`] receivers, which is how the
//! navigation guard reacts.
//!
//! ## Concurrent Mutations
//!
//! Every session change (connect, sign-in, disconnect) bumps a generation
//! counter. A connect or balance refresh only writes its result if the
//! generation it started under is still current; otherwise the result is
//! dropped and [`AppError::Superseded`] is returned. A disconnect issued while
//! a connect is in flight therefore always wins.

use crate::app::notifications::{NotificationKind, NotificationStore};
use crate::app::state::{SessionState, WalletInfo};
use crate::core::service::{NetworkService, SwapService, WalletAdapter};
use crate::debug::{active_task_count, spawn_tracked};
use crate::services::wallet::SignInPayload;
use lib_core::config::{explorer_tx_url, NetworkConfig};
use lib_core::{AppError, Result};
use lib_solana::client::sol_to_lamports;
use lib_solana::jupiter::QuoteResponse;
use lib_solana::transfer_transaction;
use parking_lot::Mutex;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct StoreStatus {
    generation: u64,
    is_loading: bool,
    last_error: Option<String>,
}

struct StoreInner {
    wallet: Arc<dyn WalletAdapter>,
    network: Arc<dyn NetworkService>,
    notifications: Arc<NotificationStore>,
    config: NetworkConfig,
    status: Mutex<StoreStatus>,
    session_tx: watch::Sender<SessionState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

enum ConnectMode {
    Authorize,
    SignIn(SignInPayload),
}

/// Application state container.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<StoreInner>,
}

impl AppStore {
    pub fn new(wallet: Arc<dyn WalletAdapter>, network: Arc<dyn NetworkService>, config: NetworkConfig) -> Self {
        Self::with_notifications(wallet, network, Arc::new(NotificationStore::new()), config)
    }

    /// Construct with a notification store shared with other producers.
    pub fn with_notifications(
        wallet: Arc<dyn WalletAdapter>,
        network: Arc<dyn NetworkService>,
        notifications: Arc<NotificationStore>,
        config: NetworkConfig,
    ) -> Self {
        let (session_tx, _) = watch::channel(SessionState::SignedOut);

        Self {
            inner: Arc::new(StoreInner {
                wallet,
                network,
                notifications,
                config,
                status: Mutex::new(StoreStatus::default()),
                session_tx,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    // region: --- Reads

    pub fn session(&self) -> SessionState {
        self.inner.session_tx.borrow().clone()
    }

    pub fn wallet_info(&self) -> Option<WalletInfo> {
        self.inner.session_tx.borrow().wallet_info().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session_tx.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.status.lock().is_loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.status.lock().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.inner.status.lock().last_error = None;
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.session_tx.subscribe()
    }

    pub fn notifications(&self) -> Arc<NotificationStore> {
        self.inner.notifications.clone()
    }

    pub fn network_config(&self) -> &NetworkConfig {
        &self.inner.config
    }

    // endregion: --- Reads

    // region: --- Generation bookkeeping

    /// Start a session change. Returns the new generation and the session it replaced.
    fn begin_session_change(&self, next: SessionState, loading: bool) -> (u64, SessionState) {
        let mut status = self.inner.status.lock();
        status.generation += 1;
        status.is_loading = loading;
        let previous = self.inner.session_tx.send_replace(next);
        (status.generation, previous)
    }

    fn current_generation(&self) -> u64 {
        self.inner.status.lock().generation
    }

    fn record_error(&self, err: &AppError) {
        self.inner.status.lock().last_error = Some(err.user_message());
    }

    // endregion: --- Generation bookkeeping

    // region: --- Mutations

    /// Authorize with the wallet, load the balance and sign in.
    ///
    /// On failure the session goes back to what it was before the call and
    /// the error is returned.
    pub async fn connect_wallet(&self) -> Result<WalletInfo> {
        self.establish(ConnectMode::Authorize).await
    }

    /// Like [`connect_wallet`](Self::connect_wallet), with a sign-in message.
    pub async fn connect_with_sign_in(&self, payload: SignInPayload) -> Result<WalletInfo> {
        self.establish(ConnectMode::SignIn(payload)).await
    }

    async fn establish(&self, mode: ConnectMode) -> Result<WalletInfo> {
        // A re-connect keeps the current wallet visible until it resolves.
        let next = match self.session() {
            signed_in @ SessionState::SignedIn(_) => signed_in,
            _ => SessionState::Connecting,
        };
        let (generation, previous) = self.begin_session_change(next, true);
        info!(generation, "Connecting wallet");

        let result = self.authorize_and_load(mode).await;

        let signed_out_meanwhile = {
            let mut status = self.inner.status.lock();
            if status.generation == generation {
                status.is_loading = false;
                return self.commit_connect(&mut status, result, previous);
            }
            warn!(
                generation,
                current = status.generation,
                "Discarding connect result, session changed meanwhile"
            );
            matches!(*self.inner.session_tx.borrow(), SessionState::SignedOut)
        };

        // A disconnect that ran before the wallet answered found nothing to
        // deauthorize; the session the wallet granted afterwards goes too.
        if signed_out_meanwhile && self.inner.wallet.session().is_some() {
            if let Err(err) = self.inner.wallet.disconnect().await {
                warn!(generation, error = %err, "Deauthorizing superseded connect failed");
            }
        }
        Err(AppError::Superseded)
    }

    fn commit_connect(
        &self,
        status: &mut StoreStatus,
        result: Result<WalletInfo>,
        previous: SessionState,
    ) -> Result<WalletInfo> {
        match result {
            Ok(info) => {
                status.last_error = None;
                self.inner.session_tx.send_replace(SessionState::SignedIn(info.clone()));
                info!(address = %info.public_key, lamports = info.lamports, "Wallet connected");
                Ok(info)
            }
            Err(err) => {
                status.last_error = Some(err.user_message());
                // A pending connect from an older generation never commits, so
                // restoring Connecting would stick.
                let restored = match previous {
                    SessionState::Connecting => SessionState::SignedOut,
                    other => other,
                };
                self.inner.session_tx.send_replace(restored);
                if err.is_user_rejection() {
                    info!(error = %err, "Wallet connection declined");
                } else {
                    warn!(error = %err, "Wallet connection failed");
                }
                Err(err)
            }
        }
    }

    async fn authorize_and_load(&self, mode: ConnectMode) -> Result<WalletInfo> {
        let account = match mode {
            ConnectMode::Authorize => self.inner.wallet.connect().await?,
            ConnectMode::SignIn(payload) => self.inner.wallet.sign_in(payload).await?,
        };
        let lamports = self.inner.network.get_balance(&account.address).await?;
        Ok(WalletInfo::new(account.address, lamports))
    }

    /// Sign out. Always ends `SignedOut`; a failing wallet deauthorize is
    /// logged and otherwise ignored.
    pub async fn disconnect_wallet(&self) {
        let (generation, _) = self.begin_session_change(SessionState::SignedOut, true);

        if let Err(err) = self.inner.wallet.disconnect().await {
            warn!(generation, error = %err, "Wallet disconnect failed, session cleared anyway");
        }

        // A connect started after this disconnect owns the session now.
        let mut status = self.inner.status.lock();
        if status.generation == generation {
            status.is_loading = false;
            self.inner.session_tx.send_replace(SessionState::SignedOut);
        }
        info!(generation, "Wallet disconnected");
    }

    /// Request devnet SOL for the signed-in account.
    ///
    /// Returns as soon as the faucet accepts; the balance is re-read after
    /// `balance_reload_delay` on a background task.
    pub async fn request_airdrop(&self, amount_sol: f64) -> Result<Signature> {
        let info = self.wallet_info().ok_or(AppError::NotConnected)?;

        let signature = match self.inner.network.request_airdrop(&info.public_key, amount_sol).await {
            Ok(signature) => signature,
            Err(err) => {
                self.record_error(&err);
                return Err(err);
            }
        };

        info!(%signature, address = %info.public_key, amount_sol, "Airdrop requested");
        self.inner.notifications.push(
            NotificationKind::Airdrop,
            "Airdrop Requested",
            format!("{} SOL on its way\n{}", amount_sol, explorer_tx_url(&signature.to_string())),
        );
        self.schedule_refresh(self.inner.config.balance_reload_delay);

        Ok(signature)
    }

    /// Have the wallet sign and submit `transaction` for the signed-in account.
    pub async fn sign_and_send_transaction(
        &self,
        transaction: VersionedTransaction,
        min_context_slot: u64,
    ) -> Result<Signature> {
        if !self.is_authenticated() {
            return Err(AppError::NotConnected);
        }
        let link = |signature: &Signature| explorer_tx_url(&signature.to_string());
        self.submit(transaction, min_context_slot, NotificationKind::Transaction, "Transaction Sent", link)
            .await
    }

    /// Transfer `amount_sol` from the signed-in account to `to`.
    ///
    /// The transfer is built against the latest blockhash and signed by the
    /// wallet. No balance check happens here; the cluster rejects overdrafts.
    pub async fn send_sol(&self, to: Pubkey, amount_sol: f64) -> Result<Signature> {
        let info = self.wallet_info().ok_or(AppError::NotConnected)?;

        let transaction = self
            .build_transfer(&info.public_key, &to, amount_sol)
            .await
            .inspect_err(|err| self.record_error(err))?;

        info!(from = %info.public_key, %to, amount_sol, "Sending SOL");
        let link = |signature: &Signature| {
            format!("{} SOL to {}\n{}", amount_sol, to, explorer_tx_url(&signature.to_string()))
        };
        self.submit(transaction, 0, NotificationKind::Transaction, "Transfer Sent", link)
            .await
    }

    async fn build_transfer(&self, from: &Pubkey, to: &Pubkey, amount_sol: f64) -> Result<VersionedTransaction> {
        let lamports = sol_to_lamports(amount_sol)?;
        let blockhash = self.inner.network.get_latest_blockhash().await?;
        transfer_transaction(from, to, lamports, blockhash)
    }

    /// Execute a routed swap for the signed-in account.
    ///
    /// The router builds the transaction for `quote`; the wallet signs and
    /// submits it.
    pub async fn execute_swap(&self, swaps: &dyn SwapService, quote: &QuoteResponse) -> Result<Signature> {
        let info = self.wallet_info().ok_or(AppError::NotConnected)?;

        let transaction = swaps
            .swap_transaction(quote, &info.public_key)
            .await
            .inspect_err(|err| self.record_error(err))?;

        info!(
            input = %quote.input_mint,
            output = %quote.output_mint,
            in_amount = %quote.in_amount,
            out_amount = %quote.out_amount,
            "Executing swap"
        );
        let summary = format!("{} -> {}", quote.in_amount, quote.out_amount);
        let link = |signature: &Signature| format!("{}\n{}", summary, explorer_tx_url(&signature.to_string()));
        self.submit(transaction, 0, NotificationKind::Trade, "Swap Submitted", link)
            .await
    }

    /// Sign and send through the wallet, then notify and schedule a refresh.
    async fn submit(
        &self,
        transaction: VersionedTransaction,
        min_context_slot: u64,
        kind: NotificationKind,
        title: &str,
        message: impl FnOnce(&Signature) -> String,
    ) -> Result<Signature> {
        let signature = self
            .inner
            .wallet
            .sign_and_send_transaction(transaction, min_context_slot)
            .await
            .inspect_err(|err| self.record_error(err))?;

        info!(%signature, ?kind, "Transaction submitted");
        self.inner.notifications.push(kind, title, message(&signature));
        self.schedule_refresh(self.inner.config.balance_reload_delay);

        Ok(signature)
    }

    /// Re-read the balance of the signed-in account.
    pub async fn refresh_balance(&self) -> Result<WalletInfo> {
        let generation = self.current_generation();
        let info = self.wallet_info().ok_or(AppError::NotConnected)?;

        let lamports = self.inner.network.get_balance(&info.public_key).await?;
        let updated = WalletInfo::new(info.public_key, lamports);

        let status = self.inner.status.lock();
        if status.generation != generation {
            debug!(generation, current = status.generation, "Dropping stale balance");
            return Err(AppError::Superseded);
        }
        self.inner.session_tx.send_replace(SessionState::SignedIn(updated.clone()));
        debug!(address = %updated.public_key, lamports, "Balance refreshed");

        Ok(updated)
    }

    // endregion: --- Mutations

    // region: --- Background tasks

    fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.inner.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Refresh the balance once after `delay`, without blocking the caller.
    fn schedule_refresh(&self, delay: Duration) {
        let store = self.clone();
        let handle = spawn_tracked("balance_reload", async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = store.refresh_balance().await {
                debug!(error = %err, "Delayed balance refresh skipped");
            }
        });
        self.track(handle);
    }

    /// Refresh the balance every `period` while signed in.
    pub fn spawn_balance_poller(&self, period: Duration) {
        let store = self.clone();
        let handle = spawn_tracked("balance_poller", async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !store.is_authenticated() {
                    continue;
                }
                if let Err(err) = store.refresh_balance().await {
                    debug!(error = %err, "Periodic balance refresh failed");
                }
            }
        });
        self.track(handle);
    }

    /// Probe the RPC endpoint every `connection_check_interval`.
    ///
    /// After `reconnection_retry_threshold` consecutive failures one `System`
    /// notification is pushed; a successful check re-arms it.
    pub fn spawn_health_monitor(&self) {
        let store = self.clone();
        let period = self.inner.config.connection_check_interval;
        let threshold = self.inner.config.reconnection_retry_threshold.max(1);

        let handle = spawn_tracked("health_monitor", async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut failures = 0u32;

            loop {
                ticker.tick().await;
                match store.inner.network.health_check().await {
                    Ok(()) => {
                        if failures > 0 {
                            info!(failures, "RPC endpoint reachable again");
                        }
                        failures = 0;
                    }
                    Err(err) => {
                        failures += 1;
                        warn!(failures, error = %err, "RPC health check failed");
                        if failures == threshold {
                            store.inner.notifications.push(
                                NotificationKind::System,
                                "Connection Problem",
                                "The Solana network is not responding. Try reconnecting your wallet.",
                            );
                        }
                    }
                }
            }
        });
        self.track(handle);
    }

    /// Abort every background task this store started.
    pub fn dispose(&self) {
        let tasks: Vec<_> = self.inner.tasks.lock().drain(..).collect();
        let count = tasks.len();
        let running = active_task_count();
        for task in tasks {
            task.abort();
        }
        info!(count, running, "App store disposed");
    }

    // endregion: --- Background tasks
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::keypair::tests::{RecordingNetwork, RECENT_BLOCKHASH};
    use crate::services::wallet::tests::{empty_transaction, wallet_for, MockTransport};
    use crate::services::wallet::{Account, MobileWallet, WalletSession};
    use crate::services::KeypairTransport;
    use async_trait::async_trait;
    use lib_core::config::NETWORK_CONFIG;
    use solana_sdk::hash::Hash;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    pub(crate) const ADDR1: &str = "So11111111111111111111111111111111111111112";

    /// Wallet adapter with scripted outcomes.
    #[derive(Default)]
    pub(crate) struct MockWallet {
        pub address: Option<Pubkey>,
        pub deny: AtomicBool,
        pub fail_disconnect: bool,
        pub signature_count: usize,
        /// When set, `connect` waits for a permit before answering.
        pub gate: Option<Arc<Notify>>,
        pub connects: AtomicUsize,
        pub disconnects: AtomicUsize,
    }

    impl MockWallet {
        pub fn with_address(address: Pubkey) -> Self {
            Self {
                address: Some(address),
                signature_count: 1,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl WalletAdapter for MockWallet {
        async fn connect(&self) -> Result<Account> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.deny.load(Ordering::SeqCst) {
                return Err(AppError::AuthorizationDenied("user declined".to_string()));
            }
            self.address
                .map(|address| Account { address, label: None })
                .ok_or(AppError::NoWalletAvailable)
        }

        async fn sign_in(&self, payload: SignInPayload) -> Result<Account> {
            payload.validate()?;
            self.connect().await
        }

        async fn disconnect(&self) -> Result<()> {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            if self.fail_disconnect {
                return Err(AppError::WalletRejected("wallet crashed".to_string()));
            }
            Ok(())
        }

        async fn sign_and_send_transaction(
            &self,
            _transaction: VersionedTransaction,
            _min_context_slot: u64,
        ) -> Result<Signature> {
            (0..self.signature_count)
                .map(|i| Signature::from([i as u8 + 1; 64]))
                .next()
                .ok_or(AppError::NoSignatureReturned)
        }

        async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
            Ok(message.to_vec())
        }

        fn session(&self) -> Option<WalletSession> {
            None
        }
    }

    /// Network with a settable balance that counts balance reads.
    #[derive(Default)]
    pub(crate) struct MockNetwork {
        pub lamports: AtomicU64,
        pub balance_reads: AtomicUsize,
        pub airdrop_error: Option<AppError>,
        pub healthy: AtomicBool,
        pub health_checks: AtomicUsize,
    }

    impl MockNetwork {
        pub fn with_lamports(lamports: u64) -> Self {
            Self {
                lamports: AtomicU64::new(lamports),
                healthy: AtomicBool::new(true),
                ..Default::default()
            }
        }

        pub fn balance_reads(&self) -> usize {
            self.balance_reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NetworkService for MockNetwork {
        async fn get_balance(&self, _pubkey: &Pubkey) -> Result<u64> {
            self.balance_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.lamports.load(Ordering::SeqCst))
        }

        async fn request_airdrop(&self, _pubkey: &Pubkey, amount_sol: f64) -> Result<Signature> {
            if let Some(err) = &self.airdrop_error {
                return Err(err.clone());
            }
            let lamports = lib_solana::client::sol_to_lamports(amount_sol)?;
            self.lamports.fetch_add(lamports, Ordering::SeqCst);
            Ok(Signature::from([9u8; 64]))
        }

        async fn get_latest_blockhash(&self) -> Result<Hash> {
            Ok(Hash::default())
        }

        async fn send_transaction_with_min_slot(
            &self,
            transaction: &VersionedTransaction,
            _min_context_slot: u64,
        ) -> Result<Signature> {
            Ok(transaction.signatures[0])
        }

        async fn health_check(&self) -> Result<()> {
            self.health_checks.fetch_add(1, Ordering::SeqCst);
            if self.healthy.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(AppError::Network("connection refused".to_string()))
            }
        }
    }

    pub(crate) fn addr1() -> Pubkey {
        Pubkey::from_str(ADDR1).unwrap()
    }

    pub(crate) fn store_with(wallet: MockWallet, network: Arc<MockNetwork>) -> AppStore {
        AppStore::new(Arc::new(wallet), network, NETWORK_CONFIG)
    }

    /// Router that hands back a fixed transaction for the requesting user.
    #[derive(Default)]
    struct MockSwaps {
        fail: bool,
    }

    #[async_trait]
    impl SwapService for MockSwaps {
        async fn quote(
            &self,
            input_mint: &str,
            output_mint: &str,
            amount: u64,
            slippage_bps: u16,
        ) -> Result<QuoteResponse> {
            Ok(QuoteResponse {
                input_mint: input_mint.to_string(),
                output_mint: output_mint.to_string(),
                in_amount: amount.to_string(),
                out_amount: (amount / 7).to_string(),
                other_amount_threshold: None,
                slippage_bps,
                price_impact_pct: 0.001,
                route_plan: Vec::new(),
            })
        }

        async fn swap_transaction(&self, _quote: &QuoteResponse, user: &Pubkey) -> Result<VersionedTransaction> {
            if self.fail {
                return Err(AppError::Network("swap endpoint unavailable".to_string()));
            }
            Ok(empty_transaction(*user))
        }
    }

    #[tokio::test]
    async fn test_connect_signs_in_with_wallet_address() {
        let network = Arc::new(MockNetwork::with_lamports(2_000_000_000));
        let store = store_with(MockWallet::with_address(addr1()), network);

        let info = store.connect_wallet().await.unwrap();

        assert!(store.is_authenticated());
        assert_eq!(info.public_key.to_string(), ADDR1);
        assert_eq!(info.balance, 2.0);
        assert_eq!(store.session(), SessionState::SignedIn(info));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_denied_authorization_leaves_state_unchanged() {
        let network = Arc::new(MockNetwork::with_lamports(0));
        let wallet = MockWallet::with_address(addr1());
        wallet.deny.store(true, Ordering::SeqCst);
        let store = store_with(wallet, network.clone());

        let err = store.connect_wallet().await.unwrap_err();

        assert!(matches!(err, AppError::AuthorizationDenied(_)));
        assert_eq!(store.session(), SessionState::SignedOut);
        assert!(!store.is_authenticated());
        assert_eq!(store.last_error().as_deref(), Some("Wallet authorization was cancelled"));
        assert_eq!(network.balance_reads(), 0);

        store.clear_error();
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_failed_reconnect_keeps_existing_session() {
        let network = Arc::new(MockNetwork::with_lamports(5));
        let wallet = Arc::new(MockWallet::with_address(addr1()));
        let store = AppStore::new(wallet.clone(), network, NETWORK_CONFIG);
        let info = store.connect_wallet().await.unwrap();

        wallet.deny.store(true, Ordering::SeqCst);
        assert!(store.connect_wallet().await.is_err());

        assert_eq!(store.session(), SessionState::SignedIn(info));
    }

    #[tokio::test]
    async fn test_disconnect_always_signs_out() {
        let network = Arc::new(MockNetwork::with_lamports(1));
        let wallet = MockWallet {
            fail_disconnect: true,
            ..MockWallet::with_address(addr1())
        };
        let store = store_with(wallet, network);

        store.connect_wallet().await.unwrap();
        store.disconnect_wallet().await;

        assert_eq!(store.session(), SessionState::SignedOut);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_with_malformed_payload() {
        let network = Arc::new(MockNetwork::with_lamports(1));
        let store = store_with(MockWallet::with_address(addr1()), network);

        let err = store
            .connect_with_sign_in(SignInPayload::new("dex-wallet.app", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MalformedPayload(_)));
        assert_eq!(store.session(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_subscribers_see_connecting_then_signed_in() {
        let network = Arc::new(MockNetwork::with_lamports(1));
        let gate = Arc::new(Notify::new());
        let wallet = MockWallet {
            gate: Some(gate.clone()),
            ..MockWallet::with_address(addr1())
        };
        let store = store_with(wallet, network);
        let mut rx = store.subscribe();

        let connecting = tokio::spawn({
            let store = store.clone();
            async move { store.connect_wallet().await }
        });

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionState::Connecting);
        assert!(store.is_loading());

        gate.notify_one();
        connecting.await.unwrap().unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_reconnect_stays_signed_in_while_pending() {
        let network = Arc::new(MockNetwork::with_lamports(1));
        let gate = Arc::new(Notify::new());
        let wallet = MockWallet {
            gate: Some(gate.clone()),
            ..MockWallet::with_address(addr1())
        };
        let store = store_with(wallet, network);
        gate.notify_one();
        store.connect_wallet().await.unwrap();
        let mut rx = store.subscribe();

        let reconnect = tokio::spawn({
            let store = store.clone();
            async move { store.connect_wallet().await }
        });

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());
        assert!(store.is_loading());

        gate.notify_one();
        reconnect.await.unwrap().unwrap();
        assert!(store.is_authenticated());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_disconnect_during_connect_wins() {
        let network = Arc::new(MockNetwork::with_lamports(1));
        let gate = Arc::new(Notify::new());
        let wallet = MockWallet {
            gate: Some(gate.clone()),
            ..MockWallet::with_address(addr1())
        };
        let store = store_with(wallet, network);
        let mut rx = store.subscribe();

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.connect_wallet().await }
        });
        rx.changed().await.unwrap();

        store.disconnect_wallet().await;
        gate.notify_one();

        assert_eq!(pending.await.unwrap().unwrap_err(), AppError::Superseded);
        assert_eq!(store.session(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_wallet_session_granted_after_disconnect_is_revoked() {
        let network = Arc::new(MockNetwork::with_lamports(1));
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(MockTransport {
            gate: Some(gate.clone()),
            ..MockTransport::with_address(addr1())
        });
        let wallet = Arc::new(wallet_for(&transport));
        let store = AppStore::new(wallet.clone(), network, NETWORK_CONFIG);
        let mut rx = store.subscribe();

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.connect_wallet().await }
        });
        rx.changed().await.unwrap();

        // Nothing to deauthorize yet: the wallet has not answered.
        store.disconnect_wallet().await;
        assert_eq!(transport.deauthorized(), 0);

        gate.notify_one();
        assert_eq!(pending.await.unwrap().unwrap_err(), AppError::Superseded);

        assert_eq!(store.session(), SessionState::SignedOut);
        assert!(wallet.session().is_none());
        assert_eq!(transport.deauthorized(), 1);
    }

    #[tokio::test]
    async fn test_superseded_connect_leaves_newer_session_alone() {
        let network = Arc::new(MockNetwork::with_lamports(1));
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(MockTransport {
            gate: Some(gate.clone()),
            ..MockTransport::with_address(addr1())
        });
        let wallet: Arc<MobileWallet> = Arc::new(wallet_for(&transport));
        let store = AppStore::new(wallet.clone(), network, NETWORK_CONFIG);
        let mut rx = store.subscribe();

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.connect_wallet().await }
        });
        rx.changed().await.unwrap();
        store.disconnect_wallet().await;
        rx.borrow_and_update();

        let second = tokio::spawn({
            let store = store.clone();
            async move { store.connect_wallet().await }
        });
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionState::Connecting);

        gate.notify_one();
        gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap_err(), AppError::Superseded);
        second.await.unwrap().unwrap();

        assert!(store.is_authenticated());
        assert!(wallet.session().is_some());
        assert_eq!(transport.deauthorized(), 0);
    }

    #[tokio::test]
    async fn test_airdrop_requires_sign_in() {
        let network = Arc::new(MockNetwork::with_lamports(0));
        let store = store_with(MockWallet::with_address(addr1()), network);

        assert_eq!(store.request_airdrop(2.0).await.unwrap_err(), AppError::NotConnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_airdrop_refresh_waits_for_settlement() {
        let network = Arc::new(MockNetwork::with_lamports(0));
        let store = store_with(MockWallet::with_address(addr1()), network.clone());
        store.connect_wallet().await.unwrap();
        let reads_after_connect = network.balance_reads();

        let signature = store.request_airdrop(2.0).await.unwrap();
        assert_eq!(signature, Signature::from([9u8; 64]));

        // returned before settlement: balance not re-read yet
        assert_eq!(store.wallet_info().unwrap().lamports, 0);
        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(network.balance_reads(), reads_after_connect);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(network.balance_reads(), reads_after_connect + 1);
        assert_eq!(store.wallet_info().unwrap().balance, 2.0);

        let notifications = store.notifications().list();
        assert_eq!(notifications[0].kind, NotificationKind::Airdrop);
    }

    #[tokio::test]
    async fn test_airdrop_failure_is_recorded() {
        let network = Arc::new(MockNetwork {
            airdrop_error: Some(AppError::RateLimited("429".to_string())),
            ..MockNetwork::with_lamports(0)
        });
        let store = store_with(MockWallet::with_address(addr1()), network);
        store.connect_wallet().await.unwrap();

        let err = store.request_airdrop(2.0).await.unwrap_err();

        assert!(matches!(err, AppError::RateLimited(_)));
        assert!(store.last_error().is_some());
        assert!(store.notifications().is_empty());
        assert!(store.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_sign_out_is_dropped() {
        let network = Arc::new(MockNetwork::with_lamports(0));
        let store = store_with(MockWallet::with_address(addr1()), network);
        store.connect_wallet().await.unwrap();

        store.request_airdrop(1.0).await.unwrap();
        store.disconnect_wallet().await;
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(store.session(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_and_send_needs_session_and_signature() {
        let payer = addr1();
        let network = Arc::new(MockNetwork::with_lamports(0));
        let tx = empty_transaction(payer);

        let store = store_with(MockWallet::with_address(payer), network.clone());
        assert_eq!(
            store.sign_and_send_transaction(tx.clone(), 0).await.unwrap_err(),
            AppError::NotConnected
        );
        store.connect_wallet().await.unwrap();
        assert_eq!(
            store.sign_and_send_transaction(tx.clone(), 0).await.unwrap(),
            Signature::from([1u8; 64])
        );
        assert_eq!(store.notifications().list()[0].kind, NotificationKind::Transaction);

        let silent = MockWallet {
            signature_count: 0,
            ..MockWallet::with_address(payer)
        };
        let store = store_with(silent, network);
        store.connect_wallet().await.unwrap();
        assert_eq!(
            store.sign_and_send_transaction(tx, 0).await.unwrap_err(),
            AppError::NoSignatureReturned
        );
    }

    #[tokio::test]
    async fn test_send_sol_signs_transfer_from_session_account() {
        let network = Arc::new(RecordingNetwork::default());
        let transport = KeypairTransport::generate(network.clone());
        let payer = transport.pubkey();
        let wallet = MobileWallet::new(Arc::new(transport));
        let store = AppStore::new(Arc::new(wallet), network.clone(), NETWORK_CONFIG);
        let recipient = addr1();

        assert_eq!(store.send_sol(recipient, 0.5).await.unwrap_err(), AppError::NotConnected);
        store.connect_wallet().await.unwrap();

        let signature = store.send_sol(recipient, 0.5).await.unwrap();

        let sent = network.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].signatures[0], signature);
        assert_ne!(signature, Signature::default());

        let message = &sent[0].message;
        assert_eq!(*message.recent_blockhash(), RECENT_BLOCKHASH);
        let keys = message.static_account_keys();
        assert_eq!(keys[0], payer);
        assert!(keys.contains(&recipient));

        // System program transfer: variant 2, then lamports little-endian
        let mut data = vec![2, 0, 0, 0];
        data.extend_from_slice(&500_000_000u64.to_le_bytes());
        assert_eq!(message.instructions()[0].data, data);

        let notifications = store.notifications().list();
        assert_eq!(notifications[0].kind, NotificationKind::Transaction);
        assert!(notifications[0].message.contains(&recipient.to_string()));
    }

    #[tokio::test]
    async fn test_send_sol_rejects_bad_amount_without_signing() {
        let network = Arc::new(MockNetwork::with_lamports(1));
        let wallet = Arc::new(MockWallet::with_address(addr1()));
        let store = AppStore::new(wallet, network, NETWORK_CONFIG);
        store.connect_wallet().await.unwrap();

        let err = store.send_sol(Pubkey::new_unique(), -1.0).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(store.last_error().is_some());
        assert!(store.notifications().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_swap_submits_routed_transaction() {
        let network = Arc::new(MockNetwork::with_lamports(0));
        let store = store_with(MockWallet::with_address(addr1()), network.clone());
        let swaps = MockSwaps::default();
        let quote = swaps.quote(ADDR1, "USDC", 700, 50).await.unwrap();

        assert_eq!(store.execute_swap(&swaps, &quote).await.unwrap_err(), AppError::NotConnected);
        store.connect_wallet().await.unwrap();
        let reads_after_connect = network.balance_reads();

        let signature = store.execute_swap(&swaps, &quote).await.unwrap();

        assert_eq!(signature, Signature::from([1u8; 64]));
        let notifications = store.notifications().list();
        assert_eq!(notifications[0].kind, NotificationKind::Trade);
        assert!(notifications[0].message.starts_with("700 -> 100"));

        tokio::time::sleep(store.network_config().balance_reload_delay + Duration::from_millis(100)).await;
        assert_eq!(network.balance_reads(), reads_after_connect + 1);
    }

    #[tokio::test]
    async fn test_swap_router_failure_is_recorded() {
        let network = Arc::new(MockNetwork::with_lamports(0));
        let store = store_with(MockWallet::with_address(addr1()), network);
        store.connect_wallet().await.unwrap();
        let swaps = MockSwaps { fail: true };
        let quote = swaps.quote(ADDR1, "USDC", 700, 50).await.unwrap();

        let err = store.execute_swap(&swaps, &quote).await.unwrap_err();

        assert!(matches!(err, AppError::Network(_)));
        assert!(store.last_error().is_some());
        assert!(store.notifications().is_empty());
        assert!(store.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_balance_poller_refreshes_while_signed_in() {
        let network = Arc::new(MockNetwork::with_lamports(10));
        let store = store_with(MockWallet::with_address(addr1()), network.clone());
        store.spawn_balance_poller(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(network.balance_reads(), 0);

        store.connect_wallet().await.unwrap();
        network.lamports.store(20, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(store.wallet_info().unwrap().lamports, 20);
        store.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_monitor_notifies_once_after_threshold() {
        let network = Arc::new(MockNetwork::with_lamports(0));
        network.healthy.store(false, Ordering::SeqCst);
        let store = store_with(MockWallet::with_address(addr1()), network.clone());
        let period = store.network_config().connection_check_interval;
        store.spawn_health_monitor();

        tokio::time::sleep(period * 2 + Duration::from_secs(1)).await;
        assert!(store.notifications().is_empty());

        tokio::time::sleep(period * 3).await;
        let system: Vec<_> = store
            .notifications()
            .list()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::System)
            .collect();
        assert_eq!(system.len(), 1);
        assert_eq!(network.health_checks.load(Ordering::SeqCst), 5);
        store.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_background_tasks() {
        let network = Arc::new(MockNetwork::with_lamports(0));
        let store = store_with(MockWallet::with_address(addr1()), network.clone());
        store.spawn_health_monitor();
        store.dispose();

        tokio::time::sleep(store.network_config().connection_check_interval * 3).await;
        assert_eq!(network.health_checks.load(Ordering::SeqCst), 0);
    }
}
