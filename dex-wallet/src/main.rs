//! DEX Wallet command-line entry point
//!
//! Drives the session core against devnet: balances, airdrops, transfers,
//! Jupiter quotes and swaps, constant-product quotes, and a full sign-in /
//! sign-out session.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dex_wallet::app::{AppEvent, AppStore, AuthGate, NavigationGuard, Route};
use dex_wallet::core::{NetworkService, SwapService};
use dex_wallet::debug::{self, LogConfig};
use dex_wallet::services::{keypair_from_file, KeypairTransport, MobileWallet};
use dex_wallet::utils::Prefs;
use lib_core::config::{
    devnet, explorer_account_url, explorer_token_url, explorer_tx_url, init_config, Config,
};
use lib_solana::amm::{constant_product_quote, DEFAULT_HOOK_FEE_BPS};
use lib_solana::client::lamports_to_sol;
use lib_solana::{JupiterClient, SolanaClient};
use lib_utils::{format_time, validate_base58_address};
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// DEX Wallet: Solana wallet session core
#[derive(Parser, Debug)]
#[command(name = "dex-wallet")]
#[command(about = "Wallet session, airdrop and swap quotes on Solana devnet")]
struct Args {
    /// Keypair file (JSON byte array); defaults to DEX_KEYPAIR_PATH, then ~/.config/solana/id.json
    #[arg(short, long, global = true)]
    keypair: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the SOL balance of an address (defaults to the local keypair)
    Balance { address: Option<String> },

    /// Request devnet SOL for the local keypair
    Airdrop {
        #[arg(default_value_t = devnet::DEFAULT_AIRDROP_AMOUNT)]
        amount: f64,
    },

    /// Send SOL from the local keypair to another address
    Send {
        to: String,
        /// Amount in SOL
        amount: f64,
    },

    /// Fetch a Jupiter quote, e.g. `quote SOL USDC 1000000`
    Quote {
        input: String,
        output: String,
        /// Amount in the input token's smallest unit
        amount: u64,
        #[arg(long, default_value_t = 50)]
        slippage_bps: u16,
    },

    /// Quote and execute a Jupiter swap with the local keypair
    Swap {
        input: String,
        output: String,
        /// Amount in the input token's smallest unit
        amount: u64,
        #[arg(long, default_value_t = 50)]
        slippage_bps: u16,
    },

    /// Quote a swap against a constant-product pool
    AmmQuote {
        amount_in: f64,
        reserve_in: f64,
        reserve_out: f64,
        #[arg(long, default_value_t = 30.0)]
        fee_bps: f64,
        #[arg(long, default_value_t = DEFAULT_HOOK_FEE_BPS)]
        hook_fee_bps: f64,
    },

    /// Generate a keypair and print it
    NewKeypair,

    /// Sign in with the local keypair, watch the session for a while, sign out
    Session {
        /// Seconds to stay signed in
        #[arg(long, default_value_t = 10)]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = init_config().context("Invalid configuration")?;
    let _log_guard = debug::init_logger(&LogConfig::from_env()).context("Failed to initialize logging")?;

    match Prefs::mark_welcome_shown(&config.data_dir) {
        Ok(true) => println!("Welcome to DEX Wallet. Running against {}", config.rpc_url),
        Ok(false) => {}
        Err(e) => warn!(error = %e, data_dir = %config.data_dir.display(), "Could not update preferences"),
    }

    let result = run(args, config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}

async fn run(args: Args, config: &'static Config) -> Result<()> {
    let client = SolanaClient::from_config(config);
    let network: Arc<dyn NetworkService> = Arc::new(client);

    match args.command {
        Command::Balance { address } => {
            let pubkey = match address {
                Some(address) => parse_address(&address)?,
                None => load_transport(args.keypair, network.clone())?.pubkey(),
            };
            let lamports = network.get_balance(&pubkey).await?;
            println!("{} SOL  ({})", lamports_to_sol(lamports), explorer_account_url(&pubkey.to_string()));
        }

        Command::Airdrop { amount } => {
            let store = build_store(args.keypair, network, config)?;
            store.connect_wallet().await?;

            let signature = store.request_airdrop(amount).await?;
            println!("Airdrop requested: {}", explorer_tx_url(&signature.to_string()));

            print_balance_after_refresh(&store).await;
            store.dispose();
        }

        Command::Send { to, amount } => {
            let recipient = parse_address(&to)?;
            let store = build_store(args.keypair, network, config)?;
            store.connect_wallet().await?;

            let signature = store.send_sol(recipient, amount).await?;
            println!("Sent {} SOL to {}: {}", amount, recipient, explorer_tx_url(&signature.to_string()));

            print_balance_after_refresh(&store).await;
            store.dispose();
        }

        Command::Swap { input, output, amount, slippage_bps } => {
            let jupiter = JupiterClient::from_config(config)?;
            let input_mint = resolve_mint(&jupiter, &input).await?;
            let output_mint = resolve_mint(&jupiter, &output).await?;

            let store = build_store(args.keypair, network, config)?;
            store.connect_wallet().await?;

            let quote = jupiter.quote(&input_mint, &output_mint, amount, slippage_bps).await?;
            println!(
                "Swapping {} {} for ~{} {} (impact {:.4}%)",
                quote.in_amount, input, quote.out_amount, output, quote.price_impact_pct
            );

            let signature = store.execute_swap(&jupiter, &quote).await?;
            println!("Swap submitted: {}", explorer_tx_url(&signature.to_string()));

            print_balance_after_refresh(&store).await;
            store.dispose();
        }

        Command::Quote { input, output, amount, slippage_bps } => {
            let jupiter = JupiterClient::from_config(config)?;
            let input_mint = resolve_mint(&jupiter, &input).await?;
            let output_mint = resolve_mint(&jupiter, &output).await?;

            let quote = jupiter.get_swap_quote(&input_mint, &output_mint, amount, slippage_bps).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
            println!("{}\n{}", explorer_token_url(&input_mint), explorer_token_url(&output_mint));
        }

        Command::AmmQuote { amount_in, reserve_in, reserve_out, fee_bps, hook_fee_bps } => {
            let quote = constant_product_quote(amount_in, reserve_in, reserve_out, fee_bps, hook_fee_bps)?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }

        Command::NewKeypair => {
            let transport = KeypairTransport::generate(network);
            println!("Public key: {}", transport.pubkey());
            println!("Secret key: {}", transport.export_base58());
        }

        Command::Session { duration } => {
            let store = build_store(args.keypair, network, config)?;
            run_session(store, Duration::from_secs(duration)).await?;
        }
    }

    Ok(())
}

async fn run_session(store: AppStore, duration: Duration) -> Result<()> {
    let (events_tx, events_rx) = async_channel::unbounded::<AppEvent>();
    let (route_tx, route_rx) = watch::channel(Route::Welcome);

    let guard = NavigationGuard::new(store.subscribe(), route_rx, events_tx.clone()).spawn();
    store.spawn_health_monitor();

    let gate = AuthGate::new(store.clone());
    gate.spawn_sign_in(events_tx.clone());

    // Stand-in for a UI loop: apply navigations and print outcomes
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            event = events_rx.recv() => {
                let Ok(event) = event else { break };
                match event {
                    AppEvent::Navigate(route) => {
                        println!("-> {}", route.title());
                        route_tx.send_replace(route);
                    }
                    AppEvent::Loading(message) => println!("{}", message),
                    AppEvent::SignInResult(Ok(address)) => {
                        println!("Signed in as {}", address);
                        store.spawn_balance_poller(store.network_config().balance_poll_interval);
                    }
                    AppEvent::SignInResult(Err(message)) => {
                        println!("Sign-in failed: {}", message);
                        break;
                    }
                }
            }
            _ = &mut deadline => break,
        }
    }

    if let Some(info) = store.wallet_info() {
        println!("Balance: {} SOL", info.balance);
    }
    for notification in store.notifications().list() {
        println!(
            "{} [{:?}] {}: {}",
            format_time(notification.timestamp),
            notification.kind,
            notification.title,
            notification.message
        );
    }

    gate.sign_out().await;
    info!(authenticated = gate.is_authenticated(), "Session ended");

    store.dispose();
    guard.abort();
    Ok(())
}

fn build_store(keypair: Option<PathBuf>, network: Arc<dyn NetworkService>, config: &Config) -> Result<AppStore> {
    let transport = load_transport(keypair, network.clone())?;
    let wallet = MobileWallet::new(Arc::new(transport))
        .with_token_refresh_threshold(config.network.auth_token_refresh_threshold);
    Ok(AppStore::new(Arc::new(wallet), network, config.network.clone()))
}

/// The explicit path, then `DEX_KEYPAIR_PATH`, then the Solana CLI default.
/// Generates a throwaway keypair when none of them exist.
fn load_transport(explicit: Option<PathBuf>, network: Arc<dyn NetworkService>) -> Result<KeypairTransport> {
    let path = explicit
        .or_else(|| lib_utils::get_env("DEX_KEYPAIR_PATH").ok().map(PathBuf::from))
        .or_else(|| dirs::home_dir().map(|home| home.join(".config/solana/id.json")));

    match path {
        Some(path) if path.exists() => {
            let keypair = keypair_from_file(&path).with_context(|| format!("Cannot load {}", path.display()))?;
            Ok(KeypairTransport::new(keypair, network).with_label(path.display().to_string()))
        }
        _ => {
            warn!("No keypair file found, using a generated keypair");
            Ok(KeypairTransport::generate(network))
        }
    }
}

/// Wait out the store's settlement delay, then print the refreshed balance.
async fn print_balance_after_refresh(store: &AppStore) {
    tokio::time::sleep(store.network_config().balance_reload_delay + Duration::from_millis(500)).await;
    if let Some(info) = store.wallet_info() {
        println!("Balance: {} SOL", info.balance);
    }
}

fn parse_address(address: &str) -> Result<Pubkey> {
    validate_base58_address(address).map_err(anyhow::Error::msg)?;
    Pubkey::from_str(address.trim()).context("Invalid address")
}

/// Mint addresses pass through; symbols go through the Jupiter token list.
async fn resolve_mint(jupiter: &JupiterClient, token: &str) -> Result<String> {
    if validate_base58_address(token).is_ok() {
        return Ok(token.trim().to_string());
    }
    jupiter
        .get_mint_for_symbol(token)
        .await
        .with_context(|| format!("Unknown token symbol '{}'", token))
}
