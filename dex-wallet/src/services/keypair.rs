//! # Local Keypair Wallet
//!
//! A [`WalletTransport`] backed by a keypair held in memory, for desktops and
//! tests where no wallet app is installed.
//!
//! Supported key formats:
//! - 32-byte ed25519 seed
//! - 64-byte secret key (seed followed by public key; the public half is checked)
//! - either of the above as base58, or as a JSON byte array file
//!   (Solana CLI `id.json`)

use crate::core::service::NetworkService;
use crate::services::wallet::{
    Account, AuthorizationRequest, AuthorizationResult, WalletScope, WalletTransport,
};
use async_trait::async_trait;
use lib_core::{AppError, Result};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Build a keypair from a 32-byte seed or a 64-byte secret key.
pub fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair> {
    let (seed, public) = match bytes.len() {
        32 => (bytes, None),
        64 => (&bytes[..32], Some(&bytes[32..])),
        n => {
            return Err(AppError::InvalidInput(format!(
                "Expected a 32-byte seed or 64-byte secret key, got {} bytes",
                n
            )))
        }
    };

    let mut arr = [0u8; 32];
    arr.copy_from_slice(seed);
    let keypair = Keypair::new_from_array(arr);

    if let Some(public) = public {
        if keypair.pubkey().as_ref() != public {
            return Err(AppError::InvalidInput(
                "Secret key does not match its public key".to_string(),
            ));
        }
    }

    Ok(keypair)
}

/// Decode a base58 secret key.
pub fn keypair_from_base58(encoded: &str) -> Result<Keypair> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| AppError::InvalidInput(format!("Invalid base58 key: {}", e)))?;
    keypair_from_bytes(&bytes)
}

/// Load a keypair file: a JSON byte array, or a base58 string.
pub fn keypair_from_file<P: AsRef<Path>>(path: P) -> Result<Keypair> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read keypair file {}: {}", path.display(), e))
    })?;

    if contents.trim_start().starts_with('[') {
        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Invalid keypair JSON: {}", e)))?;
        keypair_from_bytes(&bytes)
    } else {
        keypair_from_base58(&contents)
    }
}

/// Wallet transport that signs with a local keypair and broadcasts through
/// the network service.
///
/// Authorization is always granted.
pub struct KeypairTransport {
    keypair: Arc<Keypair>,
    network: Arc<dyn NetworkService>,
    label: Option<String>,
}

impl KeypairTransport {
    pub fn new(keypair: Keypair, network: Arc<dyn NetworkService>) -> Self {
        Self {
            keypair: Arc::new(keypair),
            network,
            label: Some("Local keypair".to_string()),
        }
    }

    /// Fresh random keypair.
    pub fn generate(network: Arc<dyn NetworkService>) -> Self {
        let transport = Self::new(Keypair::new(), network);
        info!(address = %transport.pubkey(), "Generated new local keypair");
        transport
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Base58 of the 64-byte secret key, for backup.
    pub fn export_base58(&self) -> String {
        bs58::encode(self.keypair.to_bytes()).into_string()
    }
}

#[async_trait]
impl WalletTransport for KeypairTransport {
    async fn open_scope(&self) -> Result<Box<dyn WalletScope>> {
        Ok(Box::new(KeypairScope {
            keypair: self.keypair.clone(),
            network: self.network.clone(),
            label: self.label.clone(),
        }))
    }
}

struct KeypairScope {
    keypair: Arc<Keypair>,
    network: Arc<dyn NetworkService>,
    label: Option<String>,
}

#[async_trait]
impl WalletScope for KeypairScope {
    async fn authorize(&mut self, request: AuthorizationRequest) -> Result<AuthorizationResult> {
        if let Some(sign_in) = &request.sign_in {
            debug!(domain = %sign_in.domain, "Local sign-in");
        }

        Ok(AuthorizationResult {
            accounts: vec![Account {
                address: self.keypair.pubkey(),
                label: self.label.clone(),
            }],
            auth_token: request
                .auth_token
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        })
    }

    async fn deauthorize(&mut self, _auth_token: &str) -> Result<()> {
        Ok(())
    }

    async fn sign_and_send_transactions(
        &mut self,
        transactions: Vec<VersionedTransaction>,
        min_context_slot: u64,
    ) -> Result<Vec<Signature>> {
        let mut signatures = Vec::with_capacity(transactions.len());

        for transaction in transactions {
            let signed = VersionedTransaction::try_new(transaction.message, &[self.keypair.as_ref()])
                .map_err(|e| AppError::WalletRejected(format!("Failed to sign transaction: {}", e)))?;
            let signature = self
                .network
                .send_transaction_with_min_slot(&signed, min_context_slot)
                .await?;
            signatures.push(signature);
        }

        Ok(signatures)
    }

    async fn sign_messages(&mut self, addresses: Vec<Pubkey>, payloads: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        let own = self.keypair.pubkey();
        if let Some(other) = addresses.iter().find(|address| **address != own) {
            return Err(AppError::WalletRejected(format!("Cannot sign for {}", other)));
        }

        Ok(payloads
            .iter()
            .map(|payload| self.keypair.sign_message(payload).as_ref().to_vec())
            .collect())
    }

    fn close(&mut self) {
        debug!("Local wallet scope closed");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::wallet::tests::empty_transaction;
    use crate::services::wallet::MobileWallet;
    use parking_lot::Mutex;
    use solana_sdk::hash::Hash;

    pub(crate) const RECENT_BLOCKHASH: Hash = Hash::new_from_array([7u8; 32]);

    /// Records broadcasts instead of talking to a cluster.
    #[derive(Default)]
    pub(crate) struct RecordingNetwork {
        pub sent: Mutex<Vec<VersionedTransaction>>,
    }

    #[async_trait]
    impl NetworkService for RecordingNetwork {
        async fn get_balance(&self, _pubkey: &Pubkey) -> Result<u64> {
            Ok(0)
        }

        async fn request_airdrop(&self, _pubkey: &Pubkey, _amount_sol: f64) -> Result<Signature> {
            Ok(Signature::default())
        }

        async fn get_latest_blockhash(&self) -> Result<Hash> {
            Ok(RECENT_BLOCKHASH)
        }

        async fn send_transaction_with_min_slot(
            &self,
            transaction: &VersionedTransaction,
            _min_context_slot: u64,
        ) -> Result<Signature> {
            self.sent.lock().push(transaction.clone());
            Ok(transaction.signatures[0])
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_seed_and_secret_key_agree() {
        let original = Keypair::new();
        let secret = original.to_bytes();

        let from_secret = keypair_from_bytes(&secret).unwrap();
        let from_seed = keypair_from_bytes(&secret[..32]).unwrap();

        assert_eq!(from_secret.pubkey(), original.pubkey());
        assert_eq!(from_seed.pubkey(), original.pubkey());
    }

    #[test]
    fn test_mismatched_public_half_rejected() {
        let mut secret = Keypair::new().to_bytes();
        secret[63] ^= 0xff;
        assert!(matches!(keypair_from_bytes(&secret), Err(AppError::InvalidInput(_))));
        assert!(keypair_from_bytes(&[1u8; 10]).is_err());
    }

    #[test]
    fn test_base58_export_round_trip() {
        let transport = KeypairTransport::generate(Arc::new(RecordingNetwork::default()));
        let restored = keypair_from_base58(&transport.export_base58()).unwrap();
        assert_eq!(restored.pubkey(), transport.pubkey());
    }

    #[test]
    fn test_keypair_file_formats() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = Keypair::new();

        let json_path = dir.path().join("id.json");
        fs::write(&json_path, serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap()).unwrap();
        assert_eq!(keypair_from_file(&json_path).unwrap().pubkey(), keypair.pubkey());

        let b58_path = dir.path().join("id.txt");
        fs::write(&b58_path, format!("{}\n", bs58::encode(keypair.to_bytes()).into_string())).unwrap();
        assert_eq!(keypair_from_file(&b58_path).unwrap().pubkey(), keypair.pubkey());

        assert!(matches!(keypair_from_file(dir.path().join("missing.json")), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_local_wallet_signs_and_broadcasts() {
        let network = Arc::new(RecordingNetwork::default());
        let transport = KeypairTransport::generate(network.clone());
        let payer = transport.pubkey();
        let wallet = MobileWallet::new(Arc::new(transport));

        let account = wallet.connect().await.unwrap();
        assert_eq!(account.address, payer);

        let signature = wallet
            .sign_and_send_transaction(empty_transaction(payer), 0)
            .await
            .unwrap();

        let sent = network.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].signatures[0], signature);
        assert_ne!(signature, Signature::default());
    }

    #[tokio::test]
    async fn test_local_wallet_message_signature_verifies() {
        let transport = KeypairTransport::generate(Arc::new(RecordingNetwork::default()));
        let payer = transport.pubkey();
        let wallet = MobileWallet::new(Arc::new(transport));

        let signed = wallet.sign_message(b"sign me").await.unwrap();
        let signature = Signature::try_from(signed.as_slice()).unwrap();

        assert!(signature.verify(payer.as_ref(), b"sign me"));
    }
}
