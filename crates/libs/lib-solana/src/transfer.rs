//! # SOL Transfers
//!
//! Unsigned system-program transfers for a wallet to sign and submit.

use lib_core::{AppError, Result};
use solana_sdk::{
    hash::Hash,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use solana_system_interface::instruction as system_instruction;

/// Build a v0 transaction moving `lamports` from `from` to `to`.
///
/// Signature slots are left zeroed; the wallet fills them when signing.
pub fn transfer_transaction(
    from: &Pubkey,
    to: &Pubkey,
    lamports: u64,
    recent_blockhash: Hash,
) -> Result<VersionedTransaction> {
    if lamports == 0 {
        return Err(AppError::InvalidInput("Transfer amount must be positive".to_string()));
    }
    if from == to {
        return Err(AppError::InvalidInput("Cannot send SOL to the same account".to_string()));
    }

    let instruction = system_instruction::transfer(from, to, lamports);
    let message = v0::Message::try_compile(from, &[instruction], &[], recent_blockhash)
        .map_err(|e| AppError::Internal(format!("Failed to compile transfer: {}", e)))?;

    let signers = message.header.num_required_signatures as usize;
    Ok(VersionedTransaction {
        signatures: vec![Signature::default(); signers],
        message: VersionedMessage::V0(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_pays_from_sender() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let blockhash = Hash::new_from_array([3u8; 32]);

        let tx = transfer_transaction(&from, &to, 1_500, blockhash).unwrap();

        assert_eq!(tx.signatures, vec![Signature::default()]);
        let keys = tx.message.static_account_keys();
        assert_eq!(keys[0], from);
        assert!(keys.contains(&to));
        assert_eq!(*tx.message.recent_blockhash(), blockhash);

        let instructions = tx.message.instructions();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].data, system_instruction::transfer(&from, &to, 1_500).data);
    }

    #[test]
    fn test_rejects_empty_or_self_transfer() {
        let from = Pubkey::new_unique();
        let blockhash = Hash::default();

        assert!(matches!(
            transfer_transaction(&from, &Pubkey::new_unique(), 0, blockhash),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            transfer_transaction(&from, &from, 10, blockhash),
            Err(AppError::InvalidInput(_))
        ));
    }
}
