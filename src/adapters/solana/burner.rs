//! SPL Token Burner
//!
//! Burns protocol tokens from the operator's associated token account via
//! the SPL token program. The operator keypair signs; the RPC wrapper
//! submits and confirms.

use std::str::FromStr;

use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, transaction::Transaction};
use spl_associated_token_account::get_associated_token_address;

use crate::adapters::solana::rpc::SolanaClient;
use crate::adapters::solana::wallet::WalletManager;
use crate::ports::burner::{BurnError, TokenBurner};

/// Burns tokens held by the operator wallet
pub struct SplTokenBurner {
    rpc: SolanaClient,
    wallet: WalletManager,
}

impl SplTokenBurner {
    pub fn new(rpc: SolanaClient, wallet: WalletManager) -> Self {
        Self { rpc, wallet }
    }
}

#[async_trait]
impl TokenBurner for SplTokenBurner {
    async fn burn(&self, mint: &str, amount: u64) -> Result<String, BurnError> {
        let mint_pubkey =
            Pubkey::from_str(mint).map_err(|e| BurnError::InvalidMint(e.to_string()))?;
        let owner = self.wallet.pubkey();
        let token_account = get_associated_token_address(&owner, &mint_pubkey);

        tracing::info!(
            %mint,
            amount,
            owner = %owner,
            token_account = %token_account,
            "burning tokens"
        );

        let instruction = spl_token::instruction::burn(
            &spl_token::id(),
            &token_account,
            &mint_pubkey,
            &owner,
            &[],
            amount,
        )
        .map_err(|e| BurnError::Transaction(e.to_string()))?;

        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| BurnError::Transaction(e.to_string()))?;

        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&owner),
            &[self.wallet.keypair()],
            blockhash,
        );

        let signature = self
            .rpc
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| BurnError::Transaction(e.to_string()))?;

        tracing::info!(%signature, amount, "burn confirmed");
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_invalid_mint() {
        let burner = SplTokenBurner::new(
            SolanaClient::new("https://api.devnet.solana.com".to_string()),
            WalletManager::new_random(),
        );

        let err = burner.burn("definitely-not-a-mint", 1).await.unwrap_err();
        assert!(matches!(err, BurnError::InvalidMint(_)));
    }
}
