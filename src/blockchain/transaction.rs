//! Transaction building.
//!
//! # Responsibilities
//! - Validate the transfer request
//! - Prepend compute-budget instructions when a priority fee is configured
//! - Anchor the message to a recent blockhash with the sender as fee payer
//!
//! Building is pure: the block reference is fetched by the caller.

use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::system_instruction;

use crate::blockchain::types::{
    BlockReference, FeeParams, TransferRequest, TransferResult, UnsignedTransfer,
};
use crate::config::TransferParams;

/// Builds unsigned transfer transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionBuilder {
    fees: FeeParams,
}

impl TransactionBuilder {
    pub fn new(fees: FeeParams) -> Self {
        Self { fees }
    }

    /// Builder with fee parameters taken from configuration; zero means unset.
    pub fn from_params(params: &TransferParams) -> Self {
        Self::new(FeeParams {
            compute_unit_price: Some(params.compute_unit_price_micro_lamports).filter(|p| *p > 0),
            compute_unit_limit: Some(params.compute_unit_limit).filter(|l| *l > 0),
        })
    }

    /// Build the unsigned transfer for `request` anchored at `block`.
    pub fn build(
        &self,
        request: TransferRequest,
        block: BlockReference,
    ) -> TransferResult<UnsignedTransfer> {
        request.validate()?;

        let mut instructions: Vec<Instruction> = Vec::with_capacity(3);
        if let Some(limit) = self.fees.compute_unit_limit {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(limit));
        }
        if let Some(price) = self.fees.compute_unit_price {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
        }
        instructions.push(system_instruction::transfer(
            &request.from,
            &request.to,
            request.lamports,
        ));

        let message =
            Message::new_with_blockhash(&instructions, Some(&request.from), &block.blockhash);

        tracing::debug!(
            from = %request.from,
            to = %request.to,
            lamports = request.lamports,
            blockhash = %block.blockhash,
            instructions = instructions.len(),
            "Transfer built"
        );

        Ok(UnsignedTransfer {
            message,
            request,
            block,
        })
    }
}
