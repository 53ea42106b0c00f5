use std::ops::{Deref, DerefMut};

use serde::Serialize;
use sui_sdk::types::{
    base_types::{ObjectID, ObjectRef, SuiAddress},
    programmable_transaction_builder::ProgrammableTransactionBuilder,
    transaction::{Argument, Command, ObjectArg, ProgrammableTransaction, TransactionData},
    Identifier, TypeTag, SUI_FRAMEWORK_PACKAGE_ID,
};

use crate::errors::MmError;

fn build_error(err: impl ToString) -> MmError {
    MmError::InvalidInput(format!("transaction build: {}", err.to_string()))
}

/// A programmable transaction under construction.
#[derive(Default)]
pub struct TxCtx {
    pub ptb: ProgrammableTransactionBuilder,
    pub command_count: u16,
}

impl Deref for TxCtx {
    type Target = ProgrammableTransactionBuilder;

    fn deref(&self) -> &Self::Target {
        &self.ptb
    }
}

impl DerefMut for TxCtx {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ptb
    }
}

impl TxCtx {
    pub fn pure_arg<T: Serialize>(&mut self, value: T) -> Result<Argument, MmError> {
        self.ptb.pure(value).map_err(build_error)
    }

    pub fn obj_arg(&mut self, object_arg: ObjectArg) -> Result<Argument, MmError> {
        self.ptb.obj(object_arg).map_err(build_error)
    }

    pub fn command(&mut self, command: Command) -> Argument {
        self.command_count += 1;
        self.ptb.command(command)
    }

    /// One output coin per amount, in order.
    pub fn split_coins(&mut self, coin: Argument, amounts: &[u64]) -> Result<Vec<Argument>, MmError> {
        let amount_args = amounts
            .iter()
            .map(|amount| self.pure_arg(*amount))
            .collect::<Result<Vec<_>, _>>()?;
        let Argument::Result(index) = self.command(Command::SplitCoins(coin, amount_args)) else {
            return Err(build_error("SplitCoins did not yield a command result"));
        };
        Ok((0..amounts.len() as u16)
            .map(|i| Argument::NestedResult(index, i))
            .collect())
    }

    pub fn merge_coins(&mut self, target: Argument, sources: Vec<Argument>) {
        if sources.is_empty() {
            return;
        }
        self.command(Command::MergeCoins(target, sources));
    }

    pub fn transfer(&mut self, recipient: SuiAddress, objects: Vec<Argument>) -> Result<(), MmError> {
        let recipient = self.pure_arg(recipient)?;
        self.command(Command::TransferObjects(objects, recipient));
        Ok(())
    }

    pub fn move_call(
        &mut self,
        package: ObjectID,
        module: &str,
        function: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Result<Argument, MmError> {
        let module = Identifier::new(module).map_err(build_error)?;
        let function = Identifier::new(function).map_err(build_error)?;
        Ok(self.command(Command::move_call(
            package,
            module,
            function,
            type_arguments,
            arguments,
        )))
    }

    /// `0x2::coin::zero<T>()`.
    pub fn zero_coin(&mut self, coin_type: TypeTag) -> Result<Argument, MmError> {
        self.move_call(SUI_FRAMEWORK_PACKAGE_ID, "coin", "zero", vec![coin_type], vec![])
    }

    /// Publish `modules`; the result is the `UpgradeCap`.
    pub fn publish(&mut self, modules: Vec<Vec<u8>>, dependencies: Vec<ObjectID>) -> Argument {
        self.command_count += 1;
        self.ptb.publish_upgradeable(modules, dependencies)
    }

    pub fn finish(self) -> ProgrammableTransaction {
        self.ptb.finish()
    }
}

/// `NestedResult(i, j)` for the `j`-th output of a multi-output command.
pub fn nested(result: Argument, j: u16) -> Result<Argument, MmError> {
    match result {
        Argument::Result(i) => Ok(Argument::NestedResult(i, j)),
        other => Err(build_error(format!("{:?} is not a command result", other))),
    }
}

/// Sponsored when `sponsor` is set: the sponsor owns the gas coins and must co-sign.
pub fn build_tx_data(
    sender: SuiAddress,
    sponsor: Option<SuiAddress>,
    gas_payment: Vec<ObjectRef>,
    pt: ProgrammableTransaction,
    gas_budget: u64,
    gas_price: u64,
) -> TransactionData {
    match sponsor {
        Some(sponsor) if sponsor != sender => TransactionData::new_programmable_allow_sponsor(
            sender,
            gas_payment,
            pt,
            gas_budget,
            gas_price,
            sponsor,
        ),
        _ => TransactionData::new_programmable(sender, gas_payment, pt, gas_budget, gas_price),
    }
}

#[cfg(test)]
mod tests {
    use sui_sdk::types::transaction::{CallArg, TransactionDataAPI};

    use super::*;

    #[test]
    fn split_outputs_are_nested_results_in_order() {
        let mut ctx = TxCtx::default();
        let outputs = ctx.split_coins(Argument::GasCoin, &[1, 2, 3]).unwrap();
        assert_eq!(
            outputs,
            vec![
                Argument::NestedResult(0, 0),
                Argument::NestedResult(0, 1),
                Argument::NestedResult(0, 2)
            ]
        );
        assert_eq!(ctx.command_count, 1);

        let pt = ctx.finish();
        assert_eq!(pt.commands.len(), 1);
        assert_eq!(pt.inputs.len(), 3);
        assert_eq!(pt.inputs[1], CallArg::Pure(bcs_u64(2)));
    }

    #[test]
    fn merge_without_sources_adds_no_command() {
        let mut ctx = TxCtx::default();
        ctx.merge_coins(Argument::GasCoin, vec![]);
        assert_eq!(ctx.command_count, 0);
    }

    #[test]
    fn sponsor_equal_to_sender_is_not_sponsored() {
        let sender = SuiAddress::random_for_testing_only();
        let sponsor = SuiAddress::random_for_testing_only();
        let pt = TxCtx::default().finish();

        let data = build_tx_data(sender, Some(sponsor), vec![], pt.clone(), 10, 1);
        assert_eq!(data.sender(), sender);
        assert_eq!(data.gas_owner(), sponsor);

        let data = build_tx_data(sender, Some(sender), vec![], pt, 10, 1);
        assert_eq!(data.gas_owner(), sender);
    }

    #[test]
    fn nested_requires_a_command_result() {
        assert_eq!(nested(Argument::Result(4), 2), Ok(Argument::NestedResult(4, 2)));
        assert!(nested(Argument::GasCoin, 0).is_err());
    }

    fn bcs_u64(value: u64) -> Vec<u8> {
        value.to_le_bytes().to_vec()
    }
}
