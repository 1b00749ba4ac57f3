//! Coinbase construction

use shared_types::{opcodes, Amount, Block, OutPoint, Script, Transaction, TxIn, TxOut};

/// BIP34 height push followed by `OP_0`.
///
/// The trailing opcode keeps the script at least two bytes long for
/// heights that encode as a single small-integer opcode.
pub fn coinbase_script_sig(height: u32) -> Script {
    let mut script = Script::new();
    script.push_int(height as i64).push_opcode(opcodes::OP_0);
    script
}

/// Coinbase for `height` paying `value` to `payout_script`.
pub fn create_coinbase_transaction(height: u32, value: Amount, payout_script: &Script) -> Transaction {
    Transaction {
        inputs: vec![TxIn::new(OutPoint::null(), coinbase_script_sig(height))],
        outputs: vec![TxOut::new(value, payout_script.clone())],
        ..Default::default()
    }
}

/// Empty the coinbase's first output. Staking blocks pay through the
/// coinstake instead.
pub fn clear_coinbase(block: &mut Block) {
    if let Some(output) = block
        .coinbase_mut()
        .and_then(|coinbase| coinbase.outputs.first_mut())
    {
        output.set_empty();
    }
}
