//! Core chain entities: hashes, scripts, transactions, headers and blocks.
//!
//! Transactions follow the Bitcoin layout with BIP144 witness data so the
//! same bytes travel through `getblocktemplate`/`submitblock` unchanged.

use crate::encoding::{
    compact_size_len, write_compact_size, write_var_bytes, Decodable, Encodable, Reader,
};
use crate::errors::{EncodingError, EncodingResult};
use crate::hashing::{merkle_root, sha256d};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in base units (1 coin = [`COIN`] units).
pub type Amount = i64;

/// Base units per coin.
pub const COIN: Amount = 100_000_000;

/// Upper bound for any single output or per-transaction output total.
pub const MAX_MONEY: Amount = 21_000_000 * COIN;

/// `value` is a valid amount: non-negative and no more than [`MAX_MONEY`].
pub fn money_range(value: Amount) -> bool {
    (0..=MAX_MONEY).contains(&value)
}

/// Witness scale factor used by block weight.
pub const WITNESS_SCALE_FACTOR: usize = 4;

/// 256-bit hash stored in internal (little-endian) byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// All-zero hash.
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Raw bytes in internal order.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Interpret the hash as a little-endian 256-bit integer.
    pub fn to_u256(&self) -> U256 {
        U256::from_little_endian(&self.0)
    }

    /// Display-order hex (byte-reversed, as RPC clients expect).
    pub fn to_hex(&self) -> String {
        let mut rev = self.0;
        rev.reverse();
        hex::encode(rev)
    }

    /// Parse display-order hex.
    pub fn from_hex(s: &str) -> EncodingResult<Self> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(EncodingError::InvalidHex(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        out.reverse();
        Ok(Hash256(out))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl Encodable for Hash256 {
    fn consensus_encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }
}

impl Decodable for Hash256 {
    fn consensus_decode(r: &mut Reader<'_>) -> EncodingResult<Self> {
        Ok(Hash256(r.read_array()?))
    }
}

/// Script opcodes used when building coinbase and commitment scripts.
pub mod opcodes {
    pub const OP_0: u8 = 0x00;
    pub const OP_PUSHDATA1: u8 = 0x4c;
    pub const OP_PUSHDATA2: u8 = 0x4d;
    pub const OP_PUSHDATA4: u8 = 0x4e;
    pub const OP_1NEGATE: u8 = 0x4f;
    pub const OP_1: u8 = 0x51;
    pub const OP_RETURN: u8 = 0x6a;
}

/// Raw script bytes.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Script(pub Vec<u8>);

impl Script {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(s: &str) -> EncodingResult<Self> {
        Ok(Self(hex::decode(s)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Append a raw opcode.
    pub fn push_opcode(&mut self, op: u8) -> &mut Self {
        self.0.push(op);
        self
    }

    /// Append a data push with the smallest push opcode.
    pub fn push_slice(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if len < opcodes::OP_PUSHDATA1 as usize {
            self.0.push(len as u8);
        } else if len <= 0xff {
            self.0.push(opcodes::OP_PUSHDATA1);
            self.0.push(len as u8);
        } else if len <= 0xffff {
            self.0.push(opcodes::OP_PUSHDATA2);
            self.0.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.0.push(opcodes::OP_PUSHDATA4);
            self.0.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.0.extend_from_slice(data);
        self
    }

    /// Append an integer push (small-integer opcodes where possible).
    pub fn push_int(&mut self, n: i64) -> &mut Self {
        match n {
            0 => self.push_opcode(opcodes::OP_0),
            -1 => self.push_opcode(opcodes::OP_1NEGATE),
            1..=16 => self.push_opcode(opcodes::OP_1 + (n as u8 - 1)),
            _ => {
                let encoded = script_num_encode(n);
                self.push_slice(&encoded)
            }
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

/// Minimal little-endian sign-magnitude encoding used by script numbers.
pub fn script_num_encode(n: i64) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }
    let negative = n < 0;
    let mut abs = n.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while abs > 0 {
        out.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    let last = out.len() - 1;
    if out[last] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[last] |= 0x80;
    }
    out
}

/// Reference to a previous transaction output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Hash256,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Hash256, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// The null outpoint spent by a coinbase input.
    pub fn null() -> Self {
        Self {
            txid: Hash256::ZERO,
            vout: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.txid.is_zero() && self.vout == u32::MAX
    }
}

impl Default for OutPoint {
    fn default() -> Self {
        Self::null()
    }
}

/// Transaction input, including its (possibly empty) witness stack.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct TxIn {
    pub previous_output: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

impl TxIn {
    /// Input spending `previous_output` with final sequence and no witness.
    pub fn new(previous_output: OutPoint, script_sig: Script) -> Self {
        Self {
            previous_output,
            script_sig,
            sequence: u32::MAX,
            witness: Vec::new(),
        }
    }
}

/// Transaction output.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct TxOut {
    pub value: Amount,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(value: Amount, script_pubkey: Script) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }

    /// Zero value with an empty script (coinstake marker output).
    pub fn is_empty(&self) -> bool {
        self.value == 0 && self.script_pubkey.is_empty()
    }

    /// Zero the value and clear the script.
    pub fn set_empty(&mut self) {
        self.value = 0;
        self.script_pubkey = Script::new();
    }
}

/// A transaction.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }
}

impl Transaction {
    /// Exactly one input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
    }

    /// Spends a real output and starts with an empty marker output.
    pub fn is_coinstake(&self) -> bool {
        !self.inputs.is_empty()
            && !self.inputs[0].previous_output.is_null()
            && self.outputs.len() >= 2
            && self.outputs[0].is_empty()
    }

    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    /// Sum of output values, saturating on overflow.
    pub fn total_output_value(&self) -> Amount {
        self.outputs
            .iter()
            .fold(0, |acc: Amount, out| acc.saturating_add(out.value))
    }

    /// Encode with or without the witness section.
    pub fn encode_with(&self, out: &mut Vec<u8>, include_witness: bool) {
        let witness = include_witness && self.has_witness();
        out.extend_from_slice(&self.version.to_le_bytes());
        if witness {
            out.push(0x00);
            out.push(0x01);
        }
        write_compact_size(self.inputs.len() as u64, out);
        for input in &self.inputs {
            input.previous_output.txid.consensus_encode(out);
            out.extend_from_slice(&input.previous_output.vout.to_le_bytes());
            write_var_bytes(input.script_sig.as_bytes(), out);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        write_compact_size(self.outputs.len() as u64, out);
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(output.script_pubkey.as_bytes(), out);
        }
        if witness {
            for input in &self.inputs {
                write_compact_size(input.witness.len() as u64, out);
                for item in &input.witness {
                    write_var_bytes(item, out);
                }
            }
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
    }

    /// Hash of the encoding without witness data.
    pub fn txid(&self) -> Hash256 {
        let mut buf = Vec::with_capacity(self.base_size());
        self.encode_with(&mut buf, false);
        sha256d(&buf)
    }

    /// Hash of the encoding with witness data.
    pub fn wtxid(&self) -> Hash256 {
        let mut buf = Vec::with_capacity(self.total_size());
        self.encode_with(&mut buf, true);
        sha256d(&buf)
    }

    /// Size without witness data.
    pub fn base_size(&self) -> usize {
        let mut size = 4 + compact_size_len(self.inputs.len() as u64);
        for input in &self.inputs {
            size += 32 + 4 + 4 + var_bytes_len(input.script_sig.len());
        }
        size += compact_size_len(self.outputs.len() as u64);
        for output in &self.outputs {
            size += 8 + var_bytes_len(output.script_pubkey.len());
        }
        size + 4
    }

    /// Size with witness data.
    pub fn total_size(&self) -> usize {
        if !self.has_witness() {
            return self.base_size();
        }
        let mut size = self.base_size() + 2;
        for input in &self.inputs {
            size += compact_size_len(input.witness.len() as u64);
            size += input
                .witness
                .iter()
                .map(|item| var_bytes_len(item.len()))
                .sum::<usize>();
        }
        size
    }

    /// BIP141 weight.
    pub fn weight(&self) -> usize {
        self.base_size() * (WITNESS_SCALE_FACTOR - 1) + self.total_size()
    }
}

fn var_bytes_len(len: usize) -> usize {
    compact_size_len(len as u64) + len
}

impl Encodable for Transaction {
    fn consensus_encode(&self, out: &mut Vec<u8>) {
        self.encode_with(out, true);
    }
}

fn decode_inputs(r: &mut Reader<'_>, count: usize) -> EncodingResult<Vec<TxIn>> {
    let mut inputs = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let txid = Hash256::consensus_decode(r)?;
        let vout = r.read_u32_le()?;
        let script_sig = Script(r.read_var_bytes()?);
        let sequence = r.read_u32_le()?;
        inputs.push(TxIn {
            previous_output: OutPoint { txid, vout },
            script_sig,
            sequence,
            witness: Vec::new(),
        });
    }
    Ok(inputs)
}

fn decode_outputs(r: &mut Reader<'_>) -> EncodingResult<Vec<TxOut>> {
    let count = r.read_length()?;
    let mut outputs = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let value = r.read_i64_le()?;
        let script_pubkey = Script(r.read_var_bytes()?);
        outputs.push(TxOut {
            value,
            script_pubkey,
        });
    }
    Ok(outputs)
}

impl Decodable for Transaction {
    fn consensus_decode(r: &mut Reader<'_>) -> EncodingResult<Self> {
        let version = r.read_i32_le()?;
        let mut flags = 0u8;
        let input_count = r.read_length()?;
        let mut inputs = decode_inputs(r, input_count)?;
        let mut outputs = Vec::new();
        if inputs.is_empty() {
            flags = r.read_u8()?;
            if flags != 0 {
                let count = r.read_length()?;
                inputs = decode_inputs(r, count)?;
                outputs = decode_outputs(r)?;
            }
        } else {
            outputs = decode_outputs(r)?;
        }

        if flags & 1 != 0 {
            flags ^= 1;
            for input in inputs.iter_mut() {
                let items = r.read_length()?;
                let mut stack = Vec::with_capacity(items.min(1024));
                for _ in 0..items {
                    stack.push(r.read_var_bytes()?);
                }
                input.witness = stack;
            }
            if !inputs.iter().any(|input| !input.witness.is_empty()) {
                return Err(EncodingError::SuperfluousWitness);
            }
        }
        if flags != 0 {
            return Err(EncodingError::UnsupportedWitnessFlag(flags));
        }

        let lock_time = r.read_u32_le()?;
        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }
}

/// Serialized header size.
pub const HEADER_SIZE: usize = 80;

/// Block header.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: Hash256,
    pub merkle_root: Hash256,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Double SHA-256 of the 80-byte header.
    pub fn hash(&self) -> Hash256 {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        self.consensus_encode(&mut buf);
        sha256d(&buf)
    }
}

impl Encodable for BlockHeader {
    fn consensus_encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.version.to_le_bytes());
        self.prev_block_hash.consensus_encode(out);
        self.merkle_root.consensus_encode(out);
        out.extend_from_slice(&self.time.to_le_bytes());
        out.extend_from_slice(&self.bits.to_le_bytes());
        out.extend_from_slice(&self.nonce.to_le_bytes());
    }
}

impl Decodable for BlockHeader {
    fn consensus_decode(r: &mut Reader<'_>) -> EncodingResult<Self> {
        Ok(BlockHeader {
            version: r.read_i32_le()?,
            prev_block_hash: Hash256::consensus_decode(r)?,
            merkle_root: Hash256::consensus_decode(r)?,
            time: r.read_u32_le()?,
            bits: r.read_u32_le()?,
            nonce: r.read_u32_le()?,
        })
    }
}

/// A full block.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }

    /// First transaction, if it is a coinbase.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }

    pub fn coinbase_mut(&mut self) -> Option<&mut Transaction> {
        self.transactions.first_mut().filter(|tx| tx.is_coinbase())
    }

    /// Merkle root over txids.
    pub fn compute_merkle_root(&self) -> Hash256 {
        let leaves: Vec<Hash256> = self.transactions.iter().map(Transaction::txid).collect();
        merkle_root(&leaves)
    }

    /// Merkle root over wtxids with the coinbase slot zeroed.
    pub fn compute_witness_merkle_root(&self) -> Hash256 {
        let leaves: Vec<Hash256> = self
            .transactions
            .iter()
            .enumerate()
            .map(|(i, tx)| if i == 0 { Hash256::ZERO } else { tx.wtxid() })
            .collect();
        merkle_root(&leaves)
    }

    /// Size without witness data.
    pub fn base_size(&self) -> usize {
        HEADER_SIZE
            + compact_size_len(self.transactions.len() as u64)
            + self.transactions.iter().map(Transaction::base_size).sum::<usize>()
    }

    /// Size with witness data.
    pub fn total_size(&self) -> usize {
        HEADER_SIZE
            + compact_size_len(self.transactions.len() as u64)
            + self.transactions.iter().map(Transaction::total_size).sum::<usize>()
    }

    /// BIP141 weight.
    pub fn weight(&self) -> usize {
        self.base_size() * (WITNESS_SCALE_FACTOR - 1) + self.total_size()
    }
}

impl Encodable for Block {
    fn consensus_encode(&self, out: &mut Vec<u8>) {
        self.header.consensus_encode(out);
        write_compact_size(self.transactions.len() as u64, out);
        for tx in &self.transactions {
            tx.encode_with(out, true);
        }
    }
}

impl Decodable for Block {
    fn consensus_decode(r: &mut Reader<'_>) -> EncodingResult<Self> {
        let header = BlockHeader::consensus_decode(r)?;
        let count = r.read_length()?;
        let mut transactions = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            transactions.push(Transaction::consensus_decode(r)?);
        }
        Ok(Block {
            header,
            transactions,
        })
    }
}
