use everscale_types::error::Error;
use everscale_types::models::StdAddr;
use everscale_types::prelude::*;
use num_bigint::{BigInt, BigUint, Sign};
use rand::RngCore;

use crate::stack::StackValue;

/// Smart Contract Info context.
#[derive(Debug, Clone)]
pub struct SmcInfo {
    /// Unix timestamp in seconds.
    pub now: u32,
    /// Block logical time.
    pub block_lt: u64,
    /// Transaction logical time.
    pub tx_lt: u64,
    /// Random seed.
    pub rand_seed: HashBytes,
    /// Account balance in nanotokens.
    pub balance: BigUint,
    /// Account address.
    pub addr: StdAddr,
    /// Blockchain config root.
    pub config: Cell,
}

impl Default for SmcInfo {
    fn default() -> Self {
        Self {
            now: 0,
            block_lt: 0,
            tx_lt: 0,
            rand_seed: HashBytes::ZERO,
            balance: BigUint::default(),
            addr: StdAddr::new(0, HashBytes::ZERO),
            config: Cell::empty_cell(),
        }
    }
}

impl SmcInfo {
    pub const MAGIC: u32 = 0x076ef1ea;

    pub const ACTIONS_IDX: usize = 1;
    pub const MSGS_SENT_IDX: usize = 2;
    pub const UNIX_TIME_IDX: usize = 3;
    pub const BLOCK_LT_IDX: usize = 4;
    pub const TX_LT_IDX: usize = 5;
    pub const RANDSEED_IDX: usize = 6;
    pub const BALANCE_IDX: usize = 7;
    pub const MYADDR_IDX: usize = 8;
    pub const CONFIG_IDX: usize = 9;

    pub const C7_ITEM_COUNT: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh 256-bit seed from the thread-local CSPRNG.
    pub fn random_seed() -> HashBytes {
        let mut seed = HashBytes::ZERO;
        rand::thread_rng().fill_bytes(&mut seed.0);
        seed
    }

    pub fn with_now(mut self, now: u32) -> Self {
        self.now = now;
        self
    }

    pub fn with_block_lt(mut self, block_lt: u64) -> Self {
        self.block_lt = block_lt;
        self
    }

    pub fn with_tx_lt(mut self, tx_lt: u64) -> Self {
        self.tx_lt = tx_lt;
        self
    }

    pub fn with_rand_seed(mut self, rand_seed: HashBytes) -> Self {
        self.rand_seed = rand_seed;
        self
    }

    pub fn with_balance(mut self, balance: BigUint) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_address(mut self, addr: StdAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, config: Cell) -> Self {
        self.config = config;
        self
    }

    /// Builds the `c7` register value: a tuple with a single
    /// `SmartContractInfo` tuple inside.
    pub fn build_c7(&self) -> Result<StackValue, Error> {
        let mut items = Vec::with_capacity(Self::C7_ITEM_COUNT);
        ok!(self.write_items(&mut items));
        Ok(StackValue::Tuple(vec![StackValue::Tuple(items)]))
    }

    fn write_items(&self, items: &mut Vec<StackValue>) -> Result<(), Error> {
        // magic:0x076ef1ea
        items.push(StackValue::int(Self::MAGIC));
        // actions:Integer
        items.push(StackValue::int(0));
        // msgs_sent:Integer
        items.push(StackValue::int(0));
        // unixtime:Integer
        items.push(StackValue::int(self.now));
        // block_lt:Integer
        items.push(StackValue::int(self.block_lt));
        // trans_lt:Integer
        items.push(StackValue::int(self.tx_lt));
        // rand_seed:Integer
        items.push(StackValue::Int(BigInt::from_bytes_be(
            Sign::Plus,
            self.rand_seed.as_slice(),
        )));
        // balance_remaining:[Integer (Maybe Cell)]
        items.push(StackValue::Tuple(vec![
            StackValue::Int(BigInt::from(self.balance.clone())),
            StackValue::Null,
        ]));
        // myself:MsgAddressInt
        items.push(StackValue::Slice(ok!(CellBuilder::build_from(&self.addr))));
        // global_config:(Maybe Cell) ] = SmartContractInfo;
        items.push(StackValue::Cell(self.config.clone()));
        Ok(())
    }
}
