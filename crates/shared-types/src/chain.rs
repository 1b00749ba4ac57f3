//! Chained headers: a header positioned in the chain with its cumulative work.

use crate::entities::{BlockHeader, Hash256};
use crate::target::block_proof;
use primitive_types::U256;
use std::sync::Arc;

/// Number of blocks used by median-time-past.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// A validated-header node. Immutable once created; ancestors are shared.
#[derive(Debug)]
pub struct ChainedHeader {
    header: BlockHeader,
    hash: Hash256,
    height: u32,
    chain_work: U256,
    previous: Option<Arc<ChainedHeader>>,
}

impl ChainedHeader {
    /// Genesis node (height 0).
    pub fn genesis(header: BlockHeader) -> Arc<Self> {
        Arc::new(Self {
            hash: header.hash(),
            chain_work: block_proof(header.bits),
            height: 0,
            header,
            previous: None,
        })
    }

    /// Link `header` on top of `previous`.
    pub fn extend(previous: &Arc<ChainedHeader>, header: BlockHeader) -> Arc<Self> {
        Arc::new(Self {
            hash: header.hash(),
            chain_work: previous.chain_work.saturating_add(block_proof(header.bits)),
            height: previous.height + 1,
            header,
            previous: Some(Arc::clone(previous)),
        })
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn chain_work(&self) -> U256 {
        self.chain_work
    }

    pub fn previous(&self) -> Option<&Arc<ChainedHeader>> {
        self.previous.as_ref()
    }

    /// Ancestor at `height`, or `None` when `height` is above this node.
    pub fn get_ancestor(&self, height: u32) -> Option<&ChainedHeader> {
        if height > self.height {
            return None;
        }
        let mut cursor: &ChainedHeader = self;
        while cursor.height > height {
            cursor = cursor.previous.as_deref()?;
        }
        Some(cursor)
    }

    /// Walk from this node back to genesis.
    pub fn iter_back(&self) -> impl Iterator<Item = &ChainedHeader> {
        std::iter::successors(Some(self), |node| node.previous.as_deref())
    }

    /// Median timestamp of the last [`MEDIAN_TIME_SPAN`] blocks ending here.
    pub fn median_time_past(&self) -> u32 {
        let mut times: Vec<u32> = self
            .iter_back()
            .take(MEDIAN_TIME_SPAN)
            .map(|node| node.header.time)
            .collect();
        times.sort_unstable();
        times[times.len() / 2]
    }
}

impl Drop for ChainedHeader {
    // Unlink iteratively so dropping a long chain does not recurse per node.
    fn drop(&mut self) {
        let mut next = self.previous.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut owned) => next = owned.previous.take(),
                Err(_) => break,
            }
        }
    }
}
