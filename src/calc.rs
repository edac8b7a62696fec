//! The public streaming accumulator: absorbs arbitrary writes, drives the
//! FR32 expander and the layer-worker tower, and produces the final commP.

use std::sync::Arc;

use crossbeam::channel::{bounded, Receiver, Sender};
use log::debug;

use crate::constants::{BLOCK_SIZE, CARRY_BLOCKS, DIGEST_SIZE, MAX_PIECE_PAYLOAD, MIN_PIECE_PAYLOAD};
use crate::error::{Error, Result};
use crate::fr32::expand_slab;
use crate::hash254::Fr32Ary;
use crate::layer::{Slab, Tower};

struct Pipeline {
    tower: Arc<Tower>,
    layer0_tx: Sender<Slab>,
    result_rx: Receiver<Fr32Ary>,
}

/// Streaming commP/CommD calculator.
///
/// ```
/// use commp::Calc;
///
/// let mut calc = Calc::default();
/// calc.write(&[0u8; 127]).unwrap();
/// let (comm_p, padded_piece_size) = calc.digest().unwrap();
/// assert_eq!(padded_piece_size, 128);
/// assert_eq!(comm_p.len(), 32);
/// ```
pub struct Calc {
    bytes_consumed: u64,
    carry: Vec<u8>,
    pipeline: Option<Pipeline>,
}

impl std::fmt::Debug for Calc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calc")
            .field("bytes_consumed", &self.bytes_consumed)
            .field("carry_len", &self.carry.len())
            .field("pipeline_started", &self.pipeline.is_some())
            .finish()
    }
}

impl Default for Calc {
    fn default() -> Self {
        Calc {
            bytes_consumed: 0,
            carry: Vec::with_capacity(CARRY_BLOCKS * BLOCK_SIZE),
            pipeline: None,
        }
    }
}

impl Calc {
    /// Creates a fresh, unstarted accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unpadded bytes of input consumed per FR32 block.
    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Size in bytes of the digest produced by [`Calc::digest`].
    pub fn digest_size(&self) -> usize {
        DIGEST_SIZE
    }

    /// Appends `data` to the stream. Never a short write: on success the
    /// full length of `data` was accepted.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        let new_total = self
            .bytes_consumed
            .checked_add(data.len() as u64)
            .filter(|total| *total <= MAX_PIECE_PAYLOAD)
            .ok_or(Error::InputTooLarge(MAX_PIECE_PAYLOAD))?;

        self.ensure_pipeline();
        self.carry.extend_from_slice(data);
        self.bytes_consumed = new_total;
        self.drain_full_batches();

        Ok(data.len())
    }

    /// Flushes any buffered carry, collapses the layer tower, and returns
    /// the 32-byte commP together with the padded piece size. On success
    /// the accumulator is reset and ready for reuse.
    pub fn digest(&mut self) -> Result<(Fr32Ary, u64)> {
        if self.bytes_consumed < MIN_PIECE_PAYLOAD {
            return Err(Error::InsufficientData(self.bytes_consumed, MIN_PIECE_PAYLOAD));
        }

        self.flush_carry();

        let pipeline = self
            .pipeline
            .take()
            .expect("commp: bytes_consumed >= MIN_PIECE_PAYLOAD implies an initialised pipeline");
        drop(pipeline.layer0_tx);

        let comm_p = pipeline
            .result_rx
            .recv()
            .expect("commp: layer tower closed without producing a root");
        pipeline.tower.join();

        let padded_piece_size = padded_piece_size(self.bytes_consumed);
        debug!(
            "commp: digest of {} bytes -> {} (padded size {})",
            self.bytes_consumed,
            hex_fmt(&comm_p),
            padded_piece_size
        );

        self.carry.clear();
        self.bytes_consumed = 0;

        Ok((comm_p, padded_piece_size))
    }

    /// Convenience wrapper around [`Calc::digest`] matching the streaming
    /// hash convention of appending the digest to a caller-supplied buffer.
    /// Panics if `digest` would return an error, since this signature has
    /// no way to propagate one.
    pub fn sum(&mut self, buf: &mut Vec<u8>) {
        let (comm_p, _) = self.digest().expect("commp: sum() called before enough data was written");
        buf.extend_from_slice(&comm_p);
    }

    /// Tears down any in-flight pipeline and zeroes all state. Safe to call
    /// at any point, including on a `Calc` that was never written to.
    pub fn reset(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            drop(pipeline.layer0_tx);
            let _ = pipeline.result_rx.recv();
            pipeline.tower.join();
        }
        self.carry.clear();
        self.bytes_consumed = 0;
    }

    fn ensure_pipeline(&mut self) {
        if self.pipeline.is_some() {
            return;
        }
        let (result_tx, result_rx) = bounded(1);
        let tower = Tower::new(result_tx);
        let layer0_tx = tower.sender_for(0);
        self.pipeline = Some(Pipeline {
            tower,
            layer0_tx,
            result_rx,
        });
    }

    fn drain_full_batches(&mut self) {
        let batch_bytes = CARRY_BLOCKS * BLOCK_SIZE;
        while self.carry.len() >= batch_bytes {
            let batch: Vec<u8> = self.carry.drain(..batch_bytes).collect();
            self.send_blocks(&batch);
        }
    }

    fn flush_carry(&mut self) {
        if self.carry.is_empty() {
            return;
        }
        let pad = (BLOCK_SIZE - self.carry.len() % BLOCK_SIZE) % BLOCK_SIZE;
        self.carry.resize(self.carry.len() + pad, 0);
        let batch = std::mem::take(&mut self.carry);
        self.send_blocks(&batch);
    }

    fn send_blocks(&self, blocks: &[u8]) {
        let expanded = expand_slab(blocks);
        let pipeline = self
            .pipeline
            .as_ref()
            .expect("commp: send_blocks called before the pipeline was initialised");
        pipeline
            .layer0_tx
            .send(expanded)
            .expect("commp: layer-0 worker unexpectedly gone");
    }
}

/// `ceil(bytes / 127) * 128`, rounded up to the next power of two.
fn padded_piece_size(bytes_consumed: u64) -> u64 {
    let unrounded = ((bytes_consumed + BLOCK_SIZE as u64 - 1) / BLOCK_SIZE as u64) * 128;
    unrounded.next_power_of_two()
}

fn hex_fmt(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
