//! The layer-parallel scheduler: one worker thread per tree level, wired
//! together with bounded channels so FR32 expansion, hashing and flushing
//! overlap.
//!
//! Workers are spawned lazily, one at a time, the first time the layer
//! below needs to forward upward — see [`Tower::sender_for`].

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::thread as cbthread;
use log::trace;

use crate::constants::{LAYER_QUEUE_DEPTH, MAX_LAYERS};
use crate::hash254::{h254, Fr32Ary};
use crate::zero::nul_root;

/// A slab in transit between layer workers: `32 * 2^m` bytes representing
/// `2^m` leaves at some tree level.
pub type Slab = Vec<u8>;

/// Below this many pairs, hashing a slab sequentially (with the in-place
/// left-half reuse trick) beats the overhead of spinning up helper threads.
const PARALLEL_THRESHOLD_PAIRS: usize = 8;

/// Owns the dynamically-growing tower of layer workers for one streaming
/// session. Shared via `Arc` because every worker thread needs to reach it
/// to spawn the layer above itself.
pub struct Tower {
    senders: Mutex<Vec<Option<Sender<Slab>>>>,
    handles: Mutex<Vec<Option<JoinHandle<()>>>>,
    result_tx: Sender<Fr32Ary>,
}

impl Tower {
    pub fn new(result_tx: Sender<Fr32Ary>) -> Arc<Self> {
        Arc::new(Tower {
            senders: Mutex::new((0..=MAX_LAYERS).map(|_| None).collect()),
            handles: Mutex::new((0..=MAX_LAYERS).map(|_| None).collect()),
            result_tx,
        })
    }

    /// Returns the sender feeding `level`, spawning its worker thread on
    /// first use.
    pub fn sender_for(self: &Arc<Self>, level: usize) -> Sender<Slab> {
        assert!(
            level <= MAX_LAYERS,
            "commp: piece exceeds the maximum tree height of {} layers",
            MAX_LAYERS
        );

        let mut senders = self.senders.lock().unwrap();
        if let Some(tx) = &senders[level] {
            return tx.clone();
        }

        let (tx, rx) = bounded(LAYER_QUEUE_DEPTH);
        senders[level] = Some(tx.clone());
        drop(senders);

        trace!("commp: spawning layer worker {}", level);
        let tower = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("commp-layer-{}", level))
            .spawn(move || run_layer(level, rx, tower))
            .expect("commp: failed to spawn layer worker thread");
        self.handles.lock().unwrap()[level] = Some(handle);

        tx
    }

    /// Blocks until every worker thread spawned so far has exited. Called
    /// after the root has been produced (or discarded, on `reset`) so that
    /// no worker ever outlives the streaming session.
    pub fn join(&self) {
        let mut handles = self.handles.lock().unwrap();
        for slot in handles.iter_mut() {
            if let Some(handle) = slot.take() {
                let _ = handle.join();
            }
        }
    }
}

fn run_layer(level: usize, rx: Receiver<Slab>, tower: Arc<Tower>) {
    let mut hold: Option<Fr32Ary> = None;
    let mut next_tx: Option<Sender<Slab>> = None;
    // The last chunk this worker forwarded upward. Only read during flush,
    // and only when this worker turns out never to have grown a layer above
    // it (`next_tx` still `None`) — i.e. it was itself the tallest live
    // layer and the upper layer it *thought* it fed never got spawned.
    let mut last_forwarded: Option<Fr32Ary> = None;

    for slab in rx.iter() {
        trace!("commp: layer {} received {} bytes", level, slab.len());

        let mut combined = match hold.take() {
            Some(h) => {
                let mut v = Vec::with_capacity(32 + slab.len());
                v.extend_from_slice(&h);
                v.extend_from_slice(&slab);
                v
            }
            None => slab,
        };

        debug_assert_eq!(combined.len() % 32, 0);
        let n_chunks = combined.len() / 32;
        if n_chunks % 2 == 1 {
            let last = (n_chunks - 1) * 32;
            let mut h = [0u8; 32];
            h.copy_from_slice(&combined[last..last + 32]);
            hold = Some(h);
            combined.truncate(last);
        }

        if !combined.is_empty() {
            hash_pairs(&mut combined);
            let mut lf = [0u8; 32];
            lf.copy_from_slice(&combined[combined.len() - 32..]);
            last_forwarded = Some(lf);
            let tx = next_tx.get_or_insert_with(|| tower.sender_for(level + 1));
            if tx.send(combined).is_err() {
                // Downstream worker is gone (can only happen during a
                // `reset` race); nothing upstream can do but stop.
                return;
            }
        }
    }

    // The input channel is closed and drained: run the flush protocol.
    if let Some(h) = hold.take() {
        match next_tx.as_ref() {
            Some(tx) => {
                trace!("commp: layer {} padding lone chunk with nul root", level);
                let padded = h254(&h, &nul_root(level));
                let _ = tx.send(padded.to_vec());
            }
            None => {
                trace!("commp: layer {} is the root", level);
                let _ = tower.result_tx.send(h);
                return;
            }
        }
    } else if next_tx.is_none() {
        // No hold and no layer above: this worker is the tallest live layer.
        // Either it forwarded at least once and the root is its last
        // forwarded chunk, or it never received any input at all (only
        // possible when a caller tears the pipeline down via `reset` before
        // a single block was ever drained into it) and there is no tree to
        // root — emit the empty-tree value so the waiting caller unblocks.
        trace!("commp: layer {} is the root (no hold, never grew a layer above)", level);
        let _ = tower.result_tx.send(last_forwarded.unwrap_or_else(|| nul_root(0)));
        return;
    }

    // Dropping `next_tx` here (or already having dropped it above) closes
    // `layer_queues[level + 1]`, propagating the flush upward.
    drop(next_tx);
}

/// Pairwise-hashes a slab of full pairs in place, truncating it to half its
/// original length. `buf.len()` must be a positive multiple of 64.
fn hash_pairs(buf: &mut Slab) {
    debug_assert_eq!(buf.len() % 64, 0);
    let pairs = buf.len() / 64;
    if pairs == 0 {
        buf.clear();
        return;
    }

    if pairs >= PARALLEL_THRESHOLD_PAIRS {
        let input = std::mem::take(buf);
        *buf = hash_pairs_parallel(&input, pairs);
    } else {
        hash_pairs_sequential(buf, pairs);
        buf.truncate(pairs * 32);
    }
}

/// Hashes `pairs` adjacent 64-byte pairs in `buf`, writing each 32-byte
/// result into the left half of its own pair. Safe in place because writes
/// to position `i` only ever land behind the read position of pair `i + 1`.
fn hash_pairs_sequential(buf: &mut [u8], pairs: usize) {
    for i in 0..pairs {
        let mut pair = [0u8; 64];
        pair.copy_from_slice(&buf[i * 64..i * 64 + 64]);
        let h = h254(&pair[..32], &pair[32..]);
        buf[i * 32..i * 32 + 32].copy_from_slice(&h);
    }
}

/// Splits `pairs` hashes across a handful of scoped helper threads. Each
/// pair's output is independent of every other, so no synchronisation is
/// needed beyond the disjoint output slices `crossbeam::scope` hands out.
fn hash_pairs_parallel(input: &[u8], pairs: usize) -> Slab {
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(pairs)
        .max(1);
    let chunk = (pairs + workers - 1) / workers;

    let mut output = vec![0u8; pairs * 32];

    cbthread::scope(|s| {
        let mut in_rest = input;
        let mut out_rest = output.as_mut_slice();
        let mut remaining = pairs;

        while remaining > 0 {
            let take = chunk.min(remaining);
            let (in_group, in_tail) = in_rest.split_at(take * 64);
            let (out_group, out_tail) = out_rest.split_at_mut(take * 32);
            in_rest = in_tail;
            out_rest = out_tail;
            remaining -= take;

            s.spawn(move |_| {
                for i in 0..take {
                    let h = h254(
                        &in_group[i * 64..i * 64 + 32],
                        &in_group[i * 64 + 32..i * 64 + 64],
                    );
                    out_group[i * 32..i * 32 + 32].copy_from_slice(&h);
                }
            });
        }
    })
    .unwrap();

    output
}
