//! Per-channel bounded message buffer.
//!
//! Uses index-based separation:
//! - HeapRb stores lightweight metadata (stamp + arrival sequence + slab key)
//! - Slab stores the actual messages
//!
//! Images are never moved while the buffer is searched or compacted.

use std::fmt;

use contracts::{CameraInfo, Image, RgbdImage, Stamp};
use ringbuf::{traits::*, HeapRb};
use slab::Slab;

/// Anything carrying a capture stamp
pub trait Stamped {
    fn stamp(&self) -> Stamp;
}

impl Stamped for Image {
    #[inline]
    fn stamp(&self) -> Stamp {
        self.header.stamp
    }
}

impl Stamped for CameraInfo {
    #[inline]
    fn stamp(&self) -> Stamp {
        self.header.stamp
    }
}

impl Stamped for RgbdImage {
    #[inline]
    fn stamp(&self) -> Stamp {
        self.header.stamp
    }
}

/// Matching view of one buffered message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Per-channel arrival sequence, strictly increasing
    pub seq: u64,
    pub stamp: Stamp,
}

#[derive(Debug, Clone, Copy)]
struct EntryMeta {
    stamp: Stamp,
    seq: u64,
    slab_key: usize,
}

/// Bounded FIFO of unmatched messages for one input channel
///
/// When full, the oldest arrival is evicted to make room and counted.
pub struct ChannelBuffer<T> {
    index: HeapRb<EntryMeta>,
    storage: Slab<T>,
    capacity: usize,
    next_seq: u64,
    evicted: u64,
}

impl<T> fmt::Debug for ChannelBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBuffer")
            .field("len", &self.index.occupied_len())
            .field("capacity", &self.capacity)
            .field("evicted", &self.evicted)
            .finish()
    }
}

impl<T: Stamped> ChannelBuffer<T> {
    /// Create a buffer holding at most `capacity` messages (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            index: HeapRb::new(capacity),
            storage: Slab::with_capacity(capacity),
            capacity,
            next_seq: 0,
            evicted: 0,
        }
    }

    /// Buffer a message and return its arrival sequence.
    #[inline]
    pub fn push(&mut self, item: T) -> Candidate {
        if self.index.is_full() {
            if let Some(oldest) = self.index.try_pop() {
                self.storage.remove(oldest.slab_key);
            }
            self.evicted += 1;
        }

        let stamp = item.stamp();
        let seq = self.next_seq;
        self.next_seq += 1;

        let slab_key = self.storage.insert(item);
        let _ = self.index.try_push(EntryMeta {
            stamp,
            seq,
            slab_key,
        });
        Candidate { seq, stamp }
    }

    /// Buffered messages in arrival order.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.index
            .iter()
            .map(|m| Candidate {
                seq: m.seq,
                stamp: m.stamp,
            })
            .collect()
    }

    /// Remove and return the message with arrival sequence `seq`.
    pub fn take(&mut self, seq: u64) -> Option<T> {
        let mut removed = None;
        let remaining: Vec<EntryMeta> = self
            .index
            .pop_iter()
            .filter(|m| {
                if m.seq == seq {
                    removed = Some(m.slab_key);
                    false
                } else {
                    true
                }
            })
            .collect();

        // Rebuild index (only moves metadata, never payloads)
        for m in remaining {
            let _ = self.index.try_push(m);
        }

        removed.map(|key| self.storage.remove(key))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Messages evicted unmatched since construction
    #[inline]
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn oldest_stamp(&self) -> Option<Stamp> {
        self.index.iter().map(|m| m.stamp).min()
    }

    pub fn newest_stamp(&self) -> Option<Stamp> {
        self.index.iter().map(|m| m.stamp).max()
    }
}
