//! Fixed-arity multi-channel synchronizers.
//!
//! Each synchronizer owns one [`ChannelBuffer`] per input channel. A push on
//! any channel checks the new arrival against every other channel's buffered
//! candidates and, when [`best_match`] finds an acceptable tuple, removes it
//! from all buffers and hands it out by value.

use std::fmt;

use contracts::{BufferStats, ChannelDepth};

use crate::buffer::{Candidate, ChannelBuffer, Stamped};
use crate::policy::{best_match, MatchPolicy};

/// Shared surface of the generated synchronizers
pub trait Synchronizer {
    /// Tuple of one message per channel, in channel order
    type Group;

    fn policy(&self) -> &MatchPolicy;

    /// Channel labels in channel order
    fn channels(&self) -> &[&'static str];

    /// Empty synchronizer with identical settings
    fn fresh(&self) -> Self
    where
        Self: Sized;

    fn stats(&self) -> BufferStats;
}

/// Define a synchronizer over a fixed list of channels
///
/// Generates the struct, its constructor, one `push_*` method per channel and
/// the [`Synchronizer`] implementation.
///
/// # Usage
/// ```ignore
/// define_synchronizer!(
///     /// Two-channel synchronizer
///     PairSynchronizer[2] {
///         0 => first: A => push_first,
///         1 => second: B => push_second,
///     }
/// );
/// ```
macro_rules! define_synchronizer {
    (
        $(#[$meta:meta])*
        $name:ident[$arity:literal] {
            $($idx:literal => $field:ident : $ty:ident => $push:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        pub struct $name<$($ty),+> {
            policy: MatchPolicy,
            queue_size: usize,
            labels: [&'static str; $arity],
            $($field: ChannelBuffer<$ty>,)+
            groups_emitted: u64,
        }

        impl<$($ty: Stamped),+> $name<$($ty),+> {
            /// Create an empty synchronizer with `queue_size` slots per channel.
            pub fn new(policy: MatchPolicy, queue_size: usize, labels: [&'static str; $arity]) -> Self {
                Self {
                    policy,
                    queue_size,
                    labels,
                    $($field: ChannelBuffer::new(queue_size),)+
                    groups_emitted: 0,
                }
            }

            $(
                /// Buffer a message on this channel and try to complete a group.
                pub fn $push(&mut self, item: $ty) -> Option<<Self as Synchronizer>::Group> {
                    let arrival = self.$field.push(item);
                    self.try_match($idx, arrival)
                }
            )+

            fn try_match(&mut self, newest: usize, arrival: Candidate) -> Option<($($ty,)+)> {
                let channels = [$(
                    if $idx == newest {
                        vec![arrival]
                    } else {
                        self.$field.candidates()
                    }
                ),+];
                let seqs = best_match(&self.policy, &channels)?;
                let group = ($(self.$field.take(seqs[$idx])?,)+);
                self.groups_emitted += 1;
                Some(group)
            }

            /// Messages currently buffered over all channels
            pub fn buffered(&self) -> usize {
                0 $(+ self.$field.len())+
            }

            /// Messages evicted unmatched over all channels
            pub fn evicted(&self) -> u64 {
                0 $(+ self.$field.evicted())+
            }

            pub fn groups_emitted(&self) -> u64 {
                self.groups_emitted
            }
        }

        impl<$($ty: Stamped),+> Synchronizer for $name<$($ty),+> {
            type Group = ($($ty,)+);

            fn policy(&self) -> &MatchPolicy {
                &self.policy
            }

            fn channels(&self) -> &[&'static str] {
                &self.labels
            }

            fn fresh(&self) -> Self {
                Self::new(self.policy, self.queue_size, self.labels)
            }

            fn stats(&self) -> BufferStats {
                let channels = vec![$(
                    ChannelDepth {
                        channel: self.labels[$idx],
                        depth: self.$field.len(),
                        evicted: self.$field.evicted(),
                    }
                ),+];
                let oldest = [$(self.$field.oldest_stamp()),+].into_iter().flatten().min();
                let newest = [$(self.$field.newest_stamp()),+].into_iter().flatten().max();

                BufferStats {
                    channels,
                    total_buffered: self.buffered(),
                    evicted: self.evicted(),
                    groups_emitted: self.groups_emitted,
                    oldest_stamp: oldest,
                    newest_stamp: newest,
                }
            }
        }

        impl<$($ty),+> fmt::Debug for $name<$($ty),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("policy", &self.policy)
                    .field("labels", &self.labels)
                    $(.field(stringify!($field), &self.$field))+
                    .field("groups_emitted", &self.groups_emitted)
                    .finish()
            }
        }
    };
}

define_synchronizer!(
    /// Two-channel synchronizer
    PairSynchronizer[2] {
        0 => first: A => push_first,
        1 => second: B => push_second,
    }
);

define_synchronizer!(
    /// Three-channel synchronizer
    TripleSynchronizer[3] {
        0 => first: A => push_first,
        1 => second: B => push_second,
        2 => third: C => push_third,
    }
);
