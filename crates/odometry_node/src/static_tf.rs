//! Static transform tree backed by configured parent/child links.

use std::collections::HashMap;

use contracts::{Stamp, StaticTransformConfig, TransformLookup};
use nalgebra::Isometry3;
use tracing::warn;

fn normalize(frame: &str) -> &str {
    frame.trim_start_matches('/')
}

/// Time-invariant [`TransformLookup`]
///
/// Every child has at most one parent. Lookups walk both frames up to a
/// common ancestor, so any two frames of the same tree are connected.
#[derive(Debug, Clone, Default)]
pub struct StaticTransformTree {
    /// child -> (parent, parent_from_child)
    links: HashMap<String, (String, Isometry3<f64>)>,
}

impl StaticTransformTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(transforms: &[StaticTransformConfig]) -> Self {
        let mut tree = Self::new();
        for tf in transforms {
            tree.insert(&tf.parent, &tf.child, tf.to_isometry());
        }
        tree
    }

    /// Add or replace the link of `child`.
    pub fn insert(&mut self, parent: &str, child: &str, parent_from_child: Isometry3<f64>) {
        let child = normalize(child).to_string();
        let parent = normalize(parent).to_string();
        if let Some((old_parent, _)) = self
            .links
            .insert(child.clone(), (parent.clone(), parent_from_child))
        {
            warn!(
                child = %child,
                old_parent = %old_parent,
                new_parent = %parent,
                "static transform replaced"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// `frame` and each of its ancestors, with the transform into that ancestor.
    fn ancestors(&self, frame: &str) -> Vec<(String, Isometry3<f64>)> {
        let mut chain = vec![(frame.to_string(), Isometry3::identity())];
        let mut current = frame;
        let mut accumulated = Isometry3::identity();

        // A well-formed tree is never deeper than its link count
        for _ in 0..self.links.len() {
            let Some((parent, parent_from_child)) = self.links.get(current) else {
                break;
            };
            accumulated = parent_from_child * accumulated;
            if chain.iter().any(|(name, _)| name == parent) {
                warn!(frame = %frame, "cycle in static transforms");
                break;
            }
            chain.push((parent.clone(), accumulated));
            current = parent;
        }
        chain
    }
}

impl TransformLookup for StaticTransformTree {
    fn lookup(&self, target: &str, source: &str, _stamp: Stamp) -> Option<Isometry3<f64>> {
        let target = normalize(target);
        let source = normalize(source);
        if target == source {
            return Some(Isometry3::identity());
        }

        let source_chain = self.ancestors(source);
        self.ancestors(target)
            .into_iter()
            .find_map(|(ancestor, ancestor_from_target)| {
                source_chain
                    .iter()
                    .find(|(name, _)| *name == ancestor)
                    .map(|(_, ancestor_from_source)| {
                        ancestor_from_target.inverse() * ancestor_from_source
                    })
            })
    }
}
