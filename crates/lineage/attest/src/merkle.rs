//! Binary Merkle tree over step hashes.
//!
//! Levels are built pairwise from the leaves. An odd trailing node is paired
//! with itself. A single leaf is its own root; an empty tree has the fixed
//! root `Digest::hash(b"empty")`.
//!
//! # Known limitation
//!
//! Leaves and inner nodes go through the same `Digest::hash_pair` with no
//! domain prefix, and an odd node is paired with itself. A root therefore
//! does not pin down its leaf list: `[a, b, c]` and `[a, b, c, c]` share a
//! root, and so do `[a, b, c, d]` and `[hash_pair(a, b), hash_pair(c, d)]`.
//! A root identifies an execution only together with its step count, which
//! callers must carry alongside it. Inclusion proofs are unaffected for a
//! fixed leaf list.

use crate::AttestError;
use lineage_types::Digest;
use serde::{Deserialize, Serialize};

const EMPTY_TREE: &[u8] = b"empty";

/// Side of the sibling in a proof step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofDirection {
    /// The sibling is to the left.
    Left,
    /// The sibling is to the right.
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProofStep {
    pub sibling: Digest,
    pub direction: ProofDirection,
}

/// Inclusion proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf_index: usize,
    /// Sibling hashes from leaf to root.
    pub path: Vec<MerkleProofStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` are the leaves; the last level holds the root.
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    pub fn new(leaves: Vec<Digest>) -> Self {
        if leaves.is_empty() {
            return Self { levels: Vec::new() };
        }

        let mut levels = Vec::new();
        let mut current = leaves;
        while current.len() > 1 {
            let next = current
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    Digest::hash_pair(left, right)
                })
                .collect();
            levels.push(std::mem::replace(&mut current, next));
        }
        levels.push(current);

        Self { levels }
    }

    /// Root of the tree with no leaves.
    pub fn empty_root() -> Digest {
        Digest::hash(EMPTY_TREE)
    }

    pub fn root(&self) -> Digest {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_else(Self::empty_root)
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    pub fn leaves(&self) -> &[Digest] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, AttestError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(AttestError::LeafOutOfRange { index, leaf_count });
        }

        let mut path = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let (sibling_index, direction) = if position % 2 == 0 {
                (position + 1, ProofDirection::Right)
            } else {
                (position - 1, ProofDirection::Left)
            };
            // An odd trailing node was paired with itself.
            let sibling = level.get(sibling_index).unwrap_or(&level[position]);
            path.push(MerkleProofStep {
                sibling: *sibling,
                direction,
            });
            position /= 2;
        }

        Ok(MerkleProof {
            leaf_index: index,
            path,
        })
    }

    /// Check that `leaf` sits at `index` under `root`.
    pub fn verify_proof(leaf: &Digest, index: usize, proof: &MerkleProof, root: &Digest) -> bool {
        if proof.leaf_index != index {
            return false;
        }

        let mut current = *leaf;
        let mut position = index;
        for step in &proof.path {
            let expected = if position % 2 == 0 {
                ProofDirection::Right
            } else {
                ProofDirection::Left
            };
            if step.direction != expected {
                return false;
            }
            current = match step.direction {
                ProofDirection::Left => Digest::hash_pair(&step.sibling, &current),
                ProofDirection::Right => Digest::hash_pair(&current, &step.sibling),
            };
            position /= 2;
        }

        position == 0 && &current == root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaves(n: usize) -> Vec<Digest> {
        (0..n).map(|i| Digest::hash(format!("step-{i}").as_bytes())).collect()
    }

    #[test]
    fn empty_and_single_leaf_roots() {
        assert_eq!(MerkleTree::new(Vec::new()).root(), Digest::hash(b"empty"));

        let one = leaves(1);
        let tree = MerkleTree::new(one.clone());
        assert_eq!(tree.root(), one[0]);
        assert!(tree.proof(0).unwrap().path.is_empty());
    }

    #[test]
    fn odd_trailing_node_pairs_with_itself() {
        let l = leaves(3);
        let left = Digest::hash_pair(&l[0], &l[1]);
        let right = Digest::hash_pair(&l[2], &l[2]);
        let expected = Digest::hash_pair(&left, &right);
        assert_eq!(MerkleTree::new(l).root(), expected);
    }

    #[test]
    fn root_alone_does_not_fix_the_leaf_count() {
        let l = leaves(3);
        let padded = vec![l[0], l[1], l[2], l[2]];
        let short = MerkleTree::new(l.clone());
        let long = MerkleTree::new(padded);
        assert_eq!(short.root(), long.root());
        assert_ne!(short.leaf_count(), long.leaf_count());

        let l = leaves(4);
        let inner = vec![
            Digest::hash_pair(&l[0], &l[1]),
            Digest::hash_pair(&l[2], &l[3]),
        ];
        assert_eq!(MerkleTree::new(inner).root(), MerkleTree::new(l).root());
    }

    #[test]
    fn root_depends_on_leaf_order() {
        let mut l = leaves(4);
        let root = MerkleTree::new(l.clone()).root();
        l.swap(1, 2);
        assert_ne!(MerkleTree::new(l).root(), root);
    }

    #[test]
    fn proof_out_of_range() {
        let tree = MerkleTree::new(leaves(2));
        let err = tree.proof(2).unwrap_err();
        assert_eq!(
            err,
            AttestError::LeafOutOfRange {
                index: 2,
                leaf_count: 2
            }
        );
        assert!(MerkleTree::new(Vec::new()).proof(0).is_err());
    }

    #[test]
    fn proof_rejects_wrong_leaf_or_index() {
        let l = leaves(5);
        let tree = MerkleTree::new(l.clone());
        let root = tree.root();
        let proof = tree.proof(3).unwrap();

        assert!(MerkleTree::verify_proof(&l[3], 3, &proof, &root));
        assert!(!MerkleTree::verify_proof(&l[2], 3, &proof, &root));
        assert!(!MerkleTree::verify_proof(&l[3], 2, &proof, &root));
        assert!(!MerkleTree::verify_proof(&l[3], 3, &proof, &Digest::hash(b"other")));
    }

    proptest! {
        #[test]
        fn every_leaf_proves_inclusion(n in 1usize..40) {
            let l = leaves(n);
            let tree = MerkleTree::new(l.clone());
            let root = tree.root();
            for (index, leaf) in l.iter().enumerate() {
                let proof = tree.proof(index).unwrap();
                prop_assert!(MerkleTree::verify_proof(leaf, index, &proof, &root));
            }
        }
    }
}
