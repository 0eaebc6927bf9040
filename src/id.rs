use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable 64-bit node identity.
pub type NodeHash = u64;

/// Reserved: "no parent", and commands that are not scoped to a node.
pub const NO_HASH: NodeHash = 0;

/// Hash of the session root. Children of the root hash from this seed, which
/// keeps their identities stable across processes.
pub const ROOT_HASH: NodeHash = 1;

/// Name prefixes that mark structural (non-widget) nodes.
pub const DIALOG_PREFIX: &str = "_dialog_";
pub const STRUCTURAL_PREFIXES: [&str; 4] = [DIALOG_PREFIX, "_layout", "_cards", "_list"];

/// Grid placement of a node inside its parent plus its visual name.
///
/// Two siblings with equal keys would hash identically, so a key must be
/// unique among the non-dialog children of a parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodeKey {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl NodeKey {
    pub fn new(name: impl Into<String>, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            w,
            h,
        }
    }

    /// Key of a dialog. Dialogs are not bound to a grid cell.
    pub fn dialog(name: &str) -> Self {
        Self::new(format!("{DIALOG_PREFIX}{name}"), 0, 0, 0, 0)
    }

    pub fn is_dialog(&self) -> bool {
        self.name.starts_with(DIALOG_PREFIX)
    }

    pub fn is_structural(&self) -> bool {
        STRUCTURAL_PREFIXES.iter().any(|p| self.name.starts_with(p))
    }

    /// Hash of a node with this key under `parent`.
    pub fn hash_under(&self, parent: NodeHash) -> NodeHash {
        node_hash(parent, &self.name, self.x, self.y, self.w, self.h)
    }
}

/// `SHA-256(parent ‖ "name(x,y,w,h)")` truncated to its first 8 bytes.
///
/// The parent hash is fed as 8 little-endian bytes. `0` and `1` are reserved,
/// so a digest landing on them is nudged upwards.
pub fn node_hash(parent: NodeHash, name: &str, x: i32, y: i32, w: i32, h: i32) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update(parent.to_le_bytes());
    hasher.update(format!("{name}({x},{y},{w},{h})").as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let hash = u64::from_le_bytes(bytes);
    if hash <= ROOT_HASH {
        hash + 2
    } else {
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_pure() {
        let a = node_hash(ROOT_HASH, "Button", 1, 2, 3, 4);
        let b = node_hash(ROOT_HASH, "Button", 1, 2, 3, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn every_key_field_changes_the_hash() {
        let base = node_hash(ROOT_HASH, "Button", 1, 2, 3, 4);
        assert_ne!(base, node_hash(ROOT_HASH, "Buttons", 1, 2, 3, 4));
        assert_ne!(base, node_hash(ROOT_HASH, "Button", 0, 2, 3, 4));
        assert_ne!(base, node_hash(ROOT_HASH, "Button", 1, 0, 3, 4));
        assert_ne!(base, node_hash(ROOT_HASH, "Button", 1, 2, 0, 4));
        assert_ne!(base, node_hash(ROOT_HASH, "Button", 1, 2, 3, 0));
        assert_ne!(base, node_hash(42, "Button", 1, 2, 3, 4));
    }

    #[test]
    fn reserved_values_are_never_produced() {
        for i in 0..256 {
            let h = node_hash(ROOT_HASH, "n", i, 0, 1, 1);
            assert!(h != NO_HASH && h != ROOT_HASH);
        }
    }

    #[test]
    fn dialog_keys_are_structural() {
        let key = NodeKey::dialog("menu");
        assert!(key.is_dialog());
        assert!(key.is_structural());
        assert!(!NodeKey::new("Button", 0, 0, 1, 1).is_structural());
    }

    #[test]
    fn key_hash_matches_free_function() {
        let key = NodeKey::new("_layout", 0, 1, 2, 1);
        assert_eq!(key.hash_under(77), node_hash(77, "_layout", 0, 1, 2, 1));
    }
}
