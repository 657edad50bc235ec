//! Stable point-id derivation for catalog records.
//!
//! The vector index addresses points by `u64`. Catalog rows carry a product
//! code that is numeric for most suppliers but free-form for some; numeric
//! codes become the point id directly so re-ingesting a catalog overwrites
//! the same points, and everything else falls back to a truncated BLAKE3
//! hash of the code string.

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// 64 bits is plenty for catalog-scale cardinality (tens of thousands of
/// rows): the birthday bound puts the collision probability for one million
/// distinct codes around 0.00003%. A collision would make two catalog rows
/// share a point, which re-ingestion corrects, so this hash carries no
/// integrity responsibility.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Derives the vector-index point id for a product code.
///
/// Numeric codes map to themselves; anything else hashes. Leading and
/// trailing whitespace is ignored before the numeric parse so `" 4031 "` and
/// `"4031"` land on the same point.
#[inline]
pub fn point_id_for_code(code: &str) -> u64 {
    let trimmed = code.trim();
    match trimmed.parse::<u64>() {
        Ok(numeric) => numeric,
        Err(_) => hash_to_u64(trimmed.as_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hash_to_u64_determinism() {
        let data = b"COD-4031-A";

        let hash1 = hash_to_u64(data);
        let hash2 = hash_to_u64(data);
        let hash3 = hash_to_u64(data);

        assert_eq!(hash1, hash2);
        assert_eq!(hash2, hash3);
    }

    #[test]
    fn test_hash_to_u64_uniqueness() {
        let inputs = [
            b"COD-001".as_slice(),
            b"COD-002".as_slice(),
            b"cod-001".as_slice(),
            b"COD-001 ".as_slice(),
        ];

        let hashes: Vec<_> = inputs.iter().map(|i| hash_to_u64(i)).collect();
        let unique_hashes: HashSet<_> = hashes.iter().collect();

        assert_eq!(unique_hashes.len(), inputs.len());
    }

    #[test]
    fn test_hash_to_u64_empty_input() {
        let hash = hash_to_u64(b"");
        let hash2 = hash_to_u64(b"");
        assert_eq!(hash, hash2);
    }

    #[test]
    fn test_point_id_numeric_code_is_identity() {
        assert_eq!(point_id_for_code("4031"), 4031);
        assert_eq!(point_id_for_code("0"), 0);
        assert_eq!(point_id_for_code(" 998877 "), 998877);
    }

    #[test]
    fn test_point_id_non_numeric_code_hashes() {
        let id = point_id_for_code("COD-4031-A");
        assert_eq!(id, hash_to_u64(b"COD-4031-A"));
        assert_ne!(id, 0);
    }

    #[test]
    fn test_point_id_negative_code_hashes() {
        // u64 parse rejects the sign, so negative codes take the hash path.
        let id = point_id_for_code("-42");
        assert_eq!(id, hash_to_u64(b"-42"));
    }

    #[test]
    fn test_point_id_determinism_across_whitespace() {
        assert_eq!(point_id_for_code("ABC-1"), point_id_for_code("  ABC-1  "));
    }
}
