use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rom::ByteStore;
use crate::{RandomiserError, Result};

/// A single fixed-address overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub address: usize,
    pub payload: Vec<u8>,
}

impl Substitution {
    pub fn new(address: usize, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            address,
            payload: payload.into(),
        }
    }

    pub fn end(&self) -> usize {
        self.address.saturating_add(self.payload.len())
    }

    pub fn overlaps(&self, other: &Substitution) -> bool {
        !self.payload.is_empty()
            && !other.payload.is_empty()
            && self.address < other.end()
            && other.address < self.end()
    }
}

/// What a batch did to the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub bytes_written: usize,
    /// Pairs of list positions `(earlier, later)` whose ranges intersect; the
    /// later one won.
    pub overlaps: Vec<(usize, usize)>,
}

/// Applies substitutions in list order. The whole batch is bounds-checked
/// before the first byte is written.
pub fn apply(store: &mut ByteStore, substitutions: &[Substitution]) -> Result<PatchReport> {
    for sub in substitutions {
        let fits = sub
            .address
            .checked_add(sub.payload.len())
            .map_or(false, |end| end <= store.len());
        if !fits {
            return Err(RandomiserError::OutOfRange {
                address: sub.address,
                len: sub.payload.len(),
                store_len: store.len(),
            });
        }
    }

    let mut report = PatchReport::default();

    let mut order: Vec<usize> = (0..substitutions.len()).collect();
    order.sort_by_key(|&i| (substitutions[i].address, i));
    for (pos, &i) in order.iter().enumerate() {
        for &j in &order[pos + 1..] {
            if substitutions[j].address >= substitutions[i].end() {
                break;
            }
            if substitutions[i].overlaps(&substitutions[j]) {
                let pair = if i < j { (i, j) } else { (j, i) };
                debug!(
                    "substitution #{} at {:#08X} overrides #{} at {:#08X}",
                    pair.1, substitutions[pair.1].address, pair.0, substitutions[pair.0].address
                );
                report.overlaps.push(pair);
            }
        }
    }
    report.overlaps.sort_unstable();

    for sub in substitutions {
        store.write_bytes(sub.address, &sub.payload)?;
        report.bytes_written += sub.payload.len();
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(len: usize) -> ByteStore {
        ByteStore::new(vec![0u8; len])
    }

    #[test]
    fn writes_payload_and_leaves_rest() {
        let mut s = store(8);
        let report = apply(&mut s, &[Substitution::new(2, vec![0xA9, 0x01])]).unwrap();
        assert_eq!(s.as_slice(), &[0, 0, 0xA9, 0x01, 0, 0, 0, 0]);
        assert_eq!(report.bytes_written, 2);
        assert!(report.overlaps.is_empty());
    }

    #[test]
    fn out_of_range_names_address_and_length() {
        let mut s = store(4);
        let err = apply(&mut s, &[Substitution::new(3, vec![1, 2])]).unwrap_err();
        match err {
            RandomiserError::OutOfRange { address, len, store_len } => {
                assert_eq!((address, len, store_len), (3, 2, 4));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failing_batch_writes_nothing() {
        let mut s = store(4);
        let subs = [Substitution::new(0, vec![9]), Substitution::new(10, vec![1])];
        assert!(apply(&mut s, &subs).is_err());
        assert_eq!(s.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn last_write_wins_in_list_order() {
        let base = Substitution::new(0, vec![1, 1, 1]);
        let over = Substitution::new(1, vec![2]);

        let mut a = store(4);
        let report = apply(&mut a, &[base.clone(), over.clone()]).unwrap();
        assert_eq!(a.as_slice(), &[1, 2, 1, 0]);
        assert_eq!(report.overlaps, vec![(0, 1)]);

        let mut b = store(4);
        apply(&mut b, &[over, base]).unwrap();
        assert_eq!(b.as_slice(), &[1, 1, 1, 0]);
    }

    #[test]
    fn disjoint_order_does_not_matter() {
        let x = Substitution::new(0, vec![5, 6]);
        let y = Substitution::new(4, vec![7]);

        let mut a = store(6);
        let mut b = store(6);
        apply(&mut a, &[x.clone(), y.clone()]).unwrap();
        apply(&mut b, &[y, x]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let mut s = store(4);
        let report = apply(
            &mut s,
            &[Substitution::new(0, vec![1, 1]), Substitution::new(2, vec![2, 2])],
        )
        .unwrap();
        assert!(report.overlaps.is_empty());
    }
}
