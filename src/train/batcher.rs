//! Packing training pairs into batches

use crate::engine::SentencePair;
use crate::manifest::Batcher;
use crate::reader::Sentence;

/// Length of a read sentence as the length limits count it: the trailing
/// `</s>` is included.
pub fn sent_len(sent: &Sentence) -> usize {
    sent.len()
}

/// Zip source and target sentences, dropping pairs over the length limits.
pub fn filter_pairs(
    src: Vec<Sentence>,
    trg: Vec<Sentence>,
    max_src_len: Option<usize>,
    max_trg_len: Option<usize>,
) -> Vec<SentencePair> {
    src.into_iter()
        .zip(trg)
        .filter(|(s, t)| {
            max_src_len.map_or(true, |max| sent_len(s) <= max)
                && max_trg_len.map_or(true, |max| sent_len(t) <= max)
        })
        .map(|(src, trg)| SentencePair { src, trg })
        .collect()
}

/// Split `pairs` into batches of at most `batch_size` pairs.
///
/// `SrcBatcher` and `TrgBatcher` sort by source or target length first (the
/// sort is stable, so equal lengths keep file order); `InOrderBatcher` keeps
/// file order.
pub fn pack_batches(pairs: &[SentencePair], batcher: &Batcher) -> Vec<Vec<SentencePair>> {
    let mut order: Vec<&SentencePair> = pairs.iter().collect();
    match batcher {
        Batcher::SrcBatcher(_) => order.sort_by_key(|p| p.src.len()),
        Batcher::TrgBatcher(_) => order.sort_by_key(|p| p.trg.len()),
        Batcher::InOrderBatcher(_) => {}
    }
    order
        .chunks(batcher.batch_size().max(1))
        .map(|chunk| chunk.iter().map(|&p| p.clone()).collect())
        .collect()
}

/// Merge every `update_every` consecutive batches into one update.
pub fn group_updates(
    batches: Vec<Vec<SentencePair>>,
    update_every: usize,
) -> Vec<Vec<SentencePair>> {
    if update_every <= 1 {
        return batches;
    }
    let mut grouped = Vec::new();
    let mut current = Vec::new();
    for (i, batch) in batches.into_iter().enumerate() {
        current.extend(batch);
        if (i + 1) % update_every == 0 {
            grouped.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        grouped.push(current);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::BatchSize;
    use crate::vocab::ES;
    use proptest::prelude::*;

    fn sent(n: usize) -> Sentence {
        let mut s = vec![2; n];
        s.push(ES);
        s
    }

    fn pairs(lens: &[(usize, usize)]) -> Vec<SentencePair> {
        lens.iter()
            .map(|&(s, t)| SentencePair {
                src: sent(s),
                trg: sent(t),
            })
            .collect()
    }

    fn size(n: usize) -> BatchSize {
        BatchSize { batch_size: n }
    }

    #[test]
    fn test_filter_pairs_limits() {
        let src = vec![sent(1), sent(5), sent(2)];
        let trg = vec![sent(1), sent(1), sent(9)];
        let kept = filter_pairs(src, trg, Some(3), Some(4));
        assert_eq!(kept.len(), 1);
        assert_eq!(sent_len(&kept[0].src), 2);
    }

    #[test]
    fn test_filter_pairs_counts_end_marker() {
        // two words plus </s> exceed a limit of 2
        let kept = filter_pairs(vec![sent(2), sent(1)], vec![sent(1), sent(1)], Some(2), None);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].src, sent(1));
    }

    #[test]
    fn test_src_batcher_sorts_by_source() {
        let p = pairs(&[(3, 1), (1, 2), (2, 3)]);
        let batches = pack_batches(&p, &Batcher::SrcBatcher(size(2)));
        assert_eq!(batches.len(), 2);
        let lens: Vec<usize> = batches.iter().flatten().map(|p| sent_len(&p.src)).collect();
        assert_eq!(lens, vec![2, 3, 4]);
    }

    #[test]
    fn test_trg_batcher_sorts_by_target() {
        let p = pairs(&[(3, 3), (1, 1), (2, 2)]);
        let batches = pack_batches(&p, &Batcher::TrgBatcher(size(5)));
        assert_eq!(batches.len(), 1);
        let lens: Vec<usize> = batches[0].iter().map(|p| sent_len(&p.trg)).collect();
        assert_eq!(lens, vec![2, 3, 4]);
    }

    #[test]
    fn test_in_order_batcher_keeps_order() {
        let p = pairs(&[(3, 1), (1, 1), (2, 1)]);
        let batches = pack_batches(&p, &Batcher::InOrderBatcher(size(1)));
        assert_eq!(batches.len(), 3);
        assert_eq!(sent_len(&batches[0][0].src), 4);
    }

    #[test]
    fn test_group_updates() {
        let p = pairs(&[(1, 1); 5]);
        let batches = pack_batches(&p, &Batcher::InOrderBatcher(size(1)));
        let grouped = group_updates(batches, 2);
        let sizes: Vec<usize> = grouped.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    proptest! {
        #[test]
        fn prop_batches_cover_every_pair(
            lens in prop::collection::vec((0usize..20, 0usize..20), 0..40),
            batch_size in 1usize..8
        ) {
            let p = pairs(&lens);
            for batcher in [
                Batcher::SrcBatcher(size(batch_size)),
                Batcher::TrgBatcher(size(batch_size)),
                Batcher::InOrderBatcher(size(batch_size)),
            ] {
                let batches = pack_batches(&p, &batcher);
                prop_assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), p.len());
                prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= batch_size));
            }
        }
    }
}
