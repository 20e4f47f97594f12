//! Server-wins merge of fetched records into a local collection.

use crate::model::quote::Quote;

/// Counters produced by one merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// Remote records appended because no local record had their id.
    pub added: usize,
    /// Local records overwritten because text or category differed.
    pub conflicts: usize,
    /// Local records that already matched and were only marked synced.
    pub confirmed: usize,
}

/// Merges `remote` into `local` by id.
///
/// - Unknown id: the remote record is appended.
/// - Same id, differing `text` or `category`: the remote record replaces the
///   local one entirely and counts as a conflict.
/// - Same id, same content: the local record is marked synced, nothing else
///   changes.
pub fn merge_remote(local: &mut Vec<Quote>, remote: Vec<Quote>) -> MergeStats {
    let mut stats = MergeStats::default();
    for incoming in remote {
        match local.iter_mut().find(|quote| quote.id == incoming.id) {
            None => {
                local.push(incoming);
                stats.added += 1;
            }
            Some(existing) if existing.content_differs(&incoming) => {
                *existing = incoming;
                stats.conflicts += 1;
            }
            Some(existing) => {
                existing.synced = true;
                stats.confirmed += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::{merge_remote, MergeStats};
    use crate::model::quote::{Quote, SERVER_CATEGORY};

    #[test]
    fn remote_wins_on_text_difference() {
        let mut local = vec![Quote::new(1, "A", "X")];
        let stats = merge_remote(&mut local, vec![Quote::from_remote(1, "B")]);

        assert_eq!(stats.conflicts, 1);
        assert_eq!(local[0].text, "B");
        assert_eq!(local[0].category, SERVER_CATEGORY);
        assert!(local[0].synced);
    }

    #[test]
    fn category_alone_counts_as_conflict() {
        let mut local = vec![Quote::new(1, "same", "Zen")];
        let stats = merge_remote(&mut local, vec![Quote::from_remote(1, "same")]);
        assert_eq!(stats.conflicts, 1);
        assert_eq!(local[0].category, SERVER_CATEGORY);
    }

    #[test]
    fn identical_content_only_marks_synced() {
        let original = Quote::new(5, "same", SERVER_CATEGORY);
        let mut local = vec![original.clone()];
        let stats = merge_remote(&mut local, vec![Quote::from_remote(5, "same")]);

        assert_eq!(
            stats,
            MergeStats {
                added: 0,
                conflicts: 0,
                confirmed: 1
            }
        );
        assert!(local[0].synced);
        assert_eq!(local[0].updated_at, original.updated_at);
    }

    #[test]
    fn unknown_ids_are_appended_in_order() {
        let mut local = vec![Quote::new(1, "a", "X"), Quote::new(2, "b", "Y")];
        let stats = merge_remote(
            &mut local,
            vec![Quote::from_remote(99, "n"), Quote::from_remote(100, "m")],
        );
        assert_eq!(stats.added, 2);
        let ids: Vec<_> = local.iter().map(|quote| quote.id).collect();
        assert_eq!(ids, vec![1, 2, 99, 100]);
    }
}
