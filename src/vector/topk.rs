//! Top-k selection over scored search results.
//!
//! Result sets are small in the common case, so the sort is tiered:
//! insertion sort up to 16 elements, the standard unstable sort beyond
//! that. `top_k` switches between full sort, simple selection, and a
//! bounded min-heap depending on how k relates to n.

use crate::types::SearchResult;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Sorts results by similarity, descending. Ties may appear in any order.
pub fn sort_by_similarity(results: &mut [SearchResult]) {
    let n = results.len();
    if n <= 1 {
        return;
    }
    if n <= 16 {
        insertion_sort(results);
        return;
    }
    results.sort_unstable_by(|a, b| b.similarity.total_cmp(&a.similarity));
}

fn insertion_sort(results: &mut [SearchResult]) {
    for i in 1..results.len() {
        let mut j = i;
        while j > 0 && results[j - 1].similarity < results[j].similarity {
            results.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Returns the `k` highest-similarity results in descending order.
///
/// Exactly `min(k, n)` items come back, and they are precisely the k
/// largest (multiset equality with the prefix of a full sort).
pub fn top_k(mut results: Vec<SearchResult>, k: usize) -> Vec<SearchResult> {
    if k == 0 {
        return Vec::new();
    }
    if k >= results.len() {
        sort_by_similarity(&mut results);
        return results;
    }
    if k <= 5 {
        return select_top_k(&mut results, k);
    }
    heap_top_k(results, k)
}

/// k rounds of selection; cheapest for very small k.
fn select_top_k(results: &mut [SearchResult], k: usize) -> Vec<SearchResult> {
    let mut top = Vec::with_capacity(k);
    for i in 0..k {
        let mut max_idx = i;
        for j in (i + 1)..results.len() {
            if results[j].similarity > results[max_idx].similarity {
                max_idx = j;
            }
        }
        results.swap(i, max_idx);
        top.push(results[i].clone());
    }
    top
}

/// Min-heap of size k over one scan; the root is the running k-th largest.
fn heap_top_k(results: Vec<SearchResult>, k: usize) -> Vec<SearchResult> {
    let mut heap: BinaryHeap<MinBySimilarity> = BinaryHeap::with_capacity(k);
    for r in results {
        if heap.len() < k {
            heap.push(MinBySimilarity(r));
        } else if let Some(root) = heap.peek() {
            if r.similarity > root.0.similarity {
                heap.pop();
                heap.push(MinBySimilarity(r));
            }
        }
    }
    // into_sorted_vec is ascending for this reversed ordering, i.e.
    // descending by similarity.
    heap.into_sorted_vec().into_iter().map(|e| e.0).collect()
}

/// Heap adapter: reversed ordering turns std's max-heap into a min-heap.
struct MinBySimilarity(SearchResult);

impl PartialEq for MinBySimilarity {
    fn eq(&self, other: &Self) -> bool {
        self.0.similarity.total_cmp(&other.0.similarity) == Ordering::Equal
    }
}

impl Eq for MinBySimilarity {}

impl PartialOrd for MinBySimilarity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinBySimilarity {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.similarity.total_cmp(&self.0.similarity)
    }
}
