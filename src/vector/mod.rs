//! Vector math kernel: similarity metrics, float/byte packing, top-k
//! selection, and buffer pooling.
//!
//! Everything here is pure and deterministic. Invalid shapes (length
//! mismatches, empty or zero-norm vectors) return sentinel zeros rather
//! than erroring; the hot paths allocate nothing.

pub mod encoding;
pub mod ops;
pub mod pool;
pub mod topk;

pub use encoding::{pack, try_as_bytes, try_as_f32, unpack};
pub use ops::{
    batch_cosine_similarity, cosine_similarity, dot_product, euclidean_distance, l2_norm,
    normalize,
};
pub use pool::VectorPool;
pub use topk::{sort_by_similarity, top_k};
