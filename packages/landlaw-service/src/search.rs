use landlaw_config::EmbeddingProviderConfig;
use landlaw_domain::{Document, MetadataFilters};
use landlaw_providers::embedding;
use landlaw_storage::qdrant::{HybridQuery, QdrantStore};

use crate::{BoxFuture, Error, Result, SearchEngine};

#[derive(Debug, Clone)]
pub struct SearchOptions {
	pub limit: u32,
	/// 0.0 is pure lexical, 1.0 is pure vector.
	pub alpha: f32,
	pub filters: MetadataFilters,
}

/// Hybrid search over the law chunk collection: the query is embedded, then Qdrant runs the dense
/// and BM25 legs.
pub struct QdrantSearch {
	pub store: QdrantStore,
	pub embedding: EmbeddingProviderConfig,
}
impl QdrantSearch {
	pub fn new(store: QdrantStore, embedding: EmbeddingProviderConfig) -> Self {
		Self { store, embedding }
	}
}
impl SearchEngine for QdrantSearch {
	fn hybrid_search<'a>(
		&'a self,
		query: &'a str,
		options: &'a SearchOptions,
	) -> BoxFuture<'a, Result<Vec<Document>>> {
		Box::pin(async move {
			let vector = if options.alpha > 0.0 {
				embedding::embed_one(&self.embedding, query).await?
			} else {
				Vec::new()
			};

			if !vector.is_empty() && vector.len() != self.store.vector_dim as usize {
				return Err(Error::Provider {
					message: "Embedding vector dimension mismatch.".to_string(),
				});
			}

			self.store
				.hybrid_search(HybridQuery {
					text: query,
					vector,
					limit: options.limit,
					alpha: options.alpha,
					filters: &options.filters,
				})
				.await
				.map_err(|err| Error::Search { message: err.to_string() })
		})
	}
}
