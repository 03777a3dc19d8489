use qdrant_client::qdrant::{
	Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, Query, QueryPointsBuilder,
	ScoredPoint, UpsertPointsBuilder, VectorParamsBuilder,
};

use crate::{Result, outbox::DOC_KIND_EVENT};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &shrike_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		let builder = CreateCollectionBuilder::new(self.collection.clone())
			.vectors_config(VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine));

		self.client.create_collection(builder).await?;

		Ok(())
	}

	/// Nearest event documents to the given vector, payload included.
	pub async fn search_events(&self, vector: Vec<f32>, limit: u32) -> Result<Vec<ScoredPoint>> {
		let query = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.filter(Filter::all([Condition::matches("doc_kind", DOC_KIND_EVENT.to_string())]))
			.limit(limit as u64)
			.with_payload(true);
		let response = self.client.query(query).await?;

		Ok(response.result)
	}

	pub async fn upsert_point(&self, point: PointStruct) -> Result<()> {
		let upsert = UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

}
