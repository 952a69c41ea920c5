use serde::{Deserialize, Serialize};

use plenar_graph::{ConnectionState, Params, Record};

use crate::{PlenarService, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQueryRequest {
	pub query: String,
	#[serde(default)]
	pub params: Params,
}

impl PlenarService {
	/// Runs a query against the graph store through the shared retrying connection.
	pub async fn graph_query(&self, req: GraphQueryRequest) -> Result<Vec<Record>> {
		Ok(self.graph.run(&req.query, &req.params).await?)
	}

	pub fn graph_state(&self) -> ConnectionState {
		self.graph.state()
	}

	pub async fn close_graph(&self) {
		self.graph.close().await;
	}
}
