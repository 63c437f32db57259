//! In-memory `SearchClient` double that mimics RediSearch replies.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use vindex_store::redisearch::{
    ClientError, Document, IndexInfo, IndexSchema, KnnQuery, SearchClient,
};

#[derive(Debug, Default)]
pub struct MockState {
    /// Index exists on the server
    pub exists: bool,
    /// `FT.INFO` misses but `FT._LIST` shows the index (another creator won)
    pub listed_only: bool,
    /// Error returned by the next `FT.INFO`
    pub info_error: Option<ClientError>,
    /// Error returned by the next `FT.CREATE`
    pub create_error: Option<ClientError>,
    /// Error returned by the next document batch
    pub add_error: Option<ClientError>,
    /// Documents returned by `FT.SEARCH`
    pub search_reply: Vec<Document>,

    pub info_calls: usize,
    pub list_calls: usize,
    pub create_calls: usize,
    pub created: usize,
    pub search_calls: usize,
    pub batches: Vec<Vec<Document>>,
    pub schemas: Vec<IndexSchema>,
    pub last_query: Option<KnnQuery>,
}

impl MockState {
    pub fn stored(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

pub struct MockClient {
    name: String,
    pub state: Mutex<MockState>,
}

impl MockClient {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn existing(name: &str) -> Self {
        let client = Self::new(name);
        client.state.lock().unwrap().exists = true;
        client
    }

    pub fn with_state(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn snapshot<T>(&self, f: impl FnOnce(&MockState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

pub fn unknown_index() -> ClientError {
    ClientError::Server("Unknown index name".to_string())
}

#[async_trait]
impl SearchClient for MockClient {
    fn index_name(&self) -> &str {
        &self.name
    }

    async fn info(&self) -> Result<IndexInfo, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.info_calls += 1;
        if let Some(err) = state.info_error.take() {
            return Err(err);
        }
        if !state.exists {
            return Err(unknown_index());
        }
        Ok(IndexInfo {
            name: self.name.clone(),
            num_docs: state.stored() as u64,
        })
    }

    async fn list(&self) -> Result<Vec<String>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.exists || state.listed_only {
            Ok(vec!["other".to_string(), self.name.clone()])
        } else {
            Ok(vec!["other".to_string()])
        }
    }

    async fn create_index(&self, schema: &IndexSchema) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        state.schemas.push(schema.clone());
        if let Some(err) = state.create_error.take() {
            return Err(err);
        }
        if state.exists {
            return Err(ClientError::Server("Index already exists".to_string()));
        }
        state.exists = true;
        state.created += 1;
        Ok(())
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.add_error.take() {
            return Err(err);
        }
        state.batches.push(documents.to_vec());
        Ok(())
    }

    async fn search(&self, query: &KnnQuery) -> Result<Vec<Document>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.search_calls += 1;
        state.last_query = Some(query.clone());
        if !state.exists {
            return Err(unknown_index());
        }
        Ok(state.search_reply.clone())
    }
}
