use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use batchroute::api::{ApiError, ApiFuture, BatchApi, BatchResource, CreateBatchRequest};
use batchroute::types::BatchId;

type Scripted = Result<BatchResource, ApiError>;

/// A fake batch service that:
/// - answers fetches from a scripted queue, repeating the last entry once the
///   queue runs dry
/// - answers creates with a fixed response
/// - records every request and the peak number of concurrent fetches.
pub struct ScriptedBatchApi {
    fetches: Mutex<VecDeque<Scripted>>,
    last_fetch: Mutex<Option<Scripted>>,
    create_response: Scripted,
    fetch_delay: Option<Duration>,

    created: Mutex<Vec<CreateBatchRequest>>,
    fetched_ids: Mutex<Vec<BatchId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedBatchApi {
    pub fn new() -> Self {
        Self {
            fetches: Mutex::new(VecDeque::new()),
            last_fetch: Mutex::new(None),
            create_response: Ok(crate::builders::optimizing("b-new")),
            fetch_delay: None,
            created: Mutex::new(Vec::new()),
            fetched_ids: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Queue fetch responses, in order.
    pub fn with_fetches(self, responses: impl IntoIterator<Item = Scripted>) -> Self {
        self.fetches.lock().unwrap().extend(responses);
        self
    }

    pub fn with_create_response(mut self, response: Scripted) -> Self {
        self.create_response = response;
        self
    }

    /// Every fetch sleeps this long before answering.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn created_requests(&self) -> Vec<CreateBatchRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetched_ids.lock().unwrap().len()
    }

    pub fn fetched_ids(&self) -> Vec<BatchId> {
        self.fetched_ids.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_fetch(&self) -> Scripted {
        let next = self.fetches.lock().unwrap().pop_front();
        let mut last = self.last_fetch.lock().unwrap();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string()))),
        }
    }
}

impl Default for ScriptedBatchApi {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchApi for ScriptedBatchApi {
    fn create_batch(&self, request: &CreateBatchRequest) -> ApiFuture<'_, BatchResource> {
        self.created.lock().unwrap().push(request.clone());
        let response = self.create_response.clone();
        Box::pin(async move { response })
    }

    fn fetch_batch(&self, id: &BatchId) -> ApiFuture<'_, BatchResource> {
        self.fetched_ids.lock().unwrap().push(id.clone());

        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.fetch_delay {
                tokio::time::sleep(delay).await;
            }
            let response = self.next_fetch();

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            response
        })
    }
}
