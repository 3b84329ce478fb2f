//! Test server lifecycle management
//!
//! Each test gets an isolated server on a random port with its own seeded
//! temp database and a scripted in-process image store.

use super::fixtures::create_test_collection;
use async_trait::async_trait;
use shinee_collection_server::collection_store::SqliteCollectionStore;
use shinee_collection_server::image_store::{ImageStore, ImageStoreError};
use shinee_collection_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// One upload accepted by the mock image store.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// In-process image store double: records uploads, optionally failing on a
/// chosen call (0-based).
pub struct MockImageStore {
    uploads: Mutex<Vec<RecordedUpload>>,
    attempts: AtomicUsize,
    fail_on_upload: Option<usize>,
}

impl MockImageStore {
    fn new(fail_on_upload: Option<usize>) -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail_on_upload,
        }
    }

    /// Uploads that were accepted (failed attempts are not recorded).
    pub fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    /// Total upload attempts, including the failing one.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn put_object(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        file_name: &str,
    ) -> Result<String, ImageStoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_upload == Some(attempt) {
            return Err(ImageStoreError::Rejected {
                status: 503,
                body: "bucket unavailable".to_string(),
            });
        }
        self.uploads.lock().unwrap().push(RecordedUpload {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
        });
        Ok(format!("https://img.test/objects/{}-{}", attempt, file_name))
    }
}

/// Test server instance with an isolated database.
///
/// The server task is aborted on drop and the temp resources cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Collection store for direct database access in tests
    pub store: Arc<SqliteCollectionStore>,

    /// The image store double behind the upload endpoint
    pub image_store: Arc<MockImageStore>,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    server_task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server whose image store accepts every upload.
    pub async fn spawn() -> Self {
        Self::spawn_inner(Some(MockImageStore::new(None))).await
    }

    /// Spawn a server whose image store fails the given upload attempt
    /// (0-based).
    pub async fn spawn_with_failing_upload(fail_on_upload: usize) -> Self {
        Self::spawn_inner(Some(MockImageStore::new(Some(fail_on_upload)))).await
    }

    /// Spawn a server without any image store configured.
    pub async fn spawn_without_image_store() -> Self {
        Self::spawn_inner(None).await
    }

    async fn spawn_inner(image_store: Option<MockImageStore>) -> Self {
        let (temp_dir, store) = create_test_collection().expect("Failed to create test database");
        let store = Arc::new(store);

        // With no mock given, the app runs without an image store; the
        // TestServer still holds an (unused) mock so accessors stay simple.
        let (image_store, app_image_store): (Arc<MockImageStore>, Option<Arc<dyn ImageStore>>) =
            match image_store {
                Some(mock) => {
                    let mock = Arc::new(mock);
                    (mock.clone(), Some(mock))
                }
                None => (Arc::new(MockImageStore::new(None)), None),
            };

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: 0,
            frontend_dir_path: None,
        };

        let app = make_app(config, store.clone(), app_image_store);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let server_task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server died");
        });

        TestServer {
            base_url: format!("http://{}", addr),
            store,
            image_store,
            _temp_dir: temp_dir,
            server_task,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server_task.abort();
    }
}
