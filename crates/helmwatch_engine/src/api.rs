use std::path::{Path, PathBuf};
use std::time::Duration;

use client_logging::{client_debug, client_info};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;

use crate::persist::{AtomicFileWriter, PersistError, StagedFile};
use crate::{
    ApiError, DeleteReply, EngineEvent, Endpoints, FailureKind, HistoryItem, StatusReply,
    UploadReply,
};

/// Multipart field name the upload endpoint expects.
pub const UPLOAD_FIELD: &str = "video";

/// Chunks buffered between the response stream and the file writer.
const DOWNLOAD_QUEUE: usize = 16;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub connect_timeout: Duration,
    /// Whole-request limit for small JSON calls.
    pub request_timeout: Duration,
    /// Whole-request limit for uploads and downloads.
    pub transfer_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            transfer_timeout: Duration::from_secs(600),
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The job service's REST surface.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadReply, ApiError>;

    async fn status(&self, filename: &str) -> Result<StatusReply, ApiError>;

    async fn history(&self) -> Result<Vec<HistoryItem>, ApiError>;

    async fn delete_history(&self, name: &str) -> Result<DeleteReply, ApiError>;

    /// Streams the annotated video into `dir`, returning the written path.
    async fn download(&self, filename: &str, dir: &Path) -> Result<PathBuf, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobApi {
    client: reqwest::Client,
    endpoints: Endpoints,
    settings: ApiSettings,
}

impl ReqwestJobApi {
    pub fn new(endpoints: Endpoints, settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            endpoints,
            settings,
        })
    }
}

#[async_trait::async_trait]
impl JobApi for ReqwestJobApi {
    async fn upload(&self, path: &Path) -> Result<UploadReply, ApiError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ApiError::new(FailureKind::InvalidInput, format!("{path:?} is not a file"))
            })?;
        let file = tokio::fs::File::open(path).await.map_err(io_error)?;
        let len = file.metadata().await.map_err(io_error)?.len();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, len)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(map_reqwest_error)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        client_info!("Uploading {:?} ({} bytes)", path, len);
        let response = self
            .client
            .post(self.endpoints.upload())
            .timeout(self.settings.transfer_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        decode_reply(response).await
    }

    async fn status(&self, filename: &str) -> Result<StatusReply, ApiError> {
        let response = self
            .client
            .get(self.endpoints.status(filename)?)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        decode_success(response).await
    }

    async fn history(&self) -> Result<Vec<HistoryItem>, ApiError> {
        let response = self
            .client
            .get(self.endpoints.history())
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        // The server answers `null` when nothing was ever recorded.
        let items: Option<Vec<HistoryItem>> = decode_success(response).await?;
        Ok(items.unwrap_or_default())
    }

    async fn delete_history(&self, name: &str) -> Result<DeleteReply, ApiError> {
        let response = self
            .client
            .delete(self.endpoints.history_item(name)?)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        decode_reply(response).await
    }

    async fn download(&self, filename: &str, dir: &Path) -> Result<PathBuf, ApiError> {
        let response = self
            .client
            .get(self.endpoints.download(filename)?)
            .timeout(self.settings.transfer_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        // File writes happen off the runtime; chunks travel over a bounded queue.
        let writer = AtomicFileWriter::new(dir.to_path_buf());
        let (chunks, mut queue) = tokio::sync::mpsc::channel::<Vec<u8>>(DOWNLOAD_QUEUE);
        let staging = tokio::task::spawn_blocking(move || -> Result<StagedFile, PersistError> {
            let mut staged = writer.stage()?;
            while let Some(chunk) = queue.blocking_recv() {
                staged.write_chunk(&chunk)?;
            }
            Ok(staged)
        });

        let mut streamed = Ok(());
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => {
                    // A closed queue means the writer failed; its error is reported below.
                    if chunks.send(chunk.to_vec()).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    streamed = Err(map_reqwest_error(err));
                    break;
                }
            }
        }
        drop(chunks);

        let staged = staging.await.map_err(join_error)?;
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || -> Result<PathBuf, ApiError> {
            // Returning early drops the staged temp file, which deletes it.
            streamed?;
            let staged = staged.map_err(persist_error)?;
            client_debug!("Downloaded {} bytes for {}", staged.bytes_written(), filename);
            staged.commit(&filename).map_err(persist_error)
        })
        .await
        .map_err(join_error)?
    }
}

/// Decodes a JSON body the server sends with both success and error codes.
async fn decode_reply<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    match serde_json::from_slice(&bytes) {
        Ok(reply) => Ok(reply),
        Err(_) if !status.is_success() => Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        )),
        Err(err) => Err(ApiError::new(FailureKind::Decode, err.to_string())),
    }
}

/// Decodes a JSON body, treating any non-2xx status as failure.
async fn decode_success<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidInput, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

fn io_error(err: std::io::Error) -> ApiError {
    ApiError::new(FailureKind::Io, err.to_string())
}

fn join_error(err: tokio::task::JoinError) -> ApiError {
    ApiError::new(FailureKind::Io, err.to_string())
}

fn persist_error(err: PersistError) -> ApiError {
    match err {
        PersistError::InvalidName(_) => ApiError::new(FailureKind::InvalidInput, err.to_string()),
        PersistError::OutputDir(_) | PersistError::Io(_) => {
            ApiError::new(FailureKind::Io, err.to_string())
        }
    }
}
