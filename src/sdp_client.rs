//! HTTP client for the ServiceDesk Plus REST/XML API.
//!
//! This module provides the `SdpClient` struct. Every operation is one
//! call to the shared transport: the technician key and operation name go
//! in the query string, input fields travel as the XML envelope in
//! `INPUT_DATA`, and an attachment turns the GET into a multipart POST.
//!
//! There is no retry, backoff or client-side timeout: a transport failure
//! is returned to the caller as is. Wrap a call in `tokio::time::timeout`
//! if you need a deadline.
//!
//! # Security
//!
//! The API key is never logged. Transport errors are stripped of the
//! request URL, which carries the key, and response excerpts in errors are
//! sanitized.

use std::path::{Path, PathBuf};

use reqwest::{multipart, Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::envelope::{build_envelope, Fields};
use crate::error::SdpError;
use crate::models::{
    extract_dated_records, extract_records, queues_from_filters, DatedRecord, OperationResult,
    Queue, Record, TechnicianDirectory,
};
use crate::response::{parse_generic, parse_simple};

/// Path segment of the XML API under the server root.
const API_SEGMENT: &str = "sdpapi";

/// Multipart field name SDP expects for an uploaded attachment.
const ATTACHMENT_FIELD: &str = "file";

/// Maximum length for HTTP error response bodies kept in errors.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Epoch field parsed in `GET_REQUESTS` records.
const REQUEST_CREATED_FIELD: &str = "createdtime";

/// Epoch field parsed in `GET_ALL_CONVERSATIONS` records.
const CONVERSATION_CREATED_FIELD: &str = "createddate";

/// One operation to send: where, which, and with what input.
///
/// # Example
///
/// ```ignore
/// let call = OperationCall::new("request/198952/notes", "ADD_NOTE")
///     .with_fields(Fields::new().with("isPublic", "false").with("notesText", "Called back"))
///     .with_wrappers(&["Notes", "Note"]);
/// let result = client.send(call).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OperationCall {
    path: String,
    operation: String,
    fields: Option<Fields>,
    wrappers: Vec<String>,
    attachment: Option<PathBuf>,
}

impl OperationCall {
    /// Creates a call of `operation` against `path`, relative to the API base.
    pub fn new(path: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            operation: operation.into(),
            fields: None,
            wrappers: Vec::new(),
            attachment: None,
        }
    }

    /// Sets the input fields sent as the `INPUT_DATA` envelope.
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Sets the elements nested between `Details` and the parameters.
    pub fn with_wrappers(mut self, wrappers: &[&str]) -> Self {
        self.wrappers = wrappers.iter().map(|w| w.to_string()).collect();
        self
    }

    /// Uploads the file at `path` with the call.
    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }

    /// The operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The path relative to the API base.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The serialized envelope, if the call carries any fields.
    pub fn input_data(&self) -> Result<Option<String>, SdpError> {
        let Some(fields) = self.fields.as_ref().filter(|f| !f.is_empty()) else {
            return Ok(None);
        };
        let wrappers: Vec<&str> = self.wrappers.iter().map(String::as_str).collect();
        build_envelope(fields, &wrappers).map(Some)
    }
}

/// HTTP client for the ServiceDesk Plus XML API.
///
/// Holds the credential and base URL; carries no other state between calls.
///
/// # Example
///
/// ```ignore
/// let config = Config::new("http://sdplus", technician_key)?;
/// let client = SdpClient::new(&config)?;
///
/// let created = client.request_add(fields).await?;
/// println!("created #{}", created.get("workorderid").unwrap_or("?"));
/// ```
#[derive(Clone)]
pub struct SdpClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Base URL of the XML API, always ending in `/sdpapi/`.
    base_url: Url,

    /// API key for authentication.
    /// SECURITY: Never log this value!
    api_key: String,
}

impl SdpClient {
    /// Creates a new SDP client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `SdpError::HttpClient` if the HTTP client fails to initialize
    /// and `SdpError::Config` if the base URL does not parse.
    pub fn new(config: &Config) -> Result<Self, SdpError> {
        let http = Client::builder().build().map_err(SdpError::HttpClient)?;

        let base_url = Self::normalize_base_url(&config.base_url);
        let base_url = Url::parse(&base_url)
            .map_err(|e| SdpError::invalid_config(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key().to_string(),
        })
    }

    /// Normalizes the base URL so it ends with the API path and a slash.
    fn normalize_base_url(url: &str) -> String {
        let url = url.trim_end_matches('/');
        if url.ends_with(&format!("/{}", API_SEGMENT)) {
            format!("{}/", url)
        } else {
            format!("{}/{}/", url, API_SEGMENT)
        }
    }

    /// Returns the normalized API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Validates that an ID is a numeric string, as expected by the SDP API.
    ///
    /// IDs are interpolated into the request path, so anything else could
    /// escape the intended resource.
    fn validate_id(id: &str, field_name: &str) -> Result<(), SdpError> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SdpError::validation(format!(
                "{} must be a numeric string, got: {:?}",
                field_name,
                id.chars().take(50).collect::<String>()
            )));
        }
        Ok(())
    }

    fn request_path(request_id: &str) -> Result<String, SdpError> {
        Self::validate_id(request_id, "request_id")?;
        Ok(format!("request/{}", request_id))
    }

    /// Returns the web URL for viewing a request in the ServiceDesk Plus UI.
    pub fn request_web_url(&self, request_id: &str) -> String {
        let web_base = self
            .base_url
            .as_str()
            .trim_end_matches('/')
            .trim_end_matches(API_SEGMENT)
            .trim_end_matches('/');
        format!(
            "{}/WorkOrder.do?woMode=viewWO&woID={}",
            web_base,
            urlencoding::encode(request_id)
        )
    }

    /// Tests connectivity to the SDP server.
    ///
    /// Fetches the request filters, which any technician may read, and
    /// checks that the server answers with `Success`.
    ///
    /// # Errors
    ///
    /// Returns `SdpError::ConnectionTest` with the reason on any failure.
    pub async fn test_connection(&self) -> Result<(), SdpError> {
        tracing::debug!("Testing connection to SDP server");

        let result = self
            .send(OperationCall::new("request/", "GET_REQUEST_FILTERS"))
            .await;

        match result {
            Ok(result) if result.is_success() => {
                tracing::info!("Connection test successful");
                Ok(())
            }
            Ok(result) => {
                let message = SdpError::sanitize_message(result.display_message(), &self.api_key);
                Err(SdpError::connection_test(format!(
                    "server answered {:?}: {} - verify the technician key",
                    result.status, message
                )))
            }
            Err(SdpError::Http(e)) => {
                let message = SdpError::sanitize_message(&e.to_string(), &self.api_key);
                Err(SdpError::connection_test(format!(
                    "HTTP error: {} - verify the base URL is correct",
                    message
                )))
            }
            Err(e) => Err(SdpError::connection_test(e.sanitized_display(&self.api_key))),
        }
    }

    /// Resolves a call's path against the API base.
    fn endpoint(&self, path: &str) -> Result<Url, SdpError> {
        self.base_url
            .join(path)
            .map_err(|e| SdpError::validation(format!("invalid operation path {:?}: {}", path, e)))
    }

    /// Performs the single HTTP round trip of a call and returns the body.
    async fn fetch(&self, call: &OperationCall) -> Result<String, SdpError> {
        let url = self.endpoint(&call.path)?;

        tracing::debug!(
            operation = %call.operation,
            path = %call.path,
            attachment = call.attachment.is_some(),
            "Sending SDP operation"
        );

        let mut params = vec![
            ("TECHNICIAN_KEY", self.api_key.clone()),
            ("OPERATION_NAME", call.operation.clone()),
        ];
        if let Some(input) = call.input_data()? {
            params.push(("INPUT_DATA", input));
        }

        let request = match &call.attachment {
            Some(path) => {
                let form = Self::attachment_form(path).await?;
                self.http.post(url).query(&params).multipart(form)
            }
            None => self.http.get(url).query(&params),
        };

        let response = request.send().await.map_err(SdpError::transport)?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, response).await);
        }

        let body = response.text().await.map_err(SdpError::transport)?;

        tracing::trace!(operation = %call.operation, body = %body, "SDP API response");

        Ok(body)
    }

    /// Reads the attachment into a multipart form.
    ///
    /// The file is read whole, so its handle is closed before the request
    /// goes out.
    async fn attachment_form(path: &Path) -> Result<multipart::Form, SdpError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| SdpError::Attachment {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        Ok(multipart::Form::new().part(ATTACHMENT_FIELD, part))
    }

    /// Converts a non-success HTTP response into an error.
    async fn handle_http_error(&self, status: StatusCode, response: reqwest::Response) -> SdpError {
        let body = response.text().await.unwrap_or_default();
        let body = SdpError::sanitize_message(&body, &self.api_key);
        let body = match body.char_indices().nth(MAX_ERROR_BODY_LEN) {
            Some((cut, _)) => format!("{}...[truncated]", &body[..cut]),
            None => body,
        };

        tracing::warn!(status = %status, "SDP server returned an error status");

        SdpError::HttpStatus { status, body }
    }

    /// Sends a call and parses the answer in direct mode.
    ///
    /// A vendor-reported failure is returned as an `OperationResult` whose
    /// `is_success()` is false.
    ///
    /// # Errors
    ///
    /// Transport failures, unreadable attachments and bodies without a
    /// `result` block.
    pub async fn send(&self, call: OperationCall) -> Result<OperationResult, SdpError> {
        let body = self.fetch(&call).await?;
        parse_simple(&body)
    }

    /// Sends a call and converts the answer generically, unprocessed.
    pub async fn send_generic(&self, call: OperationCall) -> Result<Value, SdpError> {
        let body = self.fetch(&call).await?;
        parse_generic(&body)
    }

    async fn send_records(&self, call: OperationCall) -> Result<Vec<Record>, SdpError> {
        let response = self.send_generic(call).await?;
        extract_records(&response)
    }

    // ========================================================================
    // Request operations
    // ========================================================================

    /// Creates a request from the given fields (`ADD_REQUEST`).
    ///
    /// On success the new id is in the `workorderid` parameter.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let fields = Fields::new()
    ///     .with("requester", "Simon Crouch")
    ///     .with("subject", "Printer not working");
    /// let result = client.request_add(fields).await?;
    /// ```
    pub async fn request_add(&self, fields: Fields) -> Result<OperationResult, SdpError> {
        self.send(OperationCall::new("request/", "ADD_REQUEST").with_fields(fields))
            .await
    }

    /// Updates fields of an existing request (`EDIT_REQUEST`).
    pub async fn request_edit(
        &self,
        request_id: &str,
        fields: Fields,
    ) -> Result<OperationResult, SdpError> {
        let path = Self::request_path(request_id)?;
        self.send(OperationCall::new(path, "EDIT_REQUEST").with_fields(fields))
            .await
    }

    /// Gets the details of a request (`GET_REQUEST`).
    pub async fn request_view(&self, request_id: &str) -> Result<OperationResult, SdpError> {
        let path = Self::request_path(request_id)?;
        self.send(OperationCall::new(path, "GET_REQUEST")).await
    }

    /// Deletes a request (`DELETE_REQUEST`).
    pub async fn request_delete(&self, request_id: &str) -> Result<OperationResult, SdpError> {
        let path = Self::request_path(request_id)?;
        self.send(OperationCall::new(path, "DELETE_REQUEST")).await
    }

    /// Closes a request (`CLOSE_REQUEST`).
    ///
    /// SDP refuses to close a request that has not been assigned.
    ///
    /// # Arguments
    ///
    /// * `request_id` - The unique request ID
    /// * `accepted` - Whether the requester accepted the resolution
    /// * `comment` - Text for the closure comments box
    pub async fn request_close(
        &self,
        request_id: &str,
        accepted: bool,
        comment: &str,
    ) -> Result<OperationResult, SdpError> {
        let path = Self::request_path(request_id)?;
        let fields = Fields::new()
            .with("closeAccepted", if accepted { "Accepted" } else { "" })
            .with("closeComment", comment);
        self.send(OperationCall::new(path, "CLOSE_REQUEST").with_fields(fields))
            .await
    }

    /// Lists the conversations of a request (`GET_CONVERSATIONS`).
    pub async fn request_get_conversations(
        &self,
        request_id: &str,
    ) -> Result<Vec<Record>, SdpError> {
        let path = format!("{}/conversation", Self::request_path(request_id)?);
        self.send_records(OperationCall::new(path, "GET_CONVERSATIONS"))
            .await
    }

    /// Gets one conversation of a request (`GET_CONVERSATION`).
    pub async fn request_get_conversation(
        &self,
        request_id: &str,
        conversation_id: &str,
    ) -> Result<Vec<Record>, SdpError> {
        Self::validate_id(conversation_id, "conversation_id")?;
        let path = format!(
            "{}/conversation/{}",
            Self::request_path(request_id)?,
            conversation_id
        );
        self.send_records(OperationCall::new(path, "GET_CONVERSATION"))
            .await
    }

    /// Lists every conversation of a request, notifications included
    /// (`GET_ALL_CONVERSATIONS`), with `createddate` parsed.
    pub async fn request_get_all_conversations(
        &self,
        request_id: &str,
    ) -> Result<Vec<DatedRecord>, SdpError> {
        let path = format!("{}/allconversation/", Self::request_path(request_id)?);
        let response = self
            .send_generic(OperationCall::new(path, "GET_ALL_CONVERSATIONS"))
            .await?;
        extract_dated_records(&response, CONVERSATION_CREATED_FIELD)
    }

    /// Uploads a file to a request (`ADD_ATTACHMENT`).
    ///
    /// # Errors
    ///
    /// Returns `SdpError::Attachment` if the file cannot be read; nothing
    /// is sent in that case.
    pub async fn request_add_attachment(
        &self,
        request_id: &str,
        attachment: impl AsRef<Path>,
    ) -> Result<OperationResult, SdpError> {
        let path = format!("{}/attachment", Self::request_path(request_id)?);
        self.send(
            OperationCall::new(path, "ADD_ATTACHMENT").with_attachment(attachment.as_ref()),
        )
        .await
    }

    /// Adds a resolution to a request (`ADD_RESOLUTION`).
    pub async fn request_add_resolution(
        &self,
        request_id: &str,
        text: &str,
    ) -> Result<OperationResult, SdpError> {
        self.resolution(request_id, "ADD_RESOLUTION", text).await
    }

    /// Replaces the resolution of a request (`EDIT_RESOLUTION`).
    pub async fn request_edit_resolution(
        &self,
        request_id: &str,
        text: &str,
    ) -> Result<OperationResult, SdpError> {
        self.resolution(request_id, "EDIT_RESOLUTION", text).await
    }

    async fn resolution(
        &self,
        request_id: &str,
        operation: &str,
        text: &str,
    ) -> Result<OperationResult, SdpError> {
        let path = format!("{}/resolution", Self::request_path(request_id)?);
        let call = OperationCall::new(path, operation)
            .with_fields(Fields::new().with("resolutiontext", text))
            .with_wrappers(&["resolution"]);
        self.send(call).await
    }

    /// Gets the resolution of a request (`GET_RESOLUTION`), unprocessed.
    pub async fn request_get_resolution(&self, request_id: &str) -> Result<Value, SdpError> {
        let path = Self::request_path(request_id)?;
        self.send_generic(OperationCall::new(path, "GET_RESOLUTION"))
            .await
    }

    /// Assigns a request to the calling technician (`PICKUP_REQUEST`).
    pub async fn request_pickup(&self, request_id: &str) -> Result<OperationResult, SdpError> {
        let path = Self::request_path(request_id)?;
        self.send(OperationCall::new(path, "PICKUP_REQUEST")).await
    }

    /// Assigns a request to a technician by id (`ASSIGN_REQUEST`).
    ///
    /// The technician id travels escaped inside the envelope and is passed
    /// through unchecked.
    pub async fn request_assign(
        &self,
        request_id: &str,
        technician_id: &str,
    ) -> Result<OperationResult, SdpError> {
        let path = Self::request_path(request_id)?;
        let fields = Fields::new().with("technicianid", technician_id);
        self.send(OperationCall::new(path, "ASSIGN_REQUEST").with_fields(fields))
            .await
    }

    /// Assigns a request to a technician by display name.
    ///
    /// Fetches the whole technician directory first.
    ///
    /// # Errors
    ///
    /// Returns `SdpError::TechnicianNotFound` if no technician has that
    /// name; the request is left untouched.
    pub async fn request_assign_name(
        &self,
        full_name: &str,
        request_id: &str,
    ) -> Result<OperationResult, SdpError> {
        Self::validate_id(request_id, "request_id")?;
        let directory = self.technician_get_all("", "").await?;
        let technician_id = directory.resolve(full_name)?;

        tracing::debug!(request_id = %request_id, technician_id = %technician_id, "Resolved technician by name");

        self.request_assign(request_id, technician_id).await
    }

    /// Replies to the requester by mail (`REPLY_REQUEST`), unprocessed.
    ///
    /// Typical fields are `to`, `cc`, `subject` and `description`.
    pub async fn request_reply(&self, request_id: &str, fields: Fields) -> Result<Value, SdpError> {
        let path = Self::request_path(request_id)?;
        self.send_generic(OperationCall::new(path, "REPLY_REQUEST").with_fields(fields))
            .await
    }

    /// Lists requests, most recent first (`GET_REQUESTS`), with
    /// `createdtime` parsed.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let params = RequestListParams::new().with_filter("Open_System").with_limit(10);
    /// for request in client.request_get_requests(params).await? {
    ///     println!("{:?} {:?}", request.get("workorderid"), request.timestamp);
    /// }
    /// ```
    pub async fn request_get_requests(
        &self,
        params: RequestListParams,
    ) -> Result<Vec<DatedRecord>, SdpError> {
        let call = OperationCall::new("request/", "GET_REQUESTS").with_fields(params.to_fields());
        let response = self.send_generic(call).await?;
        extract_dated_records(&response, REQUEST_CREATED_FIELD)
    }

    /// Gets one notification of a request (`GET_NOTIFICATION`), unprocessed.
    pub async fn request_get_notification(
        &self,
        request_id: &str,
        notification_id: &str,
    ) -> Result<Value, SdpError> {
        Self::validate_id(notification_id, "notification_id")?;
        let path = format!(
            "{}/notification/{}",
            Self::request_path(request_id)?,
            notification_id
        );
        self.send_generic(OperationCall::new(path, "GET_NOTIFICATION"))
            .await
    }

    /// Lists the notifications of a request (`GET_NOTIFICATIONS`), unprocessed.
    pub async fn request_get_notifications(&self, request_id: &str) -> Result<Value, SdpError> {
        let path = format!("{}/notification/", Self::request_path(request_id)?);
        self.send_generic(OperationCall::new(path, "GET_NOTIFICATIONS"))
            .await
    }

    /// Gets the request filters (`GET_REQUEST_FILTERS`), unprocessed.
    ///
    /// The server does not return every filter.
    pub async fn request_get_request_filters(&self) -> Result<Value, SdpError> {
        self.send_generic(OperationCall::new("request/", "GET_REQUEST_FILTERS"))
            .await
    }

    /// Looks up filter ids by display name.
    ///
    /// Only filters present in `GET_REQUEST_FILTERS` can be found.
    pub async fn get_queue_ids(&self, queue_names: &[&str]) -> Result<Vec<Queue>, SdpError> {
        let filters = self.request_get_request_filters().await?;
        queues_from_filters(&filters, queue_names)
    }

    // ========================================================================
    // Note operations
    // ========================================================================

    /// Adds a note to a request (`ADD_NOTE`).
    pub async fn note_add(
        &self,
        request_id: &str,
        is_public: bool,
        text: &str,
    ) -> Result<OperationResult, SdpError> {
        let path = format!("{}/notes", Self::request_path(request_id)?);
        let fields = Fields::new()
            .with("isPublic", if is_public { "true" } else { "false" })
            .with("notesText", text);
        let call = OperationCall::new(path, "ADD_NOTE")
            .with_fields(fields)
            .with_wrappers(&["Notes", "Note"]);
        self.send(call).await
    }

    /// Replaces the text of a note (`EDIT_NOTE`).
    pub async fn note_edit(
        &self,
        request_id: &str,
        note_id: &str,
        text: &str,
    ) -> Result<OperationResult, SdpError> {
        let path = Self::note_path(request_id, note_id)?;
        let call = OperationCall::new(path, "EDIT_NOTE")
            .with_fields(Fields::new().with("notesText", text))
            .with_wrappers(&["Notes", "Note"]);
        self.send(call).await
    }

    /// Gets one note (`GET_NOTE`).
    pub async fn note_view(
        &self,
        request_id: &str,
        note_id: &str,
    ) -> Result<OperationResult, SdpError> {
        let path = Self::note_path(request_id, note_id)?;
        self.send(OperationCall::new(path, "GET_NOTE")).await
    }

    /// Gets all notes of a request (`GET_NOTES`).
    ///
    /// Direct mode flattens every note into one map, so only the last
    /// note's values survive; use [`send_generic`](Self::send_generic) with
    /// the same call for the full list.
    pub async fn note_view_all(&self, request_id: &str) -> Result<OperationResult, SdpError> {
        let path = format!("{}/notes/", Self::request_path(request_id)?);
        self.send(OperationCall::new(path, "GET_NOTES")).await
    }

    /// Deletes a note (`DELETE_NOTE`).
    pub async fn note_delete(
        &self,
        request_id: &str,
        note_id: &str,
    ) -> Result<OperationResult, SdpError> {
        let path = Self::note_path(request_id, note_id)?;
        self.send(OperationCall::new(path, "DELETE_NOTE")).await
    }

    fn note_path(request_id: &str, note_id: &str) -> Result<String, SdpError> {
        Self::validate_id(note_id, "note_id")?;
        Ok(format!("{}/notes/{}", Self::request_path(request_id)?, note_id))
    }

    // ========================================================================
    // Technician operations
    // ========================================================================

    /// Fetches the technician directory (`GET_ALL`).
    ///
    /// Empty `site_name` / `group_id` mean no filter.
    pub async fn technician_get_all(
        &self,
        site_name: &str,
        group_id: &str,
    ) -> Result<TechnicianDirectory, SdpError> {
        let fields = Fields::new()
            .with("siteName", site_name)
            .with("groupid", group_id);
        let response = self
            .send_generic(OperationCall::new("technician/", "GET_ALL").with_fields(fields))
            .await?;
        TechnicianDirectory::from_response(&response)
    }
}

/// Parameters for listing requests.
///
/// Defaults to the `All_Requests` filter, 1000 rows, starting at the most
/// recent request.
#[derive(Debug, Clone)]
pub struct RequestListParams {
    /// Filter id (not display name) to list.
    filter_by: String,

    /// Maximum number of rows.
    limit: u32,

    /// Rows to skip, counted from the most recent request.
    from: u32,
}

impl Default for RequestListParams {
    fn default() -> Self {
        Self {
            filter_by: "All_Requests".to_string(),
            limit: 1000,
            from: 0,
        }
    }
}

impl RequestListParams {
    /// Creates default list parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists the given filter (see [`SdpClient::get_queue_ids`]).
    pub fn with_filter(mut self, filter_by: impl Into<String>) -> Self {
        self.filter_by = filter_by.into();
        self
    }

    /// Sets the maximum number of results to return.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the starting offset for pagination.
    pub fn with_offset(mut self, from: u32) -> Self {
        self.from = from;
        self
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("from", self.from.to_string())
            .with("limit", self.limit.to_string())
            .with("filterby", self.filter_by.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Creates an SdpClient for unit tests without requiring Config.
    fn test_client() -> SdpClient {
        SdpClient {
            http: Client::new(),
            base_url: Url::parse("http://sdplus/sdpapi/").unwrap(),
            api_key: "test_key".to_string(),
        }
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(SdpClient::normalize_base_url("http://sdplus"), "http://sdplus/sdpapi/");
        assert_eq!(SdpClient::normalize_base_url("http://sdplus/"), "http://sdplus/sdpapi/");
        assert_eq!(
            SdpClient::normalize_base_url("http://sdplus/sdpapi"),
            "http://sdplus/sdpapi/"
        );
        assert_eq!(
            SdpClient::normalize_base_url("http://sdplus/sdpapi/"),
            "http://sdplus/sdpapi/"
        );
        assert_eq!(
            SdpClient::normalize_base_url("https://host:8080/helpdesk"),
            "https://host:8080/helpdesk/sdpapi/"
        );
    }

    #[test]
    fn test_endpoint_joins_without_encoding_slashes() {
        let client = test_client();
        assert_eq!(
            client.endpoint("request/42/notes/7").unwrap().as_str(),
            "http://sdplus/sdpapi/request/42/notes/7"
        );
        assert_eq!(
            client.endpoint("request/").unwrap().as_str(),
            "http://sdplus/sdpapi/request/"
        );
    }

    #[test]
    fn test_validate_id_valid() {
        assert!(SdpClient::validate_id("12345", "test").is_ok());
        assert!(SdpClient::validate_id("0", "test").is_ok());
    }

    #[test]
    fn test_validate_id_rejects_non_numeric() {
        let err = SdpClient::validate_id("", "request_id").unwrap_err();
        assert!(err.to_string().contains("request_id"));
        assert!(SdpClient::validate_id("12/34", "id").is_err());
        assert!(SdpClient::validate_id("../etc/passwd", "id").is_err());
        assert!(SdpClient::validate_id("-1", "id").is_err());
    }

    #[test]
    fn test_note_path() {
        assert_eq!(SdpClient::note_path("42", "7").unwrap(), "request/42/notes/7");
        assert!(SdpClient::note_path("42", "x").is_err());
    }

    #[test]
    fn test_request_web_url_encodes_id() {
        let client = test_client();
        assert_eq!(
            client.request_web_url("12345"),
            "http://sdplus/WorkOrder.do?woMode=viewWO&woID=12345"
        );

        let url = client.request_web_url("123&evil=true");
        assert!(!url.contains("&evil=true"));
        assert!(url.contains("woID=123%26evil%3Dtrue"));
    }

    #[test]
    fn test_list_params_default_fields() {
        let fields = RequestListParams::new().to_fields();
        let collected: Vec<_> = fields.iter().collect();
        assert_eq!(
            collected,
            vec![("from", "0"), ("limit", "1000"), ("filterby", "All_Requests")]
        );
    }

    #[test]
    fn test_list_params_builders() {
        let fields = RequestListParams::new()
            .with_filter("Open_System")
            .with_limit(10)
            .with_offset(20)
            .to_fields();
        assert_eq!(fields.get("filterby"), Some("Open_System"));
        assert_eq!(fields.get("limit"), Some("10"));
        assert_eq!(fields.get("from"), Some("20"));
    }

    #[test]
    fn test_call_without_fields_has_no_input_data() {
        assert_eq!(
            OperationCall::new("request/1", "GET_REQUEST").input_data().unwrap(),
            None
        );
        let empty = OperationCall::new("request/1", "EDIT_REQUEST").with_fields(Fields::new());
        assert_eq!(empty.input_data().unwrap(), None);
    }

    #[test]
    fn test_call_input_data_uses_wrappers() {
        let call = OperationCall::new("request/1/resolution", "ADD_RESOLUTION")
            .with_fields(Fields::new().with("resolutiontext", "Replaced toner"))
            .with_wrappers(&["resolution"]);
        assert_eq!(
            call.input_data().unwrap().unwrap(),
            "<Operation><Details><resolution><parameter><name>resolutiontext</name>\
             <value>Replaced toner</value></parameter></resolution></Details></Operation>"
        );
        assert_eq!(call.operation(), "ADD_RESOLUTION");
        assert_eq!(call.path(), "request/1/resolution");
    }
}
