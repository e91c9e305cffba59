use crate::error::UpstreamError;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

/// Checks status and content type, then decodes the body as JSON.
pub async fn read_json(res: reqwest::Response) -> Result<serde_json::Value, UpstreamError> {
    let status = res.status();
    if status != StatusCode::OK {
        return Err(UpstreamError::Status(status.as_u16()));
    }

    let content_type = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if !content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json"))
    {
        return Err(UpstreamError::ContentType(content_type));
    }

    let text = res.text().await.map_err(UpstreamError::Network)?;
    serde_json::from_str(&text).map_err(UpstreamError::Json)
}
