use crate::api::DocumentAnalysis;
use crate::utils::url::construct_api_url;

/// Upload a document to the advisor backend for analysis.
///
/// This is an ordinary request/response exchange, not a streaming one: the
/// backend extracts the document text, runs the analysis, and returns the
/// checklist in a single JSON body.
pub async fn analyze_document(
    client: &reqwest::Client,
    base_url: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<DocumentAnalysis, Box<dyn std::error::Error>> {
    let upload_url = construct_api_url(base_url, "api/upload-doc");

    let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = client.post(upload_url).multipart(form).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(format!("Document analysis failed with status {status}: {error_text}").into());
    }

    let analysis = response.json::<DocumentAnalysis>().await?;
    Ok(analysis)
}
