use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use pdfslice::page_range::PageOrder;
use pdfslice::slice::{normalize_output_name, slice, SliceOptions, PAGE_SPEC_HINT};
use pdfslice::{NoPrompt, SelectionMode, Session, SliceError};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfInfoRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Password, if the PDF is encrypted")]
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSliceRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges (e.g., '1-3, 8, 10-12')")]
    pub pages: String,
    #[schemars(description = "Output file path (default: sliced_output.pdf); '.pdf' is appended when missing")]
    #[serde(default)]
    pub output: String,
    #[schemars(description = "Remove the listed pages instead of keeping them (default: false)")]
    #[serde(default)]
    pub delete: bool,
    #[schemars(description = "Keep pages in the order they were listed instead of ascending (default: false)")]
    #[serde(default)]
    pub keep_input_order: bool,
    #[schemars(description = "Copy document metadata into the output (default: true)")]
    #[serde(default = "default_copy_metadata")]
    pub copy_metadata: bool,
    #[schemars(description = "Password, if the PDF is encrypted")]
    #[serde(default)]
    pub password: Option<String>,
}

fn default_copy_metadata() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get PDF page count and metadata including title, author, creator, producer and creation date")]
    fn pdf_info(&self, Parameters(req): Parameters<PdfInfoRequest>) -> String {
        let mut session = Session::new();
        let doc = match session
            .load(&req.path, req.password.as_deref(), &mut NoPrompt)
            .and_then(|_| session.open_document())
        {
            Ok(d) => d,
            Err(e) => return error_text(&e),
        };

        let info = doc.get_info();
        let result = PdfInfoResult {
            path: req.path,
            page_count: info.page_count,
            encrypted: info.encrypted,
            title: info.title,
            author: info.author,
            creator: info.creator,
            producer: info.producer,
            creation_date: info.creation_date,
            subject: info.subject,
            keywords: info.keywords,
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }

    #[tool(description = "Write selected pages of a PDF to a new file. Pages use range syntax like '1-3, 8, 10-12'; set delete to keep everything except the listed pages.")]
    fn pdf_slice(&self, Parameters(req): Parameters<PdfSliceRequest>) -> String {
        let mut session = Session::new();
        if let Err(e) = session.load(&req.path, req.password.as_deref(), &mut NoPrompt) {
            return error_text(&e);
        }

        let output = PathBuf::from(normalize_output_name(&req.output));
        let options = SliceOptions {
            mode: if req.delete {
                SelectionMode::Delete
            } else {
                SelectionMode::Extract
            },
            order: if req.keep_input_order {
                PageOrder::InputOrder
            } else {
                PageOrder::Numeric
            },
            copy_metadata: req.copy_metadata,
            cancel: None,
        };

        match slice(&session, &req.pages, &output, &options, |_| {}) {
            Ok(report) => {
                let result = SliceResult {
                    output_path: report.output.display().to_string(),
                    page_count: report.pages.len() as u32,
                    source_page_count: report.source_pages,
                    pages: report.pages,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => error_text(&e),
        }
    }
}

fn error_text(e: &SliceError) -> String {
    match e {
        SliceError::Selection(_) => format!("Error: {} (page ranges look like {})", e, PAGE_SPEC_HINT),
        SliceError::PasswordRequired => format!("Error: {} Pass it in the password field.", e),
        _ => format!("Error: {}", e),
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PdfInfoResult {
    pub path: String,
    pub page_count: u32,
    pub encrypted: bool,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SliceResult {
    pub output_path: String,
    pub page_count: u32,
    pub source_page_count: u32,
    pub pages: Vec<u32>,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF slicing tools. Use pdf_info to get the page count and metadata, and \
                 pdf_slice to write a new PDF that keeps (or, with delete, removes) the listed \
                 pages."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfslice::SelectionError;

    #[test]
    fn test_slice_request_defaults() {
        let req: PdfSliceRequest =
            serde_json::from_str(r#"{"path": "in.pdf", "pages": "1-3"}"#).unwrap();
        assert_eq!(req.output, "");
        assert!(!req.delete);
        assert!(!req.keep_input_order);
        assert!(req.copy_metadata);
        assert!(req.password.is_none());
    }

    #[test]
    fn test_selection_error_mentions_syntax() {
        let text = error_text(&SliceError::from(SelectionError::EmptySelection));
        assert!(text.contains("1-3, 8, 10-12"));
    }

    #[test]
    fn test_missing_file_reports_error() {
        let server = PdfServer::new();
        let text = server.pdf_info(Parameters(PdfInfoRequest {
            path: "/nonexistent/input.pdf".to_string(),
            password: None,
        }));
        assert!(text.starts_with("Error: Failed to open PDF"));
    }
}
