//! Stateless HTTP request builder and response parser for the library API.
//!
//! # Design
//! `LibraryClient` holds only a `base_url`. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. `request` glues the two around a
//! `Transport` for callers that just want JSON back.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{
    Author, Book, Borrowing, BorrowingStatus, Category, CreateAuthor, CreateBook,
    CreateBorrowing, CreateCategory, CreateMember, ErrorBody, Member, UpdateBorrowing,
};

/// Synchronous, stateless client for the library API.
#[derive(Debug, Clone)]
pub struct LibraryClient {
    base_url: String,
}

impl LibraryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for `path` relative to the base URL. A body is
    /// serialized to JSON and tagged with the JSON content type.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        match body {
            None => Ok(HttpRequest {
                method,
                url,
                headers: Vec::new(),
                body: None,
            }),
            Some(body) => {
                let body = serde_json::to_string(body)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                Ok(HttpRequest {
                    method,
                    url,
                    headers: vec![("content-type".to_string(), "application/json".to_string())],
                    body: Some(body),
                })
            }
        }
    }

    /// Execute `method path` with an optional JSON body and return the
    /// response body as untyped JSON (`Null` for an empty body).
    pub fn request<T: Transport + ?Sized>(
        &self,
        transport: &T,
        method: HttpMethod,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, ApiError> {
        let request = self.build_request(method, path, body)?;
        tracing::debug!(%method, url = %request.url, "sending request");
        let response = transport.execute(request)?;
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn build_list_books(&self) -> HttpRequest {
        self.build_get("/books")
    }

    pub fn build_create_book(&self, input: &CreateBook) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, "/books", Some(input))
    }

    pub fn build_list_members(&self) -> HttpRequest {
        self.build_get("/members")
    }

    pub fn build_create_member(&self, input: &CreateMember) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, "/members", Some(input))
    }

    pub fn build_list_borrowings(&self) -> HttpRequest {
        self.build_get("/borrowings")
    }

    pub fn build_create_borrowing(&self, input: &CreateBorrowing) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, "/borrowings", Some(input))
    }

    /// `PUT /borrowings/{id}` marking the borrowing as returned.
    pub fn build_return_borrowing(&self, id: i64) -> Result<HttpRequest, ApiError> {
        let input = UpdateBorrowing {
            status: BorrowingStatus::Returned,
        };
        self.build_request(HttpMethod::Put, &format!("/borrowings/{id}"), Some(&input))
    }

    pub fn build_list_authors(&self) -> HttpRequest {
        self.build_get("/authors")
    }

    pub fn build_create_author(&self, input: &CreateAuthor) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, "/authors", Some(input))
    }

    pub fn build_list_categories(&self) -> HttpRequest {
        self.build_get("/categories")
    }

    pub fn build_create_category(&self, input: &CreateCategory) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, "/categories", Some(input))
    }

    pub fn parse_list_books(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_members(&self, response: HttpResponse) -> Result<Vec<Member>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_member(&self, response: HttpResponse) -> Result<Member, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_borrowings(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Borrowing>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_borrowing(&self, response: HttpResponse) -> Result<Borrowing, ApiError> {
        parse_json(response)
    }

    pub fn parse_return_borrowing(&self, response: HttpResponse) -> Result<Borrowing, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_authors(&self, response: HttpResponse) -> Result<Vec<Author>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_author(&self, response: HttpResponse) -> Result<Author, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_categories(&self, response: HttpResponse) -> Result<Vec<Category>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_json(response)
    }

    fn build_get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{}", self.base_url, path),
            headers: Vec::new(),
            body: None,
        }
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx status codes to `ApiError::Http`, lifting the backend's
/// `message` field when the body has one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.message);
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}
