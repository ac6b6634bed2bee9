//! Headless client core for the library management service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps a view model of
//! the library pages: book, member and borrowing lists, the borrowing form's
//! selection controls, transient status messages and two-level navigation.
//!
//! # Design
//! - `LibraryClient` is stateless; it holds only `base_url`.
//! - Hosts implement `Transport` to execute requests.
//! - `App` is the explicitly constructed application context. Navigation is
//!   a pure state machine (`nav::transition`) whose effects the context runs.
//! - Every mutation is followed by a refetch; the server is the only source
//!   of truth and nothing is cached between views.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod nav;
pub mod notifier;
pub mod render;
pub mod types;
pub mod view;

pub use app::{App, Forms};
pub use client::LibraryClient;
pub use config::{AppConfig, LogFormat};
pub use error::{ApiError, FormError, NavError, SubmitError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use nav::{BorrowingTab, Effect, MemberTab, NavEvent, NavState, Section, TabAxis};
pub use notifier::{Clock, ManualClock, MessageKind, MessageSlot, SystemClock};
pub use render::Collection;
pub use types::{
    Author, Book, Borrowing, BorrowingStatus, Category, CreateAuthor, CreateBook,
    CreateBorrowing, CreateCategory, CreateMember, Member, UpdateBorrowing,
};
pub use view::{Card, CardField, Container, SelectControl, SelectOption};
