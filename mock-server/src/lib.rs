use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Days, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

const STATUS_BORROWED: &str = "dipinjam";
const STATUS_RETURNED: &str = "dikembalikan";
const STATUS_OVERDUE: &str = "terlambat";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub nama: String,
    pub tanggal_lahir: Option<NaiveDate>,
    pub tanggal_dibuat: NaiveDateTime,
    pub tanggal_diupdate: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub nama: String,
    pub tanggal_dibuat: NaiveDateTime,
    pub tanggal_diupdate: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub judul: String,
    pub tahun_terbit: Option<i32>,
    pub isbn: Option<String>,
    pub stok: i64,
    pub author_id: i64,
    pub category_id: i64,
    pub tanggal_dibuat: NaiveDateTime,
    pub tanggal_diupdate: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub nama: String,
    pub alamat: Option<String>,
    pub telepon: String,
    pub email: Option<String>,
    pub tanggal_registrasi: NaiveDateTime,
    pub tanggal_dibuat: NaiveDateTime,
    pub tanggal_diupdate: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Borrowing {
    pub id: i64,
    pub book_id: i64,
    pub member_id: i64,
    pub tanggal_peminjaman: NaiveDateTime,
    pub tanggal_kembali_seharusnya: NaiveDate,
    pub tanggal_pengembalian_aktual: Option<NaiveDateTime>,
    pub status: String,
    pub tanggal_dibuat: NaiveDateTime,
    pub tanggal_diupdate: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
}

// Create payloads take every field as optional so missing ones can be
// answered with the backend's own 400 message instead of a 422.

#[derive(Deserialize)]
pub struct CreateAuthor {
    pub nama: Option<String>,
    #[serde(default)]
    pub tanggal_lahir: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCategory {
    pub nama: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBook {
    pub judul: Option<String>,
    #[serde(default)]
    pub tahun_terbit: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub stok: Option<i64>,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateMember {
    pub nama: Option<String>,
    #[serde(default)]
    pub alamat: Option<String>,
    pub telepon: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBorrowing {
    pub book_id: Option<i64>,
    pub member_id: Option<i64>,
    pub durasi_peminjaman_hari: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateBorrowing {
    pub status: Option<String>,
}

/// Error answer carrying the `{"message": ...}` body the client displays.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, message = %self.message, "request rejected");
        let body = serde_json::json!({ "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiFailure>;

/// One table: rows by id, ids allocated sequentially from 1.
pub struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.next_id += 1;
        let row = build(self.next_id);
        self.rows.insert(self.next_id, row.clone());
        row
    }

    fn get(&self, id: &i64) -> Option<&T> {
        self.rows.get(id)
    }

    fn get_mut(&mut self, id: &i64) -> Option<&mut T> {
        self.rows.get_mut(id)
    }

    fn contains_key(&self, id: &i64) -> bool {
        self.rows.contains_key(id)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

#[derive(Default)]
pub struct Store {
    authors: Table<Author>,
    categories: Table<Category>,
    books: Table<Book>,
    members: Table<Member>,
    borrowings: Table<Borrowing>,
}

impl Store {
    fn book_with_relations(&self, book: &Book) -> Book {
        Book {
            author: self.authors.get(&book.author_id).cloned(),
            category: self.categories.get(&book.category_id).cloned(),
            ..book.clone()
        }
    }

    fn borrowing_with_relations(&self, borrowing: &Borrowing) -> Borrowing {
        Borrowing {
            book: self.books.get(&borrowing.book_id).cloned(),
            member: self.members.get(&borrowing.member_id).cloned(),
            ..borrowing.clone()
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/authors", get(list_authors).post(create_author))
        .route("/authors/{id}", get(get_author))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", get(get_category))
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", get(get_book))
        .route("/members", get(list_members).post(create_member))
        .route("/members/{id}", get(get_member))
        .route("/borrowings", get(list_borrowings).post(create_borrowing))
        .route("/borrowings/{id}", get(get_borrowing).put(update_borrowing))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn required(fields: &[&str]) -> ApiFailure {
    ApiFailure::bad_request(format!("Required fields are: {}", fields.join(", ")))
}

async fn list_authors(State(db): State<Db>) -> Json<Vec<Author>> {
    let store = db.read().await;
    Json(store.authors.values().cloned().collect())
}

async fn create_author(State(db): State<Db>, Json(input): Json<CreateAuthor>) -> ApiResult<Author> {
    let nama = input
        .nama
        .ok_or_else(|| ApiFailure::bad_request("Nama author is required."))?;
    let tanggal_lahir = match input.tanggal_lahir.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            ApiFailure::bad_request("Invalid date format for tanggal_lahir. Use YYYY-MM-DD.")
        })?),
    };

    let mut store = db.write().await;
    if store.authors.values().any(|a| a.nama == nama) {
        return Err(ApiFailure::conflict("Author with this name already exists."));
    }
    let stamp = now();
    let author = store.authors.insert_with(|id| Author {
        id,
        nama,
        tanggal_lahir,
        tanggal_dibuat: stamp,
        tanggal_diupdate: stamp,
    });
    tracing::info!(id = author.id, "author created");
    Ok((StatusCode::CREATED, Json(author)))
}

async fn get_author(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Author> {
    let store = db.read().await;
    store
        .authors
        .get(&id)
        .cloned()
        .map(|a| (StatusCode::OK, Json(a)))
        .ok_or_else(|| ApiFailure::not_found(format!("Author with ID {id} not found.")))
}

async fn list_categories(State(db): State<Db>) -> Json<Vec<Category>> {
    let store = db.read().await;
    Json(store.categories.values().cloned().collect())
}

async fn create_category(
    State(db): State<Db>,
    Json(input): Json<CreateCategory>,
) -> ApiResult<Category> {
    let nama = input
        .nama
        .ok_or_else(|| ApiFailure::bad_request("Nama category is required."))?;
    let mut store = db.write().await;
    if store.categories.values().any(|c| c.nama == nama) {
        return Err(ApiFailure::conflict("Category with this name already exists."));
    }
    let stamp = now();
    let category = store.categories.insert_with(|id| Category {
        id,
        nama,
        tanggal_dibuat: stamp,
        tanggal_diupdate: stamp,
    });
    tracing::info!(id = category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn get_category(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Category> {
    let store = db.read().await;
    store
        .categories
        .get(&id)
        .cloned()
        .map(|c| (StatusCode::OK, Json(c)))
        .ok_or_else(|| ApiFailure::not_found(format!("Category with ID {id} not found.")))
}

async fn list_books(State(db): State<Db>) -> Json<Vec<Book>> {
    let store = db.read().await;
    Json(store.books.values().cloned().collect())
}

async fn create_book(State(db): State<Db>, Json(input): Json<CreateBook>) -> ApiResult<Book> {
    const FIELDS: [&str; 3] = ["judul", "author_id", "category_id"];
    let (Some(judul), Some(author_id), Some(category_id)) =
        (input.judul, input.author_id, input.category_id)
    else {
        return Err(required(&FIELDS));
    };

    let mut store = db.write().await;
    if !store.authors.contains_key(&author_id) {
        return Err(ApiFailure::not_found(format!("Author with ID {author_id} not found.")));
    }
    if !store.categories.contains_key(&category_id) {
        return Err(ApiFailure::not_found(format!(
            "Category with ID {category_id} not found."
        )));
    }
    let isbn = input.isbn.filter(|isbn| !isbn.is_empty());
    if let Some(isbn) = &isbn {
        if store.books.values().any(|b| b.isbn.as_ref() == Some(isbn)) {
            return Err(ApiFailure::conflict("Book with this ISBN already exists."));
        }
    }
    if store.books.values().any(|b| b.judul == judul) {
        return Err(ApiFailure::conflict("Book with this title already exists."));
    }

    let stamp = now();
    let book = store.books.insert_with(|id| Book {
        id,
        judul,
        tahun_terbit: input.tahun_terbit,
        isbn,
        stok: input.stok.unwrap_or(0),
        author_id,
        category_id,
        tanggal_dibuat: stamp,
        tanggal_diupdate: stamp,
        author: None,
        category: None,
    });
    tracing::info!(id = book.id, title = %book.judul, "book created");
    Ok((StatusCode::CREATED, Json(store.book_with_relations(&book))))
}

async fn get_book(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Book> {
    let store = db.read().await;
    store
        .books
        .get(&id)
        .map(|b| (StatusCode::OK, Json(store.book_with_relations(b))))
        .ok_or_else(|| ApiFailure::not_found(format!("Book with ID {id} not found.")))
}

async fn list_members(State(db): State<Db>) -> Json<Vec<Member>> {
    let store = db.read().await;
    Json(store.members.values().cloned().collect())
}

async fn create_member(State(db): State<Db>, Json(input): Json<CreateMember>) -> ApiResult<Member> {
    const FIELDS: [&str; 2] = ["nama", "telepon"];
    let (Some(nama), Some(telepon)) = (input.nama, input.telepon) else {
        return Err(required(&FIELDS));
    };

    let mut store = db.write().await;
    if store.members.values().any(|m| m.telepon == telepon) {
        return Err(ApiFailure::conflict("Member with this phone number already exists."));
    }
    let email = input.email.filter(|email| !email.is_empty());
    if let Some(email) = &email {
        if store.members.values().any(|m| m.email.as_ref() == Some(email)) {
            return Err(ApiFailure::conflict("Member with this email already exists."));
        }
    }

    let stamp = now();
    let member = store.members.insert_with(|id| Member {
        id,
        nama,
        alamat: input.alamat,
        telepon,
        email,
        tanggal_registrasi: stamp,
        tanggal_dibuat: stamp,
        tanggal_diupdate: stamp,
    });
    tracing::info!(id = member.id, "member created");
    Ok((StatusCode::CREATED, Json(member)))
}

async fn get_member(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Member> {
    let store = db.read().await;
    store
        .members
        .get(&id)
        .cloned()
        .map(|m| (StatusCode::OK, Json(m)))
        .ok_or_else(|| ApiFailure::not_found(format!("Member with ID {id} not found.")))
}

async fn list_borrowings(State(db): State<Db>) -> Json<Vec<Borrowing>> {
    let store = db.read().await;
    Json(
        store
            .borrowings
            .values()
            .map(|b| store.borrowing_with_relations(b))
            .collect(),
    )
}

async fn create_borrowing(
    State(db): State<Db>,
    Json(input): Json<CreateBorrowing>,
) -> ApiResult<Borrowing> {
    const FIELDS: [&str; 3] = ["book_id", "member_id", "durasi_peminjaman_hari"];
    let (Some(book_id), Some(member_id), Some(days)) =
        (input.book_id, input.member_id, input.durasi_peminjaman_hari)
    else {
        return Err(required(&FIELDS));
    };

    let mut store = db.write().await;
    let stok = store
        .books
        .get(&book_id)
        .map(|b| b.stok)
        .ok_or_else(|| ApiFailure::not_found(format!("Book with ID {book_id} not found.")))?;
    if stok <= 0 {
        return Err(ApiFailure::bad_request("Book is out of stock."));
    }
    if !store.members.contains_key(&member_id) {
        return Err(ApiFailure::not_found(format!("Member with ID {member_id} not found.")));
    }
    if days <= 0 {
        return Err(ApiFailure::bad_request("Borrowing duration must be more than 0 days."));
    }

    let stamp = now();
    let due = u64::try_from(days)
        .ok()
        .and_then(|d| stamp.date().checked_add_days(Days::new(d)))
        .ok_or_else(|| ApiFailure::bad_request("Borrowing duration is too long."))?;
    let borrowing = store.borrowings.insert_with(|id| Borrowing {
        id,
        book_id,
        member_id,
        tanggal_peminjaman: stamp,
        tanggal_kembali_seharusnya: due,
        tanggal_pengembalian_aktual: None,
        status: STATUS_BORROWED.to_string(),
        tanggal_dibuat: stamp,
        tanggal_diupdate: stamp,
        book: None,
        member: None,
    });
    if let Some(book) = store.books.get_mut(&book_id) {
        book.stok -= 1;
        book.tanggal_diupdate = stamp;
    }
    tracing::info!(id = borrowing.id, book_id, member_id, "borrowing created");
    Ok((StatusCode::CREATED, Json(store.borrowing_with_relations(&borrowing))))
}

async fn get_borrowing(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Borrowing> {
    let store = db.read().await;
    store
        .borrowings
        .get(&id)
        .map(|b| (StatusCode::OK, Json(store.borrowing_with_relations(b))))
        .ok_or_else(|| ApiFailure::not_found(format!("Borrowing with ID {id} not found.")))
}

/// Only `status` may change, and a body without it is rejected. Moving to
/// returned stamps the return time once and puts the copy back in stock.
async fn update_borrowing(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateBorrowing>,
) -> ApiResult<Borrowing> {
    let Some(status) = input.status else {
        return Err(ApiFailure::bad_request("No update data provided"));
    };
    if ![STATUS_BORROWED, STATUS_RETURNED, STATUS_OVERDUE].contains(&status.as_str()) {
        return Err(ApiFailure::bad_request(
            "Invalid status. Must be \"dipinjam\", \"dikembalikan\", or \"terlambat\".",
        ));
    }

    let mut store = db.write().await;
    let Some(mut borrowing) = store.borrowings.get(&id).cloned() else {
        return Err(ApiFailure::not_found(format!("Borrowing with ID {id} not found.")));
    };

    let stamp = now();
    if status == STATUS_RETURNED && borrowing.tanggal_pengembalian_aktual.is_none() {
        borrowing.tanggal_pengembalian_aktual = Some(stamp);
        if let Some(book) = store.books.get_mut(&borrowing.book_id) {
            book.stok += 1;
            book.tanggal_diupdate = stamp;
        }
    }
    borrowing.status = status;
    borrowing.tanggal_diupdate = stamp;

    if let Some(row) = store.borrowings.get_mut(&id) {
        *row = borrowing.clone();
    }
    tracing::info!(id, status = %borrowing.status, "borrowing updated");
    Ok((StatusCode::OK, Json(store.borrowing_with_relations(&borrowing))))
}
