//! Domain DTOs for the library API.
//!
//! # Design
//! These mirror the backend's JSON exactly, Indonesian field names included,
//! and carry no behaviour. They are defined independently from the
//! mock-server crate; the integration test catches schema drift.
//!
//! `Borrowing::status` stays a raw string: the backend owns that enum and the
//! client only classifies it for display (see `BorrowingStatus::from_wire`).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub nama: String,
    #[serde(default)]
    pub tanggal_lahir: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub nama: String,
}

/// A catalogue entry. `author` and `category` are only present when the
/// server joined the relations (single-book and create responses).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub judul: String,
    pub tahun_terbit: Option<i32>,
    pub isbn: Option<String>,
    pub stok: i64,
    pub author_id: i64,
    pub category_id: i64,
    pub tanggal_dibuat: NaiveDateTime,
    #[serde(default)]
    pub tanggal_diupdate: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub nama: String,
    pub alamat: Option<String>,
    pub telepon: String,
    pub email: Option<String>,
    pub tanggal_registrasi: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Borrowing {
    pub id: i64,
    pub book_id: i64,
    pub member_id: i64,
    pub tanggal_peminjaman: NaiveDateTime,
    pub tanggal_kembali_seharusnya: NaiveDate,
    pub tanggal_pengembalian_aktual: Option<NaiveDateTime>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
}

/// Borrowing lifecycle states as spelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorrowingStatus {
    #[serde(rename = "dipinjam")]
    Borrowed,
    #[serde(rename = "dikembalikan")]
    Returned,
    #[serde(rename = "terlambat")]
    Overdue,
}

impl BorrowingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BorrowingStatus::Borrowed => "dipinjam",
            BorrowingStatus::Returned => "dikembalikan",
            BorrowingStatus::Overdue => "terlambat",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "dipinjam" => Some(BorrowingStatus::Borrowed),
            "dikembalikan" => Some(BorrowingStatus::Returned),
            "terlambat" => Some(BorrowingStatus::Overdue),
            _ => None,
        }
    }
}

/// Payload for `POST /books`.
///
/// Numeric fields are optional because the form sends `null` for values it
/// could not parse; the server decides whether that is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBook {
    pub judul: String,
    pub tahun_terbit: Option<i64>,
    pub isbn: Option<String>,
    pub stok: Option<i64>,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
}

/// Payload for `POST /members`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateMember {
    pub nama: String,
    pub alamat: Option<String>,
    pub telepon: String,
    pub email: Option<String>,
}

/// Payload for `POST /borrowings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBorrowing {
    pub book_id: i64,
    pub member_id: i64,
    pub durasi_peminjaman_hari: i64,
}

/// Payload for `PUT /borrowings/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateBorrowing {
    pub status: BorrowingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateAuthor {
    pub nama: String,
    pub tanggal_lahir: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCategory {
    pub nama: String,
}

/// Body carried by non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_parses_backend_timestamp_format() {
        let json = r#"{
            "id": 3, "judul": "Laskar Pelangi", "tahun_terbit": 2005,
            "isbn": null, "stok": 4, "author_id": 1, "category_id": 2,
            "tanggal_dibuat": "2024-05-01T10:20:30.123456",
            "tanggal_diupdate": "2024-05-01T10:20:30.123456"
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.judul, "Laskar Pelangi");
        assert_eq!(book.tahun_terbit, Some(2005));
        assert!(book.isbn.is_none());
        assert!(book.author.is_none());
        assert_eq!(book.tanggal_dibuat.date().to_string(), "2024-05-01");
    }

    #[test]
    fn borrowing_without_embedded_relations_parses() {
        let json = r#"{
            "id": 7, "book_id": 3, "member_id": 2,
            "tanggal_peminjaman": "2024-05-01T08:00:00",
            "tanggal_kembali_seharusnya": "2024-05-08",
            "tanggal_pengembalian_aktual": null,
            "status": "dipinjam"
        }"#;
        let borrowing: Borrowing = serde_json::from_str(json).unwrap();
        assert!(borrowing.book.is_none());
        assert!(borrowing.member.is_none());
        assert_eq!(borrowing.tanggal_kembali_seharusnya.to_string(), "2024-05-08");
    }

    #[test]
    fn update_borrowing_serializes_wire_status() {
        let body = serde_json::to_string(&UpdateBorrowing {
            status: BorrowingStatus::Returned,
        })
        .unwrap();
        assert_eq!(body, r#"{"status":"dikembalikan"}"#);
    }

    #[test]
    fn create_book_keeps_nulls() {
        let payload = CreateBook {
            judul: "Bumi".into(),
            tahun_terbit: None,
            isbn: None,
            stok: Some(2),
            author_id: Some(1),
            category_id: Some(1),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["tahun_terbit"].is_null());
        assert!(value["isbn"].is_null());
        assert_eq!(value["stok"], 2);
    }

    #[test]
    fn status_from_wire_rejects_unknown() {
        assert_eq!(
            BorrowingStatus::from_wire("terlambat"),
            Some(BorrowingStatus::Overdue)
        );
        assert_eq!(BorrowingStatus::from_wire("hilang"), None);
    }

    #[test]
    fn error_body_message_is_optional() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.message.is_none());
    }
}
