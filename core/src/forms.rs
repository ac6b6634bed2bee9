//! Form field state and payload coercion.
//!
//! Fields are held as the raw strings a user typed. Coercion follows the
//! page's rules: integers are read from the leading digits, empty optional
//! strings become `null`. Only the borrow and return forms validate before
//! submitting.

use crate::error::FormError;
use crate::types::{CreateBook, CreateBorrowing, CreateMember};

/// Lenient integer read: optional sign and leading digits after trimming
/// whitespace, ignoring anything after them. `None` when there are no digits.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn non_empty(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub judul: String,
    pub tahun_terbit: String,
    pub isbn: String,
    pub stok: String,
    pub author_id: String,
    pub category_id: String,
}

impl BookForm {
    pub fn payload(&self) -> CreateBook {
        CreateBook {
            judul: self.judul.clone(),
            tahun_terbit: parse_int(&self.tahun_terbit),
            isbn: non_empty(&self.isbn),
            stok: parse_int(&self.stok),
            author_id: parse_int(&self.author_id),
            category_id: parse_int(&self.category_id),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberForm {
    pub nama: String,
    pub alamat: String,
    pub telepon: String,
    pub email: String,
}

impl MemberForm {
    pub fn payload(&self) -> CreateMember {
        CreateMember {
            nama: self.nama.clone(),
            alamat: non_empty(&self.alamat),
            telepon: self.telepon.clone(),
            email: non_empty(&self.email),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The borrow form. `book_id` and `member_id` hold the selected option
/// values, so the placeholder selection is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowForm {
    pub book_id: String,
    pub member_id: String,
    pub durasi_peminjaman_hari: String,
}

impl BorrowForm {
    /// Both selections must be non-zero ids and the duration a positive
    /// number of days.
    pub fn payload(&self) -> Result<CreateBorrowing, FormError> {
        let book_id = parse_int(&self.book_id).filter(|&id| id != 0);
        let member_id = parse_int(&self.member_id).filter(|&id| id != 0);
        let days = parse_int(&self.durasi_peminjaman_hari).filter(|&d| d > 0);
        match (book_id, member_id, days) {
            (Some(book_id), Some(member_id), Some(durasi_peminjaman_hari)) => Ok(CreateBorrowing {
                book_id,
                member_id,
                durasi_peminjaman_hari,
            }),
            _ => Err(FormError::IncompleteBorrowing),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnForm {
    pub borrowing_id: String,
}

impl ReturnForm {
    pub fn borrowing_id(&self) -> Result<i64, FormError> {
        parse_int(&self.borrowing_id)
            .filter(|&id| id > 0)
            .ok_or(FormError::InvalidBorrowingId)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_reads_leading_digits() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("  7 days"), Some(7));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("+5"), Some(5));
        assert_eq!(parse_int("12.9"), Some(12));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn book_payload_coerces_fields() {
        let form = BookForm {
            judul: "Ronggeng Dukuh Paruk".into(),
            tahun_terbit: "".into(),
            isbn: "".into(),
            stok: "4".into(),
            author_id: "2".into(),
            category_id: "x".into(),
        };
        let payload = form.payload();
        assert_eq!(payload.tahun_terbit, None);
        assert_eq!(payload.isbn, None);
        assert_eq!(payload.stok, Some(4));
        assert_eq!(payload.author_id, Some(2));
        assert_eq!(payload.category_id, None);
    }

    #[test]
    fn member_payload_nulls_empty_optionals() {
        let form = MemberForm {
            nama: "Budi".into(),
            alamat: "".into(),
            telepon: "0812345".into(),
            email: "budi@example.id".into(),
        };
        let payload = form.payload();
        assert_eq!(payload.alamat, None);
        assert_eq!(payload.email.as_deref(), Some("budi@example.id"));
    }

    #[test]
    fn borrow_form_requires_positive_duration() {
        let mut form = BorrowForm {
            book_id: "1".into(),
            member_id: "2".into(),
            durasi_peminjaman_hari: "0".into(),
        };
        assert_eq!(form.payload(), Err(FormError::IncompleteBorrowing));
        form.durasi_peminjaman_hari = "-1".into();
        assert_eq!(form.payload(), Err(FormError::IncompleteBorrowing));
        form.durasi_peminjaman_hari = "14".into();
        assert_eq!(
            form.payload(),
            Ok(CreateBorrowing {
                book_id: 1,
                member_id: 2,
                durasi_peminjaman_hari: 14
            })
        );
    }

    #[test]
    fn borrow_form_rejects_placeholder_selection() {
        let form = BorrowForm {
            book_id: "".into(),
            member_id: "2".into(),
            durasi_peminjaman_hari: "7".into(),
        };
        assert_eq!(form.payload(), Err(FormError::IncompleteBorrowing));
        let form = BorrowForm {
            book_id: "1".into(),
            member_id: "0".into(),
            durasi_peminjaman_hari: "7".into(),
        };
        assert_eq!(form.payload(), Err(FormError::IncompleteBorrowing));
    }

    #[test]
    fn return_form_requires_positive_id() {
        let mut form = ReturnForm {
            borrowing_id: "7".into(),
        };
        assert_eq!(form.borrowing_id(), Ok(7));
        form.borrowing_id = "0".into();
        assert_eq!(form.borrowing_id(), Err(FormError::InvalidBorrowingId));
        form.reset();
        assert_eq!(form.borrowing_id(), Err(FormError::InvalidBorrowingId));
    }
}
