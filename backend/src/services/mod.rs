//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the upload store and the auth primitives.

pub mod book;
pub mod profile;
pub mod user;

pub use book::{BookForm, BookService};
pub use profile::{ProfileForm, ProfileService};
pub use user::UserService;
