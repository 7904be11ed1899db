pub mod user;
pub mod video;

mod router;
pub use router::get_router;
