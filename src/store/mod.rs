pub mod catalog;
pub mod reviews;
pub mod users;

pub use catalog::CatalogStore;
pub use reviews::ReviewStore;
pub use users::UserStore;

pub(crate) fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
