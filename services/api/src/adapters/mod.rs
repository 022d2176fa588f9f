pub mod catalog_remote;
pub mod db;
pub mod fetcher;
pub mod file_store;

pub use catalog_remote::HttpCatalogRemote;
pub use db::DbAdapter;
pub use fetcher::ReqwestFetcher;
pub use file_store::JsonFileStore;
