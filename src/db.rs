pub mod stores;
pub use stores::{CustomerStore, DocumentStore, MessageStore, ProfileStore};

pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod document_repo;
pub use document_repo::DocumentRepository;
pub mod message_repo;
pub use message_repo::MessageRepository;
