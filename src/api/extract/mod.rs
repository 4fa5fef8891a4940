pub mod requester;

pub use requester::Requester;
